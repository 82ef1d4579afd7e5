//! Errors reported while reading a grammar, building the tables, or
//! preparing parser input.
//!
//! Conflicts and rejected inputs are not errors: conflicts are returned as
//! diagnostics by [`Parser::conflicts`](crate::Parser::conflicts) and a
//! rejected input is an ordinary [`Outcome`](crate::Outcome).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A non-blank grammar line has no `->` or `→`.
  #[error("line {line}: no production arrow in `{text}`")]
  MissingArrow {
    line: usize,
    text: String,
  },

  #[error("line {line}: missing left-hand side")]
  MissingLhs {
    line: usize,
  },

  /// The left-hand side is not a single symbol.
  #[error("line {line}: left-hand side `{lhs}` is not a single symbol")]
  InvalidLhs {
    line: usize,
    lhs: String,
  },

  #[error("line {line}: `{symbol}` is reserved and cannot be used as a grammar symbol")]
  ReservedSymbol {
    line: usize,
    symbol: String,
  },

  /// `ε` or `epsilon` appears next to other symbols in one alternative.
  #[error("line {line}: `{symbol}` must be the only symbol of an alternative")]
  MisplacedEpsilon {
    line: usize,
    symbol: String,
  },

  #[error("grammar has no productions")]
  EmptyGrammar,

  #[error("grammar is already augmented with start symbol `{start}`")]
  AlreadyAugmented {
    start: String,
  },

  #[error("grammar must be augmented before its productions are numbered")]
  NotAugmented,

  /// The generated automaton broke one of its own invariants.
  #[error("internal inconsistency in state {state}: {detail}")]
  Inconsistent {
    state: usize,
    detail: String,
  },

  /// A production refers to a symbol the grammar does not declare.
  #[error("internal inconsistency: `{symbol}` is not a symbol of the grammar")]
  UnknownSymbol {
    symbol: String,
  },

  /// The caller supplied the end marker, which is always implicit.
  #[error("input token {position} is the reserved end marker `$`")]
  ReservedToken {
    position: usize,
  },
}
