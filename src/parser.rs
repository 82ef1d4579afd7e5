use std::collections::{BTreeMap, BTreeSet};
use crate::bnf::{Bnf, Symbol};
use crate::error::Error;
use crate::grammar::{is_epsilon, Grammar, Production, END_MARKER, EPSILON};
use self::sets::FirstSets;
use self::state::States;
use self::table::Table;

mod driver;
mod item;
mod report;
mod sets;
mod state;
mod table;
mod token_set;

pub use driver::{Outcome, ParseTrace, Reduction, Step, StepAction};
pub use report::{Edge, ItemView, Summary, TableDump};
pub use table::{Action, Conflict, ConflictKind};

/// A canonical LR(1) parser for one grammar.
///
/// All artifacts are built by [`Parser::new`] and never change afterwards,
/// so one parser can serve any number of [`parse`](Parser::parse) calls,
/// including concurrent ones.
pub struct Parser {
  grammar: Grammar,
  productions: Vec<Production>,
  bnf: Bnf,
  first: FirstSets,
  states: States,
  table: Table,
  conflicts: Vec<Conflict>,
}

impl Parser {
  /// Builds the tables. The grammar is augmented first unless it already
  /// is. Conflicts do not fail the build, see [`Parser::conflicts`].
  pub fn new(mut grammar: Grammar) -> Result<Self, Error> {
    if !grammar.is_augmented() {
      grammar.augment()?;
    }

    let productions = grammar.productions()?;
    if log::log_enabled!(log::Level::Debug) {
      log::debug!("numbered productions:");
      for (i, prod) in productions.iter().enumerate() {
        log::debug!("  {}. {}", i, prod);
      }
    }

    let bnf = Bnf::new(&grammar, &productions)?;
    let first = FirstSets::new(&bnf);
    let states = state::gen_states(&bnf, &first);
    let (table, conflicts) = table::gen_table(&bnf, &states)?;

    let parser = Parser {
      grammar,
      productions,
      bnf,
      first,
      states,
      table,
      conflicts,
    };

    if log::log_enabled!(log::Level::Debug) {
      for (symbol, set) in parser.first_sets() {
        log::debug!("FIRST({}) = {:?}", symbol, set);
      }
    }

    Ok(parser)
  }

  /// The augmented grammar.
  pub fn grammar(&self) -> &Grammar {
    &self.grammar
  }

  /// Numbered productions; index 0 is the augmented production.
  pub fn productions(&self) -> &[Production] {
    &self.productions
  }

  /// ACTION conflicts found while building, in discovery order. The table
  /// keeps the first action computed for a cell.
  pub fn conflicts(&self) -> &[Conflict] {
    &self.conflicts
  }

  pub fn is_lr1(&self) -> bool {
    self.conflicts.is_empty()
  }

  pub fn state_count(&self) -> usize {
    self.states.len()
  }

  pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
    match self.bnf.symbol(terminal)? {
      Symbol::Term(id) => self.table.action(state, id),
      Symbol::Nonterm(_) => None,
    }
  }

  pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
    match self.bnf.symbol(nonterminal)? {
      Symbol::Nonterm(id) => self.table.goto(state, id),
      Symbol::Term(_) => None,
    }
  }

  /// FIRST(`symbol`), with `ε` for nullable non-terminals. Symbols outside
  /// the grammar denote themselves.
  pub fn first_set(&self, symbol: &str) -> BTreeSet<String> {
    if is_epsilon(symbol) {
      return std::iter::once(EPSILON.to_owned()).collect();
    }

    match self.bnf.symbol(symbol) {
      Some(Symbol::Nonterm(id)) => {
        let ix = id.0 as usize;
        let mut set = self.term_names(&self.first.first[ix]);
        if self.first.nullable[ix] {
          set.insert(EPSILON.to_owned());
        }
        set
      }
      _ => std::iter::once(symbol.to_owned()).collect(),
    }
  }

  /// FIRST of a symbol string. Contains `ε` when the string is empty or
  /// every symbol in it is nullable.
  pub fn first_of_string<S: AsRef<str>>(&self, symbols: &[S]) -> BTreeSet<String> {
    let mut result = BTreeSet::new();

    for sym in symbols {
      let sym = sym.as_ref();
      if is_epsilon(sym) {
        continue;
      }
      match self.bnf.symbol(sym) {
        Some(Symbol::Nonterm(id)) => {
          let ix = id.0 as usize;
          result.extend(self.term_names(&self.first.first[ix]));
          if !self.first.nullable[ix] {
            return result;
          }
        }
        _ => {
          result.insert(sym.to_owned());
          return result;
        }
      }
    }

    result.insert(EPSILON.to_owned());
    result
  }

  /// FIRST sets of every grammar symbol and of the markers `ε`, `epsilon`
  /// and `$`.
  pub fn first_sets(&self) -> BTreeMap<String, BTreeSet<String>> {
    self.grammar.terminals().iter()
      .chain(self.grammar.nonterminals())
      .map(String::as_str)
      .chain(vec![EPSILON, "epsilon", END_MARKER])
      .map(|sym| (sym.to_owned(), self.first_set(sym)))
      .collect()
  }

  /// Parses whitespace-separated terminals. The end marker is implicit.
  pub fn parse(&self, input: &str) -> Result<ParseTrace, Error> {
    self.parse_tokens(&input.split_whitespace().collect::<Vec<_>>())
  }

  pub fn parse_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParseTrace, Error> {
    let tokens = tokens.iter()
      .enumerate()
      .map(|(position, token)| {
        let token = token.as_ref();
        if token == END_MARKER {
          Err(Error::ReservedToken { position })
        } else {
          Ok(token.to_owned())
        }
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(driver::run(&self.bnf, &self.table, &self.productions,
      self.states.len(), self.grammar.original_start(), tokens))
  }

  fn term_names(&self, set: &token_set::TokenSet) -> BTreeSet<String> {
    set.iter().map(|id| self.bnf.term_name(id).to_owned()).collect()
  }
}
