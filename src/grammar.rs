use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::mem;
use indexmap::IndexMap;
use crate::error::Error;

/// The end-of-input marker. Never a grammar symbol.
pub const END_MARKER: &str = "$";

/// Spelling of the empty string in grammar text and in FIRST sets.
pub const EPSILON: &str = "ε";

const EPSILON_WORD: &str = "epsilon";

pub(crate) fn is_epsilon(sym: &str) -> bool {
  sym == EPSILON || sym == EPSILON_WORD
}

/// Controls how grammar text is read.
#[derive(Debug, Clone, Default)]
pub struct GrammarOptions {
  /// Skip non-blank lines that have no production arrow instead of
  /// failing with [`Error::MissingArrow`].
  pub skip_malformed_lines: bool,
}

impl GrammarOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn skip_malformed_lines(mut self, skip: bool) -> Self {
    self.skip_malformed_lines = skip;
    self
  }
}

/// A rewrite rule `lhs → rhs`. An empty `rhs` is the ε-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
  pub lhs: String,
  pub rhs: Vec<String>,
}

impl Production {
  pub fn new(lhs: impl Into<String>, rhs: Vec<String>) -> Self {
    Self {
      lhs: lhs.into(),
      rhs,
    }
  }

  /// The right-hand side joined by spaces, or `ε` when empty.
  pub fn rhs_label(&self) -> String {
    rhs_label(&self.rhs)
  }
}

pub(crate) fn rhs_label(rhs: &[String]) -> String {
  if rhs.is_empty() {
    EPSILON.to_owned()
  } else {
    rhs.join(" ")
  }
}

impl Display for Production {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} → {}", self.lhs, self.rhs_label())
  }
}

/// A context-free grammar read from text.
///
/// Alternatives are kept per non-terminal in declaration order. The grammar
/// is not modified after [`augment`](Grammar::augment).
#[derive(Debug, Clone)]
pub struct Grammar {
  start: String,
  /// set once augmented
  original_start: Option<String>,
  rules: IndexMap<String, Vec<Vec<String>>>,
  terminals: BTreeSet<String>,
  nonterminals: BTreeSet<String>,
}

impl Grammar {
  pub fn parse(text: &str) -> Result<Self, Error> {
    Self::parse_with(text, &GrammarOptions::default())
  }

  /// Reads lines of the form `A -> x B | y | ε`. The arrow may also be
  /// written `→`. The first left-hand side becomes the start symbol.
  pub fn parse_with(text: &str, options: &GrammarOptions) -> Result<Self, Error> {
    let mut start = None;
    let mut rules: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();

    for (ix, raw) in text.lines().enumerate() {
      let line = ix + 1;
      let trimmed = raw.trim();
      if trimmed.is_empty() {
        continue;
      }

      let normalized = trimmed.replace('→', "->");
      let (lhs, rhs) = match normalized.split_once("->") {
        Some(parts) => parts,
        None if options.skip_malformed_lines => {
          log::warn!("line {}: skipping `{}`, no production arrow", line, trimmed);
          continue;
        }
        None => {
          return Err(Error::MissingArrow {
            line,
            text: trimmed.to_owned(),
          });
        }
      };

      let lhs = parse_lhs(line, lhs)?;
      if start.is_none() {
        start = Some(lhs.clone());
      }

      let alts = rules.entry(lhs).or_insert_with(Vec::new);
      for alt in rhs.split('|') {
        alts.push(parse_alternative(line, alt)?);
      }
    }

    let start = start.ok_or(Error::EmptyGrammar)?;

    let nonterminals = rules.keys().cloned().collect::<BTreeSet<_>>();
    let terminals = rules.values()
      .flatten()
      .flatten()
      .filter(|sym| !nonterminals.contains(*sym))
      .cloned()
      .collect::<BTreeSet<_>>();

    let grammar = Grammar {
      start,
      original_start: None,
      rules,
      terminals,
      nonterminals,
    };

    if log::log_enabled!(log::Level::Debug) {
      log::debug!("start symbol: {}", grammar.start);
      log::debug!("non-terminals: {:?}", grammar.nonterminals);
      log::debug!("terminals: {:?}", grammar.terminals);
      for (lhs, alts) in &grammar.rules {
        for rhs in alts {
          log::debug!("  {}", Production::new(lhs.clone(), rhs.clone()));
        }
      }
    }

    Ok(grammar)
  }

  /// Adds `S' → S` and makes `S'` the start symbol. Returns the previous
  /// start symbol.
  ///
  /// `S'` is the start symbol with a prime appended; more primes are added
  /// while the name clashes with an existing symbol.
  pub fn augment(&mut self) -> Result<String, Error> {
    if self.original_start.is_some() {
      return Err(Error::AlreadyAugmented {
        start: self.start.clone(),
      });
    }

    let mut fresh = format!("{}'", self.start);
    while self.is_nonterminal(&fresh) || self.is_terminal(&fresh) {
      fresh.push('\'');
    }

    let old = mem::replace(&mut self.start, fresh.clone());
    self.rules.insert(fresh.clone(), vec![vec![old.clone()]]);
    self.nonterminals.insert(fresh);
    self.original_start = Some(old.clone());
    Ok(old)
  }

  /// Numbers the productions of an augmented grammar.
  ///
  /// Index 0 is the augmented production. The rest follow in ascending
  /// non-terminal name order, declaration order within each non-terminal.
  /// Reduce actions refer to these indices.
  pub fn productions(&self) -> Result<Vec<Production>, Error> {
    if !self.is_augmented() {
      return Err(Error::NotAugmented);
    }

    let mut prods = self.alternatives(&self.start).iter()
      .map(|rhs| Production::new(self.start.clone(), rhs.clone()))
      .collect::<Vec<_>>();

    for lhs in &self.nonterminals {
      if *lhs == self.start {
        continue;
      }
      for rhs in self.alternatives(lhs) {
        prods.push(Production::new(lhs.clone(), rhs.clone()));
      }
    }

    Ok(prods)
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  /// The start symbol before augmentation.
  pub fn original_start(&self) -> &str {
    self.original_start.as_deref().unwrap_or(&self.start)
  }

  pub fn is_augmented(&self) -> bool {
    self.original_start.is_some()
  }

  pub fn terminals(&self) -> &BTreeSet<String> {
    &self.terminals
  }

  pub fn nonterminals(&self) -> &BTreeSet<String> {
    &self.nonterminals
  }

  pub fn is_terminal(&self, sym: &str) -> bool {
    self.terminals.contains(sym)
  }

  pub fn is_nonterminal(&self, sym: &str) -> bool {
    self.nonterminals.contains(sym)
  }

  /// Alternatives of `nonterm` in declaration order. Empty for unknown
  /// symbols.
  pub fn alternatives(&self, nonterm: &str) -> &[Vec<String>] {
    self.rules.get(nonterm).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn production_count(&self) -> usize {
    self.rules.values().map(Vec::len).sum()
  }
}

fn is_reserved(sym: &str) -> bool {
  sym == END_MARKER || is_epsilon(sym)
}

fn parse_lhs(line: usize, lhs: &str) -> Result<String, Error> {
  let lhs = lhs.trim();
  if lhs.is_empty() {
    return Err(Error::MissingLhs { line });
  }
  if lhs.split_whitespace().nth(1).is_some() {
    return Err(Error::InvalidLhs {
      line,
      lhs: lhs.to_owned(),
    });
  }
  if is_reserved(lhs) {
    return Err(Error::ReservedSymbol {
      line,
      symbol: lhs.to_owned(),
    });
  }
  Ok(lhs.to_owned())
}

fn parse_alternative(line: usize, alt: &str) -> Result<Vec<String>, Error> {
  let symbols = alt.split_whitespace().collect::<Vec<_>>();

  if let [only] = symbols.as_slice() {
    if is_epsilon(only) {
      return Ok(vec![]);
    }
  }

  symbols.into_iter()
    .map(|sym| {
      if is_epsilon(sym) {
        Err(Error::MisplacedEpsilon {
          line,
          symbol: sym.to_owned(),
        })
      } else if sym == END_MARKER {
        Err(Error::ReservedSymbol {
          line,
          symbol: sym.to_owned(),
        })
      } else {
        Ok(sym.to_owned())
      }
    })
    .collect()
}
