//! FIRST and NULLABLE sets.

use crate::bnf::*;
use super::token_set::TokenSet;

pub(crate) struct FirstSets {
  /// indexed by non-terminal
  pub(crate) first: Vec<TokenSet>,
  /// indexed by non-terminal
  pub(crate) nullable: Vec<bool>,
}

impl FirstSets {
  pub(crate) fn new(bnf: &Bnf) -> Self {
    let nullable = gen_nullable(bnf);
    let first = gen_first(bnf, &nullable);
    FirstSets {
      first,
      nullable,
    }
  }

  /// Adds FIRST(`symbols` `lookahead`) \ {ε} to `result`. Returns whether
  /// `symbols` is nullable.
  pub(crate) fn first_of(
    &self,
    result: &mut TokenSet,
    symbols: &[Symbol],
    lookahead: Option<TermId>,
  ) -> bool {
    compute_first_for_symbols(result, &self.first, &self.nullable, symbols,
      lookahead)
  }
}

pub(super) fn gen_nullable(
  bnf: &Bnf,
) -> Vec<bool> {
  let mut nullable = vec![false; bnf.nonterms.len()];

  loop {
    let mut changed = false;
    for prod in &bnf.prods {
      let nt_ix = prod.nonterm_id.0 as usize;
      if !nullable[nt_ix]
        && prod.symbols.iter().all(|sym| is_nullable(&nullable, sym))
      {
        nullable[nt_ix] = true;
        changed = true;
      }
    }
    if !changed {
      break;
    }
  }

  nullable
}

fn is_nullable(nullable: &[bool], sym: &Symbol) -> bool {
  match sym {
    Symbol::Term(_) => false,
    Symbol::Nonterm(id) => nullable[id.0 as usize],
  }
}

pub(super) fn gen_first(
  bnf: &Bnf,
  nullable: &[bool],
) -> Vec<TokenSet> {
  let mut buf = TokenSet::new(bnf.terms.len());
  let mut first = vec![buf.clone(); bnf.nonterms.len()];

  let mut iterations = 0;
  loop {
    iterations += 1;
    let mut changed = false;
    for prod in &bnf.prods {
      buf.clear();
      compute_first_for_symbols(&mut buf, &first, nullable, &prod.symbols,
        None);
      changed |= first[prod.nonterm_id.0 as usize].union_with(&buf);
    }
    if !changed {
      break;
    }
  }
  log::debug!("FIRST sets computed in {} iterations", iterations);

  first
}

/// Returns whether all of `symbols` are nullable, in which case
/// `lookahead` has been added as well.
pub(super) fn compute_first_for_symbols(
  result: &mut TokenSet,
  first: &[TokenSet],
  nullable: &[bool],
  symbols: &[Symbol],
  lookahead: Option<TermId>,
) -> bool {
  for sym in symbols {
    match sym {
      Symbol::Term(id) => {
        result.insert(*id);
        return false;
      }
      Symbol::Nonterm(id) => {
        result.union_with(&first[id.0 as usize]);
        if !nullable[id.0 as usize] {
          return false;
        }
      }
    }
  }

  if let Some(lookahead) = lookahead {
    result.insert(lookahead);
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::Grammar;
  use pretty_assertions::assert_eq;

  fn lower(text: &str) -> Bnf {
    let mut grammar = Grammar::parse(text).unwrap();
    grammar.augment().unwrap();
    let prods = grammar.productions().unwrap();
    Bnf::new(&grammar, &prods).unwrap()
  }

  fn names(bnf: &Bnf, set: &TokenSet) -> Vec<String> {
    set.iter().map(|id| bnf.term_name(id).to_owned()).collect()
  }

  fn simple() -> Bnf {
    lower(r#"
      Z -> d | X Y Z
      Y -> ε | c
      X -> Y | a
    "#)
  }

  #[test]
  fn simple_nullable() {
    let bnf = simple();
    // X Y Z Z'
    assert_eq!(gen_nullable(&bnf), vec![true, true, false, false]);
  }

  #[test]
  fn simple_first() {
    let bnf = simple();
    let sets = FirstSets::new(&bnf);

    assert_eq!(names(&bnf, &sets.first[0]), vec!["a", "c"]);
    assert_eq!(names(&bnf, &sets.first[1]), vec!["c"]);
    assert_eq!(names(&bnf, &sets.first[2]), vec!["a", "c", "d"]);
    assert_eq!(names(&bnf, &sets.first[3]), vec!["a", "c", "d"]);
  }

  #[test]
  fn first_of_symbols_with_lookahead() {
    let bnf = simple();
    let sets = FirstSets::new(&bnf);
    let x = Symbol::Nonterm(NontermId(0));
    let y = Symbol::Nonterm(NontermId(1));
    let z = Symbol::Nonterm(NontermId(2));
    let mut buf = TokenSet::new(bnf.terms.len());

    assert!(sets.first_of(&mut buf, &[x, y], Some(bnf.eof())));
    assert_eq!(names(&bnf, &buf), vec!["a", "c", "$"]);

    buf.clear();
    assert!(!sets.first_of(&mut buf, &[y, z], Some(bnf.eof())));
    assert_eq!(names(&bnf, &buf), vec!["a", "c", "d"]);

    buf.clear();
    assert!(sets.first_of(&mut buf, &[], Some(bnf.eof())));
    assert_eq!(names(&bnf, &buf), vec!["$"]);
  }
}
