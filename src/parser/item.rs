use std::collections::BTreeSet;
use crate::bnf::*;
use super::sets::FirstSets;
use super::token_set::TokenSet;

/// `[A → α·β, a]`: production number, dot position and lookahead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct Lr1Item {
  pub(crate) prod: usize,
  pub(crate) dot: usize,
  pub(crate) lookahead: TermId,
}

/// A state of the automaton. Ordered so that equal sets compare and hash
/// equal and iterate deterministically.
pub(crate) type ItemSet = BTreeSet<Lr1Item>;

impl Lr1Item {
  pub(crate) fn new(prod: usize, lookahead: TermId) -> Self {
    Self {
      prod,
      dot: 0,
      lookahead,
    }
  }

  /// The symbol right after the dot, `None` if the item is complete.
  pub(crate) fn next_symbol(&self, bnf: &Bnf) -> Option<Symbol> {
    bnf.prods[self.prod].symbols.get(self.dot).copied()
  }

  pub(crate) fn is_complete(&self, bnf: &Bnf) -> bool {
    self.dot >= bnf.prods[self.prod].symbols.len()
  }

  pub(crate) fn advance(&self) -> Self {
    Self {
      dot: self.dot + 1,
      ..*self
    }
  }

  /// Symbols after the one following the dot.
  fn rest<'a>(&self, bnf: &'a Bnf) -> &'a [Symbol] {
    let symbols = &bnf.prods[self.prod].symbols;
    symbols.get(self.dot + 1..).unwrap_or(&[])
  }
}

/// Saturates `items`: for every `[A → α·Bβ, a]` adds `[B → ·γ, b]` for each
/// production `B → γ` and each `b` in FIRST(βa).
pub(crate) fn closure(
  bnf: &Bnf,
  first: &FirstSets,
  items: ItemSet,
) -> ItemSet {
  let mut result = items;
  let mut pending = result.iter().copied().collect::<Vec<_>>();
  let mut lookaheads = TokenSet::new(bnf.terms.len());

  while let Some(item) = pending.pop() {
    let nonterm = match item.next_symbol(bnf) {
      Some(Symbol::Nonterm(id)) => id,
      _ => continue,
    };

    lookaheads.clear();
    first.first_of(&mut lookaheads, item.rest(bnf), Some(item.lookahead));

    for &prod in &bnf.nonterms[nonterm.0 as usize].prods {
      for lookahead in lookaheads.iter() {
        let new_item = Lr1Item::new(prod, lookahead);
        if result.insert(new_item) {
          pending.push(new_item);
        }
      }
    }
  }

  result
}

/// GOTO(`items`, `sym`). `None` when no item has `sym` after its dot.
pub(crate) fn goto(
  bnf: &Bnf,
  first: &FirstSets,
  items: &ItemSet,
  sym: Symbol,
) -> Option<ItemSet> {
  let kernel = items.iter()
    .filter(|item| item.next_symbol(bnf) == Some(sym))
    .map(Lr1Item::advance)
    .collect::<ItemSet>();

  if kernel.is_empty() {
    None
  } else {
    Some(closure(bnf, first, kernel))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::Grammar;
  use pretty_assertions::assert_eq;

  struct Fixture {
    bnf: Bnf,
    first: FirstSets,
  }

  impl Fixture {
    fn new(text: &str) -> Self {
      let mut grammar = Grammar::parse(text).unwrap();
      grammar.augment().unwrap();
      let prods = grammar.productions().unwrap();
      let bnf = Bnf::new(&grammar, &prods).unwrap();
      let first = FirstSets::new(&bnf);
      Fixture {
        bnf,
        first,
      }
    }

    fn sym(&self, name: &str) -> Symbol {
      self.bnf.symbol(name).unwrap()
    }

    fn start(&self) -> ItemSet {
      let kernel = vec![Lr1Item::new(0, self.bnf.eof())].into_iter().collect();
      closure(&self.bnf, &self.first, kernel)
    }

    fn render(&self, items: &ItemSet) -> Vec<String> {
      items.iter()
        .map(|item| {
          let prod = &self.bnf.prods[item.prod];
          let mut rhs = prod.symbols.iter()
            .map(|&sym| self.bnf.name(sym).to_owned())
            .collect::<Vec<_>>();
          rhs.insert(item.dot, ".".to_owned());
          format!("{} -> {}, {}",
            self.bnf.nonterm_name(prod.nonterm_id),
            rhs.join(" "),
            self.bnf.term_name(item.lookahead))
        })
        .collect()
    }
  }

  const EXPR: &str = r#"
    E -> E + T | T
    T -> T * F | F
    F -> ( E ) | id
  "#;

  #[test]
  fn next_symbol_and_advance() {
    let f = Fixture::new(EXPR);
    // E → E + T
    let item = Lr1Item::new(1, f.bnf.eof());

    assert_eq!(item.next_symbol(&f.bnf), Some(f.sym("E")));
    let item = item.advance().advance().advance();
    assert_eq!(item.next_symbol(&f.bnf), None);
    assert!(item.is_complete(&f.bnf));
  }

  #[test]
  fn initial_closure() {
    let f = Fixture::new(EXPR);

    assert_eq!(f.render(&f.start()), vec![
      "E' -> . E, $",
      "E -> . E + T, +",
      "E -> . E + T, $",
      "E -> . T, +",
      "E -> . T, $",
      "F -> . ( E ), *",
      "F -> . ( E ), +",
      "F -> . ( E ), $",
      "F -> . id, *",
      "F -> . id, +",
      "F -> . id, $",
      "T -> . T * F, *",
      "T -> . T * F, +",
      "T -> . T * F, $",
      "T -> . F, *",
      "T -> . F, +",
      "T -> . F, $",
    ]);
  }

  #[test]
  fn closure_is_idempotent() {
    let f = Fixture::new(EXPR);
    let state = f.start();

    assert_eq!(closure(&f.bnf, &f.first, state.clone()), state);

    let next = goto(&f.bnf, &f.first, &state, f.sym("(")).unwrap();
    assert_eq!(closure(&f.bnf, &f.first, next.clone()), next);
  }

  #[test]
  fn goto_inside_parens_changes_lookaheads() {
    let f = Fixture::new(EXPR);
    let state = goto(&f.bnf, &f.first, &f.start(), f.sym("(")).unwrap();
    let state = goto(&f.bnf, &f.first, &state, f.sym("id")).unwrap();

    assert_eq!(f.render(&state), vec![
      "F -> id ., )",
      "F -> id ., *",
      "F -> id ., +",
    ]);
  }

  #[test]
  fn goto_without_transition() {
    let f = Fixture::new(EXPR);
    let state = f.start();

    assert_eq!(goto(&f.bnf, &f.first, &state, f.sym(")")), None);
    assert_eq!(goto(&f.bnf, &f.first, &state, f.sym("+")), None);
  }

  #[test]
  fn empty_production_items_are_complete() {
    let f = Fixture::new("S -> ( S ) S | ε");

    assert_eq!(f.render(&f.start()), vec![
      "S' -> . S, $",
      "S -> . ( S ) S, $",
      "S -> ., $",
    ]);
    let complete = f.start().iter()
      .filter(|item| item.is_complete(&f.bnf))
      .count();
    assert_eq!(complete, 1);
  }
}
