//! Views of the generated artifacts for display layers.

use std::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use crate::bnf::Symbol;
use super::item::Lr1Item;
use super::table::Action;
use super::Parser;

/// One item of a state, with the right-hand side rendered around a `•`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
  pub lhs: String,
  pub rhs: String,
  pub lookahead: String,
}

/// A transition of the LR(1) automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
  pub from: usize,
  pub symbol: String,
  pub to: usize,
  /// `true` for terminals (shift edges), `false` for GOTO edges.
  pub terminal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub productions: usize,
  pub states: usize,
  pub action_entries: usize,
  pub goto_entries: usize,
  pub conflicts: usize,
}

/// The ACTION and GOTO tables as a dense grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDump {
  /// ACTION columns: terminals in name order, then `$`
  pub terminals: Vec<String>,
  /// GOTO columns: non-terminals in name order, without the augmented start
  pub nonterminals: Vec<String>,
  /// `action[state][column]`
  pub action: Vec<Vec<Option<Action>>>,
  /// `goto[state][column]`
  pub goto: Vec<Vec<Option<usize>>>,
}

impl TableDump {
  pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
    let column = self.terminals.iter().position(|t| t == terminal)?;
    self.action.get(state)?.get(column).copied().flatten()
  }

  pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
    let column = self.nonterminals.iter().position(|nt| nt == nonterminal)?;
    self.goto.get(state)?.get(column).copied().flatten()
  }
}

impl Display for TableDump {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let mut rows = vec![];
    let mut header = vec!["State".to_owned()];
    header.extend(self.terminals.iter().cloned());
    header.extend(self.nonterminals.iter().cloned());
    rows.push(header);

    for (state, (actions, gotos)) in self.action.iter().zip(&self.goto).enumerate() {
      let mut row = vec![state.to_string()];
      row.extend(actions.iter()
        .map(|a| a.map(|a| a.to_string()).unwrap_or_default()));
      row.extend(gotos.iter()
        .map(|g| g.map(|g| g.to_string()).unwrap_or_default()));
      rows.push(row);
    }

    let columns = 1 + self.terminals.len() + self.nonterminals.len();
    let widths = (0..columns)
      .map(|c| rows.iter().map(|row| row[c].chars().count()).max().unwrap_or(0))
      .collect::<Vec<_>>();

    for row in &rows {
      let mut line = String::new();
      for (c, cell) in row.iter().enumerate() {
        if c == 1 || c == 1 + self.terminals.len() {
          line.push_str(" |");
        }
        if c > 0 {
          line.push(' ');
        }
        line.push_str(&format!("{:<width$}", cell, width = widths[c]));
      }
      writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
  }
}

impl Parser {
  /// `"1. E → E + T"` lines, without the augmented production.
  pub fn production_list(&self) -> Vec<String> {
    self.productions.iter()
      .enumerate()
      .skip(1)
      .map(|(i, prod)| format!("{}. {}", i, prod))
      .collect()
  }

  /// Items of every state keyed `I0`, `I1`, ...
  pub fn item_sets(&self) -> IndexMap<String, Vec<ItemView>> {
    self.states.states.keys()
      .enumerate()
      .map(|(i, items)| {
        let views = items.iter().map(|item| self.item_view(item)).collect();
        (format!("I{}", i), views)
      })
      .collect()
  }

  fn item_view(&self, item: &Lr1Item) -> ItemView {
    let prod = &self.productions[item.prod];
    let before = prod.rhs[..item.dot].join(" ");
    let after = prod.rhs[item.dot..].join(" ");

    let rhs = match (before.is_empty(), after.is_empty()) {
      (true, true) => "•".to_owned(),
      (false, false) => format!("{} • {}", before, after),
      (false, true) => format!("{} •", before),
      (true, false) => format!("• {}", after),
    };

    ItemView {
      lhs: prod.lhs.clone(),
      rhs,
      lookahead: self.bnf.term_name(item.lookahead).to_owned(),
    }
  }

  pub fn table_dump(&self) -> TableDump {
    let terminals = self.bnf.terms.clone();
    let nonterminals = self.grammar.nonterminals().iter()
      .filter(|nt| nt.as_str() != self.grammar.start())
      .cloned()
      .collect::<Vec<_>>();

    let mut action = vec![];
    let mut goto = vec![];
    for state in 0..self.states.len() {
      action.push(terminals.iter()
        .map(|t| self.action(state, t))
        .collect());
      goto.push(nonterminals.iter()
        .map(|nt| self.goto(state, nt))
        .collect());
    }

    TableDump {
      terminals,
      nonterminals,
      action,
      goto,
    }
  }

  /// Automaton edges ordered by source state, then by symbol name.
  pub fn transitions(&self) -> Vec<Edge> {
    self.states.states.values()
      .enumerate()
      .flat_map(|(from, state)| {
        state.transitions.iter().map(move |(&sym, &to)| Edge {
          from,
          symbol: self.bnf.name(sym).to_owned(),
          to: to as usize,
          terminal: matches!(sym, Symbol::Term(_)),
        })
      })
      .collect()
  }

  /// States holding the complete augmented item `[S' → S •, $]`.
  pub fn accepting_states(&self) -> Vec<usize> {
    (0..self.states.len())
      .filter(|&i| {
        self.states.items(i).map_or(false, |items| {
          items.iter().any(|item| item.prod == 0 && item.is_complete(&self.bnf))
        })
      })
      .collect()
  }

  pub fn summary(&self) -> Summary {
    Summary {
      productions: self.productions.len(),
      states: self.states.len(),
      action_entries: self.table.action.len(),
      goto_entries: self.table.goto.len(),
      conflicts: self.conflicts.len(),
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::grammar::Grammar;
  use crate::parser::*;
  use insta::assert_snapshot;
  use pretty_assertions::assert_eq;

  const EXPR: &str = r#"
    E -> E + T | T
    T -> T * F | F
    F -> ( E ) | id
  "#;

  fn parser(text: &str) -> Parser {
    Parser::new(Grammar::parse(text).unwrap()).unwrap()
  }

  fn view(lhs: &str, rhs: &str, lookahead: &str) -> ItemView {
    ItemView {
      lhs: lhs.to_owned(),
      rhs: rhs.to_owned(),
      lookahead: lookahead.to_owned(),
    }
  }

  #[test]
  fn production_list_hides_augmented_production() {
    let parser = parser(EXPR);

    assert_eq!(parser.production_list(), vec![
      "1. E → E + T",
      "2. E → T",
      "3. F → ( E )",
      "4. F → id",
      "5. T → T * F",
      "6. T → F",
    ]);
  }

  #[test]
  fn item_views() {
    let parser = parser("S -> ( S ) S | ε");
    let sets = parser.item_sets();

    assert_eq!(sets.len(), 10);
    assert_eq!(sets["I0"], vec![
      view("S'", "• S", "$"),
      view("S", "• ( S ) S", "$"),
      view("S", "•", "$"),
    ]);
    assert_eq!(sets["I2"], vec![view("S'", "S •", "$")]);
    assert_eq!(sets.get_index(3).unwrap().0, "I3");
  }

  #[test]
  fn item_views_inside_parens() {
    let parser = parser(EXPR);
    let sets = parser.item_sets();

    assert_eq!(sets.len(), parser.state_count());
    assert_eq!(sets["I0"].len(), 17);
    assert_eq!(sets["I2"], vec![
      view("E'", "E •", "$"),
      view("E", "E • + T", "+"),
      view("E", "E • + T", "$"),
    ]);
  }

  #[test]
  fn table_dump() {
    let parser = parser("S -> ( S ) S | ε");
    let dump = parser.table_dump();

    assert_eq!(dump.terminals, vec!["(", ")", "$"]);
    assert_eq!(dump.nonterminals, vec!["S"]);
    assert_eq!(dump.action(0, "$"), Some(Action::Reduce(2)));
    assert_eq!(dump.action(2, "$"), Some(Action::Accept));
    assert_eq!(dump.action(2, "("), None);
    assert_eq!(dump.action(0, "x"), None);
    assert_eq!(dump.goto(0, "S"), Some(2));
    assert_eq!(dump.goto(0, "S'"), None);

    assert_snapshot!(dump.to_string(), @r###"
    State | (  )  $   | S
    0     | s1    r2  | 2
    1     | s3 r2     | 4
    2     |       acc |
    3     | s3 r2     | 5
    4     |    s6     |
    5     |    s7     |
    6     | s1    r2  | 8
    7     | s3 r2     | 9
    8     |       r1  |
    9     |    r1     |
    "###);
  }

  #[test]
  fn transitions() {
    let parser = parser("S -> ( S ) S | ε");
    let edges = parser.transitions()
      .into_iter()
      .map(|e| format!("{} -{}-> {}", e.from, e.symbol, e.to))
      .collect::<Vec<_>>();

    assert_eq!(edges, vec![
      "0 -(-> 1",
      "0 -S-> 2",
      "1 -(-> 3",
      "1 -S-> 4",
      "3 -(-> 3",
      "3 -S-> 5",
      "4 -)-> 6",
      "5 -)-> 7",
      "6 -(-> 1",
      "6 -S-> 8",
      "7 -(-> 3",
      "7 -S-> 9",
    ]);
    assert!(parser.transitions()[0].terminal);
    assert!(!parser.transitions()[1].terminal);
  }

  #[test]
  fn edges_match_the_tables() {
    let parser = parser(EXPR);

    for edge in parser.transitions() {
      if edge.terminal {
        assert_eq!(parser.action(edge.from, &edge.symbol), Some(Action::Shift(edge.to)));
      } else {
        assert_eq!(parser.goto(edge.from, &edge.symbol), Some(edge.to));
      }
    }
  }

  #[test]
  fn accepting_states() {
    assert_eq!(parser(EXPR).accepting_states(), vec![2]);
    assert_eq!(parser("S -> ( S ) S | ε").accepting_states(), vec![2]);
  }

  #[test]
  fn summary() {
    let summary = parser("S -> A | B\nA -> x\nB -> x").summary();

    assert_eq!(summary, Summary {
      productions: 5,
      states: 5,
      action_entries: 5,
      goto_entries: 3,
      conflicts: 1,
    });
  }
}
