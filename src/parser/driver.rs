//! The shift-reduce automaton driven by the ACTION and GOTO tables.

use std::fmt::{self, Display, Formatter};
use crate::bnf::Bnf;
use crate::grammar::{rhs_label, Production, END_MARKER};
use super::table::{Action, Table};

/// One applied reduction: `lhs → rhs` by production number `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
  pub lhs: String,
  pub rhs: Vec<String>,
  pub production: usize,
}

impl Display for Reduction {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} → {}", self.lhs, rhs_label(&self.rhs))
  }
}

/// What the automaton did in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
  Shift(usize),
  Reduce(Reduction),
  Accept,
  /// No ACTION entry for the current state and lookahead.
  NoAction,
  /// No GOTO entry after a reduction; the table is broken.
  MissingGoto {
    state: usize,
    nonterminal: String,
  },
  /// Any other contradiction in the tables.
  Internal(String),
}

impl Display for StepAction {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      StepAction::Shift(state) => write!(f, "Shift {}", state),
      StepAction::Reduce(r) => write!(f, "Reduce {}: {}", r.production, r),
      StepAction::Accept => write!(f, "ACCEPT"),
      StepAction::NoAction => write!(f, "ERROR: No action defined"),
      StepAction::MissingGoto { state, nonterminal } =>
        write!(f, "ERROR: No GOTO({}, {})", state, nonterminal),
      StepAction::Internal(detail) => write!(f, "ERROR: {}", detail),
    }
  }
}

/// A snapshot taken after each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
  pub index: usize,
  pub states: Vec<usize>,
  pub symbols: Vec<String>,
  /// remaining input, ending with `$`
  pub input: Vec<String>,
  pub action: StepAction,
  /// state pushed by a shift or by the goto after a reduction
  pub goto: Option<usize>,
}

impl Step {
  pub fn stack_label(&self) -> String {
    self.states.iter()
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join(" ")
  }

  pub fn symbols_label(&self) -> String {
    self.symbols.join(" ")
  }

  pub fn input_label(&self) -> String {
    self.input.join(" ")
  }

  /// `→ n`, or an empty string when nothing was pushed.
  pub fn goto_label(&self) -> String {
    match self.goto {
      Some(state) => format!("→ {}", state),
      None => String::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Accepted,
  /// The input is not in the language.
  Rejected {
    state: usize,
    lookahead: String,
  },
  /// The tables contradict themselves. Never produced by a table built from
  /// the same grammar.
  Inconsistent {
    state: usize,
    detail: String,
  },
}

/// Everything recorded by one parse.
#[derive(Debug, Clone)]
pub struct ParseTrace {
  steps: Vec<Step>,
  reductions: Vec<Reduction>,
  outcome: Outcome,
  start: String,
}

impl ParseTrace {
  pub fn steps(&self) -> &[Step] {
    &self.steps
  }

  pub fn outcome(&self) -> &Outcome {
    &self.outcome
  }

  pub fn is_accepted(&self) -> bool {
    self.outcome == Outcome::Accepted
  }

  /// Reductions in the order they were applied, even if the input was
  /// rejected later.
  pub fn reductions(&self) -> &[Reduction] {
    &self.reductions
  }

  /// The derivation of an accepted input, bottom-up. Read backwards it is
  /// the rightmost derivation from the start symbol.
  pub fn derivation(&self) -> Option<&[Reduction]> {
    if self.is_accepted() {
      Some(&self.reductions)
    } else {
      None
    }
  }

  /// Sentential forms of the rightmost derivation, from the start symbol
  /// down to the input tokens.
  pub fn sentential_forms(&self) -> Option<Vec<Vec<String>>> {
    let derivation = self.derivation()?;

    let mut form = vec![self.start.clone()];
    let mut forms = vec![form.clone()];
    for reduction in derivation.iter().rev() {
      // everything right of the rightmost non-terminal is terminals, and
      // terminals never share a name with a non-terminal
      let pos = form.iter().rposition(|sym| *sym == reduction.lhs)?;
      form.splice(pos..=pos, reduction.rhs.iter().cloned());
      forms.push(form.clone());
    }
    Some(forms)
  }
}

/// Runs the automaton over `tokens`. Reductions between two shifts are
/// bounded through `state_count`, so a conflicted table that keeps an
/// ε-reduce ends with `Outcome::Inconsistent` instead of growing the stack.
pub(super) fn run(
  bnf: &Bnf,
  table: &Table,
  prods: &[Production],
  state_count: usize,
  start: &str,
  tokens: Vec<String>,
) -> ParseTrace {
  let mut input = tokens;
  input.push(END_MARKER.to_owned());

  let mut pos = 0;
  let mut states = vec![0];
  let mut symbols = vec![END_MARKER.to_owned()];
  let mut steps = vec![];
  let mut reductions = vec![];
  let mut limit = reduce_limit(states.len(), state_count, prods.len());
  let mut reduces_since_shift = 0;

  let outcome = loop {
    let state = states[states.len() - 1];
    let lookahead = input.get(pos).map(String::as_str).unwrap_or(END_MARKER);
    let action = bnf.term_ids.get(lookahead)
      .and_then(|&term| table.action(state, term));

    match action {
      None => {
        record(&mut steps, &states, &symbols, remaining(&input, pos),
          StepAction::NoAction, None);
        break Outcome::Rejected {
          state,
          lookahead: lookahead.to_owned(),
        };
      }

      Some(Action::Accept) => {
        record(&mut steps, &states, &symbols, remaining(&input, pos),
          StepAction::Accept, None);
        break Outcome::Accepted;
      }

      Some(Action::Shift(next)) => {
        states.push(next);
        symbols.push(lookahead.to_owned());
        pos += 1;
        reduces_since_shift = 0;
        limit = reduce_limit(states.len(), state_count, prods.len());
        record(&mut steps, &states, &symbols, remaining(&input, pos),
          StepAction::Shift(next), Some(next));
      }

      Some(Action::Reduce(prod_ix)) => {
        if reduces_since_shift >= limit {
          let detail = format!("no progress after {} reductions on `{}`",
            reduces_since_shift, lookahead);
          log::error!("{} in state {}", detail, state);
          record(&mut steps, &states, &symbols, remaining(&input, pos),
            StepAction::Internal(detail.clone()), None);
          break Outcome::Inconsistent {
            state,
            detail,
          };
        }
        reduces_since_shift += 1;

        let (prod, nonterm_id) = match (prods.get(prod_ix), bnf.prods.get(prod_ix)) {
          (Some(prod), Some(lowered)) => (prod, lowered.nonterm_id),
          _ => {
            let detail = format!("reduce by unknown production {}", prod_ix);
            record(&mut steps, &states, &symbols, remaining(&input, pos),
              StepAction::Internal(detail.clone()), None);
            break Outcome::Inconsistent {
              state,
              detail,
            };
          }
        };

        let len = prod.rhs.len();
        if states.len() <= len {
          let detail = format!("stack underflow reducing by {}", prod_ix);
          record(&mut steps, &states, &symbols, remaining(&input, pos),
            StepAction::Internal(detail.clone()), None);
          break Outcome::Inconsistent {
            state,
            detail,
          };
        }
        states.truncate(states.len() - len);
        symbols.truncate(symbols.len() - len);

        let reduction = Reduction {
          lhs: prod.lhs.clone(),
          rhs: prod.rhs.clone(),
          production: prod_ix,
        };
        reductions.push(reduction.clone());

        let top = states[states.len() - 1];
        match table.goto(top, nonterm_id) {
          Some(next) => {
            states.push(next);
            symbols.push(prod.lhs.clone());
            record(&mut steps, &states, &symbols, remaining(&input, pos),
              StepAction::Reduce(reduction), Some(next));
          }
          None => {
            log::error!("no GOTO({}, {}) after reducing by {}",
              top, prod.lhs, prod_ix);
            record(&mut steps, &states, &symbols, remaining(&input, pos),
              StepAction::MissingGoto {
                state: top,
                nonterminal: prod.lhs.clone(),
              },
              None);
            break Outcome::Inconsistent {
              state: top,
              detail: format!("no GOTO entry for `{}`", prod.lhs),
            };
          }
        }
      }
    }
  };

  ParseTrace {
    steps,
    reductions,
    outcome,
    start: start.to_owned(),
  }
}

/// Every stack entry can be rewritten by a chain of at most `prods`
/// reductions, and ε-reductions add at most one entry per state.
fn reduce_limit(height: usize, state_count: usize, prods: usize) -> usize {
  (height + state_count) * (prods + 1)
}

fn remaining(input: &[String], pos: usize) -> &[String] {
  input.get(pos..).unwrap_or(&[])
}

fn record(
  steps: &mut Vec<Step>,
  states: &[usize],
  symbols: &[String],
  input: &[String],
  action: StepAction,
  goto: Option<usize>,
) {
  let step = Step {
    index: steps.len(),
    states: states.to_vec(),
    symbols: symbols.to_vec(),
    input: input.to_vec(),
    action,
    goto,
  };
  if log::log_enabled!(log::Level::Trace) {
    log::trace!("{}: [{}] [{}] [{}] {}", step.index, step.stack_label(),
      step.symbols_label(), step.input_label(), step.action);
  }
  steps.push(step);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bnf::{Symbol, TermId};
  use crate::grammar::Grammar;
  use crate::parser::sets::FirstSets;
  use crate::parser::state::gen_states;
  use crate::parser::table::gen_table;
  use pretty_assertions::assert_eq;

  struct Fixture {
    prods: Vec<Production>,
    bnf: Bnf,
    state_count: usize,
    table: Table,
  }

  impl Fixture {
    fn new(text: &str) -> Self {
      let mut grammar = Grammar::parse(text).unwrap();
      grammar.augment().unwrap();
      let prods = grammar.productions().unwrap();
      let bnf = Bnf::new(&grammar, &prods).unwrap();
      let first = FirstSets::new(&bnf);
      let states = gen_states(&bnf, &first);
      let (table, _) = gen_table(&bnf, &states).unwrap();
      Fixture {
        prods,
        bnf,
        state_count: states.len(),
        table,
      }
    }

    fn term(&self, name: &str) -> TermId {
      match self.bnf.symbol(name) {
        Some(Symbol::Term(id)) => id,
        _ => panic!("`{}` is not a terminal", name),
      }
    }

    fn run(&self, input: &str) -> ParseTrace {
      let tokens = input.split_whitespace().map(str::to_owned).collect();
      run(&self.bnf, &self.table, &self.prods, self.state_count, "S", tokens)
    }
  }

  fn last_label(trace: &ParseTrace) -> String {
    trace.steps().last().unwrap().action.to_string()
  }

  #[test]
  fn accepts_with_intact_tables() {
    let f = Fixture::new("S -> a");
    let trace = f.run("a");

    assert!(trace.is_accepted());
    assert_eq!(trace.steps().len(), 3);
  }

  #[test]
  fn missing_goto_is_not_a_rejection() {
    let mut f = Fixture::new("S -> a");
    let s = match f.bnf.symbol("S") {
      Some(Symbol::Nonterm(id)) => id,
      _ => unreachable!(),
    };
    f.table.goto.remove(&(0, s));

    let trace = f.run("a");

    assert_eq!(trace.outcome(), &Outcome::Inconsistent {
      state: 0,
      detail: "no GOTO entry for `S`".to_owned(),
    });
    assert!(!trace.is_accepted());
    assert_eq!(trace.derivation(), None);
    assert_eq!(trace.reductions().len(), 1);
    assert_eq!(last_label(&trace), "ERROR: No GOTO(0, S)");
    assert_eq!(trace.steps().last().unwrap().action, StepAction::MissingGoto {
      state: 0,
      nonterminal: "S".to_owned(),
    });
    assert_eq!(trace.steps().last().unwrap().stack_label(), "0");
  }

  #[test]
  fn reduce_by_unknown_production() {
    let mut f = Fixture::new("S -> a");
    let a = f.term("a");
    f.table.action.insert((0, a), Action::Reduce(7));

    let trace = f.run("a");

    assert_eq!(trace.outcome(), &Outcome::Inconsistent {
      state: 0,
      detail: "reduce by unknown production 7".to_owned(),
    });
    assert_eq!(trace.steps().len(), 1);
    assert_eq!(last_label(&trace), "ERROR: reduce by unknown production 7");
  }

  #[test]
  fn reduce_below_the_stack_bottom() {
    let mut f = Fixture::new("S -> a");
    let a = f.term("a");
    f.table.action.insert((0, a), Action::Reduce(1));

    let trace = f.run("a");

    assert_eq!(trace.outcome(), &Outcome::Inconsistent {
      state: 0,
      detail: "stack underflow reducing by 1".to_owned(),
    });
    assert!(trace.reductions().is_empty());
    assert_eq!(last_label(&trace), "ERROR: stack underflow reducing by 1");
  }

  #[test]
  fn long_reduction_chains_are_not_cut_short() {
    let f = Fixture::new("S -> a S | a");
    let input = vec!["a"; 300].join(" ");

    let trace = f.run(&input);

    assert!(trace.is_accepted());
    assert_eq!(trace.reductions().len(), 300);
  }

  #[test]
  fn reduction_labels() {
    let empty = Reduction {
      lhs: "A".to_owned(),
      rhs: vec![],
      production: 1,
    };
    assert_eq!(empty.to_string(), "A → ε");
    assert_eq!(StepAction::Reduce(empty).to_string(), "Reduce 1: A → ε");
  }
}
