use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use crate::bnf::*;
use crate::error::Error;
use super::state::States;

/// An ACTION table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
  /// Push the state and consume the lookahead.
  Shift(usize),
  /// Reduce by the production with this number.
  Reduce(usize),
  Accept,
}

impl Display for Action {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Action::Shift(state) => write!(f, "s{}", state),
      Action::Reduce(prod) => write!(f, "r{}", prod),
      Action::Accept => write!(f, "acc"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
  ShiftReduce,
  ReduceReduce,
}

impl Display for ConflictKind {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      ConflictKind::ShiftReduce => write!(f, "Shift-Reduce"),
      ConflictKind::ReduceReduce => write!(f, "Reduce-Reduce"),
    }
  }
}

/// Two different actions computed for one ACTION cell. The first one is
/// kept in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
  pub kind: ConflictKind,
  pub state: usize,
  pub symbol: String,
  pub kept: Action,
  pub rejected: Action,
}

impl Display for Conflict {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} conflict at state {} on '{}': {} vs {}",
      self.kind, self.state, self.symbol, self.kept, self.rejected)
  }
}

#[derive(Default)]
pub(crate) struct Table {
  pub(crate) action: HashMap<(u32, TermId), Action>,
  pub(crate) goto: HashMap<(u32, NontermId), u32>,
}

impl Table {
  pub(crate) fn action(&self, state: usize, term: TermId) -> Option<Action> {
    self.action.get(&(state as u32, term)).copied()
  }

  pub(crate) fn goto(&self, state: usize, nonterm: NontermId) -> Option<usize> {
    self.goto.get(&(state as u32, nonterm)).map(|&s| s as usize)
  }

  /// Keeps an existing different entry and reports the conflict.
  fn set_action(
    &mut self,
    bnf: &Bnf,
    conflicts: &mut Vec<Conflict>,
    state: usize,
    term: TermId,
    action: Action,
  ) {
    let kept = *self.action.entry((state as u32, term)).or_insert(action);
    if kept == action {
      return;
    }

    let kind = match (kept, action) {
      (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
      _ => ConflictKind::ReduceReduce,
    };
    let conflict = Conflict {
      kind,
      state,
      symbol: bnf.term_name(term).to_owned(),
      kept,
      rejected: action,
    };
    log::warn!("{}", conflict);
    conflicts.push(conflict);
  }
}

/// Builds the ACTION and GOTO tables. Conflicts never abort the build.
pub(super) fn gen_table(
  bnf: &Bnf,
  states: &States,
) -> Result<(Table, Vec<Conflict>), Error> {
  let mut table = Table::default();
  let mut conflicts = vec![];

  for (state_ix, (items, _)) in states.states.iter().enumerate() {
    for item in items {
      if item.prod >= bnf.prods.len() {
        return Err(Error::Inconsistent {
          state: state_ix,
          detail: format!("item refers to unknown production {}", item.prod),
        });
      }

      match item.next_symbol(bnf) {
        Some(sym) => {
          let target = states.transition(state_ix, sym)
            .ok_or_else(|| Error::Inconsistent {
              state: state_ix,
              detail: format!("no transition on '{}'", bnf.name(sym)),
            })?;
          match sym {
            Symbol::Term(term) => {
              table.set_action(bnf, &mut conflicts, state_ix, term,
                Action::Shift(target));
            }
            Symbol::Nonterm(nonterm) => {
              table.goto.insert((state_ix as u32, nonterm), target as u32);
            }
          }
        }
        None if bnf.prods[item.prod].nonterm_id == bnf.start
          && item.lookahead == bnf.eof() => {
          table.set_action(bnf, &mut conflicts, state_ix, item.lookahead,
            Action::Accept);
        }
        None => {
          table.set_action(bnf, &mut conflicts, state_ix, item.lookahead,
            Action::Reduce(item.prod));
        }
      }
    }
  }

  log::info!("parsing table: {} states, {} ACTION entries, {} GOTO entries, {} conflicts",
    states.len(), table.action.len(), table.goto.len(), conflicts.len());

  Ok((table, conflicts))
}
