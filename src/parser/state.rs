use crate::bnf::*;
use indexmap::IndexMap;
use super::item::{closure, goto, ItemSet, Lr1Item};
use super::sets::FirstSets;

/// The canonical collection of LR(1) item sets. The index of an item set
/// in `states` is its state number.
pub(crate) struct States {
  pub(crate) states: IndexMap<ItemSet, State>,
}

#[derive(Default)]
pub(crate) struct State {
  /// symbol -> index of target state, in symbol name order
  pub(crate) transitions: IndexMap<Symbol, u32>,
}

impl States {
  pub(crate) fn len(&self) -> usize {
    self.states.len()
  }

  pub(crate) fn items(&self, state: usize) -> Option<&ItemSet> {
    self.states.get_index(state).map(|(items, _)| items)
  }

  pub(crate) fn transition(&self, state: usize, sym: Symbol) -> Option<usize> {
    self.states.get_index(state)
      .and_then(|(_, s)| s.transitions.get(&sym))
      .map(|&target| target as usize)
  }
}

pub(super) fn gen_states(
  bnf: &Bnf,
  first: &FirstSets,
) -> States {
  let mut states = IndexMap::new();

  let kernel = std::iter::once(Lr1Item::new(0, bnf.eof())).collect();
  states.insert(closure(bnf, first, kernel), State::default());

  // states are processed in discovery order, so `i` is the worklist head
  let mut i = 0;
  while let Some((items, _)) = states.get_index(i) {
    let items = items.clone();

    let mut symbols = items.iter()
      .filter_map(|item| item.next_symbol(bnf))
      .collect::<Vec<_>>();
    symbols.sort_by(|&a, &b| bnf.name(a).cmp(bnf.name(b)));
    symbols.dedup();

    for sym in symbols {
      let target = match goto(bnf, first, &items, sym) {
        Some(target) => target,
        None => continue,
      };

      let target_ix = match states.get_index_of(&target) {
        Some(ix) => ix,
        None => {
          let len = target.len();
          let (ix, _) = states.insert_full(target, State::default());
          log::debug!("I{} (from I{} on '{}'): {} items",
            ix, i, bnf.name(sym), len);
          ix
        }
      };

      if let Some((_, state)) = states.get_index_mut(i) {
        state.transitions.insert(sym, target_ix as u32);
      }
    }

    i += 1;
  }

  log::debug!("{} LR(1) states", states.len());

  States {
    states,
  }
}
