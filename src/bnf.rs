use std::collections::HashMap;
use crate::error::Error;
use crate::grammar::{Grammar, Production, END_MARKER};

/// Grammar lowered to integer ids, used by the table generator.
pub(crate) struct Bnf {
  /// terminal names by id; the last one is `$`
  pub(crate) terms: Vec<String>,
  pub(crate) nonterms: Vec<Nonterm>,
  pub(crate) term_ids: HashMap<String, TermId>,
  pub(crate) nonterm_ids: HashMap<String, NontermId>,
  /// indexed by production number
  pub(crate) prods: Vec<Prod>,
  pub(crate) start: NontermId,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) enum Symbol {
  Term(TermId),
  Nonterm(NontermId),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct TermId(pub(crate) u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(crate) struct NontermId(pub(crate) u32);

#[derive(Clone, Default)]
pub(crate) struct Nonterm {
  pub(crate) name: String,
  /// Production numbers in numbering order. A production equal to an
  /// earlier one of the same non-terminal is left out.
  pub(crate) prods: Vec<usize>,
}

#[derive(Clone)]
pub(crate) struct Prod {
  pub(crate) nonterm_id: NontermId,
  pub(crate) symbols: Vec<Symbol>,
}

impl Bnf {
  /// Lowers the numbered productions of an augmented grammar.
  pub(crate) fn new(grammar: &Grammar, prods: &[Production]) -> Result<Bnf, Error> {
    let mut terms = grammar.terminals().iter().cloned().collect::<Vec<_>>();
    terms.push(END_MARKER.to_owned());
    let term_ids = terms.iter()
      .enumerate()
      .map(|(i, name)| (name.clone(), TermId(i as u32)))
      .collect::<HashMap<_, _>>();

    let mut nonterms = grammar.nonterminals().iter()
      .map(|name| Nonterm {
        name: name.clone(),
        prods: vec![],
      })
      .collect::<Vec<_>>();
    let nonterm_ids = nonterms.iter()
      .enumerate()
      .map(|(i, nt)| (nt.name.clone(), NontermId(i as u32)))
      .collect::<HashMap<_, _>>();

    let start = lookup_nonterm(&nonterm_ids, grammar.start())?;

    let mut lowered: Vec<Prod> = Vec::with_capacity(prods.len());
    for (ix, prod) in prods.iter().enumerate() {
      let nonterm_id = lookup_nonterm(&nonterm_ids, &prod.lhs)?;
      let symbols = prod.rhs.iter()
        .map(|sym| match (nonterm_ids.get(sym), term_ids.get(sym)) {
          (Some(&id), _) => Ok(Symbol::Nonterm(id)),
          (None, Some(&id)) => Ok(Symbol::Term(id)),
          (None, None) => Err(Error::UnknownSymbol {
            symbol: sym.clone(),
          }),
        })
        .collect::<Result<Vec<_>, _>>()?;

      let nonterm = &mut nonterms[nonterm_id.0 as usize];
      let duplicate = nonterm.prods.iter()
        .any(|&other| lowered[other].symbols == symbols);
      if duplicate {
        log::warn!("duplicate production {}. {}", ix, prod);
      } else {
        nonterm.prods.push(ix);
      }

      lowered.push(Prod {
        nonterm_id,
        symbols,
      });
    }

    Ok(Bnf {
      terms,
      nonterms,
      term_ids,
      nonterm_ids,
      prods: lowered,
      start,
    })
  }

  pub(crate) fn eof(&self) -> TermId {
    TermId(self.terms.len() as u32 - 1)
  }

  pub(crate) fn name(&self, sym: Symbol) -> &str {
    match sym {
      Symbol::Term(id) => self.term_name(id),
      Symbol::Nonterm(id) => self.nonterm_name(id),
    }
  }

  pub(crate) fn term_name(&self, id: TermId) -> &str {
    &self.terms[id.0 as usize]
  }

  pub(crate) fn nonterm_name(&self, id: NontermId) -> &str {
    &self.nonterms[id.0 as usize].name
  }

  pub(crate) fn symbol(&self, name: &str) -> Option<Symbol> {
    if let Some(&id) = self.nonterm_ids.get(name) {
      Some(Symbol::Nonterm(id))
    } else {
      self.term_ids.get(name).map(|&id| Symbol::Term(id))
    }
  }
}

fn lookup_nonterm(
  nonterm_ids: &HashMap<String, NontermId>,
  name: &str,
) -> Result<NontermId, Error> {
  nonterm_ids.get(name)
    .copied()
    .ok_or_else(|| Error::UnknownSymbol {
      symbol: name.to_owned(),
    })
}
