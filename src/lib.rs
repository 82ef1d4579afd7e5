//! A canonical LR(1) parser generator and table-driven parser.
//!
//! ```
//! let parser = lr1::build("E -> E + T | T\nT -> id").unwrap();
//! let trace = parser.parse("id + id").unwrap();
//! assert!(trace.is_accepted());
//! ```

pub mod error;
pub mod grammar;
pub mod parser;
mod bnf;

pub use error::Error;
pub use grammar::{Grammar, GrammarOptions, Production};
pub use parser::{
  Action, Conflict, ConflictKind, Edge, ItemView, Outcome, ParseTrace,
  Parser, Reduction, Step, StepAction, Summary, TableDump,
};

/// Reads grammar text and builds its parser.
pub fn build(text: &str) -> Result<Parser, Error> {
  build_with(text, &GrammarOptions::new())
}

pub fn build_with(text: &str, options: &GrammarOptions) -> Result<Parser, Error> {
  Parser::new(Grammar::parse_with(text, options)?)
}
