//! carlos-par - Parse-tree type definitions.
//!
//! This crate is deliberately not a parser: it defines the node variants
//! the Carlos lexer/grammar (out of scope here, per the analyzer's own
//! contract) is documented to produce, and nothing else. `carlos-sem`
//! depends only on these types, never on a concrete parsing algorithm.

pub mod ast;

pub use ast::Ast;
