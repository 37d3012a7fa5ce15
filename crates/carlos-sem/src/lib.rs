//! carlos-sem — semantic analysis and type checking for Carlos programs.
//!
//! This crate turns a raw [`carlos_par::ast::Ast`] into a resolved
//! [`ast::Program`] in which every identifier has become a direct
//! reference to its entity and every expression carries its resolved
//! type, or rejects the program with the first [`error::AnalysisError`]
//! it finds. [`analysis::Analyzer`] is the entry point.
//!
//! # Modules
//!
//! - [`types`] — the resolved type model and its equivalence/assignability rules.
//! - [`entity`] — what a name in scope can be bound to.
//! - [`scope`] — the nested-context chain used to resolve names.
//! - [`prelude`] — the standard-library bindings seeded into a root context.
//! - [`ast`] — the resolved AST the analyzer produces.
//! - [`error`] — the analyzer's single external error shape.
//! - [`analysis`] — the analyzer itself.

pub mod analysis;
pub mod ast;
pub mod entity;
pub mod error;
pub mod prelude;
pub mod scope;
pub mod types;

pub use analysis::{Analyzer, PreludeOption};
pub use ast::Program;
pub use entity::Entity;
pub use error::AnalysisError;
pub use prelude::Prelude;
pub use scope::Context;
pub use types::{Type, Types};
