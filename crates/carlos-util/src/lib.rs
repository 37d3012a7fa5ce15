//! carlos-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundational types shared by the rest of the
//! workspace: interned identifiers ([`symbol::Symbol`]), typed indices
//! ([`index_vec::IndexVec`]/[`index_vec::Idx`]), global definition ids
//! ([`DefId`]), source locations ([`span::Span`]/[`span::SourceMap`]), and
//! diagnostic reporting ([`diagnostic::Handler`]/[`diagnostic::DiagnosticBuilder`]).
//!
//! None of these are specific to any one source language; they are the
//! plumbing every later analysis stage is built on.

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

// Re-export commonly used hash collections.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
