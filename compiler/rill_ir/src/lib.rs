//! Rill IR - Core data model for the Rill toolchain.
//!
//! This crate defines the pieces every other crate builds on:
//!
//! - `Pos` / `SourceRange`: line/column positions used by hover and
//!   diagnostics.
//! - `VCObjectHash`: the content address of a version-controlled object.
//! - `ExtIdent` / `Pinned`: identifier and resolution tags carried by the
//!   elaborated AST.
//! - `Type` / `TypeScheme`: the surface type terms.
//! - `Expr` / `Pat`: the fully pinned, elaborated expression tree that the
//!   evaluator walks.
//!
//! The parser and the inferencer are external collaborators; everything in
//! this crate is their *output* shape, not their implementation.

mod expr;
mod hash;
mod ident;
mod span;
mod types;

pub use expr::{Expr, Pat, StrChunk};
pub use hash::VCObjectHash;
pub use ident::{ExtIdent, Ident, Pinned};
pub use span::{Pos, SourceRange};
pub use types::{Type, TypeScheme};
