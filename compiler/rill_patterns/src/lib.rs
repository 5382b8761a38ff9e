//! Rill Patterns - usefulness and exhaustiveness over pattern matrices.
//!
//! Works on a generalized constructor/wildcard lattice rather than source
//! patterns: wildcards, optionals, tuples, enum tags, and literals of
//! order-enumerable ("infinite") domains. A matrix is a list of
//! equal-width pattern rows; the analysis decides whether a candidate row
//! can match anything the matrix misses, proves a matrix exhaustive or
//! synthesizes a missing witness, and reports rows shadowed by earlier
//! ones.
//!
//! `lower` bridges from the elaborated source patterns in `rill_ir`.

mod lower;
mod usefulness;

pub use lower::{check_case, lower_pat, CaseReport};
pub use usefulness::{
    check_usefulness, col, complete_signature, con_names, default_matrix, exhaustive, is_useful,
    specialize, Con, EnumSigs, InfCon, Overlap, Pattern, Signature,
};
