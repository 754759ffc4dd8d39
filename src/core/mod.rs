//! Core data types produced by a parse.
//!
//! `Binary` owns the ordered `Section` and `Symbol` lists; all three are
//! immutable once the loader returns them.

pub mod binary;
pub mod section;
pub mod symbol;
