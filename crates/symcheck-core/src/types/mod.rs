//! # Types
//!
//! Core data model shared by the resolver and the rule engine.

pub mod symbols;

// Re-export all public types
pub use symbols::{SymbolEntry, SymbolTable};
