//! # symcheck-core
//!
//! Symbol-table resolution and rule evaluation for symcheck.
//!
//! This crate provides the two pieces of the checker with non-trivial
//! logic:
//! - the **dependency resolver**: builds one unified symbol table for a
//!   binary and everything it transitively depends on;
//! - the **rule engine**: compiles a small predicate DSL into boolean
//!   expressions and evaluates them against that table.
//!
//! The thin CLI in the `symcheck` crate wires the two together. Data flows
//! one way: [`resolver::resolve`] produces a [`types::SymbolTable`], the
//! rule engine consumes it read-only.
//!
//! Everything is synchronous and single-threaded; any unresolvable library
//! or unreadable binary is a fatal, whole-run-aborting [`error::CheckError`],
//! while a single malformed rule is reported and the remaining rules still
//! run.

pub mod error;
pub mod resolver;
pub mod rules;
pub mod types;

// Re-export commonly used types
pub use error::{CheckError, Result};
pub use resolver::resolve;
pub use rules::{evaluate_rules, load_rules, EvalContext, RuleRecord};
pub use types::{SymbolEntry, SymbolTable};
