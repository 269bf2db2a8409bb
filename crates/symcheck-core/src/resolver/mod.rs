//! # Dependency Resolver
//!
//! Builds one unified [`SymbolTable`] for a binary and everything it
//! transitively depends on.
//!
//! Resolution is a depth-first recursive traversal: extract the symbols of
//! the file itself, then resolve each `DT_NEEDED` library and merge its
//! table in. Tables merge with "closer to the root wins" semantics for
//! scalar fields and set union for the used-in footprint (see
//! [`SymbolTable::merge_dependency`]).
//!
//! There is no memoization: a library required along two different paths
//! of the graph is parsed twice. That is correctness-neutral because the
//! merge policy is order-stable for scalars. Cycles, on the other hand,
//! would recurse forever, so the traversal tracks the set of in-progress
//! canonical paths and aborts with [`CheckError::CircularDependency`] when
//! it meets one again.

pub mod elf;
pub mod search;

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{CheckError, Result};
use crate::types::SymbolTable;
use elf::ObjectData;
use search::find_library;

/// Resolve `path` and its full transitive dependency closure into one
/// merged symbol table.
///
/// Fails fatally if `path` (or any transitively required library name)
/// cannot be located under `roots`, if a file cannot be parsed as an
/// object, if an architecture is unsupported, or if the library graph
/// contains a cycle. There is no partial result.
pub fn resolve(path: &str, roots: &[PathBuf]) -> Result<SymbolTable>
{
    let mut in_progress = HashSet::new();
    resolve_recursive(path, roots, &mut in_progress)
}

fn resolve_recursive(name: &str, roots: &[PathBuf], in_progress: &mut HashSet<PathBuf>) -> Result<SymbolTable>
{
    let located = find_library(name, roots)?;
    // Cycle guard keys on the canonical path so the same library reached
    // under two spellings is still recognized.
    let canonical = fs::canonicalize(&located).unwrap_or_else(|_| located.clone());
    if !in_progress.insert(canonical.clone()) {
        return Err(CheckError::CircularDependency(name.to_string()));
    }

    debug!(name, located = %located.display(), "resolving");
    let object = ObjectData::open(&located)?;
    // Symbols are recorded under the requested name, not the located
    // path; that is the name rule authors refer to.
    let mut table = object.extract_symbols(name)?;
    let needed = object.required_libraries()?;
    drop(object);

    for dep in needed {
        let dep_table = resolve_recursive(&dep, roots, in_progress)?;
        table.merge_dependency(dep_table);
    }

    in_progress.remove(&canonical);
    debug!(name, symbols = table.len(), "resolved");
    Ok(table)
}
