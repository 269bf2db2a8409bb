//! # Error Types
//!
//! General error handling for the symbol checker.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! All variants here are *fatal* conditions: once any of them occurs the
//! symbol table can no longer be trusted and the whole run aborts. A single
//! rule failing to compile or evaluate is deliberately NOT represented here;
//! that is a recoverable, per-rule condition handled inside the rule engine.

use thiserror::Error;

/// Main error type for symbol-check operations
///
/// ## Error Categories
///
/// 1. **Input errors**: TargetNotFound, LibraryNotFound
/// 2. **Object-format errors**: NotAnObject, UnsupportedArchitecture
/// 3. **Graph errors**: CircularDependency
/// 4. **Rule-file errors**: RuleFileUnreadable, RuleFileInvalid
/// 5. **I/O errors**: Io (for file operations, etc.)
#[derive(Error, Debug)]
pub enum CheckError
{
    /// The file named on the command line does not exist or is not a
    /// regular file.
    #[error("Target file is not a file: {0}")]
    TargetNotFound(String),

    /// A library required (directly or transitively) by the target could
    /// not be located under any of the search roots.
    ///
    /// This is not recoverable: the resolver cannot produce a partial
    /// symbol table, because rules evaluated against one would give
    /// misleading answers.
    #[error("Can't find the needed lib {0}")]
    LibraryNotFound(String),

    /// A file was found but could not be parsed as a recognized
    /// object-file format.
    #[error("Can't read input file {path} - Seems not to be an elf: {source}")]
    NotAnObject
    {
        /// Path of the offending file
        path: String,
        /// Parse error from the object reader
        source: object::read::Error,
    },

    /// The binary's declared machine architecture is not one we can
    /// decode dynamic-linking records for.
    ///
    /// Only x86-64 and i386 layouts are supported; the width of a
    /// dynamic-entry record depends on the architecture, so anything
    /// else must be rejected rather than guessed at.
    #[error("Unsupported machine architecture: {0}")]
    UnsupportedArchitecture(String),

    /// The library dependency graph contains a cycle.
    ///
    /// Resolution is a recursive traversal with no memoization; a cycle
    /// would recurse forever, so it is detected and aborted explicitly.
    #[error("Circular library dependency involving {0}")]
    CircularDependency(String),

    /// The rule file could not be read from disk.
    #[error("Can't read rules file {path}: {source}")]
    RuleFileUnreadable
    {
        /// Path of the rule file
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The rule file was read but is not a valid JSON array of rule
    /// records.
    #[error("Can't parse rules file {path}: {source}")]
    RuleFileInvalid
    {
        /// Path of the rule file
        path: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, CheckError>`
pub type Result<T> = std::result::Result<T, CheckError>;
