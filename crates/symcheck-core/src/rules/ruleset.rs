//! Rule-file loading.
//!
//! A rule file is a JSON array of records; evaluation order follows file
//! order. Records are treated as opaque input and never mutated.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CheckError, Result};

/// One rule as loaded from the rule file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleRecord
{
    /// Identifier reported alongside a violation.
    pub id: String,
    /// Severity string, opaque to the checker.
    pub severity: String,
    /// Human-readable message reported on violation.
    pub msg: String,
    /// Predicate text in the rule DSL.
    pub rule: String,
}

/// Load an ordered list of rules from a JSON file.
///
/// An unreadable or unparsable rule file is fatal; there is nothing
/// meaningful to check without the rules.
pub fn load_rules(path: &Path) -> Result<Vec<RuleRecord>>
{
    let text = fs::read_to_string(path).map_err(|source| CheckError::RuleFileUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CheckError::RuleFileInvalid {
        path: path.display().to_string(),
        source,
    })
}
