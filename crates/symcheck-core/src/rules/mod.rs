//! # Rule Engine
//!
//! Compiles rule predicates into boolean expressions and evaluates them
//! against a resolved symbol table.
//!
//! A rule evaluating to *true* is a violation and is reported; a rule that
//! fails to compile or evaluate is reported as malformed. Both count as
//! failing checks, but neither stops the remaining rules: every rule is
//! always evaluated, in file order, and the overall verdict is the AND of
//! "every rule passed".

pub mod compile;
pub mod eval;
pub mod ruleset;

use std::io::Write;

use thiserror::Error;
use tracing::debug;

pub use compile::{compile_rule, CompileError, Expr};
pub use eval::{EvalContext, EvalError, Value};
pub use ruleset::{load_rules, RuleRecord};

use crate::error::Result;

/// Why a single rule failed to produce a verdict. Recoverable: the rule is
/// reported as malformed and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError
{
    /// The rule text does not conform to the DSL.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The rule compiled but could not be evaluated.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Compile and evaluate one rule. `Ok(true)` means the rule's condition
/// held, i.e. a violation.
pub fn check_rule(ctx: &EvalContext<'_>, rule: &RuleRecord) -> std::result::Result<bool, RuleError>
{
    let expr = compile_rule(&rule.rule)?;
    Ok(ctx.evaluate(&expr)?)
}

/// Evaluate every rule against the table, emitting one diagnostics line
/// per violation or malformed rule, in rule order.
///
/// Returns the overall verdict: `true` iff every rule passed. The only
/// error path is the diagnostics sink itself failing to accept a write.
pub fn evaluate_rules<W: Write>(ctx: &EvalContext<'_>, rules: &[RuleRecord], diagnostics: &mut W) -> Result<bool>
{
    let mut all_passed = true;

    for rule in rules {
        match check_rule(ctx, rule) {
            Ok(false) => {
                debug!(id = %rule.id, "rule passed");
            }
            Ok(true) => {
                writeln!(
                    diagnostics,
                    "{}:{}:{}: {}",
                    ctx.file_under_test, rule.severity, rule.id, rule.msg
                )?;
                all_passed = false;
            }
            Err(err) => {
                writeln!(
                    diagnostics,
                    "{}: malformed rule {}: {}: {}",
                    ctx.file_under_test, rule.id, rule.rule, err
                )?;
                all_passed = false;
            }
        }
    }

    Ok(all_passed)
}
