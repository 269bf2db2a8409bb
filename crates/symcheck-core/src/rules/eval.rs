//! Rule expression evaluation against a resolved symbol table.
//!
//! All predicate state is carried by an explicit [`EvalContext`] rather
//! than anything process-wide; the context borrows the table read-only.

use thiserror::Error;

use crate::types::SymbolTable;

use super::compile::{CompareOp, Expr, Predicate};

/// A rule that compiled but cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError
{
    /// `LARGEST()` scanned a table with no sized entries to take a
    /// maximum over (an empty table being the common case).
    #[error("LARGEST() found no sized symbols in the table")]
    NoSizedSymbols,

    /// An ordering comparison between values of incompatible types.
    #[error("cannot order {left} against {right}")]
    IncomparableTypes
    {
        /// Type label of the left operand
        left: &'static str,
        /// Type label of the right operand
        right: &'static str,
    },
}

/// Value domain of rule expressions.
///
/// `Empty` is the sentinel for "no such symbol / no size recorded"; it is
/// falsy and equal only to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value
{
    Bool(bool),
    Int(u64),
    Str(String),
    Empty,
}

impl Value
{
    /// Truthiness of a value when it stands alone as a rule result:
    /// booleans as-is, nonzero integers, nonempty strings; the empty
    /// sentinel is false.
    #[must_use]
    pub fn truthy(&self) -> bool
    {
        match self {
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Str(value) => !value.is_empty(),
            Value::Empty => false,
        }
    }

    fn type_label(&self) -> &'static str
    {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::Empty => "empty",
        }
    }
}

/// Everything a rule expression may see: the merged symbol table and the
/// name of the file under test.
pub struct EvalContext<'a>
{
    /// Merged table for the target and its dependency closure.
    pub table: &'a SymbolTable,
    /// Name of the file the rules are being checked against, as supplied
    /// on the command line.
    pub file_under_test: &'a str,
}

impl EvalContext<'_>
{
    /// Evaluate a compiled rule expression down to its truthiness.
    ///
    /// `true` means the rule's condition held, i.e. a violation.
    pub fn evaluate(&self, expr: &Expr) -> Result<bool, EvalError>
    {
        Ok(self.eval_expr(expr)?.truthy())
    }

    fn eval_expr(&self, expr: &Expr) -> Result<Value, EvalError>
    {
        match expr {
            Expr::Or(left, right) => {
                if self.eval_expr(left)?.truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_expr(right)?.truthy()))
            }
            Expr::And(left, right) => {
                if !self.eval_expr(left)?.truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_expr(right)?.truthy()))
            }
            Expr::Not(inner) => Ok(Value::Bool(!self.eval_expr(inner)?.truthy())),
            Expr::Compare(left, op, right) => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                compare(&left, *op, &right).map(Value::Bool)
            }
            Expr::Call(pred) => self.eval_predicate(pred),
            Expr::Int(value) => Ok(Value::Int(*value)),
        }
    }

    fn eval_predicate(&self, pred: &Predicate) -> Result<Value, EvalError>
    {
        match pred {
            Predicate::Available(name) => Ok(Value::Bool(self.table.contains(name))),
            Predicate::Used(name) => Ok(Value::Bool(self.used(name))),
            Predicate::Size(name) => Ok(self
                .table
                .get(name)
                .and_then(|entry| entry.size)
                .map_or(Value::Empty, Value::Int)),
            // The second argument is accepted syntactically but never
            // compared against; the call returns the recorded type of the
            // first argument regardless. Long-standing quirk, kept as-is.
            Predicate::Type(name, _expected) => Ok(self
                .table
                .get(name)
                .map_or(Value::Empty, |entry| Value::Str(entry.kind.clone()))),
            Predicate::Largest => self
                .table
                .iter()
                .filter_map(|(_, entry)| entry.size)
                .max()
                .map(Value::Int)
                .ok_or(EvalError::NoSizedSymbols),
        }
    }

    /// The file under test defines `name` or is in its used-in set.
    fn used(&self, name: &str) -> bool
    {
        match self.table.get(name) {
            None => false,
            Some(entry) => entry.defining_file == self.file_under_test || entry.used_in.contains(self.file_under_test),
        }
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool, EvalError>
{
    match op {
        CompareOp::Eq => Ok(equal(left, right)),
        CompareOp::Ne => Ok(!equal(left, right)),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = match (left, right) {
                (Value::Int(a), Value::Int(b)) => a.cmp(b),
                (Value::Str(a), Value::Str(b)) => a.cmp(b),
                _ => {
                    return Err(EvalError::IncomparableTypes {
                        left: left.type_label(),
                        right: right.type_label(),
                    });
                }
            };
            Ok(match op {
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::Le => ordering.is_le(),
                CompareOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
    }
}

/// Equality is well-defined across types: differing types are unequal.
fn equal(left: &Value, right: &Value) -> bool
{
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Empty, Value::Empty) => true,
        _ => false,
    }
}
