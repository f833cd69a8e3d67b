use std::cmp::Ordering;

use casemap_primitives::path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SchemaError;

/// How condition results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOp {
	And,
	Or,
}

/// Comparison applied between the actual value at a path and the expected value.
///
/// `In`/`Nin` test whether the actual array contains the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CondOp {
	In,
	Nin,
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
	pub path: String,
	pub operator: CondOp,
	pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
	pub operator: LogicalOp,
	pub conditions: Vec<Condition>,
}

/// Evaluates an optional requirement; absent requirements always hold.
pub(crate) fn check(requires: Option<&Requirement>, data: &Value) -> Result<bool, SchemaError> {
	let Some(requires) = requires else {
		return Ok(true);
	};
	requires
		.conditions
		.iter()
		.map(|c| evaluate(c, data))
		.reduce(|acc, next| match requires.operator {
			LogicalOp::And => acc && next,
			LogicalOp::Or => acc || next,
		})
		.ok_or(SchemaError::EmptyRequirement)
}

/// Tests one condition against `data`.
///
/// A missing or `null` value at the path fails every operator, `NE`, `NIN` and
/// `EQ null` included.
fn evaluate(condition: &Condition, data: &Value) -> bool {
	let actual = match path::get(data, &condition.path) {
		None | Some(Value::Null) => return false,
		Some(actual) => actual,
	};
	let expected = &condition.value;

	match condition.operator {
		CondOp::In => actual.as_array().is_some_and(|items| items.iter().any(|i| loose_eq(i, expected))),
		CondOp::Nin => actual.as_array().is_some_and(|items| !items.iter().any(|i| loose_eq(i, expected))),
		CondOp::Eq => loose_eq(actual, expected),
		CondOp::Ne => !loose_eq(actual, expected),
		CondOp::Gt => compare(actual, expected) == Some(Ordering::Greater),
		CondOp::Gte => matches!(compare(actual, expected), Some(Ordering::Greater | Ordering::Equal)),
		CondOp::Lt => compare(actual, expected) == Some(Ordering::Less),
		CondOp::Lte => matches!(compare(actual, expected), Some(Ordering::Less | Ordering::Equal)),
	}
}

/// Strict equality, except that integer and float encodings of a number compare equal.
fn loose_eq(a: &Value, b: &Value) -> bool {
	match (a.as_f64(), b.as_f64()) {
		(Some(x), Some(y)) => x == y,
		_ => a == b,
	}
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
	match (a, b) {
		(Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
		(Value::String(x), Value::String(y)) => Some(x.cmp(y)),
		_ => None,
	}
}
