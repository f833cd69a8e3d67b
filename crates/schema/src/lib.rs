#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Element form schemas with conditional sections and fields.
//!
//! The server describes, per element type, which attribute fields a form shows.
//! Sections and fields may carry a [`Requirement`] evaluated against the element's
//! current data through dot paths; [`resolve_spec`] keeps only the satisfied ones.

mod condition;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use condition::{CondOp, Condition, LogicalOp, Requirement};

/// Errors raised while resolving a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
	/// A requirement with no conditions cannot be reduced.
	#[error("requirement has no conditions")]
	EmptyRequirement,
}

/// Numeric bounds of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,
}

/// One form field bound to a dot path in the element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
	#[serde(default)]
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(rename = "type")]
	pub kind: String,
	pub path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_max: Option<MinMax>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub append_to_value: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requires: Option<Requirement>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Group of fields shown together when its requirement holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
	#[serde(default)]
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requires: Option<Requirement>,
	#[serde(default)]
	pub fields: Vec<Field>,
}

/// Form schema for one element type. Either sectioned or a flat field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sections: Option<Vec<Section>>,
	#[serde(default)]
	pub fields: Vec<Field>,
}

/// Section that survived resolution; its fields have their requirements stripped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSection {
	pub label: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub fields: Vec<Field>,
}

/// Resolves every schema of `schema_type` against `data`.
pub fn resolve_spec(schemas: &[Schema], data: &Value, schema_type: &str) -> Result<Vec<ResolvedSection>, SchemaError> {
	let mut result = Vec::new();
	for schema in schemas.iter().filter(|s| s.kind == schema_type) {
		match &schema.sections {
			Some(sections) => {
				for section in sections {
					if !condition::check(section.requires.as_ref(), data)? {
						continue;
					}
					result.push(ResolvedSection {
						label: section.label.clone(),
						description: None,
						fields: resolve_fields(&section.fields, data)?,
					});
				}
			}
			None => result.push(ResolvedSection {
				label: schema.label.clone().unwrap_or_default(),
				description: schema.description.clone(),
				fields: resolve_fields(&schema.fields, data)?,
			}),
		}
	}
	tracing::trace!(schema_type, sections = result.len(), "schema.resolved");
	Ok(result)
}

fn resolve_fields(fields: &[Field], data: &Value) -> Result<Vec<Field>, SchemaError> {
	let mut out = Vec::with_capacity(fields.len());
	for field in fields {
		if condition::check(field.requires.as_ref(), data)? {
			out.push(Field {
				requires: None,
				..field.clone()
			});
		}
	}
	Ok(out)
}

/// Initial value for a freshly shown field of `kind`.
pub fn default_for_field(kind: &str, min_max: Option<&MinMax>) -> Option<Value> {
	match kind {
		"string" => Some(Value::String(String::new())),
		"slider" => min_max.and_then(|m| m.max).map(Value::from),
		"color" => Some(Value::String("#ff00004d".into())),
		_ => None,
	}
}
