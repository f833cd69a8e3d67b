//! Dot-path access into nested JSON values (`"range.max"`, `"element.category"`).


use serde_json::{Map, Value};

/// Errors from [`set`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
	#[error("path {path:?} does not exist")]
	Missing { path: String },
	#[error("path {path:?} crosses a non-object value at {segment:?}")]
	NotAnObject { path: String, segment: String },
	#[error("empty path")]
	Empty,
}

/// Which extreme [`loop_extreme`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
	Highest,
	Lowest,
}

/// Returns the value at `path`, or `None` if any segment is missing.
///
/// Array elements can be addressed by numeric segments (`"range.0"`).
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.').try_fold(value, |acc, key| match acc {
		Value::Object(map) => map.get(key),
		Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
		_ => None,
	})
}

/// Returns the value at `path`, falling back to `default` when missing or null.
pub fn get_or<'a>(value: &'a Value, path: &str, default: &'a Value) -> &'a Value {
	match get(value, path) {
		Some(Value::Null) | None => default,
		Some(found) => found,
	}
}

/// Numeric value at `path`, if present and numeric.
pub fn get_f64(value: &Value, path: &str) -> Option<f64> {
	get(value, path).and_then(Value::as_f64)
}

/// Writes `new` at `path`.
///
/// With `create_path` unset, every intermediate object must already exist.
pub fn set(value: &mut Value, path: &str, new: Value, create_path: bool) -> Result<(), PathError> {
	if path.is_empty() {
		return Err(PathError::Empty);
	}
	let mut segments: Vec<&str> = path.split('.').collect();
	let Some(last) = segments.pop() else {
		return Err(PathError::Empty);
	};

	let mut current = value;
	for segment in segments {
		let map = as_object(current, path, segment)?;
		if !map.contains_key(segment) {
			if !create_path {
				return Err(PathError::Missing { path: path.to_owned() });
			}
			map.insert(segment.to_owned(), Value::Object(Map::new()));
		}
		current = map.get_mut(segment).ok_or_else(|| PathError::Missing { path: path.to_owned() })?;
	}

	as_object(current, path, last)?.insert(last.to_owned(), new);
	Ok(())
}

fn as_object<'a>(value: &'a mut Value, path: &str, segment: &str) -> Result<&'a mut Map<String, Value>, PathError> {
	value.as_object_mut().ok_or_else(|| PathError::NotAnObject {
		path: path.to_owned(),
		segment: segment.to_owned(),
	})
}

/// Highest or lowest numeric value found at `path` across `items`.
///
/// Items without a numeric value at `path` are skipped; `None` when none qualify.
pub fn loop_extreme<'a>(items: impl IntoIterator<Item = &'a Value>, mode: Extreme, path: &str) -> Option<f64> {
	items
		.into_iter()
		.filter_map(|item| get_f64(item, path))
		.reduce(|acc, v| match mode {
			Extreme::Highest => acc.max(v),
			Extreme::Lowest => acc.min(v),
		})
}
