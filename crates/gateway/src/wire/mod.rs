//! GeoJSON-like feature format exchanged with the server.
//!
//! Coordinates here are always longitude-first ([`PersistedGeometry`]); the map core
//! converts on ingress and egress.


use casemap_primitives::{CaseId, Category, ElementId, PersistedGeometry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FEATURE_TAG: &str = "Feature";
const COLLECTION_TAG: &str = "FeatureCollection";

fn feature_tag() -> String {
	FEATURE_TAG.to_owned()
}

fn collection_tag() -> String {
	COLLECTION_TAG.to_owned()
}

fn default_true() -> bool {
	true
}

fn empty_object() -> Value {
	Value::Object(Map::new())
}

/// Semantic attributes of an element (`properties.element`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
	/// Element type within its category (e.g. `"CAMERA"`, `"OPEN"`).
	#[serde(rename = "type", default)]
	pub kind: String,
	pub category: Category,
	/// Inactive elements stay cached but are never shown.
	#[serde(default = "default_true")]
	pub active: bool,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub case_id: Option<CaseId>,
	/// Server keys this client does not interpret, preserved verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Fill color as produced by the color picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillColor {
	pub hex8: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Presentation data (`properties.style`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fill_color: Option<FillColor>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fill_pattern: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fill_opacity: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub opacity: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Element properties: semantics, category-specific attributes and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
	pub element: ElementInfo,
	/// Free-form, category-specific data (sensor range, orientation, ...).
	#[serde(default = "empty_object")]
	pub attributes: Value,
	#[serde(default)]
	pub style: Style,
	/// Whether the rendered shape receives pointer events.
	#[serde(default = "default_true")]
	pub interactive: bool,
}

/// One element on the wire. A null `_id` means the element was never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
	#[serde(rename = "type", default = "feature_tag")]
	pub kind: String,
	#[serde(rename = "_id", default)]
	pub id: Option<ElementId>,
	pub geometry: PersistedGeometry,
	pub properties: Properties,
}

impl Feature {
	pub fn new(id: Option<ElementId>, geometry: PersistedGeometry, properties: Properties) -> Self {
		Self {
			kind: feature_tag(),
			id,
			geometry,
			properties,
		}
	}
}

impl From<ServerElement> for Feature {
	fn from(element: ServerElement) -> Self {
		Self::new(Some(element.id), element.geometry, element.properties)
	}
}

/// Ordered set of features, as imported from files or assembled from a case fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
	#[serde(rename = "type", default = "collection_tag")]
	pub kind: String,
	#[serde(default)]
	pub features: Vec<Feature>,
}

impl FeatureCollection {
	pub fn new(features: Vec<Feature>) -> Self {
		Self {
			kind: collection_tag(),
			features,
		}
	}

	pub fn from_json(text: &str) -> serde_json::Result<Self> {
		serde_json::from_str(text)
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}
}

impl FromIterator<Feature> for FeatureCollection {
	fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

/// Element as stored and returned by the server: always carries an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerElement {
	#[serde(rename = "_id")]
	pub id: ElementId,
	pub geometry: PersistedGeometry,
	pub properties: Properties,
}

/// Server push notifications relevant to the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
	ElementAdd(ServerElement),
	ElementEdit(ServerElement),
}

impl PushEvent {
	pub fn element(&self) -> &ServerElement {
		match self {
			Self::ElementAdd(element) | Self::ElementEdit(element) => element,
		}
	}

	pub fn into_element(self) -> ServerElement {
		match self {
			Self::ElementAdd(element) | Self::ElementEdit(element) => element,
		}
	}
}
