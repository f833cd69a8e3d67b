//! Element geometry in its two representations.
//!
//! * [`PersistedGeometry`] is the wire/storage form: GeoJSON-like, longitude-first nested arrays.
//! * [`RenderGeometry`] is the render-native form: typed [`LatLng`] leaves.
//!
//! [`to_render`] and [`to_persisted`] are the only conversions between the two and are used
//! symmetrically on ingress and egress.


use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mean earth radius used for geodesic offsets, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Errors produced while decoding persisted geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
	#[error("unhandled geometry type {0:?}")]
	UnknownType(String),
	#[error("malformed {kind} coordinates: {reason}")]
	Malformed { kind: GeometryKind, reason: &'static str },
}

/// Geometry types understood at the persistence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
	Point,
	LineString,
	MultiLineString,
	Polygon,
	MultiPolygon,
}

impl GeometryKind {
	pub fn parse(name: &str) -> Option<Self> {
		Some(match name {
			"Point" => Self::Point,
			"LineString" => Self::LineString,
			"MultiLineString" => Self::MultiLineString,
			"Polygon" => Self::Polygon,
			"MultiPolygon" => Self::MultiPolygon,
			_ => return None,
		})
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Point => "Point",
			Self::LineString => "LineString",
			Self::MultiLineString => "MultiLineString",
			Self::Polygon => "Polygon",
			Self::MultiPolygon => "MultiPolygon",
		}
	}

	/// Array nesting depth below a single position.
	const fn depth(self) -> usize {
		match self {
			Self::Point => 0,
			Self::LineString => 1,
			Self::MultiLineString | Self::Polygon => 2,
			Self::MultiPolygon => 3,
		}
	}
}

impl fmt::Display for GeometryKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Geometry subtype refining a base type. Only circles are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtype {
	Circle,
	Other(String),
}

impl Subtype {
	pub fn parse(name: &str) -> Self {
		match name {
			"Circle" => Self::Circle,
			other => Self::Other(other.to_owned()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Circle => "Circle",
			Self::Other(name) => name,
		}
	}
}

/// Render-native position. Altitude is carried through untouched when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
	pub lat: f64,
	pub lng: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alt: Option<f64>,
}

impl LatLng {
	pub const fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng, alt: None }
	}

	/// Point reached by travelling `distance_m` meters on `bearing_deg` (clockwise from north)
	/// along a great circle.
	pub fn destination(self, bearing_deg: f64, distance_m: f64) -> Self {
		let delta = distance_m / EARTH_RADIUS_M;
		let theta = bearing_deg.to_radians();
		let phi1 = self.lat.to_radians();
		let lambda1 = self.lng.to_radians();

		let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
		let lambda2 = lambda1 + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

		Self::new(phi2.to_degrees(), normalize_lng(lambda2.to_degrees()))
	}

	/// Planar heading from `self` towards `other`, in whole degrees within `[0, 360)`.
	///
	/// Matches the orientation convention stored on sector attributes: 0 points along
	/// increasing latitude, 90 along increasing longitude.
	pub fn heading_to(self, other: LatLng) -> f64 {
		let dy = other.lng - self.lng;
		let dx = other.lat - self.lat;
		let mut angle = dy.atan2(dx).to_degrees();
		if angle < 0.0 {
			angle += 360.0;
		}
		angle.round() % 360.0
	}
}

fn normalize_lng(lng: f64) -> f64 {
	(lng + 540.0).rem_euclid(360.0) - 180.0
}

/// Even-odd point in ring test on raw lat/lng (adequate for the small rings used as hit areas).
pub fn ring_contains(ring: &[LatLng], point: LatLng) -> bool {
	let mut inside = false;
	let n = ring.len();
	if n < 3 {
		return false;
	}
	let mut j = n - 1;
	for i in 0..n {
		let (a, b) = (ring[i], ring[j]);
		if (a.lat > point.lat) != (b.lat > point.lat) {
			let t = (point.lat - a.lat) / (b.lat - a.lat);
			if point.lng < a.lng + t * (b.lng - a.lng) {
				inside = !inside;
			}
		}
		j = i;
	}
	inside
}

/// Render-native coordinate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
	/// Not yet drawn.
	Empty,
	Point(LatLng),
	LineString(Vec<LatLng>),
	MultiLineString(Vec<Vec<LatLng>>),
	Polygon(Vec<Vec<LatLng>>),
	MultiPolygon(Vec<Vec<Vec<LatLng>>>),
}

impl Coordinates {
	pub fn kind(&self) -> Option<GeometryKind> {
		Some(match self {
			Self::Empty => return None,
			Self::Point(_) => GeometryKind::Point,
			Self::LineString(_) => GeometryKind::LineString,
			Self::MultiLineString(_) => GeometryKind::MultiLineString,
			Self::Polygon(_) => GeometryKind::Polygon,
			Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
		})
	}
}

/// Geometry as held by a live element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGeometry {
	pub coordinates: Coordinates,
	pub subtype: Option<Subtype>,
	/// Radius in meters for circle subtypes.
	pub radius: Option<f64>,
}

impl RenderGeometry {
	/// Geometry of an element that has not been drawn yet.
	pub const fn empty() -> Self {
		Self {
			coordinates: Coordinates::Empty,
			subtype: None,
			radius: None,
		}
	}

	pub fn point(at: LatLng) -> Self {
		Self {
			coordinates: Coordinates::Point(at),
			subtype: None,
			radius: None,
		}
	}

	pub fn circle(center: LatLng, radius: f64) -> Self {
		Self {
			coordinates: Coordinates::Point(center),
			subtype: Some(Subtype::Circle),
			radius: Some(radius),
		}
	}

	pub fn is_circle(&self) -> bool {
		matches!(self.subtype, Some(Subtype::Circle))
	}

	pub fn is_empty(&self) -> bool {
		matches!(self.coordinates, Coordinates::Empty)
	}

	/// Center position for point-like geometry.
	pub fn center(&self) -> Option<LatLng> {
		match self.coordinates {
			Coordinates::Point(p) => Some(p),
			_ => None,
		}
	}
}

impl Default for RenderGeometry {
	fn default() -> Self {
		Self::empty()
	}
}

/// Geometry as exchanged with the server: `{type, subtype?, coordinates, radius?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedGeometry {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	#[serde(default)]
	pub coordinates: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub radius: Option<f64>,
}

/// Converts persisted (longitude-first) geometry to its render-native form.
pub fn to_render(geometry: &PersistedGeometry) -> Result<RenderGeometry, GeometryError> {
	let kind = GeometryKind::parse(&geometry.kind).ok_or_else(|| GeometryError::UnknownType(geometry.kind.clone()))?;
	let raw = &geometry.coordinates;

	let coordinates = match kind {
		GeometryKind::Point => Coordinates::Point(position(raw, kind)?),
		GeometryKind::LineString => Coordinates::LineString(positions(raw, kind)?),
		GeometryKind::MultiLineString => Coordinates::MultiLineString(nested(raw, kind, positions)?),
		GeometryKind::Polygon => Coordinates::Polygon(nested(raw, kind, positions)?),
		GeometryKind::MultiPolygon => Coordinates::MultiPolygon(nested(raw, kind, |v, k| nested(v, k, positions))?),
	};
	debug_assert_eq!(coordinates.kind().map(GeometryKind::depth), Some(kind.depth()));

	Ok(RenderGeometry {
		coordinates,
		subtype: geometry.subtype.as_deref().map(Subtype::parse),
		radius: geometry.radius,
	})
}

/// Converts render-native geometry back to the persisted (longitude-first) form.
///
/// Inverse of [`to_render`]. Undrawn geometry serializes as `{type: "", coordinates: []}`.
pub fn to_persisted(geometry: &RenderGeometry) -> PersistedGeometry {
	let (kind, coordinates) = match &geometry.coordinates {
		Coordinates::Empty => (String::new(), Value::Array(Vec::new())),
		Coordinates::Point(p) => (GeometryKind::Point.as_str().to_owned(), encode(p)),
		Coordinates::LineString(line) => (GeometryKind::LineString.as_str().to_owned(), encode_all(line)),
		Coordinates::MultiLineString(lines) => (
			GeometryKind::MultiLineString.as_str().to_owned(),
			Value::Array(lines.iter().map(|l| encode_all(l)).collect()),
		),
		Coordinates::Polygon(rings) => (
			GeometryKind::Polygon.as_str().to_owned(),
			Value::Array(rings.iter().map(|r| encode_all(r)).collect()),
		),
		Coordinates::MultiPolygon(polys) => (
			GeometryKind::MultiPolygon.as_str().to_owned(),
			Value::Array(
				polys
					.iter()
					.map(|rings| Value::Array(rings.iter().map(|r| encode_all(r)).collect()))
					.collect(),
			),
		),
	};

	PersistedGeometry {
		kind,
		subtype: geometry.subtype.as_ref().map(|s| s.as_str().to_owned()),
		coordinates,
		radius: geometry.radius,
	}
}

fn position(value: &Value, kind: GeometryKind) -> Result<LatLng, GeometryError> {
	let malformed = |reason| GeometryError::Malformed { kind, reason };
	let items = value.as_array().ok_or(malformed("position is not an array"))?;
	if !(2..=3).contains(&items.len()) {
		return Err(malformed("position must have 2 or 3 components"));
	}
	let component = |i: usize| items[i].as_f64().ok_or(malformed("position component is not a number"));
	let lng = component(0)?;
	let lat = component(1)?;
	let alt = if items.len() == 3 { Some(component(2)?) } else { None };
	Ok(LatLng { lat, lng, alt })
}

fn positions(value: &Value, kind: GeometryKind) -> Result<Vec<LatLng>, GeometryError> {
	let items = value.as_array().ok_or(GeometryError::Malformed {
		kind,
		reason: "expected an array of positions",
	})?;
	items.iter().map(|item| position(item, kind)).collect()
}

fn nested<T>(
	value: &Value,
	kind: GeometryKind,
	inner: impl Fn(&Value, GeometryKind) -> Result<T, GeometryError>,
) -> Result<Vec<T>, GeometryError> {
	let items = value.as_array().ok_or(GeometryError::Malformed {
		kind,
		reason: "expected a nested coordinate array",
	})?;
	items.iter().map(|item| inner(item, kind)).collect()
}

fn encode(p: &LatLng) -> Value {
	let mut out = vec![Value::from(p.lng), Value::from(p.lat)];
	if let Some(alt) = p.alt {
		out.push(Value::from(alt));
	}
	Value::Array(out)
}

fn encode_all(points: &[LatLng]) -> Value {
	Value::Array(points.iter().map(encode).collect())
}
