//! Map elements: the unit of case data held by the session.

#[cfg(test)]
mod tests;

use casemap_gateway::{ElementInfo, Feature, Properties, ServerElement, Style};
use casemap_primitives::path;
use casemap_primitives::{CaseId, Category, Coordinates, ElementId, GeometryError, RenderGeometry, to_persisted, to_render};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::{Capabilities, DrawTool, EditMode, PathStyle, RenderContext, RenderHandle, RenderSurface, Sector, ShapeGeometry, ShapeKind, ShapeUpdate};

/// Dash pattern used for open areas.
const OPEN_DASH: &str = "5,1,4";
/// Fill opacity of filled shapes without an explicit style.
const DEFAULT_FILL_OPACITY: f64 = 0.5;

/// Template for a new element, as dragged from the element palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
	#[serde(rename = "type")]
	pub kind: String,
	pub category: Category,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub case_id: Option<CaseId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	#[serde(default)]
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Shape names the element may be drawn as (`"POINT"`, `"CIRCLE"`, `"SECTOR"`, ...).
	#[serde(default)]
	pub shapes: Vec<String>,
}

impl Seed {
	/// Draw tools able to produce one of the seed's shapes, in toolbar order.
	pub fn draw_tools(&self) -> Vec<DrawTool> {
		[DrawTool::Marker, DrawTool::Circle, DrawTool::Rectangle, DrawTool::Polygon, DrawTool::Line]
			.into_iter()
			.filter(|tool| self.shapes.iter().any(|s| DrawTool::for_shape(s) == Some(*tool)))
			.collect()
	}
}

/// Deep copy of an element's data, taken when an edit starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
	pub properties: Properties,
	pub geometry: RenderGeometry,
}

/// One geospatial case element.
#[derive(Debug, Clone, PartialEq)]
pub struct MapElement {
	/// `None` until the server acknowledges the first commit.
	pub id: Option<ElementId>,
	pub handle: Option<RenderHandle>,
	pub properties: Properties,
	pub geometry: RenderGeometry,
}

impl MapElement {
	/// Fresh, undrawn element initialized from a seed.
	pub fn from_seed(seed: &Seed) -> Self {
		Self {
			id: None,
			handle: None,
			properties: Properties {
				element: ElementInfo {
					kind: seed.kind.clone(),
					category: seed.category,
					active: true,
					name: String::new(),
					title: seed.title.clone(),
					category_id: seed.category_id.clone(),
					case_id: seed.case_id.clone(),
					extra: Map::new(),
				},
				attributes: Value::Object(Map::new()),
				style: Style {
					icon: seed.icon.clone(),
					..Style::default()
				},
				interactive: true,
			},
			geometry: RenderGeometry::empty(),
		}
	}

	/// Element decoded from the wire, without a handle.
	pub fn from_feature(feature: Feature) -> Result<Self, GeometryError> {
		Ok(Self {
			geometry: to_render(&feature.geometry)?,
			id: feature.id,
			handle: None,
			properties: feature.properties,
		})
	}

	pub fn from_server(element: ServerElement) -> Result<Self, GeometryError> {
		Self::from_feature(element.into())
	}

	pub fn is_active(&self) -> bool {
		self.properties.element.active
	}

	pub fn category(&self) -> Category {
		self.properties.element.category
	}

	/// Circles outside the area category render as oriented sensor sectors.
	pub fn is_sector(&self) -> bool {
		self.geometry.is_circle() && self.category() != Category::Area
	}

	pub fn edit_mode(&self) -> EditMode {
		EditMode {
			allow_editing: !self.is_sector(),
			draggable: true,
		}
	}

	pub fn clone_for_backup(&self) -> ElementSnapshot {
		ElementSnapshot {
			properties: self.properties.clone(),
			geometry: self.geometry.clone(),
		}
	}

	/// Overwrites data from a snapshot. The handle is untouched; callers re-apply.
	pub fn restore(&mut self, snapshot: ElementSnapshot) {
		self.properties = snapshot.properties;
		self.geometry = snapshot.geometry;
	}

	/// Replaces data with a server payload, keeping the handle.
	pub fn apply_server(&mut self, element: ServerElement) -> Result<(), GeometryError> {
		self.geometry = to_render(&element.geometry)?;
		self.properties = element.properties;
		self.id = Some(element.id);
		Ok(())
	}

	pub fn to_feature(&self) -> Feature {
		Feature::new(self.id.clone(), to_persisted(&self.geometry), self.properties.clone())
	}

	/// Pushes the element's state onto its handle. Inactive elements are detached.
	pub fn apply_to_surface(&self, surface: &mut dyn RenderSurface, ctx: &RenderContext) {
		let Some(handle) = self.handle else {
			return;
		};
		if !self.is_active() {
			surface.detach(handle.id);
		}
		if let Some(update) = self.shape_update(handle.kind, ctx) {
			surface.apply(handle.id, &update);
		}
	}

	/// Visual state for a handle of `kind`, or `None` when the geometry does not fit it.
	pub fn shape_update(&self, kind: ShapeKind, ctx: &RenderContext) -> Option<ShapeUpdate> {
		let element = &self.properties.element;
		let style = &self.properties.style;
		let attributes = &self.properties.attributes;
		let caps = ctx.capabilities;

		let icon = style.icon.as_deref().map(|i| ctx.icon(i));
		let centroid_icon = (element.category != Category::Area && caps.contains(Capabilities::CENTROID_ICON))
			.then(|| icon.clone())
			.flatten();

		let geometry = match (kind, &self.geometry.coordinates) {
			(ShapeKind::Circle, Coordinates::Point(center)) => ShapeGeometry::Circle {
				center: *center,
				radius: path::get_f64(attributes, "range.max")
					.filter(|r| *r > 0.0)
					.or(self.geometry.radius)
					.unwrap_or_default(),
				sector: caps.contains(Capabilities::SECTOR).then(|| sector(attributes)).flatten(),
				centroid_icon,
			},
			(ShapeKind::Marker, Coordinates::Point(position)) => ShapeGeometry::Marker { position: *position, icon },
			(ShapeKind::Polygon, coords @ (Coordinates::Polygon(_) | Coordinates::MultiPolygon(_))) => ShapeGeometry::Polygon {
				coordinates: coords.clone(),
				centroid_icon,
			},
			(ShapeKind::Polyline, coords @ (Coordinates::LineString(_) | Coordinates::MultiLineString(_))) => ShapeGeometry::Polyline {
				coordinates: coords.clone(),
				repeat_icon: icon,
			},
			(_, Coordinates::Empty) => return None,
			(kind, coords) => {
				tracing::warn!(
					id = ?self.id,
					shape = kind.as_str(),
					geometry = ?coords.kind(),
					"map.element.shape_mismatch"
				);
				return None;
			}
		};

		let filled = matches!(kind, ShapeKind::Circle | ShapeKind::Polygon);
		let path_style = (kind != ShapeKind::Marker).then(|| PathStyle {
			color: style.fill_color.as_ref().map(|c| c.hex8.clone()),
			fill_pattern: style.fill_pattern.clone().filter(|_| caps.contains(Capabilities::PATTERN_FILL)),
			fill_opacity: style.fill_opacity.or(filled.then_some(DEFAULT_FILL_OPACITY)),
			opacity: style.opacity,
			dash_array: (filled && element.kind == "OPEN").then_some(OPEN_DASH),
			fill: filled,
		});

		Some(ShapeUpdate {
			tooltip: element.name.clone(),
			interactive: self.properties.interactive,
			path_style,
			geometry,
		})
	}
}

fn sector(attributes: &Value) -> Option<Sector> {
	let fov = path::get_f64(attributes, "fov").filter(|f| *f > 0.0)?;
	let orientation = path::get_f64(attributes, "orientation")?;
	Some(Sector { orientation, fov })
}
