//! Render surface seam.
//!
//! The map core drives an external rendering backend through [`RenderSurface`]. Handles
//! are created by the backend and owned exclusively by one element while attached. Each
//! handle carries its [`ShapeKind`], resolved once at creation; style application then
//! dispatches on that kind instead of re-inspecting the backend primitive.
//!
//! Backend extensions (centroid icons, pattern fills, sector rendering) are advertised
//! through [`Capabilities`] and queried before use.

mod headless;

use bitflags::bitflags;
use casemap_primitives::{Coordinates, GeometryKind, HandleId, LatLng, RenderGeometry};
use serde_json::Value;

pub use headless::{HeadlessSurface, HandleRecord};

/// Render primitive family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
	Circle,
	Marker,
	Polygon,
	Polyline,
}

impl ShapeKind {
	/// Shape kind able to display `geometry`, or `None` for undrawn geometry.
	pub fn for_geometry(geometry: &RenderGeometry) -> Option<Self> {
		Some(match geometry.coordinates.kind()? {
			GeometryKind::Point if geometry.is_circle() => Self::Circle,
			GeometryKind::Point => Self::Marker,
			GeometryKind::LineString | GeometryKind::MultiLineString => Self::Polyline,
			GeometryKind::Polygon | GeometryKind::MultiPolygon => Self::Polygon,
		})
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Circle => "circle",
			Self::Marker => "marker",
			Self::Polygon => "polygon",
			Self::Polyline => "polyline",
		}
	}
}

/// Backend-owned render primitive together with its resolved kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle {
	pub id: HandleId,
	pub kind: ShapeKind,
}

bitflags! {
	/// Optional backend features.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Capabilities: u8 {
		/// Icon drawn at the centroid of circles and polygons.
		const CENTROID_ICON = 1 << 0;
		/// Pattern fills on paths.
		const PATTERN_FILL = 1 << 1;
		/// Circles clipped to an orientation and field of view.
		const SECTOR = 1 << 2;
	}
}

/// Interactive draw tools offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawTool {
	Marker,
	Circle,
	Rectangle,
	Polygon,
	Line,
}

impl DrawTool {
	/// Maps a seed shape name (`"POINT"`, `"SECTOR"`, ...) to the tool that draws it.
	pub fn for_shape(shape: &str) -> Option<Self> {
		Some(match shape {
			"POINT" => Self::Marker,
			"CIRCLE" | "SECTOR" => Self::Circle,
			"RECTANGLE" => Self::Rectangle,
			"POLYGON" => Self::Polygon,
			"POLYLINE" => Self::Line,
			_ => return None,
		})
	}
}

/// Icon reference resolved against the configured asset root.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
	pub url: String,
	pub size: [u32; 2],
}

/// Circle sector, both angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
	pub orientation: f64,
	pub fov: f64,
}

/// Stroke and fill of path shapes (everything except markers).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStyle {
	pub color: Option<String>,
	pub fill_pattern: Option<Value>,
	pub fill_opacity: Option<f64>,
	pub opacity: Option<f64>,
	pub dash_array: Option<&'static str>,
	pub fill: bool,
}

/// Per-kind geometry payload of a [`ShapeUpdate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
	Circle {
		center: LatLng,
		radius: f64,
		sector: Option<Sector>,
		centroid_icon: Option<IconSpec>,
	},
	Marker {
		position: LatLng,
		icon: Option<IconSpec>,
	},
	Polygon {
		coordinates: Coordinates,
		centroid_icon: Option<IconSpec>,
	},
	Polyline {
		coordinates: Coordinates,
		repeat_icon: Option<IconSpec>,
	},
}

/// Full visual state pushed onto a handle. Applying the same update twice is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeUpdate {
	pub tooltip: String,
	pub interactive: bool,
	pub path_style: Option<PathStyle>,
	pub geometry: ShapeGeometry,
}

/// Interactive editing options for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditMode {
	/// Vertex and radius editing. Off for sectors, which may only be dragged.
	pub allow_editing: bool,
	pub draggable: bool,
}

/// Rendering backend driven by the map session.
pub trait RenderSurface {
	fn capabilities(&self) -> Capabilities;

	/// Creates a detached primitive of `kind`.
	fn create(&mut self, kind: ShapeKind) -> RenderHandle;

	/// Releases a primitive. Unknown handles are ignored.
	fn destroy(&mut self, handle: HandleId);

	fn attach(&mut self, handle: HandleId);

	fn detach(&mut self, handle: HandleId);

	fn is_attached(&self, handle: HandleId) -> bool;

	fn apply(&mut self, handle: HandleId, update: &ShapeUpdate);

	/// Enables (`Some`) or disables (`None`) interactive editing on a handle.
	fn set_edit_mode(&mut self, handle: HandleId, mode: Option<EditMode>);

	/// Turns off every draw tool and every handle's edit mode.
	fn disable_all_modes(&mut self);

	fn enable_draw(&mut self, tool: DrawTool);

	/// Creates and attaches a polygon used purely as a pointer target.
	fn create_hitbox(&mut self, ring: &[LatLng], style: &PathStyle) -> HandleId;

	/// Moves the camera onto a handle.
	fn focus(&mut self, _handle: HandleId) {}
}

/// Rendering inputs that do not belong to any one element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
	pub asset_root: String,
	pub icon_size: [u32; 2],
	pub capabilities: Capabilities,
}

impl RenderContext {
	pub fn icon(&self, path: &str) -> IconSpec {
		IconSpec {
			url: format!("{}{}", self.asset_root, path),
			size: self.icon_size,
		}
	}
}
