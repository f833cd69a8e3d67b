//! Core types for case map data: identifiers, categories, geometry and dot-path access.

/// Element categories and their layering priority.
pub mod category;
/// Persisted and render-native geometry with the canonical conversion pair.
pub mod geometry;
/// Identifier types for case entities and render handles.
pub mod ids;
/// Dot-path get/set over nested JSON values.
pub mod path;

pub use category::Category;
pub use geometry::{Coordinates, GeometryError, GeometryKind, LatLng, PersistedGeometry, RenderGeometry, Subtype, to_persisted, to_render};
pub use ids::{CaseId, ElementId, HandleId};
pub use path::{Extreme, PathError};
