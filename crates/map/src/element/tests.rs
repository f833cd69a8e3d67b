use casemap_gateway::FillColor;
use casemap_primitives::LatLng;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

use super::*;
use crate::render::HeadlessSurface;

fn seed(category: Category) -> Seed {
	Seed {
		kind: "CAMERA".into(),
		category,
		category_id: Some("cat-1".into()),
		case_id: Some(CaseId::new("case-1")),
		icon: Some("/icons/camera.svg".into()),
		title: "Camera".into(),
		description: None,
		shapes: vec!["SECTOR".into(), "POINT".into()],
	}
}

fn ctx(capabilities: Capabilities) -> RenderContext {
	RenderContext {
		asset_root: "https://assets.test".into(),
		icon_size: [30, 30],
		capabilities,
	}
}

#[test]
fn from_seed_is_undrawn_and_active() {
	let element = MapElement::from_seed(&seed(Category::Safeguard));
	assert_eq!(element.id, None);
	assert_eq!(element.handle, None);
	assert!(element.geometry.is_empty());
	assert!(element.is_active());
	assert_eq!(element.properties.element.category_id.as_deref(), Some("cat-1"));
	assert_eq!(element.properties.style.icon.as_deref(), Some("/icons/camera.svg"));
	assert_eq!(element.properties.attributes, json!({}));
}

#[test]
fn draw_tools_follow_toolbar_order() {
	assert_eq!(seed(Category::Safeguard).draw_tools(), vec![DrawTool::Marker, DrawTool::Circle]);
}

#[test]
fn undrawn_element_serializes_empty_geometry() {
	let feature = MapElement::from_seed(&seed(Category::Obstacle)).to_feature();
	assert_eq!(feature.id, None);
	assert_eq!(feature.geometry.kind, "");
	assert_eq!(feature.geometry.coordinates, json!([]));
}

#[test]
fn circle_update_uses_range_and_sector() {
	let mut element = MapElement::from_seed(&seed(Category::Safeguard));
	element.geometry = RenderGeometry::circle(LatLng::new(52.0, 4.0), 10.0);
	element.properties.attributes = json!({ "range": { "max": 40 }, "fov": 90, "orientation": 180 });

	let update = element.shape_update(ShapeKind::Circle, &ctx(Capabilities::all())).unwrap();
	let ShapeGeometry::Circle {
		radius,
		sector,
		centroid_icon,
		..
	} = update.geometry
	else {
		panic!("expected circle geometry");
	};
	assert_eq!(radius, 40.0);
	assert_eq!(sector, Some(Sector { orientation: 180.0, fov: 90.0 }));
	assert_eq!(centroid_icon.unwrap().url, "https://assets.test/icons/camera.svg");
	assert!(element.is_sector());
	assert!(!element.edit_mode().allow_editing);
}

#[test]
fn missing_capabilities_drop_backend_extras() {
	let mut element = MapElement::from_seed(&seed(Category::Safeguard));
	element.geometry = RenderGeometry::circle(LatLng::new(52.0, 4.0), 10.0);
	element.properties.attributes = json!({ "fov": 90, "orientation": 180 });
	element.properties.style.fill_pattern = Some(json!({ "color": "red" }));

	let update = element.shape_update(ShapeKind::Circle, &ctx(Capabilities::empty())).unwrap();
	assert!(matches!(update.geometry, ShapeGeometry::Circle { sector: None, centroid_icon: None, radius, .. } if radius == 10.0));
	assert_eq!(update.path_style.unwrap().fill_pattern, None);
}

#[test]
fn open_area_polygon_is_dashed_without_centroid_icon() {
	let mut element = MapElement::from_seed(&seed(Category::Area));
	element.properties.element.kind = "OPEN".into();
	element.properties.style.fill_color = Some(FillColor {
		hex8: "#00ff0080".into(),
		extra: Map::new(),
	});
	element.geometry.coordinates = Coordinates::Polygon(vec![vec![
		LatLng::new(0.0, 0.0),
		LatLng::new(0.0, 1.0),
		LatLng::new(1.0, 1.0),
		LatLng::new(0.0, 0.0),
	]]);

	let update = element.shape_update(ShapeKind::Polygon, &ctx(Capabilities::all())).unwrap();
	let style = update.path_style.unwrap();
	assert_eq!(style.dash_array, Some("5,1,4"));
	assert_eq!(style.color.as_deref(), Some("#00ff0080"));
	assert_eq!(style.fill_opacity, Some(0.5));
	assert!(matches!(update.geometry, ShapeGeometry::Polygon { centroid_icon: None, .. }));
}

#[test]
fn marker_has_no_path_style() {
	let mut element = MapElement::from_seed(&seed(Category::Player));
	element.geometry = RenderGeometry::point(LatLng::new(1.0, 2.0));
	let update = element.shape_update(ShapeKind::Marker, &ctx(Capabilities::all())).unwrap();
	assert_eq!(update.path_style, None);
	assert!(matches!(update.geometry, ShapeGeometry::Marker { icon: Some(_), .. }));
}

#[test]
fn mismatched_geometry_produces_no_update() {
	let mut element = MapElement::from_seed(&seed(Category::Obstacle));
	element.geometry = RenderGeometry::point(LatLng::new(1.0, 2.0));
	assert_eq!(element.shape_update(ShapeKind::Polyline, &ctx(Capabilities::all())), None);
}

#[test]
fn apply_to_surface_is_idempotent_and_detaches_inactive() {
	let mut surface = HeadlessSurface::default();
	let ctx = ctx(surface.capabilities());
	let mut element = MapElement::from_seed(&seed(Category::Player));
	element.geometry = RenderGeometry::point(LatLng::new(1.0, 2.0));
	let handle = surface.create(ShapeKind::Marker);
	surface.attach(handle.id);
	element.handle = Some(handle);

	element.apply_to_surface(&mut surface, &ctx);
	let first = surface.record(handle.id).unwrap().last_update.clone();
	element.apply_to_surface(&mut surface, &ctx);
	assert_eq!(surface.record(handle.id).unwrap().last_update, first);
	assert!(surface.is_attached(handle.id));

	element.properties.element.active = false;
	element.apply_to_surface(&mut surface, &ctx);
	assert!(!surface.is_attached(handle.id));
}

fn arb_element() -> impl Strategy<Value = MapElement> {
	(any::<bool>(), "[a-z]{0,8}", -80.0f64..80.0, -170.0f64..170.0, proptest::option::of(1.0f64..500.0)).prop_map(
		|(active, name, lat, lng, radius)| {
			let mut element = MapElement::from_seed(&seed(Category::Safeguard));
			element.properties.element.active = active;
			element.properties.element.name = name;
			element.properties.attributes = json!({ "range": { "max": radius } });
			element.geometry = match radius {
				Some(r) => RenderGeometry::circle(LatLng::new(lat, lng), r),
				None => RenderGeometry::point(LatLng::new(lat, lng)),
			};
			element
		},
	)
}

proptest! {
	/// Restoring an element from its own backup leaves it unchanged.
	#[test]
	fn prop_restore_from_own_backup_is_noop(element in arb_element()) {
		let mut restored = element.clone();
		restored.restore(element.clone_for_backup());
		prop_assert_eq!(restored, element);
	}
}
