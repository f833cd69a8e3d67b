use std::sync::Arc;

use casemap_gateway::{GatewayCall, MemoryGateway};
use casemap_primitives::{CaseId, Category, ElementId, LatLng};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Value, json};

use super::*;
use crate::cache::CacheKey;
use crate::config::MapConfig;
use crate::fsm::MapState;
use crate::render::HeadlessSurface;

fn feature(id: Option<&str>, category: &str, active: bool, geometry: Value) -> Feature {
	serde_json::from_value(json!({
		"type": "Feature",
		"_id": id,
		"geometry": geometry,
		"properties": {
			"element": {
				"type": "CAMERA",
				"category": category,
				"active": active,
				"name": "cam",
				"title": "Camera",
			},
		},
	}))
	.unwrap()
}

fn circle() -> Value {
	json!({ "type": "Point", "subtype": "Circle", "coordinates": [4.0, 52.0], "radius": 25.0 })
}

fn square() -> Value {
	json!({ "type": "Polygon", "coordinates": [[[4.0, 52.0], [4.1, 52.0], [4.1, 52.1], [4.0, 52.0]]] })
}

fn session(gateway: Arc<MemoryGateway>) -> MapSession<HeadlessSurface> {
	let mut session = MapSession::new(HeadlessSurface::default(), gateway, MapConfig::default());
	session.case = Some(CaseId::new("case-1"));
	session
}

fn idle_session() -> MapSession<HeadlessSurface> {
	session(Arc::new(MemoryGateway::new()))
}

fn category_strategy() -> impl Strategy<Value = (Category, &'static str)> {
	prop::sample::select(vec![
		(Category::Area, "AREA"),
		(Category::Obstacle, "OBS"),
		(Category::Safeguard, "SFG"),
		(Category::Player, "PLY"),
	])
}

proptest! {
	#[test]
	fn prop_classify_lands_in_exactly_one_bucket((category, tag) in category_strategy(), is_circle in any::<bool>()) {
		let geometry = if is_circle { circle() } else { square() };
		let bucket = ImportBucket::classify(&feature(None, tag, true, geometry));
		let expected = match category {
			Category::Area => ImportBucket::Area,
			Category::Obstacle => ImportBucket::Obstacle,
			Category::Player => ImportBucket::Player,
			Category::Safeguard if is_circle => ImportBucket::Hitbox,
			Category::Safeguard => ImportBucket::Safeguard,
		};
		prop_assert_eq!(bucket, expected);
		prop_assert_eq!(ImportBucket::ALL.iter().filter(|b| **b == bucket).count(), 1);
	}
}

#[test]
fn stages_attach_in_layer_order() {
	let mut session = idle_session();
	let collection = FeatureCollection::new(vec![
		feature(Some("ply"), "PLY", true, square()),
		feature(Some("sfg-circle"), "SFG", true, circle()),
		feature(Some("area"), "AREA", true, square()),
		feature(Some("sfg-poly"), "SFG", true, square()),
		feature(Some("obs"), "OBS", true, square()),
	]);

	let report = session.import_feature_collection(collection, false);
	assert_eq!(report.queued, 5);
	assert!(report.failed.is_empty());
	assert_eq!(session.imports.pending(ImportBucket::Hitbox).len(), 1);
	// Only the hitbox is on the surface before the first flush.
	assert_eq!(session.surface.attached_count(), 1);

	assert_eq!(session.flush_all_stages(), 5);
	assert!(!session.imports.has_pending());

	let order: Vec<&str> = session
		.surface
		.attach_log()
		.iter()
		.filter_map(|h| session.cache.get_by_handle(*h))
		.filter_map(|e| e.id.as_ref().map(ElementId::as_str))
		.collect();
	assert_eq!(order, vec!["area", "obs", "sfg-poly", "sfg-circle", "ply"]);
}

#[test]
fn one_bad_geometry_fails_only_that_feature() {
	let mut session = idle_session();
	let collection = FeatureCollection::new(vec![
		feature(Some("a"), "OBS", true, square()),
		feature(Some("b"), "OBS", true, json!({ "type": "GeometryCollection", "coordinates": [] })),
		feature(Some("c"), "OBS", true, square()),
	]);

	let report = session.import_feature_collection(collection, false);
	assert_eq!(report.queued, 2);
	assert_eq!(
		report.failed,
		vec![ImportError::Geometry {
			index: 1,
			source: GeometryError::UnknownType("GeometryCollection".into()),
		}]
	);
	assert_eq!(session.cache.len(), 2);
}

#[test]
fn duplicate_ids_are_reported_and_destroyed() {
	let mut session = idle_session();
	let collection = FeatureCollection::new(vec![
		feature(Some("dup"), "OBS", true, square()),
		feature(Some("dup"), "OBS", true, square()),
	]);

	let report = session.import_feature_collection(collection, false);
	assert_eq!(report.queued, 1);
	assert!(matches!(report.failed.as_slice(), [ImportError::Cache { index: 1, .. }]));
	assert_eq!(session.surface.records().count(), 1);
}

#[test]
fn imported_features_are_stamped_with_the_case() {
	let mut session = idle_session();
	session.import_feature_collection(FeatureCollection::new(vec![feature(Some("a"), "OBS", true, square())]), false);
	let element = session.cache.get_by_id(&ElementId::new("a")).unwrap();
	assert_eq!(element.properties.element.case_id, Some(CaseId::new("case-1")));
	assert!(element.properties.interactive);
}

#[tokio::test]
async fn force_save_sends_creates_instead_of_caching() {
	let gateway = Arc::new(MemoryGateway::new());
	let mut session = session(gateway.clone());
	let collection = FeatureCollection::new(vec![
		feature(None, "OBS", true, square()),
		feature(None, "AREA", true, square()),
	]);

	let report = session.import_feature_collection(collection, true);
	assert_eq!(report.saved, 2);
	assert_eq!(report.queued, 0);
	assert!(session.cache.is_empty());
	assert_eq!(session.surface.records().count(), 0);

	session.next_message().await.unwrap();
	session.next_message().await.unwrap();

	let calls = gateway.calls();
	assert_eq!(calls.len(), 2);
	for call in &calls {
		let GatewayCall::CreateOrUpdate(sent) = call else {
			panic!("unexpected call {call:?}");
		};
		assert_eq!(sent.id, None);
		assert_eq!(sent.properties.element.case_id, Some(CaseId::new("case-1")));
	}
	// The acknowledged copies arrive like any unknown server element.
	assert_eq!(session.cache.len(), 2);
	assert!(session.cache.iter().all(|e| e.id.is_some()));
}

#[test]
fn only_active_circular_safeguards_get_hitboxes() {
	let mut session = idle_session();
	let collection = FeatureCollection::new(vec![
		feature(Some("on"), "SFG", true, circle()),
		feature(Some("off"), "SFG", false, circle()),
	]);

	session.import_feature_collection(collection, false);
	assert_eq!(session.imports.pending(ImportBucket::Hitbox).len(), 2);
	assert_eq!(session.hitboxes.len(), 1);

	let owner = session.cache.handle_for_id(&ElementId::new("on")).unwrap();
	let hitbox = session.hitboxes.for_owner(owner).unwrap();
	let style = session.surface.record(hitbox.id).and_then(|r| r.hitbox_style.clone()).unwrap();
	assert_eq!(style.opacity, Some(0.0));
	assert_eq!(style.fill_opacity, Some(session.config.hitbox.idle_fill_opacity));

	// The sector itself starts hidden and ignores the pointer.
	let sector = session.cache.get_by_handle(owner).unwrap();
	assert!(!sector.properties.interactive);
	assert_eq!(sector.properties.style.opacity, Some(0.0));
}

#[test]
fn hitbox_hit_test_covers_the_center_only() {
	let mut session = idle_session();
	session.import_feature_collection(FeatureCollection::new(vec![feature(Some("s"), "SFG", true, circle())]), false);
	let hitbox = session.hitboxes.iter().next().unwrap().id;

	assert_eq!(session.hitbox_at(LatLng::new(52.0, 4.0)), Some(hitbox));
	// 25 m sector radius, 2 m hitbox.
	assert_eq!(session.hitbox_at(LatLng::new(52.0, 4.0).destination(90.0, 10.0)), None);
}

#[test]
fn click_toggles_and_hover_reveals() {
	let mut session = idle_session();
	session.import_feature_collection(FeatureCollection::new(vec![feature(Some("s"), "SFG", true, circle())]), false);
	let owner = session.cache.handle_for_id(&ElementId::new("s")).unwrap();
	let hitbox = session.hitboxes.for_owner(owner).unwrap().id;
	let opacity = |session: &MapSession<HeadlessSurface>| session.cache.get_by_handle(owner).unwrap().properties.style.opacity;

	assert!(session.hitbox_hover(hitbox, true));
	assert_eq!(opacity(&session), Some(1.0));
	assert!(session.hitbox_hover(hitbox, false));
	assert_eq!(opacity(&session), Some(0.0));

	assert!(session.hitbox_click(hitbox));
	assert_eq!(opacity(&session), Some(1.0));
	// Sticky: leaving keeps it shown.
	session.hitbox_hover(hitbox, false);
	assert_eq!(opacity(&session), Some(1.0));

	assert!(session.hitbox_click(hitbox));
	assert_eq!(opacity(&session), Some(0.0));
}

#[test]
fn hitbox_context_pins_and_edits_the_owner() {
	let mut session = idle_session();
	session.import_feature_collection(FeatureCollection::new(vec![feature(Some("s"), "SFG", true, circle())]), false);
	session.flush_all_stages();
	let owner = session.cache.handle_for_id(&ElementId::new("s")).unwrap();
	let hitbox = session.hitboxes.for_owner(owner).unwrap().id;

	assert!(session.hitbox_context(hitbox));
	assert!(session.hitboxes.get(hitbox).unwrap().force_show);
	assert_eq!(session.state, MapState::Edit);
	assert!(session.is_editing(owner));
	assert_eq!(session.surface.focused(), Some(owner));
}

#[test]
fn orphaned_hitbox_is_dropped_on_interaction() {
	let mut session = idle_session();
	session.import_feature_collection(FeatureCollection::new(vec![feature(Some("s"), "SFG", true, circle())]), false);
	let owner = session.cache.handle_for_id(&ElementId::new("s")).unwrap();
	let hitbox = session.hitboxes.for_owner(owner).unwrap().id;

	session.cache.remove(CacheKey::Handle(owner), &mut session.surface);
	assert!(!session.hitbox_click(hitbox));
	assert!(session.hitboxes.is_empty());
	assert!(session.surface.record(hitbox).is_none());
}

#[test]
fn export_preserves_insertion_order() {
	let mut session = idle_session();
	session.import_feature_collection(
		FeatureCollection::new(vec![
			feature(Some("z"), "PLY", true, square()),
			feature(Some("a"), "AREA", true, square()),
			feature(Some("m"), "SFG", true, circle()),
		]),
		false,
	);
	session.flush_all_stages();

	let exported = session.export_feature_collection();
	let ids: Vec<_> = exported.features.iter().map(|f| f.id.clone().unwrap()).collect();
	assert_eq!(ids, vec![ElementId::new("z"), ElementId::new("a"), ElementId::new("m")]);
	assert_eq!(exported.features[2].geometry.subtype.as_deref(), Some("Circle"));
	assert_eq!(exported.features[2].geometry.coordinates, json!([4.0, 52.0]));
}

#[tokio::test]
async fn flush_imports_focuses_last_active_element() {
	let mut session = idle_session();
	session.import_feature_collection(
		FeatureCollection::new(vec![
			feature(Some("a"), "OBS", true, square()),
			feature(Some("b"), "OBS", true, square()),
			feature(Some("c"), "OBS", false, square()),
		]),
		false,
	);
	session.flush_imports().await;

	let last_active = session.cache.handle_for_id(&ElementId::new("b"));
	assert_eq!(session.surface.focused(), last_active);
	let inactive = session.cache.handle_for_id(&ElementId::new("c")).unwrap();
	assert!(!session.surface.is_attached(inactive));
}
