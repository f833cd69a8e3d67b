use casemap_primitives::{Category, LatLng, RenderGeometry};
use proptest::prelude::*;

use super::*;
use crate::element::Seed;
use crate::render::{HeadlessSurface, ShapeKind};

fn element(surface: &mut HeadlessSurface, id: Option<&str>) -> MapElement {
	let mut element = MapElement::from_seed(&Seed {
		kind: "WALL".into(),
		category: Category::Obstacle,
		category_id: None,
		case_id: None,
		icon: None,
		title: "Wall".into(),
		description: None,
		shapes: Vec::new(),
	});
	element.id = id.map(ElementId::from);
	element.geometry = RenderGeometry::point(LatLng::new(0.0, 0.0));
	let handle = surface.create(ShapeKind::Marker);
	surface.attach(handle.id);
	element.handle = Some(handle);
	element
}

fn handle_of(element: &MapElement) -> HandleId {
	element.handle.unwrap().id
}

#[test]
fn insert_indexes_both_keys() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	let e = element(&mut surface, Some("a"));
	let handle = handle_of(&e);
	cache.insert(e).unwrap();

	let id = ElementId::from("a");
	assert_eq!(cache.handle_for_id(&id), Some(handle));
	assert_eq!(cache.get_by_id(&id), cache.get_by_handle(handle));
}

#[test]
fn insert_without_handle_is_rejected() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	let mut e = element(&mut surface, Some("a"));
	e.handle = None;
	assert_eq!(cache.insert(e), Err(CacheError::MissingHandle));
	assert!(cache.is_empty());
}

#[test]
fn id_collision_leaves_cache_unchanged() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	let first = element(&mut surface, Some("a"));
	let first_handle = handle_of(&first);
	cache.insert(first).unwrap();

	let err = cache.insert(element(&mut surface, Some("a"))).unwrap_err();
	assert!(matches!(err, CacheError::IdCollision { existing, .. } if existing == first_handle));
	assert_eq!(cache.len(), 1);
	assert_eq!(cache.handle_for_id(&ElementId::from("a")), Some(first_handle));
}

#[test]
fn assign_id_indexes_unsaved_element() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	let e = element(&mut surface, None);
	let handle = handle_of(&e);
	cache.insert(e).unwrap();

	cache.assign_id(handle, ElementId::from("fresh")).unwrap();
	assert_eq!(cache.handle_for_id(&ElementId::from("fresh")), Some(handle));
	assert_eq!(cache.get_by_handle(handle).and_then(|e| e.id.clone()), Some(ElementId::from("fresh")));
	assert_eq!(cache.assign_id(HandleId(999), ElementId::from("other")), Err(CacheError::UnknownHandle(HandleId(999))));
}

#[test]
fn remove_by_id_destroys_and_unindexes() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	let e = element(&mut surface, Some("a"));
	let handle = handle_of(&e);
	cache.insert(e).unwrap();

	let removed = cache.remove(CacheKey::Id(ElementId::from("a")), &mut surface).unwrap();
	assert_eq!(removed.id, Some(ElementId::from("a")));
	assert_eq!(removed.handle, None);
	assert!(surface.record(handle).is_none());
	assert_eq!(cache.get_by_handle(handle), None);
	assert_eq!(cache.handle_for_id(&ElementId::from("a")), None);
	assert!(cache.remove(CacheKey::Handle(handle), &mut surface).is_none());
}

#[test]
fn wipe_destroys_everything() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	for id in ["a", "b", "c"] {
		let e = element(&mut surface, Some(id));
		cache.insert(e).unwrap();
	}
	assert_eq!(surface.attached_count(), 3);
	cache.wipe_all(&mut surface);
	assert_eq!(surface.attached_count(), 0);
	assert_eq!(surface.records().count(), 0);
	assert!(cache.is_empty());
	assert_eq!(cache.get_by_id(&ElementId::from("b")), None);
}

#[test]
fn last_active_skips_inactive_tail() {
	let mut surface = HeadlessSurface::default();
	let mut cache = ElementCache::new();
	let first = element(&mut surface, Some("a"));
	let first_handle = handle_of(&first);
	cache.insert(first).unwrap();
	let mut second = element(&mut surface, Some("b"));
	second.properties.element.active = false;
	cache.insert(second).unwrap();
	assert_eq!(cache.last_active_handle(), Some(first_handle));
}

#[derive(Debug, Clone)]
enum Op {
	Insert(u8),
	RemoveId(u8),
	RemoveHandle(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0u8..6).prop_map(Op::Insert),
		(0u8..6).prop_map(Op::RemoveId),
		(0usize..12).prop_map(Op::RemoveHandle),
	]
}

proptest! {
	/// Both indices agree on every cached element after any operation sequence.
	#[test]
	fn prop_indices_stay_coherent(ops in proptest::collection::vec(arb_op(), 1..40)) {
		let mut surface = HeadlessSurface::default();
		let mut cache = ElementCache::new();
		let mut handles = Vec::new();

		for op in ops {
			match op {
				Op::Insert(n) => {
					let e = element(&mut surface, Some(&format!("e{n}")));
					let handle = handle_of(&e);
					handles.push(handle);
					if cache.insert(e).is_err() {
						surface.destroy(handle);
					}
				}
				Op::RemoveId(n) => {
					let _ = cache.remove(CacheKey::Id(ElementId::new(format!("e{n}"))), &mut surface);
				}
				Op::RemoveHandle(i) => {
					if let Some(handle) = handles.get(i) {
						let _ = cache.remove(CacheKey::Handle(*handle), &mut surface);
					}
				}
			}

			for element in cache.iter() {
				let handle = handle_of(element);
				let id = element.id.as_ref().unwrap();
				prop_assert_eq!(cache.handle_for_id(id), Some(handle));
				prop_assert!(surface.is_attached(handle));
			}
			for handle in &handles {
				if !cache.contains_handle(*handle) {
					prop_assert!(surface.record(*handle).is_none());
				}
			}
			prop_assert_eq!(surface.records().count(), cache.len());
		}
	}
}
