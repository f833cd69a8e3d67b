//! Hit areas for circular safeguards.
//!
//! A safeguard sector can be far larger than the icon marking it, and is hidden by
//! default. Its pointer target is instead a small polygon around the center. Clicking
//! toggles a sticky reveal, hovering reveals while the pointer stays, and a right-click
//! reveals and starts editing the owner.

use casemap_primitives::geometry::ring_contains;
use casemap_primitives::{Category, HandleId, LatLng};
use indexmap::IndexMap;

use crate::element::MapElement;
use crate::render::{PathStyle, RenderSurface};
use crate::session::MapSession;

/// Circular safeguards render as hidden sectors behind a hitbox.
pub(crate) fn uses_hitbox(element: &MapElement) -> bool {
	element.category() == Category::Safeguard && element.geometry.is_circle()
}

/// Closed ring approximating a circle of `radius_m` meters around `center`.
pub fn geodesic_ring(center: LatLng, radius_m: f64, steps: usize) -> Vec<LatLng> {
	let steps = steps.max(3);
	let mut ring: Vec<LatLng> = (0..steps)
		.map(|i| center.destination(360.0 * i as f64 / steps as f64, radius_m))
		.collect();
	ring.push(ring[0]);
	ring
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hitbox {
	pub id: HandleId,
	/// Handle of the safeguard this hitbox stands in for.
	pub owner: HandleId,
	/// Owner center the ring was built around.
	pub center: LatLng,
	pub ring: Vec<LatLng>,
	/// Sticky reveal toggled by clicks.
	pub force_show: bool,
}

#[derive(Debug, Default)]
pub struct HitboxRegistry {
	entries: IndexMap<HandleId, Hitbox>,
}

impl HitboxRegistry {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, id: HandleId) -> Option<&Hitbox> {
		self.entries.get(&id)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Hitbox> {
		self.entries.values()
	}

	pub fn for_owner(&self, owner: HandleId) -> Option<&Hitbox> {
		self.entries.values().find(|h| h.owner == owner)
	}

	/// Topmost hitbox containing `point`.
	pub fn hit_test(&self, point: LatLng) -> Option<HandleId> {
		self.entries.values().rev().find(|h| ring_contains(&h.ring, point)).map(|h| h.id)
	}

	fn insert(&mut self, hitbox: Hitbox) {
		self.entries.insert(hitbox.id, hitbox);
	}

	fn get_mut(&mut self, id: HandleId) -> Option<&mut Hitbox> {
		self.entries.get_mut(&id)
	}

	fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hitbox> {
		self.entries.values_mut()
	}

	fn remove(&mut self, id: HandleId, surface: &mut dyn RenderSurface) {
		if self.entries.shift_remove(&id).is_some() {
			surface.destroy(id);
		}
	}

	pub(crate) fn remove_owner(&mut self, owner: HandleId, surface: &mut dyn RenderSurface) {
		let ids: Vec<_> = self.entries.values().filter(|h| h.owner == owner).map(|h| h.id).collect();
		for id in ids {
			self.remove(id, surface);
		}
	}

	pub(crate) fn clear(&mut self, surface: &mut dyn RenderSurface) {
		for id in self.entries.keys() {
			surface.destroy(*id);
		}
		self.entries.clear();
	}
}

impl<S: RenderSurface> MapSession<S> {
	pub(crate) fn install_hitbox(&mut self, owner: HandleId) {
		let Some(center) = self.cache.get_by_handle(owner).and_then(|e| e.geometry.center()) else {
			return;
		};
		let cfg = &self.config.hitbox;
		let ring = geodesic_ring(center, cfg.radius_m, cfg.steps);
		let style = PathStyle {
			opacity: Some(0.0),
			fill_opacity: Some(cfg.idle_fill_opacity),
			fill: true,
			..PathStyle::default()
		};
		let id = self.surface.create_hitbox(&ring, &style);
		tracing::trace!(%owner, hitbox = %id, "map.hitbox.installed");
		self.hitboxes.insert(Hitbox {
			id,
			owner,
			center,
			ring,
			force_show: false,
		});
	}

	/// Re-derives the hitbox of a cached element after its data changed.
	///
	/// An active circular safeguard is hidden from the pointer, painted according to its
	/// sticky reveal, and gets a hitbox around its current center. Any other element loses
	/// its hitbox.
	pub(crate) fn sync_hitbox(&mut self, owner: HandleId) {
		let previous = self.hitboxes.for_owner(owner).map(|h| (h.center, h.force_show));
		let Some(element) = self.cache.get_mut(owner).filter(|e| uses_hitbox(e) && e.is_active()) else {
			self.hitboxes.remove_owner(owner, &mut self.surface);
			return;
		};
		let force = previous.is_some_and(|(_, force)| force);
		let opacity = if force { 1.0 } else { 0.0 };
		element.properties.interactive = false;
		element.properties.style.opacity = Some(opacity);
		element.properties.style.fill_opacity = Some(opacity);
		element.apply_to_surface(&mut self.surface, &self.render);

		let center = element.geometry.center();
		if previous.is_some_and(|(at, _)| Some(at) == center) {
			return;
		}
		self.hitboxes.remove_owner(owner, &mut self.surface);
		self.install_hitbox(owner);
		if force && let Some(hitbox) = self.hitboxes.iter_mut().find(|h| h.owner == owner) {
			hitbox.force_show = true;
		}
	}

	/// Click on a hitbox: toggles the sticky reveal of its owner.
	pub fn hitbox_click(&mut self, hitbox: HandleId) -> bool {
		let Some(entry) = self.hitboxes.get_mut(hitbox) else {
			return false;
		};
		entry.force_show = !entry.force_show;
		let force = entry.force_show;
		self.show_sector(hitbox, force, force)
	}

	/// Pointer entered (`true`) or left (`false`) a hitbox.
	pub fn hitbox_hover(&mut self, hitbox: HandleId, entered: bool) -> bool {
		let Some(force) = self.hitboxes.get(hitbox).map(|h| h.force_show) else {
			return false;
		};
		self.show_sector(hitbox, entered, force)
	}

	/// Right-click on a hitbox: pins the reveal and routes the click to the owner.
	pub fn hitbox_context(&mut self, hitbox: HandleId) -> bool {
		let Some(entry) = self.hitboxes.get_mut(hitbox) else {
			return false;
		};
		entry.force_show = true;
		let owner = entry.owner;
		if !self.show_sector(hitbox, true, true) {
			return false;
		}
		self.context_click(owner);
		true
	}

	/// Hitbox under a map position.
	pub fn hitbox_at(&self, point: LatLng) -> Option<HandleId> {
		self.hitboxes.hit_test(point)
	}

	/// Reveals or hides the owner of a hitbox. Hitboxes of inactive or removed owners are dropped.
	fn show_sector(&mut self, hitbox: HandleId, show: bool, force: bool) -> bool {
		let Some(owner) = self.hitboxes.get(hitbox).map(|h| h.owner) else {
			return false;
		};
		let Some(element) = self.cache.get_mut(owner).filter(|e| e.is_active()) else {
			tracing::debug!(%hitbox, %owner, "map.hitbox.orphaned");
			self.hitboxes.remove(hitbox, &mut self.surface);
			return false;
		};
		let opacity = if show || force { 1.0 } else { 0.0 };
		element.properties.style.opacity = Some(opacity);
		element.properties.style.fill_opacity = Some(opacity);
		element.apply_to_surface(&mut self.surface, &self.render);
		true
	}
}
