//! Dual-index element cache.
//!
//! Elements are owned by a single map keyed by render handle, in insertion order.
//! A secondary index maps server ids to handles. Both are updated together.

#[cfg(test)]
mod tests;

use casemap_primitives::{ElementId, HandleId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::element::MapElement;
use crate::render::RenderSurface;

/// Cache invariant violations. Logged by the cache; the operation changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
	#[error("element has no render handle")]
	MissingHandle,
	#[error("element id {id} already belongs to handle {existing}")]
	IdCollision { id: ElementId, existing: HandleId },
	#[error("no element under handle {0}")]
	UnknownHandle(HandleId),
}

/// Lookup key for [`ElementCache::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
	Id(ElementId),
	Handle(HandleId),
}

#[derive(Debug, Default)]
pub struct ElementCache {
	by_handle: IndexMap<HandleId, MapElement>,
	by_id: FxHashMap<ElementId, HandleId>,
}

impl ElementCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.by_handle.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_handle.is_empty()
	}

	/// Stores an element under its handle and indexes its id, if any.
	///
	/// Re-inserting under the same handle replaces the previous element.
	pub fn insert(&mut self, element: MapElement) -> Result<(), CacheError> {
		let Some(handle) = element.handle.map(|h| h.id) else {
			tracing::error!(id = ?element.id, "map.cache.insert.missing_handle");
			return Err(CacheError::MissingHandle);
		};
		if let Some(id) = &element.id
			&& let Some(&existing) = self.by_id.get(id)
			&& existing != handle
		{
			tracing::error!(%id, %existing, %handle, "map.cache.insert.id_collision");
			return Err(CacheError::IdCollision { id: id.clone(), existing });
		}
		if let Some(old) = self.by_handle.get(&handle).and_then(|e| e.id.clone())
			&& element.id.as_ref() != Some(&old)
		{
			self.by_id.remove(&old);
		}
		if let Some(id) = &element.id {
			self.by_id.insert(id.clone(), handle);
		}
		self.by_handle.insert(handle, element);
		Ok(())
	}

	/// Indexes a server id for an element that was cached before it had one.
	pub fn assign_id(&mut self, handle: HandleId, id: ElementId) -> Result<(), CacheError> {
		if let Some(&existing) = self.by_id.get(&id)
			&& existing != handle
		{
			tracing::error!(%id, %existing, %handle, "map.cache.assign_id.collision");
			return Err(CacheError::IdCollision { id, existing });
		}
		let Some(element) = self.by_handle.get_mut(&handle) else {
			tracing::error!(%handle, "map.cache.assign_id.unknown_handle");
			return Err(CacheError::UnknownHandle(handle));
		};
		if let Some(old) = element.id.replace(id.clone())
			&& old != id
		{
			self.by_id.remove(&old);
		}
		self.by_id.insert(id, handle);
		Ok(())
	}

	/// Removes an element from both indices and destroys its handle.
	///
	/// The returned element no longer has a handle.
	pub fn remove(&mut self, key: CacheKey, surface: &mut dyn RenderSurface) -> Option<MapElement> {
		let handle = match &key {
			CacheKey::Handle(handle) => *handle,
			CacheKey::Id(id) => match self.by_id.get(id) {
				Some(handle) => *handle,
				None => {
					tracing::error!(%id, "map.cache.remove.unknown_id");
					return None;
				}
			},
		};
		let Some(mut element) = self.by_handle.shift_remove(&handle) else {
			tracing::error!(%handle, "map.cache.remove.unknown_handle");
			return None;
		};
		if let Some(id) = &element.id {
			self.by_id.remove(id);
		}
		surface.detach(handle);
		surface.destroy(handle);
		element.handle = None;
		tracing::trace!(%handle, id = ?element.id, "map.cache.removed");
		Some(element)
	}

	/// Destroys every handle and clears both indices.
	pub fn wipe_all(&mut self, surface: &mut dyn RenderSurface) {
		for handle in self.by_handle.keys() {
			surface.detach(*handle);
			surface.destroy(*handle);
		}
		tracing::debug!(count = self.by_handle.len(), "map.cache.wiped");
		self.by_handle.clear();
		self.by_id.clear();
	}

	pub fn get_by_handle(&self, handle: HandleId) -> Option<&MapElement> {
		self.by_handle.get(&handle)
	}

	pub fn get_by_id(&self, id: &ElementId) -> Option<&MapElement> {
		self.by_handle.get(self.by_id.get(id)?)
	}

	pub fn get_mut(&mut self, handle: HandleId) -> Option<&mut MapElement> {
		self.by_handle.get_mut(&handle)
	}

	pub fn handle_for_id(&self, id: &ElementId) -> Option<HandleId> {
		self.by_id.get(id).copied()
	}

	pub fn contains_handle(&self, handle: HandleId) -> bool {
		self.by_handle.contains_key(&handle)
	}

	/// Elements in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &MapElement> {
		self.by_handle.values()
	}

	/// Most recently inserted active element.
	pub fn last_active_handle(&self) -> Option<HandleId> {
		self.by_handle.iter().rev().find(|(_, e)| e.is_active()).map(|(h, _)| *h)
	}
}
