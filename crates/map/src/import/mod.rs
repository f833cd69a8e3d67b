//! Import and export of feature collections.
//!
//! Imports are staged: every feature is converted, cached and queued in its
//! [`ImportBucket`] first, hitboxes are installed, and only then are the buckets
//! attached to the surface in strict order (areas at the bottom, players on top).

mod hitbox;
#[cfg(test)]
mod tests;

use casemap_gateway::{Feature, FeatureCollection};
use casemap_primitives::{Category, GeometryError, HandleId, Subtype};
use thiserror::Error;

pub use hitbox::{Hitbox, HitboxRegistry, geodesic_ring};

use crate::cache::CacheError;
use crate::element::MapElement;
use crate::render::{RenderSurface, ShapeKind};
use crate::session::MapSession;

/// Import stage of a feature. Stages flush in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportBucket {
	Area,
	Obstacle,
	Safeguard,
	/// Circular safeguards, which get a hitbox.
	Hitbox,
	Player,
}

impl ImportBucket {
	pub const ALL: [Self; 5] = [Self::Area, Self::Obstacle, Self::Safeguard, Self::Hitbox, Self::Player];

	pub fn classify(feature: &Feature) -> Self {
		match feature.properties.element.category {
			Category::Area => Self::Area,
			Category::Obstacle => Self::Obstacle,
			Category::Player => Self::Player,
			Category::Safeguard if feature.geometry.subtype.as_deref() == Some(Subtype::Circle.as_str()) => Self::Hitbox,
			Category::Safeguard => Self::Safeguard,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Area => "area",
			Self::Obstacle => "obstacle",
			Self::Safeguard => "safeguard",
			Self::Hitbox => "hitbox",
			Self::Player => "player",
		}
	}

	const fn index(self) -> usize {
		self as usize
	}
}

/// Per-feature import failure. The rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
	#[error("feature {index}: {source}")]
	Geometry { index: usize, source: GeometryError },
	#[error("feature {index}: geometry is empty")]
	EmptyGeometry { index: usize },
	#[error("feature {index}: {source}")]
	Cache { index: usize, source: CacheError },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportReport {
	/// Features cached and staged for display.
	pub queued: usize,
	/// Features sent to the gateway instead of being cached.
	pub saved: usize,
	pub failed: Vec<ImportError>,
}

/// Handles staged per bucket, waiting to be attached.
#[derive(Debug, Default)]
pub struct ImportQueue {
	buckets: [Vec<HandleId>; 5],
}

impl ImportQueue {
	pub fn push(&mut self, bucket: ImportBucket, handle: HandleId) {
		self.buckets[bucket.index()].push(handle);
	}

	pub fn has_pending(&self) -> bool {
		self.buckets.iter().any(|b| !b.is_empty())
	}

	pub fn pending(&self, bucket: ImportBucket) -> &[HandleId] {
		&self.buckets[bucket.index()]
	}

	pub fn clear(&mut self) {
		self.buckets.iter_mut().for_each(Vec::clear);
	}

	/// Takes the first non-empty stage.
	fn take_next(&mut self) -> Option<(ImportBucket, Vec<HandleId>)> {
		let bucket = ImportBucket::ALL.into_iter().find(|b| !self.buckets[b.index()].is_empty())?;
		Some((bucket, std::mem::take(&mut self.buckets[bucket.index()])))
	}
}

impl<S: RenderSurface> MapSession<S> {
	/// Converts, caches and stages a collection.
	///
	/// With `force_save`, elements are sent to the gateway instead and never cached.
	/// Elements are stamped with the selected case.
	pub fn import_feature_collection(&mut self, collection: FeatureCollection, force_save: bool) -> ImportReport {
		let mut report = ImportReport::default();
		let mut hitbox_owners = Vec::new();

		for (index, mut feature) in collection.features.into_iter().enumerate() {
			let bucket = ImportBucket::classify(&feature);
			match &self.case {
				Some(case) => feature.properties.element.case_id = Some(case.clone()),
				None => tracing::warn!(index, "map.import.no_case"),
			}
			feature.properties.interactive = true;
			if bucket == ImportBucket::Hitbox {
				// The hitbox takes pointer events; the sector itself stays hidden until revealed.
				feature.properties.interactive = false;
				feature.properties.style.opacity = Some(0.0);
				feature.properties.style.fill_opacity = Some(0.0);
			}

			let mut element = match MapElement::from_feature(feature) {
				Ok(element) => element,
				Err(source) => {
					tracing::error!(index, %source, "map.import.geometry");
					report.failed.push(ImportError::Geometry { index, source });
					continue;
				}
			};
			let Some(kind) = ShapeKind::for_geometry(&element.geometry) else {
				tracing::error!(index, "map.import.empty_geometry");
				report.failed.push(ImportError::EmptyGeometry { index });
				continue;
			};
			let handle = self.surface.create(kind);
			element.handle = Some(handle);

			if force_save {
				let feature = element.to_feature();
				self.surface.destroy(handle.id);
				self.commit(None, feature);
				report.saved += 1;
				continue;
			}

			element.apply_to_surface(&mut self.surface, &self.render);
			let wants_hitbox = bucket == ImportBucket::Hitbox && element.is_active();
			if let Err(source) = self.cache.insert(element) {
				self.surface.destroy(handle.id);
				report.failed.push(ImportError::Cache { index, source });
				continue;
			}
			self.imports.push(bucket, handle.id);
			if wants_hitbox {
				hitbox_owners.push(handle.id);
			}
			report.queued += 1;
		}

		for owner in hitbox_owners {
			self.install_hitbox(owner);
		}
		tracing::debug!(
			queued = report.queued,
			saved = report.saved,
			failed = report.failed.len(),
			"map.import.staged"
		);
		report
	}

	/// Attaches the next non-empty stage. Returns the stage, or `None` when nothing is staged.
	pub fn flush_next_stage(&mut self) -> Option<ImportBucket> {
		let (bucket, handles) = self.imports.take_next()?;
		for handle in &handles {
			let Some(element) = self.cache.get_by_handle(*handle) else {
				continue;
			};
			if element.is_active() {
				self.surface.attach(*handle);
			}
			element.apply_to_surface(&mut self.surface, &self.render);
		}
		tracing::debug!(stage = bucket.as_str(), count = handles.len(), "map.import.stage_flushed");
		Some(bucket)
	}

	/// Flushes every stage at once, without moving the camera.
	pub fn flush_all_stages(&mut self) -> usize {
		std::iter::from_fn(|| self.flush_next_stage()).count()
	}

	/// Flushes every stage, yielding to the runtime between stages, then focuses the
	/// last active element when configured to.
	pub async fn flush_imports(&mut self) {
		let mut flushed = false;
		while self.flush_next_stage().is_some() {
			flushed = true;
			tokio::task::yield_now().await;
		}
		if flushed
			&& self.config.focus_after_import
			&& let Some(handle) = self.cache.last_active_handle()
		{
			self.surface.focus(handle);
		}
	}

	/// Snapshot of every cached element in insertion order, in wire form.
	pub fn export_feature_collection(&self) -> FeatureCollection {
		self.cache.iter().map(MapElement::to_feature).collect()
	}
}
