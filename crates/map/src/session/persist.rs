//! Gateway round-trips and server reconciliation.
//!
//! Consistency model: local state is optimistic. A failed commit or delete raises an
//! error notification and leaves the cache as the user left it; the server copy arrives
//! again on the next case load or push. Acknowledgements reconcile quietly, and a push
//! always wins over an unsaved local edit.

use std::sync::Arc;

use casemap_gateway::{Feature, FeatureCollection, GatewayError, PushEvent, ServerElement};
use casemap_primitives::{CaseId, ElementId, HandleId};
use casemap_worker::TaskClass;

use super::MapSession;
use crate::cache::CacheKey;
use crate::fsm::{MapEvent, MapState};
use crate::msg::{CommitAction, Dirty, MapMsg};
use crate::notifications::Level;
use crate::render::RenderSurface;

impl<S: RenderSurface> MapSession<S> {
	/// Sends a create (`feature.id == None`) or update to the gateway without waiting.
	pub(crate) fn commit(&mut self, handle: Option<HandleId>, feature: Feature) {
		let action = if feature.id.is_some() {
			CommitAction::Editing
		} else {
			CommitAction::Inserting
		};
		let gateway = Arc::clone(&self.gateway);
		let tx = self.tx.clone();
		let generation = self.generation();
		self.in_flight += 1;
		tracing::debug!(action = action.as_str(), id = ?feature.id, ?handle, generation, "map.commit");

		casemap_worker::spawn(TaskClass::Background, async move {
			let result = gateway.create_or_update_element(feature).await;
			let _ = tx.send(MapMsg::Committed {
				generation,
				action,
				handle,
				result,
			});
		});
	}

	/// Asks the gateway to delete an element. The local copy goes once the server confirms.
	pub fn request_delete(&mut self, id: ElementId) {
		let gateway = Arc::clone(&self.gateway);
		let tx = self.tx.clone();
		let generation = self.generation();
		self.in_flight += 1;
		tracing::debug!(%id, generation, "map.delete");

		casemap_worker::spawn(TaskClass::Background, async move {
			let result = gateway.delete_element(&id).await;
			let _ = tx.send(MapMsg::Deleted { generation, id, result });
		});
	}

	/// Switches the visualized case.
	///
	/// Any interaction in progress is cancelled without committing, the map is wiped and
	/// the new case's elements are fetched under a fresh generation.
	pub fn select_case(&mut self, case: CaseId) {
		if self.state != MapState::Idle {
			self.transition(MapEvent::Idle { submitted: false });
		}
		self.imports.clear();
		self.acked_creates.clear();
		self.hitboxes.clear(&mut self.surface);
		self.cache.wipe_all(&mut self.surface);

		let token = self.epoch.advance();
		let generation = token.generation();
		self.case = Some(case.clone());
		self.pending_fetch = Some(generation);
		self.notifications
			.notify(Level::Info, "Case Changed", "Loaded new case map visualisation");
		tracing::info!(%case, generation, "map.case.selected");

		let gateway = Arc::clone(&self.gateway);
		let tx = self.tx.clone();
		casemap_worker::spawn_scoped(TaskClass::Interactive, &token, async move {
			let result = gateway.fetch_elements_for_case(&case).await;
			let _ = tx.send(MapMsg::CaseLoaded { generation, case, result });
		});
	}

	/// Applies a server push.
	pub fn apply_push(&mut self, event: PushEvent) -> Dirty {
		self.set_element(event.into_element())
	}

	/// Reconciles a server copy of an element.
	///
	/// Known ids are updated in place, cancelling any edit on them first. Unknown ids
	/// are imported.
	pub fn set_element(&mut self, element: ServerElement) -> Dirty {
		let info = &element.properties.element;
		let (title, name, active) = (info.title.clone(), info.name.clone(), info.active);

		let Some(handle) = self.cache.handle_for_id(&element.id) else {
			self.notifications
				.notify(Level::Success, "New Element", format!("New {title} was inserted: {name}"));
			self.import_server_element(element);
			return Dirty::FULL;
		};

		if self.is_editing(handle) {
			self.transition(MapEvent::Idle { submitted: false });
		}
		let id = element.id.clone();
		if !self.apply_server_payload(handle, element) {
			return Dirty::NONE;
		}
		// Push echo of a create this session already reconciled.
		if self.acked_creates.remove(&id) {
			tracing::debug!(%id, "map.push.own_create");
			return Dirty::REDRAW;
		}
		if active {
			self.notifications
				.notify(Level::Warn, "Element Edited", format!("{title} was edited: {name}"));
		} else {
			self.notifications
				.notify(Level::Warn, "Element Deleted", format!("{title} was deleted: {name}"));
		}
		Dirty::REDRAW
	}

	pub(crate) fn apply_commit_result(
		&mut self,
		generation: u64,
		action: CommitAction,
		handle: Option<HandleId>,
		result: Result<ServerElement, GatewayError>,
	) -> Dirty {
		self.in_flight = self.in_flight.saturating_sub(1);
		if !self.epoch.is_current(generation) {
			tracing::debug!(generation, current = self.generation(), "map.commit.stale");
			return Dirty::NONE;
		}
		match result {
			Ok(element) => self.reconcile_ack(action, handle, element),
			Err(err) => {
				let action = action.as_str();
				tracing::warn!(action, %err, "map.commit.failed");
				self.notifications
					.notify(Level::Error, action, format!("{action} of the element was unsuccessful."));
				Dirty::REDRAW
			}
		}
	}

	pub(crate) fn apply_delete_result(&mut self, generation: u64, id: ElementId, result: Result<(), GatewayError>) -> Dirty {
		self.in_flight = self.in_flight.saturating_sub(1);
		if !self.epoch.is_current(generation) {
			tracing::debug!(%id, generation, "map.delete.stale");
			return Dirty::NONE;
		}
		if let Err(err) = result {
			tracing::warn!(%id, %err, "map.delete.failed");
			self.notifications
				.notify(Level::Error, "Delete", "Deletion of the element was unsuccessful.");
			return Dirty::REDRAW;
		}

		let Some(handle) = self.cache.handle_for_id(&id) else {
			tracing::debug!(%id, "map.delete.already_gone");
			return Dirty::NONE;
		};
		if self.is_editing(handle) {
			self.transition(MapEvent::Idle { submitted: false });
		}
		self.hitboxes.remove_owner(handle, &mut self.surface);
		self.cache.remove(CacheKey::Id(id), &mut self.surface);
		Dirty::FULL
	}

	pub(crate) fn apply_case_loaded(&mut self, generation: u64, case: CaseId, result: Result<Vec<ServerElement>, GatewayError>) -> Dirty {
		if self.pending_fetch == Some(generation) {
			self.pending_fetch = None;
		}
		if !self.epoch.is_current(generation) {
			tracing::debug!(%case, generation, "map.case.stale");
			return Dirty::NONE;
		}
		match result {
			Ok(elements) => {
				let collection: FeatureCollection = elements.into_iter().map(Feature::from).collect();
				let report = self.import_feature_collection(collection, false);
				tracing::info!(%case, queued = report.queued, failed = report.failed.len(), "map.case.loaded");
				Dirty::FULL
			}
			Err(err) => {
				tracing::warn!(%case, %err, "map.case.fetch_failed");
				self.notifications
					.notify(Level::Error, "Case", "Loading the elements of the case was unsuccessful.");
				Dirty::REDRAW
			}
		}
	}

	/// Folds a create/update acknowledgement into the cache without notifying.
	///
	/// Updates for ids no longer cached (deleted, or wiped by a case switch) are dropped.
	/// Only creates without a local handle, as sent by a forced-save import, are imported.
	fn reconcile_ack(&mut self, action: CommitAction, handle: Option<HandleId>, element: ServerElement) -> Dirty {
		let local = handle.filter(|h| self.cache.contains_handle(*h));
		match (local, self.cache.handle_for_id(&element.id)) {
			(Some(local), Some(known)) if local != known => {
				// A push imported the server copy before the acknowledgement arrived.
				if self.is_editing(local) {
					self.transition(MapEvent::Idle { submitted: false });
				}
				self.hitboxes.remove_owner(local, &mut self.surface);
				self.cache.remove(CacheKey::Handle(local), &mut self.surface);
				Dirty::FULL
			}
			(Some(local), _) => {
				if self.cache.handle_for_id(&element.id).is_none() && self.cache.assign_id(local, element.id.clone()).is_err() {
					return Dirty::NONE;
				}
				if action == CommitAction::Inserting {
					self.acked_creates.insert(element.id.clone());
				}
				if self.is_editing(local) {
					return Dirty::NONE;
				}
				self.apply_server_payload(local, element);
				Dirty::REDRAW
			}
			(None, Some(known)) => {
				if !self.is_editing(known) {
					self.apply_server_payload(known, element);
				}
				Dirty::REDRAW
			}
			(None, None) if action == CommitAction::Inserting => {
				self.import_server_element(element);
				Dirty::FULL
			}
			(None, None) => {
				tracing::debug!(id = %element.id, "map.commit.ack_for_unknown");
				Dirty::NONE
			}
		}
	}

	/// Overwrites a cached element with a server copy and re-renders it.
	fn apply_server_payload(&mut self, handle: HandleId, element: ServerElement) -> bool {
		let Some(cached) = self.cache.get_mut(handle) else {
			return false;
		};
		if let Err(err) = cached.apply_server(element) {
			tracing::error!(%handle, %err, "map.reconcile.geometry");
			return false;
		}
		cached.apply_to_surface(&mut self.surface, &self.render);
		Self::sync_attachment(&mut self.surface, cached);
		self.sync_hitbox(handle);
		true
	}

	/// Imports a single server element and shows it immediately.
	fn import_server_element(&mut self, element: ServerElement) {
		let collection = FeatureCollection::new(vec![element.into()]);
		self.import_feature_collection(collection, false);
		self.flush_all_stages();
	}
}
