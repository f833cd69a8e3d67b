use casemap_primitives::{Category, path};
use serde_json::json;

use super::{Current, MapSession};
use crate::element::{MapElement, Seed};
use crate::fsm::{self, DrawnShape, EditTarget, MapEvent, MapState};
use crate::notifications::Level;
use crate::render::RenderSurface;

impl<S: RenderSurface> MapSession<S> {
	/// Feeds an event to the interaction state machine.
	///
	/// Returns `false` when the event is not valid in the current state; nothing changes then.
	pub fn transition(&mut self, event: MapEvent) -> bool {
		let from = self.state;
		let kind = event.kind();
		let Some(to) = fsm::next_state(from, kind) else {
			tracing::debug!(state = %from, event = %kind, "map.transition.rejected");
			return false;
		};
		tracing::debug!(%from, %to, "map.transition");

		// Only an explicit IDLE reports the cancellation to the user.
		let (submitted, explicit) = match event {
			MapEvent::Idle { submitted } => (submitted, true),
			_ => (false, false),
		};
		match from {
			MapState::Idle => {}
			// The draft carries over into INSERT.
			MapState::Draw if to == MapState::Insert => {}
			MapState::Draw => self.end_draw(explicit),
			MapState::Insert => self.end_insert(submitted, explicit),
			MapState::Edit => self.end_edit(submitted, explicit),
		}

		self.state = to;
		match event {
			MapEvent::Draw(seed) => self.start_draw(&seed),
			MapEvent::Insert(drawn) => self.start_insert(drawn),
			MapEvent::Edit(target) => {
				if !self.start_edit(&target) {
					self.state = MapState::Idle;
				}
			}
			MapEvent::Idle { .. } => {
				if matches!(from, MapState::Insert | MapState::Edit) {
					self.surface.disable_all_modes();
				}
			}
		}
		true
	}

	fn start_draw(&mut self, seed: &Seed) {
		let mut draft = MapElement::from_seed(seed);
		if draft.properties.element.case_id.is_none() {
			draft.properties.element.case_id = self.case.clone();
		}
		self.current = Some(Current::Draft(draft));
	}

	fn end_draw(&mut self, notify: bool) {
		self.current = None;
		if notify {
			self.notifications
				.notify(Level::Warn, "Drawing", "Drawing of the element has been canceled.");
		}
	}

	fn start_insert(&mut self, drawn: DrawnShape) {
		let Some(Current::Draft(draft)) = self.current.as_mut() else {
			tracing::error!(handle = %drawn.handle.id, "map.insert.no_draft");
			return;
		};
		let handle = drawn.handle;
		let geometry = drawn.geometry;

		if geometry.is_circle() && draft.category() != Category::Area {
			let attributes = &mut draft.properties.attributes;
			if let (Some(center), Some(pointer)) = (geometry.center(), drawn.pointer)
				&& let Err(err) = path::set(attributes, "orientation", json!(center.heading_to(pointer)), true)
			{
				tracing::error!(%err, "map.insert.orientation");
			}
			if let Some(radius) = geometry.radius
				&& let Err(err) = path::set(attributes, "range", json!({ "min": 0, "max": radius.round() }), true)
			{
				tracing::error!(%err, "map.insert.range");
			}
		}

		draft.geometry = geometry;
		draft.handle = Some(handle);
		if !self.surface.is_attached(handle.id) {
			self.surface.attach(handle.id);
		}
		draft.apply_to_surface(&mut self.surface, &self.render);
		self.surface.set_edit_mode(handle.id, Some(draft.edit_mode()));
	}

	fn end_insert(&mut self, submitted: bool, notify: bool) {
		let Some(Current::Draft(draft)) = self.current.take() else {
			return;
		};
		let Some(handle) = draft.handle.map(|h| h.id) else {
			tracing::error!("map.insert.no_handle");
			return;
		};
		self.surface.set_edit_mode(handle, None);

		if !submitted {
			self.surface.detach(handle);
			self.surface.destroy(handle);
			if notify {
				self.notifications
					.notify(Level::Warn, "Inserting", "Inserting of the element has been canceled.");
			}
			return;
		}

		let feature = draft.to_feature();
		if !draft.is_active() {
			self.surface.detach(handle);
		}
		if self.cache.insert(draft).is_err() {
			self.surface.destroy(handle);
		} else {
			self.sync_hitbox(handle);
		}
		self.commit(Some(handle), feature);
	}

	fn start_edit(&mut self, target: &EditTarget) -> bool {
		let handle = match target {
			EditTarget::Handle(handle) => Some(*handle).filter(|h| self.cache.contains_handle(*h)),
			EditTarget::Id(id) => self.cache.handle_for_id(id),
		};
		let Some((handle, element)) = handle.and_then(|h| self.cache.get_by_handle(h).map(|e| (h, e))) else {
			tracing::warn!(?target, "map.edit.unknown_target");
			self.surface.disable_all_modes();
			return false;
		};

		let backup = element.clone_for_backup();
		self.surface.set_edit_mode(handle, Some(element.edit_mode()));
		self.current = Some(Current::Editing { handle, backup });
		true
	}

	fn end_edit(&mut self, submitted: bool, notify: bool) {
		let Some(Current::Editing { handle, backup }) = self.current.take() else {
			return;
		};
		self.surface.set_edit_mode(handle, None);
		let Some(element) = self.cache.get_mut(handle) else {
			tracing::error!(%handle, "map.edit.element_gone");
			return;
		};

		if submitted {
			let feature = element.to_feature();
			if element.is_active() {
				Self::sync_attachment(&mut self.surface, element);
			} else {
				self.surface.detach(handle);
			}
			self.commit(Some(handle), feature);
			self.sync_hitbox(handle);
			return;
		}

		element.restore(backup);
		element.apply_to_surface(&mut self.surface, &self.render);
		Self::sync_attachment(&mut self.surface, element);
		self.sync_hitbox(handle);
		if notify {
			self.notifications.notify(
				Level::Warn,
				"Editing",
				"Editing of the element has been canceled. Restoring original state...",
			);
		}
	}
}
