//! Pointer and keyboard entry points.

use casemap_primitives::{Coordinates, HandleId};
use thiserror::Error;

use super::{Current, MapSession};
use crate::element::{MapElement, Seed};
use crate::fsm::{EditTarget, MapEvent};
use crate::render::{DrawTool, RenderSurface};

/// Failures of [`MapSession::begin_draw_from_drop`].
#[derive(Debug, Error)]
pub enum DropError {
	/// The dropped payload is not a valid element seed.
	#[error("invalid element seed: {0}")]
	Payload(#[from] serde_json::Error),
	/// The seed allows no shape any draw tool can produce.
	#[error("element seed {0:?} has no drawable shape")]
	NoShape(String),
}

impl<S: RenderSurface> MapSession<S> {
	/// Mutates the current element and re-applies it. Returns `false` when nothing is current.
	pub fn update_current(&mut self, f: impl FnOnce(&mut MapElement)) -> bool {
		let element = match self.current.as_mut() {
			Some(Current::Draft(draft)) => draft,
			Some(Current::Editing { handle, .. }) => match self.cache.get_mut(*handle) {
				Some(element) => element,
				None => return false,
			},
			None => return false,
		};
		f(element);
		element.apply_to_surface(&mut self.surface, &self.render);
		Self::sync_attachment(&mut self.surface, element);
		true
	}

	/// Records coordinates the user reshaped on the surface.
	pub fn shape_edited(&mut self, handle: HandleId, coordinates: Coordinates) -> bool {
		let element = match self.current.as_mut() {
			Some(Current::Draft(draft)) if draft.handle.is_some_and(|h| h.id == handle) => Some(draft),
			_ => self.cache.get_mut(handle),
		};
		let Some(element) = element else {
			tracing::debug!(%handle, "map.shape_edited.unknown_handle");
			return false;
		};
		element.geometry.coordinates = coordinates;
		true
	}

	/// Right-click on a shape: edit it unless it is already current, then focus it.
	pub fn context_click(&mut self, handle: HandleId) {
		if self.current_handle() != Some(handle) {
			self.transition(MapEvent::Edit(EditTarget::Handle(handle)));
		}
		self.surface.focus(handle);
	}

	/// Escape: abandon whatever is in progress.
	pub fn cancel(&mut self) {
		self.transition(MapEvent::Idle { submitted: false });
		self.surface.disable_all_modes();
	}

	pub fn enable_draw(&mut self, tool: DrawTool) {
		self.surface.enable_draw(tool);
	}

	/// Starts drawing an element dropped from the palette.
	///
	/// Returns the draw tools the seed allows. A single tool is enabled right away.
	pub fn begin_draw_from_drop(&mut self, payload: &str) -> Result<Vec<DrawTool>, DropError> {
		let seed: Seed = match serde_json::from_str(payload) {
			Ok(seed) => seed,
			Err(err) => {
				tracing::warn!(%err, "map.drop.invalid_seed");
				self.transition(MapEvent::Idle { submitted: false });
				return Err(err.into());
			}
		};
		let tools = seed.draw_tools();
		if tools.is_empty() {
			self.transition(MapEvent::Idle { submitted: false });
			return Err(DropError::NoShape(seed.kind));
		}

		self.transition(MapEvent::Draw(seed));
		if let [tool] = tools.as_slice() {
			self.surface.enable_draw(*tool);
		}
		Ok(tools)
	}
}
