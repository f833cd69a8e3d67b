//! Async message bus for gateway completions.
//!
//! Gateway calls run as spawned tasks and report back as [`MapMsg`] values. The host
//! loop drains them with [`crate::MapSession::drain_messages`], aggregating [`Dirty`]
//! flags to decide whether to redraw.
//!
//! ```text
//! commit task ─┐
//! delete task ─┼──► MapMsg ──► drain_messages() ──► session state update
//! fetch task  ─┘
//! ```

use bitflags::bitflags;
use casemap_gateway::{GatewayError, ServerElement};
use casemap_primitives::{CaseId, ElementId, HandleId};
use tokio::sync::mpsc;

use crate::render::RenderSurface;
use crate::session::MapSession;

bitflags! {
	/// Redraw requirements produced by applying a message.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct Dirty: u8 {
		const REDRAW = 1 << 0;
		const FULL = Self::REDRAW.bits() | 1 << 1;
	}
}

impl Dirty {
	pub const NONE: Self = Self::empty();

	pub fn needs_redraw(self) -> bool {
		self.contains(Self::REDRAW)
	}
}

/// Channel sender for gateway tasks.
pub type MsgSender = mpsc::UnboundedSender<MapMsg>;

/// Channel receiver for the session.
pub type MsgReceiver = mpsc::UnboundedReceiver<MapMsg>;

pub fn channel() -> (MsgSender, MsgReceiver) {
	mpsc::unbounded_channel()
}

/// What a commit was doing, as shown to the user on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
	Inserting,
	Editing,
}

impl CommitAction {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Inserting => "Inserting",
			Self::Editing => "Editing",
		}
	}
}

#[derive(Debug)]
pub enum MapMsg {
	/// A create or update call finished.
	Committed {
		generation: u64,
		action: CommitAction,
		/// Handle of the committed element, when it lives in the cache.
		handle: Option<HandleId>,
		result: Result<ServerElement, GatewayError>,
	},
	/// A delete call finished.
	Deleted {
		generation: u64,
		id: ElementId,
		result: Result<(), GatewayError>,
	},
	/// The element fetch for a selected case finished.
	CaseLoaded {
		generation: u64,
		case: CaseId,
		result: Result<Vec<ServerElement>, GatewayError>,
	},
}

impl MapMsg {
	pub fn generation(&self) -> u64 {
		match self {
			Self::Committed { generation, .. } | Self::Deleted { generation, .. } | Self::CaseLoaded { generation, .. } => *generation,
		}
	}

	/// Applies this message to the session, returning dirty flags.
	pub fn apply<S: RenderSurface>(self, session: &mut MapSession<S>) -> Dirty {
		match self {
			Self::Committed {
				generation,
				action,
				handle,
				result,
			} => session.apply_commit_result(generation, action, handle, result),
			Self::Deleted { generation, id, result } => session.apply_delete_result(generation, id, result),
			Self::CaseLoaded { generation, case, result } => session.apply_case_loaded(generation, case, result),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_implies_redraw_and_is_superset() {
		assert!(Dirty::FULL.needs_redraw());
		assert_eq!(Dirty::FULL | Dirty::REDRAW, Dirty::FULL);
		assert!(!Dirty::NONE.needs_redraw());
	}
}
