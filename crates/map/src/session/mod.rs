//! Map session context.
//!
//! [`MapSession`] owns everything one interactive map needs: the render surface, the
//! gateway, the element cache, the interaction state machine, the current element,
//! staged imports, hitboxes and queued notifications. Hosts hold it by value and
//! route UI events to its methods.
//!
//! The session is `&mut self`-driven and never awaits the gateway inside a transition.
//! Gateway calls run as spawned tasks and report back through the message bus
//! (see [`crate::msg`]).

mod interact;
mod persist;
mod transition;

use std::sync::Arc;

use casemap_gateway::Gateway;
use casemap_primitives::{CaseId, ElementId, HandleId};
use casemap_worker::CaseEpoch;
use rustc_hash::FxHashSet;
pub use interact::DropError;

use crate::cache::ElementCache;
use crate::config::MapConfig;
use crate::element::{ElementSnapshot, MapElement};
use crate::fsm::MapState;
use crate::import::{HitboxRegistry, ImportQueue};
use crate::msg::{self, Dirty, MsgReceiver, MsgSender};
use crate::notifications::{Notification, NotificationCenter};
use crate::render::{RenderContext, RenderSurface};

/// The element being drawn, inserted or edited.
#[derive(Debug)]
pub(crate) enum Current {
	/// Not yet committed; lives outside the cache.
	Draft(MapElement),
	/// Cached element under edit, with the state to restore on cancel.
	Editing { handle: HandleId, backup: ElementSnapshot },
}

pub struct MapSession<S: RenderSurface> {
	pub(crate) surface: S,
	pub(crate) gateway: Arc<dyn Gateway>,
	pub(crate) config: MapConfig,
	pub(crate) render: RenderContext,
	pub(crate) cache: ElementCache,
	pub(crate) state: MapState,
	pub(crate) current: Option<Current>,
	pub(crate) imports: ImportQueue,
	pub(crate) hitboxes: HitboxRegistry,
	pub(crate) notifications: NotificationCenter,
	pub(crate) case: Option<CaseId>,
	pub(crate) epoch: CaseEpoch,
	pub(crate) tx: MsgSender,
	rx: MsgReceiver,
	/// Commits and deletes awaiting their completion message.
	pub(crate) in_flight: usize,
	/// Generation of the case fetch still outstanding.
	pub(crate) pending_fetch: Option<u64>,
	/// Ids of local creates acknowledged but not yet echoed by the push channel.
	pub(crate) acked_creates: FxHashSet<ElementId>,
}

impl<S: RenderSurface> MapSession<S> {
	pub fn new(surface: S, gateway: Arc<dyn Gateway>, config: MapConfig) -> Self {
		let (tx, rx) = msg::channel();
		Self {
			render: config.render_context(surface.capabilities()),
			notifications: NotificationCenter::new(config.notification_timeout()),
			surface,
			gateway,
			config,
			cache: ElementCache::new(),
			state: MapState::Idle,
			current: None,
			imports: ImportQueue::default(),
			hitboxes: HitboxRegistry::default(),
			case: None,
			epoch: CaseEpoch::new(),
			tx,
			rx,
			in_flight: 0,
			pending_fetch: None,
			acked_creates: FxHashSet::default(),
		}
	}

	pub fn state(&self) -> MapState {
		self.state
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	pub fn cache(&self) -> &ElementCache {
		&self.cache
	}

	pub fn config(&self) -> &MapConfig {
		&self.config
	}

	pub fn case(&self) -> Option<&CaseId> {
		self.case.as_ref()
	}

	/// Current case-load epoch.
	pub fn generation(&self) -> u64 {
		self.epoch.generation()
	}

	pub fn hitboxes(&self) -> &HitboxRegistry {
		&self.hitboxes
	}

	/// The element being drawn, inserted or edited.
	pub fn current(&self) -> Option<&MapElement> {
		match self.current.as_ref()? {
			Current::Draft(draft) => Some(draft),
			Current::Editing { handle, .. } => self.cache.get_by_handle(*handle),
		}
	}

	/// Handle of the current element, once it has one.
	pub fn current_handle(&self) -> Option<HandleId> {
		match self.current.as_ref()? {
			Current::Draft(draft) => draft.handle.map(|h| h.id),
			Current::Editing { handle, .. } => Some(*handle),
		}
	}

	/// Whether `handle` is the element under edit.
	pub fn is_editing(&self, handle: HandleId) -> bool {
		matches!(self.current, Some(Current::Editing { handle: h, .. }) if h == handle)
	}

	/// True while a case fetch or any commit/delete is outstanding.
	pub fn is_loading(&self) -> bool {
		self.pending_fetch.is_some() || self.in_flight > 0
	}

	pub fn pending_notifications(&self) -> impl Iterator<Item = &Notification> {
		self.notifications.pending()
	}

	pub fn take_notifications(&mut self) -> Vec<Notification> {
		self.notifications.take_pending()
	}

	/// Applies every queued gateway completion without waiting.
	///
	/// Imports queued by a case load stay staged; flush them with
	/// [`Self::flush_imports`] or [`Self::flush_next_stage`].
	pub fn drain_messages(&mut self) -> Dirty {
		let mut dirty = Dirty::NONE;
		while let Ok(msg) = self.rx.try_recv() {
			dirty |= msg.apply(self);
		}
		dirty
	}

	/// Waits for the next gateway completion, applies it and flushes staged imports.
	///
	/// Only call this with work in flight ([`Self::is_loading`]); the session keeps its
	/// own sender, so the channel never closes.
	pub async fn next_message(&mut self) -> Option<Dirty> {
		let msg = self.rx.recv().await?;
		let mut dirty = msg.apply(self);
		if self.imports.has_pending() {
			self.flush_imports().await;
			dirty |= Dirty::FULL;
		}
		Some(dirty)
	}

	/// Re-attaches an active element whose handle was detached.
	pub(crate) fn sync_attachment(surface: &mut S, element: &MapElement) {
		if let Some(handle) = element.handle
			&& element.is_active()
			&& !surface.is_attached(handle.id)
		{
			surface.attach(handle.id);
		}
	}
}
