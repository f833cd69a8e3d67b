use casemap_primitives::{HandleId, LatLng};
use indexmap::IndexMap;

use super::{Capabilities, DrawTool, EditMode, PathStyle, RenderHandle, RenderSurface, ShapeKind, ShapeUpdate};

/// State of one primitive as seen by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct HandleRecord {
	/// `None` for hitbox polygons.
	pub kind: Option<ShapeKind>,
	pub attached: bool,
	pub edit_mode: Option<EditMode>,
	pub last_update: Option<ShapeUpdate>,
	pub updates: usize,
	pub hitbox_ring: Option<Vec<LatLng>>,
	pub hitbox_style: Option<PathStyle>,
}

impl HandleRecord {
	fn new(kind: Option<ShapeKind>) -> Self {
		Self {
			kind,
			attached: false,
			edit_mode: None,
			last_update: None,
			updates: 0,
			hitbox_ring: None,
			hitbox_style: None,
		}
	}
}

/// Render surface without a display. Records every call for inspection.
#[derive(Debug)]
pub struct HeadlessSurface {
	capabilities: Capabilities,
	next_id: u64,
	handles: IndexMap<HandleId, HandleRecord>,
	attach_log: Vec<HandleId>,
	draw_tool: Option<DrawTool>,
	focused: Option<HandleId>,
}

impl Default for HeadlessSurface {
	fn default() -> Self {
		Self::new(Capabilities::all())
	}
}

impl HeadlessSurface {
	pub fn new(capabilities: Capabilities) -> Self {
		Self {
			capabilities,
			next_id: 0,
			handles: IndexMap::new(),
			attach_log: Vec::new(),
			draw_tool: None,
			focused: None,
		}
	}

	pub fn record(&self, handle: HandleId) -> Option<&HandleRecord> {
		self.handles.get(&handle)
	}

	pub fn records(&self) -> impl Iterator<Item = (HandleId, &HandleRecord)> {
		self.handles.iter().map(|(id, record)| (*id, record))
	}

	/// Handles in the order they were attached, including re-attachments.
	pub fn attach_log(&self) -> &[HandleId] {
		&self.attach_log
	}

	pub fn attached_count(&self) -> usize {
		self.handles.values().filter(|r| r.attached).count()
	}

	pub fn draw_tool(&self) -> Option<DrawTool> {
		self.draw_tool
	}

	pub fn focused(&self) -> Option<HandleId> {
		self.focused
	}

	pub fn is_editing(&self, handle: HandleId) -> bool {
		self.handles.get(&handle).is_some_and(|r| r.edit_mode.is_some())
	}

	fn allocate(&mut self, kind: Option<ShapeKind>) -> HandleId {
		self.next_id += 1;
		let id = HandleId(self.next_id);
		self.handles.insert(id, HandleRecord::new(kind));
		id
	}
}

impl RenderSurface for HeadlessSurface {
	fn capabilities(&self) -> Capabilities {
		self.capabilities
	}

	fn create(&mut self, kind: ShapeKind) -> RenderHandle {
		RenderHandle {
			id: self.allocate(Some(kind)),
			kind,
		}
	}

	fn destroy(&mut self, handle: HandleId) {
		self.handles.shift_remove(&handle);
		if self.focused == Some(handle) {
			self.focused = None;
		}
	}

	fn attach(&mut self, handle: HandleId) {
		if let Some(record) = self.handles.get_mut(&handle) {
			record.attached = true;
			self.attach_log.push(handle);
		}
	}

	fn detach(&mut self, handle: HandleId) {
		if let Some(record) = self.handles.get_mut(&handle) {
			record.attached = false;
		}
	}

	fn is_attached(&self, handle: HandleId) -> bool {
		self.handles.get(&handle).is_some_and(|r| r.attached)
	}

	fn apply(&mut self, handle: HandleId, update: &ShapeUpdate) {
		if let Some(record) = self.handles.get_mut(&handle) {
			record.updates += 1;
			record.last_update = Some(update.clone());
		}
	}

	fn set_edit_mode(&mut self, handle: HandleId, mode: Option<EditMode>) {
		if let Some(record) = self.handles.get_mut(&handle) {
			record.edit_mode = mode;
		}
	}

	fn disable_all_modes(&mut self) {
		self.draw_tool = None;
		for record in self.handles.values_mut() {
			record.edit_mode = None;
		}
	}

	fn enable_draw(&mut self, tool: DrawTool) {
		self.draw_tool = Some(tool);
	}

	fn create_hitbox(&mut self, ring: &[LatLng], style: &PathStyle) -> HandleId {
		let id = self.allocate(None);
		if let Some(record) = self.handles.get_mut(&id) {
			record.hitbox_ring = Some(ring.to_vec());
			record.hitbox_style = Some(style.clone());
		}
		self.attach(id);
		id
	}

	fn focus(&mut self, handle: HandleId) {
		self.focused = Some(handle);
	}
}
