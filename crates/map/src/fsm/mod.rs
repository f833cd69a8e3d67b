//! Interaction state machine table.
//!
//! The table is data: [`next_state`] dispatches on it and [`export_to_dot`] renders it.
//! Effects live on [`crate::MapSession::transition`].

#[cfg(test)]
mod tests;

use std::fmt;
use std::fmt::Write as _;

use casemap_primitives::{ElementId, HandleId, LatLng, RenderGeometry};

use crate::element::Seed;
use crate::render::RenderHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapState {
	#[default]
	Idle,
	Draw,
	Insert,
	Edit,
}

impl MapState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "IDLE",
			Self::Draw => "DRAW",
			Self::Insert => "INSERT",
			Self::Edit => "EDIT",
		}
	}
}

impl fmt::Display for MapState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Payload-free discriminant of a [`MapEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Idle,
	Draw,
	Insert,
	Edit,
}

impl EventKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "IDLE",
			Self::Draw => "DRAW",
			Self::Insert => "INSERT",
			Self::Edit => "EDIT",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
	pub from: MapState,
	pub event: EventKind,
	pub to: MapState,
}

const fn t(from: MapState, event: EventKind, to: MapState) -> Transition {
	Transition { from, event, to }
}

/// Every accepted (state, event) pair. Anything else is rejected.
pub const TRANSITIONS: [Transition; 12] = [
	t(MapState::Idle, EventKind::Draw, MapState::Draw),
	t(MapState::Idle, EventKind::Edit, MapState::Edit),
	t(MapState::Draw, EventKind::Insert, MapState::Insert),
	t(MapState::Draw, EventKind::Draw, MapState::Draw),
	t(MapState::Draw, EventKind::Edit, MapState::Edit),
	t(MapState::Draw, EventKind::Idle, MapState::Idle),
	t(MapState::Insert, EventKind::Idle, MapState::Idle),
	t(MapState::Insert, EventKind::Draw, MapState::Draw),
	t(MapState::Insert, EventKind::Edit, MapState::Edit),
	t(MapState::Edit, EventKind::Idle, MapState::Idle),
	t(MapState::Edit, EventKind::Draw, MapState::Draw),
	t(MapState::Edit, EventKind::Edit, MapState::Edit),
];

pub fn next_state(from: MapState, event: EventKind) -> Option<MapState> {
	TRANSITIONS.iter().find(|t| t.from == from && t.event == event).map(|t| t.to)
}

/// Renders the transition table as a Graphviz digraph with `current` highlighted.
pub fn export_to_dot(current: MapState) -> String {
	let mut dot = String::from("digraph FSM {\n");
	let _ = writeln!(dot, "    \"{current}\" [style=filled, fontweight=bold];");
	for t in &TRANSITIONS {
		let _ = writeln!(dot, "    \"{}\" -> \"{}\" [label=\"{}\"];", t.from, t.to, t.event);
	}
	dot.push('}');
	dot
}

/// Element targeted by an EDIT event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
	Handle(HandleId),
	Id(ElementId),
}

/// Shape completed by a draw tool.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
	pub handle: RenderHandle,
	pub geometry: RenderGeometry,
	/// Pointer position when the shape was finished; orients drawn sectors.
	pub pointer: Option<LatLng>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
	Draw(Seed),
	Insert(DrawnShape),
	Edit(EditTarget),
	Idle { submitted: bool },
}

impl MapEvent {
	pub fn kind(&self) -> EventKind {
		match self {
			Self::Draw(_) => EventKind::Draw,
			Self::Insert(_) => EventKind::Insert,
			Self::Edit(_) => EventKind::Edit,
			Self::Idle { .. } => EventKind::Idle,
		}
	}
}
