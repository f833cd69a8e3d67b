use super::*;

const STATES: [MapState; 4] = [MapState::Idle, MapState::Draw, MapState::Insert, MapState::Edit];
const EVENTS: [EventKind; 4] = [EventKind::Idle, EventKind::Draw, EventKind::Insert, EventKind::Edit];

#[test]
fn table_has_no_duplicate_pairs() {
	for (i, a) in TRANSITIONS.iter().enumerate() {
		for b in &TRANSITIONS[i + 1..] {
			assert!(!(a.from == b.from && a.event == b.event), "duplicate {a:?}");
		}
	}
}

#[test]
fn event_kind_always_names_the_target_state() {
	for t in &TRANSITIONS {
		assert_eq!(t.to.as_str(), t.event.as_str());
	}
}

#[test]
fn rejected_pairs() {
	let rejected: Vec<_> = STATES
		.iter()
		.flat_map(|s| EVENTS.iter().map(move |e| (*s, *e)))
		.filter(|(s, e)| next_state(*s, *e).is_none())
		.collect();
	assert_eq!(
		rejected,
		vec![
			(MapState::Idle, EventKind::Idle),
			(MapState::Idle, EventKind::Insert),
			(MapState::Insert, EventKind::Insert),
			(MapState::Edit, EventKind::Insert),
		]
	);
}

#[test]
fn dot_export_lists_every_edge_and_marks_current() {
	let dot = export_to_dot(MapState::Edit);
	assert!(dot.starts_with("digraph FSM {\n"));
	assert!(dot.contains("\"EDIT\" [style=filled, fontweight=bold];"));
	assert!(dot.contains("\"DRAW\" -> \"INSERT\" [label=\"INSERT\"];"));
	assert_eq!(dot.matches(" -> ").count(), TRANSITIONS.len());
	assert!(dot.ends_with('}'));
}
