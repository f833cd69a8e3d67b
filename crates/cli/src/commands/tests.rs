use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn collection() -> FeatureCollection {
	let element = |kind: &str, category: &str| {
		json!({
			"type": kind,
			"category": category,
			"name": "n",
			"title": "t",
		})
	};
	serde_json::from_value(json!({
		"type": "FeatureCollection",
		"features": [
			{
				"type": "Feature",
				"_id": "a1",
				"geometry": { "type": "Polygon", "coordinates": [[[4.0, 52.0], [4.1, 52.0], [4.1, 52.1], [4.0, 52.0]]] },
				"properties": { "element": element("ZONE", "AREA") },
			},
			{
				"type": "Feature",
				"_id": "s1",
				"geometry": { "type": "Point", "subtype": "Circle", "coordinates": [4.0, 52.0, 12.5], "radius": 30.0 },
				"properties": { "element": element("CAMERA", "SFG") },
			},
			{
				"type": "Feature",
				"_id": "bad",
				"geometry": { "type": "Point", "coordinates": "nowhere" },
				"properties": { "element": element("WALL", "OBS") },
			},
		],
	}))
	.unwrap()
}

#[test]
fn inspect_counts_buckets_and_reports_errors() {
	let inspection = inspect(&collection());
	assert_eq!(
		inspection.counts,
		vec![
			(ImportBucket::Area, 1),
			(ImportBucket::Obstacle, 0),
			(ImportBucket::Safeguard, 0),
			(ImportBucket::Hitbox, 1),
			(ImportBucket::Player, 0),
		]
	);
	assert_eq!(inspection.errors.len(), 1);
	assert_eq!(inspection.errors[0].0, 2);

	let text = inspection.to_string();
	assert!(text.contains("hitbox     1"));
	assert!(text.contains("feature 2: malformed Point coordinates"));
}

#[tokio::test]
async fn roundtrip_keeps_valid_features_and_stamps_case() {
	let (exported, report) = roundtrip(collection(), MapConfig::default(), Some(CaseId::new("case-7"))).await;
	assert_eq!(report.queued, 2);
	assert_eq!(report.failed.len(), 1);

	let ids: Vec<_> = exported.features.iter().filter_map(|f| f.id.as_ref()).map(|id| id.as_str().to_owned()).collect();
	assert_eq!(ids, vec!["a1".to_owned(), "s1".to_owned()]);
	assert!(
		exported
			.features
			.iter()
			.all(|f| f.properties.element.case_id == Some(CaseId::new("case-7")))
	);
	// Altitude survives the render round trip.
	assert_eq!(exported.features[1].geometry.coordinates, json!([4.0, 52.0, 12.5]));
}

#[test]
fn read_collection_reports_the_path() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(b"{\"features\": 3}").unwrap();
	let err = read_collection(file.path()).unwrap_err();
	assert!(err.to_string().starts_with("parsing "));
}

#[test]
fn dot_highlights_idle() {
	let dot = dot();
	assert!(dot.starts_with("digraph FSM {\n"));
	assert!(dot.contains("\"IDLE\" [style=filled, fontweight=bold];"));
}

#[test]
fn effective_config_fills_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("casemap.toml");
	std::fs::write(&path, "asset_root = \"https://assets.test\"\n[hitbox]\nsteps = 16\n").unwrap();

	let rendered = effective_config(&path).unwrap();
	let config = MapConfig::from_toml_str(&rendered).unwrap();
	assert_eq!(config.asset_root, "https://assets.test");
	assert_eq!(config.hitbox.steps, 16);
	assert_eq!(config.notification_timeout_ms, 5000);
}

#[test]
fn effective_config_rejects_unknown_keys() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("casemap.toml");
	std::fs::write(&path, "zoom = 3\n").unwrap();
	assert!(effective_config(&path).is_err());
}
