//! Subcommand implementations. Each returns its output instead of printing it.

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use casemap_gateway::{FeatureCollection, MemoryGateway};
use casemap_map::{HeadlessSurface, ImportBucket, ImportReport, MapConfig, MapSession, MapState, export_to_dot};
use casemap_primitives::{CaseId, GeometryError, to_render};

/// Bucket counts and decode failures of a feature collection.
#[derive(Debug, PartialEq)]
pub struct Inspection {
	pub counts: Vec<(ImportBucket, usize)>,
	pub errors: Vec<(usize, GeometryError)>,
}

impl fmt::Display for Inspection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (bucket, count) in &self.counts {
			writeln!(f, "{:<10} {count}", bucket.as_str())?;
		}
		for (index, error) in &self.errors {
			writeln!(f, "feature {index}: {error}")?;
		}
		Ok(())
	}
}

pub fn read_collection(path: &Path) -> Result<FeatureCollection> {
	let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	FeatureCollection::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn inspect(collection: &FeatureCollection) -> Inspection {
	let mut counts = ImportBucket::ALL.map(|bucket| (bucket, 0));
	let mut errors = Vec::new();
	for (index, feature) in collection.features.iter().enumerate() {
		if let Err(error) = to_render(&feature.geometry) {
			errors.push((index, error));
			continue;
		}
		let bucket = ImportBucket::classify(feature);
		if let Some((_, count)) = counts.iter_mut().find(|(b, _)| *b == bucket) {
			*count += 1;
		}
	}
	Inspection {
		counts: counts.to_vec(),
		errors,
	}
}

/// Imports `collection` into a headless session, flushes every stage and exports it again.
pub async fn roundtrip(collection: FeatureCollection, config: MapConfig, case: Option<CaseId>) -> (FeatureCollection, ImportReport) {
	let mut session = MapSession::new(HeadlessSurface::default(), Arc::new(MemoryGateway::new()), config);
	if let Some(case) = case {
		session.select_case(case);
		// The memory gateway holds nothing; this only settles the case fetch.
		session.next_message().await;
	}

	let report = session.import_feature_collection(collection, false);
	for error in &report.failed {
		tracing::warn!(%error, "cli.roundtrip.skipped");
	}
	session.flush_imports().await;
	(session.export_feature_collection(), report)
}

pub fn dot() -> String {
	export_to_dot(MapState::Idle)
}

/// Loads a config file and renders the effective settings, defaults included.
pub fn effective_config(path: &Path) -> Result<String> {
	let config = MapConfig::load(path)?;
	toml::to_string_pretty(&config).context("serializing config")
}
