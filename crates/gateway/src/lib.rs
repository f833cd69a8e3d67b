#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Persistence boundary for case elements.
//!
//! The map core never talks HTTP itself. It hands [`Feature`]s to a [`Gateway`]
//! and receives [`ServerElement`]s back, either as call results or as [`PushEvent`]s
//! relayed from the server push channel.
//!
//! [`MemoryGateway`] is an in-process backend that records calls and supports
//! failure injection.

mod error;
mod memory;
/// Wire format shared with the server.
pub mod wire;

use async_trait::async_trait;
use casemap_primitives::{CaseId, ElementId};
pub use error::{GatewayError, Result};
pub use memory::{GatewayCall, MemoryGateway};
pub use wire::{ElementInfo, Feature, FeatureCollection, FillColor, Properties, PushEvent, ServerElement, Style};

/// External persistence API for case elements.
///
/// Implementations must be cheap to share: the map core holds one behind an `Arc`
/// and calls it from spawned tasks.
#[async_trait]
pub trait Gateway: Send + Sync {
	/// Creates (`feature.id == None`) or updates an element.
	async fn create_or_update_element(&self, feature: Feature) -> Result<ServerElement>;

	/// Deletes an element by id.
	async fn delete_element(&self, id: &ElementId) -> Result<()>;

	/// Fetches every element belonging to a case.
	async fn fetch_elements_for_case(&self, case: &CaseId) -> Result<Vec<ServerElement>>;
}
