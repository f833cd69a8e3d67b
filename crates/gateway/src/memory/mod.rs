//! In-process gateway backend.


use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use casemap_primitives::{CaseId, ElementId};
use parking_lot::Mutex;

use crate::{Feature, Gateway, GatewayError, Result, ServerElement};

/// A call observed by [`MemoryGateway`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
	CreateOrUpdate(Feature),
	Delete(ElementId),
	Fetch(CaseId),
}

#[derive(Default)]
struct MemoryState {
	elements: Vec<ServerElement>,
	calls: Vec<GatewayCall>,
	failures: VecDeque<GatewayError>,
	latency: Option<Duration>,
}

/// Gateway that keeps elements in memory and records every call.
///
/// Injected failures are consumed one per call, in order, regardless of the call kind.
#[derive(Default)]
pub struct MemoryGateway {
	state: Mutex<MemoryState>,
}

impl MemoryGateway {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a gateway pre-populated with server-side elements.
	pub fn with_elements(elements: impl IntoIterator<Item = ServerElement>) -> Self {
		let gateway = Self::new();
		gateway.state.lock().elements.extend(elements);
		gateway
	}

	/// Makes the next call fail with `error`.
	pub fn fail_next(&self, error: GatewayError) {
		self.state.lock().failures.push_back(error);
	}

	/// Delays every subsequent call by `latency`.
	pub fn set_latency(&self, latency: Option<Duration>) {
		self.state.lock().latency = latency;
	}

	/// Calls observed so far.
	pub fn calls(&self) -> Vec<GatewayCall> {
		self.state.lock().calls.clone()
	}

	/// Server-side elements currently stored.
	pub fn elements(&self) -> Vec<ServerElement> {
		self.state.lock().elements.clone()
	}

	/// Records `call` and returns the latency to apply plus any injected failure.
	fn begin(&self, call: GatewayCall) -> (Option<Duration>, Option<GatewayError>) {
		let mut state = self.state.lock();
		tracing::trace!(call = ?call, "gateway.memory.call");
		state.calls.push(call);
		(state.latency, state.failures.pop_front())
	}
}

async fn delay(latency: Option<Duration>) {
	if let Some(latency) = latency {
		tokio::time::sleep(latency).await;
	}
}

#[async_trait]
impl Gateway for MemoryGateway {
	async fn create_or_update_element(&self, feature: Feature) -> Result<ServerElement> {
		let (latency, failure) = self.begin(GatewayCall::CreateOrUpdate(feature.clone()));
		delay(latency).await;
		if let Some(error) = failure {
			return Err(error);
		}

		let mut state = self.state.lock();
		match feature.id {
			None => {
				let stored = ServerElement {
					id: ElementId::new(uuid::Uuid::new_v4().simple().to_string()),
					geometry: feature.geometry,
					properties: feature.properties,
				};
				state.elements.push(stored.clone());
				Ok(stored)
			}
			Some(id) => {
				let slot = state.elements.iter_mut().find(|e| e.id == id).ok_or_else(|| GatewayError::NotFound(id.clone()))?;
				slot.geometry = feature.geometry;
				slot.properties = feature.properties;
				Ok(slot.clone())
			}
		}
	}

	async fn delete_element(&self, id: &ElementId) -> Result<()> {
		let (latency, failure) = self.begin(GatewayCall::Delete(id.clone()));
		delay(latency).await;
		if let Some(error) = failure {
			return Err(error);
		}

		let mut state = self.state.lock();
		let before = state.elements.len();
		state.elements.retain(|e| &e.id != id);
		if state.elements.len() == before {
			return Err(GatewayError::NotFound(id.clone()));
		}
		Ok(())
	}

	async fn fetch_elements_for_case(&self, case: &CaseId) -> Result<Vec<ServerElement>> {
		let (latency, failure) = self.begin(GatewayCall::Fetch(case.clone()));
		delay(latency).await;
		if let Some(error) = failure {
			return Err(error);
		}

		let state = self.state.lock();
		Ok(state
			.elements
			.iter()
			.filter(|e| e.properties.element.case_id.as_ref() == Some(case))
			.cloned()
			.collect())
	}
}
