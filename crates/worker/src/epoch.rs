use tokio_util::sync::CancellationToken;

/// Case-load epoch of one map. Epochs start at 1 and only move forward.
#[derive(Debug)]
pub struct CaseEpoch {
	current: EpochToken,
}

impl Default for CaseEpoch {
	fn default() -> Self {
		Self {
			current: EpochToken::new(1),
		}
	}
}

impl CaseEpoch {
	pub fn new() -> Self {
		Self::default()
	}

	pub const fn generation(&self) -> u64 {
		self.current.generation
	}

	/// Whether a result tagged with `generation` still belongs to the loaded case.
	pub const fn is_current(&self, generation: u64) -> bool {
		self.current.generation == generation
	}

	/// Token for work scoped to the current epoch.
	pub fn token(&self) -> EpochToken {
		self.current.clone()
	}

	/// Moves to the next epoch, cancelling scoped work of the previous one.
	pub fn advance(&mut self) -> EpochToken {
		self.current.cancel.cancel();
		let previous = self.current.generation;
		self.current = EpochToken::new(previous.wrapping_add(1));
		tracing::debug!(previous, generation = self.current.generation, "worker.epoch.advanced");
		self.current.clone()
	}
}

/// Handle on one epoch, carried by the tasks spawned for it.
#[derive(Debug, Clone)]
pub struct EpochToken {
	generation: u64,
	cancel: CancellationToken,
}

impl EpochToken {
	fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Resolves when the epoch is superseded.
	pub async fn superseded(&self) {
		self.cancel.cancelled().await;
	}
}
