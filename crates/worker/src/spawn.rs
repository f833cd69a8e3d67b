use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

use crate::{EpochToken, TaskClass};

/// Ambient runtime when called from async code; otherwise a small shared runtime,
/// so hosts driving the session from plain threads can still commit.
fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static FALLBACK: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	FALLBACK
		.get_or_init(|| {
			tokio::runtime::Builder::new_multi_thread()
				.enable_all()
				.worker_threads(1)
				.thread_name("casemap-worker")
				.build()
				.expect("casemap-worker fallback runtime")
		})
		.handle()
		.clone()
}

/// Spawns a task that runs to completion regardless of case switches (commits, deletes).
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	runtime_handle().spawn(fut)
}

/// Spawns a task bound to `epoch`. It is dropped, yielding `None`, once the epoch
/// is superseded.
pub fn spawn_scoped<F>(class: TaskClass, epoch: &EpochToken, fut: F) -> JoinHandle<Option<F::Output>>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let epoch = epoch.clone();
	let generation = epoch.generation();
	tracing::trace!(worker_class = class.as_str(), generation, "worker.spawn_scoped");
	runtime_handle().spawn(async move {
		tokio::select! {
			biased;
			_ = epoch.superseded() => {
				tracing::debug!(generation, "worker.scoped.superseded");
				None
			}
			output = fut => Some(output),
		}
	})
}
