//! Task spawning and case-epoch scoping for casemap.
//!
//! * [`TaskClass`] tags spawned work for scheduling and tracing.
//! * [`spawn`] runs a future on the ambient tokio runtime, or a lazily built global one.
//! * [`CaseEpoch`] numbers the case loads of one map. Advancing it cancels every task
//!   spawned with [`spawn_scoped`] under the previous [`EpochToken`], and lets results
//!   still in flight be recognized as stale.

mod class;
mod epoch;
mod spawn;
#[cfg(test)]
mod tests;

pub use class::TaskClass;
pub use epoch::{CaseEpoch, EpochToken};
pub use spawn::{spawn, spawn_scoped};
