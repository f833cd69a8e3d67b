use std::time::Duration;

use super::*;

#[test]
fn epochs_start_at_one_and_advance() {
	let mut epoch = CaseEpoch::new();
	assert_eq!(epoch.generation(), 1);
	let first = epoch.token();

	let second = epoch.advance();
	assert_eq!(second.generation(), 2);
	assert!(epoch.is_current(2));
	assert!(!epoch.is_current(first.generation()));
}

#[tokio::test]
async fn advancing_spares_the_new_epoch() {
	let mut epoch = CaseEpoch::new();
	let stale = spawn_scoped(TaskClass::Interactive, &epoch.token(), std::future::pending::<()>());
	let fresh = epoch.advance();
	let live = spawn_scoped(TaskClass::Interactive, &fresh, async { "case-2" });

	assert_eq!(stale.await.ok(), Some(None));
	assert_eq!(live.await.ok(), Some(Some("case-2")));
}

#[tokio::test]
async fn scoped_task_is_dropped_when_superseded() {
	let mut epoch = CaseEpoch::new();
	let handle = spawn_scoped(TaskClass::Interactive, &epoch.token(), async {
		tokio::time::sleep(Duration::from_secs(60)).await;
		"loaded"
	});

	epoch.advance();
	assert_eq!(handle.await.ok(), Some(None));
}

#[tokio::test]
async fn scoped_task_completes_within_its_epoch() {
	let epoch = CaseEpoch::new();
	let handle = spawn_scoped(TaskClass::Interactive, &epoch.token(), async { 3 });
	assert_eq!(handle.await.ok(), Some(Some(3)));
}

#[test]
fn spawn_without_runtime_uses_fallback() {
	let handle = spawn(TaskClass::Background, async { 7 });
	let value = std::thread::spawn(move || {
		tokio::runtime::Builder::new_current_thread()
			.build()
			.expect("runtime")
			.block_on(handle)
	})
	.join()
	.expect("join");
	assert_eq!(value.ok(), Some(7));
}
