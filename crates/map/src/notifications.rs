//! User-facing notifications raised by the map session.
//!
//! The session only queues them; hosts drain [`NotificationCenter::take_pending`]
//! and own toast lifecycle and presentation.

use std::collections::VecDeque;
use std::time::Duration;

/// Severity level for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
	#[default]
	Info,
	Warn,
	Error,
	Success,
}

impl Level {
	/// Icon shown next to the notification.
	pub const fn icon(self) -> &'static str {
		match self {
			Self::Info => "/icons/case_dark.svg",
			Self::Warn => "/icons/warning.svg",
			Self::Error => "/icons/failure.svg",
			Self::Success => "/icons/success.svg",
		}
	}
}

/// Controls automatic dismissal of notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDismiss {
	Never,
	After(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	pub level: Level,
	pub title: String,
	pub message: String,
	pub icon: &'static str,
	pub auto_dismiss: AutoDismiss,
}

#[derive(Debug)]
pub struct NotificationCenter {
	pending: VecDeque<Notification>,
	timeout: Duration,
}

impl NotificationCenter {
	/// Creates a center whose notifications dismiss after `timeout`.
	pub fn new(timeout: Duration) -> Self {
		Self {
			pending: VecDeque::new(),
			timeout,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	pub fn clear(&mut self) {
		self.pending.clear();
	}

	pub fn push(&mut self, notification: Notification) {
		tracing::debug!(level = ?notification.level, title = %notification.title, "map.notify");
		self.pending.push_back(notification);
	}

	/// Queues a notification with the level's icon and the default timeout.
	pub fn notify(&mut self, level: Level, title: impl Into<String>, message: impl Into<String>) {
		self.push(Notification {
			level,
			title: title.into(),
			message: message.into(),
			icon: level.icon(),
			auto_dismiss: AutoDismiss::After(self.timeout),
		});
	}

	pub fn pending(&self) -> impl Iterator<Item = &Notification> {
		self.pending.iter()
	}

	pub fn take_pending(&mut self) -> Vec<Notification> {
		self.pending.drain(..).collect()
	}
}
