/// Shared execution classes used for worker scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Latency-sensitive work that directly affects what the user is looking at (case loads).
	Interactive,
	/// Fire-and-forget work whose outcome is reported asynchronously (commits, deletes).
	Background,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
