use std::future::Future;

use tokio::task::JoinHandle;

/// Classes of background work spawned by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The analysis event pump and its per-pad lanes.
	Events,
	/// Document model calls detached from the caller.
	Analysis,
	/// The continuous test scheduler.
	Testing,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Events => "events",
			Self::Analysis => "analysis",
			Self::Testing => "testing",
		}
	}
}

/// Spawns an async task tagged with `class` on the current runtime.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(task_class = class.as_str(), "task.spawn");
	tokio::spawn(fut)
}
