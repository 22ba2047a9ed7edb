//! Continuous test scheduling.
//!
//! Projects are queued for a test run whenever their code changes. Requests
//! for a project that is already waiting are coalesced into the pending run.
//! A run that does not finish (timeout, runner error or an incomplete report)
//! is retried once; the project is then marked broken and further incomplete
//! runs are only logged until a run completes again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tandem_primitives::ProjectId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fanout::TestResultStore;
use crate::task::{self, TaskClass};

/// How a test run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
	/// Every test reported a result.
	Completed,
	/// The project has no tests.
	NoTests,
	/// The run stopped before every test reported.
	Incomplete,
}

/// A test run could not be started or crashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("test run failed: {0}")]
pub struct RunError(pub String);

/// Runs a project's tests. Individual results are reported separately through
/// [`AnalysisEvent::TestResult`](crate::AnalysisEvent::TestResult).
#[async_trait]
pub trait TestRunner: Send + Sync {
	/// Runs every test in `project`.
	async fn run(&self, project: &ProjectId) -> Result<RunOutcome, RunError>;
}

struct Queue {
	tx: mpsc::UnboundedSender<ProjectId>,
	pending: Mutex<FxHashSet<ProjectId>>,
}

impl Queue {
	fn push(&self, project: ProjectId) -> bool {
		if !self.pending.lock().insert(project.clone()) {
			tracing::trace!(project = %project, "tests.coalesced");
			return false;
		}
		if self.tx.send(project.clone()).is_err() {
			self.pending.lock().remove(&project);
			return false;
		}
		true
	}
}

/// Handle for queueing runs on a [`TestScheduler`].
#[derive(Clone)]
pub struct TestSchedulerHandle {
	queue: Arc<Queue>,
	cancel: CancellationToken,
}

impl TestSchedulerHandle {
	/// Queues a run for `project`. Returns false if a run is already pending
	/// or the scheduler has stopped.
	pub fn schedule(&self, project: ProjectId) -> bool {
		if self.cancel.is_cancelled() {
			return false;
		}
		self.queue.push(project)
	}

	/// Stops the scheduler after the current run.
	pub fn shutdown(&self) {
		self.cancel.cancel();
	}
}

/// Worker that runs queued projects one at a time.
pub struct TestScheduler {
	rx: mpsc::UnboundedReceiver<ProjectId>,
	queue: Arc<Queue>,
	runner: Arc<dyn TestRunner>,
	store: Arc<TestResultStore>,
	timeout: Duration,
	broken: FxHashSet<ProjectId>,
	cancel: CancellationToken,
}

impl TestScheduler {
	/// Spawns the scheduler.
	pub fn start(
		runner: Arc<dyn TestRunner>,
		store: Arc<TestResultStore>,
		timeout: Duration,
	) -> (TestSchedulerHandle, JoinHandle<()>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let queue = Arc::new(Queue {
			tx,
			pending: Mutex::new(FxHashSet::default()),
		});
		let cancel = CancellationToken::new();
		let scheduler = Self {
			rx,
			queue: queue.clone(),
			runner,
			store,
			timeout,
			broken: FxHashSet::default(),
			cancel: cancel.clone(),
		};
		let join = task::spawn(TaskClass::Testing, scheduler.run());
		(TestSchedulerHandle { queue, cancel }, join)
	}

	async fn run(mut self) {
		loop {
			tokio::select! {
				biased;
				_ = self.cancel.cancelled() => break,
				next = self.rx.recv() => {
					let Some(project) = next else {
						break;
					};
					self.queue.pending.lock().remove(&project);
					self.run_project(project).await;
				}
			}
		}
		tracing::debug!("tests.scheduler_stopped");
	}

	async fn run_project(&mut self, project: ProjectId) {
		tracing::debug!(project = %project, "tests.run");
		let outcome = match tokio::time::timeout(self.timeout, self.runner.run(&project)).await {
			Ok(Ok(outcome)) => outcome,
			Ok(Err(err)) => {
				tracing::error!(project = %project, error = %err, "tests.run_failed");
				RunOutcome::Incomplete
			}
			Err(_) => {
				tracing::error!(project = %project, timeout = ?self.timeout, "tests.run_timed_out");
				RunOutcome::Incomplete
			}
		};

		match outcome {
			RunOutcome::Completed => {
				self.broken.remove(&project);
			}
			RunOutcome::NoTests => {
				self.broken.remove(&project);
				self.store.clear(&project);
			}
			RunOutcome::Incomplete if self.broken.insert(project.clone()) => {
				tracing::warn!(project = %project, "tests.retry");
				self.queue.push(project);
			}
			RunOutcome::Incomplete => {
				tracing::warn!(project = %project, "tests.broken; not retrying");
			}
		}
	}
}
