//! Test result routing and replay storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tandem_primitives::{ConnectionId, ProjectId, TestId, TestResult};

use crate::clients::{ClientMessage, Clients};

/// Who a test result is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestTarget {
	/// The connection that requested the run.
	Connection(ConnectionId),
	/// Every connection subscribed to the project.
	Project(ProjectId),
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
	/// Connections that received the result.
	pub delivered: usize,
	/// Connections that could not be reached.
	pub failed: usize,
}

/// Latest result per test, per project.
#[derive(Default)]
pub struct TestResultStore {
	projects: RwLock<FxHashMap<ProjectId, BTreeMap<TestId, TestResult>>>,
}

impl TestResultStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `result` as the latest for `test` in `project`.
	pub fn record(&self, project: &ProjectId, test: TestId, result: TestResult) {
		self.projects
			.write()
			.entry(project.clone())
			.or_default()
			.insert(test, result);
	}

	/// Latest results for `project`, ordered by test id.
	pub fn results(&self, project: &ProjectId) -> Vec<(TestId, TestResult)> {
		self.projects
			.read()
			.get(project)
			.map(|tests| tests.iter().map(|(id, r)| (id.clone(), r.clone())).collect())
			.unwrap_or_default()
	}

	/// Forgets every result for `project`.
	pub fn clear(&self, project: &ProjectId) {
		self.projects.write().remove(project);
	}
}

/// Routes test outcomes to one connection or to a whole project.
pub struct TestResultFanout {
	clients: Arc<dyn Clients>,
}

impl TestResultFanout {
	/// Creates a fan-out delivering through `clients`.
	pub fn new(clients: Arc<dyn Clients>) -> Self {
		Self { clients }
	}

	/// Delivers to exactly `connection`.
	pub fn report_one(&self, connection: ConnectionId, test: &TestId, result: &TestResult) -> FanoutReport {
		let mut report = FanoutReport::default();
		self.send(connection, test, result, &mut report);
		report
	}

	/// Delivers to every connection subscribed to `project`.
	///
	/// A failure for one connection does not affect the others.
	pub fn report_project(&self, project: &ProjectId, test: &TestId, result: &TestResult) -> FanoutReport {
		let mut report = FanoutReport::default();
		for connection in self.clients.subscribers(project) {
			self.send(connection, test, result, &mut report);
		}
		tracing::debug!(project = %project, test = %test, delivered = report.delivered, failed = report.failed, "fanout.project");
		report
	}

	fn send(&self, connection: ConnectionId, test: &TestId, result: &TestResult, report: &mut FanoutReport) {
		let msg = ClientMessage::TestResult {
			test: test.clone(),
			result: result.clone(),
		};
		match self.clients.deliver(connection, msg) {
			Ok(()) => report.delivered += 1,
			Err(err) => {
				report.failed += 1;
				tracing::warn!(connection = ?connection, test = %test, error = %err, "fanout.deliver_failed");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sessions::SessionRegistry;

	#[test]
	fn test_store_keeps_latest_per_test() {
		let store = TestResultStore::new();
		let p: ProjectId = "p".into();
		store.record(&p, TestId::new("T#b"), TestResult::pass());
		store.record(&p, TestId::new("T#a"), TestResult::failure("boom"));
		store.record(&p, TestId::new("T#a"), TestResult::pass());

		let results = store.results(&p);
		assert_eq!(results.len(), 2);
		assert_eq!(results[0], (TestId::new("T#a"), TestResult::pass()));

		store.clear(&p);
		assert!(store.results(&p).is_empty());
	}

	#[test]
	fn test_report_one_reaches_only_target() {
		let sessions = Arc::new(SessionRegistry::new());
		let mut a = sessions.register(ConnectionId(1), "p".into());
		let mut b = sessions.register(ConnectionId(2), "p".into());
		let fanout = TestResultFanout::new(sessions.clone());

		let report = fanout.report_one(ConnectionId(1), &TestId::new("T#a"), &TestResult::pass());
		assert_eq!(report, FanoutReport { delivered: 1, failed: 0 });
		assert!(a.try_recv().is_ok());
		assert!(b.try_recv().is_err());
	}

	#[test]
	fn test_report_project_isolates_dead_connection() {
		let sessions = Arc::new(SessionRegistry::new());
		let mut a = sessions.register(ConnectionId(1), "p".into());
		let dead = sessions.register(ConnectionId(2), "p".into());
		let mut c = sessions.register(ConnectionId(3), "p".into());
		let mut other = sessions.register(ConnectionId(4), "q".into());
		drop(dead);
		let fanout = TestResultFanout::new(sessions.clone());

		let report = fanout.report_project(&"p".into(), &TestId::new("T#a"), &TestResult::pass());
		assert_eq!(report, FanoutReport { delivered: 2, failed: 1 });
		assert!(a.try_recv().is_ok());
		assert!(c.try_recv().is_ok());
		assert!(other.try_recv().is_err());
	}
}
