use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully qualified test name, e.g. `"pkg.FooTest#testBar"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub String);

impl TestId {
	/// Creates a test id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the id string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Outcome class of one test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
	/// Passed.
	Pass,
	/// An assertion failed.
	Failure,
	/// The test raised an unexpected error.
	Error,
	/// Skipped.
	Ignored,
}

/// Result of one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
	/// Outcome class.
	pub status: TestStatus,
	/// Failure trace or message, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl TestResult {
	/// A passing result.
	pub fn pass() -> Self {
		Self {
			status: TestStatus::Pass,
			message: None,
		}
	}

	/// A failing result with `message`.
	pub fn failure(message: impl Into<String>) -> Self {
		Self {
			status: TestStatus::Failure,
			message: Some(message.into()),
		}
	}
}
