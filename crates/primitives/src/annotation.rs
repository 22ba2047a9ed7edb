use serde::{Deserialize, Serialize};

/// Channel name under which compiler problems are published.
pub const PROBLEM_CHANNEL: &str = "problem";

/// Severity of a line annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// Blocks compilation or execution.
	Error,
	/// Informational; does not block.
	Warning,
}

/// A problem attached to one line of a pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
	/// 1-based line number.
	pub line_number: u32,
	/// Problem severity.
	pub severity: Severity,
	/// Human-readable message.
	pub message: String,
}

impl Annotation {
	/// Creates an error annotation.
	pub fn error(line_number: u32, message: impl Into<String>) -> Self {
		Self {
			line_number,
			severity: Severity::Error,
			message: message.into(),
		}
	}

	/// Creates a warning annotation.
	pub fn warning(line_number: u32, message: impl Into<String>) -> Self {
		Self {
			line_number,
			severity: Severity::Warning,
			message: message.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_wire_shape() {
		let json = serde_json::to_value(Annotation::warning(3, "unused variable")).unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "lineNumber": 3, "severity": "warning", "message": "unused variable" })
		);
	}
}
