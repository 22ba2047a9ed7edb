//! Client delivery seam.

use serde::Serialize;
use tandem_primitives::{Annotation, CompletionProposal, ConnectionId, PadKey, ProjectId, TestId, TestResult};

/// Message pushed to one client connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
	/// Replacement annotation set for one channel of a pad.
	Annotations {
		/// Pad the annotations belong to.
		pad: PadKey,
		/// Channel name, e.g. `"problem"`.
		channel: String,
		/// Complete set; empty clears the channel.
		annotations: Vec<Annotation>,
	},
	/// Completions answering a request from this connection.
	CompletionProposals {
		/// Pad completion ran on.
		pad: PadKey,
		/// Char offset of the request.
		offset: usize,
		/// Proposals in ranked order.
		proposals: Vec<CompletionProposal>,
	},
	/// Outcome of one test.
	TestResult {
		/// Test that ran.
		test: TestId,
		/// Its outcome.
		result: TestResult,
	},
}

/// Why a message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
	/// No session is registered for the connection.
	#[error("unknown connection {0:?}")]
	UnknownConnection(ConnectionId),
	/// The connection's transport has gone away.
	#[error("connection {0:?} closed")]
	Closed(ConnectionId),
}

/// Connected clients, as seen by the coordinator.
pub trait Clients: Send + Sync {
	/// Connections currently viewing `key`.
	fn viewers(&self, key: &PadKey) -> Vec<ConnectionId>;

	/// Connections subscribed to `project`.
	fn subscribers(&self, project: &ProjectId) -> Vec<ConnectionId>;

	/// Sends `msg` to one connection.
	fn deliver(&self, connection: ConnectionId, msg: ClientMessage) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests {
	use tandem_primitives::{Annotation, PadKey};

	use super::*;

	#[test]
	fn test_annotations_wire_shape() {
		let msg = ClientMessage::Annotations {
			pad: PadKey::resolve(&"alice".into(), &"/p/A.java".into()),
			channel: "problem".into(),
			annotations: vec![Annotation::error(4, "cannot find symbol")],
		};
		assert_eq!(
			serde_json::to_value(&msg).unwrap(),
			serde_json::json!({
				"type": "annotations",
				"pad": "alice@/p/A.java",
				"channel": "problem",
				"annotations": [{ "lineNumber": 4, "severity": "error", "message": "cannot find symbol" }],
			})
		);
	}
}
