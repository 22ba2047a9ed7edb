use tandem_primitives::{Annotation, FilePath, PadKey, StyleSpan, TestId, TestResult, UserId};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::fanout::TestTarget;

/// Asynchronous result from the document model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
	/// The document's text changed outside the pad; create or reset the pad.
	Contents {
		/// Owner of the working copy.
		user: UserId,
		/// File that changed.
		file: FilePath,
		/// New full text.
		text: String,
	},
	/// Compiler problems for a pad.
	Problems {
		/// Pad the problems belong to.
		key: PadKey,
		/// Analysis revision the problems were computed for.
		revision: Option<u64>,
		/// Complete problem set.
		problems: Vec<Annotation>,
	},
	/// Syntax styling for a pad.
	Styles {
		/// Pad the spans belong to.
		key: PadKey,
		/// Analysis revision the spans were computed for.
		revision: Option<u64>,
		/// Spans covering the whole text.
		spans: Vec<StyleSpan>,
	},
	/// A test outcome.
	TestResult {
		/// Who should receive it.
		target: TestTarget,
		/// Test that ran.
		test: TestId,
		/// Its outcome.
		result: TestResult,
	},
}

impl AnalysisEvent {
	/// Pad this event writes to, if any.
	pub fn pad_key(&self) -> Option<PadKey> {
		match self {
			Self::Contents { user, file, .. } => Some(PadKey::resolve(user, file)),
			Self::Problems { key, .. } | Self::Styles { key, .. } => Some(key.clone()),
			Self::TestResult { .. } => None,
		}
	}
}

/// Creates the analysis event queue.
///
/// The sender goes to the document model; the receiver is handed to
/// [`Coordinator::start`](crate::Coordinator::start).
pub fn channel(capacity: usize) -> (AnalysisSender, mpsc::Receiver<AnalysisEvent>) {
	let (tx, rx) = mpsc::channel(capacity);
	(AnalysisSender { tx }, rx)
}

/// Sending half of the analysis event queue, handed to the document model.
#[derive(Debug, Clone)]
pub struct AnalysisSender {
	tx: mpsc::Sender<AnalysisEvent>,
}

impl AnalysisSender {
	/// Queues `event`, waiting for space.
	pub async fn send(&self, event: AnalysisEvent) -> Result<()> {
		self.tx.send(event).await.map_err(|_| Error::EventsClosed)
	}

	/// Queues `event` without waiting.
	///
	/// # Errors
	///
	/// Returns [`Error::Backpressure`] carrying the event back when the queue
	/// is full, so the caller can retry or fall back to [`send`](Self::send).
	pub fn try_send(&self, event: AnalysisEvent) -> Result<()> {
		self.tx.try_send(event).map_err(|err| match err {
			mpsc::error::TrySendError::Closed(_) => Error::EventsClosed,
			mpsc::error::TrySendError::Full(event) => Error::Backpressure(Box::new(event)),
		})
	}
}
