use tandem_primitives::{ChangesetError, PadKey};

use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::engine::EngineError;
use crate::events::AnalysisEvent;

/// Errors surfaced by coordination operations.
///
/// Integrity problems (missing pads, unbound documents) and delivery failures
/// are logged rather than returned; see the crate docs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Style spans do not cover the pad text exactly.
	#[error("style spans for {key} cover {actual} chars, pad has {expected}")]
	SpanLengthMismatch {
		/// Pad the spans were meant for.
		key: PadKey,
		/// Current pad length.
		expected: usize,
		/// Sum of span lengths, saturating at `usize::MAX`.
		actual: usize,
	},
	/// A style span's line count disagrees with the text it covers.
	#[error("style span at char {offset} of {key} declares {declared} lines, text has {actual}")]
	SpanLineMismatch {
		/// Pad the spans were meant for.
		key: PadKey,
		/// Char offset of the span.
		offset: usize,
		/// Lines declared by the span.
		declared: usize,
		/// Newlines found in the text.
		actual: usize,
	},
	/// Changeset construction or application failed.
	#[error(transparent)]
	Changeset(#[from] ChangesetError),
	/// The document model failed.
	#[error(transparent)]
	Document(#[from] DocumentError),
	/// The pad engine failed.
	#[error(transparent)]
	Engine(#[from] EngineError),
	/// The analysis event channel has shut down.
	#[error("analysis event channel closed")]
	EventsClosed,
	/// The analysis event queue is full; the event was not queued.
	#[error("analysis event queue full (backpressure)")]
	Backpressure(Box<AnalysisEvent>),
	/// Configuration could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Result alias for coordination operations.
pub type Result<T> = std::result::Result<T, Error>;
