//! Document model seam.
//!
//! A [`Document`] is the analysis subsystem's view of one user's file.
//! Long-running calls (revise, completion) are awaited without holding any pad
//! lock; their results come back through [`AnalysisEvent`](crate::AnalysisEvent)s.

use std::sync::Arc;

use async_trait::async_trait;
use tandem_primitives::{CompletionProposal, FilePath, ProjectId, UserId};

/// Errors reported by the document model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
	/// The file cannot be opened as a document.
	#[error("document unavailable: {0}")]
	Unavailable(String),
	/// Analysis of the document failed.
	#[error("analysis failed: {0}")]
	Analysis(String),
}

/// One file as seen by the analysis subsystem.
#[async_trait]
pub trait Document: Send + Sync {
	/// Re-analyzes with `text`; results emitted for it carry `revision`.
	async fn revise(&self, text: String, revision: u64) -> Result<(), DocumentError>;

	/// Re-emits current analysis results without changing the text.
	async fn empty_revise(&self) -> Result<(), DocumentError>;

	/// Completions at char `offset`.
	async fn code_complete(&self, offset: usize) -> Result<Vec<CompletionProposal>, DocumentError>;

	/// Content type of the file, e.g. `"java"`.
	fn content_type_name(&self) -> String;

	/// Project the file belongs to.
	fn project(&self) -> ProjectId;
}

/// Opens [`Document`]s for `(user, file)` pairs.
#[async_trait]
pub trait DocumentModel: Send + Sync {
	/// Opens or returns the working copy of `file` for `user`.
	async fn open(&self, user: &UserId, file: &FilePath) -> Result<Arc<dyn Document>, DocumentError>;
}
