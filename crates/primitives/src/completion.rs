use serde::{Deserialize, Serialize};

/// A completion offered at a char range of a pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionProposal {
	/// Text replacing `start..end`.
	pub completion: String,
	/// Start char offset of the replaced range.
	pub start: usize,
	/// End char offset of the replaced range.
	pub end: usize,
}

impl CompletionProposal {
	/// Creates a proposal.
	pub fn new(completion: impl Into<String>, start: usize, end: usize) -> Self {
		Self {
			completion: completion.into(),
			start,
			end,
		}
	}
}
