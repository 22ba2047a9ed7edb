use serde::{Deserialize, Serialize};

use crate::attrib::Attribute;

/// A styled stretch of text, as produced by an external tokenizer.
///
/// Spans are laid end to end from offset 0; `lines` counts the newlines inside
/// the stretch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSpan {
	/// Char length.
	pub chars: usize,
	/// Newlines within the stretch.
	pub lines: usize,
	/// Attributes applied to the stretch.
	pub attributes: Vec<Attribute>,
}

impl StyleSpan {
	/// Creates a span carrying `attributes`.
	pub fn new(chars: usize, lines: usize, attributes: Vec<Attribute>) -> Self {
		Self {
			chars,
			lines,
			attributes,
		}
	}

	/// Creates a span that leaves attributes untouched.
	pub fn plain(chars: usize, lines: usize) -> Self {
		Self::new(chars, lines, Vec::new())
	}
}
