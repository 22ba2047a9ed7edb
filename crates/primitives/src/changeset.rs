//! Attributed changesets.
//!
//! A [`Changeset`] describes an edit against a text of known length as a sequence
//! of keep, insert and remove operations. Every op carries its char length, its
//! line count and the attribute codes it applies. Text past the last op is kept
//! unchanged. Changesets are immutable once built; use [`ChangesetBuilder`] to
//! assemble one against a pad's own [`AttributePool`](crate::AttributePool).

mod builder;
mod codec;
mod types;

#[cfg(test)]
mod tests;

pub use builder::ChangesetBuilder;
pub use types::{Op, OpKind};

/// Error building, parsing or applying a changeset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangesetError {
	/// The changeset was built for a text of a different length.
	#[error("changeset expects a text of {expected} chars, found {actual}")]
	LengthMismatch {
		/// Length declared by the changeset.
		expected: usize,
		/// Actual text length.
		actual: usize,
	},
	/// An op's declared line count disagrees with the text it covers.
	#[error("op at char {offset} declares {declared} lines, text has {actual}")]
	LineMismatch {
		/// Char offset of the op in the source text.
		offset: usize,
		/// Line count declared by the op.
		declared: usize,
		/// Line count found in the text.
		actual: usize,
	},
	/// An op reaches past the end of the source text.
	#[error("op at char {offset} covers {chars} chars past the end of a {len}-char text")]
	PastEnd {
		/// Char offset of the op in the source text.
		offset: usize,
		/// Char length of the op.
		chars: usize,
		/// Source text length.
		len: usize,
	},
	/// The packed form could not be parsed.
	#[error("malformed changeset: {0}")]
	Malformed(String),
}

/// An immutable, serializable edit against a text of known length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
	pub(crate) old_len: usize,
	pub(crate) new_len: usize,
	pub(crate) ops: Vec<Op>,
	pub(crate) char_bank: String,
}

impl Changeset {
	/// Creates a changeset that leaves a text of `len` chars untouched.
	pub fn identity(len: usize) -> Self {
		Self {
			old_len: len,
			new_len: len,
			ops: Vec::new(),
			char_bank: String::new(),
		}
	}

	/// Length of the text this changeset applies to.
	pub fn old_len(&self) -> usize {
		self.old_len
	}

	/// Length of the text after applying.
	pub fn new_len(&self) -> usize {
		self.new_len
	}

	/// The explicit ops; anything past them is kept.
	pub fn ops(&self) -> &[Op] {
		&self.ops
	}

	/// Concatenated text of all insert ops, in order.
	pub fn char_bank(&self) -> &str {
		&self.char_bank
	}

	/// Returns true if applying this changeset changes neither text nor attributes.
	pub fn is_identity(&self) -> bool {
		self.ops
			.iter()
			.all(|op| op.kind == OpKind::Keep && op.attribs.is_empty())
	}

	/// Sum of chars consumed from the source text by keep and remove ops.
	///
	/// Saturates at `usize::MAX`; parsed and built changesets never get there.
	pub fn consumed(&self) -> usize {
		self.checked_consumed().unwrap_or(usize::MAX)
	}

	pub(crate) fn checked_consumed(&self) -> Option<usize> {
		self.ops
			.iter()
			.filter(|op| op.kind != OpKind::Insert)
			.try_fold(0usize, |acc, op| acc.checked_add(op.chars))
	}
}
