use super::types::{Op, OpKind};
use super::{Changeset, ChangesetError};
use crate::attrib::{AttribSet, Attribute, AttributePool};

/// Incrementally assembles a [`Changeset`] against a text of known length.
///
/// Ops are emitted in call order and never merged. Zero-length calls emit no
/// op and leave the pool untouched.
#[derive(Debug)]
pub struct ChangesetBuilder {
	old_len: usize,
	consumed: usize,
	inserted: usize,
	removed: usize,
	ops: Vec<Op>,
	char_bank: String,
}

impl ChangesetBuilder {
	/// Starts a changeset for a text of `old_len` chars.
	pub fn new(old_len: usize) -> Self {
		Self {
			old_len,
			consumed: 0,
			inserted: 0,
			removed: 0,
			ops: Vec::new(),
			char_bank: String::new(),
		}
	}

	/// Keeps `chars` source chars spanning `lines` newlines, applying `attributes`.
	pub fn keep(&mut self, chars: usize, lines: usize, attributes: &[Attribute], pool: &mut AttributePool) -> &mut Self {
		if chars == 0 {
			return self;
		}
		let attribs = AttribSet::intern(attributes, pool);
		self.push(Op::new(OpKind::Keep, chars, lines, attribs));
		self.consumed = self.consumed.saturating_add(chars);
		self
	}

	/// Keeps `chars` source chars without touching their attributes.
	pub fn retain(&mut self, chars: usize, lines: usize) -> &mut Self {
		self.push(Op::new(OpKind::Keep, chars, lines, AttribSet::new()));
		self.consumed = self.consumed.saturating_add(chars);
		self
	}

	/// Inserts `text` carrying `attributes`.
	pub fn insert(&mut self, text: &str, attributes: &[Attribute], pool: &mut AttributePool) -> &mut Self {
		if text.is_empty() {
			return self;
		}
		let attribs = AttribSet::intern(attributes, pool);
		let chars = text.chars().count();
		let lines = text.matches('\n').count();
		self.push(Op::new(OpKind::Insert, chars, lines, attribs));
		self.char_bank.push_str(text);
		self.inserted += chars;
		self
	}

	/// Removes `chars` source chars spanning `lines` newlines.
	pub fn remove(&mut self, chars: usize, lines: usize) -> &mut Self {
		self.push(Op::new(OpKind::Remove, chars, lines, AttribSet::new()));
		self.consumed = self.consumed.saturating_add(chars);
		self.removed = self.removed.saturating_add(chars);
		self
	}

	/// Number of source chars covered so far.
	pub fn consumed(&self) -> usize {
		self.consumed
	}

	/// Finishes the changeset, keeping any source chars past the last op.
	///
	/// # Errors
	///
	/// Returns [`ChangesetError::PastEnd`] if the ops cover more source chars
	/// than the text holds.
	pub fn finish(self) -> Result<Changeset, ChangesetError> {
		if self.consumed > self.old_len {
			return Err(ChangesetError::PastEnd {
				offset: 0,
				chars: self.consumed,
				len: self.old_len,
			});
		}
		Ok(Changeset {
			old_len: self.old_len,
			new_len: self.old_len - self.removed + self.inserted,
			ops: self.ops,
			char_bank: self.char_bank,
		})
	}

	fn push(&mut self, op: Op) {
		if op.chars > 0 {
			self.ops.push(op);
		}
	}
}
