use crate::attrib::AttribSet;

/// Kind of a changeset operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Retain source chars, composing the op's attributes onto them.
	Keep,
	/// Insert chars from the changeset's char bank.
	Insert,
	/// Remove source chars.
	Remove,
}

impl OpKind {
	pub(crate) const fn symbol(self) -> char {
		match self {
			Self::Keep => '=',
			Self::Insert => '+',
			Self::Remove => '-',
		}
	}

	pub(crate) const fn from_symbol(ch: char) -> Option<Self> {
		match ch {
			'=' => Some(Self::Keep),
			'+' => Some(Self::Insert),
			'-' => Some(Self::Remove),
			_ => None,
		}
	}
}

/// A single changeset operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
	/// What the op does.
	pub kind: OpKind,
	/// Number of chars covered.
	pub chars: usize,
	/// Number of newlines within the covered chars.
	pub lines: usize,
	/// Attribute codes applied (keep, insert) or recorded (remove).
	pub attribs: AttribSet,
}

impl Op {
	/// Creates an op.
	pub fn new(kind: OpKind, chars: usize, lines: usize, attribs: AttribSet) -> Self {
		Self {
			kind,
			chars,
			lines,
			attribs,
		}
	}
}
