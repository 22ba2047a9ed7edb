//! Text with attribute runs.
//!
//! [`AttributedText`] is what a changeset applies to: a rope plus a run-length
//! list of attribute sets covering it. Adjacent runs with equal sets are always
//! merged, so two texts with the same visible styling compare equal.

use ropey::Rope;

use crate::attrib::{AttribSet, AttributePool};
use crate::changeset::{Changeset, ChangesetError, OpKind};

/// A run of chars sharing one attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
	/// Char length of the run.
	pub chars: usize,
	/// Attributes carried by every char of the run.
	pub attribs: AttribSet,
}

/// Text plus attribute runs.
#[derive(Debug, Clone, Default)]
pub struct AttributedText {
	text: Rope,
	runs: Vec<Run>,
}

impl AttributedText {
	/// Creates unattributed text.
	pub fn new(text: &str) -> Self {
		let text = Rope::from(text);
		let mut runs = Vec::new();
		push_run(&mut runs, text.len_chars(), AttribSet::new());
		Self { text, runs }
	}

	/// Returns the text.
	pub fn text(&self) -> &Rope {
		&self.text
	}

	/// Length in chars.
	pub fn len_chars(&self) -> usize {
		self.text.len_chars()
	}

	/// Returns true if the text is empty.
	pub fn is_empty(&self) -> bool {
		self.text.len_chars() == 0
	}

	/// Returns the attribute runs, in order, covering the whole text.
	pub fn runs(&self) -> &[Run] {
		&self.runs
	}

	/// Returns the attributes at char `idx`.
	pub fn attribs_at(&self, idx: usize) -> Option<&AttribSet> {
		let mut start = 0;
		for run in &self.runs {
			if idx < start + run.chars {
				return Some(&run.attribs);
			}
			start += run.chars;
		}
		None
	}

	/// Counts newlines in `[start, start + chars)`.
	pub fn newlines_in(&self, start: usize, chars: usize) -> usize {
		self.text
			.slice(start..start + chars)
			.chars()
			.filter(|&ch| ch == '\n')
			.count()
	}

	/// Applies `cs`, resolving attribute names through `pool`.
	///
	/// The changeset is fully validated before anything is mutated; on error the
	/// text is left unchanged.
	///
	/// # Errors
	///
	/// Fails if `cs` was built for a different length, if an op reaches past the
	/// end, or if an op's line count disagrees with the text it covers.
	pub fn apply(&mut self, cs: &Changeset, pool: &AttributePool) -> Result<(), ChangesetError> {
		self.validate(cs)?;

		let mut text = self.text.clone();
		let mut runs = Vec::with_capacity(self.runs.len() + cs.ops().len());
		let mut old = RunCursor::new(&self.runs);
		let mut pos = 0;
		let mut bank = cs.char_bank().chars();

		for op in cs.ops() {
			match op.kind {
				OpKind::Keep => {
					for (chars, attribs) in old.take(op.chars) {
						push_run(&mut runs, chars, attribs.compose(&op.attribs, pool));
					}
					pos += op.chars;
				}
				OpKind::Remove => {
					old.take(op.chars);
					text.remove(pos..pos + op.chars);
				}
				OpKind::Insert => {
					let inserted: String = bank.by_ref().take(op.chars).collect();
					text.insert(pos, &inserted);
					let attribs = AttribSet::new().compose(&op.attribs, pool);
					push_run(&mut runs, op.chars, attribs);
					pos += op.chars;
				}
			}
		}
		for (chars, attribs) in old.rest() {
			push_run(&mut runs, chars, attribs.clone());
		}

		debug_assert_eq!(text.len_chars(), cs.new_len());
		self.text = text;
		self.runs = runs;
		Ok(())
	}

	fn validate(&self, cs: &Changeset) -> Result<(), ChangesetError> {
		let len = self.len_chars();
		if cs.old_len() != len {
			return Err(ChangesetError::LengthMismatch {
				expected: cs.old_len(),
				actual: len,
			});
		}

		let mut offset = 0;
		let mut bank = cs.char_bank().chars();
		for op in cs.ops() {
			let start = offset;
			let actual = match op.kind {
				OpKind::Insert => bank.by_ref().take(op.chars).filter(|&ch| ch == '\n').count(),
				OpKind::Keep | OpKind::Remove => {
					if op.chars > len - offset {
						return Err(ChangesetError::PastEnd {
							offset,
							chars: op.chars,
							len,
						});
					}
					let lines = self.newlines_in(offset, op.chars);
					offset += op.chars;
					lines
				}
			};
			if actual != op.lines {
				return Err(ChangesetError::LineMismatch {
					offset: start,
					declared: op.lines,
					actual,
				});
			}
		}
		Ok(())
	}
}

fn push_run(runs: &mut Vec<Run>, chars: usize, attribs: AttribSet) {
	if chars == 0 {
		return;
	}
	match runs.last_mut() {
		Some(last) if last.attribs == attribs => last.chars += chars,
		_ => runs.push(Run { chars, attribs }),
	}
}

/// Walks runs, splitting them at arbitrary char counts.
struct RunCursor<'a> {
	runs: &'a [Run],
	idx: usize,
	offset: usize,
}

impl<'a> RunCursor<'a> {
	fn new(runs: &'a [Run]) -> Self {
		Self {
			runs,
			idx: 0,
			offset: 0,
		}
	}

	fn take(&mut self, mut chars: usize) -> Vec<(usize, &'a AttribSet)> {
		let mut pieces = Vec::new();
		while chars > 0 {
			let Some(run) = self.runs.get(self.idx) else {
				break;
			};
			let avail = run.chars - self.offset;
			let n = avail.min(chars);
			pieces.push((n, &run.attribs));
			chars -= n;
			self.offset += n;
			if self.offset == run.chars {
				self.idx += 1;
				self.offset = 0;
			}
		}
		pieces
	}

	fn rest(mut self) -> Vec<(usize, &'a AttribSet)> {
		let remaining: usize = self.runs[self.idx.min(self.runs.len())..]
			.iter()
			.map(|run| run.chars)
			.sum::<usize>()
			- self.offset;
		self.take(remaining)
	}
}
