use rustc_hash::FxHashMap;
use tandem_primitives::{Annotation, AttributePool, AttributedText, Changeset, ChangesetError, PadKey, Rope};

/// Mutable state of one collaborative pad.
///
/// Only reachable through [`PadAccessSerializer`](crate::PadAccessSerializer),
/// so every method here runs with the pad lock held.
#[derive(Debug)]
pub struct Pad {
	key: PadKey,
	exists: bool,
	content: AttributedText,
	pool: AttributePool,
	revision: u64,
	analysis_revision: u64,
	annotations: FxHashMap<String, Vec<Annotation>>,
}

impl Pad {
	/// Creates the absent placeholder stored on first reference.
	pub fn placeholder(key: PadKey) -> Self {
		Self {
			key,
			exists: false,
			content: AttributedText::default(),
			pool: AttributePool::new(),
			revision: 0,
			analysis_revision: 0,
			annotations: FxHashMap::default(),
		}
	}

	/// Key of this pad.
	pub fn key(&self) -> &PadKey {
		&self.key
	}

	/// Returns true once the pad has been created with content.
	pub fn exists(&self) -> bool {
		self.exists
	}

	/// Current text.
	pub fn text(&self) -> &Rope {
		self.content.text()
	}

	/// Current text length in chars.
	pub fn len_chars(&self) -> usize {
		self.content.len_chars()
	}

	/// Text with its attribute runs.
	pub fn content(&self) -> &AttributedText {
		&self.content
	}

	/// The pad's attribute vocabulary.
	pub fn pool(&self) -> &AttributePool {
		&self.pool
	}

	pub(crate) fn pool_mut(&mut self) -> &mut AttributePool {
		&mut self.pool
	}

	/// Head revision; bumped by every applied changeset and text install.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Latest revision sent to the document model for analysis.
	pub fn analysis_revision(&self) -> u64 {
		self.analysis_revision
	}

	/// Latest annotations published under `channel`.
	pub fn annotations(&self, channel: &str) -> &[Annotation] {
		self.annotations.get(channel).map_or(&[], Vec::as_slice)
	}

	/// Replaces the text wholesale, dropping attributes, and marks the pad as existing.
	pub fn install(&mut self, text: &str) {
		self.content = AttributedText::new(text);
		self.exists = true;
		self.revision += 1;
	}

	/// Applies `cs` against the current content and bumps the revision.
	pub fn apply_changeset(&mut self, cs: &Changeset) -> Result<(), ChangesetError> {
		self.content.apply(cs, &self.pool)?;
		self.revision += 1;
		Ok(())
	}

	/// Replaces the annotation set under `channel`.
	pub fn replace_annotations(&mut self, channel: &str, annotations: Vec<Annotation>) {
		if annotations.is_empty() {
			self.annotations.remove(channel);
		} else {
			self.annotations.insert(channel.to_string(), annotations);
		}
	}

	/// Allocates the revision number for a new analysis request.
	pub fn next_analysis_revision(&mut self) -> u64 {
		self.analysis_revision += 1;
		self.analysis_revision
	}

	/// Returns true if a result computed for `revision` has been superseded.
	///
	/// Results without a revision are never stale.
	pub fn is_stale(&self, revision: Option<u64>) -> bool {
		revision.is_some_and(|rev| rev < self.analysis_revision)
	}
}
