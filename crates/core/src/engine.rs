//! Pad engine seam.
//!
//! The engine owns concurrent-edit merging and history. The coordinator only
//! calls it while holding the pad lock, so implementations see a serialized
//! stream of mutations per pad.

use parking_lot::Mutex;
use tandem_primitives::{Changeset, ChangesetError, PadKey};

use crate::pad::Pad;

/// Errors reported by a [`PadEngine`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
	/// The pad has not been created yet.
	#[error("pad {0} does not exist")]
	PadMissing(PadKey),
	/// The changeset does not apply to the pad's current text.
	#[error(transparent)]
	Changeset(#[from] ChangesetError),
	/// The engine refused the mutation.
	#[error("engine rejected mutation: {0}")]
	Rejected(String),
}

/// Mutations the coordinator performs on pads.
pub trait PadEngine: Send + Sync {
	/// Creates `pad` with `text`.
	fn create_pad(&self, pad: &mut Pad, text: &str) -> Result<(), EngineError>;

	/// Replaces the text of an existing pad wholesale.
	fn set_text(&self, pad: &mut Pad, text: &str) -> Result<(), EngineError>;

	/// Applies `cs` to `pad` as an edit attributed to `source`.
	fn apply_changeset(&self, pad: &mut Pad, cs: &Changeset, source: &str) -> Result<(), EngineError>;
}

/// One mutation recorded by [`LocalPadEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEdit {
	/// Pad that was mutated.
	pub key: PadKey,
	/// Source tag of the edit.
	pub source: String,
	/// Pad revision after the edit.
	pub revision: u64,
}

/// Engine for a single authority: applies every mutation directly.
///
/// Keeps an in-memory log of applied changesets.
#[derive(Debug, Default)]
pub struct LocalPadEngine {
	applied: Mutex<Vec<AppliedEdit>>,
}

impl LocalPadEngine {
	/// Creates an engine with an empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns every changeset applied so far, oldest first.
	pub fn applied(&self) -> Vec<AppliedEdit> {
		self.applied.lock().clone()
	}
}

impl PadEngine for LocalPadEngine {
	fn create_pad(&self, pad: &mut Pad, text: &str) -> Result<(), EngineError> {
		pad.install(text);
		Ok(())
	}

	fn set_text(&self, pad: &mut Pad, text: &str) -> Result<(), EngineError> {
		if !pad.exists() {
			return Err(EngineError::PadMissing(pad.key().clone()));
		}
		pad.install(text);
		Ok(())
	}

	fn apply_changeset(&self, pad: &mut Pad, cs: &Changeset, source: &str) -> Result<(), EngineError> {
		if !pad.exists() {
			return Err(EngineError::PadMissing(pad.key().clone()));
		}
		pad.apply_changeset(cs)?;
		tracing::debug!(pad = %pad.key(), source, revision = pad.revision(), "engine.apply");
		self.applied.lock().push(AppliedEdit {
			key: pad.key().clone(),
			source: source.to_string(),
			revision: pad.revision(),
		});
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tandem_primitives::ChangesetBuilder;

	use super::*;

	fn pad() -> Pad {
		Pad::placeholder(PadKey::resolve(&"u".into(), &"/f".into()))
	}

	#[test]
	fn test_mutating_absent_pad_fails() {
		let engine = LocalPadEngine::new();
		let mut pad = pad();
		assert!(matches!(engine.set_text(&mut pad, "x"), Err(EngineError::PadMissing(_))));
		assert!(matches!(
			engine.apply_changeset(&mut pad, &Changeset::identity(0), "t"),
			Err(EngineError::PadMissing(_))
		));
	}

	#[test]
	fn test_apply_logs_source() {
		let engine = LocalPadEngine::new();
		let mut pad = pad();
		engine.create_pad(&mut pad, "ab").unwrap();
		let mut b = ChangesetBuilder::new(2);
		b.retain(2, 0).insert("c", &[], pad.pool_mut());
		engine.apply_changeset(&mut pad, &b.finish().unwrap(), "client").unwrap();

		assert_eq!(pad.text().to_string(), "abc");
		let log = engine.applied();
		assert_eq!(log.len(), 1);
		assert_eq!(log[0].source, "client");
		assert_eq!(log[0].revision, 2);
	}
}
