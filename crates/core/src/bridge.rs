//! Binding between document model documents and pads.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tandem_primitives::{CompletionProposal, ConnectionId, FilePath, PadKey, ProjectId, UserId};
use tokio::sync::OnceCell;

use crate::clients::{ClientMessage, Clients};
use crate::document::{Document, DocumentModel};
use crate::engine::PadEngine;
use crate::error::{Error, Result};
use crate::fanout::{TestResultFanout, TestResultStore};
use crate::serializer::PadAccessSerializer;

/// How far a `(user, file)` pair has been wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
	/// No document has been opened.
	Unbound,
	/// The document is open but its pad has no content yet.
	BoundEmpty,
	/// Document and pad both exist.
	BoundActive,
}

type Binding = Arc<OnceCell<Arc<dyn Document>>>;

/// Opens documents on demand and keeps them paired with their pads.
///
/// Each key's document is opened at most once: concurrent binders of the same
/// key share one `open` call, and a failed open leaves the key unbound for the
/// next attempt.
pub struct DocumentBridge {
	model: Arc<dyn DocumentModel>,
	documents: Mutex<FxHashMap<PadKey, Binding>>,
	pads: Arc<PadAccessSerializer>,
	engine: Arc<dyn PadEngine>,
	clients: Arc<dyn Clients>,
	fanout: Arc<TestResultFanout>,
	store: Arc<TestResultStore>,
}

impl DocumentBridge {
	pub(crate) fn new(
		model: Arc<dyn DocumentModel>,
		pads: Arc<PadAccessSerializer>,
		engine: Arc<dyn PadEngine>,
		clients: Arc<dyn Clients>,
		fanout: Arc<TestResultFanout>,
		store: Arc<TestResultStore>,
	) -> Self {
		Self {
			model,
			documents: Mutex::new(FxHashMap::default()),
			pads,
			engine,
			clients,
			fanout,
			store,
		}
	}

	/// Returns the bound document for `key`, if any.
	pub fn document(&self, key: &PadKey) -> Option<Arc<dyn Document>> {
		self.documents.lock().get(key)?.get().cloned()
	}

	async fn bind(&self, user: &UserId, file: &FilePath, key: &PadKey) -> Result<Arc<dyn Document>> {
		let binding = self.documents.lock().entry(key.clone()).or_default().clone();
		let doc = binding
			.get_or_try_init(|| async {
				let doc = self.model.open(user, file).await?;
				tracing::debug!(pad = %key, "bridge.bind");
				Ok::<_, Error>(doc)
			})
			.await?;
		Ok(doc.clone())
	}

	/// Makes sure the document for `(user, file)` is open and returns its pad key.
	///
	/// Idempotent. Logs an integrity warning if the pad has no content yet.
	pub async fn ensure_bound(&self, user: &UserId, file: &FilePath) -> Result<PadKey> {
		let key = PadKey::resolve(user, file);
		self.bind(user, file, &key).await?;
		if !self.pads.with_pad(&key, |pad| pad.exists()).await {
			tracing::warn!(pad = %key, "bridge.ensure_bound: accessing nonexistent pad");
		}
		Ok(key)
	}

	/// Creates the pad for `(user, file)` with `text`, or replaces its text wholesale.
	pub async fn create_or_reset(&self, user: &UserId, file: &FilePath, text: &str) -> Result<PadKey> {
		let key = PadKey::resolve(user, file);
		self.bind(user, file, &key).await?;
		let mut pad = self.pads.lock(&key).await;
		if pad.exists() {
			self.engine.set_text(&mut pad, text)?;
			tracing::debug!(pad = %key, "bridge.reset");
		} else {
			self.engine.create_pad(&mut pad, text)?;
			tracing::debug!(pad = %key, "bridge.create");
		}
		Ok(key)
	}

	/// Sends the pad's current text to its document for re-analysis.
	///
	/// The text is read under the pad lock; the document call runs after the
	/// lock is released. Missing documents or pads are logged and skipped.
	pub async fn revise_document(&self, key: &PadKey) -> Result<()> {
		let Some(doc) = self.document(key) else {
			tracing::warn!(pad = %key, "bridge.revise: no document bound");
			return Ok(());
		};
		let snapshot = self
			.pads
			.with_pad(key, |pad| {
				pad.exists()
					.then(|| (pad.text().to_string(), pad.next_analysis_revision()))
			})
			.await;
		let Some((text, revision)) = snapshot else {
			tracing::warn!(pad = %key, "bridge.revise: accessing nonexistent pad");
			return Ok(());
		};
		tracing::debug!(pad = %key, revision, "bridge.revise");
		doc.revise(text, revision).await?;
		Ok(())
	}

	/// Refreshes analysis for a newly attached editor and replays the project's
	/// latest test results to that connection only.
	pub async fn new_editor_attached(&self, key: &PadKey, connection: ConnectionId) -> Result<()> {
		let Some(doc) = self.document(key) else {
			tracing::warn!(pad = %key, connection = ?connection, "bridge.attach: no document bound");
			return Ok(());
		};
		doc.empty_revise().await?;
		let project = doc.project();
		for (test, result) in self.store.results(&project) {
			self.fanout.report_one(connection, &test, &result);
		}
		Ok(())
	}

	/// Runs completion at `offset` and pushes the proposals to `connection`.
	pub async fn code_complete(&self, key: &PadKey, offset: usize, connection: ConnectionId) -> Result<Vec<CompletionProposal>> {
		let Some(doc) = self.document(key) else {
			tracing::warn!(pad = %key, "bridge.complete: no document bound");
			return Ok(Vec::new());
		};
		let proposals = doc.code_complete(offset).await?;
		let msg = ClientMessage::CompletionProposals {
			pad: key.clone(),
			offset,
			proposals: proposals.clone(),
		};
		if let Err(err) = self.clients.deliver(connection, msg) {
			tracing::warn!(pad = %key, connection = ?connection, error = %err, "bridge.complete: deliver failed");
		}
		Ok(proposals)
	}

	/// Content type of the bound document.
	pub fn content_type_name(&self, key: &PadKey) -> Option<String> {
		self.document(key).map(|doc| doc.content_type_name())
	}

	/// Project of the bound document.
	pub fn project(&self, key: &PadKey) -> Option<ProjectId> {
		self.document(key).map(|doc| doc.project())
	}

	/// Current [`BindingState`] of `key`.
	pub async fn binding_state(&self, key: &PadKey) -> BindingState {
		if self.document(key).is_none() {
			return BindingState::Unbound;
		}
		if self.pads.with_pad(key, |pad| pad.exists()).await {
			BindingState::BoundActive
		} else {
			BindingState::BoundEmpty
		}
	}
}
