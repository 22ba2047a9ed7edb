//! Shared fakes for coordinator integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tandem_core::{
	AnalysisEvent, AnalysisSender, ClientMessage, Coordinator, CoreConfig, Document, DocumentError, DocumentModel,
	LocalPadEngine, SessionRegistry, events,
};
use tandem_primitives::{CompletionProposal, ConnectionId, FilePath, PadKey, ProjectId, UserId};
use tokio::sync::mpsc;

/// Document that records what it was asked to do.
pub struct FakeDocument {
	pub key: PadKey,
	pub project: ProjectId,
	pub revisions: Mutex<Vec<(String, u64)>>,
	pub empty_revisions: Mutex<usize>,
	pub events: AnalysisSender,
}

#[async_trait]
impl Document for FakeDocument {
	async fn revise(&self, text: String, revision: u64) -> Result<(), DocumentError> {
		self.revisions.lock().push((text, revision));
		Ok(())
	}

	async fn empty_revise(&self) -> Result<(), DocumentError> {
		*self.empty_revisions.lock() += 1;
		Ok(())
	}

	async fn code_complete(&self, offset: usize) -> Result<Vec<CompletionProposal>, DocumentError> {
		Ok(vec![CompletionProposal::new("println", offset.saturating_sub(3), offset)])
	}

	fn content_type_name(&self) -> String {
		"java".to_string()
	}

	fn project(&self) -> ProjectId {
		self.project.clone()
	}
}

/// Opens one [`FakeDocument`] per pad key, all in the same project.
pub struct FakeModel {
	pub project: ProjectId,
	pub events: AnalysisSender,
	pub documents: Mutex<Vec<Arc<FakeDocument>>>,
	pub opens: Mutex<usize>,
	pub open_delay: Mutex<Duration>,
}

impl FakeModel {
	pub fn document(&self, key: &PadKey) -> Option<Arc<FakeDocument>> {
		self.documents.lock().iter().find(|doc| &doc.key == key).cloned()
	}
}

#[async_trait]
impl DocumentModel for FakeModel {
	async fn open(&self, user: &UserId, file: &FilePath) -> Result<Arc<dyn Document>, DocumentError> {
		if file.as_str().ends_with(".missing") {
			return Err(DocumentError::Unavailable(file.to_string()));
		}
		*self.opens.lock() += 1;
		let delay = *self.open_delay.lock();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		let doc = Arc::new(FakeDocument {
			key: PadKey::resolve(user, file),
			project: self.project.clone(),
			revisions: Mutex::new(Vec::new()),
			empty_revisions: Mutex::new(0),
			events: self.events.clone(),
		});
		self.documents.lock().push(doc.clone());
		Ok(doc)
	}
}

pub struct Harness {
	pub coordinator: Arc<Coordinator>,
	pub model: Arc<FakeModel>,
	pub engine: Arc<LocalPadEngine>,
	pub sessions: Arc<SessionRegistry>,
	pub events: AnalysisSender,
	pub pump: tokio::task::JoinHandle<()>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(CoreConfig::default())
	}

	pub fn with_config(config: CoreConfig) -> Self {
		let _ = tracing_subscriber::fmt::try_init();
		let (events, rx) = events::channel(config.event_queue_capacity);
		let model = Arc::new(FakeModel {
			project: ProjectId::new("proj"),
			events: events.clone(),
			documents: Mutex::new(Vec::new()),
			opens: Mutex::new(0),
			open_delay: Mutex::new(Duration::ZERO),
		});
		let engine = Arc::new(LocalPadEngine::new());
		let sessions = Arc::new(SessionRegistry::new());
		let coordinator = Coordinator::new(config, model.clone(), engine.clone(), sessions.clone());
		let pump = coordinator.start(rx);
		Self {
			coordinator,
			model,
			engine,
			sessions,
			events,
			pump,
		}
	}

	/// Registers a connection in the harness project viewing `key`.
	pub fn viewer(&self, id: u64, key: &PadKey) -> mpsc::UnboundedReceiver<ClientMessage> {
		let rx = self.sessions.register(ConnectionId(id), ProjectId::new("proj"));
		self.sessions.open(ConnectionId(id), key.clone());
		rx
	}

	/// Sends `event` and waits until the pump has handled it.
	pub async fn emit(&self, event: AnalysisEvent) {
		self.events.send(event).await.unwrap();
		settle().await;
	}
}

/// Gives spawned tasks time to run.
pub async fn settle() {
	tokio::time::sleep(Duration::from_millis(20)).await;
}

pub fn user() -> UserId {
	UserId::new("alice")
}

pub fn file(path: &str) -> FilePath {
	FilePath::new(path)
}
