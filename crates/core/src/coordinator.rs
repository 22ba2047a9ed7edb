//! Public coordination surface.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tandem_primitives::{
	Annotation, CompletionProposal, ConnectionId, FilePath, PadKey, StyleSpan, TestId, TestResult, UserId,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::annotations::AnnotationDispatcher;
use crate::bridge::{BindingState, DocumentBridge};
use crate::clients::Clients;
use crate::config::CoreConfig;
use crate::document::DocumentModel;
use crate::engine::PadEngine;
use crate::error::Result;
use crate::events::AnalysisEvent;
use crate::fanout::{FanoutReport, TestResultFanout, TestResultStore, TestTarget};
use crate::serializer::PadAccessSerializer;
use crate::style::build_style_changeset;
use crate::task::{self, TaskClass};

/// Reconciles pads with their documents and routes analysis results.
pub struct Coordinator {
	config: CoreConfig,
	pads: Arc<PadAccessSerializer>,
	engine: Arc<dyn PadEngine>,
	bridge: DocumentBridge,
	dispatcher: AnnotationDispatcher,
	fanout: Arc<TestResultFanout>,
	store: Arc<TestResultStore>,
}

impl Coordinator {
	/// Creates a coordinator over the given collaborators.
	pub fn new(
		config: CoreConfig,
		model: Arc<dyn DocumentModel>,
		engine: Arc<dyn PadEngine>,
		clients: Arc<dyn Clients>,
	) -> Arc<Self> {
		let pads = Arc::new(PadAccessSerializer::new());
		let store = Arc::new(TestResultStore::new());
		let fanout = Arc::new(TestResultFanout::new(clients.clone()));
		let bridge = DocumentBridge::new(
			model,
			pads.clone(),
			engine.clone(),
			clients.clone(),
			fanout.clone(),
			store.clone(),
		);
		Arc::new(Self {
			config,
			pads,
			engine,
			bridge,
			dispatcher: AnnotationDispatcher::new(clients),
			fanout,
			store,
		})
	}

	/// Spawns the analysis event pump reading from `rx`.
	pub fn start(self: &Arc<Self>, rx: mpsc::Receiver<AnalysisEvent>) -> JoinHandle<()> {
		task::spawn(TaskClass::Events, Arc::clone(self).run_events(rx))
	}

	/// Configuration in effect.
	pub fn config(&self) -> &CoreConfig {
		&self.config
	}

	/// Per-pad access, for client edits.
	pub fn pads(&self) -> &PadAccessSerializer {
		&self.pads
	}

	/// Latest test results, shared with the test scheduler.
	pub fn test_results(&self) -> Arc<TestResultStore> {
		self.store.clone()
	}

	/// Pad key for `(user, file)`.
	pub fn resolve_pad_key(&self, user: &UserId, file: &FilePath) -> PadKey {
		PadKey::resolve(user, file)
	}

	/// See [`DocumentBridge::ensure_bound`].
	pub async fn ensure_bound(&self, user: &UserId, file: &FilePath) -> Result<PadKey> {
		self.bridge.ensure_bound(user, file).await
	}

	/// See [`DocumentBridge::create_or_reset`].
	pub async fn create_or_reset(&self, user: &UserId, file: &FilePath, text: &str) -> Result<PadKey> {
		self.bridge.create_or_reset(user, file, text).await
	}

	/// See [`DocumentBridge::revise_document`].
	pub async fn revise_document(&self, key: &PadKey) -> Result<()> {
		self.bridge.revise_document(key).await
	}

	/// Runs [`revise_document`](Self::revise_document) in the background.
	///
	/// Failures are logged.
	pub fn schedule_revise(self: &Arc<Self>, key: PadKey) -> JoinHandle<()> {
		let this = Arc::clone(self);
		task::spawn(TaskClass::Analysis, async move {
			if let Err(err) = this.revise_document(&key).await {
				tracing::warn!(pad = %key, error = %err, "coordinator.revise_failed");
			}
		})
	}

	/// See [`DocumentBridge::new_editor_attached`].
	pub async fn new_editor_attached(&self, key: &PadKey, connection: ConnectionId) -> Result<()> {
		self.bridge.new_editor_attached(key, connection).await
	}

	/// Lays `spans` over the pad text as a style changeset.
	///
	/// Returns `Ok(false)` when nothing was applied: missing pad, or spans that
	/// change no attributes.
	pub async fn apply_style_spans(&self, key: &PadKey, spans: &[StyleSpan]) -> Result<bool> {
		self.apply_style_spans_at(key, None, spans).await
	}

	/// Like [`apply_style_spans`](Self::apply_style_spans) for spans computed at
	/// analysis `revision`; outdated spans are dropped.
	pub async fn apply_style_spans_at(&self, key: &PadKey, revision: Option<u64>, spans: &[StyleSpan]) -> Result<bool> {
		let mut pad = self.pads.lock(key).await;
		if !pad.exists() {
			tracing::warn!(pad = %key, "coordinator.styles: accessing nonexistent pad");
			return Ok(false);
		}
		if self.config.discard_stale_results && pad.is_stale(revision) {
			tracing::debug!(pad = %key, ?revision, latest = pad.analysis_revision(), "coordinator.styles: dropping stale");
			return Ok(false);
		}
		let cs = build_style_changeset(&mut pad, spans)?;
		if cs.is_identity() {
			return Ok(false);
		}
		self.engine.apply_changeset(&mut pad, &cs, &self.config.style_source)?;
		tracing::debug!(pad = %key, spans = spans.len(), "coordinator.styles");
		Ok(true)
	}

	/// Publishes `problems` as the pad's complete problem set.
	///
	/// Returns the number of viewers reached.
	pub async fn publish_problems(&self, key: &PadKey, problems: Vec<Annotation>) -> usize {
		self.publish_problems_at(key, None, problems).await
	}

	/// Like [`publish_problems`](Self::publish_problems) for problems computed at
	/// analysis `revision`; outdated problems are dropped.
	pub async fn publish_problems_at(&self, key: &PadKey, revision: Option<u64>, problems: Vec<Annotation>) -> usize {
		let mut pad = self.pads.lock(key).await;
		if !pad.exists() {
			tracing::warn!(pad = %key, "coordinator.problems: accessing nonexistent pad");
			return 0;
		}
		if self.config.discard_stale_results && pad.is_stale(revision) {
			tracing::debug!(pad = %key, ?revision, latest = pad.analysis_revision(), "coordinator.problems: dropping stale");
			return 0;
		}
		self.dispatcher
			.publish(&mut pad, &self.config.problem_channel, problems)
	}

	/// See [`DocumentBridge::code_complete`].
	pub async fn code_complete(&self, key: &PadKey, offset: usize, connection: ConnectionId) -> Result<Vec<CompletionProposal>> {
		self.bridge.code_complete(key, offset, connection).await
	}

	/// Routes a test outcome. Project-wide results are also stored for replay
	/// to editors attached later.
	pub fn report_test_result(&self, target: &TestTarget, test: TestId, result: TestResult) -> FanoutReport {
		match target {
			TestTarget::Connection(connection) => self.fanout.report_one(*connection, &test, &result),
			TestTarget::Project(project) => {
				let report = self.fanout.report_project(project, &test, &result);
				self.store.record(project, test, result);
				report
			}
		}
	}

	/// See [`DocumentBridge::content_type_name`].
	pub fn content_type_name(&self, key: &PadKey) -> Option<String> {
		self.bridge.content_type_name(key)
	}

	/// See [`DocumentBridge::binding_state`].
	pub async fn binding_state(&self, key: &PadKey) -> BindingState {
		self.bridge.binding_state(key).await
	}

	/// Drains `rx`, routing each event to the lane of the pad it targets.
	///
	/// A lane handles its pad's events one at a time in arrival order, so a
	/// document's results apply in emission order. Lanes run independently: a
	/// held or slow pad never delays results for other pads. Test results
	/// target no pad and are handled inline.
	pub async fn run_events(self: Arc<Self>, mut rx: mpsc::Receiver<AnalysisEvent>) {
		let mut lanes: FxHashMap<PadKey, mpsc::UnboundedSender<AnalysisEvent>> = FxHashMap::default();
		while let Some(event) = rx.recv().await {
			let Some(key) = event.pad_key() else {
				self.handle_logged(event).await;
				continue;
			};
			let lane = lanes.entry(key.clone()).or_insert_with(|| self.spawn_lane(&key));
			if let Err(mpsc::error::SendError(event)) = lane.send(event) {
				tracing::warn!(pad = %key, "coordinator.lane_closed; respawning");
				let lane = self.spawn_lane(&key);
				if lane.send(event).is_ok() {
					lanes.insert(key, lane);
				}
			}
		}
		tracing::debug!(lanes = lanes.len(), "coordinator.events_closed");
	}

	fn spawn_lane(self: &Arc<Self>, key: &PadKey) -> mpsc::UnboundedSender<AnalysisEvent> {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let this = Arc::clone(self);
		tracing::trace!(pad = %key, "coordinator.lane_open");
		task::spawn(TaskClass::Events, async move {
			while let Some(event) = rx.recv().await {
				this.handle_logged(event).await;
			}
		});
		tx
	}

	async fn handle_logged(&self, event: AnalysisEvent) {
		if let Err(err) = self.handle_event(event).await {
			tracing::warn!(error = %err, "coordinator.event_failed");
		}
	}

	async fn handle_event(&self, event: AnalysisEvent) -> Result<()> {
		match event {
			AnalysisEvent::Contents { user, file, text } => {
				self.create_or_reset(&user, &file, &text).await?;
			}
			AnalysisEvent::Problems { key, revision, problems } => {
				self.publish_problems_at(&key, revision, problems).await;
			}
			AnalysisEvent::Styles { key, revision, spans } => {
				self.apply_style_spans_at(&key, revision, &spans).await?;
			}
			AnalysisEvent::TestResult { target, test, result } => {
				self.report_test_result(&target, test, result);
			}
		}
		Ok(())
	}
}
