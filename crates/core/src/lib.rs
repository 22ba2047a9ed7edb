//! Pad coordination layer.
//!
//! Keeps a collaborative pad and the analysis subsystem's document for the same
//! `(user, file)` pair consistent while clients edit and analysis results arrive
//! asynchronously.
//!
//! # Purpose
//!
//! - Resolve a stable [`PadKey`](tandem_primitives::PadKey) per `(user, file)`.
//! - Serialize every pad mutation through [`PadAccessSerializer`].
//! - Turn style spans into attribute changesets against the pad's own pool.
//! - Fan out problem annotations and test results to the right connections.
//!
//! # Invariants
//!
//! - At most one mutator holds a given pad. Distinct pads never block each other.
//! - The shard map lock is never held across an await; only the per-pad async
//!   mutex is.
//! - Document model calls (revise, completion) run with no pad lock held.
//! - A pad's attribute pool is only mutated by the holder of its lock, and only
//!   after style spans have been validated against the text.
//! - A delivery failure to one connection never prevents delivery to others and
//!   never surfaces as an [`Error`].
//! - With `discard_stale_results` on, problems and styles computed for an older
//!   analysis revision than the pad's latest are dropped.
//!
//! # Concurrency
//!
//! Callers may use the [`Coordinator`] surface from any task. Document model
//! results arrive through [`events::channel`]. The pump spawned from
//! [`Coordinator::start`] hands each one to its pad's lane: a pad's results
//! apply in arrival order, and different pads never wait on each other.

pub mod annotations;
pub mod bridge;
pub mod clients;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod engine;
mod error;
pub mod events;
pub mod fanout;
pub mod pad;
pub mod scheduler;
pub mod serializer;
pub mod sessions;
pub mod style;
pub mod task;

pub use annotations::AnnotationDispatcher;
pub use bridge::{BindingState, DocumentBridge};
pub use clients::{ClientMessage, Clients, DeliveryError};
pub use config::{ConfigError, CoreConfig};
pub use coordinator::Coordinator;
pub use document::{Document, DocumentError, DocumentModel};
pub use engine::{AppliedEdit, EngineError, LocalPadEngine, PadEngine};
pub use error::{Error, Result};
pub use events::{AnalysisEvent, AnalysisSender};
pub use fanout::{FanoutReport, TestResultFanout, TestResultStore, TestTarget};
pub use pad::Pad;
pub use scheduler::{RunError, RunOutcome, TestRunner, TestScheduler, TestSchedulerHandle};
pub use serializer::{PadAccessSerializer, PadGuard};
pub use sessions::SessionRegistry;
pub use style::build_style_changeset;
pub use task::TaskClass;
