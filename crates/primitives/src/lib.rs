//! Core types shared by the pad coordination layer: pad keys, attribute pools,
//! attributed changesets, annotations and test results.

/// Line-scoped problem annotations.
pub mod annotation;
pub mod attrib;
pub mod attributed;
pub mod changeset;
/// Code completion proposals.
pub mod completion;
/// Identifier types for users, connections and projects.
pub mod ids;
pub mod key;
/// Externally computed style spans.
pub mod span;
/// Test identities and outcomes.
pub mod testing;

pub use annotation::{Annotation, PROBLEM_CHANNEL, Severity};
pub use attrib::{AttribCode, AttribSet, Attribute, AttributePool, DuplicateAttribute};
pub use attributed::{AttributedText, Run};
pub use changeset::{Changeset, ChangesetBuilder, ChangesetError, Op, OpKind};
pub use completion::CompletionProposal;
pub use ids::{ConnectionId, ProjectId, UserId};
pub use key::{FilePath, KeyError, PadKey};
pub use ropey::Rope;
pub use span::StyleSpan;
pub use testing::{TestId, TestResult, TestStatus};
