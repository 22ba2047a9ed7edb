use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a workspace user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
	/// Wraps a user name.
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	/// Returns the raw user name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for UserId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Unique identifier for one live client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

/// Identifier grouping documents and connections for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
	/// Wraps a project name.
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	/// Returns the project name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ProjectId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl fmt::Display for ProjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
