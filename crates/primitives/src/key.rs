//! Pad key resolution.
//!
//! A [`PadKey`] is the only identity used for pad operations. It is rendered as
//! `"{user}@{path}"` where the user half has `'%'` and `'@'` percent-escaped, so
//! the first `'@'` always separates the halves and distinct `(user, file)` pairs
//! can never render to the same key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Error parsing a rendered pad key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
	/// No `'@'` separator.
	#[error("pad key {0:?} has no user separator")]
	MissingSeparator(String),
	/// The user half contains an invalid escape.
	#[error("pad key {0:?} has an invalid user escape")]
	InvalidEscape(String),
	/// The path half is not a normalized absolute path.
	#[error("pad key {0:?} does not carry a normalized absolute path")]
	InvalidPath(String),
}

/// Workspace-absolute file path in normalized form.
///
/// Separators are `/`, the path always starts with `/`, and empty, `.` and `..`
/// segments are resolved. `..` never climbs above the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
	/// Normalizes a path into its canonical form.
	pub fn new(path: &str) -> Self {
		let mut segments: Vec<&str> = Vec::new();
		for segment in path.split(['/', '\\']) {
			match segment {
				"" | "." => {}
				".." => {
					segments.pop();
				}
				other => segments.push(other),
			}
		}

		let mut normalized = String::with_capacity(path.len() + 1);
		if segments.is_empty() {
			normalized.push('/');
		}
		for segment in segments {
			normalized.push('/');
			normalized.push_str(segment);
		}
		Self(normalized)
	}

	/// Returns the normalized path.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns the final path segment, if any.
	pub fn file_name(&self) -> Option<&str> {
		self.0.rsplit('/').next().filter(|name| !name.is_empty())
	}
}

impl From<String> for FilePath {
	fn from(path: String) -> Self {
		Self::new(&path)
	}
}

impl From<&str> for FilePath {
	fn from(path: &str) -> Self {
		Self::new(path)
	}
}

impl From<FilePath> for String {
	fn from(path: FilePath) -> Self {
		path.0
	}
}

impl fmt::Display for FilePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Globally unique identity of one user's pad for one file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PadKey(String);

impl PadKey {
	/// Resolves the pad key for a `(user, file)` pair.
	///
	/// Pure and total: equal pairs yield equal keys, distinct pairs distinct keys.
	pub fn resolve(user: &UserId, file: &FilePath) -> Self {
		let mut key = String::with_capacity(user.as_str().len() + file.as_str().len() + 1);
		for ch in user.as_str().chars() {
			match ch {
				'%' => key.push_str("%25"),
				'@' => key.push_str("%40"),
				other => key.push(other),
			}
		}
		key.push('@');
		key.push_str(file.as_str());
		Self(key)
	}

	/// Returns the rendered key.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Recovers the `(user, file)` pair this key was resolved from.
	pub fn split(&self) -> (UserId, FilePath) {
		let (user, path) = self
			.0
			.split_once('@')
			.unwrap_or(("", self.0.as_str()));
		let user = unescape_user(user).unwrap_or_else(|| user.to_string());
		(UserId(user), FilePath(path.to_string()))
	}

	/// Returns the user half of the key.
	pub fn user(&self) -> UserId {
		self.split().0
	}

	/// Returns the file half of the key.
	pub fn file(&self) -> FilePath {
		self.split().1
	}
}

fn unescape_user(escaped: &str) -> Option<String> {
	let mut out = String::with_capacity(escaped.len());
	let mut rest = escaped;
	while let Some(idx) = rest.find('%') {
		out.push_str(&rest[..idx]);
		let code = rest.get(idx + 1..idx + 3)?;
		match code {
			"25" => out.push('%'),
			"40" => out.push('@'),
			_ => return None,
		}
		rest = &rest[idx + 3..];
	}
	out.push_str(rest);
	Some(out)
}

impl FromStr for PadKey {
	type Err = KeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (user, path) = s
			.split_once('@')
			.ok_or_else(|| KeyError::MissingSeparator(s.to_string()))?;
		let user = unescape_user(user).ok_or_else(|| KeyError::InvalidEscape(s.to_string()))?;
		if FilePath::new(path).as_str() != path {
			return Err(KeyError::InvalidPath(s.to_string()));
		}
		Ok(Self::resolve(&UserId(user), &FilePath(path.to_string())))
	}
}

impl TryFrom<String> for PadKey {
	type Error = KeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<PadKey> for String {
	fn from(key: PadKey) -> Self {
		key.0
	}
}

impl fmt::Display for PadKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
