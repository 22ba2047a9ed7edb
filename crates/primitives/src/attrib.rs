//! Attribute pools and attribute sets.
//!
//! An [`AttributePool`] is the per-pad vocabulary mapping `(name, value)` pairs to
//! small integer [`AttribCode`]s. Pools are append-only: codes stay stable for the
//! lifetime of the pad and are never reused or renumbered.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single `(name, value)` attribute.
///
/// An empty value marks a removal: applying it clears `name` instead of setting it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Attribute {
	/// Attribute name, e.g. `"style"`.
	pub name: String,
	/// Attribute value, e.g. `"keyword"`; empty to clear.
	pub value: String,
}

impl Attribute {
	/// Creates an attribute.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
		}
	}

	/// Returns true if applying this attribute clears its name.
	pub fn is_removal(&self) -> bool {
		self.value.is_empty()
	}
}

/// Compact code for an attribute within one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttribCode(pub u32);

/// A serialized pool lists the same attribute twice, so its codes are ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("attribute {name:?}={value:?} appears at codes {first} and {second}")]
pub struct DuplicateAttribute {
	/// Attribute name.
	pub name: String,
	/// Attribute value.
	pub value: String,
	/// Code of the first occurrence.
	pub first: u32,
	/// Code of the repeat.
	pub second: u32,
}

/// Append-only attribute vocabulary for one pad.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct AttributePool {
	entries: Vec<Attribute>,
	index: FxHashMap<Attribute, AttribCode>,
}

impl AttributePool {
	/// Creates an empty pool.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the code for `attr`, appending it if it has never been seen.
	pub fn put(&mut self, attr: &Attribute) -> AttribCode {
		if let Some(code) = self.index.get(attr) {
			return *code;
		}
		let code = AttribCode(self.entries.len() as u32);
		self.entries.push(attr.clone());
		self.index.insert(attr.clone(), code);
		code
	}

	/// Returns the code for `attr` without registering it.
	pub fn lookup(&self, attr: &Attribute) -> Option<AttribCode> {
		self.index.get(attr).copied()
	}

	/// Resolves a code back to its attribute.
	pub fn get(&self, code: AttribCode) -> Option<&Attribute> {
		self.entries.get(code.0 as usize)
	}

	/// Number of registered attributes.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing has been registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates `(code, attribute)` pairs in code order.
	pub fn iter(&self) -> impl Iterator<Item = (AttribCode, &Attribute)> {
		self.entries
			.iter()
			.enumerate()
			.map(|(idx, attr)| (AttribCode(idx as u32), attr))
	}
}

impl TryFrom<Vec<Attribute>> for AttributePool {
	type Error = DuplicateAttribute;

	fn try_from(entries: Vec<Attribute>) -> Result<Self, Self::Error> {
		let mut pool = Self::new();
		for attr in entries {
			if let Some(first) = pool.lookup(&attr) {
				return Err(DuplicateAttribute {
					first: first.0,
					second: pool.entries.len() as u32,
					name: attr.name,
					value: attr.value,
				});
			}
			pool.put(&attr);
		}
		Ok(pool)
	}
}

impl From<AttributePool> for Vec<Attribute> {
	fn from(pool: AttributePool) -> Self {
		pool.entries
	}
}

/// Sorted, deduplicated set of attribute codes carried by an op or a text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttribSet(SmallVec<[AttribCode; 4]>);

impl AttribSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a set from arbitrary codes.
	pub fn from_codes(codes: impl IntoIterator<Item = AttribCode>) -> Self {
		let mut codes: SmallVec<[AttribCode; 4]> = codes.into_iter().collect();
		codes.sort_unstable();
		codes.dedup();
		Self(codes)
	}

	/// Registers `attributes` in `pool` and collects their codes.
	pub fn intern(attributes: &[Attribute], pool: &mut AttributePool) -> Self {
		Self::from_codes(attributes.iter().map(|attr| pool.put(attr)))
	}

	/// Returns the codes in ascending order.
	pub fn codes(&self) -> &[AttribCode] {
		&self.0
	}

	/// Returns true if the set carries no codes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if `code` is in the set.
	pub fn contains(&self, code: AttribCode) -> bool {
		self.0.binary_search(&code).is_ok()
	}

	/// Applies `delta` on top of `self`.
	///
	/// Every name mentioned by `delta` is replaced: non-empty values are set and
	/// empty values clear the name. Codes unknown to `pool` are kept as-is.
	pub fn compose(&self, delta: &AttribSet, pool: &AttributePool) -> AttribSet {
		if delta.is_empty() {
			return self.clone();
		}

		let touched: FxHashSet<&str> = delta
			.0
			.iter()
			.filter_map(|code| pool.get(*code))
			.map(|attr| attr.name.as_str())
			.collect();

		let kept = self.0.iter().copied().filter(|code| {
			pool.get(*code)
				.is_none_or(|attr| !touched.contains(attr.name.as_str()))
		});
		let set = delta
			.0
			.iter()
			.copied()
			.filter(|code| pool.get(*code).is_some_and(|attr| !attr.is_removal()));

		Self::from_codes(kept.chain(set))
	}

	/// Resolves the set into attributes, skipping unknown codes.
	pub fn resolve<'a>(&'a self, pool: &'a AttributePool) -> impl Iterator<Item = &'a Attribute> + 'a {
		self.0.iter().filter_map(|code| pool.get(*code))
	}
}
