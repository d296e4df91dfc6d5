//! Item identifiers and the id collections the engine is built on.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Insertion-ordered id set. Iteration order is the UI display order.
pub type IdSet = IndexSet<ItemId, FxBuildHasher>;

/// Unordered id set for membership checks.
pub type IdHashSet = FxHashSet<ItemId>;

/// Identifier of a selectable item.
///
/// Ids are opaque, non-empty strings owned by the options source. Cloning is
/// a reference-count bump, so ids can be passed freely between selection
/// state, caches and in-flight requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(Arc<str>);

/// Errors produced when constructing an [`ItemId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
	/// The id was the empty string.
	#[error("item id must not be empty")]
	Empty,
}

impl ItemId {
	/// Creates an id, rejecting the empty string.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
		let value = value.as_ref();
		if value.is_empty() {
			return Err(IdError::Empty);
		}
		Ok(Self(Arc::from(value)))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ItemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ItemId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for ItemId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl FromStr for ItemId {
	type Err = IdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl TryFrom<String> for ItemId {
	type Error = IdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<&str> for ItemId {
	type Error = IdError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl From<ItemId> for String {
	fn from(id: ItemId) -> Self {
		id.0.to_string()
	}
}
