//! The normalized selection value and its host-facing boundary shape.
//!
//! Hosts exchange values as one of three shapes: nothing, a single string, or a
//! list of strings. A single string equal to the configured all-sentinel means
//! "every remote item". Internally that is folded into [`SelectionValue`],
//! which is converted back only when a change is reported.

use serde::{Deserialize, Serialize};

use crate::exclusion::ExclusionSet;
use crate::ids::{IdSet, ItemId};

/// Default all-sentinel token.
pub const DEFAULT_SELECT_ALL_VALUE: &str = "__ALL__";

/// Behavioural mode of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectMode {
	/// Whether several items may be selected at once.
	pub multiple: bool,
	/// Whether options are fetched remotely.
	pub async_mode: bool,
}

impl SelectMode {
	pub const fn new(multiple: bool, async_mode: bool) -> Self {
		Self { multiple, async_mode }
	}

	/// Whether the universal "all except" selection is reachable.
	pub const fn allows_all(self) -> bool {
		self.multiple && self.async_mode
	}
}

impl Default for SelectMode {
	fn default() -> Self {
		Self::new(true, false)
	}
}

/// What is selected.
///
/// `Many` is never empty: an empty multi selection is `None`. `AllExcept` only
/// exists in async multiple mode and `Single` only in single mode;
/// [`crate::selection::SelectionState`] enforces both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionValue {
	#[default]
	None,
	Single(ItemId),
	Many(IdSet),
	AllExcept(ExclusionSet),
}

impl SelectionValue {
	/// Builds a multi selection, collapsing an empty list to `None`.
	pub fn many(ids: impl IntoIterator<Item = ItemId>) -> Self {
		let ids: IdSet = ids.into_iter().collect();
		if ids.is_empty() { Self::None } else { Self::Many(ids) }
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::None)
	}

	pub fn is_all(&self) -> bool {
		matches!(self, Self::AllExcept(_))
	}

	/// Explicitly listed ids in display order. Empty for `AllExcept`.
	pub fn ids(&self) -> Vec<ItemId> {
		match self {
			Self::None | Self::AllExcept(_) => Vec::new(),
			Self::Single(id) => vec![id.clone()],
			Self::Many(ids) => ids.iter().cloned().collect(),
		}
	}

	pub fn excluded(&self) -> Option<&ExclusionSet> {
		match self {
			Self::AllExcept(excluded) => Some(excluded),
			_ => None,
		}
	}

	pub fn contains(&self, id: &str) -> bool {
		match self {
			Self::None => false,
			Self::Single(selected) => selected.as_str() == id,
			Self::Many(ids) => ids.contains(id),
			Self::AllExcept(excluded) => !excluded.contains(id),
		}
	}

	/// Converts a host value into the normalized form for `mode`.
	///
	/// `excluded` seeds the exclusion set when the value is the all-sentinel.
	/// Shapes the mode cannot represent are coerced: a sentinel outside async
	/// multiple mode is a plain id, and a list in single mode keeps its first
	/// entry. Empty strings are dropped.
	pub fn from_external(value: &ExternalValue, mode: SelectMode, sentinel: &str, excluded: &ExclusionSet) -> Self {
		let raw: Vec<&str> = match value {
			ExternalValue::Absent => Vec::new(),
			ExternalValue::One(id) => vec![id.as_str()],
			ExternalValue::List(ids) => ids.iter().map(String::as_str).collect(),
		};

		if mode.allows_all() && raw.len() == 1 && raw[0] == sentinel {
			return Self::AllExcept(excluded.clone());
		}

		let mut ids = raw.into_iter().filter_map(|id| ItemId::new(id).ok());
		if mode.multiple {
			Self::many(ids)
		} else {
			ids.next().map_or(Self::None, Self::Single)
		}
	}

	/// Converts to the host shape for `mode`.
	///
	/// An empty multi selection is reported as an empty list and an empty
	/// single selection as [`ExternalValue::Absent`].
	pub fn to_external(&self, mode: SelectMode, sentinel: &str) -> ExternalValue {
		match self {
			Self::None if mode.multiple => ExternalValue::List(Vec::new()),
			Self::None => ExternalValue::Absent,
			Self::Single(id) => ExternalValue::One(id.to_string()),
			Self::Many(ids) => ExternalValue::List(ids.iter().map(ItemId::to_string).collect()),
			Self::AllExcept(_) => ExternalValue::One(sentinel.to_string()),
		}
	}
}

/// Host-facing value shape: nothing, one string, or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalValue {
	#[default]
	Absent,
	One(String),
	List(Vec<String>),
}

impl ExternalValue {
	pub fn list<I, S>(ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::List(ids.into_iter().map(Into::into).collect())
	}

	pub fn one(id: impl Into<String>) -> Self {
		Self::One(id.into())
	}
}
