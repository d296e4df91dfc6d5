use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::{IdError, ItemId};

/// A selectable entry: an id plus the label rendered for it.
///
/// Options are immutable. A fresher fetch may supersede one by returning an
/// option with the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
	pub id: ItemId,
	pub label: Arc<str>,
}

impl SelectOption {
	pub fn new(id: ItemId, label: impl Into<Arc<str>>) -> Self {
		Self { id, label: label.into() }
	}

	/// Builds an option from a raw id string.
	pub fn parse(id: &str, label: impl Into<Arc<str>>) -> Result<Self, IdError> {
		Ok(Self::new(ItemId::new(id)?, label))
	}

	/// Case-insensitive substring match on the label, used for local filtering.
	pub fn matches(&self, needle: &str) -> bool {
		let needle = needle.trim();
		needle.is_empty() || self.label.to_lowercase().contains(&needle.to_lowercase())
	}
}
