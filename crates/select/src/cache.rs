use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ids::ItemId;
use crate::option::SelectOption;

/// Labels of every option a control has seen.
///
/// Append-only for the lifetime of one control instance. It is what keeps chip
/// labels stable after the option that produced them has scrolled out of the
/// current search or page.
#[derive(Debug, Clone, Default)]
pub struct OptionCache {
	entries: FxHashMap<ItemId, SelectOption>,
}

/// Label to render for a selected id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipLabel {
	pub text: Arc<str>,
	/// False when the id is unknown and `text` is the raw id.
	pub resolved: bool,
}

impl OptionCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Merges fetched options. A repeated id takes the newer label.
	///
	/// Returns how many ids were not cached before.
	pub fn record<'a>(&mut self, options: impl IntoIterator<Item = &'a SelectOption>) -> usize {
		let mut added = 0;
		for option in options {
			if self.entries.insert(option.id.clone(), option.clone()).is_none() {
				added += 1;
			}
		}
		added
	}

	pub fn get(&self, id: &str) -> Option<&SelectOption> {
		self.entries.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.contains_key(id)
	}

	/// Cached label for `id`, falling back to the raw id.
	pub fn label_for(&self, id: &ItemId) -> ChipLabel {
		match self.entries.get(id.as_str()) {
			Some(option) => ChipLabel {
				text: option.label.clone(),
				resolved: true,
			},
			None => ChipLabel {
				text: Arc::from(id.as_str()),
				resolved: false,
			},
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
