//! Render models derived from control state.

use std::sync::Arc;

use crate::ids::ItemId;
use crate::source::FetchError;

/// A selected item as shown in the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
	pub id: ItemId,
	pub label: Arc<str>,
	/// False when no label is known and `label` is the raw id.
	pub resolved: bool,
}

/// What the trigger area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChipView {
	/// Nothing selected.
	Placeholder,
	/// Single mode selection.
	Single(Chip),
	/// At most `max_count` chips, plus how many more are summarized.
	Many { visible: Vec<Chip>, overflow: usize },
	/// Everything is selected except `excluded` items.
	AllSelected { excluded: usize },
}

/// One row of the option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
	pub id: ItemId,
	pub label: Arc<str>,
	pub selected: bool,
}

/// Loading and error channel of the option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
	/// A page request is in flight.
	pub loading: bool,
	/// The in-flight request is a follow-up page.
	pub loading_more: bool,
	pub has_more: bool,
	/// Last page fetch failure, shown inline.
	pub error: Option<FetchError>,
	/// A missing-id lookup is in flight.
	pub resolving: bool,
	/// Last missing-id lookup failure.
	pub resolve_error: Option<FetchError>,
}

impl LoadStatus {
	/// Whether to show the blocking spinner instead of the list.
	pub fn shows_spinner(&self, visible_rows: usize) -> bool {
		self.loading && !self.loading_more && visible_rows == 0
	}
}
