//! The two select-all algorithms.
//!
//! Local controls select the page the user can see. Async controls cannot
//! enumerate the remote universe, so they switch to a sentinel that means
//! "everything", with an exclusion set for carve-outs. The two never share a
//! code path.

use tracing::trace;

use super::Transition;
use crate::exclusion::ExclusionSet;
use crate::ids::{IdSet, ItemId};
use crate::value::SelectionValue;

/// Tri-state of the select-all checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
	Empty,
	Checked,
	Indeterminate,
}

/// A select-all algorithm.
pub trait SelectAllStrategy {
	/// Computes the value after the select-all row is activated.
	fn apply(&self, value: &SelectionValue, visible: &[ItemId]) -> (SelectionValue, Transition);

	/// Checkbox state shown on the select-all row.
	fn state(&self, value: &SelectionValue, visible: &[ItemId]) -> SelectAllState;
}

/// Non-async select-all: operates on exactly the visible ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisiblePageSelectAll;

/// Async select-all: toggles the universal "all except" selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalSelectAll;

impl SelectAllStrategy for VisiblePageSelectAll {
	fn apply(&self, value: &SelectionValue, visible: &[ItemId]) -> (SelectionValue, Transition) {
		if visible.is_empty() {
			return (value.clone(), Transition::default());
		}

		let mut ids: IdSet = value.ids().into_iter().collect();
		let all_visible_selected = visible.iter().all(|id| ids.contains(id.as_str()));

		if all_visible_selected {
			ids.retain(|id| !visible.contains(id));
			trace!(removed = visible.len(), kept = ids.len(), "select_all.visible.deselect");
		} else {
			ids.extend(visible.iter().cloned());
			trace!(total = ids.len(), "select_all.visible.select");
		}

		(SelectionValue::many(ids), Transition::value())
	}

	fn state(&self, value: &SelectionValue, visible: &[ItemId]) -> SelectAllState {
		count_state(value, visible)
	}
}

impl SelectAllStrategy for UniversalSelectAll {
	fn apply(&self, value: &SelectionValue, _visible: &[ItemId]) -> (SelectionValue, Transition) {
		match value {
			SelectionValue::AllExcept(excluded) if !excluded.is_empty() => {
				trace!(restored = excluded.len(), "select_all.universal.reinclude");
				(SelectionValue::AllExcept(ExclusionSet::new()), Transition::excluded())
			}
			SelectionValue::AllExcept(_) => {
				trace!("select_all.universal.clear");
				(SelectionValue::None, Transition::value_and_excluded())
			}
			_ => {
				trace!("select_all.universal.enter");
				(SelectionValue::AllExcept(ExclusionSet::new()), Transition::value_and_excluded())
			}
		}
	}

	fn state(&self, value: &SelectionValue, visible: &[ItemId]) -> SelectAllState {
		match value {
			SelectionValue::AllExcept(excluded) if excluded.is_empty() => SelectAllState::Checked,
			SelectionValue::AllExcept(_) => SelectAllState::Indeterminate,
			_ => count_state(value, visible),
		}
	}
}

fn count_state(value: &SelectionValue, visible: &[ItemId]) -> SelectAllState {
	let selected = visible.iter().filter(|id| value.contains(id.as_str())).count();
	if selected == 0 {
		SelectAllState::Empty
	} else if selected == visible.len() {
		SelectAllState::Checked
	} else {
		SelectAllState::Indeterminate
	}
}
