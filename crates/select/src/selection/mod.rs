//! Selection state machine.
//!
//! # Purpose
//!
//! * Owns the normalized [`SelectionValue`] of one control.
//! * Applies user intents (toggle, select-all, clear, backspace) and
//!   parent-pushed values.
//! * Reports which host callbacks each mutation requires through
//!   [`Transition`].
//!
//! # Invariants
//!
//! * Must never hold `AllExcept` unless the mode is async and multiple.
//! * Must never hold `Single` in multiple mode nor `Many` in single mode.
//! * Must never materialize `AllExcept` into an explicit id list.
//! * Must keep insertion order for ids that survive a toggle.
//!
//! # Data flow
//!
//! 1. The control forwards a user intent here.
//! 2. The state computes the next value and a [`Transition`].
//! 3. The control converts the value at the boundary and emits callbacks.

mod select_all;

pub use select_all::{SelectAllState, SelectAllStrategy, UniversalSelectAll, VisiblePageSelectAll};

use crate::exclusion::ExclusionSet;
use crate::ids::{IdSet, ItemId};
use crate::value::{SelectMode, SelectionValue};

/// Host-visible effects of a selection mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
	/// The value callback must fire.
	pub value_changed: bool,
	/// The excluded-list callback must fire.
	pub excluded_changed: bool,
	/// The popover should close (single mode selection).
	pub close_popover: bool,
}

impl Transition {
	pub(crate) const fn value() -> Self {
		Self {
			value_changed: true,
			excluded_changed: false,
			close_popover: false,
		}
	}

	pub(crate) const fn excluded() -> Self {
		Self {
			value_changed: false,
			excluded_changed: true,
			close_popover: false,
		}
	}

	pub(crate) const fn value_and_excluded() -> Self {
		Self {
			value_changed: true,
			excluded_changed: true,
			close_popover: false,
		}
	}

	pub fn is_noop(&self) -> bool {
		!self.value_changed && !self.excluded_changed && !self.close_popover
	}
}

/// Normalized selection of a single control instance.
#[derive(Debug, Clone)]
pub struct SelectionState {
	mode: SelectMode,
	value: SelectionValue,
}

impl SelectionState {
	pub fn new(mode: SelectMode) -> Self {
		Self {
			mode,
			value: SelectionValue::None,
		}
	}

	pub fn with_value(mode: SelectMode, value: SelectionValue) -> Self {
		let mut state = Self::new(mode);
		state.set_external(value);
		state
	}

	pub fn mode(&self) -> SelectMode {
		self.mode
	}

	pub fn current(&self) -> &SelectionValue {
		&self.value
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.value.contains(id)
	}

	/// Toggles one id according to the current mode.
	pub fn toggle(&mut self, id: &ItemId) -> Transition {
		if let SelectionValue::AllExcept(excluded) = &mut self.value {
			excluded.toggle(id);
			return Transition::excluded();
		}

		if !self.mode.multiple {
			if matches!(&self.value, SelectionValue::Single(current) if current == id) {
				self.value = SelectionValue::None;
				return Transition::value();
			}
			self.value = SelectionValue::Single(id.clone());
			return Transition {
				close_popover: true,
				..Transition::value()
			};
		}

		let mut ids: IdSet = self.value.ids().into_iter().collect();
		if !ids.shift_remove(id.as_str()) {
			ids.insert(id.clone());
		}
		self.value = SelectionValue::many(ids);
		Transition::value()
	}

	/// Runs the select-all algorithm for this mode over `visible`.
	///
	/// Single-select controls have no select-all row; this is a no-op there.
	pub fn select_all(&mut self, visible: &[ItemId]) -> Transition {
		if !self.mode.multiple {
			return Transition::default();
		}
		let (value, transition) = self.strategy().apply(&self.value, visible);
		self.value = value;
		transition
	}

	pub fn select_all_state(&self, visible: &[ItemId]) -> SelectAllState {
		self.strategy().state(&self.value, visible)
	}

	/// Empties the selection and the exclusion set.
	pub fn clear(&mut self) -> Transition {
		self.value = SelectionValue::None;
		Transition {
			excluded_changed: self.mode.async_mode,
			..Transition::value()
		}
	}

	/// Removes the most recently added id, as backspace in an empty search
	/// box does. Leaving all-mode this way clears everything.
	pub fn pop_last(&mut self) -> Transition {
		if !self.mode.multiple {
			return Transition::default();
		}
		match &mut self.value {
			SelectionValue::None | SelectionValue::Single(_) => Transition::default(),
			SelectionValue::AllExcept(_) => {
				self.value = SelectionValue::None;
				Transition::value_and_excluded()
			}
			SelectionValue::Many(ids) => {
				ids.pop();
				if ids.is_empty() {
					self.value = SelectionValue::None;
				}
				Transition::value()
			}
		}
	}

	/// Replaces the value with one pushed by the owning parent.
	///
	/// Values the mode cannot hold are coerced rather than rejected.
	pub fn set_external(&mut self, value: SelectionValue) {
		self.value = match value {
			SelectionValue::AllExcept(_) if !self.mode.allows_all() => SelectionValue::None,
			SelectionValue::Single(id) if self.mode.multiple => SelectionValue::many([id]),
			SelectionValue::Many(ids) if !self.mode.multiple => {
				ids.into_iter().next().map_or(SelectionValue::None, SelectionValue::Single)
			}
			SelectionValue::Many(ids) => SelectionValue::many(ids),
			other => other,
		};
	}

	/// Replaces the exclusion set while in all-mode. Ignored otherwise.
	pub fn set_excluded(&mut self, excluded: ExclusionSet) {
		if let SelectionValue::AllExcept(current) = &mut self.value {
			*current = excluded;
		}
	}

	fn strategy(&self) -> &'static dyn SelectAllStrategy {
		if self.mode.async_mode { &UniversalSelectAll } else { &VisiblePageSelectAll }
	}
}
