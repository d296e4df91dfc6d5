use crate::ids::{IdSet, ItemId};

/// Ids carved out of an "everything is selected" selection.
///
/// Kept in the order the user excluded them, which is also the order the
/// excluded list is reported to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
	ids: IdSet,
}

impl ExclusionSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
		Self { ids: ids.into_iter().collect() }
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	/// Flips membership of `id`. Returns true when the id is now excluded.
	pub fn toggle(&mut self, id: &ItemId) -> bool {
		if self.ids.shift_remove(id.as_str()) {
			false
		} else {
			self.ids.insert(id.clone());
			true
		}
	}

	pub fn clear(&mut self) {
		self.ids.clear();
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
		self.ids.iter()
	}

	pub fn to_vec(&self) -> Vec<ItemId> {
		self.ids.iter().cloned().collect()
	}
}
