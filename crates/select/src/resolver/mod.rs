//! Missing-item resolution.
//!
//! # Purpose
//!
//! * Finds selected ids that have no label: not in the loaded page and not in
//!   the [`OptionCache`]. These typically come from an edit form pre-populated
//!   with ids.
//! * Plans one bulk by-ids fetch for them and folds the answer into the cache.
//!
//! # Invariants
//!
//! * Must not plan a fetch while a search string is active.
//! * Must not plan a fetch while another resolve fetch is in flight.
//! * Must mark every requested id attempted when its fetch completes, whether
//!   it succeeded, failed, or omitted the id. Attempted ids are never
//!   requested again by the same instance.
//! * Must never plan a fetch for an empty id list.
//!
//! # Failure modes & recovery
//!
//! * Fetch failure: stored as `last_error`, ids stay unresolved and chips fall
//!   back to the raw id. There is no automatic retry.
//! * Stale completion (ticket does not match the in-flight one): ignored.

use tracing::{debug, warn};

use crate::cache::OptionCache;
use crate::ids::{IdHashSet, IdSet, ItemId};
use crate::option::SelectOption;
use crate::source::FetchError;

/// Output of [`MissingResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
	pub missing_ids: Vec<ItemId>,
	pub should_fetch: bool,
}

/// Identity of one resolve fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveTicket {
	pub seq: u64,
	pub ids: Vec<ItemId>,
}

/// What a resolve completion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
	/// Options were recorded. `unresolved` lists requested ids the source omitted.
	Resolved { found: usize, unresolved: Vec<ItemId> },
	Failed,
	Stale,
}

/// Tracks which selected ids still need a label.
#[derive(Debug, Default)]
pub struct MissingResolver {
	attempted: IdHashSet,
	pending: IdSet,
	in_flight: Option<u64>,
	next_seq: u64,
	last_error: Option<FetchError>,
}

impl MissingResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Computes which selected ids are missing and whether to fetch them now.
	pub fn resolve(&mut self, selected: &[ItemId], loaded: &IdHashSet, cache: &OptionCache, search_active: bool) -> Resolution {
		self.pending.retain(|id| selected.contains(id) && !cache.contains(id.as_str()));
		if search_active {
			return Resolution::default();
		}

		let missing_ids: Vec<ItemId> = selected
			.iter()
			.filter(|id| !loaded.contains(*id) && !cache.contains(id.as_str()) && !self.attempted.contains(*id))
			.cloned()
			.collect();
		self.pending.extend(missing_ids.iter().cloned());

		let should_fetch = !missing_ids.is_empty() && self.in_flight.is_none();
		Resolution { missing_ids, should_fetch }
	}

	/// Starts a resolve fetch for `ids`.
	pub fn begin(&mut self, ids: Vec<ItemId>) -> ResolveTicket {
		self.next_seq += 1;
		let seq = self.next_seq;
		self.in_flight = Some(seq);
		debug!(seq, count = ids.len(), "resolver.begin");
		ResolveTicket { seq, ids }
	}

	/// Applies a resolve fetch result, recording found options into `cache`.
	pub fn complete(&mut self, ticket: &ResolveTicket, result: Result<Vec<SelectOption>, FetchError>, cache: &mut OptionCache) -> ResolveOutcome {
		if self.in_flight != Some(ticket.seq) {
			debug!(seq = ticket.seq, "resolver.stale");
			return ResolveOutcome::Stale;
		}
		self.in_flight = None;
		for id in &ticket.ids {
			self.attempted.insert(id.clone());
			self.pending.shift_remove(id.as_str());
		}

		match result {
			Ok(options) => {
				self.last_error = None;
				let found = cache.record(&options);
				let unresolved: Vec<ItemId> = ticket.ids.iter().filter(|id| !cache.contains(id.as_str())).cloned().collect();
				debug!(seq = ticket.seq, found, unresolved = unresolved.len(), "resolver.complete");
				ResolveOutcome::Resolved { found, unresolved }
			}
			Err(error) => {
				warn!(seq = ticket.seq, %error, "resolver.failed");
				self.last_error = Some(error);
				ResolveOutcome::Failed
			}
		}
	}

	/// Drops ids that a regular page fetch just delivered from the pending set.
	pub fn note_loaded<'a>(&mut self, ids: impl IntoIterator<Item = &'a ItemId>) {
		for id in ids {
			self.pending.shift_remove(id.as_str());
		}
	}

	/// Selected ids still waiting for a label.
	pub fn pending(&self) -> &IdSet {
		&self.pending
	}

	pub fn is_in_flight(&self) -> bool {
		self.in_flight.is_some()
	}

	pub fn was_attempted(&self, id: &str) -> bool {
		self.attempted.contains(id)
	}

	pub fn last_error(&self) -> Option<&FetchError> {
		self.last_error.as_ref()
	}
}
