//! Pagination and search bridge for remote option lists.
//!
//! # Purpose
//!
//! * Turns search keystrokes into debounced page-1 queries.
//! * Turns scroll and layout signals into next-page requests.
//! * Holds the visible option list of the current query.
//!
//! # Mental model
//!
//! * The bridge is a generation-scoped request planner. Committing a new
//!   search bumps the generation, empties the visible list and plans page 1.
//! * Every planned request carries a [`PageTicket`]. Responses are applied
//!   only when their ticket is the one in flight; anything older is stale.
//! * Time is injected: callers pass `now` to [`PageBridge::search`] and
//!   [`PageBridge::poll`], so debounce behaviour is deterministic.
//!
//! # Invariants
//!
//! * Must keep at most one page request in flight.
//! * Must discard responses whose generation is not current.
//! * Must plan `load_more` only when more pages remain and nothing is in flight.
//! * Must keep the order of already visible options when appending a page.
//! * Must keep the visible list on fetch failure.
//!
//! # Data flow
//!
//! 1. `search(text, now)` records the latest text and its input time.
//! 2. `poll(now)` commits it once the debounce has elapsed and returns the
//!    page-1 request.
//! 3. The host runs the request and feeds the result to `apply`.
//! 4. `on_scroll`/`after_layout`/`load_more` plan follow-up pages.

use std::ops::Range;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::ids::IdHashSet;
use crate::option::SelectOption;
use crate::source::{FetchError, PageQuery, PageResponse};

/// Default quiet period before a search is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default distance from the list bottom, in pixels, that triggers a page load.
pub const LOAD_MORE_THRESHOLD_PX: f32 = 100.0;

/// Identity of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
	pub generation: u64,
	pub query: String,
	pub page: u32,
}

/// A page fetch the host should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
	pub ticket: PageTicket,
	pub query: PageQuery,
}

/// Scroll geometry of the option list viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
	pub scroll_top: f32,
	pub scroll_height: f32,
	pub client_height: f32,
}

impl ScrollMetrics {
	pub fn remaining(&self) -> f32 {
		self.scroll_height - self.scroll_top - self.client_height
	}

	/// Whether the content fits without a scrollbar.
	pub fn fits(&self) -> bool {
		self.scroll_height <= self.client_height
	}
}

/// Result of [`PageBridge::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageApply {
	/// Options in `appended` of the visible list are new.
	Applied { appended: Range<usize> },
	Failed,
	Stale,
}

#[derive(Debug, Clone)]
struct PendingSearch {
	text: String,
	last_input_at: Instant,
}

/// Request planner and visible list for a remote option source.
#[derive(Debug)]
pub struct PageBridge {
	per_page: u32,
	debounce: Duration,
	threshold_px: f32,
	generation: u64,
	query: String,
	pending: Option<PendingSearch>,
	visible: Vec<SelectOption>,
	loaded: IdHashSet,
	current_page: u32,
	page_count: u32,
	in_flight: Option<PageTicket>,
	error: Option<FetchError>,
}

impl PageBridge {
	pub fn new(per_page: u32, debounce: Duration, threshold_px: f32) -> Self {
		Self {
			per_page: per_page.max(1),
			debounce,
			threshold_px,
			generation: 0,
			query: String::new(),
			pending: None,
			visible: Vec::new(),
			loaded: IdHashSet::default(),
			current_page: 0,
			page_count: 0,
			in_flight: None,
			error: None,
		}
	}

	/// Plans the first page of the current query if nothing is loaded yet.
	pub fn start(&mut self) -> Option<PageRequest> {
		if self.current_page > 0 || self.in_flight.is_some() {
			return None;
		}
		Some(self.plan(1))
	}

	/// Re-plans page 1 after the first page of the committed query failed.
	/// A pending search takes precedence and commits on its own.
	pub fn retry(&mut self) -> Option<PageRequest> {
		if self.error.is_none() || self.has_loaded() || self.in_flight.is_some() || self.pending.is_some() {
			return None;
		}
		debug!(generation = self.generation, query = %self.query, "bridge.retry");
		self.error = None;
		Some(self.plan(1))
	}

	/// Records search input. The query is committed by a later [`poll`](Self::poll).
	pub fn search(&mut self, text: &str, now: Instant) {
		if text == self.query {
			if self.pending.take().is_some() {
				trace!(query = text, "bridge.search.reverted");
			}
			return;
		}
		self.pending = Some(PendingSearch {
			text: text.to_string(),
			last_input_at: now,
		});
	}

	/// When the pending search becomes due, if any.
	pub fn search_deadline(&self) -> Option<Instant> {
		self.pending.as_ref().map(|p| p.last_input_at + self.debounce)
	}

	/// Commits a due search, superseding the old query and its in-flight page.
	pub fn poll(&mut self, now: Instant) -> Option<PageRequest> {
		let due = self.search_deadline().is_some_and(|deadline| now >= deadline);
		if !due {
			return None;
		}
		let pending = self.pending.take()?;
		Some(self.commit(pending.text))
	}

	/// Commits `text` immediately, bypassing the debounce.
	pub fn commit_now(&mut self, text: &str) -> Option<PageRequest> {
		self.pending = None;
		if text == self.query && (self.current_page > 0 || self.in_flight.is_some()) {
			return None;
		}
		Some(self.commit(text.to_string()))
	}

	/// Plans the next page, unless none remain or a fetch is in flight.
	pub fn load_more(&mut self) -> Option<PageRequest> {
		if !self.has_more() {
			return None;
		}
		if let Some(in_flight) = &self.in_flight {
			trace!(page = in_flight.page, "bridge.load_more.in_flight");
			return None;
		}
		Some(self.plan(self.current_page + 1))
	}

	/// Loads more when the viewport is within the threshold of the bottom.
	pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PageRequest> {
		if metrics.remaining() < self.threshold_px { self.load_more() } else { None }
	}

	/// Loads more when the rendered list does not fill its viewport.
	pub fn after_layout(&mut self, metrics: ScrollMetrics) -> Option<PageRequest> {
		if metrics.fits() { self.load_more() } else { None }
	}

	/// Applies a page response for `ticket`.
	pub fn apply(&mut self, ticket: &PageTicket, result: Result<PageResponse, FetchError>) -> PageApply {
		if self.in_flight.as_ref() != Some(ticket) {
			debug!(
				generation = ticket.generation,
				current = self.generation,
				page = ticket.page,
				query = %ticket.query,
				"bridge.apply.stale"
			);
			return PageApply::Stale;
		}
		self.in_flight = None;

		match result {
			Ok(response) => {
				self.error = None;
				let start = self.visible.len();
				for option in response.items {
					if self.loaded.insert(option.id.clone()) {
						self.visible.push(option);
					}
				}
				self.current_page = response.pagination.current_page.max(ticket.page);
				self.page_count = response.pagination.page_count;
				debug!(
					generation = ticket.generation,
					page = self.current_page,
					page_count = self.page_count,
					appended = self.visible.len() - start,
					"bridge.apply"
				);
				PageApply::Applied {
					appended: start..self.visible.len(),
				}
			}
			Err(error) => {
				warn!(generation = ticket.generation, page = ticket.page, %error, "bridge.apply.failed");
				self.error = Some(error);
				PageApply::Failed
			}
		}
	}

	pub fn visible(&self) -> &[SelectOption] {
		&self.visible
	}

	pub fn loaded_ids(&self) -> &IdHashSet {
		&self.loaded
	}

	/// Committed query text.
	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn has_more(&self) -> bool {
		self.current_page < self.page_count
	}

	/// Whether at least one page of the current query has arrived.
	pub fn has_loaded(&self) -> bool {
		self.current_page > 0
	}

	pub fn is_loading(&self) -> bool {
		self.in_flight.is_some()
	}

	pub fn is_loading_more(&self) -> bool {
		self.in_flight.as_ref().is_some_and(|t| t.page > 1)
	}

	pub fn error(&self) -> Option<&FetchError> {
		self.error.as_ref()
	}

	fn commit(&mut self, text: String) -> PageRequest {
		self.generation += 1;
		debug!(generation = self.generation, query = %text, "bridge.search.commit");
		self.query = text;
		self.visible.clear();
		self.loaded.clear();
		self.current_page = 0;
		self.page_count = 0;
		self.error = None;
		self.in_flight = None;
		self.plan(1)
	}

	fn plan(&mut self, page: u32) -> PageRequest {
		let ticket = PageTicket {
			generation: self.generation,
			query: self.query.clone(),
			page,
		};
		trace!(generation = ticket.generation, page, "bridge.plan");
		self.in_flight = Some(ticket.clone());
		PageRequest {
			ticket,
			query: PageQuery {
				text: self.query.clone(),
				page,
				per_page: self.per_page,
			},
		}
	}
}
