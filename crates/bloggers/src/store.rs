//! In-memory blogger table serving paged search, id lookup and deletion.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use picklist_select::{ByIdsSource, FetchError, ItemId, OptionsSource, PageQuery, PageResponse, Pagination, SelectOption};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ErrorCode};
use crate::model::{Blogger, SocialLink};

const FIRST_NAMES: &[&str] = &[
	"Alice", "Bob", "Carla", "Dmitri", "Elena", "Farid", "Greta", "Hiro", "Ines", "Jonas", "Kemal", "Lena", "Marco", "Nadia", "Omar",
	"Priya", "Quinn", "Rosa", "Sven", "Tara",
];

const TOPICS: &[&str] = &["street food", "fine dining", "coffee", "baking", "vegan kitchens", "wine bars"];

/// Removes rows by id.
#[async_trait]
pub trait RowDelete: Send + Sync {
	/// Deletes every id or none of them.
	async fn delete_rows(&self, ids: &[ItemId]) -> Result<(), ApiError>;
}

/// Seeding and behaviour of a [`BloggerStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
	/// Number of seeded rows.
	#[serde(default = "default_rows")]
	pub rows: usize,
	/// Artificial delay before every fetch answers, in milliseconds.
	#[serde(default)]
	pub latency_ms: u64,
}

fn default_rows() -> usize {
	40
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			rows: default_rows(),
			latency_ms: 0,
		}
	}
}

/// Shared in-memory blogger table.
#[derive(Debug, Default)]
pub struct BloggerStore {
	rows: RwLock<Vec<Blogger>>,
	latency: Duration,
	fail_next_page: AtomicBool,
	fail_next_by_ids: AtomicBool,
	page_calls: AtomicUsize,
	by_ids_calls: AtomicUsize,
}

impl BloggerStore {
	/// Builds a deterministic table of `config.rows` bloggers with ids `1..=rows`.
	pub fn seeded(config: &StoreConfig) -> Self {
		let rows = (0..config.rows).filter_map(seed_row).collect();
		Self::from_rows(rows).with_latency(Duration::from_millis(config.latency_ms))
	}

	pub fn from_rows(rows: Vec<Blogger>) -> Self {
		Self {
			rows: RwLock::new(rows),
			..Self::default()
		}
	}

	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}

	pub fn len(&self) -> usize {
		self.rows.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.read().is_empty()
	}

	/// Every row as a picker option, in table order.
	pub fn options(&self) -> Vec<SelectOption> {
		self.rows.read().iter().map(Blogger::to_option).collect()
	}

	pub fn get(&self, id: &str) -> Option<Blogger> {
		self.rows.read().iter().find(|b| b.id.as_str() == id).cloned()
	}

	/// Makes the next page fetch fail once.
	pub fn fail_next_page(&self) {
		self.fail_next_page.store(true, Ordering::SeqCst);
	}

	/// Makes the next by-ids fetch fail once.
	pub fn fail_next_by_ids(&self) {
		self.fail_next_by_ids.store(true, Ordering::SeqCst);
	}

	/// Page fetches served so far, failed ones included.
	pub fn page_calls(&self) -> usize {
		self.page_calls.load(Ordering::SeqCst)
	}

	/// By-ids fetches that reached the table.
	pub fn by_ids_calls(&self) -> usize {
		self.by_ids_calls.load(Ordering::SeqCst)
	}

	async fn delay(&self) {
		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}
	}
}

fn seed_row(index: usize) -> Option<Blogger> {
	let first = FIRST_NAMES[index % FIRST_NAMES.len()];
	let round = index / FIRST_NAMES.len();
	let name = if round == 0 { first.to_string() } else { format!("{first} {}", round + 1) };
	let topic = TOPICS[index % TOPICS.len()];
	let id = ItemId::new((index + 1).to_string()).ok()?;
	Some(Blogger {
		bio: format!("{name} writes about {topic}."),
		created_at: format!("2024-{:02}-{:02}", index % 12 + 1, index % 28 + 1),
		social_links: vec![SocialLink {
			platform: "instagram".to_string(),
			url: format!("https://instagram.com/{}", name.to_lowercase().replace(' ', "_")),
		}],
		image: None,
		name,
		id,
	})
}

#[async_trait]
impl OptionsSource for BloggerStore {
	async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse, FetchError> {
		self.page_calls.fetch_add(1, Ordering::SeqCst);
		self.delay().await;
		if self.fail_next_page.swap(false, Ordering::SeqCst) {
			warn!(page = query.page, "bloggers.fetch_page.injected_failure");
			return Err(ApiError::with_message("Failed to fetch bloggers").into());
		}

		let per_page = query.per_page.max(1) as usize;
		let (items, total) = {
			let rows = self.rows.read();
			let matching: Vec<&Blogger> = rows.iter().filter(|b| b.name_matches(&query.text)).collect();
			let start = (query.page.max(1) as usize - 1) * per_page;
			let items: Vec<SelectOption> = matching.iter().skip(start).take(per_page).map(|b| b.to_option()).collect();
			(items, matching.len())
		};
		let page_count = total.div_ceil(per_page).max(1) as u32;
		debug!(query = %query.text, page = query.page, total, returned = items.len(), "bloggers.fetch_page");

		Ok(PageResponse {
			items,
			pagination: Pagination {
				current_page: query.page,
				page_count,
			},
		})
	}
}

#[async_trait]
impl ByIdsSource for BloggerStore {
	async fn fetch_by_ids(&self, ids: &[ItemId]) -> Result<Vec<SelectOption>, FetchError> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		self.by_ids_calls.fetch_add(1, Ordering::SeqCst);
		self.delay().await;
		if self.fail_next_by_ids.swap(false, Ordering::SeqCst) {
			warn!(count = ids.len(), "bloggers.fetch_by_ids.injected_failure");
			return Err(FetchError::Transport("connection reset".into()));
		}

		let rows = self.rows.read();
		let found: Vec<SelectOption> = ids
			.iter()
			.filter_map(|id| rows.iter().find(|b| &b.id == id))
			.map(Blogger::to_option)
			.collect();
		debug!(requested = ids.len(), found = found.len(), "bloggers.fetch_by_ids");
		Ok(found)
	}
}

#[async_trait]
impl RowDelete for BloggerStore {
	async fn delete_rows(&self, ids: &[ItemId]) -> Result<(), ApiError> {
		self.delay().await;
		let mut rows = self.rows.write();
		if let Some(unknown) = ids.iter().find(|id| !rows.iter().any(|b| &b.id == *id)) {
			warn!(id = %unknown, "bloggers.delete.unknown");
			return Err(ApiError::new(ErrorCode::BloggerNotFound));
		}
		rows.retain(|b| !ids.contains(&b.id));
		debug!(deleted = ids.len(), remaining = rows.len(), "bloggers.delete");
		Ok(())
	}
}
