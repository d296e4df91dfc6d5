use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::config::SelectConfig;
use crate::control::ChipView;
use crate::ids::ItemId;
use crate::source::{PageQuery, Pagination};
use crate::value::ExternalValue;

/// In-memory source with a fixed latency per call.
struct FakeSource {
	items: Vec<SelectOption>,
	latency: Duration,
	fail_by_ids: bool,
	page_queries: Mutex<Vec<PageQuery>>,
	by_ids_calls: Mutex<Vec<Vec<ItemId>>>,
	completed: AtomicUsize,
}

impl FakeSource {
	fn new(items: &[(&str, &str)], latency: Duration) -> Self {
		Self {
			items: items.iter().map(|(id, label)| SelectOption::parse(id, *label).unwrap()).collect(),
			latency,
			fail_by_ids: false,
			page_queries: Mutex::new(Vec::new()),
			by_ids_calls: Mutex::new(Vec::new()),
			completed: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl OptionsSource for FakeSource {
	async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse, FetchError> {
		self.page_queries.lock().push(query.clone());
		tokio::time::sleep(self.latency).await;
		self.completed.fetch_add(1, Ordering::SeqCst);

		let matching: Vec<SelectOption> = self.items.iter().filter(|o| o.matches(&query.text)).cloned().collect();
		let per_page = query.per_page as usize;
		let page_count = matching.len().div_ceil(per_page).max(1) as u32;
		let start = (query.page as usize - 1) * per_page;
		Ok(PageResponse {
			items: matching.into_iter().skip(start).take(per_page).collect(),
			pagination: Pagination {
				current_page: query.page,
				page_count,
			},
		})
	}
}

#[async_trait]
impl ByIdsSource for FakeSource {
	async fn fetch_by_ids(&self, ids: &[ItemId]) -> Result<Vec<SelectOption>, FetchError> {
		self.by_ids_calls.lock().push(ids.to_vec());
		tokio::time::sleep(self.latency).await;
		self.completed.fetch_add(1, Ordering::SeqCst);
		if self.fail_by_ids {
			return Err(FetchError::Transport("offline".into()));
		}
		Ok(self.items.iter().filter(|o| ids.contains(&o.id)).cloned().collect())
	}
}

const PEOPLE: &[(&str, &str)] = &[("1", "Ann"), ("2", "Ben"), ("3", "Cid"), ("4", "Dee"), ("5", "Eve")];

fn driver(source: &Arc<FakeSource>, config: SelectConfig, initial: ExternalValue) -> SelectDriver {
	let control = ComboSelect::new(config, initial).unwrap();
	SelectDriver::new(control, source.clone(), source.clone())
}

fn small_pages() -> SelectConfig {
	SelectConfig {
		per_page: 3,
		..SelectConfig::remote()
	}
}

fn visible_ids(driver: &SelectDriver) -> Vec<String> {
	driver.control().options().into_iter().map(|row| row.id.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn mount_loads_first_page_and_resolves_missing_selection() {
	let source = Arc::new(FakeSource::new(PEOPLE, Duration::from_millis(50)));
	let mut driver = driver(&source, small_pages(), ExternalValue::list(["5"]));

	driver.settle().await;

	assert_eq!(visible_ids(&driver), ["1", "2", "3"]);
	assert_eq!(*source.by_ids_calls.lock(), vec![vec![ItemId::new("5").unwrap()]]);
	let ChipView::Many { visible, .. } = driver.control().chips() else {
		panic!("expected chips");
	};
	assert_eq!(&*visible[0].label, "Eve");
	assert_eq!(driver.control().external_value(), ExternalValue::list(["5"]));
}

#[tokio::test(start_paused = true)]
async fn debounced_search_sends_only_the_last_text() {
	let source = Arc::new(FakeSource::new(PEOPLE, Duration::from_millis(10)));
	let mut driver = driver(&source, small_pages(), ExternalValue::Absent);
	driver.settle().await;

	for text in ["e", "ev", "eve"] {
		driver.control_mut().type_search(text, Instant::now());
		tokio::time::sleep(Duration::from_millis(100)).await;
		driver.pump(Instant::now());
	}
	driver.settle().await;

	let texts: Vec<String> = source.page_queries.lock().iter().map(|q| q.text.clone()).collect();
	assert_eq!(texts, ["", "eve"]);
	assert_eq!(visible_ids(&driver), ["5"]);
}

#[tokio::test(start_paused = true)]
async fn newer_search_supersedes_in_flight_results() {
	let source = Arc::new(FakeSource::new(PEOPLE, Duration::from_millis(500)));
	let mut driver = driver(&source, small_pages(), ExternalValue::Absent);
	driver.settle().await;

	driver.control_mut().type_search("a", Instant::now());
	tokio::time::sleep(Duration::from_millis(300)).await;
	assert_eq!(driver.pump(Instant::now()), 1);

	driver.control_mut().type_search("ee", Instant::now());
	tokio::time::sleep(Duration::from_millis(300)).await;
	assert_eq!(driver.pump(Instant::now()), 1);

	driver.settle().await;
	assert_eq!(driver.in_flight(), 0);
	assert_eq!(visible_ids(&driver), ["4"]);
}

#[tokio::test(start_paused = true)]
async fn failed_resolution_is_not_retried() {
	let mut source = FakeSource::new(PEOPLE, Duration::from_millis(5));
	source.fail_by_ids = true;
	let source = Arc::new(source);
	let mut driver = driver(&source, small_pages(), ExternalValue::list(["5"]));

	driver.settle().await;
	driver.control_mut().load_more();
	driver.settle().await;

	assert_eq!(source.by_ids_calls.lock().len(), 1);
	let status = driver.control().status();
	assert_eq!(status.resolve_error, Some(FetchError::Transport("offline".into())));
	let chip = driver.control().all_chips().remove(0);
	assert!(chip.resolved, "page 2 delivered the label");
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_in_flight_fetches() {
	let source = Arc::new(FakeSource::new(PEOPLE, Duration::from_secs(1)));
	let mut driver = driver(&source, small_pages(), ExternalValue::Absent);
	assert_eq!(driver.pump(Instant::now()), 1);
	tokio::task::yield_now().await;
	assert_eq!(source.page_queries.lock().len(), 1);

	driver.unmount();
	tokio::time::sleep(Duration::from_secs(5)).await;

	assert_eq!(source.completed.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn poll_completions_applies_arrived_results_without_waiting() {
	let source = Arc::new(FakeSource::new(PEOPLE, Duration::from_millis(20)));
	let mut driver = driver(&source, small_pages(), ExternalValue::Absent);
	driver.pump(Instant::now());

	assert_eq!(driver.poll_completions(), 0);
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(driver.poll_completions(), 1);
	assert_eq!(visible_ids(&driver), ["1", "2", "3"]);
}
