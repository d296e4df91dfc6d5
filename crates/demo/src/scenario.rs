//! Scripted walkthroughs of a control against the blogger directory.

use std::sync::Arc;

use anyhow::Context;
use picklist_bloggers::{BloggerStore, RowDelete, error_message};
use picklist_select::{
	ChipView, ComboSelect, ExternalValue, ItemId, ScrollMetrics, SelectConfig, SelectDriver, SelectEvent, SelectionRule,
};
use tokio::time::Instant;
use tracing::info;

use crate::cli::Scenario;
use crate::config::DemoConfig;

pub async fn run(scenario: &Scenario, config: &DemoConfig) -> anyhow::Result<()> {
	let store = Arc::new(BloggerStore::seeded(&config.store));
	info!(scenario = ?scenario, rows = store.len(), "scenario.start");
	match scenario {
		Scenario::Local => local(&store, config.select.clone()),
		Scenario::Remote => remote(&store, config.select.clone()).await,
		Scenario::Edit { ids } => edit(&store, config.select.clone(), ids).await,
		Scenario::Single => single(&store, config.select.clone()).await,
		Scenario::Delete { ids } => delete(&store, config.select.clone(), ids).await,
	}
}

fn local(store: &BloggerStore, select: SelectConfig) -> anyhow::Result<()> {
	let config = SelectConfig {
		async_mode: false,
		multiple: true,
		..select
	};
	let mut control = ComboSelect::new(config, ExternalValue::Absent)?;
	control.set_options(store.options().into_iter().take(2).collect());

	step("open and select all");
	control.open();
	control.toggle_all();
	report(&mut control);

	step("search \"bob\"");
	control.type_search("bob", Instant::now());
	report(&mut control);

	step("remove chip 1");
	control.remove_chip(&ItemId::new("1")?);
	report(&mut control);
	Ok(())
}

async fn remote(store: &Arc<BloggerStore>, select: SelectConfig) -> anyhow::Result<()> {
	let mut driver = mount(store, remote_config(select), ExternalValue::Absent)?;

	step("open");
	driver.control_mut().open();
	driver.settle().await;
	report_driver(&mut driver);

	step("scroll to the bottom");
	driver.control_mut().scrolled(ScrollMetrics {
		scroll_top: 400.0,
		scroll_height: 480.0,
		client_height: 300.0,
	});
	driver.settle().await;
	report_driver(&mut driver);

	step("select all, then exclude the first option");
	driver.control_mut().toggle_all();
	if let Some(first) = driver.control().options().first() {
		driver.control_mut().toggle(&first.id);
	}
	report_driver(&mut driver);
	Ok(())
}

async fn edit(store: &Arc<BloggerStore>, select: SelectConfig, ids: &[String]) -> anyhow::Result<()> {
	let mut driver = mount(store, remote_config(select), ExternalValue::list(ids.iter().cloned()))?;

	step("mount with preselected ids");
	driver.settle().await;
	report_driver(&mut driver);
	for chip in driver.control().all_chips() {
		let state = if chip.resolved { "resolved" } else { "unresolved" };
		println!("  chip {} = {} ({state})", chip.id, chip.label);
	}
	Ok(())
}

async fn single(store: &Arc<BloggerStore>, select: SelectConfig) -> anyhow::Result<()> {
	let config = SelectConfig {
		multiple: false,
		..remote_config(select)
	};
	let mut driver = mount(store, config, ExternalValue::one("3"))?;
	driver.settle().await;

	step("open and click the selected option");
	driver.control_mut().open();
	driver.control_mut().toggle(&ItemId::new("3")?);
	report_driver(&mut driver);

	step("click another option");
	driver.control_mut().toggle(&ItemId::new("5")?);
	report_driver(&mut driver);
	Ok(())
}

async fn delete(store: &Arc<BloggerStore>, select: SelectConfig, ids: &[String]) -> anyhow::Result<()> {
	let mut driver = mount(store, remote_config(select), ExternalValue::list(ids.iter().cloned()))?;
	driver.settle().await;
	report_driver(&mut driver);

	if driver.control().validate(SelectionRule::Required).is_err() {
		println!("  nothing to delete");
		return Ok(());
	}

	step("delete selected rows");
	let selected = driver.control().value().ids();
	match store.delete_rows(&selected).await {
		Ok(()) => {
			println!("  deleted {} rows, {} remain", selected.len(), store.len());
			driver.control_mut().clear();
		}
		Err(error) => println!("  error: {}", error_message(&error)),
	}
	report_driver(&mut driver);
	Ok(())
}

fn remote_config(select: SelectConfig) -> SelectConfig {
	SelectConfig {
		async_mode: true,
		..select
	}
}

fn mount(store: &Arc<BloggerStore>, config: SelectConfig, initial: ExternalValue) -> anyhow::Result<SelectDriver> {
	let control = ComboSelect::new(config, initial).context("invalid select config")?;
	Ok(SelectDriver::new(control, store.clone(), store.clone()))
}

fn step(title: &str) {
	println!("== {title}");
}

fn report_driver(driver: &mut SelectDriver) {
	report(driver.control_mut());
}

fn report(control: &mut ComboSelect) {
	for event in control.drain_events() {
		match event {
			SelectEvent::ValueChanged(value) => println!("  onValueChange {value:?}"),
			SelectEvent::ExcludedChanged(ids) => println!("  onExcludedChange {}", join(&ids)),
			SelectEvent::Search(text) => println!("  onSearch {text:?}"),
			SelectEvent::LoadMore => println!("  onLoadMore"),
			SelectEvent::PopoverChanged(open) => println!("  popover {}", if open { "open" } else { "closed" }),
		}
	}

	let rows: Vec<String> = control
		.options()
		.iter()
		.map(|row| format!("{}{}", if row.selected { "*" } else { "" }, row.label))
		.collect();
	println!("  options [{}]", rows.join(", "));

	match control.chips() {
		ChipView::Placeholder => println!("  trigger: placeholder"),
		ChipView::Single(chip) => println!("  trigger: {}", chip.label),
		ChipView::Many { visible, overflow } => {
			let labels: Vec<&str> = visible.iter().map(|chip| &*chip.label).collect();
			let more = if overflow > 0 { format!(" +{overflow}") } else { String::new() };
			println!("  trigger: {}{more}", labels.join(", "));
		}
		ChipView::AllSelected { excluded } => println!("  trigger: all selected ({excluded} excluded)"),
	}

	let status = control.status();
	if let Some(error) = status.error {
		println!("  error: {error}");
	}
	if status.has_more {
		println!("  more pages available");
	}
}

fn join(ids: &[ItemId]) -> String {
	let ids: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
	format!("[{}]", ids.join(", "))
}
