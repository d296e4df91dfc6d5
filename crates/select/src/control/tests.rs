use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::source::Pagination;

fn id(raw: &str) -> ItemId {
	ItemId::new(raw).unwrap()
}

fn opt(raw: &str, label: &str) -> SelectOption {
	SelectOption::parse(raw, label).unwrap()
}

fn page(items: &[(&str, &str)], current_page: u32, page_count: u32) -> PageResponse {
	PageResponse {
		items: items.iter().map(|(raw, label)| opt(raw, label)).collect(),
		pagination: Pagination { current_page, page_count },
	}
}

fn local(config: SelectConfig, initial: ExternalValue, options: &[(&str, &str)]) -> ComboSelect {
	let mut control = ComboSelect::new(config, initial).unwrap();
	control.set_options(options.iter().map(|(raw, label)| opt(raw, label)).collect());
	control
}

fn page_requests(effects: &[Effect]) -> Vec<&PageRequest> {
	effects
		.iter()
		.filter_map(|effect| match effect {
			Effect::FetchPage(request) => Some(request),
			Effect::FetchByIds(_) => None,
		})
		.collect()
}

fn resolve_tickets(effects: &[Effect]) -> Vec<&ResolveTicket> {
	effects
		.iter()
		.filter_map(|effect| match effect {
			Effect::FetchByIds(ticket) => Some(ticket),
			Effect::FetchPage(_) => None,
		})
		.collect()
}

/// Mounts a remote control and delivers its first page.
fn remote_with_page(initial: ExternalValue, items: &[(&str, &str)], page_count: u32) -> ComboSelect {
	let mut control = ComboSelect::new(SelectConfig::remote(), initial).unwrap();
	let effects = control.drain_effects();
	let first = page_requests(&effects)[0].clone();
	control.apply_page(&first.ticket, Ok(page(items, 1, page_count)));
	control
}

#[test]
fn select_all_then_search_then_remove_chip_keeps_remaining_id() {
	let mut control = local(SelectConfig::default(), ExternalValue::Absent, &[("1", "Alice"), ("2", "Bob")]);
	control.open();

	control.toggle_all();
	assert_eq!(control.external_value(), ExternalValue::list(["1", "2"]));

	control.type_search("Bob", Instant::now());
	let visible: Vec<_> = control.options().into_iter().map(|row| row.id).collect();
	assert_eq!(visible, vec![id("2")]);

	control.remove_chip(&id("1"));
	assert_eq!(control.external_value(), ExternalValue::list(["2"]));
	assert_eq!(
		control.drain_events().last(),
		Some(&SelectEvent::ValueChanged(ExternalValue::list(["2"])))
	);
}

#[test]
fn selected_id_outside_first_page_is_resolved_with_one_bulk_fetch() {
	let mut control = remote_with_page(ExternalValue::list(["5"]), &[("1", "Ann"), ("2", "Ben"), ("3", "Cid")], 1);

	let effects = control.drain_effects();
	let tickets = resolve_tickets(&effects);
	assert_eq!(tickets.len(), 1);
	assert_eq!(tickets[0].ids, vec![id("5")]);

	let outcome = control.apply_resolved(tickets[0], Ok(vec![opt("5", "Eve")]));
	assert_eq!(
		outcome,
		ResolveOutcome::Resolved {
			found: 1,
			unresolved: vec![]
		}
	);
	assert!(control.cache().contains("5"));
	assert_eq!(control.external_value(), ExternalValue::list(["5"]));

	control.tick(Instant::now());
	assert!(control.drain_effects().is_empty(), "no second fetch");
	assert!(control.drain_events().is_empty(), "resolution emits no callbacks");
}

#[test]
fn single_mode_reselect_clears_and_other_option_closes_popover() {
	let options = [("1", "One"), ("2", "Two"), ("3", "Three")];
	let mut control = local(SelectConfig::single(), ExternalValue::one("3"), &options);
	control.open();
	control.drain_events();

	control.toggle(&id("3"));
	assert_eq!(control.value(), &SelectionValue::None);
	assert_eq!(control.drain_events(), vec![SelectEvent::ValueChanged(ExternalValue::Absent)]);
	assert!(control.is_open());

	control.toggle(&id("2"));
	assert_eq!(
		control.drain_events(),
		vec![
			SelectEvent::ValueChanged(ExternalValue::one("2")),
			SelectEvent::PopoverChanged(false),
		]
	);
	assert!(!control.is_open());
}

#[test]
fn universal_select_all_tracks_exclusions() {
	let mut control = remote_with_page(ExternalValue::Absent, &[("1", "Ann"), ("2", "Ben")], 3);

	control.toggle_all();
	assert_eq!(
		control.drain_events(),
		vec![
			SelectEvent::ValueChanged(ExternalValue::one("__ALL__")),
			SelectEvent::ExcludedChanged(vec![]),
		]
	);

	control.toggle(&id("2"));
	assert_eq!(control.drain_events(), vec![SelectEvent::ExcludedChanged(vec![id("2")])]);
	assert_eq!(control.chips(), ChipView::AllSelected { excluded: 1 });
	assert_eq!(control.select_all_row(), Some(SelectAllState::Indeterminate));

	control.toggle_all();
	assert_eq!(control.drain_events(), vec![SelectEvent::ExcludedChanged(vec![])]);
	assert_eq!(control.select_all_row(), Some(SelectAllState::Checked));

	control.toggle_all();
	assert_eq!(
		control.drain_events(),
		vec![
			SelectEvent::ValueChanged(ExternalValue::List(vec![])),
			SelectEvent::ExcludedChanged(vec![]),
		]
	);
}

#[test]
fn select_all_row_is_hidden_while_searching_remotely() {
	let mut control = remote_with_page(ExternalValue::Absent, &[("1", "Ann")], 1);
	assert!(control.select_all_row().is_some());

	control.type_search("an", Instant::now());
	assert_eq!(control.select_all_row(), None);
	control.toggle_all();
	assert!(!control.value().is_all());
}

#[test]
fn select_all_row_is_hidden_by_flag_and_in_single_mode() {
	let hidden = SelectConfig {
		hide_select_all: true,
		..SelectConfig::default()
	};
	assert_eq!(local(hidden, ExternalValue::Absent, &[("1", "A")]).select_all_row(), None);
	assert_eq!(local(SelectConfig::single(), ExternalValue::Absent, &[("1", "A")]).select_all_row(), None);
	assert_eq!(local(SelectConfig::default(), ExternalValue::Absent, &[]).select_all_row(), None);
}

#[test]
fn resolver_waits_for_search_to_be_cleared() {
	let mut control = ComboSelect::new(SelectConfig::remote(), ExternalValue::list(["5"])).unwrap();
	let effects = control.drain_effects();
	let first = page_requests(&effects)[0].clone();
	let t0 = Instant::now();

	control.type_search("b", t0);
	control.apply_page(&first.ticket, Ok(page(&[("1", "Ann")], 1, 1)));
	assert!(control.drain_effects().is_empty());
	assert!(control.resolver().pending().is_empty());

	control.type_search("", t0);
	control.tick(t0);
	let effects = control.drain_effects();
	assert_eq!(resolve_tickets(&effects).len(), 1);
}

#[test]
fn toggled_option_label_survives_a_new_search() {
	let mut control = remote_with_page(ExternalValue::Absent, &[("1", "Ann"), ("2", "Ben")], 1);
	control.toggle(&id("1"));

	let t0 = Instant::now();
	control.type_search("zz", t0);
	assert_eq!(control.next_deadline(), Some(t0 + Duration::from_millis(300)));
	control.tick(t0 + Duration::from_millis(300));
	let effects = control.drain_effects();
	let search = page_requests(&effects)[0].clone();
	assert_eq!(search.query.text, "zz");
	control.apply_page(&search.ticket, Ok(page(&[], 1, 1)));

	assert!(control.options().is_empty());
	match control.chips() {
		ChipView::Many { visible, overflow } => {
			assert_eq!(overflow, 0);
			assert_eq!(&*visible[0].label, "Ann");
			assert!(visible[0].resolved);
		}
		other => panic!("unexpected chips {other:?}"),
	}
}

#[test]
fn chips_are_capped_at_max_count() {
	let options = [("1", "A"), ("2", "B"), ("3", "C"), ("4", "D"), ("5", "E")];
	let control = local(SelectConfig::default(), ExternalValue::list(["1", "2", "3", "4", "9"]), &options);

	let ChipView::Many { visible, overflow } = control.chips() else {
		panic!("expected chips");
	};
	let labels: Vec<&str> = visible.iter().map(|chip| &*chip.label).collect();
	assert_eq!(labels, ["A", "B", "C"]);
	assert_eq!(overflow, 2);

	let unknown = control.all_chips().pop().unwrap();
	assert_eq!(&*unknown.label, "9");
	assert!(!unknown.resolved);
}

#[test]
fn clear_reports_empty_shape_per_mode() {
	let mut multi = local(SelectConfig::default(), ExternalValue::list(["1"]), &[("1", "A")]);
	multi.clear();
	assert_eq!(multi.drain_events(), vec![SelectEvent::ValueChanged(ExternalValue::List(vec![]))]);

	let mut single = local(SelectConfig::single(), ExternalValue::one("1"), &[("1", "A")]);
	single.remove_chip(&id("1"));
	assert_eq!(single.drain_events(), vec![SelectEvent::ValueChanged(ExternalValue::Absent)]);

	let mut remote = remote_with_page(ExternalValue::one("__ALL__"), &[("1", "A")], 1);
	remote.clear();
	assert_eq!(
		remote.drain_events(),
		vec![
			SelectEvent::ValueChanged(ExternalValue::List(vec![])),
			SelectEvent::ExcludedChanged(vec![]),
		]
	);
}

#[test]
fn backspace_pops_last_only_with_empty_search() {
	let mut control = local(SelectConfig::default(), ExternalValue::list(["1", "2"]), &[("1", "A"), ("2", "B")]);

	control.type_search("x", Instant::now());
	control.key_down(Key::Backspace);
	assert_eq!(control.external_value(), ExternalValue::list(["1", "2"]));

	control.type_search("", Instant::now());
	control.key_down(Key::Backspace);
	assert_eq!(control.external_value(), ExternalValue::list(["1"]));
}

#[test]
fn enter_opens_and_escape_closes() {
	let mut control = local(SelectConfig::default(), ExternalValue::Absent, &[]);
	control.key_down(Key::Enter);
	control.key_down(Key::Enter);
	control.key_down(Key::Escape);
	assert_eq!(
		control.drain_events(),
		vec![SelectEvent::PopoverChanged(true), SelectEvent::PopoverChanged(false)]
	);
}

#[test]
fn closing_clears_search_when_configured() {
	let config = SelectConfig {
		clear_search_on_close: true,
		..SelectConfig::remote()
	};
	let mut control = ComboSelect::new(config, ExternalValue::Absent).unwrap();
	let effects = control.drain_effects();
	let first = page_requests(&effects)[0].clone();
	control.apply_page(&first.ticket, Ok(page(&[("1", "Ann")], 1, 1)));

	let t0 = Instant::now();
	control.open();
	control.type_search("an", t0);
	control.tick(t0 + Duration::from_millis(300));
	control.drain_effects();
	control.drain_events();

	control.close();
	assert_eq!(control.search_text(), "");
	assert_eq!(
		control.drain_events(),
		vec![SelectEvent::PopoverChanged(false), SelectEvent::Search(String::new())]
	);
	let effects = control.drain_effects();
	assert_eq!(page_requests(&effects)[0].query.text, "");
}

#[test]
fn disabled_control_ignores_interaction() {
	let config = SelectConfig {
		disabled: true,
		..SelectConfig::default()
	};
	let mut control = local(config, ExternalValue::Absent, &[("1", "A")]);
	control.open();
	control.toggle(&id("1"));
	control.toggle_all();
	control.type_search("a", Instant::now());

	assert!(!control.is_open());
	assert!(control.value().is_empty());
	assert!(control.drain_events().is_empty());

	control.set_value(&ExternalValue::list(["1"]));
	assert_eq!(control.external_value(), ExternalValue::list(["1"]));
}

#[test]
fn parent_value_wins_without_callbacks() {
	let mut control = remote_with_page(ExternalValue::Absent, &[("1", "A"), ("2", "B")], 1);
	control.toggle_all();
	control.toggle(&id("2"));
	control.drain_events();

	control.set_value(&ExternalValue::one("__ALL__"));
	assert_eq!(control.excluded(), vec![id("2")], "echoed sentinel keeps exclusions");

	control.set_excluded([id("1")]);
	assert_eq!(control.excluded(), vec![id("1")]);

	control.set_value(&ExternalValue::list(["2"]));
	assert_eq!(control.value(), &SelectionValue::many([id("2")]));
	assert!(control.drain_events().is_empty());
}

#[test]
fn scroll_loads_more_only_while_open() {
	let mut control = remote_with_page(ExternalValue::Absent, &[("1", "A"), ("2", "B")], 2);
	let near_bottom = ScrollMetrics {
		scroll_top: 250.0,
		scroll_height: 600.0,
		client_height: 300.0,
	};

	control.scrolled(near_bottom);
	assert!(control.drain_effects().is_empty());

	control.open();
	control.drain_events();
	control.scrolled(near_bottom);
	assert_eq!(control.drain_events(), vec![SelectEvent::LoadMore]);
	let effects = control.drain_effects();
	assert_eq!(page_requests(&effects)[0].query.page, 2);
	assert!(control.status().loading_more);

	control.laid_out(ScrollMetrics {
		scroll_top: 0.0,
		scroll_height: 10.0,
		client_height: 300.0,
	});
	assert!(control.drain_effects().is_empty(), "one page at a time");
}

#[test]
fn failed_page_is_reported_inline_and_keeps_selection() {
	let mut control = ComboSelect::new(SelectConfig::remote(), ExternalValue::list(["1"])).unwrap();
	let effects = control.drain_effects();
	let first = page_requests(&effects)[0].clone();

	let outcome = control.apply_page(&first.ticket, Err(FetchError::Status { code: 500, message: "boom".into() }));
	assert_eq!(outcome, PageApply::Failed);
	let status = control.status();
	assert_eq!(status.error, Some(FetchError::Status { code: 500, message: "boom".into() }));
	assert!(!status.shows_spinner(0));
	assert_eq!(control.external_value(), ExternalValue::list(["1"]));
}

#[test]
fn reopening_retries_a_failed_first_page() {
	let mut control = ComboSelect::new(SelectConfig::remote(), ExternalValue::Absent).unwrap();
	control.open();
	let effects = control.drain_effects();
	let first = page_requests(&effects)[0].clone();

	control.apply_page(&first.ticket, Err(FetchError::Transport("reset".into())));
	control.tick(Instant::now());
	control.load_more();
	assert!(control.drain_effects().is_empty(), "nothing retries on its own");

	control.close();
	control.open();
	let effects = control.drain_effects();
	let retry = page_requests(&effects);
	assert_eq!(retry.len(), 1);
	assert_eq!(retry[0].query.page, 1);
	assert_eq!(retry[0].query.text, "");
	assert_eq!(control.status().error, None);

	control.apply_page(&retry[0].ticket.clone(), Ok(page(&[("1", "Ann")], 1, 1)));
	control.close();
	control.open();
	assert!(control.drain_effects().is_empty());
	assert_eq!(control.options().len(), 1);
}

#[test]
fn backspace_in_all_mode_leaves_all_mode_and_drops_exclusions() {
	let mut control = ComboSelect::new(SelectConfig::remote(), ExternalValue::one("__ALL__")).unwrap();
	control.set_excluded([id("2")]);
	assert!(matches!(control.value(), SelectionValue::AllExcept(_)));

	control.key_down(Key::Backspace);
	assert_eq!(control.value(), &SelectionValue::None);
	assert_eq!(
		control.drain_events(),
		vec![SelectEvent::ValueChanged(ExternalValue::list(Vec::<String>::new())), SelectEvent::ExcludedChanged(Vec::new())]
	);

	control.key_down(Key::Backspace);
	assert!(control.drain_events().is_empty());
}

#[test]
fn validate_required_is_local() {
	let mut control = local(SelectConfig::default(), ExternalValue::Absent, &[("1", "A")]);
	assert_eq!(control.validate(SelectionRule::Required), Err(ValidationError::Required));
	assert_eq!(control.validate(SelectionRule::Optional), Ok(()));

	control.toggle(&id("1"));
	assert_eq!(control.validate(SelectionRule::Required), Ok(()));
	assert!(control.drain_effects().is_empty());
}

#[test]
fn invalid_config_is_rejected_at_mount() {
	let config = SelectConfig {
		per_page: 0,
		..SelectConfig::remote()
	};
	assert_eq!(ComboSelect::new(config, ExternalValue::Absent).unwrap_err(), ConfigError::ZeroPerPage);
}
