//! Combo-select control facade.
//!
//! # Purpose
//!
//! * Composes [`SelectionState`], [`OptionCache`], [`MissingResolver`] and,
//!   in async mode, [`PageBridge`] behind the intents a rendered control
//!   receives.
//! * Emits host callbacks as [`SelectEvent`]s and fetch work as [`Effect`]s.
//!
//! # Mental model
//!
//! * The control never performs I/O. Fetches leave as effects and come back
//!   through [`ComboSelect::apply_page`] and [`ComboSelect::apply_resolved`].
//! * Values pushed by the parent win: [`ComboSelect::set_value`] and
//!   [`ComboSelect::set_excluded`] overwrite state and emit nothing.
//! * After any state change that may expose an unlabeled selected id, the
//!   control reconciles it against the loaded page and the cache.
//!
//! # Invariants
//!
//! * Must ignore user intents while disabled.
//! * Must emit `ValueChanged` and `ExcludedChanged` exactly when the
//!   selection [`Transition`] asks for them.
//! * Must record a toggled option into the cache before the selection changes.
//! * Must not emit a resolve effect while the displayed search is non-empty.
//!
//! # Data flow
//!
//! 1. Host forwards input (`type_search`, `toggle`, `scrolled`, ...).
//! 2. Host drains events into its callbacks and effects into fetches.
//! 3. Completions re-enter through `apply_page`/`apply_resolved`.
//! 4. Host calls `tick` at `next_deadline` to flush debounced search.

mod view;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, trace};

pub use self::view::{Chip, ChipView, LoadStatus, OptionRow};
use crate::bridge::{PageApply, PageBridge, PageRequest, PageTicket, ScrollMetrics};
use crate::cache::OptionCache;
use crate::config::{ConfigError, SelectConfig};
use crate::exclusion::ExclusionSet;
use crate::ids::ItemId;
use crate::option::SelectOption;
use crate::resolver::{MissingResolver, ResolveOutcome, ResolveTicket};
use crate::selection::{SelectAllState, SelectionState, Transition};
use crate::source::{FetchError, PageResponse};
use crate::value::{ExternalValue, SelectionValue};

/// Host callback the control wants fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
	ValueChanged(ExternalValue),
	ExcludedChanged(Vec<ItemId>),
	Search(String),
	LoadMore,
	PopoverChanged(bool),
}

/// Fetch the host should run and feed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
	FetchPage(PageRequest),
	FetchByIds(ResolveTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
	Enter,
	Backspace,
	Escape,
}

/// Local validation rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionRule {
	#[default]
	Optional,
	Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("at least one item must be selected")]
	Required,
}

#[derive(Debug)]
enum Options {
	Local(Vec<SelectOption>),
	Remote(PageBridge),
}

/// One mounted combo-select control.
#[derive(Debug)]
pub struct ComboSelect {
	config: SelectConfig,
	selection: SelectionState,
	cache: OptionCache,
	resolver: MissingResolver,
	options: Options,
	/// Displayed search text. In async mode the bridge holds the committed one.
	search: String,
	open: bool,
	/// Last exclusion list pushed by the parent, if it controls it.
	controlled_excluded: Option<ExclusionSet>,
	events: Vec<SelectEvent>,
	effects: Vec<Effect>,
}

impl ComboSelect {
	/// Mounts a control holding `initial`.
	///
	/// In async mode the first page request is queued as an effect.
	pub fn new(config: SelectConfig, initial: ExternalValue) -> Result<Self, ConfigError> {
		config.validate()?;
		let mode = config.mode();
		let value = SelectionValue::from_external(&initial, mode, &config.select_all_value, &ExclusionSet::new());
		let mut options = if config.async_mode {
			Options::Remote(PageBridge::new(
				config.per_page,
				config.search_debounce(),
				config.load_more_threshold_px as f32,
			))
		} else {
			Options::Local(Vec::new())
		};

		let mut effects = Vec::new();
		if let Options::Remote(bridge) = &mut options
			&& let Some(request) = bridge.start()
		{
			effects.push(Effect::FetchPage(request));
		}
		debug!(multiple = mode.multiple, async_mode = mode.async_mode, "control.mount");

		Ok(Self {
			selection: SelectionState::with_value(mode, value),
			cache: OptionCache::new(),
			resolver: MissingResolver::new(),
			options,
			search: String::new(),
			open: false,
			controlled_excluded: None,
			events: Vec::new(),
			effects,
			config,
		})
	}

	pub fn config(&self) -> &SelectConfig {
		&self.config
	}

	pub fn value(&self) -> &SelectionValue {
		self.selection.current()
	}

	/// Current value in host shape.
	pub fn external_value(&self) -> ExternalValue {
		self.selection.current().to_external(self.selection.mode(), &self.config.select_all_value)
	}

	/// Ids excluded from the all-selection. Empty outside all-mode.
	pub fn excluded(&self) -> Vec<ItemId> {
		self.selection.current().excluded().map(ExclusionSet::to_vec).unwrap_or_default()
	}

	pub fn is_open(&self) -> bool {
		self.open
	}

	pub fn search_text(&self) -> &str {
		&self.search
	}

	pub fn cache(&self) -> &OptionCache {
		&self.cache
	}

	pub fn resolver(&self) -> &MissingResolver {
		&self.resolver
	}

	pub fn open(&mut self) {
		if self.config.disabled || self.open {
			return;
		}
		self.open = true;
		self.events.push(SelectEvent::PopoverChanged(true));
		if let Options::Remote(bridge) = &mut self.options
			&& let Some(request) = bridge.retry()
		{
			self.effects.push(Effect::FetchPage(request));
		}
	}

	pub fn close(&mut self) {
		if !self.open {
			return;
		}
		self.open = false;
		self.events.push(SelectEvent::PopoverChanged(false));
		if self.config.clear_search_on_close {
			self.reset_search();
		}
	}

	pub fn set_open(&mut self, open: bool) {
		if open { self.open() } else { self.close() }
	}

	pub fn key_down(&mut self, key: Key) {
		if self.config.disabled {
			return;
		}
		match key {
			Key::Enter => self.open(),
			Key::Escape => self.close(),
			Key::Backspace if self.search.is_empty() => {
				let transition = self.selection.pop_last();
				self.emit(transition);
			}
			Key::Backspace => {}
		}
	}

	/// Updates the search box. Remote queries are sent after the debounce.
	pub fn type_search(&mut self, text: &str, now: Instant) {
		if self.config.disabled {
			return;
		}
		self.search = text.to_string();
		self.events.push(SelectEvent::Search(self.search.clone()));
		if let Options::Remote(bridge) = &mut self.options {
			bridge.search(text, now);
		}
	}

	/// Flushes a due search and any pending missing-id work into effects.
	pub fn tick(&mut self, now: Instant) {
		if let Options::Remote(bridge) = &mut self.options
			&& let Some(request) = bridge.poll(now)
		{
			self.effects.push(Effect::FetchPage(request));
		}
		self.reconcile();
	}

	/// When [`tick`](Self::tick) next has work, if ever.
	pub fn next_deadline(&self) -> Option<Instant> {
		match &self.options {
			Options::Remote(bridge) => bridge.search_deadline(),
			Options::Local(_) => None,
		}
	}

	/// Toggles one option.
	pub fn toggle(&mut self, id: &ItemId) {
		if self.config.disabled {
			return;
		}
		let option = self.visible_options().into_iter().find(|o| &o.id == id).cloned();
		if let Some(option) = &option {
			self.cache.record([option]);
		}
		let transition = self.selection.toggle(id);
		self.emit(transition);
	}

	/// Activates the select-all row.
	pub fn toggle_all(&mut self) {
		if self.config.disabled || self.select_all_row().is_none() {
			return;
		}
		let visible = self.visible_ids();
		let transition = self.selection.select_all(&visible);
		self.emit(transition);
	}

	pub fn clear(&mut self) {
		if self.config.disabled {
			return;
		}
		let transition = self.selection.clear();
		self.emit(transition);
	}

	/// Removes one chip. In single mode this clears the selection.
	pub fn remove_chip(&mut self, id: &ItemId) {
		if !self.config.multiple {
			self.clear();
		} else if self.selection.is_selected(id.as_str()) {
			self.toggle(id);
		}
	}

	/// Replaces the local option list. Ignored in async mode.
	pub fn set_options(&mut self, options: Vec<SelectOption>) {
		match &mut self.options {
			Options::Local(list) => *list = options,
			Options::Remote(_) => debug!("control.set_options.ignored"),
		}
	}

	/// Applies a value pushed by the parent. Emits nothing.
	pub fn set_value(&mut self, value: &ExternalValue) {
		let excluded = match (&self.controlled_excluded, self.selection.current()) {
			(Some(excluded), _) => excluded.clone(),
			(None, SelectionValue::AllExcept(current)) => current.clone(),
			(None, _) => ExclusionSet::new(),
		};
		let next = SelectionValue::from_external(value, self.selection.mode(), &self.config.select_all_value, &excluded);
		trace!(?value, "control.set_value");
		self.selection.set_external(next);
		self.reconcile();
	}

	/// Applies an exclusion list pushed by the parent. Emits nothing.
	pub fn set_excluded(&mut self, ids: impl IntoIterator<Item = ItemId>) {
		let excluded = ExclusionSet::from_ids(ids);
		self.selection.set_excluded(excluded.clone());
		self.controlled_excluded = Some(excluded);
	}

	/// Feeds a page fetch completion back.
	pub fn apply_page(&mut self, ticket: &PageTicket, result: Result<PageResponse, FetchError>) -> PageApply {
		let Options::Remote(bridge) = &mut self.options else {
			return PageApply::Stale;
		};
		let outcome = bridge.apply(ticket, result);
		if let PageApply::Applied { appended } = &outcome {
			let fresh = &bridge.visible()[appended.clone()];
			self.cache.record(fresh);
			self.resolver.note_loaded(fresh.iter().map(|o| &o.id));
		}
		self.reconcile();
		outcome
	}

	/// Feeds a by-ids fetch completion back.
	pub fn apply_resolved(&mut self, ticket: &ResolveTicket, result: Result<Vec<SelectOption>, FetchError>) -> ResolveOutcome {
		let outcome = self.resolver.complete(ticket, result, &mut self.cache);
		if !matches!(outcome, ResolveOutcome::Stale) {
			self.reconcile();
		}
		outcome
	}

	/// Explicit request for the next page.
	pub fn load_more(&mut self) {
		let request = match &mut self.options {
			Options::Remote(bridge) => bridge.load_more(),
			Options::Local(_) => None,
		};
		self.push_load_more(request);
	}

	/// Scroll position of the open option list changed.
	pub fn scrolled(&mut self, metrics: ScrollMetrics) {
		if !self.open {
			return;
		}
		let request = match &mut self.options {
			Options::Remote(bridge) => bridge.on_scroll(metrics),
			Options::Local(_) => None,
		};
		self.push_load_more(request);
	}

	/// The open option list was laid out.
	pub fn laid_out(&mut self, metrics: ScrollMetrics) {
		if !self.open {
			return;
		}
		let request = match &mut self.options {
			Options::Remote(bridge) => bridge.after_layout(metrics),
			Options::Local(_) => None,
		};
		self.push_load_more(request);
	}

	pub fn options(&self) -> Vec<OptionRow> {
		self.visible_options()
			.into_iter()
			.map(|option| OptionRow {
				id: option.id.clone(),
				label: option.label.clone(),
				selected: self.selection.is_selected(option.id.as_str()),
			})
			.collect()
	}

	/// State of the select-all row, or `None` when it is hidden.
	pub fn select_all_row(&self) -> Option<SelectAllState> {
		if self.config.hide_select_all || !self.config.multiple {
			return None;
		}
		if self.config.async_mode && !self.search.trim().is_empty() {
			return None;
		}
		let visible = self.visible_ids();
		if visible.is_empty() {
			return None;
		}
		Some(self.selection.select_all_state(&visible))
	}

	pub fn chips(&self) -> ChipView {
		match self.selection.current() {
			SelectionValue::None => ChipView::Placeholder,
			SelectionValue::Single(id) => ChipView::Single(self.chip(id)),
			SelectionValue::AllExcept(excluded) => ChipView::AllSelected { excluded: excluded.len() },
			SelectionValue::Many(ids) => {
				let mut visible: Vec<Chip> = ids.iter().map(|id| self.chip(id)).collect();
				let overflow = visible.len().saturating_sub(self.config.max_count);
				visible.truncate(self.config.max_count);
				ChipView::Many { visible, overflow }
			}
		}
	}

	/// Every selected chip, for the overflow list behind `+N`.
	pub fn all_chips(&self) -> Vec<Chip> {
		self.selection.current().ids().iter().map(|id| self.chip(id)).collect()
	}

	pub fn status(&self) -> LoadStatus {
		let resolver = LoadStatus {
			resolving: self.resolver.is_in_flight(),
			resolve_error: self.resolver.last_error().cloned(),
			..LoadStatus::default()
		};
		match &self.options {
			Options::Local(_) => resolver,
			Options::Remote(bridge) => LoadStatus {
				loading: bridge.is_loading(),
				loading_more: bridge.is_loading_more(),
				has_more: bridge.has_more(),
				error: bridge.error().cloned(),
				..resolver
			},
		}
	}

	pub fn validate(&self, rule: SelectionRule) -> Result<(), ValidationError> {
		match rule {
			SelectionRule::Required if self.selection.current().is_empty() => Err(ValidationError::Required),
			_ => Ok(()),
		}
	}

	pub fn drain_events(&mut self) -> Vec<SelectEvent> {
		std::mem::take(&mut self.events)
	}

	pub fn drain_effects(&mut self) -> Vec<Effect> {
		std::mem::take(&mut self.effects)
	}

	fn emit(&mut self, transition: Transition) {
		if transition.value_changed {
			let value = self.external_value();
			trace!(?value, "control.value_changed");
			self.events.push(SelectEvent::ValueChanged(value));
		}
		if transition.excluded_changed {
			self.events.push(SelectEvent::ExcludedChanged(self.excluded()));
		}
		if transition.close_popover {
			self.close();
		}
	}

	fn reset_search(&mut self) {
		self.search.clear();
		self.events.push(SelectEvent::Search(String::new()));
		if let Options::Remote(bridge) = &mut self.options
			&& let Some(request) = bridge.commit_now("")
		{
			self.effects.push(Effect::FetchPage(request));
		}
	}

	fn push_load_more(&mut self, request: Option<PageRequest>) {
		if let Some(request) = request {
			self.events.push(SelectEvent::LoadMore);
			self.effects.push(Effect::FetchPage(request));
		}
	}

	/// Plans a by-ids fetch for selected ids without a label.
	fn reconcile(&mut self) {
		let Options::Remote(bridge) = &self.options else {
			return;
		};
		if !bridge.has_loaded() {
			return;
		}
		let selected = self.selection.current().ids();
		let search_active = !self.search.is_empty() || !bridge.query().is_empty();
		let resolution = self.resolver.resolve(&selected, bridge.loaded_ids(), &self.cache, search_active);
		if resolution.should_fetch {
			let ticket = self.resolver.begin(resolution.missing_ids);
			self.effects.push(Effect::FetchByIds(ticket));
		}
	}

	fn visible_options(&self) -> Vec<&SelectOption> {
		match &self.options {
			Options::Local(list) => list.iter().filter(|o| o.matches(&self.search)).collect(),
			Options::Remote(bridge) => bridge.visible().iter().collect(),
		}
	}

	fn visible_ids(&self) -> Vec<ItemId> {
		self.visible_options().into_iter().map(|o| o.id.clone()).collect()
	}

	fn chip(&self, id: &ItemId) -> Chip {
		let local = match &self.options {
			Options::Local(list) => list.iter().find(|o| &o.id == id),
			Options::Remote(_) => None,
		};
		if let Some(option) = local {
			return Chip {
				id: id.clone(),
				label: option.label.clone(),
				resolved: true,
			};
		}
		let label = self.cache.label_for(id);
		Chip {
			id: id.clone(),
			label: label.text,
			resolved: label.resolved,
		}
	}
}

#[cfg(test)]
mod tests;
