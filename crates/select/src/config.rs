//! Control configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::{LOAD_MORE_THRESHOLD_PX, SEARCH_DEBOUNCE};
use crate::value::{DEFAULT_SELECT_ALL_VALUE, SelectMode};

/// Configuration flags of one combo-select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectConfig {
	/// Allow several selected items.
	#[serde(default = "default_true")]
	pub multiple: bool,
	/// Fetch options remotely instead of using a local list.
	#[serde(default, rename = "async")]
	pub async_mode: bool,
	/// Never show the select-all row.
	#[serde(default)]
	pub hide_select_all: bool,
	/// Reset the search text whenever the popover closes.
	#[serde(default)]
	pub clear_search_on_close: bool,
	/// Ignore all interaction.
	#[serde(default)]
	pub disabled: bool,
	/// Chips shown before the rest are summarized as `+N`.
	#[serde(default = "default_max_count")]
	pub max_count: usize,
	/// Token reported to the host when every remote item is selected.
	#[serde(default = "default_select_all_value")]
	pub select_all_value: String,
	/// Page size requested from the options source.
	#[serde(default = "default_per_page")]
	pub per_page: u32,
	/// Quiet period before search input is sent, in milliseconds.
	#[serde(default = "default_search_debounce_ms")]
	pub search_debounce_ms: u64,
	/// Distance from the list bottom, in pixels, that triggers the next page.
	#[serde(default = "default_load_more_threshold_px")]
	pub load_more_threshold_px: u32,
}

fn default_true() -> bool {
	true
}

fn default_max_count() -> usize {
	3
}

fn default_select_all_value() -> String {
	DEFAULT_SELECT_ALL_VALUE.to_string()
}

fn default_per_page() -> u32 {
	8
}

fn default_search_debounce_ms() -> u64 {
	SEARCH_DEBOUNCE.as_millis() as u64
}

fn default_load_more_threshold_px() -> u32 {
	LOAD_MORE_THRESHOLD_PX as u32
}

impl Default for SelectConfig {
	fn default() -> Self {
		Self {
			multiple: true,
			async_mode: false,
			hide_select_all: false,
			clear_search_on_close: false,
			disabled: false,
			max_count: default_max_count(),
			select_all_value: default_select_all_value(),
			per_page: default_per_page(),
			search_debounce_ms: default_search_debounce_ms(),
			load_more_threshold_px: default_load_more_threshold_px(),
		}
	}
}

/// Invalid control configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("select_all_value must not be empty")]
	EmptySelectAllValue,
	#[error("per_page must be at least 1")]
	ZeroPerPage,
}

impl SelectConfig {
	/// Remote multi-select with every other flag at its default.
	pub fn remote() -> Self {
		Self {
			async_mode: true,
			..Self::default()
		}
	}

	/// Single-select with every other flag at its default.
	pub fn single() -> Self {
		Self {
			multiple: false,
			..Self::default()
		}
	}

	pub fn mode(&self) -> SelectMode {
		SelectMode::new(self.multiple, self.async_mode)
	}

	pub fn search_debounce(&self) -> Duration {
		Duration::from_millis(self.search_debounce_ms)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.select_all_value.is_empty() {
			return Err(ConfigError::EmptySelectAllValue);
		}
		if self.per_page == 0 {
			return Err(ConfigError::ZeroPerPage);
		}
		Ok(())
	}
}
