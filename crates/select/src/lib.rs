//! Selection reconciliation engine for searchable combo-select controls.
//!
//! A control lets users pick one or many items from a local list or from a
//! paginated remote source. In async multiple mode the selection may be the
//! universal "everything except these ids", which is never materialized.
//!
//! The engine is synchronous and I/O free. [`ComboSelect`] emits fetch work as
//! [`Effect`]s, and [`SelectDriver`] runs them on tokio against an
//! [`OptionsSource`] and a [`ByIdsSource`].

pub mod bridge;
pub mod cache;
pub mod config;
pub mod control;
pub mod driver;
pub mod exclusion;
pub mod ids;
pub mod option;
pub mod resolver;
pub mod selection;
pub mod source;
pub mod value;

pub use bridge::{PageApply, PageBridge, PageRequest, PageTicket, ScrollMetrics};
pub use cache::{ChipLabel, OptionCache};
pub use config::{ConfigError, SelectConfig};
pub use control::{Chip, ChipView, ComboSelect, Effect, Key, LoadStatus, OptionRow, SelectEvent, SelectionRule, ValidationError};
pub use driver::{Completion, SelectDriver};
pub use exclusion::ExclusionSet;
pub use ids::{IdError, ItemId};
pub use option::SelectOption;
pub use resolver::{MissingResolver, ResolveOutcome, ResolveTicket, Resolution};
pub use selection::{SelectAllState, SelectionState, Transition};
pub use source::{ByIdsSource, FetchError, OptionsSource, PageQuery, PageResponse, Pagination};
pub use value::{ExternalValue, SelectMode, SelectionValue};

/// Result of a remote fetch.
pub type Result<T, E = FetchError> = std::result::Result<T, E>;
