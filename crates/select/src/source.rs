//! Contracts of the remote collaborators a control fetches from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::ItemId;
use crate::option::SelectOption;

/// One page request against an [`OptionsSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
	/// Search text. Empty means unfiltered.
	pub text: String,
	/// 1-based page index.
	pub page: u32,
	pub per_page: u32,
}

/// Page position reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub current_page: u32,
	pub page_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
	pub items: Vec<SelectOption>,
	pub pagination: Pagination,
}

/// Failure of a remote fetch.
///
/// Cloneable so the last failure can sit in control state and be rendered
/// inline next to the option list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The request never produced a response.
	#[error("transport error: {0}")]
	Transport(String),
	/// The backend answered with an error status.
	#[error("request failed ({code}): {message}")]
	Status {
		/// HTTP-like status code.
		code: u16,
		/// Backend-provided message.
		message: String,
	},
	/// The request was abandoned before completing.
	#[error("request cancelled")]
	Cancelled,
}

/// Paginated, searchable source of options.
///
/// Implementations must be idempotent for an identical query and page.
#[async_trait]
pub trait OptionsSource: Send + Sync {
	async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse, FetchError>;
}

/// Bulk lookup of options by id, used to label selections missing from the
/// loaded pages.
///
/// Ids the source does not know are omitted from the result. Callers never
/// pass an empty slice.
#[async_trait]
pub trait ByIdsSource: Send + Sync {
	async fn fetch_by_ids(&self, ids: &[ItemId]) -> Result<Vec<SelectOption>, FetchError>;
}
