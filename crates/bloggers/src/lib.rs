//! Blogger directory used as the remote collaborator of picklist controls.
//!
//! [`BloggerStore`] answers paged name searches and bulk id lookups through
//! the [`picklist_select::OptionsSource`] and [`picklist_select::ByIdsSource`]
//! contracts, and deletes rows through [`RowDelete`].

pub mod error;
pub mod model;
pub mod store;

pub use error::{ApiError, ErrorCode, GENERIC_ERROR_MESSAGE, error_message};
pub use model::{Blogger, SocialLink};
pub use store::{BloggerStore, RowDelete, StoreConfig};

pub type Result<T> = std::result::Result<T, ApiError>;
