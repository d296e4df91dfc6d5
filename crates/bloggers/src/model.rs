use picklist_select::{ItemId, SelectOption};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
	pub platform: String,
	pub url: String,
}

/// One blogger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blogger {
	pub id: ItemId,
	pub name: String,
	pub bio: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image: Option<String>,
	pub created_at: String,
	#[serde(default)]
	pub social_links: Vec<SocialLink>,
}

impl Blogger {
	/// Option shown in a picker: the blogger's name keyed by id.
	pub fn to_option(&self) -> SelectOption {
		SelectOption::new(self.id.clone(), self.name.as_str())
	}

	/// Case-insensitive name filter. Blank needles match everything.
	pub fn name_matches(&self, needle: &str) -> bool {
		let needle = needle.trim();
		needle.is_empty() || self.name.to_lowercase().contains(&needle.to_lowercase())
	}
}
