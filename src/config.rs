//! Client configuration.

use serde::Deserialize;

use crate::layout::ForceConfig;

/// Backend used when `NODI_API_URL` is unset at build time.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// `localStorage` key for saved conversations.
pub const DEFAULT_STORAGE_KEY: &str = "nodi_conversations";

/// Client settings. The API base URL can be baked in at build time through
/// `NODI_API_URL`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
	/// Backend root, without the `/api` path.
	pub api_base_url: String,
	/// Where conversations are persisted.
	pub storage_key: String,
	/// Force layout tuning.
	pub layout: ForceConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_base_url: option_env!("NODI_API_URL")
				.unwrap_or(DEFAULT_API_URL)
				.to_owned(),
			storage_key: DEFAULT_STORAGE_KEY.to_owned(),
			layout: ForceConfig::default(),
		}
	}
}

impl ClientConfig {
	/// URL of the chat endpoint.
	pub fn chat_endpoint(&self) -> String {
		format!("{}/api/continue_chat", self.api_base_url.trim_end_matches('/'))
	}
}
