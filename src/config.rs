/// Runtime configuration: where the card API lives
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

pub const DEFAULT_API_BASE: &str = "http://localhost:5005/api";
/// Page `localStorage` key that overrides the API base at runtime
pub const API_BASE_STORAGE_KEY: &str = "panoramix.api_base";
/// Source URL recorded when the active tab cannot be queried
pub const FALLBACK_PAGE_URL: &str = "panoramix.cc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: option_env!("PANORAMIX_API_URL")
                .unwrap_or(DEFAULT_API_BASE)
                .to_string(),
        }
    }
}

impl Config {
    pub fn new(api_base: impl Into<String>) -> Self {
        Config {
            api_base: api_base.into(),
        }
    }

    /// Defaults, overridden by the page's `localStorage` when set
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|storage| storage.get_item(API_BASE_STORAGE_KEY).ok().flatten())
            .filter(|base| !base.trim().is_empty());

        match stored {
            Some(base) => {
                log::debug!("Using API base from localStorage: {}", base);
                Config::new(base.trim())
            }
            None => Config::default(),
        }
    }

    /// `GET` board list
    pub fn boards_url(&self) -> Result<Url> {
        self.endpoint(&["boards"])
    }

    /// `GET` one board by name; the name is percent-encoded as one segment
    pub fn board_url(&self, name: &str) -> Result<Url> {
        self.endpoint(&["boards", name])
    }

    /// `POST` new card
    pub fn cards_url(&self) -> Result<Url> {
        self.endpoint(&["cards"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithoutBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
