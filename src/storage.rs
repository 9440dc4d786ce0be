/// Best-effort key-value handoff between the content script and the editor
///
/// Extension storage is preferred. When it is unreachable (page reloaded
/// after an extension update, plain web context) the selection falls back to
/// the page's `localStorage`. Nothing here is retried.
use crate::bridge;
use crate::card::NewCard;
use crate::error::{Error, Result};

/// Keys written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    /// Selection captured by the content script
    SelectedText,
    /// Last card submitted from the editor
    SavedItem,
    /// Page `localStorage` fallback for the selection
    TextSelected,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::SelectedText => "selectedText",
            StorageKey::SavedItem => "savedItem",
            StorageKey::TextSelected => "textSelected",
        }
    }
}

/// Store the selection for the editor to pick up
pub async fn save_selected_text(text: &str) -> Result<()> {
    if bridge::has_extension_storage() {
        match bridge::set_storage(StorageKey::SelectedText.as_str(), text.into()).await {
            Ok(()) => return Ok(()),
            Err(e) => log::warn!("Extension storage write failed, using page storage: {}", e),
        }
    }
    local_storage()?
        .set_item(StorageKey::TextSelected.as_str(), text)
        .map_err(|_| Error::Storage("localStorage write rejected".to_string()))
}

/// Read the selection left by the content script, if any
pub async fn load_selected_text() -> Result<Option<String>> {
    if bridge::has_extension_storage() {
        let value = bridge::get_storage(StorageKey::SelectedText.as_str()).await?;
        return Ok(value.as_string().filter(|text| !text.is_empty()));
    }
    Ok(local_storage()?
        .get_item(StorageKey::TextSelected.as_str())
        .ok()
        .flatten()
        .filter(|text| !text.is_empty()))
}

/// Keep a local copy of the card being submitted
pub async fn save_item(card: &NewCard) -> Result<()> {
    let value = serde_wasm_bindgen::to_value(card)?;
    bridge::set_storage(StorageKey::SavedItem.as_str(), value).await
}

fn local_storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| Error::Storage("localStorage unavailable".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::SelectedText.as_str(), "selectedText");
        assert_eq!(StorageKey::SavedItem.as_str(), "savedItem");
        assert_eq!(StorageKey::TextSelected.as_str(), "textSelected");
    }
}
