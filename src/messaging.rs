/// Messages exchanged between the host page and the editor iframe
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::{describe_js, Error, Result};

/// Cross-frame message, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameMessage {
    /// Content script hands the selection to the editor
    FromContentScript { text: String },
    /// Alternate text delivery path into the editor
    Select { text: String },
    /// Editor asks the host page to tear down the overlay
    CloseModal,
}

impl FrameMessage {
    /// Parse `MessageEvent.data`; anything unrecognised yields `None`
    pub fn from_js(data: &JsValue) -> Option<FrameMessage> {
        if !data.is_object() {
            return None;
        }
        serde_wasm_bindgen::from_value(data.clone()).ok()
    }

    pub fn to_js(&self) -> Result<JsValue> {
        Ok(serde_wasm_bindgen::to_value(self)?)
    }

    /// Text carried into the editor, if this message delivers any
    pub fn selected_text(&self) -> Option<&str> {
        match self {
            FrameMessage::FromContentScript { text } | FrameMessage::Select { text } => {
                Some(text)
            }
            FrameMessage::CloseModal => None,
        }
    }
}

/// Post a message to `target` with origin `*`
pub fn post(target: &web_sys::Window, message: &FrameMessage) -> Result<()> {
    let data = message.to_js()?;
    target
        .post_message(&data, "*")
        .map_err(|e| Error::Bridge(describe_js(&e)))
}

/// Post a message to the embedding page (used from inside the editor frame)
pub fn post_to_parent(message: &FrameMessage) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| Error::Bridge("no window".to_string()))?;
    let parent = window.parent().ok().flatten().unwrap_or(window);
    post(&parent, message)
}
