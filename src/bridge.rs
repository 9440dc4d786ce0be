/// Access to WebExtension APIs through the JS bridge module
use wasm_bindgen::prelude::*;

use crate::error::{describe_js, Error, Result};

#[wasm_bindgen(module = "/js/extension.js")]
extern "C" {
    #[wasm_bindgen(js_name = hasExtensionStorage)]
    fn has_extension_storage_js() -> bool;

    #[wasm_bindgen(catch, js_name = getStorage)]
    async fn get_storage_js(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = setStorage)]
    async fn set_storage_js(key: &str, value: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = getActiveTabUrl)]
    async fn get_active_tab_url_js() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = extensionUrl)]
    fn extension_url_js(path: &str) -> std::result::Result<String, JsValue>;
}

pub fn has_extension_storage() -> bool {
    has_extension_storage_js()
}

/// Read a key from `chrome.storage.local`; missing keys yield `JsValue::NULL`
pub async fn get_storage(key: &str) -> Result<JsValue> {
    get_storage_js(key)
        .await
        .map_err(|e| Error::Storage(describe_js(&e)))
}

pub async fn set_storage(key: &str, value: JsValue) -> Result<()> {
    set_storage_js(key, value)
        .await
        .map_err(|e| Error::Storage(describe_js(&e)))
}

/// URL of the active tab, if the tabs API is reachable and the tab has one
pub async fn active_tab_url() -> Result<Option<String>> {
    let value = get_active_tab_url_js()
        .await
        .map_err(|e| Error::Bridge(describe_js(&e)))?;
    Ok(value.as_string())
}

/// Absolute URL of a page packaged with the extension
pub fn extension_url(path: &str) -> Result<String> {
    extension_url_js(path).map_err(|e| Error::Bridge(describe_js(&e)))
}
