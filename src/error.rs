/// Error type shared by the API client, storage bridge and capture flow
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error! Status: {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("extension bridge failed: {0}")]
    Bridge(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<gloo_net::Error> for Error {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(e) => Error::Decode(e.to_string()),
            other => Error::Network(other.to_string()),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

/// Render a `JsValue` thrown across the bridge as text
pub(crate) fn describe_js(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
