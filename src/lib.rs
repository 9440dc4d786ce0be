/// Panoramix - capture text from any page onto an infinite card board
/// Built with Rust + WASM + Yew

pub mod api;
mod bridge;
pub mod capture;
pub mod card;
pub mod config;
pub mod domain;
pub mod error;
pub mod layout;
pub mod messaging;
pub mod operations;
mod storage;
pub mod ui;
pub mod viewport;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Domain shown on a card chip, or an empty string for unparseable URLs
#[wasm_bindgen]
pub fn extract_domain(url: &str) -> String {
    domain::extract_domain(url).unwrap_or_default()
}

// Start the board web app
#[wasm_bindgen]
pub fn start_board() {
    yew::Renderer::<ui::board::BoardApp>::new().render();
}

// Start the card editor inside the overlay iframe
#[wasm_bindgen]
pub fn start_editor() {
    yew::Renderer::<ui::editor::EditorApp>::new().render();
}

// Attach the selection tooltip and capture shortcut to the host page
#[wasm_bindgen]
pub fn start_content_script() {
    if let Err(e) = capture::content_script::install() {
        log::error!("Failed to install capture tooltip: {}", e);
    }
}
