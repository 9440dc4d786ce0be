/// Selection tooltip injected into host pages
///
/// Shows a small save/cancel bar under the current text selection. Saving
/// stores the text and opens the card editor in a full-page iframe; the
/// editor closes itself by posting `CLOSE_MODAL` back to this page.
use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlElement, HtmlIFrameElement, KeyboardEvent, MessageEvent, Node, Window};

use super::tooltip::{is_capture_shortcut, normalize_selection, place_tooltip, TooltipAction, TooltipState};
use crate::bridge;
use crate::error::{describe_js, Error, Result};
use crate::messaging::{self, FrameMessage};
use crate::storage;
use crate::viewport::Vec2;

pub const OVERLAY_ID: &str = "custom-modal-overlay";
const EDITOR_PAGE: &str = "index.html";

const TOOLTIP_STYLE: &str = "position: absolute; display: none; background-color: white; \
    border-radius: 8px; box-shadow: 0 3px 14px rgba(0, 0, 0, 0.2); padding: 10px; \
    z-index: 2147483647; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
    font-size: 14px; gap: 12px; align-items: center; transition: all 0.15s ease; \
    border: 1px solid #eaeaea; opacity: 0; transform: translateY(8px);";

const OVERLAY_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100vw; height: 100vh; \
    border: none; background: rgba(0,0,0,0.5); z-index: 2147483647;";

const NOTICE_STYLE: &str = "position: fixed; bottom: 20px; right: 20px; \
    background-color: rgba(0, 128, 0, 0.8); color: white; padding: 12px; border-radius: 5px; \
    z-index: 2147483646; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
    transition: opacity 0.5s ease;";

const STORE_FAILED_NOTICE: &str = "Could not save the selection. Reload the page if the editor stays empty.";
const OVERLAY_FAILED_NOTICE: &str = "Extension context invalidated. Reload the page.";

const NOTICE_VISIBLE_MS: u32 = 3_000;
const NOTICE_FADE_MS: u32 = 500;
const SHOW_DELAY_MS: u32 = 10;
const HIDE_DELAY_MS: u32 = 200;

thread_local! {
    static INSTALLED: RefCell<Option<Rc<SelectionTooltip>>> = const { RefCell::new(None) };
}

/// Install the tooltip and page listeners once per page
pub fn install() -> Result<()> {
    if INSTALLED.with(|slot| slot.borrow().is_some()) {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| Error::Bridge("no window".to_string()))?;
    let tooltip = SelectionTooltip::new(window)?;
    tooltip.install_listeners();
    INSTALLED.with(|slot| *slot.borrow_mut() = Some(tooltip));
    log::info!("Selection capture active. Select text to see the tooltip, or press Ctrl+B.");
    Ok(())
}

struct SelectionTooltip {
    window: Window,
    document: Document,
    root: HtmlElement,
    state: RefCell<TooltipState>,
    transition: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
    /// Load/error listeners of the open overlay, dropped with it
    overlay_listeners: RefCell<Vec<EventListener>>,
}

impl SelectionTooltip {
    fn new(window: Window) -> Result<Rc<Self>> {
        let document = window
            .document()
            .ok_or_else(|| Error::Bridge("no document".to_string()))?;
        let root = create_html(&document, "div")?;
        root.set_class_name("selection-tooltip");
        root.style().set_css_text(TOOLTIP_STYLE);

        let body = document
            .body()
            .ok_or_else(|| Error::Bridge("no body".to_string()))?;
        body.append_child(&root).map_err(js_err)?;

        Ok(Rc::new(SelectionTooltip {
            window,
            document,
            root,
            state: RefCell::new(TooltipState::default()),
            transition: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            overlay_listeners: RefCell::new(Vec::new()),
        }))
    }

    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();

        for action in TooltipAction::ALL {
            match self.create_button(action) {
                Ok(button) => {
                    let view = Rc::clone(self);
                    listeners.push(EventListener::new(&button, "click", move |event: &Event| {
                        event.prevent_default();
                        event.stop_propagation();
                        view.handle_action(action);
                    }));
                }
                Err(e) => log::error!("Failed to create tooltip button: {}", e),
            }
        }

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.document, "click", move |event: &Event| {
            let inside = event
                .target()
                .and_then(|t| t.dyn_into::<Node>().ok())
                .is_some_and(|node| view.root.contains(Some(&node)));
            let hide = view.state.borrow_mut().on_click(inside);
            if hide {
                view.hide_visual();
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.document, "selectionchange", move |_| {
            let text = view.selection_text();
            let hide = view.state.borrow_mut().on_selection_change(&text);
            if hide {
                view.hide_visual();
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.document, "mouseup", move |event: &Event| {
            let raw = view.selection_text();
            let shown = view.state.borrow_mut().on_mouse_up(&raw);
            if shown.is_some() {
                if let Some(anchor) = view.selection_anchor() {
                    view.show_visual(anchor);
                }
                event.stop_propagation();
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "keydown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if !is_capture_shortcut(&event.key(), event.ctrl_key(), event.meta_key()) {
                return;
            }
            event.prevent_default();
            let Some(text) = normalize_selection(&view.selection_text()) else {
                return;
            };
            if view.document.get_element_by_id(OVERLAY_ID).is_some() {
                return;
            }
            view.capture(text);
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "message", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MessageEvent>() else {
                return;
            };
            if FrameMessage::from_js(&event.data()) == Some(FrameMessage::CloseModal) {
                view.close_overlay();
            }
        }));

        self.listeners.borrow_mut().extend(listeners);
    }

    fn create_button(&self, action: TooltipAction) -> Result<HtmlElement> {
        let button = create_html(&self.document, "button")?;
        button.set_class_name("tooltip-action");
        button
            .set_attribute("data-action", action.as_str())
            .map_err(js_err)?;
        let (background, border, color) = match action {
            TooltipAction::Save => ("#f0f9ff", "#bae6fd", "#0284c7"),
            TooltipAction::Cancel => ("#fff5f5", "#fecaca", "#ef4444"),
        };
        button.style().set_css_text(&format!(
            "background-color: {background}; border: 1px solid {border}; color: {color}; \
             cursor: pointer; display: flex; flex-direction: column; align-items: center; \
             gap: 4px; padding: 8px 16px; border-radius: 6px; transition: all 0.2s ease;"
        ));
        button.set_inner_html(&format!(
            "<span style=\"font-size: 20px;\">{}</span><span style=\"font-size: 12px;\">{}</span>",
            action.icon(),
            action.label()
        ));
        self.root.append_child(&button).map_err(js_err)?;
        Ok(button)
    }

    fn handle_action(self: &Rc<Self>, action: TooltipAction) {
        let captured = self.state.borrow_mut().on_action(action);
        match (action, captured) {
            (TooltipAction::Save, Some(text)) => {
                self.hide_visual();
                self.capture(text);
            }
            (TooltipAction::Save, None) => log::warn!("Save pressed with no selected text"),
            (TooltipAction::Cancel, _) => self.hide_visual(),
        }
    }

    /// Store the text, then open the editor overlay with it
    fn capture(self: &Rc<Self>, text: String) {
        let view = Rc::clone(self);
        spawn_local(async move {
            let stored = storage::save_selected_text(&text).await;
            if let Err(e) = &stored {
                log::warn!("Selection not stored: {}", e);
            }
            if let Some(message) = store_notice(&stored) {
                show_notice(&view.document, message);
            }
            // The overlay still gets the text by message, so open it anyway
            if let Err(e) = view.open_overlay(&text) {
                log::error!("Failed to open editor overlay: {}", e);
                show_notice(&view.document, OVERLAY_FAILED_NOTICE);
            }
        });
    }

    fn open_overlay(&self, text: &str) -> Result<()> {
        let src = bridge::extension_url(EDITOR_PAGE)?;
        self.mount_overlay(&src, text)
    }

    /// Replace any open overlay with an iframe on `src` that receives `text`
    /// once loaded
    fn mount_overlay(&self, src: &str, text: &str) -> Result<()> {
        self.close_overlay();

        let overlay: HtmlIFrameElement = self
            .document
            .create_element("iframe")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| Error::Bridge("iframe element has unexpected type".to_string()))?;
        overlay.set_src(src);
        overlay.set_id(OVERLAY_ID);
        overlay.style().set_css_text(OVERLAY_STYLE);

        let message = FrameMessage::FromContentScript {
            text: text.to_string(),
        };
        let frame = overlay.clone();
        let document = self.document.clone();
        let on_load = EventListener::once(&overlay, "load", move |_| {
            let sent = frame
                .content_window()
                .ok_or_else(|| Error::Bridge("overlay has no window".to_string()))
                .and_then(|target| messaging::post(&target, &message));
            if let Err(e) = sent {
                log::error!("Error sending text to editor: {}", e);
                show_notice(&document, "Could not send the text to the editor.");
            }
        });

        let document = self.document.clone();
        let on_error = EventListener::once(&overlay, "error", move |_| {
            log::error!("Error loading editor overlay");
            show_notice(&document, "Error while loading the editor.");
        });
        self.overlay_listeners.borrow_mut().extend([on_load, on_error]);

        let body = self
            .document
            .body()
            .ok_or_else(|| Error::Bridge("no body".to_string()))?;
        body.append_child(&overlay).map_err(js_err)?;
        Ok(())
    }

    fn close_overlay(&self) {
        self.overlay_listeners.borrow_mut().clear();
        if let Some(existing) = self.document.get_element_by_id(OVERLAY_ID) {
            existing.remove();
        }
    }

    fn selection_text(&self) -> String {
        self.window
            .get_selection()
            .ok()
            .flatten()
            .map(|selection| String::from(selection.to_string()))
            .unwrap_or_default()
    }

    /// Horizontal center and bottom of the selection, in page coordinates
    fn selection_anchor(&self) -> Option<Vec2> {
        let selection = self.window.get_selection().ok().flatten()?;
        if selection.range_count() == 0 {
            return None;
        }
        let rect = selection.get_range_at(0).ok()?.get_bounding_client_rect();
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        Some(Vec2::new(
            (rect.left() + rect.right()) / 2.0,
            rect.bottom() + scroll_y,
        ))
    }

    fn window_size(&self) -> Vec2 {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Vec2::new(width.unwrap_or(f64::MAX), height.unwrap_or(f64::MAX))
    }

    fn show_visual(&self, anchor: Vec2) {
        let style = self.root.style();
        let _ = style.set_property("display", "flex");

        let rect = self.root.get_bounding_client_rect();
        let position = place_tooltip(
            anchor,
            Vec2::new(rect.width(), rect.height()),
            self.window_size(),
        );
        let _ = style.set_property("left", &format!("{}px", position.x));
        let _ = style.set_property("top", &format!("{}px", position.y));

        let root = self.root.clone();
        *self.transition.borrow_mut() = Some(Timeout::new(SHOW_DELAY_MS, move || {
            let style = root.style();
            let _ = style.set_property("opacity", "1");
            let _ = style.set_property("transform", "translateY(0)");
        }));
    }

    fn hide_visual(&self) {
        self.state.borrow_mut().hide();
        let style = self.root.style();
        let _ = style.set_property("opacity", "0");
        let _ = style.set_property("transform", "translateY(8px)");

        let root = self.root.clone();
        *self.transition.borrow_mut() = Some(Timeout::new(HIDE_DELAY_MS, move || {
            let _ = root.style().set_property("display", "none");
        }));
    }
}

/// Transient notice in the bottom-right corner of the page
pub fn show_notice(document: &Document, message: &str) {
    let Ok(notice) = create_html(document, "div") else {
        return;
    };
    notice.set_text_content(Some(message));
    notice.style().set_css_text(NOTICE_STYLE);
    let Some(body) = document.body() else {
        return;
    };
    if body.append_child(&notice).is_err() {
        return;
    }

    Timeout::new(NOTICE_VISIBLE_MS, move || {
        let _ = notice.style().set_property("opacity", "0");
        Timeout::new(NOTICE_FADE_MS, move || notice.remove()).forget();
    })
    .forget();
}

/// Notice to show after trying to store the selection, if any
fn store_notice(stored: &Result<()>) -> Option<&'static str> {
    stored.as_ref().err().map(|_| STORE_FAILED_NOTICE)
}

fn create_html(document: &Document, tag: &str) -> Result<HtmlElement> {
    document
        .create_element(tag)
        .map_err(js_err)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| Error::Bridge(format!("<{tag}> is not an HTML element")))
}

fn js_err(value: wasm_bindgen::JsValue) -> Error {
    Error::Bridge(describe_js(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_shows_notice() {
        let failed: Result<()> = Err(Error::Storage("localStorage unavailable".to_string()));
        assert_eq!(store_notice(&failed), Some(STORE_FAILED_NOTICE));
    }

    #[test]
    fn test_store_success_is_silent() {
        assert_eq!(store_notice(&Ok(())), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_show_notice_appends_to_body() {
        let document = web_sys::window().and_then(|w| w.document()).unwrap();
        show_notice(&document, STORE_FAILED_NOTICE);
        let text = document.body().unwrap().text_content().unwrap_or_default();
        assert!(text.contains(STORE_FAILED_NOTICE));
    }

    #[wasm_bindgen_test]
    fn test_overlay_listeners_released_on_close() {
        let window = web_sys::window().unwrap();
        let tooltip = SelectionTooltip::new(window).unwrap();

        tooltip.mount_overlay("about:blank", "first").unwrap();
        tooltip.mount_overlay("about:blank", "second").unwrap();
        assert_eq!(tooltip.overlay_listeners.borrow().len(), 2);
        assert!(tooltip.document.get_element_by_id(OVERLAY_ID).is_some());

        tooltip.close_overlay();
        assert!(tooltip.overlay_listeners.borrow().is_empty());
        assert!(tooltip.document.get_element_by_id(OVERLAY_ID).is_none());
    }
}
