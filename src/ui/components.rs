/// Reusable UI components

use gloo::events::EventListener;
use patternfly_yew::prelude::*;
use wasm_bindgen::JsCast;
use yew::prelude::*;

use crate::card::Card;
use crate::layout::CARD_WIDTH;
use crate::operations::{next_index, previous_index};
use crate::viewport::Vec2;

/// Maximum thumbnails shown under a card's main image
const MAX_THUMBNAILS: usize = 3;

#[derive(Properties, PartialEq)]
pub struct CardTileProps {
    pub card: Card,
    pub position: Vec2,
}

#[function_component(CardTile)]
pub fn card_tile(props: &CardTileProps) -> Html {
    let card = &props.card;
    let images = card.display_images();
    let domain = card.display_domain().unwrap_or_else(|| "title.com".to_string());
    let tags = card.tag_names().join(" - ");
    let title = card.title.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| "Title".to_string());

    let style = format!(
        "position: absolute; left: {}px; top: {}px; width: {}px;",
        props.position.x, props.position.y, CARD_WIDTH
    );

    html! {
        <div class="card-tile" {style}>
            if let Some(main) = images.first() {
                <div class="card-image">
                    <img src={main.clone()} alt="Card image" />
                    <span class="card-link-chip">{&domain}</span>
                    if !tags.is_empty() {
                        <p class="card-image-tags">{&tags}</p>
                    }
                </div>
                if images.len() > 1 {
                    <div class="card-thumbnails">
                        {for images.iter().take(MAX_THUMBNAILS).map(|src| html! {
                            <img class="card-thumbnail" src={src.clone()} />
                        })}
                        if images.len() > MAX_THUMBNAILS {
                            <span class="card-thumbnail-more">
                                {format!("+{}", images.len() - MAX_THUMBNAILS)}
                            </span>
                        }
                    </div>
                }
            } else if !tags.is_empty() {
                <p class="card-tags">{&tags}</p>
            }
            <div class="card-body">
                <h3 class="card-title">{title}</h3>
                <p class="card-text">{&card.text}</p>
                if let Some(note) = card.note.as_ref().filter(|n| !n.is_empty()) {
                    <p class="card-note">{note}</p>
                }
            </div>
            if images.is_empty() {
                <span class="card-link-chip">{&domain}</span>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct NoticeProps {
    pub message: String,
}

/// Inline error text inside the region that failed
#[function_component(Notice)]
pub fn notice(props: &NoticeProps) -> Html {
    html! {
        <Alert r#type={AlertType::Danger} title={props.message.clone()} inline={true}>
        </Alert>
    }
}

#[derive(Properties, PartialEq)]
pub struct ImageFullscreenProps {
    pub images: Vec<String>,
    pub index: usize,
    pub on_close: Callback<()>,
    pub on_navigate: Callback<usize>,
}

/// Full-window image viewer. Arrow keys move through the images, wrapping
/// at both ends; Escape closes.
#[function_component(ImageFullscreen)]
pub fn image_fullscreen(props: &ImageFullscreenProps) -> Html {
    let len = props.images.len();
    let index = props.index.min(len.saturating_sub(1));

    {
        let on_close = props.on_close.clone();
        let on_navigate = props.on_navigate.clone();
        use_effect_with((index, len), move |&(index, len)| {
            let listener = web_sys::window().map(|window| {
                EventListener::new(&window, "keydown", move |event| {
                    let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    match event.key().as_str() {
                        "Escape" => on_close.emit(()),
                        "ArrowLeft" if len > 1 => on_navigate.emit(previous_index(index, len)),
                        "ArrowRight" if len > 1 => on_navigate.emit(next_index(index, len)),
                        _ => {}
                    }
                })
            });
            move || drop(listener)
        });
    }

    let Some(current) = props.images.get(index) else {
        return html! {};
    };

    let on_backdrop = props.on_close.reform(|_: MouseEvent| ());
    let on_previous = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_navigate.emit(previous_index(index, len));
        })
    };
    let on_next = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_navigate.emit(next_index(index, len));
        })
    };

    html! {
        <div class="image-fullscreen" onclick={on_backdrop}>
            <div class="image-fullscreen-frame" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                <img class="image-fullscreen-img" src={current.clone()} alt="Fullscreen image" />
            </div>
            if len > 1 {
                <button class="image-fullscreen-prev" onclick={on_previous}>{"‹"}</button>
                <button class="image-fullscreen-next" onclick={on_next}>{"›"}</button>
                <span class="image-fullscreen-count">{format!("{} / {}", index + 1, len)}</span>
            }
        </div>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use wasm_bindgen_test::*;
    use web_sys::HtmlElement;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn click(root: &web_sys::Element, selector: &str) {
        root.query_selector(selector)
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap()
            .click();
    }

    #[wasm_bindgen_test]
    async fn test_fullscreen_image_click_keeps_viewer_open() {
        let document = web_sys::window().and_then(|w| w.document()).unwrap();
        let root = document.create_element("div").unwrap();
        document.body().unwrap().append_child(&root).unwrap();

        let closed = Rc::new(Cell::new(false));
        let flag = closed.clone();
        let props = ImageFullscreenProps {
            images: vec!["data:image/png;base64,AAAA".to_string()],
            index: 0,
            on_close: Callback::from(move |_| flag.set(true)),
            on_navigate: Callback::from(|_: usize| ()),
        };
        yew::Renderer::<ImageFullscreen>::with_root_and_props(root.clone(), props).render();
        yew::platform::time::sleep(Duration::from_millis(10)).await;

        click(&root, ".image-fullscreen-img");
        yew::platform::time::sleep(Duration::from_millis(10)).await;
        assert!(!closed.get());

        click(&root, ".image-fullscreen");
        yew::platform::time::sleep(Duration::from_millis(10)).await;
        assert!(closed.get());
    }
}
