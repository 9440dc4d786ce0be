/// Card editor shown inside the overlay iframe

use std::rc::Rc;

use gloo::events::EventListener;
use patternfly_yew::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement, MessageEvent};
use yew::prelude::*;

use crate::api::ApiClient;
use crate::bridge;
use crate::card::{Board, NewCard};
use crate::config::FALLBACK_PAGE_URL;
use crate::domain::extract_domain;
use crate::error::Result;
use crate::messaging::{post_to_parent, FrameMessage};
use crate::operations::{default_board, CardDraft};
use crate::storage;
use crate::ui::components::ImageFullscreen;

pub enum DraftAction {
    SetText(String),
    SetNote(String),
    SetUrl(String),
    AddTag(String),
    RemoveTag(String),
    AddImage(String),
    RemoveImage(String),
    ChooseBoard(String),
    /// Preselect a board unless the user already picked one
    OfferBoard(String),
}

impl Reducible for CardDraft {
    type Action = DraftAction;

    fn reduce(self: Rc<Self>, action: DraftAction) -> Rc<Self> {
        let mut draft = (*self).clone();
        let changed = match action {
            DraftAction::SetText(text) => {
                draft.text = text;
                true
            }
            DraftAction::SetNote(note) => {
                draft.note = note;
                true
            }
            DraftAction::SetUrl(url) => {
                draft.url = url;
                true
            }
            DraftAction::AddTag(name) => draft.add_tag(&name),
            DraftAction::RemoveTag(id) => draft.remove_tag(&id),
            DraftAction::AddImage(src) => draft.add_image(&src),
            DraftAction::RemoveImage(src) => draft.remove_image(&src),
            DraftAction::ChooseBoard(name) => draft.choose_board(&name),
            DraftAction::OfferBoard(name) => draft.board_name.is_empty() && draft.choose_board(&name),
        };
        if changed { Rc::new(draft) } else { self }
    }
}

#[derive(Clone, PartialEq)]
enum BoardsState {
    Loading,
    Ready(Vec<Board>),
    Error(String),
}

#[function_component(EditorApp)]
pub fn editor_app() -> Html {
    let draft = use_reducer(CardDraft::default);
    let api = use_memo((), |_| ApiClient::default());
    let boards = use_state(|| BoardsState::Loading);
    let sending = use_state(|| false);
    let is_adding_tag = use_state(|| false);
    let new_tag_name = use_state(String::new);
    let is_image_dialog_open = use_state(|| false);
    let image_input = use_state(String::new);
    let fullscreen = use_state(|| None::<usize>);
    let is_board_menu_open = use_state(|| false);
    let custom_board = use_state(String::new);

    // Source URL, stored selection and board list on mount
    {
        let draft = draft.clone();
        let boards = boards.clone();
        let api = api.clone();
        use_effect_with((), move |_| {
            let dispatcher = draft.dispatcher();
            spawn_local(async move {
                let url = match bridge::active_tab_url().await {
                    Ok(Some(url)) => url,
                    Ok(None) => FALLBACK_PAGE_URL.to_string(),
                    Err(e) => {
                        log::info!("Cannot get current URL: {}", e);
                        FALLBACK_PAGE_URL.to_string()
                    }
                };
                dispatcher.dispatch(DraftAction::SetUrl(url));
            });

            let dispatcher = draft.dispatcher();
            spawn_local(async move {
                match storage::load_selected_text().await {
                    Ok(Some(text)) => {
                        log::debug!("Text retrieved from storage");
                        dispatcher.dispatch(DraftAction::SetText(text));
                    }
                    Ok(None) => {}
                    Err(e) => log::info!("Storage not available: {}", e),
                }
            });

            let dispatcher = draft.dispatcher();
            spawn_local(async move {
                match api.fetch_boards().await {
                    Ok(list) => {
                        if let Some(first) = default_board(&list) {
                            dispatcher.dispatch(DraftAction::OfferBoard(first));
                        }
                        boards.set(BoardsState::Ready(list));
                    }
                    Err(e) => {
                        log::error!("Failed to load boards: {}", e);
                        boards.set(BoardsState::Error(e.to_string()));
                    }
                }
            });
            || ()
        });
    }

    // Text delivered by the content script
    {
        let dispatcher = draft.dispatcher();
        use_effect_with((), move |_| {
            let listener = web_sys::window().map(|window| {
                EventListener::new(&window, "message", move |event| {
                    let Some(event) = event.dyn_ref::<MessageEvent>() else {
                        return;
                    };
                    let text = FrameMessage::from_js(&event.data())
                        .and_then(|msg| msg.selected_text().map(str::to_string));
                    if let Some(text) = text {
                        log::debug!("Text received from host page");
                        dispatcher.dispatch(DraftAction::SetText(text));
                    }
                })
            });
            move || drop(listener)
        });
    }

    let on_note_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlTextAreaElement>() {
                draft.dispatch(DraftAction::SetNote(input.value()));
            }
        })
    };

    let on_toggle_tag = {
        let is_adding_tag = is_adding_tag.clone();
        Callback::from(move |_| is_adding_tag.set(!*is_adding_tag))
    };

    let on_tag_input = {
        let new_tag_name = new_tag_name.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_tag_name.set(input.value());
            }
        })
    };

    let on_add_tag = {
        let draft = draft.clone();
        let new_tag_name = new_tag_name.clone();
        let is_adding_tag = is_adding_tag.clone();
        Callback::from(move |_| {
            if new_tag_name.trim().is_empty() {
                return;
            }
            draft.dispatch(DraftAction::AddTag((*new_tag_name).clone()));
            new_tag_name.set(String::new());
            is_adding_tag.set(false);
        })
    };

    let on_remove_tag = {
        let draft = draft.clone();
        Callback::from(move |tag_id: String| draft.dispatch(DraftAction::RemoveTag(tag_id)))
    };

    let on_toggle_image_dialog = {
        let is_image_dialog_open = is_image_dialog_open.clone();
        Callback::from(move |_| is_image_dialog_open.set(!*is_image_dialog_open))
    };

    let on_image_input = {
        let image_input = image_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                image_input.set(input.value());
            }
        })
    };

    let on_add_image = {
        let draft = draft.clone();
        let image_input = image_input.clone();
        let is_image_dialog_open = is_image_dialog_open.clone();
        Callback::from(move |_| {
            if image_input.trim().is_empty() {
                return;
            }
            draft.dispatch(DraftAction::AddImage((*image_input).clone()));
            image_input.set(String::new());
            is_image_dialog_open.set(false);
        })
    };

    let on_remove_image = {
        let draft = draft.clone();
        Callback::from(move |src: String| draft.dispatch(DraftAction::RemoveImage(src)))
    };

    let on_open_fullscreen = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |index: usize| fullscreen.set(Some(index)))
    };

    let on_close_fullscreen = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |_| fullscreen.set(None))
    };

    let on_navigate_fullscreen = {
        let fullscreen = fullscreen.clone();
        Callback::from(move |index: usize| fullscreen.set(Some(index)))
    };

    let on_toggle_board_menu = {
        let is_board_menu_open = is_board_menu_open.clone();
        Callback::from(move |_| is_board_menu_open.set(!*is_board_menu_open))
    };

    let on_choose_board = {
        let draft = draft.clone();
        let is_board_menu_open = is_board_menu_open.clone();
        Callback::from(move |name: String| {
            draft.dispatch(DraftAction::ChooseBoard(name));
            is_board_menu_open.set(false);
        })
    };

    let on_custom_board_input = {
        let custom_board = custom_board.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                custom_board.set(input.value());
            }
        })
    };

    let use_custom_board = {
        let custom_board = custom_board.clone();
        let on_choose_board = on_choose_board.clone();
        Callback::from(move |_: ()| {
            if custom_board.trim().is_empty() {
                return;
            }
            on_choose_board.emit((*custom_board).clone());
            custom_board.set(String::new());
        })
    };

    let on_custom_board_key = {
        let use_custom_board = use_custom_board.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                use_custom_board.emit(());
            }
        })
    };

    let on_save = {
        let draft = draft.clone();
        let api = api.clone();
        let sending = sending.clone();
        Callback::from(move |_| {
            if !draft.can_send(*sending) {
                return;
            }
            sending.set(true);

            let date = String::from(js_sys::Date::new_0().to_iso_string());
            let card = draft.to_new_card(date);
            let api = api.clone();
            let sending = sending.clone();

            spawn_local(async move {
                let _ = submit(&api, &card, move || {
                    sending.set(false);
                    close_modal();
                })
                .await;
            });
        })
    };

    let on_cancel = Callback::from(|_| close_modal());

    let is_sending = *sending;
    let source_label = extract_domain(&draft.url).unwrap_or_else(|| FALLBACK_PAGE_URL.to_string());
    let board_label = match (&*boards, draft.board_name.is_empty()) {
        (BoardsState::Loading, true) => "Loading...".to_string(),
        (_, true) => "Choose a board".to_string(),
        (_, false) => draft.board_name.clone(),
    };

    html! {
        <div class="editor-card">
            <div class="editor-header">
                <Button variant={ButtonVariant::Plain} onclick={on_cancel}>{"✕"}</Button>
            </div>

            <div class="editor-content">
                <div class="editor-quote">
                    <div class="editor-quote-bar"></div>
                    <p class="editor-quote-text">{&draft.text}</p>
                </div>

                <textarea
                    class="note-textarea"
                    placeholder="Write your note here..."
                    value={draft.note.clone()}
                    oninput={on_note_input}
                />

                <div class="editor-tags">
                    {for draft.tags.iter().map(|tag| {
                        let tag_id = tag.id.clone();
                        html! {
                            <span key={tag.id.clone()} class="tag-badge">
                                {&tag.name}
                                <button
                                    class="tag-remove"
                                    onclick={on_remove_tag.reform(move |_| tag_id.clone())}
                                >
                                    {"✕"}
                                </button>
                            </span>
                        }
                    })}
                    if *is_adding_tag {
                        <div class="tag-input-row">
                            <input
                                type="text"
                                placeholder="Tag name"
                                value={(*new_tag_name).clone()}
                                oninput={on_tag_input}
                                class="tag-input"
                            />
                            <Button onclick={on_add_tag}>{"+"}</Button>
                        </div>
                    }
                </div>

                <Button variant={ButtonVariant::Secondary} block={true} onclick={on_toggle_image_dialog}>
                    {"🖼️ Add an image"}
                </Button>
                if *is_image_dialog_open {
                    <div class="image-dialog">
                        <p class="image-dialog-hint">{"Paste the URL of an image"}</p>
                        <input
                            type="text"
                            placeholder="Image URL"
                            value={(*image_input).clone()}
                            oninput={on_image_input}
                            class="image-input"
                        />
                        <Button
                            onclick={on_add_image}
                            disabled={is_sending || image_input.trim().is_empty()}
                        >
                            {"Add"}
                        </Button>
                    </div>
                }

                if !draft.images.is_empty() {
                    <div class="image-previews">
                        {for draft.images.iter().enumerate().map(|(index, src)| {
                            let remove_src = src.clone();
                            html! {
                                <div key={src.clone()} class="image-preview">
                                    <img
                                        src={src.clone()}
                                        alt="Added image"
                                        onclick={on_open_fullscreen.reform(move |_| index)}
                                    />
                                    <button
                                        class="image-remove"
                                        onclick={on_remove_image.reform(move |_| remove_src.clone())}
                                    >
                                        {"✕"}
                                    </button>
                                </div>
                            }
                        })}
                    </div>
                }
            </div>

            <div class="editor-footer">
                <div class="editor-footer-left">
                    <span class="source-chip">{format!("🔗 {}", source_label)}</span>
                    <Button variant={ButtonVariant::Secondary} onclick={on_toggle_tag}>{"+ Tag"}</Button>
                </div>
                <div class="editor-footer-right">
                    <div class="board-menu">
                        <Button variant={ButtonVariant::Secondary} onclick={on_toggle_board_menu}>
                            {board_label}
                        </Button>
                        if *is_board_menu_open {
                            <div class="board-menu-list">
                                <p class="board-menu-label">{"Choose a board"}</p>
                                {match &*boards {
                                    BoardsState::Loading => html! { <p class="board-menu-item">{"Loading..."}</p> },
                                    BoardsState::Error(err) => html! { <p class="board-menu-item board-menu-error">{err}</p> },
                                    BoardsState::Ready(list) => html! {
                                        {for list.iter().map(|board| {
                                            let name = board.name.clone();
                                            html! {
                                                <button
                                                    key={board.id.clone()}
                                                    class="board-menu-item"
                                                    onclick={on_choose_board.reform(move |_| name.clone())}
                                                >
                                                    {&board.name}
                                                </button>
                                            }
                                        })}
                                    },
                                }}
                                <div class="board-menu-custom">
                                    <input
                                        type="text"
                                        placeholder="Custom name..."
                                        value={(*custom_board).clone()}
                                        oninput={on_custom_board_input}
                                        onkeydown={on_custom_board_key}
                                    />
                                    <Button
                                        onclick={use_custom_board.reform(|_| ())}
                                        disabled={custom_board.trim().is_empty()}
                                    >
                                        {"Use this name"}
                                    </Button>
                                </div>
                            </div>
                        }
                    </div>
                    <Button
                        variant={ButtonVariant::Primary}
                        onclick={on_save}
                        disabled={!draft.can_send(is_sending)}
                    >
                        if is_sending {
                            <Spinner />
                        } else {
                            {"➤ Send"}
                        }
                    </Button>
                </div>
            </div>

            if let Some(index) = *fullscreen {
                <ImageFullscreen
                    images={draft.images.clone()}
                    {index}
                    on_close={on_close_fullscreen}
                    on_navigate={on_navigate_fullscreen}
                />
            }
        </div>
    }
}

/// Store the card locally, post it, then run `close` whatever the outcome.
/// Returns the result of the API call, which has already been logged.
pub(crate) async fn submit(api: &ApiClient, card: &NewCard, close: impl FnOnce()) -> Result<()> {
    if let Err(e) = storage::save_item(card).await {
        log::warn!("Item not saved locally: {}", e);
    }
    let sent = api.create_card(card).await;
    match &sent {
        Ok(()) => log::info!("Sent to API successfully"),
        Err(e) => log::error!("API request failed: {}", e),
    }
    close();
    sent
}

/// Ask the host page to remove the overlay. Failures are logged only.
fn close_modal() {
    if let Err(e) = post_to_parent(&FrameMessage::CloseModal) {
        log::error!("Failed to close the overlay: {}", e);
    }
}
