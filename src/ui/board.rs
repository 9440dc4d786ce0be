/// Board web app: board selector HUD and the pannable, zoomable card canvas

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use patternfly_yew::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlSelectElement};
use yew::prelude::*;

use crate::api::ApiClient;
use crate::card::{Board, Card};
use crate::layout::HexLayout;
use crate::operations::{cards_or_placeholders, default_board};
use crate::ui::components::{CardTile, Notice};
use crate::viewport::{Frame, InertiaToken, Vec2, Viewport, WHEEL_SETTLE_MS};

/// Pixels per line when the wheel reports `DOM_DELTA_LINE`
const LINE_HEIGHT: f64 = 16.0;

/// Minimum size of the transformed content layer
const CONTENT_MIN_SIZE: f64 = 2000.0;

#[derive(Clone, PartialEq)]
enum BoardsState {
    Loading,
    Ready(Vec<Board>),
    Error(String),
}

#[function_component(BoardApp)]
pub fn board_app() -> Html {
    let api = use_memo((), |_| ApiClient::default());
    let boards = use_state(|| BoardsState::Loading);
    let selected = use_state(|| None::<String>);

    {
        let api = api.clone();
        let boards = boards.clone();
        let selected = selected.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api.fetch_boards().await {
                    Ok(list) => {
                        if let Some(first) = default_board(&list) {
                            selected.set(Some(first));
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

    let on_select = {
        let selected = selected.clone();
        Callback::from(move |name: String| selected.set(Some(name)))
    };

    html! {
        <div class="board-app">
            <BoardHud
                boards={(*boards).clone()}
                selected={(*selected).clone()}
                on_select={on_select}
            />
            <InfiniteBoard board_name={(*selected).clone()} />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct BoardHudProps {
    boards: BoardsState,
    selected: Option<String>,
    on_select: Callback<String>,
}

#[function_component(BoardHud)]
fn board_hud(props: &BoardHudProps) -> Html {
    let onchange = {
        let on_select = props.on_select.clone();
        Callback::from(move |e: Event| {
            let Some(select) = e.target_dyn_into::<HtmlSelectElement>() else {
                return;
            };
            let value = select.value();
            if !value.is_empty() {
                on_select.emit(value);
            }
        })
    };

    html! {
        <div class="board-hud">
            <span class="board-hud-brand">{"Panoramix"}</span>
            {match &props.boards {
                BoardsState::Loading => html! { <Spinner /> },
                BoardsState::Error(message) => html! {
                    <Notice message={format!("Boards unavailable: {}", message)} />
                },
                BoardsState::Ready(boards) => html! {
                    <select class="board-hud-select" {onchange}>
                        {for boards.iter().map(|board| {
                            let chosen = props.selected.as_deref() == Some(board.name.as_str());
                            html! {
                                <option key={board.id.clone()} value={board.name.clone()} selected={chosen}>
                                    {&board.name}
                                </option>
                            }
                        })}
                    </select>
                },
            }}
        </div>
    }
}

#[derive(Clone, PartialEq)]
enum CardsState {
    Idle,
    Loading,
    Loaded(Vec<Card>),
    Error(String),
}

#[derive(Properties, PartialEq)]
pub struct InfiniteBoardProps {
    #[prop_or_default]
    pub board_name: Option<String>,
}

/// Pending callbacks owned by the board. Dropping a handle cancels it.
#[derive(Default)]
struct Motion {
    frame: Option<AnimationFrame>,
    wheel_settle: Option<Timeout>,
}

impl Motion {
    fn stop(&mut self) {
        self.frame = None;
        self.wheel_settle = None;
    }
}

#[function_component(InfiniteBoard)]
pub fn infinite_board(props: &InfiniteBoardProps) -> Html {
    let api = use_memo((), |_| ApiClient::default());
    let cards = use_state(|| CardsState::Idle);
    let viewport = use_mut_ref(Viewport::default);
    let motion = use_mut_ref(Motion::default);
    let redraw = use_force_update();
    let node = use_node_ref();

    {
        let api = api.clone();
        let cards = cards.clone();
        use_effect_with(props.board_name.clone(), move |name| {
            match name.clone() {
                Some(name) => {
                    cards.set(CardsState::Loading);
                    spawn_local(async move {
                        match api.fetch_board(&name).await {
                            Ok(list) => cards.set(CardsState::Loaded(list)),
                            Err(e) => {
                                log::error!("Failed to load board {}: {}", name, e);
                                cards.set(CardsState::Error(e.to_string()));
                            }
                        }
                    });
                }
                None => cards.set(CardsState::Idle),
            }
            || ()
        });
    }

    // Wheel and pinch need preventDefault, so they bypass Yew's passive handlers
    {
        let node = node.clone();
        let viewport = viewport.clone();
        let motion = motion.clone();
        let redraw = redraw.clone();
        use_effect_with((), move |_| {
            let listeners = node
                .cast::<Element>()
                .map(|element| surface_listeners(&element, viewport, motion.clone(), redraw));
            move || {
                drop(listeners);
                motion.borrow_mut().stop();
            }
        });
    }

    let onmousedown = {
        let viewport = viewport.clone();
        let motion = motion.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: MouseEvent| {
            motion.borrow_mut().stop();
            viewport
                .borrow_mut()
                .pointer_down(client_point(&e), e.button() == 0);
            redraw.force_update();
        })
    };

    let onmousemove = {
        let viewport = viewport.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: MouseEvent| {
            if viewport.borrow_mut().drag_move(client_point(&e)) {
                redraw.force_update();
            }
        })
    };

    let release = {
        let viewport = viewport.clone();
        let motion = motion.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            let token = viewport.borrow_mut().end_drag();
            redraw.force_update();
            if let Some(token) = token {
                coast(viewport.clone(), motion.clone(), redraw.clone(), token);
            }
        })
    };

    let view = viewport.borrow().clone();
    let grid = view.grid();
    let surface_style = format!(
        "position: fixed; inset: 0; overflow: hidden; cursor: {}; user-select: none; \
         background-image: linear-gradient(to right, rgba(0, 0, 0, 0.06) 1px, transparent 1px), \
         linear-gradient(to bottom, rgba(0, 0, 0, 0.06) 1px, transparent 1px); \
         background-size: {size}px {size}px; background-position: {}px {}px;",
        if view.is_dragging() { "grabbing" } else { "grab" },
        grid.position.x,
        grid.position.y,
        size = grid.size,
    );
    let content_style = format!(
        "position: absolute; left: 50%; top: 50%; min-width: {min}px; min-height: {min}px; \
         transform: {}; transform-origin: center; transition: {};",
        view.transform(),
        if view.is_dragging() { "none" } else { "transform 0.15s cubic-bezier(0.4, 0, 0.2, 1)" },
        min = CONTENT_MIN_SIZE,
    );

    let layout = HexLayout::default();
    let (shown, status) = match &*cards {
        CardsState::Idle => (cards_or_placeholders(&[]), html! {}),
        CardsState::Loading => (Vec::new(), html! { <div class="board-status"><Spinner /></div> }),
        CardsState::Loaded(list) => (cards_or_placeholders(list), html! {}),
        CardsState::Error(message) => (
            Vec::new(),
            html! { <div class="board-status"><Notice message={message.clone()} /></div> },
        ),
    };
    let extent = layout.extent(shown.len());
    let cards_style = format!(
        "position: absolute; left: 50%; top: 50%; width: {}px; height: {}px; \
         transform: translate(-50%, -50%);",
        extent.x, extent.y
    );

    html! {
        <div
            ref={node}
            class="infinite-board"
            style={surface_style}
            {onmousedown}
            {onmousemove}
            onmouseup={release.clone()}
            onmouseleave={release}
        >
            {status}
            <div class="board-content" style={content_style}>
                <div class="board-cards" style={cards_style}>
                    {for shown.iter().enumerate().map(|(i, card)| html! {
                        <CardTile key={format!("{}-{}", i, card.id)} card={card.clone()} position={layout.position(i)} />
                    })}
                </div>
            </div>
        </div>
    }
}

fn client_point(e: &MouseEvent) -> Vec2 {
    Vec2::new(e.client_x() as f64, e.client_y() as f64)
}

/// Drive one decay loop, one step per display frame, until the viewport
/// reports it settled or the token went stale.
fn coast(
    viewport: Rc<RefCell<Viewport>>,
    motion: Rc<RefCell<Motion>>,
    redraw: UseForceUpdateHandle,
    token: InertiaToken,
) {
    let handle = {
        let motion = motion.clone();
        request_animation_frame(move |_| {
            let frame = viewport.borrow_mut().step_inertia(token);
            match frame {
                Frame::Continue => {
                    redraw.force_update();
                    coast(viewport, motion, redraw, token);
                }
                Frame::Settled => {
                    redraw.force_update();
                    motion.borrow_mut().frame = None;
                }
                Frame::Cancelled => {}
            }
        })
    };
    motion.borrow_mut().frame = Some(handle);
}

fn surface_listeners(
    element: &Element,
    viewport: Rc<RefCell<Viewport>>,
    motion: Rc<RefCell<Motion>>,
    redraw: UseForceUpdateHandle,
) -> Vec<EventListener> {
    let options = EventListenerOptions::enable_prevent_default();

    let wheel = {
        let target = element.clone();
        let viewport = viewport.clone();
        let motion = motion.clone();
        let redraw = redraw.clone();
        EventListener::new_with_options(element, "wheel", options, move |event| {
            let Some(event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            event.prevent_default();
            let rect = target.get_bounding_client_rect();
            let scale = match event.delta_mode() {
                WheelEvent::DOM_DELTA_LINE => LINE_HEIGHT,
                WheelEvent::DOM_DELTA_PAGE => rect.height(),
                _ => 1.0,
            };
            let delta = Vec2::new(event.delta_x(), event.delta_y()) * scale;

            if event.ctrl_key() || event.meta_key() {
                let cursor = Vec2::new(
                    event.client_x() as f64 - rect.left() - rect.width() / 2.0,
                    event.client_y() as f64 - rect.top() - rect.height() / 2.0,
                );
                motion.borrow_mut().stop();
                if viewport.borrow_mut().wheel_zoom(delta.y, cursor) {
                    redraw.force_update();
                }
                return;
            }

            if !viewport.borrow_mut().wheel_pan(delta) {
                return;
            }
            redraw.force_update();

            let settle = {
                let viewport = viewport.clone();
                let motion = motion.clone();
                let redraw = redraw.clone();
                Timeout::new(WHEEL_SETTLE_MS, move || {
                    let token = viewport.borrow_mut().wheel_settled();
                    if let Some(token) = token {
                        coast(viewport, motion, redraw, token);
                    }
                })
            };
            let mut motion = motion.borrow_mut();
            motion.frame = None;
            motion.wheel_settle = Some(settle);
        })
    };

    let gesture_start = {
        let viewport = viewport.clone();
        let motion = motion.clone();
        EventListener::new_with_options(element, "gesturestart", options, move |event| {
            event.prevent_default();
            motion.borrow_mut().stop();
            viewport.borrow_mut().gesture_start();
        })
    };

    let gesture_change = {
        let viewport = viewport.clone();
        EventListener::new_with_options(element, "gesturechange", options, move |event| {
            event.prevent_default();
            let factor = js_sys::Reflect::get(event, &"scale".into())
                .ok()
                .and_then(|value| value.as_f64());
            if let Some(factor) = factor {
                if viewport.borrow_mut().gesture_change(factor) {
                    redraw.force_update();
                }
            }
        })
    };

    let gesture_end = EventListener::new_with_options(element, "gestureend", options, move |event| {
        event.prevent_default();
        viewport.borrow_mut().gesture_end();
    });

    vec![wheel, gesture_start, gesture_change, gesture_end]
}
