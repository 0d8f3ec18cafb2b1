//! Leptos DragDrop Utilities
//!
//! Mouse-event drag-and-drop for Leptos. Draggables and droppables are
//! addressed by namespaced string ids (`card:<id>`, `list:<id>`) carried in
//! a `data-dnd-id` attribute. A press only becomes a drag once the pointer
//! travels past the activation threshold; shorter gestures stay clicks.

use kanban_core::domain::Board;
use kanban_core::drag::{
    order_candidates, resolve_collision, CollisionStrategy, DragActivation, DropCandidate, Point,
    Rect, CARD_PREFIX,
};
use leptos::prelude::*;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Attribute holding the namespaced id of a droppable element
pub const DND_ATTR: &str = "data-dnd-id";

/// Everything known when the pointer is released over the board
#[derive(Clone, Debug, PartialEq)]
pub struct DropInfo {
    pub subject_id: String,
    /// Last element the pointer entered, if still hovered
    pub over_id: Option<String>,
    pub pointer: Point,
    pub candidates: Vec<DropCandidate>,
}

impl DropInfo {
    /// Pick the drop target: the closest candidate under the pointer,
    /// falling back to the hovered element. Cards sit inside their list's
    /// rect, so a card under the pointer always beats the list around it.
    pub fn target(&self, board: &Board, strategy: CollisionStrategy) -> Option<String> {
        let mut under: Vec<DropCandidate> = self
            .candidates
            .iter()
            .filter(|c| c.dom_id != self.subject_id && c.rect.contains(&self.pointer))
            .cloned()
            .collect();
        let is_card = |c: &DropCandidate| c.dom_id.starts_with(CARD_PREFIX);
        if under.iter().any(is_card) {
            under.retain(is_card);
        }
        order_candidates(board, &mut under);
        resolve_collision(&self.pointer, &under, strategy)
            .map(|c| c.dom_id.clone())
            .or_else(|| self.over_id.clone())
    }
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_id_read: ReadSignal<Option<String>>,
    pub dragging_id_write: WriteSignal<Option<String>>,
    pub over_id_read: ReadSignal<Option<String>>,
    pub over_id_write: WriteSignal<Option<String>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pressed element (mousedown but not yet dragging)
    pub pending_id_read: ReadSignal<Option<String>>,
    pub pending_id_write: WriteSignal<Option<String>>,
    /// Press position for movement detection
    pub start_read: ReadSignal<Point>,
    pub start_write: WriteSignal<Point>,
    /// Latest pointer position while dragging
    pub pointer_read: ReadSignal<Point>,
    pub pointer_write: WriteSignal<Point>,
}

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_id_read, dragging_id_write) = signal(None::<String>);
    let (over_id_read, over_id_write) = signal(None::<String>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<String>);
    let (start_read, start_write) = signal(Point::default());
    let (pointer_read, pointer_write) = signal(Point::default());
    DndSignals {
        dragging_id_read,
        dragging_id_write,
        over_id_read,
        over_id_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_read,
        start_write,
        pointer_read,
        pointer_write,
    }
}

impl DndSignals {
    pub fn is_dragging(&self, dom_id: &str) -> bool {
        self.dragging_id_read.with(|id| id.as_deref() == Some(dom_id))
    }

    pub fn is_over(&self, dom_id: &str) -> bool {
        self.over_id_read.with(|id| id.as_deref() == Some(dom_id))
    }
}

fn client_point(ev: &web_sys::MouseEvent) -> Point {
    Point::new(f64::from(ev.client_x()), f64::from(ev.client_y()))
}

/// End drag operation. The click that follows a mouseup is swallowed for a
/// short moment via `drag_just_ended`.
pub fn end_drag(dnd: &DndSignals) {
    let was_dragging = dnd.dragging_id_read.get_untracked().is_some();
    dnd.dragging_id_write.set(None);
    dnd.over_id_write.set(None);
    dnd.pending_id_write.set(None);
    if !was_dragging {
        return;
    }
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Mousedown handler for draggable elements: records a pending drag
pub fn make_on_mousedown(dnd: DndSignals, dom_id: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Form controls keep their own mouse behaviour
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
            {
                return;
            }
        }
        // Nested draggables (card inside list): innermost wins
        ev.stop_propagation();
        dnd.pending_id_write.set(Some(dom_id.clone()));
        dnd.start_write.set(client_point(&ev));
    }
}

/// Mouseenter handler for droppable elements
pub fn make_on_mouseenter(dnd: DndSignals, dom_id: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        let Some(dragging) = dnd.dragging_id_read.get_untracked() else {
            return;
        };
        if dragging != dom_id {
            dnd.over_id_write.set(Some(dom_id.clone()));
        }
    }
}

/// Mouseleave handler: forget the hover target if it is this element
pub fn make_on_mouseleave(dnd: DndSignals, dom_id: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_id_read.get_untracked().is_some()
            && dnd.over_id_read.get_untracked().as_deref() == Some(dom_id.as_str())
        {
            dnd.over_id_write.set(None);
        }
    }
}

/// Client rects of every `[data-dnd-id]` element, in document order
pub fn collect_candidates() -> Vec<DropCandidate> {
    let Some(doc) = web_sys::window().and_then(|win| win.document()) else {
        return Vec::new();
    };
    let Ok(nodes) = doc.query_selector_all(&format!("[{}]", DND_ATTR)) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|idx| nodes.item(idx))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .filter_map(|el| {
            let dom_id = el.get_attribute(DND_ATTR)?;
            let rect = el.get_bounding_client_rect();
            Some(DropCandidate::new(
                dom_id,
                Rect::new(rect.left(), rect.top(), rect.width(), rect.height()),
            ))
        })
        .collect()
}

fn add_document_listener(event: &str, handler: &wasm_bindgen::JsValue) {
    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback(event, handler.unchecked_ref());
    }
}

/// Document mousemove: starts the drag once the pointer passed the threshold
pub fn bind_global_mousemove<S>(dnd: DndSignals, activation: DragActivation, on_start: S)
where
    S: Fn(&str) + 'static,
{
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let point = client_point(&ev);
        if dnd.dragging_id_read.get_untracked().is_some() {
            dnd.pointer_write.set(point);
            return;
        }
        let Some(pending) = dnd.pending_id_read.get_untracked() else {
            return;
        };
        if activation.is_drag(dnd.start_read.get_untracked(), point) {
            debug!(subject = %pending, "drag activated");
            dnd.pointer_write.set(point);
            dnd.dragging_id_write.set(Some(pending.clone()));
            on_start(&pending);
        }
    });
    add_document_listener("mousemove", on_mousemove.as_ref());
    on_mousemove.forget();
}

/// Bind document mouseup (drop) and Escape (cancel). Also binds mousemove.
///
/// `on_drop` runs for every released drag; `on_cancel` for Escape.
pub fn bind_global_drag_handlers<S, D, C>(
    dnd: DndSignals,
    activation: DragActivation,
    on_start: S,
    on_drop: D,
    on_cancel: C,
) where
    S: Fn(&str) + 'static,
    D: Fn(DropInfo) + 'static,
    C: Fn() + 'static,
{
    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_id_read.get_untracked();
        let over_id = dnd.over_id_read.get_untracked();
        // Plain click: nothing to drop, the click event fires on the element
        let Some(subject_id) = dragging else {
            dnd.pending_id_write.set(None);
            return;
        };
        let info = DropInfo {
            subject_id,
            over_id,
            pointer: client_point(&ev),
            candidates: collect_candidates(),
        };
        end_drag(&dnd);
        on_drop(info);
    });
    add_document_listener("mouseup", on_mouseup.as_ref());
    on_mouseup.forget();

    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && dnd.dragging_id_read.get_untracked().is_some() {
            end_drag(&dnd);
            on_cancel();
        }
    });
    add_document_listener("keydown", on_keydown.as_ref());
    on_keydown.forget();

    bind_global_mousemove(dnd, activation, on_start);
}
