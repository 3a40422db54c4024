use std::rc::Rc;

use camjigsaw_core::{normalize_touch, Point, PointerAction, TouchPhase};
use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, Touch, TouchEvent};

pub(crate) type Dispatch = Rc<dyn Fn(PointerAction)>;

fn canvas_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Point {
    let rect = canvas.get_bounding_client_rect();
    Point::new((client_x - rect.left()) as f32, (client_y - rect.top()) as f32)
}

fn touch_from_event(event: &TouchEvent) -> Option<Touch> {
    event.touches().item(0)
}

fn mouse_listener(
    canvas: &HtmlCanvasElement,
    event_type: &'static str,
    dispatch: &Dispatch,
    to_action: fn(Point) -> PointerAction,
) -> EventListener {
    let target = canvas.clone();
    let dispatch = Rc::clone(dispatch);
    EventListener::new(canvas, event_type, move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let at = canvas_point(&target, event.client_x() as f64, event.client_y() as f64);
        dispatch(to_action(at));
    })
}

fn touch_listener(
    canvas: &HtmlCanvasElement,
    event_type: &'static str,
    phase: TouchPhase,
    dispatch: &Dispatch,
) -> EventListener {
    let target = canvas.clone();
    let dispatch = Rc::clone(dispatch);
    EventListener::new_with_options(
        canvas,
        event_type,
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let Some(event) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            event.prevent_default();
            let first = touch_from_event(event).map(|touch| {
                canvas_point(&target, touch.client_x() as f64, touch.client_y() as f64)
            });
            if let Some(action) = normalize_touch(phase, first) {
                dispatch(action);
            }
        },
    )
}

/// Mouse and first-finger touch on the board canvas. Keep the returned
/// listeners alive for as long as input should flow.
pub(crate) fn install(canvas: &HtmlCanvasElement, dispatch: Dispatch) -> Vec<EventListener> {
    vec![
        mouse_listener(canvas, "mousedown", &dispatch, PointerAction::Down),
        mouse_listener(canvas, "mousemove", &dispatch, PointerAction::Move),
        mouse_listener(canvas, "mouseup", &dispatch, |_| PointerAction::Up),
        touch_listener(canvas, "touchstart", TouchPhase::Start, &dispatch),
        touch_listener(canvas, "touchmove", TouchPhase::Move, &dispatch),
        touch_listener(canvas, "touchend", TouchPhase::End, &dispatch),
        touch_listener(canvas, "touchcancel", TouchPhase::Cancel, &dispatch),
    ]
}
