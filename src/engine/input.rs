//! Browser input, queued by event listeners and drained once per update step.
//!
//! ELI5:
//! ┌──────────── Input Flow ────────────────────────────────────────┐
//! │ keydown / pointerdown ... ──► closure ──► unbounded channel    │
//! │                                               │                │
//! │ GameLoop step ──► Input::poll() ◄─────────────┘                │
//! │                      ├─► KeyState / PointerState updated       │
//! │                      └─► events() for this step only           │
//! └────────────────────────────────────────────────────────────────┘
//! Listeners never touch game state, only the channel, so every step
//! sees a consistent snapshot.
use crate::browser;
use crate::engine::Rect;
use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use glam::Vec2;
use std::collections::{HashMap, HashSet};
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other(i16),
}

impl PointerButton {
    /// `MouseEvent.button` numbering, touch and pen contacts report 0
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            other => PointerButton::Other(other),
        }
    }
}

/// Positions are in canvas pixels
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerDown {
        id: i32,
        button: PointerButton,
        position: Vec2,
    },
    PointerMove {
        id: i32,
        position: Vec2,
    },
    PointerUp {
        id: i32,
        button: PointerButton,
        position: Vec2,
    },
    PointerLeave {
        id: i32,
    },
    /// Window lost focus, key releases from now on go elsewhere
    Blur,
}

/// Held keys by `KeyboardEvent.code`
#[derive(Debug, Default)]
pub struct KeyState {
    pressed: HashSet<String>,
}

impl KeyState {
    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed.contains(code)
    }

    fn set_pressed(&mut self, code: &str) {
        self.pressed.insert(code.to_string());
    }

    fn set_released(&mut self, code: &str) {
        self.pressed.remove(code);
    }

    fn release_all(&mut self) {
        self.pressed.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeldPointer {
    pressed_at: Vec2,
    position: Vec2,
}

/// Primary pointers currently pressed, keyed by pointer id so several
/// touches can hold on-screen buttons at once
#[derive(Debug, Default)]
pub struct PointerState {
    held: HashMap<i32, HeldPointer>,
}

impl PointerState {
    /// A pointer holds `area` only if it was pressed inside it and has not
    /// left it since
    pub fn any_pressed_within(&self, area: &Rect) -> bool {
        self.held
            .values()
            .any(|held| area.contains(held.pressed_at) && area.contains(held.position))
    }

    #[cfg(test)]
    fn held_count(&self) -> usize {
        self.held.len()
    }

    fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown {
                id,
                button: PointerButton::Primary,
                position,
            } => {
                self.held.insert(
                    *id,
                    HeldPointer {
                        pressed_at: *position,
                        position: *position,
                    },
                );
            }
            InputEvent::PointerMove { id, position } => {
                // hovering mice are not tracked
                if let Some(held) = self.held.get_mut(id) {
                    held.position = *position;
                }
            }
            InputEvent::PointerUp { id, .. } | InputEvent::PointerLeave { id } => {
                self.held.remove(id);
            }
            _ => {}
        }
    }
}

pub struct Input {
    keys: KeyState,
    pointers: PointerState,
    events: Vec<InputEvent>,
    receiver: UnboundedReceiver<InputEvent>,
}

impl Input {
    /// Registers window keyboard listeners and canvas pointer listeners
    pub fn prepare() -> Result<Self> {
        let (sender, receiver) = unbounded();
        let window = browser::window()?;
        let canvas = browser::canvas()?;

        let key_sender = sender.clone();
        listen(&window, "keydown", move |event: KeyboardEvent| {
            if event.code().starts_with("Arrow") {
                event.prevent_default();
            }
            send(&key_sender, InputEvent::KeyDown(event.code()));
        })?;
        let key_sender = sender.clone();
        listen(&window, "keyup", move |event: KeyboardEvent| {
            send(&key_sender, InputEvent::KeyUp(event.code()));
        })?;
        // keyup never arrives for keys held while focus is elsewhere
        let key_sender = sender.clone();
        listen(&window, "blur", move |_event: web_sys::FocusEvent| {
            send(&key_sender, InputEvent::Blur);
        })?;

        let (pointer_sender, target) = (sender.clone(), canvas.clone());
        listen(&canvas, "pointerdown", move |event: PointerEvent| {
            send(
                &pointer_sender,
                InputEvent::PointerDown {
                    id: event.pointer_id(),
                    button: PointerButton::from_dom(event.button()),
                    position: canvas_position(&target, &event),
                },
            );
        })?;
        let (pointer_sender, target) = (sender.clone(), canvas.clone());
        listen(&canvas, "pointermove", move |event: PointerEvent| {
            send(
                &pointer_sender,
                InputEvent::PointerMove {
                    id: event.pointer_id(),
                    position: canvas_position(&target, &event),
                },
            );
        })?;
        let (pointer_sender, target) = (sender.clone(), canvas.clone());
        listen(&canvas, "pointerup", move |event: PointerEvent| {
            send(
                &pointer_sender,
                InputEvent::PointerUp {
                    id: event.pointer_id(),
                    button: PointerButton::from_dom(event.button()),
                    position: canvas_position(&target, &event),
                },
            );
        })?;
        for kind in ["pointerleave", "pointercancel"] {
            let pointer_sender = sender.clone();
            listen(&canvas, kind, move |event: PointerEvent| {
                send(
                    &pointer_sender,
                    InputEvent::PointerLeave {
                        id: event.pointer_id(),
                    },
                );
            })?;
        }
        // secondary button is a game control, not a menu
        listen(&canvas, "contextmenu", |event: web_sys::Event| {
            event.prevent_default();
        })?;

        Ok(Input::from_receiver(receiver))
    }

    pub fn from_receiver(receiver: UnboundedReceiver<InputEvent>) -> Self {
        Input {
            keys: KeyState::default(),
            pointers: PointerState::default(),
            events: Vec::new(),
            receiver,
        }
    }

    /// Drain everything queued since the last poll
    pub fn poll(&mut self) {
        self.events.clear();
        // Err => queue empty, Ok(None) => every sender dropped
        while let Ok(Some(event)) = self.receiver.try_next() {
            match &event {
                InputEvent::KeyDown(code) => self.keys.set_pressed(code),
                InputEvent::KeyUp(code) => self.keys.set_released(code),
                InputEvent::Blur => self.keys.release_all(),
                pointer => self.pointers.apply(pointer),
            }
            self.events.push(event);
        }
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn pointers(&self) -> &PointerState {
        &self.pointers
    }

    /// Events drained by the most recent `poll`
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }
}

fn send(sender: &UnboundedSender<InputEvent>, event: InputEvent) {
    if let Err(err) = sender.unbounded_send(event) {
        log::warn!("Input queue closed, dropping event : {}", err);
    }
}

fn listen<E>(target: &EventTarget, kind: &str, handler: impl FnMut(E) + 'static) -> Result<()>
where
    E: 'static,
    dyn FnMut(E): WasmClosure,
{
    let closure = browser::closure_wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen to '{}' : {:#?}", kind, err))?;
    // listeners live as long as the page
    closure.forget();
    Ok(())
}

/// The canvas is scaled to fit the page, map client pixels back to canvas
/// pixels
fn canvas_position(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Vec2 {
    let bounds = canvas.get_bounding_client_rect();
    let scale_x = if bounds.width() > 0.0 {
        f64::from(canvas.width()) / bounds.width()
    } else {
        1.0
    };
    let scale_y = if bounds.height() > 0.0 {
        f64::from(canvas.height()) / bounds.height()
    } else {
        1.0
    };
    Vec2::new(
        ((f64::from(event.client_x()) - bounds.left()) * scale_x) as f32,
        ((f64::from(event.client_y()) - bounds.top()) * scale_y) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(events: Vec<InputEvent>) -> Input {
        let (sender, receiver) = unbounded();
        for event in events {
            sender.unbounded_send(event).unwrap();
        }
        let mut input = Input::from_receiver(receiver);
        input.poll();
        input
    }

    #[test]
    fn poll_tracks_held_keys() {
        let input = input_with(vec![
            InputEvent::KeyDown("ArrowLeft".into()),
            InputEvent::KeyDown("ArrowUp".into()),
            InputEvent::KeyUp("ArrowUp".into()),
        ]);
        assert!(input.keys().is_pressed("ArrowLeft"));
        assert!(!input.keys().is_pressed("ArrowUp"));
        assert_eq!(input.events().len(), 3);
    }

    #[test]
    fn events_only_last_one_poll() {
        let (sender, receiver) = unbounded();
        let mut input = Input::from_receiver(receiver);
        sender
            .unbounded_send(InputEvent::KeyDown("KeyR".into()))
            .unwrap();
        input.poll();
        assert_eq!(input.events().len(), 1);
        input.poll();
        assert!(input.events().is_empty());
        assert!(input.keys().is_pressed("KeyR"));
    }

    #[test]
    fn primary_pointer_is_held_until_up_or_leave() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let input = input_with(vec![
            InputEvent::PointerDown {
                id: 1,
                button: PointerButton::Primary,
                position: Vec2::new(10.0, 10.0),
            },
            InputEvent::PointerDown {
                id: 2,
                button: PointerButton::Primary,
                position: Vec2::new(500.0, 10.0),
            },
        ]);
        assert!(input.pointers().any_pressed_within(&area));
        assert_eq!(input.pointers().held_count(), 2);

        let input = input_with(vec![
            InputEvent::PointerDown {
                id: 1,
                button: PointerButton::Primary,
                position: Vec2::new(10.0, 10.0),
            },
            InputEvent::PointerMove {
                id: 1,
                position: Vec2::new(200.0, 10.0),
            },
        ]);
        assert!(!input.pointers().any_pressed_within(&area));

        let input = input_with(vec![
            InputEvent::PointerDown {
                id: 1,
                button: PointerButton::Primary,
                position: Vec2::new(10.0, 10.0),
            },
            InputEvent::PointerLeave { id: 1 },
        ]);
        assert_eq!(input.pointers().held_count(), 0);
    }

    #[test]
    fn dragging_onto_an_area_does_not_press_it() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let input = input_with(vec![
            InputEvent::PointerDown {
                id: 1,
                button: PointerButton::Primary,
                position: Vec2::new(300.0, 10.0),
            },
            InputEvent::PointerMove {
                id: 1,
                position: Vec2::new(50.0, 50.0),
            },
        ]);
        assert_eq!(input.pointers().held_count(), 1);
        assert!(!input.pointers().any_pressed_within(&area));

        let input = input_with(vec![
            InputEvent::PointerDown {
                id: 1,
                button: PointerButton::Primary,
                position: Vec2::new(10.0, 10.0),
            },
            InputEvent::PointerMove {
                id: 1,
                position: Vec2::new(90.0, 90.0),
            },
        ]);
        assert!(input.pointers().any_pressed_within(&area));
    }

    #[test]
    fn blur_releases_every_key() {
        let (sender, receiver) = unbounded();
        let mut input = Input::from_receiver(receiver);
        sender
            .unbounded_send(InputEvent::KeyDown("ArrowRight".into()))
            .unwrap();
        sender
            .unbounded_send(InputEvent::KeyDown("KeyR".into()))
            .unwrap();
        input.poll();
        assert!(input.keys().is_pressed("ArrowRight"));

        sender.unbounded_send(InputEvent::Blur).unwrap();
        input.poll();
        assert!(!input.keys().is_pressed("ArrowRight"));
        assert!(!input.keys().is_pressed("KeyR"));
    }

    #[test]
    fn secondary_pointer_and_hover_are_not_held() {
        let input = input_with(vec![
            InputEvent::PointerMove {
                id: 1,
                position: Vec2::new(10.0, 10.0),
            },
            InputEvent::PointerDown {
                id: 1,
                button: PointerButton::Secondary,
                position: Vec2::new(10.0, 10.0),
            },
        ]);
        assert_eq!(input.pointers().held_count(), 0);
    }

    #[test]
    fn dom_button_numbers() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Other(1));
    }
}
