use crate::engine::input::PointerState;
use crate::engine::{Rect, Renderer};
use crate::sprite::palette;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Left,
    Right,
    Jump,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    /// Corners relative to the top left of the button
    Triangle([Vec2; 3]),
    Square,
}

/// On-screen control in screen space. Held while a pointer that was pressed
/// on it stays inside it, so sliding a finger off lets go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchButton {
    pub action: ButtonAction,
    pub area: Rect,
    shape: Shape,
    color: &'static str,
}

impl TouchButton {
    pub fn is_held(&self, pointers: &PointerState) -> bool {
        pointers.any_pressed_within(&self.area)
    }

    pub fn draw(&self, renderer: &Renderer) {
        match self.shape {
            Shape::Triangle(corners) => {
                let origin = Vec2::new(self.area.x, self.area.y);
                renderer.fill_triangle(corners.map(|corner| origin + corner), self.color);
            }
            Shape::Square => renderer.fill_rect(&self.area, self.color),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TouchButtons {
    buttons: [TouchButton; 4],
}

impl Default for TouchButtons {
    fn default() -> Self {
        TouchButtons {
            buttons: [
                TouchButton {
                    action: ButtonAction::Left,
                    area: Rect::from_center(Vec2::new(75.0, 500.0), Vec2::new(50.0, 100.0)),
                    shape: Shape::Triangle([
                        Vec2::new(0.0, 50.0),
                        Vec2::new(50.0, 0.0),
                        Vec2::new(50.0, 100.0),
                    ]),
                    color: palette::BUTTON,
                },
                TouchButton {
                    action: ButtonAction::Right,
                    area: Rect::from_center(Vec2::new(200.0, 500.0), Vec2::new(50.0, 100.0)),
                    shape: Shape::Triangle([
                        Vec2::new(0.0, 0.0),
                        Vec2::new(0.0, 100.0),
                        Vec2::new(50.0, 50.0),
                    ]),
                    color: palette::BUTTON,
                },
                TouchButton {
                    action: ButtonAction::Jump,
                    area: Rect::from_center(Vec2::new(650.0, 525.0), Vec2::new(100.0, 50.0)),
                    shape: Shape::Triangle([
                        Vec2::new(0.0, 50.0),
                        Vec2::new(50.0, 0.0),
                        Vec2::new(100.0, 50.0),
                    ]),
                    color: palette::BUTTON,
                },
                TouchButton {
                    action: ButtonAction::Release,
                    area: Rect::from_center(Vec2::new(650.0, 425.0), Vec2::new(80.0, 80.0)),
                    shape: Shape::Square,
                    color: palette::RELEASE_BUTTON,
                },
            ],
        }
    }
}

impl TouchButtons {
    pub fn is_held(&self, action: ButtonAction, pointers: &PointerState) -> bool {
        self.buttons
            .iter()
            .filter(|button| button.action == action)
            .any(|button| button.is_held(pointers))
    }

    pub fn draw(&self, renderer: &Renderer) {
        for button in &self.buttons {
            button.draw(renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::{Input, InputEvent, PointerButton};
    use futures::channel::mpsc::unbounded;

    fn pressed(events: Vec<InputEvent>) -> Input {
        let (sender, receiver) = unbounded();
        for event in events {
            sender.unbounded_send(event).unwrap();
        }
        let mut input = Input::from_receiver(receiver);
        input.poll();
        input
    }

    fn down(id: i32, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            id,
            button: PointerButton::Primary,
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn default_layout_press_areas() {
        let buttons = TouchButtons::default();
        let input = pressed(vec![down(1, 75.0, 500.0), down(2, 690.0, 540.0)]);
        assert!(buttons.is_held(ButtonAction::Left, input.pointers()));
        assert!(buttons.is_held(ButtonAction::Jump, input.pointers()));
        assert!(!buttons.is_held(ButtonAction::Right, input.pointers()));
        assert!(!buttons.is_held(ButtonAction::Release, input.pointers()));

        // gap between release and jump
        let input = pressed(vec![down(1, 650.0, 470.0)]);
        assert!(!buttons.is_held(ButtonAction::Jump, input.pointers()));
        assert!(!buttons.is_held(ButtonAction::Release, input.pointers()));
    }

    #[test]
    fn only_the_button_pressed_first_is_held() {
        let buttons = TouchButtons::default();
        let input = pressed(vec![
            down(1, 400.0, 300.0),
            InputEvent::PointerMove {
                id: 1,
                position: Vec2::new(650.0, 525.0),
            },
        ]);
        assert!(!buttons.is_held(ButtonAction::Jump, input.pointers()));

        // sliding from left onto right lets go of both
        let input = pressed(vec![
            down(1, 75.0, 500.0),
            InputEvent::PointerMove {
                id: 1,
                position: Vec2::new(200.0, 500.0),
            },
        ]);
        assert!(!buttons.is_held(ButtonAction::Left, input.pointers()));
        assert!(!buttons.is_held(ButtonAction::Right, input.pointers()));
    }
}
