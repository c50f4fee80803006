use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::events::{Button, Key, ViewerInput};
use crate::processing::transform::{Point, pixel_to_ndc};

// Pixel-precise touchpads report far more than one notch per gesture.
const PIXELS_PER_LINE: f64 = 40.0;

/// Turns raw window events into [`ViewerInput`]s.
///
/// Holds the last cursor position so button presses can be reported at a
/// location, and the window size so positions can be normalized.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    size: PhysicalSize<u32>,
    cursor: Point,
}

impl InputTranslator {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            size,
            cursor: Point::ZERO,
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
    }

    /// Place the cursor at a pixel position without emitting an input.
    pub fn warp_cursor(&mut self, x: f64, y: f64) {
        self.cursor = pixel_to_ndc(x, y, self.size.width, self.size.height);
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<ViewerInput> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => translate_key(event),
            WindowEvent::CursorMoved { position, .. } => {
                self.warp_cursor(position.x, position.y);
                Some(ViewerInput::CursorMoved(self.cursor))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => Button::Left,
                    MouseButton::Right => Button::Right,
                    _ => return None,
                };
                let at = self.cursor;
                Some(match state {
                    ElementState::Pressed => ViewerInput::ButtonPressed { button, at },
                    ElementState::Released => ViewerInput::ButtonReleased { button, at },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => f64::from(*y),
                    MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_LINE,
                };
                (dy != 0.0).then_some(ViewerInput::Scrolled(dy))
            }
            _ => None,
        }
    }
}

fn translate_key(event: &KeyEvent) -> Option<ViewerInput> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    map_key(code).map(ViewerInput::KeyPressed)
}

/// Key bindings understood by the viewer.
pub fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit(4),
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn translator() -> InputTranslator {
        InputTranslator::new(PhysicalSize::new(512, 512))
    }

    fn device() -> DeviceId {
        // SAFETY: only compared against other dummy ids inside these tests
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn bindings_cover_digits_and_arrows() {
        assert_eq!(map_key(KeyCode::Digit3), Some(Key::Digit(3)));
        assert_eq!(map_key(KeyCode::ArrowLeft), Some(Key::Left));
        assert_eq!(map_key(KeyCode::Digit5), None);
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn press_reports_last_cursor_position() {
        let mut t = translator();
        let device_id = device();
        let moved = t.translate(&WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(384.0, 128.0),
        });
        assert_eq!(moved, Some(ViewerInput::CursorMoved(Point::new(0.5, 0.5))));
        let pressed = t.translate(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
        });
        assert_eq!(
            pressed,
            Some(ViewerInput::ButtonPressed {
                button: Button::Left,
                at: Point::new(0.5, 0.5)
            })
        );
    }

    #[test]
    fn middle_button_is_ignored() {
        let mut t = translator();
        let out = t.translate(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Middle,
        });
        assert_eq!(out, None);
    }

    #[test]
    fn line_scroll_passes_through() {
        let mut t = translator();
        let out = t.translate(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, -2.0),
            phase: winit::event::TouchPhase::Moved,
        });
        assert_eq!(out, Some(ViewerInput::Scrolled(-2.0)));
    }
}
