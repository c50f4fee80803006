use tracing::trace;

use crate::config::Controls;
use crate::error::Error;
use crate::events::{Button, Key, Transition, ViewerInput};
use crate::processing::filters::{FilterState, RenderMode};
use crate::processing::transform::{Point, QuadCorners};

/// Pixel dimensions of one loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Pointer {
    left_held: bool,
    right_held: bool,
    anchor: Point,
    cursor: Point,
}

/// Everything the renderer needs to draw the next frame, mutated only by
/// [`ViewState::apply`].
#[derive(Debug, Clone)]
pub struct ViewState {
    images: Vec<ImageSize>,
    image_index: usize,
    filter: FilterState,
    rotation: f64,
    scale: f64,
    drag: Point,
    corners: QuadCorners,
    pointer: Pointer,
    zoom_budget: f64,
    controls: Controls,
}

impl ViewState {
    pub fn new(images: Vec<ImageSize>, controls: Controls) -> Result<Self, Error> {
        let first = *images.first().ok_or(Error::NoImages)?;
        Ok(Self {
            images,
            image_index: 0,
            filter: FilterState::default(),
            rotation: 0.0,
            scale: 1.0,
            drag: Point::ZERO,
            corners: QuadCorners::fit_image(first.width, first.height),
            pointer: Pointer::default(),
            zoom_budget: 1.0,
            controls,
        })
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn active_image(&self) -> ImageSize {
        self.images[self.image_index]
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn drag(&self) -> Point {
        self.drag
    }

    pub fn corners(&self) -> QuadCorners {
        self.corners
    }

    pub fn zoom_budget(&self) -> f64 {
        self.zoom_budget
    }

    /// Replace the persisted corners, e.g. to start from a known quad.
    pub fn set_corners(&mut self, corners: QuadCorners) {
        self.corners = corners;
    }

    /// Corners as they should appear this frame.
    pub fn frame_corners(&self) -> QuadCorners {
        self.corners.evaluate(self.rotation, self.scale, self.drag)
    }

    /// Recompute the persisted corners from the active image's aspect ratio.
    pub fn refit_corners(&mut self) {
        let ImageSize { width, height } = self.active_image();
        self.corners = QuadCorners::fit_image(width, height);
    }

    /// Apply one input. Returns what changed, or `None` for inputs that are
    /// no-ops in the current state.
    pub fn apply(&mut self, input: &ViewerInput) -> Option<Transition> {
        let transition = match *input {
            ViewerInput::KeyPressed(key) => self.on_key(key),
            ViewerInput::ButtonPressed { button, at } => Some(self.on_press(button, at)),
            ViewerInput::ButtonReleased { button, .. } => self.on_release(button),
            ViewerInput::CursorMoved(at) => self.on_cursor(at),
            ViewerInput::Scrolled(dy) => Some(self.on_scroll(dy)),
        };
        if let Some(t) = &transition {
            trace!(?input, transition = ?t, "view state updated");
        }
        transition
    }

    fn on_key(&mut self, key: Key) -> Option<Transition> {
        match key {
            Key::Digit(digit) => {
                let mode = RenderMode::from_digit(digit)?;
                self.filter
                    .select(mode)
                    .then_some(Transition::FilterChanged(self.filter))
            }
            Key::Up => {
                self.filter.step_up();
                Some(Transition::FilterChanged(self.filter))
            }
            Key::Down => {
                self.filter.step_down();
                Some(Transition::FilterChanged(self.filter))
            }
            Key::Right => Some(self.show_image((self.image_index + 1) % self.image_count())),
            Key::Left => {
                let count = self.image_count();
                Some(self.show_image((self.image_index + count - 1) % count))
            }
            Key::Escape => None,
        }
    }

    fn show_image(&mut self, index: usize) -> Transition {
        self.image_index = index;
        self.refit_corners();
        self.rotation = 0.0;
        self.scale = 1.0;
        self.filter.reset();
        Transition::ImageChanged { index }
    }

    fn on_press(&mut self, button: Button, at: Point) -> Transition {
        self.pointer.cursor = at;
        match button {
            Button::Left => {
                self.pointer.left_held = true;
                self.pointer.anchor = at;
                self.drag = Point::ZERO;
                Transition::DragStarted { anchor: at }
            }
            Button::Right => {
                self.pointer.right_held = true;
                Transition::RotateArmed
            }
        }
    }

    fn on_release(&mut self, button: Button) -> Option<Transition> {
        match button {
            Button::Left if self.pointer.left_held => {
                self.pointer.left_held = false;
                self.commit();
                Some(Transition::Committed)
            }
            Button::Right if self.pointer.right_held => {
                self.pointer.right_held = false;
                self.commit();
                if self.pointer.left_held {
                    // the drag so far is now part of the corners
                    self.pointer.anchor = self.pointer.cursor;
                }
                Some(Transition::Committed)
            }
            _ => None,
        }
    }

    fn commit(&mut self) {
        self.corners.commit(self.scale, self.drag);
        self.drag = Point::ZERO;
        self.scale = 1.0;
    }

    fn on_cursor(&mut self, at: Point) -> Option<Transition> {
        self.pointer.cursor = at;
        if !self.pointer.left_held {
            return None;
        }
        self.drag = at.delta_from(self.pointer.anchor).rotated(-self.rotation);
        Some(Transition::Dragged { delta: self.drag })
    }

    fn on_scroll(&mut self, dy: f64) -> Transition {
        if self.pointer.right_held {
            self.rotation += dy * self.controls.rotate_step_radians();
            return Transition::Rotated {
                angle: self.rotation,
            };
        }

        let tentative = self.zoom_budget + dy * self.controls.zoom_budget_step;
        let transition = if tentative >= 0.0 {
            self.zoom_budget = tentative;
            self.scale = self.controls.zoom_step.powf(dy);
            self.corners.scale(self.scale);
            Transition::Scaled { factor: self.scale }
        } else {
            self.scale = 1.0;
            Transition::ZoomRejected
        };
        // scroll zoom is committed immediately, never deferred like a drag
        self.scale = 1.0;
        transition
    }
}
