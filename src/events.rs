use crate::processing::filters::FilterState;
use crate::processing::transform::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Digit row 1 through 4.
    Digit(u8),
    Up,
    Down,
    Left,
    Right,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// A discrete input, already converted to normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerInput {
    KeyPressed(Key),
    ButtonPressed { button: Button, at: Point },
    ButtonReleased { button: Button, at: Point },
    CursorMoved(Point),
    Scrolled(f64),
}

/// What a single input changed in the view state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    FilterChanged(FilterState),
    ImageChanged { index: usize },
    DragStarted { anchor: Point },
    Dragged { delta: Point },
    Committed,
    RotateArmed,
    Rotated { angle: f64 },
    Scaled { factor: f64 },
    ZoomRejected,
}
