//! Input capture: pointer events and the drawing gesture state machine.

use crate::segment::Segment;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A pointer event in canvas-local coordinates, unified across mouse and
/// touch. Touch positions go through [`touch_to_canvas`] first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Press / touch start.
    Down { position: Point },
    /// Movement with the pointer down or hovering.
    Move { position: Point },
    /// Release / touch end.
    Up,
    /// Touch cancel.
    Cancel,
    /// Pointer left the canvas.
    Leave,
}

/// Active brush style applied to emitted segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Stroke color as a hex string.
    pub color: String,
    /// Stroke width in pixels.
    pub size: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            size: 2.0,
        }
    }
}

/// Drawing gesture state: `Idle -> Drawing -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Mid-gesture; `last` is the anchor the next segment starts from.
    Drawing { last: Point },
}

/// Translates pointer events into segments.
///
/// Gesture state lives here, on the instance, rather than in module-level
/// globals. Down enters Drawing and records the anchor; each Move while
/// Drawing emits one segment from the anchor to the new position and
/// advances the anchor; Up, Cancel, and Leave all return to Idle.
#[derive(Debug, Clone)]
pub struct InputCapture {
    state: GestureState,
}

impl Default for InputCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCapture {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, GestureState::Drawing { .. })
    }

    /// Feed one pointer event; returns the segment to draw and relay, if the
    /// event produced one. Moves while Idle emit nothing.
    pub fn handle_event(&mut self, event: PointerEvent, brush: &Brush) -> Option<Segment> {
        match event {
            PointerEvent::Down { position } => {
                self.state = GestureState::Drawing { last: position };
                None
            }
            PointerEvent::Move { position } => match self.state {
                GestureState::Drawing { last } => {
                    self.state = GestureState::Drawing { last: position };
                    Some(Segment::new(last, position, brush.color.clone(), brush.size))
                }
                GestureState::Idle => None,
            },
            PointerEvent::Up | PointerEvent::Cancel | PointerEvent::Leave => {
                self.state = GestureState::Idle;
                None
            }
        }
    }
}

/// Convert a touch position in client (screen) coordinates into canvas-local
/// coordinates by subtracting the canvas origin. Mouse events arrive already
/// canvas-local; both paths must agree for equivalent screen positions.
pub fn touch_to_canvas(client: Point, canvas_origin: Point) -> Point {
    Point::new(client.x - canvas_origin.x, client.y - canvas_origin.y)
}
