//! Scrawl Core Library
//!
//! Platform-agnostic data structures and sync plumbing for the Scrawl
//! collaborative whiteboard: the segment model, the drawing gesture state
//! machine, the board mirror, the wire protocol, and the websocket client.

pub mod board;
pub mod color;
pub mod input;
pub mod protocol;
pub mod segment;
pub mod sync;

pub use board::Board;
pub use color::Rgba;
pub use input::{Brush, GestureState, InputCapture, PointerEvent};
pub use protocol::{ClientMessage, ServerMessage};
pub use segment::Segment;
pub use sync::{ConnectionState, SyncClient, SyncError, SyncEvent};
