//! Scrawl client engine.
//!
//! Combines input capture, the local raster surface, and the board mirror
//! into a single-threaded whiteboard that exchanges protocol messages with
//! the sync channel.

pub mod app;

pub use app::Whiteboard;
