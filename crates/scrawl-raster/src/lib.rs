//! Scrawl Raster Library
//!
//! A deterministic CPU raster surface standing in for the 2D canvas: stroke
//! one segment at a time, clear, or replay a full board in order.

mod surface;

pub use surface::Surface;
