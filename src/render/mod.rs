//! Deterministic rendering of a market snapshot into a summary card.

pub mod canvas;
pub mod font;
pub mod layout;
pub mod raster;
pub mod recording;

pub use canvas::{Align, Canvas, Color, Rect, TextStyle};
pub use layout::{change_color, render, NOT_AVAILABLE, PLACEHOLDER};
pub use raster::{RasterCanvas, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use recording::{DrawOp, RecordingCanvas};
