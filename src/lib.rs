//! spectra_view: an interactive spectrum plotting engine.
//!
//! The engine maps one or more spectra onto a canvas, handles pointer and
//! keyboard interaction (zoom boxes, pins, stacking, linked panes,
//! measurements and integrals) and emits drawing primitives through
//! [`render::DrawingSurface`]. [`gui`] drives it from an eframe window.

pub mod annotation;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod gui;
pub mod log;
pub mod render;
pub mod scale;

pub use config::PlotSettings;
pub use data::{Coordinate, Spectrum};
pub use error::{PlotError, Result};
pub use graph::{GraphSet, Panel};
