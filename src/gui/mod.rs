/// Desktop front end: menu bar, plot canvas and demo spectra

pub mod app;
pub mod canvas;
pub mod demo;
pub mod toolbar;

pub use app::SpectraViewApp;
