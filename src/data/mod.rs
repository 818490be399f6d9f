pub mod coordinate;
pub mod spectrum;

pub use coordinate::Coordinate;
pub use spectrum::{Dimensionality, Nucleus, PeakInfo, Spectrum, SubSpectrum};
