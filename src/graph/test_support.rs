/// Synthetic spectra and sized pane groups shared by the graph tests

use super::graph_set::GraphSet;
use crate::config::PlotSettings;
use crate::data::{Coordinate, Nucleus, Spectrum, SubSpectrum};

fn lorentz(x: f64, centres: &[f64], width: f64) -> f64 {
    centres.iter().map(|c| 1.0 / (1.0 + ((x - c) / width).powi(2))).sum()
}

/// Lorentzian lines on a 0..10 ppm grid of 1001 points.
pub(crate) fn proton(title: &str, centres: &[f64]) -> Spectrum {
    let coords = (0..=1000)
        .map(|i| {
            let x = i as f64 * 0.01;
            Coordinate::new(x, lorentz(x, centres, 0.02))
        })
        .collect();
    Spectrum::new_nmr_1d(title, Nucleus::H1, 400.0, coords).with_path(format!("/data/{}.jdx", title))
}

/// A UV/VIS absorbance band over 200..600 nm (1001 points). Displayed with
/// x increasing to the right.
pub(crate) fn uv_vis(title: &str) -> Spectrum {
    let coords = (0..=1000)
        .map(|i| {
            let x = 200.0 + i as f64 * 0.4;
            Coordinate::new(x, 0.13 + 0.9 * (-((x - 420.0) / 30.0).powi(2)).exp())
        })
        .collect();
    Spectrum::new_1d(title, "UV/VIS SPECTRUM", "NANOMETERS", "ABSORBANCE", coords).with_path(format!("/data/{}.jdx", title))
}

/// An 1H/13C correlation map: 20 rows over 0..10 ppm, one cross peak.
pub(crate) fn hsqc(title: &str) -> Spectrum {
    let rows = (0..20)
        .map(|r| SubSpectrum {
            coords: (0..=200)
                .map(|i| {
                    let x = i as f64 * 0.05;
                    let z = if r == 8 { lorentz(x, &[3.0], 0.1) } else { 0.0 };
                    Coordinate::new(x, z)
                })
                .collect(),
            y_2d: r as f64 * 10.0,
        })
        .collect();
    Spectrum::new_nmr_2d(title, Nucleus::H1, Nucleus::C13, 400.0, rows).with_path(format!("/data/{}.jdx", title))
}

/// A group laid out on an 800x600 canvas with its widgets placed.
pub(crate) fn sized(spectra: Vec<Spectrum>) -> GraphSet {
    let mut gs = GraphSet::new(spectra, &PlotSettings::default()).expect("non-empty spectra");
    gs.set_canvas_size(800, 600);
    gs.set_position_for_frame(0);
    gs.get_current_view();
    gs.set_widgets(true, !gs.is_2d());
    gs
}
