/// Synthetic spectra for the desktop demo
///
/// Lines are Lorentzians on a fixed ppm grid, so every demo set exercises
/// stacking, linking and 2D cross-hairs without reading files.

use crate::data::{Coordinate, Nucleus, PeakInfo, Spectrum, SubSpectrum};
use crate::graph::LinkMode;

const SPECTROMETER_MHZ: f64 = 400.0;

/// A line at `ppm` with relative height `h` and half-width `w`.
#[derive(Debug, Clone, Copy)]
struct Line {
    ppm: f64,
    h: f64,
    w: f64,
}

const fn line(ppm: f64, h: f64, w: f64) -> Line {
    Line { ppm, h, w }
}

// ── Ethyl acetate ──

const PROTON_LINES: &[Line] = &[
    line(4.12, 0.25, 0.004),
    line(4.10, 0.75, 0.004),
    line(4.08, 0.75, 0.004),
    line(4.06, 0.25, 0.004),
    line(2.04, 1.50, 0.004),
    line(1.28, 0.50, 0.004),
    line(1.26, 1.00, 0.004),
    line(1.24, 0.50, 0.004),
    line(7.26, 0.05, 0.003),
];

const CARBON_LINES: &[Line] = &[
    line(171.1, 0.4, 0.15),
    line(60.5, 0.9, 0.15),
    line(21.0, 1.0, 0.15),
    line(14.2, 1.0, 0.15),
    line(77.0, 0.6, 0.15),
];

/// (1H ppm, 13C ppm) cross peaks of the one-bond correlation map.
const HSQC_PEAKS: &[(f64, f64)] = &[(4.09, 60.5), (2.04, 21.0), (1.26, 14.2)];

fn lorentz(x: f64, lines: &[Line]) -> f64 {
    lines
        .iter()
        .map(|l| l.h / (1.0 + ((x - l.ppm) / l.w).powi(2)))
        .sum()
}

/// `n` samples of `lines` from `lo` to `hi` ppm.
fn trace(lines: &[Line], lo: f64, hi: f64, n: usize) -> Vec<Coordinate> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            let x = lo + i as f64 * step;
            Coordinate::new(x, lorentz(x, lines))
        })
        .collect()
}

fn peak_table(lines: &[Line], half_width: f64) -> Vec<PeakInfo> {
    lines
        .iter()
        .map(|l| PeakInfo::new(l.ppm, half_width, &format!("{:.2} ppm", l.ppm)))
        .collect()
}

pub fn proton(title: &str) -> Spectrum {
    Spectrum::new_nmr_1d(title, Nucleus::H1, SPECTROMETER_MHZ, trace(PROTON_LINES, -0.5, 9.5, 8001))
        .with_path(format!("demo/{}.jdx", title))
        .with_peaks(peak_table(PROTON_LINES, 0.01))
}

/// The proton spectrum again, with its lines moved by `dx` ppm.
pub fn shifted_proton(title: &str, dx: f64) -> Spectrum {
    let lines: Vec<Line> = PROTON_LINES.iter().map(|l| line(l.ppm + dx, l.h, l.w)).collect();
    Spectrum::new_nmr_1d(title, Nucleus::H1, SPECTROMETER_MHZ, trace(&lines, -0.5, 9.5, 8001))
        .with_path(format!("demo/{}.jdx", title))
        .with_peaks(peak_table(&lines, 0.01))
}

pub fn carbon(title: &str) -> Spectrum {
    Spectrum::new_nmr_1d(title, Nucleus::C13, SPECTROMETER_MHZ / 4.0, trace(CARBON_LINES, -10.0, 200.0, 8001))
        .with_path(format!("demo/{}.jdx", title))
        .with_peaks(peak_table(CARBON_LINES, 0.5))
}

/// 1H/13C correlation map: one row per 13C step, cross peaks as 2D Lorentzians.
pub fn hsqc(title: &str) -> Spectrum {
    const ROWS: usize = 64;
    const COLS: usize = 512;
    let (c_lo, c_hi) = (0.0, 80.0);
    let rows = (0..ROWS)
        .map(|r| {
            let c = c_lo + r as f64 * (c_hi - c_lo) / (ROWS - 1) as f64;
            let lines: Vec<Line> = HSQC_PEAKS
                .iter()
                .map(|&(h, cp)| line(h, 1.0 / (1.0 + ((c - cp) / 1.5).powi(2)), 0.03))
                .collect();
            SubSpectrum {
                coords: trace(&lines, -0.5, 9.5, COLS),
                y_2d: c,
            }
        })
        .collect();
    Spectrum::new_nmr_2d(title, Nucleus::H1, Nucleus::C13, SPECTROMETER_MHZ, rows)
        .with_path(format!("demo/{}.jdx", title))
}

/// The spectrum sets the demo window can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSet {
    /// Two proton spectra stacked in one pane, a carbon spectrum below.
    Stacked,
    /// A proton spectrum linked to a homonuclear-x correlation map.
    LinkedAB,
    /// Proton and carbon spectra linked to a heteronuclear map.
    LinkedABC,
}

impl DemoSet {
    pub const ALL: [DemoSet; 3] = [DemoSet::Stacked, DemoSet::LinkedAB, DemoSet::LinkedABC];

    pub fn label(self) -> &'static str {
        match self {
            DemoSet::Stacked => "Stacked 1H + 13C",
            DemoSet::LinkedAB => "1H + HSQC (AB)",
            DemoSet::LinkedABC => "1H + 13C + HSQC (ABC)",
        }
    }

    pub fn spectra(self) -> Vec<Spectrum> {
        match self {
            DemoSet::Stacked => vec![
                proton("ethyl acetate"),
                shifted_proton("ethyl acetate (shifted)", 0.05),
                carbon("ethyl acetate 13C"),
            ],
            DemoSet::LinkedAB => vec![proton("ethyl acetate"), hsqc("ethyl acetate HSQC")],
            DemoSet::LinkedABC => vec![
                proton("ethyl acetate"),
                carbon("ethyl acetate 13C"),
                hsqc("ethyl acetate HSQC"),
            ],
        }
    }

    pub fn link_mode(self) -> LinkMode {
        match self {
            DemoSet::Stacked => LinkMode::None,
            DemoSet::LinkedAB | DemoSet::LinkedABC => LinkMode::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotSettings;
    use crate::graph::Panel;

    #[test]
    fn test_proton_trace_has_its_lines() {
        let s = proton("p");
        let coords = s.xy_coords();
        assert_eq!(coords.len(), 8001);
        assert!(coords[0].x < coords[coords.len() - 1].x);
        assert!(s.y_value_at(2.04) > 1.0);
        assert!(s.y_value_at(5.5) < 0.01);
        assert_eq!(s.peaks.len(), PROTON_LINES.len());
    }

    #[test]
    fn test_hsqc_rows_follow_carbon_axis() {
        let s = hsqc("h");
        assert!(!s.is_1d());
        let rows = s.sub_spectra();
        assert_eq!(rows.len(), 64);
        assert!(rows[0].y_2d.abs() < 1e-9);
        assert!((rows[63].y_2d - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_demo_sets_lay_out() {
        for set in DemoSet::ALL {
            let mut p = Panel::new(set.spectra(), PlotSettings::default());
            p.set_size(1000, 700);
            p.link_spectra(set.link_mode());
            match set {
                DemoSet::Stacked => {
                    assert_eq!(p.groups().len(), 2);
                    assert!(!p.interaction().is_linked);
                }
                DemoSet::LinkedAB => {
                    assert_eq!(p.link_mode(), LinkMode::AB);
                    assert!(p.interaction().is_linked);
                }
                DemoSet::LinkedABC => {
                    assert_eq!(p.link_mode(), LinkMode::ABC);
                    assert_eq!(p.groups()[1].linked_y, Some(2));
                }
            }
        }
    }
}
