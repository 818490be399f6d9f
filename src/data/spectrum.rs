use super::coordinate::{self, Coordinate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Nucleus type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nucleus {
    H1,
    C13,
    N15,
    F19,
    P31,
    Other(String),
}

impl std::fmt::Display for Nucleus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nucleus::H1 => write!(f, "1H"),
            Nucleus::C13 => write!(f, "13C"),
            Nucleus::N15 => write!(f, "15N"),
            Nucleus::F19 => write!(f, "19F"),
            Nucleus::P31 => write!(f, "31P"),
            Nucleus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Nucleus {
    /// Parse labels such as "1H", "H1", "^13C" or "C".
    pub fn parse(label: &str) -> Self {
        let cleaned = label.trim().to_uppercase().replace(['^', ' '], "");
        match cleaned.as_str() {
            "1H" | "H1" | "H" => Nucleus::H1,
            "13C" | "C13" | "C" => Nucleus::C13,
            "15N" | "N15" | "N" => Nucleus::N15,
            "19F" | "F19" | "F" => Nucleus::F19,
            "31P" | "P31" | "P" => Nucleus::P31,
            "" => Nucleus::Other("?".into()),
            _ => Nucleus::Other(cleaned),
        }
    }
}

/// Experiment dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimensionality {
    OneD,
    TwoD,
}

/// A picked peak as delivered with the spectrum's peak table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakInfo {
    pub x: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub title: String,
}

impl PeakInfo {
    pub fn new(x: f64, half_width: f64, title: &str) -> Self {
        Self {
            x,
            x_min: x - half_width,
            x_max: x + half_width,
            title: title.to_string(),
        }
    }

    /// Distance from `x` to this peak's centre, or `f64::MAX` outside its range.
    pub fn check_range(&self, x: f64) -> f64 {
        let (lo, hi) = (self.x_min.min(self.x_max), self.x_min.max(self.x_max));
        if x < lo || x > hi {
            return f64::MAX;
        }
        (x - self.x).abs()
    }
}

/// One row of a pseudo-2D series or a true 2D data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSpectrum {
    pub coords: Vec<Coordinate>,
    /// Value on the indirect axis (ppm for 2D NMR, index for series).
    pub y_2d: f64,
}

/// Spectrum data container consumed by the plot engine.
///
/// Sample arrays are private: the engine only changes them through
/// [`Spectrum::add_spec_shift`], which is a destructive calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum {
    pub title: String,
    pub source_path: PathBuf,
    /// e.g. "NMR SPECTRUM", "INFRARED SPECTRUM", "MASS SPECTRUM"
    pub data_type: String,
    pub x_units: String,
    pub y_units: String,
    pub nucleus_x: Nucleus,
    pub nucleus_y: Option<Nucleus>,
    pub dimensionality: Dimensionality,
    pub continuous: bool,
    pub observed_freq: f64,
    pub user_y_factor: f64,
    pub x_increases: bool,
    pub peaks: Vec<PeakInfo>,
    pub selected_peak: Option<usize>,
    spec_shift: f64,
    coords: Vec<Coordinate>,
    sub_spectra: Vec<SubSpectrum>,
    current_sub: usize,
}

impl Default for Spectrum {
    fn default() -> Self {
        Self {
            title: String::new(),
            source_path: PathBuf::new(),
            data_type: String::new(),
            x_units: String::new(),
            y_units: String::new(),
            nucleus_x: Nucleus::Other("?".into()),
            nucleus_y: None,
            dimensionality: Dimensionality::OneD,
            continuous: true,
            observed_freq: 0.0,
            user_y_factor: 1.0,
            x_increases: true,
            peaks: Vec::new(),
            selected_peak: None,
            spec_shift: 0.0,
            coords: Vec::new(),
            sub_spectra: Vec::new(),
            current_sub: 0,
        }
    }
}

impl Spectrum {
    /// A continuous 1D trace.
    pub fn new_1d(title: &str, data_type: &str, x_units: &str, y_units: &str, coords: Vec<Coordinate>) -> Self {
        Self {
            title: title.to_string(),
            data_type: data_type.to_string(),
            x_units: x_units.to_string(),
            y_units: y_units.to_string(),
            coords,
            ..Default::default()
        }
    }

    /// A 1D NMR trace in ppm.
    pub fn new_nmr_1d(title: &str, nucleus: Nucleus, observed_freq: f64, coords: Vec<Coordinate>) -> Self {
        Self {
            nucleus_x: nucleus,
            observed_freq,
            ..Self::new_1d(title, "NMR SPECTRUM", "PPM", "ARBITRARY UNITS", coords)
        }
    }

    /// A 2D NMR data set stored as rows along the indirect (`nucleus_y`) axis.
    pub fn new_nmr_2d(
        title: &str,
        nucleus_x: Nucleus,
        nucleus_y: Nucleus,
        observed_freq: f64,
        rows: Vec<SubSpectrum>,
    ) -> Self {
        let coords = rows.first().map(|r| r.coords.clone()).unwrap_or_default();
        Self {
            nucleus_x,
            nucleus_y: Some(nucleus_y),
            dimensionality: Dimensionality::TwoD,
            observed_freq,
            sub_spectra: rows,
            ..Self::new_1d(title, "NMR SPECTRUM", "PPM", "ARBITRARY UNITS", coords)
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn with_peaks(mut self, peaks: Vec<PeakInfo>) -> Self {
        self.peaks = peaks;
        self
    }

    pub fn discrete(mut self) -> Self {
        self.continuous = false;
        self
    }

    /// Attach a series of rows to a 1D trace (pseudo-2D, e.g. an arrayed experiment).
    pub fn with_sub_spectra(mut self, rows: Vec<SubSpectrum>) -> Self {
        self.sub_spectra = rows;
        self.current_sub = 0;
        self
    }

    // ── Samples ──

    /// Samples of the currently displayed row (the trace itself when there are no rows).
    pub fn xy_coords(&self) -> &[Coordinate] {
        self.sub_spectra
            .get(self.current_sub)
            .map(|s| s.coords.as_slice())
            .unwrap_or(&self.coords)
    }

    pub fn sub_spectra(&self) -> &[SubSpectrum] {
        &self.sub_spectra
    }

    pub fn first_x(&self) -> f64 {
        self.xy_coords().first().map(|c| c.x).unwrap_or(0.0)
    }

    pub fn last_x(&self) -> f64 {
        self.xy_coords().last().map(|c| c.x).unwrap_or(0.0)
    }

    pub fn y_value_at(&self, x: f64) -> f64 {
        coordinate::y_value_at(self.xy_coords(), x)
    }

    pub fn spec_shift(&self) -> f64 {
        self.spec_shift
    }

    /// Calibration shift: moves every sample (all rows included) by `dx`.
    /// Destructive. Returns the cumulative shift.
    pub fn add_spec_shift(&mut self, dx: f64) -> f64 {
        if dx != 0.0 {
            self.spec_shift += dx;
            coordinate::shift_x(&mut self.coords, dx);
            for sub in &mut self.sub_spectra {
                coordinate::shift_x(&mut sub.coords, dx);
            }
            for peak in &mut self.peaks {
                peak.x += dx;
                peak.x_min += dx;
                peak.x_max += dx;
            }
        }
        self.spec_shift
    }

    // ── Sub-spectra ──

    pub fn has_sub_spectra(&self) -> bool {
        !self.sub_spectra.is_empty()
    }

    /// Current row index, or `None` for a plain trace.
    pub fn sub_index(&self) -> Option<usize> {
        self.has_sub_spectra().then_some(self.current_sub)
    }

    pub fn current_sub_spectrum(&self) -> Option<&SubSpectrum> {
        self.sub_spectra.get(self.current_sub)
    }

    /// Select row `n`, clamped into range. Returns the row actually selected.
    pub fn set_current_sub_spectrum(&mut self, n: i32) -> usize {
        if self.sub_spectra.is_empty() {
            return 0;
        }
        let last = self.sub_spectra.len() as i32 - 1;
        self.current_sub = coordinate::into_range(n, 0, last) as usize;
        self.current_sub
    }

    pub fn advance_sub_spectrum(&mut self, dir: i32) -> usize {
        self.set_current_sub_spectrum(self.current_sub as i32 + dir)
    }

    // ── Classification ──

    pub fn is_1d(&self) -> bool {
        self.dimensionality == Dimensionality::OneD
    }

    pub fn is_nmr(&self) -> bool {
        self.data_type.to_uppercase().contains("NMR")
    }

    pub fn is_hnmr(&self) -> bool {
        self.is_nmr() && self.nucleus_x == Nucleus::H1
    }

    pub fn is_ms(&self) -> bool {
        let dt = self.data_type.to_uppercase();
        dt.contains("MASS") || dt == "MS"
    }

    pub fn is_transmittance(&self) -> bool {
        let s = self.y_units.to_lowercase();
        s.contains("trans") || s == "t"
    }

    pub fn is_inverted(&self) -> bool {
        self.is_transmittance()
    }

    pub fn is_stackable(&self) -> bool {
        !self.is_ms()
    }

    pub fn is_scalable(&self) -> bool {
        true
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Baseline value that vertical scaling pivots on.
    pub fn y_ref(&self) -> f64 {
        if !self.is_transmittance() {
            return 0.0;
        }
        let c = self.xy_coords();
        if coordinate::max_y(c, 0, c.len().saturating_sub(1)) < 2.0 {
            1.0
        } else {
            100.0
        }
    }

    pub fn should_display_x_axis_increasing(&self) -> bool {
        let dt = self.data_type.to_uppercase();
        let xu = self.x_units.to_uppercase();
        if dt.contains("NMR") && !dt.contains("FID") {
            false
        } else if (dt.starts_with("IR") || dt.contains("INFRA") || dt.contains("RAMAN")) && xu.contains("CM") {
            false
        } else if dt.contains("VIS") && xu.contains("NANOMETERS") {
            true
        } else {
            self.x_increases
        }
    }

    pub fn axis_label(&self, is_x: bool) -> String {
        let label = if is_x { &self.x_units } else { &self.y_units };
        if label.eq_ignore_ascii_case("WAVENUMBERS") {
            "1/cm".to_string()
        } else if label.eq_ignore_ascii_case("NANOMETERS") {
            "nm".to_string()
        } else {
            label.clone()
        }
    }

    pub fn title_label(&self) -> String {
        if self.is_nmr() {
            match &self.nucleus_y {
                Some(ny) => format!("2D {}/{} NMR {}", self.nucleus_x, ny, self.title),
                None => format!("{:.0} MHz {} NMR {}", self.observed_freq, self.nucleus_x, self.title),
            }
        } else {
            self.title.clone()
        }
    }

    // ── Peaks ──

    pub fn find_x_for_peak_nearest(&self, x: f64) -> f64 {
        coordinate::find_x_for_peak_nearest(self.xy_coords(), x, self.is_inverted())
    }

    /// Closest extremum above `y` on either side of `x`; NaN if neither side crosses.
    pub fn nearest_peak(&self, x: f64, y: f64) -> f64 {
        let c = self.xy_coords();
        let inv = self.is_inverted();
        let x0 = coordinate::nearest_x_with_y_above(c, x, y, inv, false);
        let x1 = coordinate::nearest_x_with_y_above(c, x, y, inv, true);
        if x0.is_nan() {
            x1
        } else if x1.is_nan() {
            x0
        } else if (x0 - x).abs() < (x1 - x).abs() {
            x0
        } else {
            x1
        }
    }

    /// Next peak from `x` in the direction of `step`, wrapping to the farthest
    /// peak on the other side when none remain ahead.
    pub fn set_next_peak(&self, x: f64, step: i32) -> Option<usize> {
        let x0 = x + step as f64 * 0.000001;
        let mut ahead: Option<(usize, f64)> = None;
        let mut behind: Option<(usize, f64)> = None;
        for (i, p) in self.peaks.iter().enumerate().rev() {
            let d = p.x - x0;
            let is_ahead = if step > 0 { d > 0.0 } else { d < 0.0 };
            let is_behind = if step > 0 { d < 0.0 } else { d > 0.0 };
            if is_ahead && ahead.map_or(true, |(_, best)| d.abs() < best) {
                ahead = Some((i, d.abs()));
            } else if is_behind && behind.map_or(true, |(_, best)| d.abs() > best) {
                behind = Some((i, d.abs()));
            }
        }
        ahead.or(behind).map(|(i, _)| i)
    }

    pub fn find_peak_by_coord(&self, x: f64) -> Option<usize> {
        self.peaks
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.check_range(x)))
            .filter(|(_, d)| *d < f64::MAX)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Label for a measured x-distance: Hz for 1H NMR, ppm for other nuclei.
    pub fn measurement_text(&self, dx: f64, is_integral: bool) -> String {
        if dx.is_nan() {
            return String::new();
        }
        let mut dx = dx.abs();
        let mut precision = 1;
        let mut units = "";
        if self.is_nmr() {
            if !self.is_1d() {
                return String::new();
            }
            if self.is_hnmr() || is_integral {
                if !is_integral {
                    dx *= self.observed_freq;
                    units = " Hz";
                }
            } else {
                units = " ppm";
                precision = 2;
            }
        }
        if dx < 0.1 {
            return String::new();
        }
        format!("{:.*}{}", precision, dx, units)
    }
}

// ── Compatibility ──

fn are_units_compatible(u1: &str, u2: &str) -> bool {
    if u1.eq_ignore_ascii_case(u2) {
        return true;
    }
    let (u1, u2) = (u1.to_uppercase(), u2.to_uppercase());
    (u1 == "HZ" && u2 == "PPM") || (u1 == "PPM" && u2 == "HZ")
}

/// Whether `s2` can share an x axis with `s1` (overlay, sub-spectrum or link).
pub fn are_x_scales_compatible(s1: &Spectrum, s2: &Spectrum, is_sub_spec_check: bool, is_link_check: bool) -> bool {
    let is_nmr = s1.is_nmr();
    if is_nmr != s2.is_nmr()
        || s1.is_continuous() != s2.is_continuous()
        || (!is_link_check && !are_units_compatible(&s1.x_units, &s2.x_units))
    {
        return false;
    }
    if is_sub_spec_check {
        if s1.is_1d() != s2.is_1d() {
            return false;
        }
    } else if is_link_check {
        if !is_nmr {
            return true;
        }
    } else if !s1.is_1d() || !s2.is_1d() {
        return false;
    }
    !is_nmr || (s2.is_1d() && s1.nucleus_x == s2.nucleus_x)
}

pub fn are_linkable_x(s1: &Spectrum, s2: &Spectrum) -> bool {
    s1.is_nmr() && s2.is_nmr() && s1.nucleus_x == s2.nucleus_x
}

pub fn are_linkable_y(s1: &Spectrum, s2: &Spectrum) -> bool {
    s1.is_nmr() && s2.is_nmr() && s2.nucleus_y.as_ref() == Some(&s1.nucleus_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(n: usize) -> Vec<Coordinate> {
        (0..n).map(|i| Coordinate::new(i as f64 * 0.1, (i % 7) as f64)).collect()
    }

    fn hsqc() -> Spectrum {
        let rows = (0..4)
            .map(|r| SubSpectrum {
                coords: trace(20),
                y_2d: 20.0 + r as f64 * 10.0,
            })
            .collect();
        Spectrum::new_nmr_2d("hsqc", Nucleus::H1, Nucleus::C13, 400.0, rows)
    }

    #[test]
    fn test_parse_nucleus() {
        assert_eq!(Nucleus::parse("^1H"), Nucleus::H1);
        assert_eq!(Nucleus::parse("c13"), Nucleus::C13);
        assert_eq!(Nucleus::parse("29Si"), Nucleus::Other("29SI".into()));
        assert_eq!(Nucleus::C13.to_string(), "13C");
    }

    #[test]
    fn test_link_compatibility_scenario() {
        let c13 = Spectrum::new_nmr_1d("c", Nucleus::C13, 100.0, trace(10));
        let hsqc = hsqc();
        assert!(!are_linkable_x(&c13, &hsqc));
        assert!(are_linkable_y(&c13, &hsqc));
        let h1 = Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, trace(10));
        assert!(are_linkable_x(&h1, &hsqc));
        assert!(!are_linkable_y(&h1, &hsqc));
    }

    #[test]
    fn test_x_scale_compatibility() {
        let a = Spectrum::new_nmr_1d("a", Nucleus::H1, 400.0, trace(10));
        let mut b = Spectrum::new_nmr_1d("b", Nucleus::H1, 400.0, trace(10));
        assert!(are_x_scales_compatible(&a, &b, false, false));
        b.x_units = "HZ".into();
        assert!(are_x_scales_compatible(&a, &b, false, false));
        let c = Spectrum::new_nmr_1d("c", Nucleus::C13, 100.0, trace(10));
        assert!(!are_x_scales_compatible(&a, &c, false, false));
        let ir = Spectrum::new_1d("ir", "INFRARED SPECTRUM", "1/CM", "TRANSMITTANCE", trace(10));
        assert!(!are_x_scales_compatible(&a, &ir, false, false));
        // 2D never overlays, but links
        assert!(!are_x_scales_compatible(&a, &hsqc(), false, false));
        assert!(are_x_scales_compatible(&hsqc(), &a, false, true));
    }

    #[test]
    fn test_classification() {
        let ir = Spectrum::new_1d("ir", "INFRARED SPECTRUM", "1/CM", "TRANSMITTANCE", trace(10));
        assert!(ir.is_inverted());
        assert_eq!(ir.y_ref(), 100.0);
        assert!(!ir.should_display_x_axis_increasing());
        let ms = Spectrum::new_1d("ms", "MASS SPECTRUM", "M/Z", "RELATIVE ABUNDANCE", trace(5)).discrete();
        assert!(!ms.is_stackable());
        assert!(ms.should_display_x_axis_increasing());
        let h = Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, trace(5));
        assert!(h.is_hnmr());
        assert!(!h.should_display_x_axis_increasing());
        assert_eq!(h.y_ref(), 0.0);
    }

    #[test]
    fn test_sub_spectrum_stepping_clamps() {
        let mut s = hsqc();
        assert_eq!(s.sub_index(), Some(0));
        assert_eq!(s.advance_sub_spectrum(1), 1);
        assert_eq!(s.advance_sub_spectrum(10), 3);
        assert_eq!(s.set_current_sub_spectrum(-4), 0);
        let plain = Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, trace(5));
        assert_eq!(plain.sub_index(), None);
    }

    #[test]
    fn test_add_spec_shift_is_cumulative_and_destructive() {
        let mut s = hsqc();
        let x0 = s.xy_coords()[0].x;
        assert_eq!(s.add_spec_shift(0.5), 0.5);
        assert_eq!(s.add_spec_shift(0.25), 0.75);
        assert!((s.xy_coords()[0].x - (x0 + 0.75)).abs() < 1e-12);
        s.set_current_sub_spectrum(3);
        assert!((s.xy_coords()[0].x - (x0 + 0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_set_next_peak_wraps() {
        let s = Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, trace(5)).with_peaks(vec![
            PeakInfo::new(1.0, 0.05, "a"),
            PeakInfo::new(2.0, 0.05, "b"),
            PeakInfo::new(3.0, 0.05, "c"),
        ]);
        assert_eq!(s.set_next_peak(1.5, 1), Some(1));
        assert_eq!(s.set_next_peak(1.5, -1), Some(0));
        // nothing ahead: wrap to farthest behind
        assert_eq!(s.set_next_peak(3.5, 1), Some(0));
        assert_eq!(s.set_next_peak(0.5, -1), Some(2));
        assert_eq!(s.find_peak_by_coord(2.03), Some(1));
        assert_eq!(s.find_peak_by_coord(2.5), None);
    }

    #[test]
    fn test_measurement_text_units() {
        let h = Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, trace(5));
        assert_eq!(h.measurement_text(0.0175, false), "7.0 Hz");
        let c = Spectrum::new_nmr_1d("c", Nucleus::C13, 100.0, trace(5));
        assert_eq!(c.measurement_text(1.234, false), "1.23 ppm");
        assert_eq!(c.measurement_text(0.01, false), "");
    }
}
