/// One zoom-history entry: the scales for a pane plus visible index ranges

use super::scale_data::{self, ScaleData};
use crate::data::coordinate::{self, Coordinate};
use crate::data::Spectrum;
use serde::{Deserialize, Serialize};

/// Which scale(s) a vertical scaling request applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleTarget {
    Spectrum(usize),
    All,
    /// Grey-scale contrast of the 2D image.
    Image2D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewData {
    scales: Vec<ScaleData>,
    start_indices: Vec<usize>,
    end_indices: Vec<usize>,
    current: usize,
}

impl ViewData {
    /// Build a view over `spectra[i].xy_coords()[starts[i]..=ends[i]]`.
    /// A 2D pane shares one scale; otherwise each spectrum gets its own.
    /// Unequal `y1`/`y2` force the Y extent.
    pub fn new(
        spectra: &[Spectrum],
        y1: f64,
        y2: f64,
        starts: &[usize],
        ends: &[usize],
        continuous: bool,
        is_2d: bool,
    ) -> Self {
        let n = if is_2d { 1 } else { spectra.len().max(1) };
        let scales = (0..n)
            .map(|i| ScaleData::with_indices(starts.get(i).copied().unwrap_or(0), ends.get(i).copied().unwrap_or(0)))
            .collect();
        let mut vd = Self {
            scales,
            start_indices: starts.to_vec(),
            end_indices: ends.to_vec(),
            current: 0,
        };
        vd.init(spectra, y1, y2, continuous);
        vd
    }

    fn init(&mut self, spectra: &[Spectrum], y1: f64, y2: f64, continuous: bool) {
        self.current = 0;
        for (sd, spec) in self.scales.iter_mut().zip(spectra) {
            sd.user_y_factor = spec.user_y_factor;
            sd.spectrum_y_ref = spec.y_ref();
        }
        self.reset_scale_factors();
        let min_x = self.fold_over(spectra, f64::MAX, |c, s, e| coordinate::min_x(c, s, e), f64::min, |_, v| v);
        let max_x = self.fold_over(spectra, f64::MIN, |c, s, e| coordinate::max_x(c, s, e), f64::max, |_, v| v);
        let user = |spec: &Spectrum, v: f64| {
            let yr = spec.y_ref();
            (v - yr) * spec.user_y_factor + yr
        };
        let mut min_y = self.fold_over(spectra, f64::MAX, |c, s, e| coordinate::min_y(c, s, e), f64::min, user);
        let mut max_y = self.fold_over(spectra, f64::MIN, |c, s, e| coordinate::max_y(c, s, e), f64::max, user);
        if y1 != y2 {
            min_y = y1.min(y2);
            max_y = y1.max(y2);
        }
        let inverted = spectra.first().map(|s| s.is_inverted()).unwrap_or(false);
        for sd in &mut self.scales {
            sd.set_min_max(min_x, max_x, min_y, max_y);
            sd.set_scale(continuous, inverted);
        }
    }

    fn fold_over(
        &self,
        spectra: &[Spectrum],
        init: f64,
        extent: impl Fn(&[Coordinate], usize, usize) -> f64,
        pick: impl Fn(f64, f64) -> f64,
        adjust: impl Fn(&Spectrum, f64) -> f64,
    ) -> f64 {
        spectra.iter().enumerate().fold(init, |acc, (i, spec)| {
            let v = extent(spec.xy_coords(), self.start_index(i), self.end_index(i));
            pick(acc, adjust(spec, v))
        })
    }

    /// Re-fit after the spectrum list changed; visible ranges reset to full.
    pub fn new_spectrum(&mut self, spectra: &[Spectrum], continuous: bool) {
        self.start_indices = vec![0; spectra.len()];
        self.end_indices = spectra.iter().map(|s| s.xy_coords().len().saturating_sub(1)).collect();
        self.init(spectra, 0.0, 0.0, continuous);
    }

    // ── Scales ──

    pub fn scale_data(&self) -> &[ScaleData] {
        &self.scales
    }

    pub fn scale_data_mut(&mut self) -> &mut [ScaleData] {
        &mut self.scales
    }

    /// The scale most recently selected with [`ViewData::set_scale`].
    pub fn scale(&self) -> &ScaleData {
        &self.scales[self.current]
    }

    pub fn scale_mut(&mut self) -> &mut ScaleData {
        &mut self.scales[self.current]
    }

    pub fn scale_index(&self, i: usize) -> usize {
        i.min(self.scales.len() - 1)
    }

    pub fn scale_at(&self, i: usize) -> &ScaleData {
        &self.scales[self.scale_index(i)]
    }

    /// Make spectrum `i`'s scale current and refit it to the pixel extent.
    pub fn set_scale(&mut self, i: usize, x_pixels: i32, y_pixels: i32, inverted: bool) {
        self.current = self.scale_index(i);
        self.scales[self.current].set_xy_scale(x_pixels, y_pixels, inverted);
    }

    /// Apply a vertical factor. Zero or NaN factors are ignored.
    pub fn scale_spectrum(&mut self, target: ScaleTarget, f: f64) {
        if f == 0.0 || f.is_nan() {
            return;
        }
        match target {
            ScaleTarget::Image2D => self.scales[self.current].scale_2d(f),
            ScaleTarget::All => self.scales.iter_mut().for_each(|sd| sd.scale_by(f)),
            ScaleTarget::Spectrum(i) => {
                let i = self.scale_index(i);
                self.scales[i].scale_by(f);
            }
        }
    }

    pub fn reset_scale_factors(&mut self) {
        for sd in &mut self.scales {
            sd.spectrum_scale_factor = 1.0;
        }
    }

    /// Scales to seed the next view's Y extent. For an X-only zoom these are
    /// the current scales; otherwise the selected scale (every scale when
    /// `selected` is `None`) is pinned to the literal range `[y1, y2]`.
    pub fn new_scales(&self, selected: Option<usize>, x_only: bool, y1: f64, y2: f64) -> Vec<ScaleData> {
        let mut sd = self.scales.clone();
        if x_only {
            return sd;
        }
        let pin = |s: &mut ScaleData| {
            s.is_shift_zoomed_y = true;
            s.min_y_on_scale = y1;
            s.max_y_on_scale = y2;
        };
        match selected {
            Some(i) => pin(&mut sd[self.scale_index(i)]),
            None => sd.iter_mut().for_each(pin),
        }
        sd
    }

    pub fn are_y_scales_same(&self, i: usize, j: usize) -> bool {
        let (a, b) = (self.scale_at(i), self.scale_at(j));
        a.min_y_on_scale == b.min_y_on_scale && a.max_y_on_scale == b.max_y_on_scale
    }

    // ── Index ranges ──

    pub fn start_index(&self, i: usize) -> usize {
        self.start_indices.get(i).copied().unwrap_or(0)
    }

    pub fn end_index(&self, i: usize) -> usize {
        self.end_indices.get(i).copied().unwrap_or(0)
    }

    /// Recompute the visible range of the first trace after switching rows.
    pub fn set_x_range_for_sub_spectrum(&mut self, coords: &[Coordinate]) {
        let (lo, hi) = (self.scales[0].min_x, self.scales[0].max_x);
        if let Some((s, e)) = ScaleData::x_range_indices(coords, lo, hi, 1) {
            if self.start_indices.is_empty() {
                self.start_indices.push(s);
                self.end_indices.push(e);
            } else {
                self.start_indices[0] = s;
                self.end_indices[0] = e;
            }
            let sd = &mut self.scales[0];
            sd.start_index = s;
            sd.end_index = e;
            sd.point_count = e + 1 - s;
        }
    }

    /// Carry scale factors (and optionally Y extents) forward from a prior view.
    pub fn inherit(&mut self, factors_from: &[ScaleData], y_from: Option<&[ScaleData]>) {
        scale_data::copy_scale_factors(factors_from, &mut self.scales);
        if let Some(y) = y_from {
            scale_data::copy_y_scales(y, &mut self.scales);
        }
    }
}
