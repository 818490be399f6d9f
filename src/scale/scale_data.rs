/// Nice-scale derivation and value <-> pixel conversion for one axis pair
///
/// A `ScaleData` holds the raw data extents of a sample sub-range, the
/// grid-snapped "on scale" extents used for labelling, the tick steps and
/// decimal precisions, and the affine factors for pixel mapping. Vertical
/// user scaling is carried either as `spectrum_scale_factor` or, once the
/// Y pins have been dragged, as literal shift-zoomed on-scale bounds.

use crate::data::coordinate::{self, Coordinate};
use serde::{Deserialize, Serialize};

/// Target number of divisions across an axis.
pub const NDIV: f64 = 14.0;

/// Allowed step mantissas, tried in order.
const NTICKS: [f64; 4] = [2.0, 5.0, 10.0, 10.0];
/// Minor tick counts keyed by the fractional part of log10(step).
const LOGTICKS: [f64; 4] = [std::f64::consts::LOG10_2, 0.698_970_004_336_018_8, 0.0, 1.0];
/// Pixel offsets are clamped to this many pixels either side of the plot.
const MAX_PIXEL_OFFSET: f64 = 1.0e7;

/// Truncate a fractional pixel offset, keeping far off-plot values finite.
fn pixel_offset(v: f64) -> i32 {
    v.clamp(-MAX_PIXEL_OFFSET, MAX_PIXEL_OFFSET) as i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleData {
    pub start_index: usize,
    pub end_index: usize,
    pub point_count: usize,

    pub min_x: f64,
    pub max_x: f64,
    pub first_x: f64,
    pub min_x_on_scale: f64,
    pub max_x_on_scale: f64,
    pub spec_shift: f64,

    pub min_y: f64,
    pub max_y: f64,
    pub first_y: f64,
    pub min_y_on_scale: f64,
    pub max_y_on_scale: f64,

    /// Decimal places for labels; negative means scientific notation.
    pub precision: [i32; 2],
    pub export_precision: [i32; 2],
    pub steps: [f64; 2],
    pub minor_tick_counts: [u32; 2],

    pub is_shift_zoomed_y: bool,
    pub spectrum_scale_factor: f64,
    pub spectrum_y_ref: f64,
    pub user_y_factor: f64,

    init_min_y_on_scale: f64,
    init_max_y_on_scale: f64,
    init_min_y: f64,
    init_max_y: f64,
    x_factor_for_scale: f64,
    y_factor_for_scale: f64,
}

impl Default for ScaleData {
    fn default() -> Self {
        Self {
            start_index: 0,
            end_index: 0,
            point_count: 0,
            min_x: 0.0,
            max_x: 0.0,
            first_x: f64::NAN,
            min_x_on_scale: 0.0,
            max_x_on_scale: 0.0,
            spec_shift: 0.0,
            min_y: 0.0,
            max_y: 0.0,
            first_y: 0.0,
            min_y_on_scale: 0.0,
            max_y_on_scale: 0.0,
            precision: [0; 2],
            export_precision: [0; 2],
            steps: [0.0; 2],
            minor_tick_counts: [0; 2],
            is_shift_zoomed_y: false,
            spectrum_scale_factor: 1.0,
            spectrum_y_ref: 0.0,
            user_y_factor: 1.0,
            init_min_y_on_scale: 0.0,
            init_max_y_on_scale: 0.0,
            init_min_y: 0.0,
            init_max_y: 0.0,
            x_factor_for_scale: 0.0,
            y_factor_for_scale: 0.0,
        }
    }
}

impl ScaleData {
    /// An unscaled placeholder covering samples `start..=end`.
    pub fn with_indices(start: usize, end: usize) -> Self {
        Self {
            start_index: start,
            end_index: end,
            point_count: (end + 1).saturating_sub(start),
            ..Default::default()
        }
    }

    /// Scale fitted to `coords[start..=end]`. Discrete (stick) data with an
    /// all-positive range is anchored at zero.
    pub fn from_coords(coords: &[Coordinate], start: usize, end: usize, continuous: bool, inverted: bool) -> Self {
        let mut sd = Self::with_indices(start, end);
        sd.min_x = coordinate::min_x(coords, start, end);
        sd.max_x = coordinate::max_x(coords, start, end);
        sd.min_y = coordinate::min_y(coords, start, end);
        if sd.min_y > 0.0 && !continuous {
            sd.min_y = 0.0;
        }
        sd.max_y = coordinate::max_y(coords, start, end);
        sd.set_scale(continuous, inverted);
        sd
    }

    pub fn set_min_max(&mut self, min_x: f64, max_x: f64, min_y: f64, max_y: f64) {
        self.min_x = min_x;
        self.max_x = max_x;
        self.min_y = min_y;
        self.max_y = max_y;
    }

    pub fn set_scale(&mut self, continuous: bool, inverted: bool) {
        self.set_x_scale();
        if !continuous {
            // stick data should not end on a gridline
            self.max_x_on_scale += self.steps[0] / 2.0;
        }
        self.set_y_scale(self.min_y, self.max_y, true, inverted);
    }

    fn set_x_scale(&mut self) {
        let step = self.set_scale_params(self.min_x, self.max_x, 0);
        self.first_x = (self.min_x / step).floor() * step;
        if ((self.min_x - self.first_x) / step).abs() > 0.0001 {
            self.first_x += step;
        }
        self.min_x_on_scale = self.min_x;
        self.max_x_on_scale = self.max_x;
    }

    pub fn is_y_zero_on_scale(&self) -> bool {
        self.min_y_on_scale < self.spectrum_y_ref && self.max_y_on_scale > self.spectrum_y_ref
    }

    /// Fit the Y axis. With `set_scale_min_max`, bounds snap outward to
    /// quarter/half steps (swapped for inverted traces) with 5% headroom,
    /// and the result is remembered as the initial Y extent.
    pub fn set_y_scale(&mut self, min_y: f64, max_y: f64, set_scale_min_max: bool, inverted: bool) {
        let (mut min_y, mut max_y) = (min_y, max_y);
        if min_y == 0.0 && max_y == 0.0 {
            max_y = 1.0;
        }
        if self.is_shift_zoomed_y {
            min_y = self.min_y_on_scale;
            max_y = self.max_y_on_scale;
        }
        let step = self.set_scale_params(min_y, max_y, 1);
        let dy = if inverted { step / 2.0 } else { step / 4.0 };
        let dy2 = if inverted { step / 4.0 } else { step / 2.0 };
        if !self.is_shift_zoomed_y {
            self.min_y_on_scale = if min_y == 0.0 {
                0.0
            } else if set_scale_min_max {
                dy * (min_y / dy).floor()
            } else {
                min_y
            };
            self.max_y_on_scale = if set_scale_min_max {
                dy2 * (max_y * 1.05 / dy2).ceil()
            } else {
                max_y
            };
        }
        self.first_y = if min_y == 0.0 { 0.0 } else { (min_y / dy).floor() * dy };
        if self.min_y_on_scale < 0.0 && self.max_y_on_scale > 0.0 {
            // force a gridline through zero
            self.first_y = 0.0;
            while self.first_y - step > self.min_y_on_scale {
                self.first_y -= step;
            }
        } else if self.min_y_on_scale != 0.0 && ((min_y - self.first_y) / dy).abs() > 0.0001 {
            self.first_y += dy;
        }
        if set_scale_min_max {
            self.init_min_y_on_scale = self.min_y_on_scale;
            self.init_max_y_on_scale = self.max_y_on_scale;
            self.init_min_y = min_y;
            self.init_max_y = max_y;
        }
    }

    /// Grey-scale contrast for a 2D image: `f == 1` restores the initial range.
    pub fn scale_2d(&mut self, f: f64) {
        if f == 1.0 {
            self.max_y = self.init_max_y;
            self.min_y = self.init_min_y;
            return;
        }
        self.max_y = self.min_y + (self.max_y - self.min_y) / f;
    }

    pub fn set_x_range(&mut self, x1: f64, x2: f64) {
        self.min_x = x1;
        self.max_x = x2;
        self.set_x_scale();
    }

    pub fn is_in_range_x(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn add_spec_shift(&mut self, dx: f64) {
        self.spec_shift += dx;
        self.min_x += dx;
        self.max_x += dx;
        self.min_x_on_scale += dx;
        self.max_x_on_scale += dx;
        self.first_x += dx;
    }

    /// Step, precision and minor-tick count for axis `i` (0 = x, 1 = y).
    fn set_scale_params(&mut self, min: f64, max: f64, i: usize) -> f64 {
        let dx = if max == min { 1.0 } else { (max - min).abs() / NDIV };
        let log = dx.abs().log10();
        let exp = log.floor() as i32;
        self.export_precision[i] = exp;
        self.precision[i] = if exp <= 0 {
            (1 - exp).min(8)
        } else if exp > 3 {
            -2
        } else {
            0
        };

        let dec = 10f64.powf(log - exp as f64);
        let mut j = 0;
        while j < NTICKS.len() - 1 && dec > NTICKS[j] {
            j += 1;
        }
        self.steps[i] = 10f64.powi(exp) * NTICKS[j];

        let log = (self.steps[i] * 1.0001e5).abs().log10();
        let mantissa = log - log.floor();
        self.minor_tick_counts[i] = LOGTICKS
            .iter()
            .zip(NTICKS.iter())
            .find(|(lt, _)| (mantissa - **lt).abs() < 0.001)
            .map(|(_, n)| *n as u32)
            .unwrap_or(0);
        self.steps[i]
    }

    // ── Pixel conversion ──
    //
    // Pixels are integer device coordinates; y grows downward.

    pub fn to_x(&self, x_pixel: i32, x_pixel1: i32, left_to_right: bool) -> f64 {
        self.to_x_scaled(x_pixel, x_pixel1, left_to_right, self.x_factor_for_scale)
    }

    /// As `to_x`, but with the factor derived from the plot width instead of
    /// the cached live factor. Used against the first view in history.
    pub fn to_x0(&self, x_pixel: i32, x_pixel0: i32, x_pixel1: i32, left_to_right: bool) -> f64 {
        let factor = (self.max_x_on_scale - self.min_x_on_scale) / (x_pixel1 - x_pixel0) as f64;
        self.to_x_scaled(x_pixel, x_pixel1, left_to_right, factor)
    }

    fn to_x_scaled(&self, x_pixel: i32, x_pixel1: i32, left_to_right: bool, factor: f64) -> f64 {
        let d = (x_pixel1 - x_pixel) as f64 * factor;
        if left_to_right {
            self.max_x_on_scale - d
        } else {
            self.min_x_on_scale + d
        }
    }

    pub fn to_pixel_x(&self, x: f64, x_pixel0: i32, x_pixel1: i32, left_to_right: bool) -> i32 {
        self.to_pixel_x_scaled(x, x_pixel0, x_pixel1, left_to_right, self.x_factor_for_scale)
    }

    pub fn to_pixel_x0(&self, x: f64, x_pixel0: i32, x_pixel1: i32, left_to_right: bool) -> i32 {
        let factor = (self.max_x_on_scale - self.min_x_on_scale) / (x_pixel1 - x_pixel0) as f64;
        self.to_pixel_x_scaled(x, x_pixel0, x_pixel1, left_to_right, factor)
    }

    fn to_pixel_x_scaled(&self, x: f64, x_pixel0: i32, x_pixel1: i32, left_to_right: bool, factor: f64) -> i32 {
        let px = pixel_offset((x - self.min_x_on_scale) / factor);
        if left_to_right {
            x_pixel0.saturating_add(px)
        } else {
            x_pixel1.saturating_sub(px)
        }
    }

    pub fn to_y(&self, y_pixel: i32, y_pixel0: i32) -> f64 {
        self.max_y_on_scale + (y_pixel0 - y_pixel) as f64 * self.y_factor_for_scale
    }

    /// Y value for a pixel, clamped to the on-scale range.
    pub fn to_y0(&self, y_pixel: i32, y_pixel0: i32, y_pixel1: i32) -> f64 {
        let factor = (self.max_y_on_scale - self.min_y_on_scale) / (y_pixel1 - y_pixel0) as f64;
        let y = self.max_y_on_scale + (y_pixel0 - y_pixel) as f64 * factor;
        y.min(self.max_y_on_scale).max(self.min_y_on_scale)
    }

    /// Pixel row for a sample value, with the user y factor applied about the
    /// reference line. NaN maps to `i32::MIN` so callers can skip the point.
    pub fn to_pixel_y(&self, y: f64, y_pixel1: i32) -> i32 {
        if y.is_nan() {
            return i32::MIN;
        }
        let yr = self.spectrum_y_ref;
        let v = (y - yr) * self.user_y_factor + yr - self.min_y_on_scale;
        y_pixel1.saturating_sub(pixel_offset(v / self.y_factor_for_scale))
    }

    pub fn to_pixel_y0(&self, y: f64, y_pixel0: i32, y_pixel1: i32) -> i32 {
        let factor = (self.max_y_on_scale - self.min_y_on_scale) / (y_pixel1 - y_pixel0) as f64;
        y_pixel0.saturating_add(pixel_offset((self.max_y_on_scale - y) / factor))
    }

    /// Refit Y for the current scale factor and recompute both pixel factors.
    pub fn set_xy_scale(&mut self, x_pixels: i32, y_pixels: i32, inverted: bool) {
        let mut y_ref = self.spectrum_y_ref;
        let f = self.spectrum_scale_factor;
        let use_init = f != 1.0 || self.is_shift_zoomed_y;
        let min_y = if use_init { self.init_min_y_on_scale } else { self.min_y };
        let max_y = if use_init { self.init_max_y_on_scale } else { self.max_y };
        if use_init {
            y_ref = y_ref.max(min_y).min(max_y);
        }
        self.set_y_scale((min_y - y_ref) / f + y_ref, (max_y - y_ref) / f + y_ref, f == 1.0, inverted);
        self.x_factor_for_scale = (self.max_x_on_scale - self.min_x_on_scale) / (x_pixels - 1) as f64;
        self.y_factor_for_scale = (self.max_y_on_scale - self.min_y_on_scale) / (y_pixels - 1) as f64;
    }

    /// Vertical zoom about the reference line (or the centre of the visible
    /// range when the reference is off-screen).
    pub fn scale_by(&mut self, f: f64) {
        if self.is_shift_zoomed_y {
            let center = if self.is_y_zero_on_scale() {
                self.spectrum_y_ref
            } else {
                (self.min_y_on_scale + self.max_y_on_scale) / 2.0
            };
            self.min_y_on_scale = center - (center - self.min_y_on_scale) / f;
            self.max_y_on_scale = center - (center - self.max_y_on_scale) / f;
        } else {
            self.spectrum_scale_factor *= f;
        }
    }

    /// Visible index range of `coords` for `[init_x, final_x]`, or `None`
    /// when fewer than `min_points` samples fall inside.
    pub fn x_range_indices(coords: &[Coordinate], init_x: f64, final_x: f64, min_points: usize) -> Option<(usize, usize)> {
        if coords.is_empty() {
            return None;
        }
        let descending = coords.len() > 1 && coords[coords.len() - 1].x < coords[0].x;
        let enters = |x: f64| if descending { x <= final_x } else { x >= init_x };
        let stays = |x: f64| if descending { x >= init_x } else { x <= final_x };
        let start = coords.iter().position(|c| enters(c.x))?;
        let count = 1 + coords[start + 1..].iter().take_while(|c| stays(c.x)).count();
        (count >= min_points).then_some((start, start + count - 1))
    }
}

/// Carry user vertical scaling and calibration across a rebuilt view.
pub fn copy_scale_factors(from: &[ScaleData], to: &mut [ScaleData]) {
    for (f, t) in from.iter().zip(to.iter_mut()) {
        t.spectrum_scale_factor = f.spectrum_scale_factor;
        t.spectrum_y_ref = f.spectrum_y_ref;
        t.user_y_factor = f.user_y_factor;
        t.spec_shift = f.spec_shift;
        t.is_shift_zoomed_y = f.is_shift_zoomed_y;
    }
}

/// Carry Y extents (and any shift-zoomed Y bounds) across a rebuilt view.
pub fn copy_y_scales(from: &[ScaleData], to: &mut [ScaleData]) {
    for (f, t) in from.iter().zip(to.iter_mut()) {
        t.init_min_y_on_scale = f.init_min_y_on_scale;
        t.init_max_y_on_scale = f.init_max_y_on_scale;
        t.min_y = f.min_y;
        t.max_y = f.max_y;
        if f.is_shift_zoomed_y {
            t.is_shift_zoomed_y = true;
            t.min_y_on_scale = f.min_y_on_scale;
            t.max_y_on_scale = f.max_y_on_scale;
        }
    }
}

/// Index ranges for every trace, or `None` if any keeps fewer than `min_points`.
pub fn set_data_point_indices(traces: &[&[Coordinate]], init_x: f64, final_x: f64, min_points: usize) -> Option<(Vec<usize>, Vec<usize>)> {
    let mut starts = Vec::with_capacity(traces.len());
    let mut ends = Vec::with_capacity(traces.len());
    for coords in traces {
        let (s, e) = ScaleData::x_range_indices(coords, init_x, final_x, min_points)?;
        starts.push(s);
        ends.push(e);
    }
    Some((starts, ends))
}

/// Format `value` with `precision` decimals; negative precision gives
/// scientific notation with `-precision` mantissa decimals.
pub fn format_decimal(value: f64, precision: i32) -> String {
    if precision < 0 {
        format!("{:.*E}", (-precision) as usize, value)
    } else {
        format!("{:.*}", precision as usize, value)
    }
}

/// Strip trailing zeros shared by every label in a tick set, keeping any
/// exponent suffix. Stops as soon as one label has nothing left to trim.
pub fn trim_labels(labels: &mut [String]) {
    if labels.is_empty() {
        return;
    }
    loop {
        let all_trimmable = labels.iter().all(|s| {
            let mantissa = s.split('E').next().unwrap_or("");
            mantissa.contains('.') && (mantissa.ends_with('0') || mantissa.ends_with('.'))
        });
        if !all_trimmable {
            return;
        }
        for s in labels.iter_mut() {
            match s.find('E') {
                Some(pt) => {
                    s.remove(pt - 1);
                }
                None => {
                    s.pop();
                }
            }
        }
    }
}
