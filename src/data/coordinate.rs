/// Sample coordinates and the array algorithms the plot engine runs over them
///
/// A spectrum's samples are a `&[Coordinate]` ordered monotonically in x
/// (either direction). Everything here is a free function over that slice;
/// the only functions that mutate samples are the explicitly destructive
/// calibration transforms (`shift_x`, `apply_scale`, `apply_shift_reference`).

use crate::error::{PlotError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{},{}>", self.x, self.y)
    }
}

// ── Sub-range extrema ──

/// Inclusive index range clipped to the slice; `None` when nothing remains.
fn clip(coords: &[Coordinate], start: usize, end: usize) -> Option<&[Coordinate]> {
    if coords.is_empty() || start >= coords.len() {
        return None;
    }
    let end = end.min(coords.len() - 1);
    if start > end {
        return None;
    }
    Some(&coords[start..=end])
}

/// Minimum x over `coords[start..=end]`; `f64::MAX` for an empty range.
pub fn min_x(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    clip(coords, start, end)
        .map(|s| s.iter().fold(f64::MAX, |m, c| m.min(c.x)))
        .unwrap_or(f64::MAX)
}

/// Maximum x over `coords[start..=end]`; `f64::MIN` for an empty range.
pub fn max_x(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    clip(coords, start, end)
        .map(|s| s.iter().fold(f64::MIN, |m, c| m.max(c.x)))
        .unwrap_or(f64::MIN)
}

pub fn min_y(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    clip(coords, start, end)
        .map(|s| s.iter().fold(f64::MAX, |m, c| m.min(c.y)))
        .unwrap_or(f64::MAX)
}

pub fn max_y(coords: &[Coordinate], start: usize, end: usize) -> f64 {
    clip(coords, start, end)
        .map(|s| s.iter().fold(f64::MIN, |m, c| m.max(c.y)))
        .unwrap_or(f64::MIN)
}

/// True when the whole trace satisfies `min_y >= min` and `max_y >= max`.
pub fn is_y_in_range(coords: &[Coordinate], min: f64, max: f64) -> bool {
    let last = coords.len().saturating_sub(1);
    min_y(coords, 0, last) >= min && max_y(coords, 0, last) >= max
}

// ── Lookup ──

fn is_descending(coords: &[Coordinate]) -> bool {
    coords.len() > 1 && coords[coords.len() - 1].x < coords[0].x
}

/// Index of the sample at or just past `x` in the array's own direction,
/// clamped into `[0, len-1]`. Returns 0 for an empty slice.
pub fn nearest_index_for_x(coords: &[Coordinate], x: f64) -> usize {
    if coords.is_empty() {
        return 0;
    }
    let i = if is_descending(coords) {
        coords.partition_point(|c| c.x > x)
    } else {
        coords.partition_point(|c| c.x < x)
    };
    i.min(coords.len() - 1)
}

/// Linear interpolation of y at `x`; NaN when `x` falls before the second
/// sample (no left neighbour to interpolate from).
pub fn y_value_at(coords: &[Coordinate], x: f64) -> f64 {
    let i = nearest_index_for_x(coords, x);
    if i == 0 {
        return f64::NAN;
    }
    let (c0, c1) = (coords[i - 1], coords[i]);
    if c1.x == c0.x {
        return c1.y;
    }
    c0.y + (c1.y - c0.y) / (c1.x - c0.x) * (x - c0.x)
}

pub fn into_range(i: i32, i0: i32, i1: i32) -> i32 {
    i.min(i1).max(i0)
}

pub fn delta_x(last: f64, first: f64, num_points: usize) -> f64 {
    (last - first) / (num_points as f64 - 1.0)
}

// ── Peak search ──

/// Sub-sample x of the extremum at `pt` from its two neighbours.
/// A flat top (zero curvature) yields the sample's own x.
pub fn parabolic_interpolation(coords: &[Coordinate], pt: usize) -> f64 {
    if pt == 0 || pt + 1 >= coords.len() {
        return coords.get(pt).map(|c| c.x).unwrap_or(f64::NAN);
    }
    let alpha = coords[pt - 1].y;
    let beta = coords[pt].y;
    let gamma = coords[pt + 1].y;
    let denom = alpha - 2.0 * beta + gamma;
    if denom == 0.0 {
        return coords[pt].x;
    }
    let p = (alpha - gamma) / 2.0 / denom;
    coords[pt].x + p * (coords[pt + 1].x - coords[pt].x)
}

/// Index of the local extremum reached by climbing from the sample nearest
/// `x`. Returns the index and the number of steps taken.
pub fn walk_to_extremum(coords: &[Coordinate], x: f64, is_min: bool) -> (usize, usize) {
    let mut pt = nearest_index_for_x(coords, x);
    let f = if is_min { -1.0 } else { 1.0 };
    let mut steps = 0;
    while pt + 1 < coords.len() && f * (coords[pt + 1].y - coords[pt].y) > 0.0 {
        pt += 1;
        steps += 1;
    }
    while pt >= 1 && f * (coords[pt - 1].y - coords[pt].y) > 0.0 {
        pt -= 1;
        steps += 1;
    }
    (pt, steps)
}

/// x of the local maximum (or minimum when `is_min`) nearest to `x`,
/// refined parabolically unless the extremum sits on an array boundary.
pub fn find_x_for_peak_nearest(coords: &[Coordinate], x: f64, is_min: bool) -> f64 {
    if coords.is_empty() {
        return f64::NAN;
    }
    let (pt, _) = walk_to_extremum(coords, x, is_min);
    if pt == 0 || pt == coords.len() - 1 {
        return coords[pt].x;
    }
    parabolic_interpolation(coords, pt)
}

/// Walk from `x` in one direction until y crosses `y` (from below, or from
/// above when `inverted`), then settle on the nearest extremum.
/// NaN when the walk leaves the array first.
pub fn nearest_x_with_y_above(
    coords: &[Coordinate],
    x: f64,
    y: f64,
    inverted: bool,
    forward: bool,
) -> f64 {
    if coords.is_empty() {
        return f64::NAN;
    }
    let f = if inverted { -1.0 } else { 1.0 };
    let mut pt = nearest_index_for_x(coords, x) as isize;
    let n = coords.len() as isize;
    let step = if forward { 1 } else { -1 };
    while pt >= 0 && pt < n && f * (coords[pt as usize].y - y) < 0.0 {
        pt += step;
    }
    if pt < 0 || pt >= n {
        return f64::NAN;
    }
    find_x_for_peak_nearest(coords, coords[pt as usize].x, inverted)
}

// ── Transforms ──

/// Shift every sample's x by `dx`. Destructive.
pub fn shift_x(coords: &mut [Coordinate], dx: f64) {
    for c in coords.iter_mut() {
        c.x += dx;
    }
}

/// Multiply samples by the given factors. Destructive; a no-op when both are 1.
pub fn apply_scale(coords: &mut [Coordinate], x_scale: f64, y_scale: f64) {
    if x_scale != 1.0 || y_scale != 1.0 {
        for c in coords.iter_mut() {
            c.x *= x_scale;
            c.y *= y_scale;
        }
    }
}

pub fn remove_scale(coords: &mut [Coordinate], x_scale: f64, y_scale: f64) {
    apply_scale(coords, 1.0 / x_scale, 1.0 / y_scale);
}

/// How a chemical-shift reference offset is anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShiftReference {
    /// Anchor on data point `point_num` (1-based, counted from the end).
    DataPoint {
        point_num: usize,
        offset: f64,
        observed_freq: f64,
    },
    FirstX {
        first_x: f64,
        offset: f64,
        observed_freq: f64,
    },
    LastX { last_x: f64, offset: f64 },
}

/// Re-reference all sample x values. Destructive.
/// Returns the amount subtracted, or `None` when the anchor point is out of range.
pub fn apply_shift_reference(coords: &mut [Coordinate], reference: ShiftReference) -> Option<f64> {
    let shift = match reference {
        ShiftReference::DataPoint {
            point_num,
            offset,
            observed_freq,
        } => {
            if point_num == 0 || point_num > coords.len() {
                return None;
            }
            coords[coords.len() - point_num].x - offset * observed_freq
        }
        ShiftReference::FirstX {
            first_x,
            offset,
            observed_freq,
        } => first_x - offset * observed_freq,
        ShiftReference::LastX { last_x, offset } => last_x + offset,
    };
    shift_x(coords, -shift);
    Some(shift)
}

/// Rescale y linearly so the trace spans `[min, max]` offset by `-min`.
pub fn normalise(coords: &[Coordinate], min: f64, max: f64) -> Vec<Coordinate> {
    let last = coords.len().saturating_sub(1);
    let lo = min_y(coords, 0, last);
    let hi = max_y(coords, 0, last);
    let factor = (hi - lo) / (max - min);
    coords
        .iter()
        .map(|c| Coordinate::new(c.x, (c.y - lo) / factor - min))
        .collect()
}

/// Parse delimited `x y x y ...` text (space, tab, newline, comma or
/// semicolon separated), applying the given factors.
pub fn parse_dsv(text: &str, x_factor: f64, y_factor: f64) -> Result<Vec<Coordinate>> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() % 2 != 0 {
        return Err(PlotError::OddDsvTokenCount(tokens.len()));
    }
    tokens
        .chunks(2)
        .map(|pair| {
            let x = crate::error::parse_number(pair[0])?;
            let y = crate::error::parse_number(pair[1])?;
            Ok(Coordinate::new(x * x_factor, y * y_factor))
        })
        .collect()
}

/// The clicked point together with the real sample nearest to it.
pub fn picked_coordinates(coords: &[Coordinate], clicked: Coordinate) -> (Coordinate, Option<Coordinate>) {
    if coords.is_empty() {
        return (clicked, None);
    }
    let pt = nearest_index_for_x(coords, clicked.x);
    (clicked, Some(coords[pt]))
}
