/// Measurements, integral regions and highlights attached to spectra
///
/// The plot engine never owns annotation records directly: it talks to an
/// [`AnnotationStore`] keyed by spectrum index and annotation type, and
/// pushes new records into it when a drag or click gesture completes.

use crate::config::Rgba;
use crate::data::Spectrum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationType {
    Measurements,
    Integration,
}

/// Geometry shared by every annotation: two data-space endpoints and a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub text: String,
}

impl Span {
    pub fn new(x1: f64, y1: f64) -> Self {
        Self {
            x1,
            y1,
            x2: x1,
            y2: y1,
            text: String::new(),
        }
    }

    /// Move the second endpoint and relabel with the spectrum's distance text.
    pub fn set_pt2(&mut self, x2: f64, y2: f64, spec: &Spectrum) {
        self.x2 = x2;
        self.y2 = y2;
        self.text = spec.measurement_text(x2 - self.x1, false);
    }

    pub fn min_x(&self) -> f64 {
        self.x1.min(self.x2)
    }

    pub fn max_x(&self) -> f64 {
        self.x1.max(self.x2)
    }

    pub fn overlaps_x(&self, lo: f64, hi: f64) -> bool {
        self.max_x() >= lo && self.min_x() <= hi
    }

    pub fn shift_x(&mut self, dx: f64) {
        self.x1 += dx;
        self.x2 += dx;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    /// A peak-to-peak distance drawn as a bar at the first point's height.
    Measurement(Span),
    /// An integrated x-range; `value` is the trapezoid area under the trace.
    Integral { span: Span, value: f64 },
}

impl Annotation {
    pub fn kind(&self) -> AnnotationType {
        match self {
            Annotation::Measurement(_) => AnnotationType::Measurements,
            Annotation::Integral { .. } => AnnotationType::Integration,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Annotation::Measurement(s) | Annotation::Integral { span: s, .. } => s,
        }
    }

    pub fn span_mut(&mut self) -> &mut Span {
        match self {
            Annotation::Measurement(s) | Annotation::Integral { span: s, .. } => s,
        }
    }

    /// Integral over `[x1, x2]` of `spec`'s current trace, labelled with its value.
    pub fn integral(spec: &Spectrum, x1: f64, x2: f64) -> Self {
        let value = integrate_region(spec, x1, x2);
        let span = Span {
            x1: x1.min(x2),
            y1: 0.0,
            x2: x1.max(x2),
            y2: 0.0,
            text: format!("{:.2}", value),
        };
        Annotation::Integral { span, value }
    }
}

/// Trapezoidal area under the samples that fall inside `[x1, x2]`.
pub fn integrate_region(spec: &Spectrum, x1: f64, x2: f64) -> f64 {
    let (lo, hi) = (x1.min(x2), x1.max(x2));
    let inside: Vec<_> = spec.xy_coords().iter().filter(|c| c.x >= lo && c.x <= hi).collect();
    inside
        .windows(2)
        .map(|w| (w[1].x - w[0].x).abs() * (w[0].y + w[1].y) / 2.0)
        .sum()
}

/// Which part of an annotation a pointer position hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPoint {
    Xy1,
    Xy2,
    IntegralLabel,
    /// Anywhere on the bar (or, for measurements, on its baseline).
    OnLine,
}

/// Read and mutation surface the engine needs from an annotation collaborator.
pub trait AnnotationStore {
    fn list(&self, spectrum: usize, kind: AnnotationType) -> &[Annotation];
    fn add(&mut self, spectrum: usize, annotation: Annotation);
    fn remove(&mut self, spectrum: usize, kind: AnnotationType, index: usize) -> Option<Annotation>;
    /// Remove every record of `kind` for which `pred` is true; returns how many.
    fn remove_where(&mut self, spectrum: usize, kind: AnnotationType, pred: &dyn Fn(&Annotation) -> bool) -> usize;
    fn clear(&mut self, spectrum: usize, kind: AnnotationType);
    /// Follow a destructive calibration shift of the spectrum's samples.
    fn shift_x(&mut self, spectrum: usize, dx: f64);
}

/// In-memory store used when the host supplies none.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<(usize, AnnotationType), Vec<Annotation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationStore for MemoryStore {
    fn list(&self, spectrum: usize, kind: AnnotationType) -> &[Annotation] {
        self.records.get(&(spectrum, kind)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn add(&mut self, spectrum: usize, annotation: Annotation) {
        self.records.entry((spectrum, annotation.kind())).or_default().push(annotation);
    }

    fn remove(&mut self, spectrum: usize, kind: AnnotationType, index: usize) -> Option<Annotation> {
        let list = self.records.get_mut(&(spectrum, kind))?;
        (index < list.len()).then(|| list.remove(index))
    }

    fn remove_where(&mut self, spectrum: usize, kind: AnnotationType, pred: &dyn Fn(&Annotation) -> bool) -> usize {
        let Some(list) = self.records.get_mut(&(spectrum, kind)) else {
            return 0;
        };
        let before = list.len();
        list.retain(|a| !pred(a));
        before - list.len()
    }

    fn clear(&mut self, spectrum: usize, kind: AnnotationType) {
        self.records.remove(&(spectrum, kind));
    }

    fn shift_x(&mut self, spectrum: usize, dx: f64) {
        for ((s, _), list) in self.records.iter_mut() {
            if *s == spectrum {
                list.iter_mut().for_each(|a| a.span_mut().shift_x(dx));
            }
        }
    }
}

/// A background band over an x-range, optionally tied to one spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub x1: f64,
    pub x2: f64,
    pub spectrum: Option<usize>,
    pub color: Rgba,
}

/// Highlight list with the add/remove operations the host can call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    items: Vec<Highlight>,
}

impl Highlights {
    pub fn add(&mut self, x1: f64, x2: f64, spectrum: Option<usize>, color: Rgba) {
        self.items.push(Highlight { x1, x2, spectrum, color });
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Highlight> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove highlights whose range is exactly `[x1, x2]`.
    pub fn remove_range(&mut self, x1: f64, x2: f64) {
        self.items.retain(|h| !(h.x1 == x1 && h.x2 == x2));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn shift_x(&mut self, spectrum: usize, dx: f64) {
        for h in self.items.iter_mut().filter(|h| h.spectrum == Some(spectrum)) {
            h.x1 += dx;
            h.x2 += dx;
        }
    }
}
