/// Pointer and key gestures on one pane group
///
/// Every handler takes the panel-wide [`InteractionState`]: the widget a
/// press captured, click counts and modifier keys live there, and anything
/// the host must react to is pushed onto it as a notice or link request.

use super::graph_set::{GraphSet, ShiftMode, ZoomRequest, RT2};
use super::interaction::{InteractionState, LinkRequest, PanelNotice};
use super::layout::{is_frame_box, is_on_line, Arrow};
use super::selection::Active;
use super::widget::{is_good_drag, WidgetKind, MIN_DRAG_PIXELS};
use crate::annotation::{Annotation, AnnotationType, HitPoint, Span};
use crate::scale::ScaleTarget;

/// Integral bars sit this far above the bottom of the plot.
pub(crate) const INTEGRAL_BAR_OFFSET: i32 = 12;

/// One step of the measurement gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MeasureStep {
    /// Pointer moved: drag the second endpoint along.
    Move,
    /// Start on an existing endpoint or the nearest peak.
    Start,
    /// Start exactly where the pointer is.
    StartFree,
    /// Store the measurement and chain a new one from its end.
    Commit,
    /// Store the measurement, snapping the end to the nearest extremum.
    Finish,
    /// Store the measurement with the end exactly at the pointer.
    FinishFree,
}

impl GraphSet {
    // ── Hit tests ──

    fn is_2d_click(&self, x: i32, y: i32) -> bool {
        self.image
            .as_ref()
            .is_some_and(|img| x == img.fix_x(x) && y == self.fix_y(y))
    }

    fn is_in_top_bar(&self, x: i32, y: i32) -> bool {
        let pin = &self.widgets[WidgetKind::Pin1Dx0];
        x == self.fix_x(x) && y > pin.y_pixel0 - 2 && y < pin.y_pixel1
    }

    fn is_in_top_bar_2d(&self, x: i32, y: i32) -> bool {
        let pin = &self.widgets[WidgetKind::Pin2Dx0];
        self.image
            .as_ref()
            .is_some_and(|img| x == img.fix_x(x) && y > pin.y_pixel0 - 2 && y < pin.y_pixel1)
    }

    fn is_in_right_bar(&self, x: i32, y: i32) -> bool {
        let pin = &self.widgets[WidgetKind::Pin1Dy0];
        y == self.fix_y(y) && x > pin.x_pixel1 && x < pin.x_pixel0 + 2
    }

    fn is_in_right_bar_2d(&self, x: i32, y: i32) -> bool {
        let pin = &self.widgets[WidgetKind::Pin2Dy0];
        self.image.is_some() && y == self.fix_y(y) && x > pin.x_pixel1 && x < pin.x_pixel0 + 2
    }

    pub(crate) fn have_left_right_arrows(&self) -> bool {
        self.spectra.len() > 1 && self.n_split == 1 && self.is_current
    }

    /// Whether `(x, y)` lies on spectrum `i`'s trace. Makes `i`'s scale current.
    pub(crate) fn is_on_spectrum(&mut self, x: i32, y: i32, i: usize) -> bool {
        if i >= self.spectra.len() {
            return false;
        }
        self.set_scale(i);
        let offset = self.stack_offset(i);
        let y = y + offset;
        let spec = &self.spectra[i];
        let coords = spec.xy_coords();
        if coords.is_empty() {
            return false;
        }
        let sd = self.view.scale();
        let (s, e) = (sd.start_index.min(coords.len() - 1), sd.end_index.min(coords.len() - 1));
        if spec.is_continuous() {
            let mut prev: Option<(i32, i32)> = None;
            for c in &coords[s..=e] {
                let py = self.to_pixel_y(c.y);
                if py == i32::MIN {
                    prev = None;
                    continue;
                }
                let (px, py) = (self.to_pixel_x(c.x), self.fix_y(py));
                if let Some((x0, y0)) = prev {
                    if is_on_line(x, y, x0, y0, px, py) {
                        return true;
                    }
                }
                prev = Some((px, py));
            }
            return false;
        }
        let base = self.fix_y(self.to_pixel_y(sd.min_y_on_scale.max(0.0)));
        for (k, c) in coords[s..=e].iter().enumerate() {
            let py = self.to_pixel_y(c.y);
            if py == i32::MIN {
                continue;
            }
            let py = self.fix_y(py);
            if py == base && (k == 0 || k == e - s) {
                continue;
            }
            let px = self.to_pixel_x(c.x);
            if is_on_line(x, y, px, base, px, py) {
                return true;
            }
        }
        false
    }

    /// Upward pixel offset of trace `i` in a stacked frame.
    pub(crate) fn stack_offset(&self, i: usize) -> i32 {
        if !self.show_all_stacked || self.n_split > 1 {
            return 0;
        }
        i as i32 * (self.geom.y_pixels * self.settings.y_stack_offset_percent / 100)
    }

    // ── Annotations under the pointer ──

    pub(crate) fn integral_bar_y(&self) -> i32 {
        self.geom.y_pixel1 - INTEGRAL_BAR_OFFSET
    }

    /// Pixel endpoints `(x1, y1, x2, y2)` of an annotation's bar.
    pub(crate) fn annotation_pixels(&self, a: &Annotation, on_baseline: bool) -> (i32, i32, i32, i32) {
        match a {
            Annotation::Measurement(s) => {
                let y = if on_baseline { self.geom.y_pixel1 - 2 } else { self.to_pixel_y(s.y1) };
                (self.to_pixel_x(s.x1), y, self.to_pixel_x(s.x2), y)
            }
            Annotation::Integral { span, .. } => {
                let y = self.integral_bar_y();
                (self.to_pixel_x(span.min_x()), y, self.to_pixel_x(span.max_x()), y)
            }
        }
    }

    /// Where an integral's value is written, centred over its bar.
    pub(crate) fn integral_label_anchor(&self, a: &Annotation) -> (i32, i32) {
        let (x1, y, x2, _) = self.annotation_pixels(a, false);
        ((x1 + x2) / 2, y - 6)
    }

    fn hits(&self, a: &Annotation, x: i32, y: i32, hit: HitPoint, on_baseline: bool) -> bool {
        let (x1, y1, x2, y2) = self.annotation_pixels(a, on_baseline);
        match hit {
            HitPoint::Xy1 => (x - x1).abs() + (y - y1).abs() < 4,
            HitPoint::Xy2 => (x - x2).abs() + (y - y2).abs() < 4,
            HitPoint::IntegralLabel => {
                let (lx, ly) = self.integral_label_anchor(a);
                is_on_line(x, y, lx - 10, ly, lx + 10, ly)
            }
            HitPoint::OnLine => is_on_line(x, y, x1, y1, x2, y2),
        }
    }

    /// Index of the newest annotation of `kind` on spectrum `spec` hit at `(x, y)`.
    pub(crate) fn find_measurement(&self, spec: usize, kind: AnnotationType, x: i32, y: i32, hit: HitPoint) -> Option<usize> {
        let list = self.store.list(spec, kind);
        let find = |on_baseline: bool| list.iter().rposition(|a| self.hits(a, x, y, hit, on_baseline));
        match find(false) {
            None if hit == HitPoint::OnLine && kind == AnnotationType::Measurements => find(true),
            found => found,
        }
    }

    // ── Measurements ──

    /// Snap the pointer's x to the nearest extremum of the active spectrum.
    fn find_nearest_max_min(&mut self, st: &mut InteractionState) -> bool {
        if self.spectra.len() > 1 && self.selection.clicked().is_none() {
            return false;
        }
        let x = self.spectrum().find_x_for_peak_nearest(self.x_value_moved_to);
        self.x_value_moved_to = x;
        self.set_x_pixel_moved_to(st, Some(x), None, 0, 0);
        !x.is_nan()
    }

    pub(crate) fn process_pending_measurement(&mut self, st: &mut InteractionState, x: i32, y: i32, step: MeasureStep) {
        if !self.is_in_plot_region(x, y) || self.is_2d_click(x, y) {
            self.pending_measurement = None;
            return;
        }
        let x = self.fix_x(x);
        match step {
            MeasureStep::Move => {
                let (xv, yv) = (self.to_x(x), self.to_y(y));
                if let Some((i, span)) = self.pending_measurement.as_mut() {
                    span.set_pt2(xv, yv, &self.spectra[*i]);
                }
            }
            MeasureStep::Start | MeasureStep::StartFree => {
                let Some(i) = self.selection.clicked() else {
                    return;
                };
                self.set_scale(i);
                let (mut xv, mut yv) = (self.to_x(x), self.to_y(y));
                if step == MeasureStep::Start {
                    let list = self.store.list(i, AnnotationType::Measurements);
                    if let Some(k) = self.find_measurement(i, AnnotationType::Measurements, x, y, HitPoint::Xy1) {
                        (xv, yv) = (list[k].span().x1, list[k].span().y1);
                    } else if let Some(k) = self.find_measurement(i, AnnotationType::Measurements, x, y, HitPoint::Xy2) {
                        (xv, yv) = (list[k].span().x2, list[k].span().y2);
                    } else {
                        let px = self.spectra[i].nearest_peak(xv, yv);
                        if !px.is_nan() {
                            xv = px;
                        }
                    }
                }
                log::debug!("measurement started at {:.4}", xv);
                self.pending_measurement = Some((i, Span::new(xv, yv)));
            }
            MeasureStep::Commit | MeasureStep::Finish | MeasureStep::FinishFree => {
                let Some(i) = self.pending_measurement.as_ref().map(|(i, _)| *i) else {
                    return;
                };
                self.set_scale(i);
                let mut xv = self.to_x(x);
                if step != MeasureStep::FinishFree && self.find_nearest_max_min(st) && self.x_pixel_moved_to >= 0 {
                    xv = self.to_x(self.x_pixel_moved_to);
                }
                let yv = self.to_y(y);
                let Some((i, mut span)) = self.pending_measurement.take() else {
                    return;
                };
                span.set_pt2(xv, yv, &self.spectra[i]);
                if span.text.is_empty() {
                    log::debug!("measurement dropped: zero length");
                    return;
                }
                log::info!("measurement {} on {}", span.text, self.spectra[i].title);
                self.store.add(i, Annotation::Measurement(span));
                if step == MeasureStep::Commit {
                    self.set_spectrum_clicked(Some(i));
                    self.pending_measurement = Some((i, Span::new(xv, yv)));
                }
            }
        }
    }

    // ── Press and drag ──

    /// A press (`is_press`) or drag at `(x, y)`. Returns true when the
    /// gesture was consumed by a widget or a measurement.
    pub fn check_widget_event(&mut self, st: &mut InteractionState, x: i32, y: i32, is_press: bool) -> bool {
        if is_press {
            self.press_widget(st, x, y)
        } else {
            self.drag_widget(st, x, y)
        }
    }

    fn press_widget(&mut self, st: &mut InteractionState, x: i32, y: i32) -> bool {
        if st.click_count == 2 && self.last_int_drag_x != x && !self.is_2d() {
            if self.pending_measurement.is_none() {
                if self.selection.clicked().is_none() {
                    let prev = self.selection.previous_clicked();
                    if prev.is_some() {
                        self.set_spectrum_clicked(prev);
                    }
                }
                self.process_pending_measurement(st, x, y, MeasureStep::Start);
            }
            return self.pending_measurement.is_some();
        }
        let mut widget = self.widgets.pin_at(x, y);
        if widget.is_none() {
            let yy = self.fix_y(y);
            if x < self.geom.x_pixel1 {
                if st.shift_pressed {
                    let prev = self.selection.previous_clicked();
                    self.set_spectrum_clicked(prev);
                }
                let px = self.fix_x(x);
                let xv = self.to_x(px);
                let zb = &mut self.widgets[WidgetKind::ZoomBox1D];
                zb.set_x(xv, px);
                zb.set_y(0.0, yy);
                widget = Some(WidgetKind::ZoomBox1D);
            } else if let Some(img) = self.image.as_ref().filter(|img| x < img.x_pixel1) {
                let px = img.fix_x(x);
                let xv = img.to_x(px);
                let zb = &mut self.widgets[WidgetKind::ZoomBox2D];
                zb.set_x(xv, px);
                zb.set_y(0.0, yy);
                widget = Some(WidgetKind::ZoomBox2D);
            }
        }
        st.this_widget = widget;
        widget.is_some()
    }

    fn drag_widget(&mut self, st: &mut InteractionState, x: i32, y: i32) -> bool {
        let Some(widget) = st.this_widget else {
            return false;
        };
        self.next_click_shift = None;
        if widget == WidgetKind::ZoomBox1D {
            let (px, py) = (self.fix_x(x), self.fix_y(y));
            let zb = &mut self.widgets[WidgetKind::ZoomBox1D];
            zb.x_pixel1 = px;
            zb.y_pixel1 = py;
            if st.is_integral_drag && zb.x_pixel0 != zb.x_pixel1 {
                self.last_int_drag_x = px;
            }
            return false;
        }
        if !self.settings.enable_zoom {
            return false;
        }
        match widget {
            WidgetKind::ZoomBox2D => {
                let Some(img) = &self.image else {
                    return false;
                };
                let (px, py) = (img.fix_x(x), self.fix_y(y));
                let zb = &mut self.widgets[WidgetKind::ZoomBox2D];
                zb.x_pixel1 = px;
                zb.y_pixel1 = py;
                true
            }
            WidgetKind::Cur2Dy => {
                let Some(img) = &self.image else {
                    return false;
                };
                let py = self.fix_y(y);
                let sub = img.to_subspectrum_index(py);
                let w = &mut self.widgets[WidgetKind::Cur2Dy];
                w.y_pixel0 = py;
                w.y_pixel1 = py;
                self.set_current_sub_spectrum(st, sub as i32);
                true
            }
            WidgetKind::Pin1Dx0 | WidgetKind::Pin1Dx1 | WidgetKind::Pin1Dx01 => {
                self.drag_x_pin(st, widget, x);
                true
            }
            WidgetKind::Pin1Dy0 | WidgetKind::Pin1Dy1 | WidgetKind::Pin1Dy01 => {
                self.drag_y_pin(st, widget, y);
                true
            }
            WidgetKind::Pin2Dx0 | WidgetKind::Pin2Dx1 | WidgetKind::Pin2Dx01 => {
                self.drag_2d_x_pin(st, widget, x);
                true
            }
            WidgetKind::Pin2Dy0 | WidgetKind::Pin2Dy1 | WidgetKind::Pin2Dy01 => {
                self.drag_2d_y_pin(st, widget, y);
                true
            }
            _ => false,
        }
    }

    fn drag_x_pin(&mut self, st: &mut InteractionState, widget: WidgetKind, x: i32) {
        let px = self.fix_x(x);
        if widget == WidgetKind::Pin1Dx01 {
            let (a, b) = (self.widgets[WidgetKind::Pin1Dx0].x_pixel0, self.widgets[WidgetKind::Pin1Dx1].x_pixel0);
            let dp = px - (a + b) / 2;
            let (xa, xb) = (a + dp, b + dp);
            if dp == 0 || self.fix_x(xa) != xa || self.fix_x(xb) != xb {
                return;
            }
            let (va, vb) = (self.to_x0(xa), self.to_x0(xb));
            self.widgets[WidgetKind::Pin1Dx0].set_x(va, xa);
            self.widgets[WidgetKind::Pin1Dx1].set_x(vb, xb);
        } else {
            let v = self.to_x0(px);
            self.widgets[widget].set_x(v, px);
        }
        let (x0, x1) = (self.widgets[WidgetKind::Pin1Dx0].x(), self.widgets[WidgetKind::Pin1Dx1].x());
        self.do_zoom(
            st,
            ZoomRequest {
                add_zoom: false,
                ..ZoomRequest::new(x0, 0.0, x1, 0.0)
            },
        );
    }

    fn drag_y_pin(&mut self, st: &mut InteractionState, widget: WidgetKind, y: i32) {
        let py = self.fix_y(y);
        if widget == WidgetKind::Pin1Dy01 {
            let (a, b) = (self.widgets[WidgetKind::Pin1Dy0].y_pixel0, self.widgets[WidgetKind::Pin1Dy1].y_pixel0);
            let dp = py - (a + b) / 2 + 1;
            let (ya, yb) = (a + dp, b + dp);
            let (va, vb) = (self.to_y0(ya), self.to_y0(yb));
            let first = self.history.first().scale();
            if va.min(vb) == first.min_y_on_scale || va.max(vb) == first.max_y_on_scale {
                return;
            }
            let (fa, fb) = (self.fix_y(ya), self.fix_y(yb));
            self.widgets[WidgetKind::Pin1Dy0].set_y(va, fa);
            self.widgets[WidgetKind::Pin1Dy1].set_y(vb, fb);
        } else {
            let v = self.to_y0(py);
            self.widgets[widget].set_y(v, py);
        }
        let no_image = self.image.is_none();
        let (y0, y1) = (self.widgets[WidgetKind::Pin1Dy0].y(), self.widgets[WidgetKind::Pin1Dy1].y());
        self.do_zoom(
            st,
            ZoomRequest {
                is_1d: no_image,
                is_1d_y: no_image,
                check_linked: false,
                add_zoom: false,
                ..ZoomRequest::new(0.0, y0, 0.0, y1)
            },
        );
    }

    fn drag_2d_x_pin(&mut self, st: &mut InteractionState, widget: WidgetKind, x: i32) {
        let Some(img) = &self.image else {
            return;
        };
        let px = img.fix_x(x);
        if widget == WidgetKind::Pin2Dx01 {
            let (a, b) = (self.widgets[WidgetKind::Pin2Dx0].x_pixel0, self.widgets[WidgetKind::Pin2Dx1].x_pixel0);
            let dp = px - (a + b) / 2 + 1;
            let (xa, xb) = (a + dp, b + dp);
            if img.fix_x(xa) != xa || img.fix_x(xb) != xb {
                return;
            }
            let (va, vb) = (img.to_x0(xa), img.to_x0(xb));
            self.widgets[WidgetKind::Pin2Dx0].set_x(va, xa);
            self.widgets[WidgetKind::Pin2Dx1].set_x(vb, xb);
        } else {
            let v = img.to_x0(px);
            self.widgets[widget].set_x(v, px);
        }
        let (p0, p1) = (&self.widgets[WidgetKind::Pin2Dx0], &self.widgets[WidgetKind::Pin2Dx1]);
        if !is_good_drag(p0, Some(p1), true) {
            self.reset_2d(st, true);
            return;
        }
        let (x0, x1, v0, v1) = (p0.x_pixel0, p1.x_pixel0, p0.x(), p1.x());
        let (y0, y1) = (self.widgets[WidgetKind::Pin2Dy0].y_pixel0, self.widgets[WidgetKind::Pin2Dy1].y_pixel0);
        let Some(img) = self.image.as_mut() else {
            return;
        };
        img.set_view0(x0, y0, x1, y1);
        let (za, zb) = (img.min_z, img.max_z);
        self.do_zoom(
            st,
            ZoomRequest {
                is_1d: false,
                add_zoom: false,
                ..ZoomRequest::new(v0, za, v1, zb)
            },
        );
    }

    fn drag_2d_y_pin(&mut self, st: &mut InteractionState, widget: WidgetKind, y: i32) {
        let Some(img) = &self.image else {
            return;
        };
        let py = self.fix_y(y);
        if widget == WidgetKind::Pin2Dy01 {
            let (a, b) = (self.widgets[WidgetKind::Pin2Dy0].y_pixel0, self.widgets[WidgetKind::Pin2Dy1].y_pixel0);
            let dp = py - (a + b) / 2 + 1;
            let (ya, yb) = (a + dp, b + dp);
            if self.fix_y(ya) != ya || self.fix_y(yb) != yb {
                return;
            }
            let (ia, ib) = (img.to_subspectrum_index(ya), img.to_subspectrum_index(yb));
            self.widgets[WidgetKind::Pin2Dy0].set_y(ia as f64, ya);
            self.widgets[WidgetKind::Pin2Dy1].set_y(ib as f64, yb);
        } else {
            let idx = img.to_subspectrum_index(py);
            self.widgets[widget].set_y(idx as f64, py);
        }
        let (p0, p1) = (&self.widgets[WidgetKind::Pin2Dy0], &self.widgets[WidgetKind::Pin2Dy1]);
        if !is_good_drag(p0, Some(p1), false) {
            self.reset_2d(st, false);
            return;
        }
        let (y0, y1) = (p0.y_pixel0, p1.y_pixel0);
        let (x0, x1) = (self.widgets[WidgetKind::Pin2Dx0].x_pixel0, self.widgets[WidgetKind::Pin2Dx1].x_pixel0);
        if let Some(img) = self.image.as_mut() {
            img.set_view0(x0, y0, x1, y1);
        }
    }

    // ── Release ──

    pub fn mouse_released(&mut self, st: &mut InteractionState, x: i32, y: i32) {
        if let Some((_, span)) = &self.pending_measurement {
            if (self.to_pixel_x(span.x1) - x).abs() < 2 {
                self.pending_measurement = None;
            }
            self.process_pending_measurement(st, x, y, MeasureStep::Finish);
            return;
        }
        if let Some(i) = self.selection.hover() {
            self.set_scale(i);
        }
        if st.is_integral_drag {
            let zb = &self.widgets[WidgetKind::ZoomBox1D];
            if (zb.x_pixel1 - zb.x_pixel0).abs() > MIN_DRAG_PIXELS {
                let (x0, x1) = (self.to_x(zb.x_pixel0), self.to_x(zb.x_pixel1));
                let fi = self.fixed_index();
                let integral = Annotation::integral(&self.spectra[fi], x0, x1);
                log::info!("integral [{:.4}, {:.4}] on {}", x0.min(x1), x0.max(x1), self.spectra[fi].title);
                self.store.add(fi, integral);
            }
            self.widgets[WidgetKind::ZoomBox1D].collapse();
            st.is_integral_drag = false;
            return;
        }
        match st.this_widget {
            Some(WidgetKind::ZoomBox2D) => {
                let zb = self.widgets[WidgetKind::ZoomBox2D].clone();
                self.widgets[WidgetKind::ZoomBox2D].collapse();
                if !is_good_drag(&zb, None, true) {
                    return;
                }
                let Some(img) = self.image.as_mut() else {
                    return;
                };
                img.set_zoom(zb.x_pixel0, zb.y_pixel0, zb.x_pixel1, zb.y_pixel1);
                let (xa, xb) = (img.to_x(img.x_pixel0), img.to_x(img.x_pixel0 + img.x_pixels - 1));
                let (za, zb) = (img.min_z, img.max_z);
                self.do_zoom(
                    st,
                    ZoomRequest {
                        is_1d: false,
                        ..ZoomRequest::new(xa, za, xb, zb)
                    },
                );
            }
            Some(WidgetKind::ZoomBox1D) => {
                let zb = self.widgets[WidgetKind::ZoomBox1D].clone();
                self.widgets[WidgetKind::ZoomBox1D].collapse();
                if !is_good_drag(&zb, None, true) {
                    return;
                }
                let do_y = st.shift_pressed;
                let (y0, y1) = if do_y {
                    (self.to_y(zb.y_pixel0), self.to_y(zb.y_pixel1))
                } else {
                    (0.0, 0.0)
                };
                let (x0, x1) = (self.to_x(zb.x_pixel0), self.to_x(zb.x_pixel1));
                self.do_zoom(
                    st,
                    ZoomRequest {
                        is_1d_y: do_y,
                        check_range: true,
                        ..ZoomRequest::new(x0, y0, x1, y1)
                    },
                );
            }
            Some(WidgetKind::Pin1Dx0 | WidgetKind::Pin1Dx1 | WidgetKind::Cur2Dx0 | WidgetKind::Cur2Dx1) => {
                self.add_current_zoom();
            }
            _ => {}
        }
    }

    // ── Motion ──

    /// Pointer moved to `(x, y)`; `x == i32::MAX` means it left the canvas.
    pub fn mouse_moved(&mut self, st: &mut InteractionState, x: i32, y: i32) {
        if x == i32::MAX {
            self.set_spectrum_hover(None);
            self.in_plot_move = false;
            self.x_pixel_moved_to = -1;
            return;
        }
        if self.spectra.len() > 1 {
            let frame = self.geom.split_point(y, self.n_split);
            self.set_position_for_frame(frame);
            let moved_to = if self.n_split > 1 { Some(frame) } else { self.selection.active_index() };
            self.set_spectrum_hover(moved_to);
            if let Some(i) = moved_to {
                self.set_scale(i);
            }
        }
        self.in_plot_move = self.is_in_plot_region(x, y);
        let px = if self.in_plot_move { x } else { -1 };
        self.set_x_pixel_moved_to(st, None, None, px, -1);
        if self.in_plot_move {
            self.x_value_moved_to = self.to_x(x);
            self.y_value_moved_to = self.spectrum().y_value_at(self.x_value_moved_to);
        }
        let fi = self.fixed_index();
        if st.is_integral_drag {
            // the zoom box tracks the drag; annotations stay put
        } else if self.pending_measurement.is_some() {
            self.process_pending_measurement(st, x, y, MeasureStep::Move);
        } else {
            self.selected_measurement = None;
            self.selected_integral = None;
            if self.in_plot_move {
                self.selected_measurement = self
                    .find_measurement(fi, AnnotationType::Measurements, x, y, HitPoint::OnLine)
                    .map(|k| (fi, k));
                if self.selected_measurement.is_none() {
                    self.selected_integral = self
                        .find_measurement(fi, AnnotationType::Integration, x, y, HitPoint::IntegralLabel)
                        .or_else(|| self.find_measurement(fi, AnnotationType::Integration, x, y, HitPoint::OnLine))
                        .map(|k| (fi, k));
                }
            }
        }
        self.peak_mouse_over = if self.in_plot_move {
            self.spectra[fi].find_peak_by_coord(self.x_value_moved_to).map(|p| (fi, p))
        } else {
            None
        };
        if self.image.is_some() && !self.settings.display_1d && self.sticky_2d {
            self.set_2d_cross_hairs(st, x, y);
        }
    }

    // ── Clicks ──

    /// Press on a stacked frame: pick the trace under the pointer. Always
    /// returns false; the pick itself is the side effect.
    pub fn check_spectrum_clicked(&mut self, st: &mut InteractionState, x: i32, y: i32, click_count: u8) -> bool {
        if self.next_click_shift.is_some()
            || click_count > 1
            || self.pending_measurement.is_some()
            || !self.is_in_plot_region(x, y)
        {
            return false;
        }
        if click_count == 0 {
            st.is_integral_drag = st.ctrl_pressed && !self.is_2d();
        }
        if !self.show_all_stacked {
            return false;
        }
        self.selection.stack_selected = false;
        for i in 0..self.spectra.len() {
            if self.is_on_spectrum(x, y, i) {
                self.set_spectrum_clicked(Some(i));
                self.selection.set_previous_clicked(i);
                return false;
            }
        }
        self.set_spectrum_clicked(None);
        false
    }

    /// Make `i` current after the panel routed a press here.
    pub(crate) fn set_spectrum(&mut self, i: Option<usize>, from_split: bool) {
        self.set_spectrum_clicked(i);
        if !(from_split && self.n_split > 1) {
            self.selection.stack_selected = false;
            self.show_all_stacked = false;
        }
    }

    fn check_arrow_up_down_click(&mut self, st: &mut InteractionState, x: i32, y: i32) -> bool {
        let g = self.geom;
        let mut f = if g.is_arrow_click(x, y, Arrow::Up) {
            RT2
        } else if g.is_arrow_click(x, y, Arrow::Down) {
            1.0 / RT2
        } else {
            0.0
        };
        if f != 0.0 {
            if self.n_split > 1 {
                let hover = self.selection.hover().map(Active::Spectrum).unwrap_or(Active::All);
                if self.selection.set_active(hover) {
                    self.get_current_view();
                }
            }
            let active = self.selection.active_index();
            if (self.spectra.len() == 1 || active.is_some()) && self.spectrum().is_inverted() {
                f = 1.0 / f;
            }
            let target = match (self.image.is_some(), active) {
                (true, _) => ScaleTarget::Image2D,
                (false, Some(i)) => ScaleTarget::Spectrum(i),
                (false, None) => ScaleTarget::All,
            };
            self.view.scale_spectrum(target, f);
        } else if g.is_arrow_click(x, y, Arrow::Reset) {
            self.reset_view_completely(st);
        } else {
            return false;
        }
        if self.image.is_some() {
            self.reset_pins_from_view();
        }
        true
    }

    fn check_arrow_left_right_click(&mut self, x: i32, y: i32) -> bool {
        if !self.have_left_right_arrows() {
            return false;
        }
        let g = self.geom;
        let dx = if g.is_arrow_click(x, y, Arrow::Left) {
            -1
        } else if g.is_arrow_click(x, y, Arrow::Right) {
            1
        } else {
            0
        };
        let n = self.spectra.len() as i32;
        if dx != 0 {
            let i = match self.selection.active_index() {
                Some(cur) => (cur as i32 + dx).rem_euclid(n),
                None if dx > 0 => 0,
                None => n - 1,
            };
            self.set_spectrum_clicked(Some(i as usize));
            return true;
        }
        if !g.is_arrow_click(x, y, Arrow::Home) {
            return false;
        }
        if self.show_all_stacked {
            self.show_all_stacked = false;
            self.set_spectrum_clicked(Some(self.fixed_index()));
        } else {
            self.show_all_stacked = self.allow_stacking;
            if self.selection.set_active(Active::All) {
                self.get_current_view();
            }
            self.selection.stack_selected = false;
        }
        true
    }

    pub fn mouse_clicked(&mut self, st: &mut InteractionState, x: i32, y: i32, click_count: u8, ctrl: bool) {
        self.selected_measurement = None;
        self.selected_integral = None;
        let armed = self.next_click_shift.take();
        if self.check_arrow_up_down_click(st, x, y) || self.check_arrow_left_right_click(x, y) {
            return;
        }
        self.selection.last_click_x = f64::NAN;
        self.selection.last_pixel_x = i32::MAX;
        let g = self.geom;
        if self.is_splittable {
            let (bx, by) = g.splitter_box();
            if is_frame_box(x, y, bx, by) {
                self.split_stack(st, self.n_split == 1);
                return;
            }
        }
        if self.is_current {
            let (bx, by) = g.closer_box();
            if is_frame_box(x, y, bx, by) {
                let title = self.spectrum().title.clone();
                st.notify(PanelNotice::CloseSpectrum { title });
                return;
            }
        }
        if let Some(kind) = self.widgets.pin_at(x, y) {
            self.request_widget_edit(st, kind);
            return;
        }
        let is_2d = self.is_2d();
        if click_count == 2 && self.selection.clicked().is_none() {
            let prev = self.selection.previous_clicked();
            if prev.is_some() {
                self.set_spectrum_clicked(prev);
            }
        }
        if ctrl && !is_2d {
            if self.pending_measurement.is_none() {
                let prev = self.selection.previous_clicked();
                self.set_spectrum_clicked(prev);
                self.process_pending_measurement(st, x, y, MeasureStep::StartFree);
            } else {
                self.process_pending_measurement(st, x, y, MeasureStep::FinishFree);
            }
            return;
        }
        if click_count == 2 {
            if self.is_2d_click(x, y) {
                self.sticky_2d = true;
                self.set_2d_cross_hairs(st, x, y);
                return;
            }
            if self.is_in_top_bar(x, y) {
                let (x0, x1) = (self.to_x0(g.x_pixel0), self.to_x0(g.x_pixel1));
                self.do_zoom(st, ZoomRequest::new(x0, 0.0, x1, 0.0));
                return;
            }
            if self.is_in_right_bar(x, y) {
                let sd = self.view.scale();
                let first = self.history.first().scale();
                let req = ZoomRequest {
                    is_1d_y: true,
                    check_linked: false,
                    add_zoom: false,
                    ..ZoomRequest::new(sd.min_x_on_scale, first.min_y_on_scale, sd.max_x_on_scale, first.max_y_on_scale)
                };
                self.do_zoom(st, req);
                return;
            }
            if self.is_in_top_bar_2d(x, y) {
                self.reset_2d(st, true);
                return;
            }
            if self.is_in_right_bar_2d(x, y) {
                self.reset_2d(st, false);
                return;
            }
            if self.pending_measurement.is_some() {
                self.process_pending_measurement(st, x, y, MeasureStep::Finish);
                return;
            }
            if self.selection.clicked().is_some() {
                self.process_pending_measurement(st, x, y, MeasureStep::Start);
                return;
            }
        } else if is_2d && self.is_2d_click(x, y) {
            if click_count == 1 {
                self.sticky_2d = false;
            }
            self.set_2d_cross_hairs(st, x, y);
            return;
        }
        if self.is_in_plot_region(x, y) {
            if self.pending_measurement.is_some() {
                self.process_pending_measurement(st, x, y, MeasureStep::Commit);
                return;
            }
            let (xv, yv) = (self.to_x(x), self.to_y(y));
            self.set_coord_clicked(st, x, xv, yv);
            if let Some(shift) = armed {
                self.next_click_shift = Some(shift);
                self.shift_spectrum(st, ShiftMode::Clicked, f64::NAN, f64::NAN);
                return;
            }
        } else {
            self.set_coord_clicked(st, 0, f64::NAN, 0.0);
        }
        let peak = st.coord_clicked.and_then(|c| {
            let spec = self.spectrum();
            spec.find_peak_by_coord(c.x).map(|p| spec.peaks[p].clone())
        });
        st.notify(PanelNotice::PeakPicked {
            coord: st.coord_clicked,
            peak,
        });
    }

    // ── Keys ──

    /// Escape (`is_del == false`) or Delete: cancel the live gesture, or
    /// remove the annotation under the pointer.
    pub fn escape_key_pressed(&mut self, st: &mut InteractionState, is_del: bool) {
        for kind in [WidgetKind::ZoomBox1D, WidgetKind::ZoomBox2D] {
            let zb = &mut self.widgets[kind];
            zb.x_pixel0 = 0;
            zb.x_pixel1 = 0;
        }
        if !self.in_plot_move {
            return;
        }
        if self.pending_measurement.take().is_some() {
            log::debug!("measurement cancelled");
            return;
        }
        st.this_widget = None;
        let sd = self.view.scale();
        let (lo, hi) = (sd.min_x_on_scale, sd.max_x_on_scale);
        let in_view = move |a: &Annotation| a.span().min_x() >= lo && a.span().max_x() <= hi;
        for (selected, kind) in [
            (self.selected_measurement.take(), AnnotationType::Measurements),
            (self.selected_integral.take(), AnnotationType::Integration),
        ] {
            let Some((spec, index)) = selected else {
                continue;
            };
            if is_del {
                let n = self.store.remove_where(spec, kind, &in_view);
                log::info!("removed {} {:?} in view", n, kind);
            } else if self.store.remove(spec, kind, index).is_some() {
                log::info!("removed {:?} #{}", kind, index);
            }
        }
    }

    // ── 2D cursors ──

    /// Move the 2D cross-hairs to `(x, y)` and show the row under them.
    pub(crate) fn set_2d_cross_hairs(&mut self, st: &mut InteractionState, x: i32, y: i32) {
        let Some(img) = &self.image else {
            return;
        };
        if x != img.fix_x(x) || y != self.fix_y(y) {
            return;
        }
        let (xv, yv, sub) = (img.to_x(x), img.to_y(y), img.to_subspectrum_index(y));
        let px = self.to_pixel_x(xv);
        self.widgets[WidgetKind::Pin1Dx1].set_x(xv, px);
        self.widgets[WidgetKind::Cur2Dx1].set_x(xv, x);
        self.set_current_sub_spectrum(st, sub as i32);
        if self.is_linked {
            st.request_link(LinkRequest::CrossHairs2D {
                x: xv,
                y: yv,
                locked: !self.sticky_2d,
            });
        }
    }

    /// Place the 1D cursors that mirror a linked 2D pane's cross-hairs.
    pub(crate) fn set_2d_xy(&mut self, x: f64, y: f64, locked: bool) {
        for (kind, linked, v) in [(WidgetKind::Cur1D2x1, self.linked_x, x), (WidgetKind::Cur1D2x2, self.linked_y, y)] {
            if linked.is_none() {
                continue;
            }
            let px = self.to_pixel_x(v);
            let (v, px) = if px == self.fix_x(px) { (v, px) } else { (f64::MAX, i32::MIN) };
            self.widgets[kind].set_x(v, px);
        }
        self.cur1d2_locked = locked;
    }

    /// Undo a 2D zoom along one axis.
    pub(crate) fn reset_2d(&mut self, st: &mut InteractionState, is_x: bool) {
        let (y0, y1) = (self.widgets[WidgetKind::Pin2Dy0].y_pixel0, self.widgets[WidgetKind::Pin2Dy1].y_pixel0);
        let (x0, x1) = (self.widgets[WidgetKind::Pin2Dx0].x_pixel0, self.widgets[WidgetKind::Pin2Dx1].x_pixel0);
        let Some(img) = self.image.as_mut() else {
            return;
        };
        if is_x {
            img.set_view0(img.x_pixel0, y0, img.x_pixel1, y1);
            let (za, zb) = (img.min_z, img.max_z);
            self.do_zoom(
                st,
                ZoomRequest {
                    check_linked: false,
                    ..ZoomRequest::new(0.0, za, 0.0, zb)
                },
            );
        } else {
            img.set_view0(x0, img.y_pixel0, x1, img.y_pixel1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::{hsqc, proton, sized, uv_vis};

    fn drag(gs: &mut GraphSet, st: &mut InteractionState, from: (i32, i32), to: (i32, i32)) {
        st.press();
        gs.check_widget_event(st, from.0, from.1, true);
        gs.check_widget_event(st, to.0, to.1, false);
        gs.mouse_moved(st, to.0, to.1);
        gs.mouse_released(st, to.0, to.1);
        st.this_widget = None;
    }

    fn mid_plot(gs: &GraphSet) -> (i32, i32) {
        let g = gs.geometry();
        ((g.x_pixel0 + g.x_pixel1) / 2, (g.y_pixel0 + g.y_pixel1) / 2)
    }

    #[test]
    fn test_zoom_box_drag_zooms_x() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0, 5.0])]);
        let (cx, cy) = mid_plot(&gs);
        drag(&mut gs, &mut st, (cx - 100, cy), (cx + 100, cy + 40));
        assert_eq!(gs.history().len(), 2);
        let sd = gs.view().scale();
        assert!(sd.max_x - sd.min_x < 5.0);
        assert!(!sd.is_shift_zoomed_y);
        assert!(gs.widgets()[WidgetKind::ZoomBox1D].is_collapsed());
    }

    #[test]
    fn test_small_zoom_box_is_ignored() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let (cx, cy) = mid_plot(&gs);
        drag(&mut gs, &mut st, (cx, cy), (cx + 3, cy + 40));
        assert_eq!(gs.history().len(), 1);
    }

    #[test]
    fn test_shift_drag_zooms_y_too() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let (cx, cy) = mid_plot(&gs);
        st.shift_pressed = true;
        drag(&mut gs, &mut st, (cx - 100, cy - 50), (cx + 100, cy + 50));
        assert_eq!(gs.history().len(), 2);
        assert!(gs.view().scale().is_shift_zoomed_y);
    }

    #[test]
    fn test_integral_drag_adds_integral() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let (a, b) = (gs.to_pixel_x(2.5), gs.to_pixel_x(1.5));
        let y = mid_plot(&gs).1;
        st.press();
        gs.check_widget_event(&mut st, a, y, true);
        st.is_integral_drag = true;
        gs.check_widget_event(&mut st, b, y, false);
        gs.mouse_released(&mut st, b, y);
        let list = gs.store().list(0, AnnotationType::Integration);
        assert_eq!(list.len(), 1);
        assert!(matches!(list[0], Annotation::Integral { value, .. } if value > 0.0));
        assert!((list[0].span().min_x() - 1.5).abs() < 0.05);
        assert_eq!(gs.history().len(), 1);
        assert!(!st.is_integral_drag);
    }

    #[test]
    fn test_double_click_drag_measures_between_peaks() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0, 5.0])]);
        gs.set_spectrum_clicked(Some(0));
        let y = gs.to_pixel_y(0.1);
        let (x0, x1) = (gs.to_pixel_x(2.03), gs.to_pixel_x(4.97));
        st.click_count = 2;
        assert!(gs.check_widget_event(&mut st, x0, y, true));
        assert!((gs.pending_measurement().map(|s| s.x1).unwrap_or(f64::NAN) - 2.0).abs() < 0.01);
        gs.mouse_moved(&mut st, x1, y);
        gs.mouse_released(&mut st, x1, y);
        assert!(gs.pending_measurement().is_none());
        let list = gs.store().list(0, AnnotationType::Measurements);
        assert_eq!(list.len(), 1);
        let s = list[0].span();
        assert!((s.x2 - 5.0).abs() < 0.02);
        assert!(!s.text.is_empty());
    }

    #[test]
    fn test_escape_and_delete_remove_measurements() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        for (x1, x2) in [(3.0, 4.0), (6.0, 7.0)] {
            let mut s = Span::new(x1, 0.5);
            s.x2 = x2;
            gs.store_mut().add(0, Annotation::Measurement(s));
        }
        let (x, y) = (gs.to_pixel_x(3.5), gs.to_pixel_y(0.5));
        gs.mouse_moved(&mut st, x, y);
        assert_eq!(gs.selected_measurement, Some((0, 0)));
        gs.escape_key_pressed(&mut st, false);
        assert_eq!(gs.store().list(0, AnnotationType::Measurements).len(), 1);

        let (x, y) = (gs.to_pixel_x(6.5), gs.to_pixel_y(0.5));
        gs.mouse_moved(&mut st, x, y);
        assert!(gs.selected_measurement.is_some());
        gs.escape_key_pressed(&mut st, true);
        assert!(gs.store().list(0, AnnotationType::Measurements).is_empty());
    }

    #[test]
    fn test_arrow_clicks_scale_and_reset() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let (ux, uy) = gs.geometry().arrow_anchor(Arrow::Up);
        gs.mouse_clicked(&mut st, ux, uy, 1, false);
        assert!((gs.view().scale().spectrum_scale_factor - RT2).abs() < 1e-12);
        let (rx, ry) = gs.geometry().arrow_anchor(Arrow::Reset);
        gs.mouse_clicked(&mut st, rx, ry, 1, false);
        assert_eq!(gs.view().scale().spectrum_scale_factor, 1.0);
    }

    #[test]
    fn test_left_right_arrows_cycle_spectra() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0]), proton("c", &[4.0])]);
        gs.is_current = true;
        let (rx, ry) = gs.geometry().arrow_anchor(Arrow::Right);
        gs.mouse_clicked(&mut st, rx, ry, 1, false);
        assert_eq!(gs.selection().active_index(), Some(0));
        gs.mouse_clicked(&mut st, rx, ry, 1, false);
        assert_eq!(gs.selection().active_index(), Some(1));
        let (lx, ly) = gs.geometry().arrow_anchor(Arrow::Left);
        gs.mouse_clicked(&mut st, lx, ly, 1, false);
        gs.mouse_clicked(&mut st, lx, ly, 1, false);
        assert_eq!(gs.selection().active_index(), Some(2));
    }

    #[test]
    fn test_splitter_and_closer_boxes() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        gs.is_current = true;
        let (bx, by) = gs.geometry().splitter_box();
        gs.mouse_clicked(&mut st, bx + 5, by + 5, 1, false);
        assert_eq!(gs.n_split(), 2);
        let (cx, cy) = gs.geometry().closer_box();
        gs.mouse_clicked(&mut st, cx + 5, cy + 5, 1, false);
        assert_eq!(
            st.take_notices(),
            vec![PanelNotice::CloseSpectrum { title: "a".to_string() }]
        );
    }

    #[test]
    fn test_top_bar_double_click_resets_x() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        gs.do_zoom(&mut st, ZoomRequest::new(3.0, 0.0, 6.0, 0.0));
        gs.set_widgets(false, true);
        let (cx, _) = mid_plot(&gs);
        let y = gs.geometry().y_pixel0 - 2;
        gs.mouse_clicked(&mut st, cx + 7, y, 2, false);
        let sd = gs.view().scale();
        assert!(sd.min_x.abs() < 0.05);
        assert!((sd.max_x - 10.0).abs() < 0.05);
    }

    #[test]
    fn test_click_on_pin_requests_edit() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let w = &gs.widgets()[WidgetKind::Pin1Dx1];
        let (x, y) = (w.x_pixel0, w.y_pixel0);
        gs.mouse_clicked(&mut st, x, y, 1, false);
        assert!(matches!(
            st.take_notices().as_slice(),
            [PanelNotice::EditWidget { widget: WidgetKind::Pin1Dx1, .. }]
        ));
    }

    #[test]
    fn test_click_in_plot_picks_coordinate() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let (cx, cy) = mid_plot(&gs);
        gs.mouse_clicked(&mut st, cx, cy, 1, false);
        let c = st.coord_clicked.expect("click recorded");
        assert!((c.x - gs.to_x(cx)).abs() < 1e-12);
        assert!(matches!(st.take_notices().as_slice(), [PanelNotice::PeakPicked { coord: Some(_), .. }]));
    }

    #[test]
    fn test_pin_drag_zooms_live_then_commits() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let w = gs.widgets()[WidgetKind::Pin1Dx0].clone();
        st.press();
        assert!(gs.check_widget_event(&mut st, w.x_pixel0, w.y_pixel0, true));
        assert_eq!(st.this_widget, Some(WidgetKind::Pin1Dx0));
        let target = (w.x_pixel0 + gs.geometry().x_pixel0) / 2;
        assert!(gs.check_widget_event(&mut st, target, w.y_pixel0, false));
        assert_eq!(gs.history().len(), 1);
        assert!(gs.view().scale().max_x - gs.view().scale().min_x < 9.0);
        gs.mouse_released(&mut st, target, w.y_pixel0);
        assert_eq!(gs.history().len(), 2);
    }

    #[test]
    fn test_increasing_x_zoom_box_drag() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![uv_vis("uv")]);
        let (cx, cy) = mid_plot(&gs);
        let (lo, hi) = (gs.to_x(cx - 100), gs.to_x(cx + 100));
        assert!(lo < hi);
        drag(&mut gs, &mut st, (cx - 100, cy), (cx + 100, cy + 40));
        assert_eq!(gs.history().len(), 2);
        let sd = gs.view().scale();
        assert!((sd.min_x - lo).abs() < 1.0, "min_x {} vs {}", sd.min_x, lo);
        assert!((sd.max_x - hi).abs() < 1.0, "max_x {} vs {}", sd.max_x, hi);
        assert!(gs.widgets()[WidgetKind::ZoomBox1D].is_collapsed());
        let g = *gs.geometry();
        assert!(gs.to_pixel_x(sd.min_x) >= g.x_pixel0 && gs.to_pixel_x(sd.max_x) <= g.x_pixel1);
    }

    #[test]
    fn test_increasing_x_pin_drag() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![uv_vis("uv")]);
        let w = gs.widgets()[WidgetKind::Pin1Dx0].clone();
        assert!(w.x_pixel0 < gs.widgets()[WidgetKind::Pin1Dx1].x_pixel0);
        st.press();
        assert!(gs.check_widget_event(&mut st, w.x_pixel0, w.y_pixel0, true));
        assert_eq!(st.this_widget, Some(WidgetKind::Pin1Dx0));
        let target = (w.x_pixel0 + gs.geometry().x_pixel1) / 2;
        assert!(gs.check_widget_event(&mut st, target, w.y_pixel0, false));
        assert_eq!(gs.history().len(), 1);
        let sd = gs.view().scale();
        assert!(sd.min_x > 350.0, "min_x {}", sd.min_x);
        assert!((sd.max_x - 600.0).abs() < 1e-6);
        gs.mouse_released(&mut st, target, w.y_pixel0);
        assert_eq!(gs.history().len(), 2);
    }

    #[test]
    fn test_y_pin_pair_drag_moves_both_pins() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![uv_vis("uv")]);
        let (a, b) = (gs.widgets()[WidgetKind::Pin1Dy0].y_pixel0, gs.widgets()[WidgetKind::Pin1Dy1].y_pixel0);
        let centre = gs.widgets()[WidgetKind::Pin1Dy01].clone();
        st.press();
        st.this_widget = Some(WidgetKind::Pin1Dy01);
        assert!(gs.check_widget_event(&mut st, centre.x_pixel0, centre.y_pixel0 - 6, false));
        let (na, nb) = (gs.widgets()[WidgetKind::Pin1Dy0].y_pixel0, gs.widgets()[WidgetKind::Pin1Dy1].y_pixel0);
        assert!(na < a && nb < b);
        assert!(((na - nb) - (a - b)).abs() <= 1);
        assert!(gs.view().scale().is_shift_zoomed_y);
        assert_eq!(gs.history().len(), 1);
    }

    #[test]
    fn test_stacked_press_picks_trace() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        let (x, y) = (gs.to_pixel_x(3.0), gs.to_pixel_y(1.0));
        assert!(!gs.check_spectrum_clicked(&mut st, x, y, 1));
        assert_eq!(gs.selection().clicked(), Some(1));
        assert_eq!(gs.selection().previous_clicked(), Some(1));
        let (cx, _) = mid_plot(&gs);
        let top = gs.geometry().y_pixel0 + 3;
        gs.check_spectrum_clicked(&mut st, cx, top, 1);
        assert_eq!(gs.selection().clicked(), None);
    }

    #[test]
    fn test_2d_click_moves_cross_hairs_and_links() {
        let mut st = InteractionState::new();
        st.is_linked = true;
        let mut gs = sized(vec![hsqc("h")]);
        gs.is_linked = true;
        let img = gs.image().expect("2D group").clone();
        let (x, y) = (img.x_pixel0 + 50, img.y_pixel0 + 50);
        gs.mouse_clicked(&mut st, x, y, 1, false);
        assert_eq!(gs.widgets()[WidgetKind::Cur2Dx1].x_pixel0, x);
        let index = img.to_subspectrum_index(y);
        assert!(st
            .notices()
            .iter()
            .any(|n| matches!(n, PanelNotice::SubSpectrumChanged { index: i, .. } if *i == index)));
        assert!(matches!(
            st.take_link_requests().as_slice(),
            [LinkRequest::CrossHairs2D { locked: true, .. }]
        ));
    }

    #[test]
    fn test_linked_cursors_hide_off_frame() {
        let mut gs = sized(vec![proton("a", &[2.0])]);
        gs.set_link_targets(true, Some(1), None);
        gs.set_2d_xy(4.0, 0.0, true);
        let w = &gs.widgets()[WidgetKind::Cur1D2x1];
        assert_eq!(w.x(), 4.0);
        assert_eq!(w.x_pixel0, gs.to_pixel_x(4.0));
        gs.set_2d_xy(40.0, 0.0, false);
        assert_eq!(gs.widgets()[WidgetKind::Cur1D2x1].x_pixel0, i32::MIN);
        assert!(!gs.cur1d2_locked);
    }
}
