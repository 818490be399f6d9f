/// Primitive generation for one pane group
///
/// Nothing here paints: every routine writes primitives to a
/// [`DrawingSurface`]. `draw_all` runs once per split frame and leaves the
/// scale of the last plotted spectrum current.

use super::graph_set::GraphSet;
use super::interaction::InteractionState;
use super::layout::Arrow;
use super::selection::Active;
use super::widget::{PlotWidget, WidgetColor, WidgetKind};
use crate::annotation::{Annotation, AnnotationType};
use crate::config::{Palette, Rgba};
use crate::render::{DrawingSurface, TextAlign};
use crate::scale::scale_data::{format_decimal, trim_labels};

/// Tick loops stop after this many steps whatever the scale says.
const MAX_TICKS: usize = 500;

const MOUSE_OVER: Rgba = Rgba(240, 240, 240, 140);

/// Rows and columns of labels on the image axes.
const IMAGE_LABELS: i32 = 4;

fn fill_box(s: &mut dyn DrawingSurface, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    s.rect(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs(), color, true);
}

/// Tick values from `first` (or `min` when there is no first tick) up to `max`.
fn tick_values(first: f64, min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !step.is_finite() {
        return Vec::new();
    }
    let start = if first.is_nan() { min } else { first };
    (0..MAX_TICKS)
        .map(|k| start + k as f64 * step)
        .take_while(|v| *v <= max + step * 1e-4)
        .map(|v| if v.abs() < step * 1e-6 { 0.0 } else { v })
        .collect()
}

impl GraphSet {
    // ── Frame ──

    /// Draw split frame `i_split` of this group. `need_new_pins` re-pixels
    /// the range pins, as after a resize.
    pub fn draw_all(&mut self, s: &mut dyn DrawingSurface, st: &InteractionState, i_split: usize, need_new_pins: bool) {
        self.set_position_for_frame(i_split);
        let pal = self.settings.palette.clone();
        let g = self.geom;
        let n = self.spectra.len();
        let active = self.selection.active_index();
        let stack_selected = self.selection.stack_selected;
        let i_selected = if stack_selected || !self.show_all_stacked { active } else { None };
        let hover = self.selection.hover().or((n == 1).then_some(0));
        let no_plot = self.selection.is_no_plot();
        let draw_1d = self.image.is_none() || self.settings.display_1d;

        if self.image.is_some() {
            self.draw_image(s, &pal);
        }
        if draw_1d {
            s.rect(g.x_pixel0, g.y_pixel0, g.x_pixels, g.y_pixels, pal.plot_area, true);
        }

        let spec_for_frame = if n == 1 {
            Some(0)
        } else if !self.show_all_stacked {
            hover
        } else {
            active
        };
        let add_current_box = self.is_current
            && !self.is_linked
            && (!self.is_splittable || self.n_split == 1 || st.current_split_point == i_split);
        let draw_arrows = self.settings.enable_zoom
            && self.is_current
            && !no_plot
            && self.spectra[0].is_scalable()
            && (add_current_box || n == 1)
            && (self.n_split == 1 || hover == Some(st.current_split_point));
        self.draw_frame(s, &pal, spec_for_frame, add_current_box, draw_arrows, draw_1d);

        if !draw_1d {
            // image only: widgets and image axes
            self.set_scale(0);
            self.reset_pins_from_view();
            self.set_widgets(need_new_pins, false);
            self.draw_widgets(s, &pal, st, false, true, false);
            self.draw_widgets(s, &pal, st, false, true, true);
            self.draw_image_scales(s, &pal);
            return;
        }

        let plotted: Vec<usize> = (0..n).filter(|&i| self.do_plot(i, i_split)).collect();
        let same_y = plotted.windows(2).all(|w| self.view.are_y_scales_same(w[0], w[1]));
        let do_y_scale = !self.show_all_stacked || n == 1 || i_selected.is_some() || same_y;
        let single_y = if self.show_all_stacked && n > 1 {
            self.allow_stacked_y_scale && do_y_scale
        } else {
            true
        };
        let have_selected = self.is_current
            && i_split == st.current_split_point
            && (plotted.len() < 2 || active.is_some());

        let mut i_for_scale = self.fixed_index();
        let mut y_scale_drawn = false;
        for &i in &plotted {
            let continuous = self.spectra[i].is_continuous();
            let on_spectrum = continuous
                && match hover {
                    Some(h) if self.n_split > 1 => h == i,
                    Some(_) => self.is_linked || i == i_for_scale,
                    None => false,
                };
            let is_grey = stack_selected && active != Some(i);
            self.set_scale(i);
            if self.n_split > 1 {
                i_for_scale = i;
            }
            let draw_widgets = !is_grey && (self.n_split == 1 || self.show_all_stacked || active == Some(i_split));
            let draw_1d_y = draw_widgets && have_selected && i == i_for_scale;
            if draw_widgets {
                self.reset_pins_from_view();
                self.set_widgets(need_new_pins, draw_1d);
                self.draw_widgets(s, &pal, st, draw_1d, draw_1d_y, false);
            }
            if single_y && i == i_for_scale {
                self.draw_grid(s, &pal);
            }
            if draw_widgets {
                self.draw_widgets(s, &pal, st, draw_1d, draw_1d_y, true);
            }

            let annotate = !no_plot
                && (n == 1 || active.is_some())
                && ((single_y && i == i_for_scale) || (self.show_all_stacked && stack_selected && active == Some(i)));
            if annotate {
                self.draw_highlights(s, i);
                self.draw_peak_tabs(s, &pal, i);
            }
            if single_y && i == i_for_scale && !y_scale_drawn {
                if self.settings.y_scale_on {
                    self.draw_y_scale(s, &pal);
                }
                if self.settings.y_units_on {
                    self.draw_y_units(s, &pal, i);
                }
                y_scale_drawn = true;
            }

            let color = if is_grey {
                pal.grey
            } else if !self.allow_stacking {
                self.plot_color(0)
            } else {
                self.plot_color(i)
            };
            self.draw_plot(s, &pal, i, self.stack_offset(i), color);
            if annotate {
                self.draw_integrals(s, &pal, i);
                self.draw_measurements(s, &pal, i);
            }
            self.draw_pending_measurement(s, &pal, i);
            if on_spectrum && self.x_pixel_moved_to >= 0 {
                self.draw_pointer(s, &pal, i);
            }
        }

        if self.have_left_right_arrows() {
            self.draw_left_right_arrows(s, &pal);
        }
        self.set_scale(i_for_scale);
        if self.settings.x_scale_on {
            self.draw_x_scale(s, &pal);
        }
        if self.settings.x_units_on {
            self.draw_x_units(s, &pal);
        }
        if self.image.is_some() {
            self.draw_image_scales(s, &pal);
        }
    }

    fn draw_frame(
        &self,
        s: &mut dyn DrawingSurface,
        pal: &Palette,
        spec: Option<usize>,
        add_current_box: bool,
        draw_arrows: bool,
        draw_1d: bool,
    ) {
        let g = self.geom;
        if !self.settings.grid_on && draw_1d {
            s.rect(g.x_pixel0, g.y_pixel0, g.x_pixels, g.y_pixels, pal.grid, false);
        }
        if draw_arrows {
            let (ux, uy) = g.arrow_anchor(Arrow::Up);
            s.polyline(&[(ux - 5, uy + 4), (ux, uy - 4), (ux + 5, uy + 4), (ux - 5, uy + 4)], pal.scale, 1.0);
            let (dx, dy) = g.arrow_anchor(Arrow::Down);
            s.polyline(&[(dx - 5, dy - 4), (dx, dy + 4), (dx + 5, dy - 4), (dx - 5, dy - 4)], pal.scale, 1.0);
            let (rx, ry) = g.arrow_anchor(Arrow::Reset);
            match spec {
                Some(i) => s.circle(rx, ry, 4, self.plot_color(i), true),
                None => s.circle(rx, ry, 4, pal.scale, false),
            }
        }
        if !add_current_box {
            return;
        }
        let (x0, x1) = (g.x_pixel00 + 10, g.x_pixel11 - 10);
        let (y0, y1) = (g.y_pixel00 + 1, g.y_pixel11 - 2);
        s.line(x0, y0, x1, y0, pal.grid, 1.0);
        s.line(x0, y1, x1, y1, pal.grid, 1.0);
        s.line(x0, y0, x0, y1, pal.grid, 1.0);
        s.line(x1, y0, x1, y1, pal.grid, 1.0);
        let (cx, cy) = g.closer_box();
        s.rect(cx, cy, 10, 10, pal.scale, false);
        s.line(cx + 2, cy + 2, cx + 8, cy + 8, pal.scale, 1.0);
        s.line(cx + 2, cy + 8, cx + 8, cy + 2, pal.scale, 1.0);
        if self.is_splittable {
            let (sx, sy) = g.splitter_box();
            s.rect(sx, sy, 10, 10, pal.scale, true);
        }
    }

    fn draw_left_right_arrows(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        let g = self.geom;
        let (lx, ly) = g.arrow_anchor(Arrow::Left);
        s.polyline(&[(lx - 4, ly), (lx + 4, ly - 5), (lx + 4, ly + 5), (lx - 4, ly)], pal.scale, 1.0);
        let (rx, ry) = g.arrow_anchor(Arrow::Right);
        s.polyline(&[(rx + 4, ry), (rx - 4, ry - 5), (rx - 4, ry + 5), (rx + 4, ry)], pal.scale, 1.0);
        let (hx, hy) = g.arrow_anchor(Arrow::Home);
        s.circle(hx, hy, 4, pal.scale, self.selection.active() == Active::All);
    }

    // ── Widgets ──

    /// Pins and zoom boxes go under the grid (`post_grid == false`),
    /// cursors over it.
    fn draw_widgets(
        &self,
        s: &mut dyn DrawingSurface,
        pal: &Palette,
        st: &InteractionState,
        draw_1d: bool,
        draw_1d_y: bool,
        post_grid: bool,
    ) {
        if !post_grid {
            self.draw_slider_bars(s, pal, draw_1d, draw_1d_y);
        }
        for w in self.widgets.iter() {
            let k = w.kind;
            if !w.is_visible || (!k.is_pin_or_cursor() && !self.settings.enable_zoom) {
                continue;
            }
            if (k.is_pin() || !k.is_pin_or_cursor()) == post_grid {
                continue;
            }
            if k.is_2d() {
                if k == WidgetKind::Cur2Dx0 && !draw_1d {
                    continue;
                }
            } else {
                let is_pin_1dy = matches!(k, WidgetKind::Pin1Dy0 | WidgetKind::Pin1Dy01 | WidgetKind::Pin1Dy1);
                if self.image.is_some() && draw_1d == is_pin_1dy {
                    continue;
                }
                if is_pin_1dy && !draw_1d_y {
                    continue;
                }
                if matches!(k, WidgetKind::Cur1D2x1 | WidgetKind::Cur1D2x2)
                    && (!self.is_linked || w.x_pixel0 == i32::MIN)
                {
                    continue;
                }
            }
            self.draw_widget(s, pal, st, w);
        }
    }

    fn widget_color(&self, pal: &Palette, w: &PlotWidget) -> Rgba {
        match w.color {
            WidgetColor::Plot => self.plot_color(self.fixed_index()),
            WidgetColor::PeakTab => pal.peak_tab,
        }
    }

    fn draw_widget(&self, s: &mut dyn DrawingSurface, pal: &Palette, st: &InteractionState, w: &PlotWidget) {
        if w.kind.is_pin_or_cursor() {
            let color = self.widget_color(pal, w);
            s.line(w.x_pixel0, w.y_pixel0, w.x_pixel1, w.y_pixel1, color, 1.0);
            if w.kind.is_pin() {
                s.rect(w.x_pixel0 - 2, w.y_pixel0 - 2, 4, 4, color, !w.is_enabled);
            }
            return;
        }
        if w.is_collapsed() {
            return;
        }
        let color = if st.is_integral_drag {
            pal.integral.with_alpha(96)
        } else if st.shift_pressed {
            pal.zoom_box_shift
        } else {
            pal.zoom_box
        };
        fill_box(s, w.x_pixel0, w.y_pixel0, w.x_pixel1, w.y_pixel1, color);
    }

    /// Range bars behind the pins: the full extent in the grid colour, the
    /// range between the pins in the plot colour.
    fn draw_slider_bars(&self, s: &mut dyn DrawingSurface, pal: &Palette, draw_1d: bool, draw_1d_y: bool) {
        let g = self.geom;
        let ws = &self.widgets;
        let color = self.plot_color(self.fixed_index());
        if draw_1d {
            let bar = &ws[WidgetKind::Pin1Dx01];
            fill_box(s, g.x_pixel0, bar.y_pixel0, g.x_pixel1, bar.y_pixel1, pal.grid);
            let (a, b) = (ws[WidgetKind::Pin1Dx0].x_pixel0, ws[WidgetKind::Pin1Dx1].x_pixel0);
            fill_box(s, a, bar.y_pixel0, b, bar.y_pixel1, color);
        }
        if draw_1d_y && !(self.image.is_some() && draw_1d) {
            let bar = &ws[WidgetKind::Pin1Dy01];
            fill_box(s, bar.x_pixel1, g.y_pixel0, bar.x_pixel0, g.y_pixel1, pal.grid);
            let (a, b) = (ws[WidgetKind::Pin1Dy0].y_pixel0, ws[WidgetKind::Pin1Dy1].y_pixel0);
            fill_box(s, bar.x_pixel1, a, bar.x_pixel0, b, color);
        }
        let Some(img) = &self.image else {
            return;
        };
        let bar = &ws[WidgetKind::Pin2Dx01];
        fill_box(s, img.x_pixel0, bar.y_pixel0, img.x_pixel1, bar.y_pixel1, pal.grid);
        let (a, b) = (ws[WidgetKind::Pin2Dx0].x_pixel0, ws[WidgetKind::Pin2Dx1].x_pixel0);
        fill_box(s, a, bar.y_pixel0, b, bar.y_pixel1, color);
        let bar = &ws[WidgetKind::Pin2Dy01];
        fill_box(s, bar.x_pixel1, img.y_pixel0, bar.x_pixel0, img.y_pixel1, pal.grid);
        let (a, b) = (ws[WidgetKind::Pin2Dy0].y_pixel0, ws[WidgetKind::Pin2Dy1].y_pixel0);
        fill_box(s, bar.x_pixel1, a, bar.x_pixel0, b, color);
    }

    // ── Grid and scales ──

    fn draw_grid(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        if !self.settings.grid_on {
            return;
        }
        let g = self.geom;
        let sd = self.view.scale();
        for v in tick_values(sd.first_x, sd.min_x_on_scale, sd.max_x_on_scale, sd.steps[0]) {
            let px = self.to_pixel_x(v);
            if px == self.fix_x(px) {
                s.line(px, g.y_pixel0, px, g.y_pixel1, pal.grid, 1.0);
            }
        }
        for v in tick_values(sd.first_y, sd.min_y_on_scale, sd.max_y_on_scale, sd.steps[1]) {
            let py = self.to_pixel_y(v);
            if py == self.fix_y(py) {
                s.line(g.x_pixel0, py, g.x_pixel1, py, pal.grid, 1.0);
            }
        }
    }

    fn draw_x_scale(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        let g = self.geom;
        let sd = self.view.scale();
        let step = sd.steps[0];
        let first = if sd.first_x.is_nan() { sd.min_x_on_scale } else { sd.first_x };
        let values = tick_values(first - step, first - step, sd.max_x_on_scale + step, step);
        if values.is_empty() {
            return;
        }
        let minor = sd.minor_tick_counts[0].max(1);
        let mut labelled: Vec<(i32, String)> = Vec::new();
        for &v in &values {
            let px = self.to_pixel_x(v);
            let in_frame = px == self.fix_x(px);
            if in_frame {
                s.line(px, g.y_pixel1, px, g.y_pixel1 + 4, pal.scale, 1.0);
                labelled.push((px, format_decimal(v, sd.precision[0])));
            }
            for m in 1..minor {
                let mx = self.to_pixel_x(v + m as f64 * step / minor as f64);
                if mx == self.fix_x(mx) {
                    s.line(mx, g.y_pixel1, mx, g.y_pixel1 + 2, pal.scale, 1.0);
                }
            }
        }
        let mut labels: Vec<String> = labelled.iter().map(|(_, t)| t.clone()).collect();
        trim_labels(&mut labels);
        let dx = (self.to_pixel_x(first + step) - self.to_pixel_x(first)).abs().max(1) as f64;
        let h = s.text_height();
        let mut skip = 0;
        for ((px, _), label) in labelled.iter().zip(&labels) {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            let w = s.text_width(label);
            if px + w / 2 > g.x_pixel1 + 3 {
                continue;
            }
            s.text(*px, g.y_pixel1 + 4 + h, label, pal.scale, TextAlign::Centre);
            skip = (w as f64 / (0.95 * dx)).floor() as usize;
        }
    }

    fn draw_y_scale(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        let g = self.geom;
        let sd = self.view.scale();
        let mut ticks: Vec<(i32, String)> = Vec::new();
        for v in tick_values(sd.first_y, sd.min_y_on_scale, sd.max_y_on_scale, sd.steps[1]) {
            let py = self.to_pixel_y(v);
            if py != self.fix_y(py) {
                continue;
            }
            s.line(g.x_pixel0, py, g.x_pixel0 - 3, py, pal.scale, 1.0);
            ticks.push((py, format_decimal(v, sd.precision[1])));
        }
        let mut labels: Vec<String> = ticks.iter().map(|(_, t)| t.clone()).collect();
        trim_labels(&mut labels);
        let h = s.text_height();
        let mut last_y: Option<i32> = None;
        for ((py, _), label) in ticks.iter().zip(labels) {
            if last_y.is_some_and(|ly| (ly - py).abs() < h) {
                continue;
            }
            let label = if label.starts_with('0') && label.contains('E') { "0".to_string() } else { label };
            s.text(g.x_pixel0 - 4, py + h / 3, &label, pal.scale, TextAlign::Right);
            last_y = Some(*py);
        }
    }

    fn draw_x_units(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        let g = self.geom;
        let h = s.text_height();
        let label = self.spectrum().axis_label(true);
        s.text(g.x_pixel1 + 25, g.y_pixel1 + 5 + h, &label, pal.units, TextAlign::Right);
    }

    fn draw_y_units(&self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize) {
        let g = self.geom;
        let h = s.text_height();
        let mut label = self.spectra[i].axis_label(false);
        if label.is_empty() {
            label = "ARBITRARY UNITS".to_string();
        }
        s.text(g.x_pixel00 + 5, g.y_pixel0 + 5 - h, &label, pal.units, TextAlign::Left);
    }

    // ── Traces ──

    /// Spectrum `i` under the current scale, lifted by `offset` pixels.
    fn draw_plot(&self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize, offset: i32, color: Rgba) {
        let g = self.geom;
        let spec = &self.spectra[i];
        let coords = spec.xy_coords();
        let sd = self.view.scale();
        if !coords.is_empty() {
            let last = coords.len() - 1;
            let (a, b) = (sd.start_index.min(last), sd.end_index.min(last));
            if spec.is_continuous() {
                let mut run: Vec<(i32, i32)> = Vec::with_capacity(b.saturating_sub(a) + 1);
                for c in coords.get(a..=b).unwrap_or(&[]) {
                    let py = self.to_pixel_y(c.y);
                    if py == i32::MIN {
                        s.polyline(&run, color, 1.0);
                        run.clear();
                        continue;
                    }
                    run.push((self.to_pixel_x(c.x), self.fix_y(py - offset)));
                }
                s.polyline(&run, color, 1.0);
            } else {
                let base = self.fix_y(self.to_pixel_y(sd.min_y_on_scale.max(0.0)) - offset);
                for (k, c) in coords.get(a..=b).unwrap_or(&[]).iter().enumerate() {
                    let py = self.to_pixel_y(c.y);
                    if py == i32::MIN {
                        continue;
                    }
                    let py = self.fix_y(py - offset);
                    if py == base && (k == 0 || k == b - a) {
                        continue;
                    }
                    let px = self.to_pixel_x(c.x);
                    s.line(px, base, px, py, color, 1.0);
                }
            }
        }
        if sd.is_y_zero_on_scale() {
            let y0 = self.to_pixel_y(0.0) - offset;
            if y0 == self.fix_y(y0) {
                s.line(g.x_pixel0, y0, g.x_pixel1, y0, pal.grey, 1.0);
            }
        }
    }

    /// The pointer position on trace `i`: a full-height line while a
    /// measurement is pending, otherwise a short tick on the trace.
    fn draw_pointer(&mut self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize) {
        let g = self.geom;
        let x = self.x_pixel_moved_to;
        let y = self.spectra[i].y_value_at(self.x_value_moved_to);
        self.y_value_moved_to = y;
        if y.is_nan() || self.pending_measurement.is_some() {
            s.line(x, g.y_pixel0, x, g.y_pixel1, pal.peak_tab, 1.0);
            if self.x_pixel_moved_to2 >= 0 {
                let x2 = self.x_pixel_moved_to2;
                s.line(x2, g.y_pixel0, x2, g.y_pixel1, pal.peak_tab, 1.0);
            }
            return;
        }
        let py = self.to_pixel_y(y) - self.stack_offset(i);
        if py == self.fix_y(py) {
            s.line(x, py - 10, x, py + 10, pal.peak_tab, 1.0);
        }
    }

    // ── Annotations ──

    fn draw_highlights(&self, s: &mut dyn DrawingSurface, i: usize) {
        let g = self.geom;
        let sd = self.view.scale();
        for h in self.highlights.iter() {
            if h.spectrum.is_some_and(|j| j != i) {
                continue;
            }
            let (lo, hi) = (h.x1.min(h.x2), h.x1.max(h.x2));
            if hi < sd.min_x_on_scale || lo > sd.max_x_on_scale {
                continue;
            }
            let a = self.to_pixel_x(lo.max(sd.min_x_on_scale));
            let b = self.to_pixel_x(hi.min(sd.max_x_on_scale));
            fill_box(s, a, g.y_pixel0, b, g.y_pixel1, h.color);
        }
    }

    fn draw_peak_tabs(&self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize) {
        let g = self.geom;
        let spec = &self.spectra[i];
        if self.settings.peak_tabs_on {
            for (k, p) in spec.peaks.iter().enumerate() {
                let (a, b) = (self.to_pixel_x(p.x_min), self.to_pixel_x(p.x_max));
                let (fa, fb) = (self.fix_x(a), self.fix_x(b));
                if fa == fb && a != fa {
                    continue;
                }
                fill_box(s, fa, g.y_pixel0 + 2, fb, g.y_pixel0 + 5, pal.peak_tab);
                let cx = self.to_pixel_x(p.x);
                if cx == self.fix_x(cx) {
                    let len = if spec.selected_peak == Some(k) { 14 } else { 7 };
                    s.line(cx, g.y_pixel0 + 5, cx, g.y_pixel0 + 5 + len, pal.peak_tab, 1.0);
                }
            }
        }
        if let Some(p) = self
            .peak_mouse_over
            .filter(|(si, _)| *si == i)
            .and_then(|(_, k)| spec.peaks.get(k))
        {
            let (a, b) = (self.fix_x(self.to_pixel_x(p.x_min)), self.fix_x(self.to_pixel_x(p.x_max)));
            fill_box(s, a, g.y_pixel0, b, g.y_pixel1, MOUSE_OVER);
        }
    }

    fn draw_integrals(&self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize) {
        for (k, a) in self.store.list(i, AnnotationType::Integration).iter().enumerate() {
            let (x1, y, x2, _) = self.annotation_pixels(a, false);
            let (f1, f2) = (self.fix_x(x1), self.fix_x(x2));
            if f1 == f2 && x1 != f1 {
                continue;
            }
            let width = if self.selected_integral == Some((i, k)) { 3.0 } else { 2.0 };
            s.line(f1, y, f2, y, pal.integral, width);
            for (x, fx) in [(x1, f1), (x2, f2)] {
                if x == fx {
                    s.line(x, y - 3, x, y + 3, pal.integral, 1.0);
                }
            }
            let (lx, ly) = self.integral_label_anchor(a);
            if lx == self.fix_x(lx) {
                s.text(lx, ly, &a.span().text, pal.integral, TextAlign::Centre);
            }
        }
    }

    fn draw_measurements(&self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize) {
        let on_baseline = self.view.scale().is_y_zero_on_scale() && self.spectra[i].is_hnmr();
        for (k, a) in self.store.list(i, AnnotationType::Measurements).iter().enumerate() {
            if a.span().text.is_empty() {
                continue;
            }
            let width = if self.selected_measurement == Some((i, k)) { 3.0 } else { 2.0 };
            self.draw_measurement(s, pal, a, on_baseline, width);
        }
    }

    fn draw_pending_measurement(&self, s: &mut dyn DrawingSurface, pal: &Palette, i: usize) {
        let Some((pi, span)) = &self.pending_measurement else {
            return;
        };
        if *pi != i {
            return;
        }
        let on_baseline = self.view.scale().is_y_zero_on_scale() && self.spectra[i].is_hnmr();
        self.draw_measurement(s, pal, &Annotation::Measurement(span.clone()), on_baseline, 2.0);
    }

    fn draw_measurement(&self, s: &mut dyn DrawingSurface, pal: &Palette, a: &Annotation, on_baseline: bool, width: f32) {
        let (x1, y, x2, _) = self.annotation_pixels(a, on_baseline);
        if x1 != self.fix_x(x1) || x2 != self.fix_x(x2) {
            return;
        }
        s.line(x1, y, x2, y, pal.measurement, width);
        if on_baseline {
            s.line(x1, y - 3, x1, y + 3, pal.measurement, 1.0);
            s.line(x2, y - 3, x2, y + 3, pal.measurement, 1.0);
        }
        let text = &a.span().text;
        if !text.is_empty() {
            s.text((x1 + x2) / 2, y - 2, text, pal.measurement, TextAlign::Centre);
        }
    }

    // ── Image ──

    fn draw_image(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        let Some(img) = &self.image else {
            return;
        };
        let nx = (img.x_pixels / 4).max(1) as usize;
        let ny = (img.y_pixels / 4).max(1) as usize;
        for c in img.cells(&self.spectra[0], nx, ny) {
            let v = (255.0 - c.level * 255.0).round() as u8;
            s.rect(c.x0, c.y0, c.x1 - c.x0 + 1, c.y1 - c.y0 + 1, Rgba::rgb(v, v, v), true);
        }
        s.rect(img.x_pixel0, img.y_pixel0, img.x_pixels, img.y_pixels, pal.grid, false);
    }

    /// Evenly spaced labels along the image edges and the nucleus of each axis.
    fn draw_image_scales(&self, s: &mut dyn DrawingSurface, pal: &Palette) {
        let Some(img) = &self.image else {
            return;
        };
        let g = self.geom;
        let h = s.text_height();
        let spec = &self.spectra[0];
        if self.settings.x_scale_on {
            let cols: Vec<i32> = (0..=IMAGE_LABELS)
                .map(|k| img.x_pixel0 + k * (img.x_pixels - 1) / IMAGE_LABELS)
                .collect();
            let mut labels: Vec<String> = cols
                .iter()
                .map(|&px| format_decimal(img.to_x(px), self.view.scale().precision[0]))
                .collect();
            trim_labels(&mut labels);
            for (px, label) in cols.iter().zip(&labels) {
                s.line(*px, img.y_pixel1, *px, img.y_pixel1 + 3, pal.scale, 1.0);
                s.text(*px, img.y_pixel1 + 4 + h, label, pal.scale, TextAlign::Centre);
            }
        }
        if self.settings.y_scale_on {
            let rows: Vec<i32> = (0..=IMAGE_LABELS)
                .map(|k| img.y_pixel0 + k * (img.y_pixels - 1) / IMAGE_LABELS)
                .collect();
            let mut labels: Vec<String> = rows.iter().map(|&py| format_decimal(img.to_y(py), 1)).collect();
            trim_labels(&mut labels);
            for (py, label) in rows.iter().zip(&labels) {
                s.text(img.x_pixel1 + 18, py + h / 3, label, pal.scale, TextAlign::Left);
            }
        }
        if self.settings.x_units_on {
            let label = spec.nucleus_x.to_string();
            s.text(g.x_pixel11 - 2, img.y_pixel1 + 4 + h, &label, pal.units, TextAlign::Right);
        }
        if self.settings.y_units_on {
            if let Some(ny) = &spec.nucleus_y {
                s.text(img.x_pixel1 + 18, img.y_pixel0 - 7, &ny.to_string(), pal.units, TextAlign::Left);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Span;
    use crate::config::PlotSettings;
    use crate::data::{Coordinate, Spectrum};
    use crate::graph::test_support::{hsqc, proton, sized};
    use crate::render::{Frame, Primitive};

    fn traces(f: &Frame, color: Rgba) -> Vec<Vec<(i32, i32)>> {
        f.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Polyline { points, color: c, .. } if *c == color => Some(points.clone()),
                _ => None,
            })
            .collect()
    }

    fn draw(gs: &mut GraphSet, st: &InteractionState) -> Frame {
        let mut f = Frame::default();
        gs.draw_all(&mut f, st, 0, false);
        f
    }

    fn palette() -> Palette {
        PlotSettings::default().palette
    }

    #[test]
    fn test_single_trace_draws_axes_and_trace() {
        let st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0, 5.0])]);
        let f = draw(&mut gs, &st);
        let g = *gs.geometry();
        let lines = traces(&f, gs.plot_color(0));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].len() > 100);
        assert!(lines[0].iter().all(|&(_, y)| y >= g.y_pixel0 && y <= g.y_pixel1));

        let texts: Vec<&str> = f.texts().collect();
        let units = gs.spectrum().axis_label(true);
        assert!(texts.contains(&units.as_str()));
        assert!(texts.iter().filter(|t| t.parse::<f64>().is_ok()).count() >= 3);
    }

    #[test]
    fn test_stacked_traces_are_offset() {
        let st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[2.0])]);
        gs.settings_mut().y_stack_offset_percent = 20;
        assert!(gs.show_all_stacked());
        let f = draw(&mut gs, &st);
        let a = traces(&f, gs.plot_color(0));
        let b = traces(&f, gs.plot_color(1));
        assert_eq!((a.len(), b.len()), (1, 1));
        let lift = a[0][0].1 - b[0][0].1;
        assert!((lift - gs.stack_offset(1)).abs() <= 1);
        assert!(gs.stack_offset(1) > 0);
    }

    #[test]
    fn test_split_frames_draw_one_trace_each() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[6.0])]);
        gs.split_stack(&mut st, true);
        assert_eq!(gs.n_split(), 2);
        let mut top = Frame::default();
        gs.draw_all(&mut top, &st, 0, false);
        let mut bottom = Frame::default();
        gs.draw_all(&mut bottom, &st, 1, false);
        assert_eq!(traces(&top, gs.plot_color(0)).len(), 1);
        assert!(traces(&top, gs.plot_color(1)).is_empty());
        assert_eq!(traces(&bottom, gs.plot_color(1)).len(), 1);
    }

    #[test]
    fn test_zoom_box_drawn_while_dragging() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let g = *gs.geometry();
        let (cx, cy) = ((g.x_pixel0 + g.x_pixel1) / 2, (g.y_pixel0 + g.y_pixel1) / 2);
        st.press();
        gs.check_widget_event(&mut st, cx - 50, cy - 20, true);
        gs.check_widget_event(&mut st, cx + 50, cy + 20, false);
        let f = draw(&mut gs, &st);
        let zoom_box = palette().zoom_box;
        assert!(f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Rect { x, w, filled: true, color, .. } if *color == zoom_box && *x == cx - 50 && *w == 100
        )));
    }

    #[test]
    fn test_annotations_are_labelled() {
        let st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0, 2.3])]);
        let spec = gs.spectra()[0].clone();
        let integral = Annotation::integral(&spec, 1.5, 2.5);
        let integral_text = integral.span().text.clone();
        let mut m = Span::new(2.0, 0.5);
        m.set_pt2(2.3, 0.5, &spec);
        let m_text = m.text.clone();
        assert!(!m_text.is_empty());
        gs.store_mut().add(0, integral);
        gs.store_mut().add(0, Annotation::Measurement(m));

        let f = draw(&mut gs, &st);
        let texts: Vec<&str> = f.texts().collect();
        assert!(texts.contains(&integral_text.as_str()));
        assert!(texts.contains(&m_text.as_str()));
        let pal = palette();
        let bar_y = gs.integral_bar_y();
        assert!(f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Line { y0, y1, color, .. } if *y0 == bar_y && *y1 == bar_y && *color == pal.integral
        )));
    }

    #[test]
    fn test_discrete_spectrum_draws_sticks() {
        let st = InteractionState::new();
        let coords = (1..=10)
            .map(|i| Coordinate::new(i as f64 * 10.0, 10.0 + i as f64 * 5.0))
            .collect();
        let ms = Spectrum::new_1d("ms", "MASS SPECTRUM", "M/Z", "RELATIVE ABUNDANCE", coords).discrete();
        let mut gs = sized(vec![ms]);
        let color = gs.plot_color(0);
        let f = draw(&mut gs, &st);
        assert!(traces(&f, color).is_empty());
        let sticks = f
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Line { x0, x1, color: c, .. } if x0 == x1 && *c == color))
            .count();
        assert!(sticks >= 8);
    }

    #[test]
    fn test_pointer_follows_mouse() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let g = *gs.geometry();
        let (cx, cy) = ((g.x_pixel0 + g.x_pixel1) / 2, (g.y_pixel0 + g.y_pixel1) / 2);
        gs.mouse_moved(&mut st, cx, cy);
        let f = draw(&mut gs, &st);
        let tab = palette().peak_tab;
        assert!(f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Line { x0, x1, color, .. } if *x0 == cx && *x1 == cx && *color == tab
        )));

        gs.mouse_moved(&mut st, i32::MAX, 0);
        let f = draw(&mut gs, &st);
        assert!(!f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Line { x0, x1, color, .. } if *x0 == cx && *x1 == cx && *color == tab
        )));
    }

    #[test]
    fn test_current_group_draws_controls() {
        let st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let f = draw(&mut gs, &st);
        assert!(!f.primitives.iter().any(|p| matches!(p, Primitive::Circle { .. })));

        gs.is_current = true;
        let f = draw(&mut gs, &st);
        let (bx, by) = gs.geometry().closer_box();
        assert!(f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Rect { x, y, w: 10, h: 10, filled: false, .. } if *x == bx && *y == by
        )));
        assert!(f.primitives.iter().any(|p| matches!(p, Primitive::Circle { filled: true, .. })));
    }

    #[test]
    fn test_image_draws_grey_cells_and_nuclei() {
        let st = InteractionState::new();
        let mut gs = sized(vec![hsqc("h")]);
        let f = draw(&mut gs, &st);
        let grey = f
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { filled: true, color: Rgba(r, g, b, 255), .. } if r == g && g == b))
            .count();
        assert!(grey > 20);
        let texts: Vec<&str> = f.texts().collect();
        assert!(texts.contains(&"1H"));
        assert!(texts.contains(&"13C"));
    }

    #[test]
    fn test_highlights_and_peak_tabs() {
        use crate::data::PeakInfo;
        let st = InteractionState::new();
        let spec = proton("a", &[2.0]).with_peaks(vec![PeakInfo::new(2.0, 0.1, "H-2")]);
        let mut gs = sized(vec![spec]);
        let hl = Rgba::rgb(0, 200, 0).with_alpha(60);
        gs.add_highlight(4.0, 5.0, None, Some(hl));
        let f = draw(&mut gs, &st);
        let g = *gs.geometry();
        assert!(f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Rect { y, color, filled: true, .. } if *color == hl && *y == g.y_pixel0
        )));
        let tab = palette().peak_tab;
        assert!(f.primitives.iter().any(|p| matches!(
            p,
            Primitive::Rect { y, color, filled: true, .. } if *color == tab && *y == g.y_pixel0 + 2
        )));
    }

    #[test]
    fn test_tick_values() {
        assert!(tick_values(0.0, 0.0, 1.0, 0.0).is_empty());
        assert_eq!(tick_values(f64::NAN, 1.0, 3.0, 1.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(tick_values(-0.5, -0.5, 0.6, 0.5)[1], 0.0);
        assert_eq!(tick_values(0.0, 0.0, 1e12, 1.0).len(), MAX_TICKS);
    }
}
