/// One pane group: its spectra, zoom history, widgets and selection
///
/// A `GraphSet` owns everything needed to map one group of spectra onto a
/// rectangle of the canvas. Pointer handling lives in `events.rs` and
/// primitive generation in `draw.rs`; both are further `impl GraphSet`
/// blocks over the state defined here.

use super::history::ZoomHistory;
use super::image_view::ImageView;
use super::interaction::{InteractionState, LinkRequest, PanelNotice};
use super::layout::{FracPosition, FrameGeometry};
use super::selection::{Active, SelectionState};
use super::widget::{WidgetKind, WidgetSet};
use crate::annotation::{AnnotationStore, Highlights, MemoryStore, Span};
use crate::config::{PlotSettings, Rgba};
use crate::data::{Coordinate, Spectrum};
use crate::error::{parse_number, PlotError, Result};
use crate::scale::{scale_data, ScaleTarget, ViewData};
use std::path::Path;

/// A zoom that would keep fewer samples than this is rejected.
pub const MIN_POINTS_FOR_ZOOM: usize = 3;

/// Vertical step factor for the up/down arrows and PageUp/PageDown.
pub const RT2: f64 = std::f64::consts::SQRT_2;

/// How a calibration shift picks its old and new x values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftMode {
    /// Snap the clicked x to the nearest peak, then move it to the new x.
    Peak,
    /// Move the clicked x itself to the new x.
    SetX,
    /// Shift by a literal amount.
    X,
    /// Complete a shift armed by `Peak` or `SetX` with the last click.
    Clicked,
    /// Undo every shift applied so far.
    Reset,
}

/// Arguments of one zoom. `new` gives the common case (1D, linked,
/// pushed to history); tweak the flags with struct update syntax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRequest {
    pub init_x: f64,
    pub init_y: f64,
    pub final_x: f64,
    pub final_y: f64,
    pub is_1d: bool,
    /// Also zoom Y (a shift-zoom) rather than only X.
    pub is_1d_y: bool,
    /// Clamp an end that falls outside the current x range.
    pub check_range: bool,
    /// Mirror the x range onto linked panes.
    pub check_linked: bool,
    pub add_zoom: bool,
}

impl ZoomRequest {
    pub fn new(init_x: f64, init_y: f64, final_x: f64, final_y: f64) -> Self {
        Self {
            init_x,
            init_y,
            final_x,
            final_y,
            is_1d: true,
            is_1d_y: false,
            check_range: false,
            check_linked: true,
            add_zoom: true,
        }
    }
}

pub struct GraphSet {
    pub(crate) spectra: Vec<Spectrum>,
    pub(crate) store: Box<dyn AnnotationStore>,
    pub(crate) highlights: Highlights,
    pub(crate) plot_colors: Vec<Rgba>,
    pub(crate) settings: PlotSettings,

    // ── Layout ──
    pub(crate) position: FracPosition,
    pub(crate) geom: FrameGeometry,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) n_split: usize,
    pub(crate) show_all_stacked: bool,
    pub(crate) allow_stacking: bool,
    pub(crate) is_splittable: bool,
    pub(crate) allow_stacked_y_scale: bool,
    pub(crate) left_to_right: bool,
    /// Set when the split count changed and sibling positions need a recompute.
    pub(crate) layout_dirty: bool,
    pub(crate) is_current: bool,

    // ── Views ──
    pub(crate) selection: SelectionState,
    pub(crate) view: ViewData,
    pub(crate) history: ZoomHistory,
    pub(crate) widgets: WidgetSet,
    pub(crate) image: Option<ImageView>,

    // ── Linking ──
    pub(crate) is_linked: bool,
    /// Group index of the 2D pane sharing this pane's x nucleus.
    pub(crate) linked_x: Option<usize>,
    pub(crate) linked_y: Option<usize>,
    pub(crate) cur1d2_locked: bool,
    pub(crate) sticky_2d: bool,

    // ── Pointer state ──
    pub(crate) pending_measurement: Option<(usize, Span)>,
    pub(crate) last_int_drag_x: i32,
    pub(crate) selected_measurement: Option<(usize, usize)>,
    pub(crate) selected_integral: Option<(usize, usize)>,
    pub(crate) next_click_shift: Option<f64>,
    pub(crate) next_click_mode: ShiftMode,
    pub(crate) x_pixel_moved_to: i32,
    pub(crate) x_pixel_moved_to2: i32,
    pub(crate) x_value_moved_to: f64,
    pub(crate) y_value_moved_to: f64,
    pub(crate) in_plot_move: bool,
    /// (spectrum, peak) under the pointer.
    pub(crate) peak_mouse_over: Option<(usize, usize)>,
    pins_ready: bool,
}

impl std::fmt::Debug for GraphSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSet")
            .field("spectra", &self.spectra.len())
            .field("n_split", &self.n_split)
            .field("show_all_stacked", &self.show_all_stacked)
            .field("zoom", &self.history.cursor())
            .finish()
    }
}

impl GraphSet {
    /// A group over `spectra`, showing every sample. `None` for an empty list.
    pub fn new(spectra: Vec<Spectrum>, settings: &PlotSettings) -> Option<Self> {
        let Some(first) = spectra.first() else {
            log::warn!("GraphSet requested for an empty spectrum list");
            return None;
        };
        let n = spectra.len();
        let left_to_right = first.should_display_x_axis_increasing();
        let allow_stacking = first.is_stackable();
        let is_2d = !first.is_1d();
        let allow_stacked_y_scale = spectra
            .iter()
            .all(|s| s.y_units == first.y_units && s.user_y_factor == first.user_y_factor);
        let starts = vec![0; n];
        let ends: Vec<usize> = spectra.iter().map(|s| s.xy_coords().len().saturating_sub(1)).collect();
        let view = ViewData::new(&spectra, 0.0, 0.0, &starts, &ends, first.continuous, is_2d);
        let image = is_2d.then(|| {
            let sd = view.scale();
            ImageView::new(first, sd.min_x, sd.max_x, left_to_right)
        });
        log::debug!("GraphSet over {} spectra ({})", n, if is_2d { "2D" } else { "1D" });
        Some(Self {
            plot_colors: settings.plot_colors_for(n),
            settings: settings.clone(),
            store: Box::new(MemoryStore::new()),
            highlights: Highlights::default(),
            position: FracPosition::default(),
            geom: FrameGeometry::default(),
            width: 0,
            height: 0,
            n_split: 1,
            show_all_stacked: allow_stacking && n > 1,
            allow_stacking,
            is_splittable: n > 1,
            allow_stacked_y_scale,
            left_to_right,
            layout_dirty: false,
            is_current: false,
            selection: SelectionState::new(n),
            history: ZoomHistory::new(view.clone()),
            view,
            widgets: WidgetSet::new(image.is_some()),
            image,
            is_linked: false,
            linked_x: None,
            linked_y: None,
            cur1d2_locked: false,
            sticky_2d: false,
            pending_measurement: None,
            last_int_drag_x: -1,
            selected_measurement: None,
            selected_integral: None,
            next_click_shift: None,
            next_click_mode: ShiftMode::SetX,
            x_pixel_moved_to: -1,
            x_pixel_moved_to2: -1,
            x_value_moved_to: f64::NAN,
            y_value_moved_to: f64::NAN,
            in_plot_move: false,
            peak_mouse_over: None,
            pins_ready: false,
            spectra,
        })
    }

    /// Replace the default in-memory annotation store.
    pub fn with_store(mut self, store: Box<dyn AnnotationStore>) -> Self {
        self.store = store;
        self
    }

    /// Give the spectra back, e.g. to regroup them under another link mode.
    pub fn into_spectra(self) -> Vec<Spectrum> {
        self.spectra
    }

    // ── Accessors ──

    pub fn spectra(&self) -> &[Spectrum] {
        &self.spectra
    }

    pub fn spectrum_at(&self, i: usize) -> Option<&Spectrum> {
        self.spectra.get(i)
    }

    /// The spectrum that scaling and annotation lookups apply to.
    pub fn spectrum(&self) -> &Spectrum {
        &self.spectra[self.fixed_index()]
    }

    pub(crate) fn fixed_index(&self) -> usize {
        self.selection.fixed_index().min(self.spectra.len() - 1)
    }

    pub fn n_spectra(&self) -> usize {
        self.spectra.len()
    }

    pub fn n_split(&self) -> usize {
        self.n_split
    }

    pub fn show_all_stacked(&self) -> bool {
        self.show_all_stacked
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn view(&self) -> &ViewData {
        &self.view
    }

    pub fn history(&self) -> &ZoomHistory {
        &self.history
    }

    pub fn widgets(&self) -> &WidgetSet {
        &self.widgets
    }

    pub fn image(&self) -> Option<&ImageView> {
        self.image.as_ref()
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geom
    }

    pub fn position(&self) -> FracPosition {
        self.position
    }

    pub fn store(&self) -> &dyn AnnotationStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn AnnotationStore {
        self.store.as_mut()
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn pending_measurement(&self) -> Option<&Span> {
        self.pending_measurement.as_ref().map(|(_, s)| s)
    }

    pub fn is_linked(&self) -> bool {
        self.is_linked
    }

    pub fn is_2d(&self) -> bool {
        self.image.is_some()
    }

    pub fn settings_mut(&mut self) -> &mut PlotSettings {
        &mut self.settings
    }

    pub fn plot_color(&self, i: usize) -> Rgba {
        self.plot_colors.get(i).copied().unwrap_or(self.settings.palette.black)
    }

    /// Install a new settings block; plot colours are re-derived, not aliased.
    pub fn set_settings(&mut self, settings: &PlotSettings) {
        self.settings = settings.clone();
        self.plot_colors = settings.plot_colors_for(self.spectra.len());
    }

    pub fn has_file_loaded(&self, path: &Path) -> bool {
        self.spectra.iter().any(|s| s.source_path == path)
    }

    // ── Geometry ──

    pub fn set_canvas_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }

    pub fn set_position(&mut self, pos: FracPosition) {
        self.position = pos;
    }

    pub fn set_link_targets(&mut self, is_linked: bool, linked_x: Option<usize>, linked_y: Option<usize>) {
        self.is_linked = is_linked;
        self.linked_x = linked_x;
        self.linked_y = linked_y;
        self.widgets[WidgetKind::Cur1D2x1].is_visible = linked_x.is_some();
        self.widgets[WidgetKind::Cur1D2x2].is_visible = linked_y.is_some();
    }

    /// Lay out split frame `i_split`, carving the image window out of the
    /// plot area when the group holds a 2D spectrum.
    pub fn set_position_for_frame(&mut self, i_split: usize) {
        let mut g = FrameGeometry::compute(
            self.width,
            self.height,
            &self.position,
            &self.settings.margins,
            i_split,
            self.n_split,
        );
        if let Some(img) = self.image.as_mut() {
            let share = if self.settings.display_1d { 0.6 } else { 1.0 };
            img.set_pixel_width_height((share * g.x_pixels0 as f64) as i32, g.y_pixels);
            img.set_xy0(g.x_pixel10 - img.x_pixels, g.y_pixel0);
            if self.settings.display_1d {
                let ratio = (g.x_pixels0 - img.x_pixels) as f64 / g.x_pixels0 as f64;
                g.x_pixels = ((ratio * g.x_pixels0 as f64 * 0.8).floor() as i32).max(2);
                g.x_pixel1 = g.x_pixel0 + g.x_pixels - 1;
            } else {
                g.x_pixels = 2;
                g.x_pixel1 = img.x_pixel0 - 30;
            }
        }
        self.geom = g;
    }

    pub(crate) fn fix_x(&self, x: i32) -> i32 {
        self.geom.fix_x(x)
    }

    pub(crate) fn fix_y(&self, y: i32) -> i32 {
        self.geom.fix_y(y)
    }

    pub fn is_in_plot_region(&self, x: i32, y: i32) -> bool {
        self.geom.is_in_plot_region(x, y)
    }

    pub fn has_point(&self, x: i32, y: i32) -> bool {
        self.geom.has_point(x, y)
    }

    // ── Pixel conversion ──

    pub fn to_x(&self, x_pixel: i32) -> f64 {
        if let Some(img) = &self.image {
            if img.is_x_within_range(x_pixel) {
                return img.to_x(x_pixel);
            }
        }
        self.view
            .scale()
            .to_x(self.fix_x(x_pixel), self.geom.x_pixel1, self.left_to_right)
    }

    pub fn to_y(&self, y_pixel: i32) -> f64 {
        self.view.scale().to_y(y_pixel, self.geom.y_pixel0)
    }

    pub fn to_pixel_x(&self, x: f64) -> i32 {
        self.view
            .scale()
            .to_pixel_x(x, self.geom.x_pixel0, self.geom.x_pixel1, self.left_to_right)
    }

    pub fn to_pixel_y(&self, y: f64) -> i32 {
        self.view.scale().to_pixel_y(y, self.geom.y_pixel1)
    }

    /// Full-extent variants, measured against the first view in history.
    pub(crate) fn to_x0(&self, x_pixel: i32) -> f64 {
        self.history.first().scale().to_x0(
            self.fix_x(x_pixel),
            self.geom.x_pixel0,
            self.geom.x_pixel1,
            self.left_to_right,
        )
    }

    pub(crate) fn to_y0(&self, y_pixel: i32) -> f64 {
        self.history
            .first()
            .scale()
            .to_y0(self.fix_y(y_pixel), self.geom.y_pixel0, self.geom.y_pixel1)
    }

    pub(crate) fn to_pixel_x0(&self, x: f64) -> i32 {
        self.history
            .first()
            .scale()
            .to_pixel_x0(x, self.geom.x_pixel0, self.geom.x_pixel1, self.left_to_right)
    }

    pub(crate) fn to_pixel_y0(&self, y: f64) -> i32 {
        let py = self
            .history
            .first()
            .scale()
            .to_pixel_y0(y, self.geom.y_pixel0, self.geom.y_pixel1);
        self.fix_y(py)
    }

    // ── Current view ──

    /// Make spectrum `i`'s scale current and fit it to the frame.
    pub fn set_scale(&mut self, i: usize) {
        let Some(spec) = self.spectra.get(i) else {
            return;
        };
        let inverted = spec.is_inverted();
        self.view.set_scale(i, self.geom.x_pixels, self.geom.y_pixels, inverted);
    }

    pub(crate) fn get_current_view(&mut self) {
        self.set_scale(self.fixed_index());
    }

    /// Vertical scaling of the active spectrum (or the image contrast).
    pub fn scale_y_by(&mut self, f: f64) {
        if self.image.is_none() && !self.settings.enable_zoom {
            return;
        }
        let target = if self.image.is_some() {
            ScaleTarget::Image2D
        } else {
            match self.selection.active_index() {
                Some(i) => ScaleTarget::Spectrum(i),
                None => ScaleTarget::All,
            }
        };
        self.view.scale_spectrum(target, f);
    }

    pub fn scale_selected_by(&mut self, f: f64) {
        let picked: Vec<usize> = self.selection.multi().iter().copied().collect();
        for i in picked {
            self.view.scale_spectrum(ScaleTarget::Spectrum(i), f);
        }
    }

    // ── Zoom ──

    /// Build and install the view for `req`. Silently a no-op when zoom is
    /// disabled or the range keeps fewer than [`MIN_POINTS_FOR_ZOOM`] samples.
    pub fn do_zoom(&mut self, st: &mut InteractionState, req: ZoomRequest) {
        let mut r = req;
        if r.init_x == r.final_x {
            let sd = self.view.scale();
            r.init_x = sd.min_x_on_scale;
            r.final_x = sd.max_x_on_scale;
        } else if self.is_linked && r.check_linked {
            st.request_link(LinkRequest::Zoom {
                init_x: r.init_x,
                final_x: r.final_x,
                is_1d: r.is_1d,
                check_range: r.check_range,
                add_zoom: r.add_zoom,
            });
        }
        if r.init_x > r.final_x {
            std::mem::swap(&mut r.init_x, &mut r.final_x);
        }
        if r.init_y > r.final_y {
            std::mem::swap(&mut r.init_y, &mut r.final_y);
        }
        let is_gray_change = !r.is_1d
            && self
                .image
                .as_ref()
                .is_some_and(|img| img.min_z != r.init_y || img.max_z != r.final_y);
        if !self.settings.enable_zoom && !is_gray_change {
            return;
        }
        if r.check_range {
            let sd = self.view.scale();
            let (init_in, final_in) = (sd.is_in_range_x(r.init_x), sd.is_in_range_x(r.final_x));
            if !init_in && !final_in {
                return;
            }
            if !init_in {
                r.init_x = sd.min_x;
            } else if !final_in {
                r.final_x = sd.max_x;
            }
        }

        let spec0 = &self.spectra[0];
        let current_only = spec0.is_1d() && spec0.has_sub_spectra() && spec0.sub_spectra().len() != 2;
        let range = if current_only {
            let i = self.fixed_index();
            i..i + 1
        } else {
            0..self.spectra.len()
        };
        let traces: Vec<&[Coordinate]> = self.spectra[range.clone()].iter().map(|s| s.xy_coords()).collect();
        let Some((starts, ends)) =
            scale_data::set_data_point_indices(&traces, r.init_x, r.final_x, MIN_POINTS_FOR_ZOOM)
        else {
            log::debug!("zoom to [{}, {}] rejected: too few points", r.init_x, r.final_x);
            return;
        };

        let (mut y1, mut y2) = (r.init_y, r.final_y);
        let x_only = y1 == y2;
        if x_only {
            let sd = self.view.scale();
            let f = if !is_gray_change && r.is_1d { sd.spectrum_scale_factor } else { 1.0 };
            if (f - 1.0).abs() < 0.0001 {
                y1 = sd.min_y_on_scale;
                y2 = sd.max_y_on_scale;
            }
        }
        let y_scales = if x_only || r.is_1d_y {
            self.get_current_view();
            Some(self.view.new_scales(self.selection.active_index(), x_only, y1, y2))
        } else {
            None
        };

        let mut view = ViewData::new(
            &self.spectra[range],
            y1,
            y2,
            &starts,
            &ends,
            self.spectra[0].continuous,
            self.image.is_some(),
        );
        view.scale_data_mut()
            .iter_mut()
            .for_each(|sd| sd.set_x_range(r.init_x, r.final_x));
        view.inherit(self.view.scale_data(), y_scales.as_deref());
        self.view = view;
        self.get_current_view();

        self.hide_pointer_cursor();
        self.set_widget_x(WidgetKind::Pin1Dx0, r.init_x);
        self.set_widget_x(WidgetKind::Pin1Dx1, r.final_x);
        self.set_widget_y(WidgetKind::Pin1Dy0, y1);
        self.set_widget_y(WidgetKind::Pin1Dy1, y2);
        if let Some(img) = self.image.as_mut() {
            if is_gray_change {
                img.set_z_range(r.init_y, r.final_y);
            }
            let sub = self.spectra[0].sub_index().unwrap_or(0);
            let fixed = img.fix_sub_index(sub);
            if fixed != sub {
                self.set_current_sub_spectrum(st, fixed as i32);
            }
        }
        if r.add_zoom {
            self.add_current_zoom();
            log::info!("zoom to [{:.4}, {:.4}] ({} views)", r.init_x, r.final_x, self.history.len());
        }
    }

    /// Push the live view, dropping any views past the cursor.
    pub(crate) fn add_current_zoom(&mut self) {
        self.history.push(self.view.clone());
    }

    pub(crate) fn set_zoom_to(&mut self, i: usize) {
        if let Some(v) = self.history.go_to(i) {
            self.view = v.clone();
            self.reset_pins_from_view();
        }
    }

    /// Zoom to a box; all zeros resets to the full extent.
    pub fn set_zoom(&mut self, st: &mut InteractionState, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.set_zoom_to(0);
        if x1 == 0.0 && x2 == 0.0 && y1 == 0.0 && y2 == 0.0 {
            self.new_pins();
            if let Some(img) = self.image.as_mut() {
                img.reset_view();
            }
        } else {
            self.do_zoom(
                st,
                ZoomRequest {
                    is_1d_y: y1 != y2,
                    ..ZoomRequest::new(x1, y1, x2, y2)
                },
            );
        }
    }

    pub fn next_view(&mut self) {
        if self.history.has_next() {
            self.set_zoom_to(self.history.cursor() + 1);
        }
    }

    pub fn previous_view(&mut self) {
        if self.history.has_previous() {
            self.set_zoom_to(self.history.cursor() - 1);
        }
    }

    pub fn reset_view(&mut self) {
        self.set_zoom_to(0);
    }

    /// Back to the first view, forgetting every other one (and on linked panes).
    pub fn clear_views(&mut self, st: &mut InteractionState) {
        if self.is_linked {
            st.request_link(LinkRequest::ClearViews);
        }
        self.set_zoom(st, 0.0, 0.0, 0.0, 0.0);
        self.history.truncate_to_first();
    }

    pub fn reset_view_completely(&mut self, st: &mut InteractionState) {
        self.clear_views(st);
        self.view.reset_scale_factors();
    }

    // ── Widgets ──

    fn set_widget_x(&mut self, kind: WidgetKind, x: f64) {
        let px = self.to_pixel_x0(x);
        self.widgets[kind].set_x(x, px);
    }

    fn set_widget_y(&mut self, kind: WidgetKind, y: f64) {
        let py = self.to_pixel_y0(y);
        self.widgets[kind].set_y(y, py);
    }

    /// Seed the range pins from the first view.
    pub(crate) fn new_pins(&mut self) {
        if let Some(img) = &self.image {
            let last = img.row_count().saturating_sub(1);
            let (p0, p1) = (img.to_pixel_y0(0), img.to_pixel_y0(last));
            self.widgets[WidgetKind::Pin2Dy0].set_y(0.0, p0);
            self.widgets[WidgetKind::Pin2Dy1].set_y(last as f64, p1);
        }
        let sd = self.history.first().scale().clone();
        self.set_widget_x(WidgetKind::Pin1Dx0, sd.min_x);
        self.set_widget_x(WidgetKind::Pin1Dx1, sd.max_x);
        self.set_widget_y(WidgetKind::Pin1Dy0, sd.min_y);
        self.set_widget_y(WidgetKind::Pin1Dy1, sd.max_y);
        self.pins_ready = true;
    }

    pub(crate) fn reset_pins_from_view(&mut self) {
        if !self.pins_ready {
            return;
        }
        let sd = self.view.scale().clone();
        self.set_widget_x(WidgetKind::Pin1Dx0, sd.min_x_on_scale);
        self.set_widget_x(WidgetKind::Pin1Dx1, sd.max_x_on_scale);
        self.set_widget_y(WidgetKind::Pin1Dy0, sd.min_y_on_scale);
        self.set_widget_y(WidgetKind::Pin1Dy1, sd.max_y_on_scale);
    }

    /// Re-pixel the pins from their values after a resize.
    fn reset_pin_positions(&mut self) {
        for kind in [WidgetKind::Pin1Dx0, WidgetKind::Pin1Dx1] {
            let x = self.widgets[kind].x();
            self.set_widget_x(kind, x);
        }
        for kind in [WidgetKind::Pin1Dy0, WidgetKind::Pin1Dy1] {
            let y = self.widgets[kind].y();
            self.set_widget_y(kind, y);
        }
        if let Some(img) = &self.image {
            for kind in [WidgetKind::Pin2Dy0, WidgetKind::Pin2Dy1] {
                let y = self.widgets[kind].y();
                let py = img.to_pixel_y0(y.max(0.0) as usize);
                self.widgets[kind].set_y(y, py);
            }
        } else {
            for (kind, linked) in [(WidgetKind::Cur1D2x1, self.linked_x), (WidgetKind::Cur1D2x2, self.linked_y)] {
                if linked.is_some() {
                    let x = self.widgets[kind].x();
                    self.set_widget_x(kind, x);
                }
            }
        }
    }

    /// Bring every widget in line with the current view and frame.
    pub(crate) fn set_widgets(&mut self, need_new_pins: bool, draw_1d: bool) {
        if need_new_pins || !self.pins_ready {
            if self.pins_ready {
                self.reset_pin_positions();
            } else {
                self.new_pins();
            }
        }
        self.set_derived_pins();
        self.set_pin_slider_positions(draw_1d);
    }

    fn set_derived_pins(&mut self) {
        for (kind, linked) in [(WidgetKind::Cur1D2x1, self.linked_x), (WidgetKind::Cur1D2x2, self.linked_y)] {
            if linked.is_some() {
                let x = self.widgets[kind].x();
                let px = self.to_pixel_x(x);
                self.widgets[kind].set_x(x, px);
            }
        }
        let g = self.geom;
        let (x0, x1) = (self.widgets[WidgetKind::Pin1Dx0].x_pixel0, self.widgets[WidgetKind::Pin1Dx1].x_pixel0);
        let w = &mut self.widgets[WidgetKind::Pin1Dx01];
        w.set_x(0.0, (x0 + x1) / 2);
        w.is_enabled = x0.min(x1) > g.x_pixel0 || x0.max(x1) < g.x_pixel1;

        let (y0, y1) = (self.widgets[WidgetKind::Pin1Dy0].y_pixel0, self.widgets[WidgetKind::Pin1Dy1].y_pixel0);
        let sd = self.view.scale();
        let (pa, pb) = (self.to_pixel_y(sd.min_y), self.to_pixel_y(sd.max_y));
        let w = &mut self.widgets[WidgetKind::Pin1Dy01];
        w.set_y(0.0, (y0 + y1) / 2);
        w.is_enabled = y0.min(y1) > pa.min(pb) || y0.max(y1) < pa.max(pb);

        let Some(img) = &self.image else {
            return;
        };
        let (vx0, vx1) = (self.widgets[WidgetKind::Pin1Dx0].x(), self.widgets[WidgetKind::Pin1Dx1].x());
        let (c0, c1) = (img.to_pixel_x(vx0), img.to_pixel_x(vx1));
        let (ix0, ix1) = (img.to_x(img.x_pixel0), img.to_x(img.x_pixel1));
        let (px0, px1) = (img.to_pixel_x0(ix0), img.to_pixel_x0(ix1));
        let (lo, hi) = img.visible_rows();
        let (py0, py1) = (img.to_pixel_y0(lo), img.to_pixel_y0(hi));
        let sub = self.spectra[0].sub_index().unwrap_or(0);
        let cur_y = img.sub_index_to_pixel_y(sub);
        let (img_x0, img_x1) = (img.x_pixel0, img.x_pixel1);

        self.widgets[WidgetKind::Cur2Dx0].set_x(vx0, c0);
        self.widgets[WidgetKind::Cur2Dx1].set_x(vx1, c1);
        self.widgets[WidgetKind::Pin2Dx0].set_x(ix0, px0);
        self.widgets[WidgetKind::Pin2Dx1].set_x(ix1, px1);
        let w = &mut self.widgets[WidgetKind::Pin2Dx01];
        w.set_x(0.0, (px0 + px1) / 2);
        w.is_enabled = px0.min(px1) != img_x0 || px0.max(px1) != img_x1;
        self.widgets[WidgetKind::Pin2Dy0].set_y(lo as f64, py0);
        self.widgets[WidgetKind::Pin2Dy1].set_y(hi as f64, py1);
        let w = &mut self.widgets[WidgetKind::Pin2Dy01];
        w.set_y(0.0, (py0 + py1) / 2);
        w.is_enabled = py0.min(py1) != g.y_pixel0 || py0.max(py1) != g.y_pixel1;
        let w = &mut self.widgets[WidgetKind::Cur2Dy];
        w.value.y = sub as f64;
        w.y_pixel0 = cur_y;
        w.y_pixel1 = cur_y;
    }

    fn set_pin_slider_positions(&mut self, draw_1d: bool) {
        let g = self.geom;
        let ws = &mut self.widgets;
        for k in [WidgetKind::Pin1Dx0, WidgetKind::Pin1Dx1, WidgetKind::Pin1Dx01] {
            ws[k].y_pixel0 = g.y_pixel0 - 5;
            ws[k].y_pixel1 = g.y_pixel0;
        }
        for k in [WidgetKind::Cur1D2x1, WidgetKind::Cur1D2x2] {
            ws[k].y_pixel0 = g.y_pixel1 + 6;
            ws[k].y_pixel1 = g.y_pixel0 - 5;
        }
        let Some(img) = &self.image else {
            for k in [WidgetKind::Pin1Dy0, WidgetKind::Pin1Dy1, WidgetKind::Pin1Dy01] {
                ws[k].x_pixel0 = g.x_pixel1 + 5;
                ws[k].x_pixel1 = g.x_pixel1;
            }
            return;
        };
        for k in [WidgetKind::Pin1Dy0, WidgetKind::Pin1Dy1, WidgetKind::Pin1Dy01] {
            ws[k].x_pixel0 = img.x_pixel1 + 15;
            ws[k].x_pixel1 = img.x_pixel1 + 10;
        }
        for k in [WidgetKind::Pin2Dx0, WidgetKind::Pin2Dx1, WidgetKind::Pin2Dx01] {
            ws[k].y_pixel0 = g.y_pixel0 - 5;
            ws[k].y_pixel1 = g.y_pixel0;
        }
        for k in [WidgetKind::Pin2Dy0, WidgetKind::Pin2Dy1, WidgetKind::Pin2Dy01] {
            ws[k].x_pixel0 = img.x_pixel1 + 5;
            ws[k].x_pixel1 = img.x_pixel1;
        }
        for k in [WidgetKind::Cur2Dx0, WidgetKind::Cur2Dx1] {
            ws[k].y_pixel0 = g.y_pixel1 + 6;
            ws[k].y_pixel1 = g.y_pixel0 - 5;
        }
        let cur = &mut ws[WidgetKind::Cur2Dy];
        cur.x_pixel0 = if draw_1d { (g.x_pixel1 + img.x_pixel0) / 2 } else { img.x_pixel0 - 6 };
        cur.x_pixel1 = img.x_pixel1 + 5;
    }

    /// Raise an edit request for `kind`, pre-filled with its current value.
    pub fn request_widget_edit(&self, st: &mut InteractionState, kind: WidgetKind) {
        let current = self.widget_text(kind);
        st.notify(PanelNotice::EditWidget { widget: kind, current });
    }

    /// Current value of a widget as the user would edit it.
    pub fn widget_text(&self, kind: WidgetKind) -> String {
        let w = &self.widgets;
        let range = |a: f64, b: f64| format!("{} - {}", a.min(b), a.max(b));
        match kind {
            WidgetKind::Cur2Dy => match &self.image {
                Some(img) => img.to_subspectrum_index(w[kind].y_pixel0).to_string(),
                None => String::new(),
            },
            WidgetKind::Pin1Dx01 => range(w[WidgetKind::Pin1Dx0].x(), w[WidgetKind::Pin1Dx1].x()),
            WidgetKind::Pin1Dy01 => range(w[WidgetKind::Pin1Dy0].y(), w[WidgetKind::Pin1Dy1].y()),
            WidgetKind::Pin2Dx01 => range(w[WidgetKind::Pin2Dx0].x(), w[WidgetKind::Pin2Dx1].x()),
            WidgetKind::Pin2Dy01 => {
                let (a, b) = (w[WidgetKind::Pin2Dy0].y() as i64, w[WidgetKind::Pin2Dy1].y() as i64);
                format!("{} - {}", a.min(b), a.max(b))
            }
            _ => w[kind].edit_value().to_string(),
        }
    }

    /// Apply a user-typed value to a widget. Nothing changes on error.
    pub fn set_widget_value(&mut self, st: &mut InteractionState, kind: WidgetKind, text: &str) -> Result<()> {
        if !kind.is_pin_or_cursor() || (kind.is_2d() && self.image.is_none()) {
            return Err(PlotError::WidgetNotEditable(kind.name().to_string()));
        }
        let text = text.trim();
        let no_image = self.image.is_none();
        let w = |k: WidgetKind| self.widgets[k].clone();
        if kind.is_centre() {
            let pt = text
                .get(1..)
                .and_then(|s| s.find('-'))
                .map(|p| p + 1)
                .ok_or_else(|| PlotError::InvalidRange(text.to_string()))?;
            let v1 = parse_number(&text[..pt])?;
            let v2 = parse_number(&text[pt + 1..])?;
            let (pin_x0, pin_x1, pin_y0, pin_y1) =
                (w(WidgetKind::Pin1Dx0), w(WidgetKind::Pin1Dx1), w(WidgetKind::Pin1Dy0), w(WidgetKind::Pin1Dy1));
            match kind {
                WidgetKind::Pin1Dx01 => self.do_zoom(st, ZoomRequest::new(v1, pin_y0.y(), v2, pin_y1.y())),
                WidgetKind::Pin1Dy01 => self.do_zoom(
                    st,
                    ZoomRequest {
                        is_1d: no_image,
                        is_1d_y: no_image,
                        check_linked: false,
                        ..ZoomRequest::new(pin_x0.x(), v1, pin_x1.x(), v2)
                    },
                ),
                WidgetKind::Pin2Dx01 => {
                    let (y0, y1) = (w(WidgetKind::Pin2Dy0).y_pixel0, w(WidgetKind::Pin2Dy1).y_pixel0);
                    if let Some(img) = self.image.as_mut() {
                        let (p1, p2) = (img.to_pixel_x0(v1), img.to_pixel_x0(v2));
                        img.set_view0(p1, y0, p2, y1);
                    }
                    self.do_zoom(
                        st,
                        ZoomRequest {
                            is_1d: false,
                            ..ZoomRequest::new(v1, pin_y0.y(), v2, pin_y1.y())
                        },
                    );
                }
                _ => {
                    let (x0, x1) = (w(WidgetKind::Pin2Dx0).x_pixel0, w(WidgetKind::Pin2Dx1).x_pixel0);
                    self.zoom_image_rows(st, x0, v1, x1, v2);
                }
            }
            return Ok(());
        }

        let val = parse_number(text)?;
        match kind {
            WidgetKind::Cur2Dy => {
                self.set_current_sub_spectrum(st, val as i32);
            }
            WidgetKind::Pin2Dy0 | WidgetKind::Pin2Dy1 => {
                let other = if kind == WidgetKind::Pin2Dy0 { WidgetKind::Pin2Dy1 } else { WidgetKind::Pin2Dy0 };
                let (x0, x1) = (w(WidgetKind::Pin2Dx0).x_pixel0, w(WidgetKind::Pin2Dx1).x_pixel0);
                let other_y = w(other).y();
                self.zoom_image_rows(st, x0, val, x1, other_y);
            }
            k if k.is_x_type() => {
                let uses_x1 = matches!(k, WidgetKind::Pin1Dx0 | WidgetKind::Cur2Dx0 | WidgetKind::Pin2Dx0);
                let val2 = if uses_x1 { w(WidgetKind::Pin1Dx1).x() } else { w(WidgetKind::Pin1Dx0).x() };
                self.do_zoom(
                    st,
                    ZoomRequest {
                        is_1d: !k.is_2d(),
                        ..ZoomRequest::new(val, 0.0, val2, 0.0)
                    },
                );
            }
            _ => {
                let other = if kind == WidgetKind::Pin1Dy0 { WidgetKind::Pin1Dy1 } else { WidgetKind::Pin1Dy0 };
                let val2 = w(other).y();
                let (x0, x1) = (w(WidgetKind::Pin1Dx0).x(), w(WidgetKind::Pin1Dx1).x());
                self.do_zoom(
                    st,
                    ZoomRequest {
                        is_1d: no_image,
                        is_1d_y: no_image,
                        check_linked: false,
                        ..ZoomRequest::new(x0, val, x1, val2)
                    },
                );
            }
        }
        Ok(())
    }

    /// Narrow the image to rows `r0..=r1` between full-extent columns `x0, x1`.
    fn zoom_image_rows(&mut self, st: &mut InteractionState, x0: i32, r0: f64, x1: i32, r1: f64) {
        let Some(img) = self.image.as_mut() else {
            return;
        };
        let (p0, p1) = (img.to_pixel_y0(r0.max(0.0) as usize), img.to_pixel_y0(r1.max(0.0) as usize));
        img.set_view0(x0, p0, x1, p1);
        let (xa, xb) = (img.to_x(img.x_pixel0), img.to_x(img.x_pixel0 + img.x_pixels - 1));
        let (za, zb) = (img.min_z, img.max_z);
        self.do_zoom(
            st,
            ZoomRequest {
                is_1d: false,
                check_linked: false,
                ..ZoomRequest::new(xa, za, xb, zb)
            },
        );
    }

    // ── Selection ──

    /// Record a click on spectrum `i` (or clear it with `None`).
    pub fn set_spectrum_clicked(&mut self, i: Option<usize>) {
        let i = i.filter(|&i| i < self.spectra.len());
        if self.selection.set_clicked(i, self.show_all_stacked) {
            self.get_current_view();
        }
    }

    pub(crate) fn set_spectrum_hover(&mut self, i: Option<usize>) {
        self.selection.set_hover(i.filter(|&i| i < self.spectra.len()));
    }

    /// Select spectrum `i` alone (`None` selects all).
    pub fn set_selected(&mut self, st: &mut InteractionState, i: Option<usize>) {
        let single = self.selection.set_multi(i, self.spectra.len());
        self.set_spectrum_clicked(single);
        if self.n_split > 1 {
            if let Some(i) = i {
                st.current_split_point = i;
            }
        }
    }

    /// Select the spectrum loaded from `path`. A group that does not hold
    /// it, is not current and has a selection draws nothing at all.
    pub fn select_spectrum(&mut self, st: &mut InteractionState, path: &Path, is_current: bool) -> bool {
        match self.spectra.iter().position(|s| s.source_path == path) {
            Some(i) => {
                self.set_selected(st, Some(i));
                if self.n_split > 1 {
                    self.split_stack(st, true);
                }
                true
            }
            None => {
                if self.spectra.len() > 1 && self.selection.active_index().is_some() && !is_current {
                    self.selection.set_active(Active::NoPlot);
                }
                false
            }
        }
    }

    /// Whether spectrum `i` is drawn in split frame `i_split`.
    pub(crate) fn do_plot(&self, i: usize, i_split: usize) -> bool {
        if self.n_split > 1 {
            return i == i_split;
        }
        match self.selection.active() {
            Active::NoPlot => false,
            Active::All => true,
            Active::Spectrum(s) => self.show_all_stacked || s == i,
        }
    }

    /// Toggle between split frames and a single (stacked) frame.
    pub fn split_stack(&mut self, st: &mut InteractionState, do_split: bool) {
        let selected = self.selection.active_index();
        if do_split && self.is_splittable {
            self.n_split = self.spectra.len();
            self.show_all_stacked = false;
            self.set_spectrum_clicked(selected);
            st.current_split_point = selected.unwrap_or(0);
        } else {
            self.n_split = 1;
            self.show_all_stacked = self.allow_stacking && !do_split;
            self.set_spectrum_clicked(selected);
        }
        self.selection.stack_selected = false;
        self.layout_dirty = true;
        log::info!(
            "pane group {} ({} frames)",
            if self.n_split > 1 { "split" } else { "stacked" },
            self.n_split
        );
    }

    // ── Sub-spectra ──

    pub fn set_current_sub_spectrum(&mut self, st: &mut InteractionState, i: i32) {
        if !self.spectra[0].has_sub_spectra() {
            st.notify(PanelNotice::NoSubSpectra);
            return;
        }
        let idx = self.spectra[0].set_current_sub_spectrum(i);
        self.after_sub_spectrum_change(st, idx);
    }

    pub fn advance_sub_spectrum(&mut self, st: &mut InteractionState, dir: i32) {
        if !self.spectra[0].has_sub_spectra() {
            st.notify(PanelNotice::NoSubSpectra);
            return;
        }
        let idx = self.spectra[0].advance_sub_spectrum(dir);
        self.after_sub_spectrum_change(st, idx);
    }

    fn after_sub_spectrum_change(&mut self, st: &mut InteractionState, index: usize) {
        let spec0 = &self.spectra[0];
        if spec0.is_1d() {
            self.view.set_x_range_for_sub_spectrum(spec0.xy_coords());
        }
        let y_2d = spec0.current_sub_spectrum().map(|s| s.y_2d).unwrap_or(f64::NAN);
        st.notify(PanelNotice::SubSpectrumChanged { index, y_2d });
    }

    // ── Highlights ──

    pub fn add_highlight(&mut self, x1: f64, x2: f64, spectrum: Option<usize>, color: Option<Rgba>) {
        let color = color.unwrap_or(self.settings.palette.highlight);
        self.highlights.add(x1, x2, spectrum, color);
    }

    pub fn remove_highlight(&mut self, index: usize) {
        self.highlights.remove_at(index);
    }

    pub fn remove_highlight_range(&mut self, x1: f64, x2: f64) {
        self.highlights.remove_range(x1, x2);
    }

    pub fn remove_all_highlights(&mut self) {
        self.highlights.clear();
    }

    // ── Clicks and calibration ──

    /// Remember a click in data space; `NaN` clears it.
    pub(crate) fn set_coord_clicked(&mut self, st: &mut InteractionState, x_pixel: i32, x: f64, y: f64) -> Option<Coordinate> {
        if y == 0.0 {
            self.next_click_shift = None;
        }
        if x.is_nan() {
            st.coord_clicked = None;
            return None;
        }
        self.selection.last_click_x = x;
        self.selection.last_pixel_x = x_pixel;
        st.coord_clicked = Some(Coordinate::new(x, y));
        st.x_pixel_clicked = x_pixel;
        st.coord_clicked
    }

    /// Park the pointer cursor off the plot until the pointer moves again.
    fn hide_pointer_cursor(&mut self) {
        self.x_pixel_moved_to = -1;
        self.x_pixel_moved_to2 = -1;
    }

    /// Track the pointer's data x.
    pub(crate) fn set_x_pixel_moved_to(
        &mut self,
        st: &mut InteractionState,
        x1: Option<f64>,
        x2: Option<f64>,
        x_pixel1: i32,
        x_pixel2: i32,
    ) {
        if x1.is_none() && x2.is_none() {
            self.x_pixel_moved_to = x_pixel1;
            self.x_pixel_moved_to2 = x_pixel2;
            if self.is_linked && self.sticky_2d {
                st.request_link(LinkRequest::XMove { x: self.to_x(x_pixel1) });
            }
            return;
        }
        if let Some(x1) = x1 {
            let px = self.to_pixel_x(x1);
            self.x_pixel_moved_to = if self.fix_x(px) == px { px } else { -1 };
            self.x_pixel_moved_to2 = -1;
            self.set_spectrum_clicked(Some(self.fixed_index()));
        }
        if let Some(x2) = x2 {
            self.x_pixel_moved_to2 = self.to_pixel_x(x2);
        }
    }

    /// Step to the next listed peak from the last click.
    pub fn to_peak(&mut self, st: &mut InteractionState, step: i32) {
        let step = if self.left_to_right { step } else { -step };
        if self.selection.last_click_x.is_nan() {
            self.selection.last_click_x = 0.0;
            self.selection.last_pixel_x = 0;
        }
        let (px, x) = (self.selection.last_pixel_x, self.selection.last_click_x);
        self.set_coord_clicked(st, px, x, 0.0);
        let fi = self.fixed_index();
        let Some(ip) = self.spectra[fi].set_next_peak(x, step) else {
            return;
        };
        self.spectra[fi].selected_peak = Some(ip);
        let peak = self.spectra[fi].peaks[ip].clone();
        let coord = self.set_coord_clicked(st, self.to_pixel_x(peak.x), peak.x, 0.0);
        st.notify(PanelNotice::PeakPicked { coord, peak: Some(peak) });
    }

    /// Calibrate the active 1D NMR spectrum along x. Destructive: samples,
    /// peaks, annotations and highlights all move. Returns false when
    /// nothing moved or the shift was only armed for the next click.
    pub fn shift_spectrum(&mut self, st: &mut InteractionState, mode: ShiftMode, x_old: f64, x_new: f64) -> bool {
        let fi = self.fixed_index();
        let spec = &self.spectra[fi];
        if !spec.is_nmr() || !spec.is_1d() {
            return false;
        }
        let dx = match mode {
            ShiftMode::Reset => -spec.spec_shift(),
            ShiftMode::X => x_new,
            ShiftMode::Peak | ShiftMode::SetX if x_old.is_nan() => {
                self.next_click_mode = mode;
                self.next_click_shift = Some(x_new);
                log::debug!("calibration armed for the next click");
                return false;
            }
            ShiftMode::Peak | ShiftMode::SetX | ShiftMode::Clicked => {
                let mut x_new = x_new;
                let mut x_old = x_old;
                if mode != ShiftMode::Clicked {
                    self.next_click_mode = mode;
                    self.next_click_shift = None;
                }
                if let Some(armed) = self.next_click_shift.take() {
                    x_new = armed;
                }
                if x_old.is_nan() {
                    x_old = self.selection.last_click_x;
                }
                if self.next_click_mode == ShiftMode::Peak {
                    x_old = spec.nearest_peak(x_old, self.to_y(st.mouse_y));
                }
                if x_new.is_nan() || x_old.is_nan() {
                    log::debug!("calibration ignored: no target shift");
                    return false;
                }
                x_new - x_old
            }
        };
        if dx == 0.0 || dx.is_nan() {
            return false;
        }
        let total = self.spectra[fi].add_spec_shift(dx);
        self.store.shift_x(fi, dx);
        self.highlights.shift_x(fi, dx);
        self.view.scale_mut().add_spec_shift(dx);
        if !self.selection.last_click_x.is_nan() {
            self.selection.last_click_x += dx;
        }
        log::info!("calibration shift {:+.4} (total {:+.4})", dx, total);
        let sd = self.view.scale();
        let (y0, y1) = (sd.min_y_on_scale, sd.max_y_on_scale);
        self.do_zoom(
            st,
            ZoomRequest {
                is_1d_y: true,
                add_zoom: false,
                ..ZoomRequest::new(0.0, y0, 0.0, y1)
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationType};
    use crate::data::PeakInfo;
    use crate::graph::test_support::{proton, sized, uv_vis};

    #[test]
    fn test_new_group_defaults() {
        let gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0]), proton("c", &[4.0])]);
        assert!(gs.show_all_stacked());
        assert_eq!(gs.n_split(), 1);
        assert_eq!(gs.history().len(), 1);
        assert!(!gs.left_to_right);
        assert!(gs.allow_stacked_y_scale);
        assert!(GraphSet::new(Vec::new(), &PlotSettings::default()).is_none());
    }

    #[test]
    fn test_split_stack_toggle() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0]), proton("c", &[4.0])]);
        gs.split_stack(&mut st, true);
        assert_eq!(gs.n_split(), 3);
        assert!(!gs.show_all_stacked());
        assert!(gs.layout_dirty);
        gs.split_stack(&mut st, false);
        assert_eq!(gs.n_split(), 1);
        assert!(gs.show_all_stacked());
    }

    #[test]
    fn test_zoom_history_round_trip() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0, 5.0])]);
        gs.do_zoom(&mut st, ZoomRequest::new(2.0, 0.0, 8.0, 0.0));
        let z1 = gs.view().clone();
        gs.do_zoom(&mut st, ZoomRequest::new(3.0, 0.0, 7.0, 0.0));
        gs.do_zoom(&mut st, ZoomRequest::new(4.0, 0.0, 6.0, 0.0));
        assert_eq!(gs.history().len(), 4);
        assert_eq!(gs.view().scale().min_x, 4.0);

        gs.previous_view();
        gs.previous_view();
        assert_eq!(gs.view(), &z1);
        assert_eq!(gs.view().scale().min_x, 2.0);

        gs.do_zoom(&mut st, ZoomRequest::new(2.5, 0.0, 3.5, 0.0));
        assert_eq!(gs.history().len(), 3);
        assert!(!gs.history().has_next());
        gs.next_view();
        assert_eq!(gs.history().cursor(), 2);
    }

    #[test]
    fn test_increasing_x_zoom_and_history() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![uv_vis("uv")]);
        assert!(gs.left_to_right);
        gs.do_zoom(&mut st, ZoomRequest::new(300.0, 0.0, 400.0, 0.0));
        assert_eq!(gs.history().len(), 2);
        assert_eq!(gs.x_pixel_moved_to, -1);
        let sd = gs.view().scale();
        assert!((sd.min_x - 300.0).abs() < 1e-9);
        assert!((sd.max_x - 400.0).abs() < 1e-9);
        assert!(gs.to_pixel_x(320.0) < gs.to_pixel_x(380.0));

        gs.do_zoom(&mut st, ZoomRequest::new(340.0, 0.0, 360.0, 0.0));
        gs.previous_view();
        assert!((gs.view().scale().max_x - 400.0).abs() < 1e-9);
        gs.previous_view();
        assert!((gs.view().scale().min_x - 200.0).abs() < 1e-9);
        gs.next_view();
        assert_eq!(gs.history().cursor(), 1);
    }

    #[test]
    fn test_increasing_x_pixel_edges() {
        let gs = sized(vec![uv_vis("uv")]);
        let g = *gs.geometry();
        let sd = gs.view().scale().clone();
        let res = (sd.max_x_on_scale - sd.min_x_on_scale) / (g.x_pixel1 - g.x_pixel0) as f64;
        assert!((gs.to_x(g.x_pixel0) - sd.min_x_on_scale).abs() <= res);
        assert!((gs.to_x(g.x_pixel1) - sd.max_x_on_scale).abs() <= res);
        assert!((gs.to_pixel_x(sd.min_x_on_scale) - g.x_pixel0).abs() <= 1);
        assert!((gs.to_pixel_x(sd.max_x_on_scale) - g.x_pixel1).abs() <= 1);
        for px in [g.x_pixel0, g.x_pixel0 + 1, g.x_pixel1 - 1, g.x_pixel1] {
            assert!((gs.to_pixel_x(gs.to_x(px)) - px).abs() <= 1, "pixel {}", px);
        }
        assert!(gs.to_pixel_x(1e10) > g.x_pixel1);
        assert!(gs.to_pixel_x(-1e10) < g.x_pixel0);
    }

    #[test]
    fn test_zoom_with_too_few_points_is_rejected() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let before = gs.view().clone();
        gs.do_zoom(&mut st, ZoomRequest::new(5.001, 0.0, 5.009, 0.0));
        assert_eq!(gs.view(), &before);
        assert_eq!(gs.history().len(), 1);
    }

    #[test]
    fn test_zoom_disabled_is_ignored() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        gs.settings_mut().enable_zoom = false;
        gs.do_zoom(&mut st, ZoomRequest::new(2.0, 0.0, 8.0, 0.0));
        assert_eq!(gs.history().len(), 1);
    }

    #[test]
    fn test_clear_views_keeps_first() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        gs.do_zoom(&mut st, ZoomRequest::new(2.0, 0.0, 8.0, 0.0));
        gs.do_zoom(&mut st, ZoomRequest::new(3.0, 0.0, 7.0, 0.0));
        gs.view.scale_spectrum(ScaleTarget::All, 2.0);
        gs.reset_view_completely(&mut st);
        assert_eq!(gs.history().len(), 1);
        assert_eq!(gs.history().cursor(), 0);
        assert_eq!(gs.view().scale().spectrum_scale_factor, 1.0);
    }

    #[test]
    fn test_widget_value_edits() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        let before = gs.view().clone();
        assert!(matches!(
            gs.set_widget_value(&mut st, WidgetKind::Pin1Dx0, "abc"),
            Err(PlotError::InvalidNumber(_))
        ));
        assert!(gs.set_widget_value(&mut st, WidgetKind::Pin1Dx01, "12").is_err());
        assert!(matches!(
            gs.set_widget_value(&mut st, WidgetKind::ZoomBox1D, "1"),
            Err(PlotError::WidgetNotEditable(_))
        ));
        assert!(gs.set_widget_value(&mut st, WidgetKind::Pin2Dx0, "1").is_err());
        assert_eq!(gs.view(), &before);

        gs.set_widget_value(&mut st, WidgetKind::Pin1Dx01, "3 - 6").unwrap();
        assert_eq!(gs.view().scale().min_x, 3.0);
        assert_eq!(gs.view().scale().max_x, 6.0);
        assert_eq!(gs.widget_text(WidgetKind::Pin1Dx01), "3 - 6");
    }

    #[test]
    fn test_edit_request_carries_current_value() {
        let mut st = InteractionState::new();
        let gs = sized(vec![proton("a", &[2.0])]);
        gs.request_widget_edit(&mut st, WidgetKind::Pin1Dx0);
        match st.take_notices().as_slice() {
            [PanelNotice::EditWidget { widget, current }] => {
                assert_eq!(*widget, WidgetKind::Pin1Dx0);
                assert_eq!(current.parse::<f64>().ok(), Some(0.0));
            }
            other => panic!("unexpected notices {:?}", other),
        }
    }

    #[test]
    fn test_shift_spectrum_moves_everything() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        gs.store_mut().add(0, Annotation::Measurement(Span::new(2.0, 0.5)));
        gs.add_highlight(1.0, 1.5, Some(0), None);
        assert!(gs.shift_spectrum(&mut st, ShiftMode::X, f64::NAN, 0.5));
        assert_eq!(gs.spectrum().spec_shift(), 0.5);
        assert_eq!(gs.store().list(0, AnnotationType::Measurements)[0].span().x1, 2.5);
        assert_eq!(gs.highlights().iter().next().map(|h| h.x1), Some(1.5));
        assert_eq!(gs.history().len(), 1);

        assert!(gs.shift_spectrum(&mut st, ShiftMode::Reset, f64::NAN, f64::NAN));
        assert_eq!(gs.spectrum().spec_shift(), 0.0);
        assert!(!gs.shift_spectrum(&mut st, ShiftMode::X, f64::NAN, 0.0));
    }

    #[test]
    fn test_shift_armed_then_clicked() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        assert!(!gs.shift_spectrum(&mut st, ShiftMode::SetX, f64::NAN, 2.5));
        assert_eq!(gs.next_click_shift, Some(2.5));
        gs.selection.last_click_x = 2.0;
        assert!(gs.shift_spectrum(&mut st, ShiftMode::Clicked, f64::NAN, f64::NAN));
        assert!((gs.spectrum().spec_shift() - 0.5).abs() < 1e-12);
        assert!(gs.next_click_shift.is_none());
    }

    #[test]
    fn test_shift_needs_1d_nmr() {
        let mut st = InteractionState::new();
        let ir = Spectrum::new_1d("ir", "INFRARED SPECTRUM", "1/CM", "ABSORBANCE", proton("x", &[1.0]).xy_coords().to_vec());
        let mut gs = sized(vec![ir]);
        assert!(!gs.shift_spectrum(&mut st, ShiftMode::X, f64::NAN, 1.0));
    }

    #[test]
    fn test_to_peak_walks_list() {
        let mut st = InteractionState::new();
        let spec = proton("a", &[2.0, 5.0]).with_peaks(vec![PeakInfo::new(2.0, 0.05, "p1"), PeakInfo::new(5.0, 0.05, "p2")]);
        let mut gs = sized(vec![spec]);
        gs.to_peak(&mut st, -1);
        assert_eq!(gs.spectrum().selected_peak, Some(0));
        assert_eq!(st.coord_clicked.map(|c| c.x), Some(2.0));
        gs.to_peak(&mut st, -1);
        assert_eq!(gs.spectrum().selected_peak, Some(1));
        assert!(st
            .take_notices()
            .iter()
            .all(|n| matches!(n, PanelNotice::PeakPicked { peak: Some(_), .. })));
    }

    #[test]
    fn test_select_spectrum_and_no_plot() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        assert!(gs.has_file_loaded(Path::new("/data/b.jdx")));
        assert!(gs.select_spectrum(&mut st, Path::new("/data/b.jdx"), true));
        assert_eq!(gs.selection().active_index(), Some(1));
        assert!(!gs.select_spectrum(&mut st, Path::new("/data/zz.jdx"), false));
        assert!(gs.selection().is_no_plot());
        assert!(!gs.do_plot(0, 0));
    }

    #[test]
    fn test_set_selected_single_sets_clicked() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        gs.set_selected(&mut st, Some(1));
        assert_eq!(gs.selection().clicked(), Some(1));
        gs.set_selected(&mut st, None);
        assert_eq!(gs.selection().clicked(), None);
        assert_eq!(gs.selection().multi().len(), 2);
    }

    #[test]
    fn test_scale_y_by_targets_active() {
        let mut gs = sized(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        gs.set_spectrum_clicked(Some(1));
        gs.scale_y_by(2.0);
        assert_eq!(gs.view().scale_at(1).spectrum_scale_factor, 2.0);
        assert_eq!(gs.view().scale_at(0).spectrum_scale_factor, 1.0);
        gs.scale_selected_by(2.0);
        assert_eq!(gs.view().scale_at(0).spectrum_scale_factor, 2.0);
    }

    #[test]
    fn test_pins_follow_zoom() {
        let mut st = InteractionState::new();
        let mut gs = sized(vec![proton("a", &[2.0])]);
        gs.do_zoom(&mut st, ZoomRequest::new(2.0, 0.0, 8.0, 0.0));
        gs.set_widgets(false, true);
        let w = gs.widgets();
        assert_eq!(w[WidgetKind::Pin1Dx0].x(), 2.0);
        assert_eq!(w[WidgetKind::Pin1Dx1].x(), 8.0);
        assert!(w[WidgetKind::Pin1Dx01].is_enabled);
        let mid = (w[WidgetKind::Pin1Dx0].x_pixel0 + w[WidgetKind::Pin1Dx1].x_pixel0) / 2;
        assert_eq!(w[WidgetKind::Pin1Dx01].x_pixel0, mid);
        assert_eq!(w[WidgetKind::Pin1Dx0].y_pixel0, gs.geometry().y_pixel0 - 5);
    }

    #[test]
    fn test_sub_spectrum_notices() {
        use crate::data::SubSpectrum;
        let mut st = InteractionState::new();
        let base = proton("a", &[2.0]);
        let rows = (0..3)
            .map(|k| SubSpectrum {
                coords: base.xy_coords().to_vec(),
                y_2d: k as f64 * 10.0,
            })
            .collect();
        let mut gs = sized(vec![base.with_sub_spectra(rows)]);
        gs.advance_sub_spectrum(&mut st, 1);
        gs.advance_sub_spectrum(&mut st, 5);
        assert_eq!(
            st.take_notices(),
            vec![
                PanelNotice::SubSpectrumChanged { index: 1, y_2d: 10.0 },
                PanelNotice::SubSpectrumChanged { index: 2, y_2d: 20.0 },
            ]
        );
        let mut plain = sized(vec![proton("b", &[1.0])]);
        plain.advance_sub_spectrum(&mut st, 1);
        assert_eq!(st.take_notices(), vec![PanelNotice::NoSubSpectra]);
    }
}
