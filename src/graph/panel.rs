/// The canvas owner: pane groups, event routing, linking and keys
///
/// A `Panel` holds every [`GraphSet`] on one canvas. It decides which group
/// a pointer event belongs to, keeps track of the current group and split
/// frame, mirrors zooms and cursors onto linked groups, and records the
/// view operations of the session in a [`ViewLog`].

use super::graph_set::{GraphSet, ShiftMode, ZoomRequest, RT2};
use super::interaction::{InteractionState, LinkRequest, PanelNotice};
use super::layout::{fractional_positions, GroupShape, LinkMode};
use super::widget::WidgetKind;
use crate::config::PlotSettings;
use crate::data::spectrum::are_x_scales_compatible;
use crate::data::Spectrum;
use crate::error::Result;
use crate::log::ViewLog;
use crate::render::{DrawingSurface, TextAlign};
use std::path::Path;

/// Keys the panel reacts to. Modifiers are passed alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKey {
    Escape,
    Delete,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Plus,
    Minus,
    Z,
    Y,
}

/// What a group's history, split and calibration looked like before an
/// event, so the panel can tell what the event changed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewStamp {
    views: usize,
    cursor: usize,
    n_split: usize,
    shift: f64,
}

impl ViewStamp {
    fn of(gs: &GraphSet) -> Self {
        Self {
            views: gs.history().len(),
            cursor: gs.history().cursor(),
            n_split: gs.n_split,
            shift: gs.spectrum().spec_shift(),
        }
    }
}

/// Group spectra for display. Unlinked, x-compatible 1D spectra share a
/// group; linked spectra each get their own.
fn group_spectra(spectra: Vec<Spectrum>, mode: LinkMode) -> Vec<Vec<Spectrum>> {
    let mut groups: Vec<Vec<Spectrum>> = Vec::new();
    for spec in spectra {
        let slot = if mode == LinkMode::None {
            groups
                .iter()
                .position(|g| are_x_scales_compatible(&spec, &g[0], false, false))
        } else {
            None
        };
        match slot {
            Some(i) => groups[i].push(spec),
            None => groups.push(vec![spec]),
        }
    }
    groups
}

pub struct Panel {
    groups: Vec<GraphSet>,
    current: usize,
    st: InteractionState,
    settings: PlotSettings,
    link_mode: LinkMode,
    view_log: ViewLog,
    width: i32,
    height: i32,
    need_new_pins: bool,
}

impl Panel {
    pub fn new(spectra: Vec<Spectrum>, settings: PlotSettings) -> Self {
        let mut panel = Self {
            groups: Vec::new(),
            current: 0,
            st: InteractionState::new(),
            settings,
            link_mode: LinkMode::None,
            view_log: ViewLog::new(),
            width: 0,
            height: 0,
            need_new_pins: true,
        };
        panel.rebuild(spectra);
        panel
    }

    // ── Accessors ──

    pub fn groups(&self) -> &[GraphSet] {
        &self.groups
    }

    pub fn n_spectra(&self) -> usize {
        self.groups.iter().map(GraphSet::n_spectra).sum()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_graph_set(&self) -> Option<&GraphSet> {
        self.groups.get(self.current)
    }

    pub fn current_graph_set_mut(&mut self) -> Option<&mut GraphSet> {
        self.groups.get_mut(self.current)
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.st
    }

    pub fn link_mode(&self) -> LinkMode {
        self.link_mode
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn view_log(&self) -> &ViewLog {
        &self.view_log
    }

    pub fn take_notices(&mut self) -> Vec<PanelNotice> {
        self.st.take_notices()
    }

    pub fn set_modifiers(&mut self, ctrl: bool, shift: bool) {
        self.st.ctrl_pressed = ctrl;
        self.st.shift_pressed = shift;
    }

    // ── Layout ──

    /// Resize the canvas; a no-op when the size is unchanged.
    pub fn set_size(&mut self, width: i32, height: i32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.need_new_pins = true;
        self.layout();
    }

    /// Install new settings on the panel and every group.
    pub fn set_settings(&mut self, settings: PlotSettings) {
        for gs in &mut self.groups {
            gs.set_settings(&settings);
        }
        self.settings = settings;
        self.need_new_pins = true;
        self.layout();
    }

    /// Place every group on the canvas and wire up linked targets.
    fn layout(&mut self) {
        let shapes: Vec<GroupShape<'_>> = self
            .groups
            .iter()
            .map(|g| GroupShape {
                first: &g.spectra()[0],
                n_split: g.n_split,
            })
            .collect();
        let layout = fractional_positions(&shapes, self.link_mode);
        self.st.is_linked = layout.is_linked;
        let (w, h) = (self.width, self.height);
        for (i, gs) in self.groups.iter_mut().enumerate() {
            gs.set_canvas_size(w, h);
            gs.set_position(layout.positions[i]);
            gs.set_link_targets(layout.is_linked, layout.linked_x[i], layout.linked_y[i]);
            gs.layout_dirty = false;
            gs.set_position_for_frame(0);
            gs.get_current_view();
            let draw_1d = !gs.is_2d() || gs.settings.display_1d;
            gs.set_widgets(true, draw_1d);
        }
    }

    fn rebuild(&mut self, spectra: Vec<Spectrum>) {
        let settings = &self.settings;
        self.groups = group_spectra(spectra, self.link_mode)
            .into_iter()
            .filter_map(|g| GraphSet::new(g, settings))
            .collect();
        self.current = 0;
        self.st.current_split_point = 0;
        self.st.this_widget = None;
        if let Some(gs) = self.groups.first_mut() {
            gs.is_current = true;
        }
        log::debug!("{} spectra in {} pane groups", self.n_spectra(), self.groups.len());
        self.need_new_pins = true;
        self.layout();
    }

    fn take_spectra(&mut self) -> Vec<Spectrum> {
        std::mem::take(&mut self.groups)
            .into_iter()
            .flat_map(GraphSet::into_spectra)
            .collect()
    }

    /// Regroup the spectra under `mode`. `All` picks AB or ABC from the
    /// spectrum count; a topology that does not match the count is ignored.
    pub fn link_spectra(&mut self, mode: LinkMode) {
        let n = self.n_spectra();
        let mode = mode.resolve(n);
        if mode != LinkMode::None && mode.letter_count() != n {
            log::debug!("link mode {} ignored for {} spectra", mode, n);
            return;
        }
        if mode == self.link_mode {
            return;
        }
        self.link_mode = mode;
        let spectra = self.take_spectra();
        self.rebuild(spectra);
        log::info!("link mode {} ({} groups)", mode, self.groups.len());
        self.view_log.add_entry("Link", &mode.to_string());
    }

    /// Drop the spectrum titled `title`, as asked for by a close notice.
    pub fn close_spectrum(&mut self, title: &str) -> bool {
        let held = self
            .groups
            .iter()
            .any(|g| g.spectra().iter().any(|s| s.title == title));
        if !held {
            return false;
        }
        let mut spectra = self.take_spectra();
        spectra.retain(|s| s.title != title);
        if self.link_mode.letter_count() != spectra.len() {
            self.link_mode = LinkMode::None;
        }
        self.rebuild(spectra);
        self.view_log.add_entry("Close", title);
        true
    }

    fn find_group(&self, x: i32, y: i32) -> Option<usize> {
        self.groups.iter().position(|g| g.has_point(x, y))
    }

    /// Make group `i` current and pick the spectrum under the pointer.
    /// Returns true when the group was not current before.
    fn set_current_graph_set(&mut self, i: usize, y: i32) -> bool {
        let click_count = self.st.click_count;
        let (mx, my) = (self.st.mouse_x, self.st.mouse_y);
        let is_new_set = self.current != i;
        for (j, g) in self.groups.iter_mut().enumerate() {
            g.is_current = j == i;
        }
        self.current = i;
        let Some(gs) = self.groups.get_mut(i) else {
            return false;
        };
        let split_point = if gs.n_split > 1 {
            gs.geom.split_point(y, gs.n_split)
        } else {
            gs.fixed_index()
        };
        let is_new_split = is_new_set || self.st.current_split_point != split_point;
        self.st.current_split_point = split_point;
        if gs.n_split > 1 {
            gs.set_position_for_frame(split_point);
        }
        if is_new_set || (gs.n_split > 1 && is_new_split) {
            gs.set_spectrum(Some(split_point), true);
        }
        if !is_new_set {
            gs.check_spectrum_clicked(&mut self.st, mx, my, click_count);
        }
        is_new_set
    }

    /// Run `f` against group `i`, then mirror link requests and record
    /// whatever the call changed.
    fn route<R: Default>(&mut self, i: usize, f: impl FnOnce(&mut GraphSet, &mut InteractionState) -> R) -> R {
        self.try_route(i, f).unwrap_or_default()
    }

    /// `None` when there is no group `i`.
    fn try_route<R>(&mut self, i: usize, f: impl FnOnce(&mut GraphSet, &mut InteractionState) -> R) -> Option<R> {
        let gs = self.groups.get_mut(i)?;
        let before = ViewStamp::of(gs);
        let out = f(gs, &mut self.st);
        self.process_link_requests(i);
        self.record_changes(i, before);
        Some(out)
    }

    fn record_changes(&mut self, i: usize, before: ViewStamp) {
        let Some(gs) = self.groups.get(i) else {
            return;
        };
        let after = ViewStamp::of(gs);
        let title = gs.spectrum().title.clone();
        if after.views == 1 && before.views > 1 {
            self.view_log.add_entry("Clear Views", &title);
        } else if (after.views, after.cursor) != (before.views, before.cursor) {
            let sd = gs.view().scale();
            let desc = format!(
                "{}: x {:.4} .. {:.4} (view {} of {})",
                title,
                sd.min_x_on_scale,
                sd.max_x_on_scale,
                after.cursor + 1,
                after.views
            );
            self.view_log.add_entry("Zoom", &desc);
        }
        if after.n_split != before.n_split {
            let op = if after.n_split > 1 { "Split" } else { "Stack" };
            self.view_log.add_entry(op, &format!("{}: {} frames", title, after.n_split));
        }
        if after.shift != before.shift {
            let desc = format!("{}: shift {:+.4} (total {:+.4})", title, after.shift - before.shift, after.shift);
            self.view_log.add_entry("Calibrate", &desc);
        }
        if self.groups.iter().any(|g| g.layout_dirty) {
            self.layout();
        }
    }

    // ── Linking ──

    /// Mirror queued requests from group `src` onto its linked siblings.
    fn process_link_requests(&mut self, src: usize) {
        let requests = self.st.take_link_requests();
        if requests.is_empty() {
            return;
        }
        let Some(_guard) = self.st.linking.try_acquire() else {
            return;
        };
        for req in requests {
            let targets = self.link_targets(src, matches!(req, LinkRequest::Zoom { .. }));
            match req {
                LinkRequest::Zoom {
                    init_x,
                    final_x,
                    is_1d,
                    check_range,
                    add_zoom,
                } => {
                    for j in targets {
                        let zr = ZoomRequest {
                            is_1d,
                            check_range,
                            check_linked: false,
                            add_zoom,
                            ..ZoomRequest::new(init_x, 0.0, final_x, 0.0)
                        };
                        self.groups[j].do_zoom(&mut self.st, zr);
                    }
                }
                LinkRequest::ClearViews => {
                    for j in targets {
                        self.groups[j].clear_views(&mut self.st);
                    }
                }
                LinkRequest::XMove { x } => {
                    for j in targets {
                        self.groups[j].set_x_pixel_moved_to(&mut self.st, Some(x), None, 0, 0);
                    }
                }
                LinkRequest::CrossHairs2D { x, y, locked } => {
                    for (j, gs) in self.groups.iter_mut().enumerate() {
                        if j != src {
                            gs.set_2d_xy(x, y, locked);
                        }
                    }
                }
            }
        }
    }

    /// Groups whose x scale is compatible with group `src` for linking.
    /// Zooms compare first spectra, the rest compare active spectra.
    fn link_targets(&self, src: usize, by_first: bool) -> Vec<usize> {
        fn pick(g: &GraphSet, by_first: bool) -> &Spectrum {
            if by_first {
                &g.spectra()[0]
            } else {
                g.spectrum()
            }
        }
        let spec = pick(&self.groups[src], by_first);
        (0..self.groups.len())
            .filter(|&j| j != src && are_x_scales_compatible(spec, pick(&self.groups[j], by_first), false, true))
            .collect()
    }

    // ── Pointer ──

    /// Pointer moved to `(x, y)`; `x == i32::MAX` means it left the canvas.
    pub fn mouse_moved(&mut self, x: i32, y: i32) {
        self.st.mouse_x = x;
        self.st.mouse_y = y;
        self.st.click_count = 0;
        if x == i32::MAX {
            self.st.this_widget = None;
            self.st.is_integral_drag = false;
            for gs in &mut self.groups {
                gs.mouse_moved(&mut self.st, x, y);
            }
            return;
        }
        if let Some(i) = self.find_group(x, y) {
            self.route(i, |gs, st| gs.mouse_moved(st, x, y));
        }
    }

    pub fn mouse_pressed(&mut self, x: i32, y: i32) {
        self.st.mouse_x = x;
        self.st.mouse_y = y;
        let Some(i) = self.find_group(x, y) else {
            return;
        };
        self.set_current_graph_set(i, y);
        self.st.press();
        self.route(i, |gs, st| gs.check_widget_event(st, x, y, true));
    }

    pub fn mouse_dragged(&mut self, x: i32, y: i32) {
        let i = self.current;
        if self.find_group(x, y) != Some(i) {
            return;
        }
        if self.st.ctrl_pressed && !self.groups[i].is_2d() {
            self.st.is_integral_drag = true;
        }
        self.st.mouse_x = x;
        self.st.mouse_y = y;
        self.route(i, |gs, st| {
            gs.check_widget_event(st, x, y, false);
            gs.mouse_moved(st, x, y);
        });
    }

    pub fn mouse_released(&mut self, x: i32, y: i32) {
        let i = self.current;
        let idle = self
            .groups
            .get(i)
            .map_or(true, |gs| self.st.this_widget.is_none() && gs.pending_measurement.is_none());
        if !idle {
            self.route(i, |gs, st| gs.mouse_released(st, x, y));
        }
        self.st.this_widget = None;
        self.st.is_integral_drag = false;
    }

    /// A click (press and release without a drag). `ctrl` measures
    /// without peak snapping.
    pub fn mouse_clicked(&mut self, x: i32, y: i32, ctrl: bool) {
        let Some(i) = self.find_group(x, y) else {
            return;
        };
        self.set_current_graph_set(i, y);
        let click_count = self.st.click_count;
        self.route(i, |gs, st| gs.mouse_clicked(st, x, y, click_count, ctrl));
    }

    // ── Keys ──

    /// Returns true when the key was consumed.
    pub fn key_pressed(&mut self, key: PanelKey, ctrl: bool) -> bool {
        use PanelKey::*;
        let i = self.current;
        if matches!(key, Escape | Delete | Backspace) {
            self.route(i, |gs, st| gs.escape_key_pressed(st, key != Escape));
            self.st.is_integral_drag = false;
            return true;
        }
        let mut f = 0.0;
        let consumed = if !ctrl {
            match key {
                Left | Right => {
                    let dx = if key == Right { 1 } else { -1 };
                    let (x, y) = (self.st.mouse_x.saturating_add(dx), self.st.mouse_y);
                    self.mouse_moved(x, y);
                    true
                }
                PageUp | PageDown => {
                    f = if key == PageUp { RT2 } else { 1.0 / RT2 };
                    true
                }
                Up | Down => {
                    let dir = if key == Down { -1 } else { 1 };
                    self.route(i, |gs, st| gs.advance_sub_spectrum(st, dir));
                    true
                }
                _ => false,
            }
        } else {
            match key {
                Up | Down | Plus | Minus => {
                    f = if matches!(key, Up | Plus) { RT2 } else { 1.0 / RT2 };
                    true
                }
                Left | Right => {
                    let step = if key == Right { 1 } else { -1 };
                    self.route(i, |gs, st| gs.to_peak(st, step));
                    true
                }
                Z => {
                    self.previous_view();
                    true
                }
                Y => {
                    self.next_view();
                    true
                }
                _ => false,
            }
        };
        if f != 0.0 {
            self.scale_y_by(f);
        }
        consumed
    }

    // ── View operations on the current group ──

    pub fn scale_y_by(&mut self, f: f64) {
        if let Some(gs) = self.current_graph_set_mut() {
            gs.scale_y_by(f);
        }
    }

    pub fn scale_selected_by(&mut self, f: f64) {
        for gs in &mut self.groups {
            gs.scale_selected_by(f);
        }
    }

    pub fn previous_view(&mut self) {
        self.navigate("Previous View", GraphSet::previous_view);
    }

    pub fn next_view(&mut self) {
        self.navigate("Next View", GraphSet::next_view);
    }

    pub fn reset_view(&mut self) {
        self.navigate("Reset View", GraphSet::reset_view);
    }

    fn navigate(&mut self, op: &str, f: fn(&mut GraphSet)) {
        let Some(gs) = self.groups.get_mut(self.current) else {
            return;
        };
        let before = gs.history().cursor();
        f(gs);
        let (cursor, views) = (gs.history().cursor(), gs.history().len());
        if cursor != before {
            let desc = format!("{}: view {} of {}", gs.spectrum().title, cursor + 1, views);
            self.view_log.add_entry(op, &desc);
        }
    }

    pub fn clear_views(&mut self) {
        self.route(self.current, |gs, st| gs.clear_views(st));
    }

    pub fn reset_view_completely(&mut self) {
        self.route(self.current, |gs, st| gs.reset_view_completely(st));
    }

    /// Zoom the current group to a box; all zeros resets it.
    pub fn set_zoom(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.route(self.current, |gs, st| gs.set_zoom(st, x1, y1, x2, y2));
    }

    pub fn split_stack(&mut self, do_split: bool) {
        self.route(self.current, |gs, st| gs.split_stack(st, do_split));
    }

    /// Calibrate the current spectrum. See [`GraphSet::shift_spectrum`].
    pub fn shift_spectrum(&mut self, mode: ShiftMode, x_old: f64, x_new: f64) -> bool {
        self.route(self.current, |gs, st| gs.shift_spectrum(st, mode, x_old, x_new))
    }

    /// Answer an edit-widget notice with the text the user typed.
    pub fn set_widget_value(&mut self, kind: WidgetKind, text: &str) -> Result<()> {
        self.try_route(self.current, |gs, st| gs.set_widget_value(st, kind, text))
            .unwrap_or(Ok(()))
    }

    /// Select the spectrum loaded from `path`, making its group current.
    pub fn select_spectrum(&mut self, path: &Path) -> bool {
        let mut found = None;
        for (i, gs) in self.groups.iter_mut().enumerate() {
            let is_current = i == self.current;
            if gs.select_spectrum(&mut self.st, path, is_current) && found.is_none() {
                found = Some(i);
            }
        }
        if let Some(i) = found {
            self.current = i;
            for (j, g) in self.groups.iter_mut().enumerate() {
                g.is_current = j == i;
            }
        }
        if self.groups.iter().any(|g| g.layout_dirty) {
            self.layout();
        }
        found.is_some()
    }

    // ── Drawing ──

    /// Paint the whole canvas: every group, every split frame, then the
    /// title of the current spectrum along the bottom.
    pub fn draw(&mut self, s: &mut dyn DrawingSurface) {
        let pal = &self.settings.palette;
        s.rect(0, 0, self.width, self.height, pal.background, true);
        let need_new_pins = std::mem::take(&mut self.need_new_pins);
        for gs in &mut self.groups {
            for i_split in 0..gs.n_split.max(1) {
                gs.draw_all(s, &self.st, i_split, need_new_pins);
            }
        }
        if !self.settings.title_on {
            return;
        }
        if let Some(gs) = self.groups.get(self.current) {
            let title = gs.spectrum().title_label();
            let y = self.height - s.text_height() / 2;
            s.text(5, y, &title, self.settings.palette.title, TextAlign::Left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::FrameGeometry;
    use crate::graph::test_support::{hsqc, proton};
    use crate::render::Frame;

    fn panel(spectra: Vec<Spectrum>) -> Panel {
        let mut p = Panel::new(spectra, PlotSettings::default());
        p.set_size(800, 600);
        p
    }

    fn mid(g: &FrameGeometry) -> (i32, i32) {
        ((g.x_pixel0 + g.x_pixel1) / 2, (g.y_pixel0 + g.y_pixel1) / 2)
    }

    fn drag(p: &mut Panel, from: (i32, i32), to: (i32, i32)) {
        p.mouse_moved(from.0, from.1);
        p.mouse_pressed(from.0, from.1);
        p.mouse_dragged(to.0, to.1);
        p.mouse_released(to.0, to.1);
    }

    #[test]
    fn test_compatible_spectra_share_a_group() {
        let p = panel(vec![proton("a", &[2.0]), proton("b", &[3.0]), hsqc("h")]);
        assert_eq!(p.groups().len(), 2);
        assert_eq!(p.groups()[0].n_spectra(), 2);
        assert!(p.groups()[1].is_2d());
        assert!(p.groups()[0].is_current);
        assert!(!p.interaction().is_linked);
    }

    #[test]
    fn test_link_all_resolves_from_count() {
        let mut p = panel(vec![proton("a", &[2.0]), hsqc("h")]);
        p.link_spectra(LinkMode::All);
        assert_eq!(p.link_mode(), LinkMode::AB);
        assert!(p.interaction().is_linked);
        assert_eq!(p.groups()[0].linked_x, Some(1));
        assert_eq!(p.view_log().last().unwrap().operation, "Link");

        p.link_spectra(LinkMode::ABC);
        assert_eq!(p.link_mode(), LinkMode::AB);
        p.link_spectra(LinkMode::None);
        assert!(!p.interaction().is_linked);
    }

    #[test]
    fn test_drag_zoom_is_logged() {
        let mut p = panel(vec![proton("a", &[2.0, 5.0])]);
        let (cx, cy) = mid(p.groups()[0].geometry());
        drag(&mut p, (cx - 100, cy), (cx + 100, cy + 40));
        let gs = &p.groups()[0];
        assert_eq!(gs.history().len(), 2);
        assert!(gs.view().scale().max_x - gs.view().scale().min_x < 5.0);
        assert_eq!(p.view_log().last().unwrap().operation, "Zoom");
        assert!(p.interaction().this_widget.is_none());
    }

    #[test]
    fn test_linked_zoom_reaches_sibling_once() {
        let mut p = panel(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        p.link_spectra(LinkMode::AB);
        assert_eq!(p.groups().len(), 2);
        let (cx, cy) = mid(p.groups()[0].geometry());
        drag(&mut p, (cx - 100, cy), (cx + 100, cy + 40));
        assert_eq!(p.groups()[0].history().len(), 2);
        assert_eq!(p.groups()[1].history().len(), 2);
        let (a, b) = (p.groups()[0].view().scale(), p.groups()[1].view().scale());
        assert!((a.min_x_on_scale - b.min_x_on_scale).abs() < 1e-6);
        assert!(!p.interaction().linking.is_held());

        p.clear_views();
        assert_eq!(p.groups()[0].history().len(), 1);
        assert_eq!(p.groups()[1].history().len(), 1);
        assert_eq!(p.view_log().last().unwrap().operation, "Clear Views");
    }

    #[test]
    fn test_2d_cross_hairs_reach_linked_1d() {
        let mut p = panel(vec![proton("a", &[2.0]), hsqc("h")]);
        p.link_spectra(LinkMode::All);
        let img = p.groups()[1].image().expect("2D group").clone();
        let (x, y) = (img.x_pixel0 + 50, img.y_pixel0 + 50);
        p.mouse_moved(x, y);
        p.mouse_pressed(x, y);
        p.mouse_released(x, y);
        p.mouse_clicked(x, y, false);
        assert_eq!(p.current_index(), 1);
        let cursor = &p.groups()[0].widgets()[WidgetKind::Cur1D2x1];
        assert!(cursor.x() >= 0.0 && cursor.x() <= 10.0);
        assert!(p.groups()[0].cur1d2_locked);
        assert!(p
            .take_notices()
            .iter()
            .any(|n| matches!(n, PanelNotice::SubSpectrumChanged { .. })));
    }

    #[test]
    fn test_press_in_split_frame_selects_its_spectrum() {
        let mut p = panel(vec![proton("a", &[2.0]), proton("b", &[3.0]), proton("c", &[4.0])]);
        p.split_stack(true);
        assert_eq!(p.groups()[0].n_split(), 3);
        assert_eq!(p.view_log().last().unwrap().operation, "Split");
        let g = *p.groups()[0].geometry();
        let frame = g.y_pixel11 - g.y_pixel00;
        let (x, y) = ((g.x_pixel0 + g.x_pixel1) / 2, g.y_pixel000 + 2 * frame + frame / 2);
        p.mouse_moved(x, y);
        p.mouse_pressed(x, y);
        p.mouse_released(x, y);
        assert_eq!(p.interaction().current_split_point, 2);
        assert_eq!(p.groups()[0].selection().active_index(), Some(2));

        p.split_stack(false);
        assert_eq!(p.groups()[0].n_split(), 1);
        assert_eq!(p.view_log().last().unwrap().operation, "Stack");
    }

    #[test]
    fn test_keys_scale_and_navigate_history() {
        let mut p = panel(vec![proton("a", &[2.0, 5.0])]);
        assert!(p.key_pressed(PanelKey::PageUp, false));
        let f = p.groups()[0].view().scale().spectrum_scale_factor;
        assert!((f - RT2).abs() < 1e-9);
        assert!(p.key_pressed(PanelKey::Minus, true));
        let f = p.groups()[0].view().scale().spectrum_scale_factor;
        assert!((f - 1.0).abs() < 1e-9);

        let (cx, cy) = mid(p.groups()[0].geometry());
        drag(&mut p, (cx - 100, cy), (cx + 100, cy + 40));
        assert!(p.key_pressed(PanelKey::Z, true));
        assert_eq!(p.groups()[0].history().cursor(), 0);
        assert_eq!(p.view_log().last().unwrap().operation, "Previous View");
        assert!(p.key_pressed(PanelKey::Y, true));
        assert_eq!(p.groups()[0].history().cursor(), 1);
        assert!(!p.key_pressed(PanelKey::Z, false));
    }

    #[test]
    fn test_arrow_keys_nudge_pointer_and_rows() {
        let mut p = panel(vec![proton("a", &[2.0])]);
        let (cx, cy) = mid(p.groups()[0].geometry());
        p.mouse_moved(cx, cy);
        p.key_pressed(PanelKey::Right, false);
        assert_eq!(p.interaction().mouse_x, cx + 1);
        p.key_pressed(PanelKey::Left, false);
        p.key_pressed(PanelKey::Left, false);
        assert_eq!(p.interaction().mouse_x, cx - 1);

        p.key_pressed(PanelKey::Up, false);
        assert_eq!(p.take_notices(), vec![PanelNotice::NoSubSpectra]);
    }

    #[test]
    fn test_escape_clears_zoom_box() {
        let mut p = panel(vec![proton("a", &[2.0])]);
        let (cx, cy) = mid(p.groups()[0].geometry());
        p.mouse_moved(cx, cy);
        p.mouse_pressed(cx, cy);
        p.mouse_dragged(cx + 60, cy + 30);
        assert!(!p.groups()[0].widgets()[WidgetKind::ZoomBox1D].is_collapsed());
        assert!(p.key_pressed(PanelKey::Escape, false));
        assert!(p.groups()[0].widgets()[WidgetKind::ZoomBox1D].is_collapsed());
    }

    #[test]
    fn test_calibration_is_logged() {
        let mut p = panel(vec![proton("a", &[2.0])]);
        assert!(p.shift_spectrum(ShiftMode::X, f64::NAN, 0.5));
        assert!((p.groups()[0].spectrum().spec_shift() - 0.5).abs() < 1e-12);
        assert_eq!(p.view_log().last().unwrap().operation, "Calibrate");
    }

    #[test]
    fn test_bad_widget_text_is_an_error() {
        let mut p = panel(vec![proton("a", &[2.0])]);
        assert!(p.set_widget_value(WidgetKind::Pin1Dx0, "abc").is_err());
        assert_eq!(p.groups()[0].history().len(), 1);
    }

    #[test]
    fn test_close_spectrum_regroups() {
        let mut p = panel(vec![proton("a", &[2.0]), hsqc("h")]);
        p.link_spectra(LinkMode::AB);
        assert!(p.close_spectrum("h"));
        assert_eq!(p.groups().len(), 1);
        assert_eq!(p.link_mode(), LinkMode::None);
        assert!(!p.close_spectrum("missing"));
    }

    #[test]
    fn test_select_spectrum_by_path() {
        let mut p = panel(vec![proton("a", &[2.0]), proton("b", &[3.0])]);
        assert!(p.select_spectrum(Path::new("/data/b.jdx")));
        assert_eq!(p.groups()[0].selection().active_index(), Some(1));
        assert!(!p.select_spectrum(Path::new("/data/zzz.jdx")));
    }

    #[test]
    fn test_draw_paints_groups_and_title() {
        let mut p = panel(vec![proton("a", &[2.0]), hsqc("h")]);
        let mut frame = Frame::default();
        p.draw(&mut frame);
        assert!(frame.polylines().count() >= 1);
        let title = p.groups()[0].spectrum().title_label();
        assert!(frame.texts().any(|t| t == title));
    }
}
