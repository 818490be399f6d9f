/// Panel-wide pointer state shared with every pane group's event handlers

use super::link::LinkLock;
use super::widget::WidgetKind;
use crate::data::{Coordinate, PeakInfo};

/// Something the host UI should react to. The engine never blocks on the
/// host: requests that need user input are raised here and answered later
/// through the panel's setters.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelNotice {
    /// Ask the user for a new value for `widget`, pre-filled with `current`.
    EditWidget { widget: WidgetKind, current: String },
    /// The closer box of the current pane group was clicked.
    CloseSpectrum { title: String },
    /// A click in the plot picked a coordinate (and maybe a listed peak).
    PeakPicked { coord: Option<Coordinate>, peak: Option<PeakInfo> },
    /// The displayed row of a multi-row spectrum changed.
    SubSpectrumChanged { index: usize, y_2d: f64 },
    /// The spectrum has no rows to step through.
    NoSubSpectra,
}

/// A change that should be mirrored onto linked pane groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkRequest {
    Zoom {
        init_x: f64,
        final_x: f64,
        is_1d: bool,
        check_range: bool,
        add_zoom: bool,
    },
    ClearViews,
    /// The pointer moved to data x `x` on a sticky 2D cross-hair.
    XMove { x: f64 },
    /// A 2D cross-hair moved to `(x, y)`; `locked` pins the 1D cursors.
    CrossHairs2D { x: f64, y: f64, locked: bool },
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub mouse_x: i32,
    pub mouse_y: i32,
    /// Cycles 1, 2, 0 on successive presses.
    pub click_count: u8,
    pub shift_pressed: bool,
    pub ctrl_pressed: bool,
    /// Widget captured by the last press, if any.
    pub this_widget: Option<WidgetKind>,
    pub is_integral_drag: bool,
    /// Split frame under the pointer in the current group.
    pub current_split_point: usize,
    pub coord_clicked: Option<Coordinate>,
    pub x_pixel_clicked: i32,
    /// Panes are linked (AB/ABC) rather than stacked.
    pub is_linked: bool,
    pub linking: LinkLock,
    notices: Vec<PanelNotice>,
    link_requests: Vec<LinkRequest>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notice: PanelNotice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<PanelNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notices(&self) -> &[PanelNotice] {
        &self.notices
    }

    /// Queue a request for linked panes, unless a fan-out is already running.
    pub fn request_link(&mut self, req: LinkRequest) {
        if self.is_linked && !self.linking.is_held() {
            self.link_requests.push(req);
        }
    }

    pub fn take_link_requests(&mut self) -> Vec<LinkRequest> {
        std::mem::take(&mut self.link_requests)
    }

    /// Advance the click counter on a press.
    pub fn press(&mut self) {
        self.click_count = (self.click_count + 1) % 3;
    }

    pub fn is_double_click(&self) -> bool {
        self.click_count == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_count_cycles() {
        let mut s = InteractionState::new();
        s.press();
        assert_eq!(s.click_count, 1);
        s.press();
        assert!(s.is_double_click());
        s.press();
        assert_eq!(s.click_count, 0);
    }

    #[test]
    fn test_link_requests_suppressed_while_linking() {
        let mut s = InteractionState::new();
        s.request_link(LinkRequest::ClearViews);
        assert!(s.take_link_requests().is_empty());
        s.is_linked = true;
        {
            let _g = s.linking.try_acquire();
            s.request_link(LinkRequest::ClearViews);
        }
        assert!(s.take_link_requests().is_empty());
        s.request_link(LinkRequest::XMove { x: 1.0 });
        assert_eq!(s.take_link_requests(), vec![LinkRequest::XMove { x: 1.0 }]);
    }

    #[test]
    fn test_notices_drain() {
        let mut s = InteractionState::new();
        s.notify(PanelNotice::NoSubSpectra);
        assert_eq!(s.notices().len(), 1);
        assert_eq!(s.take_notices(), vec![PanelNotice::NoSubSpectra]);
        assert!(s.notices().is_empty());
    }
}
