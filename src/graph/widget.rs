/// Draggable plot widgets: range pins, cursors and rubber-band zoom boxes

use crate::data::Coordinate;
use std::ops::{Index, IndexMut};

/// Drags shorter than this (in pixels) are discarded instead of committed.
pub const MIN_DRAG_PIXELS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    ZoomBox1D,
    ZoomBox2D,
    Pin1Dx0,
    Pin1Dx01,
    Pin1Dx1,
    Pin1Dy0,
    Pin1Dy01,
    Pin1Dy1,
    Pin2Dx0,
    Pin2Dx01,
    Pin2Dx1,
    Pin2Dy0,
    Pin2Dy01,
    Pin2Dy1,
    Cur2Dx0,
    Cur2Dx1,
    Cur2Dy,
    Cur1D2x1,
    Cur1D2x2,
}

impl WidgetKind {
    /// Hit-test and draw order.
    pub const ALL: [WidgetKind; 19] = [
        WidgetKind::ZoomBox1D,
        WidgetKind::ZoomBox2D,
        WidgetKind::Pin1Dx0,
        WidgetKind::Pin1Dx01,
        WidgetKind::Pin1Dx1,
        WidgetKind::Pin1Dy0,
        WidgetKind::Pin1Dy01,
        WidgetKind::Pin1Dy1,
        WidgetKind::Pin2Dx0,
        WidgetKind::Pin2Dx01,
        WidgetKind::Pin2Dx1,
        WidgetKind::Pin2Dy0,
        WidgetKind::Pin2Dy01,
        WidgetKind::Pin2Dy1,
        WidgetKind::Cur2Dx0,
        WidgetKind::Cur2Dx1,
        WidgetKind::Cur2Dy,
        WidgetKind::Cur1D2x1,
        WidgetKind::Cur1D2x2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::ZoomBox1D => "zoomBox1D",
            WidgetKind::ZoomBox2D => "zoomBox2D",
            WidgetKind::Pin1Dx0 => "pin1Dx0",
            WidgetKind::Pin1Dx01 => "pin1Dx01",
            WidgetKind::Pin1Dx1 => "pin1Dx1",
            WidgetKind::Pin1Dy0 => "pin1Dy0",
            WidgetKind::Pin1Dy01 => "pin1Dy01",
            WidgetKind::Pin1Dy1 => "pin1Dy1",
            WidgetKind::Pin2Dx0 => "pin2Dx0",
            WidgetKind::Pin2Dx01 => "pin2Dx01",
            WidgetKind::Pin2Dx1 => "pin2Dx1",
            WidgetKind::Pin2Dy0 => "pin2Dy0",
            WidgetKind::Pin2Dy01 => "pin2Dy01",
            WidgetKind::Pin2Dy1 => "pin2Dy1",
            WidgetKind::Cur2Dx0 => "cur2Dx0",
            WidgetKind::Cur2Dx1 => "cur2Dx1",
            WidgetKind::Cur2Dy => "cur2Dy",
            WidgetKind::Cur1D2x1 => "cur1D2x1",
            WidgetKind::Cur1D2x2 => "cur1D2x2",
        }
    }

    pub fn is_pin(self) -> bool {
        self.name().starts_with("pin")
    }

    pub fn is_pin_or_cursor(self) -> bool {
        !self.name().starts_with("zoom")
    }

    /// Widgets that carry an x value (zoom boxes included).
    pub fn is_x_type(self) -> bool {
        self.name().contains('x')
    }

    /// Widgets that only exist alongside a 2D image.
    pub fn is_2d(self) -> bool {
        self.name().contains("2D")
    }

    /// Centre pins drag both range ends together.
    pub fn is_centre(self) -> bool {
        matches!(
            self,
            WidgetKind::Pin1Dx01 | WidgetKind::Pin1Dy01 | WidgetKind::Pin2Dx01 | WidgetKind::Pin2Dy01
        )
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Colour role of a widget; resolved against the palette at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetColor {
    Plot,
    PeakTab,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotWidget {
    pub kind: WidgetKind,
    pub value: Coordinate,
    pub x_pixel0: i32,
    pub y_pixel0: i32,
    pub x_pixel1: i32,
    pub y_pixel1: i32,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub color: WidgetColor,
}

impl PlotWidget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            value: Coordinate::new(0.0, 0.0),
            x_pixel0: 0,
            y_pixel0: 0,
            x_pixel1: 0,
            y_pixel1: 0,
            is_enabled: true,
            is_visible: false,
            color: WidgetColor::Plot,
        }
    }

    pub fn x(&self) -> f64 {
        self.value.x
    }

    pub fn y(&self) -> f64 {
        self.value.y
    }

    /// The value a user would edit: x for x-type widgets, y otherwise.
    pub fn edit_value(&self) -> f64 {
        if self.kind.is_x_type() {
            self.value.x
        } else {
            self.value.y
        }
    }

    /// Box hit-test around the anchor pixel; hidden widgets never hit.
    /// Only `(x_pixel0, y_pixel0)` is a grab handle: `set_x` keeps both x
    /// anchors of pins and cursors equal, and zoom boxes, whose second
    /// corner does move, are never hit-tested.
    pub fn selected(&self, x_pixel: i32, y_pixel: i32) -> bool {
        self.is_visible
            && (self.x_pixel0 - x_pixel).abs() < MIN_DRAG_PIXELS
            && (self.y_pixel0 - y_pixel).abs() < MIN_DRAG_PIXELS
    }

    pub fn set_x(&mut self, x: f64, x_pixel: i32) {
        self.value.x = x;
        self.x_pixel0 = x_pixel;
        self.x_pixel1 = x_pixel;
    }

    pub fn set_y(&mut self, y: f64, y_pixel: i32) {
        self.value.y = y;
        self.y_pixel0 = y_pixel;
        self.y_pixel1 = y_pixel;
    }

    /// Collapse a zoom box so it no longer draws.
    pub fn collapse(&mut self) {
        self.x_pixel1 = self.x_pixel0;
    }

    pub fn is_collapsed(&self) -> bool {
        self.x_pixel0 == self.x_pixel1
    }
}

/// Whether a drag moved far enough to count. With no partner the widget is a
/// zoom box that must span the threshold in both directions; with a partner,
/// the two anchors must be separated along the chosen axis.
pub fn is_good_drag(w: &PlotWidget, partner: Option<&PlotWidget>, as_x: bool) -> bool {
    match partner {
        None => {
            (w.x_pixel1 - w.x_pixel0).abs() > MIN_DRAG_PIXELS
                && (w.y_pixel1 - w.y_pixel0).abs() > MIN_DRAG_PIXELS
        }
        Some(p) if as_x => (w.x_pixel0 - p.x_pixel0).abs() > MIN_DRAG_PIXELS,
        Some(p) => (w.y_pixel0 - p.y_pixel0).abs() > MIN_DRAG_PIXELS,
    }
}

/// All widgets for one pane group, addressable by kind.
///
/// The 2D-only widgets are always allocated; they are simply never visible
/// (and so never hit) unless the group has an image.
#[derive(Debug, Clone)]
pub struct WidgetSet {
    widgets: Vec<PlotWidget>,
    has_2d: bool,
}

impl WidgetSet {
    pub fn new(has_2d: bool) -> Self {
        let widgets = WidgetKind::ALL
            .iter()
            .map(|&k| {
                let mut w = PlotWidget::new(k);
                w.is_visible = !k.is_2d() || has_2d;
                if matches!(k, WidgetKind::Cur1D2x1 | WidgetKind::Cur1D2x2) {
                    w.color = WidgetColor::PeakTab;
                    w.is_visible = false;
                }
                w
            })
            .collect();
        Self { widgets, has_2d }
    }

    pub fn has_2d(&self) -> bool {
        self.has_2d
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlotWidget> {
        self.widgets.iter().filter(move |w| !w.kind.is_2d() || self.has_2d)
    }

    /// The first pin or cursor under the pointer, in draw order.
    pub fn pin_at(&self, x_pixel: i32, y_pixel: i32) -> Option<WidgetKind> {
        self.iter()
            .filter(|w| w.kind.is_pin_or_cursor() && w.is_enabled)
            .find(|w| w.selected(x_pixel, y_pixel))
            .map(|w| w.kind)
    }
}

impl Index<WidgetKind> for WidgetSet {
    type Output = PlotWidget;

    fn index(&self, kind: WidgetKind) -> &PlotWidget {
        &self.widgets[kind.slot()]
    }
}

impl IndexMut<WidgetKind> for WidgetSet {
    fn index_mut(&mut self, kind: WidgetKind) -> &mut PlotWidget {
        &mut self.widgets[kind.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(WidgetKind::Pin1Dx0.is_pin());
        assert!(WidgetKind::Pin1Dx0.is_x_type());
        assert!(!WidgetKind::Pin1Dy1.is_x_type());
        assert!(WidgetKind::ZoomBox1D.is_x_type());
        assert!(!WidgetKind::ZoomBox1D.is_pin_or_cursor());
        assert!(WidgetKind::Cur2Dy.is_pin_or_cursor());
        assert!(!WidgetKind::Cur2Dy.is_pin());
        assert!(WidgetKind::Pin2Dy01.is_2d());
        assert!(!WidgetKind::Cur1D2x1.is_2d());
        assert!(WidgetKind::Pin2Dx01.is_centre());
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        for (i, k) in WidgetKind::ALL.iter().enumerate() {
            assert_eq!(k.slot(), i);
        }
    }

    #[test]
    fn test_selected_box_and_visibility() {
        let mut w = PlotWidget::new(WidgetKind::Pin1Dx0);
        w.set_x(1.0, 100);
        w.y_pixel0 = 50;
        assert!(!w.selected(100, 50));
        w.is_visible = true;
        assert!(w.selected(104, 46));
        assert!(!w.selected(105, 50));
        assert!(!w.selected(100, 55));
    }

    #[test]
    fn test_cursor_grabbed_at_its_handle_only() {
        let mut ws = WidgetSet::new(false);
        let c = &mut ws[WidgetKind::Cur1D2x1];
        c.set_x(4.0, 200);
        c.y_pixel0 = 406;
        c.y_pixel1 = 35;
        c.is_visible = true;
        assert_eq!(c.x_pixel1, 200);
        assert_eq!(ws.pin_at(202, 404), Some(WidgetKind::Cur1D2x1));
        assert_eq!(ws.pin_at(200, 35), None);

        let z = &mut ws[WidgetKind::ZoomBox1D];
        z.set_x(1.0, 300);
        z.x_pixel1 = 360;
        z.is_visible = true;
        assert_eq!(ws.pin_at(300, 0), None);
    }

    #[test]
    fn test_good_drag_threshold() {
        let mut z = PlotWidget::new(WidgetKind::ZoomBox1D);
        z.x_pixel0 = 10;
        z.y_pixel0 = 10;
        z.x_pixel1 = 40;
        z.y_pixel1 = 15;
        assert!(!is_good_drag(&z, None, true));
        z.y_pixel1 = 16;
        assert!(is_good_drag(&z, None, true));

        let mut a = PlotWidget::new(WidgetKind::Pin2Dx0);
        let mut b = PlotWidget::new(WidgetKind::Pin2Dx1);
        a.set_x(0.0, 100);
        b.set_x(0.0, 105);
        assert!(!is_good_drag(&a, Some(&b), true));
        b.set_x(0.0, 106);
        assert!(is_good_drag(&a, Some(&b), true));
    }

    #[test]
    fn test_set_hides_2d_widgets_without_image() {
        let ws = WidgetSet::new(false);
        assert!(ws.iter().all(|w| !w.kind.is_2d()));
        let mut ws = WidgetSet::new(true);
        ws[WidgetKind::Pin2Dx0].set_x(3.0, 300);
        ws[WidgetKind::Pin2Dx0].y_pixel0 = 20;
        assert_eq!(ws.pin_at(301, 21), Some(WidgetKind::Pin2Dx0));
        ws[WidgetKind::Pin2Dx0].is_enabled = false;
        assert_eq!(ws.pin_at(301, 21), None);
    }
}
