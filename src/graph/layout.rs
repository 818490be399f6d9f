/// Pane placement on the canvas and the pixel geometry of one frame
///
/// Positions are fractions of the whole canvas. Pixel geometry for a frame
/// is derived from those fractions, the margins, and (in split mode) the
/// frame's index within its group.

use crate::config::Margins;
use crate::data::spectrum::{are_linkable_x, are_linkable_y};
use crate::data::Spectrum;

/// Pixels reserved above a group that starts at the canvas top.
const TOP_BAND: i32 = 25;
/// Pixels of canvas height not shared out between groups.
const MARGINAL_RESERVE: i32 = 50;
/// Hit distance for lines, trace segments and annotation bars.
pub const ONLINE_CUTOFF: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Resolves to AB or ABC from the spectrum count.
    All,
    None,
    /// A 1D pane beside a homonuclear 2D pane.
    AB,
    /// Two 1D panes stacked beside a heteronuclear 2D pane.
    ABC,
}

impl LinkMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "*" | "ALL" => Some(LinkMode::All),
            "NONE" => Some(LinkMode::None),
            "AB" => Some(LinkMode::AB),
            "ABC" => Some(LinkMode::ABC),
            _ => None,
        }
    }

    /// Number of panes the topology links.
    pub fn letter_count(self) -> usize {
        match self {
            LinkMode::AB => 2,
            LinkMode::ABC => 3,
            LinkMode::All | LinkMode::None => 0,
        }
    }

    /// `All` becomes the topology matching `n` spectra.
    pub fn resolve(self, n: usize) -> Self {
        match self {
            LinkMode::All => match n {
                2 => LinkMode::AB,
                3 => LinkMode::ABC,
                _ => LinkMode::None,
            },
            m => m,
        }
    }
}

impl std::fmt::Display for LinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinkMode::All => "*",
            LinkMode::None => "NONE",
            LinkMode::AB => "AB",
            LinkMode::ABC => "ABC",
        };
        f.write_str(s)
    }
}

/// Normalised sub-rectangle of the canvas owned by one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracPosition {
    pub x0: f64,
    pub y0: f64,
    pub frac_x: f64,
    pub frac_y: f64,
}

impl Default for FracPosition {
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            frac_x: 1.0,
            frac_y: 1.0,
        }
    }
}

/// What a layout pass needs to know about one group.
#[derive(Debug, Clone, Copy)]
pub struct GroupShape<'a> {
    pub first: &'a Spectrum,
    pub n_split: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub positions: Vec<FracPosition>,
    /// Index of the 2D group each group is x-linked to.
    pub linked_x: Vec<Option<usize>>,
    pub linked_y: Vec<Option<usize>>,
    pub is_linked: bool,
}

/// Place every group. Unlinked groups stack vertically, sharing height in
/// proportion to their split counts. A linked layout needs exactly one 2D
/// group among two or three; otherwise it falls back to a plain stack.
pub fn fractional_positions(groups: &[GroupShape<'_>], mode: LinkMode) -> Layout {
    let n = groups.len();
    let mut layout = Layout {
        positions: vec![FracPosition::default(); n],
        linked_x: vec![None; n],
        linked_y: vec![None; n],
        is_linked: false,
    };
    if mode == LinkMode::None {
        let total: usize = groups.iter().map(|g| g.n_split.max(1)).sum();
        let f = 1.0 / total.max(1) as f64;
        let mut y = 0.0;
        for (pos, g) in layout.positions.iter_mut().zip(groups) {
            *pos = FracPosition {
                x0: 0.0,
                y0: y,
                frac_x: 1.0,
                frac_y: f,
            };
            y += f * g.n_split.max(1) as f64;
        }
        return layout;
    }

    let two_d: Vec<usize> = (0..n).filter(|&i| !groups[i].first.is_1d()).collect();
    let i2d = match (two_d.as_slice(), n) {
        ([i], 2 | 3) => Some(*i),
        ([], 2) => None,
        _ => return fractional_positions(groups, LinkMode::None),
    };
    layout.is_linked = true;
    let mut y = 0.0;
    for (i, g) in groups.iter().enumerate() {
        if Some(i) == i2d {
            layout.positions[i] = FracPosition {
                x0: 0.5,
                y0: 0.0,
                frac_x: 0.5,
                frac_y: 1.0,
            };
            continue;
        }
        if let Some(j) = i2d {
            let s2 = groups[j].first;
            if are_linkable_x(g.first, s2) {
                layout.linked_x[i] = Some(j);
            }
            if are_linkable_y(g.first, s2) {
                layout.linked_y[i] = Some(j);
            }
        }
        layout.positions[i] = FracPosition {
            x0: 0.0,
            y0: y,
            frac_x: if i2d.is_none() { 1.0 } else { 0.5 },
            frac_y: if n == 3 || i2d.is_none() { 0.5 } else { 1.0 },
        };
        y += 0.5;
    }
    layout
}

/// Pixel geometry of one frame (one split sub-frame, or the whole group).
///
/// The `*00`/`*11` fields are the outer frame; `x_pixel0..x_pixel1` and
/// `y_pixel0..y_pixel1` are the plot area inside the margins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameGeometry {
    pub x_pixel00: i32,
    pub x_pixel11: i32,
    pub y_pixel000: i32,
    pub y_pixel00: i32,
    pub y_pixel11: i32,
    pub x_pixel0: i32,
    pub x_pixel1: i32,
    pub x_pixel10: i32,
    pub x_pixels0: i32,
    pub x_pixels: i32,
    pub y_pixel0: i32,
    pub y_pixel1: i32,
    pub y_pixels: i32,
    pub x_v_arrows: i32,
    pub x_h_arrows: i32,
    pub y_h_arrows: i32,
    /// Bottom of the whole group, whatever frame is current.
    pub group_bottom: i32,
}

impl FrameGeometry {
    pub fn compute(
        width: i32,
        height: i32,
        pos: &FracPosition,
        margins: &Margins,
        i_split: usize,
        n_split: usize,
    ) -> Self {
        let marginal_height = (height - MARGINAL_RESERVE) as f64;
        let x_pixel00 = (width as f64 * pos.x0) as i32;
        let x_pixel11 = x_pixel00 + (width as f64 * pos.frac_x) as i32 - 1;
        let x_pixel0 = x_pixel00 + (margins.left as f64 * (1.0 - pos.x0)) as i32;
        let x_pixel1 = x_pixel11 - margins.right;
        let y_pixel000 = if pos.y0 == 0.0 { TOP_BAND } else { 0 } + (height as f64 * pos.y0) as i32;
        let frame_height = marginal_height * pos.frac_y;
        let y_pixel00 = y_pixel000 + (frame_height * i_split as f64) as i32;
        let y_pixel11 = y_pixel00 + frame_height as i32 - 1;
        let y_pixel0 = y_pixel00 + margins.top / 2;
        let y_pixel1 = y_pixel11 - margins.bottom / 2;
        Self {
            x_pixel00,
            x_pixel11,
            y_pixel000,
            y_pixel00,
            y_pixel11,
            x_pixel0,
            x_pixel1,
            x_pixel10: x_pixel1,
            x_pixels0: x_pixel1 - x_pixel0 + 1,
            x_pixels: x_pixel1 - x_pixel0 + 1,
            y_pixel0,
            y_pixel1,
            y_pixels: y_pixel1 - y_pixel0 + 1,
            x_v_arrows: x_pixel11 - margins.right / 2,
            x_h_arrows: x_pixel00 + 25,
            y_h_arrows: y_pixel11 - 12,
            group_bottom: y_pixel000 + (frame_height * n_split.max(1) as f64) as i32 - 1,
        }
    }

    pub fn has_point(&self, x: i32, y: i32) -> bool {
        x >= self.x_pixel00 && x <= self.x_pixel11 && y >= self.y_pixel000 && y <= self.group_bottom
    }

    pub fn is_in_plot_region(&self, x: i32, y: i32) -> bool {
        x >= self.x_pixel0 && x <= self.x_pixel1 && y >= self.y_pixel0 && y <= self.y_pixel1
    }

    /// Which split sub-frame a canvas row falls in.
    pub fn split_point(&self, y: i32, n_split: usize) -> usize {
        let frame = (self.y_pixel11 - self.y_pixel00).max(1);
        let i = (y - self.y_pixel000) / frame;
        i.clamp(0, n_split.max(1) as i32 - 1) as usize
    }

    pub fn fix_x(&self, x: i32) -> i32 {
        x.clamp(self.x_pixel0, self.x_pixel1.max(self.x_pixel0))
    }

    pub fn fix_y(&self, y: i32) -> i32 {
        y.clamp(self.y_pixel0, self.y_pixel1.max(self.y_pixel0))
    }

    /// Centre of an arrow control, in canvas pixels.
    pub fn arrow_anchor(&self, arrow: Arrow) -> (i32, i32) {
        let mid = (self.y_pixel00 + self.y_pixel11) / 2;
        match arrow {
            Arrow::Up => (self.x_v_arrows, mid - 15),
            Arrow::Down => (self.x_v_arrows, mid + 15),
            Arrow::Reset => (self.x_v_arrows, mid),
            Arrow::Left => (self.x_h_arrows - 15, self.y_h_arrows),
            Arrow::Right => (self.x_h_arrows + 15, self.y_h_arrows),
            Arrow::Home => (self.x_h_arrows, self.y_h_arrows),
        }
    }

    pub fn is_arrow_click(&self, x: i32, y: i32, arrow: Arrow) -> bool {
        let (ax, ay) = self.arrow_anchor(arrow);
        (ax - x).abs() < 10 && (ay - y).abs() < 10
    }

    /// Top-left corners of the closer and splitter boxes.
    pub fn closer_box(&self) -> (i32, i32) {
        (self.x_pixel11 - 10 - 10, self.y_pixel00 + 1)
    }

    pub fn splitter_box(&self) -> (i32, i32) {
        (self.x_pixel11 - 10 - 20, self.y_pixel00 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Reset,
    Left,
    Right,
    Home,
}

/// Hit-test for the 10x10 control boxes drawn at `(box_x, box_y)`.
pub fn is_frame_box(x: i32, y: i32, box_x: i32, box_y: i32) -> bool {
    (x - (box_x + 5)).abs() < 5 && (y - (box_y + 5)).abs() < 5
}

fn distance(dx: i32, dy: i32) -> f64 {
    ((dx * dx + dy * dy) as f64).sqrt()
}

/// Whether `(x, y)` lies within the cutoff of segment `(x1,y1)-(x2,y2)`.
pub fn is_on_line(x: i32, y: i32, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
    let dx1 = (x1 - x).abs();
    if dx1 < ONLINE_CUTOFF && (y1 - y).abs() < ONLINE_CUTOFF {
        return true;
    }
    let dx2 = x2 - x;
    if dx2.abs() < ONLINE_CUTOFF && (y2 - y).abs() < ONLINE_CUTOFF {
        return true;
    }
    let dy12 = y1 - y2;
    if dy12.abs() > ONLINE_CUTOFF && (y1 < y) == (y2 < y) {
        return false;
    }
    let dx12 = x1 - x2;
    if dx12.abs() > ONLINE_CUTOFF && (x1 < x) == (x2 < x) {
        return false;
    }
    distance(dx1, y1 - y) + distance(dx2, y - y2) < distance(dx12, dy12) + ONLINE_CUTOFF as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Nucleus, SubSpectrum};

    fn h1() -> Spectrum {
        Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, vec![])
    }

    fn c13() -> Spectrum {
        Spectrum::new_nmr_1d("c", Nucleus::C13, 100.0, vec![])
    }

    fn hsqc() -> Spectrum {
        let rows = vec![SubSpectrum { coords: vec![], y_2d: 0.0 }];
        Spectrum::new_nmr_2d("hsqc", Nucleus::H1, Nucleus::C13, 400.0, rows)
    }

    #[test]
    fn test_link_mode_resolution() {
        assert_eq!(LinkMode::All.resolve(2), LinkMode::AB);
        assert_eq!(LinkMode::All.resolve(3), LinkMode::ABC);
        assert_eq!(LinkMode::All.resolve(4), LinkMode::None);
        assert_eq!(LinkMode::parse("abc"), Some(LinkMode::ABC));
        assert_eq!(LinkMode::parse("*"), Some(LinkMode::All));
        assert_eq!(LinkMode::ABC.letter_count(), 3);
    }

    #[test]
    fn test_unlinked_stack_shares_by_split() {
        let (a, b) = (h1(), c13());
        let groups = [GroupShape { first: &a, n_split: 3 }, GroupShape { first: &b, n_split: 1 }];
        let l = fractional_positions(&groups, LinkMode::None);
        assert!(!l.is_linked);
        assert_eq!(l.positions[0].frac_y, 0.25);
        assert_eq!(l.positions[1].y0, 0.75);
        assert_eq!(l.positions[1].frac_x, 1.0);
    }

    #[test]
    fn test_abc_places_2d_on_right() {
        let (a, b, c) = (h1(), c13(), hsqc());
        let groups = [
            GroupShape { first: &a, n_split: 1 },
            GroupShape { first: &b, n_split: 1 },
            GroupShape { first: &c, n_split: 1 },
        ];
        let l = fractional_positions(&groups, LinkMode::ABC);
        assert!(l.is_linked);
        assert_eq!(l.positions[2], FracPosition { x0: 0.5, y0: 0.0, frac_x: 0.5, frac_y: 1.0 });
        assert_eq!(l.positions[0].frac_x, 0.5);
        assert_eq!(l.positions[0].frac_y, 0.5);
        assert_eq!(l.positions[1].y0, 0.5);
        assert_eq!(l.linked_x[0], Some(2));
        assert_eq!(l.linked_y[0], None);
        assert_eq!(l.linked_y[1], Some(2));
        assert_eq!(l.linked_x[1], None);
    }

    #[test]
    fn test_two_2d_groups_fall_back() {
        let (a, b) = (hsqc(), hsqc());
        let groups = [GroupShape { first: &a, n_split: 1 }, GroupShape { first: &b, n_split: 1 }];
        let l = fractional_positions(&groups, LinkMode::AB);
        assert!(!l.is_linked);
        assert_eq!(l.positions[1].y0, 0.5);
    }

    #[test]
    fn test_frame_geometry() {
        let m = Margins::default();
        let g = FrameGeometry::compute(800, 650, &FracPosition::default(), &m, 0, 1);
        assert_eq!(g.x_pixel00, 0);
        assert_eq!(g.x_pixel11, 799);
        assert_eq!(g.x_pixel0, m.left);
        assert_eq!(g.x_pixel1, 799 - m.right);
        assert_eq!(g.y_pixel000, 25);
        assert_eq!(g.y_pixel11, 25 + 600 - 1);
        assert_eq!(g.y_pixels, g.y_pixel1 - g.y_pixel0 + 1);
        assert!(g.is_in_plot_region(400, 300));
        assert!(!g.is_in_plot_region(5, 300));
        assert!(g.has_point(5, 300));
        assert_eq!(g.fix_x(-20), g.x_pixel0);
    }

    #[test]
    fn test_split_frames() {
        let m = Margins::default();
        let pos = FracPosition { frac_y: 0.25, ..Default::default() };
        let g1 = FrameGeometry::compute(600, 650, &pos, &m, 1, 4);
        assert_eq!(g1.y_pixel00, 25 + 150);
        assert_eq!(g1.split_point(g1.y_pixel00 + 10, 4), 1);
        assert_eq!(g1.split_point(10_000, 4), 3);
        assert_eq!(g1.split_point(-50, 4), 0);
        assert!(g1.has_point(10, 600));
    }

    #[test]
    fn test_arrows_and_boxes() {
        let g = FrameGeometry::compute(800, 650, &FracPosition::default(), &Margins::default(), 0, 1);
        let (x, y) = g.arrow_anchor(Arrow::Up);
        assert!(g.is_arrow_click(x + 3, y - 3, Arrow::Up));
        assert!(!g.is_arrow_click(x, y, Arrow::Down));
        let (bx, by) = g.closer_box();
        assert!(is_frame_box(bx + 5, by + 5, bx, by));
        assert!(!is_frame_box(bx + 11, by + 5, bx, by));
    }

    #[test]
    fn test_on_line() {
        assert!(is_on_line(50, 51, 0, 50, 100, 50));
        assert!(!is_on_line(50, 62, 0, 50, 100, 50));
        assert!(!is_on_line(150, 50, 0, 50, 100, 50));
        assert!(is_on_line(1, 1, 0, 0, 100, 100));
        assert!(is_on_line(51, 50, 0, 0, 100, 100));
    }
}
