/// Pixel-space drawing primitives and the surface that paints them
///
/// The engine only computes positions. Every redraw goes through a
/// [`DrawingSurface`]; [`Frame`] records the calls so a redraw can be
/// inspected in tests or replayed onto another surface later.

pub mod egui_surface;

use crate::config::Rgba;

/// Horizontal placement of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Centre,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgba,
        width: f32,
    },
    Polyline {
        points: Vec<(i32, i32)>,
        color: Rgba,
        width: f32,
    },
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgba,
        filled: bool,
    },
    Circle {
        x: i32,
        y: i32,
        r: i32,
        color: Rgba,
        filled: bool,
    },
    /// Text with its baseline at `y`.
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Rgba,
        align: TextAlign,
    },
}

impl Primitive {
    pub fn paint(&self, s: &mut dyn DrawingSurface) {
        match self {
            Primitive::Line { x0, y0, x1, y1, color, width } => s.line(*x0, *y0, *x1, *y1, *color, *width),
            Primitive::Polyline { points, color, width } => s.polyline(points, *color, *width),
            Primitive::Rect { x, y, w, h, color, filled } => s.rect(*x, *y, *w, *h, *color, *filled),
            Primitive::Circle { x, y, r, color, filled } => s.circle(*x, *y, *r, *color, *filled),
            Primitive::Text { x, y, text, color, align } => s.text(*x, *y, text, *color, *align),
        }
    }
}

pub trait DrawingSurface {
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba, width: f32);
    fn polyline(&mut self, points: &[(i32, i32)], color: Rgba, width: f32);
    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba, filled: bool);
    fn circle(&mut self, x: i32, y: i32, r: i32, color: Rgba, filled: bool);
    fn text(&mut self, x: i32, y: i32, text: &str, color: Rgba, align: TextAlign);
    fn text_width(&self, text: &str) -> i32;
    fn text_height(&self) -> i32;
}

/// A surface that records primitives instead of painting them.
#[derive(Debug, Clone)]
pub struct Frame {
    pub primitives: Vec<Primitive>,
    char_width: i32,
    line_height: i32,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(7, 12)
    }
}

impl Frame {
    /// A recorder that measures text as fixed-width glyphs.
    pub fn new(char_width: i32, line_height: i32) -> Self {
        Self {
            primitives: Vec::new(),
            char_width,
            line_height,
        }
    }

    pub fn replay(&self, target: &mut dyn DrawingSurface) {
        for p in &self.primitives {
            p.paint(target);
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[(i32, i32)]> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

impl DrawingSurface for Frame {
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba, width: f32) {
        self.primitives.push(Primitive::Line { x0, y0, x1, y1, color, width });
    }

    fn polyline(&mut self, points: &[(i32, i32)], color: Rgba, width: f32) {
        if points.len() < 2 {
            return;
        }
        self.primitives.push(Primitive::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba, filled: bool) {
        self.primitives.push(Primitive::Rect { x, y, w, h, color, filled });
    }

    fn circle(&mut self, x: i32, y: i32, r: i32, color: Rgba, filled: bool) {
        self.primitives.push(Primitive::Circle { x, y, r, color, filled });
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: Rgba, align: TextAlign) {
        self.primitives.push(Primitive::Text {
            x,
            y,
            text: text.to_string(),
            color,
            align,
        });
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.char_width
    }

    fn text_height(&self) -> i32 {
        self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_records_and_replays() {
        let black = Rgba::rgb(0, 0, 0);
        let mut f = Frame::default();
        f.line(0, 0, 10, 10, black, 1.0);
        f.polyline(&[(0, 0)], black, 1.0);
        f.polyline(&[(0, 0), (5, 5)], black, 1.0);
        f.text(3, 4, "1.5", black, TextAlign::Centre);
        assert_eq!(f.primitives.len(), 3);
        assert_eq!(f.texts().collect::<Vec<_>>(), vec!["1.5"]);
        assert_eq!(f.text_width("1.5"), 21);

        let mut copy = Frame::default();
        f.replay(&mut copy);
        assert_eq!(copy.primitives, f.primitives);
        f.clear();
        assert!(f.primitives.is_empty());
    }
}
