/// egui painter adapter for the plot engine's drawing surface

use super::{DrawingSurface, TextAlign};
use crate::config::Rgba;

pub fn to_color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.0, c.1, c.2, c.3)
}

/// Paints engine primitives with an egui painter. Engine pixels are
/// offsets from `origin` (the top-left of the allocated canvas).
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    font: egui::FontId,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2, font_size: f32) -> Self {
        Self {
            painter,
            origin,
            font: egui::FontId::proportional(font_size),
        }
    }

    fn pos(&self, x: i32, y: i32) -> egui::Pos2 {
        egui::pos2(self.origin.x + x as f32, self.origin.y + y as f32)
    }
}

impl DrawingSurface for EguiSurface<'_> {
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba, width: f32) {
        self.painter.line_segment(
            [self.pos(x0, y0), self.pos(x1, y1)],
            egui::Stroke::new(width, to_color32(color)),
        );
    }

    fn polyline(&mut self, points: &[(i32, i32)], color: Rgba, width: f32) {
        if points.len() < 2 {
            return;
        }
        let pts: Vec<egui::Pos2> = points.iter().map(|&(x, y)| self.pos(x, y)).collect();
        self.painter
            .add(egui::Shape::line(pts, egui::Stroke::new(width, to_color32(color))));
    }

    fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba, filled: bool) {
        let r = egui::Rect::from_min_size(self.pos(x, y), egui::vec2(w as f32, h as f32));
        if filled {
            self.painter.rect_filled(r, 0.0, to_color32(color));
        } else {
            self.painter.rect_stroke(
                r,
                0.0,
                egui::Stroke::new(1.0, to_color32(color)),
                egui::epaint::StrokeKind::Inside,
            );
        }
    }

    fn circle(&mut self, x: i32, y: i32, r: i32, color: Rgba, filled: bool) {
        let c = to_color32(color);
        if filled {
            self.painter.circle_filled(self.pos(x, y), r as f32, c);
        } else {
            self.painter
                .circle_stroke(self.pos(x, y), r as f32, egui::Stroke::new(1.0, c));
        }
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: Rgba, align: TextAlign) {
        let anchor = match align {
            TextAlign::Left => egui::Align2::LEFT_BOTTOM,
            TextAlign::Centre => egui::Align2::CENTER_BOTTOM,
            TextAlign::Right => egui::Align2::RIGHT_BOTTOM,
        };
        self.painter
            .text(self.pos(x, y), anchor, text, self.font.clone(), to_color32(color));
    }

    fn text_width(&self, text: &str) -> i32 {
        let galley = self
            .painter
            .layout_no_wrap(text.to_string(), self.font.clone(), egui::Color32::BLACK);
        galley.size().x.ceil() as i32
    }

    fn text_height(&self) -> i32 {
        self.font.size.ceil() as i32
    }
}
