/// Plot canvas: routes egui pointer and key input into a `Panel` and paints it

use eframe::egui;

use crate::graph::{Panel, PanelKey, PanelNotice};
use crate::render::egui_surface::EguiSurface;

/// Pointer bookkeeping that egui does not keep for us between frames.
#[derive(Debug, Default)]
pub struct CanvasState {
    /// A primary press started on the canvas and has not been released.
    pressed: bool,
    /// The pointer moved while pressed, so the release is not a click.
    dragged: bool,
    /// The pointer was over the canvas last frame.
    inside: bool,
    last_pos: Option<(i32, i32)>,
}

pub fn panel_key(key: egui::Key) -> Option<PanelKey> {
    let k = match key {
        egui::Key::Escape => PanelKey::Escape,
        egui::Key::Delete => PanelKey::Delete,
        egui::Key::Backspace => PanelKey::Backspace,
        egui::Key::ArrowLeft => PanelKey::Left,
        egui::Key::ArrowRight => PanelKey::Right,
        egui::Key::ArrowUp => PanelKey::Up,
        egui::Key::ArrowDown => PanelKey::Down,
        egui::Key::PageUp => PanelKey::PageUp,
        egui::Key::PageDown => PanelKey::PageDown,
        egui::Key::Plus | egui::Key::Equals => PanelKey::Plus,
        egui::Key::Minus => PanelKey::Minus,
        egui::Key::Z => PanelKey::Z,
        egui::Key::Y => PanelKey::Y,
        _ => return None,
    };
    Some(k)
}

fn to_panel(p: egui::Pos2, origin: egui::Pos2) -> (i32, i32) {
    ((p.x - origin.x).round() as i32, (p.y - origin.y).round() as i32)
}

/// Fill the available space with the panel, feed it this frame's input and
/// return whatever the panel asked its host to do.
pub fn show_canvas(ui: &mut egui::Ui, panel: &mut Panel, state: &mut CanvasState, font_size: f32) -> Vec<PanelNotice> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let rect = response.rect;
    panel.set_size(rect.width().round() as i32, rect.height().round() as i32);

    let (modifiers, pressed, released, keys) = ui.input(|i| {
        let keys: Vec<(egui::Key, egui::Modifiers)> = i
            .events
            .iter()
            .filter_map(|e| match e {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => Some((*key, *modifiers)),
                _ => None,
            })
            .collect();
        (
            i.modifiers,
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            keys,
        )
    });
    let ctrl = modifiers.ctrl || modifiers.command;
    panel.set_modifiers(ctrl, modifiers.shift);

    // ── Pointer ──
    let pos = response
        .interact_pointer_pos()
        .or_else(|| response.hover_pos())
        .map(|p| to_panel(p, rect.min));

    if let Some((x, y)) = pos {
        if pressed && response.hovered() {
            state.pressed = true;
            state.dragged = false;
            panel.mouse_pressed(x, y);
        } else if state.pressed && !released && state.last_pos != Some((x, y)) {
            state.dragged = true;
            panel.mouse_dragged(x, y);
        } else if !state.pressed && state.last_pos != Some((x, y)) {
            panel.mouse_moved(x, y);
        }
        if released && state.pressed {
            panel.mouse_released(x, y);
            if !state.dragged {
                panel.mouse_clicked(x, y, ctrl);
            }
            state.pressed = false;
            state.dragged = false;
        }
        state.inside = true;
        state.last_pos = Some((x, y));
    } else {
        if released && state.pressed {
            state.pressed = false;
            state.dragged = false;
        }
        if state.inside {
            panel.mouse_moved(i32::MAX, 0);
            state.inside = false;
            state.last_pos = None;
        }
    }

    // ── Keys ──
    if response.hovered() || response.has_focus() {
        for (key, m) in keys {
            if let Some(k) = panel_key(key) {
                panel.key_pressed(k, m.ctrl || m.command);
            }
        }
    }

    // ── Paint ──
    let mut surface = EguiSurface::new(&painter, rect.min, font_size);
    panel.draw(&mut surface);

    panel.take_notices()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_key_mapping() {
        assert_eq!(panel_key(egui::Key::Escape), Some(PanelKey::Escape));
        assert_eq!(panel_key(egui::Key::ArrowLeft), Some(PanelKey::Left));
        assert_eq!(panel_key(egui::Key::Equals), Some(PanelKey::Plus));
        assert_eq!(panel_key(egui::Key::Z), Some(PanelKey::Z));
        assert_eq!(panel_key(egui::Key::A), None);
    }

    #[test]
    fn test_to_panel_is_relative_to_origin() {
        let p = to_panel(egui::pos2(110.4, 52.6), egui::pos2(10.0, 20.0));
        assert_eq!(p, (100, 33));
    }
}
