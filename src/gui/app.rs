/// Desktop viewer: eframe::App around a `Panel` of demo spectra
///
/// Ties together the plot panel, its menu bar, the view log window and the
/// small edit box the panel asks for when a pin value is double-clicked.

use eframe::egui;

use crate::config::PlotSettings;
use crate::graph::{LinkMode, Panel, PanelNotice, WidgetKind};
use crate::gui::canvas::{self, CanvasState};
use crate::gui::demo::DemoSet;
use crate::gui::toolbar::{self, ToolbarAction, ToolbarContext};

const PLOT_FONT_SIZE: f32 = 12.0;

/// An open edit box for one widget's value.
struct WidgetEdit {
    widget: WidgetKind,
    text: String,
}

pub struct SpectraViewApp {
    panel: Panel,
    demo: DemoSet,
    canvas: CanvasState,
    status_message: String,
    widget_edit: Option<WidgetEdit>,
    show_log_window: bool,
    show_about: bool,
}

impl SpectraViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_settings(PlotSettings::default())
    }

    pub fn with_settings(settings: PlotSettings) -> Self {
        let demo = DemoSet::LinkedABC;
        let mut panel = Panel::new(demo.spectra(), settings);
        panel.link_spectra(demo.link_mode());
        Self {
            panel,
            demo,
            canvas: CanvasState::default(),
            status_message: format!("Showing {}", demo.label()),
            widget_edit: None,
            show_log_window: false,
            show_about: false,
        }
    }

    fn show_demo(&mut self, set: DemoSet) {
        let settings = self.panel.settings().clone();
        self.panel = Panel::new(set.spectra(), settings);
        self.panel.link_spectra(set.link_mode());
        self.demo = set;
        self.canvas = CanvasState::default();
        self.widget_edit = None;
        self.status_message = format!("Showing {}", set.label());
        log::info!("demo set: {}", set.label());
    }

    fn toolbar_context(&self) -> ToolbarContext {
        let gs = self.panel.current_graph_set();
        ToolbarContext {
            demo: self.demo,
            is_linked: self.panel.interaction().is_linked,
            can_split: gs.is_some_and(|g| g.n_spectra() > 1 && !g.is_2d()),
            is_split: gs.is_some_and(|g| g.n_split() > 1),
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::None => {}
            ToolbarAction::ShowDemo(set) => self.show_demo(set),
            ToolbarAction::LinkAll => {
                self.panel.link_spectra(LinkMode::All);
                if self.panel.interaction().is_linked {
                    self.status_message = format!("Linked ({})", self.panel.link_mode());
                } else {
                    self.status_message = "These spectra cannot be linked".to_string();
                }
            }
            ToolbarAction::Unlink => {
                self.panel.link_spectra(LinkMode::None);
                self.status_message = "Unlinked".to_string();
            }
            ToolbarAction::Split => self.panel.split_stack(true),
            ToolbarAction::Stack => self.panel.split_stack(false),
            ToolbarAction::PreviousView => self.panel.previous_view(),
            ToolbarAction::NextView => self.panel.next_view(),
            ToolbarAction::ResetView => self.panel.reset_view(),
            ToolbarAction::ClearViews => self.panel.clear_views(),
            ToolbarAction::LoadSettings => {
                if let Some(path) = toolbar::open_settings_dialog() {
                    match PlotSettings::load_json(&path) {
                        Ok(settings) => {
                            self.panel.set_settings(settings);
                            self.status_message = format!("Settings loaded: {}", path.display());
                        }
                        Err(e) => {
                            log::warn!("settings load failed: {}", e);
                            self.status_message = format!("Error loading settings: {}", e);
                        }
                    }
                }
            }
            ToolbarAction::SaveSettings => {
                if let Some(path) = toolbar::save_settings_dialog() {
                    self.status_message = match self.panel.settings().save_json(&path) {
                        Ok(()) => format!("Settings saved: {}", path.display()),
                        Err(e) => format!("Error saving settings: {}", e),
                    };
                }
            }
            ToolbarAction::ExportLog => self.export_log(),
            ToolbarAction::ShowLog => self.show_log_window = true,
            ToolbarAction::ShowAbout => self.show_about = true,
        }
    }

    fn export_log(&mut self) {
        let Some(path) = toolbar::save_log_dialog() else {
            return;
        };
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let result = match ext.as_str() {
            "json" => self.panel.view_log().save_json(&path),
            _ => self.panel.view_log().save_text(&path),
        };
        self.status_message = match result {
            Ok(()) => format!("Log saved: {}", path.display()),
            Err(e) => format!("Error saving log: {}", e),
        };
    }

    fn handle_notice(&mut self, notice: PanelNotice) {
        match notice {
            PanelNotice::EditWidget { widget, current } => {
                self.widget_edit = Some(WidgetEdit { widget, text: current });
            }
            PanelNotice::CloseSpectrum { title } => {
                if self.panel.close_spectrum(&title) {
                    self.status_message = format!("Closed {}", title);
                }
            }
            PanelNotice::PeakPicked { coord, peak } => {
                self.status_message = match (peak, coord) {
                    (Some(p), _) => format!("Peak: {}", p.title),
                    (None, Some(c)) => format!("x = {:.4}, y = {:.4}", c.x, c.y),
                    (None, None) => String::new(),
                };
            }
            PanelNotice::SubSpectrumChanged { index, y_2d } => {
                self.status_message = format!("Row {} (y = {:.3})", index + 1, y_2d);
            }
            PanelNotice::NoSubSpectra => {
                self.status_message = "This spectrum has no rows to step through".to_string();
            }
        }
    }

    fn show_widget_edit(&mut self, ctx: &egui::Context) {
        let Some(edit) = self.widget_edit.as_mut() else {
            return;
        };
        let mut submit = false;
        let mut cancel = false;
        egui::Window::new(format!("Set {}", edit.widget.name()))
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let field = ui.text_edit_singleline(&mut edit.text);
                if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });
        if submit {
            if let Some(edit) = self.widget_edit.take() {
                if let Err(e) = self.panel.set_widget_value(edit.widget, &edit.text) {
                    self.status_message = format!("Invalid value: {}", e);
                }
            }
        } else if cancel {
            self.widget_edit = None;
        }
    }
}

impl eframe::App for SpectraViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Menu bar ──
        let action = toolbar::show_toolbar(ctx, self.toolbar_context());
        self.handle_toolbar_action(action);

        // ── Status bar ──
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} spectra | link {}",
                    self.panel.n_spectra(),
                    self.panel.link_mode()
                ));
                ui.separator();
                ui.label(&self.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("📋 Log").clicked() {
                        self.show_log_window = !self.show_log_window;
                    }
                    ui.label(format!("{} log entries", self.panel.view_log().len()));
                });
            });
        });

        // ── Plot ──
        let mut notices = Vec::new();
        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                notices = canvas::show_canvas(ui, &mut self.panel, &mut self.canvas, PLOT_FONT_SIZE);
            });
        for n in notices {
            self.handle_notice(n);
        }

        self.show_widget_edit(ctx);

        // ── Log Window ──
        if self.show_log_window {
            let mut save_text = false;
            let mut save_json = false;
            egui::Window::new("📋 View Log")
                .open(&mut self.show_log_window)
                .default_size([600.0, 400.0])
                .resizable(true)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        save_text = ui.button("💾 Save as Text").clicked();
                        save_json = ui.button("💾 Save as JSON").clicked();
                    });
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.style_mut().override_font_id = Some(egui::FontId::monospace(12.0));
                        ui.label(self.panel.view_log().to_text());
                    });
                });
            if save_text || save_json {
                if let Some(path) = toolbar::save_log_dialog() {
                    let log = self.panel.view_log();
                    let result = if save_json { log.save_json(&path) } else { log.save_text(&path) };
                    if let Err(e) = result {
                        self.status_message = format!("Error saving log: {}", e);
                    }
                }
            }
        }

        // ── About Dialog ──
        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.heading("Spectra View");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(10.0);
                    ui.label("Drag to zoom, Ctrl-drag to integrate, click to measure.");
                    ui.label("Ctrl+Z / Ctrl+Y step back and forward through views.");
                    ui.label("Arrow keys move the pointer or step through rows.");
                });
        }

        // Keep the pointer line tracking while hovering
        if ctx.input(|i| i.pointer.is_moving()) {
            ctx.request_repaint();
        }
    }
}
