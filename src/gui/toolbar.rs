/// Menu bar for the viewer window and its file pickers

use std::path::PathBuf;

use eframe::egui;

use super::demo::DemoSet;

/// Actions that can be triggered from the menu bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    ShowDemo(DemoSet),
    LinkAll,
    Unlink,
    Split,
    Stack,
    PreviousView,
    NextView,
    ResetView,
    ClearViews,
    LoadSettings,
    SaveSettings,
    ExportLog,
    ShowLog,
    ShowAbout,
}

/// What the menus need to know to label and enable their entries.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarContext {
    pub demo: DemoSet,
    pub is_linked: bool,
    pub can_split: bool,
    pub is_split: bool,
}

fn item(ui: &mut egui::Ui, enabled: bool, label: &str, on: ToolbarAction, action: &mut ToolbarAction) {
    if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
        *action = on;
        ui.close_menu();
    }
}

/// Render the menu bar and return any triggered action
pub fn show_toolbar(ctx: &egui::Context, tc: ToolbarContext) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("📁 File", |ui| {
                ui.label(egui::RichText::new("Demo spectra").small().weak());
                for set in DemoSet::ALL {
                    if ui.radio(tc.demo == set, set.label()).clicked() {
                        action = ToolbarAction::ShowDemo(set);
                        ui.close_menu();
                    }
                }
                ui.separator();
                item(ui, true, "📂 Load Settings…", ToolbarAction::LoadSettings, &mut action);
                item(ui, true, "💾 Save Settings…", ToolbarAction::SaveSettings, &mut action);
                ui.separator();
                item(ui, true, "📋 Export Log…", ToolbarAction::ExportLog, &mut action);
            });

            ui.menu_button("🔍 View", |ui| {
                item(ui, true, "⬅ Previous View", ToolbarAction::PreviousView, &mut action);
                item(ui, true, "➡ Next View", ToolbarAction::NextView, &mut action);
                item(ui, true, "🔄 Reset View", ToolbarAction::ResetView, &mut action);
                item(ui, true, "🗑 Clear Views", ToolbarAction::ClearViews, &mut action);
                ui.separator();
                item(ui, tc.can_split && !tc.is_split, "Split", ToolbarAction::Split, &mut action);
                item(ui, tc.is_split, "Stack", ToolbarAction::Stack, &mut action);
                ui.separator();
                if tc.is_linked {
                    item(ui, true, "🔗 Unlink", ToolbarAction::Unlink, &mut action);
                } else {
                    item(ui, true, "🔗 Link All", ToolbarAction::LinkAll, &mut action);
                }
                ui.separator();
                item(ui, true, "📋 View Log", ToolbarAction::ShowLog, &mut action);
            });

            ui.menu_button("❓ Help", |ui| {
                item(ui, true, "ℹ About", ToolbarAction::ShowAbout, &mut action);
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(tc.demo.label())
                        .color(egui::Color32::from_rgb(0x70, 0x75, 0x80))
                        .size(12.0),
                );
            });
        });
    });

    action
}

/// Show file-open dialog for plot settings
pub fn open_settings_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Load Plot Settings")
        .add_filter("JSON", &["json"])
        .pick_file()
}

pub fn save_settings_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Save Plot Settings")
        .add_filter("JSON", &["json"])
        .set_file_name("plot_settings.json")
        .save_file()
}

/// Show save dialog for log export
pub fn save_log_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export View Log")
        .add_filter("Text File", &["txt"])
        .add_filter("JSON", &["json"])
        .save_file()
}
