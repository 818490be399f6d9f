/// Plot settings: margins, display toggles and colours for a panel
///
/// Settings are plain serde data so a host can persist them as JSON
/// between sessions.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An RGBA colour, stored as raw bytes so settings stay toolkit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Rgba(self.0, self.1, self.2, a)
    }
}

/// Frame margins in pixels around each plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 60,
            right: 50,
            top: 40,
            bottom: 50,
        }
    }
}

/// Role colours used by the primitive generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Rgba,
    pub plot_area: Rgba,
    pub grid: Rgba,
    pub scale: Rgba,
    pub units: Rgba,
    pub title: Rgba,
    pub zoom_box: Rgba,
    /// Zoom box while shift is held (x and y zoom).
    pub zoom_box_shift: Rgba,
    pub highlight: Rgba,
    pub peak_tab: Rgba,
    pub integral: Rgba,
    pub measurement: Rgba,
    pub black: Rgba,
    pub grey: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(255, 255, 255),
            plot_area: Rgba::rgb(255, 255, 255),
            grid: Rgba::rgb(190, 190, 190),
            scale: Rgba::rgb(0, 0, 0),
            units: Rgba::rgb(200, 0, 0),
            title: Rgba::rgb(0, 0, 0),
            zoom_box: Rgba::rgb(150, 150, 100).with_alpha(96),
            zoom_box_shift: Rgba::rgb(200, 200, 150).with_alpha(96),
            highlight: Rgba::rgb(255, 0, 0).with_alpha(48),
            peak_tab: Rgba::rgb(255, 0, 0),
            integral: Rgba::rgb(255, 0, 0),
            measurement: Rgba::rgb(0, 0, 255),
            black: Rgba::rgb(0, 0, 0),
            grey: Rgba::rgb(128, 128, 128),
        }
    }
}

/// Default per-spectrum trace colours, cycled when more spectra are loaded.
pub const DEFAULT_PLOT_COLORS: [Rgba; 10] = [
    Rgba::rgb(0, 0, 255),
    Rgba::rgb(255, 0, 255),
    Rgba::rgb(0, 170, 0),
    Rgba::rgb(210, 105, 30),
    Rgba::rgb(0, 160, 160),
    Rgba::rgb(255, 128, 0),
    Rgba::rgb(128, 0, 128),
    Rgba::rgb(128, 128, 0),
    Rgba::rgb(200, 0, 0),
    Rgba::rgb(0, 0, 128),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    pub margins: Margins,
    pub grid_on: bool,
    pub x_scale_on: bool,
    pub y_scale_on: bool,
    pub x_units_on: bool,
    pub y_units_on: bool,
    pub title_on: bool,
    pub peak_tabs_on: bool,
    pub enable_zoom: bool,
    /// Show 1D slices alongside a 2D image in the same pane.
    pub display_1d: bool,
    /// Vertical offset between stacked traces, as a percentage of plot height.
    pub y_stack_offset_percent: i32,
    pub plot_colors: Vec<Rgba>,
    pub palette: Palette,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            grid_on: true,
            x_scale_on: true,
            y_scale_on: true,
            x_units_on: true,
            y_units_on: true,
            title_on: true,
            peak_tabs_on: true,
            enable_zoom: true,
            display_1d: false,
            y_stack_offset_percent: 0,
            plot_colors: DEFAULT_PLOT_COLORS.to_vec(),
            palette: Palette::default(),
        }
    }
}

impl PlotSettings {
    /// Colour for spectrum `index`; entries past the configured list are
    /// derived from the index so distinct spectra never alias one slot.
    pub fn plot_color(&self, index: usize) -> Rgba {
        if let Some(c) = self.plot_colors.get(index) {
            return *c;
        }
        let base = DEFAULT_PLOT_COLORS[index % DEFAULT_PLOT_COLORS.len()];
        let shade = ((index / DEFAULT_PLOT_COLORS.len()) * 37 % 96) as u8;
        Rgba::rgb(
            base.0.saturating_sub(shade),
            base.1.saturating_sub(shade),
            base.2.saturating_sub(shade),
        )
    }

    /// An owned colour vector sized to `n` spectra.
    pub fn plot_colors_for(&self, n: usize) -> Vec<Rgba> {
        (0..n).map(|i| self.plot_color(i)).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&text)?;
        log::info!("Loaded plot settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved plot settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = PlotSettings::default();
        assert_eq!(s.margins.left, 60);
        assert!(s.enable_zoom);
        assert_eq!(s.plot_colors.len(), 10);
    }

    #[test]
    fn test_plot_colors_are_owned_and_sized() {
        let s = PlotSettings::default();
        let colors = s.plot_colors_for(13);
        assert_eq!(colors.len(), 13);
        assert_eq!(colors[0], DEFAULT_PLOT_COLORS[0]);
        // wrapped entries are shaded, not aliased
        assert_ne!(colors[10], colors[0]);
    }

    #[test]
    fn test_json_roundtrip_preserves_settings() {
        let mut s = PlotSettings::default();
        s.grid_on = false;
        s.y_stack_offset_percent = 15;
        let parsed = PlotSettings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("spectra_view_{}.json", uuid::Uuid::new_v4()));
        let s = PlotSettings::default();
        s.save_json(&path).unwrap();
        let loaded = PlotSettings::load_json(&path).unwrap();
        assert_eq!(loaded, s);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(PlotSettings::from_json("{not json").is_err());
    }
}
