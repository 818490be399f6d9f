/// Tracks which spectrum of a pane group is hovered, clicked and active

use std::collections::BTreeSet;

/// The spectrum that scaling and annotation lookups apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Active {
    /// Every spectrum of the group (all drawn, none singled out).
    All,
    Spectrum(usize),
    /// A peak-pick referenced a spectrum that lives in another group:
    /// this group draws no traces at all.
    NoPlot,
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    hover: Option<usize>,
    clicked: Option<usize>,
    previous_clicked: Option<usize>,
    active: Active,
    /// Non-clicked spectra are drawn grey while a stacked click is live.
    pub stack_selected: bool,
    /// Data x of the last click in the plot, NaN when none.
    pub last_click_x: f64,
    pub last_pixel_x: i32,
    multi: BTreeSet<usize>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            hover: None,
            clicked: None,
            previous_clicked: None,
            active: Active::All,
            stack_selected: false,
            last_click_x: f64::NAN,
            last_pixel_x: i32::MAX,
            multi: BTreeSet::new(),
        }
    }
}

impl SelectionState {
    pub fn new(n_spectra: usize) -> Self {
        Self {
            multi: (0..n_spectra).collect(),
            ..Default::default()
        }
    }

    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    pub fn clicked(&self) -> Option<usize> {
        self.clicked
    }

    pub fn previous_clicked(&self) -> Option<usize> {
        self.previous_clicked
    }

    pub fn active(&self) -> Active {
        self.active
    }

    pub fn active_index(&self) -> Option<usize> {
        match self.active {
            Active::Spectrum(i) => Some(i),
            _ => None,
        }
    }

    /// Active index, or 0 when all or none are active.
    pub fn fixed_index(&self) -> usize {
        self.active_index().unwrap_or(0)
    }

    pub fn is_no_plot(&self) -> bool {
        self.active == Active::NoPlot
    }

    /// Remember a spectrum picked on the trace itself, so a later
    /// double-click or shift-drag can restore it.
    pub fn set_previous_clicked(&mut self, i: usize) {
        self.previous_clicked = Some(i);
    }

    pub fn set_hover(&mut self, i: Option<usize>) {
        self.hover = i;
    }

    /// Returns true when the active spectrum changed, in which case the
    /// caller must refit the current scale.
    pub fn set_active(&mut self, active: Active) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }

    /// Record a click on spectrum `i` (`None` clears it). A change of
    /// spectrum forgets the last click position. Returns true when the
    /// active spectrum changed.
    pub fn set_clicked(&mut self, i: Option<usize>, show_all_stacked: bool) -> bool {
        self.stack_selected = show_all_stacked;
        if i.is_none() || self.clicked != i {
            self.last_click_x = f64::NAN;
            self.last_pixel_x = i32::MAX;
        }
        self.hover = i;
        self.clicked = i;
        self.set_active(i.map(Active::Spectrum).unwrap_or(Active::All))
    }

    // ── Multi-select ──

    pub fn multi(&self) -> &BTreeSet<usize> {
        &self.multi
    }

    /// Replace the multi-selection with `{i}` (or everything for `None`).
    /// Returns the single selected index when exactly one remains.
    pub fn set_multi(&mut self, i: Option<usize>, n_spectra: usize) -> Option<usize> {
        self.multi.clear();
        match i {
            Some(i) if i < n_spectra => {
                self.multi.insert(i);
            }
            Some(_) => {}
            None => self.multi.extend(0..n_spectra),
        }
        if self.multi.len() == 1 {
            self.multi.iter().next().copied()
        } else {
            None
        }
    }
}
