/// Linear undo/redo stack of committed views

use crate::scale::ViewData;

#[derive(Debug, Clone)]
pub struct ZoomHistory {
    views: Vec<ViewData>,
    cursor: usize,
}

impl ZoomHistory {
    /// A history holding only the full-extent view.
    pub fn new(first: ViewData) -> Self {
        Self {
            views: vec![first],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn first(&self) -> &ViewData {
        &self.views[0]
    }

    pub fn get(&self, i: usize) -> Option<&ViewData> {
        self.views.get(i)
    }

    /// Drop every view past the cursor, then append `view` and point at it.
    pub fn push(&mut self, view: ViewData) {
        self.views.truncate(self.cursor + 1);
        self.views.push(view);
        self.cursor = self.views.len() - 1;
    }

    /// Move the cursor to `i` and return that view, or `None` if out of range.
    pub fn go_to(&mut self, i: usize) -> Option<&ViewData> {
        if i >= self.views.len() {
            return None;
        }
        self.cursor = i;
        self.views.get(i)
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.views.len()
    }

    /// Keep only the first view.
    pub fn truncate_to_first(&mut self) {
        self.views.truncate(1);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Coordinate, Nucleus, Spectrum};

    fn view(lo: usize, hi: usize) -> ViewData {
        let coords = (0..50).map(|i| Coordinate::new(i as f64, (i % 5) as f64)).collect();
        let spec = Spectrum::new_nmr_1d("h", Nucleus::H1, 400.0, coords);
        ViewData::new(&[spec], 0.0, 0.0, &[lo], &[hi], true, false)
    }

    #[test]
    fn test_push_truncates_future() {
        let mut h = ZoomHistory::new(view(0, 49));
        h.push(view(5, 40));
        h.push(view(10, 30));
        assert_eq!(h.len(), 3);
        assert_eq!(h.go_to(0).map(|v| v.start_index(0)), Some(0));
        h.push(view(20, 25));
        assert_eq!(h.len(), 2);
        assert_eq!(h.cursor(), 1);
        assert_eq!(h.get(1).map(|v| v.start_index(0)), Some(20));
    }

    #[test]
    fn test_navigation_bounds() {
        let mut h = ZoomHistory::new(view(0, 49));
        assert!(!h.has_previous());
        assert!(!h.has_next());
        assert!(h.go_to(3).is_none());
        h.push(view(1, 48));
        assert!(h.has_previous());
        h.go_to(0);
        assert!(h.has_next());
        h.truncate_to_first();
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
    }
}
