//! Pointer-driven selection over a placed chart.
//!
//! Selection is stored as grid coordinates, never as references into a
//! position grid, so it stays valid across layout passes. Call
//! [`Selection::resolve`] after an edit to drop cells that emptied.

use crate::limits;
use crate::model::{CellCoord, PositionGrid, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

impl PointerButton {
    /// DOM `MouseEvent.button` numbering.
    pub fn from_dom(v: i16) -> Option<PointerButton> {
        match v {
            0 => Some(PointerButton::Left),
            1 => Some(PointerButton::Middle),
            2 => Some(PointerButton::Right),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle, normalized so `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_corners(a: Vec2, b: Vec2) -> Rect {
        Rect {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
    /// Inclusive on every edge.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Stitched cells whose position lies inside `rect`, row-major.
pub fn hit_rect(pos: &PositionGrid, rect: Rect) -> Vec<CellCoord> {
    pos.nodes().filter(|p| rect.contains(p.point())).map(|p| p.coord()).collect()
}

/// Nearest stitched cell within `tol` of `(x, y)`.
pub fn pick(pos: &PositionGrid, x: f32, y: f32, tol: f32) -> Option<(CellCoord, f32)> {
    let tol2 = tol * tol;
    let mut best: Option<(CellCoord, f32)> = None;
    for n in pos.nodes() {
        let dx = n.x - x;
        let dy = n.y - y;
        let d2 = dx * dx + dy * dy;
        if d2 <= tol2 && best.map_or(true, |(_, bd)| d2 < bd) {
            best = Some((n.coord(), d2));
        }
    }
    best.map(|(at, d2)| (at, d2.sqrt()))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    cells: Vec<CellCoord>,
    drag: Option<(Vec2, Vec2)>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn contains(&self, at: CellCoord) -> bool {
        self.cells.contains(&at)
    }
    pub fn is_selecting(&self) -> bool {
        self.drag.is_some()
    }

    /// Rectangle being dragged, if a drag is in progress.
    pub fn drag_rect(&self) -> Option<Rect> {
        self.drag.map(|(a, b)| Rect::from_corners(a, b))
    }

    /// Starts a new rectangle on a left press and drops the old selection.
    /// Other buttons leave everything as is.
    pub fn press(&mut self, x: f32, y: f32, button: PointerButton) -> bool {
        if button != PointerButton::Left || !limits::in_coord_bounds(x) || !limits::in_coord_bounds(y) {
            return false;
        }
        let p = Vec2::new(x, y);
        self.drag = Some((p, p));
        self.cells.clear();
        true
    }

    pub fn drag(&mut self, x: f32, y: f32) -> bool {
        if !limits::in_coord_bounds(x) || !limits::in_coord_bounds(y) {
            return false;
        }
        match self.drag.as_mut() {
            Some((_, end)) => {
                *end = Vec2::new(x, y);
                true
            }
            None => false,
        }
    }

    /// Ends the drag and selects every stitch inside the rectangle. A
    /// release without movement selects the stitch under the pointer,
    /// looked up within `pick_tol`.
    pub fn release(&mut self, x: f32, y: f32, pos: &PositionGrid, pick_tol: f32) -> usize {
        let Some((start, mut end)) = self.drag.take() else { return 0 };
        if limits::in_coord_bounds(x) && limits::in_coord_bounds(y) {
            end = Vec2::new(x, y);
        }
        let rect = Rect::from_corners(start, end);
        self.cells = hit_rect(pos, rect);
        if self.cells.is_empty() && rect.width() < 1.0 && rect.height() < 1.0 {
            self.cells.extend(pick(pos, end.x, end.y, pick_tol).map(|(at, _)| at));
        }
        debug!(target: "stitchgrid.select", selected = self.cells.len(), w = rect.width(), h = rect.height(), "rect_select");
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.drag = None;
    }

    /// Replaces the selection with the given cells, keeping only stitched
    /// ones and the first occurrence of each.
    pub fn select_cells<I: IntoIterator<Item = CellCoord>>(&mut self, cells: I, pos: &PositionGrid) -> usize {
        self.cells.clear();
        for at in cells {
            if pos.get(at).is_some_and(|p| p.is_stitch()) && !self.cells.contains(&at) {
                self.cells.push(at);
            }
        }
        debug!(target: "stitchgrid.select", selected = self.cells.len(), "select_cells");
        self.cells.len()
    }

    /// Drops cells that no longer hold a stitch in `pos`.
    pub fn resolve(&mut self, pos: &PositionGrid) -> usize {
        self.cells.retain(|&at| pos.get(at).is_some_and(|p| p.is_stitch()));
        self.cells.len()
    }

    /// Secondary (right-click) action: hands the pointer position and the
    /// selected cells to `show_menu`, but only when something is selected.
    pub fn secondary_action<F: FnOnce(f32, f32, &[CellCoord])>(&self, x: f32, y: f32, show_menu: F) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        show_menu(x, y, &self.cells);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::layout::{layout, LayoutMode};
    use crate::parser::parse_pattern;

    fn chart() -> PositionGrid {
        // Row 0 at y = 95, row 1 at y = 50; columns at x = 50, 95, 140.
        layout(&parse_pattern("ch ch ch ch sc sc sc"), &ChartConfig::default(), LayoutMode::Linear)
    }

    #[test]
    fn drag_selects_inside_rect() {
        let pos = chart();
        let mut s = Selection::new();
        assert!(s.press(40.0, 40.0, PointerButton::Left));
        assert!(s.is_selecting());
        assert!(s.drag(100.0, 60.0));
        assert_eq!(s.release(100.0, 60.0, &pos, 15.0), 2);
        assert_eq!(s.cells(), &[CellCoord::new(1, 0), CellCoord::new(1, 1)]);
        assert!(!s.is_selecting());
    }

    #[test]
    fn reversed_drag_is_normalized() {
        let pos = chart();
        let mut s = Selection::new();
        s.press(200.0, 200.0, PointerButton::Left);
        assert_eq!(s.release(0.0, 0.0, &pos, 15.0), 6);
    }

    #[test]
    fn right_button_does_not_start() {
        let mut s = Selection::new();
        s.select_cells([CellCoord::new(0, 0)], &chart());
        assert!(!s.press(10.0, 10.0, PointerButton::Right));
        assert_eq!(s.len(), 1);
        assert!(!s.press(f32::NAN, 10.0, PointerButton::Left));
    }

    #[test]
    fn click_picks_nearest() {
        let pos = chart();
        let mut s = Selection::new();
        s.press(97.0, 93.0, PointerButton::Left);
        assert_eq!(s.release(97.0, 93.0, &pos, 15.0), 1);
        assert_eq!(s.cells(), &[CellCoord::new(0, 1)]);
        assert!(pick(&pos, 500.0, 500.0, 15.0).is_none());
    }

    #[test]
    fn select_cells_skips_holes() {
        let pos = chart();
        let mut s = Selection::new();
        let n = s.select_cells([CellCoord::new(0, 0), CellCoord::new(0, 3), CellCoord::new(0, 0), CellCoord::new(7, 7)], &pos);
        assert_eq!(n, 1);
    }

    #[test]
    fn context_menu_needs_selection() {
        let pos = chart();
        let mut s = Selection::new();
        let mut shown = None;
        assert!(!s.secondary_action(5.0, 6.0, |x, y, cells| shown = Some((x, y, cells.len()))));
        assert!(shown.is_none());
        s.select_cells([CellCoord::new(1, 2)], &pos);
        assert!(s.secondary_action(5.0, 6.0, |x, y, cells| shown = Some((x, y, cells.len()))));
        assert_eq!(shown, Some((5.0, 6.0, 1)));
    }
}
