//! In-place grid edits. Every function addresses cells by coordinate and
//! quietly skips empty or out-of-range ones; callers re-run layout after.

use crate::config::ChartConfig;
use crate::error::{Error, Result};
use crate::model::{is_valid_token, CellCoord, Color, ColorMap, Grid};
use tracing::debug;

/// Empties the given cells and drops their color overrides.
pub fn delete_cells(grid: &mut Grid, colors: &mut ColorMap, cells: &[CellCoord]) -> usize {
    let mut n = 0;
    for &at in cells {
        if grid.get(at).is_some() && grid.set(at, None) {
            n += 1;
        }
    }
    colors.retain_populated(grid);
    debug!(target: "stitchgrid.edit", op = "delete", requested = cells.len(), changed = n);
    n
}

/// Copies each selected stitch into the first empty slot in row-major
/// order. Copies carry no color override. Stops once the grid is full.
pub fn duplicate_cells(grid: &mut Grid, cells: &[CellCoord]) -> usize {
    let tokens: Vec<String> = cells.iter().filter_map(|&at| grid.get(at).map(str::to_string)).collect();
    let mut n = 0;
    for token in tokens {
        let Some(slot) = grid.first_empty() else { break };
        grid.set(slot, Some(token));
        n += 1;
    }
    debug!(target: "stitchgrid.edit", op = "duplicate", requested = cells.len(), changed = n);
    n
}

/// Overwrites every selected stitch with `token`.
pub fn retype_cells(grid: &mut Grid, cells: &[CellCoord], token: &str) -> Result<usize> {
    if !is_valid_token(token) {
        return Err(Error::InvalidStitch(token.to_string()));
    }
    let mut n = 0;
    for &at in cells {
        if grid.get(at).is_some_and(|cur| cur != token) && grid.set(at, Some(token.to_string())) {
            n += 1;
        }
    }
    debug!(target: "stitchgrid.edit", op = "retype", token, requested = cells.len(), changed = n);
    Ok(n)
}

/// Type after `current` in `cycle`, wrapping at the end. Unknown types
/// restart the cycle.
pub fn next_in_cycle(cycle: &[String], current: &str) -> Option<String> {
    if cycle.is_empty() {
        return None;
    }
    let next = match cycle.iter().position(|t| t == current) {
        Some(i) => (i + 1) % cycle.len(),
        None => 0,
    };
    Some(cycle[next].clone())
}

/// Type the cycle policy picks for a selection: the successor of the first
/// selected stitch's type in `[ch, sc, dc, ...custom]`.
pub fn cycled_type(grid: &Grid, cells: &[CellCoord], cfg: &ChartConfig) -> Option<String> {
    let current = cells.iter().find_map(|&at| grid.get(at))?;
    next_in_cycle(&cfg.stitch_cycle(), current)
}

/// Sets a color override on every selected stitch. Empty cells are skipped.
pub fn color_cells(grid: &Grid, colors: &mut ColorMap, cells: &[CellCoord], color: Color) -> usize {
    let mut n = 0;
    for &at in cells {
        if grid.get(at).is_some() {
            colors.insert(at, color);
            n += 1;
        }
    }
    debug!(target: "stitchgrid.edit", op = "color", color = %color.to_hex(), requested = cells.len(), changed = n);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pattern;
    use crate::serialize::grid_to_pattern;

    #[test]
    fn delete_prunes_colors() {
        let mut g = parse_pattern("ch ch ch ch sc sc sc");
        let mut colors = ColorMap::new();
        let at = CellCoord::new(1, 1);
        colors.insert(at, Color::BLACK);
        assert_eq!(delete_cells(&mut g, &mut colors, &[at, CellCoord::new(9, 9)]), 1);
        assert_eq!(g.get(at), None);
        assert!(colors.is_empty());
        assert_eq!(delete_cells(&mut g, &mut colors, &[]), 0);
    }

    #[test]
    fn duplicate_fills_first_holes() {
        let mut g = parse_pattern("ch ch ch ch sc sc sc");
        let before = g.stitch_count();
        let n = duplicate_cells(&mut g, &[CellCoord::new(1, 0), CellCoord::new(0, 3)]);
        assert_eq!(n, 1);
        assert_eq!(g.stitch_count(), before + 1);
        assert_eq!(g.get(CellCoord::new(0, 3)), Some("sc"));
    }

    #[test]
    fn duplicate_stops_when_full() {
        let mut g = Grid::from_rows(vec![vec![Some("sc".into()), None]]);
        let n = duplicate_cells(&mut g, &[CellCoord::new(0, 0), CellCoord::new(0, 0)]);
        assert_eq!(n, 1);
        assert_eq!(grid_to_pattern(&g), "sc sc");
    }

    #[test]
    fn cycle_walks_types() {
        let cycle: Vec<String> = ["ch", "sc", "dc", "puff"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_in_cycle(&cycle, "ch").as_deref(), Some("sc"));
        assert_eq!(next_in_cycle(&cycle, "puff").as_deref(), Some("ch"));
        assert_eq!(next_in_cycle(&cycle, "tr").as_deref(), Some("ch"));
        assert_eq!(next_in_cycle(&[], "ch"), None);
    }

    #[test]
    fn cycle_starts_from_first_stitch() {
        let g = parse_pattern("ch ch ch ch sc dc sc");
        let cfg = ChartConfig::default();
        let cells = [CellCoord::new(0, 3), CellCoord::new(1, 2), CellCoord::new(1, 1)];
        assert_eq!(cycled_type(&g, &cells, &cfg).as_deref(), Some("dc"));
        assert_eq!(cycled_type(&g, &[], &cfg), None);
    }

    #[test]
    fn retype_rejects_bad_tokens() {
        let mut g = parse_pattern("ch ch ch ch sc sc sc");
        assert!(matches!(retype_cells(&mut g, &[CellCoord::new(1, 0)], "two words"), Err(Error::InvalidStitch(_))));
        assert_eq!(retype_cells(&mut g, &[CellCoord::new(1, 0), CellCoord::new(0, 3)], "dc").unwrap(), 1);
        assert_eq!(g.get(CellCoord::new(1, 0)), Some("dc"));
    }

    #[test]
    fn color_skips_holes() {
        let g = parse_pattern("ch ch ch ch sc sc sc");
        let mut colors = ColorMap::new();
        let red = Color::rgb(255, 0, 0);
        assert_eq!(color_cells(&g, &mut colors, &[CellCoord::new(0, 0), CellCoord::new(0, 3)], red), 1);
        assert_eq!(colors.get(CellCoord::new(0, 0)), Some(red));
        assert_eq!(colors.len(), 1);
    }
}
