//! Grid to canvas placement. All modes walk the grid in the same
//! row-major order and only differ in how a cell maps to a point.

pub mod linear;
pub mod physics;
pub mod round;

use crate::config::ChartConfig;
use crate::model::{Grid, Position, PositionGrid};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Flat rows, one column step per cell.
    #[default]
    Linear,
    /// Each row is a concentric round around the canvas center.
    Round,
    /// Force-directed relaxation seeded from the grid.
    Physics,
}

impl LayoutMode {
    pub fn from_u8(v: u8) -> Option<LayoutMode> {
        match v {
            0 => Some(LayoutMode::Linear),
            1 => Some(LayoutMode::Round),
            2 => Some(LayoutMode::Physics),
            _ => None,
        }
    }
}

/// Deterministic placement for the linear and round modes. Physics mode
/// returns the simulation's seed positions; relax them with
/// [`physics::PhysicsLayout`].
pub fn layout(grid: &Grid, cfg: &ChartConfig, mode: LayoutMode) -> PositionGrid {
    let out = match mode {
        LayoutMode::Linear => linear::place(grid, cfg),
        LayoutMode::Round => round::place(grid, cfg),
        LayoutMode::Physics => physics::PhysicsLayout::new(grid, cfg).positions(),
    };
    trace!(target: "stitchgrid.layout", ?mode, rows = out.rows.len(), nodes = out.node_count(), "layout");
    out
}

/// Shared traversal: visits every cell in row-major order with the row
/// already placed above it, and collects the resulting positions.
pub(crate) fn place_cells<F>(grid: &Grid, mut place: F) -> PositionGrid
where
    F: FnMut(usize, usize, Option<&str>, Option<&[Position]>) -> (f32, f32, Option<f32>),
{
    let mut rows: Vec<Vec<Position>> = Vec::with_capacity(grid.row_count());
    for (r, row) in grid.rows().iter().enumerate() {
        let mut out = Vec::with_capacity(row.len());
        for (c, cell) in row.iter().enumerate() {
            let prev = if r > 0 { rows.get(r - 1).map(Vec::as_slice) } else { None };
            let (x, y, theta) = place(r, c, cell.as_deref(), prev);
            out.push(Position { row: r, col: c, x, y, stitch: cell.clone(), theta });
        }
        rows.push(out);
    }
    PositionGrid { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pattern;

    #[test]
    fn every_mode_keeps_grid_shape() {
        let g = parse_pattern("ch ch ch ch sc sc sc ch dc dc dc");
        let cfg = ChartConfig::default();
        for mode in [LayoutMode::Linear, LayoutMode::Round, LayoutMode::Physics] {
            let p = layout(&g, &cfg, mode);
            assert_eq!(p.rows.len(), g.row_count(), "{:?}", mode);
            assert!(p.rows.iter().all(|r| r.len() == g.width()));
            assert_eq!(p.node_count(), g.stitch_count());
            for (r, row) in p.rows.iter().enumerate() {
                for (c, pos) in row.iter().enumerate() {
                    assert_eq!((pos.row, pos.col), (r, c));
                }
            }
        }
    }

    #[test]
    fn empty_grid_empty_positions() {
        let cfg = ChartConfig::default();
        assert!(layout(&Grid::new(), &cfg, LayoutMode::Linear).is_empty());
        assert!(layout(&Grid::new(), &cfg, LayoutMode::Round).is_empty());
        assert!(layout(&Grid::new(), &cfg, LayoutMode::Physics).is_empty());
    }
}
