use super::place_cells;
use crate::config::{ChartConfig, LinearDirection};
use crate::model::{Grid, PositionGrid};

/// Rows as horizontal lines. Row 0 sits on the baseline; every later
/// stitch takes its x from the cell below it in the previous row and
/// moves one row step away, so columns stay stacked.
pub fn place(grid: &Grid, cfg: &ChartConfig) -> PositionGrid {
    let col_step = cfg.column_step();
    let row_step = cfg.row_step();
    let total_height = grid.row_count().saturating_sub(1) as f32 * row_step;
    let (baseline, dy) = match cfg.linear_direction {
        LinearDirection::BottomUp => (cfg.y_start + total_height, -row_step),
        LinearDirection::TopDown => (cfg.y_start, row_step),
    };
    place_cells(grid, |r, c, stitch, prev| {
        let x = cfg.x_start + c as f32 * col_step;
        let y = baseline + r as f32 * dy;
        match (stitch, prev.and_then(|p| p.get(c))) {
            (Some(_), Some(below)) => (below.x, below.y + dy, None),
            _ => (x, y, None),
        }
    })
}
