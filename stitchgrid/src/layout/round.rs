use super::place_cells;
use crate::config::ChartConfig;
use crate::geometry::polar;
use crate::model::{Grid, PositionGrid, Vec2};

/// Rows as concentric rounds. Round `r` sits on radius
/// `(r + 1) * round_spacing`; its stitches share the configured total
/// angle evenly, starting at 12 o'clock. Empty cells are placeholders at
/// the origin.
pub fn place(grid: &Grid, cfg: &ChartConfig) -> PositionGrid {
    let (cx, cy) = cfg.center();
    let center = Vec2::new(cx, cy);
    let counts: Vec<usize> = grid.rows().iter().map(|r| r.iter().flatten().count()).collect();
    let mut row_seen = usize::MAX;
    let mut index = 0usize;
    place_cells(grid, |r, _c, stitch, _prev| {
        if r != row_seen {
            row_seen = r;
            index = 0;
        }
        if stitch.is_none() {
            return (0.0, 0.0, Some(0.0));
        }
        let radius = (r + 1) as f32 * cfg.round_spacing;
        let step = cfg.round_total_angle / counts[r].max(1) as f32;
        let theta = index as f32 * step - 90.0;
        index += 1;
        let p = polar(center, radius, theta);
        (p.x, p.y, Some(theta))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellCoord;
    use crate::parser::parse_pattern;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn first_stitch_at_twelve_oclock() {
        let g = parse_pattern("ch ch ch ch ch");
        let p = place(&g, &ChartConfig::default());
        let first = p.get(CellCoord::new(0, 0)).unwrap();
        assert!(approx(first.x, 400.0) && approx(first.y, 300.0 - 50.0));
        assert_eq!(first.theta, Some(-90.0));
        // Five stitches around a full circle: 72 degrees apart.
        assert_eq!(p.get(CellCoord::new(0, 1)).unwrap().theta, Some(-18.0));
    }

    #[test]
    fn holes_do_not_take_angle() {
        let mut g = parse_pattern("ch ch ch ch ch");
        g.set(CellCoord::new(0, 1), None);
        let cfg = ChartConfig { round_total_angle: 180.0, ..ChartConfig::default() };
        let p = place(&g, &cfg);
        let hole = p.get(CellCoord::new(0, 1)).unwrap();
        assert_eq!((hole.x, hole.y, hole.stitch.as_deref()), (0.0, 0.0, None));
        assert_eq!(p.get(CellCoord::new(0, 2)).unwrap().theta, Some(-45.0));
    }

    #[test]
    fn radius_grows_per_round() {
        let g = parse_pattern("ch ch sc sc sc sc");
        let p = place(&g, &ChartConfig::default());
        let n = p.nodes().find(|n| n.row == 1).unwrap();
        let r = ((n.x - 400.0).powi(2) + (n.y - 300.0).powi(2)).sqrt();
        assert!(approx(r, 100.0));
    }
}
