use crate::model::{Grid, CHAIN};
use tracing::trace;

/// Regenerates pattern text from a grid, the inverse of `parse_pattern`.
///
/// Empty rows are skipped. Every row after row 0 is prefixed with the
/// turning chain the parser dropped, and stitches are emitted in working
/// order. Exact for parser-produced grids; hand-edited grids with holes
/// serialize to the closest re-parseable pattern.
pub fn grid_to_pattern(grid: &Grid) -> String {
    let mut pattern: Vec<String> = Vec::new();
    for (row_index, row) in grid.rows().iter().enumerate() {
        let Some(start) = row.iter().position(Option::is_some) else {
            continue;
        };
        let end = row.iter().rposition(Option::is_some).unwrap_or(start);
        let mut tokens: Vec<&str> = Vec::with_capacity(end - start + 2);
        if row_index != 0 {
            tokens.push(CHAIN);
        }
        let span = row[start..=end].iter().filter_map(|c| c.as_deref());
        if row_index % 2 == 0 {
            tokens.extend(span);
        } else {
            tokens.extend(span.rev());
        }
        pattern.push(tokens.join(" "));
    }
    let out = pattern.join(" ");
    trace!(target: "stitchgrid.serialize", rows = grid.row_count(), emitted = pattern.len(), "grid_to_pattern");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellCoord;
    use crate::parser::parse_pattern;

    #[test]
    fn round_trip_three_rows() {
        let p = "ch ch ch ch sc sc sc ch sc sc sc";
        let g = parse_pattern(p);
        assert_eq!(grid_to_pattern(&g), p);
    }

    #[test]
    fn odd_rows_read_right_to_left() {
        let g = parse_pattern("ch ch ch dc sc ch hdc tr");
        // Row 1 is placed leftward, so its columns hold sc, dc from left.
        assert_eq!(g.get(CellCoord::new(1, 0)), Some("sc"));
        assert_eq!(grid_to_pattern(&g), "ch ch ch dc sc ch hdc tr");
    }

    #[test]
    fn empty_rows_vanish() {
        let mut g = parse_pattern("ch ch ch sc sc ch dc");
        g.set(CellCoord::new(2, 0), None);
        assert_eq!(g.stitch_count(), 4);
        assert_eq!(grid_to_pattern(&g), "ch ch ch sc sc");
    }

    #[test]
    fn all_null_grid_is_empty_text() {
        let mut g = parse_pattern("ch ch sc");
        for r in 0..g.row_count() {
            for c in 0..g.width() {
                g.set(CellCoord::new(r, c), None);
            }
        }
        assert_eq!(grid_to_pattern(&g), "");
        assert_eq!(grid_to_pattern(&Grid::new()), "");
    }
}
