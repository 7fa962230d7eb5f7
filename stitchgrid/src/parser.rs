use crate::limits::{MAX_GRID_CELLS, MAX_PATTERN_TOKENS};
use crate::model::{is_chain, Cell, Grid};
use tracing::{trace, warn};

/// Splits a pattern into rows of tokens, before any column alignment.
///
/// The base chain ends at the first non-chain stitch and loses its last
/// chain (the turning chain). After that, a single chain between two
/// stitches ends the row and is dropped; runs of two or more chains stay
/// in the row as chain stitches. Chains arriving on an empty row are
/// ignored.
pub fn split_rows(input: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut base = true;
    let mut chain_count = 0usize;

    let mut taken = 0usize;
    for stitch in input.split_whitespace() {
        if taken == MAX_PATTERN_TOKENS {
            warn!(target: "stitchgrid.parse", cap = MAX_PATTERN_TOKENS, "pattern_truncated");
            break;
        }
        taken += 1;

        if is_chain(stitch) {
            if base {
                row.push(stitch.to_string());
            } else if !row.is_empty() {
                chain_count += 1;
                row.push(stitch.to_string());
            }
            continue;
        }
        if base {
            base = false;
            row.pop();
            rows.push(std::mem::take(&mut row));
        } else if chain_count == 1 {
            row.pop();
            rows.push(std::mem::take(&mut row));
        }
        chain_count = 0;
        row.push(stitch.to_string());
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

/// Column reach after each row of the serpentine walk: `(min, max)`.
///
/// Even rows advance one column per stitch, odd rows retreat one.
fn reach_per_row(rows: &[Vec<String>]) -> impl Iterator<Item = (i64, i64)> + '_ {
    rows.iter().enumerate().scan((0i64, 0i64, 0i64), |(min_col, max_col, cur), (i, r)| {
        let n = r.len() as i64;
        if i % 2 == 0 {
            *cur += n;
            *max_col = (*max_col).max(*cur);
        } else {
            *cur -= n;
            *min_col = (*min_col).min(*cur);
        }
        Some((*min_col, *max_col))
    })
}

/// Column reach of the whole walk: `(min, max)`.
pub fn column_reach(rows: &[Vec<String>]) -> (i64, i64) {
    reach_per_row(rows).last().unwrap_or((0, 0))
}

/// Number of leading rows whose aligned grid stays within `MAX_GRID_CELLS`.
/// The first row always fits.
pub fn rows_within_cell_cap(rows: &[Vec<String>]) -> usize {
    for (i, (min_col, max_col)) in reach_per_row(rows).enumerate() {
        let width = (max_col - min_col + 1) as usize;
        match (i + 1).checked_mul(width) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => return i.max(1),
        }
    }
    rows.len()
}

/// Parses a whitespace separated stitch pattern into a normalized grid.
///
/// Never fails: unknown tokens are custom stitches and empty input gives
/// an empty grid.
pub fn parse_pattern(input: &str) -> Grid {
    let mut rows = split_rows(input);
    if rows.is_empty() {
        trace!(target: "stitchgrid.parse", rows = 0, "parse_pattern");
        return Grid::new();
    }
    let keep = rows_within_cell_cap(&rows);
    if keep < rows.len() {
        warn!(target: "stitchgrid.parse", rows = rows.len(), kept = keep, cap = MAX_GRID_CELLS, "grid_truncated");
        rows.truncate(keep);
    }
    let (min_col, max_col) = column_reach(&rows);
    let width = (max_col - min_col + 1) as usize;

    let start = min_col.unsigned_abs() as usize;
    let mut last_idx = start;
    let mut out: Vec<Vec<Cell>> = Vec::with_capacity(rows.len());
    for (i, r) in rows.into_iter().enumerate() {
        let mut padded: Vec<Cell> = vec![None; width];
        let origin = if i == 0 { start } else { last_idx };
        for (j, stitch) in r.into_iter().enumerate() {
            // Row 0 and even rows run rightward, odd rows leftward.
            let col = if i % 2 == 0 { origin.checked_add(j) } else { origin.checked_sub(j) };
            let Some(col) = col.filter(|c| *c < width) else {
                warn!(target: "stitchgrid.parse", row = i, origin, offset = j, "stitch_outside_grid");
                continue;
            };
            padded[col] = Some(stitch);
            last_idx = col;
        }
        out.push(padded);
    }
    trace!(target: "stitchgrid.parse", rows = out.len(), width, min_col, max_col, "parse_pattern");
    Grid::from_rows(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellCoord;

    fn row(g: &Grid, r: usize) -> Vec<Option<&str>> {
        g.rows()[r].iter().map(|c| c.as_deref()).collect()
    }

    #[test]
    fn base_chain_drops_turning_chain() {
        let rows = split_rows("ch ch ch sc sc");
        assert_eq!(rows, vec![vec!["ch", "ch"], vec!["sc", "sc"]]);
        let g = parse_pattern("ch ch ch sc sc");
        assert_eq!(g.width(), 3);
        assert_eq!(row(&g, 0), vec![Some("ch"), Some("ch"), None]);
        assert_eq!(row(&g, 1), vec![Some("sc"), Some("sc"), None]);
    }

    #[test]
    fn three_rows_serpentine() {
        let g = parse_pattern("ch ch ch ch sc sc sc ch sc sc sc");
        assert_eq!(g.row_count(), 3);
        assert_eq!(g.width(), 4);
        assert_eq!(row(&g, 0), vec![Some("ch"), Some("ch"), Some("ch"), None]);
        assert_eq!(row(&g, 1), vec![Some("sc"), Some("sc"), Some("sc"), None]);
        assert_eq!(row(&g, 2), vec![Some("sc"), Some("sc"), Some("sc"), None]);
    }

    #[test]
    fn double_chain_stays_inline() {
        let rows = split_rows("ch ch sc ch ch sc ch ch ch dc");
        assert_eq!(rows, vec![vec!["ch"], vec!["sc", "ch", "ch", "sc", "ch", "ch", "ch", "dc"]]);
    }

    #[test]
    fn leading_stitch_gives_empty_base_row() {
        let g = parse_pattern("sc sc");
        assert_eq!(g.row_count(), 2);
        assert!(g.rows()[0].iter().all(Option::is_none));
        assert_eq!(g.stitch_count(), 2);
        assert_eq!(g.get(CellCoord::new(1, 2)), Some("sc"));
        assert_eq!(g.get(CellCoord::new(1, 1)), Some("sc"));
    }

    #[test]
    fn blank_input_is_empty_grid() {
        assert!(parse_pattern("").is_empty());
        assert!(parse_pattern("  \n\t ").is_empty());
    }

    #[test]
    fn chains_only_keep_every_chain() {
        let g = parse_pattern("ch ch ch");
        assert_eq!(g.row_count(), 1);
        assert_eq!(g.stitch_count(), 3);
    }

    #[test]
    fn odd_row_overhang_shifts_origin() {
        // Row 1 is longer than row 0, so the walk goes left of column 0.
        let g = parse_pattern("ch ch sc sc sc sc");
        let (min_col, max_col) = column_reach(&split_rows("ch ch sc sc sc sc"));
        assert_eq!((min_col, max_col), (-3, 1));
        assert_eq!(g.width(), 5);
        assert_eq!(row(&g, 0), vec![None, None, None, Some("ch"), None]);
        assert_eq!(row(&g, 1), vec![Some("sc"), Some("sc"), Some("sc"), Some("sc"), None]);
    }

    #[test]
    fn cell_cap_counts_rows_times_width() {
        let rows = split_rows("ch ch ch ch sc sc sc ch sc sc sc");
        assert_eq!(rows_within_cell_cap(&rows), 3);
        let wide: Vec<Vec<String>> = std::iter::once(vec!["ch".to_string(); 99_999])
            .chain(std::iter::repeat(vec!["sc".to_string()]).take(30))
            .collect();
        // Width 100_000, so ten rows fill the cap.
        assert_eq!(rows_within_cell_cap(&wide), MAX_GRID_CELLS / 100_000);
    }
}
