use stitchgrid::parser::split_rows;
use stitchgrid::{grid_to_pattern, parse_pattern, CellCoord, ChartConfig, Session};

fn row(g: &stitchgrid::Grid, r: usize) -> Vec<Option<&str>> {
    g.rows()[r].iter().map(|c| c.as_deref()).collect()
}

#[test]
fn three_row_scenario() {
    let g = parse_pattern("ch ch ch ch sc sc sc ch sc sc sc");
    assert_eq!(g.row_count(), 3);
    assert_eq!(g.rows()[0].iter().flatten().count(), 3);
    assert!(g.rows()[0].iter().flatten().all(|t| t == "ch"));
    // Row 1 is worked right to left, row 2 left to right, over the same columns.
    let r1: Vec<usize> = g.working_order(1).into_iter().filter(|&c| g.get(CellCoord::new(1, c)).is_some()).collect();
    let r2: Vec<usize> = g.working_order(2).into_iter().filter(|&c| g.get(CellCoord::new(2, c)).is_some()).collect();
    assert_eq!(r1, vec![2, 1, 0]);
    assert_eq!(r2, vec![0, 1, 2]);
}

#[test]
fn base_chain_loses_turning_chain() {
    let g = parse_pattern("ch ch ch sc sc");
    assert_eq!(row(&g, 0).into_iter().flatten().collect::<Vec<_>>(), vec!["ch", "ch"]);
    assert_eq!(row(&g, 1).into_iter().flatten().collect::<Vec<_>>(), vec!["sc", "sc"]);
}

#[test]
fn chain_runs_after_the_base() {
    // One chain breaks the row, two or three stay inline.
    assert_eq!(split_rows("ch ch sc ch sc").len(), 3);
    assert_eq!(split_rows("ch ch sc ch ch sc"), vec![vec!["ch"], vec!["sc", "ch", "ch", "sc"]]);
    assert_eq!(split_rows("ch ch sc ch ch ch sc"), vec![vec!["ch"], vec!["sc", "ch", "ch", "ch", "sc"]]);
    // Trailing chains stay on the last row.
    assert_eq!(split_rows("ch ch sc ch"), vec![vec!["ch"], vec!["sc", "ch"]]);
}

#[test]
fn custom_tokens_pass_through() {
    let g = parse_pattern("ch ch ch puff_ff00ff sc+ch");
    assert_eq!(g.stitch_count(), 4);
    let text = grid_to_pattern(&g);
    assert!(text.contains("puff_ff00ff") && text.contains("sc+ch"));
}

#[test]
fn delete_only_stitch_drops_row() {
    let mut s = Session::with_pattern("ch ch ch ch sc sc sc ch dc", ChartConfig::default()).unwrap();
    let dc = s.grid().stitches().find(|(_, t)| *t == "dc").map(|(at, _)| at).unwrap();
    s.select_cells(&[dc]);
    let out = s.delete_selected();
    assert_eq!(out.changed, 1);
    assert_eq!(out.pattern, "ch ch ch ch sc sc sc");
    assert!(!out.pattern.contains("dc"));
    assert_eq!(parse_pattern(&out.pattern).row_count(), 2);
}

#[test]
fn serialize_after_retype_reparses() {
    let mut s = Session::with_pattern("ch ch ch ch sc sc sc ch sc sc sc", ChartConfig::default()).unwrap();
    let cells: Vec<CellCoord> = s.grid().stitches().filter(|(at, _)| at.row == 2).map(|(at, _)| at).collect();
    let out = s.change_stitch_type(&cells, Some("hdc")).unwrap();
    assert_eq!(out.changed, 3);
    assert_eq!(out.pattern, "ch ch ch ch sc sc sc ch hdc hdc hdc");
    assert_eq!(parse_pattern(&out.pattern), *s.grid());
}
