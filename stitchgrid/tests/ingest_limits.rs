use serde_json::json;
use stitchgrid::limits::{MAX_GRID_CELLS, MAX_PATTERN_TOKENS, MAX_PHYSICS_NODES};
use stitchgrid::{parse_pattern, CellCoord, ChartConfig, ConnectionKind, Error, LayoutMode, Session};

#[test]
fn overlong_pattern_is_truncated() {
    let text = "ch ".repeat(MAX_PATTERN_TOKENS + 500);
    let g = parse_pattern(&text);
    assert_eq!(g.row_count(), 1);
    assert_eq!(g.stitch_count(), MAX_PATTERN_TOKENS);
}

#[test]
fn config_out_of_range() {
    let v = json!({"roundSpacing": 1.0e9});
    assert!(matches!(ChartConfig::from_json_value(v), Err(Error::OutOfRange { param: "roundSpacing", .. })));
    let v = json!({"physics": {"velocityDecay": 2.0}});
    assert!(matches!(ChartConfig::from_json_value(v), Err(Error::OutOfRange { .. })));
}

#[test]
fn config_bad_colors_and_names() {
    let v = json!({"scColor": "#12"});
    assert_eq!(ChartConfig::from_json_value(v).unwrap_err().code(), "invalid_config");
    let v = json!({"customStitches": [{"name": "bob ble", "color": "#FF0000"}]});
    assert_eq!(ChartConfig::from_json_value(v).unwrap_err().code(), "invalid_stitch");
    let v = json!({"linearDirection": "sideways"});
    assert!(ChartConfig::from_json_value(v).is_err());
}

#[test]
fn edits_ignore_out_of_range_cells() {
    let mut s = Session::with_pattern("ch ch ch ch sc sc sc", ChartConfig::default()).unwrap();
    let v = s.version();
    let far = [CellCoord::new(99, 0), CellCoord::new(0, 99)];
    assert_eq!(s.select_cells(&far), 0);
    assert_eq!(s.change_color(&far, stitchgrid::Color::BLACK).changed, 0);
    assert_eq!(s.change_stitch_type(&far, Some("dc")).unwrap().changed, 0);
    assert_eq!(s.version(), v);
}

#[test]
fn non_finite_pointer_is_ignored() {
    let mut s = Session::with_pattern("ch ch ch ch sc sc sc", ChartConfig::default()).unwrap();
    assert!(!s.pointer_press(f32::INFINITY, 0.0, stitchgrid::PointerButton::Left));
    assert_eq!(s.pointer_release(0.0, 0.0), 0);
}

#[test]
fn wide_base_with_many_rows_is_capped() {
    // A 50k chain base followed by one-stitch rows: each row costs a full
    // 50k-wide row of cells.
    let mut text = "ch ".repeat(50_000);
    text.push_str("sc");
    text.push_str(&" ch sc".repeat(24_999));
    let g = parse_pattern(&text);
    assert_eq!(g.width(), 50_000);
    assert!(g.row_count() * g.width() <= MAX_GRID_CELLS);
    assert_eq!(g.row_count(), 20);
    assert_eq!(g.stitch_count(), 49_999 + 19);
}

#[test]
fn oversized_physics_layout_stays_put() {
    let text = format!("{}sc", "ch ".repeat(MAX_PHYSICS_NODES + 2));
    let mut s = Session::with_pattern(&text, ChartConfig::default()).unwrap();
    s.set_mode(LayoutMode::Physics);
    assert_eq!(s.positions().node_count(), MAX_PHYSICS_NODES + 2);
    assert!(s.positions().nodes().all(|n| n.x.is_finite() && n.y.is_finite()));
    assert!(s.connections().iter().all(|c| c.kind == ConnectionKind::Link));
    assert!(!s.physics_tick());
    assert!(s.physics_settled());
}
