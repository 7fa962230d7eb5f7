use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One grid slot: a stitch token or the empty marker.
pub type Cell = Option<String>;

pub const CHAIN: &str = "ch";
pub const SINGLE: &str = "sc";
pub const HALF_DOUBLE: &str = "hdc";
pub const DOUBLE: &str = "dc";
pub const TREBLE: &str = "tr";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(180, 180, 180);
    pub const SELECTED: Color = Color { r: 30, g: 30, b: 30, a: 200 };
    pub const SELECTION_STROKE: Color = Color::rgb(0, 150, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// Accepts `#RRGGBB` and `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Color> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || Error::InvalidColor(s.to_string());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Color { r: byte(0)?, g: byte(2)?, b: byte(4)?, a })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = Error;
    fn from_str(s: &str) -> Result<Color> {
        Color::from_hex(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }
    pub fn dist(self, o: Vec2) -> f32 {
        ((self.x - o.x).powi(2) + (self.y - o.y).powi(2)).sqrt()
    }
}

/// Classification of a stitch token for drawing and editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StitchKind {
    Chain,
    Single,
    HalfDouble,
    Double,
    Treble,
    /// `a+b`: each component is drawn on its own.
    Combined(Vec<String>),
    Custom(String),
}

impl StitchKind {
    pub fn of(token: &str) -> StitchKind {
        match token {
            CHAIN => StitchKind::Chain,
            SINGLE => StitchKind::Single,
            HALF_DOUBLE => StitchKind::HalfDouble,
            DOUBLE => StitchKind::Double,
            TREBLE => StitchKind::Treble,
            t if t.contains('+') => StitchKind::Combined(components(t).map(str::to_string).collect()),
            t => StitchKind::Custom(t.to_string()),
        }
    }
    pub fn is_builtin(&self) -> bool {
        !matches!(self, StitchKind::Combined(_) | StitchKind::Custom(_))
    }
}

/// A token must survive a whitespace split unchanged.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

pub fn is_chain(token: &str) -> bool {
    token == CHAIN
}

/// Text shown on a node: custom `name_colorcode` tokens display only `name`.
pub fn display_label(token: &str) -> &str {
    token.split('_').next().unwrap_or(token)
}

pub fn components(token: &str) -> impl Iterator<Item = &str> {
    token.split('+').filter(|p| !p.is_empty())
}

/// Grid coordinate, rendered as `"row-col"` for host-facing keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> CellCoord {
        CellCoord { row, col }
    }
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for CellCoord {
    type Err = Error;
    fn from_str(s: &str) -> Result<CellCoord> {
        let bad = || Error::InvalidCell(s.to_string());
        let (r, c) = s.split_once('-').ok_or_else(bad)?;
        Ok(CellCoord {
            row: r.trim().parse().map_err(|_| bad())?,
            col: c.trim().parse().map_err(|_| bad())?,
        })
    }
}

/// Normalized row/column stitch grid. Every row has the same length.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawGrid")]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

// Decoded rows may be ragged; they are padded through `Grid::from_rows`.
#[derive(Deserialize)]
struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl From<RawGrid> for Grid {
    fn from(raw: RawGrid) -> Grid {
        Grid::from_rows(raw.rows)
    }
}

impl Grid {
    pub fn new() -> Grid {
        Grid { rows: Vec::new() }
    }

    /// Builds a grid from raw rows, padding short rows with empty cells.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Grid {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for r in rows.iter_mut() {
            r.resize(width, None);
        }
        Grid { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, at: CellCoord) -> Option<&str> {
        self.rows.get(at.row)?.get(at.col)?.as_deref()
    }

    /// Writes a cell; out-of-range coordinates are ignored and return false.
    pub fn set(&mut self, at: CellCoord, cell: Cell) -> bool {
        match self.rows.get_mut(at.row).and_then(|r| r.get_mut(at.col)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Populated cells in row-major order.
    pub fn stitches(&self) -> impl Iterator<Item = (CellCoord, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_deref().map(|s| (CellCoord::new(r, c), s)))
        })
    }

    pub fn stitch_count(&self) -> usize {
        self.stitches().count()
    }

    pub fn first_empty(&self) -> Option<CellCoord> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter().position(Option::is_none).map(|c| CellCoord::new(r, c))
        })
    }

    /// Columns of a row in working order: left-to-right on even rows,
    /// right-to-left on odd rows.
    pub fn working_order(&self, row: usize) -> Vec<usize> {
        let w = self.rows.get(row).map_or(0, Vec::len);
        if row % 2 == 0 {
            (0..w).collect()
        } else {
            (0..w).rev().collect()
        }
    }
}

/// Sparse per-cell color overrides keyed by grid coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorMap {
    entries: BTreeMap<CellCoord, Color>,
}

impl ColorMap {
    pub fn new() -> ColorMap {
        ColorMap::default()
    }
    pub fn get(&self, at: CellCoord) -> Option<Color> {
        self.entries.get(&at).copied()
    }
    pub fn insert(&mut self, at: CellCoord, color: Color) {
        self.entries.insert(at, color);
    }
    pub fn remove(&mut self, at: CellCoord) -> Option<Color> {
        self.entries.remove(&at)
    }
    pub fn clear(&mut self) {
        self.entries.clear();
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Color)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
    /// `("row-col", "#RRGGBB")` pairs for the host.
    pub fn to_entries(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.key(), v.to_hex())).collect()
    }
    /// Drops entries whose cell is empty or gone.
    pub fn retain_populated(&mut self, grid: &Grid) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| grid.get(*k).is_some());
        before - self.entries.len()
    }
}

/// Computed placement of one grid cell. Empty cells keep a placeholder
/// so coordinates stay addressable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub stitch: Option<String>,
    /// Degrees, round layout only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<f32>,
}

impl Position {
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
    pub fn is_stitch(&self) -> bool {
        self.stitch.is_some()
    }
}

/// Positions with the same shape as the grid they were computed from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionGrid {
    pub rows: Vec<Vec<Position>>,
}

impl PositionGrid {
    pub fn get(&self, at: CellCoord) -> Option<&Position> {
        self.rows.get(at.row)?.get(at.col)
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn nodes(&self) -> impl Iterator<Item = &Position> + '_ {
        self.rows.iter().flatten().filter(|p| p.is_stitch())
    }
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_hex("#00DC00").unwrap(), Color::rgb(0, 220, 0));
        assert_eq!(Color::from_hex("ff000080").unwrap().a, 128);
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
        assert!(Color::from_hex("#+f+f+f").is_err());
        assert!(Color::from_hex("-1ff00").is_err());
        assert_eq!(Color::rgb(0, 170, 0).to_hex(), "#00AA00");
    }

    #[test]
    fn token_helpers() {
        assert_eq!(display_label("bobble_ff0000"), "bobble");
        assert_eq!(display_label("sc"), "sc");
        assert_eq!(StitchKind::of("sc+ch"), StitchKind::Combined(vec!["sc".into(), "ch".into()]));
        assert_eq!(StitchKind::of("puff"), StitchKind::Custom("puff".into()));
        assert!(StitchKind::of("hdc").is_builtin());
        assert!(is_valid_token("puff_ff00ff"));
        assert!(!is_valid_token("two words"));
        assert!(!is_valid_token(""));
    }

    #[test]
    fn coord_keys() {
        let c: CellCoord = "3-12".parse().unwrap();
        assert_eq!(c, CellCoord::new(3, 12));
        assert_eq!(c.key(), "3-12");
        assert!("3_12".parse::<CellCoord>().is_err());
    }

    #[test]
    fn grid_access() {
        let mut g = Grid::from_rows(vec![vec![Some("ch".into())], vec![None, Some("sc".into())]]);
        assert_eq!(g.width(), 2);
        assert_eq!(g.first_empty(), Some(CellCoord::new(0, 1)));
        assert!(!g.set(CellCoord::new(5, 0), None));
        assert!(g.set(CellCoord::new(0, 1), Some("dc".into())));
        assert_eq!(g.get(CellCoord::new(0, 1)), Some("dc"));
        assert_eq!(g.working_order(1), vec![1, 0]);
        assert_eq!(g.stitch_count(), 3);
    }

    #[test]
    fn decoded_grid_is_padded() {
        let g: Grid = serde_json::from_str(r#"{"rows":[["sc"],["sc",null,"dc"]]}"#).unwrap();
        assert_eq!(g.width(), 3);
        assert!(g.rows().iter().all(|r| r.len() == 3));
        assert_eq!(g.get(CellCoord::new(1, 2)), Some("dc"));
    }

    #[test]
    fn stale_colors_are_dropped() {
        let g = Grid::from_rows(vec![vec![Some("sc".into()), None]]);
        let mut colors = ColorMap::new();
        colors.insert(CellCoord::new(0, 0), Color::BLACK);
        colors.insert(CellCoord::new(0, 1), Color::BLACK);
        colors.insert(CellCoord::new(4, 0), Color::BLACK);
        assert_eq!(colors.retain_populated(&g), 2);
        assert_eq!(colors.to_entries(), vec![("0-0".to_string(), "#000000".to_string())]);
    }
}
