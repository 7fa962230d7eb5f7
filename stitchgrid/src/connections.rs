//! Drawing edges derived from a placed grid.
//!
//! Row charts get turn, straight and vertical edges; round charts match each
//! stitch to the previous round and chain stitches along their own round;
//! physics charts reuse the simulation's right/up links.

use crate::config::ChartConfig;
use crate::layout::LayoutMode;
use crate::limits;
use crate::model::{is_chain, CellCoord, Position, PositionGrid};
use serde::Serialize;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConnectionKind {
    /// End of a row into the same column of the next row. `dir` is the
    /// side the work turns on: +1 right, -1 left.
    Turn { dir: i8 },
    /// Between neighbors of one row, pointing in working direction.
    Straight,
    /// A stitch down into the stitch it is worked into.
    Vertical,
    /// A stitch to its matched stitch in the previous round.
    Round,
    /// A stitch to the next stitch of its own round.
    Along,
    /// Force-graph edge.
    Link,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub from: CellCoord,
    pub to: CellCoord,
    pub kind: ConnectionKind,
}

impl Connection {
    fn new(from: CellCoord, to: CellCoord, kind: ConnectionKind) -> Connection {
        Connection { from, to, kind }
    }
}

pub fn derive_connections(pos: &PositionGrid, mode: LayoutMode, cfg: &ChartConfig) -> Vec<Connection> {
    let out = match mode {
        LayoutMode::Linear => row_connections(pos),
        LayoutMode::Round => round_connections(pos, cfg.round_total_angle),
        LayoutMode::Physics => physics_links(pos),
    };
    trace!(target: "stitchgrid.layout", ?mode, edges = out.len(), "connections");
    out
}

/// Column the work turns at when row `r` ends: the last stitch reached in
/// working order, so the rightmost on even rows and the leftmost on odd rows.
pub fn turn_column(row: &[Position], r: usize) -> Option<usize> {
    if r % 2 == 0 {
        row.iter().rposition(Position::is_stitch)
    } else {
        row.iter().position(Position::is_stitch)
    }
}

pub fn row_connections(pos: &PositionGrid) -> Vec<Connection> {
    let rows = &pos.rows;
    let mut out = Vec::new();

    for r in 0..rows.len().saturating_sub(1) {
        let Some(c) = turn_column(&rows[r], r) else { continue };
        if c < rows[r + 1].len() {
            let dir = if r % 2 == 0 { 1 } else { -1 };
            out.push(Connection::new(CellCoord::new(r, c), CellCoord::new(r + 1, c), ConnectionKind::Turn { dir }));
        }
    }

    for (r, row) in rows.iter().enumerate() {
        for c in 1..row.len() {
            if !(row[c].is_stitch() && row[c - 1].is_stitch()) {
                continue;
            }
            let (from, to) = if r % 2 == 0 { (c - 1, c) } else { (c, c - 1) };
            out.push(Connection::new(CellCoord::new(r, from), CellCoord::new(r, to), ConnectionKind::Straight));
        }
    }

    for r in 1..rows.len() {
        for (c, cell) in rows[r].iter().enumerate() {
            let worked = cell.stitch.as_deref().is_some_and(|s| !is_chain(s));
            let below = rows[r - 1].get(c).is_some_and(Position::is_stitch);
            if worked && below {
                out.push(Connection::new(CellCoord::new(r, c), CellCoord::new(r - 1, c), ConnectionKind::Vertical));
            }
        }
    }
    out
}

/// Matches the non-chain stitches of `cur` to the stitches of `prev`.
///
/// Each stitch takes the nearest previous stitch that still has room; a
/// previous stitch accepts at most `ceil(cur / prev)` matches. Ties go to
/// the earlier column. Anything left over goes to the least loaded stitch.
pub fn match_rounds(prev: &[Position], cur: &[Position]) -> Vec<Connection> {
    let targets: Vec<&Position> = prev.iter().filter(|p| p.is_stitch()).collect();
    let sources: Vec<&Position> =
        cur.iter().filter(|p| p.stitch.as_deref().is_some_and(|s| !is_chain(s))).collect();
    if targets.is_empty() || sources.is_empty() {
        return Vec::new();
    }
    let cap = sources.len().div_ceil(targets.len());
    let mut load = vec![0usize; targets.len()];
    let mut matched: Vec<Option<usize>> = vec![None; sources.len()];

    for (i, s) in sources.iter().enumerate() {
        let mut best: Option<(usize, f32)> = None;
        for (j, t) in targets.iter().enumerate() {
            if load[j] >= cap {
                continue;
            }
            let d = s.point().dist(t.point());
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        if let Some((j, _)) = best {
            load[j] += 1;
            matched[i] = Some(j);
        }
    }

    for m in matched.iter_mut().filter(|m| m.is_none()) {
        if let Some(j) = (0..load.len()).min_by_key(|&j| load[j]) {
            load[j] += 1;
            *m = Some(j);
        }
    }

    sources
        .iter()
        .zip(matched)
        .filter_map(|(s, m)| m.map(|j| Connection::new(s.coord(), targets[j].coord(), ConnectionKind::Round)))
        .collect()
}

pub fn round_connections(pos: &PositionGrid, total_angle: f32) -> Vec<Connection> {
    let mut out = Vec::new();
    for r in 1..pos.rows.len() {
        out.extend(match_rounds(&pos.rows[r - 1], &pos.rows[r]));
    }
    let wrap = limits::is_full_circle(total_angle);
    for round in &pos.rows {
        let stitches: Vec<&Position> = round.iter().filter(|p| p.is_stitch()).collect();
        for (i, p) in stitches.iter().enumerate() {
            let next = match stitches.get(i + 1) {
                Some(n) => *n,
                None if wrap && stitches.len() > 1 => stitches[0],
                None => continue,
            };
            out.push(Connection::new(p.coord(), next.coord(), ConnectionKind::Along));
        }
    }
    out
}

/// Right-hand neighbor and the stitch above, matching the force graph.
pub fn physics_links(pos: &PositionGrid) -> Vec<Connection> {
    let mut out = Vec::new();
    for (r, row) in pos.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_stitch() {
                continue;
            }
            if row.get(c + 1).is_some_and(Position::is_stitch) {
                out.push(Connection::new(cell.coord(), CellCoord::new(r, c + 1), ConnectionKind::Link));
            }
            if r > 0 && pos.rows[r - 1].get(c).is_some_and(Position::is_stitch) {
                out.push(Connection::new(cell.coord(), CellCoord::new(r - 1, c), ConnectionKind::Link));
            }
        }
    }
    out
}
