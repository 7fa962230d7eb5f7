//! Force-directed chart layout.
//!
//! Every stitch becomes a node (`"row-col"`), linked to its right-hand
//! neighbor at the horizontal spacing and to the stitch above at the
//! vertical spacing. Relaxation runs one discrete tick at a time so the
//! host can redraw between ticks; the whole simulation is rebuilt when the
//! grid changes.

use crate::config::{ChartConfig, PhysicsForces};
use crate::model::{CellCoord, Grid, Position, PositionGrid, Vec2};
use tracing::{debug, trace};

#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: String,
    pub coord: CellCoord,
    pub stitch: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub distance: f32,
}

/// Builds the node/link lists for a grid, seeding nodes on a compact
/// grid around `center`.
pub fn build_graph(grid: &Grid, cfg: &ChartConfig) -> (Vec<SimNode>, Vec<SimLink>) {
    let (cx, cy) = cfg.center();
    let w = grid.width() as f32;
    let h = grid.row_count() as f32;
    let mut index_of: Vec<Vec<Option<usize>>> = vec![vec![None; grid.width()]; grid.row_count()];
    let mut nodes = Vec::new();
    for (at, stitch) in grid.stitches() {
        index_of[at.row][at.col] = Some(nodes.len());
        nodes.push(SimNode {
            id: at.key(),
            coord: at,
            stitch: stitch.to_string(),
            x: cx + (at.col as f32 - (w - 1.0) / 2.0) * cfg.horizontal_spacing.max(1.0),
            y: cy + (at.row as f32 - (h - 1.0) / 2.0) * cfg.vertical_spacing.max(1.0),
            vx: 0.0,
            vy: 0.0,
        });
    }
    let mut links = Vec::new();
    for node in nodes.iter() {
        let CellCoord { row, col } = node.coord;
        let Some(source) = index_of[row][col] else { continue };
        if let Some(Some(target)) = index_of[row].get(col + 1) {
            links.push(SimLink { source, target: *target, distance: cfg.horizontal_spacing });
        }
        if row > 0 {
            if let Some(target) = index_of[row - 1][col] {
                links.push(SimLink { source, target, distance: cfg.vertical_spacing });
            }
        }
    }
    (nodes, links)
}

/// Iterative relaxation with link, many-body, centering and collision
/// forces. Each `Iterator::next` runs one tick and yields the node
/// positions; the iterator ends once alpha cools below `alpha_min`.
#[derive(Clone, Debug)]
pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    forces: PhysicsForces,
    center: Vec2,
    alpha: f32,
    alpha_decay: f32,
    link_strength: Vec<f32>,
    link_bias: Vec<f32>,
    seed: u64,
    ticks: u32,
}

/// Narrow entry point into the force engine.
pub fn simulate(nodes: Vec<SimNode>, links: Vec<SimLink>, forces: PhysicsForces, center: Vec2) -> Simulation {
    let mut degree = vec![0u32; nodes.len()];
    for l in &links {
        degree[l.source] += 1;
        degree[l.target] += 1;
    }
    let link_strength = links
        .iter()
        .map(|l| 1.0 / degree[l.source].min(degree[l.target]).max(1) as f32)
        .collect();
    let link_bias = links
        .iter()
        .map(|l| {
            let s = degree[l.source] as f32;
            s / (s + degree[l.target] as f32)
        })
        .collect();
    let alpha_decay = 1.0 - forces.alpha_min.powf(1.0 / 300.0);
    Simulation {
        nodes,
        links,
        forces,
        center,
        alpha: 1.0,
        alpha_decay,
        link_strength,
        link_bias,
        seed: 0x9E37_79B9_7F4A_7C15,
        ticks: 0,
    }
}

impl Simulation {
    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }
    pub fn links(&self) -> &[SimLink] {
        &self.links
    }
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
    pub fn is_settled(&self) -> bool {
        self.alpha < self.forces.alpha_min
    }

    /// Tiny deterministic offset used to separate coincident nodes.
    fn jiggle(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let unit = ((self.seed >> 40) as f32) / ((1u64 << 24) as f32);
        (unit - 0.5) * 1e-6
    }

    /// Advances one step. Returns false once the simulation has cooled.
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        self.alpha += (0.0 - self.alpha) * self.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_center();
        self.apply_collide();
        let keep = 1.0 - self.forces.velocity_decay;
        for n in self.nodes.iter_mut() {
            n.vx *= keep;
            n.vy *= keep;
            n.x += n.vx;
            n.y += n.vy;
        }
        self.ticks += 1;
        trace!(target: "stitchgrid.physics", tick = self.ticks, alpha = self.alpha, "tick");
        true
    }

    fn apply_links(&mut self) {
        for i in 0..self.links.len() {
            let SimLink { source, target, distance } = self.links[i];
            let (s, t) = (&self.nodes[source], &self.nodes[target]);
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = self.jiggle();
            }
            if y == 0.0 {
                y = self.jiggle();
            }
            let mut l = (x * x + y * y).sqrt();
            l = (l - distance) / l * self.alpha * self.link_strength[i];
            x *= l;
            y *= l;
            let b = self.link_bias[i];
            self.nodes[target].vx -= x * b;
            self.nodes[target].vy -= y * b;
            self.nodes[source].vx += x * (1.0 - b);
            self.nodes[source].vy += y * (1.0 - b);
        }
    }

    // Brute-force pairwise charge; charts stay small enough for O(n^2).
    fn apply_charge(&mut self) {
        let strength = self.forces.charge;
        let n = self.nodes.len();
        for i in 0..n {
            let (mut dvx, mut dvy) = (0.0f32, 0.0f32);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut x = self.nodes[j].x - self.nodes[i].x;
                let mut y = self.nodes[j].y - self.nodes[i].y;
                if x == 0.0 {
                    x = self.jiggle();
                }
                if y == 0.0 {
                    y = self.jiggle();
                }
                let mut l = x * x + y * y;
                if l < 1.0 {
                    l = l.sqrt();
                }
                dvx += x * strength * self.alpha / l;
                dvy += y * strength * self.alpha / l;
            }
            self.nodes[i].vx += dvx;
            self.nodes[i].vy += dvy;
        }
    }

    fn apply_center(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let n = self.nodes.len() as f32;
        let sx = self.nodes.iter().map(|p| p.x).sum::<f32>() / n - self.center.x;
        let sy = self.nodes.iter().map(|p| p.y).sum::<f32>() / n - self.center.y;
        for p in self.nodes.iter_mut() {
            p.x -= sx;
            p.y -= sy;
        }
    }

    fn apply_collide(&mut self) {
        let r = self.forces.collide_radius * 2.0;
        if r <= 0.0 {
            return;
        }
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.nodes[i], &self.nodes[j]);
                let mut x = a.x + a.vx - b.x - b.vx;
                let mut y = a.y + a.vy - b.y - b.vy;
                let l2 = x * x + y * y;
                if l2 >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.jiggle();
                }
                if y == 0.0 {
                    y = self.jiggle();
                }
                let l = (x * x + y * y).sqrt();
                let k = (r - l) / l * 0.5;
                self.nodes[i].vx += x * k;
                self.nodes[i].vy += y * k;
                self.nodes[j].vx -= x * k;
                self.nodes[j].vy -= y * k;
            }
        }
    }
}

impl Iterator for Simulation {
    type Item = Vec<Vec2>;

    fn next(&mut self) -> Option<Vec<Vec2>> {
        if !self.tick() {
            return None;
        }
        Some(self.nodes.iter().map(|n| Vec2::new(n.x, n.y)).collect())
    }
}

/// A simulation bound to the grid shape it was built from.
#[derive(Clone, Debug)]
pub struct PhysicsLayout {
    rows: usize,
    width: usize,
    sim: Simulation,
}

impl PhysicsLayout {
    pub fn new(grid: &Grid, cfg: &ChartConfig) -> PhysicsLayout {
        let (nodes, links) = build_graph(grid, cfg);
        let (cx, cy) = cfg.center();
        debug!(target: "stitchgrid.physics", nodes = nodes.len(), links = links.len(), "simulation_built");
        PhysicsLayout {
            rows: grid.row_count(),
            width: grid.width(),
            sim: simulate(nodes, links, cfg.physics, Vec2::new(cx, cy)),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn tick(&mut self) -> bool {
        self.sim.tick()
    }

    /// Runs until cooled or `max_ticks` have elapsed; returns ticks run.
    pub fn settle(&mut self, max_ticks: u32) -> u32 {
        let mut n = 0;
        while n < max_ticks && self.sim.tick() {
            n += 1;
        }
        n
    }

    pub fn is_settled(&self) -> bool {
        self.sim.is_settled()
    }

    /// Current node positions in grid shape; empty cells sit at the origin.
    pub fn positions(&self) -> PositionGrid {
        let mut rows: Vec<Vec<Position>> = (0..self.rows)
            .map(|r| {
                (0..self.width)
                    .map(|c| Position { row: r, col: c, x: 0.0, y: 0.0, stitch: None, theta: None })
                    .collect()
            })
            .collect();
        for n in self.sim.nodes() {
            if let Some(slot) = rows.get_mut(n.coord.row).and_then(|r| r.get_mut(n.coord.col)) {
                slot.x = n.x;
                slot.y = n.y;
                slot.stitch = Some(n.stitch.clone());
            }
        }
        PositionGrid { rows }
    }
}
