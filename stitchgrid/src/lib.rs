//! Crochet chart core: pattern text to stitch grid and back, chart layout,
//! connection derivation, selection and editing.
//!
//! [`Session`] owns one grid with its color overrides and keeps the derived
//! layout in step with every edit.

pub mod config;
pub mod connections;
pub mod draw;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod limits;
pub mod model;
pub mod parser;
pub mod selection;
pub mod serialize;
pub mod svg;

pub use config::{ChartConfig, CustomStitch, LinearDirection, PhysicsForces};
pub use connections::{derive_connections, Connection, ConnectionKind};
pub use draw::{render_chart, Canvas, ChartView, DrawCommand, DrawList};
pub use error::{Error, Result};
pub use layout::{layout, physics::PhysicsLayout, LayoutMode};
pub use model::{CellCoord, Color, ColorMap, Grid, Position, PositionGrid, StitchKind, Vec2};
pub use parser::parse_pattern;
pub use selection::{PointerButton, Selection};
pub use serialize::grid_to_pattern;
pub use svg::SvgCanvas;

use serde::Serialize;
use tracing::{debug, warn};

/// Result of an edit: how many cells changed and the pattern text after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub changed: usize,
    pub pattern: String,
    pub version: u64,
}

/// One open chart. Loading a pattern replaces everything derived from the
/// previous one, including a running physics simulation.
#[derive(Clone, Debug)]
pub struct Session {
    grid: Grid,
    colors: ColorMap,
    cfg: ChartConfig,
    mode: LayoutMode,
    positions: PositionGrid,
    connections: Vec<Connection>,
    selection: Selection,
    physics: Option<PhysicsLayout>,
    pattern: String,
    ver: u64,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(ChartConfig::default())
    }
}

impl Session {
    pub fn new(cfg: ChartConfig) -> Self {
        Session {
            grid: Grid::new(),
            colors: ColorMap::new(),
            cfg,
            mode: LayoutMode::default(),
            positions: PositionGrid::default(),
            connections: Vec::new(),
            selection: Selection::new(),
            physics: None,
            pattern: String::new(),
            ver: 1,
        }
    }

    pub fn with_pattern(text: &str, cfg: ChartConfig) -> Result<Self> {
        cfg.validate()?;
        let mut s = Session::new(cfg);
        s.load_pattern(text);
        Ok(s)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }
    pub fn config(&self) -> &ChartConfig {
        &self.cfg
    }
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }
    pub fn positions(&self) -> &PositionGrid {
        &self.positions
    }
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
    /// Pattern text for the current grid, regenerated after every edit.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
    pub fn version(&self) -> u64 {
        self.ver
    }

    fn bump(&mut self) {
        self.ver = self.ver.wrapping_add(1);
    }

    fn relayout(&mut self) {
        self.physics = None;
        self.positions = match self.mode {
            LayoutMode::Physics => {
                let sim = PhysicsLayout::new(&self.grid, &self.cfg);
                let pos = sim.positions();
                let nodes = sim.simulation().nodes().len();
                if nodes > limits::MAX_PHYSICS_NODES {
                    warn!(target: "stitchgrid.physics", nodes, cap = limits::MAX_PHYSICS_NODES, "relaxation_skipped");
                } else {
                    self.physics = Some(sim);
                }
                pos
            }
            mode => layout(&self.grid, &self.cfg, mode),
        };
        self.connections = derive_connections(&self.positions, self.mode, &self.cfg);
        self.selection.resolve(&self.positions);
    }

    /// Replaces the grid with a freshly parsed pattern. Color overrides and
    /// the selection belong to the old grid and are dropped.
    pub fn load_pattern(&mut self, text: &str) {
        self.grid = parse_pattern(text);
        self.colors.clear();
        self.selection.clear();
        self.pattern = grid_to_pattern(&self.grid);
        self.bump();
        self.relayout();
        debug!(target: "stitchgrid.session", rows = self.grid.row_count(), width = self.grid.width(), stitches = self.grid.stitch_count(), version = self.ver, "load_pattern");
    }

    pub fn set_mode(&mut self, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.relayout();
        debug!(target: "stitchgrid.session", ?mode, "set_mode");
    }

    /// Validates and applies a whole configuration, then re-runs layout.
    pub fn set_config(&mut self, cfg: ChartConfig) -> Result<()> {
        cfg.validate()?;
        self.cfg = cfg;
        self.bump();
        self.relayout();
        Ok(())
    }

    pub fn set_config_json(&mut self, json: &str) -> Result<()> {
        let cfg = ChartConfig::from_json_str(json)?;
        self.set_config(cfg)
    }

    /// Playback highlight only affects drawing, so layout is left alone.
    pub fn set_playback(&mut self, stitches_done: u32, is_playing: bool) {
        self.cfg.stitches_done = stitches_done;
        self.cfg.is_playing = is_playing;
    }

    pub fn set_expert_view(&mut self, on: bool) {
        self.cfg.expert_view = on;
    }

    /// Advances the physics simulation one step. Returns false when not in
    /// physics mode or once it has settled.
    pub fn physics_tick(&mut self) -> bool {
        let Some(sim) = self.physics.as_mut() else { return false };
        if !sim.tick() {
            return false;
        }
        self.positions = sim.positions();
        true
    }

    pub fn physics_settled(&self) -> bool {
        self.physics.as_ref().map_or(true, PhysicsLayout::is_settled)
    }

    // Selection

    pub fn pointer_press(&mut self, x: f32, y: f32, button: PointerButton) -> bool {
        self.selection.press(x, y, button)
    }

    pub fn pointer_drag(&mut self, x: f32, y: f32) -> bool {
        self.selection.drag(x, y)
    }

    pub fn pointer_release(&mut self, x: f32, y: f32) -> usize {
        let tol = self.cfg.stitch_size / 2.0;
        self.selection.release(x, y, &self.positions, tol)
    }

    pub fn select_cells(&mut self, cells: &[CellCoord]) -> usize {
        self.selection.select_cells(cells.iter().copied(), &self.positions)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_cells(&self) -> &[CellCoord] {
        self.selection.cells()
    }

    /// Stitch under the pointer, within half a stitch.
    pub fn pick(&self, x: f32, y: f32) -> Option<(CellCoord, f32)> {
        selection::pick(&self.positions, x, y, self.cfg.stitch_size / 2.0)
    }

    pub fn secondary_action<F: FnOnce(f32, f32, &[CellCoord])>(&self, x: f32, y: f32, show_menu: F) -> bool {
        self.selection.secondary_action(x, y, show_menu)
    }

    // Editing

    fn commit(&mut self, op: &'static str, changed: usize) -> EditOutcome {
        if changed > 0 {
            self.bump();
            self.pattern = grid_to_pattern(&self.grid);
            self.relayout();
        }
        debug!(target: "stitchgrid.session", op, changed, version = self.ver, "edit");
        EditOutcome { changed, pattern: self.pattern.clone(), version: self.ver }
    }

    pub fn delete_selected(&mut self) -> EditOutcome {
        let cells = self.selection.cells().to_vec();
        let n = editing::delete_cells(&mut self.grid, &mut self.colors, &cells);
        self.selection.clear();
        self.commit("delete", n)
    }

    pub fn duplicate_selected(&mut self) -> EditOutcome {
        let cells = self.selection.cells().to_vec();
        let n = editing::duplicate_cells(&mut self.grid, &cells);
        self.commit("duplicate", n)
    }

    /// Retypes `cells`. Without an explicit type the cycle policy picks
    /// the successor of the first selected stitch's type.
    pub fn change_stitch_type(&mut self, cells: &[CellCoord], new_type: Option<&str>) -> Result<EditOutcome> {
        let token = match new_type {
            Some(t) => t.to_string(),
            None => match editing::cycled_type(&self.grid, cells, &self.cfg) {
                Some(t) => t,
                None => return Ok(self.commit("retype", 0)),
            },
        };
        let n = editing::retype_cells(&mut self.grid, cells, &token)?;
        Ok(self.commit("retype", n))
    }

    pub fn change_color(&mut self, cells: &[CellCoord], color: Color) -> EditOutcome {
        let n = editing::color_cells(&self.grid, &mut self.colors, cells, color);
        self.commit("color", n)
    }

    // Drawing

    pub fn view(&self) -> ChartView<'_> {
        ChartView {
            positions: &self.positions,
            connections: &self.connections,
            mode: self.mode,
            cfg: &self.cfg,
            colors: &self.colors,
            selection: &self.selection,
        }
    }

    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        render_chart(canvas, &self.view());
    }

    pub fn draw_list(&self) -> DrawList {
        let mut list = DrawList::new();
        self.render(&mut list);
        list
    }

    pub fn to_svg(&self) -> String {
        let mut svg = SvgCanvas::new(self.cfg.canvas_width, self.cfg.canvas_height);
        self.render(&mut svg);
        svg.finish()
    }
}
