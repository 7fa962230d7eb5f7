//! Chart rendering against an abstract 2D canvas.
//!
//! [`render_chart`] issues primitives in paint order: connections, then
//! nodes in working order, then the selection overlay. [`DrawList`]
//! records the same primitives so a host can replay them.

use crate::config::ChartConfig;
use crate::connections::{Connection, ConnectionKind};
use crate::geometry::{place_rotated, polar, CubicBezier};
use crate::layout::LayoutMode;
use crate::model::{components, display_label, CellCoord, Color, ColorMap, Position, PositionGrid, StitchKind, Vec2};
use crate::selection::Selection;
use serde::Serialize;
use std::f32::consts::PI;

const ARROW_SIZE: f32 = 5.0;
const ARROW_WIDTH: f32 = 2.0;
const TURN_HEAD_T: f32 = 0.74;
const ALONG_PULL: f32 = 0.9;
const LABEL_SIZE: f32 = 14.0;
const SYMBOL_LABEL_SIZE: f32 = 10.0;
const RING_PAD: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Stroke {
        Stroke { color, width }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Paint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

impl Paint {
    pub fn fill(c: Color) -> Paint {
        Paint { fill: Some(c), stroke: None }
    }
    pub fn stroke(s: Stroke) -> Paint {
        Paint { fill: None, stroke: Some(s) }
    }
}

/// Drawing surface the chart renders onto.
pub trait Canvas {
    fn line(&mut self, a: Vec2, b: Vec2, stroke: Stroke);
    fn bezier(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, stroke: Stroke);
    fn quadratic(&mut self, p0: Vec2, ctrl: Vec2, p1: Vec2, stroke: Stroke);
    /// `w`/`h` are full diameters; `rotation` is in degrees.
    fn ellipse(&mut self, center: Vec2, w: f32, h: f32, rotation: f32, paint: Paint);
    /// Text centered on `at`.
    fn text(&mut self, at: Vec2, text: &str, size: f32, color: Color);
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Line { a: Vec2, b: Vec2, stroke: Stroke },
    Bezier { p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, stroke: Stroke },
    Quadratic { p0: Vec2, ctrl: Vec2, p1: Vec2, stroke: Stroke },
    Ellipse { center: Vec2, w: f32, h: f32, rotation: f32, paint: Paint },
    Text { at: Vec2, text: String, size: f32, color: Color },
}

/// Canvas that just records what it is asked to draw.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> DrawList {
        DrawList::default()
    }
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
    pub fn len(&self) -> usize {
        self.commands.len()
    }
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
    pub fn replay<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for cmd in &self.commands {
            match cmd {
                DrawCommand::Line { a, b, stroke } => canvas.line(*a, *b, *stroke),
                DrawCommand::Bezier { p0, p1, p2, p3, stroke } => canvas.bezier(*p0, *p1, *p2, *p3, *stroke),
                DrawCommand::Quadratic { p0, ctrl, p1, stroke } => canvas.quadratic(*p0, *ctrl, *p1, *stroke),
                DrawCommand::Ellipse { center, w, h, rotation, paint } => canvas.ellipse(*center, *w, *h, *rotation, *paint),
                DrawCommand::Text { at, text, size, color } => canvas.text(*at, text, *size, *color),
            }
        }
    }
}

impl Canvas for DrawList {
    fn line(&mut self, a: Vec2, b: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { a, b, stroke });
    }
    fn bezier(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::Bezier { p0, p1, p2, p3, stroke });
    }
    fn quadratic(&mut self, p0: Vec2, ctrl: Vec2, p1: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::Quadratic { p0, ctrl, p1, stroke });
    }
    fn ellipse(&mut self, center: Vec2, w: f32, h: f32, rotation: f32, paint: Paint) {
        self.commands.push(DrawCommand::Ellipse { center, w, h, rotation, paint });
    }
    fn text(&mut self, at: Vec2, text: &str, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text { at, text: text.to_string(), size, color });
    }
}

/// Everything one frame needs.
#[derive(Clone, Copy, Debug)]
pub struct ChartView<'a> {
    pub positions: &'a PositionGrid,
    pub connections: &'a [Connection],
    pub mode: LayoutMode,
    pub cfg: &'a ChartConfig,
    pub colors: &'a ColorMap,
    pub selection: &'a Selection,
}

pub fn render_chart<C: Canvas + ?Sized>(canvas: &mut C, view: &ChartView<'_>) {
    if view.positions.is_empty() {
        return;
    }
    for conn in view.connections {
        draw_connection(canvas, view, conn);
    }
    for (count, node) in working_order(view.positions, view.mode).into_iter().enumerate() {
        draw_node(canvas, view, node, count as u32 + 1);
    }
    draw_selection(canvas, view);
}

/// Stitched positions in the order they are worked: serpentine for row
/// charts, row-major for rounds and physics.
pub fn working_order(pos: &PositionGrid, mode: LayoutMode) -> Vec<&Position> {
    let mut out = Vec::with_capacity(pos.node_count());
    for (r, row) in pos.rows.iter().enumerate() {
        let serpentine = mode == LayoutMode::Linear && r % 2 == 1;
        if serpentine {
            out.extend(row.iter().rev().filter(|p| p.is_stitch()));
        } else {
            out.extend(row.iter().filter(|p| p.is_stitch()));
        }
    }
    out
}

/// Type color, overridden per cell by the color map.
pub fn node_color(cfg: &ChartConfig, colors: &ColorMap, at: CellCoord, token: &str) -> Color {
    colors.get(at).unwrap_or_else(|| cfg.stitch_color(token))
}

/// Playback grays every stitch from `stitches_done` onward (1-based count).
pub fn is_grayed(cfg: &ChartConfig, count: u32) -> bool {
    cfg.is_playing && count >= cfg.stitches_done
}

fn draw_connection<C: Canvas + ?Sized>(canvas: &mut C, view: &ChartView<'_>, conn: &Connection) {
    if view.cfg.expert_view && conn.kind == ConnectionKind::Vertical {
        return;
    }
    let (Some(a), Some(b)) = (view.positions.get(conn.from), view.positions.get(conn.to)) else { return };
    let arrow = Stroke::new(Color::BLACK, ARROW_WIDTH);
    let thin = Stroke::new(Color::BLACK, 1.0);
    match conn.kind {
        ConnectionKind::Turn { dir } => turn_arrow(canvas, a.point(), b.point(), dir, view.cfg.column_step(), arrow),
        ConnectionKind::Straight | ConnectionKind::Vertical => {
            straight_arrow(canvas, a.point(), b.point(), view.cfg.stitch_size / 2.0, arrow)
        }
        ConnectionKind::Round => canvas.line(a.point(), b.point(), thin),
        ConnectionKind::Along => {
            let (cx, cy) = view.cfg.center();
            let center = Vec2::new(cx, cy);
            let mid_radius = center.dist(a.point()) * ALONG_PULL;
            let mid_theta = (a.theta.unwrap_or(0.0) + b.theta.unwrap_or(0.0)) / 2.0;
            canvas.quadratic(a.point(), polar(center, mid_radius, mid_theta), b.point(), thin);
        }
        ConnectionKind::Link => canvas.line(a.point(), b.point(), Stroke::new(Color::GRAY, 1.0)),
    }
}

fn arrow_head<C: Canvas + ?Sized>(canvas: &mut C, tip: Vec2, angle: f32, stroke: Stroke) {
    for side in [-1.0f32, 1.0] {
        let a = angle + side * PI / 6.0;
        canvas.line(tip, Vec2::new(tip.x - ARROW_SIZE * a.cos(), tip.y - ARROW_SIZE * a.sin()), stroke);
    }
}

/// Line from `a` toward `b` that stops `rim` short of `b`, with a head.
pub fn straight_arrow<C: Canvas + ?Sized>(canvas: &mut C, a: Vec2, b: Vec2, rim: f32, stroke: Stroke) {
    let angle = (b.y - a.y).atan2(b.x - a.x);
    let stop = Vec2::new(b.x - rim * angle.cos(), b.y - rim * angle.sin());
    canvas.line(a, stop, stroke);
    arrow_head(canvas, stop, angle, stroke);
}

/// Curve bulging to side `dir` by half a column step, head near the end.
pub fn turn_arrow<C: Canvas + ?Sized>(canvas: &mut C, a: Vec2, b: Vec2, dir: i8, col_step: f32, stroke: Stroke) {
    let off = f32::from(dir) * col_step / 2.0;
    let curve = CubicBezier::new(a, Vec2::new(a.x + off, a.y), Vec2::new(b.x + off, b.y), b);
    canvas.bezier(curve.p0, curve.p1, curve.p2, curve.p3, stroke);
    let tip = curve.eval(TURN_HEAD_T);
    let t = curve.tangent(TURN_HEAD_T);
    arrow_head(canvas, tip, t.y.atan2(t.x), stroke);
}

fn draw_node<C: Canvas + ?Sized>(canvas: &mut C, view: &ChartView<'_>, node: &Position, count: u32) {
    let Some(token) = node.stitch.as_deref() else { return };
    let cfg = view.cfg;
    let at = node.coord();
    let selected = view.selection.contains(at);
    let grayed = is_grayed(cfg, count);
    let base = node_color(cfg, view.colors, at, token);
    let fill = match (selected, grayed) {
        (_, true) => Color::GRAY,
        (true, false) => Color::SELECTED,
        (false, false) => base,
    };
    let rotation = match view.mode {
        LayoutMode::Round => node.theta.unwrap_or(0.0) + 90.0,
        _ => 0.0,
    };
    if cfg.expert_view {
        let ink = match (selected, grayed) {
            (_, true) => Color::GRAY,
            (true, false) => Color::SELECTED,
            (false, false) => view.colors.get(at).unwrap_or(Color::BLACK),
        };
        draw_symbol(canvas, node.point(), rotation, token, ink, fill, cfg.stitch_size);
    } else {
        let d = cfg.stitch_size;
        canvas.ellipse(node.point(), d, d, rotation, Paint::fill(fill));
        canvas.text(node.point(), display_label(token), LABEL_SIZE, Color::WHITE);
    }
}

/// Expert chart symbol for `token`, upright in local space and turned by
/// `rotation` degrees around `center`.
pub fn draw_symbol<C: Canvas + ?Sized>(
    canvas: &mut C,
    center: Vec2,
    rotation: f32,
    token: &str,
    ink: Color,
    fill: Color,
    size: f32,
) {
    let kind = StitchKind::of(token);
    if let StitchKind::Combined(parts) = &kind {
        let n = parts.len() as f32;
        for (i, part) in components(token).enumerate() {
            let shift = Vec2::new((i as f32 - (n - 1.0) / 2.0) * size / 3.0, 0.0);
            draw_symbol(canvas, place_rotated(center, shift, rotation), rotation, part, ink, fill, size);
        }
        return;
    }
    let h = size / 2.0;
    let pen = Stroke::new(ink, 1.5);
    let seg = |canvas: &mut C, x0: f32, y0: f32, x1: f32, y1: f32| {
        canvas.line(
            place_rotated(center, Vec2::new(x0, y0), rotation),
            place_rotated(center, Vec2::new(x1, y1), rotation),
            pen,
        );
    };
    match kind {
        StitchKind::Chain => canvas.ellipse(center, size * 0.6, size * 0.25, rotation, Paint::stroke(pen)),
        StitchKind::Single => seg(canvas, 0.0, -h / 2.0, 0.0, h / 2.0),
        StitchKind::HalfDouble => {
            seg(canvas, 0.0, -h * 0.75, 0.0, h * 0.75);
            seg(canvas, -5.0, -h * 0.75, 5.0, -h * 0.75);
        }
        StitchKind::Double => {
            seg(canvas, 0.0, -h, 0.0, h);
            seg(canvas, -5.0, -h * 0.3, 5.0, -h * 0.7);
        }
        StitchKind::Treble => {
            seg(canvas, 0.0, -h * 1.2, 0.0, h * 1.2);
            seg(canvas, -5.0, -h * 0.8, 5.0, -h * 0.8);
            seg(canvas, -5.0, 0.0, 5.0, 0.0);
        }
        StitchKind::Combined(_) => {}
        StitchKind::Custom(_) => {
            let d = size * 2.0 / 3.0;
            canvas.ellipse(center, d, d, rotation, Paint { fill: Some(fill), stroke: Some(pen) });
            canvas.text(center, display_label(token), SYMBOL_LABEL_SIZE, Color::BLACK);
        }
    }
}

fn draw_selection<C: Canvas + ?Sized>(canvas: &mut C, view: &ChartView<'_>) {
    let pen = Stroke::new(Color::SELECTION_STROKE, 2.0);
    if let Some(r) = view.selection.drag_rect() {
        let corners = [r.min, Vec2::new(r.max.x, r.min.y), r.max, Vec2::new(r.min.x, r.max.y)];
        for i in 0..4 {
            canvas.line(corners[i], corners[(i + 1) % 4], pen);
        }
    }
    let ring = view.cfg.stitch_size + RING_PAD;
    for &at in view.selection.cells() {
        if let Some(p) = view.positions.get(at).filter(|p| p.is_stitch()) {
            canvas.ellipse(p.point(), ring, ring, 0.0, Paint::stroke(pen));
        }
    }
}
