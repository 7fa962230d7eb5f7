use crate::Session;
use crate::{error, interop};
use js_sys::{Array, Function};
use std::str::FromStr;
use stitchgrid::limits;
use stitchgrid::{CellCoord, ChartConfig, Color, LayoutMode, PointerButton};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `["row-col", ...]` from the host into coordinates.
fn parse_cells(v: JsValue) -> Result<Vec<CellCoord>, JsValue> {
    let keys: Vec<String> =
        serde_wasm_bindgen::from_value(v).map_err(|e| error::json_parse(format!("expected an array of cell keys: {}", e)))?;
    keys.iter().map(|k| CellCoord::from_str(k).map_err(|_| error::invalid_cell(k))).collect()
}

fn check_point(x: f32, y: f32) -> Option<JsValue> {
    for (param, v) in [("x", x), ("y", y)] {
        if !v.is_finite() {
            return Some(error::non_finite(param));
        }
        if !limits::in_coord_bounds(v) {
            return Some(error::out_of_range(param, limits::COORD_MIN, limits::COORD_MAX, v));
        }
    }
    None
}

#[wasm_bindgen]
impl Session {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Session {
        crate::Session::rs_new()
    }
    pub fn version(&self) -> u64 {
        self.rs_version()
    }

    // Pattern

    /// Parses `text` and returns the normalized pattern.
    pub fn load_pattern(&mut self, text: &str) -> String {
        self.inner.load_pattern(text);
        self.inner.pattern().to_string()
    }
    pub fn pattern(&self) -> String {
        self.inner.pattern().to_string()
    }
    /// Grid rows with `null` for empty cells.
    pub fn get_grid(&self) -> JsValue {
        interop::to_js(self.inner.grid().rows())
    }
    pub fn row_count(&self) -> u32 {
        self.inner.grid().row_count() as u32
    }
    pub fn stitch_count(&self) -> u32 {
        self.inner.grid().stitch_count() as u32
    }

    // Configuration

    pub fn set_config(&mut self, v: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => ChartConfig::from_json_value(val).and_then(|c| self.inner.set_config(c)).is_ok(),
            Err(_) => false,
        }
    }
    pub fn set_config_res(&mut self, v: JsValue) -> JsValue {
        let val = match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => val,
            Err(e) => return error::json_parse(e.to_string()),
        };
        match ChartConfig::from_json_value(val).and_then(|c| self.inner.set_config(c)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::from_core(&e),
        }
    }
    pub fn get_config(&self) -> JsValue {
        interop::to_js(self.inner.config())
    }
    pub fn set_mode(&mut self, mode: u8) -> bool {
        match LayoutMode::from_u8(mode) {
            Some(m) => {
                self.inner.set_mode(m);
                true
            }
            None => false,
        }
    }
    pub fn set_mode_res(&mut self, mode: u8) -> JsValue {
        match LayoutMode::from_u8(mode) {
            Some(m) => {
                self.inner.set_mode(m);
                error::ok(JsValue::TRUE)
            }
            None => error::invalid_mode(mode),
        }
    }
    pub fn set_playback(&mut self, stitches_done: u32, is_playing: bool) {
        self.inner.set_playback(stitches_done, is_playing);
    }
    pub fn set_expert_view(&mut self, on: bool) {
        self.inner.set_expert_view(on);
    }

    // Layout

    pub fn get_positions(&self) -> JsValue {
        interop::to_js(&self.inner.positions().rows)
    }
    /// Stitched nodes as typed arrays: `cells` is `[row, col, ...]`,
    /// `positions` is `[x, y, ...]`, `colors` is `[r, g, b, a, ...]` fills.
    pub fn get_node_data(&self) -> JsValue {
        let cfg = self.inner.config();
        let colors = self.inner.colors();
        let mut cells = Vec::new();
        let mut pos = Vec::new();
        let mut rgba = Vec::new();
        for n in self.inner.positions().nodes() {
            let Some(token) = n.stitch.as_deref() else { continue };
            cells.extend([n.row as u32, n.col as u32]);
            pos.extend([n.x, n.y]);
            let c = stitchgrid::draw::node_color(cfg, colors, n.coord(), token);
            rgba.extend([c.r, c.g, c.b, c.a]);
        }
        let obj = interop::new_obj();
        interop::set_kv(&obj, "cells", &interop::arr_u32(&cells).into());
        interop::set_kv(&obj, "positions", &interop::arr_f32(&pos).into());
        interop::set_kv(&obj, "colors", &interop::arr_u8(&rgba).into());
        obj.into()
    }
    pub fn get_connections(&self) -> JsValue {
        interop::to_js(self.inner.connections())
    }
    pub fn physics_tick(&mut self) -> bool {
        self.inner.physics_tick()
    }
    pub fn physics_settled(&self) -> bool {
        self.inner.physics_settled()
    }

    // Selection

    pub fn pointer_press(&mut self, x: f32, y: f32, button: i16) -> bool {
        PointerButton::from_dom(button).is_some_and(|b| self.inner.pointer_press(x, y, b))
    }
    pub fn pointer_press_res(&mut self, x: f32, y: f32, button: i16) -> JsValue {
        if let Some(e) = check_point(x, y) {
            return e;
        }
        match PointerButton::from_dom(button) {
            Some(b) => error::ok(JsValue::from_bool(self.inner.pointer_press(x, y, b))),
            None => error::invalid_button(button),
        }
    }
    pub fn pointer_drag(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_drag(x, y)
    }
    pub fn pointer_release(&mut self, x: f32, y: f32) -> u32 {
        self.inner.pointer_release(x, y) as u32
    }
    pub fn is_selecting(&self) -> bool {
        self.inner.selection().is_selecting()
    }
    pub fn get_selected_cells(&self) -> JsValue {
        interop::cell_keys(self.inner.selected_cells()).into()
    }
    pub fn select_cells(&mut self, keys: JsValue) -> u32 {
        match parse_cells(keys) {
            Ok(cells) => self.inner.select_cells(&cells) as u32,
            Err(_) => 0,
        }
    }
    pub fn select_cells_res(&mut self, keys: JsValue) -> JsValue {
        match parse_cells(keys) {
            Ok(cells) => error::ok(JsValue::from_f64(self.inner.select_cells(&cells) as f64)),
            Err(e) => e,
        }
    }
    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }
    /// `{ cell, dist }` for the stitch under the pointer, or `null`.
    pub fn pick(&self, x: f32, y: f32) -> JsValue {
        match self.inner.pick(x, y) {
            Some((at, dist)) => {
                let obj = interop::new_obj();
                interop::set_kv(&obj, "cell", &JsValue::from_str(&at.key()));
                interop::set_kv(&obj, "dist", &JsValue::from_f64(dist as f64));
                obj.into()
            }
            None => JsValue::NULL,
        }
    }
    pub fn pick_res(&self, x: f32, y: f32) -> JsValue {
        if let Some(e) = check_point(x, y) {
            return e;
        }
        error::ok(self.pick(x, y))
    }
    /// Right-click: calls `show_menu(x, y, cells)` when something is selected.
    pub fn context_menu(&self, x: f32, y: f32, show_menu: &Function) -> bool {
        self.inner.secondary_action(x, y, |x, y, cells| {
            let res = show_menu.call3(
                &JsValue::NULL,
                &JsValue::from_f64(x as f64),
                &JsValue::from_f64(y as f64),
                &interop::cell_keys(cells).into(),
            );
            if let Err(e) = res {
                web_sys::console::warn_2(&JsValue::from_str("stitchgrid: context menu callback threw"), &e);
            }
        })
    }

    // Editing

    pub fn delete_selected(&mut self) -> JsValue {
        interop::to_js(&self.inner.delete_selected())
    }
    pub fn duplicate_selected(&mut self) -> JsValue {
        interop::to_js(&self.inner.duplicate_selected())
    }
    /// Retypes the cells; without `stitch_type` the type cycle advances.
    pub fn change_stitch_type(&mut self, keys: JsValue, stitch_type: Option<String>) -> JsValue {
        let Ok(cells) = parse_cells(keys) else { return JsValue::NULL };
        match self.inner.change_stitch_type(&cells, stitch_type.as_deref()) {
            Ok(out) => interop::to_js(&out),
            Err(_) => JsValue::NULL,
        }
    }
    pub fn change_stitch_type_res(&mut self, keys: JsValue, stitch_type: Option<String>) -> JsValue {
        let cells = match parse_cells(keys) {
            Ok(c) => c,
            Err(e) => return e,
        };
        match self.inner.change_stitch_type(&cells, stitch_type.as_deref()) {
            Ok(out) => error::ok(interop::to_js(&out)),
            Err(e) => error::from_core(&e),
        }
    }
    pub fn change_color(&mut self, keys: JsValue, color: &str) -> bool {
        match (parse_cells(keys), Color::from_hex(color)) {
            (Ok(cells), Ok(c)) => self.inner.change_color(&cells, c).changed > 0,
            _ => false,
        }
    }
    pub fn change_color_res(&mut self, keys: JsValue, color: &str) -> JsValue {
        let cells = match parse_cells(keys) {
            Ok(c) => c,
            Err(e) => return e,
        };
        match Color::from_hex(color) {
            Ok(c) => error::ok(interop::to_js(&self.inner.change_color(&cells, c))),
            Err(e) => error::from_core(&e),
        }
    }
    /// `{ "row-col": "#RRGGBB", ... }`
    pub fn get_color_map(&self) -> JsValue {
        let obj = interop::new_obj();
        for (k, v) in self.inner.colors().to_entries() {
            interop::set_kv(&obj, &k, &JsValue::from_str(&v));
        }
        obj.into()
    }

    // Drawing

    pub fn draw_commands(&self) -> JsValue {
        interop::to_js(&self.inner.draw_list())
    }
    pub fn to_svg(&self) -> String {
        self.inner.to_svg()
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Cell keys of every stitch in working order, for playback controls.
#[wasm_bindgen]
pub fn working_order_keys(session: &Session) -> Array {
    let s = &session.inner;
    let order = stitchgrid::draw::working_order(s.positions(), s.mode());
    let cells: Vec<CellCoord> = order.into_iter().map(|p| p.coord()).collect();
    interop::cell_keys(&cells)
}
