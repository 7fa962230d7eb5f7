use wasm_bindgen::prelude::*;
use js_sys::{Object, Reflect};

fn set_kv(obj: &Object, k: &str, v: &JsValue) { let _ = Reflect::set(obj, &JsValue::from_str(k), v); }

fn new_obj() -> Object { Object::new() }

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let message = message.into();
    web_sys::console::warn_1(&JsValue::from_str(&format!("stitchgrid: {}: {}", code, message)));
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f32, max: f32, got: f32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min as f64));
    set_kv(&d, "max", &JsValue::from_f64(max as f64));
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_cell(key: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "key", &JsValue::from_str(key));
    err("invalid_cell", format!("invalid cell key '{}', expected row-col", key), Some(d.into()))
}

#[inline]
pub fn invalid_mode(got: u8) -> JsValue {
    let d = new_obj(); set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("invalid_mode", "mode must be 0:Linear, 1:Round, 2:Physics", Some(d.into()))
}

#[inline]
pub fn invalid_button(got: i16) -> JsValue {
    let d = new_obj(); set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("invalid_button", "button must be 0:Left, 1:Middle, 2:Right", Some(d.into()))
}

#[inline]
pub fn json_parse(message: impl Into<String>) -> JsValue { err("json_parse", message, None) }

/// Envelope for an error raised by the core crate.
pub fn from_core(e: &stitchgrid::Error) -> JsValue {
    use stitchgrid::Error;
    match e {
        Error::NonFinite { param } => non_finite(param),
        Error::OutOfRange { param, min, max, got } => out_of_range(param, *min, *max, *got),
        Error::InvalidCell(key) => invalid_cell(key),
        Error::InvalidColor(s) | Error::InvalidStitch(s) => {
            let d = new_obj(); set_kv(&d, "got", &JsValue::from_str(s));
            err(e.code(), e.to_string(), Some(d.into()))
        }
        Error::Config(_) => err(e.code(), e.to_string(), None),
    }
}
