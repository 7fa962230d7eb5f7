use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

/// Browser handle on one chart session.
#[wasm_bindgen]
pub struct Session { pub(crate) inner: stitchgrid::Session }

impl Session {
    pub fn rs_new() -> Session { Session { inner: stitchgrid::Session::default() } }
    pub fn rs_version(&self) -> u64 { self.inner.version() }
}
