use js_sys::{Array, Reflect};
use stitchgrid_wasm::Session;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok")).ok().and_then(|x| x.as_bool()).unwrap_or(false)
}

#[wasm_bindgen_test]
fn fuzz_strict_methods_no_abort() {
    let mut s = Session::new();
    s.load_pattern("ch ch ch ch sc sc sc ch dc dc dc");

    // Simple LCG
    let mut seed: u64 = 0x1234_5678_ABCD_EF01;
    let mut rnd = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        (seed >> 16) as u32
    };

    for _ in 0..500u32 {
        let op = rnd() % 8;
        let ver_before = s.version();
        let key = JsValue::from_str(&format!("{}-{}", rnd() % 5, rnd() % 5));
        let cells: JsValue = [key].into_iter().collect::<Array>().into();
        let res = match op {
            0 => s.pointer_press_res(f32::from_bits(rnd()), f32::from_bits(rnd()), (rnd() % 5) as i16),
            1 => s.pick_res(f32::from_bits(rnd()), f32::from_bits(rnd())),
            2 => s.set_mode_res((rnd() % 5) as u8),
            3 => s.select_cells_res(cells),
            4 => s.select_cells_res(JsValue::from_str("0-0")),
            5 => s.change_color_res(cells_or_bad(&mut rnd), "#12345"),
            6 => s.change_stitch_type_res(cells_or_bad(&mut rnd), Some(" ".into())),
            7 => s.set_config_res(JsValue::from_f64(rnd() as f64)),
            _ => unreachable!(),
        };
        // No aborts and no state mutation on error paths
        if !is_ok(&res) {
            assert_eq!(s.version(), ver_before);
        }
    }

    assert!(is_ok(&s.pick_res(50.0, 50.0)));
    assert!(is_ok(&s.set_mode_res(0)));
}

fn cells_or_bad(rnd: &mut impl FnMut() -> u32) -> JsValue {
    let key = if rnd() % 2 == 0 { "0-0" } else { "zero" };
    [JsValue::from_str(key)].into_iter().collect::<Array>().into()
}
