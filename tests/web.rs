#![cfg(target_arch = "wasm32")]

use cosmos_fx::FxScene;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_id(id);
    canvas.set_width(640);
    canvas.set_height(360);
    document.body().unwrap().append_child(&canvas).unwrap();
}

#[wasm_bindgen_test]
fn scene_renders_frames() {
    canvas("fx-a");
    let mut scene = FxScene::new("fx-a", None).unwrap();
    assert!(scene.mount_nebula());
    assert!(scene.mount_star_field());
    assert!(scene.mount_meteors());
    scene.enable_stats(true);
    for i in 0..10 {
        scene.render_frame(i as f64 * 16.0).unwrap();
    }
    assert_eq!(scene.stats().effects(), 3);
    scene.destroy();
    assert_eq!(scene.effect_count(), 0);
}

#[wasm_bindgen_test]
fn missing_canvas_is_an_error() {
    assert!(FxScene::new("no-such-canvas", None).is_err());
}

#[wasm_bindgen_test]
fn quality_preference_is_validated() {
    canvas("fx-b");
    let mut scene = FxScene::new("fx-b", None).unwrap();
    scene.set_quality_preference(Some("ultra".into())).unwrap();
    assert_eq!(scene.tier(), "ultra");
    assert!(scene.set_quality_preference(Some("extreme".into())).is_err());
    scene.set_quality_preference(Some("auto".into())).unwrap();
}
