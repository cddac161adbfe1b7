use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::window;

use super::animation_loop::AnimationLoop;
use super::canvas::CanvasRenderer;
use super::frame_stats::FrameStats;
use super::SceneCore;
use crate::core::error::FxResult;
use crate::domain::config::FxConfig;
use crate::domain::tiers::{DeviceHint, QualityTier};
use crate::systems::effects::{Effect, MeteorShower, Nebula, SkillUniverse, StarField};

/// Tier-change events waiting for the JS callback. Filled from inside the
/// frame, emptied once no scene borrow is held, so the callback may call
/// back into the scene.
type EventQueue = Rc<RefCell<Vec<String>>>;
type JsCallback = Rc<RefCell<Option<Function>>>;

#[inline]
fn now_ms() -> f64 {
    window().and_then(|w| w.performance()).map_or(0.0, |p| p.now())
}

fn device_hint() -> DeviceHint {
    let Some(navigator) = window().map(|w| w.navigator()) else {
        return DeviceHint::default();
    };
    let cores = navigator.hardware_concurrency();
    DeviceHint {
        logical_cores: (cores.is_finite() && cores >= 1.0).then(|| cores as u32),
        device_memory_gb: None,
        is_mobile: navigator.user_agent().map_or(false, |ua| ua.contains("Mobi")),
    }
}

fn flush_events(events: &RefCell<Vec<String>>, callback: &RefCell<Option<Function>>) {
    let pending: Vec<String> = events.borrow_mut().drain(..).collect();
    if pending.is_empty() {
        return;
    }
    let Some(cb) = callback.borrow().clone() else {
        return;
    };
    for json in pending {
        if let Err(e) = cb.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            fx_warn!("tier change callback threw: {:?}", e);
        }
    }
}

fn tick(core: &RefCell<SceneCore>, renderer: &CanvasRenderer, now: f64) -> FxResult<()> {
    let mut core = core.borrow_mut();
    let list = core.frame(now);
    renderer.draw(list)
}

#[wasm_bindgen]
pub struct FxScene {
    core: Rc<RefCell<SceneCore>>,
    renderer: Rc<CanvasRenderer>,
    animation: Option<AnimationLoop>,
    events: EventQueue,
    callback: JsCallback,
}

#[wasm_bindgen]
impl FxScene {
    /// Bind to `<canvas id=canvas_id>`. `config_json` may be omitted for
    /// defaults; a bad config is an error, not a silent fallback.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config_json: Option<String>) -> Result<FxScene, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => FxConfig::from_json(json)?,
            None => FxConfig::default(),
        };
        let renderer = CanvasRenderer::from_element_id(canvas_id)?;
        let viewport = renderer.fit_to_display()?;
        let mut core = SceneCore::with_device_hint(config, viewport, &device_hint())?;

        let events: EventQueue = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&events);
        core.subscribe(move |change| queue.borrow_mut().push(change.to_json()));

        fx_log!(
            "FxScene on #{}: {}x{}, tier {}, {} kernels",
            canvas_id,
            viewport.width,
            viewport.height,
            core.tier().as_str(),
            core.backend().as_str()
        );

        Ok(FxScene {
            core: Rc::new(RefCell::new(core)),
            renderer: Rc::new(renderer),
            animation: None,
            events,
            callback: Rc::new(RefCell::new(None)),
        })
    }

    // === Effects ===

    pub fn mount_meteors(&mut self) -> bool {
        let (pools, seed) = {
            let core = self.core.borrow();
            (core.config().pools.clone(), core.config().seed)
        };
        self.mount_effect(Box::new(MeteorShower::new(&pools, seed)))
    }

    pub fn mount_nebula(&mut self) -> bool {
        let seed = self.core.borrow().config().seed;
        self.mount_effect(Box::new(Nebula::new(seed)))
    }

    pub fn mount_star_field(&mut self) -> bool {
        let seed = self.core.borrow().config().seed;
        self.mount_effect(Box::new(StarField::new(seed)))
    }

    /// `skills_json` is `[{ "name", "category", "level" }, ...]`.
    pub fn mount_skills(&mut self, skills_json: &str) -> bool {
        let (pools, seed) = {
            let core = self.core.borrow();
            (core.config().pools.clone(), core.config().seed)
        };
        match SkillUniverse::from_json(skills_json, &pools, seed) {
            Ok(universe) => self.mount_effect(Box::new(universe)),
            Err(e) => {
                fx_warn!("skill universe: {}", e);
                false
            }
        }
    }

    pub fn unmount(&mut self, name: &str) -> bool {
        self.core.borrow_mut().unmount(name)
    }

    // === Loop ===

    /// Drive frames from `requestAnimationFrame` until `stop`/`destroy`.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.animation.as_ref().map_or(false, |a| a.is_running()) {
            return Ok(());
        }
        let core = Rc::clone(&self.core);
        let renderer = Rc::clone(&self.renderer);
        let events = Rc::clone(&self.events);
        let callback = Rc::clone(&self.callback);
        let mut warned = false;
        let animation = AnimationLoop::start(move |now| {
            if let Err(e) = tick(&core, &renderer, now) {
                if !warned {
                    fx_warn!("draw failed: {}", e);
                    warned = true;
                }
            }
            flush_events(&events, &callback);
        })?;
        self.animation = Some(animation);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.stop();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.animation.as_ref().map_or(false, |a| a.is_running())
    }

    /// One frame by hand, for hosts that run their own loop.
    pub fn render_frame(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let result = tick(&self.core, &self.renderer, now_ms);
        flush_events(&self.events, &self.callback);
        result.map_err(JsValue::from)
    }

    /// Stop the loop and tear every effect down. The scene stays usable:
    /// effects can be mounted again and the loop restarted.
    pub fn destroy(&mut self) {
        self.stop();
        self.core.borrow_mut().teardown();
        self.events.borrow_mut().clear();
        self.callback.borrow_mut().take();
    }

    // === Quality ===

    /// `"performance" | "balanced" | "ultra"` pins a tier; `"auto"` or
    /// nothing goes back to measured adaptation.
    pub fn set_quality_preference(&mut self, preference: Option<String>) -> Result<(), JsValue> {
        let tier = match preference.as_deref() {
            None | Some("auto") => None,
            Some(name) => Some(
                QualityTier::parse(name)
                    .ok_or_else(|| JsValue::from_str(&format!("unknown quality tier: {}", name)))?,
            ),
        };
        self.core.borrow_mut().set_quality_preference(tier);
        flush_events(&self.events, &self.callback);
        Ok(())
    }

    /// Called with a JSON string `{ tier, previous, settings }` after every
    /// tier change. Replaces any earlier callback.
    pub fn on_tier_change(&mut self, callback: Function) {
        *self.callback.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen(getter)]
    pub fn tier(&self) -> String {
        self.core.borrow().tier().as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn backend(&self) -> String {
        self.core.borrow().backend().as_str().to_string()
    }

    pub fn settings_json(&self) -> String {
        self.core.borrow().quality().get_settings().to_json()
    }

    // === Input ===

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.core.borrow_mut().pointer_move(x, y, now_ms());
    }

    pub fn pointer_leave(&mut self) {
        self.core.borrow_mut().pointer_leave();
    }

    pub fn click(&mut self, x: f32, y: f32) {
        self.core.borrow_mut().click(x, y, now_ms());
    }

    pub fn scroll(&mut self, delta_y: f32) {
        self.core.borrow_mut().scroll(delta_y, now_ms());
    }

    // === Viewport / stats ===

    /// Re-read the canvas' displayed size; call from a resize observer.
    pub fn resize(&mut self) -> Result<(), JsValue> {
        let viewport = self.renderer.fit_to_display()?;
        self.core.borrow_mut().resize(viewport.width, viewport.height);
        Ok(())
    }

    pub fn enable_stats(&mut self, enabled: bool) {
        self.core.borrow_mut().enable_stats(enabled);
    }

    pub fn stats(&self) -> FrameStats {
        self.core.borrow().stats()
    }

    pub fn effect_count(&self) -> usize {
        self.core.borrow().effect_count()
    }
}

impl FxScene {
    fn mount_effect(&mut self, effect: Box<dyn Effect>) -> bool {
        self.core.borrow_mut().mount(effect).is_ok()
    }
}

impl Drop for FxScene {
    fn drop(&mut self) {
        self.stop();
    }
}
