use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::core::error::FxError;
use crate::domain::config::QualityConfig;
use crate::systems::effects::{MeteorShower, Nebula, StarField};

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Setup,
    Update(f64),
    Render,
    Tier(QualityTier),
    Click,
    Resize,
    Teardown,
}

type Log = Rc<RefCell<Vec<Event>>>;

struct Recorder {
    name: &'static str,
    log: Log,
    fail_setup: bool,
}

impl Recorder {
    fn boxed(name: &'static str, log: &Log) -> Box<dyn Effect> {
        Box::new(Recorder { name, log: Rc::clone(log), fail_setup: false })
    }

    fn failing(log: &Log) -> Box<dyn Effect> {
        Box::new(Recorder { name: "broken", log: Rc::clone(log), fail_setup: true })
    }
}

impl Effect for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn setup(&mut self, _ctx: &EffectContext) -> FxResult<()> {
        self.log.borrow_mut().push(Event::Setup);
        if self.fail_setup {
            return Err(FxError::MissingRenderContext);
        }
        Ok(())
    }

    fn on_tier_change(&mut self, change: &TierChange, _ctx: &EffectContext) {
        self.log.borrow_mut().push(Event::Tier(change.tier));
    }

    fn update(&mut self, ctx: &EffectContext) {
        self.log.borrow_mut().push(Event::Update(ctx.dt_ms));
    }

    fn render(&self, out: &mut DrawList) {
        self.log.borrow_mut().push(Event::Render);
        out.circle(10.0, 10.0, 2.0, Color::WHITE, 1.0);
    }

    fn teardown(&mut self) {
        self.log.borrow_mut().push(Event::Teardown);
    }

    fn active_entities(&self) -> usize {
        1
    }

    fn resize(&mut self, _ctx: &EffectContext) {
        self.log.borrow_mut().push(Event::Resize);
    }

    fn on_click(&mut self, _position: Vec2, _ctx: &EffectContext) {
        self.log.borrow_mut().push(Event::Click);
    }
}

fn fast_quality() -> FxConfig {
    FxConfig {
        quality: QualityConfig { window_size: 5, dwell_samples: 5, ..QualityConfig::default() },
        ..FxConfig::default()
    }
}

fn scene(config: FxConfig) -> SceneCore {
    SceneCore::with_kernels(
        config,
        Viewport::new(1280.0, 720.0),
        &DeviceHint::default(),
        KernelTable::fallback("test"),
    )
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[test]
fn frame_updates_then_renders_over_background() {
    let log = new_log();
    let mut s = scene(FxConfig::default());
    s.mount(Recorder::boxed("a", &log)).unwrap();

    let list = s.frame(1000.0);
    assert_eq!(list.len(), 2);
    assert_eq!(list.commands()[0], DrawCommand::Clear { color: BACKGROUND, alpha: 1.0 });

    let events = log.borrow().clone();
    assert_eq!(events[0], Event::Setup);
    assert!(matches!(events[1], Event::Update(_)));
    assert_eq!(events[2], Event::Render);
    assert_eq!(s.frame_count(), 1);
}

#[test]
fn tier_change_reaches_effects_before_their_update() {
    let log = new_log();
    let mut s = scene(fast_quality());
    s.mount(Recorder::boxed("a", &log)).unwrap();

    // 20 fps, well under the low threshold.
    for i in 0..30 {
        s.frame(i as f64 * 50.0);
    }
    assert_eq!(s.tier(), QualityTier::Performance);

    let events = log.borrow();
    let at = events
        .iter()
        .position(|e| *e == Event::Tier(QualityTier::Performance))
        .unwrap();
    assert!(matches!(events[at + 1], Event::Update(_)));
}

#[test]
fn failed_setup_leaves_siblings_running() {
    let log = new_log();
    let mut s = scene(FxConfig::default());
    s.mount(Recorder::boxed("ok", &log)).unwrap();

    let err = s.mount(Recorder::failing(&log)).unwrap_err();
    assert_eq!(err, FxError::MissingRenderContext);
    assert_eq!(s.effect_names(), vec!["ok"]);
    // The failed effect still got torn down.
    assert_eq!(log.borrow().iter().filter(|e| **e == Event::Teardown).count(), 1);

    s.frame(0.0);
    assert_eq!(s.draw_list().len(), 2);
}

#[test]
fn teardown_is_unconditional() {
    let log = new_log();
    let mut s = scene(FxConfig::default());
    s.mount(Recorder::boxed("a", &log)).unwrap();
    s.mount(Recorder::boxed("b", &log)).unwrap();
    s.frame(0.0);

    s.teardown();
    assert_eq!(s.effect_count(), 0);
    assert!(s.draw_list().is_empty());
    assert_eq!(log.borrow().iter().filter(|e| **e == Event::Teardown).count(), 2);

    // Nothing left to tear down; a second call is harmless.
    s.teardown();
    assert_eq!(log.borrow().iter().filter(|e| **e == Event::Teardown).count(), 2);
}

#[test]
fn unmount_removes_by_name() {
    let log = new_log();
    let mut s = scene(FxConfig::default());
    s.mount(Recorder::boxed("a", &log)).unwrap();
    s.mount(Recorder::boxed("b", &log)).unwrap();
    assert!(s.unmount("a"));
    assert!(!s.unmount("a"));
    assert_eq!(s.effect_names(), vec!["b"]);
}

#[test]
fn long_gap_is_clamped() {
    let log = new_log();
    let mut s = scene(FxConfig::default());
    s.mount(Recorder::boxed("a", &log)).unwrap();
    s.frame(0.0);
    s.frame(5000.0);

    let last_dt = log
        .borrow()
        .iter()
        .rev()
        .find_map(|e| match e {
            Event::Update(dt) => Some(*dt),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_dt, s.config().timer.max_delta_ms);
}

#[test]
fn stats_are_zero_until_enabled() {
    let mut s = scene(FxConfig::default());
    s.frame(0.0);
    assert_eq!(s.stats().frame(), 0);

    s.enable_stats(true);
    for i in 1..=10 {
        s.frame(i as f64 * 16.0);
    }
    let stats = s.stats();
    assert_eq!(stats.frame(), 11);
    assert!((stats.fps() - 62.5).abs() < 1.0);
    assert_eq!(stats.draw_commands(), 1);
    assert_eq!(stats.tier(), "balanced");

    s.enable_stats(false);
    assert_eq!(s.stats().frame(), 0);
}

#[test]
fn pinned_preference_is_delivered_and_holds() {
    let log = new_log();
    let mut s = scene(fast_quality());
    s.mount(Recorder::boxed("a", &log)).unwrap();

    s.set_quality_preference(Some(QualityTier::Ultra));
    assert!(log.borrow().contains(&Event::Tier(QualityTier::Ultra)));

    for i in 0..30 {
        s.frame(i as f64 * 50.0);
    }
    assert_eq!(s.tier(), QualityTier::Ultra);

    s.set_quality_preference(None);
    for i in 30..60 {
        s.frame(i as f64 * 50.0);
    }
    assert_ne!(s.tier(), QualityTier::Ultra);
}

#[test]
fn outside_listener_sees_changes() {
    let mut s = scene(FxConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = s.subscribe(move |c| sink.borrow_mut().push(c.tier));

    s.set_quality_preference(Some(QualityTier::Performance));
    assert!(s.unsubscribe(id));
    s.set_quality_preference(Some(QualityTier::Ultra));
    assert_eq!(*seen.borrow(), vec![QualityTier::Performance]);
}

#[test]
fn input_reaches_effects_and_speed() {
    let log = new_log();
    let mut s = scene(FxConfig::default());
    s.mount(Recorder::boxed("a", &log)).unwrap();

    s.frame(0.0);
    s.click(100.0, 100.0, 0.0);
    s.frame(16.0);
    assert!(log.borrow().contains(&Event::Click));
    assert!(s.speed_multiplier() > 1.0);

    s.resize(800.0, 600.0);
    assert!(log.borrow().contains(&Event::Resize));
    assert_eq!(s.viewport(), Viewport::new(800.0, 600.0));
}

#[test]
fn real_effects_draw_clean_frames() {
    let config = FxConfig::default();
    let mut s = scene(config.clone());
    s.mount(Box::new(Nebula::new(config.seed))).unwrap();
    s.mount(Box::new(StarField::new(config.seed))).unwrap();
    s.mount(Box::new(MeteorShower::new(&config.pools, config.seed))).unwrap();

    for i in 0..240 {
        s.frame(i as f64 * 16.0);
        if i == 120 {
            s.pointer_move(640.0, 360.0, i as f64 * 16.0);
            s.click(640.0, 360.0, i as f64 * 16.0);
        }
    }
    assert_eq!(s.draw_list().dropped(), 0);
    assert!(s.draw_list().len() > 1);
    assert!(s.active_entities() > 0);

    s.teardown();
    assert_eq!(s.active_entities(), 0);
}
