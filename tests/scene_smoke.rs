use cosmos_fx::{FxConfig, MeteorShower, Nebula, SceneCore, SkillUniverse, StarField, Viewport};

const SKILLS: &str = r#"[
    {"name": "Rust", "category": "Languages", "level": 90},
    {"name": "TypeScript", "category": "Languages", "level": 80},
    {"name": "WebGL", "category": "Graphics", "level": 60}
]"#;

#[test]
fn scene_smoke_frames() {
    let config = FxConfig::from_json(r#"{"seed": 7}"#).unwrap();
    let mut scene = SceneCore::new(config.clone(), Viewport::new(1280.0, 720.0)).unwrap();
    scene.mount(Box::new(Nebula::new(config.seed))).unwrap();
    scene.mount(Box::new(StarField::new(config.seed))).unwrap();
    scene.mount(Box::new(MeteorShower::new(&config.pools, config.seed))).unwrap();
    scene
        .mount(Box::new(SkillUniverse::from_json(SKILLS, &config.pools, config.seed).unwrap()))
        .unwrap();
    scene.enable_stats(true);

    for i in 0..120 {
        scene.frame(i as f64 * 16.7);
    }
    let stats = scene.stats();
    assert_eq!(stats.effects(), 4);
    assert!(stats.draw_commands() > 1);
    assert_eq!(stats.dropped_draws(), 0);
    assert!(stats.update_ms() >= 0.0);
}

#[test]
fn bad_config_is_rejected() {
    assert!(FxConfig::from_json(r#"{"quality": {"low_fps": 60, "high_fps": 30}}"#).is_err());
    assert!(FxConfig::from_json("not json").is_err());
}
