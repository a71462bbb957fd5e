use marionette_core::{
    AssetError, CharacterAssets, Config, Controller, EmotionCategory, FsAssetSource,
    MemoryAssetSource, Mode, ParamMap,
};
use marionette_test_fixtures::characters;

fn fixtures() -> FsAssetSource {
    FsAssetSource::new(marionette_test_fixtures::root())
}

#[test]
fn loads_sample_character_from_disk() {
    let model = characters::model("hiyori").expect("fixture");
    let assets = CharacterAssets::load(&fixtures(), &model, &Config::default()).expect("load");

    let names: Vec<&str> = assets.expression_names().collect();
    // wink.exp3.json is referenced by the manifest but missing on disk
    assert_eq!(names, ["normal", "happy", "enjoy", "sad", "surprise"]);
    assert!(assets.actions.state(Mode::Talking).unwrap().mouth.is_some());
    assert_eq!(assets.actions.action("shake").unwrap().repeat, 2);

    let surprise = &assets.expressions["surprise"];
    assert_eq!(surprise.fade_in_time, 0.2);
    assert_eq!(
        surprise.param("ParamBrowLY").unwrap().blend,
        marionette_core::BlendMode::Add
    );
}

#[test]
fn missing_actions_document_leaves_controller_inert() {
    let model = characters::model("mute").expect("fixture");
    let mut c: Controller<ParamMap> = Controller::with_seed(Config::default(), 3);
    let err = c.init(ParamMap::new(), &fixtures(), &model).unwrap_err();
    assert!(matches!(err, AssetError::Read { .. }));
    assert!(err.path().ends_with("actions.json"));
    assert!(!c.is_loaded());

    c.trigger_action("nod");
    c.set_mode(Mode::Talking);
    assert!(c.tick(0.0).is_empty());
    assert!(c.tick(16.0).is_empty());
    assert!(c.rig().unwrap().is_empty());
}

#[test]
fn retry_after_failed_init_succeeds() {
    let mut c: Controller<ParamMap> = Controller::with_seed(Config::default(), 3);
    let mute = characters::model("mute").unwrap();
    assert!(c.init(ParamMap::new(), &fixtures(), &mute).is_err());

    let hiyori = characters::model("hiyori").unwrap();
    c.init(ParamMap::new(), &fixtures(), &hiyori).expect("init");
    assert!(c.is_loaded());
    assert!(!c.tick(0.0).is_empty());
}

#[test]
fn custom_actions_file_name() {
    let src = MemoryAssetSource::new()
        .with("npc/npc.model3.json", r#"{ "FileReferences": {} }"#)
        .with(
            "npc/moves.json",
            r#"{ "states": { "idle": { "loop": false, "params": { "ParamAngleZ": 1.5 } } } }"#,
        );
    let cfg = Config {
        actions_file: "moves.json".into(),
        ..Config::default()
    };
    let mut c: Controller<ParamMap> = Controller::with_seed(cfg, 5);
    c.init(ParamMap::new(), &src, "npc/npc.model3.json").expect("init");
    assert!(c.available_expressions().is_empty());
    assert!(!c.set_emotion(EmotionCategory::Positive));
    assert_eq!(c.tick(0.0)["ParamAngleZ"], 1.5);
}

#[test]
fn invalid_keyframes_fail_initialisation() {
    let src = MemoryAssetSource::new().with(
        "bad/actions.json",
        r#"{ "actions": { "nod": { "duration": 500, "repeat": 1, "keyframes": [
            { "t": 1.5, "params": { "ParamAngleY": 1.0 } }
        ] } } }"#,
    );
    let mut c: Controller<ParamMap> = Controller::with_seed(Config::default(), 5);
    let err = c.init(ParamMap::new(), &src, "bad/bad.model3.json").unwrap_err();
    assert!(matches!(err, AssetError::Invalid { .. }), "{err}");
}

#[test]
fn overflowing_mouth_range_fails_initialisation() {
    let src = MemoryAssetSource::new().with(
        "loud/actions.json",
        r#"{ "states": { "talking": { "loop": true,
            "mouth": { "param": "ParamMouthOpenY", "speed": 120, "min": -3e38, "max": 3e38 } } } }"#,
    );
    let mut c: Controller<ParamMap> = Controller::with_seed(Config::default(), 5);
    let err = c.init(ParamMap::new(), &src, "loud/loud.model3.json").unwrap_err();
    assert!(matches!(err, AssetError::Invalid { .. }), "{err}");

    c.set_mode(Mode::Talking);
    assert!(c.tick(16.0).is_empty());
}

#[test]
fn expression_with_infinite_value_is_not_selectable() {
    let src = MemoryAssetSource::new()
        .with(
            "c/c.model3.json",
            r#"{ "FileReferences": { "Expressions": [ { "File": "normal.exp3.json" } ] } }"#,
        )
        .with(
            "c/actions.json",
            r#"{ "states": { "idle": { "loop": true,
                "params": { "ParamAngleX": 10.0, "ParamEyeLOpen": 1.0 } } } }"#,
        )
        .with(
            "c/normal.exp3.json",
            r#"{ "Parameters": [ { "Id": "ParamEyeLOpen", "Value": 1e39, "Blend": "Multiply" } ] }"#,
        );
    let mut c: Controller<ParamMap> = Controller::with_seed(Config::default(), 5);
    c.init(ParamMap::new(), &src, "c/c.model3.json").expect("init");
    assert!(c.available_expressions().is_empty());
    assert!(!c.set_emotion(EmotionCategory::Normal));

    let mut frame = ParamMap::new();
    for i in 0..10 {
        frame = c.tick(f64::from(i) * 16.0).clone();
    }
    assert_eq!(frame["ParamAngleX"], 10.0);
    assert_eq!(frame["ParamEyeLOpen"], 1.0);
}
