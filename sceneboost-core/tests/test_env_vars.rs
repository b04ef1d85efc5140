use sceneboost_core::config::{DEFAULT_MIN_SCENE_LEN, DEFAULT_TARGET_SPLIT};
use sceneboost_core::ZoneConfig;
use std::env;

const VARS: [&str; 6] = [
    "SCENEBOOST_METRIC_ENABLE",
    "SCENEBOOST_METRIC_TARGET",
    "SCENEBOOST_MAX_CRF",
    "SCENEBOOST_CHARACTER_ENABLE",
    "SCENEBOOST_FINAL_PRESET",
    "SCENEBOOST_TARGET_SPLIT",
];

fn clear_vars() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

// Single test so the process environment is never mutated concurrently
#[test]
fn test_env_var_overrides() {
    clear_vars();

    unsafe {
        env::set_var("SCENEBOOST_METRIC_TARGET", "0.55");
        env::set_var("SCENEBOOST_MAX_CRF", "36");
        env::set_var("SCENEBOOST_CHARACTER_ENABLE", "1");
        env::set_var("SCENEBOOST_FINAL_PRESET", "2");
        // Unparsable values keep the default
        env::set_var("SCENEBOOST_TARGET_SPLIT", "thirty");
    }

    let config = ZoneConfig::from_env();
    assert_eq!(config.metric_target, 0.55);
    assert_eq!(config.max_crf, 36.0);
    assert!(config.character_enable);
    assert_eq!(config.final_preset, 2);
    assert_eq!(config.target_split, DEFAULT_TARGET_SPLIT);
    assert_eq!(config.min_scene_len, DEFAULT_MIN_SCENE_LEN);
    assert_eq!(config.final_video_params()[..2], ["--preset".to_string(), "2".to_string()]);

    // Word booleans are accepted; anything else keeps the default
    unsafe {
        env::set_var("SCENEBOOST_METRIC_ENABLE", " Off ");
        env::set_var("SCENEBOOST_CHARACTER_ENABLE", "maybe");
    }
    let config = ZoneConfig::from_env();
    assert!(!config.metric_enable);
    assert!(!config.character_enable);

    unsafe { env::set_var("SCENEBOOST_CHARACTER_ENABLE", "yes") };
    assert!(ZoneConfig::from_env().character_enable);

    clear_vars();
    let config = ZoneConfig::from_env();
    assert!(config.metric_enable);
    assert!(!config.character_enable);
}
