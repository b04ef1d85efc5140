//! Tests for zone files and zones strings read from disk
//!
//! These tests verify:
//! - Named zones inherit the [default] table
//! - Unknown keys and invalid values are rejected
//! - A zones file resolves into a gap-free partition

use sceneboost_core::config::MetricMethod;
use sceneboost_core::{CoreError, Summariser, ZoneConfig, ZoneSpecs, load_zones};
use std::fs;
use tempfile::tempdir;

const ZONE_FILE: &str = r#"
[probe]
crfs = [14.0, 22.0, 30.0]
preset = 7

[default]
metric_target = 0.7
metric_method = "vapoursynth"
summariser = { method = "percentile", percentile = 5.0 }

[zones.credits]
metric_enable = false
unboosted_crf = 32.0
"#;

#[test]
fn test_zone_file_parsing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("zones.toml");
    fs::write(&path, ZONE_FILE)?;

    let specs = ZoneSpecs::load(&path)?;
    assert_eq!(specs.probe.crfs, vec![14.0, 22.0, 30.0]);
    assert_eq!(specs.probe.preset, 7);

    let default = specs.default_zone();
    assert_eq!(default.metric_target, 0.7);
    assert_eq!(default.metric_method, MetricMethod::Vapoursynth);
    assert_eq!(default.summariser, Summariser::Percentile { percentile: 5.0 });

    // Inherited from [default], overridden where set
    let credits = specs.get("credits").expect("credits zone");
    assert!(!credits.metric_enable);
    assert_eq!(credits.unboosted_crf, 32.0);
    assert_eq!(credits.metric_target, 0.7);
    assert_eq!(credits.max_crf, ZoneConfig::default().max_crf);

    Ok(())
}

#[test]
fn test_zone_file_rejects_bad_values() {
    let unknown = ZoneSpecs::from_toml_str("[default]\nmetric_targt = 0.7\n");
    assert!(matches!(unknown, Err(CoreError::TomlParse(_))));

    let inverted = ZoneSpecs::from_toml_str("[zones.fast]\nmin_crf = 30.0\nmax_crf = 20.0\n");
    assert!(matches!(inverted, Err(CoreError::Config(ref m)) if m.contains("fast")));

    let missing = ZoneSpecs::load(std::path::Path::new("does/not/exist.toml"));
    assert!(matches!(missing, Err(CoreError::Config(_))));
}

#[test]
fn test_zones_file_resolves_partition() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("zones.txt");
    fs::write(&path, "0 60 credits\n")?;

    let specs = ZoneSpecs::from_toml_str(ZONE_FILE)?;
    let zones = load_zones(&path, &specs, 120)?;
    let ranges: Vec<_> = zones
        .iter()
        .map(|z| (z.start_frame, z.end_frame, z.key.as_str()))
        .collect();
    assert_eq!(ranges, vec![(0, 60, "credits"), (60, 120, "default")]);
    assert!(!zones[0].config.metric_enable);
    assert!(zones[1].config.metric_enable);

    fs::write(&path, "0 60 trailer\n")?;
    let unknown = load_zones(&path, &specs, 120);
    assert!(matches!(unknown, Err(CoreError::UnknownZoneKey(ref k)) if k == "trailer"));

    Ok(())
}
