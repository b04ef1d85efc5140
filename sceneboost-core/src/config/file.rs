//! Zone specification files.
//!
//! A zone file is TOML with an optional `[probe]` table, a `[default]` zone
//! table and any number of `[zones.<key>]` tables:
//!
//! ```toml
//! [probe]
//! crfs = [16.0, 24.0]
//!
//! [default]
//! metric_target = 0.62
//!
//! [zones.credits]
//! metric_enable = false
//! unboosted_crf = 32.0
//! ```
//!
//! Each named zone starts from the `[default]` table; top-level keys it sets
//! replace the default's value wholesale (nested tables are not merged).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_PROBE_CRFS, DEFAULT_PROBING_PRESET, ZoneConfig};
use crate::error::{CoreError, CoreResult};

/// Key under which the default zone can be referenced from a zones string.
pub const DEFAULT_ZONE_KEY: &str = "default";

/// Settings for the whole-file probe encodes. Shared by every zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub crfs: Vec<f64>,
    pub preset: i32,
    pub params: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            crfs: DEFAULT_PROBE_CRFS.to_vec(),
            preset: DEFAULT_PROBING_PRESET,
            params: Vec::new(),
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.crfs.is_empty() {
            return Err(CoreError::Config("at least one probe crf is required".into()));
        }
        if let Some(bad) = self.crfs.iter().find(|c| !c.is_finite()) {
            return Err(CoreError::Config(format!("probe crf {bad} is not finite")));
        }
        Ok(())
    }

    /// Probe crfs sorted ascending with duplicates removed.
    pub fn distinct_crfs(&self) -> Vec<f64> {
        let mut crfs = self.crfs.clone();
        crfs.sort_by(f64::total_cmp);
        crfs.dedup();
        crfs
    }
}

/// The default zone plus every named zone of a file.
#[derive(Debug, Clone, Default)]
pub struct ZoneSpecs {
    pub probe: ProbeConfig,
    default: ZoneConfig,
    zones: BTreeMap<String, ZoneConfig>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawZoneFile {
    #[serde(default)]
    probe: ProbeConfig,
    #[serde(default)]
    default: toml::Table,
    #[serde(default)]
    zones: BTreeMap<String, toml::Table>,
}

impl ZoneSpecs {
    pub fn new(probe: ProbeConfig, default: ZoneConfig) -> Self {
        Self {
            probe,
            default,
            zones: BTreeMap::new(),
        }
    }

    /// Parses a zone file body.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let raw: RawZoneFile = toml::from_str(contents)?;

        let default: ZoneConfig = toml::Value::Table(raw.default.clone()).try_into()?;
        let mut specs = Self::new(raw.probe, default);

        for (key, overrides) in raw.zones {
            let mut merged = raw.default.clone();
            merged.extend(overrides);
            let zone: ZoneConfig = toml::Value::Table(merged).try_into().map_err(|e| {
                CoreError::Config(format!("zone '{key}': {e}"))
            })?;
            specs.insert(&key, zone)?;
        }

        specs.validate()?;
        debug!(
            "Loaded zone specs with {} named zone(s): {:?}",
            specs.zones.len(),
            specs.zones.keys().collect::<Vec<_>>()
        );
        Ok(specs)
    }

    /// Reads and parses a zone file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read zone file '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Registers a named zone. Keys must be non-empty and free of whitespace
    /// since zones strings are whitespace-tokenised.
    pub fn insert(&mut self, key: &str, zone: ZoneConfig) -> CoreResult<()> {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(CoreError::Config(format!(
                "zone key '{key}' must be non-empty and contain no whitespace"
            )));
        }
        if key == DEFAULT_ZONE_KEY {
            self.default = zone;
        } else {
            self.zones.insert(key.to_string(), zone);
        }
        Ok(())
    }

    pub fn default_zone(&self) -> &ZoneConfig {
        &self.default
    }

    /// Looks up a zone by key; `default` names the default zone.
    pub fn get(&self, key: &str) -> Option<&ZoneConfig> {
        if key == DEFAULT_ZONE_KEY {
            Some(&self.default)
        } else {
            self.zones.get(key)
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.probe.validate()?;
        self.default
            .validate()
            .map_err(|e| CoreError::Config(format!("default zone: {e}")))?;
        for (key, zone) in &self.zones {
            zone.validate()
                .map_err(|e| CoreError::Config(format!("zone '{key}': {e}")))?;
        }
        Ok(())
    }
}
