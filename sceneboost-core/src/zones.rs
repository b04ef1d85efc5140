// ============================================================================
// sceneboost-core/src/zones.rs
// ============================================================================
//
// ZONES: Resolving a Zones String into a Partition of the File
//
// A zones string is a whitespace-separated list of `start_frame end_frame key`
// triples. Resolution sorts the triples by start frame, validates them against
// the file length and fills every uncovered range with the default zone, so
// the result always partitions `[0, frame_count)`.
//
// AI-ASSISTANT-INFO: Zone string parsing and partition resolution

// ---- External crate imports ----
use log::warn;

// ---- Standard library imports ----
use std::path::Path;

// ---- Internal crate imports ----
use crate::config::{ZoneConfig, ZoneSpecs};
use crate::error::{CoreError, CoreResult};

/// A zone bound to its frame range.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedZone {
    pub start_frame: usize,
    pub end_frame: usize,
    pub key: String,
    pub config: ZoneConfig,
}

impl ResolvedZone {
    pub fn len(&self) -> usize {
        self.end_frame - self.start_frame
    }

    pub fn is_empty(&self) -> bool {
        self.end_frame == self.start_frame
    }

    pub fn contains(&self, frame: usize) -> bool {
        (self.start_frame..self.end_frame).contains(&frame)
    }
}

#[derive(Debug)]
struct ZoneEntry {
    start: i64,
    end: i64,
    key: String,
}

fn parse_frame(token: &str) -> CoreResult<i64> {
    token.parse().map_err(|_| {
        CoreError::InvalidZone(format!(
            "'{token}' is not a frame number; zones are written as `start_frame end_frame zone_key`"
        ))
    })
}

fn tokenize(zones: &str) -> CoreResult<Vec<ZoneEntry>> {
    let tokens: Vec<&str> = zones.split_whitespace().collect();
    if tokens.len() % 3 != 0 {
        return Err(CoreError::InvalidZone(format!(
            "expected `start_frame end_frame zone_key` triples, found {} leftover token(s)",
            tokens.len() % 3
        )));
    }

    let mut entries: Vec<ZoneEntry> = Vec::with_capacity(tokens.len() / 3);
    for triple in tokens.chunks_exact(3) {
        let entry = ZoneEntry {
            start: parse_frame(triple[0])?,
            end: parse_frame(triple[1])?,
            key: triple[2].to_string(),
        };
        // Insert before the first entry starting later, keeping input order for equal starts
        let position = entries
            .iter()
            .position(|e| e.start > entry.start)
            .unwrap_or(entries.len());
        entries.insert(position, entry);
    }
    Ok(entries)
}

/// Resolves a zones string into a gap-free partition of `[0, frame_count)`.
///
/// An empty or whitespace-only string yields a single default zone.
pub fn resolve_zones(zones: &str, specs: &ZoneSpecs, frame_count: usize) -> CoreResult<Vec<ResolvedZone>> {
    if frame_count == 0 {
        return Err(CoreError::InvalidZone("the source has no frames".into()));
    }
    if zones.trim().is_empty() {
        warn!("Zones input is empty. Continuing with no zoning...");
    }

    let n = frame_count as i64;
    let default_zone = |start_frame: usize, end_frame: usize| ResolvedZone {
        start_frame,
        end_frame,
        key: crate::config::DEFAULT_ZONE_KEY.to_string(),
        config: specs.default_zone().clone(),
    };

    let mut resolved = Vec::new();
    let mut head: usize = 0;
    for entry in tokenize(zones)? {
        if entry.start < 0 {
            return Err(CoreError::InvalidZone(format!(
                "negative start_frame {} in zone '{}'",
                entry.start, entry.key
            )));
        }
        if entry.start < head as i64 {
            return Err(CoreError::ZoneOverlap {
                start: entry.start as usize,
                previous_end: head,
            });
        }
        if entry.start > n - 1 {
            warn!(
                "Skipping zone '{}' with out of bound start_frame {}...",
                entry.key, entry.start
            );
            continue;
        }

        let end = match entry.end {
            e if e <= -2 => {
                return Err(CoreError::InvalidZone(format!("invalid end_frame {e}")));
            }
            -1 => n,
            e if e > n => {
                warn!(
                    "Out of bound end_frame {e} in zone '{}'. Clamping end_frame to {n}. Use -1 as end_frame to silence this warning.",
                    entry.key
                );
                n
            }
            e => e,
        };
        if end <= entry.start {
            return Err(CoreError::InvalidZone(format!(
                "zone '{}' has start_frame {} and end_frame {}",
                entry.key, entry.start, end
            )));
        }

        let config = specs
            .get(&entry.key)
            .ok_or_else(|| CoreError::UnknownZoneKey(entry.key.clone()))?
            .clone();

        let (start, end) = (entry.start as usize, end as usize);
        if start > head {
            resolved.push(default_zone(head, start));
        }
        resolved.push(ResolvedZone {
            start_frame: start,
            end_frame: end,
            key: entry.key,
            config,
        });
        head = end;
    }

    if head < frame_count {
        resolved.push(default_zone(head, frame_count));
    }
    Ok(resolved)
}

/// Reads a zones file and resolves it like [`resolve_zones`].
pub fn load_zones(path: &Path, specs: &ZoneSpecs, frame_count: usize) -> CoreResult<Vec<ResolvedZone>> {
    let contents = std::fs::read_to_string(path)?;
    resolve_zones(&contents, specs, frame_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> ZoneSpecs {
        let mut specs = ZoneSpecs::default();
        let credits = ZoneConfig {
            metric_enable: false,
            ..ZoneConfig::default()
        };
        specs.insert("credits", credits).unwrap();
        specs
    }

    fn ranges(zones: &[ResolvedZone]) -> Vec<(usize, usize, &str)> {
        zones
            .iter()
            .map(|z| (z.start_frame, z.end_frame, z.key.as_str()))
            .collect()
    }

    #[test]
    fn empty_string_is_one_default_zone() {
        let zones = resolve_zones("  \n", &specs(), 100).unwrap();
        assert_eq!(ranges(&zones), vec![(0, 100, "default")]);
    }

    #[test]
    fn gaps_are_filled_and_entries_sorted() {
        let zones = resolve_zones("60 -1 credits\n10 20 credits", &specs(), 100).unwrap();
        assert_eq!(
            ranges(&zones),
            vec![
                (0, 10, "default"),
                (10, 20, "credits"),
                (20, 60, "default"),
                (60, 100, "credits"),
            ]
        );
        assert!(!zones[1].config.metric_enable);
    }

    #[test]
    fn overlap_is_fatal() {
        let result = resolve_zones("0 50 credits 40 60 credits", &specs(), 100);
        assert!(matches!(
            result,
            Err(CoreError::ZoneOverlap {
                start: 40,
                previous_end: 50
            })
        ));
    }

    #[test]
    fn unknown_key_is_fatal() {
        let result = resolve_zones("0 50 opening", &specs(), 100);
        assert!(matches!(result, Err(CoreError::UnknownZoneKey(k)) if k == "opening"));
    }

    #[test]
    fn leftover_tokens_are_fatal() {
        assert!(matches!(
            resolve_zones("0 50", &specs(), 100),
            Err(CoreError::InvalidZone(_))
        ));
    }

    #[test]
    fn end_before_start_is_fatal() {
        assert!(resolve_zones("30 30 credits", &specs(), 100).is_err());
        assert!(resolve_zones("30 -2 credits", &specs(), 100).is_err());
    }

    #[test]
    fn out_of_bound_end_is_clamped() {
        let zones = resolve_zones("90 500 credits", &specs(), 100).unwrap();
        assert_eq!(ranges(&zones), vec![(0, 90, "default"), (90, 100, "credits")]);
    }

    #[test]
    fn out_of_bound_start_is_skipped() {
        let zones = resolve_zones("150 -1 credits", &specs(), 100).unwrap();
        assert_eq!(ranges(&zones), vec![(0, 100, "default")]);
    }
}
