//! Scenes taken from an externally supplied scene list.

use log::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::scenes::{Scene, ScenesFile};
use crate::zones::ResolvedZone;

/// Clips an external scene list to a zone.
///
/// Scene boundaries strictly inside the zone are kept; the zone's own start and
/// end are always boundaries. The first and last pieces are therefore cut off
/// when the zone edge falls inside an external scene, and such truncated pieces
/// may be shorter than `min_scene_len` (warned, not fatal).
pub fn clip_to_zone(external: &ScenesFile, zone: &ResolvedZone) -> CoreResult<Vec<Scene>> {
    external
        .check_contiguous(false)
        .map_err(|e| CoreError::ExternalScenes(e.to_string()))?;

    let reaches_end = external
        .scenes
        .last()
        .is_some_and(|s| s.end_frame >= zone.end_frame);
    if !reaches_end {
        return Err(CoreError::ExternalScenes(format!(
            "no scene reaches the end of zone [{}:{}]",
            zone.start_frame, zone.end_frame
        )));
    }

    let mut bounds = vec![zone.start_frame];
    bounds.extend(
        external
            .scenes
            .iter()
            .map(|s| s.start_frame)
            .filter(|&f| f > zone.start_frame && f < zone.end_frame),
    );
    bounds.push(zone.end_frame);

    let min_scene_len = zone.config.min_scene_len;
    let is_boundary = |f: usize| external.scenes.iter().any(|s| s.start_frame == f || s.end_frame == f);

    let scenes: Vec<Scene> = bounds
        .windows(2)
        .map(|w| Scene::new(w[0], w[1]))
        .collect();

    for scene in &scenes {
        if scene.len() >= min_scene_len {
            continue;
        }
        let truncated = !is_boundary(scene.start_frame) || !is_boundary(scene.end_frame);
        if truncated {
            warn!(
                "Frame [{}:{}] / A scene from the external scenes is cut off by the zone boundary into a scene shorter than {} frames",
                scene.start_frame, scene.end_frame, min_scene_len
            );
        } else {
            debug!(
                "Frame [{}:{}] / External scene is shorter than min_scene_len {}",
                scene.start_frame, scene.end_frame, min_scene_len
            );
        }
    }
    Ok(scenes)
}

/// Copies av1an scenes for a zone. Av1an was run with the same zones, so its
/// scene list must contain the zone start and end as exact boundaries.
pub fn copy_av1an(av1an: &ScenesFile, zone: &ResolvedZone, frame_count: usize) -> CoreResult<Vec<Scene>> {
    if av1an.frame_count != frame_count {
        return Err(CoreError::ExternalScenes(format!(
            "av1an scenes describe {} frames but the source has {}",
            av1an.frame_count, frame_count
        )));
    }
    av1an
        .check_contiguous(true)
        .map_err(|e| CoreError::ExternalScenes(format!("av1an scenes: {e}")))?;

    let scenes: Vec<Scene> = av1an
        .scenes
        .iter()
        .filter(|s| s.start_frame >= zone.start_frame && s.start_frame < zone.end_frame)
        .map(|s| Scene::new(s.start_frame, s.end_frame))
        .collect();

    let aligned = scenes.first().is_some_and(|s| s.start_frame == zone.start_frame)
        && scenes.last().is_some_and(|s| s.end_frame == zone.end_frame);
    if !aligned {
        return Err(CoreError::ExternalScenes(format!(
            "av1an scenes do not align with zone [{}:{}]",
            zone.start_frame, zone.end_frame
        )));
    }
    Ok(scenes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;

    fn zone(start: usize, end: usize, min_scene_len: usize) -> ResolvedZone {
        ResolvedZone {
            start_frame: start,
            end_frame: end,
            key: "default".into(),
            config: ZoneConfig {
                min_scene_len,
                ..ZoneConfig::default()
            },
        }
    }

    fn list(bounds: &[usize]) -> ScenesFile {
        let scenes = bounds.windows(2).map(|w| Scene::new(w[0], w[1])).collect();
        ScenesFile::new(*bounds.last().unwrap(), scenes)
    }

    fn ranges(scenes: &[Scene]) -> Vec<(usize, usize)> {
        scenes.iter().map(|s| (s.start_frame, s.end_frame)).collect()
    }

    #[test]
    fn clip_truncates_both_edges() {
        let external = list(&[0, 30, 50, 80, 100]);
        let scenes = clip_to_zone(&external, &zone(40, 90, 5)).unwrap();
        assert_eq!(ranges(&scenes), vec![(40, 50), (50, 80), (80, 90)]);
    }

    #[test]
    fn zone_inside_one_scene_is_one_scene() {
        let external = list(&[0, 100]);
        let scenes = clip_to_zone(&external, &zone(10, 20, 5)).unwrap();
        assert_eq!(ranges(&scenes), vec![(10, 20)]);
    }

    #[test]
    fn short_list_is_fatal() {
        let external = list(&[0, 30, 60]);
        let result = clip_to_zone(&external, &zone(40, 90, 5));
        assert!(matches!(result, Err(CoreError::ExternalScenes(_))));
    }

    #[test]
    fn av1an_requires_alignment() {
        let av1an = list(&[0, 30, 50, 100]);
        let scenes = copy_av1an(&av1an, &zone(30, 100, 5), 100).unwrap();
        assert_eq!(ranges(&scenes), vec![(30, 50), (50, 100)]);

        assert!(copy_av1an(&av1an, &zone(40, 100, 5), 100).is_err());
        assert!(copy_av1an(&av1an, &zone(30, 70, 5), 100).is_err());
        assert!(copy_av1an(&av1an, &zone(30, 100, 5), 120).is_err());
    }
}
