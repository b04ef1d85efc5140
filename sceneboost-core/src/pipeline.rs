// ============================================================================
// sceneboost-core/src/pipeline.rs
// ============================================================================
//
// BOOST PIPELINE: Orchestration of One Boosting Run
//
// 1. Measure (or reload) the DiffSeries checkpoint.
// 2. Detect scenes per zone (or reload the scenes checkpoint).
// 3. Run one probe encode per distinct probe crf.
// 4. Per scene, in parallel: sample frames, score them on every probe,
//    summarise, fit the quality model, solve for the target, build the ROI
//    map, apply the final crf adjustment and fill in `zone_overrides`.
// 5. Write the scenes file and, optionally, an av1an zones file.
//
// Scenes only share read-only data (DiffSeries, zones, collaborators), so the
// per-scene stage is a plain rayon map. Fatal errors from any scene abort the
// run; recoverable conditions travel as diagnostics in the scene report.
//
// AI-ASSISTANT-INFO: Pipeline orchestration, per-scene parallel boosting

// ---- External crate imports ----
use log::{debug, info, warn};
use rayon::prelude::*;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

// ---- Internal crate imports ----
use crate::assessed::Diagnostic;
use crate::checkpoint::{Workspace, write_atomic};
use crate::config::{ZoneConfig, ZoneSpecs};
use crate::detection::{DetectionInputs, detect_scenes};
use crate::error::{CoreError, CoreResult};
use crate::external::{
    FrameSource, MetricEvaluators, ProbeEncoder, ProbeHandle, SceneCutDetector, SegmentationModel,
    check_score_count,
};
use crate::progress::{NullProgressCallback, ProgressCallback, ProgressEvent, Stage};
use crate::quality::{ProbeResult, QualityModel, adjust_final_crf, round_to_quarter, solve};
use crate::roi::{RoiBoostMapper, roi_sample_frames, write_roi_map};
use crate::sampling::{FrameSampler, SampleSet, SamplingParams};
use crate::scenes::{Scene, ScenesFile, ZoneOverrides, av1an_zone_line, format_crf};
use crate::stats::DiffSeries;
use crate::zones::ResolvedZone;

static NULL_PROGRESS: NullProgressCallback = NullProgressCallback;

const ENCODER_NAME: &str = "svt_av1";

// ============================================================================
// RESULTS
// ============================================================================

/// What happened to one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneReport {
    pub index: usize,
    pub scene: Scene,
    pub zone_key: String,
    pub samples: Vec<usize>,
    pub probe: Option<ProbeResult>,
    /// Crf from the solver, before the final adjustment.
    pub solved_crf: Option<f64>,
    pub roi_crf_offset: f64,
    pub roi_map: Option<PathBuf>,
    pub final_crf: f64,
    pub diagnostics: Vec<Diagnostic>,
    /// Final encoder parameters after `--crf`, excluding the ROI map.
    pub video_params: Vec<String>,
    pub params_reset: bool,
}

/// Boosted scenes plus per-scene reports.
#[derive(Debug, Clone)]
pub struct BoostOutcome {
    pub scenes: ScenesFile,
    pub reports: Vec<SceneReport>,
}

impl BoostOutcome {
    pub fn write_scenes(&self, path: &Path) -> CoreResult<()> {
        self.scenes.save(path)?;
        info!("Scenes written to {}", path.display());
        Ok(())
    }

    /// Writes an av1an zones file with one line per scene.
    pub fn write_av1an_zones(&self, path: &Path) -> CoreResult<()> {
        let mut text = String::new();
        for report in &self.reports {
            text.push_str(&av1an_zone_line(
                &report.scene,
                report.final_crf,
                report.params_reset,
                &report.video_params,
                report.roi_map.as_deref(),
            ));
            text.push('\n');
        }
        write_atomic(path, text.as_bytes())?;
        info!("Zones written to {}", path.display());
        Ok(())
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Ties the zone settings, the checkpoint workspace and the external
/// collaborators together.
pub struct BoostPipeline<'a> {
    specs: &'a ZoneSpecs,
    workspace: Workspace,
    encoder: Option<&'a dyn ProbeEncoder>,
    metrics: MetricEvaluators<'a>,
    segmentation: Option<&'a dyn SegmentationModel>,
    progress: &'a dyn ProgressCallback,
    verbose: bool,
}

impl<'a> BoostPipeline<'a> {
    pub fn new(specs: &'a ZoneSpecs, workspace: Workspace) -> Self {
        Self {
            specs,
            workspace,
            encoder: None,
            metrics: MetricEvaluators::default(),
            segmentation: None,
            progress: &NULL_PROGRESS,
            verbose: false,
        }
    }

    pub fn with_encoder(mut self, encoder: &'a dyn ProbeEncoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricEvaluators<'a>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_segmentation(mut self, segmentation: &'a dyn SegmentationModel) -> Self {
        self.segmentation = Some(segmentation);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Reports every scene, not only the noteworthy ones.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Loads the DiffSeries checkpoint or measures `source`.
    pub fn measure(&self, source: &dyn FrameSource) -> CoreResult<DiffSeries> {
        self.progress.on_progress(ProgressEvent::StageStart {
            stage: Stage::Measure,
            total: source.frame_count(),
        });
        let series = DiffSeries::load_or_measure(&self.workspace.scene_detection_dir(), source)?;
        self.progress.on_progress(ProgressEvent::StageComplete { stage: Stage::Measure });
        Ok(series)
    }

    /// Loads the scenes checkpoint when it matches the series, otherwise
    /// detects scenes and saves them.
    pub fn detect(&self, zones: &[ResolvedZone], inputs: &DetectionInputs<'_>) -> CoreResult<ScenesFile> {
        let path = self.workspace.scenes_path();
        if path.exists() {
            let scenes = ScenesFile::load(&path)?;
            if scenes.frame_count == inputs.series.len() && scenes.check_contiguous(true).is_ok() {
                info!("Reusing scenes from {}", path.display());
                return Ok(scenes);
            }
            info!("Scenes checkpoint does not match the source. Detecting scenes again...");
        }

        let scenes = detect_scenes(zones, inputs)?;
        scenes.save(&path)?;
        Ok(scenes)
    }

    /// Sample frames of every scene, in scene order.
    pub fn sample(&self, series: &DiffSeries, zones: &[ResolvedZone], scenes: &ScenesFile) -> CoreResult<Vec<SampleSet>> {
        check_series(series, scenes)?;
        scenes
            .scenes
            .par_iter()
            .map(|scene| {
                let zone = zone_for(zones, scene)?;
                Ok(sampler_for(&zone.config).sample(series, scene))
            })
            .collect()
    }

    /// Runs one probe encode per distinct probe crf.
    pub fn probe(&self, scenes: &ScenesFile) -> CoreResult<Vec<ProbeHandle>> {
        let encoder = self
            .encoder
            .ok_or_else(|| CoreError::Config("probe encodes require a probe encoder".to_string()))?;
        let crfs = self.specs.probe.distinct_crfs();

        self.progress.on_progress(ProgressEvent::StageStart {
            stage: Stage::ProbeEncode,
            total: crfs.len(),
        });
        let mut handles = Vec::with_capacity(crfs.len());
        for crf in crfs {
            info!("Encoding probe at crf {}...", format_crf(crf));
            handles.push(encoder.encode(crf, &self.specs.probe, scenes)?);
            self.progress.on_progress(ProgressEvent::ProbeDone { crf });
        }
        self.progress.on_progress(ProgressEvent::StageComplete {
            stage: Stage::ProbeEncode,
        });
        Ok(handles)
    }

    /// Computes the final crf and overrides of every scene.
    pub fn boost(&self, series: &DiffSeries, zones: &[ResolvedZone], scenes: &ScenesFile) -> CoreResult<BoostOutcome> {
        check_series(series, scenes)?;
        scenes.check_contiguous(true)?;
        self.check_collaborators(zones)?;

        let needs_probes = zones.iter().any(|z| z.config.metric_enable);
        let handles = if needs_probes { self.probe(scenes)? } else { Vec::new() };
        let roi_dir = if zones.iter().any(|z| z.config.character_enable) {
            Some(self.workspace.roi_maps_dir()?)
        } else {
            None
        };

        let label = SceneLabel::new(scenes);
        let scene_count = scenes.scenes.len();
        self.progress.on_progress(ProgressEvent::StageStart {
            stage: Stage::Boost,
            total: scene_count,
        });

        let reports: Vec<SceneReport> = scenes
            .scenes
            .par_iter()
            .enumerate()
            .map(|(index, scene)| {
                let zone = zone_for(zones, scene)?;
                let ctx = SceneContext {
                    index,
                    scene,
                    zone,
                    series,
                    handles: &handles,
                    roi_dir: roi_dir.as_deref(),
                    scene_count,
                };
                let report = self.boost_scene(&ctx)?;
                self.log_report(&report, &zone.config, &label);
                self.progress.on_progress(ProgressEvent::SceneDone {
                    index,
                    final_crf: report.final_crf,
                });
                Ok(report)
            })
            .collect::<CoreResult<_>>()?;

        self.progress.on_progress(ProgressEvent::StageComplete { stage: Stage::Boost });

        let boosted = reports
            .iter()
            .zip(zones_per_scene(zones, scenes)?)
            .map(|(report, zone)| Scene {
                zone_overrides: Some(zone_overrides(report, &zone.config)),
                ..report.scene.clone()
            })
            .collect();

        Ok(BoostOutcome {
            scenes: ScenesFile::new(scenes.frame_count, boosted),
            reports,
        })
    }

    /// Measure, detect and boost in one go.
    pub fn run(
        &self,
        source: &dyn FrameSource,
        zones: &[ResolvedZone],
        scene_cuts: Option<&dyn SceneCutDetector>,
        external_scenes: Option<&ScenesFile>,
        av1an_scenes: Option<&ScenesFile>,
    ) -> CoreResult<BoostOutcome> {
        let series = self.measure(source)?;
        let inputs = DetectionInputs {
            scene_cuts,
            external_scenes,
            av1an_scenes,
            ..DetectionInputs::new(&series, source.format())
        };
        let scenes = self.detect(zones, &inputs)?;
        self.boost(&series, zones, &scenes)
    }

    fn check_collaborators(&self, zones: &[ResolvedZone]) -> CoreResult<()> {
        for zone in zones {
            if zone.config.metric_enable {
                self.metrics.get(zone.config.metric_method)?;
            }
            if zone.config.character_enable && self.segmentation.is_none() {
                return Err(CoreError::Config(format!(
                    "zone '{}' enables character boost but no segmentation model is available",
                    zone.key
                )));
            }
        }
        Ok(())
    }

    fn boost_scene(&self, ctx: &SceneContext<'_>) -> CoreResult<SceneReport> {
        let config = &ctx.zone.config;
        let mut diagnostics = Vec::new();

        // STEP 1: metric-driven crf
        let (samples, probe, solved_crf) = if config.metric_enable {
            let samples = sampler_for(config).sample(ctx.series, ctx.scene);
            if samples.is_empty() {
                return Err(CoreError::OperationFailed(format!(
                    "scene {} [{}:{}] has no sampled frames to score",
                    ctx.index, ctx.scene.start_frame, ctx.scene.end_frame
                )));
            }
            let evaluator = self.metrics.get(config.metric_method)?;

            let mut scores = Vec::with_capacity(ctx.handles.len());
            for handle in ctx.handles {
                let frame_scores = evaluator.score_frames(handle, &samples.frames)?;
                check_score_count(&frame_scores, &samples.frames)?;
                let summary = config.summariser.summarise(&frame_scores);
                if !summary.value.is_finite() {
                    return Err(CoreError::OperationFailed(format!(
                        "scene {} summarised to {} at probe crf {}",
                        ctx.index, summary.value, handle.crf
                    )));
                }
                if let Some(d) = summary.diagnostic {
                    // one report per scene is enough
                    if !diagnostics.iter().any(|x| matches!(x, Diagnostic::UnreliableSummarisation { .. })) {
                        diagnostics.push(d);
                    }
                }
                scores.push(summary.value);
            }
            let crfs = ctx.handles.iter().map(|h| h.crf).collect();
            let probe = ProbeResult::new(crfs, scores)?;

            let model = QualityModel::fit(&probe, config.comparator, config.crf_response);
            if let Some(d) = model.diagnostic {
                // A flat model is harmless when every probe already meets the target
                let all_meet = probe
                    .scores
                    .iter()
                    .all(|&s| config.comparator.meets(s, config.metric_target));
                if all_meet {
                    debug!("Scene {} / {d}", ctx.index);
                } else {
                    diagnostics.push(d);
                }
            }

            let solved = solve(
                &model.value,
                config.comparator,
                config.metric_target,
                config.min_crf,
                config.max_crf,
            );
            diagnostics.extend(solved.diagnostic);
            (samples.frames, Some(probe), Some(solved.value))
        } else {
            (Vec::new(), None, None)
        };

        // STEP 2: character boost
        let (roi_map, roi_crf_offset) = match (config.character_enable, self.segmentation, ctx.roi_dir) {
            (true, Some(segmentation), Some(dir)) => {
                let masks = roi_sample_frames(ctx.scene)
                    .into_iter()
                    .map(|frame| segmentation.presence(frame))
                    .collect::<CoreResult<Vec<_>>>()?;
                let map = RoiBoostMapper::from_zone(config).map_masks(&masks)?;
                let path = write_roi_map(dir, ctx.index, ctx.scene_count, &map)?;
                (Some(path), map.crf_offset)
            }
            _ => (None, 0.0),
        };

        // STEP 3: final adjustment
        let final_crf = match solved_crf {
            Some(crf) => adjust_final_crf(crf, roi_crf_offset, config),
            None => round_to_quarter(config.unboosted_crf + roi_crf_offset).max(config.final_min_crf),
        };

        Ok(SceneReport {
            index: ctx.index,
            scene: Scene::new(ctx.scene.start_frame, ctx.scene.end_frame),
            zone_key: ctx.zone.key.clone(),
            samples,
            probe,
            solved_crf,
            roi_crf_offset,
            roi_map,
            final_crf,
            diagnostics,
            video_params: config.final_video_params(),
            params_reset: config.final_params_reset,
        })
    }

    fn log_report(&self, report: &SceneReport, config: &ZoneConfig, label: &SceneLabel) {
        let prefix = label.format(report.index, &report.scene);
        for diagnostic in &report.diagnostics {
            warn!("{prefix} / {diagnostic}");
        }
        if self.verbose || !report.diagnostics.is_empty() || report.final_crf < config.reporting_crf() {
            info!("{prefix} / OK / Final crf: {}", format_crf(report.final_crf));
        } else {
            debug!("{prefix} / OK / Final crf: {}", format_crf(report.final_crf));
        }
    }
}

struct SceneContext<'s> {
    index: usize,
    scene: &'s Scene,
    zone: &'s ResolvedZone,
    series: &'s DiffSeries,
    handles: &'s [ProbeHandle],
    roi_dir: Option<&'s Path>,
    scene_count: usize,
}

/// `Scene NNN Frame [  s:  e]` prefix with widths fixed for the whole file.
struct SceneLabel {
    scene_width: usize,
    frame_width: usize,
}

impl SceneLabel {
    fn new(scenes: &ScenesFile) -> Self {
        Self {
            scene_width: scenes.scenes.len().max(1).to_string().len(),
            frame_width: scenes.frame_count.max(1).to_string().len(),
        }
    }

    fn format(&self, index: usize, scene: &Scene) -> String {
        format!(
            "Scene {index:0sw$} Frame [{:>fw$}:{:>fw$}]",
            scene.start_frame,
            scene.end_frame,
            sw = self.scene_width,
            fw = self.frame_width
        )
    }
}

fn sampler_for(config: &ZoneConfig) -> FrameSampler {
    FrameSampler::new(SamplingParams::from(config))
}

fn check_series(series: &DiffSeries, scenes: &ScenesFile) -> CoreResult<()> {
    if series.len() != scenes.frame_count {
        return Err(CoreError::Checkpoint(format!(
            "luma statistics cover {} frames but the scenes describe {}",
            series.len(),
            scenes.frame_count
        )));
    }
    Ok(())
}

/// The zone containing `scene`; scenes never cross zone boundaries.
fn zone_for<'z>(zones: &'z [ResolvedZone], scene: &Scene) -> CoreResult<&'z ResolvedZone> {
    let index = zones.partition_point(|z| z.end_frame <= scene.start_frame);
    zones
        .get(index)
        .filter(|z| z.start_frame <= scene.start_frame && scene.end_frame <= z.end_frame)
        .ok_or_else(|| {
            CoreError::Partition(format!(
                "scene [{}:{}] does not lie within a single zone",
                scene.start_frame, scene.end_frame
            ))
        })
}

fn zones_per_scene<'z>(zones: &'z [ResolvedZone], scenes: &ScenesFile) -> CoreResult<Vec<&'z ResolvedZone>> {
    scenes.scenes.iter().map(|s| zone_for(zones, s)).collect()
}

fn zone_overrides(report: &SceneReport, config: &ZoneConfig) -> ZoneOverrides {
    let mut video_params = vec!["--crf".to_string(), format_crf(report.final_crf)];
    video_params.extend(report.video_params.iter().cloned());
    if let Some(path) = &report.roi_map {
        video_params.push("--roi-map-file".to_string());
        video_params.push(path.display().to_string());
    }

    ZoneOverrides {
        encoder: ENCODER_NAME.to_string(),
        passes: 1,
        video_params,
        photon_noise: config.photon_noise,
        photon_noise_width: config.photon_noise_width,
        photon_noise_height: config.photon_noise_height,
        chroma_noise: config.chroma_noise,
        extra_splits_len: Some(config.extra_split),
        min_scene_len: config.min_scene_len,
    }
}
