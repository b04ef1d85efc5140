//! Core library for adaptive per-scene crf boosting.
//!
//! A source is split into scenes from per-frame luma differences, a few frames
//! of each scene are scored on probe encodes, and a constrained quality model
//! per scene is solved for the crf that meets a metric target. Optional
//! character-presence masks add a spatial ROI boost.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sceneboost_core::checkpoint::Workspace;
//! use sceneboost_core::external::{MetricEvaluators, ProbeScoreFile};
//! use sceneboost_core::{BoostPipeline, DiffSeries, ScenesFile, ZoneSpecs, resolve_zones};
//! use std::path::Path;
//!
//! let specs = ZoneSpecs::load(Path::new("zones.toml")).unwrap();
//! let workspace = Workspace::open("work").unwrap();
//! let series = DiffSeries::load(&workspace.scene_detection_dir()).unwrap();
//! let scenes = ScenesFile::load(&workspace.scenes_path()).unwrap();
//! let zones = resolve_zones("", &specs, series.len()).unwrap();
//!
//! let recorded = ProbeScoreFile::load(Path::new("probe-scores.json")).unwrap();
//! let outcome = BoostPipeline::new(&specs, workspace)
//!     .with_encoder(&recorded)
//!     .with_metrics(MetricEvaluators::single(&recorded))
//!     .boost(&series, &zones, &scenes)
//!     .unwrap();
//! outcome.write_scenes(Path::new("scenes.json")).unwrap();
//! ```

pub mod assessed;
pub mod checkpoint;
pub mod config;
pub mod detection;
pub mod error;
pub mod external;
pub mod pipeline;
pub mod progress;
pub mod quality;
pub mod roi;
pub mod sampling;
pub mod scenes;
pub mod stats;
pub mod utils;
pub mod zones;

// Re-exports for public API
pub use assessed::{Assessed, Diagnostic};
pub use config::{ProbeConfig, ZoneConfig, ZoneConfigBuilder, ZoneSpecs};
pub use detection::{DetectionInputs, SceneDetectionMethod, detect_scenes};
pub use error::{CoreError, CoreResult};
pub use pipeline::{BoostOutcome, BoostPipeline, SceneReport};
pub use quality::{Comparator, CrfResponse, ProbeResult, QualityModel, Summariser, solve};
pub use roi::{RoiBoostMapper, RoiMap};
pub use sampling::{FrameSampler, SampleSet, SamplingParams};
pub use scenes::{Scene, ScenesFile, ZoneOverrides};
pub use stats::{DiffSeries, FrameStats, LumaFormat};
pub use zones::{ResolvedZone, load_zones, resolve_zones};
