// ============================================================================
// sceneboost-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: indicatif progress bars for pipeline events
//
// `BarProgress` implements the core `ProgressCallback` and draws one bar per
// pipeline stage on stderr. Scenes finish on worker threads, so the current
// bar sits behind a mutex. Nothing is drawn when stderr is not a terminal.
//
// AI-ASSISTANT-INFO: CLI progress bar for pipeline stages

// ---- External crate imports ----
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use sceneboost_core::progress::{ProgressCallback, ProgressEvent, Stage};

// ---- Standard library imports ----
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

const BAR_TEMPLATE: &str = "{msg:>18}: {percent:>3}% [{bar:30}] {pos}/{len} ({elapsed_precise} / {eta_precise})";

/// Progress bar driven by pipeline events.
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl BarProgress {
    pub fn new(hidden: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: hidden || !std::io::stderr().is_terminal(),
        }
    }

    fn start(&self, stage: Stage, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            pb.set_style(style.progress_chars("##."));
        }
        pb.set_message(stage.to_string());
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        pb
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        // A poisoned lock only means another worker panicked while drawing
        let mut guard = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStart { stage, total } => {
                let pb = self.start(stage, total);
                self.with_bar(|bar| {
                    if let Some(old) = bar.replace(pb) {
                        old.finish_and_clear();
                    }
                });
            }
            ProgressEvent::ProbeDone { .. } | ProgressEvent::SceneDone { .. } => {
                self.with_bar(|bar| {
                    if let Some(pb) = bar.as_ref() {
                        pb.inc(1);
                    }
                });
            }
            ProgressEvent::StageComplete { .. } => {
                self.with_bar(|bar| {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                });
            }
        }
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        });
    }
}
