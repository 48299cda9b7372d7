use crate::domain::layout::LayoutConfig;
use crate::domain::overlay_asset::AssetPaths;
use crate::domain::text_style::TextStyle;
use serde::Serialize;
use std::path::PathBuf;

/// Everything one batch run needs, handed over by a caller and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub inputs: Vec<PathBuf>,
    pub assets: AssetPaths,
    pub layout: LayoutConfig,
    pub opacity: f32,
    pub text: Option<TextStyle>,
    pub output_dir: PathBuf,
    pub archive_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success { output: PathBuf },
    Failure { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl BatchResult {
    pub fn success(path: PathBuf, output: PathBuf) -> Self {
        Self {
            path,
            outcome: Outcome::Success { output },
        }
    }

    pub fn failure(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            outcome: Outcome::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<BatchResult>,
}

impl BatchSummary {
    pub fn record(&mut self, result: BatchResult) {
        if result.is_success() {
            self.processed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }
}

/// Ordered notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started { total: usize },
    FileFinished { index: usize, total: usize, result: BatchResult },
    Finished { processed: usize, failed: usize },
}
