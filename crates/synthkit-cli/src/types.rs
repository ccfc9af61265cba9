use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use synthkit_ise::{SynthError, SynthesisOutcome};

/// Results of one `synth` invocation.
#[derive(Debug, Serialize)]
pub struct SynthResult {
    pub project: PathBuf,
    pub library: String,
    pub flow: String,
    pub entities: Vec<EntityResult>,
    pub has_errors: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct EntityResult {
    pub entity: String,
    pub status: EntityStatus,
    pub part: Option<String>,
    /// Success archive, or the error archive of a failed run.
    pub archive: Option<PathBuf>,
    pub duration_ms: u128,
    pub error: Option<String>,
}

impl EntityResult {
    pub fn succeeded(outcome: SynthesisOutcome) -> Self {
        Self {
            entity: outcome.entity,
            status: EntityStatus::Succeeded,
            part: Some(outcome.part),
            archive: Some(outcome.archive),
            duration_ms: outcome.duration.as_millis(),
            error: None,
        }
    }

    pub fn failed(entity: &str, error: &SynthError, elapsed: Duration) -> Self {
        Self {
            entity: entity.to_string(),
            status: EntityStatus::Failed,
            part: None,
            archive: error.archive().map(PathBuf::from),
            duration_ms: elapsed.as_millis(),
            error: Some(error.root_cause().to_string()),
        }
    }
}

/// Toolchain and project overview printed by `check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub project: PathBuf,
    pub bin_dir: Option<PathBuf>,
    pub tools: Vec<ToolCheck>,
    pub libraries: Vec<LibraryCheck>,
    pub part: Option<String>,
    pub synthesis_directory: Option<PathBuf>,
}

impl CheckReport {
    #[must_use]
    pub fn installed(&self) -> bool {
        self.tools.iter().all(|tool| tool.path.is_some())
    }
}

#[derive(Debug, Serialize)]
pub struct ToolCheck {
    pub name: String,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct LibraryCheck {
    pub name: String,
    pub files: usize,
}
