use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Timestamp format used in run and archive names (`DDMMYY_HHMMSS`).
pub const RUN_TIMESTAMP_FORMAT: &str = "%d%m%y_%H%M%S";

/// One synthesis of one entity, rooted in a temporary working directory.
#[derive(Debug, Clone)]
pub struct SynthesisRun {
    pub library: String,
    pub entity: String,
    pub part: String,
    /// Rendered generics, e.g. `{WIDTH=8}`.
    pub generics: String,
    pub started_at: DateTime<Local>,
    /// `<entity>_synth_<timestamp>`.
    pub name: String,
    pub working_dir: PathBuf,
    /// Directory the tools run in.
    pub synthesis_dir: PathBuf,
    pub project_file: PathBuf,
    pub export_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl SynthesisRun {
    pub fn new(
        library: &str,
        entity: &str,
        part: &str,
        generics: String,
        started_at: DateTime<Local>,
        working_dir: &Path,
    ) -> Self {
        let name = run_name(entity, &started_at);
        let synthesis_dir = working_dir.join(&name);
        Self {
            library: library.to_string(),
            entity: entity.to_string(),
            part: part.to_string(),
            generics,
            started_at,
            working_dir: working_dir.to_path_buf(),
            project_file: synthesis_dir.join(format!("{entity}.prj")),
            export_dir: synthesis_dir.join("output"),
            report_dir: synthesis_dir.join("reports"),
            synthesis_dir,
            name,
        }
    }

    /// Name of a file in the synthesis directory derived from the entity.
    #[must_use]
    pub fn file(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.entity)
    }
}

#[must_use]
pub fn run_name(entity: &str, started_at: &DateTime<Local>) -> String {
    format!("{entity}_synth_{}", started_at.format(RUN_TIMESTAMP_FORMAT))
}
