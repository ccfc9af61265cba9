//! Error types for the synthesis pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while synthesising an entity.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// A source file listed in the project does not exist.
    #[error("source file not found: {path}")]
    MissingSourceFile { path: PathBuf },

    /// A file kind the project generator cannot place in a project file.
    #[error("unsupported file type '{kind}' for synthesis: {path}")]
    UnsupportedFileType { path: PathBuf, kind: String },

    /// An external tool failed to launch or exited unsuccessfully.
    #[error("{program} failed ({}): {output}", describe_status(.status))]
    ToolExecution {
        program: String,
        args: Vec<String>,
        /// Exit code; `None` when the tool never ran or was killed by a signal.
        status: Option<i32>,
        /// Tail of the captured output, or the launch error.
        output: String,
    },

    /// Configured tool arguments could not be split into words.
    #[error("invalid arguments for {stage}: {text}")]
    InvalidToolArguments { stage: String, text: String },

    #[error("invalid flow type: {0}")]
    UnknownFlow(String),

    #[error("entity '{entity}' in library '{library}' is not part of the synthesis file set")]
    UnknownEntity { library: String, entity: String },

    #[error("no FPGA part given and the project does not define one")]
    MissingPart,

    #[error("the project does not define a synthesis directory")]
    MissingSynthesisDirectory,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A run failed after its working directory was created; the directory
    /// was archived before being removed.
    #[error("synthesis failed, outputs stored in {archive}: {source}")]
    RunFailed {
        archive: PathBuf,
        #[source]
        source: Box<SynthError>,
    },
}

impl SynthError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The underlying failure, looking through [`SynthError::RunFailed`].
    #[must_use]
    pub fn root_cause(&self) -> &SynthError {
        match self {
            Self::RunFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Archive holding the working directory of a failed run, if one was written.
    #[must_use]
    pub fn archive(&self) -> Option<&std::path::Path> {
        match self {
            Self::RunFailed { archive, .. } => Some(archive.as_path()),
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "did not run to completion".to_string(),
    }
}

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthError>;
