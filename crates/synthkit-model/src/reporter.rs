//! Post-synthesis report hooks.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};

/// Hook invoked with the synthesis run directory once the bitstream exists.
///
/// Reporting is diagnostic: callers log a failed report and carry on.
pub trait Reporter {
    fn report(&self, synthesis_dir: &Path) -> anyhow::Result<()>;
}

impl<F> Reporter for F
where
    F: Fn(&Path) -> anyhow::Result<()>,
{
    fn report(&self, synthesis_dir: &Path) -> anyhow::Result<()> {
        self(synthesis_dir)
    }
}

/// Runs an external script with the synthesis directory as its only argument.
#[derive(Debug, Clone)]
pub struct CommandReporter {
    program: PathBuf,
}

impl CommandReporter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Reporter for CommandReporter {
    fn report(&self, synthesis_dir: &Path) -> anyhow::Result<()> {
        let output = Command::new(&self.program)
            .arg(synthesis_dir)
            .current_dir(synthesis_dir)
            .output()
            .with_context(|| format!("run reporter {}", self.program.display()))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::info!(reporter = %self.program.display(), "{line}");
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "reporter {} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}
