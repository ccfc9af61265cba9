//! Synthesis orchestration for Xilinx ISE.
//!
//! A call to [`Ise::synthesise`] runs these steps in order:
//! 1. Validate the library, entity, synthesis directory and part
//! 2. Turn WebTalk off (best effort)
//! 3. Create a temporary working directory in the synthesis directory
//! 4. Write the UCF constraints and the project file
//! 5. Run the manual or xflow flow up to the bitstream
//! 6. Convert the bitstream with promgen
//! 7. Run the project reporter (best effort)
//! 8. Archive the working directory
//!
//! A failure in steps 3 to 6 archives the working directory under an
//! `ERROR_` name before the error is returned. The temporary directory is
//! removed on every path, after archival.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use synthkit_model::{FileSet, ProjectModel};
use tempfile::TempDir;
use tracing::{debug, error, info, info_span, warn};

use crate::archive::{archive_name, store_outputs};
use crate::constraints::add_constraints;
use crate::error::{Result, SynthError};
use crate::flow::FlowKind;
use crate::project_file::make_project;
use crate::run::SynthesisRun;
use crate::runner::{ProcessRunner, ToolRunner};
use crate::stages::{ISE, IseTools};
use crate::toolchain::Toolchain;

/// Result of a successful synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub library: String,
    pub entity: String,
    pub part: String,
    pub flow: FlowKind,
    pub archive: PathBuf,
    pub duration: Duration,
}

/// ISE synthesiser for one project.
pub struct Ise<'a> {
    project: &'a dyn ProjectModel,
    toolchain: Toolchain,
    runner: Box<dyn ToolRunner + 'a>,
    flow: FlowKind,
}

impl<'a> Ise<'a> {
    pub fn new(project: &'a dyn ProjectModel, toolchain: Toolchain, flow: FlowKind) -> Self {
        Self {
            project,
            toolchain,
            runner: Box::new(ProcessRunner),
            flow,
        }
    }

    /// Build from a configured flow name; `None` selects the manual flow.
    pub fn with_flow_name(
        project: &'a dyn ProjectModel,
        toolchain: Toolchain,
        flow: Option<&str>,
    ) -> Result<Self> {
        let flow = flow.map(str::parse).transpose()?.unwrap_or_default();
        Ok(Self::new(project, toolchain, flow))
    }

    /// Replace the process runner.
    #[must_use]
    pub fn with_runner(mut self, runner: impl ToolRunner + 'a) -> Self {
        self.runner = Box::new(runner);
        self
    }

    #[must_use]
    pub fn flow(&self) -> FlowKind {
        self.flow
    }

    fn tools(&self) -> IseTools<'_> {
        IseTools::new(self.project, &self.toolchain, self.runner.as_ref())
    }

    /// Synthesise `entity` from `library`, targeting `part` or the project
    /// default, and archive the outputs in the project synthesis directory.
    pub fn synthesise(
        &self,
        library: &str,
        entity: &str,
        part: Option<&str>,
    ) -> Result<SynthesisOutcome> {
        let span = info_span!("synthesise", library = %library, entity = %entity);
        let _guard = span.enter();
        let start = Instant::now();
        let started_at = Local::now();

        let fileset = self.project.synthesis_fileset();
        validate_target(&fileset, library, entity)?;
        let synthesis_root = self
            .project
            .synthesis_directory()
            .ok_or(SynthError::MissingSynthesisDirectory)?;
        let part = part
            .or_else(|| self.project.fpga_part())
            .ok_or(SynthError::MissingPart)?;
        fs::create_dir_all(synthesis_root).map_err(|e| SynthError::io(synthesis_root, e))?;

        info!("Turning Xilinx WebTalk off as it may prevent the removal of temporary directories");
        if let Err(error) = self.tools().webtalk_off(synthesis_root) {
            debug!(%error, "xwebtalk failed");
            warn!(
                "Could not disable WebTalk, you may encounter permission errors \
                 during temporary directory removal"
            );
        }

        let working = tempfile::Builder::new()
            .prefix(".synthkit-")
            .tempdir_in(synthesis_root)
            .map_err(|e| SynthError::io(synthesis_root, e))?;
        info!(path = %working.path().display(), "Created temporary synthesis directory");

        let run = SynthesisRun::new(
            library,
            entity,
            part,
            self.project.generics().render(),
            started_at,
            working.path(),
        );

        if let Err(source) = self.build(&run, &fileset) {
            error!(error = %source, "Synthesis error, storing output in error archive...");
            let stored = store_outputs(working.path(), synthesis_root, &archive_name(&run.name, true));
            close(working);
            return Err(match stored {
                Ok(archive) => SynthError::RunFailed {
                    archive,
                    source: Box::new(source),
                },
                Err(archive_error) => {
                    error!(error = %archive_error, "could not archive the failed run");
                    source
                }
            });
        }

        self.report(&run.synthesis_dir);

        info!("Synthesis completed, saving output to archive...");
        let archive = store_outputs(working.path(), synthesis_root, &archive_name(&run.name, false))?;
        close(working);
        info!(
            archive = %archive.display(),
            duration_ms = start.elapsed().as_millis(),
            "...done"
        );

        Ok(SynthesisOutcome {
            library: run.library,
            entity: run.entity,
            part: run.part,
            flow: self.flow,
            archive,
            duration: start.elapsed(),
        })
    }

    /// Everything that happens inside the working directory up to the
    /// configuration image.
    fn build(&self, run: &SynthesisRun, fileset: &FileSet) -> Result<()> {
        fs::create_dir_all(&run.synthesis_dir).map_err(|e| SynthError::io(&run.synthesis_dir, e))?;
        let tools = self.tools();

        add_constraints(
            self.project.constraints(),
            ISE,
            &run.entity,
            &run.synthesis_dir,
        )?;
        make_project(fileset, &run.project_file)?;

        self.flow.run(&tools, run)?;

        tools.promgen(&run.file(".bit"), &run.file(".bin"), &run.synthesis_dir)
    }

    fn report(&self, synthesis_dir: &Path) {
        let Some(reporter) = self.project.reporter() else {
            return;
        };
        if let Err(error) = reporter.report(synthesis_dir) {
            error!(
                error = format!("{error:#}"),
                "The post-synthesis reporter caused an error"
            );
        }
    }
}

/// The library must hold synthesis files and the entity must be a plain
/// HDL identifier.
fn validate_target(fileset: &FileSet, library: &str, entity: &str) -> Result<()> {
    let has_files = fileset.get(library).is_some_and(|files| !files.is_empty());
    if !has_files || !is_identifier(entity) {
        return Err(SynthError::UnknownEntity {
            library: library.to_string(),
            entity: entity.to_string(),
        });
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn close(working: TempDir) {
    let path = working.path().to_path_buf();
    if let Err(error) = working.close() {
        warn!(path = %path.display(), %error, "could not remove temporary synthesis directory");
    }
}
