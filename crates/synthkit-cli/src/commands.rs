use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use synthkit_ise::{ISE, Ise, Toolchain};
use synthkit_model::{Project, ProjectModel};
use tracing::{error, info, info_span};

use crate::cli::{CheckArgs, SynthArgs};
use crate::types::{CheckReport, EntityResult, EntityStatus, LibraryCheck, SynthResult, ToolCheck};

pub fn run_synth(args: &SynthArgs) -> Result<SynthResult> {
    let project = load_project(&args.project)?;
    if let Some(synthesiser) = project.synthesiser()
        && synthesiser != ISE
    {
        bail!("project synthesiser '{synthesiser}' is not supported, expected '{ISE}'");
    }

    let toolchain = toolchain_for(&project, args.tool_path.as_ref());
    let missing = toolchain.missing();
    if !missing.is_empty() {
        for name in &missing {
            error!(tool = *name, "ISE executable not found");
        }
        bail!(
            "Synthesis aborted, ISE is not available (missing: {})",
            missing.join(", ")
        );
    }

    let ise = match args.flow {
        Some(flow) => Ise::new(&project, toolchain, flow.into()),
        None => Ise::with_flow_name(&project, toolchain, project.flow())
            .context("read project flow")?,
    };

    let mut entities = Vec::with_capacity(args.entities.len());
    for entity in &args.entities {
        let span = info_span!("entity", entity = %entity);
        let _guard = span.enter();
        let start = Instant::now();
        let result = match ise.synthesise(&args.library, entity, args.part.as_deref()) {
            Ok(outcome) => EntityResult::succeeded(outcome),
            Err(err) => {
                error!(error = %err, "synthesis failed");
                EntityResult::failed(entity, &err, start.elapsed())
            }
        };
        entities.push(result);
    }

    let has_errors = entities
        .iter()
        .any(|entity| entity.status == EntityStatus::Failed);
    let result = SynthResult {
        project: args.project.clone(),
        library: args.library.clone(),
        flow: ise.flow().to_string(),
        entities,
        has_errors,
    };
    if let Some(path) = &args.report_json {
        write_report(path, &result)?;
    }
    Ok(result)
}

pub fn run_check(args: &CheckArgs) -> Result<CheckReport> {
    let project = load_project(&args.project)?;
    let toolchain = toolchain_for(&project, args.tool_path.as_ref());
    let tools = toolchain
        .availability()
        .into_iter()
        .map(|status| ToolCheck {
            name: status.name.to_string(),
            path: status.path,
        })
        .collect();
    let libraries = project
        .synthesis_fileset()
        .libraries()
        .map(|(name, files)| LibraryCheck {
            name: name.to_string(),
            files: files.len(),
        })
        .collect();
    Ok(CheckReport {
        project: args.project.clone(),
        bin_dir: toolchain.bin_dir().map(Path::to_path_buf),
        tools,
        libraries,
        part: project.fpga_part().map(str::to_string),
        synthesis_directory: project.synthesis_directory().map(Path::to_path_buf),
    })
}

fn load_project(path: &Path) -> Result<Project> {
    let project =
        Project::load(path).with_context(|| format!("load project {}", path.display()))?;
    info!(project = %path.display(), files = project.files().len(), "loaded project");
    Ok(project)
}

/// `--tool-path` wins over the project's `tool_path`; without either the
/// tools are looked up on `PATH`.
fn toolchain_for(project: &Project, tool_path: Option<&PathBuf>) -> Toolchain {
    let bin_dir = tool_path
        .cloned()
        .or_else(|| project.tool_path().map(Path::to_path_buf));
    Toolchain::new(bin_dir)
}

fn write_report(path: &Path, result: &SynthResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("serialize synthesis report")?;
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    info!(report = %path.display(), "wrote synthesis report");
    Ok(())
}
