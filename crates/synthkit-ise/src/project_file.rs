//! ISE project (`.prj`) generation.
//!
//! ISE expects one line per source file:
//!
//! ```text
//! <hdl_language> <compilation_library> <source_file>
//! ```
//!
//! Projects are written in mixed mode, so VHDL and Verilog sources coexist.
//! Precompiled NGC netlists are not listed; they are copied next to the
//! project file where the tools pick them up from the search directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use synthkit_model::{FileKind, FileSet};
use tracing::{debug, info, warn};

use crate::error::{Result, SynthError};

/// Language tag of a project-file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdlLanguage {
    Vhdl,
    Verilog,
}

impl HdlLanguage {
    /// Language tag for a source kind; `None` when the kind is not HDL source.
    #[must_use]
    pub fn for_kind(kind: &FileKind) -> Option<Self> {
        match kind {
            FileKind::Vhdl => Some(Self::Vhdl),
            FileKind::Verilog | FileKind::SystemVerilog => Some(Self::Verilog),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Vhdl => "vhdl",
            Self::Verilog => "verilog",
        }
    }
}

impl fmt::Display for HdlLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLine {
    pub language: HdlLanguage,
    pub library: String,
    pub path: PathBuf,
}

/// In-memory ISE project file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFile {
    lines: Vec<ProjectLine>,
}

impl ProjectFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, language: HdlLanguage, library: &str, path: &Path) {
        self.lines.push(ProjectLine {
            language,
            library: library.to_string(),
            path: path.to_path_buf(),
        });
    }

    #[must_use]
    pub fn lines(&self) -> &[ProjectLine] {
        &self.lines
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&format!(
                "{} {} {}\n",
                line.language,
                line.library,
                line.path.display()
            ));
        }
        out
    }
}

/// Write the project file for `fileset` to `project_file`.
///
/// Every referenced file must exist; all of them are checked before any
/// netlist is copied or the project file is written, so a broken project
/// aborts before any tool runs.
pub fn make_project(fileset: &FileSet, project_file: &Path) -> Result<ProjectFile> {
    info!("Creating project file for ISE...");
    if let Some(missing) = fileset.files().find(|file| !file.path.is_file()) {
        return Err(SynthError::MissingSourceFile {
            path: missing.path.clone(),
        });
    }

    let base = project_file.parent().unwrap_or_else(|| Path::new("."));
    let mut project = ProjectFile::new();
    for (library, files) in fileset.libraries() {
        for file in files {
            if file.kind == FileKind::NgcNetlist {
                copy_netlist(&file.path, base)?;
                continue;
            }
            let language =
                HdlLanguage::for_kind(&file.kind).ok_or_else(|| SynthError::UnsupportedFileType {
                    path: file.path.clone(),
                    kind: file.kind.to_string(),
                })?;
            project.push(language, library, &file.path);
        }
    }

    debug!(path = %project_file.display(), "writing project file");
    fs::write(project_file, project.render()).map_err(|e| SynthError::io(project_file, e))?;
    info!("...done");
    Ok(project)
}

fn copy_netlist(source: &Path, base: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| SynthError::MissingSourceFile {
            path: source.to_path_buf(),
        })?;
    let destination = base.join(file_name);
    if destination.exists() {
        warn!(
            destination = %destination.display(),
            source = %source.display(),
            "file already exists and will be overwritten"
        );
    }
    fs::copy(source, &destination).map_err(|e| SynthError::io(&destination, e))?;
    debug!(netlist = %destination.display(), "copied netlist");
    Ok(destination)
}
