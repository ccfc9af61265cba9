//! Project model consumed by the synthesis pipeline.
//!
//! [`ProjectModel`] is the read-only contract the pipeline works against.
//! [`Project`] implements it on top of a TOML project file:
//!
//! ```toml
//! [project]
//! part = "xc6slx9-2-tqg144"
//! synthesis_directory = "synthesis"
//! flow = "manual"
//!
//! [generics]
//! WIDTH = 8
//!
//! [[files]]
//! path = "src/counter.vhd"
//! library = "work"
//!
//! [[constraints]]
//! path = "constraints/counter.ucf"
//!
//! [tool_arguments.ise]
//! xst = "-opt_mode speed"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProjectError, Result};
use crate::file::{ConstraintFile, DEFAULT_LIBRARY, FileKind, FileSet, SourceFile};
use crate::generics::{GenericValue, Generics};
use crate::reporter::{CommandReporter, Reporter};

/// Read-only view of a project used during a synthesis run.
pub trait ProjectModel {
    /// Files taking part in synthesis, grouped by library.
    fn synthesis_fileset(&self) -> FileSet;

    /// Constraint descriptors in the order they were added.
    fn constraints(&self) -> &[ConstraintFile];

    fn generics(&self) -> &Generics;

    /// Default target device.
    fn fpga_part(&self) -> Option<&str>;

    /// Extra argument text configured for a tool stage, if any.
    fn tool_arguments(&self, tool: &str, stage: &str) -> Option<String>;

    /// Directory receiving temporary working directories and archives.
    fn synthesis_directory(&self) -> Option<&Path>;

    fn reporter(&self) -> Option<&dyn Reporter>;
}

/// `[project]` table of the project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub part: Option<String>,
    #[serde(default)]
    pub synthesis_directory: Option<PathBuf>,
    #[serde(default)]
    pub synthesiser: Option<String>,
    #[serde(default)]
    pub flow: Option<String>,
    #[serde(default)]
    pub reporter: Option<PathBuf>,
    #[serde(default)]
    pub tool_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default = "default_true")]
    pub synthesise: bool,
    #[serde(default)]
    pub flow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub flow: Option<String>,
}

/// Deserialized project file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSettings,
    #[serde(default)]
    pub generics: Generics,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub constraints: Vec<ConstraintEntry>,
    /// `tool -> stage -> argument text`.
    #[serde(default)]
    pub tool_arguments: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_library() -> String {
    DEFAULT_LIBRARY.to_string()
}

fn default_true() -> bool {
    true
}

/// A hardware project: files, constraints, generics and tool settings.
pub struct Project {
    root: PathBuf,
    settings: ProjectSettings,
    files: FileSet,
    constraints: Vec<ConstraintFile>,
    generics: Generics,
    tool_arguments: BTreeMap<String, BTreeMap<String, String>>,
    reporter: Option<Box<dyn Reporter>>,
}

impl Project {
    /// Empty project whose relative paths resolve against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            settings: ProjectSettings::default(),
            files: FileSet::new(),
            constraints: Vec::new(),
            generics: Generics::new(),
            tool_arguments: BTreeMap::new(),
            reporter: None,
        }
    }

    /// Load a TOML project file; relative paths resolve against its directory.
    ///
    /// The directory is made absolute first, so every resolved path stays
    /// valid once the tools run from their own working directories.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
        let config: ProjectConfig = toml::from_str(&text).map_err(|source| ProjectError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let root = std::path::absolute(parent).map_err(|e| ProjectError::io(parent, e))?;
        let project = Self::from_config(config, root)?;
        tracing::debug!(
            project = %path.display(),
            files = project.files.len(),
            constraints = project.constraints.len(),
            "loaded project"
        );
        Ok(project)
    }

    pub fn from_config(config: ProjectConfig, root: impl Into<PathBuf>) -> Result<Self> {
        let mut project = Self::new(root);
        let ProjectConfig {
            project: settings,
            generics,
            files,
            constraints,
            tool_arguments,
        } = config;

        if let Some(dir) = &settings.synthesis_directory {
            project.settings.synthesis_directory = Some(project.resolve(dir));
        }
        if let Some(script) = &settings.reporter {
            let script = project.resolve(script);
            project.settings.reporter = Some(script.clone());
            project.reporter = Some(Box::new(CommandReporter::new(script)));
        }
        if let Some(tool_path) = &settings.tool_path {
            project.settings.tool_path = Some(project.resolve(tool_path));
        }
        project.settings.part = settings.part;
        project.settings.synthesiser = settings.synthesiser;
        project.settings.flow = settings.flow;
        project.generics = generics;

        for entry in files {
            let kind = parse_kind(&entry.path, entry.kind.as_deref())?;
            let mut file = SourceFile::new(entry.path, entry.library)
                .with_kind(kind)
                .with_synthesise(entry.synthesise);
            file.flow = entry.flow;
            project.add_file(file);
        }
        for entry in constraints {
            let kind = parse_kind(&entry.path, entry.kind.as_deref())?;
            let mut constraint = ConstraintFile::new(entry.path).with_kind(kind);
            constraint.flow = entry.flow;
            project.add_constraints(constraint);
        }
        for (tool, stages) in tool_arguments {
            for (stage, args) in stages {
                project.set_tool_arguments(&tool, &stage, args);
            }
        }
        Ok(project)
    }

    /// Resolve a path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Every file in the project, including ones excluded from synthesis.
    #[must_use]
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Add a file; exact duplicates within a library are ignored.
    pub fn add_file(&mut self, mut file: SourceFile) {
        file.path = self.resolve(&file.path);
        let path = file.path.clone();
        if !self.files.push(file) {
            tracing::debug!(path = %path.display(), "ignoring duplicate project file");
        }
    }

    pub fn add_constraints(&mut self, mut constraint: ConstraintFile) {
        constraint.path = self.resolve(&constraint.path);
        self.constraints.push(constraint);
    }

    pub fn add_generic(&mut self, name: impl Into<String>, value: impl Into<GenericValue>) {
        self.generics.insert(name, value);
    }

    pub fn set_part(&mut self, part: impl Into<String>) {
        self.settings.part = Some(part.into());
    }

    pub fn set_synthesis_directory(&mut self, dir: impl AsRef<Path>) {
        self.settings.synthesis_directory = Some(self.resolve(dir.as_ref()));
    }

    pub fn set_tool_arguments(&mut self, tool: &str, stage: &str, args: impl Into<String>) {
        self.tool_arguments
            .entry(tool.to_string())
            .or_default()
            .insert(stage.to_string(), args.into());
    }

    pub fn set_reporter(&mut self, reporter: impl Reporter + 'static) {
        self.reporter = Some(Box::new(reporter));
    }

    #[must_use]
    pub fn flow(&self) -> Option<&str> {
        self.settings.flow.as_deref()
    }

    #[must_use]
    pub fn synthesiser(&self) -> Option<&str> {
        self.settings.synthesiser.as_deref()
    }

    #[must_use]
    pub fn tool_path(&self) -> Option<&Path> {
        self.settings.tool_path.as_deref()
    }
}

impl ProjectModel for Project {
    fn synthesis_fileset(&self) -> FileSet {
        let mut result = FileSet::new();
        for (library, files) in self.files.libraries() {
            result.ensure_library(library);
            for file in files.iter().filter(|file| file.synthesise) {
                result.push(file.clone());
            }
        }
        result
    }

    fn constraints(&self) -> &[ConstraintFile] {
        &self.constraints
    }

    fn generics(&self) -> &Generics {
        &self.generics
    }

    fn fpga_part(&self) -> Option<&str> {
        self.settings.part.as_deref()
    }

    fn tool_arguments(&self, tool: &str, stage: &str) -> Option<String> {
        self.tool_arguments
            .get(tool)
            .and_then(|stages| stages.get(stage))
            .map(|args| collapse_spaces(args))
    }

    fn synthesis_directory(&self) -> Option<&Path> {
        self.settings.synthesis_directory.as_deref()
    }

    fn reporter(&self) -> Option<&dyn Reporter> {
        self.reporter.as_deref()
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("files", &self.files)
            .field("constraints", &self.constraints)
            .field("generics", &self.generics)
            .field("tool_arguments", &self.tool_arguments)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

fn parse_kind(path: &Path, kind: Option<&str>) -> Result<FileKind> {
    match kind {
        None => Ok(FileKind::from_path(path)),
        Some(name) => name
            .parse()
            .map_err(|kind| ProjectError::UnknownFileKind {
                path: path.to_path_buf(),
                kind,
            }),
    }
}

/// Merge runs of spaces into a single space.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !previous_space {
                out.push(ch);
            }
            previous_space = true;
        } else {
            out.push(ch);
            previous_space = false;
        }
    }
    out
}
