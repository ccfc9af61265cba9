//! Source files, constraint files and library-grouped file sets.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Library used when a file does not name one.
pub const DEFAULT_LIBRARY: &str = "work";

/// Kind of a file referenced by the project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// VHDL source.
    Vhdl,
    /// Verilog source.
    Verilog,
    /// SystemVerilog source.
    SystemVerilog,
    /// Precompiled NGC netlist, consumed instead of re-synthesising source.
    NgcNetlist,
    /// User constraints file.
    Ucf,
    /// Anything else, identified by its extension.
    Other(String),
}

impl FileKind {
    /// Infer the kind from the file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "vhd" | "vhdl" => Self::Vhdl,
            "v" => Self::Verilog,
            "sv" => Self::SystemVerilog,
            "ngc" => Self::NgcNetlist,
            "ucf" => Self::Ucf,
            _ => Self::Other(extension),
        }
    }

    /// Get a human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Vhdl => "vhdl",
            Self::Verilog => "verilog",
            Self::SystemVerilog => "systemverilog",
            Self::NgcNetlist => "ngc",
            Self::Ucf => "ucf",
            Self::Other(extension) => extension,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vhdl" => Ok(Self::Vhdl),
            "verilog" => Ok(Self::Verilog),
            "systemverilog" => Ok(Self::SystemVerilog),
            "ngc" | "ngcnetlist" => Ok(Self::NgcNetlist),
            "ucf" => Ok(Self::Ucf),
            other => Err(other.to_string()),
        }
    }
}

/// A source file attributed to a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub library: String,
    /// Tool this file is restricted to; `None` applies to every tool.
    pub flow: Option<String>,
    /// Whether the file takes part in synthesis.
    pub synthesise: bool,
}

impl SourceFile {
    /// Create a synthesisable file with its kind inferred from the extension.
    pub fn new(path: impl Into<PathBuf>, library: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: FileKind::from_path(&path),
            path,
            library: library.into(),
            flow: None,
            synthesise: true,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_flow(mut self, flow: impl Into<String>) -> Self {
        self.flow = Some(flow.into());
        self
    }

    #[must_use]
    pub fn with_synthesise(mut self, synthesise: bool) -> Self {
        self.synthesise = synthesise;
        self
    }
}

/// A constraints file descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub flow: Option<String>,
}

impl ConstraintFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            kind: FileKind::from_path(&path),
            path,
            flow: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_flow(mut self, flow: impl Into<String>) -> Self {
        self.flow = Some(flow.into());
        self
    }

    /// True when the descriptor applies to the named tool (or to every tool).
    #[must_use]
    pub fn applies_to(&self, tool: &str) -> bool {
        self.flow.as_deref().is_none_or(|flow| flow == tool)
    }
}

/// Files grouped by library.
///
/// Libraries keep the order in which they were first seen and files keep
/// their insertion order within a library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    libraries: Vec<(String, Vec<SourceFile>)>,
}

impl FileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to its library. Returns false for an exact duplicate.
    pub fn push(&mut self, file: SourceFile) -> bool {
        let files = self.library_mut(&file.library);
        if files.contains(&file) {
            return false;
        }
        files.push(file);
        true
    }

    /// Register a library without files.
    pub fn ensure_library(&mut self, library: &str) {
        let _ = self.library_mut(library);
    }

    fn library_mut(&mut self, library: &str) -> &mut Vec<SourceFile> {
        let index = match self.libraries.iter().position(|(name, _)| name == library) {
            Some(index) => index,
            None => {
                self.libraries.push((library.to_string(), Vec::new()));
                self.libraries.len() - 1
            }
        };
        &mut self.libraries[index].1
    }

    #[must_use]
    pub fn get(&self, library: &str) -> Option<&[SourceFile]> {
        self.libraries
            .iter()
            .find(|(name, _)| name == library)
            .map(|(_, files)| files.as_slice())
    }

    pub fn libraries(&self) -> impl Iterator<Item = (&str, &[SourceFile])> {
        self.libraries
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice()))
    }

    /// All files in library-then-insertion order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.libraries.iter().flat_map(|(_, files)| files.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.libraries.iter().map(|(_, files)| files.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<SourceFile> for FileSet {
    fn from_iter<I: IntoIterator<Item = SourceFile>>(iter: I) -> Self {
        let mut set = Self::new();
        for file in iter {
            set.push(file);
        }
        set
    }
}
