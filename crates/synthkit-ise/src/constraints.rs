//! UCF constraints generation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use synthkit_model::{ConstraintFile, FileKind};
use tracing::info;

use crate::error::{Result, SynthError};

/// Extension of the generated constraints file.
pub const UCF_EXTENSION: &str = "ucf";

/// Concatenated constraints for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintsFile {
    sources: Vec<(PathBuf, String)>,
}

impl ConstraintsFile {
    /// Collect the constraints that apply to `tool`.
    ///
    /// Each path contributes at most once and inputs keep their order, since
    /// later constraints take precedence in the tools.
    pub fn collect(constraints: &[ConstraintFile], tool: &str) -> Result<Self> {
        let mut visited: HashSet<&Path> = HashSet::new();
        let mut file = Self::default();
        for constraint in constraints {
            if !visited.insert(constraint.path.as_path()) {
                continue;
            }
            if !constraint.applies_to(tool) || constraint.kind != FileKind::Ucf {
                continue;
            }
            let text = fs::read_to_string(&constraint.path)
                .map_err(|e| SynthError::io(&constraint.path, e))?;
            info!(path = %constraint.path.display(), "Added constraints file");
            file.sources.push((constraint.path.clone(), text));
        }
        Ok(file)
    }

    /// Paths that contributed, in order.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().map(|(path, _)| path.as_path())
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.sources.iter().map(|(_, text)| text.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(|(_, text)| text.is_empty())
    }
}

/// Write `<entity>.ucf` into `output_dir` from the applicable constraints.
///
/// Nothing is written when no constraints apply; an unconstrained build is
/// valid. Returns the written path.
pub fn add_constraints(
    constraints: &[ConstraintFile],
    tool: &str,
    entity: &str,
    output_dir: &Path,
) -> Result<Option<PathBuf>> {
    let file = ConstraintsFile::collect(constraints, tool)?;
    if file.is_empty() {
        return Ok(None);
    }
    let path = output_dir.join(format!("{entity}.{UCF_EXTENSION}"));
    fs::write(&path, file.render()).map_err(|e| SynthError::io(&path, e))?;
    info!(path = %path.display(), "Wrote constraints");
    Ok(Some(path))
}
