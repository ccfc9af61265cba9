pub mod error;
pub mod file;
pub mod generics;
pub mod project;
pub mod reporter;

pub use error::{ProjectError, Result};
pub use file::{ConstraintFile, DEFAULT_LIBRARY, FileKind, FileSet, SourceFile};
pub use generics::{GenericValue, Generics};
pub use project::{
    ConstraintEntry, FileEntry, Project, ProjectConfig, ProjectModel, ProjectSettings,
};
pub use reporter::{CommandReporter, Reporter};
