//! Xilinx ISE synthesis pipeline.
//!
//! Turns a [`synthkit_model::ProjectModel`] into a bitstream by generating
//! the ISE project and constraints files and driving the ISE tools, either
//! stage by stage or through `xflow`. Every run ends in a tar archive of its
//! working directory, whether it succeeded or not.

pub mod archive;
pub mod constraints;
pub mod error;
pub mod flow;
pub mod project_file;
pub mod run;
pub mod runner;
pub mod stages;
pub mod synthesiser;
pub mod toolchain;

pub use constraints::{ConstraintsFile, add_constraints};
pub use error::{Result, SynthError};
pub use flow::{FlowKind, XflowOptions};
pub use project_file::{HdlLanguage, ProjectFile, make_project};
pub use run::SynthesisRun;
pub use runner::{ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use stages::{ISE, IseTools, XstScript};
pub use synthesiser::{Ise, SynthesisOutcome};
pub use toolchain::{ISE_EXECUTABLES, ToolStatus, Toolchain};
