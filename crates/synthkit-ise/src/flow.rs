//! Flow strategies: the `xflow` batch flow and the manual stage sequence.

use std::fmt;
use std::fs;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::{Result, SynthError};
use crate::run::SynthesisRun;
use crate::stages::IseTools;

/// Name of the options file written for the batch flow.
pub const XFLOW_OPTIONS_FILE: &str = "xst_custom.opt";

const XST_MIXED_OPT: &str = r#"
FLOWTYPE = FPGA_SYNTHESIS;
Program xst
-ifn <design>_xst.scr;       # input XST script file
-ofn <design>_xst.log;       # output XST log file
-intstyle xflow;             # Message Reporting Style: ise, xflow, or silent
ParamFile: <design>_xst.scr
"run";
"-ifn <synthdesign>";        # Input/Project File Name
"-ifmt mixed";               # Input Format
"-ofn <design>";             # Output File Name
"-ofmt ngc";                 # Output File Format
"-top <design>";             # Top Design Name
"-generics {generics}";
"-p <partname>";             # Target Device
End ParamFile
End Program xst
"#;

/// XFLOW synthesis options file for mixed-language projects.
///
/// The `<design>`, `<synthdesign>` and `<partname>` placeholders are filled in
/// by XFLOW itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XflowOptions {
    pub generics: String,
}

impl XflowOptions {
    #[must_use]
    pub fn render(&self) -> String {
        XST_MIXED_OPT.replace("{generics}", &self.generics)
    }
}

/// How the ISE tools are sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowKind {
    /// xst, ngdbuild, map, par and bitgen called one after another.
    #[default]
    Manual,
    /// A single `xflow` call.
    Xflow,
}

impl FlowKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Xflow => "xflow",
        }
    }

    /// Run the flow up to and including the bitstream.
    pub fn run(self, tools: &IseTools<'_>, run: &SynthesisRun) -> Result<()> {
        info!(flow = self.label(), entity = %run.entity, "running synthesis flow");
        match self {
            Self::Manual => manual_flow(tools, run),
            Self::Xflow => xflow(tools, run),
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlowKind {
    type Err = SynthError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "xflow" | "batch" => Ok(Self::Xflow),
            _ => Err(SynthError::UnknownFlow(value.to_string())),
        }
    }
}

/// XST > NGDBUILD > MAP > PAR > BITGEN, stopping at the first failure.
fn manual_flow(tools: &IseTools<'_>, run: &SynthesisRun) -> Result<()> {
    let dir = run.synthesis_dir.as_path();
    tools.xst(&run.part, &run.entity, &run.generics, dir)?;
    tools.ngdbuild(&run.part, &run.entity, dir)?;
    tools.map(&run.part, &run.entity, dir)?;
    tools.par(&run.entity, dir)?;
    tools.bitgen(&run.entity, dir)?;
    Ok(())
}

fn xflow(tools: &IseTools<'_>, run: &SynthesisRun) -> Result<()> {
    if tools
        .project()
        .tool_arguments(crate::stages::ISE, "xflow")
        .is_some_and(|args| !args.trim().is_empty())
    {
        warn!(
            "The ISE wrapper does not allow additional arguments to be passed to XFLOW. \
             Use the manual flow if fine control of the synthesis stages is required."
        );
    }

    let options = XflowOptions {
        generics: run.generics.clone(),
    };
    let options_path = run.synthesis_dir.join(XFLOW_OPTIONS_FILE);
    fs::write(&options_path, options.render()).map_err(|e| SynthError::io(&options_path, e))?;

    let args = vec![
        "-p".to_string(),
        run.part.clone(),
        "-synth".to_string(),
        XFLOW_OPTIONS_FILE.to_string(),
        "-implement".to_string(),
        "balanced.opt".to_string(),
        "-config".to_string(),
        "bitgen.opt".to_string(),
        "-wd".to_string(),
        run.synthesis_dir.to_string_lossy().into_owned(),
        "-ed".to_string(),
        run.export_dir.to_string_lossy().into_owned(),
        "-rd".to_string(),
        run.report_dir.to_string_lossy().into_owned(),
        run.project_file.to_string_lossy().into_owned(),
    ];
    tools.xflow(args, &run.synthesis_dir)
}
