//! Drivers for the individual ISE tools.
//!
//! Each driver reads its extra arguments from the project, builds the fixed
//! argument list for its tool and runs it in the stage working directory.
//! Only `xst` and `promgen` honour extra arguments; `ngdbuild`, `map`, `par`
//! and `bitgen` validate them and then use their fixed argument list alone.

use std::fs;
use std::path::Path;

use synthkit_model::ProjectModel;
use tracing::{debug, info_span};

use crate::error::{Result, SynthError};
use crate::runner::{ToolInvocation, ToolOutput, ToolRunner};
use crate::toolchain::Toolchain;

/// Tool name used for flow filtering and argument lookup.
pub const ISE: &str = "ise";

/// XST settings script (`<entity>.xst`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XstScript {
    pub entity: String,
    pub part: String,
    pub generics: String,
    /// Extra directives, one per line.
    pub directives: Vec<String>,
}

impl XstScript {
    pub fn new(entity: &str, part: &str, generics: &str) -> Self {
        Self {
            entity: entity.to_string(),
            part: part.to_string(),
            generics: generics.to_string(),
            directives: Vec::new(),
        }
    }

    /// Append configured directive text, one directive per line.
    #[must_use]
    pub fn with_directives(mut self, text: &str) -> Self {
        self.directives.extend(directive_lines(text));
        self
    }

    #[must_use]
    pub fn render(&self) -> String {
        let entity = &self.entity;
        let mut out = format!(
            "run\n\
             -ifn {entity}.prj\n\
             -ofn {entity}.ngc\n\
             -ofmt NGC\n\
             -p {part}\n\
             -top {entity}\n\
             -generics {generics}\n",
            part = self.part,
            generics = self.generics,
        );
        for directive in &self.directives {
            out.push_str(directive);
            out.push('\n');
        }
        out
    }
}

/// Split directive text at every ` -` so each option lands on its own line.
#[must_use]
pub fn directive_lines(text: &str) -> Vec<String> {
    text.replace(" -", "\n-")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stage drivers bound to a project, toolchain and runner.
pub struct IseTools<'a> {
    project: &'a dyn ProjectModel,
    toolchain: &'a Toolchain,
    runner: &'a dyn ToolRunner,
}

impl<'a> IseTools<'a> {
    pub fn new(
        project: &'a dyn ProjectModel,
        toolchain: &'a Toolchain,
        runner: &'a dyn ToolRunner,
    ) -> Self {
        Self {
            project,
            toolchain,
            runner,
        }
    }

    #[must_use]
    pub fn project(&self) -> &'a dyn ProjectModel {
        self.project
    }

    /// Configured extra arguments for `stage`, split into shell words.
    pub fn extra_arguments(&self, stage: &str) -> Result<Vec<String>> {
        let Some(text) = self.project.tool_arguments(ISE, stage) else {
            return Ok(Vec::new());
        };
        shlex::split(&text).ok_or_else(|| SynthError::InvalidToolArguments {
            stage: stage.to_string(),
            text,
        })
    }

    fn call(&self, program: &str, args: Vec<String>, working_dir: &Path) -> Result<ToolOutput> {
        self.invoke(ToolInvocation::new(self.toolchain.program(program), args, working_dir))
    }

    fn invoke(&self, invocation: ToolInvocation) -> Result<ToolOutput> {
        let span = info_span!("stage", tool = %invocation.program_name());
        let _guard = span.enter();
        self.runner.run(&invocation)
    }

    /// Tokenize configured arguments for a stage that does not accept them.
    fn ignored_arguments(&self, stage: &str) -> Result<()> {
        let ignored = self.extra_arguments(stage)?;
        if !ignored.is_empty() {
            debug!(stage, ?ignored, "stage uses its fixed argument list only");
        }
        Ok(())
    }

    /// `xwebtalk -user off`.
    pub fn webtalk_off(&self, working_dir: &Path) -> Result<()> {
        let program = self.toolchain.program("xwebtalk");
        self.invoke(ToolInvocation::new(program, strings(["-user", "off"]), working_dir).quiet(true))?;
        Ok(())
    }

    /// Write `<entity>.xst` and run XST on it.
    pub fn xst(&self, part: &str, entity: &str, generics: &str, working_dir: &Path) -> Result<()> {
        // Validates quoting even though the text goes into the script verbatim.
        self.extra_arguments("xst")?;
        let directives = self.project.tool_arguments(ISE, "xst").unwrap_or_default();
        let script = XstScript::new(entity, part, generics).with_directives(&directives);
        let script_path = working_dir.join(format!("{entity}.xst"));
        fs::write(&script_path, script.render()).map_err(|e| SynthError::io(&script_path, e))?;

        let args = strings([
            "-ifn".to_string(),
            format!("{entity}.xst"),
            "-ofn".to_string(),
            format!("{entity}.log"),
        ]);
        self.call("xst", args, working_dir)?;
        Ok(())
    }

    pub fn ngdbuild(&self, part: &str, entity: &str, working_dir: &Path) -> Result<()> {
        self.ignored_arguments("ngdbuild")?;
        let args = strings([
            "-uc".to_string(),
            format!("{entity}.ucf"),
            "-sd".to_string(),
            working_dir.to_string_lossy().into_owned(),
            "-p".to_string(),
            part.to_string(),
            format!("{entity}.ngc"),
            format!("{entity}.ngd"),
        ]);
        self.call("ngdbuild", args, working_dir)?;
        Ok(())
    }

    pub fn map(&self, part: &str, entity: &str, working_dir: &Path) -> Result<()> {
        self.ignored_arguments("map")?;
        let args = strings([
            "-p".to_string(),
            part.to_string(),
            "-o".to_string(),
            format!("{entity}_map.ncd"),
            format!("{entity}.ngd"),
            format!("{entity}.pcf"),
        ]);
        self.call("map", args, working_dir)?;
        Ok(())
    }

    pub fn par(&self, entity: &str, working_dir: &Path) -> Result<()> {
        self.ignored_arguments("par")?;
        let args = strings([
            format!("{entity}_map.ncd"),
            format!("{entity}.ncd"),
            format!("{entity}.pcf"),
        ]);
        self.call("par", args, working_dir)?;
        Ok(())
    }

    pub fn bitgen(&self, entity: &str, working_dir: &Path) -> Result<()> {
        self.ignored_arguments("bitgen")?;
        let args = strings([format!("{entity}.ncd"), format!("{entity}.bit")]);
        self.call("bitgen", args, working_dir)?;
        Ok(())
    }

    /// Convert a bitstream into a PROM image starting at address 0.
    pub fn promgen(&self, input: &str, output: &str, working_dir: &Path) -> Result<()> {
        let mut args = self.extra_arguments("promgen")?;
        args.extend(strings([
            "-o".to_string(),
            output.to_string(),
            "-u".to_string(),
            "0".to_string(),
            input.to_string(),
        ]));
        self.call("promgen", args, working_dir)?;
        Ok(())
    }

    /// Run `xflow` with an options file already present in `working_dir`.
    pub fn xflow(&self, args: Vec<String>, working_dir: &Path) -> Result<()> {
        self.call("xflow", args, working_dir)?;
        Ok(())
    }
}

fn strings<S: Into<String>, const N: usize>(items: [S; N]) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_directives_per_option() {
        assert_eq!(directive_lines("-rtlview"), vec!["-rtlview"]);
        assert_eq!(
            directive_lines("-opt_mode speed -opt_level 1"),
            vec!["-opt_mode speed", "-opt_level 1"]
        );
        assert!(directive_lines("").is_empty());
        assert!(directive_lines("   ").is_empty());
    }

    #[test]
    fn renders_xst_script() {
        let script = XstScript::new("counter", "xc7a35t", "{WIDTH=8}")
            .with_directives("-opt_mode speed -keep_hierarchy yes");
        insta::assert_snapshot!(script.render(), @r"
        run
        -ifn counter.prj
        -ofn counter.ngc
        -ofmt NGC
        -p xc7a35t
        -top counter
        -generics {WIDTH=8}
        -opt_mode speed
        -keep_hierarchy yes
        ");
    }
}
