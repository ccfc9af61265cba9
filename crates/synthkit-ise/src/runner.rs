//! External process invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{Result, SynthError};

/// Number of output lines kept in a [`SynthError::ToolExecution`].
pub const OUTPUT_TAIL_LINES: usize = 20;

/// One call of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Log tool output at debug instead of info.
    pub quiet: bool,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, working_dir: &Path) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.to_path_buf(),
            quiet: false,
        }
    }

    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// File name of the program, used to identify the stage.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            })
    }

    /// Build the error for a failed call.
    #[must_use]
    pub fn failure(&self, status: Option<i32>, output: String) -> SynthError {
        SynthError::ToolExecution {
            program: self.program.display().to_string(),
            args: self.args.clone(),
            status,
            output,
        }
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured output of a successful call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools. Blocks until the tool exits; there is no timeout.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        (**self).run(invocation)
    }
}

/// [`ToolRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        info!(
            command = %invocation,
            working_dir = %invocation.working_dir.display(),
            "running tool"
        );
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| invocation.failure(None, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let tool = invocation.program_name();
        for line in stdout.lines() {
            if invocation.quiet {
                debug!(tool = %tool, "{line}");
            } else {
                info!(tool = %tool, "{line}");
            }
        }
        for line in stderr.lines() {
            if invocation.quiet {
                debug!(tool = %tool, "{line}");
            } else {
                warn!(tool = %tool, "{line}");
            }
        }

        if !output.status.success() {
            let combined = combine_output(&stdout, &stderr);
            return Err(invocation.failure(output.status.code(), output_tail(&combined)));
        }
        Ok(ToolOutput { stdout, stderr })
    }
}

/// Stdout followed by stderr, each starting on its own line.
fn combine_output(stdout: &str, stderr: &str) -> String {
    if stdout.is_empty() || stdout.ends_with('\n') {
        format!("{stdout}{stderr}")
    } else {
        format!("{stdout}\n{stderr}")
    }
}

/// Last [`OUTPUT_TAIL_LINES`] lines of `text`.
#[must_use]
pub fn output_tail(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_lines() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let tail = output_tail(&text);
        assert_eq!(tail.lines().count(), OUTPUT_TAIL_LINES);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
        assert_eq!(output_tail("one\ntwo"), "one\ntwo");
    }

    #[test]
    fn stderr_starts_on_its_own_line() {
        assert_eq!(combine_output("a\n", "b\n"), "a\nb\n");
        assert_eq!(combine_output("a", "b"), "a\nb");
        assert_eq!(combine_output("", "b"), "b");
    }

    #[test]
    fn invocation_display_and_name() {
        let invocation = ToolInvocation::new(
            "/opt/ise/bin/map",
            vec!["-p".to_string(), "xc7a35t".to_string()],
            Path::new("/tmp"),
        );
        assert_eq!(invocation.to_string(), "/opt/ise/bin/map -p xc7a35t");
        assert_eq!(invocation.program_name(), "map");
    }

    #[test]
    fn missing_program_is_a_tool_execution_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let invocation = ToolInvocation::new(
            dir.path().join("no-such-tool"),
            vec!["-user".to_string(), "off".to_string()],
            dir.path(),
        );
        let err = ProcessRunner.run(&invocation).unwrap_err();
        match err {
            SynthError::ToolExecution { status, args, .. } => {
                assert_eq!(status, None);
                assert_eq!(args, vec!["-user", "off"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported_with_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let invocation = ToolInvocation::new(
            "sh",
            vec!["-c".to_string(), "echo partial; echo broken >&2; exit 3".to_string()],
            dir.path(),
        );
        let err = ProcessRunner.run(&invocation).unwrap_err();
        match err {
            SynthError::ToolExecution { status, output, .. } => {
                assert_eq!(status, Some(3));
                assert!(output.contains("partial"));
                assert!(output.contains("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unterminated_stdout_is_not_merged_with_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let invocation = ToolInvocation::new(
            "sh",
            vec!["-c".to_string(), "printf partial; echo broken >&2; exit 1".to_string()],
            dir.path(),
        );
        let err = ProcessRunner.run(&invocation).unwrap_err();
        match err {
            SynthError::ToolExecution { output, .. } => {
                assert_eq!(output.lines().collect::<Vec<_>>(), ["partial", "broken"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let invocation = ToolInvocation::new("pwd", Vec::new(), dir.path()).quiet(true);
        let output = ProcessRunner.run(&invocation).expect("run pwd");
        let reported = std::path::PathBuf::from(output.stdout.trim());
        assert_eq!(
            reported.canonicalize().expect("canonical"),
            dir.path().canonicalize().expect("canonical")
        );
    }
}
