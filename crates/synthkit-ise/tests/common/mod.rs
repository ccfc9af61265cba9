//! Shared fixtures for the synthesis integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use synthkit_ise::{SynthError, ToolInvocation, ToolOutput, ToolRunner};
use synthkit_model::{Project, SourceFile};
use tempfile::TempDir;

/// Fake ISE installation: records every call, writes the files each tool
/// would produce, and fails at one chosen program.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<ToolInvocation>>,
    fail_at: Option<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(program: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: Some(program.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().iter().map(ToolInvocation::program_name).collect()
    }

    pub fn call(&self, program: &str) -> Option<ToolInvocation> {
        self.calls()
            .into_iter()
            .find(|call| call.program_name() == program)
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &ToolInvocation) -> synthkit_ise::Result<ToolOutput> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        let program = invocation.program_name();
        if self.fail_at.as_deref() == Some(program.as_str()) {
            return Err(invocation.failure(Some(1), format!("{program}: simulated failure")));
        }
        for output in outputs(&program, &invocation.args) {
            fs::write(invocation.working_dir.join(&output), program.as_bytes())
                .expect("write fake tool output");
        }
        Ok(ToolOutput {
            stdout: format!("{program} done\n"),
            stderr: String::new(),
        })
    }
}

/// Files a tool leaves behind for the given arguments.
fn outputs(program: &str, args: &[String]) -> Vec<String> {
    let after = |flag: &str| {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    match program {
        "xst" => after("-ifn")
            .map(|script| vec![script.replace(".xst", ".ngc")])
            .unwrap_or_default(),
        "ngdbuild" | "bitgen" => args.last().cloned().into_iter().collect(),
        "map" => after("-o").into_iter().chain(args.last().cloned()).collect(),
        "par" => args.get(1).cloned().into_iter().collect(),
        "promgen" => after("-o").into_iter().collect(),
        "xflow" => args
            .last()
            .and_then(|project| Path::new(project).file_stem())
            .map(|stem| vec![format!("{}.bit", stem.to_string_lossy())])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// A project rooted in a temporary directory with one VHDL source for
/// `counter` in `work` and a `synthesis` output directory.
pub struct Fixture {
    pub dir: TempDir,
    pub project: Project,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(&src).expect("create src");
        fs::write(src.join("counter.vhd"), "entity counter is end;\n").expect("write source");

        let mut project = Project::new(dir.path());
        project.add_file(SourceFile::new("src/counter.vhd", "work"));
        project.set_synthesis_directory("synthesis");
        project.set_part("xc7a35t");
        project.add_generic("WIDTH", 8_i64);
        Self { dir, project }
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn synthesis_dir(&self) -> PathBuf {
        self.dir.path().join("synthesis")
    }

    /// Entries left in the synthesis directory.
    pub fn synthesis_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.synthesis_dir())
            .expect("read synthesis dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// File contents of an archive, keyed by path relative to the run directory.
pub fn archive_files(archive: &Path) -> BTreeMap<String, String> {
    let mut archive = tar::Archive::new(File::open(archive).expect("open archive"));
    let mut files = BTreeMap::new();
    for entry in archive.entries().expect("archive entries") {
        let mut entry = entry.expect("archive entry");
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path().expect("entry path").into_owned();
        let relative: PathBuf = path
            .components()
            .filter(|c| !matches!(c, std::path::Component::CurDir))
            .skip(1)
            .collect();
        let mut contents = String::new();
        std::io::Read::read_to_string(&mut entry, &mut contents).expect("read entry");
        files.insert(relative.to_string_lossy().into_owned(), contents);
    }
    files
}

pub fn root_tool(err: &SynthError) -> Option<String> {
    match err.root_cause() {
        SynthError::ToolExecution { program, .. } => Some(program.clone()),
        _ => None,
    }
}
