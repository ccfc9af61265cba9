//! Location of the ISE executables.

use std::env;
use std::path::{Path, PathBuf};

/// Executables used by the ISE flows.
pub const ISE_EXECUTABLES: [&str; 8] = [
    "xwebtalk", "promgen", "xst", "map", "par", "ngdbuild", "bitgen", "xflow",
];

/// Whether a toolchain executable could be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub path: Option<PathBuf>,
}

/// ISE installation, either a bin directory or whatever is on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    bin_dir: Option<PathBuf>,
}

impl Toolchain {
    #[must_use]
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self { bin_dir }
    }

    #[must_use]
    pub fn bin_dir(&self) -> Option<&Path> {
        self.bin_dir.as_deref()
    }

    /// Program path handed to the runner for `name`.
    #[must_use]
    pub fn program(&self, name: &str) -> PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Find `name` in the bin directory, or on `PATH` without one.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        match &self.bin_dir {
            Some(dir) => find_in(dir, name),
            None => {
                let path = env::var_os("PATH")?;
                env::split_paths(&path).find_map(|dir| find_in(&dir, name))
            }
        }
    }

    #[must_use]
    pub fn availability(&self) -> Vec<ToolStatus> {
        ISE_EXECUTABLES
            .iter()
            .map(|&name| ToolStatus {
                name,
                path: self.locate(name),
            })
            .collect()
    }

    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        self.availability()
            .into_iter()
            .filter(|status| status.path.is_none())
            .map(|status| status.name)
            .collect()
    }

    /// True when every ISE executable resolves.
    #[must_use]
    pub fn installed(&self) -> bool {
        self.missing().is_empty()
    }
}

fn find_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        return Some(candidate);
    }
    if cfg!(windows) {
        let exe = dir.join(format!("{name}.exe"));
        if exe.is_file() {
            return Some(exe);
        }
    }
    None
}
