//! Archival of synthesis working directories.

use std::fs::File;
use std::path::{Path, PathBuf};

use tar::Builder;
use tracing::{debug, info};

use crate::error::{Result, SynthError};

/// Prefix marking the archive of a failed run.
pub const ERROR_PREFIX: &str = "ERROR_";

/// Archive file name for a run.
#[must_use]
pub fn archive_name(run_name: &str, failed: bool) -> String {
    if failed {
        format!("{ERROR_PREFIX}{run_name}.tar")
    } else {
        format!("{run_name}.tar")
    }
}

/// First free path for `name` in `dir`, appending `_<n>` before `.tar` on
/// collision so repeated runs within one second keep separate archives.
#[must_use]
pub fn unique_archive_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = name.strip_suffix(".tar").unwrap_or(name);
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.tar")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Write the full tree of `working_dir` to a tar archive named `name` in
/// `destination`. Returns the archive path.
pub fn store_outputs(working_dir: &Path, destination: &Path, name: &str) -> Result<PathBuf> {
    let path = unique_archive_path(destination, name);
    debug!(
        source = %working_dir.display(),
        archive = %path.display(),
        "archiving working directory"
    );
    let archive_error = |source| SynthError::Archive {
        path: path.clone(),
        source,
    };
    let file = File::create(&path).map_err(archive_error)?;
    let mut builder = Builder::new(file);
    builder.follow_symlinks(false);
    builder
        .append_dir_all(".", working_dir)
        .map_err(archive_error)?;
    let file = builder.into_inner().map_err(archive_error)?;
    file.sync_all().map_err(archive_error)?;
    info!(archive = %path.display(), "stored synthesis outputs");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn names_success_and_error_archives() {
        assert_eq!(
            archive_name("top_synth_010224_101010", false),
            "top_synth_010224_101010.tar"
        );
        assert_eq!(
            archive_name("top_synth_010224_101010", true),
            "ERROR_top_synth_010224_101010.tar"
        );
    }

    #[test]
    fn avoids_overwriting_existing_archives() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = unique_archive_path(dir.path(), "top.tar");
        assert_eq!(first, dir.path().join("top.tar"));
        fs::write(&first, "").expect("write");
        let second = unique_archive_path(dir.path(), "top.tar");
        assert_eq!(second, dir.path().join("top_1.tar"));
        fs::write(&second, "").expect("write");
        assert_eq!(
            unique_archive_path(dir.path(), "top.tar"),
            dir.path().join("top_2.tar")
        );
    }

    #[test]
    fn archives_nested_tree() {
        let working = tempfile::tempdir().expect("tempdir");
        let run_dir = working.path().join("top_synth_010224_101010");
        fs::create_dir_all(run_dir.join("reports")).expect("mkdir");
        fs::write(run_dir.join("top.prj"), "vhdl work top.vhd\n").expect("write");
        fs::write(run_dir.join("reports/map.mrp"), "ok").expect("write");

        let out = tempfile::tempdir().expect("tempdir");
        let path = store_outputs(working.path(), out.path(), "top.tar").expect("archive");

        let mut archive = tar::Archive::new(File::open(&path).expect("open"));
        let names: Vec<String> = archive
            .entries()
            .expect("entries")
            .map(|entry| {
                entry
                    .expect("entry")
                    .path()
                    .expect("path")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert!(names.iter().any(|n| n.ends_with("top_synth_010224_101010/top.prj")));
        assert!(
            names
                .iter()
                .any(|n| n.ends_with("top_synth_010224_101010/reports/map.mrp"))
        );
    }
}
