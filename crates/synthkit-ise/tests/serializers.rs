//! Project and constraints file generation against real files.

use std::fs;
use std::path::PathBuf;

use proptest::prelude::*;
use synthkit_ise::{ConstraintsFile, ISE, SynthError, add_constraints, make_project};
use synthkit_model::{ConstraintFile, FileKind, FileSet, SourceFile};

#[test]
fn project_file_lists_files_per_library() {
    let dir = tempfile::tempdir().expect("tempdir");
    let top = dir.path().join("top.vhd");
    let uart = dir.path().join("uart.v");
    fs::write(&top, "").expect("write");
    fs::write(&uart, "").expect("write");
    let fileset: FileSet = [
        SourceFile::new(&top, "work"),
        SourceFile::new(&uart, "peripherals"),
    ]
    .into_iter()
    .collect();
    let project_file = dir.path().join("top.prj");

    let project = make_project(&fileset, &project_file).expect("project file");

    assert_eq!(project.lines().len(), 2);
    let written = fs::read_to_string(&project_file).expect("read");
    assert_eq!(
        written,
        format!(
            "vhdl work {}\nverilog peripherals {}\n",
            top.display(),
            uart.display()
        )
    );
}

#[test]
fn missing_source_aborts_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let present = dir.path().join("present.vhd");
    fs::write(&present, "").expect("write");
    let fileset: FileSet = [
        SourceFile::new(&present, "work"),
        SourceFile::new(dir.path().join("absent.vhd"), "work"),
    ]
    .into_iter()
    .collect();
    let project_file = dir.path().join("top.prj");

    let err = make_project(&fileset, &project_file).expect_err("missing file");

    assert!(matches!(err, SynthError::MissingSourceFile { path } if path.ends_with("absent.vhd")));
    assert!(!project_file.exists());
}

#[test]
fn netlists_are_copied_next_to_the_project() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cores = dir.path().join("cores");
    let run = dir.path().join("run");
    fs::create_dir_all(&cores).expect("mkdir");
    fs::create_dir_all(&run).expect("mkdir");
    let netlist = cores.join("fifo.ngc");
    let bytes: Vec<u8> = (0..=255).collect();
    fs::write(&netlist, &bytes).expect("write");
    let fileset: FileSet = [SourceFile::new(&netlist, "work")].into_iter().collect();

    let project = make_project(&fileset, &run.join("top.prj")).expect("project file");

    assert!(project.lines().is_empty());
    assert_eq!(fs::read(run.join("fifo.ngc")).expect("copied"), bytes);
    assert_eq!(fs::read_to_string(run.join("top.prj")).expect("read"), "");
}

#[test]
fn existing_netlist_is_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cores = dir.path().join("cores");
    let run = dir.path().join("run");
    fs::create_dir_all(&cores).expect("mkdir");
    fs::create_dir_all(&run).expect("mkdir");
    let netlist = cores.join("fifo.ngc");
    let bytes: Vec<u8> = (0..=255).rev().collect();
    fs::write(&netlist, &bytes).expect("write");
    fs::write(run.join("fifo.ngc"), "stale netlist from an earlier copy").expect("write stale");
    let fileset: FileSet = [SourceFile::new(&netlist, "work")].into_iter().collect();

    make_project(&fileset, &run.join("top.prj")).expect("project file");

    assert_eq!(fs::read(run.join("fifo.ngc")).expect("copied"), bytes);
}

#[test]
fn missing_source_is_found_before_netlists_are_copied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let run = dir.path().join("run");
    fs::create_dir_all(&run).expect("mkdir");
    let netlist = dir.path().join("fifo.ngc");
    fs::write(&netlist, "netlist").expect("write");
    let fileset: FileSet = [
        SourceFile::new(&netlist, "cores"),
        SourceFile::new(dir.path().join("absent.vhd"), "work"),
    ]
    .into_iter()
    .collect();

    let err = make_project(&fileset, &run.join("top.prj")).expect_err("missing file");

    assert!(matches!(err, SynthError::MissingSourceFile { .. }));
    assert!(!run.join("fifo.ngc").exists());
    assert!(!run.join("top.prj").exists());
}

#[test]
fn unsupported_kinds_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("build.tcl");
    fs::write(&script, "").expect("write");
    let fileset: FileSet = [SourceFile::new(&script, "work")].into_iter().collect();

    let err = make_project(&fileset, &dir.path().join("top.prj")).expect_err("unsupported");

    assert!(matches!(err, SynthError::UnsupportedFileType { kind, .. } if kind == "tcl"));
}

#[test]
fn constraints_are_filtered_and_concatenated_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pins = dir.path().join("pins.ucf");
    let timing = dir.path().join("timing.ucf");
    let vivado = dir.path().join("vivado.ucf");
    let xdc = dir.path().join("pins.xdc");
    fs::write(&pins, "NET clk LOC = P56;\n").expect("write");
    fs::write(&timing, "TIMESPEC TS_clk = PERIOD clk 10 ns;\n").expect("write");
    fs::write(&vivado, "# other tool\n").expect("write");
    fs::write(&xdc, "set_property\n").expect("write");
    let constraints = vec![
        ConstraintFile::new(&pins),
        ConstraintFile::new(&timing).with_flow(ISE),
        ConstraintFile::new(&vivado).with_flow("vivado"),
        ConstraintFile::new(&xdc),
        ConstraintFile::new(&pins),
    ];

    let written = add_constraints(&constraints, ISE, "top", dir.path())
        .expect("constraints")
        .expect("written");

    assert_eq!(written, dir.path().join("top.ucf"));
    assert_eq!(
        fs::read_to_string(&written).expect("read"),
        "NET clk LOC = P56;\nTIMESPEC TS_clk = PERIOD clk 10 ns;\n"
    );
}

#[test]
fn no_applicable_constraints_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let written = add_constraints(&[], ISE, "top", dir.path()).expect("constraints");
    assert_eq!(written, None);
    assert!(!dir.path().join("top.ucf").exists());
}

#[test]
fn unreadable_constraints_are_io_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let constraints = vec![ConstraintFile::new(dir.path().join("gone.ucf"))];
    let err = add_constraints(&constraints, ISE, "top", dir.path()).expect_err("io");
    assert!(matches!(err, SynthError::Io { path, .. } if path.ends_with("gone.ucf")));
}

proptest! {
    #[test]
    fn each_constraint_path_contributes_once(picks in proptest::collection::vec(0usize..4, 0..12)) {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("c{i}.ucf"));
                fs::write(&path, format!("# c{i}\n")).expect("write");
                path
            })
            .collect();
        let constraints: Vec<ConstraintFile> = picks
            .iter()
            .map(|&i| ConstraintFile::new(&paths[i]).with_kind(FileKind::Ucf))
            .collect();

        let file = ConstraintsFile::collect(&constraints, ISE).expect("collect");

        let mut expected: Vec<&PathBuf> = Vec::new();
        for &i in &picks {
            if !expected.contains(&&paths[i]) {
                expected.push(&paths[i]);
            }
        }
        let sources: Vec<PathBuf> = file.sources().map(PathBuf::from).collect();
        prop_assert_eq!(sources.iter().collect::<Vec<_>>(), expected);
        let rendered = file.render();
        for path in &paths {
            let stem = path.file_stem().expect("stem").to_string_lossy().into_owned();
            let header = format!("# {stem}\n");
            prop_assert!(rendered.matches(&header).count() <= 1);
        }
    }
}
