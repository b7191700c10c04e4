use clap::Parser;
use dupescan::cli::Cli;
use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::error::ExitCode;
use dupescan::snapshot::{Snapshot, SnapshotStore};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

struct Fixture {
    tree: TempDir,
    snapshots: TempDir,
    config: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tree = tempdir().unwrap();
        let snapshots = tempdir().unwrap();
        let config = snapshots.path().join("empty.toml");
        fs::write(&config, "").unwrap();
        for d in ["a", "b"] {
            fs::create_dir_all(tree.path().join(d)).unwrap();
            fs::write(tree.path().join(d).join("photo.jpg"), b"jpeg bytes").unwrap();
        }
        Self {
            tree,
            snapshots,
            config,
        }
    }

    fn root(&self) -> String {
        self.tree.path().to_string_lossy().into_owned()
    }

    fn run(&self, args: &[&str]) -> ExitCode {
        let mut argv = vec![
            "dupescan".to_string(),
            "-q".to_string(),
            "--config".to_string(),
            self.config.to_string_lossy().into_owned(),
        ];
        argv.extend(args.iter().map(|s| s.to_string()));
        argv.push("--snapshot-dir".to_string());
        argv.push(self.snapshots.path().to_string_lossy().into_owned());
        dupescan::run_app(Cli::try_parse_from(argv).unwrap()).unwrap()
    }

    fn store(&self) -> SnapshotStore {
        SnapshotStore::new(self.snapshots.path())
    }
}

#[test]
fn test_replay_without_prior_scan_reports_no_data() {
    let fx = Fixture::new();
    let root = fx.root();

    let code = fx.run(&["replay", &root, "-o", "json"]);

    assert_eq!(code, ExitCode::NoData);
    assert!(fx.store().load(Path::new(&root)).unwrap().is_none());
}

#[test]
fn test_rescan_then_replay() {
    let fx = Fixture::new();
    let root = fx.root();

    assert_eq!(
        fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]),
        ExitCode::Success
    );

    let snapshot = fx.store().load(Path::new(&root)).unwrap().unwrap();
    assert_eq!(snapshot.sets.len(), 1);
    assert_eq!(snapshot.sets[0].name, "photo.jpg");
    assert_eq!(snapshot.min_size, 0);

    assert_eq!(fx.run(&["replay", &root, "-o", "csv"]), ExitCode::Success);
}

#[test]
fn test_replay_does_not_touch_the_tree() {
    let fx = Fixture::new();
    let root = fx.root();
    fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]);

    fs::remove_dir_all(fx.tree.path().join("a")).unwrap();
    fs::remove_dir_all(fx.tree.path().join("b")).unwrap();

    assert_eq!(fx.run(&["replay", &root, "-o", "json"]), ExitCode::Success);
    let snapshot = fx.store().load(Path::new(&root)).unwrap().unwrap();
    assert_eq!(snapshot.sets[0].paths.len(), 2);
}

#[test]
fn test_no_save_leaves_no_snapshot() {
    let fx = Fixture::new();
    let root = fx.root();

    fx.run(&["rescan", &root, "--min-size-mb", "0", "--no-save", "-o", "json"]);

    assert!(fx.store().load(Path::new(&root)).unwrap().is_none());
}

#[test]
fn test_empty_result_is_stored_and_replayed() {
    let fx = Fixture::new();
    let root = fx.root();

    // Default threshold of 5 MB excludes the fixture files.
    assert_eq!(
        fx.run(&["rescan", &root, "-o", "json"]),
        ExitCode::NoDuplicates
    );

    let snapshot = fx.store().load(Path::new(&root)).unwrap().unwrap();
    assert!(snapshot.sets.is_empty());
    assert_eq!(
        fx.run(&["replay", &root, "-o", "json"]),
        ExitCode::NoDuplicates
    );
}

#[test]
fn test_rescan_overwrites_previous_snapshot() {
    let fx = Fixture::new();
    let root = fx.root();
    fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]);

    fs::write(fx.tree.path().join("b/photo.jpg"), b"edited!!!!").unwrap();
    fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]);

    let snapshot = fx.store().load(Path::new(&root)).unwrap().unwrap();
    assert!(snapshot.sets.is_empty());
}

#[test]
fn test_corrupt_snapshot_is_an_error() {
    let fx = Fixture::new();
    let root = fx.root();
    fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]);

    let path = fx.store().path_for(Path::new(&root));
    fs::write(&path, "not json at all").unwrap();

    let cli = Cli::try_parse_from([
        "dupescan",
        "-q",
        "replay",
        root.as_str(),
        "--snapshot-dir",
        fx.snapshots.path().to_str().unwrap(),
    ])
    .unwrap();
    assert!(dupescan::run_app(cli).is_err());
}

#[test]
fn test_snapshot_matches_finder_output() {
    let fx = Fixture::new();
    let (sets, _) = DuplicateFinder::new(FinderConfig::default().with_min_size(0))
        .find_duplicates(fx.tree.path())
        .unwrap();

    let store = fx.store();
    store
        .save(&Snapshot::new(fx.tree.path(), 0, &sets))
        .unwrap();

    let loaded = store.load(fx.tree.path()).unwrap().unwrap();
    assert_eq!(loaded.to_sets().unwrap(), sets);
}

#[test]
fn test_root_spelling_selects_snapshot() {
    let fx = Fixture::new();
    let root = fx.root();
    fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]);

    // Trailing separators are trimmed when naming the file.
    let with_slash = format!("{}/", root);
    assert!(fx.store().load(Path::new(&with_slash)).unwrap().is_some());
}

#[test]
fn test_replay_ignores_snapshot_of_colliding_root() {
    let fx = Fixture::new();
    let (sets, _) = DuplicateFinder::new(FinderConfig::default().with_min_size(0))
        .find_duplicates(fx.tree.path())
        .unwrap();
    fx.store()
        .save(&Snapshot::new("/x/a_b", 0, &sets))
        .unwrap();

    // "x/a/b" sanitizes to the same file name as "/x/a_b".
    assert_eq!(
        fx.store().path_for(Path::new("x/a/b")),
        fx.store().path_for(Path::new("/x/a_b"))
    );
    assert_eq!(fx.run(&["replay", "x/a/b", "-o", "json"]), ExitCode::NoData);
    assert_eq!(fx.run(&["replay", "/x/a_b", "-o", "json"]), ExitCode::Success);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_are_saved_and_replayed() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fx = Fixture::new();
    let name = OsStr::from_bytes(b"caf\xe9.bin");
    for d in ["a", "b"] {
        // Some unix filesystems (APFS) only accept UTF-8 names.
        if fs::write(fx.tree.path().join(d).join(name), b"same bytes").is_err() {
            return;
        }
    }
    let root = fx.root();

    assert_eq!(
        fx.run(&["rescan", &root, "--min-size-mb", "0", "-o", "json"]),
        ExitCode::Success
    );

    let (sets, _) = DuplicateFinder::new(FinderConfig::default().with_min_size(0))
        .find_duplicates(fx.tree.path())
        .unwrap();
    let snapshot = fx.store().load(Path::new(&root)).unwrap().unwrap();
    assert_eq!(snapshot.sets.len(), 2);
    assert!(snapshot.sets.iter().any(|s| s.name == name));
    assert_eq!(snapshot.to_sets().unwrap(), sets);

    assert_eq!(fx.run(&["replay", &root, "-o", "csv"]), ExitCode::Success);
}
