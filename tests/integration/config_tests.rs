use clap::Parser;
use dupescan::cli::{Cli, Commands};
use dupescan::config::Config;
use dupescan::error::ExitCode;
use dupescan::snapshot::SnapshotStore;
use figment::providers::{Format, Serialized};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_defaults_without_env() {
    // Defaults only, so environment from other tests cannot interfere.
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config = Config::extract(figment).unwrap();
    assert_eq!(config.min_size_mb, 5);
    assert_eq!(config.io_threads, 4);
    assert!(!config.strict);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
min_size_mb = 12
io_threads = 2
strict = true
snapshot_dir = "/srv/snapshots"
"#,
    )
    .unwrap();

    let figment = figment::Figment::from(Serialized::defaults(Config::default()))
        .merge(figment::providers::Toml::file(&config_path));
    let config = Config::extract(figment).unwrap();

    assert_eq!(config.min_size_mb, 12);
    assert_eq!(config.io_threads, 2);
    assert!(config.strict);
    assert_eq!(
        config.snapshot_dir.as_deref(),
        Some(std::path::Path::new("/srv/snapshots"))
    );
}

#[test]
fn test_unknown_keys_are_ignored() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size_mb = 3\ncolour = \"mauve\"\n").unwrap();

    let figment = figment::Figment::from(Serialized::defaults(Config::default()))
        .merge(figment::providers::Toml::file(&config_path));
    assert_eq!(Config::extract(figment).unwrap().min_size_mb, 3);
}

/// Two 10-byte duplicates, found only when the threshold is zero.
fn small_tree() -> tempfile::TempDir {
    let tree = tempdir().unwrap();
    for d in ["a", "b"] {
        fs::create_dir_all(tree.path().join(d)).unwrap();
        fs::write(tree.path().join(d).join("n.txt"), b"0123456789").unwrap();
    }
    tree
}

#[test]
fn test_config_file_threshold_applies_to_rescan() {
    let tree = small_tree();
    let work = tempdir().unwrap();
    let config_path = work.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "min_size_mb = 0\nsnapshot_dir = {:?}\n",
            work.path().join("snaps").to_string_lossy()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "dupescan",
        "-q",
        "--config",
        config_path.to_str().unwrap(),
        "rescan",
        tree.path().to_str().unwrap(),
        "-o",
        "json",
    ])
    .unwrap();

    assert_eq!(dupescan::run_app(cli).unwrap(), ExitCode::Success);
    // snapshot_dir came from the file as well.
    let store = SnapshotStore::new(work.path().join("snaps"));
    assert!(store.load(tree.path()).unwrap().is_some());
}

#[test]
fn test_cli_threshold_overrides_config_file() {
    let tree = small_tree();
    let work = tempdir().unwrap();
    let config_path = work.path().join("config.toml");
    fs::write(&config_path, "min_size_mb = 0\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupescan",
        "-q",
        "--config",
        config_path.to_str().unwrap(),
        "rescan",
        tree.path().to_str().unwrap(),
        "--min-size-mb",
        "1",
        "--no-save",
        "-o",
        "json",
    ])
    .unwrap();

    assert_eq!(dupescan::run_app(cli).unwrap(), ExitCode::NoDuplicates);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["dupescan", "replay", "/data", "--config", "x.toml", "-q"])
        .unwrap();
    assert!(cli.quiet);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
    assert!(matches!(cli.command, Commands::Replay(_)));
}

#[test]
fn test_zero_io_threads_rejected_on_cli() {
    assert!(Cli::try_parse_from(["dupescan", "rescan", "/data", "--io-threads", "0"]).is_err());
}
