use dupescan::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupescan::scanner::{FileEntry, HashError, ScanError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn byte_config() -> FinderConfig {
    FinderConfig::default().with_min_size(0)
}

#[test]
fn test_find_duplicates_from_files_continues_on_error() {
    let finder = DuplicateFinder::new(byte_config());
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1/same.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2/same.txt"), 100);

    let (sets, summary) = finder
        .find_duplicates_from_files(vec![file1, file2])
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);
    for err in &summary.scan_errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {:?}", err),
        }
    }
}

#[test]
fn test_find_duplicates_from_files_strict_fails() {
    let finder = DuplicateFinder::new(byte_config().with_strict(true));
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1/same.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2/same.txt"), 100);

    match finder.find_duplicates_from_files(vec![file1, file2]) {
        Err(FinderError::ScanError(ScanError::HashError(HashError::NotFound(_)))) => {}
        other => panic!("Expected NotFound ScanError, got: {:?}", other.map(|r| r.0.len())),
    }
}

#[test]
fn test_unreadable_sibling_does_not_hide_others() {
    let dir = tempdir().unwrap();
    for d in ["a", "b"] {
        fs::create_dir_all(dir.path().join(d)).unwrap();
        fs::write(dir.path().join(d).join("v.bin"), b"payload").unwrap();
    }

    let mut files = vec![
        FileEntry::new(dir.path().join("a/v.bin"), 7),
        FileEntry::new(dir.path().join("b/v.bin"), 7),
    ];
    // Vanished between listing and reading.
    files.push(FileEntry::new(dir.path().join("c/v.bin"), 7));

    let (sets, summary) = DuplicateFinder::new(byte_config())
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets.iter().next().unwrap().len(), 2);
    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(
        summary.scan_errors[0].path(),
        dir.path().join("c/v.bin").as_path()
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_a_diagnostic() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("x.bin"), b"hidden").unwrap();
    for d in ["a", "b"] {
        fs::create_dir_all(dir.path().join(d)).unwrap();
        fs::write(dir.path().join(d).join("x.bin"), b"seen!!").unwrap();
    }
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to observe then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::new(byte_config()).find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (sets, summary) = result.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(summary.scan_errors.len(), 1);
    assert!(matches!(
        summary.scan_errors[0],
        ScanError::PermissionDenied(_)
    ));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_strict_fails() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::new(byte_config().with_strict(true)).find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(result, Err(FinderError::ScanError(_))));
}
