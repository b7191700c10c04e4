use dupescan::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupescan::scanner::FINGERPRINT_PREFIX_LEN;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const MB: usize = 1024 * 1024;

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn byte_finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_min_size(0))
}

#[test]
fn test_identical_large_files_form_one_set() {
    let dir = tempdir().unwrap();
    let content = vec![b'A'; 10 * MB];
    let a = write(dir.path(), "a/x.txt", &content);
    let b = write(dir.path(), "b/x.txt", &content);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size_mb(5));
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    let set = sets.iter().next().unwrap();
    let members: BTreeSet<_> = set.paths.iter().cloned().collect();
    assert_eq!(members, BTreeSet::from([a, b]));
    assert_eq!(set.key.size, (10 * MB) as u64);
    assert_eq!(sets.redundant_bytes(), (10 * MB) as u64);
    assert_eq!(summary.redundant_bytes, (10 * MB) as u64);
}

#[test]
fn test_different_names_are_never_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/x.txt", b"identical content");
    write(dir.path(), "b/y.txt", b"identical content");

    let (sets, summary) = byte_finder().find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.candidate_groups, 0);
    assert_eq!(summary.fingerprinted_files, 0);
}

#[test]
fn test_difference_past_prefix_is_reported() {
    let dir = tempdir().unwrap();
    let first = vec![b'A'; 4096];
    let mut second = first.clone();
    second[FINGERPRINT_PREFIX_LEN + 100] = b'B';
    write(dir.path(), "a/x.txt", &first);
    write(dir.path(), "b/x.txt", &second);

    let (sets, _) = byte_finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets.iter().next().unwrap().len(), 2);
}

#[test]
fn test_difference_inside_prefix_is_not_reported() {
    let dir = tempdir().unwrap();
    let first = vec![b'A'; 4096];
    let mut second = first.clone();
    second[FINGERPRINT_PREFIX_LEN - 1] = b'B';
    write(dir.path(), "a/x.txt", &first);
    write(dir.path(), "b/x.txt", &second);

    let (sets, summary) = byte_finder().find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.fingerprinted_files, 2);
}

#[test]
fn test_files_below_threshold_are_excluded() {
    let dir = tempdir().unwrap();
    let small = vec![b'S'; MB];
    write(dir.path(), "a/small.bin", &small);
    write(dir.path(), "b/small.bin", &small);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size_mb(5));
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_threshold_is_inclusive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/edge.bin", &[7u8; 100]);
    write(dir.path(), "b/edge.bin", &[7u8; 100]);
    write(dir.path(), "a/under.bin", &[7u8; 99]);
    write(dir.path(), "b/under.bin", &[7u8; 99]);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(100));
    let (sets, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets.iter().next().unwrap().key.size, 100);
}

#[test]
fn test_three_way_set_counts_two_redundant_copies() {
    let dir = tempdir().unwrap();
    for d in ["a", "b", "c"] {
        write(dir.path(), &format!("{d}/disk.img"), &[1u8; 300]);
    }

    let (sets, summary) = byte_finder().find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.redundant_bytes, 600);
}

#[test]
fn test_deep_nesting() {
    let dir = tempdir().unwrap();
    let deep = (0..40).map(|i| format!("d{i}")).collect::<Vec<_>>().join("/");
    write(dir.path(), &format!("{deep}/file.dat"), b"nested");
    write(dir.path(), "file.dat", b"nested");

    let (sets, _) = byte_finder().find_duplicates(dir.path()).unwrap();
    assert_eq!(sets.len(), 1);
}

#[test]
fn test_same_name_different_size_not_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/x.txt", b"short");
    write(dir.path(), "b/x.txt", b"longer content");

    let (sets, summary) = byte_finder().find_duplicates(dir.path()).unwrap();
    assert!(sets.is_empty());
    assert_eq!(summary.candidate_groups, 0);
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/x.bin", b"one");
    write(dir.path(), "b/x.bin", b"one");
    write(dir.path(), "a/y.bin", b"two two");
    write(dir.path(), "b/y.bin", b"two two");
    write(dir.path(), "c/y.bin", b"two two");
    write(dir.path(), "c/z.bin", b"unique");

    let (first, _) = byte_finder().find_duplicates(dir.path()).unwrap();
    let (second, _) = byte_finder().find_duplicates(dir.path()).unwrap();

    let normalize = |sets: &dupescan::duplicates::DuplicateSets| {
        sets.iter()
            .map(|s| {
                (
                    s.key.clone(),
                    s.paths.iter().cloned().collect::<BTreeSet<_>>(),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(normalize(&first), normalize(&second));
    assert_eq!(first.len(), 2);
}

#[test]
fn test_root_that_is_a_file_is_fatal() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "plain.txt", b"x");

    let err = byte_finder().find_duplicates(&file).unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let err = byte_finder()
        .find_duplicates(&dir.path().join("missing"))
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "a/x.bin", b"linked content");
    fs::create_dir_all(dir.path().join("b")).unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("b/x.bin")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("loop")).unwrap();

    let (sets, summary) = byte_finder().find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}
