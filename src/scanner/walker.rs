//! Directory walker built on an explicit work-list.
//!
//! # Overview
//!
//! [`Walker::walk`] returns an iterator that keeps a stack of directories
//! still to be read and a queue of results produced by the last directory.
//! Nothing recurses, so a shutdown request is observed between any two
//! entries and the walk can stop without leaving half-built state behind.
//!
//! # Features
//!
//! - No depth limit
//! - Regular files only (symlinks, sockets, fifos and devices are skipped)
//! - Inclusive minimum-size filter
//! - Entries visited in file-name order within each directory
//! - Unreadable directories and entries are yielded as [`ScanError`] and skipped
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::new(1024));
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::collections::VecDeque;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::progress::ProgressCallback;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional per-file progress reporting
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the iterator ends at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Report every visited file to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. An unreadable root yields a single error.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            walker: self,
            pending_dirs: vec![self.root.clone()],
            ready: VecDeque::new(),
            visited: 0,
        }
    }

    /// Turn one directory entry into a result, or `None` when it is filtered.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let path = entry.path();

        // DirEntry::file_type does not follow symlinks
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => return Some(Err(self.handle_io_error(path, e))),
        };

        if !file_type.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(path, e))),
        };

        let size = metadata.len();
        if size < self.config.min_size {
            log::trace!(
                "Skipping file below threshold ({} < {}): {}",
                size,
                self.config.min_size,
                path.display()
            );
            return None;
        }

        Some(Ok(FileEntry::new(path, size)))
    }

    /// Read one directory: push subdirectories, queue file results.
    fn read_directory(
        &self,
        dir: &Path,
        pending_dirs: &mut Vec<PathBuf>,
        ready: &mut VecDeque<Result<FileEntry, ScanError>>,
    ) {
        let read_dir = match fs::read_dir(dir) {
            Ok(r) => r,
            Err(e) => {
                ready.push_back(Err(self.handle_io_error(dir.to_path_buf(), e)));
                return;
            }
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => ready.push_back(Err(self.handle_io_error(dir.to_path_buf(), e))),
            }
        }
        entries.sort_by_key(DirEntry::file_name);

        let mut subdirs = Vec::new();
        for entry in &entries {
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                subdirs.push(entry.path());
                continue;
            }
            if let Some(result) = self.process_entry(entry) {
                ready.push_back(result);
            }
        }

        // Reverse so the stack pops subdirectories in name order
        pending_dirs.extend(subdirs.into_iter().rev());
    }

    /// Log and classify I/O errors.
    fn handle_io_error(&self, path: PathBuf, error: std::io::Error) -> ScanError {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
            }
            std::io::ErrorKind::NotFound => {
                log::debug!("Path not found (may have been deleted): {}", path.display());
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
            }
        }
        ScanError::from_io(path, error)
    }
}

/// Iterator returned by [`Walker::walk`].
pub struct Walk<'a> {
    walker: &'a Walker,
    pending_dirs: Vec<PathBuf>,
    ready: VecDeque<Result<FileEntry, ScanError>>,
    visited: usize,
}

impl Iterator for Walk<'_> {
    type Item = Result<FileEntry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.walker.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                self.pending_dirs.clear();
                self.ready.clear();
                return None;
            }

            if let Some(result) = self.ready.pop_front() {
                if let (Ok(file), Some(callback)) = (&result, &self.walker.progress_callback) {
                    self.visited += 1;
                    callback.on_progress(self.visited, file.path.to_string_lossy().as_ref());
                }
                return Some(result);
            }

            let dir = self.pending_dirs.pop()?;
            self.walker
                .read_directory(&dir, &mut self.pending_dirs, &mut self.ready);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with some files.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let mut f = File::create(dir.path().join("file2.txt")).unwrap();
        writeln!(f, "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        let mut f = File::create(subdir.join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();

        dir
    }

    #[test]
    fn test_walker_finds_files() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.size > 0);
            assert!(file.path.exists());
        }
    }

    #[test]
    fn test_walker_no_depth_limit() {
        let dir = TempDir::new().unwrap();
        let mut deep = dir.path().to_path_buf();
        for i in 0..40 {
            deep = deep.join(format!("level{}", i));
        }
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("bottom.bin"), b"deep").unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "bottom.bin");
    }

    #[test]
    fn test_walker_min_size_is_inclusive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("below.bin"), vec![0u8; 9]).unwrap();
        fs::write(dir.path().join("exact.bin"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("above.bin"), vec![0u8; 11]).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::new(10));
        let mut names: Vec<_> = walker
            .walk()
            .filter_map(Result::ok)
            .map(|f| f.name.to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names, vec!["above.bin", "exact.bin"]);
    }

    #[test]
    fn test_walker_includes_empty_files_at_zero_threshold() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 0);
    }

    #[test]
    fn test_walker_visits_in_name_order() {
        let dir = TempDir::new().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let names: Vec<_> = walker
            .walk()
            .filter_map(Result::ok)
            .map(|f| f.name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_walker_shutdown_flag() {
        let dir = create_test_dir();
        for i in 0..10 {
            fs::write(dir.path().join(format!("extra{}.txt", i)), b"x").unwrap();
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let walker = Walker::new(dir.path(), WalkerConfig::default())
            .with_shutdown_flag(Arc::clone(&shutdown));

        shutdown.store(true, Ordering::SeqCst);

        let files: Vec<_> = walker.walk().collect();
        assert!(files.is_empty());
    }

    #[test]
    fn test_walker_handles_nonexistent_path() {
        let walker = Walker::new(
            Path::new("/nonexistent/path/12345"),
            WalkerConfig::default(),
        );

        let results: Vec<_> = walker.walk().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ScanError::NotFound(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_skips_symlinks() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("file1.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("subdir"), dir.path().join("linkdir"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.name != "link.txt"));
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_continues_past_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = create_test_dir();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), b"secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to observe in that case.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let results: Vec<_> = walker.walk().collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let denied = results
            .iter()
            .filter(|r| matches!(r, Err(ScanError::PermissionDenied(_))))
            .count();
        assert_eq!(ok, 3);
        assert_eq!(denied, 1);
    }
}
