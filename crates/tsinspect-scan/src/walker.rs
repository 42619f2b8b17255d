//! JWalk-based directory walker yielding one step per directory.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::time::Duration;

use compact_str::CompactString;
use jwalk::{DirEntry, Parallelism, WalkDir};
use tracing::{debug, warn};

use tsinspect_core::{InspectConfig, ROOT, child_file};

type EntryResult = Result<DirEntry<((), ())>, jwalk::Error>;

/// A non-directory entry directly inside a walked directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFile {
    /// Name as text, used for the relative path.
    pub name: CompactString,
    /// Absolute path as it exists on disk.
    pub path: PathBuf,
}

/// A directory together with the non-directory entries directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkStep {
    /// Path relative to the root, with a trailing separator.
    pub rel_dir: String,
    /// Absolute path of the directory.
    pub abs_dir: PathBuf,
    /// Files directly inside the directory.
    pub files: Vec<WalkFile>,
}

impl WalkStep {
    fn new(rel_dir: String, abs_dir: PathBuf) -> Self {
        Self {
            rel_dir,
            abs_dir,
            files: Vec::new(),
        }
    }

    /// The directory itself followed by each of its files, as
    /// `(relative, absolute)` pairs.
    pub fn entries(&self) -> Vec<(String, PathBuf)> {
        let mut entries = Vec::with_capacity(self.files.len() + 1);
        entries.push((self.rel_dir.clone(), self.abs_dir.clone()));
        for file in &self.files {
            entries.push((child_file(&self.rel_dir, &file.name), file.path.clone()));
        }
        entries
    }
}

/// One item of the underlying walk.
#[derive(Debug)]
enum Visit {
    Dir {
        path: PathBuf,
        unreadable: Option<String>,
    },
    File {
        name: CompactString,
        path: PathBuf,
    },
    Failed {
        path: Option<PathBuf>,
        error: String,
    },
}

impl From<EntryResult> for Visit {
    fn from(result: EntryResult) -> Self {
        match result {
            // jwalk still yields a directory it failed to list, with the
            // listing error attached to the entry
            Ok(entry) if entry.file_type().is_dir() => Visit::Dir {
                path: entry.path(),
                unreadable: entry.read_children_error.as_ref().map(|e| e.to_string()),
            },
            Ok(entry) => Visit::File {
                name: CompactString::new(entry.file_name().to_string_lossy()),
                path: entry.path(),
            },
            Err(err) => Visit::Failed {
                path: err.path().map(Path::to_path_buf),
                error: err.to_string(),
            },
        }
    }
}

/// Lazy pre-order walk over a directory tree.
///
/// Each directory is yielded with its files before any of its
/// subdirectories. Directories that cannot be listed are still yielded,
/// with no files. The order of sibling subdirectories is unspecified.
pub struct PathWalker {
    root: PathBuf,
    visits: Box<dyn Iterator<Item = Visit>>,
    current: Option<WalkStep>,
}

impl PathWalker {
    /// Start a walk over `root` with the walker options from `config`.
    pub fn new(root: impl Into<PathBuf>, config: &InspectConfig) -> Self {
        let root = root.into();
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&root)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(|_depth, _path, _state, children| {
                // Files first so every file directly follows its parent directory
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => (a.file_type().is_dir(), a.file_name())
                        .cmp(&(b.file_type().is_dir(), b.file_name())),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        Self::from_visits(root, walker.into_iter().map(Visit::from))
    }

    fn from_visits(root: PathBuf, visits: impl Iterator<Item = Visit> + 'static) -> Self {
        Self {
            root,
            visits: Box::new(visits),
            current: None,
        }
    }

    /// Relative directory path of an absolute path below the root.
    fn relative_dir(&self, path: &Path) -> String {
        let mut rel = String::from(ROOT);
        if let Ok(suffix) = path.strip_prefix(&self.root) {
            for component in suffix.components() {
                rel.push_str(&component.as_os_str().to_string_lossy());
                rel.push(MAIN_SEPARATOR);
            }
        }
        rel
    }
}

impl Iterator for PathWalker {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        loop {
            let Some(visit) = self.visits.next() else {
                return self.current.take();
            };

            match visit {
                Visit::Dir { path, unreadable } => {
                    if let Some(error) = unreadable {
                        warn!(path = %path.display(), error = %error, "failed to read directory");
                    }
                    let step = WalkStep::new(self.relative_dir(&path), path);
                    debug!(dir = %step.rel_dir, "entering directory");
                    if let Some(done) = self.current.replace(step) {
                        return Some(done);
                    }
                }
                Visit::File { name, path } => {
                    if let Some(step) = self.current.as_mut() {
                        step.files.push(WalkFile { name, path });
                    }
                }
                Visit::Failed { path, error } => {
                    let path = path.map(|p| p.display().to_string()).unwrap_or_default();
                    warn!(path = %path, error = %error, "failed to read entry");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tsinspect_core::child_dir;

    fn create_test_tree() -> TempDir {
        let temp = tempfile::Builder::new().prefix("walk").tempdir().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another").unwrap();
        fs::write(root.join("zz_last.txt"), "sorted after dirs by name").unwrap();

        temp
    }

    fn walk(temp: &TempDir) -> Vec<WalkStep> {
        let config = InspectConfig::new(temp.path());
        PathWalker::new(temp.path(), &config).collect()
    }

    #[test]
    fn test_root_comes_first_with_its_files() {
        let temp = create_test_tree();
        let steps = walk(&temp);

        assert_eq!(steps[0].rel_dir, ROOT);
        assert_eq!(steps[0].abs_dir, temp.path());
        let names: Vec<&str> = steps[0].files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["file1.txt", "zz_last.txt"]);
    }

    #[test]
    fn test_every_directory_yielded_once() {
        let temp = create_test_tree();
        let steps = walk(&temp);

        let mut dirs: Vec<_> = steps.iter().map(|s| s.rel_dir.clone()).collect();
        dirs.sort();
        let dir1 = child_dir(ROOT, "dir1");
        let mut expected = vec![
            ROOT.to_string(),
            dir1.clone(),
            child_dir(&dir1, "subdir"),
            child_dir(ROOT, "dir2"),
            child_dir(ROOT, "empty"),
        ];
        expected.sort();
        assert_eq!(dirs, expected);
    }

    #[test]
    fn test_files_attach_to_their_directory() {
        let temp = create_test_tree();
        let steps = walk(&temp);

        let subdir = child_dir(&child_dir(ROOT, "dir1"), "subdir");
        let step = steps.iter().find(|s| s.rel_dir == subdir).unwrap();
        assert_eq!(step.files.len(), 1);
        assert_eq!(step.files[0].name.as_str(), "file3.txt");
        assert_eq!(step.files[0].path, step.abs_dir.join("file3.txt"));

        let empty = steps
            .iter()
            .find(|s| s.rel_dir == child_dir(ROOT, "empty"))
            .unwrap();
        assert!(empty.files.is_empty());
    }

    #[test]
    fn test_parent_before_children() {
        let temp = create_test_tree();
        let steps = walk(&temp);

        let dir1 = child_dir(ROOT, "dir1");
        let pos = |rel: &str| steps.iter().position(|s| s.rel_dir == rel).unwrap();
        assert!(pos(&dir1) < pos(&child_dir(&dir1, "subdir")));
    }

    #[test]
    fn test_step_entries() {
        let step = WalkStep {
            rel_dir: child_dir(ROOT, "a"),
            abs_dir: PathBuf::from("/r/a"),
            files: vec![WalkFile {
                name: "new.txt".into(),
                path: PathBuf::from("/r/a/new.txt"),
            }],
        };
        let entries = step.entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (child_dir(ROOT, "a"), PathBuf::from("/r/a")));
        assert_eq!(
            entries[1],
            (child_file(&child_dir(ROOT, "a"), "new.txt"), PathBuf::from("/r/a/new.txt"))
        );
    }

    #[test]
    fn test_hidden_files_skipped() {
        let temp = create_test_tree();
        fs::write(temp.path().join(".hidden"), "h").unwrap();

        let config = InspectConfig::builder()
            .root(temp.path())
            .include_hidden(false)
            .build()
            .unwrap();
        let steps: Vec<_> = PathWalker::new(temp.path(), &config).collect();
        assert!(!steps[0].files.iter().any(|f| f.name.as_str() == ".hidden"));
    }

    #[test]
    fn test_max_depth_limits_walk() {
        let temp = create_test_tree();
        let config = InspectConfig::builder()
            .root(temp.path())
            .max_depth(Some(1))
            .build()
            .unwrap();
        let steps: Vec<_> = PathWalker::new(temp.path(), &config).collect();

        let subdir = child_dir(&child_dir(ROOT, "dir1"), "subdir");
        assert!(steps.iter().all(|s| s.rel_dir != subdir));
    }

    #[test]
    fn test_unlistable_directory_yielded_without_files() {
        let visits = vec![
            Visit::Dir {
                path: PathBuf::from("/r"),
                unreadable: None,
            },
            Visit::File {
                name: "a.txt".into(),
                path: PathBuf::from("/r/a.txt"),
            },
            Visit::Dir {
                path: PathBuf::from("/r/locked"),
                unreadable: Some("Permission denied (os error 13)".to_string()),
            },
            Visit::Failed {
                path: Some(PathBuf::from("/r/gone")),
                error: "No such file or directory".to_string(),
            },
            Visit::Dir {
                path: PathBuf::from("/r/open"),
                unreadable: None,
            },
            Visit::File {
                name: "b.txt".into(),
                path: PathBuf::from("/r/open/b.txt"),
            },
        ];
        let steps: Vec<_> = PathWalker::from_visits(PathBuf::from("/r"), visits.into_iter()).collect();

        let dirs: Vec<&str> = steps.iter().map(|s| s.rel_dir.as_str()).collect();
        let locked = child_dir(ROOT, "locked");
        let open = child_dir(ROOT, "open");
        assert_eq!(dirs, [ROOT, locked.as_str(), open.as_str()]);

        assert!(steps[1].files.is_empty());
        assert_eq!(
            steps[1].entries(),
            vec![(locked.clone(), PathBuf::from("/r/locked"))]
        );
        assert_eq!(steps[2].files.len(), 1);
        assert_eq!(steps[2].files[0].path, PathBuf::from("/r/open/b.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_on_disk_still_yielded() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_test_tree();
        let sealed = temp.path().join("dir2");
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users can still list it
        let listable = fs::read_dir(&sealed).is_ok();

        let steps = walk(&temp);
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

        let step = steps
            .iter()
            .find(|s| s.rel_dir == child_dir(ROOT, "dir2"))
            .unwrap();
        assert_eq!(step.abs_dir, sealed);
        if !listable {
            assert!(step.files.is_empty());
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_keeps_real_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = create_test_tree();
        let raw = OsStr::from_bytes(b"bad\xffname.txt");
        fs::write(temp.path().join("empty").join(raw), "x").unwrap();

        let steps = walk(&temp);
        let step = steps
            .iter()
            .find(|s| s.rel_dir == child_dir(ROOT, "empty"))
            .unwrap();

        assert_eq!(step.files.len(), 1);
        assert_eq!(step.files[0].name.as_str(), "bad\u{FFFD}name.txt");
        assert_eq!(step.files[0].path, step.abs_dir.join(raw));
        assert!(step.files[0].path.exists());
    }
}
