use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::vec;

use dashmap::DashSet;

use crate::config::settings::{ErrorPolicy, Settings};
use crate::error::TraversalError;
use crate::models::scan_result::{CandidateFile, ScanError, ScanOutcome, ScanStatistics};

use super::cancel::CancellationToken;
use super::progress::StatsTracker;

/// Result of one walk: the candidates found so far and why the walk ended.
#[derive(Debug)]
pub struct ScanRun {
    pub candidates: Vec<CandidateFile>,
    pub outcome: ScanOutcome,
    pub errors: Vec<ScanError>,
}

/// Name and full path of one directory entry.
type DirEntry = (OsString, PathBuf);

enum Kind {
    Dir,
    File(u64),
}

enum Stop {
    Cancelled,
    Failed(TraversalError),
}

#[derive(Default)]
struct WalkState {
    candidates: Vec<CandidateFile>,
    errors: Vec<ScanError>,
}

pub struct Scanner {
    settings: Arc<Settings>,
    stats: Arc<StatsTracker>,
    visited: DashSet<PathBuf>,
}

impl Scanner {
    pub fn new(settings: Arc<Settings>, stats: Arc<StatsTracker>) -> Self {
        Self {
            settings,
            stats,
            visited: DashSet::new(),
        }
    }

    pub fn stats(&self) -> &Arc<StatsTracker> {
        &self.stats
    }

    /// Walks `root` depth-first, entries of each directory in name order.
    /// Links are entered only with `follow_symlinks`; otherwise they count as
    /// plain files.
    ///
    /// Blocks on filesystem I/O; run it off the async executor. `on_progress`
    /// receives a statistics snapshot once per directory and once every
    /// `progress_batch` files, plus a final one when the walk ends.
    pub fn scan(
        &self,
        root: &Path,
        token: &CancellationToken,
        on_progress: &(dyn Fn(&ScanStatistics) + Sync),
    ) -> ScanRun {
        self.visited.clear();
        let mut state = WalkState::default();

        let result = self.scan_root(root, token, on_progress, &mut state);
        on_progress(&self.stats.snapshot());

        let outcome = match result {
            Ok(()) => ScanOutcome::Completed,
            Err(Stop::Cancelled) => {
                tracing::debug!(root = %root.display(), "scan cancelled");
                ScanOutcome::Cancelled
            }
            Err(Stop::Failed(err)) => {
                tracing::error!(root = %root.display(), "scan failed: {}", err);
                ScanOutcome::Failed(err)
            }
        };

        ScanRun {
            candidates: state.candidates,
            outcome,
            errors: state.errors,
        }
    }

    fn scan_root(
        &self,
        root: &Path,
        token: &CancellationToken,
        on_progress: &(dyn Fn(&ScanStatistics) + Sync),
        state: &mut WalkState,
    ) -> Result<(), Stop> {
        if token.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        // The root itself is always resolved, even when it is a link.
        let metadata = match fs::metadata(root) {
            Ok(m) => m,
            Err(e) => return Err(Stop::Failed(TraversalError::from_io(root, &e))),
        };
        if metadata.is_dir() {
            self.walk(root, token, on_progress, state)
        } else {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.visit_file(root, &name, metadata.len(), on_progress, state);
            Ok(())
        }
    }

    /// Depth-first walk driven by a stack of open directory listings, so the
    /// tree depth never grows the call stack.
    fn walk(
        &self,
        root: &Path,
        token: &CancellationToken,
        on_progress: &(dyn Fn(&ScanStatistics) + Sync),
        state: &mut WalkState,
    ) -> Result<(), Stop> {
        let mut stack: Vec<vec::IntoIter<DirEntry>> = Vec::new();
        if let Some(entries) = self.enter_dir(root, token, on_progress, state)? {
            stack.push(entries.into_iter());
        }

        while let Some(listing) = stack.last_mut() {
            let Some((name, path)) = listing.next() else {
                stack.pop();
                continue;
            };
            if token.is_cancelled() {
                return Err(Stop::Cancelled);
            }

            match self.inspect(&path, token, state)? {
                Some(Kind::Dir) => {
                    if let Some(entries) = self.enter_dir(&path, token, on_progress, state)? {
                        stack.push(entries.into_iter());
                    }
                }
                Some(Kind::File(size)) => {
                    let name = name.to_string_lossy();
                    self.visit_file(&path, &name, size, on_progress, state);
                }
                None => {}
            }
        }

        Ok(())
    }

    /// Counts `dir` and lists its entries in name order. `None` when the
    /// directory was already walked or could not be read under
    /// [`ErrorPolicy::Continue`].
    fn enter_dir(
        &self,
        dir: &Path,
        token: &CancellationToken,
        on_progress: &(dyn Fn(&ScanStatistics) + Sync),
        state: &mut WalkState,
    ) -> Result<Option<Vec<DirEntry>>, Stop> {
        if self.settings.follow_symlinks {
            match fs::canonicalize(dir) {
                Ok(real) => {
                    if !self.visited.insert(real) {
                        tracing::debug!(path = %dir.display(), "directory already visited, skipping");
                        return Ok(None);
                    }
                }
                Err(e) => return self.entry_failed(dir, &e, token, state).map(|()| None),
            }
        }

        self.stats.observe_dir();
        on_progress(&self.stats.snapshot());

        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => return self.entry_failed(dir, &e, token, state).map(|()| None),
        };

        let mut entries: Vec<DirEntry> = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => entries.push((entry.file_name(), entry.path())),
                Err(e) => self.entry_failed(dir, &e, token, state)?,
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Some(entries))
    }

    /// Decides how an entry is walked. Anything that is not a directory counts
    /// as a file. Unfollowed links are files of their own, sized by the link
    /// itself, so removing one never touches its target.
    fn inspect(
        &self,
        path: &Path,
        token: &CancellationToken,
        state: &mut WalkState,
    ) -> Result<Option<Kind>, Stop> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) => return self.entry_failed(path, &e, token, state).map(|()| None),
        };

        let metadata = if metadata.file_type().is_symlink() && self.settings.follow_symlinks {
            match fs::metadata(path) {
                Ok(target) => target,
                Err(e) => return self.entry_failed(path, &e, token, state).map(|()| None),
            }
        } else {
            metadata
        };

        if metadata.is_dir() {
            Ok(Some(Kind::Dir))
        } else {
            Ok(Some(Kind::File(metadata.len())))
        }
    }

    fn visit_file(
        &self,
        path: &Path,
        name: &str,
        size: u64,
        on_progress: &(dyn Fn(&ScanStatistics) + Sync),
        state: &mut WalkState,
    ) {
        let seen = self.stats.observe_file();
        if self.stats.record(name, size).is_some() {
            state.candidates.push(CandidateFile {
                path: path.to_path_buf(),
                size,
            });
        }
        if seen % self.settings.progress_batch.max(1) == 0 {
            on_progress(&self.stats.snapshot());
        }
    }

    fn entry_failed(
        &self,
        path: &Path,
        err: &std::io::Error,
        token: &CancellationToken,
        state: &mut WalkState,
    ) -> Result<(), Stop> {
        if token.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        let err = TraversalError::from_io(path, err);
        match self.settings.error_policy {
            ErrorPolicy::Abort => Err(Stop::Failed(err)),
            ErrorPolicy::Continue => {
                tracing::warn!(path = %err.path.display(), "skipping unreadable entry: {}", err.message);
                state.errors.push(ScanError {
                    path: err.path,
                    error_type: err.error_type,
                    message: err.message,
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mediasweep_scanner_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create test dir");
        dir
    }

    fn scanner(settings: Settings) -> Scanner {
        Scanner::new(Arc::new(settings), Arc::new(StatsTracker::new()))
    }

    #[test]
    fn candidates_follow_traversal_order() {
        let dir = make_test_dir("order");
        fs::create_dir_all(dir.join("b_season")).unwrap();
        fs::write(dir.join("a.nfo"), "x").unwrap();
        fs::write(dir.join("b_season/ep.sfv"), "xx").unwrap();
        fs::write(dir.join("b_season/ep.mkv"), "xxx").unwrap();
        fs::write(dir.join("c.jpg"), "xxxx").unwrap();

        let s = scanner(Settings::default());
        let run = s.scan(&dir, &CancellationToken::new(), &|_| {});

        assert!(run.outcome.is_completed());
        let names: Vec<_> = run
            .candidates
            .iter()
            .map(|c| c.path.strip_prefix(&dir).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.nfo"),
                PathBuf::from("b_season/ep.sfv"),
                PathBuf::from("c.jpg"),
            ]
        );
        let stats = s.stats().snapshot();
        assert_eq!(stats.files_scanned, 4);
        assert_eq!(stats.dirs_scanned, 2);
        assert_eq!(stats.unwanted_total_size, 7);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn progress_fires_per_directory_and_batch() {
        let dir = make_test_dir("batch");
        for i in 0..5 {
            fs::write(dir.join(format!("f{i}.txt")), "").unwrap();
        }

        let settings = Settings {
            progress_batch: 2,
            ..Settings::default()
        };
        let calls = AtomicUsize::new(0);
        let s = scanner(settings);
        s.scan(&dir, &CancellationToken::new(), &|_| {
            calls.fetch_add(1, Ordering::Relaxed);
        });

        // one for the root dir, two batches (files 2 and 4), one final
        assert_eq!(calls.load(Ordering::Relaxed), 4);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn cancelled_before_start_scans_nothing() {
        let dir = make_test_dir("precancel");
        fs::write(dir.join("x.rar"), "x").unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let s = scanner(Settings::default());
        let run = s.scan(&dir, &token, &|_| {});

        assert!(run.outcome.is_cancelled());
        assert!(run.candidates.is_empty());
        assert_eq!(s.stats().snapshot().dirs_scanned, 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_root_fails_with_traversal_error() {
        let dir = make_test_dir("missing").join("not_here");
        let s = scanner(Settings::default());
        let run = s.scan(&dir, &CancellationToken::new(), &|_| {});

        match run.outcome {
            ScanOutcome::Failed(err) => {
                assert_eq!(err.path, dir);
                assert_eq!(err.error_type, crate::models::scan_result::ScanErrorType::NotFound);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn file_root_is_classified_directly() {
        let dir = make_test_dir("file_root");
        let file = dir.join("single.part3");
        fs::write(&file, "abc").unwrap();

        let s = scanner(Settings::default());
        let run = s.scan(&file, &CancellationToken::new(), &|_| {});
        assert!(run.outcome.is_completed());
        assert_eq!(run.candidates, vec![CandidateFile { path: file, size: 3 }]);

        let _ = fs::remove_dir_all(&dir);
    }

    // Deep paths exceed PATH_MAX on other platforms.
    #[cfg(target_os = "linux")]
    #[test]
    fn deep_tree_does_not_exhaust_the_stack() {
        let dir = make_test_dir("deep");
        let mut leaf = dir.clone();
        for _ in 0..1200 {
            leaf.push("a");
        }
        fs::create_dir_all(&leaf).unwrap();
        fs::write(leaf.join("x.nfo"), "deep").unwrap();

        let s = scanner(Settings::default());
        let run = s.scan(&dir, &CancellationToken::new(), &|_| {});

        assert!(run.outcome.is_completed());
        assert_eq!(run.candidates.len(), 1);
        assert_eq!(run.candidates[0].path, leaf.join("x.nfo"));
        assert_eq!(s.stats().snapshot().dirs_scanned, 1201);

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn unfollowed_links_are_counted_as_files() {
        let dir = make_test_dir("links");
        fs::create_dir_all(dir.join("real")).unwrap();
        fs::write(dir.join("real/cover.png"), "png").unwrap();
        std::os::unix::fs::symlink(dir.join("real"), dir.join("alias")).unwrap();
        std::os::unix::fs::symlink(&dir, dir.join("real/loop")).unwrap();
        std::os::unix::fs::symlink(dir.join("real/cover.png"), dir.join("poster.jpg")).unwrap();

        let plain = scanner(Settings::default());
        let run = plain.scan(&dir, &CancellationToken::new(), &|_| {});
        assert!(run.outcome.is_completed());
        let stats = plain.stats().snapshot();
        // alias, poster.jpg, real/cover.png and real/loop; no directory link is entered.
        assert_eq!(stats.files_scanned, 4);
        assert_eq!(stats.dirs_scanned, 2);
        let names: Vec<_> = run
            .candidates
            .iter()
            .map(|c| c.path.strip_prefix(&dir).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("poster.jpg"), PathBuf::from("real/cover.png")]);
        let link_len = fs::symlink_metadata(dir.join("poster.jpg")).unwrap().len();
        assert_eq!(run.candidates[0].size, link_len);

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn followed_links_are_walked_once() {
        let dir = make_test_dir("links_followed");
        fs::create_dir_all(dir.join("real")).unwrap();
        fs::write(dir.join("real/cover.png"), "png").unwrap();
        std::os::unix::fs::symlink(dir.join("real"), dir.join("alias")).unwrap();
        std::os::unix::fs::symlink(&dir, dir.join("real/loop")).unwrap();

        let following = scanner(Settings {
            follow_symlinks: true,
            ..Settings::default()
        });
        let run = following.scan(&dir, &CancellationToken::new(), &|_| {});
        assert!(run.outcome.is_completed());
        // "alias" and "real" are the same directory and "loop" is the root.
        assert_eq!(run.candidates.len(), 1);
        assert_eq!(following.stats().snapshot().dirs_scanned, 2);

        let _ = fs::remove_dir_all(&dir);
    }
}
