use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mediasweep::config::settings::{ErrorPolicy, Settings};
use mediasweep::core::analyzer::Analyzer;
use mediasweep::core::cancel::CancellationToken;
use mediasweep::core::classifier::classify;
use mediasweep::core::eraser;
use mediasweep::core::events::{create_event_channel, Event};
use mediasweep::core::progress::StatsTracker;
use mediasweep::core::scanner::Scanner;
use mediasweep::core::session::{Phase, Session};
use mediasweep::export::json::export_json;
use mediasweep::export::markdown::render_markdown;
use mediasweep::models::category::{CategoryKey, Classification};
use mediasweep::models::deletion::DeleteStatus;
use mediasweep::models::scan_result::{CandidateFile, ScanErrorType, ScanOutcome, ScanReport};
use mediasweep::models::size::human_readable_size;

const MB: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a unique temporary directory for a test.
fn make_test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mediasweep_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir); // clean up from previous runs
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

/// Remove a temporary test directory.
fn cleanup(dir: &PathBuf) {
    let _ = std::fs::remove_dir_all(dir);
}

/// Create a file of exactly `size` bytes without writing its content.
fn sized_file(path: &PathBuf, size: u64) {
    let file = std::fs::File::create(path).expect("create file");
    file.set_len(size).expect("set file length");
}

/// A small library: one video plus three leftovers totalling 3.5 MB.
fn sample_library(name: &str) -> PathBuf {
    let dir = make_test_dir(name);
    sized_file(&dir.join("a.mkv"), 10 * MB);
    sized_file(&dir.join("b.rar"), MB);
    sized_file(&dir.join("c.rar"), MB / 2);
    sized_file(&dir.join("d.001"), 2 * MB);
    dir
}

fn scanner_with(settings: Settings) -> Scanner {
    Scanner::new(Arc::new(settings), Arc::new(StatsTracker::new()))
}

// ---------------------------------------------------------------------------
// 1. test_scan_library – classification and aggregation end to end
// ---------------------------------------------------------------------------

#[test]
fn test_scan_library() {
    let dir = sample_library("scan_library");

    let scanner = scanner_with(Settings::default());
    let run = scanner.scan(&dir, &CancellationToken::new(), &|_| {});
    let stats = scanner.stats().snapshot();

    assert!(run.outcome.is_completed());
    assert!(run.errors.is_empty(), "no errors expected");
    assert_eq!(stats.files_scanned, 4);
    assert_eq!(stats.dirs_scanned, 1);
    assert_eq!(stats.unwanted_file_count, 3);
    assert_eq!(stats.unwanted_total_size, 3 * MB + MB / 2);
    assert!(stats.is_consistent());

    let rar = stats.category(".rar").expect("rar bucket");
    assert_eq!(rar.count, 2);
    assert_eq!(rar.total_size_bytes, MB + MB / 2);
    let numbered = stats.category(CategoryKey::NUMBERED).expect("numbered bucket");
    assert_eq!(numbered.count, 1);
    assert_eq!(numbered.total_size_bytes, 2 * MB);

    let names: Vec<String> = run
        .candidates
        .iter()
        .map(|c| c.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["b.rar", "c.rar", "d.001"]);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 2. test_scan_nested_and_protected
// ---------------------------------------------------------------------------

#[test]
fn test_scan_nested_and_protected() {
    let dir = make_test_dir("scan_nested");
    std::fs::create_dir_all(dir.join("Season 1/extras")).unwrap();
    std::fs::write(dir.join("Season 1/ep1.mkv"), "video").unwrap();
    std::fs::write(dir.join("Season 1/ep1.srt"), "subs").unwrap();
    std::fs::write(dir.join("Season 1/ep1.nfo"), "info").unwrap();
    std::fs::write(dir.join("Season 1/extras/cover.JPG"), "img").unwrap();
    std::fs::write(dir.join("Season 1/extras/release-.r07"), "part").unwrap();

    let scanner = scanner_with(Settings::default());
    let run = scanner.scan(&dir, &CancellationToken::new(), &|_| {});
    let stats = scanner.stats().snapshot();

    assert!(run.outcome.is_completed());
    assert_eq!(stats.files_scanned, 5);
    assert_eq!(stats.dirs_scanned, 3); // root + Season 1 + extras
    assert_eq!(stats.unwanted_file_count, 3);
    assert_eq!(stats.category(".jpg").map(|c| c.count), Some(1));
    assert_eq!(stats.category(".nfo").map(|c| c.count), Some(1));
    assert_eq!(stats.category(CategoryKey::RAR_PART).map(|c| c.count), Some(1));
    assert!(run
        .candidates
        .iter()
        .all(|c| !c.path.to_string_lossy().ends_with(".srt")));

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 3. test_scan_cancel_keeps_prefix
// ---------------------------------------------------------------------------

#[test]
fn test_scan_cancel_keeps_prefix() {
    let dir = make_test_dir("scan_cancel");
    for i in 0..10 {
        std::fs::write(dir.join(format!("f{:02}.rar", i)), "x").unwrap();
    }

    let full = scanner_with(Settings::default()).scan(&dir, &CancellationToken::new(), &|_| {});
    assert_eq!(full.candidates.len(), 10);

    let settings = Settings {
        progress_batch: 1,
        ..Settings::default()
    };
    let scanner = scanner_with(settings);
    let token = CancellationToken::new();
    let cancel_token = token.clone();
    let run = scanner.scan(&dir, &token, &move |stats| {
        if stats.files_scanned >= 3 {
            cancel_token.cancel();
        }
    });
    let stats = scanner.stats().snapshot();

    assert_eq!(run.outcome, ScanOutcome::Cancelled);
    assert_eq!(run.candidates.len(), 3);
    assert_eq!(&full.candidates[..3], &run.candidates[..]);
    assert_eq!(stats.unwanted_file_count, 3);
    assert!(stats.is_consistent());

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 4. test_scan_error_policy
// ---------------------------------------------------------------------------

#[test]
fn test_scan_error_policy() {
    let dir = make_test_dir("scan_missing_root");
    let missing = dir.join("does_not_exist");

    let run = scanner_with(Settings::default()).scan(&missing, &CancellationToken::new(), &|_| {});
    match run.outcome {
        ScanOutcome::Failed(err) => assert_eq!(err.path, missing),
        other => panic!("expected failure, got {:?}", other),
    }

    // A missing root cannot be skipped, whatever the policy.
    let settings = Settings {
        error_policy: ErrorPolicy::Continue,
        ..Settings::default()
    };
    let run = scanner_with(settings).scan(&missing, &CancellationToken::new(), &|_| {});
    assert!(matches!(run.outcome, ScanOutcome::Failed(_)));

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 5. test_delete_skips_missing
// ---------------------------------------------------------------------------

#[test]
fn test_delete_skips_missing() {
    let dir = sample_library("delete_missing");
    let candidates: Vec<CandidateFile> = ["b.rar", "c.rar", "d.001"]
        .iter()
        .map(|name| {
            let path = dir.join(name);
            let size = std::fs::metadata(&path).unwrap().len();
            CandidateFile { path, size }
        })
        .collect();

    // Removed behind the scanner's back.
    std::fs::remove_file(dir.join("c.rar")).unwrap();

    let calls = AtomicUsize::new(0);
    let report = eraser::delete(&candidates, &CancellationToken::new(), &|processed, total| {
        calls.fetch_add(1, Ordering::SeqCst);
        assert!(processed <= total);
    });

    assert_eq!(report.status, DeleteStatus::Completed);
    assert_eq!(report.outcome.attempted, 3);
    assert_eq!(report.outcome.deleted_count, 2);
    assert_eq!(report.outcome.deleted_size_bytes, 3 * MB);
    assert_eq!(report.skipped(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(dir.join("a.mkv").exists());
    assert!(!dir.join("b.rar").exists());
    assert!(!dir.join("d.001").exists());

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 6. test_session_scan_then_delete – full lifecycle with events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_session_scan_then_delete() {
    let dir = sample_library("session_flow");
    let (tx, mut rx) = create_event_channel();
    let session = Session::new(Settings::default(), tx);

    let report = session.start_scan(dir.clone()).await.expect("scan task");
    assert!(report.outcome.is_completed());
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(session.phase(), Phase::ScanComplete);
    assert_eq!(session.pending_candidates(), report.candidates);

    let deletion = session
        .start_delete()
        .expect("delete should start")
        .await
        .expect("delete task");
    assert_eq!(deletion.status, DeleteStatus::Completed);
    assert_eq!(deletion.outcome.deleted_count, 3);
    assert_eq!(deletion.outcome.deleted_size_bytes, 3 * MB + MB / 2);
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.snapshot().is_none(), "statistics cleared after deletion");
    assert!(dir.join("a.mkv").exists());

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(events.iter().all(|e| e.generation() == 1));
    assert!(matches!(events.first(), Some(Event::ScanStarted { .. })));
    assert!(matches!(events.last(), Some(Event::DeleteCompleted { .. })));
    let scan_done = events
        .iter()
        .position(|e| matches!(e, Event::ScanCompleted { .. }))
        .expect("scan completion event");
    let delete_started = events
        .iter()
        .position(|e| matches!(e, Event::DeleteStarted { total: 3, .. }))
        .expect("delete start event");
    assert!(scan_done < delete_started);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 7. test_session_rescan_replaces_generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_session_rescan_replaces_generation() {
    let first = sample_library("session_rescan_a");
    let second = make_test_dir("session_rescan_b");
    std::fs::write(second.join("only.sfv"), "crc").unwrap();

    let (tx, mut rx) = create_event_channel();
    let session = Session::new(Settings::default(), tx);

    let old = session.start_scan(first.clone());
    let new = session.start_scan(second.clone());
    let _ = old.await.expect("first scan task");
    let report = new.await.expect("second scan task");

    assert_eq!(session.generation(), 2);
    assert!(report.outcome.is_completed());
    assert_eq!(session.phase(), Phase::ScanComplete);
    assert_eq!(session.pending_candidates(), report.candidates);
    assert_eq!(report.candidates.len(), 1);

    let mut completions = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::ScanCompleted { generation, .. } = event {
            completions.push(generation);
        }
    }
    completions.sort();
    assert_eq!(completions, vec![1, 2]);

    cleanup(&first);
    cleanup(&second);
}

// ---------------------------------------------------------------------------
// 8. test_session_cancel_delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_session_cancel_delete() {
    let dir = sample_library("session_cancel_delete");
    let (tx, _rx) = create_event_channel();
    let session = Session::new(Settings::default(), tx);

    let _ = session.start_scan(dir.clone()).await.expect("scan task");
    let handle = session.start_delete().expect("delete should start");
    session.request_cancel();
    let deletion = handle.await.expect("delete task");

    // Cancellation races the first removal; either way the counts agree.
    let removed = ["b.rar", "c.rar", "d.001"]
        .iter()
        .filter(|name| !dir.join(name).exists())
        .count();
    assert_eq!(deletion.outcome.deleted_count, removed);
    assert_eq!(deletion.total, 3);
    if deletion.status == DeleteStatus::Completed {
        assert_eq!(removed, 3);
    }
    assert_eq!(session.phase(), Phase::Idle);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 9. test_export_json – JSON round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_export_json() {
    let dir = sample_library("export_json");
    let (tx, _rx) = create_event_channel();
    let session = Session::new(Settings::default(), tx);
    let report = session.start_scan(dir.clone()).await.expect("scan task");

    let out = make_test_dir("export_json_out");
    let out_path = out.join("report.json");
    export_json(&report, &out_path).expect("export should succeed");

    let json_bytes = std::fs::read(&out_path).expect("read exported file");
    let restored: ScanReport = serde_json::from_slice(&json_bytes).expect("deserialize");

    assert_eq!(restored.statistics, report.statistics);
    assert_eq!(restored.candidates, report.candidates);
    assert_eq!(restored.outcome, ScanOutcome::Completed);
    assert_eq!(restored.scan_path, dir);

    let md = render_markdown(&report).expect("render markdown");
    assert!(md.contains("| .rar | 2 |"));
    assert!(md.contains("Numbered files (.001, .002, etc.)"));
    assert!(md.contains("**TOTAL**"));

    cleanup(&dir);
    cleanup(&out);
}

// ---------------------------------------------------------------------------
// 10. test_category_rows
// ---------------------------------------------------------------------------

#[test]
fn test_category_rows() {
    let dir = sample_library("category_rows");
    let scanner = scanner_with(Settings::default());
    let _ = scanner.scan(&dir, &CancellationToken::new(), &|_| {});
    let rows = Analyzer::category_rows(&scanner.stats().snapshot());

    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Numbered files (.001, .002, etc.)", ".rar", "TOTAL"]
    );
    let total = rows.last().unwrap();
    assert!(total.is_total);
    assert_eq!(total.count, 3);
    assert_eq!(human_readable_size(total.size), "3.50 MB");

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 11. test_classifier_rules
// ---------------------------------------------------------------------------

#[test]
fn test_classifier_rules() {
    // Protected suffixes win over everything else.
    assert_eq!(classify("movie.mkv"), Classification::Keep);
    assert_eq!(classify("subs.en.srt"), Classification::Keep);

    assert_eq!(
        classify("Movie.NFO"),
        Classification::Unwanted(CategoryKey::extension(".nfo"))
    );
    assert_eq!(
        classify("release-.r15"),
        Classification::Unwanted(CategoryKey::rar_part())
    );
    assert_eq!(
        classify("archive.042"),
        Classification::Unwanted(CategoryKey::numbered())
    );
    assert_eq!(
        classify("download.part3"),
        Classification::Unwanted(CategoryKey::numbered())
    );

    assert_eq!(classify("notes.doc"), Classification::Keep);
    assert_eq!(classify("archive.12"), Classification::Keep);
}

// ---------------------------------------------------------------------------
// 12. test_settings_default
// ---------------------------------------------------------------------------

#[test]
fn test_settings_default() {
    let s = Settings::default();

    assert!(!s.follow_symlinks);
    assert_eq!(s.progress_batch, 100);
    assert_eq!(s.error_policy, ErrorPolicy::Abort);
    assert_eq!(s.log_dir, PathBuf::from("."));
}

// ---------------------------------------------------------------------------
// 13. test_scan_abort_on_unreadable_entry
// ---------------------------------------------------------------------------

/// `a.nfo`, a dangling `b_dangling.jpg` link and `c.rar`, in walk order.
#[cfg(unix)]
fn library_with_dangling_link(name: &str) -> PathBuf {
    let dir = make_test_dir(name);
    std::fs::write(dir.join("a.nfo"), "info").unwrap();
    std::os::unix::fs::symlink(dir.join("nowhere"), dir.join("b_dangling.jpg")).unwrap();
    std::fs::write(dir.join("c.rar"), "rar").unwrap();
    dir
}

#[cfg(unix)]
#[test]
fn test_scan_abort_on_unreadable_entry() {
    let dir = library_with_dangling_link("scan_abort");
    let settings = Settings {
        follow_symlinks: true,
        ..Settings::default()
    };

    let scanner = scanner_with(settings);
    let run = scanner.scan(&dir, &CancellationToken::new(), &|_| {});

    match &run.outcome {
        ScanOutcome::Failed(err) => {
            assert_eq!(err.path, dir.join("b_dangling.jpg"));
            assert_eq!(err.error_type, ScanErrorType::NotFound);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    // Candidates found before the failing entry are kept.
    assert_eq!(run.candidates.len(), 1);
    assert_eq!(run.candidates[0].path, dir.join("a.nfo"));
    assert!(run.errors.is_empty());
    assert!(scanner.stats().snapshot().is_consistent());

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 14. test_scan_continue_past_unreadable_entry
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn test_scan_continue_past_unreadable_entry() {
    let dir = library_with_dangling_link("scan_continue");
    let settings = Settings {
        follow_symlinks: true,
        error_policy: ErrorPolicy::Continue,
        ..Settings::default()
    };

    let scanner = scanner_with(settings);
    let run = scanner.scan(&dir, &CancellationToken::new(), &|_| {});
    let stats = scanner.stats().snapshot();

    assert!(run.outcome.is_completed());
    assert_eq!(run.errors.len(), 1);
    assert_eq!(run.errors[0].path, dir.join("b_dangling.jpg"));
    assert_eq!(run.errors[0].error_type, ScanErrorType::NotFound);
    let paths: Vec<PathBuf> = run.candidates.iter().map(|c| c.path.clone()).collect();
    assert_eq!(paths, vec![dir.join("a.nfo"), dir.join("c.rar")]);
    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.unwanted_file_count, 2);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 15. test_linked_leftover_is_removed_not_its_target
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn test_linked_leftover_is_removed_not_its_target() {
    let dir = make_test_dir("linked_leftover");
    std::fs::create_dir_all(dir.join("store")).unwrap();
    std::fs::write(dir.join("store/real.bin"), "payload").unwrap();
    std::os::unix::fs::symlink(dir.join("store/real.bin"), dir.join("cover.jpg")).unwrap();

    let scanner = scanner_with(Settings::default());
    let run = scanner.scan(&dir, &CancellationToken::new(), &|_| {});
    let stats = scanner.stats().snapshot();

    assert!(run.outcome.is_completed());
    assert_eq!(stats.files_scanned, 2);
    assert_eq!(run.candidates.len(), 1);
    assert_eq!(run.candidates[0].path, dir.join("cover.jpg"));

    let report = eraser::delete(&run.candidates, &CancellationToken::new(), &|_, _| {});
    assert_eq!(report.outcome.deleted_count, 1);
    assert!(std::fs::symlink_metadata(dir.join("cover.jpg")).is_err());
    assert!(dir.join("store/real.bin").exists());

    cleanup(&dir);
}
