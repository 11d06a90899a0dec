use super::*;
use crate::models::RemovalManifest;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_files(temp_dir: &TempDir, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let path = temp_dir.path().join(name);
            fs::write(&path, b"test content").unwrap();
            path.to_string_lossy().to_string()
        })
        .collect()
}

/// Removes the file outright.
struct RemoveFile;

impl TrashStrategy for RemoveFile {
    fn name(&self) -> &'static str {
        "remove-file"
    }

    fn attempt_trash(&self, path: &Path) -> TrashOutcome {
        match fs::remove_file(path) {
            Ok(()) => TrashOutcome::Success,
            Err(e) => TrashOutcome::StrategyFailed(e.to_string()),
        }
    }
}

/// Fails for paths containing `needle`, counting every attempt.
struct RefuseMatching {
    name: &'static str,
    needle: &'static str,
    attempts: Arc<AtomicUsize>,
}

impl TrashStrategy for RefuseMatching {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt_trash(&self, path: &Path) -> TrashOutcome {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if path.to_string_lossy().contains(self.needle) {
            TrashOutcome::StrategyFailed(format!("{} refused {}", self.name, path.display()))
        } else {
            match fs::remove_file(path) {
                Ok(()) => TrashOutcome::Success,
                Err(e) => TrashOutcome::StrategyFailed(e.to_string()),
            }
        }
    }
}

fn manifest_text(paths: &[String]) -> String {
    serde_json::to_string(&RemovalManifest {
        folder: "/media/holiday".to_string(),
        timestamp: "2026-10-18T09:30:00.000Z".to_string(),
        removed_files: paths.to_vec(),
        total_files: 10,
        removed_count: paths.len(),
    })
    .unwrap()
}

// Normalization

#[test]
fn test_normalize_strips_scheme_and_control_chars() {
    assert_eq!(
        normalize_path("file:///home/me/\u{0}pics/a.jpg\n"),
        "/home/me/pics/a.jpg"
    );
    assert_eq!(normalize_path("FILE:///tmp/x.png"), "/tmp/x.png");
}

#[test]
fn test_normalize_collapses_separators() {
    assert_eq!(normalize_path("C:\\Users\\me\\\\Pictures\\a.jpg"), "C:/Users/me/Pictures/a.jpg");
    assert_eq!(normalize_path("/home//me///a.jpg"), "/home/me/a.jpg");
}

#[test]
fn test_normalize_percent_decodes() {
    assert_eq!(normalize_path("/home/me/My%20Pics/caf%C3%A9.jpg"), "/home/me/My Pics/café.jpg");
}

#[test]
fn test_normalize_keeps_undecodable_input() {
    assert_eq!(normalize_path("/home/me/100%/a%zz.jpg"), "/home/me/100%/a%zz.jpg");
    assert_eq!(normalize_path("/home/me/bad%FF.jpg"), "/home/me/bad%FF.jpg");
}

#[test]
fn test_normalize_drops_verbatim_prefix() {
    assert_eq!(
        normalize_path(r"\\?\C:\Users\me\Pictures\a.jpg"),
        "C:/Users/me/Pictures/a.jpg"
    );
    assert_eq!(
        normalize_path("file:////?/D:/media/b.png"),
        "D:/media/b.png"
    );
}

#[test]
fn test_strip_verbatim_prefix_forms() {
    assert_eq!(paths::strip_verbatim_prefix(r"\\?\C:\x\a.jpg"), r"C:\x\a.jpg");
    assert_eq!(
        paths::strip_verbatim_prefix(r"\\?\UNC\nas\photos\a.jpg"),
        r"\\nas\photos\a.jpg"
    );
    assert_eq!(
        paths::strip_verbatim_prefix(r"\\?\Volume{1234}\a.jpg"),
        r"\\?\Volume{1234}\a.jpg"
    );
    assert_eq!(paths::strip_verbatim_prefix("/home/me/a.jpg"), "/home/me/a.jpg");
    assert_eq!(
        paths::simplified(Path::new(r"\\?\C:\Users\me")),
        std::path::PathBuf::from(r"C:\Users\me")
    );
}

#[test]
fn test_canonical_paths_pass_verification() {
    let temp_dir = TempDir::new().unwrap();
    let files = create_test_files(&temp_dir, &["a.jpg", "b.png"]);

    // canonicalize yields verbatim paths on Windows
    let canonical: Vec<String> = files
        .iter()
        .map(|f| normalize_path(&fs::canonicalize(f).unwrap().to_string_lossy()))
        .collect();
    assert!(verify_paths(&canonical).all_present());

    let simplified: Vec<String> = files
        .iter()
        .map(|f| {
            let path = paths::simplified(&fs::canonicalize(f).unwrap());
            normalize_path(&path.to_string_lossy())
        })
        .collect();
    assert!(verify_paths(&simplified).all_present());
}

#[test]
fn test_normalize_leaves_dot_segments() {
    assert_eq!(normalize_path("/home/me/../me/a.jpg"), "/home/me/../me/a.jpg");
}

// Manifest parsing

#[test]
fn test_parse_removed_files_round_trip() {
    let paths = vec!["/a/one.jpg".to_string(), "/a/two.mp4".to_string(), "/b/three.png".to_string()];
    let parsed = parse_removed_files(&manifest_text(&paths)).unwrap();
    assert_eq!(parsed, paths);
}

#[test]
fn test_parse_rejects_wrong_shapes() {
    for text in [
        "not json",
        "[]",
        r#"{"folder": "/x"}"#,
        r#"{"removedFiles": "/x/a.jpg"}"#,
        r#"{"removedFiles": ["/x/a.jpg", 3]}"#,
    ] {
        let result = parse_removed_files(text);
        assert!(matches!(result, Err(OpsError::Validation(_))), "accepted {}", text);
    }
}

#[test]
fn test_parse_empty_list_is_empty_job() {
    let result = parse_removed_files(r#"{"removedFiles": []}"#);
    assert!(matches!(result, Err(OpsError::EmptyJob)));
}

#[test]
fn test_manifest_from_json_checks_count() {
    let text = r#"{"folder":"/x","timestamp":"t","removedFiles":["/x/a.jpg"],"totalFiles":4,"removedCount":2}"#;
    assert!(matches!(RemovalManifest::from_json(text), Err(OpsError::Validation(_))));

    let text = r#"{"folder":"/x","timestamp":"t","removedFiles":["/x/a.jpg"],"totalFiles":4,"removedCount":1}"#;
    let manifest = RemovalManifest::from_json(text).unwrap();
    assert_eq!(manifest.total_files, 4);
}

#[test]
fn test_manifest_serializes_camel_case() {
    let text = manifest_text(&["/a.jpg".to_string()]);
    assert!(text.contains("\"removedFiles\""));
    assert!(text.contains("\"totalFiles\""));
    assert!(text.contains("\"removedCount\""));
}

#[test]
fn test_manifest_file_name() {
    let name = manifest::manifest_file_name("/home/me/Holiday 2026/", "2026-10-18T09:30:00.000Z");
    assert_eq!(name, "Holiday 2026_2026-10-18T09-30-00-000Z.json");
}

// Verification

#[test]
fn test_verify_splits_present_and_missing() {
    let temp_dir = TempDir::new().unwrap();
    let mut paths = create_test_files(&temp_dir, &["a.jpg", "b.jpg"]);
    paths.push(temp_dir.path().join("gone.jpg").to_string_lossy().to_string());

    let verification = verify_paths(&paths);
    assert_eq!(verification.present.len(), 2);
    assert_eq!(verification.missing.len(), 1);
    assert!(!verification.all_present());
}

#[test]
fn test_missing_sample_is_bounded() {
    let missing: Vec<String> = (0..8).map(|i| format!("/nowhere/{}.jpg", i)).collect();
    let verification = verify_paths(&missing);

    match verification.ensure_all_present(3) {
        Err(OpsError::MissingFiles { count, sample }) => {
            assert_eq!(count, 8);
            assert_eq!(sample, vec!["/nowhere/0.jpg", "/nowhere/1.jpg", "/nowhere/2.jpg"]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_exists_with_flipped_separators() {
    let temp_dir = TempDir::new().unwrap();
    create_test_files(&temp_dir, &["a.jpg"]);
    let windows_style = format!("{}\\a.jpg", temp_dir.path().display());

    assert!(!Path::new(&windows_style).exists());
    assert!(paths::path_exists(&windows_style));
}

// Job runner

#[test]
fn test_runner_requires_strategies() {
    let result = JobRunner::new(Vec::new(), JobConfig::default());
    assert!(matches!(result, Err(OpsError::NoStrategies)));
}

#[test]
fn test_missing_file_aborts_whole_job() {
    let temp_dir = TempDir::new().unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));
    let runner = JobRunner::new(
        vec![Box::new(RefuseMatching {
            name: "counting",
            needle: "never",
            attempts: attempts.clone(),
        })],
        JobConfig::default(),
    )
    .unwrap();

    let mut paths = create_test_files(&temp_dir, &["present.jpg"]);
    paths.push("/x/missing.jpg".to_string());

    let result = runner.run_manifest_text(&manifest_text(&paths));
    match result {
        Err(OpsError::MissingFiles { count, sample }) => {
            assert_eq!(count, 1);
            assert_eq!(sample, vec!["/x/missing.jpg"]);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
    assert!(Path::new(&paths[0]).exists());
}

#[test]
fn test_single_missing_file_produces_no_results() {
    let runner = JobRunner::new(vec![Box::new(RemoveFile)], JobConfig::default()).unwrap();
    let result = runner.run_manifest_text(r#"{"removedFiles": ["/x/missing.jpg"]}"#);
    assert!(matches!(result, Err(OpsError::MissingFiles { count: 1, .. })));
}

#[test]
fn test_one_success_one_failure() {
    let temp_dir = TempDir::new().unwrap();
    let paths = create_test_files(&temp_dir, &["deletable.jpg", "stuck.jpg"]);
    let attempts = Arc::new(AtomicUsize::new(0));
    let runner = JobRunner::new(
        vec![
            Box::new(RefuseMatching {
                name: "first",
                needle: "stuck",
                attempts: attempts.clone(),
            }),
            Box::new(RefuseMatching {
                name: "second",
                needle: "stuck",
                attempts: attempts.clone(),
            }),
        ],
        JobConfig::default(),
    )
    .unwrap();

    let report = runner.run_paths(&paths).unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.results[0].success);
    assert_eq!(report.results[0].strategy.as_deref(), Some("first"));
    assert!(!report.results[1].success);
    let error = report.results[1].error.as_deref().unwrap();
    assert!(error.starts_with("second refused"));
    assert_eq!(report.summary.to_string(), "1 succeeded, 1 failed");
    // deletable: one attempt, stuck: both strategies
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(!Path::new(&paths[0]).exists());
    assert!(Path::new(&paths[1]).exists());
}

#[test]
fn test_results_follow_input_order_and_use_normalized_paths() {
    let temp_dir = TempDir::new().unwrap();
    let paths = create_test_files(&temp_dir, &["c.jpg", "a.jpg", "b.jpg"]);
    let raw: Vec<String> = paths.iter().map(|p| format!("file://{}", p)).collect();
    let runner = JobRunner::new(vec![Box::new(RemoveFile)], JobConfig::default()).unwrap();

    let report = runner.run_paths(&raw).unwrap();
    let reported: Vec<_> = report.results.iter().map(|r| normalize_path(&r.path)).collect();
    let expected: Vec<_> = paths.iter().map(|p| normalize_path(p)).collect();
    assert_eq!(reported, expected);
    assert_eq!(report.summary.succeeded, 3);
}

#[test]
fn test_empty_path_list_is_empty_job() {
    let runner = JobRunner::new(vec![Box::new(RemoveFile)], JobConfig::default()).unwrap();
    assert!(matches!(runner.run_paths(&[]), Err(OpsError::EmptyJob)));
}

#[test]
fn test_default_strategy_order() {
    let with_shell = JobRunner::new(default_strategies(true), JobConfig::default()).unwrap();
    assert_eq!(
        with_shell.strategy_names(),
        vec!["native-trash", "home-trash", "secure-delete", "trash-utility"]
    );
    let without_shell = JobRunner::new(default_strategies(false), JobConfig::default()).unwrap();
    assert_eq!(without_shell.strategy_names(), vec!["native-trash", "home-trash"]);
}

// Strategies

#[test]
fn test_home_trash_moves_file_and_resolves_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    let trash_root = temp_dir.path().join("Trash");
    let strategy = HomeTrash::with_root(&trash_root);

    let source = temp_dir.path().join("src");
    fs::create_dir_all(&source).unwrap();
    let first = source.join("photo.jpg");
    fs::write(&first, b"one").unwrap();
    assert_eq!(strategy.attempt_trash(&first), TrashOutcome::Success);

    fs::write(&first, b"two").unwrap();
    assert_eq!(strategy.attempt_trash(&first), TrashOutcome::Success);

    assert!(!first.exists());
    assert!(trash_root.join("files").join("photo.jpg").exists());
    assert!(trash_root.join("files").join("photo (1).jpg").exists());
    let info = fs::read_to_string(trash_root.join("info").join("photo.jpg.trashinfo")).unwrap();
    assert!(info.starts_with("[Trash Info]"));
    assert!(info.contains("photo.jpg"));
}

#[test]
fn test_home_trash_reports_missing_source() {
    let temp_dir = TempDir::new().unwrap();
    let strategy = HomeTrash::with_root(temp_dir.path().join("Trash"));
    let outcome = strategy.attempt_trash(&temp_dir.path().join("nope.jpg"));
    assert!(matches!(outcome, TrashOutcome::StrategyFailed(_)));
}

// Export folder

#[test]
fn test_export_dir_persists_pretty_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dir = ExportDir::new(temp_dir.path().join("MediaSorter"));
    let manifest = RemovalManifest {
        folder: "/media/holiday".to_string(),
        timestamp: "2026-10-18T09:30:00.000Z".to_string(),
        removed_files: vec!["/media/holiday/a.jpg".to_string()],
        total_files: 3,
        removed_count: 1,
    };

    let first = dir.persist(&manifest).unwrap();
    let second = dir.persist(&manifest).unwrap();

    assert_eq!(
        first.file_name().unwrap().to_string_lossy(),
        "holiday_2026-10-18T09-30-00-000Z.json"
    );
    assert_eq!(
        second.file_name().unwrap().to_string_lossy(),
        "holiday_2026-10-18T09-30-00-000Z (1).json"
    );
    let text = fs::read_to_string(&first).unwrap();
    assert!(text.contains('\n'));
    assert_eq!(RemovalManifest::from_json(&text).unwrap(), manifest);
}

#[test]
fn test_export_dir_refuses_inconsistent_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dir = ExportDir::new(temp_dir.path());
    let manifest = RemovalManifest {
        folder: "/x".to_string(),
        timestamp: "t".to_string(),
        removed_files: vec![],
        total_files: 0,
        removed_count: 2,
    };
    assert!(matches!(dir.persist(&manifest), Err(OpsError::Validation(_))));
}

#[test]
fn test_log_file_name_format() {
    use chrono::TimeZone;
    let date = chrono::Local.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
    assert_eq!(log_file_name("media-sorter", "export", date), "media-sorter_log_export_07-03-2026.txt");
}

// Errors

#[test]
fn test_missing_files_message_lists_sample() {
    let err = OpsError::MissingFiles {
        count: 4,
        sample: vec!["/a.jpg".to_string(), "/b.jpg".to_string()],
    };
    let message = err.to_user_message();
    assert_eq!(message.title, "Missing Files");
    assert!(message.message.contains("/a.jpg"));
    assert!(message.message.contains("and 2 more"));
    assert!(!message.recoverable);
    assert_eq!(err.code(), "ERR_MISSING_FILES");
}

#[test]
fn test_empty_job_is_distinct_from_validation() {
    assert_ne!(OpsError::EmptyJob.code(), OpsError::Validation(String::new()).code());
    assert_eq!(OpsError::EmptyJob.to_user_message().title, "Nothing To Do");
}
