// tests/pipeline_runner.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use stagework::config::StageKind;
use stagework::errors::ModuleError;
use stagework::fs::mock::MockFileSystem;
use stagework::modules::TextEncoding;
use stagework::module::{LogSink, StagePath};
use stagework::pipeline::{PipelineRunner, StageOutcome};
use stagework_test_utils::builders::PipelineBuilder;
use stagework_test_utils::fixtures::{Workspace, expected_source_tree, tree_snapshot};
use stagework_test_utils::{LogCapture, init_tracing};
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn stages_run_in_file_order_with_their_own_stage_paths() -> TestResult {
    init_tracing();
    let ws = Workspace::with_source_tree()?;
    let list = ws.path("list.txt");

    let file = PipelineBuilder::new("mirror and list")
        .stage(
            "mirror",
            StageKind::CopyDirectory {
                source_directory: ws.source(),
                destination_directory: ws.dest(),
                recursive: true,
                overwrite: false,
            },
        )
        .stage(
            "list",
            StageKind::FileList {
                file_paths: vec![ws.dest().join("TestFile1.txt")],
                file_path: list.clone(),
                include_directory_path: false,
                overwrite: false,
            },
        )
        .stage(
            "read back",
            StageKind::ReadLines {
                file_path: list.clone(),
                encoding: TextEncoding::Utf8,
            },
        )
        .build();

    let sink = LogSink::new();
    let capture = LogCapture::attach(&sink);
    let report = PipelineRunner::new(file, sink, CancellationToken::new())
        .run()
        .await?;

    assert_eq!(report.name, "mirror and list");
    assert_eq!(report.stages.len(), 3);
    assert_eq!(tree_snapshot(&ws.dest())?, expected_source_tree(true));

    let mirror = report.stage("mirror").ok_or("missing stage")?;
    assert_eq!(mirror.module, "copy_directory");
    assert!(matches!(&mirror.outcome, StageOutcome::Files(files) if files.len() == 4));
    assert_eq!(
        report.stage("list").map(|s| s.outcome.clone()),
        Some(StageOutcome::File(list))
    );
    assert_eq!(
        report.stage("read back").map(|s| s.outcome.clone()),
        Some(StageOutcome::Lines(vec!["TestFile1.txt".to_string()]))
    );

    // Events are stamped with the stage name and a 1-based stage path.
    for event in capture.events() {
        let expected = match event.module.as_str() {
            "mirror" => "1",
            "list" => "2",
            "read back" => "3",
            other => panic!("unexpected module name {other}"),
        };
        assert_eq!(event.stage_path.to_string(), expected);
    }
    assert!(report.to_string().contains("[2] list (file_list)"));
    Ok(())
}

#[tokio::test]
async fn first_failing_stage_aborts_the_run() -> TestResult {
    let ws = Workspace::empty()?;
    let list = ws.path("list.txt");

    let file = PipelineBuilder::new("broken")
        .stage(
            "copy missing",
            StageKind::CopyDirectory {
                source_directory: ws.path("does-not-exist"),
                destination_directory: ws.dest(),
                recursive: true,
                overwrite: false,
            },
        )
        .stage(
            "never runs",
            StageKind::FileList {
                file_paths: vec![PathBuf::from("x")],
                file_path: list.clone(),
                include_directory_path: true,
                overwrite: false,
            },
        )
        .build();

    let outcome = PipelineRunner::new(file, LogSink::new(), CancellationToken::new())
        .run()
        .await;

    assert!(matches!(outcome, Err(ModuleError::Io { .. })));
    assert!(!list.exists());
    Ok(())
}

#[tokio::test]
async fn cancelled_runner_starts_no_stage() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("in/a.txt", b"a".to_vec());

    let file = PipelineBuilder::new("cancelled")
        .stage(
            "copy",
            StageKind::CopyFiles {
                source_file_paths: vec![PathBuf::from("in/a.txt")],
                destination_directory: PathBuf::from("out"),
                overwrite: false,
            },
        )
        .build();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = PipelineRunner::new(file, LogSink::new(), cancel)
        .with_file_system(Arc::new(fs.clone()))
        .run()
        .await;

    assert!(matches!(outcome, Err(ModuleError::Cancelled)));
    assert_eq!(fs.file_contents("out/a.txt"), None);
    Ok(())
}

#[tokio::test]
async fn runner_uses_injected_file_system_and_root_path() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("in/a.txt", b"a".to_vec());
    fs.add_file("in/b.txt", b"b".to_vec());

    let file = PipelineBuilder::new("mock")
        .retry(2, 0.0)
        .stage(
            "move",
            StageKind::MoveFiles {
                source_file_paths: vec![PathBuf::from("in/a.txt"), PathBuf::from("in/b.txt")],
                destination_directory: PathBuf::from("out"),
                overwrite: false,
            },
        )
        .build();

    let sink = LogSink::new();
    let capture = LogCapture::attach(&sink);
    let report = PipelineRunner::new(file, sink, CancellationToken::new())
        .with_file_system(Arc::new(fs.clone()))
        .with_root(StagePath::new([7]))
        .run()
        .await?;

    assert_eq!(report.stages[0].stage_path.to_string(), "7.1");
    assert_eq!(fs.file_contents("out/b.txt"), Some(b"b".to_vec()));
    assert_eq!(fs.file_contents("in/a.txt"), None);
    assert!(capture.events().iter().all(|e| e.stage_path.to_string() == "7.1"));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn non_zero_exit_fails_the_stage_unless_ignored() -> TestResult {
    let stage = |ignore_exit_code| StageKind::ApplicationProcess {
        application_path: PathBuf::from("sh"),
        arguments: Some("-c 'exit 4'".to_string()),
        args: Vec::new(),
        working_directory: None,
        ignore_exit_code,
    };

    let strict = PipelineBuilder::new("strict").stage("exit", stage(false)).build();
    match PipelineRunner::new(strict, LogSink::new(), CancellationToken::new())
        .run()
        .await
    {
        Err(ModuleError::ProcessFailure(result)) => {
            assert_eq!(result.exit_code, 4);
            assert!(
                result
                    .error_message
                    .as_deref()
                    .is_some_and(|m| m.contains("exited with code 4"))
            );
        }
        other => panic!("expected ProcessFailure, got {other:?}"),
    }

    let lenient = PipelineBuilder::new("lenient").stage("exit", stage(true)).build();
    let report = PipelineRunner::new(lenient, LogSink::new(), CancellationToken::new())
        .run()
        .await?;
    assert!(matches!(
        &report.stages[0].outcome,
        StageOutcome::Process(result) if result.exit_code == 4
    ));
    Ok(())
}
