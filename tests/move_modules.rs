// tests/move_modules.rs

use std::error::Error;
use std::io::ErrorKind;
use std::path::PathBuf;

use stagework::engine::{RetryPolicy, TransferMode};
use stagework::errors::ModuleError;
use stagework::fs::mock::{FsOp, MockFileSystem};
use stagework::module::{LogLevel, LogSink, Module};
use stagework::modules::{
    CopyFilesConfig, CopyFilesModule, MoveDirectoryConfig, MoveDirectoryModule, MoveFilesConfig,
    MoveFilesModule, TransferFilesConfig, TransferFilesModule,
};
use stagework_test_utils::builders::{context, fast_retry, mock_context};
use stagework_test_utils::fixtures::{Workspace, expected_source_tree, tree_snapshot};
use stagework_test_utils::{LogCapture, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn recursive_move_directory_relocates_tree_and_removes_source() -> TestResult {
    init_tracing();
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();

    let config = MoveDirectoryConfig {
        source_directory: ws.source(),
        destination_directory: ws.dest(),
        recursive: true,
        overwrite: false,
        retry: fast_retry(3),
    };
    let result = MoveDirectoryModule::new(&context(&sink), config).run().await?;

    assert_eq!(result.file_paths.len(), 4);
    assert_eq!(tree_snapshot(&ws.dest())?, expected_source_tree(true));
    assert!(!ws.source().exists());
    Ok(())
}

#[tokio::test]
async fn top_level_move_leaves_nested_content_in_place() -> TestResult {
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();
    let capture = LogCapture::attach(&sink);

    let config = MoveDirectoryConfig {
        source_directory: ws.source(),
        destination_directory: ws.dest(),
        recursive: false,
        overwrite: false,
        retry: fast_retry(3),
    };
    let result = MoveDirectoryModule::new(&context(&sink), config).run().await?;

    assert_eq!(result.file_paths.len(), 2);
    assert_eq!(tree_snapshot(&ws.dest())?, expected_source_tree(false));
    assert!(!ws.source().join("TestFile1.txt").exists());
    assert!(ws.source().join("Sub/TestFile3.txt").exists());
    assert!(capture.contains("leaving it in place"));
    Ok(())
}

#[tokio::test]
async fn top_level_move_of_flat_directory_removes_it() -> TestResult {
    let ws = Workspace::empty()?;
    ws.write("flat/a.txt", "a")?;
    ws.write("flat/b.txt", "bb")?;
    let sink = LogSink::new();

    let config = MoveDirectoryConfig {
        source_directory: ws.path("flat"),
        destination_directory: ws.dest(),
        recursive: false,
        overwrite: false,
        retry: fast_retry(3),
    };
    MoveDirectoryModule::new(&context(&sink), config).run().await?;

    assert!(!ws.path("flat").exists());
    assert_eq!(std::fs::read_to_string(ws.dest().join("b.txt"))?, "bb");
    Ok(())
}

#[tokio::test]
async fn copy_files_flattens_into_destination() -> TestResult {
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();

    let sources = vec![
        ws.source().join("Sub/Sub2/TestFile4.txt"),
        ws.source().join("TestFile1.txt"),
    ];
    let config = CopyFilesConfig {
        source_file_paths: sources.clone(),
        destination_directory: ws.dest(),
        overwrite: false,
        retry: fast_retry(3),
    };
    let result = CopyFilesModule::new(&context(&sink), config).run().await?;

    assert_eq!(
        result.file_paths,
        vec![ws.dest().join("TestFile4.txt"), ws.dest().join("TestFile1.txt")]
    );
    for source in &sources {
        assert!(source.exists());
    }
    Ok(())
}

#[tokio::test]
async fn move_files_deletes_each_source() -> TestResult {
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();

    let sources = vec![
        ws.source().join("TestFile1.txt"),
        ws.source().join("Sub/TestFile3.txt"),
    ];
    let config = MoveFilesConfig {
        source_file_paths: sources.clone(),
        destination_directory: ws.dest(),
        overwrite: false,
        retry: fast_retry(3),
    };
    let result = MoveFilesModule::new(&context(&sink), config).run().await?;

    assert_eq!(result.file_paths.len(), 2);
    for source in &sources {
        assert!(!source.exists());
    }
    assert_eq!(std::fs::read_to_string(ws.dest().join("TestFile3.txt"))?, "third\n");
    Ok(())
}

#[tokio::test]
async fn move_files_with_overwrite_replaces_existing_destination() -> TestResult {
    let ws = Workspace::empty()?;
    let source = ws.write("in/report.txt", "new")?;
    ws.write("dest/report.txt", "old contents")?;
    let sink = LogSink::new();

    let config = MoveFilesConfig {
        source_file_paths: vec![source.clone()],
        destination_directory: ws.dest(),
        overwrite: true,
        retry: fast_retry(3),
    };
    MoveFilesModule::new(&context(&sink), config).run().await?;

    assert_eq!(std::fs::read_to_string(ws.dest().join("report.txt"))?, "new");
    assert!(!source.exists());
    Ok(())
}

#[tokio::test]
async fn copy_files_onto_itself_is_rejected() -> TestResult {
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();

    let config = CopyFilesConfig {
        source_file_paths: vec![ws.source().join("TestFile1.txt")],
        destination_directory: ws.source(),
        overwrite: true,
        retry: fast_retry(3),
    };
    match CopyFilesModule::new(&context(&sink), config).run().await {
        Err(ModuleError::Validation(msg)) => assert!(msg.contains("same file")),
        other => panic!("expected Validation, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn transfer_files_moves_matching_files_and_keeps_directories() -> TestResult {
    let ws = Workspace::empty()?;
    ws.write("source/keep.log", "log")?;
    ws.write("source/a.txt", "a")?;
    ws.write("source/nested/b.txt", "b")?;
    let sink = LogSink::new();

    let config = TransferFilesConfig {
        transfer_mode: TransferMode::Move,
        source_directory: ws.source(),
        search_pattern: "*.txt".to_string(),
        recursive: true,
        destination_directory: ws.dest(),
        overwrite: false,
        retry: fast_retry(3),
    };
    let result = TransferFilesModule::new(&context(&sink), config).run().await?;

    assert_eq!(
        result.file_paths,
        vec![ws.dest().join("a.txt"), ws.dest().join("nested").join("b.txt")]
    );
    assert!(ws.source().join("keep.log").exists());
    assert!(ws.source().join("nested").is_dir());
    assert!(!ws.source().join("nested/b.txt").exists());
    Ok(())
}

#[tokio::test]
async fn transfer_files_copy_mode_leaves_sources() -> TestResult {
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();

    let config = TransferFilesConfig {
        transfer_mode: TransferMode::Copy,
        source_directory: ws.source(),
        search_pattern: "TestFile?.txt".to_string(),
        recursive: false,
        destination_directory: ws.dest(),
        overwrite: false,
        retry: fast_retry(3),
    };
    let result = TransferFilesModule::new(&context(&sink), config).run().await?;

    assert_eq!(result.file_paths.len(), 2);
    assert_eq!(tree_snapshot(&ws.source())?, expected_source_tree(true));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn source_directory_delete_is_retried_then_fails_the_move() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("src/a.txt", b"alpha".to_vec());
    fs.add_file("src/nested/b.txt", b"bravo".to_vec());
    fs.fail_always(FsOp::RemoveDir, "src", ErrorKind::PermissionDenied);
    let sink = LogSink::new();
    let capture = LogCapture::attach(&sink);

    let config = MoveDirectoryConfig {
        source_directory: PathBuf::from("src"),
        destination_directory: PathBuf::from("out"),
        recursive: true,
        overwrite: false,
        retry: RetryPolicy::new(3),
    };
    match MoveDirectoryModule::new(&mock_context(&sink, &fs), config).run().await {
        Err(ModuleError::Io { path, source }) => {
            assert_eq!(path, PathBuf::from("src"));
            assert_eq!(source.kind(), ErrorKind::PermissionDenied);
        }
        other => panic!("expected Io, got {other:?}"),
    }

    assert_eq!(fs.calls(FsOp::RemoveDir, "src"), 3);
    assert_eq!(
        capture
            .messages_at(LogLevel::Warning)
            .iter()
            .filter(|m| m.contains("Retrying"))
            .count(),
        2
    );
    assert!(
        capture
            .messages_at(LogLevel::Error)
            .iter()
            .any(|m| m.as_str() == "Failed to delete directory \"src\"")
    );
    // Files were moved before the directory delete failed.
    assert_eq!(fs.file_contents("out/a.txt"), Some(b"alpha".to_vec()));
    assert_eq!(fs.file_contents("out/nested/b.txt"), Some(b"bravo".to_vec()));
    assert_eq!(fs.file_contents("src/a.txt"), None);
    Ok(())
}
