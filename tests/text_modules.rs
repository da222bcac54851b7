// tests/text_modules.rs

use std::error::Error;
use std::path::PathBuf;

use stagework::errors::ModuleError;
use stagework::fs::mock::MockFileSystem;
use stagework::module::{LogSink, Module};
use stagework::modules::{
    FileListConfig, FileListModule, ReadLinesConfig, ReadLinesModule, TextEncoding,
};
use stagework_test_utils::builders::{context, mock_context};
use stagework_test_utils::fixtures::Workspace;

type TestResult = Result<(), Box<dyn Error>>;

const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

fn list_config(output: &str, include_directory_path: bool, overwrite: bool) -> FileListConfig {
    FileListConfig {
        file_paths: vec![PathBuf::from("in/a.txt"), PathBuf::from("in/sub/b.txt")],
        file_path: PathBuf::from(output),
        include_directory_path,
        overwrite,
    }
}

#[tokio::test]
async fn file_list_writes_one_full_path_per_line() -> TestResult {
    let fs = MockFileSystem::new();
    let sink = LogSink::new();

    let result = FileListModule::new(&mock_context(&sink, &fs), list_config("list.txt", true, false))
        .run()
        .await?;

    assert_eq!(result.file_path, PathBuf::from("list.txt"));
    let expected = format!(
        "{}{EOL}{}{EOL}",
        PathBuf::from("in/a.txt").display(),
        PathBuf::from("in/sub/b.txt").display()
    );
    assert_eq!(fs.file_contents("list.txt"), Some(expected.into_bytes()));
    Ok(())
}

#[tokio::test]
async fn file_list_can_write_names_only() -> TestResult {
    let fs = MockFileSystem::new();
    let sink = LogSink::new();

    FileListModule::new(&mock_context(&sink, &fs), list_config("list.txt", false, false))
        .run()
        .await?;

    let expected = format!("a.txt{EOL}b.txt{EOL}");
    assert_eq!(fs.file_contents("list.txt"), Some(expected.into_bytes()));
    Ok(())
}

#[tokio::test]
async fn file_list_respects_overwrite_flag() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("list.txt", b"previous".to_vec());
    let sink = LogSink::new();

    let outcome = FileListModule::new(&mock_context(&sink, &fs), list_config("list.txt", false, false))
        .run()
        .await;
    match outcome {
        Err(ModuleError::OverwriteConflict(path)) => assert_eq!(path, PathBuf::from("list.txt")),
        other => panic!("expected OverwriteConflict, got {other:?}"),
    }
    assert_eq!(fs.file_contents("list.txt"), Some(b"previous".to_vec()));

    FileListModule::new(&mock_context(&sink, &fs), list_config("list.txt", false, true))
        .run()
        .await?;
    assert_eq!(
        fs.file_contents("list.txt"),
        Some(format!("a.txt{EOL}b.txt{EOL}").into_bytes())
    );
    Ok(())
}

#[tokio::test]
async fn file_list_requires_an_output_path() -> TestResult {
    let fs = MockFileSystem::new();
    let sink = LogSink::new();

    let outcome = FileListModule::new(&mock_context(&sink, &fs), list_config("", true, true))
        .run()
        .await;
    assert!(matches!(outcome, Err(ModuleError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn file_list_round_trips_through_read_lines_on_disk() -> TestResult {
    let ws = Workspace::with_source_tree()?;
    let sink = LogSink::new();
    let output = ws.path("list.txt");

    let config = FileListConfig {
        file_paths: vec![ws.source().join("TestFile1.txt"), ws.source().join("TestFile2.txt")],
        file_path: output.clone(),
        include_directory_path: false,
        overwrite: false,
    };
    FileListModule::new(&context(&sink), config).run().await?;

    let lines = ReadLinesModule::new(
        &context(&sink),
        ReadLinesConfig {
            file_path: output,
            encoding: TextEncoding::Utf8,
        },
    )
    .run()
    .await?
    .lines;
    assert_eq!(lines, vec!["TestFile1.txt", "TestFile2.txt"]);
    Ok(())
}

async fn read_with(bytes: &[u8], encoding: TextEncoding) -> Result<Vec<String>, ModuleError> {
    let fs = MockFileSystem::new();
    fs.add_file("input.txt", bytes.to_vec());
    let sink = LogSink::new();
    let config = ReadLinesConfig {
        file_path: PathBuf::from("input.txt"),
        encoding,
    };
    ReadLinesModule::new(&mock_context(&sink, &fs), config)
        .run()
        .await
        .map(|r| r.lines)
}

#[tokio::test]
async fn read_lines_handles_mixed_line_endings_and_bom() -> TestResult {
    let lines = read_with(b"\xEF\xBB\xBFfirst\r\nsecond\n\nfourth", TextEncoding::Utf8).await?;
    assert_eq!(lines, vec!["first", "second", "", "fourth"]);
    Ok(())
}

#[tokio::test]
async fn strict_utf8_rejects_invalid_data() -> TestResult {
    match read_with(b"ok\n\xFF\xFE bad\n", TextEncoding::Utf8).await {
        Err(ModuleError::Io { path, source }) => {
            assert_eq!(path, PathBuf::from("input.txt"));
            assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
        }
        other => panic!("expected Io, got {other:?}"),
    }

    let lossy = read_with(b"ok\n\xFF bad\n", TextEncoding::Utf8Lossy).await?;
    assert_eq!(lossy, vec!["ok".to_string(), "\u{FFFD} bad".to_string()]);
    Ok(())
}

#[tokio::test]
async fn latin1_and_utf16_are_decoded() -> TestResult {
    let latin1 = read_with(b"caf\xE9\n", TextEncoding::Latin1).await?;
    assert_eq!(latin1, vec!["café"]);

    let utf16: Vec<u8> = [0xFF, 0xFE]
        .into_iter()
        .chain("hé\nwo".encode_utf16().flat_map(|u| u.to_le_bytes()))
        .collect();
    let decoded = read_with(&utf16, TextEncoding::Utf16le).await?;
    assert_eq!(decoded, vec!["hé", "wo"]);
    Ok(())
}

#[tokio::test]
async fn missing_file_is_an_io_error() -> TestResult {
    let sink = LogSink::new();
    let fs = MockFileSystem::new();
    let config = ReadLinesConfig {
        file_path: PathBuf::from("missing.txt"),
        encoding: TextEncoding::default(),
    };
    let outcome = ReadLinesModule::new(&mock_context(&sink, &fs), config)
        .run()
        .await;
    assert!(matches!(outcome, Err(ModuleError::Io { .. })));
    Ok(())
}
