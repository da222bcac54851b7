// tests/pipeline_config.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use stagework::config::{StageKind, load_and_validate, parse_str};
use stagework::config::model::PipelineFile;
use stagework::engine::TransferMode;
use stagework::errors::ModuleError;
use stagework::modules::TextEncoding;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_pipeline_file_is_parsed() {
    let file = write_config(
        r#"
[pipeline]
name = "nightly"
retry_attempts = 3
retry_base_seconds = 0.5

[[stage]]
name = "mirror"
module = "copy_directory"
source_directory = "in"
destination_directory = "out"
recursive = true

[[stage]]
name = "archive logs"
module = "transfer_files"
transfer_mode = "move"
source_directory = "out"
search_pattern = "*.log"
destination_directory = "archive"

[[stage]]
name = "read"
module = "read_lines"
file_path = "out/list.txt"
encoding = "latin-1"

[[stage]]
name = "render"
module = "application_process"
application_path = "render"
args = [
  { flag = "-o", value = "a b", order = 1 },
  { value = "x" },
]
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.pipeline.name, "nightly");
    assert_eq!(cfg.stages.len(), 4);

    let policy = cfg.retry_policy();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.backoff(1), Duration::from_secs(1));

    match &cfg.stages[0].kind {
        StageKind::CopyDirectory {
            source_directory,
            recursive,
            overwrite,
            ..
        } => {
            assert_eq!(source_directory, &PathBuf::from("in"));
            assert!(*recursive);
            assert!(!*overwrite);
        }
        other => panic!("unexpected stage kind {other:?}"),
    }
    match &cfg.stages[1].kind {
        StageKind::TransferFiles {
            transfer_mode,
            recursive,
            ..
        } => {
            assert_eq!(*transfer_mode, TransferMode::Move);
            assert!(!*recursive);
        }
        other => panic!("unexpected stage kind {other:?}"),
    }
    match &cfg.stages[2].kind {
        StageKind::ReadLines { encoding, .. } => assert_eq!(*encoding, TextEncoding::Latin1),
        other => panic!("unexpected stage kind {other:?}"),
    }
    match &cfg.stages[3].kind {
        StageKind::ApplicationProcess {
            args, arguments, ..
        } => {
            assert!(arguments.is_none());
            assert_eq!(stagework::process::format_arguments(args.clone()), "-o \"a b\" x");
        }
        other => panic!("unexpected stage kind {other:?}"),
    }
}

#[test]
fn defaults_apply_when_pipeline_section_is_missing() {
    let raw = parse_str(
        r#"
[[stage]]
name = "list"
module = "file_list"
file_paths = ["a", "b"]
file_path = "list.txt"
"#,
    )
    .unwrap();
    let cfg = PipelineFile::try_from(raw).unwrap();

    assert_eq!(cfg.pipeline.name, "pipeline");
    assert_eq!(cfg.retry_policy().max_attempts, 5);
    assert_eq!(cfg.retry_policy().backoff(1), Duration::from_secs(2));
    match &cfg.stages[0].kind {
        StageKind::FileList {
            include_directory_path,
            overwrite,
            ..
        } => {
            assert!(*include_directory_path);
            assert!(!*overwrite);
        }
        other => panic!("unexpected stage kind {other:?}"),
    }
}

#[test]
fn pipeline_without_stages_is_a_config_error() {
    let file = write_config("[pipeline]\nname = \"empty\"\n");
    match load_and_validate(file.path()) {
        Err(ModuleError::Config(msg)) => assert!(msg.contains("at least one [[stage]]")),
        Err(e) => panic!("Expected Config error, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn duplicate_stage_names_are_rejected() {
    let file = write_config(
        r#"
[[stage]]
name = "copy"
module = "find_files"
source_directory = "a"

[[stage]]
name = "copy"
module = "find_files"
source_directory = "b"
"#,
    );
    match load_and_validate(file.path()) {
        Err(ModuleError::Config(msg)) => assert!(msg.contains("'copy'")),
        Err(e) => panic!("Expected Config error, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn zero_retry_attempts_are_rejected() {
    let file = write_config(
        r#"
[pipeline]
retry_attempts = 0

[[stage]]
name = "find"
module = "find_files"
source_directory = "a"
"#,
    );
    match load_and_validate(file.path()) {
        Err(ModuleError::Config(msg)) => assert!(msg.contains("retry_attempts")),
        Err(e) => panic!("Expected Config error, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_module_is_a_toml_error() {
    let file = write_config(
        r#"
[[stage]]
name = "mystery"
module = "teleport_files"
"#,
    );
    assert!(matches!(load_and_validate(file.path()), Err(ModuleError::Toml(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Pipeline.toml");
    match load_and_validate(&path) {
        Err(ModuleError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected Io error, got: {other:?}"),
    }
}
