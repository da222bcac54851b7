// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod module;
pub mod modules;
pub mod pipeline;
pub mod process;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::{PipelineFile, StageKind, load_and_validate};
use crate::module::LogSink;
use crate::pipeline::PipelineRunner;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the pipeline file, then either prints it (`--dry-run`)
/// or runs every stage in order. Ctrl-C cancels the run: transfers stop
/// before their next file and a running child process is killed.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let file = load_and_validate(&config_path)
        .with_context(|| format!("loading pipeline file {}", config_path.display()))?;

    if args.dry_run {
        print_dry_run(&file);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("Ctrl+C received; cancelling pipeline");
            cancel.cancel();
        });
    }

    let runner = PipelineRunner::new(file, LogSink::new(), cancel);
    let report = runner.run().await?;
    print!("{report}");
    Ok(())
}

/// Print the stages of a validated pipeline without running them.
fn print_dry_run(file: &PipelineFile) {
    println!("stagework dry-run");
    println!("  pipeline.name = {:?}", file.pipeline.name);
    println!("  pipeline.retry_attempts = {}", file.pipeline.retry_attempts);
    println!(
        "  pipeline.retry_base_seconds = {}",
        file.pipeline.retry_base_seconds
    );
    println!();

    println!("stages ({}):", file.stages.len());
    for (index, stage) in file.stages.iter().enumerate() {
        println!("  {}. {} [{}]", index + 1, stage.name, stage.kind.module_key());
        match &stage.kind {
            StageKind::FindFiles {
                source_directory,
                search_pattern,
                recursive,
            } => {
                println!("      source: {}", source_directory.display());
                println!("      pattern: {search_pattern:?}");
                println!("      recursive: {recursive}");
            }
            StageKind::RegexFindFiles {
                source_directory,
                regex_pattern,
                recursive,
            } => {
                println!("      source: {}", source_directory.display());
                println!("      regex: {regex_pattern:?}");
                println!("      recursive: {recursive}");
            }
            StageKind::CopyFiles {
                source_file_paths,
                destination_directory,
                overwrite,
            }
            | StageKind::MoveFiles {
                source_file_paths,
                destination_directory,
                overwrite,
            } => {
                println!("      files: {}", source_file_paths.len());
                println!("      destination: {}", destination_directory.display());
                println!("      overwrite: {overwrite}");
            }
            StageKind::CopyDirectory {
                source_directory,
                destination_directory,
                recursive,
                overwrite,
            }
            | StageKind::MoveDirectory {
                source_directory,
                destination_directory,
                recursive,
                overwrite,
            } => {
                println!("      source: {}", source_directory.display());
                println!("      destination: {}", destination_directory.display());
                println!("      recursive: {recursive}");
                println!("      overwrite: {overwrite}");
            }
            StageKind::TransferFiles {
                transfer_mode,
                source_directory,
                search_pattern,
                recursive,
                destination_directory,
                overwrite,
            } => {
                println!("      mode: {transfer_mode}");
                println!("      source: {}", source_directory.display());
                println!("      pattern: {search_pattern:?}");
                println!("      destination: {}", destination_directory.display());
                println!("      recursive: {recursive}");
                println!("      overwrite: {overwrite}");
            }
            StageKind::FileList {
                file_paths,
                file_path,
                include_directory_path,
                overwrite,
            } => {
                println!("      entries: {}", file_paths.len());
                println!("      output: {}", file_path.display());
                println!("      include_directory_path: {include_directory_path}");
                println!("      overwrite: {overwrite}");
            }
            StageKind::ReadLines {
                file_path,
                encoding,
            } => {
                println!("      file: {}", file_path.display());
                println!("      encoding: {encoding}");
            }
            StageKind::ApplicationProcess {
                application_path,
                arguments,
                args,
                working_directory,
                ignore_exit_code,
            } => {
                let line = match arguments {
                    Some(raw) => raw.clone(),
                    None => process::format_arguments(args.clone()),
                };
                println!("      command: {} {}", application_path.display(), line);
                if let Some(dir) = working_directory {
                    println!("      working_directory: {}", dir.display());
                }
                if *ignore_exit_code {
                    println!("      ignore_exit_code: true");
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
