//! agentdoc - scan a folder and generate agent-facing documentation for it.
//!
//! Usage:
//!   agentdoc scan [PATH]        Show manifest summary and tree
//!   agentdoc generate PATH      Generate README.agent.md with a language model
//!   agentdoc export [PATH]      Export the manifest as JSON
//!   agentdoc serve              Run the HTTP API
//!   agentdoc --help             Show help

mod server;

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use agentdoc_core::{TreeRenderOptions, render_tree};
use agentdoc_gen::{
    ChatClient, DEFAULT_BASE_URL, DEFAULT_MODEL, DocGenerator, ModelConfig, PromptConfig,
    build_prompt, doc_path, write_document,
};
use agentdoc_scan::{FileManifest, FolderScanner, ScanConfig};

use crate::server::AppState;

#[derive(Parser)]
#[command(
    name = "agentdoc",
    version,
    about = "Scan a folder and generate agent documentation for it",
    long_about = "agentdoc walks a folder, builds a manifest of its files and \
                  directories, and asks a language model to describe it in a \
                  README.agent.md file.\n\n\
                  Hidden directories (names starting with '.') are listed but \
                  never descended into; symlinks are never followed."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a folder and show its manifest
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Maximum tree depth to display
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Generate README.agent.md for a folder
    Generate {
        /// Folder to document
        path: PathBuf,

        /// Write the document here instead of PATH/README.agent.md
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,

        /// Maximum tree lines included in the prompt
        #[arg(long, default_value = "400")]
        max_entries: usize,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Export the manifest as JSON
    Export {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve the scan and generate HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Language-model connection flags.
#[derive(Args)]
struct ModelArgs {
    /// API key for the model gateway
    #[arg(long, env = "AI_GATEWAY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "AGENTDOC_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "AGENTDOC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "120")]
    timeout: u64,
}

impl ModelArgs {
    fn to_config(&self) -> Result<ModelConfig, agentdoc_gen::GenerateError> {
        let mut builder = ModelConfig::builder();
        if let Some(api_key) = &self.api_key {
            builder.api_key(api_key.clone());
        }
        builder
            .model(self.model.clone())
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout))
            .build()
            .map_err(Into::into)
    }
}

fn setup_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let cancel = interrupt_token();

    match cli.command {
        Command::Scan {
            path,
            format,
            depth,
        } => run_scan(&path, format, depth, &cancel).await?,
        Command::Generate {
            path,
            output,
            dry_run,
            max_entries,
            model,
        } => run_generate(&path, output, dry_run, max_entries, &model, &cancel).await?,
        Command::Export { path, output } => run_export(&path, output, &cancel).await?,
        Command::Serve { host, port, model } => run_serve(&host, port, &model).await?,
    }

    Ok(())
}

/// Token cancelled by the first Ctrl-C; a second Ctrl-C exits immediately.
///
/// The listener lives for the rest of the process, because tokio keeps its
/// SIGINT handler installed once `ctrl_c` has been awaited.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::info!("Interrupt received, cancelling");
        token.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
    cancel
}

/// Run `work` unless `cancel` fires first.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        result = work => result,
        _ = cancel.cancelled() => Err(eyre!("Interrupted")),
    }
}

/// Scan a folder off the async runtime, reporting progress on stderr.
async fn scan_with_progress(path: &Path, cancel: &CancellationToken) -> Result<FileManifest> {
    let config = ScanConfig::new(path);
    let scanner = FolderScanner::with_cancellation(cancel.clone());
    let mut progress_rx = scanner.subscribe();

    let progress_task = tokio::spawn(async move {
        loop {
            match progress_rx.recv().await {
                Ok(progress) => {
                    eprint!(
                        "\r  {} files, {} directories",
                        progress.files_scanned, progress.dirs_scanned
                    );
                    if progress.finished {
                        eprintln!(
                            " in {:.2?} ({:.0} entries/s)",
                            progress.elapsed,
                            progress.entries_per_second()
                        );
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = tokio::task::spawn_blocking(move || scanner.scan_folder(&config))
        .await
        .context("Scan task failed")?;

    let _ = progress_task.await;

    result.with_context(|| format!("Failed to scan {}", path.display()))
}

/// Scan a folder and print its manifest.
async fn run_scan(
    path: &Path,
    format: OutputFormat,
    depth: Option<usize>,
    cancel: &CancellationToken,
) -> Result<()> {
    eprintln!("Scanning {}...", path.display());
    let mut manifest = scan_with_progress(path, cancel).await?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {}", path.display());
            println!(
                " {} files, {} directories",
                manifest.total_files, manifest.total_directories
            );
            println!("{}", "─".repeat(60));
            for (token, count) in manifest.sorted_types() {
                println!("   {token}: {count}");
            }
            println!();

            manifest.sort_by_name();
            let options = TreeRenderOptions {
                max_depth: depth,
                max_entries: None,
            };
            print!("{}", render_tree(&manifest.structure, &options));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
    }

    Ok(())
}

/// Scan a folder and generate its agent documentation.
async fn run_generate(
    path: &Path,
    output: Option<PathBuf>,
    dry_run: bool,
    max_entries: usize,
    model: &ModelArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    if !path.is_dir() {
        return Err(eyre!("Path is not a directory: {}", path.display()));
    }

    eprintln!("Scanning folder: {}", path.display());
    let manifest = scan_with_progress(&path, cancel).await?;
    eprintln!(
        "Scanned {} files in {} directories",
        manifest.total_files, manifest.total_directories
    );
    print_file_types(&manifest);

    let prompt_config = PromptConfig::builder()
        .max_tree_entries(Some(max_entries))
        .build()
        .context("Invalid prompt configuration")?;

    if dry_run {
        println!("{}", build_prompt(&path, &manifest, &prompt_config));
        return Ok(());
    }

    let config = model.to_config().context("Language model is not configured")?;
    let generator = DocGenerator::new(ChatClient::new(config)?).with_prompt_config(prompt_config);

    eprintln!("Generating documentation with {}...", generator.generator().model());
    let target = output.unwrap_or_else(|| doc_path(&path));
    until_cancelled(cancel, async {
        let content = generator.generate(&path, &manifest).await?;
        write_document(&target, &content).await?;
        Ok(())
    })
    .await?;
    eprintln!("Documentation generated: {}", target.display());

    Ok(())
}

/// Export the manifest to JSON.
async fn run_export(
    path: &Path,
    output: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    eprintln!("Scanning {}...", path.display());
    let manifest = scan_with_progress(path, cancel).await?;

    let json = serde_json::to_string_pretty(&manifest)?;

    match output {
        Some(output_path) => {
            tokio::fs::write(&output_path, json)
                .await
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{json}");
        }
    }

    Ok(())
}

/// Run the HTTP API until interrupted.
async fn run_serve(host: &str, port: u16, model: &ModelArgs) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let generator = match model.to_config() {
        Ok(config) => Some(DocGenerator::new(ChatClient::new(config)?)),
        Err(err) => {
            tracing::warn!("Document generation disabled: {err}");
            None
        }
    };

    server::serve(addr, Arc::new(AppState::new(generator))).await
}

/// Print the per-type file counts to stderr.
fn print_file_types(manifest: &FileManifest) {
    if manifest.files_by_type.is_empty() {
        return;
    }
    eprintln!("File types found:");
    for (token, count) in manifest.sorted_types() {
        eprintln!("   {token}: {count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_until_cancelled_stops_pending_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<()> = until_cancelled(&cancel, std::future::pending()).await;
        assert!(result.unwrap_err().to_string().contains("Interrupted"));
    }

    #[tokio::test]
    async fn test_until_cancelled_passes_through_result() {
        let cancel = CancellationToken::new();
        let value = until_cancelled(&cancel, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_scan_reports_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.rs"), "").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = scan_with_progress(temp.path(), &cancel).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<agentdoc_scan::ScanError>(),
            Some(agentdoc_scan::ScanError::Interrupted)
        ));
    }
}
