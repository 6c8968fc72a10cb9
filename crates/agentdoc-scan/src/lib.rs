//! Folder scanning engine for agentdoc.
//!
//! This crate walks a directory with jwalk and builds the folder tree that
//! the manifest is aggregated from.
//!
//! # Overview
//!
//! - **Parallel traversal** on a bounded rayon pool via jwalk
//! - **Hidden directories** (leading `.`) are listed but never read
//! - **Symlinks** are never followed and are reported as files
//! - **Progress updates** via broadcast channels
//! - **Cancellation** via [`CancellationToken`](tokio_util::sync::CancellationToken)
//!
//! Any read error aborts the whole scan; there are no partial results.
//!
//! # Example
//!
//! ```rust,no_run
//! use agentdoc_scan::{FolderScanner, ScanConfig};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let manifest = FolderScanner::new().scan_folder(&config).unwrap();
//!
//! println!("Total files: {}", manifest.total_files);
//! println!("Total directories: {}", manifest.total_directories);
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use agentdoc_scan::FolderScanner;
//!
//! let scanner = FolderScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("Scanned {} files", progress.files_scanned);
//!     }
//! });
//! ```

mod progress;
mod scanner;

pub use progress::ScanProgress;
pub use scanner::{FolderScanner, scan_folder};

// Re-export core types for convenience
pub use agentdoc_core::{
    FileManifest, FolderNode, NodeId, NodeKind, ScanConfig, ScanError, generate_manifest,
};
