//! Core types for agentdoc.
//!
//! This crate provides the data structures shared by the scanner, the
//! documentation generator, and the command line: folder nodes, the
//! aggregated manifest, scan configuration, and the text renderers used
//! to turn a manifest into prompt material.

mod config;
mod error;
mod manifest;
mod node;
mod render;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::ScanError;
pub use manifest::{FileManifest, NO_EXTENSION, extension_token, generate_manifest};
pub use node::{FolderNode, NodeId, NodeKind, is_hidden_name};
pub use render::{TreeRenderOptions, render_summary, render_tree};
