//! Manifest aggregation over a scanned tree.

use std::collections::BTreeMap;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::node::{FolderNode, NodeKind};

/// Bucket used for files whose name carries no extension.
pub const NO_EXTENSION: &str = "no-extension";

/// Extract the extension token of a file name.
///
/// The token is the segment after the final `.`, case preserved. Names
/// without a `.`, or ending in one, map to [`NO_EXTENSION`].
pub fn extension_token(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => NO_EXTENSION,
    }
}

/// Aggregate result of a folder scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileManifest {
    /// Number of file nodes in the materialized tree.
    pub total_files: u64,
    /// Number of directory nodes, hidden ones included, root excluded.
    pub total_directories: u64,
    /// Occurrences per extension token.
    pub files_by_type: BTreeMap<String, u64>,
    /// Top-level entries of the scan root.
    pub structure: Vec<FolderNode>,
}

impl FileManifest {
    /// Files plus directories.
    pub fn total_entries(&self) -> u64 {
        self.total_files + self.total_directories
    }

    /// Count for a single extension token.
    pub fn type_count(&self, token: &str) -> u64 {
        self.files_by_type.get(token).copied().unwrap_or(0)
    }

    /// File types ordered by count descending, then token.
    pub fn sorted_types(&self) -> Vec<(&str, u64)> {
        self.files_by_type
            .iter()
            .map(|(token, count)| (token.as_str(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .collect()
    }

    /// Order `structure` by name at every level, for stable display.
    pub fn sort_by_name(&mut self) {
        self.structure.sort_by(|a, b| a.name.cmp(&b.name));
        for node in &mut self.structure {
            node.sort_children_by_name();
        }
    }
}

/// Build the manifest for a scanned root node.
///
/// The root itself is not counted; aggregation starts at its children,
/// which become the manifest's `structure`. Sibling subtrees are tallied
/// in parallel.
pub fn generate_manifest(root: FolderNode) -> FileManifest {
    let structure = root.into_children();
    let tally = tally_nodes(&structure);

    FileManifest {
        total_files: tally.files,
        total_directories: tally.dirs,
        files_by_type: tally.by_type,
        structure,
    }
}

#[derive(Debug, Default)]
struct Tally {
    files: u64,
    dirs: u64,
    by_type: BTreeMap<String, u64>,
}

impl Tally {
    fn record_file(&mut self, name: &str) {
        self.files += 1;
        *self
            .by_type
            .entry(extension_token(name).to_string())
            .or_insert(0) += 1;
    }

    fn merge(mut self, mut other: Tally) -> Tally {
        if self.by_type.len() < other.by_type.len() {
            std::mem::swap(&mut self.by_type, &mut other.by_type);
        }
        for (token, count) in other.by_type {
            *self.by_type.entry(token).or_insert(0) += count;
        }
        self.files += other.files;
        self.dirs += other.dirs;
        self
    }
}

fn tally_nodes(nodes: &[FolderNode]) -> Tally {
    nodes
        .par_iter()
        .map(tally_node)
        .reduce(Tally::default, Tally::merge)
}

fn tally_node(node: &FolderNode) -> Tally {
    match &node.kind {
        NodeKind::File => {
            let mut tally = Tally::default();
            tally.record_file(&node.name);
            tally
        }
        NodeKind::Directory { children } => {
            // Truncated directories count once, with nothing beneath them.
            let mut tally = children.as_deref().map(tally_nodes).unwrap_or_default();
            tally.dirs += 1;
            tally
        }
    }
}
