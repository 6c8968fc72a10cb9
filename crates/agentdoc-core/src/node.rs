//! File and directory node types.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Marker that makes a directory hidden from traversal.
const HIDDEN_MARKER: char = '.';

/// Check whether an entry name carries the hidden-entry marker.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// Stable, path-derived identifier for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Derive an identifier from an absolute path.
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Type of file system node.
///
/// Only directories can carry children. A directory whose children are
/// `None` was listed but never traversed (hidden directories).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// Any non-directory entry, including symlinks and special files.
    File,
    /// Directory.
    Directory {
        /// Entries in enumeration order, or `None` if not traversed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        children: Option<Vec<FolderNode>>,
    },
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory { .. })
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }
}

/// A single file or directory in the scanned tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Identifier derived from the absolute path.
    pub id: NodeId,

    /// Entry name (not full path).
    pub name: CompactString,

    /// Full path of the entry.
    pub path: PathBuf,

    /// Node type and, for directories, its children.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl FolderNode {
    /// Create a new file node.
    pub fn new_file(path: impl Into<PathBuf>, name: impl Into<CompactString>) -> Self {
        let path = path.into();
        Self {
            id: NodeId::from_path(&path),
            name: name.into(),
            path,
            kind: NodeKind::File,
        }
    }

    /// Create a new directory node with materialized children.
    pub fn new_directory(
        path: impl Into<PathBuf>,
        name: impl Into<CompactString>,
        children: Vec<FolderNode>,
    ) -> Self {
        let path = path.into();
        Self {
            id: NodeId::from_path(&path),
            name: name.into(),
            path,
            kind: NodeKind::Directory {
                children: Some(children),
            },
        }
    }

    /// Create a directory node whose contents were not traversed.
    pub fn new_truncated_directory(
        path: impl Into<PathBuf>,
        name: impl Into<CompactString>,
    ) -> Self {
        let path = path.into();
        Self {
            id: NodeId::from_path(&path),
            name: name.into(),
            path,
            kind: NodeKind::Directory { children: None },
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Check if this is a directory that was listed but not traversed.
    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { children: None })
    }

    /// Materialized children; empty for files and truncated directories.
    pub fn children(&self) -> &[FolderNode] {
        match &self.kind {
            NodeKind::Directory {
                children: Some(children),
            } => children,
            _ => &[],
        }
    }

    /// Take ownership of the materialized children, leaving none behind.
    pub fn into_children(self) -> Vec<FolderNode> {
        match self.kind {
            NodeKind::Directory {
                children: Some(children),
            } => children,
            _ => Vec::new(),
        }
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Sort children by name, recursively.
    ///
    /// Scans keep filesystem enumeration order; this gives a stable order
    /// for display and comparison.
    pub fn sort_children_by_name(&mut self) {
        if let NodeKind::Directory {
            children: Some(children),
        } = &mut self.kind
        {
            children.sort_by(|a, b| a.name.cmp(&b.name));
            for child in children {
                child.sort_children_by_name();
            }
        }
    }
}
