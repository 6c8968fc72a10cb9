//! Plain-text renderings of a manifest.

use std::fmt::Write;

use crate::manifest::FileManifest;
use crate::node::{FolderNode, NodeKind};

/// Limits applied when rendering a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeRenderOptions {
    /// Number of levels to render (None = unlimited, 1 = top level only).
    pub max_depth: Option<usize>,
    /// Maximum number of lines before the listing is cut short.
    pub max_entries: Option<usize>,
}

impl TreeRenderOptions {
    /// Render everything.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Limit the number of rendered levels.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Limit the number of rendered lines.
    pub fn with_max_entries(mut self, entries: usize) -> Self {
        self.max_entries = Some(entries);
        self
    }

    fn descends_past(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth + 1 < max)
    }
}

/// Render nodes as an indented tree, two spaces per level.
///
/// Directories carry a trailing `/`. Directories that were never traversed
/// are marked `(not expanded)`; directories cut off by the depth limit
/// show their entry count instead of their contents.
pub fn render_tree(nodes: &[FolderNode], options: &TreeRenderOptions) -> String {
    let mut out = String::new();
    let mut written = 0usize;

    if options.max_depth != Some(0) {
        render_level(nodes, 0, options, &mut out, &mut written);
    }

    let visible = count_visible(nodes, 0, options);
    if visible > written {
        let _ = writeln!(out, "... ({} more entries)", visible - written);
    }

    out
}

fn render_level(
    nodes: &[FolderNode],
    depth: usize,
    options: &TreeRenderOptions,
    out: &mut String,
    written: &mut usize,
) {
    let indent = "  ".repeat(depth);

    for node in nodes {
        if options.max_entries.is_some_and(|max| *written >= max) {
            return;
        }
        *written += 1;

        match &node.kind {
            NodeKind::File => {
                let _ = writeln!(out, "{indent}{}", node.name);
            }
            NodeKind::Directory { children: None } => {
                let _ = writeln!(out, "{indent}{}/ (not expanded)", node.name);
            }
            NodeKind::Directory {
                children: Some(children),
            } => {
                if children.is_empty() || options.descends_past(depth) {
                    let _ = writeln!(out, "{indent}{}/", node.name);
                    render_level(children, depth + 1, options, out, written);
                } else {
                    let _ = writeln!(
                        out,
                        "{indent}{}/ ({} entries)",
                        node.name,
                        children.len()
                    );
                }
            }
        }
    }
}

/// Count nodes that fall within the depth limit.
fn count_visible(nodes: &[FolderNode], depth: usize, options: &TreeRenderOptions) -> usize {
    if options.max_depth.is_some_and(|max| depth >= max) {
        return 0;
    }
    nodes
        .iter()
        .map(|node| 1 + count_visible(node.children(), depth + 1, options))
        .sum()
}

/// Render the manifest totals and per-type breakdown.
pub fn render_summary(manifest: &FileManifest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total files: {}", manifest.total_files);
    let _ = writeln!(out, "Total directories: {}", manifest.total_directories);

    if !manifest.files_by_type.is_empty() {
        let _ = writeln!(out, "File types:");
        for (token, count) in manifest.sorted_types() {
            let _ = writeln!(out, "  {token}: {count}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::generate_manifest;

    fn structure() -> Vec<FolderNode> {
        vec![
            FolderNode::new_file("/p/a.ts", "a.ts"),
            FolderNode::new_directory(
                "/p/sub",
                "sub",
                vec![
                    FolderNode::new_file("/p/sub/c.js", "c.js"),
                    FolderNode::new_directory(
                        "/p/sub/deep",
                        "deep",
                        vec![FolderNode::new_file("/p/sub/deep/d.md", "d.md")],
                    ),
                ],
            ),
            FolderNode::new_truncated_directory("/p/.git", ".git"),
        ]
    }

    #[test]
    fn test_render_full_tree() {
        let text = render_tree(&structure(), &TreeRenderOptions::unlimited());
        assert_eq!(
            text,
            "a.ts\nsub/\n  c.js\n  deep/\n    d.md\n.git/ (not expanded)\n"
        );
    }

    #[test]
    fn test_render_depth_limited() {
        let text = render_tree(&structure(), &TreeRenderOptions::default().with_max_depth(1));
        assert_eq!(text, "a.ts\nsub/ (2 entries)\n.git/ (not expanded)\n");
    }

    #[test]
    fn test_render_entry_limited() {
        let text = render_tree(&structure(), &TreeRenderOptions::default().with_max_entries(3));
        assert_eq!(text, "a.ts\nsub/\n  c.js\n... (3 more entries)\n");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_tree(&[], &TreeRenderOptions::unlimited()), "");
    }

    #[test]
    fn test_render_summary() {
        let root = FolderNode::new_directory("/p", "p", structure());
        let summary = render_summary(&generate_manifest(root));
        assert!(summary.starts_with("Total files: 3\nTotal directories: 3\n"));
        assert!(summary.contains("  ts: 1\n"));
        assert!(summary.contains("  md: 1\n"));
    }
}
