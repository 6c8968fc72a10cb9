//! Prompt construction from a manifest.

use std::fmt::Write;
use std::path::Path;

use agentdoc_core::{FileManifest, TreeRenderOptions, render_summary, render_tree};

use crate::config::PromptConfig;

/// Sections the generated document must contain.
const DOC_SECTIONS: [(&str, &str); 5] = [
    ("Purpose", "what this folder contains and why it exists"),
    ("Agent Usage", "how AI agents should interact with this folder"),
    ("Contents", "key files and how they are organized"),
    ("Tools Available", "scripts, commands, or resources found here"),
    ("Dependencies", "relationships to other folders or external systems"),
];

/// Display name for a folder path.
pub fn folder_name(folder_path: &Path) -> String {
    folder_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| folder_path.display().to_string())
}

/// Build the generation prompt for a scanned folder.
pub fn build_prompt(folder_path: &Path, manifest: &FileManifest, config: &PromptConfig) -> String {
    let options = TreeRenderOptions {
        max_depth: config.max_tree_depth,
        max_entries: config.max_tree_entries,
    };

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Generate a README.agent.md file for the folder described below."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Folder name: {}", folder_name(folder_path));
    let _ = writeln!(prompt, "Folder path: {}", folder_path.display());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Summary:");
    prompt.push_str(&render_summary(manifest));
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Structure:");
    if manifest.structure.is_empty() {
        let _ = writeln!(prompt, "(empty folder)");
    } else {
        prompt.push_str(&render_tree(&manifest.structure, &options));
    }
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "The document should include:");
    for (i, (title, description)) in DOC_SECTIONS.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {title} - {description}", i + 1);
    }
    let _ = writeln!(prompt);
    let _ = write!(prompt, "Format the answer as markdown and return only the document.");

    prompt
}
