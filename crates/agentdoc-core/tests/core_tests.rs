use agentdoc_core::{
    FileManifest, FolderNode, NO_EXTENSION, NodeKind, ScanConfig, TreeRenderOptions,
    extension_token, generate_manifest, render_tree,
};
use serde_json::json;

fn sample_root() -> FolderNode {
    FolderNode::new_directory(
        "/proj",
        "proj",
        vec![
            FolderNode::new_file("/proj/a.ts", "a.ts"),
            FolderNode::new_file("/proj/README", "README"),
            FolderNode::new_directory(
                "/proj/sub",
                "sub",
                vec![FolderNode::new_file("/proj/sub/c.js", "c.js")],
            ),
            FolderNode::new_truncated_directory("/proj/.git", ".git"),
        ],
    )
}

#[test]
fn test_node_kind_discrimination() {
    let file = NodeKind::File;
    assert!(file.is_file());
    assert!(!file.is_dir());

    let dir = NodeKind::Directory {
        children: Some(Vec::new()),
    };
    assert!(dir.is_dir());
    assert!(!dir.is_file());

    let hidden = NodeKind::Directory { children: None };
    assert!(hidden.is_dir());
}

#[test]
fn test_file_node_serializes_without_children() {
    let node = FolderNode::new_file("/proj/a.ts", "a.ts");
    let value = serde_json::to_value(&node).unwrap();

    assert_eq!(
        value,
        json!({
            "id": "/proj/a.ts",
            "name": "a.ts",
            "path": "/proj/a.ts",
            "type": "file"
        })
    );
}

#[test]
fn test_truncated_directory_omits_children() {
    let node = FolderNode::new_truncated_directory("/proj/.git", ".git");
    let value = serde_json::to_value(&node).unwrap();

    assert_eq!(value["type"], "directory");
    assert!(value.get("children").is_none());
}

#[test]
fn test_manifest_wire_format() {
    let manifest = generate_manifest(sample_root());
    let value = serde_json::to_value(&manifest).unwrap();

    assert_eq!(value["totalFiles"], 3);
    assert_eq!(value["totalDirectories"], 2);
    assert_eq!(value["filesByType"]["ts"], 1);
    assert_eq!(value["filesByType"][NO_EXTENSION], 1);
    assert_eq!(value["structure"].as_array().unwrap().len(), 4);
    assert_eq!(value["structure"][2]["children"][0]["name"], "c.js");
}

#[test]
fn test_manifest_deserializes_from_wire_format() {
    let expected = generate_manifest(sample_root());
    let text = serde_json::to_string(&expected).unwrap();
    let parsed: FileManifest = serde_json::from_str(&text).unwrap();

    assert_eq!(parsed, expected);
    assert!(parsed.structure[3].is_truncated());
}

#[test]
fn test_manifest_counts_match_entries() {
    let root = sample_root();
    fn count(nodes: &[FolderNode]) -> u64 {
        nodes.iter().map(|n| 1 + count(n.children())).sum()
    }
    let entries = count(root.children());

    let manifest = generate_manifest(root);
    assert_eq!(manifest.total_entries(), entries);
}

#[test]
fn test_sort_by_name_orders_every_level() {
    let mut manifest = generate_manifest(FolderNode::new_directory(
        "/proj",
        "proj",
        vec![
            FolderNode::new_directory(
                "/proj/zeta",
                "zeta",
                vec![
                    FolderNode::new_file("/proj/zeta/b.rs", "b.rs"),
                    FolderNode::new_file("/proj/zeta/a.rs", "a.rs"),
                ],
            ),
            FolderNode::new_file("/proj/alpha.md", "alpha.md"),
        ],
    ));

    manifest.sort_by_name();

    let top: Vec<&str> = manifest.structure.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(top, ["alpha.md", "zeta"]);
    let inner: Vec<&str> = manifest.structure[1]
        .children()
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(inner, ["a.rs", "b.rs"]);
}

#[test]
fn test_extension_token_edge_cases() {
    assert_eq!(extension_token("archive.tar.gz"), "gz");
    assert_eq!(extension_token("LICENSE"), NO_EXTENSION);
    assert_eq!(extension_token("Photo.JPG"), "JPG");
}

#[test]
fn test_render_tree_of_manifest_structure() {
    let manifest = generate_manifest(sample_root());
    let text = render_tree(&manifest.structure, &TreeRenderOptions::unlimited());

    assert!(text.contains("sub/\n  c.js\n"));
    assert!(text.contains(".git/ (not expanded)"));
}

#[test]
fn test_scan_config_default() {
    let config = ScanConfig::default();
    assert_eq!(config.root, std::path::PathBuf::from("."));
    assert_eq!(config.threads, 0);
}
