//! JWalk-based parallel folder scanner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use agentdoc_core::{
    FileManifest, FolderNode, ScanConfig, ScanError, generate_manifest, is_hidden_name,
};

use crate::progress::{ProgressTracker, ScanProgress};

/// Entries between progress broadcasts.
const PROGRESS_INTERVAL: u64 = 1000;

/// Scan a folder and aggregate its manifest with default settings.
pub fn scan_folder(path: impl Into<PathBuf>) -> Result<FileManifest, ScanError> {
    FolderScanner::new().scan_folder(&ScanConfig::new(path))
}

/// Folder scanner using jwalk for parallel traversal.
///
/// Every scan owns a dedicated rayon pool for directory reads and the
/// manifest tally, so concurrent scans never contend for a shared pool.
/// Hidden directories are listed but never read, and symbolic links are
/// reported as files without being followed.
pub struct FolderScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    cancel: CancellationToken,
}

impl FolderScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Create a scanner that stops when `cancel` fires.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            cancel,
        }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Token that cancels scans run by this scanner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan the configured root and aggregate the result.
    pub fn scan_folder(&self, config: &ScanConfig) -> Result<FileManifest, ScanError> {
        let pool = build_pool(config)?;
        let root = self.scan_on(config, &pool)?;
        Ok(pool.install(|| generate_manifest(root)))
    }

    /// Scan the configured root into a folder tree.
    ///
    /// The returned node represents the root itself; its children are the
    /// root's entries in enumeration order.
    pub fn scan_directory(&self, config: &ScanConfig) -> Result<FolderNode, ScanError> {
        let pool = build_pool(config)?;
        self.scan_on(config, &pool)
    }

    fn scan_on(
        &self,
        config: &ScanConfig,
        pool: &Arc<ThreadPool>,
    ) -> Result<FolderNode, ScanError> {
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        // Verify root is a directory
        let root_metadata =
            std::fs::metadata(&root_path).map_err(|e| ScanError::io(&root_path, e))?;
        if !root_metadata.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let mut entries = self.collect_entries(pool, &root_path)?;

        let name = root_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root_path.to_string_lossy().to_string());
        let children = build_children(&root_path, &mut entries);

        Ok(FolderNode::new_directory(root_path, name, children))
    }

    /// Collect all entries using jwalk, keyed by parent directory.
    fn collect_entries(
        &self,
        pool: &Arc<ThreadPool>,
        root_path: &Path,
    ) -> Result<HashMap<PathBuf, Vec<EntryInfo>>, ScanError> {
        // The pool is private to this scan, so no busy check is needed.
        let parallelism = Parallelism::RayonExistingPool {
            pool: Arc::clone(pool),
            busy_timeout: None,
        };

        let walker = WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false)
            .sort(false)
            .process_read_dir(|depth, _path, _state, children| {
                // The root is always read, even when its own name is hidden.
                if depth.is_none() {
                    return;
                }
                for child in children.iter_mut().flatten() {
                    if child.file_type().is_dir()
                        && is_hidden_name(&child.file_name().to_string_lossy())
                    {
                        child.read_children_path = None;
                    }
                }
            });

        let mut entries_by_parent: HashMap<PathBuf, Vec<EntryInfo>> = HashMap::new();
        let mut tracker = ProgressTracker::new();

        for entry_result in walker {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Interrupted);
            }

            let mut entry = entry_result.map_err(|err| walk_error(root_path, err))?;
            let path = entry.path();

            if let Some(err) = entry.read_children_error.take() {
                return Err(walk_error(&path, err));
            }

            // The root itself is represented by the returned node.
            if entry.depth() == 0 {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let class = if entry.file_type().is_dir() {
                tracker.record_dir();
                if is_hidden_name(&name) {
                    EntryClass::HiddenDirectory
                } else {
                    EntryClass::Directory
                }
            } else {
                tracker.record_file();
                EntryClass::File
            };

            if tracker.total_items() % PROGRESS_INTERVAL == 0 {
                let _ = self.progress_tx.send(tracker.snapshot(path.clone(), false));
            }

            if let Some(parent) = path.parent() {
                entries_by_parent
                    .entry(parent.to_path_buf())
                    .or_default()
                    .push(EntryInfo {
                        name: name.into(),
                        path,
                        class,
                    });
            }
        }

        let _ = self
            .progress_tx
            .send(tracker.snapshot(root_path.to_path_buf(), true));

        Ok(entries_by_parent)
    }
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// How an entry is materialized in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryClass {
    File,
    Directory,
    HiddenDirectory,
}

/// Temporary struct for collecting entry information.
struct EntryInfo {
    name: CompactString,
    path: PathBuf,
    class: EntryClass,
}

/// Recursively build the children of `dir` from collected entries.
fn build_children(
    dir: &Path,
    entries_by_parent: &mut HashMap<PathBuf, Vec<EntryInfo>>,
) -> Vec<FolderNode> {
    let entries = entries_by_parent.remove(dir).unwrap_or_default();

    entries
        .into_iter()
        .map(|entry| match entry.class {
            EntryClass::File => FolderNode::new_file(entry.path, entry.name),
            EntryClass::HiddenDirectory => {
                FolderNode::new_truncated_directory(entry.path, entry.name)
            }
            EntryClass::Directory => {
                let children = build_children(&entry.path, entries_by_parent);
                FolderNode::new_directory(entry.path, entry.name, children)
            }
        })
        .collect()
}

/// Build the pool for one scan; `threads == 0` uses rayon's default size.
fn build_pool(config: &ScanConfig) -> Result<Arc<ThreadPool>, ScanError> {
    ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("agentdoc-scan-{i}"))
        .build()
        .map(Arc::new)
        .map_err(|err| ScanError::io(&config.root, std::io::Error::other(err)))
}

/// Convert a jwalk error into a scan error, keeping the I/O kind.
fn walk_error(fallback: &Path, err: jwalk::Error) -> ScanError {
    let path = err
        .path()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| fallback.to_path_buf());

    let source = match err.io_error() {
        Some(io) => std::io::Error::new(io.kind(), io.to_string()),
        None => std::io::Error::other(err.to_string()),
    };
    ScanError::io(path, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join(".cache")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world").unwrap();
        fs::write(root.join("dir1/subdir/file3.rs"), "test").unwrap();
        fs::write(root.join("dir2/Makefile"), "all:").unwrap();
        fs::write(root.join(".cache/blob.bin"), "ignored").unwrap();

        temp
    }

    fn child<'a>(node: &'a FolderNode, name: &str) -> &'a FolderNode {
        node.children()
            .iter()
            .find(|c| c.name.as_str() == name)
            .unwrap_or_else(|| panic!("missing child {name}"))
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let root = FolderScanner::new()
            .scan_directory(&ScanConfig::new(temp.path()))
            .unwrap();

        assert!(root.is_dir());
        assert_eq!(root.child_count(), 4);

        let dir1 = child(&root, "dir1");
        assert_eq!(dir1.child_count(), 2);
        assert_eq!(child(dir1, "subdir").child_count(), 1);

        let cache = child(&root, ".cache");
        assert!(cache.is_truncated());
    }

    #[test]
    fn test_node_paths_are_absolute() {
        let temp = create_test_tree();
        let root = FolderScanner::new()
            .scan_directory(&ScanConfig::new(temp.path()))
            .unwrap();

        let file = child(&root, "file1.txt");
        assert!(file.path.is_absolute());
        assert_eq!(file.path, root.path.join("file1.txt"));
        assert_eq!(file.id.as_str(), file.path.to_string_lossy());
    }

    #[test]
    fn test_scan_folder_counts() {
        let temp = create_test_tree();
        let manifest = FolderScanner::new()
            .scan_folder(&ScanConfig::new(temp.path()))
            .unwrap();

        assert_eq!(manifest.total_files, 4);
        assert_eq!(manifest.total_directories, 4);
        assert_eq!(manifest.type_count("txt"), 2);
        assert_eq!(manifest.type_count("rs"), 1);
        assert_eq!(manifest.type_count("no-extension"), 1);
        assert_eq!(manifest.type_count("bin"), 0);
    }

    #[test]
    fn test_bounded_pool_matches_default() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .threads(2usize)
            .build()
            .unwrap();

        let manifest = FolderScanner::new().scan_folder(&config).unwrap();
        assert_eq!(manifest.total_files, 4);
        assert_eq!(manifest.total_directories, 4);
    }

    #[test]
    fn test_concurrent_scans_all_succeed() {
        let temp = create_test_tree();
        for i in 0..20 {
            let dir = temp.path().join(format!("dir1/extra{i}"));
            fs::create_dir(&dir).unwrap();
            for j in 0..10 {
                fs::write(dir.join(format!("f{j}.md")), "").unwrap();
            }
        }

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| scan_folder(temp.path())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in results {
            let manifest = result.unwrap();
            assert_eq!(manifest.total_files, 204);
            assert_eq!(manifest.total_directories, 24);
            assert_eq!(manifest.type_count("md"), 200);
        }
    }

    #[test]
    fn test_cancelled_scan_is_interrupted() {
        let temp = create_test_tree();
        let scanner = FolderScanner::new();
        scanner.cancellation_token().cancel();

        let result = scanner.scan_directory(&ScanConfig::new(temp.path()));
        assert!(matches!(result, Err(ScanError::Interrupted)));
    }

    #[test]
    fn test_progress_reports_completion() {
        let temp = create_test_tree();
        let scanner = FolderScanner::new();
        let mut progress_rx = scanner.subscribe();

        scanner.scan_directory(&ScanConfig::new(temp.path())).unwrap();

        let mut last = None;
        while let Ok(progress) = progress_rx.try_recv() {
            last = Some(progress);
        }
        let last = last.expect("final progress update");
        assert!(last.finished);
        assert_eq!(last.files_scanned, 4);
        assert_eq!(last.dirs_scanned, 4);
    }
}
