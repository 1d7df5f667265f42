//! Graph assembly
//!
//! Ties discovery, parsing and resolution together:
//!
//! 1. Locate the repository checkout and discover its files (optionally scoped)
//! 2. Create one node per discovered file, in discovery order
//! 3. Read, parse and resolve every file on a rayon pool, producing one ordered
//!    batch of `(target, kind)` pairs per file
//! 4. Concatenate the batches in file order and number the edges `edge-0..`
//! 5. Group node ids by containing directory
//!
//! Numbering after collection keeps edge ids deterministic no matter how the
//! pool schedules files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;

use crate::config::{Config, GraphConfig};
use crate::discovery::{normalize_scope, FileDiscovery};
use crate::error::GraphError;
use crate::models::{FileEdge, FileGraph, FileNode, FolderGroup, GraphResponse, ImportKind, ROOT_FOLDER};
use crate::parsers::{ImportParser, SourceParser};
use crate::repo::{RepoLocator, RepoStore};
use crate::resolver::{FileSet, ImportResolver, SpecifierKind};

/// Builds file dependency graphs for checkouts found through a [`RepoLocator`]
pub struct GraphBuilder<L, P> {
    locator: L,
    parser: P,
    discovery: FileDiscovery,
    resolver: ImportResolver,
    max_file_size: u64,
    num_threads: usize,
    show_progress: bool,
}

impl GraphBuilder<RepoStore, SourceParser> {
    /// Production wiring: checkouts under `repos_dir`, Tree-sitter parsing
    pub fn from_config(config: &Config) -> Self {
        GraphBuilder::new(RepoStore::new(&config.repos_dir), SourceParser::new())
            .with_config(&config.graph)
    }
}

impl<L, P> GraphBuilder<L, P>
where
    L: RepoLocator + Sync,
    P: ImportParser + Sync,
{
    pub fn new(locator: L, parser: P) -> Self {
        let defaults = GraphConfig::default();
        Self {
            locator,
            parser,
            discovery: FileDiscovery::new(),
            resolver: ImportResolver::new(),
            max_file_size: defaults.max_file_size,
            num_threads: defaults.thread_count(),
            show_progress: false,
        }
    }

    pub fn with_discovery(mut self, discovery: FileDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_resolver(mut self, resolver: ImportResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Apply exclusions, symlink policy, size limit, threads and resolution order
    pub fn with_config(mut self, config: &GraphConfig) -> Self {
        self.discovery = FileDiscovery::new()
            .with_extra_excluded(config.extra_excluded_dirs.iter().cloned())
            .with_follow_symlinks(config.follow_symlinks);
        self.resolver = ImportResolver::with_order(config.resolution_order);
        self.max_file_size = config.max_file_size;
        self.num_threads = config.thread_count();
        self
    }

    /// Show a progress bar on stderr while files are processed
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Build the graph of `owner/name`, optionally limited to one folder
    ///
    /// Fails only if the checkout or the scope folder does not exist; see
    /// [`GraphBuilder::build_from_root`].
    pub fn build_graph(&self, owner: &str, name: &str, scope: Option<&str>) -> Result<FileGraph> {
        match scope {
            Some(folder) => log::info!("Building graph for {}/{} (folder: {})", owner, name, folder),
            None => log::info!("Building graph for {}/{}", owner, name),
        }

        let root = self.locator.local_path(owner, name)?;
        Ok(self.build_from_root(&root, scope)?)
    }

    /// Build the graph plus the summary the CLI and HTTP API report
    pub fn build_response(&self, owner: &str, name: &str, scope: Option<&str>) -> Result<GraphResponse> {
        let folder = match scope {
            Some(folder) => normalize_scope(folder)?,
            None => None,
        };
        let graph = self.build_graph(owner, name, folder.as_deref())?;
        Ok(GraphResponse::new(owner, name, folder, graph))
    }

    /// Build the graph of any directory on disk
    pub fn build_from_root(&self, root: &Path, scope: Option<&str>) -> Result<FileGraph, GraphError> {
        if !root.is_dir() {
            return Err(GraphError::RepoNotFound { path: root.to_path_buf() });
        }

        let files = FileSet::new(self.discovery.discover(root, scope)?);
        log::info!("Found {} files to analyze", files.len());

        let nodes: Vec<FileNode> = files.files().iter().map(|path| FileNode::from_path(path)).collect();

        let pb = self.progress_bar(files.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()?;

        let batches: Vec<Vec<(String, ImportKind)>> = pool.install(|| {
            files
                .files()
                .par_iter()
                .map(|path| {
                    let batch = self.file_edges(root, path, &files);
                    pb.inc(1);
                    batch
                })
                .collect()
        });
        pb.finish_and_clear();

        let edges: Vec<FileEdge> = files
            .files()
            .iter()
            .zip(batches)
            .flat_map(|(source, batch)| batch.into_iter().map(move |edge| (source, edge)))
            .enumerate()
            .map(|(n, (source, (target, import_type)))| FileEdge {
                id: format!("edge-{}", n),
                source: source.clone(),
                target,
                import_type,
            })
            .collect();

        let folder_groups = group_by_folder(files.files());

        log::info!(
            "Graph built: {} nodes, {} edges, {} folders",
            nodes.len(),
            edges.len(),
            folder_groups.len()
        );

        Ok(FileGraph { nodes, edges, folder_groups })
    }

    /// Resolved imports of one file, in import order
    ///
    /// Read and parse failures are logged and yield an empty batch.
    fn file_edges(&self, root: &Path, path: &str, files: &FileSet) -> Vec<(String, ImportKind)> {
        let full_path = root.join(path);

        match std::fs::metadata(&full_path) {
            Ok(meta) if self.max_file_size > 0 && meta.len() > self.max_file_size => {
                log::debug!(
                    "Skipping imports of large file {} ({} bytes > {} limit)",
                    path,
                    meta.len(),
                    self.max_file_size
                );
                return Vec::new();
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to read {}: {}", path, e);
                return Vec::new();
            }
        }

        let source = match std::fs::read_to_string(&full_path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path, e);
                return Vec::new();
            }
        };

        let imports = match self.parser.parse_imports(path, &source) {
            Ok(imports) => imports,
            Err(e) => {
                log::warn!("Failed to parse {}: {:#}", path, e);
                return Vec::new();
            }
        };
        log::debug!("Found {} imports in {}", imports.len(), path);

        imports
            .into_iter()
            .filter_map(|import| {
                match self.resolver.resolve(path, &import.imported_path, files) {
                    Some(target) => Some((target.to_string(), import.kind)),
                    None => {
                        if ImportResolver::classify(&import.imported_path) == SpecifierKind::Relative {
                            log::debug!(
                                "Unresolved import '{}' in {}:{}",
                                import.imported_path,
                                path,
                                import.line
                            );
                        }
                        None
                    }
                }
            })
            .collect()
    }

    fn progress_bar(&self, total_files: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_files as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}

/// Group paths by the directory portion before their last `/`
///
/// Groups appear in the order their first member appears. Top-level files go
/// to the [`ROOT_FOLDER`] group.
pub fn group_by_folder<S: AsRef<str>>(paths: &[S]) -> Vec<FolderGroup> {
    let mut groups: Vec<FolderGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for path in paths {
        let path = path.as_ref();
        let folder = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(ROOT_FOLDER);

        let pos = *positions.entry(folder.to_string()).or_insert_with(|| {
            let name = folder.rsplit('/').next().unwrap_or(folder);
            groups.push(FolderGroup {
                id: folder.to_string(),
                name: name.to_string(),
                path: folder.to_string(),
                file_ids: Vec::new(),
            });
            groups.len() - 1
        });

        groups[pos].file_ids.push(path.to_string());
    }

    groups
}
