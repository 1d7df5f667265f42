//! Core data models for repograph
//!
//! These structures represent the normalized, deterministic graph output that
//! repograph hands to HTTP clients, the CLI renderers and other programmatic
//! consumers. Field names serialize in camelCase to match the JSON shape the
//! graph viewer expects.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Programming language of a graph node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
}

impl Language {
    /// Detect the language from a file extension (without the leading dot)
    ///
    /// Returns `None` for anything that is not an analyzable JS/TS source.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Detect the language of a (possibly relative) path
    pub fn from_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

/// Syntactic form an import was written in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImportKind {
    /// `import x from './y'` (including `import type`)
    Import,
    /// `require('./y')`
    Require,
    /// `import('./y')`
    Dynamic,
}

/// A raw import found in one source file, before resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatement {
    /// Import path exactly as written in the source (quotes stripped)
    pub imported_path: String,
    /// Line of the import statement or call (1-indexed)
    pub line: usize,
    /// Syntactic form of the import
    #[serde(rename = "type")]
    pub kind: ImportKind,
}

impl ImportStatement {
    pub fn new(imported_path: impl Into<String>, line: usize, kind: ImportKind) -> Self {
        Self {
            imported_path: imported_path.into(),
            line,
            kind,
        }
    }
}

/// One source file in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileNode {
    /// Unique identifier (same as `path`)
    pub id: String,
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    /// Display name (file name)
    pub label: String,
    pub language: Language,
}

impl FileNode {
    /// Build the node for a discovered repository-relative path
    pub fn from_path(path: &str) -> Self {
        let label = path.rsplit('/').next().unwrap_or(path).to_string();
        let language = Language::from_path(path).unwrap_or(Language::JavaScript);

        Self {
            id: path.to_string(),
            path: path.to_string(),
            label,
            language,
        }
    }
}

/// A resolved import between two nodes of the same graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEdge {
    /// Sequential id (`edge-<n>`), unique within one build only
    pub id: String,
    /// Importer's node id
    pub source: String,
    /// Importee's node id
    pub target: String,
    pub import_type: ImportKind,
}

/// Nodes sharing the same containing directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderGroup {
    /// Directory portion of the member paths (`root` for top-level files)
    pub id: String,
    /// Last segment of the directory
    pub name: String,
    pub path: String,
    pub file_ids: Vec<String>,
}

/// Sentinel folder id for files at the top of the analyzed tree
pub const ROOT_FOLDER: &str = "root";

/// The assembled dependency graph
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileGraph {
    pub nodes: Vec<FileNode>,
    pub edges: Vec<FileEdge>,
    pub folder_groups: Vec<FolderGroup>,
}

impl FileGraph {
    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&FileNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose source is the given node
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FileEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }
}

/// Summary statistics derived from a graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    /// Number of nodes
    pub total_files: usize,
    /// Number of resolved imports (edges)
    pub total_imports: usize,
    /// `/<folder>` for scoped builds, `entire repository` otherwise
    pub analyzed_folder: String,
}

impl GraphStats {
    pub fn from_graph(graph: &FileGraph, folder: Option<&str>) -> Self {
        Self {
            total_files: graph.nodes.len(),
            total_imports: graph.edges.len(),
            analyzed_folder: match folder {
                Some(f) => format!("/{}", f),
                None => "entire repository".to_string(),
            },
        }
    }
}

/// Graph plus the request context it was built for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    pub owner: String,
    pub name: String,
    pub folder: Option<String>,
    pub graph: FileGraph,
    pub stats: GraphStats,
}

impl GraphResponse {
    pub fn new(owner: &str, name: &str, folder: Option<String>, graph: FileGraph) -> Self {
        let stats = GraphStats::from_graph(&graph, folder.as_deref());
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            folder,
            graph,
            stats,
        }
    }
}

/// Raw imports of a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub file: String,
    pub language: Option<Language>,
    pub imports: Vec<ImportStatement>,
    pub import_count: usize,
}

impl ParseReport {
    pub fn new(file: impl Into<String>, imports: Vec<ImportStatement>) -> Self {
        let file = file.into();
        Self {
            language: Language::from_path(&file),
            import_count: imports.len(),
            file,
            imports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path("src/a.ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_path("src/App.tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_path("index.js"), Some(Language::JavaScript));
        assert_eq!(Language::from_path("lib/view.jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_path("README.md"), None);
        assert_eq!(Language::from_path("Makefile"), None);
        assert_eq!(Language::from_path("src.ts/file"), None);
    }

    #[test]
    fn test_file_node_from_path() {
        let node = FileNode::from_path("backend/src/server.ts");
        assert_eq!(node.id, "backend/src/server.ts");
        assert_eq!(node.path, node.id);
        assert_eq!(node.label, "server.ts");
        assert_eq!(node.language, Language::TypeScript);

        let top = FileNode::from_path("index.js");
        assert_eq!(top.label, "index.js");
        assert_eq!(top.language, Language::JavaScript);
    }

    #[test]
    fn test_graph_serializes_camel_case() {
        let graph = FileGraph {
            nodes: vec![FileNode::from_path("a.js")],
            edges: vec![FileEdge {
                id: "edge-0".to_string(),
                source: "a.js".to_string(),
                target: "a.js".to_string(),
                import_type: ImportKind::Require,
            }],
            folder_groups: vec![FolderGroup {
                id: ROOT_FOLDER.to_string(),
                name: ROOT_FOLDER.to_string(),
                path: ROOT_FOLDER.to_string(),
                file_ids: vec!["a.js".to_string()],
            }],
        };

        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"][0]["language"], "javascript");
        assert_eq!(json["edges"][0]["importType"], "require");
        assert_eq!(json["folderGroups"][0]["fileIds"][0], "a.js");
    }

    #[test]
    fn test_import_statement_json_uses_type_key() {
        let stmt = ImportStatement::new("./lib", 3, ImportKind::Dynamic);
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["importedPath"], "./lib");
        assert_eq!(json["line"], 3);
        assert_eq!(json["type"], "dynamic");
    }

    #[test]
    fn test_stats_analyzed_folder() {
        let graph = FileGraph::default();
        assert_eq!(GraphStats::from_graph(&graph, None).analyzed_folder, "entire repository");
        assert_eq!(GraphStats::from_graph(&graph, Some("backend")).analyzed_folder, "/backend");
    }
}
