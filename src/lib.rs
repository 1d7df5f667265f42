//! repograph: file dependency graphs for JavaScript/TypeScript repositories
//!
//! repograph turns a repository checkout into a directed graph with one node
//! per `.js`/`.jsx`/`.ts`/`.tsx` file and one edge per import that resolves to
//! another file of the repository.
//!
//! # Architecture
//!
//! - **Discovery**: Walks the checkout (or one folder of it), pruning build and
//!   dependency directories
//! - **Parsers**: Tree-sitter grammars plus an extractor for ES imports,
//!   `require` calls and dynamic `import()`
//! - **Resolver**: Maps raw specifiers to discovered files with extension and
//!   index fallback
//! - **Graph**: Runs the pipeline over all files and assembles nodes, edges and
//!   folder groups
//!
//! # Example Usage
//!
//! ```no_run
//! use repograph::{config::Config, graph::GraphBuilder};
//!
//! let config = Config::load(None).unwrap();
//! let graph = GraphBuilder::from_config(&config)
//!     .build_graph("octocat", "hello-world", Some("src"))
//!     .unwrap();
//!
//! println!("{} files, {} imports", graph.nodes.len(), graph.edges.len());
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod formatter;
pub mod graph;
pub mod models;
pub mod output;
pub mod parsers;
pub mod repo;
pub mod resolver;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use discovery::FileDiscovery;
pub use error::GraphError;
pub use graph::{group_by_folder, GraphBuilder};
pub use models::{FileEdge, FileGraph, FileNode, FolderGroup, GraphStats, ImportKind, ImportStatement, Language};
pub use parsers::{ImportParser, SourceParser};
pub use repo::{RepoLocator, RepoStore};
pub use resolver::{FileSet, ImportResolver};
