//! Fatal error kinds of a graph build
//!
//! Only conditions that make the whole build meaningless live here. Unreadable
//! directories, unreadable files, parse failures and unresolvable imports are
//! recovered where they happen and only shrink the resulting graph.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// The requested scope folder does not exist under the repository root
    #[error("Folder \"{folder}\" not found in repository")]
    ScopeNotFound { folder: String },

    /// The repository collaborator pointed at a directory that does not exist
    #[error("Repository not found at {}", path.display())]
    RepoNotFound { path: PathBuf },

    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl GraphError {
    /// Whether the error means "the thing you asked for is not there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::ScopeNotFound { .. } | GraphError::RepoNotFound { .. })
    }
}
