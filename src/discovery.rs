//! Source file discovery
//!
//! Walks a repository (or one folder of it) and returns the analyzable JS/TS
//! files as `/`-separated paths relative to the repository root. Scoped walks
//! still relativize against the repository root, so `backend/src/app.ts` keeps
//! its `backend/` prefix when only `backend` is analyzed.
//!
//! Build output and dependency folders are pruned without being descended into.
//! Directories that cannot be read are logged and skipped; the walk carries on
//! with whatever it can see.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::GraphError;
use crate::parsers::is_eligible;

/// Directory names that are never descended into
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", ".next", "coverage"];

/// Recursive file walker with exclusion rules
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    excluded_dirs: Vec<String>,
    follow_symlinks: bool,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self {
            excluded_dirs: EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            follow_symlinks: false,
        }
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directory names to prune on top of [`EXCLUDED_DIRS`]
    pub fn with_extra_excluded<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dir in dirs {
            let dir = dir.into();
            let dir = dir.trim().trim_matches('/');
            if !dir.is_empty() && !self.excluded_dirs.iter().any(|d| d == dir) {
                self.excluded_dirs.push(dir.to_string());
            }
        }
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn excluded_dirs(&self) -> &[String] {
        &self.excluded_dirs
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Discover files under `base_dir`, or under `base_dir/<scope>` when scoped
    ///
    /// Paths are returned relative to `base_dir` in lexicographic walk order.
    /// Fails with [`GraphError::ScopeNotFound`] when the scope folder does not
    /// exist; no other failure aborts the walk.
    pub fn discover(&self, base_dir: &Path, scope: Option<&str>) -> Result<Vec<String>, GraphError> {
        let root_dir = scope_root(base_dir, scope)?;
        Ok(self.walk(&root_dir, base_dir))
    }

    /// Walk `root_dir`, relativizing every hit against `base_dir`
    pub fn walk(&self, root_dir: &Path, base_dir: &Path) -> Vec<String> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root_dir)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let prune = entry.depth() > 0
                    && entry.file_type().is_dir()
                    && self.is_excluded(&entry.file_name().to_string_lossy());
                if prune {
                    log::trace!("Pruning excluded directory: {}", entry.path().display());
                }
                !prune
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    log::warn!("Error reading directory {}: {}", path, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if !is_eligible(&entry.file_name().to_string_lossy()) {
                continue;
            }

            match relative_path(entry.path(), base_dir) {
                Some(rel) => files.push(rel),
                None => log::warn!(
                    "Skipping {} (outside of {})",
                    entry.path().display(),
                    base_dir.display()
                ),
            }
        }

        files
    }
}

/// Normalize a user-supplied scope folder
///
/// Strips surrounding slashes (`/backend` is how scopes are displayed) and
/// converts backslashes. An empty scope means "whole repository". Drive paths
/// and scopes with `..` segments can never be under the repository root and
/// are reported as not found.
pub fn normalize_scope(folder: &str) -> Result<Option<String>, GraphError> {
    let cleaned = folder.trim().replace('\\', "/");
    let cleaned = cleaned.trim_start_matches('/');

    let not_found = || GraphError::ScopeNotFound { folder: folder.to_string() };

    // Drive-prefixed paths on Windows
    if Path::new(cleaned).is_absolute() || cleaned.contains(':') {
        return Err(not_found());
    }

    let segments: Vec<&str> = cleaned
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.iter().any(|s| *s == "..") {
        return Err(not_found());
    }

    if segments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(segments.join("/")))
    }
}

/// Directory to walk for an optional scope, verified to exist
pub fn scope_root(base_dir: &Path, scope: Option<&str>) -> Result<PathBuf, GraphError> {
    let Some(folder) = scope else {
        return Ok(base_dir.to_path_buf());
    };

    let Some(normalized) = normalize_scope(folder)? else {
        return Ok(base_dir.to_path_buf());
    };

    let root_dir = base_dir.join(&normalized);
    if !root_dir.is_dir() {
        return Err(GraphError::ScopeNotFound { folder: folder.to_string() });
    }

    log::info!("Analyzing folder: /{}", normalized);
    Ok(root_dir)
}

/// `/`-separated path of `path` relative to `base`
fn relative_path(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
