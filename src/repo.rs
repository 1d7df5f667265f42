//! Repository checkouts on local disk
//!
//! Graph building never touches the network. It asks a [`RepoLocator`] where
//! the working copy of `owner/name` lives and reads from there. [`RepoStore`]
//! is the production locator: checkouts live under `<repos_dir>/<owner>/<name>`
//! and are created with the `git` command line.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use crate::discovery::scope_root;
use crate::resolver::normalize_path;

/// Maps a repository identity to its working copy on disk
pub trait RepoLocator {
    /// Absolute or working-directory-relative path of the checkout
    ///
    /// Fails only if `owner`/`name` cannot name a directory safely.
    fn local_path(&self, owner: &str, name: &str) -> Result<PathBuf>;
}

/// Metadata about a cloned repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub local_path: PathBuf,
    pub cloned_at: DateTime<Utc>,
    /// Folder the caller intends to analyze, verified to exist
    pub analyzed_folder: Option<String>,
}

/// Checkouts stored under a single directory
#[derive(Debug, Clone)]
pub struct RepoStore {
    repos_dir: PathBuf,
}

impl RepoStore {
    pub fn new(repos_dir: impl Into<PathBuf>) -> Self {
        Self { repos_dir: repos_dir.into() }
    }

    pub fn repos_dir(&self) -> &Path {
        &self.repos_dir
    }

    /// Clone a GitHub repository, reusing an existing checkout
    pub fn clone_repo(&self, url: &str, folder: Option<&str>) -> Result<RepoInfo> {
        let (owner, name) = parse_github_url(url)
            .ok_or_else(|| anyhow::anyhow!("Invalid GitHub URL format: {}", url))?;
        let local_path = self.local_path(&owner, &name)?;

        if local_path.exists() {
            log::info!("Repository already exists at: {}", local_path.display());
        } else {
            let parent = local_path
                .parent()
                .ok_or_else(|| anyhow::anyhow!("Invalid checkout path: {}", local_path.display()))?;
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;

            log::info!("Cloning repository: {}", url);
            let output = Command::new("git")
                .arg("clone")
                .arg(url)
                .arg(&local_path)
                .output()
                .context("Failed to execute git clone")?;

            if !output.status.success() {
                anyhow::bail!(
                    "git clone failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            log::info!("Successfully cloned to: {}", local_path.display());
        }

        let analyzed_folder = match folder {
            Some(folder) => {
                scope_root(&local_path, Some(folder))?;
                Some(folder.to_string())
            }
            None => None,
        };

        Ok(RepoInfo {
            owner,
            name,
            url: url.to_string(),
            local_path,
            cloned_at: Utc::now(),
            analyzed_folder,
        })
    }

    /// Delete a checkout; returns false if there was nothing to delete
    pub fn delete(&self, owner: &str, name: &str) -> Result<bool> {
        let local_path = self.local_path(owner, name)?;
        if !local_path.exists() {
            return Ok(false);
        }

        std::fs::remove_dir_all(&local_path)
            .with_context(|| format!("Failed to delete {}", local_path.display()))?;
        log::info!("Deleted repository: {}", local_path.display());
        Ok(true)
    }

    /// Read a file inside a checkout, refusing paths that escape it
    pub fn read_file(&self, owner: &str, name: &str, rel_path: &str) -> Result<String> {
        if rel_path.trim().is_empty() {
            anyhow::bail!("File path is required");
        }

        let normalized = normalize_path(rel_path);
        if normalized.is_empty() || normalized == ".." || normalized.starts_with("../") {
            anyhow::bail!("Invalid file path: {}", rel_path);
        }

        let repo_root = self.local_path(owner, name)?;
        let full_path = repo_root.join(&normalized);

        // Symlinks inside the checkout must not lead outside of it either
        let canonical_root = repo_root
            .canonicalize()
            .with_context(|| format!("Repository not found: {}/{}", owner, name))?;
        let canonical_file = full_path
            .canonicalize()
            .with_context(|| format!("File not found: {}", normalized))?;
        if !canonical_file.starts_with(&canonical_root) {
            anyhow::bail!("Invalid file path: {}", rel_path);
        }

        std::fs::read_to_string(&canonical_file)
            .with_context(|| format!("Failed to read file: {}", normalized))
    }
}

impl RepoLocator for RepoStore {
    fn local_path(&self, owner: &str, name: &str) -> Result<PathBuf> {
        check_component("owner", owner)?;
        check_component("name", name)?;
        Ok(self.repos_dir.join(owner).join(name))
    }
}

/// A locator that always points at one directory
///
/// Used by `rgraph graph --path` to analyze an arbitrary checkout.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl RepoLocator for FixedRoot {
    fn local_path(&self, _owner: &str, _name: &str) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}

fn check_component(what: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', ':', '\0']);
    if !valid {
        anyhow::bail!("Invalid repository {}: {:?}", what, value);
    }
    Ok(())
}

const GITHUB_URL_PATTERNS: &[&str] = &[
    r"^https?://(?:www\.)?github\.com/([^/]+)/([^/]+?)(?:\.git)?/?$",
    r"^git@github\.com:([^/]+)/([^/]+?)(?:\.git)?$",
];

fn github_url_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        GITHUB_URL_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Extract `(owner, name)` from a GitHub HTTPS or SSH URL
///
/// Supports `https://github.com/o/r`, `https://github.com/o/r.git` and
/// `git@github.com:o/r.git`.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    github_url_patterns().iter().find_map(|re| {
        let caps = re.captures(url)?;
        let owner = caps.get(1)?.as_str().to_string();
        let name = caps.get(2)?.as_str().to_string();
        if check_component("owner", &owner).is_err() || check_component("name", &name).is_err() {
            return None;
        }
        Some((owner, name))
    })
}
