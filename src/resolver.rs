//! Import path resolution
//!
//! Maps a raw import specifier to a file of the discovered file set. Only
//! relative (`./x`, `../x`) and rooted (`/x`) specifiers are resolved; bare
//! specifiers such as `react` or `@scope/pkg` are package-manager dependencies
//! and never resolve.
//!
//! Resolution is purely lexical. The specifier is joined onto the importer's
//! directory, normalized, and then each suffix of the resolution order is
//! appended in turn until one names a file in the set:
//!
//! ```text
//! src/main.js + ./utils  ->  src/utils, src/utils.js, src/utils.jsx, src/utils.ts,
//!                            src/utils.tsx, src/utils/index.js, src/utils/index.ts
//! ```
//!
//! The first hit wins even if a later suffix would also match.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default suffix order (JavaScript before TypeScript)
pub const RESOLUTION_SUFFIXES: &[&str] = &["", ".js", ".jsx", ".ts", ".tsx", "/index.js", "/index.ts"];

/// Alternative order for TypeScript-first codebases
pub const TYPESCRIPT_FIRST_SUFFIXES: &[&str] = &["", ".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.js"];

/// Which suffix order the resolver tries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionOrder {
    #[default]
    JavascriptFirst,
    TypescriptFirst,
}

impl ResolutionOrder {
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            ResolutionOrder::JavascriptFirst => RESOLUTION_SUFFIXES,
            ResolutionOrder::TypescriptFirst => TYPESCRIPT_FIRST_SUFFIXES,
        }
    }
}

/// How a raw specifier is treated before any lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Bare specifier, assumed to come from a package manager
    External,
    /// Starts with `.` or `/`, expected to name a repository file
    Relative,
}

/// Immutable snapshot of the discovered files with exact-match lookup
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<String>,
    index: HashMap<String, usize>,
}

impl FileSet {
    pub fn new(files: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            // First entry wins when two paths normalize to the same key
            index.entry(file.replace('\\', "/")).or_insert(i);
        }
        Self { files, index }
    }

    /// Original entry whose separator-normalized form equals `path`
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index.get(path).map(|&i| self.files[i].as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<Vec<String>> for FileSet {
    fn from(files: Vec<String>) -> Self {
        Self::new(files)
    }
}

/// Resolves raw import specifiers against a [`FileSet`]
#[derive(Debug, Clone)]
pub struct ImportResolver {
    suffixes: &'static [&'static str],
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self { suffixes: RESOLUTION_SUFFIXES }
    }
}

impl ImportResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: ResolutionOrder) -> Self {
        Self { suffixes: order.suffixes() }
    }

    pub fn suffixes(&self) -> &'static [&'static str] {
        self.suffixes
    }

    /// Classify a specifier without looking at the file set
    pub fn classify(raw_import: &str) -> SpecifierKind {
        if raw_import.starts_with('.') || raw_import.starts_with('/') {
            SpecifierKind::Relative
        } else {
            SpecifierKind::External
        }
    }

    /// Resolve `raw_import`, written in `importer`, to a file of `files`
    ///
    /// Returns `None` for external specifiers and for relative specifiers that
    /// match no file.
    pub fn resolve<'f>(&self, importer: &str, raw_import: &str, files: &'f FileSet) -> Option<&'f str> {
        if Self::classify(raw_import) == SpecifierKind::External {
            return None;
        }

        let base = candidate_base(importer, raw_import);

        for suffix in self.suffixes {
            let candidate = if base.is_empty() {
                // Specifier pointed at the analyzed root itself (`import '.'` from a top-level file)
                suffix.trim_start_matches('/').to_string()
            } else {
                format!("{}{}", base, suffix)
            };

            if candidate.is_empty() {
                continue;
            }

            log::trace!("  trying {} for '{}' from {}", candidate, raw_import, importer);
            if let Some(found) = files.get(&candidate) {
                return Some(found);
            }
        }

        None
    }
}

/// Normalized join of the importer's directory and the raw specifier
///
/// A leading `/` does not reset the path: `/lib` imported from `src/a.js`
/// becomes `src/lib`, as with Node's `path.join`.
pub fn candidate_base(importer: &str, raw_import: &str) -> String {
    let importer = importer.replace('\\', "/");
    let dir = importer.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

    if dir.is_empty() {
        normalize_path(raw_import)
    } else {
        normalize_path(&format!("{}/{}", dir, raw_import))
    }
}

/// Lexically normalize a path: drop `.` and empty segments, fold `..`
///
/// Leading `..` segments that cannot be folded are kept, so
/// `../outside` stays `../outside` and never matches a repository file.
pub fn normalize_path(path: &str) -> String {
    let segments = path
        .split(['/', '\\'])
        .fold(Vec::new(), |mut acc: Vec<&str>, segment| {
            match segment {
                "" | "." => {}
                ".." => {
                    if matches!(acc.last(), Some(last) if *last != "..") {
                        acc.pop();
                    } else {
                        acc.push("..");
                    }
                }
                _ => acc.push(segment),
            }
            acc
        });

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> FileSet {
        FileSet::new(paths.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_external_specifiers_never_resolve() {
        let set = files(&["lodash.js", "react.js", "react/index.js", "@scope/pkg.js"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("index.js", "lodash", &set), None);
        assert_eq!(resolver.resolve("index.js", "react", &set), None);
        assert_eq!(resolver.resolve("index.js", "@scope/pkg", &set), None);
        assert_eq!(ImportResolver::classify("lodash"), SpecifierKind::External);
        assert_eq!(ImportResolver::classify("./x"), SpecifierKind::Relative);
        assert_eq!(ImportResolver::classify("/x"), SpecifierKind::Relative);
    }

    #[test]
    fn test_exact_match_wins() {
        let set = files(&["src/a.js", "src/a.js.ts"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("src/main.js", "./a.js", &set), Some("src/a.js"));
    }

    #[test]
    fn test_js_preferred_over_ts() {
        let set = files(&["a.ts", "a.js"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("main.ts", "./a", &set), Some("a.js"));
    }

    #[test]
    fn test_typescript_first_order() {
        let set = files(&["a.ts", "a.js"]);
        let resolver = ImportResolver::with_order(ResolutionOrder::TypescriptFirst);
        assert_eq!(resolver.resolve("main.ts", "./a", &set), Some("a.ts"));
    }

    #[test]
    fn test_extension_order() {
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("m.js", "./a", &files(&["a.tsx", "a.jsx"])), Some("a.jsx"));
        assert_eq!(resolver.resolve("m.js", "./a", &files(&["a.tsx", "a.ts"])), Some("a.ts"));
        assert_eq!(resolver.resolve("m.js", "./a", &files(&["a.tsx"])), Some("a.tsx"));
    }

    #[test]
    fn test_index_fallback() {
        let set = files(&["src/main.js", "src/utils/index.js"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("src/main.js", "./utils", &set), Some("src/utils/index.js"));

        let set = files(&["src/main.js", "src/utils.js", "src/utils/index.js"]);
        assert_eq!(resolver.resolve("src/main.js", "./utils", &set), Some("src/utils.js"));

        let set = files(&["src/main.ts", "src/utils/index.ts"]);
        assert_eq!(resolver.resolve("src/main.ts", "./utils", &set), Some("src/utils/index.ts"));

        // No index.tsx fallback in the resolution order
        let set = files(&["src/main.ts", "src/utils/index.tsx"]);
        assert_eq!(resolver.resolve("src/main.ts", "./utils", &set), None);
    }

    #[test]
    fn test_parent_directory_imports() {
        let set = files(&["src/services/api.ts", "src/config/index.ts", "shared/types.ts"]);
        let resolver = ImportResolver::new();
        assert_eq!(
            resolver.resolve("src/services/api.ts", "../config", &set),
            Some("src/config/index.ts")
        );
        assert_eq!(
            resolver.resolve("src/services/api.ts", "../../shared/types", &set),
            Some("shared/types.ts")
        );
        assert_eq!(resolver.resolve("src/services/api.ts", "../../../outside", &set), None);
    }

    #[test]
    fn test_rooted_specifier_joins_importer_dir() {
        let set = files(&["src/lib.js", "lib.js"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("src/a.js", "/lib", &set), Some("src/lib.js"));
    }

    #[test]
    fn test_unresolved_relative_import() {
        let set = files(&["index.js"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("index.js", "./missing", &set), None);
        assert_eq!(resolver.resolve("index.js", "./styles.css", &set), None);
    }

    #[test]
    fn test_import_of_analyzed_root() {
        let set = files(&["index.js", "main.js", "src/index.ts", "src/a.ts"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("main.js", ".", &set), Some("index.js"));
        assert_eq!(resolver.resolve("main.js", "./", &set), Some("index.js"));
        assert_eq!(resolver.resolve("src/a.ts", ".", &set), Some("src/index.ts"));
    }

    #[test]
    fn test_backslash_entries_are_matched() {
        let set = files(&["src\\lib.js"]);
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("src\\main.js", "./lib", &set), Some("src\\lib.js"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("src/./utils"), "src/utils");
        assert_eq!(normalize_path("src/a/../b"), "src/b");
        assert_eq!(normalize_path("a//b/"), "a/b");
        assert_eq!(normalize_path("../x"), "../x");
        assert_eq!(normalize_path("a/../../x"), "../x");
        assert_eq!(normalize_path("./"), "");
        assert_eq!(normalize_path("a\\b"), "a/b");
    }

    #[test]
    fn test_candidate_base() {
        assert_eq!(candidate_base("src/main.js", "./utils"), "src/utils");
        assert_eq!(candidate_base("index.js", "./lib"), "lib");
        assert_eq!(candidate_base("a/b/c.ts", "../../d"), "d");
        assert_eq!(candidate_base("backend/src/app.ts", "./routes/api"), "backend/src/routes/api");
    }

    #[test]
    fn test_file_set_lookup() {
        let set = files(&["a.js", "b/c.ts"]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(set.contains("b/c.ts"));
        assert_eq!(set.get("a.js"), Some("a.js"));
        assert_eq!(set.get("missing.js"), None);
        assert_eq!(set.files(), &["a.js".to_string(), "b/c.ts".to_string()]);
    }
}
