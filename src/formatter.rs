//! Terminal renderings of dependency graphs
//!
//! `rgraph graph` can print a graph as a folder tree, an edge table, Graphviz
//! DOT or JSON. Every renderer returns a `String` so the CLI decides where it
//! goes and tests can inspect it.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use strum::{Display, EnumString};

use crate::models::{FileGraph, GraphResponse, ImportKind, ParseReport};

/// Output format of `rgraph graph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GraphFormat {
    Tree,
    Table,
    Dot,
    Json,
}

/// Serialize a value as JSON, pretty-printed when asked
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Output formatter configuration
pub struct OutputFormatter {
    /// Whether to use colors
    pub use_colors: bool,
}

impl OutputFormatter {
    /// Create a new formatter with automatic TTY detection
    pub fn new(plain: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var("NO_COLOR").is_ok();

        Self {
            use_colors: !plain && !no_color && is_tty,
        }
    }

    /// Formatter that never emits escape codes
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Render a graph response in the requested format
    pub fn render_graph(&self, response: &GraphResponse, format: GraphFormat, pretty: bool) -> Result<String> {
        let rendered = match format {
            GraphFormat::Tree => self.render_tree(&response.graph),
            GraphFormat::Table => self.render_table(&response.graph),
            GraphFormat::Dot => render_dot(&response.graph),
            GraphFormat::Json => to_json(response, pretty)?,
        };
        Ok(rendered)
    }

    /// Files grouped by folder, each followed by the files it imports
    pub fn render_tree(&self, graph: &FileGraph) -> String {
        let mut out = String::new();

        for group in &graph.folder_groups {
            let header = format!("{}/ ({} files)", group.path, group.file_ids.len());
            out.push_str(&self.bold(&header));
            out.push('\n');

            for (idx, file_id) in group.file_ids.iter().enumerate() {
                let is_last = idx == group.file_ids.len() - 1;
                let branch = if is_last { "└─" } else { "├─" };
                let rail = if is_last { "  " } else { "│ " };

                let label = graph.node(file_id).map(|n| n.label.as_str()).unwrap_or(file_id);
                out.push_str(&format!("  {} {}\n", branch, self.cyan(label)));

                for edge in graph.edges_from(file_id) {
                    out.push_str(&format!(
                        "  {}   → {} {}\n",
                        rail,
                        edge.target,
                        self.dim(&format!("[{}]", edge.import_type))
                    ));
                }
            }
            out.push('\n');
        }

        if graph.nodes.is_empty() {
            out.push_str("No JavaScript/TypeScript files found.\n");
        }

        out
    }

    /// One row per edge
    pub fn render_table(&self, graph: &FileGraph) -> String {
        let source_width = column_width(graph.edges.iter().map(|e| e.source.as_str()), "Source");
        let target_width = column_width(graph.edges.iter().map(|e| e.target.as_str()), "Target");
        let id_width = column_width(graph.edges.iter().map(|e| e.id.as_str()), "ID");

        let mut out = String::new();
        let header = format!(
            "{:<id_width$}  {:<source_width$}  {:<target_width$}  Type",
            "ID", "Source", "Target"
        );
        out.push_str(&self.bold(&header));
        out.push('\n');
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            "-".repeat(id_width),
            "-".repeat(source_width),
            "-".repeat(target_width),
            "-".repeat(7)
        ));

        for edge in &graph.edges {
            out.push_str(&format!(
                "{:<id_width$}  {:<source_width$}  {:<target_width$}  {}\n",
                edge.id, edge.source, edge.target, edge.import_type
            ));
        }

        out
    }

    /// Raw imports of a single file
    pub fn render_imports(&self, report: &ParseReport) -> String {
        let mut out = String::new();
        let language = report
            .language
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unsupported".to_string());
        out.push_str(&self.bold(&format!("{} ({})", report.file, language)));
        out.push('\n');

        for import in &report.imports {
            out.push_str(&format!(
                "  └─ {} {} (line {})\n",
                self.cyan(&import.imported_path),
                self.dim(&format!("[{}]", import.kind)),
                import.line
            ));
        }

        out
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn cyan(&self, text: &str) -> String {
        if self.use_colors {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Graphviz DOT with one cluster per folder group
pub fn render_dot(graph: &FileGraph) -> String {
    let mut out = String::from("digraph dependencies {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, fontname=\"Helvetica\"];\n");

    for (idx, group) in graph.folder_groups.iter().enumerate() {
        out.push_str(&format!("  subgraph cluster_{} {{\n", idx));
        out.push_str(&format!("    label={};\n", dot_quote(&group.path)));
        for file_id in &group.file_ids {
            let label = graph.node(file_id).map(|n| n.label.as_str()).unwrap_or(file_id);
            out.push_str(&format!("    {} [label={}];\n", dot_quote(file_id), dot_quote(label)));
        }
        out.push_str("  }\n");
    }

    for edge in &graph.edges {
        let style = match edge.import_type {
            ImportKind::Import => "solid",
            ImportKind::Require => "dashed",
            ImportKind::Dynamic => "dotted",
        };
        out.push_str(&format!(
            "  {} -> {} [style={}];\n",
            dot_quote(&edge.source),
            dot_quote(&edge.target),
            style
        ));
    }

    out.push_str("}\n");
    out
}

fn dot_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::group_by_folder;
    use crate::models::{FileEdge, FileNode, ImportStatement};

    fn sample_graph() -> FileGraph {
        let paths = ["index.js", "src/a.ts", "src/b.ts"];
        let edge = |n: usize, source: &str, target: &str, kind| FileEdge {
            id: format!("edge-{}", n),
            source: source.to_string(),
            target: target.to_string(),
            import_type: kind,
        };

        FileGraph {
            nodes: paths.iter().map(|p| FileNode::from_path(p)).collect(),
            edges: vec![
                edge(0, "index.js", "src/a.ts", ImportKind::Require),
                edge(1, "src/a.ts", "src/b.ts", ImportKind::Import),
                edge(2, "src/b.ts", "src/a.ts", ImportKind::Dynamic),
            ],
            folder_groups: group_by_folder(&paths),
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("tree".parse::<GraphFormat>().unwrap(), GraphFormat::Tree);
        assert_eq!("DOT".parse::<GraphFormat>().unwrap(), GraphFormat::Dot);
        assert!("xml".parse::<GraphFormat>().is_err());
        assert_eq!(GraphFormat::Table.to_string(), "table");
    }

    #[test]
    fn test_render_tree() {
        let out = OutputFormatter::plain().render_tree(&sample_graph());
        assert!(out.contains("root/ (1 files)"));
        assert!(out.contains("src/ (2 files)"));
        assert!(out.contains("  └─ index.js\n"));
        assert!(out.contains("  ├─ a.ts\n"));
        assert!(out.contains("→ src/b.ts [import]"));
        assert!(out.contains("→ src/a.ts [dynamic]"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_render_tree_empty_graph() {
        let out = OutputFormatter::plain().render_tree(&FileGraph::default());
        assert!(out.contains("No JavaScript/TypeScript files found."));
    }

    #[test]
    fn test_render_table() {
        let out = OutputFormatter::plain().render_table(&sample_graph());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].starts_with("edge-0"));
        assert!(lines[2].ends_with("require"));
    }

    #[test]
    fn test_render_dot() {
        let out = render_dot(&sample_graph());
        assert!(out.starts_with("digraph dependencies {"));
        assert!(out.contains("subgraph cluster_0"));
        assert!(out.contains("label=\"src\";"));
        assert!(out.contains("\"index.js\" -> \"src/a.ts\" [style=dashed];"));
        assert!(out.contains("\"src/b.ts\" -> \"src/a.ts\" [style=dotted];"));
        assert!(out.trim_end().ends_with('}'));
    }

    #[test]
    fn test_dot_quote_escapes() {
        assert_eq!(dot_quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_render_graph_json() {
        let response = GraphResponse::new("o", "n", None, sample_graph());
        let out = OutputFormatter::plain()
            .render_graph(&response, GraphFormat::Json, false)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["stats"]["totalFiles"], 3);
        assert_eq!(value["graph"]["edges"][1]["importType"], "import");
    }

    #[test]
    fn test_render_imports() {
        let report = ParseReport::new(
            "src/app.ts",
            vec![ImportStatement::new("./routes", 2, ImportKind::Import)],
        );
        let out = OutputFormatter::plain().render_imports(&report);
        assert!(out.starts_with("src/app.ts (typescript)"));
        assert!(out.contains("└─ ./routes [import] (line 2)"));
    }
}
