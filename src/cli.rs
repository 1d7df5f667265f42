//! CLI argument parsing and command handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::formatter::{to_json, GraphFormat, OutputFormatter};
use crate::graph::GraphBuilder;
use crate::models::ParseReport;
use crate::output;
use crate::parsers::{ImportParser, SourceParser};
use crate::repo::{FixedRoot, RepoStore};

/// repograph: file-level dependency graphs for JavaScript/TypeScript repositories
#[derive(Parser, Debug)]
#[command(
    name = "rgraph",
    version,
    about = "Build file dependency graphs of JavaScript/TypeScript repositories",
    long_about = "repograph walks a repository checkout, extracts ES module imports, \
                  CommonJS requires and dynamic imports with Tree-sitter, resolves them \
                  to repository files and prints the resulting graph.\n\n\
                  Checkouts live under <repos_dir>/<owner>/<name> (see 'rgraph config')."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: ./repograph.toml, then ~/.repograph/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the dependency graph of a repository
    ///
    /// Examples:
    ///   rgraph graph octocat hello                     # Whole repository
    ///   rgraph graph octocat hello --folder backend    # One folder only
    ///   rgraph graph local app --path ~/src/app -f dot # Any directory
    Graph {
        /// Repository owner
        owner: String,

        /// Repository name
        name: String,

        /// Only analyze this folder (relative to the repository root)
        #[arg(long)]
        folder: Option<String>,

        /// Analyze this directory instead of <repos_dir>/<owner>/<name>
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,

        /// Output format: tree (default), table, dot, json
        #[arg(short = 'f', long, default_value = "tree")]
        format: String,

        /// Output as JSON (same as --format json)
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Show a progress bar while parsing
        #[arg(long)]
        progress: bool,

        /// Use plain text output (disable colors)
        #[arg(long)]
        plain: bool,
    },

    /// List the raw imports of a single file
    Imports {
        /// Source file to parse
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Clone a GitHub repository into the repos directory
    Clone {
        /// Repository URL (https://github.com/<owner>/<name> or git@github.com:<owner>/<name>.git)
        url: String,

        /// Folder to analyze later; checked to exist after cloning
        #[arg(long)]
        folder: Option<String>,
    },

    /// Start a local HTTP API server
    Serve {
        /// Port to listen on (default from config, 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config, 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",   // Default: only warnings and errors
            1 => "info",   // -v: show info messages
            2 => "debug",  // -vv: show debug messages
            _ => "trace",  // -vvv: show trace messages
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Command::Graph { owner, name, folder, path, format, json, pretty, progress, plain } => {
                handle_graph(&config, owner, name, folder, path, format, json, pretty, progress, plain)
            }
            Command::Imports { file, json, pretty } => {
                handle_imports(file, json, pretty)
            }
            Command::Clone { url, folder } => {
                handle_clone(&config, url, folder)
            }
            Command::Serve { port, host } => {
                handle_serve(config, port, host)
            }
            Command::Config => {
                handle_config(&config)
            }
        }
    }
}

/// Handle the `graph` subcommand
#[allow(clippy::too_many_arguments)]
fn handle_graph(
    config: &Config,
    owner: String,
    name: String,
    folder: Option<String>,
    path: Option<PathBuf>,
    format: String,
    as_json: bool,
    pretty_json: bool,
    show_progress: bool,
    plain: bool,
) -> Result<()> {
    // JSON mode overrides format
    let format: GraphFormat = if as_json {
        GraphFormat::Json
    } else {
        format
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown format '{}'. Supported: tree, table, dot, json", format))?
    };

    let start = Instant::now();
    let response = match path {
        Some(dir) => GraphBuilder::new(FixedRoot(dir), SourceParser::new())
            .with_config(&config.graph)
            .with_progress(show_progress)
            .build_response(&owner, &name, folder.as_deref())?,
        None => GraphBuilder::from_config(config)
            .with_progress(show_progress)
            .build_response(&owner, &name, folder.as_deref())?,
    };
    let elapsed = start.elapsed();

    let formatter = OutputFormatter::new(plain);
    print!("{}", formatter.render_graph(&response, format, pretty_json)?);
    if format == GraphFormat::Json {
        println!();
    }

    eprintln!(
        "Found {} files, {} imports ({}) in {:.2?}",
        response.stats.total_files, response.stats.total_imports, response.stats.analyzed_folder, elapsed
    );

    Ok(())
}

/// Handle the `imports` subcommand
fn handle_imports(file: PathBuf, as_json: bool, pretty_json: bool) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let path = file.to_string_lossy().replace('\\', "/");
    let imports = SourceParser::new().parse_imports(&path, &content)?;
    let report = ParseReport::new(path, imports);

    if report.language.is_none() {
        output::warn(&format!(
            "{} is not a JavaScript/TypeScript file (.js, .jsx, .ts, .tsx)",
            file.display()
        ));
    }

    if as_json {
        println!("{}", to_json(&report, pretty_json)?);
    } else {
        print!("{}", OutputFormatter::new(false).render_imports(&report));
        eprintln!("\nFound {} imports", report.import_count);
    }

    Ok(())
}

/// Handle the `clone` subcommand
fn handle_clone(config: &Config, url: String, folder: Option<String>) -> Result<()> {
    let store = RepoStore::new(&config.repos_dir);
    let info = store.clone_repo(&url, folder.as_deref())?;

    output::success(&format!("Repository {}/{} ready at {}", info.owner, info.name, info.local_path.display()));
    match info.analyzed_folder {
        Some(folder) => println!("Next: rgraph graph {} {} --folder {}", info.owner, info.name, folder),
        None => println!("Next: rgraph graph {} {}", info.owner, info.name),
    }

    Ok(())
}

/// Handle the `serve` subcommand
fn handle_serve(mut config: Config, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    log::info!("Starting HTTP server on {}:{}", config.server.host, config.server.port);

    println!("Starting repograph HTTP server...");
    println!("  Address: http://{}:{}", config.server.host, config.server.port);
    println!("  Repos:   {}", config.repos_dir.display());
    println!("\nEndpoints:");
    println!("  GET  /health");
    println!("  GET  /api/graph?owner=<owner>&name=<name>&folder=<folder>");
    println!("  GET  /api/parse/test?owner=<owner>&name=<name>&path=<path>");
    println!("  GET  /api/file?owner=<owner>&name=<name>&path=<path>");
    println!("  POST /api/repo/clone");
    println!("  DELETE /api/repo?owner=<owner>&name=<name>");
    println!("\nPress Ctrl+C to stop.");

    // Start the server using tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::server::run_server(config))
}

/// Handle the `config` subcommand
fn handle_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_graph_command() {
        let cli = Cli::parse_from([
            "rgraph", "-vv", "graph", "octocat", "hello", "--folder", "backend", "-f", "dot",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Graph { owner, name, folder, format, json, .. } => {
                assert_eq!(owner, "octocat");
                assert_eq!(name, "hello");
                assert_eq!(folder.as_deref(), Some("backend"));
                assert_eq!(format, "dot");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["rgraph", "config", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Command::Config));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.js"), "").unwrap();

        let err = handle_graph(
            &Config::default(),
            "o".to_string(),
            "n".to_string(),
            None,
            Some(temp.path().to_path_buf()),
            "xml".to_string(),
            false,
            false,
            false,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown format"));
    }
}
