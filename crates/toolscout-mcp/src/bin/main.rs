//! toolscout command-line interface
//!
//! Scans directories for Python tools, asks for recommendations, and runs the
//! MCP server over stdio or HTTP.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use toolscout_analysis::{scan_directory, ScanOptions, ScanReport};
use toolscout_core::{LogFormat, ToolscoutConfig};
use toolscout_mcp::tools::ScanOutput;
use toolscout_mcp::{HttpTransport, McpServer, StdioTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "toolscout")]
#[command(version, about = "Discover Python tools and recommend them for tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "TOOLSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and print the discovered tools
    Scan {
        /// Directory to scan
        dir: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Include each tool's code excerpt
        #[arg(long)]
        with_code: bool,
    },

    /// Recommend a discovered tool for a task description
    Recommend {
        /// What the tool should do
        query: String,

        /// Number of candidates to rank
        #[arg(long, default_value_t = 1)]
        top_k: usize,

        /// Directory to scan; defaults to the configured scan root
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Run the MCP server
    Serve {
        #[command(subcommand)]
        transport: ServeTransport,
    },
}

#[derive(Subcommand)]
enum ServeTransport {
    /// Serve over stdin/stdout
    Stdio,

    /// Serve over HTTP
    Http {
        /// Bind address; defaults to the configured address
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ToolscoutConfig::load_from_path(path).await,
        None => ToolscoutConfig::load().await,
    }
    .context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.general_mut().log_level = level.clone();
    }
    if cli.log_json {
        config.general_mut().log_format = LogFormat::Json;
    }
    init_logging(&config);

    match cli.command {
        Commands::Scan {
            dir,
            json,
            with_code,
        } => {
            let options = ScanOptions::from(config.scan());
            let report = tokio::task::spawn_blocking(move || scan_directory(&dir, &options))
                .await
                .context("Scan task failed")??;
            print_report(&report, json, with_code)?;
        }
        Commands::Recommend { query, top_k, dir } => {
            if let Some(dir) = dir {
                config.scan_mut().root = Some(dir);
            }
            if config.scan().root.is_none() {
                anyhow::bail!("No directory to scan: pass --dir or set SCAN_DIRECTORY");
            }
            let server = McpServer::from_config(&config).await?;
            let result = server
                .call_tool(
                    "recommend_tools",
                    json!({"query_description": query, "top_k": top_k}),
                )
                .await?;
            let text = result.text().unwrap_or("{}");
            let value: serde_json::Value = serde_json::from_str(text)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Serve { transport } => {
            let server = McpServer::from_config(&config).await?;
            match transport {
                ServeTransport::Stdio => {
                    tracing::info!("Starting toolscout MCP server in stdio mode");
                    StdioTransport::new().serve(&server).await?;
                }
                ServeTransport::Http { bind } => {
                    let bind = bind.unwrap_or_else(|| config.server().bind.clone());
                    let addr: SocketAddr = bind
                        .parse()
                        .with_context(|| format!("Invalid bind address: {}", bind))?;
                    tracing::info!("Starting toolscout MCP server in HTTP mode on {}", addr);
                    HttpTransport::new(addr, config.server().path.clone())
                        .serve(Arc::new(server))
                        .await?;
                }
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays free for results and the stdio transport.
fn init_logging(config: &ToolscoutConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general().log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.general().log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_report(report: &ScanReport, json: bool, with_code: bool) -> Result<()> {
    if json {
        let value = if with_code {
            let tools: Vec<_> = report.table.iter().collect();
            json!({
                "success": true,
                "directory": report.root,
                "tools_found": report.table.len(),
                "files_scanned": report.files_scanned,
                "skipped_files": report.skipped,
                "tools": tools,
            })
        } else {
            serde_json::to_value(ScanOutput::from_report(report))?
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Found {} tools in {} ({} files scanned)",
        report.table.len(),
        report.root.display(),
        report.files_scanned
    );
    for tool in report.table.iter() {
        println!();
        println!("{} ({}, {})", tool.name, tool.class_name, tool.file_path.display());
        println!("  {}", tool.description);
        if with_code {
            for line in tool.code.lines() {
                println!("    {}", line);
            }
        }
    }
    if !report.skipped.is_empty() {
        println!();
        println!("Skipped {} files:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.message);
        }
    }
    Ok(())
}
