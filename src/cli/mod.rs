//! CLI argument definitions for threads-mcp.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// threads-mcp - Track threads of activity and serve them over MCP.
///
/// Run `threads-mcp mcp serve` from an MCP client, or use the query
/// commands directly from a terminal.
#[derive(Parser, Debug)]
#[command(name = "threads-mcp")]
#[command(author, version, about = "Track threads of activity and serve them over MCP", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding threads.json (overrides THREADS_DATA_DIR and config.kdl)
    #[arg(long = "data-dir", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.kdl (overrides THREADS_CONFIG)
    #[arg(long = "config", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// MCP server commands
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },

    /// Print the full hierarchy of containers and threads
    Tree,

    /// Suggest the active thread to work on next
    Next,

    /// Search threads and containers by name, description or tag
    Search {
        /// Case-insensitive text to look for
        query: String,
    },

    /// Show a thread, container or group by ID or name
    Show {
        /// Entity ID or name
        identifier: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// MCP subcommands
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start the stdio MCP server
    Serve,

    /// Output tool and resource definitions as JSON
    Manifest,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration values and where each came from
    Show,
}
