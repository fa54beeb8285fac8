//! threads-mcp CLI - Track threads of activity and serve them over MCP.

use clap::Parser;
use std::process;
use threads::cli::{Cli, Commands, ConfigCommands, McpCommands};
use threads::commands::{self, Output};
use threads::config::{ConfigOverrides, ResolvedConfig, resolve_config};
use threads::mcp;
use threads::storage::Store;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let overrides = ConfigOverrides {
        data_dir: cli.data_dir,
        config_path: cli.config,
    };

    let result = resolve_config(&overrides).and_then(|config| {
        init_tracing(&config);
        run_command(cli.command, &config, human)
    });

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Log to stderr; stdout is reserved for command output and JSON-RPC.
fn init_tracing(config: &ResolvedConfig) {
    let filter = EnvFilter::try_new(config.log_level())
        .unwrap_or_else(|_| EnvFilter::new(threads::config::resolver::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(command: Commands, config: &ResolvedConfig, human: bool) -> threads::Result<()> {
    let store = Store::new(config.store_paths());

    match command {
        Commands::Mcp { command } => match command {
            McpCommands::Serve => mcp::serve(store)?,
            McpCommands::Manifest => {
                let manifest = mcp::manifest();
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            }
        },
        Commands::Tree => output(&commands::tree(&store)?, human),
        Commands::Next => output(&commands::next(&store)?, human),
        Commands::Search { query } => output(&commands::search(&store, &query)?, human),
        Commands::Show { identifier } => output(&commands::show(&store, &identifier)?, human),
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(config), human),
        },
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
