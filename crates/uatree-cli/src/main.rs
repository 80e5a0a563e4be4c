//! uatree CLI - inspect an OPC UA server's address space

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uatree_core::prelude::*;
use uatree_core::report::time_spent_line;

#[derive(Parser)]
#[command(name = "uatree")]
#[command(author, version, about = "Inspect an OPC UA server's address space", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the address space below a root node as a nested tree
    Browse(BrowseArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct BrowseArgs {
    /// Server URL, e.g. opc.tcp://localhost:4840 (default: session.server_url)
    #[arg(short, long)]
    server: Option<String>,

    /// Depth of browsing (default: unlimited)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    depth: Option<u32>,

    /// Root node, as `ns=<index>;i=<id>`, `ns=<index>;s=<name>` or `<namespaceIndex>,<identifier>`
    #[arg(short, long)]
    root: Option<NodeRef>,

    /// Print both id and name
    #[arg(short, long)]
    verbose: bool,

    /// Redirect output to file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print total time spent
    #[arg(short, long)]
    time: bool,

    /// Browse an address space snapshot (JSON) instead of a live server
    #[arg(long, conflicts_with = "server")]
    snapshot: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

fn main() -> ExitCode {
    // Logs go to stderr, stdout carries the tree
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uatree=warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Browse(args) => cmd_browse(args),
        Commands::Config { action } => cmd_config(action, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(error) => {
            eprintln!("Error [{}]: {}", error.code(), error);
            if let Some(suggestion) = error.suggestion() {
                eprintln!("  hint: {}", suggestion);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn cmd_browse(args: BrowseArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let options = config
        .browse
        .options(args.depth.map(|d| d as usize), args.verbose);

    let (client, snapshot_root): (Box<dyn AddressSpaceClient>, Option<NodeRef>) =
        match &args.snapshot {
            Some(path) => {
                let snapshot = SnapshotClient::load(path)?;
                let root = snapshot.root().cloned();
                (Box::new(snapshot), root)
            }
            None => (connect(&config, args.server)?, None),
        };
    let root = args
        .root
        .or(snapshot_root)
        .unwrap_or_else(|| config.browse.root.clone());

    let mut sink: Box<dyn Write> = match &args.file {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    let started = Instant::now();
    let browser = TreeBrowser::with_options(client, options);
    let stats = browser.browse(&root, sink.as_mut())?;

    if args.time {
        writeln!(sink, "{}", time_spent_line(started.elapsed()))?;
    }
    sink.flush()?;

    info!(
        root = %root,
        nodes = stats.nodes,
        browse_calls = stats.browse_calls,
        failures = stats.failures,
        capped = stats.capped,
        "done"
    );
    Ok(())
}

#[cfg(feature = "opcua")]
fn connect(config: &Config, server: Option<String>) -> anyhow::Result<Box<dyn AddressSpaceClient>> {
    use uatree_core::session::OpcUaSession;

    let mut session_config = config.session.clone();
    if let Some(url) = server {
        session_config.server_url = url;
    }
    let session = OpcUaSession::connect(&session_config, Config::config_dir()?.join("pki"))?;
    Ok(Box::new(session))
}

#[cfg(not(feature = "opcua"))]
fn connect(_config: &Config, _server: Option<String>) -> anyhow::Result<Box<dyn AddressSpaceClient>> {
    anyhow::bail!("built without OPC UA support; rebuild with the `opcua` feature or pass --snapshot")
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
