//! notesync CLI
//!
//! Command-line tools for notebook backends managed by the sync engine.
//!
//! # Commands
//!
//! - `inspect` - Show configured backends and pending sync work
//! - `list` - List the notes of one backend
//! - `sync` - Reconcile two backends
//! - `checkpoint` - Take a revision of a note on every versioned backend
//! - `history` - Show the revision history of a note
//! - `restore` - Restore a note to a revision
//! - `settings` - Show or update backend settings
//!
//! Backends are selected the same way the engine reads them from the
//! environment (`NOTESYNC_STORAGE` and friends); the global flags override
//! individual values.

mod commands;

use clap::{Parser, Subcommand};
use commands::EngineOptions;
use notesync_storage::Identity;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// notesync command-line tools.
#[derive(Parser)]
#[command(name = "notesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Comma-separated backend identifiers, primary first
    #[arg(global = true, short, long)]
    storage: Option<String>,

    /// Root of the `file` backend
    #[arg(global = true, long)]
    notebook_dir: Option<PathBuf>,

    /// Root of the `file-versioned` backend
    #[arg(global = true, long)]
    versioned_dir: Option<PathBuf>,

    /// Mirror the primary instead of merging both ways
    #[arg(global = true, long)]
    one_way: bool,

    /// Principal to act as
    #[arg(global = true, long, default_value = notesync_storage::ANONYMOUS)]
    principal: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configured backends and pending sync work
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the notes of one backend
    List {
        /// Backend ordinal, 0 is the primary
        #[arg(short, long, default_value = "0")]
        repo: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Reconcile two backends
    Sync {
        /// Ordinal of the source backend
        #[arg(long, default_value = "0")]
        source: usize,

        /// Ordinal of the destination backend
        #[arg(long, default_value = "1")]
        dest: usize,

        /// Dry run - show the plan without applying it
        #[arg(short, long)]
        dry_run: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Take a revision of a note on every versioned backend
    Checkpoint {
        /// Note id
        id: String,

        /// Note path
        path: String,

        /// Checkpoint message
        #[arg(short, long, default_value = "")]
        message: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the revision history of a note
    History {
        /// Note id
        id: String,

        /// Note path
        path: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Restore a note to a revision on every versioned backend
    Restore {
        /// Note id
        id: String,

        /// Note path
        path: String,

        /// Revision id
        revision: String,
    },

    /// Show or update backend settings
    Settings {
        /// Backend identifier to update
        #[arg(short, long, requires = "set")]
        kind: Option<String>,

        /// `name=value` pairs to apply
        #[arg(long, value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = EngineOptions {
        storage: cli.storage,
        notebook_dir: cli.notebook_dir,
        versioned_dir: cli.versioned_dir,
        one_way: cli.one_way,
    };
    let identity = Identity::new(cli.principal);

    match cli.command {
        Commands::Inspect { format } => {
            let engine = commands::open(&options)?;
            commands::inspect::run(&engine, &identity, &format)?;
            engine.close();
        }
        Commands::List { repo, format } => {
            let engine = commands::open(&options)?;
            commands::list::run(&engine, &identity, repo, &format)?;
            engine.close();
        }
        Commands::Sync {
            source,
            dest,
            dry_run,
            format,
        } => {
            let engine = commands::open(&options)?;
            commands::sync::run(&engine, &identity, source, dest, dry_run, &format)?;
            engine.close();
        }
        Commands::Checkpoint {
            id,
            path,
            message,
            format,
        } => {
            let engine = commands::open(&options)?;
            commands::revisions::checkpoint(&engine, &identity, &id, &path, &message, &format)?;
            engine.close();
        }
        Commands::History { id, path, format } => {
            let engine = commands::open(&options)?;
            commands::revisions::history(&engine, &identity, &id, &path, &format)?;
            engine.close();
        }
        Commands::Restore { id, path, revision } => {
            let engine = commands::open(&options)?;
            commands::revisions::restore(&engine, &identity, &id, &path, &revision)?;
            engine.close();
        }
        Commands::Settings { kind, set, format } => {
            let engine = commands::open(&options)?;
            commands::settings::run(&engine, &identity, kind.as_deref(), &set, &format)?;
            engine.close();
        }
        Commands::Version => {
            println!("notesync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("notesync engine v{}", notesync_engine::VERSION);
        }
    }

    Ok(())
}
