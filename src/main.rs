//! CLI entry point for quire

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quire::{commands, Quire};

#[derive(Parser)]
#[command(name = "quire")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Content ingestion and permalink resolution for a static blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new post, page or draft
    New {
        /// Layout to use (post, page, draft)
        #[arg(short, long)]
        layout: Option<String>,

        /// Title of the new item
        title: String,

        /// File name (without extension) inside the target directory
        #[arg(short, long)]
        path: Option<String>,
    },

    /// List site content
    #[command(alias = "ls")]
    List {
        /// Type of content to list (post, page, draft, tag, category)
        #[arg(default_value = "post")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show every permalink and the file it is written to
    Routes {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug { "quire=debug,info" } else { "quire=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::New {
            layout,
            title,
            path,
        } => {
            let quire = Quire::new(&base_dir)?;
            commands::new::run(&quire, &title, layout.as_deref(), path.as_deref())?;
        }

        Commands::List { r#type, json } => {
            let quire = Quire::new(&base_dir)?;
            commands::list::run(&quire, &r#type, json)?;
        }

        Commands::Routes { json } => {
            let quire = Quire::new(&base_dir)?;
            commands::routes::run(&quire, json)?;
        }

        Commands::Clean => {
            let quire = Quire::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            if commands::clean::run(&quire)? {
                println!("Cleaned successfully!");
            }
        }

        Commands::Version => {
            println!("quire version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
