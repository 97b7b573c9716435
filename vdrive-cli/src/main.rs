use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vdrive::library::Shelf;

mod commands;
mod config;
mod error;
mod interactive;
mod utils;

use error::Result;

#[derive(Parser)]
#[command(name = "vdrive")]
#[command(about = "Virtual drive explorer with a media library")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the drives (first run only)
    Setup {
        /// Number of drives, starting at C:
        #[arg(short, long, default_value = "1")]
        drives: usize,
        /// Capacity in MB of each drive, in order (e.g. -c 2048 -c 512)
        #[arg(short, long)]
        capacity: Vec<u64>,
    },
    /// Show drive usage
    Drives,
    /// List a folder
    Ls {
        /// Folder path (e.g., C:\Windows, D:/Docs)
        #[arg(default_value = "C:\\")]
        path: String,
    },
    /// Show the folder tree
    Tree {
        /// Folder path
        #[arg(default_value = "C:\\")]
        path: String,
        /// Maximum depth to show
        #[arg(short, long, default_value = "3")]
        depth: usize,
    },
    /// Create a folder
    Mkdir {
        /// Parent folder path
        path: String,
        /// Name of the new folder
        name: String,
    },
    /// Save a local file onto a drive
    Save {
        /// Local file to read
        local: PathBuf,
        /// Destination folder
        destination: String,
        /// Name on the drive (defaults to the local file name)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Print or export a saved file
    Cat {
        /// File path (e.g., C:\Docs\notes.txt)
        path: String,
        /// Write the decoded content to this local file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload an image, text or code file to the library and a drive
    Upload {
        /// Local file to read
        local: PathBuf,
        /// Destination folder
        #[arg(default_value = "C:\\")]
        destination: String,
        /// Image description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List library records
    Library {
        /// images or texts (all when omitted)
        shelf: Option<Shelf>,
    },
    /// Show one library record
    Show {
        /// images or texts
        shelf: Shelf,
        /// Record id
        id: u64,
    },
    /// Delete every drive and start over
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Start interactive mode
    Interactive,
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Setup { drives, capacity }) => {
            commands::setup::execute(drives, &capacity).await?;
        }
        Some(Commands::Drives) => {
            commands::drives::execute().await?;
        }
        Some(Commands::Ls { path }) => {
            commands::ls::execute(&path).await?;
        }
        Some(Commands::Tree { path, depth }) => {
            commands::tree::execute(&path, depth).await?;
        }
        Some(Commands::Mkdir { path, name }) => {
            commands::mkdir::execute(&path, &name).await?;
        }
        Some(Commands::Save {
            local,
            destination,
            name,
        }) => {
            commands::save::execute(&local, &destination, name.as_deref()).await?;
        }
        Some(Commands::Cat { path, output }) => {
            commands::cat::execute(&path, output.as_deref()).await?;
        }
        Some(Commands::Upload {
            local,
            destination,
            description,
        }) => {
            commands::upload::execute(&local, &destination, description.as_deref()).await?;
        }
        Some(Commands::Library { shelf }) => {
            commands::library::execute(shelf).await?;
        }
        Some(Commands::Show { shelf, id }) => {
            commands::show::execute(shelf, id).await?;
        }
        Some(Commands::Reset { yes }) => {
            commands::reset::execute(yes).await?;
        }
        Some(Commands::Interactive) | None => {
            interactive::run().await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            utils::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
