use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use djvlaunch_core::{logging, ActionConfig, ActionEvent, DjvViewAction, JsonCatalog};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "djvlaunch", version, about = "Discover DJV View installations and launch them on catalog media")]
struct Cli {
    /// Action configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Set the logging output verbosity.
    #[arg(short, long, global = true, default_value = "info", value_parser = logging::LEVELS)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered viewers, optionally filtered by a discover event.
    Discover {
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Handle a launch event against a catalog file.
    Launch {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        event: PathBuf,
    },
    /// Print a sequence path with its frame directive replaced by the range on disk.
    ResolveSequence { path: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.verbosity);

    let config = match &cli.config {
        Some(path) => ActionConfig::load(path)?,
        None => ActionConfig::default(),
    };

    match cli.command {
        Commands::Discover { event } => {
            let action = DjvViewAction::new(config)?;
            let response = match event {
                Some(path) => serde_json::to_value(action.discover(&read_event(&path)?))?,
                None => serde_json::json!({ "items": action.items() }),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Launch { catalog, event } => {
            let catalog = JsonCatalog::load(&catalog)?;
            let event = read_event(&event)?;
            let action = DjvViewAction::new(config)?;
            let response = action.launch(&catalog, &event)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::ResolveSequence { path } => {
            let resolved = djvlaunch_core::sequence::resolve(&path, djvlaunch_core::sequence::file_extension(&path))?;
            println!("{resolved}");
        }
    }

    Ok(())
}

fn read_event(path: &Path) -> Result<ActionEvent> {
    let content = fs::read_to_string(path).context(format!("Failed to read event file: {:?}", path))?;
    serde_json::from_str(&content).context(format!("Failed to parse event file: {:?}", path))
}
