// Command line driver: reads a context JSON file, runs one generation and
// prints the normalized result.
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use gm_forge::{ContentGenerator, GenerationContext, NpcContext, OpenAIBackend, Settings, logging};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "gm_forge")]
#[command(author, version, about = "Generate validated session events and NPCs", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./data/settings.json when present).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory for log.txt (defaults to ~/gm_forge/data).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the next event for a session from a GenerationContext JSON file.
    Event { context: PathBuf },
    /// Generate an NPC from an NpcContext JSON file.
    Npc { context: PathBuf },
}

fn read_json(path: &Path) -> Result<Value> {
    let data = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::load_settings_from_file(path)?.with_env_overrides(),
        None => Settings::load()?,
    };
    if let Err(e) = logging::init(cli.log_dir.clone(), settings.debug_mode) {
        eprintln!("Logging disabled: {}", e);
    }

    let backend = OpenAIBackend::from_settings(&settings)
        .map_err(|e| eyre!("{} Set {} or add it to the settings file.", e, gm_forge::settings::API_KEY_ENV))?;
    log::info!("gm_forge start: {} model={}", chrono::Local::now(), backend.model());
    let generator = ContentGenerator::new(backend, &settings);

    let output = match &cli.command {
        Command::Event { context } => {
            let context = GenerationContext::from_value(read_json(context)?)?;
            serde_json::to_string_pretty(&generator.generate_event(&context).await?)?
        }
        Command::Npc { context } => {
            let context = NpcContext::from_value(read_json(context)?)?;
            serde_json::to_string_pretty(&generator.generate_npc(&context).await?)?
        }
    };
    println!("{}", output);
    Ok(())
}
