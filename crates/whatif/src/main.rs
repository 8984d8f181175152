use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::eyre;
use whatif::presets::{PRESET_NAMES, preset};
use whatif::{ScenarioFile, Session, init_logging};

#[derive(Parser, Debug)]
#[command(name = "whatif")]
#[command(about = "Interactive what-if scenario simulator")]
struct Args {
    /// Scenario definition file (YAML)
    #[arg(short, long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Built-in scenario: finance, alignment or resources
    #[arg(short, long, default_value = "finance")]
    preset: String,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Path to the data directory (default: ~/.whatif/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".whatif")
}

fn load_scenario(args: &Args) -> color_eyre::Result<ScenarioFile> {
    match &args.scenario {
        Some(path) => Ok(ScenarioFile::load(path)?),
        None => preset(&args.preset).ok_or_else(|| {
            eyre!(
                "unknown preset '{}' (available: {})",
                args.preset,
                PRESET_NAMES.join(", ")
            )
        }),
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let scenario = load_scenario(&args)?;
    let mut session = Session::new(scenario)?;
    tracing::info!(scenario = session.name(), "Session started");

    let mut stdout = io::stdout().lock();
    match &args.script {
        Some(path) => {
            let script = BufReader::new(File::open(path)?);
            session.run(script, &mut stdout, false)?;
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            session.run(stdin.lock(), &mut stdout, prompt)?;
        }
    }

    tracing::info!("Session ended");
    Ok(())
}
