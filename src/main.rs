//! Replays a script of editor events against an in-memory store and prints
//! the resulting annotations as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use labelkit::config::EditorConfig;
use labelkit::replay::{self, ReplayError, ReplayScript};
use labelkit::session::Session;
use labelkit::store::MemoryStore;

#[derive(Parser)]
#[command(name = "labelkit-replay")]
#[command(about = "Replay annotation editor events and print the final annotations")]
#[command(version)]
struct Cli {
    /// JSON file containing the list of events
    script: PathBuf,

    /// Config file path (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ReplayError> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_from_default_path().unwrap_or_default(),
    };

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.preferences.log_level.to_level_filter()
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let script = ReplayScript::load(&cli.script)?;
    let mut session = Session::with_config(MemoryStore::new(), &config);
    let report = pollster::block_on(replay::replay(&mut session, &config.keybindings, &script));

    if !report.errors.is_empty() {
        log::warn!("{} of {} events failed", report.errors.len(), report.events);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
