use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use body_assessment::config::{default_config, load_config, WizardConfig};
use body_assessment::persistence::{PersistenceAdapter, SqliteStore};
use body_assessment::session::STEP_COUNT;

#[derive(Parser, Debug)]
#[command(name = "body-assessment", version)]
#[command(about = "Inspect or clear the saved body assessment", long_about = None)]
struct Cli {
    /// Wizard configuration file (defaults to the built-in settings)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print a summary of the saved session
    Status,
    /// Clear the saved session
    Reset,
}

fn main() -> Result<()> {
    body_assessment::init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => default_config(),
    };
    let adapter = open_adapter(&config)?;

    match cli.command {
        Command::Status => print!("{}", status_report(&adapter)?),
        Command::Reset => {
            reset(&adapter)?;
            println!("Saved assessment cleared.");
        }
    }
    Ok(())
}

fn open_adapter(config: &WizardConfig) -> Result<PersistenceAdapter> {
    let store = SqliteStore::open(&config.database_path()).map_err(|e| anyhow!(e))?;
    Ok(PersistenceAdapter::new(Box::new(store), &config.storage.prefix))
}

fn status_report(adapter: &PersistenceAdapter) -> Result<String> {
    let Some(snapshot) = adapter.load()? else {
        return Ok("No saved assessment.\n".to_string());
    };

    let mut out = String::new();
    writeln!(out, "Saved:   {}", snapshot.timestamp.format("%d %B %Y at %H:%M UTC"))?;
    writeln!(out, "Screen:  {}", snapshot.current_screen)?;
    writeln!(
        out,
        "Photos:  step {} ({} of {} captured before saving)",
        snapshot.current_photo_step,
        snapshot.photos_captured.count(),
        STEP_COUNT
    )?;

    let data = &snapshot.user_data;
    if let (Some(weight), Some(height), Some(age)) = (data.weight, data.height, data.age) {
        let gender = data.gender.map(|g| g.as_str()).unwrap_or("-");
        writeln!(out, "User:    {} kg, {} cm, {} years, {}", weight, height, age, gender)?;
    }

    if let Some(results) = &snapshot.analysis_results {
        let shown = results.display();
        writeln!(
            out,
            "Results: BMI {} ({}), body fat {}%, {}",
            shown.bmi,
            results.bmi_category.label(),
            shown.body_fat,
            results.body_type
        )?;
    }
    Ok(out)
}

fn reset(adapter: &PersistenceAdapter) -> Result<()> {
    adapter.clear()?;
    info!("Saved assessment cleared");
    Ok(())
}
