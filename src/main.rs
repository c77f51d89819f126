use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use types::{Config, OutputFmt};

mod analytics;
mod cli;
mod commands;
mod copy;
mod db;
mod error;
mod models;
mod program;
mod storage;
mod superset;
mod types;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    let config_path = dirs::config_dir()
        .context("could not determine the config directory")?
        .join("periodize")
        .join("config.toml");

    // Config edits never need the database.
    let cmd = match cli.cmd {
        Commands::Config(cmd) => return commands::config::handle(cmd, &config_path),
        other => other,
    };

    let config = Config::load(&config_path)?;

    let data_dir = dirs::data_dir()
        .context("could not determine the data directory")?
        .join("periodize");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating `{}`", data_dir.display()))?;
    let db_url = format!("sqlite://{}", data_dir.join("periodize.db").display());
    let pool = db::open(&db_url).await?;

    match cmd {
        Commands::Program(cmd) => commands::program::handle(cmd, &pool, fmt, &config).await,
        Commands::Week(cmd) => commands::week::handle(cmd, &pool).await,
        Commands::Day(cmd) => commands::day::handle(cmd, &pool).await,
        Commands::Workout(cmd) => commands::workout::handle(cmd, &pool).await,
        Commands::Set(cmd) => commands::set::handle(cmd, &pool).await,
        Commands::Exercise(cmd) => commands::exercise::handle(cmd, &pool, fmt).await,
        Commands::Stats(cmd) => commands::stats::handle(cmd, &pool, fmt, &config).await,
        Commands::Config(_) => unreachable!("handled above"),
    }
}
