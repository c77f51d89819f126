use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::{cli::ConfigCmd, types::Config};

pub fn handle(cmd: ConfigCmd, path: &Path) -> Result<()> {
    let mut config = Config::load(path)?;

    match cmd {
        ConfigCmd::List => {
            if config.map.is_empty() {
                println!("{} no config set", "warning:".yellow().bold());
                return Ok(());
            }
            for (key, val) in &config.map {
                println!("{} = {}", key.bold(), val);
            }
        }

        ConfigCmd::Get { key } => match config.map.get(&key) {
            Some(val) => println!("{}", val),
            None => println!("{} key '{}' is not set", "warning:".yellow().bold(), key),
        },

        ConfigCmd::Set { key, val } => {
            config.map.insert(key.clone(), val.clone());
            config.save(path)?;
            println!("{} {} = {}", "ok:".green().bold(), key.bold(), val);
        }

        ConfigCmd::Unset { key } => {
            if config.map.remove(&key).is_some() {
                config.save(path)?;
                println!("{} removed '{}'", "ok:".green().bold(), key);
            } else {
                println!("{} key '{}' is not set", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
