use anyhow::Result;
use colored::Colorize;

use crate::{cli::WeekCmd, db::DB, storage};

use super::{load_by_input, week_id_by_number};

pub async fn handle(cmd: WeekCmd, pool: &DB) -> Result<()> {
    match cmd {
        WeekCmd::Add {
            program,
            number,
            notes,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            match prog.add_week(number, notes) {
                Ok(_) => {
                    storage::save_program(pool, &prog).await?;
                    println!("{} added week {} to {}", "ok:".green().bold(), number, prog.name.bold());
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        WeekCmd::Complete {
            program,
            week,
            reopen,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(week_id) = week_id_by_number(&prog, week) else {
                println!("{} no week {} in `{}`", "error:".red().bold(), week, prog.name);
                return Ok(());
            };

            match prog.update_week(&week_id, !reopen, None) {
                Ok(_) => {
                    storage::save_program(pool, &prog).await?;
                    let verb = if reopen { "reopened" } else { "completed" };
                    println!("{} week {} {}", "ok:".green().bold(), week, verb);
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        WeekCmd::Copy {
            program,
            source,
            target,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(source_id) = week_id_by_number(&prog, source) else {
                println!("{} no week {} in `{}`", "error:".red().bold(), source, prog.name);
                return Ok(());
            };

            match prog.copy_week(&source_id, target) {
                Ok(week) => {
                    let days = week.days.len();
                    storage::save_program(pool, &prog).await?;
                    println!(
                        "{} copied week {} to week {} ({} days, completion reset)",
                        "ok:".green().bold(),
                        source,
                        target,
                        days
                    );
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        WeekCmd::CopyContent {
            program,
            source,
            target,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let (Some(source_id), Some(target_id)) = (
                week_id_by_number(&prog, source),
                week_id_by_number(&prog, target),
            ) else {
                println!(
                    "{} both week {} and week {} must exist in `{}`",
                    "error:".red().bold(),
                    source,
                    target,
                    prog.name
                );
                return Ok(());
            };

            match prog.copy_week_content(&source_id, &target_id) {
                Ok(week) => {
                    let days = week.days.len();
                    storage::save_program(pool, &prog).await?;
                    println!(
                        "{} appended week {}'s days into week {} ({} days total)",
                        "ok:".green().bold(),
                        source,
                        target,
                        days
                    );
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }
    }

    Ok(())
}
