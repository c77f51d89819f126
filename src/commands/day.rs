use anyhow::Result;
use chrono::{NaiveDate, Utc};
use colored::Colorize;

use crate::{cli::DayCmd, db::DB, models::WorkoutDay, storage};

use super::{day_id_by_index, load_by_input, week_id_by_number};

pub async fn handle(cmd: DayCmd, pool: &DB) -> Result<()> {
    match cmd {
        DayCmd::Add {
            program,
            week,
            name,
            desc,
            rest,
            date,
        } => {
            let scheduled = match date {
                Some(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                    Ok(d) => Some(d),
                    Err(_) => {
                        println!("{} invalid date `{}` (want YYYY-MM-DD)", "error:".red().bold(), s);
                        return Ok(());
                    }
                },
                None => None,
            };

            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(week_id) = week_id_by_number(&prog, week) else {
                println!("{} no week {} in `{}`", "error:".red().bold(), week, prog.name);
                return Ok(());
            };

            match prog.add_day(&week_id, WorkoutDay::new(&name, desc, rest, scheduled)) {
                Ok(_) => {
                    storage::save_program(pool, &prog).await?;
                    let kind = if rest { " (rest day)" } else { "" };
                    println!(
                        "{} added {}{} to week {}",
                        "ok:".green().bold(),
                        name.bold(),
                        kind,
                        week
                    );
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        DayCmd::Complete { program, week, day } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(day_id) = day_id_by_index(&prog, week, day) else {
                println!(
                    "{} no day at index {} in week {}",
                    "error:".red().bold(),
                    day,
                    week
                );
                return Ok(());
            };

            let now = Utc::now();
            let Some(target) = prog.day_mut(&day_id) else {
                return Ok(());
            };
            let cascaded = target
                .exercises
                .iter()
                .flat_map(|e| e.sets.iter())
                .filter(|s| !s.is_completed)
                .count();
            target.complete(now);
            storage::save_program(pool, &prog).await?;

            println!(
                "{} day completed ({} open sets stamped)",
                "ok:".green().bold(),
                cascaded
            );
        }
    }

    Ok(())
}
