use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::{cli::SetCmd, db::DB, program::SetOverrides, storage};

use super::{day_id_by_index, exercise_id_by_index, load_by_input, set_id_by_number};

pub async fn handle(cmd: SetCmd, pool: &DB) -> Result<()> {
    match cmd {
        SetCmd::Add {
            program,
            week,
            day,
            exercise,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some((day_id, ex_id)) = resolve_exercise(&prog, week, day, exercise) else {
                return Ok(());
            };

            let Some(ex) = prog
                .day_mut(&day_id)
                .and_then(|d| d.exercise_mut(&ex_id))
            else {
                return Ok(());
            };
            let number = ex.add_set().set_number;
            storage::save_program(pool, &prog).await?;

            println!("{} added set {}", "ok:".green().bold(), number);
        }

        SetCmd::Edit {
            program,
            week,
            day,
            exercise,
            set,
            reps,
            weight,
            duration,
            distance,
            difficulty,
            intensity,
            notes,
            kind,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some((day_id, ex_id)) = resolve_exercise(&prog, week, day, exercise) else {
                return Ok(());
            };
            let Some(set_id) = set_id_by_number(&prog, week, day, exercise, set) else {
                println!("{} no set {} on that exercise", "error:".red().bold(), set);
                return Ok(());
            };

            let overrides = SetOverrides {
                reps,
                weight,
                duration_seconds: duration,
                distance,
                difficulty,
                intensity,
                notes,
            };

            let Some(ex) = prog
                .day_mut(&day_id)
                .and_then(|d| d.exercise_mut(&ex_id))
            else {
                return Ok(());
            };
            match ex.update_set(&set_id, &overrides) {
                Ok(s) => {
                    if let Some(k) = kind {
                        s.set_type = k;
                    }
                    storage::save_program(pool, &prog).await?;
                    println!("{} updated set {}", "ok:".green().bold(), set);
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        SetCmd::Delete {
            program,
            week,
            day,
            exercise,
            set,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some((day_id, ex_id)) = resolve_exercise(&prog, week, day, exercise) else {
                return Ok(());
            };
            let Some(set_id) = set_id_by_number(&prog, week, day, exercise, set) else {
                println!("{} no set {} on that exercise", "error:".red().bold(), set);
                return Ok(());
            };

            let Some(ex) = prog
                .day_mut(&day_id)
                .and_then(|d| d.exercise_mut(&ex_id))
            else {
                return Ok(());
            };
            match ex.delete_set(&set_id) {
                Ok(()) => {
                    storage::save_program(pool, &prog).await?;
                    println!("{} deleted set {} (remaining sets renumbered)", "ok:".green().bold(), set);
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        SetCmd::Complete {
            program,
            week,
            day,
            exercise,
            set,
            reps,
            weight,
            duration,
            distance,
            difficulty,
            intensity,
            notes,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some((day_id, ex_id)) = resolve_exercise(&prog, week, day, exercise) else {
                return Ok(());
            };
            let Some(set_id) = set_id_by_number(&prog, week, day, exercise, set) else {
                println!("{} no set {} on that exercise", "error:".red().bold(), set);
                return Ok(());
            };

            let overrides = SetOverrides {
                reps,
                weight,
                duration_seconds: duration,
                distance,
                difficulty,
                intensity,
                notes,
            };

            let now = Utc::now();
            let Some(ex) = prog
                .day_mut(&day_id)
                .and_then(|d| d.exercise_mut(&ex_id))
            else {
                return Ok(());
            };
            match ex.complete_set(&set_id, &overrides, now) {
                Ok(s) => {
                    let weight_display = s.weight.map(|w| format!("{}kg", w)).unwrap_or_else(|| "bodyweight".into());
                    let reps_display = s.reps.map(|r| format!(" × {}", r)).unwrap_or_default();
                    storage::save_program(pool, &prog).await?;
                    println!(
                        "{} completed set {} ({}{})",
                        "ok:".green().bold(),
                        set,
                        weight_display,
                        reps_display
                    );
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }
    }

    Ok(())
}

fn resolve_exercise(
    prog: &crate::models::Program,
    week: u32,
    day: usize,
    exercise: usize,
) -> Option<(String, String)> {
    let day_id = day_id_by_index(prog, week, day);
    let ex_id = exercise_id_by_index(prog, week, day, exercise);

    match (day_id, ex_id) {
        (Some(d), Some(e)) => Some((d, e)),
        _ => {
            println!(
                "{} no exercise at week {}, day {}, index {}",
                "error:".red().bold(),
                week,
                day,
                exercise
            );
            None
        }
    }
}
