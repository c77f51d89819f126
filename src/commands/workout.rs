use anyhow::Result;
use colored::Colorize;
use uuid::Uuid;

use crate::{cli::WorkoutCmd, db::DB, models::WorkoutExercise, storage};

use super::{day_id_by_index, exercise_id_by_index, load_by_input};

pub async fn handle(cmd: WorkoutCmd, pool: &DB) -> Result<()> {
    match cmd {
        WorkoutCmd::Add {
            program,
            week,
            day,
            exercise,
            sets,
            reps,
            weight,
            duration,
            distance,
            rest,
            rpe,
        } => {
            // The definition must exist before an exercise slot may
            // reference it.
            let Some(def_id) = storage::resolve_definition(pool, &exercise).await? else {
                println!("{} no exercise `{}` in the catalogue", "error:".red().bold(), exercise);
                return Ok(());
            };
            let def_name = storage::get_definition(pool, &def_id)
                .await?
                .map(|d| d.name)
                .unwrap_or_else(|| exercise.clone());

            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(day_id) = day_id_by_index(&prog, week, day) else {
                println!("{} no day at index {} in week {}", "error:".red().bold(), day, week);
                return Ok(());
            };

            let Some(target_day) = prog.day_mut(&day_id) else {
                return Ok(());
            };
            target_day.add_exercise(WorkoutExercise {
                id: Uuid::new_v4().to_string(),
                exercise_id: def_id,
                order_index: 0,
                target_sets: sets,
                target_reps: reps,
                target_weight: weight,
                target_duration_seconds: duration,
                target_distance: distance,
                rest_seconds: rest,
                target_rpe: rpe,
                superset_group_id: None,
                superset_rest_seconds: None,
                sets: Vec::new(),
            });
            storage::save_program(pool, &prog).await?;

            println!(
                "{} added {} to week {} day {} ({} sets of {})",
                "ok:".green().bold(),
                def_name.bold(),
                week,
                day,
                sets,
                reps
            );
        }

        WorkoutCmd::Remove {
            program,
            week,
            day,
            exercise,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(ex_id) = exercise_id_by_index(&prog, week, day, exercise) else {
                println!("{} no exercise at index {}", "error:".red().bold(), exercise);
                return Ok(());
            };
            let Some(day_id) = day_id_by_index(&prog, week, day) else {
                return Ok(());
            };

            let removed = prog
                .day_mut(&day_id)
                .is_some_and(|d| d.remove_exercise(&ex_id));
            if removed {
                storage::save_program(pool, &prog).await?;
                println!("{} exercise removed", "ok:".green().bold());
            } else {
                println!("{} exercise not found", "error:".red().bold());
            }
        }

        WorkoutCmd::Reorder {
            program,
            week,
            day,
            order,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(day_id) = day_id_by_index(&prog, week, day) else {
                println!("{} no day at index {} in week {}", "error:".red().bold(), day, week);
                return Ok(());
            };

            // Map 1-based display indices to ids; unknown indices fall
            // through to the domain check, which rejects the list.
            let ordered_ids: Vec<String> = order
                .iter()
                .filter_map(|&i| exercise_id_by_index(&prog, week, day, i))
                .collect();

            let Some(target_day) = prog.day_mut(&day_id) else {
                return Ok(());
            };
            match target_day.reorder_exercises(&ordered_ids) {
                Ok(()) => {
                    storage::save_program(pool, &prog).await?;
                    println!("{} exercises reordered", "ok:".green().bold());
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        WorkoutCmd::Superset {
            program,
            week,
            day,
            exercises,
            rest,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(day_id) = day_id_by_index(&prog, week, day) else {
                println!("{} no day at index {} in week {}", "error:".red().bold(), day, week);
                return Ok(());
            };

            let ids: Vec<String> = exercises
                .iter()
                .filter_map(|&i| exercise_id_by_index(&prog, week, day, i))
                .collect();
            if ids.len() != exercises.len() {
                println!("{} some exercise indices do not exist in that day", "error:".red().bold());
                return Ok(());
            }

            let Some(target_day) = prog.day_mut(&day_id) else {
                return Ok(());
            };
            match target_day.group_superset(&ids, rest) {
                Ok(group) => {
                    storage::save_program(pool, &prog).await?;
                    println!(
                        "{} superset of {} exercises (group {}, rest {}s)",
                        "ok:".green().bold(),
                        ids.len(),
                        &group[..8],
                        rest
                    );
                }
                Err(e) => println!("{} {}", "error:".red().bold(), e),
            }
        }

        WorkoutCmd::Ungroup { program, group } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            // `p show` abbreviates group ids; accept a prefix.
            let full_id = prog
                .weeks
                .iter()
                .flat_map(|w| w.days.iter())
                .flat_map(|d| d.exercises.iter())
                .filter_map(|e| e.superset_group_id.as_deref())
                .find(|g| g.starts_with(&group))
                .map(str::to_string);

            match full_id {
                Some(id) if prog.ungroup_superset(&id) => {
                    storage::save_program(pool, &prog).await?;
                    println!("{} superset dissolved", "ok:".green().bold());
                }
                _ => println!(
                    "{} no superset group `{}` in `{}`",
                    "error:".red().bold(),
                    group,
                    prog.name
                ),
            }
        }

        WorkoutCmd::Dropset {
            program,
            week,
            day,
            exercise,
            weight,
            reps,
            drops,
            percent,
            reps_adjust,
        } => {
            let Some(mut prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };
            let Some(day_id) = day_id_by_index(&prog, week, day) else {
                println!("{} no day at index {} in week {}", "error:".red().bold(), day, week);
                return Ok(());
            };
            let Some(ex_id) = exercise_id_by_index(&prog, week, day, exercise) else {
                println!("{} no exercise at index {}", "error:".red().bold(), exercise);
                return Ok(());
            };

            let Some(target_ex) = prog
                .day_mut(&day_id)
                .and_then(|d| d.exercise_mut(&ex_id))
            else {
                return Ok(());
            };
            let generated: Vec<(u32, f32, u32)> = target_ex
                .generate_drop_sets(weight, reps, drops, percent, reps_adjust)
                .iter()
                .map(|s| (s.set_number, s.weight.unwrap_or(0.0), s.reps.unwrap_or(0)))
                .collect();
            storage::save_program(pool, &prog).await?;

            println!("{} drop-set sequence generated:", "ok:".green().bold());
            for (number, w, r) in generated {
                println!("  set {} • {}kg × {}", format!("{}", number).yellow(), w, r);
            }
        }
    }

    Ok(())
}
