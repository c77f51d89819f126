use std::collections::HashMap;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use crate::{
    analytics,
    cli::StatsCmd,
    db::DB,
    storage,
    types::{Config, OutputFmt, emit},
    utils::format_duration,
};

use super::load_by_input;

pub async fn handle(cmd: StatsCmd, pool: &DB, fmt: OutputFmt, config: &Config) -> Result<()> {
    match cmd {
        StatsCmd::Weekly { program } => {
            let Some(prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            let weekly = analytics::weekly_progress(&prog);
            emit(fmt, &weekly, || {
                if weekly.is_empty() {
                    println!("{} no weeks in '{}'", "warning:".yellow().bold(), prog.name);
                    return;
                }
                println!("{}", format!("Weekly progress for '{}'", prog.name).bold());
                for m in &weekly {
                    println!(
                        "  week {}: {:.1}kg volume, intensity {:.1}, {}/{} workouts, {} sets / {} reps, {} under load",
                        m.week_number.to_string().cyan(),
                        m.total_volume,
                        m.average_intensity,
                        m.workouts_completed,
                        m.workouts_planned,
                        m.total_sets,
                        m.total_reps,
                        format_duration(m.total_duration_seconds)
                    );
                }
            });
        }

        StatsCmd::Exercises { athlete, exercise } => {
            let athlete = athlete.unwrap_or_else(|| config.athlete().to_string());

            let filter = match exercise {
                Some(input) => match storage::resolve_definition(pool, &input).await? {
                    Some(id) => Some(id),
                    None => {
                        println!("{} exercise '{}' not found", "error:".red().bold(), input);
                        return Ok(());
                    }
                },
                None => None,
            };

            let programs = storage::load_athlete_programs(pool, &athlete).await?;
            let metrics = analytics::exercise_metrics(&programs, filter.as_deref());
            let names = definition_names(pool).await?;

            emit(fmt, &metrics, || {
                if metrics.is_empty() {
                    println!("{} no completed sets for '{}'", "warning:".yellow().bold(), athlete);
                    return;
                }
                for m in &metrics {
                    let name = names.get(&m.exercise_id).map(String::as_str).unwrap_or(&m.exercise_id);
                    println!("{}", name.bold());
                    println!(
                        "  {:.1}kg total volume, max {:.1}kg, {} sets / {} reps",
                        m.total_volume, m.max_weight, m.total_sets, m.total_reps
                    );
                    println!(
                        "  averages: {:.1} reps at {:.1}kg",
                        m.average_reps, m.average_weight
                    );
                    for point in &m.progress {
                        println!(
                            "    {}: {:.1}kg volume, max {:.1}kg, {} reps",
                            point.date, point.volume, point.max_weight, point.reps
                        );
                    }
                }
            });
        }

        StatsCmd::Overall { athlete } => {
            let athlete = athlete.unwrap_or_else(|| config.athlete().to_string());
            let programs = storage::load_athlete_programs(pool, &athlete).await?;
            let stats = analytics::overall_stats(&programs, Local::now().date_naive());

            emit(fmt, &stats, || {
                println!("{}", format!("Overall stats for '{}'", athlete).bold());
                println!("  workouts completed: {}", stats.total_workouts_completed);
                println!("  sets completed:     {}", stats.total_sets_completed);
                println!("  reps performed:     {}", stats.total_reps_performed);
                println!("  volume lifted:      {:.1}kg", stats.total_volume_lifted);
                println!("  time under load:    {}", format_duration(stats.total_training_seconds));
                println!(
                    "  streak:             {} current / {} longest",
                    stats.current_streak.to_string().green().bold(),
                    stats.longest_streak
                );
            });
        }

        StatsCmd::Trends { program } => {
            let Some(prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            let trends = analytics::intensity_trends(&prog);
            emit(fmt, &trends, || {
                if trends.is_empty() {
                    println!("{} no weeks in '{}'", "warning:".yellow().bold(), prog.name);
                    return;
                }
                println!("{}", format!("Intensity trends for '{}'", prog.name).bold());
                for t in &trends {
                    let label = match t.trend {
                        analytics::Trend::Increasing => t.trend.to_string().green().bold(),
                        analytics::Trend::Decreasing => t.trend.to_string().red().bold(),
                        analytics::Trend::Stable => t.trend.to_string().normal(),
                    };
                    println!(
                        "  week {}: {:.1} ({})",
                        t.week_number.to_string().cyan(),
                        t.average_intensity,
                        label
                    );
                }
            });
        }

        StatsCmd::Volume { program } => {
            let Some(prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            let rows = analytics::volume_comparison(&prog);
            emit(fmt, &rows, || {
                if rows.is_empty() {
                    println!("{} no weeks in '{}'", "warning:".yellow().bold(), prog.name);
                    return;
                }
                println!("{}", format!("Volume comparison for '{}'", prog.name).bold());
                for r in &rows {
                    let change = if r.percentage_change > 0.0 {
                        format!("+{:.1}%", r.percentage_change).green().bold()
                    } else if r.percentage_change < 0.0 {
                        format!("{:.1}%", r.percentage_change).red().bold()
                    } else {
                        format!("{:.1}%", r.percentage_change).normal()
                    };
                    println!(
                        "  week {}: {:.1}kg ({})",
                        r.week_number.to_string().cyan(),
                        r.total_volume,
                        change
                    );
                }
            });
        }
    }

    Ok(())
}

async fn definition_names(pool: &DB) -> Result<HashMap<String, String>> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT id, name FROM exercises")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().collect())
}
