use std::collections::{HashMap, HashSet};
use std::fs::read_to_string;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use serde::Deserialize;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    cli::ProgramCmd,
    db::DB,
    models::{Program, WorkoutDay, WorkoutExercise},
    storage,
    types::{Config, OutputFmt, emit},
};

use super::load_by_input;

#[derive(Debug, Deserialize)]
struct ProgramToml {
    name: String,
    description: Option<String>,
    duration_weeks: Option<u32>,
    athlete: Option<String>,
    start_date: Option<NaiveDate>,
    weeks: Option<Vec<WeekToml>>,
}

#[derive(Debug, Deserialize)]
struct WeekToml {
    week: u32,
    notes: Option<String>,
    days: Option<Vec<DayToml>>,
}

#[derive(Debug, Deserialize)]
struct DayToml {
    name: String,
    description: Option<String>,
    #[serde(default)]
    rest: bool,
    exercises: Option<Vec<DayExerciseToml>>,
}

#[derive(Debug, Deserialize)]
struct DayExerciseToml {
    name: String,
    sets: u32,
    reps: u32,
    weight: Option<f32>,
    duration_seconds: Option<u32>,
    distance: Option<f32>,
    rest_seconds: Option<u32>,
    rpe: Option<f32>,
}

#[derive(serde::Serialize)]
struct ProgJson {
    idx: i64,
    name: String,
    athlete: String,
    description: String,
    is_active: bool,
    weeks: i64,
    created_at: String,
}

pub async fn handle(cmd: ProgramCmd, pool: &DB, fmt: OutputFmt, config: &Config) -> Result<()> {
    match cmd {
        ProgramCmd::Create {
            name,
            desc,
            weeks,
            start,
            athlete,
        } => {
            let start_date = match start {
                Some(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                    Ok(d) => d,
                    Err(_) => {
                        println!("{} invalid start date `{}` (want YYYY-MM-DD)", "error:".red().bold(), s);
                        return Ok(());
                    }
                },
                None => Local::now().date_naive(),
            };
            let athlete = athlete.unwrap_or_else(|| config.athlete().to_string());

            let program = Program::new(&athlete, &name, desc, weeks, start_date);
            storage::insert_program(pool, &program).await?;

            println!(
                "{} created programme {} for {} (id: {})",
                "ok:".green().bold(),
                program.name.bold(),
                program.athlete,
                program.id
            );
        }

        ProgramCmd::Import { files } => {
            if files.is_empty() {
                println!("{} no programme file provided", "warning:".yellow().bold());
            }
            for f in files {
                match import_single_program(pool, &f, config).await {
                    Ok(()) => {}
                    Err(e) => {
                        if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
                            if io_err.kind() == std::io::ErrorKind::NotFound {
                                println!(
                                    "{} cannot open file `{}` – file not found",
                                    "error:".red().bold(),
                                    f
                                );
                                continue;
                            }
                        }

                        return Err(e);
                    }
                }
            }
        }

        ProgramCmd::List => {
            let rows = sqlx::query(
                r#"
                SELECT ROW_NUMBER() OVER (ORDER BY p.name) AS idx,
                       p.id, p.name, p.athlete,
                       COALESCE(p.description,'') AS description,
                       p.is_active,
                       (SELECT COUNT(*) FROM weeks w WHERE w.program_id = p.id) AS weeks,
                       p.created_at
                FROM   programs p
                ORDER  BY idx
                "#,
            )
            .fetch_all(pool)
            .await?;

            let progs: Vec<ProgJson> = rows
                .iter()
                .map(|r| ProgJson {
                    idx: r.get("idx"),
                    name: r.get("name"),
                    athlete: r.get("athlete"),
                    description: r.get("description"),
                    is_active: r.get("is_active"),
                    weeks: r.get("weeks"),
                    created_at: r.get("created_at"),
                })
                .collect();

            emit(fmt, &progs, || {
                if progs.is_empty() {
                    println!("{}", "  (no programmes found)".dimmed());
                    return;
                }

                println!("{}", "Programmes:".cyan().bold());
                for p in &progs {
                    let idx = format!("{}", p.idx).yellow();
                    let active = if p.is_active { " [active]".green().to_string() } else { String::new() };
                    let desc = if p.description.is_empty() {
                        String::new()
                    } else {
                        format!("– {}", p.description).dimmed().to_string()
                    };
                    println!(
                        " {} • {}{} ({}, {} weeks) {}",
                        idx,
                        p.name.bold(),
                        active,
                        p.athlete,
                        p.weeks,
                        desc
                    );
                }
            });
        }

        ProgramCmd::Show { program } => {
            let Some(prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            let names = definition_names(pool).await?;
            emit(fmt, &prog, || pretty_show(&prog, &names));
        }

        ProgramCmd::Delete { program } => {
            let Some(id) = storage::resolve_program(pool, &program).await? else {
                println!("{} no programme `{}`", "error:".red().bold(), program);
                return Ok(());
            };

            storage::delete_program(pool, &id).await?;
            println!("{} programme deleted (id: {})", "ok:".green().bold(), id);
        }

        ProgramCmd::Activate { program } => {
            let Some(id) = storage::resolve_program(pool, &program).await? else {
                println!("{} no programme `{}`", "error:".red().bold(), program);
                return Ok(());
            };

            storage::activate_program(pool, &id).await?;
            println!("{} programme activated (id: {})", "ok:".green().bold(), id);
        }

        ProgramCmd::Deactivate { program } => {
            let Some(id) = storage::resolve_program(pool, &program).await? else {
                println!("{} no programme `{}`", "error:".red().bold(), program);
                return Ok(());
            };

            storage::deactivate_program(pool, &id).await?;
            println!("{} programme deactivated (id: {})", "ok:".green().bold(), id);
        }

        ProgramCmd::Clone { program, athlete } => {
            let Some(prog) = load_by_input(pool, &program).await? else {
                return Ok(());
            };

            let clone = prog.clone_for(&athlete, Local::now().date_naive());
            storage::insert_program(pool, &clone).await?;

            println!(
                "{} cloned {} for {} (id: {})",
                "ok:".green().bold(),
                clone.name.bold(),
                clone.athlete,
                clone.id
            );
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

fn pretty_show(prog: &Program, names: &HashMap<String, String>) {
    let active = if prog.is_active { " [active]".green().to_string() } else { String::new() };
    println!(
        "{} {}{} – {} ({} weeks, starts {})",
        "Programme:".cyan().bold(),
        prog.name.bold(),
        active,
        prog.athlete,
        prog.duration_weeks,
        prog.start_date
    );
    if let Some(desc) = &prog.description {
        println!("  {}", desc.dimmed());
    }

    for week in &prog.weeks {
        let done = if week.is_completed { " ✓".green().to_string() } else { String::new() };
        println!("\n{} {}{}", "Week".cyan().bold(), week.week_number, done);
        if let Some(notes) = &week.notes {
            println!("  {}", notes.dimmed());
        }

        for (d_idx, day) in week.days.iter().enumerate() {
            let idx = format!("{}", d_idx + 1).yellow();
            let kind = if day.is_rest_day { " (rest)".dimmed().to_string() } else { String::new() };
            let done = if day.is_completed { " ✓".green().to_string() } else { String::new() };
            println!("  {} • {}{}{}", idx, day.name.bold(), kind, done);

            for (e_idx, ex) in day.exercises.iter().enumerate() {
                let idx = format!("{}", e_idx + 1).yellow();
                let name = names
                    .get(&ex.exercise_id)
                    .map(String::as_str)
                    .unwrap_or(ex.exercise_id.as_str());
                let superset = ex
                    .superset_group_id
                    .as_deref()
                    .map(|g| format!(" [superset {}]", &g[..8.min(g.len())]))
                    .unwrap_or_default();
                println!(
                    "     {} • {} – {}x{}{}",
                    idx,
                    name.bold(),
                    ex.target_sets,
                    ex.target_reps,
                    superset.dimmed()
                );

                for set in &ex.sets {
                    let mark = if set.is_completed { "✓".green().to_string() } else { "·".to_string() };
                    let weight = set.weight.map(|w| format!("{}kg", w)).unwrap_or_else(|| "–".into());
                    let reps = set.reps.map(|r| format!(" × {}", r)).unwrap_or_default();
                    let drop = set
                        .drop_percentage
                        .map(|p| format!(" (-{}%)", p))
                        .unwrap_or_default();
                    println!(
                        "        {} set {} [{}] {}{}{}",
                        mark,
                        set.set_number,
                        set.set_type,
                        weight,
                        reps,
                        drop.dimmed()
                    );
                }
            }
        }
    }
}

async fn import_single_program(pool: &DB, file: &str, config: &Config) -> Result<()> {
    let toml_str = read_to_string(file).with_context(|| format!("reading `{file}`"))?;
    let prog: ProgramToml =
        toml::from_str(&toml_str).with_context(|| format!("parsing `{file}`"))?;

    // Check all exercises exist before touching the database.
    let mut all_ex = HashSet::<&str>::new();
    for w in prog.weeks.iter().flatten() {
        for d in w.days.iter().flatten() {
            for e in d.exercises.iter().flatten() {
                all_ex.insert(&e.name);
            }
        }
    }

    let mut name_to_id = HashMap::<String, String>::new();
    if !all_ex.is_empty() {
        let q_marks = std::iter::repeat("?")
            .take(all_ex.len())
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!("SELECT name, id FROM exercises WHERE name IN ({})", q_marks);
        let mut q = sqlx::query_as::<_, (String, String)>(&sql);
        for n in &all_ex {
            q = q.bind(n);
        }
        name_to_id = q.fetch_all(pool).await?.into_iter().collect();

        let missing: Vec<_> = all_ex
            .iter()
            .filter(|n| !name_to_id.contains_key(**n))
            .collect();
        if !missing.is_empty() {
            println!(
                "{} cannot import programme `{}` – missing exercises: {}",
                "warning:".yellow().bold(),
                prog.name,
                missing.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
            );
            return Ok(());
        }
    }

    let athlete = prog.athlete.unwrap_or_else(|| config.athlete().to_string());
    let start = prog.start_date.unwrap_or_else(|| Local::now().date_naive());
    let duration = prog
        .duration_weeks
        .unwrap_or_else(|| prog.weeks.as_ref().map(|w| w.len() as u32).unwrap_or(0));

    let mut program = Program::new(&athlete, &prog.name, prog.description, duration, start);

    for w in prog.weeks.into_iter().flatten() {
        if let Err(e) = program.add_week(w.week, w.notes) {
            println!(
                "{} skipping week {} in `{}`: {}",
                "warning:".yellow().bold(),
                w.week,
                program.name,
                e
            );
            continue;
        }
        let week_id = program.week_by_number(w.week).map(|wk| wk.id.clone());
        let Some(week_id) = week_id else { continue };

        for d in w.days.into_iter().flatten() {
            let day = program.add_day(
                &week_id,
                WorkoutDay::new(&d.name, d.description, d.rest, None),
            )?;

            for e in d.exercises.into_iter().flatten() {
                // validated above, every name resolves
                let def_id = name_to_id[&e.name].clone();
                day.add_exercise(WorkoutExercise {
                    id: Uuid::new_v4().to_string(),
                    exercise_id: def_id,
                    order_index: 0,
                    target_sets: e.sets,
                    target_reps: e.reps,
                    target_weight: e.weight,
                    target_duration_seconds: e.duration_seconds,
                    target_distance: e.distance,
                    rest_seconds: e.rest_seconds,
                    target_rpe: e.rpe,
                    superset_group_id: None,
                    superset_rest_seconds: None,
                    sets: Vec::new(),
                });
            }
        }
    }

    storage::insert_program(pool, &program).await?;
    println!("{} `{}`", "ok:".green().bold(), program.name);
    Ok(())
}
