use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    cli::ExerciseCmd,
    db::DB,
    storage,
    types::{ExerciseImport, OutputFmt, best_muscle_suggestion, canonical_muscle, emit},
};

pub async fn handle(cmd: ExerciseCmd, pool: &DB, fmt: OutputFmt) -> Result<()> {
    match cmd {
        ExerciseCmd::Add { name, muscle, desc } => {
            let Some(muscle) = check_muscle(&muscle) else {
                return Ok(());
            };

            add_definition(pool, &name, &muscle, desc.as_deref()).await?;
            println!("{} added exercise '{}' ({})", "ok:".green().bold(), name, muscle);
        }

        ExerciseCmd::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading `{}`", file))?;
            let import: ExerciseImport =
                toml::from_str(&content).with_context(|| format!("parsing `{}`", file))?;

            // Validate every muscle before touching the database.
            for def in &import.exercise {
                if check_muscle(&def.primary_muscle).is_none() {
                    return Ok(());
                }
            }

            let mut imported = 0u32;
            let mut skipped = 0u32;
            for def in &import.exercise {
                let exists: Option<i64> =
                    sqlx::query_scalar("SELECT 1 FROM exercises WHERE name = ? LIMIT 1")
                        .bind(&def.name)
                        .fetch_optional(pool)
                        .await?;
                if exists.is_some() {
                    skipped += 1;
                    continue;
                }

                // validated above, every muscle is canonical
                let Some(muscle) = canonical_muscle(&def.primary_muscle) else {
                    continue;
                };
                add_definition(pool, &def.name, &muscle, def.description.as_deref()).await?;
                imported += 1;
            }

            println!(
                "{} imported {} exercise(s), skipped {} duplicate(s)",
                "ok:".green().bold(),
                imported,
                skipped
            );
        }

        ExerciseCmd::List { muscle } => {
            #[derive(Serialize)]
            struct DefJson {
                index: i64,
                name: String,
                muscle: String,
                description: Option<String>,
            }

            let rows: Vec<(i64, String, String, Option<String>)> = match &muscle {
                Some(m) => {
                    sqlx::query_as(
                        r#"
                        SELECT rn, name, primary_muscle, description
                        FROM (
                          SELECT name, primary_muscle, description,
                                 ROW_NUMBER() OVER (ORDER BY name) AS rn
                          FROM exercises
                        ) t
                        WHERE t.primary_muscle = ?
                        "#,
                    )
                    .bind(m.to_string())
                    .fetch_all(pool)
                    .await?
                }
                None => {
                    sqlx::query_as(
                        r#"
                        SELECT ROW_NUMBER() OVER (ORDER BY name), name, primary_muscle, description
                        FROM exercises
                        "#,
                    )
                    .fetch_all(pool)
                    .await?
                }
            };

            let defs: Vec<DefJson> = rows
                .into_iter()
                .map(|(index, name, muscle, description)| DefJson {
                    index,
                    name,
                    muscle,
                    description,
                })
                .collect();

            emit(fmt, &defs, || {
                if defs.is_empty() {
                    println!("{} no exercises found", "warning:".yellow().bold());
                    return;
                }
                for d in &defs {
                    let desc = d
                        .description
                        .as_deref()
                        .map(|s| format!(" - {}", s))
                        .unwrap_or_default();
                    println!(
                        "{}. {} [{}]{}",
                        d.index.to_string().cyan(),
                        d.name.bold(),
                        d.muscle,
                        desc
                    );
                }
            });
        }

        ExerciseCmd::Delete { exercise } => {
            let Some(id) = storage::resolve_definition(pool, &exercise).await? else {
                println!("{} exercise '{}' not found", "error:".red().bold(), exercise);
                return Ok(());
            };

            // Referenced definitions are protected by the FK.
            match sqlx::query("DELETE FROM exercises WHERE id = ?")
                .bind(&id)
                .execute(pool)
                .await
            {
                Ok(_) => println!("{} deleted exercise '{}'", "ok:".green().bold(), exercise),
                Err(e) if e.to_string().contains("FOREIGN KEY") => println!(
                    "{} exercise '{}' is used by a programme and cannot be deleted",
                    "error:".red().bold(),
                    exercise
                ),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

async fn add_definition(pool: &DB, name: &str, muscle: &str, desc: Option<&str>) -> Result<()> {
    sqlx::query("INSERT INTO exercises (id, name, primary_muscle, description) VALUES (?, ?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(muscle)
        .bind(desc)
        .execute(pool)
        .await
        .with_context(|| format!("inserting exercise `{}`", name))?;

    Ok(())
}

/// Normalizes a muscle name, printing an error (and a close-match
/// suggestion when one stands out) on failure.
fn check_muscle(input: &str) -> Option<String> {
    match canonical_muscle(input) {
        Some(m) => Some(m),
        None => {
            println!("{} unknown muscle group '{}'", "error:".red().bold(), input);
            if let Some(suggestion) = best_muscle_suggestion(input) {
                println!("   did you mean '{}'?", suggestion.bold());
            }
            None
        }
    }
}
