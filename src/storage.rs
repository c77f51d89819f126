use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;

use crate::{
    db::DB,
    models::{ExerciseDefinition, ExerciseSet, Program, SetType, Week, WorkoutDay, WorkoutExercise},
};

/// Repository for the Programme aggregate. An aggregate is always
/// written whole, inside one transaction: a failed deep-copy or clone
/// leaves no partial rows behind.

pub async fn insert_program(pool: &DB, program: &Program) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"INSERT INTO programs
             (id, athlete, name, description, duration_weeks, start_date, end_date, is_active)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
    )
    .bind(&program.id)
    .bind(&program.athlete)
    .bind(&program.name)
    .bind(program.description.as_deref())
    .bind(program.duration_weeks as i64)
    .bind(program.start_date)
    .bind(program.end_date)
    .bind(program.is_active)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("inserting programme `{}`", program.name))?;

    insert_tree(&mut tx, program).await?;
    tx.commit().await?;

    Ok(())
}

/// Rewrites the aggregate's child rows wholesale. Cheaper bookkeeping
/// than diffing the tree, and the transaction keeps it atomic.
pub async fn save_program(pool: &DB, program: &Program) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"UPDATE programs
           SET name = ?2, description = ?3, duration_weeks = ?4,
               start_date = ?5, end_date = ?6
           WHERE id = ?1"#,
    )
    .bind(&program.id)
    .bind(&program.name)
    .bind(program.description.as_deref())
    .bind(program.duration_weeks as i64)
    .bind(program.start_date)
    .bind(program.end_date)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM weeks WHERE program_id = ?")
        .bind(&program.id)
        .execute(&mut *tx)
        .await?;

    insert_tree(&mut tx, program).await?;
    tx.commit().await?;

    Ok(())
}

async fn insert_tree(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, program: &Program) -> Result<()> {
    for week in &program.weeks {
        insert_week(tx, &program.id, week).await?;
    }
    Ok(())
}

async fn insert_week(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    program_id: &str,
    week: &Week,
) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO weeks (id, program_id, week_number, notes, is_completed)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(&week.id)
    .bind(program_id)
    .bind(week.week_number as i64)
    .bind(week.notes.as_deref())
    .bind(week.is_completed)
    .execute(&mut **tx)
    .await?;

    for (position, day) in week.days.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO workout_days
                 (id, week_id, position, name, description, is_rest_day,
                  scheduled_date, completed_date, is_completed)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
        )
        .bind(&day.id)
        .bind(&week.id)
        .bind(position as i64)
        .bind(&day.name)
        .bind(day.description.as_deref())
        .bind(day.is_rest_day)
        .bind(day.scheduled_date)
        .bind(day.completed_date)
        .bind(day.is_completed)
        .execute(&mut **tx)
        .await?;

        for exercise in &day.exercises {
            sqlx::query(
                r#"INSERT INTO workout_exercises
                     (id, day_id, exercise_id, order_index, target_sets, target_reps,
                      target_weight, target_duration_seconds, target_distance,
                      rest_seconds, target_rpe, superset_group_id, superset_rest_seconds)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
            )
            .bind(&exercise.id)
            .bind(&day.id)
            .bind(&exercise.exercise_id)
            .bind(exercise.order_index as i64)
            .bind(exercise.target_sets as i64)
            .bind(exercise.target_reps as i64)
            .bind(exercise.target_weight)
            .bind(exercise.target_duration_seconds.map(|v| v as i64))
            .bind(exercise.target_distance)
            .bind(exercise.rest_seconds.map(|v| v as i64))
            .bind(exercise.target_rpe)
            .bind(exercise.superset_group_id.as_deref())
            .bind(exercise.superset_rest_seconds.map(|v| v as i64))
            .execute(&mut **tx)
            .await?;

            for set in &exercise.sets {
                sqlx::query(
                    r#"INSERT INTO exercise_sets
                         (id, workout_exercise_id, set_number, reps, weight,
                          duration_seconds, distance, difficulty, intensity, notes,
                          is_completed, completed_at, set_type, drop_percentage)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
                )
                .bind(&set.id)
                .bind(&exercise.id)
                .bind(set.set_number as i64)
                .bind(set.reps.map(|v| v as i64))
                .bind(set.weight)
                .bind(set.duration_seconds.map(|v| v as i64))
                .bind(set.distance)
                .bind(set.difficulty.map(|v| v as i64))
                .bind(set.intensity)
                .bind(set.notes.as_deref())
                .bind(set.is_completed)
                .bind(set.completed_at)
                .bind(set.set_type)
                .bind(set.drop_percentage)
                .execute(&mut **tx)
                .await?;
            }
        }
    }

    Ok(())
}

/// Loads a fully hydrated aggregate: every week, day, exercise and
/// set, in their stable orders.
pub async fn load_program(pool: &DB, program_id: &str) -> Result<Program> {
    let row: Option<(
        String,
        String,
        String,
        Option<String>,
        i64,
        NaiveDate,
        Option<NaiveDate>,
        bool,
    )> = sqlx::query_as(
        r#"SELECT id, athlete, name, description, duration_weeks, start_date, end_date, is_active
           FROM programs WHERE id = ?"#,
    )
    .bind(program_id)
    .fetch_optional(pool)
    .await?;

    let (id, athlete, name, description, duration_weeks, start_date, end_date, is_active) =
        row.ok_or_else(|| anyhow!("programme `{}` not found", program_id))?;

    let mut program = Program {
        id,
        athlete,
        name,
        description,
        duration_weeks: duration_weeks as u32,
        start_date,
        end_date,
        is_active,
        weeks: Vec::new(),
    };

    let week_rows: Vec<(String, i64, Option<String>, bool)> = sqlx::query_as(
        "SELECT id, week_number, notes, is_completed FROM weeks WHERE program_id = ? ORDER BY week_number",
    )
    .bind(&program.id)
    .fetch_all(pool)
    .await?;

    let mut conn = pool.acquire().await?;
    for (week_id, week_number, notes, is_completed) in week_rows {
        let days = load_days(&mut conn, &week_id).await?;
        program.weeks.push(Week {
            id: week_id,
            week_number: week_number as u32,
            notes,
            is_completed,
            days,
        });
    }

    Ok(program)
}

async fn load_days(conn: &mut SqliteConnection, week_id: &str) -> Result<Vec<WorkoutDay>> {
    let day_rows: Vec<(
        String,
        String,
        Option<String>,
        bool,
        Option<NaiveDate>,
        Option<NaiveDate>,
        bool,
    )> = sqlx::query_as(
        r#"SELECT id, name, description, is_rest_day, scheduled_date, completed_date, is_completed
           FROM workout_days WHERE week_id = ? ORDER BY position"#,
    )
    .bind(week_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut days = Vec::with_capacity(day_rows.len());
    for (id, name, description, is_rest_day, scheduled_date, completed_date, is_completed) in day_rows {
        let exercises = load_exercises(conn, &id).await?;
        days.push(WorkoutDay {
            id,
            name,
            description,
            is_rest_day,
            scheduled_date,
            completed_date,
            is_completed,
            exercises,
        });
    }

    Ok(days)
}

async fn load_exercises(conn: &mut SqliteConnection, day_id: &str) -> Result<Vec<WorkoutExercise>> {
    #[allow(clippy::type_complexity)]
    let rows: Vec<(
        String,
        String,
        i64,
        i64,
        i64,
        Option<f32>,
        Option<i64>,
        Option<f32>,
        Option<i64>,
        Option<f32>,
        Option<String>,
        Option<i64>,
    )> = sqlx::query_as(
        r#"SELECT id, exercise_id, order_index, target_sets, target_reps,
                  target_weight, target_duration_seconds, target_distance,
                  rest_seconds, target_rpe, superset_group_id, superset_rest_seconds
           FROM workout_exercises WHERE day_id = ? ORDER BY order_index"#,
    )
    .bind(day_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut exercises = Vec::with_capacity(rows.len());
    for (
        id,
        exercise_id,
        order_index,
        target_sets,
        target_reps,
        target_weight,
        target_duration_seconds,
        target_distance,
        rest_seconds,
        target_rpe,
        superset_group_id,
        superset_rest_seconds,
    ) in rows
    {
        let sets = load_sets(conn, &id).await?;
        exercises.push(WorkoutExercise {
            id,
            exercise_id,
            order_index: order_index as u32,
            target_sets: target_sets as u32,
            target_reps: target_reps as u32,
            target_weight,
            target_duration_seconds: target_duration_seconds.map(|v| v as u32),
            target_distance,
            rest_seconds: rest_seconds.map(|v| v as u32),
            target_rpe,
            superset_group_id,
            superset_rest_seconds: superset_rest_seconds.map(|v| v as u32),
            sets,
        });
    }

    Ok(exercises)
}

async fn load_sets(conn: &mut SqliteConnection, workout_exercise_id: &str) -> Result<Vec<ExerciseSet>> {
    #[allow(clippy::type_complexity)]
    let rows: Vec<(
        String,
        i64,
        Option<i64>,
        Option<f32>,
        Option<i64>,
        Option<f32>,
        Option<i64>,
        Option<f32>,
        Option<String>,
        bool,
        Option<DateTime<Utc>>,
        SetType,
        Option<f32>,
    )> = sqlx::query_as(
        r#"SELECT id, set_number, reps, weight, duration_seconds, distance,
                  difficulty, intensity, notes, is_completed, completed_at,
                  set_type, drop_percentage
           FROM exercise_sets WHERE workout_exercise_id = ? ORDER BY set_number"#,
    )
    .bind(workout_exercise_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(
                id,
                set_number,
                reps,
                weight,
                duration_seconds,
                distance,
                difficulty,
                intensity,
                notes,
                is_completed,
                completed_at,
                set_type,
                drop_percentage,
            )| ExerciseSet {
                id,
                set_number: set_number as u32,
                reps: reps.map(|v| v as u32),
                weight,
                duration_seconds: duration_seconds.map(|v| v as u32),
                distance,
                difficulty: difficulty.map(|v| v as u32),
                intensity,
                notes,
                is_completed,
                completed_at,
                set_type,
                drop_percentage,
            },
        )
        .collect())
}

pub async fn delete_program(pool: &DB, program_id: &str) -> Result<bool> {
    let res = sqlx::query("DELETE FROM programs WHERE id = ?")
        .bind(program_id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected() > 0)
}

/// Resolves a programme by list index (from `program list`, ordered
/// by name) or by exact name.
pub async fn resolve_program(pool: &DB, input: &str) -> Result<Option<String>> {
    if let Ok(idx) = input.parse::<i64>() {
        Ok(sqlx::query_scalar(
            r#"
            SELECT id
            FROM (
              SELECT id, ROW_NUMBER() OVER (ORDER BY name) AS rn
              FROM programs
            ) t
            WHERE t.rn = ?
            "#,
        )
        .bind(idx)
        .fetch_optional(pool)
        .await?)
    } else {
        Ok(sqlx::query_scalar("SELECT id FROM programs WHERE name = ?")
            .bind(input)
            .fetch_optional(pool)
            .await?)
    }
}

/// Deactivate-then-activate in one transaction; the partial unique
/// index backs this up against concurrent writers.
pub async fn activate_program(pool: &DB, program_id: &str) -> Result<()> {
    let athlete: String = sqlx::query_scalar("SELECT athlete FROM programs WHERE id = ?")
        .bind(program_id)
        .fetch_one(pool)
        .await
        .context("programme not found")?;

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE programs SET is_active = 0 WHERE athlete = ? AND is_active = 1")
        .bind(&athlete)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE programs SET is_active = 1 WHERE id = ?")
        .bind(program_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}

pub async fn deactivate_program(pool: &DB, program_id: &str) -> Result<()> {
    sqlx::query("UPDATE programs SET is_active = 0 WHERE id = ?")
        .bind(program_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn load_athlete_programs(pool: &DB, athlete: &str) -> Result<Vec<Program>> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM programs WHERE athlete = ? ORDER BY name")
        .bind(athlete)
        .fetch_all(pool)
        .await?;

    let mut programs = Vec::with_capacity(ids.len());
    for id in ids {
        programs.push(load_program(pool, &id).await?);
    }

    Ok(programs)
}

//
// Exercise-definition lookup
//

pub async fn get_definition(pool: &DB, definition_id: &str) -> Result<Option<ExerciseDefinition>> {
    let row: Option<(String, String, String, Option<String>)> = sqlx::query_as(
        "SELECT id, name, primary_muscle, description FROM exercises WHERE id = ?",
    )
    .bind(definition_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, name, primary_muscle, description)| ExerciseDefinition {
        id,
        name,
        primary_muscle,
        description,
    }))
}

/// Resolves a definition by catalogue index (ordered by name) or by
/// exact name, same convention as programmes.
pub async fn resolve_definition(pool: &DB, input: &str) -> Result<Option<String>> {
    if let Ok(idx) = input.parse::<i64>() {
        Ok(sqlx::query_scalar(
            r#"
            SELECT id
            FROM (
              SELECT id, ROW_NUMBER() OVER (ORDER BY name) AS rn
              FROM exercises
            ) t
            WHERE t.rn = ?
            "#,
        )
        .bind(idx)
        .fetch_optional(pool)
        .await?)
    } else {
        Ok(sqlx::query_scalar("SELECT id FROM exercises WHERE name = ?")
            .bind(input)
            .fetch_optional(pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::init_schema, models::WorkoutDay, program::SetOverrides};
    use chrono::TimeZone;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn test_pool() -> DB {
        // single connection so the in-memory database is shared
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_definition(pool: &DB, id: &str, name: &str) {
        sqlx::query(
            "INSERT INTO exercises (id, name, primary_muscle, description) VALUES (?, ?, 'chest', NULL)",
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    }

    fn sample_program() -> Program {
        let mut p = Program::new(
            "ana",
            "Strength",
            Some("base block".into()),
            4,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        );
        p.add_week(1, Some("intro".into())).unwrap();
        let week_id = p.weeks[0].id.clone();
        let day = p
            .add_day(&week_id, WorkoutDay::new("Push", None, false, None))
            .unwrap();
        let ex = day.add_exercise(WorkoutExercise {
            id: uuid::Uuid::new_v4().to_string(),
            exercise_id: "def-bench".to_string(),
            order_index: 0,
            target_sets: 3,
            target_reps: 8,
            target_weight: Some(90.0),
            target_duration_seconds: None,
            target_distance: None,
            rest_seconds: Some(150),
            target_rpe: Some(8.0),
            superset_group_id: None,
            superset_rest_seconds: None,
            sets: Vec::new(),
        });
        ex.generate_drop_sets(90.0, 8, 1, 20.0, 2);
        let set_id = ex.sets[0].id.clone();
        ex.complete_set(
            &set_id,
            &SetOverrides::default(),
            Utc.with_ymd_and_hms(2026, 1, 6, 18, 0, 0).unwrap(),
        )
        .unwrap();

        p
    }

    #[tokio::test]
    async fn aggregate_round_trips_through_sqlite() {
        let pool = test_pool().await;
        seed_definition(&pool, "def-bench", "Bench Press").await;

        let program = sample_program();
        insert_program(&pool, &program).await.unwrap();

        let loaded = load_program(&pool, &program.id).await.unwrap();
        assert_eq!(loaded.name, "Strength");
        assert_eq!(loaded.weeks.len(), 1);
        assert_eq!(loaded.weeks[0].notes.as_deref(), Some("intro"));

        let ex = &loaded.weeks[0].days[0].exercises[0];
        assert_eq!(ex.exercise_id, "def-bench");
        assert_eq!(ex.target_weight, Some(90.0));
        assert_eq!(ex.sets.len(), 2);
        assert!(ex.sets[0].is_completed);
        assert_eq!(ex.sets[1].set_type, SetType::DropSet);
        assert_eq!(ex.sets[1].drop_percentage, Some(20.0));
    }

    #[tokio::test]
    async fn save_rewrites_the_tree() {
        let pool = test_pool().await;
        seed_definition(&pool, "def-bench", "Bench Press").await;

        let mut program = sample_program();
        insert_program(&pool, &program).await.unwrap();

        let source_id = program.weeks[0].id.clone();
        program.copy_week(&source_id, 2).unwrap();
        save_program(&pool, &program).await.unwrap();

        let loaded = load_program(&pool, &program.id).await.unwrap();
        assert_eq!(loaded.weeks.len(), 2);
        assert_eq!(loaded.weeks[1].week_number, 2);
        assert!(loaded.weeks[1].days[0].exercises[0].sets.iter().all(|s| !s.is_completed));
    }

    #[tokio::test]
    async fn activation_is_exclusive_per_athlete() {
        let pool = test_pool().await;

        let a = Program::new("ana", "A", None, 1, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let b = Program::new("ana", "B", None, 1, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let other = Program::new("bruno", "C", None, 1, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        for p in [&a, &b, &other] {
            insert_program(&pool, p).await.unwrap();
        }

        activate_program(&pool, &a.id).await.unwrap();
        activate_program(&pool, &other.id).await.unwrap();
        activate_program(&pool, &b.id).await.unwrap();

        let active: Vec<String> =
            sqlx::query_scalar("SELECT id FROM programs WHERE is_active = 1 ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(active, vec![b.id.clone(), other.id.clone()]);
    }

    #[tokio::test]
    async fn resolve_by_index_and_name() {
        let pool = test_pool().await;
        let a = Program::new("ana", "Alpha", None, 1, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let b = Program::new("ana", "Beta", None, 1, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        insert_program(&pool, &a).await.unwrap();
        insert_program(&pool, &b).await.unwrap();

        assert_eq!(resolve_program(&pool, "1").await.unwrap(), Some(a.id.clone()));
        assert_eq!(resolve_program(&pool, "Beta").await.unwrap(), Some(b.id.clone()));
        assert_eq!(resolve_program(&pool, "Gamma").await.unwrap(), None);
    }
}
