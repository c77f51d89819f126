use std::str::FromStr;

use anyhow::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub type DB = SqlitePool;

pub async fn open(path: &str) -> Result<DB> {
    let opts = SqliteConnectOptions::from_str(path)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Creates the schema on first run. The partial unique index on
/// `programs` is what actually closes the double-activation race:
/// two concurrent activations for one athlete cannot both commit.
pub async fn init_schema(pool: &DB) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS exercises (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL UNIQUE,
            primary_muscle TEXT NOT NULL,
            description    TEXT,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS programs (
            id             TEXT PRIMARY KEY,
            athlete        TEXT NOT NULL,
            name           TEXT NOT NULL,
            description    TEXT,
            duration_weeks INTEGER NOT NULL,
            start_date     TEXT NOT NULL,
            end_date       TEXT,
            is_active      INTEGER NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS one_active_program_per_athlete
            ON programs(athlete) WHERE is_active = 1;

        CREATE TABLE IF NOT EXISTS weeks (
            id           TEXT PRIMARY KEY,
            program_id   TEXT NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
            week_number  INTEGER NOT NULL,
            notes        TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            UNIQUE(program_id, week_number)
        );

        CREATE TABLE IF NOT EXISTS workout_days (
            id             TEXT PRIMARY KEY,
            week_id        TEXT NOT NULL REFERENCES weeks(id) ON DELETE CASCADE,
            position       INTEGER NOT NULL,
            name           TEXT NOT NULL,
            description    TEXT,
            is_rest_day    INTEGER NOT NULL DEFAULT 0,
            scheduled_date TEXT,
            completed_date TEXT,
            is_completed   INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS workout_exercises (
            id                      TEXT PRIMARY KEY,
            day_id                  TEXT NOT NULL REFERENCES workout_days(id) ON DELETE CASCADE,
            exercise_id             TEXT NOT NULL REFERENCES exercises(id),
            order_index             INTEGER NOT NULL,
            target_sets             INTEGER NOT NULL,
            target_reps             INTEGER NOT NULL,
            target_weight           REAL,
            target_duration_seconds INTEGER,
            target_distance         REAL,
            rest_seconds            INTEGER,
            target_rpe              REAL,
            superset_group_id       TEXT,
            superset_rest_seconds   INTEGER
        );

        CREATE TABLE IF NOT EXISTS exercise_sets (
            id                  TEXT PRIMARY KEY,
            workout_exercise_id TEXT NOT NULL REFERENCES workout_exercises(id) ON DELETE CASCADE,
            set_number          INTEGER NOT NULL,
            reps                INTEGER,
            weight              REAL,
            duration_seconds    INTEGER,
            distance            REAL,
            difficulty          INTEGER,
            intensity           REAL,
            notes               TEXT,
            is_completed        INTEGER NOT NULL DEFAULT 0,
            completed_at        TEXT,
            set_type            TEXT NOT NULL DEFAULT 'normal',
            drop_percentage     REAL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
