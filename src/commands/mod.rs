use anyhow::Result;
use colored::Colorize;

use crate::{db::DB, models::Program, storage};

pub mod config;
pub mod day;
pub mod exercise;
pub mod program;
pub mod set;
pub mod stats;
pub mod week;
pub mod workout;

/// Resolves user input (list index or exact name) to a fully hydrated
/// aggregate. Prints the not-found message itself so every handler
/// reports misses the same way.
pub async fn load_by_input(pool: &DB, input: &str) -> Result<Option<Program>> {
    match storage::resolve_program(pool, input).await? {
        Some(id) => Ok(Some(storage::load_program(pool, &id).await?)),
        None => {
            println!("{} no programme `{}`", "error:".red().bold(), input);
            Ok(None)
        }
    }
}

pub fn week_id_by_number(program: &Program, number: u32) -> Option<String> {
    program.week_by_number(number).map(|w| w.id.clone())
}

/// Days and exercises are addressed by the 1-based indices shown in
/// `program show`.
pub fn day_id_by_index(program: &Program, week_number: u32, index: usize) -> Option<String> {
    program
        .week_by_number(week_number)?
        .days
        .get(index.checked_sub(1)?)
        .map(|d| d.id.clone())
}

pub fn exercise_id_by_index(
    program: &Program,
    week_number: u32,
    day_index: usize,
    exercise_index: usize,
) -> Option<String> {
    program
        .week_by_number(week_number)?
        .days
        .get(day_index.checked_sub(1)?)?
        .exercises
        .get(exercise_index.checked_sub(1)?)
        .map(|e| e.id.clone())
}

pub fn set_id_by_number(
    program: &Program,
    week_number: u32,
    day_index: usize,
    exercise_index: usize,
    set_number: u32,
) -> Option<String> {
    program
        .week_by_number(week_number)?
        .days
        .get(day_index.checked_sub(1)?)?
        .exercises
        .get(exercise_index.checked_sub(1)?)?
        .sets
        .iter()
        .find(|s| s.set_number == set_number)
        .map(|s| s.id.clone())
}
