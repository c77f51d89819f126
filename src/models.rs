use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

/// A multi-week training programme assigned to one athlete.
/// Aggregate root: every structural mutation goes through the
/// operations in `program.rs`, `superset.rs` and `copy.rs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub athlete: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub weeks: Vec<Week>,
}

/// One training week. `week_number` is unique within its programme;
/// completion is explicit, never derived from the days below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Week {
    pub id: String,
    pub week_number: u32,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub days: Vec<WorkoutDay>,
}

/// A planned day inside a week. Rest days carry no analytics weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_rest_day: bool,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub exercises: Vec<WorkoutExercise>,
}

/// An exercise slot within a day, referencing a definition from the
/// exercise catalogue by id. `superset_group_id` and
/// `superset_rest_seconds` are either both set or both null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: String,
    pub exercise_id: String,
    pub order_index: u32,
    pub target_sets: u32,
    pub target_reps: u32,
    pub target_weight: Option<f32>,
    pub target_duration_seconds: Option<u32>,
    pub target_distance: Option<f32>,
    pub rest_seconds: Option<u32>,
    pub target_rpe: Option<f32>,
    pub superset_group_id: Option<String>,
    pub superset_rest_seconds: Option<u32>,
    pub sets: Vec<ExerciseSet>,
}

/// A single set. `set_number` stays contiguous from 1 within its
/// exercise (renumbered on delete); `completed_at` is stamped on
/// completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: String,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub duration_seconds: Option<u32>,
    pub distance: Option<f32>,
    pub difficulty: Option<u32>,
    pub intensity: Option<f32>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub set_type: SetType,
    pub drop_percentage: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SetType {
    Normal,
    Warmup,
    DropSet,
}

impl std::fmt::Display for SetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Warmup => "warmup",
            Self::DropSet => "drop-set",
        };

        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "warmup" => Ok(Self::Warmup),
            "drop-set" | "dropset" => Ok(Self::DropSet),
            other => Err(format!("unknown set type: {}", other)),
        }
    }
}

/// A catalogue entry backing `WorkoutExercise::exercise_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub primary_muscle: String,
    pub description: Option<String>,
}

impl Program {
    pub fn new(
        athlete: &str,
        name: &str,
        description: Option<String>,
        duration_weeks: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            athlete: athlete.to_string(),
            name: name.to_string(),
            description,
            duration_weeks,
            start_date,
            end_date: None,
            is_active: false,
            weeks: Vec::new(),
        }
    }

    pub fn week(&self, week_id: &str) -> Option<&Week> {
        self.weeks.iter().find(|w| w.id == week_id)
    }

    pub fn week_mut(&mut self, week_id: &str) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|w| w.id == week_id)
    }

    pub fn week_by_number(&self, number: u32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.week_number == number)
    }
}

impl Week {
    pub fn new(week_number: u32, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            week_number,
            notes,
            is_completed: false,
            days: Vec::new(),
        }
    }

    pub fn day_mut(&mut self, day_id: &str) -> Option<&mut WorkoutDay> {
        self.days.iter_mut().find(|d| d.id == day_id)
    }
}

impl WorkoutDay {
    pub fn new(
        name: &str,
        description: Option<String>,
        is_rest_day: bool,
        scheduled_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description,
            is_rest_day,
            scheduled_date,
            completed_date: None,
            is_completed: false,
            exercises: Vec::new(),
        }
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&WorkoutExercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut WorkoutExercise> {
        self.exercises.iter_mut().find(|e| e.id == exercise_id)
    }
}

impl WorkoutExercise {
    pub fn set_mut(&mut self, set_id: &str) -> Option<&mut ExerciseSet> {
        self.sets.iter_mut().find(|s| s.id == set_id)
    }

    /// Highest set number currently present, 0 when empty.
    pub fn max_set_number(&self) -> u32 {
        self.sets.iter().map(|s| s.set_number).max().unwrap_or(0)
    }
}

impl ExerciseSet {
    pub fn new(set_number: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            set_number,
            reps: None,
            weight: None,
            duration_seconds: None,
            distance: None,
            difficulty: None,
            intensity: None,
            notes: None,
            is_completed: false,
            completed_at: None,
            set_type: SetType::Normal,
            drop_percentage: None,
        }
    }
}
