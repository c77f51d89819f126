use clap::{Parser, Subcommand};

use crate::{models::SetType, types::Muscle};

#[derive(Parser)]
#[command(name = "periodize", version, about = "CLI training-programme tracker")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Programme management
    #[command(subcommand, visible_alias = "p")]
    Program(ProgramCmd),

    /// Week operations within a programme
    #[command(subcommand, visible_alias = "w")]
    Week(WeekCmd),

    /// Day operations within a week
    #[command(subcommand, visible_alias = "d")]
    Day(DayCmd),

    /// Exercises within a day (slots, supersets, drop sets)
    #[command(subcommand, visible_alias = "wo")]
    Workout(WorkoutCmd),

    /// Set logging
    #[command(subcommand)]
    Set(SetCmd),

    /// Exercise definition catalogue
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Analytics over completed workouts
    #[command(subcommand)]
    Stats(StatsCmd),

    /// View or edit periodize config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum ProgramCmd {
    /// Create an empty programme
    #[command(visible_alias = "c")]
    Create {
        name: String,

        /// Programme description
        #[arg(short, long)]
        desc: Option<String>,

        /// Planned length in weeks
        #[arg(short, long, default_value = "4")]
        weeks: u32,

        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,

        /// Owning athlete (defaults to the configured athlete)
        #[arg(short, long)]
        athlete: Option<String>,
    },

    /// Import one or more programmes from TOML files
    #[command(visible_alias = "i")]
    Import { files: Vec<String> },

    /// List programmes
    #[command(visible_alias = "l")]
    List,

    /// Show a single programme in detail
    #[command(visible_alias = "s")]
    Show {
        /// Programme index (from `p list`) or exact name
        program: String,
    },

    /// Delete a programme and everything under it
    #[command(visible_alias = "d")]
    Delete { program: String },

    /// Make this the athlete's single active programme
    Activate { program: String },

    /// Deactivate a programme
    Deactivate { program: String },

    /// Clone a programme for another athlete (completion reset)
    Clone {
        program: String,

        /// Target athlete
        athlete: String,
    },
}

#[derive(Subcommand)]
pub enum WeekCmd {
    /// Add an empty week
    #[command(visible_alias = "a")]
    Add {
        program: String,

        /// Week number (1-based, unique within the programme)
        number: u32,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Mark a week complete (or reopen it with --reopen)
    Complete {
        program: String,
        week: u32,

        #[arg(long)]
        reopen: bool,
    },

    /// Deep-copy a week to a new week number
    Copy {
        program: String,

        /// Source week number
        source: u32,

        /// Target week number (must be free)
        target: u32,
    },

    /// Append a week's days into an existing week
    CopyContent {
        program: String,

        /// Source week number
        source: u32,

        /// Target week number (must exist)
        target: u32,
    },
}

#[derive(Subcommand)]
pub enum DayCmd {
    /// Add a day to a week
    #[command(visible_alias = "a")]
    Add {
        program: String,
        week: u32,
        name: String,

        #[arg(short, long)]
        desc: Option<String>,

        /// Mark as a rest day
        #[arg(short, long)]
        rest: bool,

        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Complete a day, cascading to its open sets
    Complete {
        program: String,
        week: u32,

        /// Day index within the week (from `p show`)
        day: usize,
    },
}

#[derive(Subcommand)]
pub enum WorkoutCmd {
    /// Add an exercise slot to a day
    #[command(visible_alias = "a")]
    Add {
        program: String,
        week: u32,
        day: usize,

        /// Exercise definition index (from `ex list`) or exact name
        exercise: String,

        #[arg(long, default_value = "3")]
        sets: u32,

        #[arg(long, default_value = "8")]
        reps: u32,

        #[arg(long)]
        weight: Option<f32>,

        #[arg(long)]
        duration: Option<u32>,

        #[arg(long)]
        distance: Option<f32>,

        #[arg(long)]
        rest: Option<u32>,

        #[arg(long)]
        rpe: Option<f32>,
    },

    /// Remove an exercise slot
    #[command(visible_alias = "rm")]
    Remove {
        program: String,
        week: u32,
        day: usize,

        /// Exercise index within the day
        exercise: usize,
    },

    /// Reorder a day's exercises - pass every index exactly once
    Reorder {
        program: String,
        week: u32,
        day: usize,

        /// Complete permutation of exercise indices, new order
        order: Vec<usize>,
    },

    /// Link exercises into a superset with shared rest
    Superset {
        program: String,
        week: u32,
        day: usize,

        /// At least two exercise indices within the day
        exercises: Vec<usize>,

        /// Rest after the superset, in seconds
        #[arg(long, default_value = "90")]
        rest: u32,
    },

    /// Dissolve a superset group across the whole programme
    Ungroup {
        program: String,

        /// Superset group id (shown by `p show`)
        group: String,
    },

    /// Generate a drop-set sequence on an exercise
    Dropset {
        program: String,
        week: u32,
        day: usize,
        exercise: usize,

        /// Opening weight in kg
        weight: f32,

        /// Opening reps
        reps: u32,

        /// Number of drops after the opener
        #[arg(long, default_value = "2")]
        drops: u32,

        /// Weight reduction per drop, percent
        #[arg(long, default_value = "20")]
        percent: f32,

        /// Reps adjustment per drop (may be negative)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        reps_adjust: i32,
    },
}

#[derive(Subcommand)]
pub enum SetCmd {
    /// Append an empty set to an exercise
    #[command(visible_alias = "a")]
    Add {
        program: String,
        week: u32,
        day: usize,
        exercise: usize,
    },

    /// Edit a set without completing it
    #[command(visible_alias = "e")]
    Edit {
        program: String,
        week: u32,
        day: usize,
        exercise: usize,

        /// Set number
        set: u32,

        #[arg(long)]
        reps: Option<u32>,

        #[arg(long)]
        weight: Option<f32>,

        #[arg(long)]
        duration: Option<u32>,

        #[arg(long)]
        distance: Option<f32>,

        #[arg(long)]
        difficulty: Option<u32>,

        #[arg(long)]
        intensity: Option<f32>,

        #[arg(long)]
        notes: Option<String>,

        /// Set type: normal, warmup or drop-set
        #[arg(long)]
        kind: Option<SetType>,
    },

    /// Delete a set (remaining sets are renumbered)
    #[command(visible_alias = "d")]
    Delete {
        program: String,
        week: u32,
        day: usize,
        exercise: usize,
        set: u32,
    },

    /// Complete a set, optionally overriding the logged values
    #[command(visible_alias = "c")]
    Complete {
        program: String,
        week: u32,
        day: usize,
        exercise: usize,
        set: u32,

        #[arg(long)]
        reps: Option<u32>,

        #[arg(long)]
        weight: Option<f32>,

        #[arg(long)]
        duration: Option<u32>,

        #[arg(long)]
        distance: Option<f32>,

        #[arg(long)]
        difficulty: Option<u32>,

        #[arg(long)]
        intensity: Option<f32>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExerciseCmd {
    /// Add a new exercise definition
    #[command(visible_alias = "a")]
    Add {
        /// Exercise name
        name: String,

        /// Primary muscle group
        #[arg(short, long)]
        muscle: String,

        /// Exercise description
        #[arg(short, long)]
        desc: Option<String>,
    },

    /// Import exercise definitions from a TOML file
    #[command(visible_alias = "i")]
    Import {
        /// Path to TOML file
        file: String,
    },

    /// List all exercise definitions
    #[command(visible_alias = "l")]
    List {
        /// Filter by muscle group
        #[arg(short, long, value_enum)]
        muscle: Option<Muscle>,
    },

    /// Delete an exercise definition
    #[command(visible_alias = "d")]
    Delete {
        /// Exercise index or name
        exercise: String,
    },
}

#[derive(Subcommand)]
pub enum StatsCmd {
    /// Per-week volume, intensity and completion
    Weekly { program: String },

    /// Lifetime per-exercise metrics for an athlete
    Exercises {
        #[arg(short, long)]
        athlete: Option<String>,

        /// Restrict to one exercise definition (index or name)
        #[arg(short, long)]
        exercise: Option<String>,
    },

    /// Lifetime totals and streaks for an athlete
    Overall {
        #[arg(short, long)]
        athlete: Option<String>,
    },

    /// Week-over-week intensity classification
    Trends { program: String },

    /// Week-over-week volume comparison
    Volume { program: String },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
