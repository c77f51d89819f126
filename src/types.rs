use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use strsim::jaro_winkler;

#[derive(Clone, Debug, ValueEnum, Serialize, Deserialize, Type)]
#[sqlx(type_name = "TEXT")]
#[serde(rename_all = "kebab-case")]
pub enum Muscle {
    Biceps,
    Triceps,
    Forearms,
    Chest,
    Shoulders,
    Back,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Abs,
}

impl Display for Muscle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
            Self::Forearms => "forearms",
            Self::Chest => "chest",
            Self::Shoulders => "shoulders",
            Self::Back => "back",
            Self::Quads => "quads",
            Self::Hamstrings => "hamstrings",
            Self::Glutes => "glutes",
            Self::Calves => "calves",
            Self::Abs => "abs",
        };

        write!(f, "{}", s)
    }
}

pub static ALLOWED_MUSCLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "biceps",
        "triceps",
        "forearms",
        "chest",
        "shoulders",
        "back",
        "quads",
        "hamstrings",
        "glutes",
        "calves",
        "abs",
    ])
});

/// Returns the canonical lowercase muscle name or `None` if not allowed.
pub fn canonical_muscle<S: AsRef<str>>(m: S) -> Option<String> {
    let m = m.as_ref().to_ascii_lowercase();
    if ALLOWED_MUSCLES.contains(m.as_str()) {
        Some(m)
    } else {
        None
    }
}

/// Return the closest allowed muscle for `input`
/// if similarity is high *and* clearly better than the runner-up.
/// Otherwise return `None` (no suggestion shown).
pub fn best_muscle_suggestion(input: &str) -> Option<&'static str> {
    let inp = input.to_ascii_lowercase();

    let mut scores: Vec<(&'static str, f64)> = ALLOWED_MUSCLES
        .iter()
        .copied()
        .map(|m| (m, jaro_winkler(&inp, m)))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (best_muscle, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best_muscle)
    } else {
        None
    }
}

#[derive(Deserialize)]
pub struct ExerciseDef {
    pub name: String,
    pub description: Option<String>,
    pub primary_muscle: String,
}

#[derive(Deserialize)]
pub struct ExerciseImport {
    pub exercise: Vec<ExerciseDef>,
}

/// Output selector for the global `--json` flag.
#[derive(Clone, Copy)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Emits `value` as pretty JSON, or runs the text printer.
pub fn emit<T: Serialize>(fmt: OutputFmt, value: &T, pretty: impl FnOnce()) {
    match fmt {
        OutputFmt::Json => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default())
        }
        OutputFmt::Text => pretty(),
    }
}

/// Flat key/value config persisted as TOML in the user config dir.
/// Known keys: `athlete` (default athlete for new programmes).
#[derive(Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config `{}`", path.display()))?;

        toml::from_str(&content).with_context(|| format!("parsing config `{}`", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating config dir `{}`", dir.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config `{}`", path.display()))
    }

    pub fn athlete(&self) -> &str {
        self.map.get("athlete").map(String::as_str).unwrap_or("default")
    }
}
