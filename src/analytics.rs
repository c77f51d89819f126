use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    models::{ExerciseSet, Program, Week},
    utils::round1,
};

/// Read-only aggregation over hydrated programme trees. Nothing in
/// here mutates the aggregate; completed sets and completed non-rest
/// days are the only inputs.

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyMetric {
    pub week_number: u32,
    pub total_volume: f64,
    pub average_intensity: f64,
    pub workouts_completed: u32,
    pub workouts_planned: u32,
    pub total_sets: u32,
    pub total_reps: u64,
    pub total_duration_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub week_number: u32,
    pub volume: f64,
    pub max_weight: f64,
    pub reps: u64,
    pub average_intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseMetric {
    pub exercise_id: String,
    pub total_volume: f64,
    pub max_weight: f64,
    pub total_sets: u32,
    pub total_reps: u64,
    pub average_reps: f64,
    pub average_weight: f64,
    pub progress: Vec<ProgressPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallStats {
    pub total_workouts_completed: u32,
    pub total_sets_completed: u32,
    pub total_reps_performed: u64,
    pub total_volume_lifted: f64,
    pub total_training_seconds: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        };

        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntensityTrend {
    pub week_number: u32,
    pub average_intensity: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeComparisonRow {
    pub week_number: u32,
    pub total_volume: f64,
    pub percentage_change: f64,
}

/// Average intensity shifts smaller than this are reported as stable.
const TREND_THRESHOLD: f64 = 0.3;

fn completed_sets(week: &Week) -> impl Iterator<Item = &ExerciseSet> {
    week.days
        .iter()
        .flat_map(|d| d.exercises.iter())
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.is_completed)
}

fn volume_of(set: &ExerciseSet) -> Option<f64> {
    match (set.weight, set.reps) {
        (Some(w), Some(r)) => Some(w as f64 * r as f64),
        _ => None,
    }
}

/// Zero-on-empty mean. Missing intensities fall out of the average
/// instead of dragging it down; an all-empty week reads 0, not NaN.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn weekly_progress(program: &Program) -> Vec<WeeklyMetric> {
    program
        .weeks
        .iter()
        .sorted_by_key(|w| w.week_number)
        .map(|week| {
            let mut total_volume = 0.0;
            let mut intensities = Vec::new();
            let mut total_sets = 0u32;
            let mut total_reps = 0u64;
            let mut total_duration = 0u64;

            for set in completed_sets(week) {
                total_sets += 1;
                if let Some(v) = volume_of(set) {
                    total_volume += v;
                }
                if let Some(i) = set.intensity {
                    intensities.push(i as f64);
                }
                total_reps += set.reps.unwrap_or(0) as u64;
                total_duration += set.duration_seconds.unwrap_or(0) as u64;
            }

            let training_days = week.days.iter().filter(|d| !d.is_rest_day);
            WeeklyMetric {
                week_number: week.week_number,
                total_volume,
                average_intensity: mean(&intensities),
                workouts_completed: training_days.clone().filter(|d| d.is_completed).count() as u32,
                workouts_planned: training_days.count() as u32,
                total_sets,
                total_reps,
                total_duration_seconds: total_duration,
            }
        })
        .collect()
}

/// Per-definition lifetime metrics across all of an athlete's
/// programmes, heaviest total volume first. `filter` narrows the
/// result to one definition id.
pub fn exercise_metrics(programs: &[Program], filter: Option<&str>) -> Vec<ExerciseMetric> {
    struct CompletedRow<'a> {
        week_number: u32,
        set: &'a ExerciseSet,
    }

    let mut by_exercise: BTreeMap<&str, Vec<CompletedRow<'_>>> = BTreeMap::new();
    for program in programs {
        for week in &program.weeks {
            for day in &week.days {
                for ex in &day.exercises {
                    if filter.is_some_and(|f| f != ex.exercise_id) {
                        continue;
                    }
                    for set in ex.sets.iter().filter(|s| s.is_completed) {
                        by_exercise
                            .entry(ex.exercise_id.as_str())
                            .or_default()
                            .push(CompletedRow {
                                week_number: week.week_number,
                                set,
                            });
                    }
                }
            }
        }
    }

    let mut metrics: Vec<ExerciseMetric> = by_exercise
        .into_iter()
        .map(|(exercise_id, rows)| {
            let total_volume: f64 = rows.iter().filter_map(|r| volume_of(r.set)).sum();
            let max_weight = rows
                .iter()
                .filter_map(|r| r.set.weight)
                .fold(0.0f64, |acc, w| acc.max(w as f64));
            let total_reps: u64 = rows.iter().map(|r| r.set.reps.unwrap_or(0) as u64).sum();
            let weights: Vec<f64> = rows.iter().filter_map(|r| r.set.weight.map(|w| w as f64)).collect();
            let reps: Vec<f64> = rows.iter().filter_map(|r| r.set.reps.map(|x| x as f64)).collect();

            // one point per completion date, chronological
            let by_date = rows
                .iter()
                .filter_map(|r| r.set.completed_at.map(|at| (at.date_naive(), r)))
                .into_group_map();
            let progress = by_date
                .into_iter()
                .sorted_by_key(|(date, _)| *date)
                .map(|(date, day_rows)| ProgressPoint {
                    date,
                    week_number: day_rows.first().map(|r| r.week_number).unwrap_or(0),
                    volume: day_rows.iter().filter_map(|r| volume_of(r.set)).sum(),
                    max_weight: day_rows
                        .iter()
                        .filter_map(|r| r.set.weight)
                        .fold(0.0f64, |acc, w| acc.max(w as f64)),
                    reps: day_rows.iter().map(|r| r.set.reps.unwrap_or(0) as u64).sum(),
                    average_intensity: mean(
                        &day_rows
                            .iter()
                            .filter_map(|r| r.set.intensity.map(|i| i as f64))
                            .collect::<Vec<_>>(),
                    ),
                })
                .collect();

            ExerciseMetric {
                exercise_id: exercise_id.to_string(),
                total_volume,
                max_weight,
                total_sets: rows.len() as u32,
                total_reps,
                average_reps: mean(&reps),
                average_weight: mean(&weights),
                progress,
            }
        })
        .collect();

    metrics.sort_by(|a, b| b.total_volume.partial_cmp(&a.total_volume).unwrap_or(std::cmp::Ordering::Equal));
    metrics
}

/// Distinct calendar dates with a completed non-rest workout, sorted.
fn training_dates(programs: &[Program]) -> Vec<NaiveDate> {
    programs
        .iter()
        .flat_map(|p| p.weeks.iter())
        .flat_map(|w| w.days.iter())
        .filter(|d| d.is_completed && !d.is_rest_day)
        .filter_map(|d| d.completed_date)
        .sorted()
        .dedup()
        .collect()
}

/// Two consecutive training dates chain when at most one calendar day
/// sits between them.
const MAX_STREAK_GAP: i64 = 2;

fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        run = match prev {
            Some(p) if (date - p).num_days() <= MAX_STREAK_GAP => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    longest
}

/// Counts backward from today. A streak is only "current" while its
/// last training day is today or yesterday; beyond that it has lapsed
/// even under the gap rule.
fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&last) = dates.last() else { return 0 };
    if (today - last).num_days() > 1 {
        return 0;
    }

    let mut streak = 1u32;
    for pair in dates.windows(2).rev() {
        if (pair[1] - pair[0]).num_days() <= MAX_STREAK_GAP {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

pub fn overall_stats(programs: &[Program], today: NaiveDate) -> OverallStats {
    let mut total_sets = 0u32;
    let mut total_reps = 0u64;
    let mut total_volume = 0.0;
    let mut total_seconds = 0u64;

    for program in programs {
        for week in &program.weeks {
            for set in completed_sets(week) {
                total_sets += 1;
                total_reps += set.reps.unwrap_or(0) as u64;
                if let Some(v) = volume_of(set) {
                    total_volume += v;
                }
                total_seconds += set.duration_seconds.unwrap_or(0) as u64;
            }
        }
    }

    let dates = training_dates(programs);
    let total_workouts = programs
        .iter()
        .flat_map(|p| p.weeks.iter())
        .flat_map(|w| w.days.iter())
        .filter(|d| d.is_completed && !d.is_rest_day)
        .count() as u32;

    OverallStats {
        total_workouts_completed: total_workouts,
        total_sets_completed: total_sets,
        total_reps_performed: total_reps,
        total_volume_lifted: total_volume,
        total_training_seconds: total_seconds,
        current_streak: current_streak(&dates, today),
        longest_streak: longest_streak(&dates),
    }
}

pub fn intensity_trends(program: &Program) -> Vec<IntensityTrend> {
    let weekly = weekly_progress(program);
    let mut out = Vec::with_capacity(weekly.len());
    let mut prev: Option<f64> = None;

    for metric in weekly {
        let trend = match prev {
            None => Trend::Stable,
            Some(p) => {
                let delta = metric.average_intensity - p;
                if delta > TREND_THRESHOLD {
                    Trend::Increasing
                } else if delta < -TREND_THRESHOLD {
                    Trend::Decreasing
                } else {
                    Trend::Stable
                }
            }
        };
        prev = Some(metric.average_intensity);
        out.push(IntensityTrend {
            week_number: metric.week_number,
            average_intensity: metric.average_intensity,
            trend,
        });
    }

    out
}

pub fn volume_comparison(program: &Program) -> Vec<VolumeComparisonRow> {
    let weekly = weekly_progress(program);
    let mut out = Vec::with_capacity(weekly.len());
    let mut prev: Option<f64> = None;

    for metric in weekly {
        let percentage_change = match prev {
            Some(p) if p != 0.0 => round1((metric.total_volume - p) / p * 100.0),
            _ => 0.0,
        };
        prev = Some(metric.total_volume);
        out.push(VolumeComparisonRow {
            week_number: metric.week_number,
            total_volume: metric.total_volume,
            percentage_change,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::WorkoutDay, program::SetOverrides};
    use chrono::{TimeZone, Utc};

    fn day_completed_on(name: &str, date: NaiveDate) -> WorkoutDay {
        let mut day = WorkoutDay::new(name, None, false, None);
        day.is_completed = true;
        day.completed_date = Some(date);
        day
    }

    fn program_with_weeks(blocks: &[(u32, Vec<(f32, u32, Option<f32>)>)]) -> Program {
        // each tuple: (weight, reps, intensity) for one completed set
        let mut p = Program::new(
            "ana",
            "Block",
            None,
            blocks.len() as u32,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        );
        for (number, sets) in blocks {
            p.add_week(*number, None).unwrap();
            let week_id = p.week_by_number(*number).unwrap().id.clone();
            let day = p
                .add_day(&week_id, WorkoutDay::new("Day", None, false, None))
                .unwrap();
            let ex = day.add_exercise(crate::models::WorkoutExercise {
                id: uuid::Uuid::new_v4().to_string(),
                exercise_id: "squat".to_string(),
                order_index: 0,
                target_sets: sets.len() as u32,
                target_reps: 5,
                target_weight: None,
                target_duration_seconds: None,
                target_distance: None,
                rest_seconds: None,
                target_rpe: None,
                superset_group_id: None,
                superset_rest_seconds: None,
                sets: Vec::new(),
            });
            for (weight, reps, intensity) in sets {
                let id = ex.add_set().id.clone();
                ex.complete_set(
                    &id,
                    &SetOverrides {
                        weight: Some(*weight),
                        reps: Some(*reps),
                        intensity: *intensity,
                        ..Default::default()
                    },
                    Utc.with_ymd_and_hms(2026, 1, 5 + *number, 18, 0, 0).unwrap(),
                )
                .unwrap();
            }
        }

        p
    }

    #[test]
    fn weekly_progress_sums_volume_and_defaults_intensity_to_zero() {
        let p = program_with_weeks(&[(1, vec![(100.0, 5, None), (80.0, 10, None)])]);

        let weekly = weekly_progress(&p);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].total_volume, 1300.0);
        assert_eq!(weekly[0].average_intensity, 0.0);
        assert_eq!(weekly[0].total_sets, 2);
        assert_eq!(weekly[0].total_reps, 15);
        assert_eq!(weekly[0].workouts_planned, 1);
    }

    #[test]
    fn rest_days_never_count_as_planned_workouts() {
        let mut p = program_with_weeks(&[(1, vec![(60.0, 8, None)])]);
        let week_id = p.weeks[0].id.clone();
        p.add_day(&week_id, WorkoutDay::new("Rest", None, true, None)).unwrap();

        let weekly = weekly_progress(&p);
        assert_eq!(weekly[0].workouts_planned, 1);
        assert_eq!(weekly[0].workouts_completed, 0);
    }

    #[test]
    fn exercise_metrics_sort_by_volume_descending() {
        let mut p = program_with_weeks(&[(1, vec![(100.0, 5, Some(8.0))])]);
        let week_id = p.weeks[0].id.clone();
        let day = p.add_day(&week_id, WorkoutDay::new("Accessory", None, false, None)).unwrap();
        let ex = day.add_exercise(crate::models::WorkoutExercise {
            id: uuid::Uuid::new_v4().to_string(),
            exercise_id: "curl".to_string(),
            order_index: 0,
            target_sets: 1,
            target_reps: 12,
            target_weight: None,
            target_duration_seconds: None,
            target_distance: None,
            rest_seconds: None,
            target_rpe: None,
            superset_group_id: None,
            superset_rest_seconds: None,
            sets: Vec::new(),
        });
        let id = ex.add_set().id.clone();
        ex.complete_set(
            &id,
            &SetOverrides {
                weight: Some(20.0),
                reps: Some(12),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2026, 1, 7, 10, 0, 0).unwrap(),
        )
        .unwrap();

        let metrics = exercise_metrics(std::slice::from_ref(&p), None);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].exercise_id, "squat");
        assert_eq!(metrics[0].total_volume, 500.0);
        assert_eq!(metrics[1].exercise_id, "curl");
        assert_eq!(metrics[1].total_volume, 240.0);
        assert_eq!(metrics[1].progress.len(), 1);
        assert_eq!(metrics[1].progress[0].max_weight, 20.0);

        let filtered = exercise_metrics(std::slice::from_ref(&p), Some("curl"));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn streak_allows_one_skipped_day() {
        // Mon, Tue, Thu evaluated on Thu
        let mon = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let tue = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let thu = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();

        assert_eq!(current_streak(&[mon, tue, thu], thu), 3);
        assert_eq!(longest_streak(&[mon, tue, thu]), 3);
    }

    #[test]
    fn streak_breaks_on_long_gap() {
        // Mon and Fri, evaluated on Fri
        let mon = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let fri = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();

        assert_eq!(current_streak(&[mon, fri], fri), 1);
        assert_eq!(longest_streak(&[mon, fri]), 1);
    }

    #[test]
    fn lapsed_streak_reads_zero() {
        let mon = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let thu = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();

        assert_eq!(current_streak(&[mon], thu), 0);
        assert_eq!(current_streak(&[], thu), 0);
    }

    #[test]
    fn overall_stats_counts_workouts_and_streaks() {
        let mut p = program_with_weeks(&[(1, vec![(100.0, 5, None)])]);
        let week_id = p.weeks[0].id.clone();
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        p.add_day(&week_id, day_completed_on("A", d1)).unwrap();
        p.add_day(&week_id, day_completed_on("B", d2)).unwrap();

        let stats = overall_stats(std::slice::from_ref(&p), d2);
        assert_eq!(stats.total_workouts_completed, 2);
        assert_eq!(stats.total_sets_completed, 1);
        assert_eq!(stats.total_volume_lifted, 500.0);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn intensity_trends_classify_around_the_threshold() {
        let p = program_with_weeks(&[
            (1, vec![(100.0, 5, Some(7.0))]),
            (2, vec![(100.0, 5, Some(7.2))]),
            (3, vec![(100.0, 5, Some(8.0))]),
            (4, vec![(100.0, 5, Some(7.0))]),
        ]);

        let trends: Vec<Trend> = intensity_trends(&p).iter().map(|t| t.trend).collect();
        assert_eq!(
            trends,
            vec![Trend::Stable, Trend::Stable, Trend::Increasing, Trend::Decreasing]
        );
    }

    #[test]
    fn volume_comparison_rounds_to_one_decimal_and_is_pure() {
        let p = program_with_weeks(&[
            (1, vec![(100.0, 3, None)]),
            (2, vec![(100.0, 4, None)]),
        ]);

        let first = volume_comparison(&p);
        assert_eq!(first[0].percentage_change, 0.0);
        assert_eq!(first[1].percentage_change, 33.3);

        // same unmutated history, same answer
        let second = volume_comparison(&p);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.percentage_change, b.percentage_change);
            assert_eq!(a.total_volume, b.total_volume);
        }
    }

    #[test]
    fn zero_previous_volume_compares_as_zero() {
        let p = program_with_weeks(&[
            (1, vec![]),
            (2, vec![(50.0, 10, None)]),
        ]);

        let rows = volume_comparison(&p);
        assert_eq!(rows[1].percentage_change, 0.0);
    }
}
