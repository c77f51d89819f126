use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{DomainError, DomainResult},
    models::{ExerciseSet, Program, Week, WorkoutDay, WorkoutExercise},
};

/// Deep-copy helpers. Every copied entity gets a fresh id and loses
/// its completion state; structure, ordering and targets survive.

fn copy_set(set: &ExerciseSet) -> ExerciseSet {
    ExerciseSet {
        id: Uuid::new_v4().to_string(),
        set_number: set.set_number,
        reps: set.reps,
        weight: set.weight,
        duration_seconds: set.duration_seconds,
        distance: set.distance,
        difficulty: set.difficulty,
        intensity: set.intensity,
        notes: set.notes.clone(),
        is_completed: false,
        completed_at: None,
        set_type: set.set_type,
        drop_percentage: set.drop_percentage,
    }
}

fn copy_exercise(
    exercise: &WorkoutExercise,
    group_ids: &mut HashMap<String, String>,
) -> WorkoutExercise {
    // Superset groups get a fresh id too, one per source group, so the
    // copy stays grouped among its own exercises and never aliases the
    // source's group.
    let superset_group_id = exercise.superset_group_id.as_ref().map(|g| {
        group_ids
            .entry(g.clone())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    });

    WorkoutExercise {
        id: Uuid::new_v4().to_string(),
        exercise_id: exercise.exercise_id.clone(),
        order_index: exercise.order_index,
        target_sets: exercise.target_sets,
        target_reps: exercise.target_reps,
        target_weight: exercise.target_weight,
        target_duration_seconds: exercise.target_duration_seconds,
        target_distance: exercise.target_distance,
        rest_seconds: exercise.rest_seconds,
        target_rpe: exercise.target_rpe,
        superset_group_id,
        superset_rest_seconds: exercise.superset_rest_seconds,
        sets: exercise.sets.iter().map(copy_set).collect(),
    }
}

fn copy_day(day: &WorkoutDay) -> WorkoutDay {
    let mut group_ids = HashMap::new();
    WorkoutDay {
        id: Uuid::new_v4().to_string(),
        name: day.name.clone(),
        description: day.description.clone(),
        is_rest_day: day.is_rest_day,
        scheduled_date: day.scheduled_date,
        completed_date: None,
        is_completed: false,
        exercises: day
            .exercises
            .iter()
            .map(|e| copy_exercise(e, &mut group_ids))
            .collect(),
    }
}

impl Program {
    /// Copies a whole week into a new week with `target_number`.
    /// Fails when the number is invalid or already taken; the source
    /// week is never touched.
    pub fn copy_week(&mut self, source_week_id: &str, target_number: u32) -> DomainResult<&Week> {
        if target_number == 0 {
            return Err(DomainError::InvalidWeekNumber(target_number));
        }
        if self.week_by_number(target_number).is_some() {
            return Err(DomainError::DuplicateWeek(target_number));
        }
        let source = self.week(source_week_id).ok_or(DomainError::WeekNotFound)?;

        let week = Week {
            id: Uuid::new_v4().to_string(),
            week_number: target_number,
            notes: source.notes.clone(),
            is_completed: false,
            days: source.days.iter().map(copy_day).collect(),
        };

        let pos = self
            .weeks
            .iter()
            .position(|w| w.week_number > target_number)
            .unwrap_or(self.weeks.len());
        self.weeks.insert(pos, week);

        Ok(&self.weeks[pos])
    }

    /// Appends copies of the source week's days into an existing
    /// target week. Additive: whatever the target already holds stays.
    pub fn copy_week_content(&mut self, source_week_id: &str, target_week_id: &str) -> DomainResult<&Week> {
        if source_week_id == target_week_id {
            return Err(DomainError::SameWeekCopy);
        }
        if self.week(target_week_id).is_none() {
            return Err(DomainError::WeekNotFound);
        }
        let source = self.week(source_week_id).ok_or(DomainError::WeekNotFound)?;

        let copied: Vec<WorkoutDay> = source.days.iter().map(copy_day).collect();
        let target = self
            .week_mut(target_week_id)
            .ok_or(DomainError::WeekNotFound)?;
        target.days.extend(copied);

        Ok(self.week(target_week_id).ok_or(DomainError::WeekNotFound)?)
    }

    /// Clones the whole programme for another athlete: fresh ids
    /// everywhere, completion reset, name suffixed " (Copy)", start
    /// date set to `today`, deactivated until the caller decides
    /// otherwise.
    pub fn clone_for(&self, target_athlete: &str, today: NaiveDate) -> Program {
        let mut weeks: Vec<Week> = self
            .weeks
            .iter()
            .map(|w| Week {
                id: Uuid::new_v4().to_string(),
                week_number: w.week_number,
                notes: w.notes.clone(),
                is_completed: false,
                days: w.days.iter().map(copy_day).collect(),
            })
            .collect();
        weeks.sort_by_key(|w| w.week_number);

        Program {
            id: Uuid::new_v4().to_string(),
            athlete: target_athlete.to_string(),
            name: format!("{} (Copy)", self.name),
            description: self.description.clone(),
            duration_weeks: self.duration_weeks,
            start_date: today,
            end_date: None,
            is_active: false,
            weeks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::SetOverrides;
    use chrono::{TimeZone, Utc};

    fn seeded_program() -> Program {
        let mut p = Program::new(
            "ana",
            "Hypertrophy",
            Some("12-week block".into()),
            4,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        );
        p.add_week(1, Some("intro".into())).unwrap();
        let week_id = p.weeks[0].id.clone();

        let day = p
            .add_day(&week_id, WorkoutDay::new("Push", Some("chest focus".into()), false, None))
            .unwrap();
        let ex = day.add_exercise(WorkoutExercise {
            id: Uuid::new_v4().to_string(),
            exercise_id: "bench".to_string(),
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
        ex.generate_drop_sets(90.0, 8, 1, 15.0, 2);
        let set_id = ex.sets[0].id.clone();
        ex.complete_set(
            &set_id,
            &SetOverrides::default(),
            Utc.with_ymd_and_hms(2026, 1, 6, 18, 0, 0).unwrap(),
        )
        .unwrap();

        let day_id = p.weeks[0].days[0].id.clone();
        p.day_mut(&day_id)
            .unwrap()
            .complete(Utc.with_ymd_and_hms(2026, 1, 6, 19, 0, 0).unwrap());

        p
    }

    #[test]
    fn copy_week_resets_completion_but_preserves_structure() {
        let mut p = seeded_program();
        let source_id = p.weeks[0].id.clone();

        p.copy_week(&source_id, 2).unwrap();

        let copy = p.week_by_number(2).unwrap();
        assert_ne!(copy.id, source_id);
        assert_eq!(copy.notes.as_deref(), Some("intro"));
        assert!(!copy.is_completed);

        let day = &copy.days[0];
        assert_eq!(day.name, "Push");
        assert!(!day.is_completed);
        assert_eq!(day.completed_date, None);

        let ex = &day.exercises[0];
        assert_eq!(ex.target_weight, Some(90.0));
        assert_eq!(ex.rest_seconds, Some(150));
        assert_eq!(ex.sets.len(), 2);
        assert!(ex.sets.iter().all(|s| !s.is_completed && s.completed_at.is_none()));
        assert_eq!(ex.sets[1].set_type, crate::models::SetType::DropSet);
        assert_eq!(ex.sets[1].drop_percentage, Some(15.0));

        // the source keeps its completion state
        let source = p.week(&source_id).unwrap();
        assert!(source.days[0].is_completed);
    }

    #[test]
    fn copy_week_remaps_superset_groups_to_fresh_ids() {
        let mut p = seeded_program();
        let week_id = p.weeks[0].id.clone();

        let day = p.week_mut(&week_id).unwrap().days.first_mut().unwrap();
        let a = day.exercises[0].id.clone();
        let b = day
            .add_exercise(WorkoutExercise {
                id: Uuid::new_v4().to_string(),
                exercise_id: "ohp".to_string(),
                order_index: 0,
                target_sets: 3,
                target_reps: 10,
                target_weight: None,
                target_duration_seconds: None,
                target_distance: None,
                rest_seconds: None,
                target_rpe: None,
                superset_group_id: None,
                superset_rest_seconds: None,
                sets: Vec::new(),
            })
            .id
            .clone();
        let source_group = day.group_superset(&[a, b], 90).unwrap();

        p.copy_week(&week_id, 2).unwrap();

        let copied = &p.week_by_number(2).unwrap().days[0];
        let copied_groups: Vec<&str> = copied
            .exercises
            .iter()
            .filter_map(|e| e.superset_group_id.as_deref())
            .collect();
        assert_eq!(copied_groups.len(), 2);
        // still one group within the copy, but never the source's id
        assert_eq!(copied_groups[0], copied_groups[1]);
        assert_ne!(copied_groups[0], source_group.as_str());

        // dissolving the copy's group leaves the source week grouped
        let copied_group = copied_groups[0].to_string();
        assert!(p.ungroup_superset(&copied_group));
        let source_day = &p.week(&week_id).unwrap().days[0];
        assert!(
            source_day
                .exercises
                .iter()
                .all(|e| e.superset_group_id.as_deref() == Some(source_group.as_str()))
        );
    }

    #[test]
    fn copy_week_rejects_taken_number() {
        let mut p = seeded_program();
        let source_id = p.weeks[0].id.clone();

        assert_eq!(p.copy_week(&source_id, 1).unwrap_err(), DomainError::DuplicateWeek(1));
        assert_eq!(p.copy_week(&source_id, 0).unwrap_err(), DomainError::InvalidWeekNumber(0));
        assert_eq!(p.weeks.len(), 1);
    }

    #[test]
    fn copy_week_content_appends_without_replacing() {
        let mut p = seeded_program();
        let source_id = p.weeks[0].id.clone();
        p.add_week(2, None).unwrap();
        let target_id = p.week_by_number(2).unwrap().id.clone();
        p.add_day(&target_id, WorkoutDay::new("Existing", None, true, None))
            .unwrap();

        p.copy_week_content(&source_id, &target_id).unwrap();

        let target = p.week(&target_id).unwrap();
        assert_eq!(target.days.len(), 2);
        assert_eq!(target.days[0].name, "Existing");
        assert_eq!(target.days[1].name, "Push");
        assert!(!target.days[1].is_completed);
    }

    #[test]
    fn copy_week_content_onto_itself_is_rejected() {
        let mut p = seeded_program();
        let id = p.weeks[0].id.clone();

        assert_eq!(p.copy_week_content(&id, &id).unwrap_err(), DomainError::SameWeekCopy);
    }

    #[test]
    fn clone_resets_everything_and_renames() {
        let p = seeded_program();
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let clone = p.clone_for("bruno", today);

        assert_ne!(clone.id, p.id);
        assert_eq!(clone.athlete, "bruno");
        assert_eq!(clone.name, "Hypertrophy (Copy)");
        assert_eq!(clone.description.as_deref(), Some("12-week block"));
        assert_eq!(clone.start_date, today);
        assert!(!clone.is_active);

        let day = &clone.weeks[0].days[0];
        assert!(!day.is_completed);
        assert!(day.exercises[0].sets.iter().all(|s| !s.is_completed));
        assert_ne!(day.id, p.weeks[0].days[0].id);
        assert_ne!(day.exercises[0].id, p.weeks[0].days[0].exercises[0].id);
    }
}
