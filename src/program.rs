use chrono::{DateTime, Utc};

use crate::{
    error::{DomainError, DomainResult},
    models::{ExerciseSet, Program, Week, WorkoutDay, WorkoutExercise},
};

/// Optional measurements applied when a set is completed or edited.
/// Fields left as `None` keep whatever the set already holds.
#[derive(Debug, Clone, Default)]
pub struct SetOverrides {
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub duration_seconds: Option<u32>,
    pub distance: Option<f32>,
    pub difficulty: Option<u32>,
    pub intensity: Option<f32>,
    pub notes: Option<String>,
}

impl SetOverrides {
    fn apply(&self, set: &mut ExerciseSet) {
        if let Some(r) = self.reps {
            set.reps = Some(r);
        }
        if let Some(w) = self.weight {
            set.weight = Some(w);
        }
        if let Some(d) = self.duration_seconds {
            set.duration_seconds = Some(d);
        }
        if let Some(d) = self.distance {
            set.distance = Some(d);
        }
        if let Some(d) = self.difficulty {
            set.difficulty = Some(d);
        }
        if let Some(i) = self.intensity {
            set.intensity = Some(i);
        }
        if let Some(n) = &self.notes {
            set.notes = Some(n.clone());
        }
    }
}

impl Program {
    /// Adds an empty week. Week numbers start at 1 and are unique
    /// within the programme; the list stays sorted by number.
    pub fn add_week(&mut self, week_number: u32, notes: Option<String>) -> DomainResult<&mut Week> {
        if week_number == 0 {
            return Err(DomainError::InvalidWeekNumber(week_number));
        }
        if self.week_by_number(week_number).is_some() {
            return Err(DomainError::DuplicateWeek(week_number));
        }

        let pos = self
            .weeks
            .iter()
            .position(|w| w.week_number > week_number)
            .unwrap_or(self.weeks.len());
        self.weeks.insert(pos, Week::new(week_number, notes));

        Ok(&mut self.weeks[pos])
    }

    pub fn update_week(
        &mut self,
        week_id: &str,
        is_completed: bool,
        notes: Option<String>,
    ) -> DomainResult<&mut Week> {
        let week = self.week_mut(week_id).ok_or(DomainError::WeekNotFound)?;
        week.is_completed = is_completed;
        if notes.is_some() {
            week.notes = notes;
        }

        Ok(week)
    }

    pub fn add_day(&mut self, week_id: &str, day: WorkoutDay) -> DomainResult<&mut WorkoutDay> {
        let week = self.week_mut(week_id).ok_or(DomainError::WeekNotFound)?;
        week.days.push(day);

        let last = week.days.len() - 1;
        Ok(&mut week.days[last])
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Finds a day anywhere in the tree. Handy for the command layer,
    /// which addresses days by id after resolving user input.
    pub fn day_mut(&mut self, day_id: &str) -> Option<&mut WorkoutDay> {
        self.weeks.iter_mut().find_map(|w| w.day_mut(day_id))
    }
}

impl WorkoutDay {
    /// Appends an exercise slot at the end of the day. The caller must
    /// have checked `exercise_id` against the definition catalogue.
    pub fn add_exercise(&mut self, mut exercise: WorkoutExercise) -> &mut WorkoutExercise {
        let next = self.exercises.iter().map(|e| e.order_index + 1).max().unwrap_or(0);
        exercise.order_index = next;
        self.exercises.push(exercise);

        let last = self.exercises.len() - 1;
        &mut self.exercises[last]
    }

    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != exercise_id);
        self.exercises.len() != before
    }

    /// Rewrites `order_index` so each exercise sits at its position in
    /// `ordered_ids`. The list must be a complete permutation of the
    /// day's exercises; partial lists are rejected and nothing moves.
    pub fn reorder_exercises(&mut self, ordered_ids: &[String]) -> DomainResult<()> {
        if ordered_ids.len() != self.exercises.len() {
            return Err(DomainError::IncompleteReorder);
        }
        for id in ordered_ids {
            if self.exercise(id).is_none() {
                return Err(DomainError::IncompleteReorder);
            }
        }
        let mut seen = std::collections::HashSet::new();
        if !ordered_ids.iter().all(|id| seen.insert(id)) {
            return Err(DomainError::IncompleteReorder);
        }

        for (pos, id) in ordered_ids.iter().enumerate() {
            if let Some(ex) = self.exercise_mut(id) {
                ex.order_index = pos as u32;
            }
        }
        self.exercises.sort_by_key(|e| e.order_index);

        Ok(())
    }

    /// Marks the day complete and cascades the same timestamp to every
    /// set that is still open.
    pub fn complete(&mut self, completed_at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_date = Some(completed_at.date_naive());

        for exercise in &mut self.exercises {
            for set in &mut exercise.sets {
                if !set.is_completed {
                    set.is_completed = true;
                    set.completed_at = Some(completed_at);
                }
            }
        }
    }
}

impl WorkoutExercise {
    /// Appends a set numbered one past the current maximum.
    pub fn add_set(&mut self) -> &mut ExerciseSet {
        let number = self.max_set_number() + 1;
        self.sets.push(ExerciseSet::new(number));

        let last = self.sets.len() - 1;
        &mut self.sets[last]
    }

    pub fn update_set(&mut self, set_id: &str, overrides: &SetOverrides) -> DomainResult<&mut ExerciseSet> {
        let set = self.set_mut(set_id).ok_or(DomainError::SetNotFound)?;
        overrides.apply(set);

        Ok(set)
    }

    /// Removes a set and renumbers the rest so numbers stay contiguous
    /// from 1, in prior `set_number` order.
    pub fn delete_set(&mut self, set_id: &str) -> DomainResult<()> {
        let before = self.sets.len();
        self.sets.retain(|s| s.id != set_id);
        if self.sets.len() == before {
            return Err(DomainError::SetNotFound);
        }

        self.sets.sort_by_key(|s| s.set_number);
        for (i, set) in self.sets.iter_mut().enumerate() {
            set.set_number = i as u32 + 1;
        }

        Ok(())
    }

    /// Applies any provided overrides, then marks the set complete.
    /// Repeated calls refresh `completed_at`.
    pub fn complete_set(
        &mut self,
        set_id: &str,
        overrides: &SetOverrides,
        now: DateTime<Utc>,
    ) -> DomainResult<&mut ExerciseSet> {
        let set = self.set_mut(set_id).ok_or(DomainError::SetNotFound)?;
        overrides.apply(set);
        set.is_completed = true;
        set.completed_at = Some(now);

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn program() -> Program {
        Program::new(
            "ana",
            "Strength Block",
            None,
            4,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        )
    }

    fn exercise(def: &str) -> WorkoutExercise {
        WorkoutExercise {
            id: uuid::Uuid::new_v4().to_string(),
            exercise_id: def.to_string(),
            order_index: 0,
            target_sets: 3,
            target_reps: 8,
            target_weight: None,
            target_duration_seconds: None,
            target_distance: None,
            rest_seconds: Some(120),
            target_rpe: None,
            superset_group_id: None,
            superset_rest_seconds: None,
            sets: Vec::new(),
        }
    }

    #[test]
    fn duplicate_week_number_is_rejected() {
        let mut p = program();
        p.add_week(1, None).unwrap();
        p.add_week(2, None).unwrap();

        let err = p.add_week(2, Some("again".into())).unwrap_err();
        assert_eq!(err, DomainError::DuplicateWeek(2));
        assert_eq!(p.weeks.len(), 2);
    }

    #[test]
    fn week_zero_is_rejected() {
        let mut p = program();
        assert_eq!(p.add_week(0, None).unwrap_err(), DomainError::InvalidWeekNumber(0));
        assert!(p.weeks.is_empty());
    }

    #[test]
    fn weeks_stay_sorted_by_number() {
        let mut p = program();
        p.add_week(3, None).unwrap();
        p.add_week(1, None).unwrap();
        p.add_week(2, None).unwrap();

        let numbers: Vec<u32> = p.weeks.iter().map(|w| w.week_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn reorder_applies_positions() {
        let mut day = WorkoutDay::new("Push", None, false, None);
        let a = day.add_exercise(exercise("bench")).id.clone();
        let b = day.add_exercise(exercise("ohp")).id.clone();
        let c = day.add_exercise(exercise("dips")).id.clone();

        day.reorder_exercises(&[c.clone(), a.clone(), b.clone()]).unwrap();

        let order: Vec<(String, u32)> = day
            .exercises
            .iter()
            .map(|e| (e.id.clone(), e.order_index))
            .collect();
        assert_eq!(order, vec![(c, 0), (a, 1), (b, 2)]);
    }

    #[test]
    fn partial_reorder_is_rejected_and_leaves_indices_alone() {
        let mut day = WorkoutDay::new("Pull", None, false, None);
        let a = day.add_exercise(exercise("row")).id.clone();
        let _b = day.add_exercise(exercise("curl")).id.clone();

        let err = day.reorder_exercises(&[a]).unwrap_err();
        assert_eq!(err, DomainError::IncompleteReorder);

        let indices: Vec<u32> = day.exercises.iter().map(|e| e.order_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn reorder_rejects_foreign_ids() {
        let mut day = WorkoutDay::new("Legs", None, false, None);
        let a = day.add_exercise(exercise("squat")).id.clone();
        let _b = day.add_exercise(exercise("rdl")).id.clone();

        let err = day
            .reorder_exercises(&[a, "not-a-real-id".to_string()])
            .unwrap_err();
        assert_eq!(err, DomainError::IncompleteReorder);
    }

    #[test]
    fn delete_set_renumbers_contiguously() {
        let mut ex = exercise("bench");
        ex.add_set();
        let second = ex.add_set().id.clone();
        ex.add_set();

        ex.delete_set(&second).unwrap();

        let numbers: Vec<u32> = ex.sets.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn complete_set_applies_overrides_and_stamps() {
        let mut ex = exercise("bench");
        let id = ex.add_set().id.clone();
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 18, 30, 0).unwrap();

        let overrides = SetOverrides {
            reps: Some(8),
            weight: Some(92.5),
            intensity: Some(8.0),
            ..Default::default()
        };
        ex.complete_set(&id, &overrides, now).unwrap();

        let set = &ex.sets[0];
        assert!(set.is_completed);
        assert_eq!(set.completed_at, Some(now));
        assert_eq!(set.reps, Some(8));
        assert_eq!(set.weight, Some(92.5));
        // untouched fields stay untouched
        assert_eq!(set.distance, None);
    }

    #[test]
    fn complete_day_cascades_to_open_sets_only() {
        let mut day = WorkoutDay::new("Push", None, false, None);
        let ex_id = day.add_exercise(exercise("bench")).id.clone();

        let earlier = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 19, 0, 0).unwrap();

        let ex = day.exercise_mut(&ex_id).unwrap();
        let done = ex.add_set().id.clone();
        ex.add_set();
        ex.complete_set(&done, &SetOverrides::default(), earlier).unwrap();

        day.complete(now);

        assert!(day.is_completed);
        assert_eq!(day.completed_date, Some(now.date_naive()));
        let ex = day.exercise(&ex_id).unwrap();
        assert_eq!(ex.sets[0].completed_at, Some(earlier));
        assert_eq!(ex.sets[1].completed_at, Some(now));
    }
}
