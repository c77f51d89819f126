use uuid::Uuid;

use crate::{
    error::{DomainError, DomainResult},
    models::{Program, SetType, WorkoutDay, WorkoutExercise},
    utils::round2,
};

impl WorkoutDay {
    /// Links the named exercises into one superset sharing a fresh
    /// group id and a common rest. Needs at least two distinct ids,
    /// and every id must belong to this day; otherwise nothing is
    /// touched.
    pub fn group_superset(&mut self, exercise_ids: &[String], rest_seconds: u32) -> DomainResult<String> {
        if exercise_ids.len() < 2 {
            return Err(DomainError::InsufficientExercises);
        }
        let mut seen = std::collections::HashSet::new();
        if !exercise_ids.iter().all(|id| seen.insert(id)) {
            return Err(DomainError::DuplicateSupersetMember);
        }
        for id in exercise_ids {
            if self.exercise(id).is_none() {
                return Err(DomainError::ExerciseNotFound);
            }
        }

        let group_id = Uuid::new_v4().to_string();
        for id in exercise_ids {
            if let Some(ex) = self.exercise_mut(id) {
                ex.superset_group_id = Some(group_id.clone());
                ex.superset_rest_seconds = Some(rest_seconds);
            }
        }

        Ok(group_id)
    }
}

impl Program {
    /// Clears the given superset group everywhere in the tree.
    /// Returns false when no exercise carried that group id.
    pub fn ungroup_superset(&mut self, group_id: &str) -> bool {
        let mut found = false;
        for week in &mut self.weeks {
            for day in &mut week.days {
                for ex in &mut day.exercises {
                    if ex.superset_group_id.as_deref() == Some(group_id) {
                        ex.superset_group_id = None;
                        ex.superset_rest_seconds = None;
                        found = true;
                    }
                }
            }
        }

        found
    }
}

impl WorkoutExercise {
    /// Appends a decaying drop-set sequence: one Normal opener at the
    /// starting weight/reps followed by `drops` DropSets, each at
    /// `round2(prev * (1 - pct/100))` kg and `prev + adjustment` reps.
    /// Numbering continues from the exercise's current maximum.
    pub fn generate_drop_sets(
        &mut self,
        starting_weight: f32,
        starting_reps: u32,
        drops: u32,
        drop_percentage: f32,
        reps_adjustment: i32,
    ) -> &[crate::models::ExerciseSet] {
        let base = self.max_set_number() + 1;
        let first = self.sets.len();

        let mut weight = starting_weight;
        let mut reps = starting_reps as i64;

        for i in 0..=drops {
            let mut set = crate::models::ExerciseSet::new(base + i);
            if i > 0 {
                weight = round2(weight * (1.0 - drop_percentage / 100.0));
                reps += reps_adjustment as i64;
                set.set_type = SetType::DropSet;
                set.drop_percentage = Some(drop_percentage);
            }
            set.weight = Some(weight);
            set.reps = Some(reps.max(0) as u32);
            self.sets.push(set);
        }

        &self.sets[first..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutDay;

    fn exercise(def: &str) -> WorkoutExercise {
        WorkoutExercise {
            id: Uuid::new_v4().to_string(),
            exercise_id: def.to_string(),
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
        }
    }

    #[test]
    fn superset_needs_two_exercises() {
        let mut day = WorkoutDay::new("Arms", None, false, None);
        let a = day.add_exercise(exercise("curl")).id.clone();

        let err = day.group_superset(&[a], 60).unwrap_err();
        assert_eq!(err, DomainError::InsufficientExercises);
    }

    #[test]
    fn superset_rejects_duplicate_members() {
        let mut day = WorkoutDay::new("Arms", None, false, None);
        let a = day.add_exercise(exercise("curl")).id.clone();
        let b = day.add_exercise(exercise("pushdown")).id.clone();

        // the same exercise twice must not form a one-exercise group
        let err = day.group_superset(&[a.clone(), a.clone()], 60).unwrap_err();
        assert_eq!(err, DomainError::DuplicateSupersetMember);

        let ids = vec![a, day.exercises[0].id.clone(), b];
        let err = day.group_superset(&ids, 60).unwrap_err();
        assert_eq!(err, DomainError::DuplicateSupersetMember);

        assert!(day.exercises.iter().all(|e| e.superset_group_id.is_none()));
    }

    #[test]
    fn superset_shares_one_group_id() {
        let mut day = WorkoutDay::new("Arms", None, false, None);
        let a = day.add_exercise(exercise("curl")).id.clone();
        let b = day.add_exercise(exercise("pushdown")).id.clone();

        let group = day.group_superset(&[a.clone(), b.clone()], 45).unwrap();

        for id in [&a, &b] {
            let ex = day.exercise(id).unwrap();
            assert_eq!(ex.superset_group_id.as_deref(), Some(group.as_str()));
            assert_eq!(ex.superset_rest_seconds, Some(45));
        }
    }

    #[test]
    fn superset_with_foreign_id_leaves_day_untouched() {
        let mut day = WorkoutDay::new("Arms", None, false, None);
        let a = day.add_exercise(exercise("curl")).id.clone();
        let b = day.add_exercise(exercise("pushdown")).id.clone();

        let err = day
            .group_superset(&[a.clone(), b.clone(), "elsewhere".to_string()], 45)
            .unwrap_err();
        assert_eq!(err, DomainError::ExerciseNotFound);

        assert!(day.exercises.iter().all(|e| e.superset_group_id.is_none()));
        assert!(day.exercises.iter().all(|e| e.superset_rest_seconds.is_none()));
    }

    #[test]
    fn ungroup_clears_across_the_whole_programme() {
        let mut program = Program::new(
            "ana",
            "Block",
            None,
            1,
            chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        );
        program.add_week(1, None).unwrap();
        let week_id = program.weeks[0].id.clone();
        let day = program.add_day(&week_id, WorkoutDay::new("Arms", None, false, None)).unwrap();
        let a = day.add_exercise(exercise("curl")).id.clone();
        let b = day.add_exercise(exercise("pushdown")).id.clone();
        let group = day.group_superset(&[a, b], 60).unwrap();

        assert!(program.ungroup_superset(&group));
        assert!(!program.ungroup_superset(&group));

        let day = &program.weeks[0].days[0];
        assert!(day.exercises.iter().all(|e| e.superset_group_id.is_none()));
    }

    #[test]
    fn drop_sets_decay_and_number_monotonically() {
        let mut ex = exercise("bench");

        let generated = ex.generate_drop_sets(100.0, 10, 2, 20.0, 2);

        let rows: Vec<(u32, SetType, f32, u32, Option<f32>)> = generated
            .iter()
            .map(|s| (s.set_number, s.set_type, s.weight.unwrap(), s.reps.unwrap(), s.drop_percentage))
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, SetType::Normal, 100.0, 10, None),
                (2, SetType::DropSet, 80.0, 12, Some(20.0)),
                (3, SetType::DropSet, 64.0, 14, Some(20.0)),
            ]
        );
        assert!(ex.sets.iter().all(|s| !s.is_completed));
    }

    #[test]
    fn drop_sets_continue_from_existing_numbering() {
        let mut ex = exercise("bench");
        ex.add_set();
        ex.add_set();

        let generated = ex.generate_drop_sets(60.0, 12, 1, 10.0, 0);

        let numbers: Vec<u32> = generated.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![3, 4]);
        assert_eq!(generated[1].weight, Some(54.0));
        assert_eq!(generated[1].reps, Some(12));
    }

    #[test]
    fn negative_reps_adjustment_clamps_at_zero() {
        let mut ex = exercise("bench");
        let generated = ex.generate_drop_sets(40.0, 1, 2, 25.0, -1);

        let reps: Vec<u32> = generated.iter().map(|s| s.reps.unwrap()).collect();
        assert_eq!(reps, vec![1, 0, 0]);
    }
}
