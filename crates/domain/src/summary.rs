use crate::{Exercise, ExerciseID, Name, Set};

/// Statistics of a finished workout.
///
/// A summary is always derived from the exercises it describes and never updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub exercises: Vec<ExerciseSummary>,
    pub total_exercises: usize,
    pub completed_sets: usize,
    pub total_sets: usize,
    pub completion_rate: u8,
    pub total_volume: f32,
}

impl Summary {
    #[must_use]
    pub fn new(exercises: &[Exercise]) -> Self {
        let exercises = exercises
            .iter()
            .map(ExerciseSummary::new)
            .collect::<Vec<_>>();
        let completed_sets = exercises.iter().map(|e| e.completed_sets).sum();
        let total_sets = exercises.iter().map(|e| e.total_sets).sum();
        Self {
            total_exercises: exercises.len(),
            completed_sets,
            total_sets,
            completion_rate: completion_rate(completed_sets, total_sets),
            total_volume: exercises.iter().map(|e| e.volume).sum(),
            exercises,
        }
    }

    #[must_use]
    pub fn exercise(&self, id: ExerciseID) -> Option<&ExerciseSummary> {
        self.exercises.iter().find(|e| e.exercise_id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub exercise_id: ExerciseID,
    pub name: Name,
    pub completed_sets: usize,
    pub total_sets: usize,
    pub completion_rate: u8,
    pub best_set: Option<Set>,
    pub volume: f32,
}

impl ExerciseSummary {
    #[must_use]
    pub fn new(exercise: &Exercise) -> Self {
        let completed_sets = exercise.completed_sets();
        let total_sets = exercise.total_sets();
        Self {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            completed_sets,
            total_sets,
            completion_rate: completion_rate(completed_sets, total_sets),
            best_set: exercise.best_set().cloned(),
            volume: exercise.volume(),
        }
    }
}

/// Percentage of completed sets, rounded to the nearest integer. Zero if there are no sets.
#[must_use]
pub fn completion_rate(completed_sets: usize, total_sets: usize) -> u8 {
    if total_sets == 0 {
        return 0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let rate = (completed_sets.min(total_sets) as f64 / total_sets as f64 * 100.0).round() as u8;
    rate
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Reps, SetID, Weight};

    use super::*;

    fn set(id: u128, weight: Option<f32>, reps: Option<u32>, completed: bool) -> Set {
        Set {
            id: id.into(),
            weight: weight.map(|w| Weight::new(w).unwrap()),
            reps: reps.map(|r| Reps::new(r).unwrap()),
            effort: None,
            completed,
        }
    }

    fn exercise(id: u128, name: &str, sets: Vec<Set>) -> Exercise {
        Exercise {
            sets,
            ..Exercise::new(id.into(), Name::new(name).unwrap())
        }
    }

    static EXERCISES: std::sync::LazyLock<Vec<Exercise>> = std::sync::LazyLock::new(|| {
        vec![
            exercise(
                1,
                "Bench Press",
                vec![
                    set(1, Some(135.0), Some(10), true),
                    set(2, Some(155.0), Some(8), true),
                    set(3, Some(175.0), Some(6), false),
                ],
            ),
            exercise(
                2,
                "Pull-ups",
                vec![set(4, None, Some(12), true), set(5, None, Some(10), true)],
            ),
            exercise(3, "Plank", vec![]),
        ]
    });

    #[test]
    fn test_exercise_summary() {
        let summary = ExerciseSummary::new(&EXERCISES[0]);
        assert_eq!(summary.completed_sets, 2);
        assert_eq!(summary.total_sets, 3);
        assert_eq!(summary.completion_rate, 67);
        assert_eq!(summary.best_set.as_ref().map(|s| s.id), Some(SetID::from(1)));
        assert_eq!(
            summary.best_set.as_ref().and_then(|s| s.weight),
            Some(Weight::new(135.0).unwrap())
        );
        assert_approx_eq!(summary.volume, 2590.0);
    }

    #[test]
    fn test_exercise_summary_bodyweight() {
        let summary = ExerciseSummary::new(&EXERCISES[1]);
        assert_eq!(summary.completed_sets, 2);
        assert_eq!(summary.completion_rate, 100);
        assert_eq!(summary.best_set, None);
        assert_approx_eq!(summary.volume, 0.0);
    }

    #[test]
    fn test_exercise_summary_without_sets() {
        let summary = ExerciseSummary::new(&EXERCISES[2]);
        assert_eq!(summary.total_sets, 0);
        assert_eq!(summary.completion_rate, 0);
        assert_eq!(summary.best_set, None);
        assert_approx_eq!(summary.volume, 0.0);
    }

    #[test]
    fn test_summary() {
        let summary = Summary::new(&EXERCISES);
        assert_eq!(summary.total_exercises, 3);
        assert_eq!(summary.completed_sets, 4);
        assert_eq!(summary.total_sets, 5);
        assert_eq!(summary.completion_rate, 80);
        assert_approx_eq!(summary.total_volume, 2590.0);
        assert_eq!(
            summary.exercise(2.into()).map(|e| e.name.to_string()),
            Some("Pull-ups".to_string())
        );
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::new(&[]);
        assert_eq!(summary.total_exercises, 0);
        assert_eq!(summary.total_sets, 0);
        assert_eq!(summary.completion_rate, 0);
        assert_approx_eq!(summary.total_volume, 0.0);
    }

    #[test]
    fn test_summary_reflects_edits() {
        let mut exercises = EXERCISES.clone();
        let before = Summary::new(&exercises);
        exercises[0].sets[2].completed = true;
        let after = Summary::new(&exercises);
        assert_eq!(before.completed_sets + 1, after.completed_sets);
        assert_approx_eq!(after.total_volume, 2590.0 + 1050.0);
        assert_eq!(after.exercises[0].completion_rate, 100);
        assert_eq!(after.exercises[0].best_set.as_ref().map(|s| s.id), Some(1.into()));
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(0, 3, 0)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 2, 50)]
    #[case(1, 200, 1)]
    #[case(3, 3, 100)]
    fn test_completion_rate(#[case] completed: usize, #[case] total: usize, #[case] expected: u8) {
        assert_eq!(completion_rate(completed, total), expected);
    }

    #[test]
    fn test_completion_rate_bounds() {
        for total in 0..50 {
            for completed in 0..=total {
                let rate = completion_rate(completed, total);
                assert!(rate <= 100);
                assert_eq!(rate == 0, completed == 0 || total == 0);
            }
        }
    }
}
