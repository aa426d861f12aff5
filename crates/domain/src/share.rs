use crate::{ExerciseSummary, FinishedWorkout, Set, Summary, WeightUnit, format_duration};

const PLACEHOLDER: &str = "-";

/// Optional parts of the share text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareOptions {
    /// Append the effort of the best set as ` @8`.
    pub show_effort: bool,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self { show_effort: true }
    }
}

/// Plain text rendering of a finished workout for sharing.
///
/// ```text
/// Push Day - 1h 2m 3s
///
/// Bench Press
///    2/3 sets - Best: 135lbs x 10 @8
///    Note: Pause at the bottom
///
/// Notes: Felt strong
///
/// Tracked with SnapAndTrack
/// ```
///
/// The layout is shown to users verbatim and must stay stable.
#[must_use]
pub fn share_text(workout: &FinishedWorkout, summary: &Summary) -> String {
    share_text_with(workout, summary, ShareOptions::default())
}

#[must_use]
pub fn share_text_with(
    workout: &FinishedWorkout,
    summary: &Summary,
    options: ShareOptions,
) -> String {
    let mut text = format!(
        "{} - {}\n\n",
        or_placeholder(workout.title()),
        format_duration(workout.duration())
    );

    for exercise in workout.exercises() {
        let computed;
        let exercise_summary = if let Some(s) = summary.exercise(exercise.id) {
            s
        } else {
            computed = ExerciseSummary::new(exercise);
            &computed
        };

        text.push_str(&format!(
            "{}\n   {}/{} sets - Best: {}\n",
            exercise.name,
            exercise_summary.completed_sets,
            exercise_summary.total_sets,
            exercise_summary.best_set.as_ref().map_or_else(
                || PLACEHOLDER.to_string(),
                |s| best_set(s, exercise.weight_unit, options)
            )
        ));
        if !exercise.notes.trim().is_empty() {
            text.push_str(&format!("   Note: {}\n", exercise.notes.trim()));
        }
    }

    if !workout.notes().trim().is_empty() {
        text.push_str(&format!("\nNotes: {}\n", workout.notes().trim()));
    }

    text.push_str("\nTracked with SnapAndTrack");
    text
}

fn best_set(set: &Set, weight_unit: Option<WeightUnit>, options: ShareOptions) -> String {
    let mut result = format!(
        "{}{} x {}",
        set.weight
            .map_or_else(|| PLACEHOLDER.to_string(), |w| w.to_string()),
        weight_unit.map(WeightUnit::name).unwrap_or_default(),
        set.reps
            .map_or_else(|| PLACEHOLDER.to_string(), |r| r.to_string()),
    );
    if let Some(effort) = set.effort.filter(|_| options.show_effort) {
        result.push_str(&format!(" @{effort}"));
    }
    result
}

fn or_placeholder(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() { PLACEHOLDER } else { value }
}
