use crate::{
    EffortError, Equipment, Exercise, ExerciseID, FieldValue, Name, NameError, RepsError, Set,
    SetField, SetID, SessionTimer, Summary, WeightError, WeightUnit,
};

/// The workout that is currently being performed.
///
/// All edits go through [`WorkoutSession::mutate`]. A failed mutation leaves the session
/// unchanged. After [`WorkoutSession::finish`] the session rejects every further mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    title: String,
    exercises: Vec<Exercise>,
    notes: String,
    timer: SessionTimer,
    finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetTitle(String),
    SetNotes(String),
    AddExercise {
        id: ExerciseID,
        name: String,
    },
    RemoveExercise(ExerciseID),
    SetExerciseNotes {
        exercise_id: ExerciseID,
        notes: String,
    },
    SetWeightUnit {
        exercise_id: ExerciseID,
        weight_unit: Option<WeightUnit>,
    },
    SetEquipment {
        exercise_id: ExerciseID,
        equipment: Option<Equipment>,
    },
    AddSet(ExerciseID),
    RemoveSet {
        exercise_id: ExerciseID,
        set_id: SetID,
    },
    UpdateSet {
        exercise_id: ExerciseID,
        set_id: SetID,
        field: SetField,
        value: FieldValue,
    },
}

impl WorkoutSession {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self::with_exercises(title, vec![])
    }

    pub(crate) fn with_exercises(title: &str, exercises: Vec<Exercise>) -> Self {
        Self {
            title: title.to_string(),
            exercises,
            notes: String::new(),
            timer: SessionTimer::new(),
            finished: false,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise(&self, id: ExerciseID) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns `true` if the timer has been started by this call.
    pub fn start_timer(&mut self) -> bool {
        !self.finished && self.timer.start()
    }

    /// Returns `true` if the timer has been paused by this call.
    pub fn pause_timer(&mut self) -> bool {
        !self.finished && self.timer.pause()
    }

    pub fn reset_timer(&mut self) {
        if !self.finished {
            self.timer.reset();
        }
    }

    pub fn tick(&mut self) {
        self.timer.tick();
    }

    pub fn mutate(&mut self, mutation: Mutation) -> Result<(), WorkoutError> {
        if self.finished {
            return Err(WorkoutError::InvalidState);
        }

        match mutation {
            Mutation::SetTitle(title) => self.title = title,
            Mutation::SetNotes(notes) => self.notes = notes,
            Mutation::AddExercise { id, name } => {
                let name = Name::new(&name).map_err(InvalidInput::from)?;
                if self.exercise(id).is_some() {
                    return Err(InvalidInput::DuplicateExercise(id).into());
                }
                self.exercises.push(Exercise::new(id, name));
            }
            Mutation::RemoveExercise(id) => self.exercises.retain(|e| e.id != id),
            Mutation::SetExerciseNotes { exercise_id, notes } => {
                self.exercise_mut(exercise_id)?.notes = notes;
            }
            Mutation::SetWeightUnit {
                exercise_id,
                weight_unit,
            } => self.exercise_mut(exercise_id)?.weight_unit = weight_unit,
            Mutation::SetEquipment {
                exercise_id,
                equipment,
            } => self.exercise_mut(exercise_id)?.equipment = equipment,
            Mutation::AddSet(exercise_id) => {
                let exercise = self.exercise_mut(exercise_id)?;
                let mut id = SetID::random();
                while exercise.sets.iter().any(|s| s.id == id) {
                    id = SetID::random();
                }
                exercise.sets.push(Set::blank(id));
            }
            Mutation::RemoveSet {
                exercise_id,
                set_id,
            } => self.exercise_mut(exercise_id)?.sets.retain(|s| s.id != set_id),
            Mutation::UpdateSet {
                exercise_id,
                set_id,
                field,
                value,
            } => {
                let set = self
                    .exercise_mut(exercise_id)?
                    .sets
                    .iter_mut()
                    .find(|s| s.id == set_id)
                    .ok_or(NotFound::Set(set_id))?;
                set.update(field, value)?;
            }
        }

        Ok(())
    }

    /// Stops the timer and freezes the session.
    pub fn finish(&mut self) -> Result<(FinishedWorkout, Summary), WorkoutError> {
        if self.finished {
            return Err(WorkoutError::InvalidState);
        }

        self.timer.stop();
        self.finished = true;

        let workout = FinishedWorkout {
            title: self.title.clone(),
            exercises: self.exercises.clone(),
            notes: self.notes.clone(),
            duration: self.timer.elapsed_seconds(),
        };
        let summary = workout.summary();

        Ok((workout, summary))
    }

    fn exercise_mut(&mut self, id: ExerciseID) -> Result<&mut Exercise, NotFound> {
        self.exercises
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(NotFound::Exercise(id))
    }
}

/// Read-only snapshot of a finished workout.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedWorkout {
    title: String,
    exercises: Vec<Exercise>,
    notes: String,
    duration: u32,
}

impl FinishedWorkout {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::new(&self.exercises)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Exercise>, String, u32) {
        (self.title, self.exercises, self.notes, self.duration)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WorkoutError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error("workout is already finished")]
    InvalidState,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Weight(#[from] WeightError),
    #[error(transparent)]
    Reps(#[from] RepsError),
    #[error(transparent)]
    Effort(#[from] EffortError),
    #[error("{0} must be a {1}")]
    FieldType(SetField, &'static str),
    #[error("exercise {0} is already part of the workout")]
    DuplicateExercise(ExerciseID),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NotFound {
    #[error("exercise {0} not found")]
    Exercise(ExerciseID),
    #[error("set {0} not found")]
    Set(SetID),
}
