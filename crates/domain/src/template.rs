use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Exercise, FinishedWorkout, HistoryFilter, Name, ReadError,
    UpdateError, ValidationError, WorkoutSession,
};

#[allow(async_fn_in_trait)]
pub trait TemplateService {
    async fn get_templates(&self) -> Result<Vec<Template>, ReadError>;
    async fn save_as_template(
        &self,
        workout: &FinishedWorkout,
        title: Name,
        include_sets: bool,
    ) -> Result<Template, CreateError>;
    async fn toggle_template_favorite(&self, id: TemplateID) -> Result<Template, UpdateError>;
    /// Instantiates the template and records `now` as its last use.
    async fn start_workout(
        &self,
        id: TemplateID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, UpdateError>;
    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;

    async fn validate_template_title(
        &self,
        title: &str,
        id: TemplateID,
    ) -> Result<Name, ValidationError> {
        match Name::new(title) {
            Ok(title) => match self.get_templates().await {
                Ok(templates) => {
                    if templates.iter().all(|t| t.id == id || t.title != title) {
                        Ok(title)
                    } else {
                        Err(ValidationError::Conflict("title".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }

    #[must_use]
    fn filter_templates<'a>(
        &self,
        templates: &'a [Template],
        filter: &HistoryFilter,
    ) -> Vec<&'a Template> {
        filter.templates(templates)
    }
}

#[allow(async_fn_in_trait)]
pub trait TemplateRepository {
    async fn read_templates(&self) -> Result<Vec<Template>, ReadError>;
    async fn create_template(&self, template: Template) -> Result<Template, CreateError>;
    async fn replace_template(&self, template: Template) -> Result<Template, UpdateError>;
    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
}

/// A reusable list of exercises.
///
/// Sets of a template are never completed. Unless a template was saved with its sets, the sets
/// are blank and only determine how many sets a new workout starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: TemplateID,
    pub title: Name,
    pub exercises: Vec<Exercise>,
    pub favorite: bool,
    pub last_used: Option<DateTime<Utc>>,
}

impl Template {
    /// Creates a template from the given exercises. All ids are regenerated.
    #[must_use]
    pub fn new(title: Name, exercises: &[Exercise], include_sets: bool) -> Self {
        Self {
            id: TemplateID::random(),
            title,
            exercises: exercises
                .iter()
                .map(|e| e.duplicate(include_sets))
                .collect(),
            favorite: false,
            last_used: None,
        }
    }

    /// Creates a new workout with one blank set per templated set.
    #[must_use]
    pub fn instantiate(&self) -> WorkoutSession {
        WorkoutSession::with_exercises(
            self.title.as_ref(),
            self.exercises.iter().map(|e| e.duplicate(false)).collect(),
        )
    }

    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.exercises.iter().map(Exercise::total_sets).sum()
    }
}

impl WorkoutSession {
    #[must_use]
    pub fn to_template(&self, title: Name, include_sets: bool) -> Template {
        Template::new(title, self.exercises(), include_sets)
    }
}

impl FinishedWorkout {
    #[must_use]
    pub fn to_template(&self, title: Name, include_sets: bool) -> Template {
        Template::new(title, self.exercises(), include_sets)
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateID(Uuid);

impl TemplateID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for TemplateID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for TemplateID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}
