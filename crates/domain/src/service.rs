use chrono::{DateTime, Utc};
use log::{debug, error, info};

use crate::{
    CreateError, DeleteError, FinishedWorkout, HistoryEntry, HistoryEntryID, HistoryRepository,
    HistoryService, Name, ReadError, Template, TemplateID, TemplateRepository, TemplateService,
    UpdateError, WorkoutSession,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: HistoryRepository> HistoryService for Service<R> {
    async fn get_history(&self) -> Result<Vec<HistoryEntry>, ReadError> {
        log_on_error!(self.repository.read_history(), ReadError, "get", "history")
    }

    async fn commit_workout(
        &self,
        workout: FinishedWorkout,
        date: DateTime<Utc>,
    ) -> Result<HistoryEntry, CreateError> {
        let entry = workout.into_history_entry(date);
        info!("committing workout \"{}\" to history", entry.title);
        log_on_error!(
            self.repository.create_history_entry(entry),
            CreateError,
            "create",
            "history entry"
        )
    }

    async fn toggle_history_favorite(
        &self,
        id: HistoryEntryID,
    ) -> Result<HistoryEntry, UpdateError> {
        let mut entry = self
            .get_history()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(UpdateError::NotFound)?;
        entry.favorite = !entry.favorite;
        log_on_error!(
            self.repository.replace_history_entry(entry),
            UpdateError,
            "replace",
            "history entry"
        )
    }

    async fn delete_history_entry(
        &self,
        id: HistoryEntryID,
    ) -> Result<HistoryEntryID, DeleteError> {
        log_on_error!(
            self.repository.delete_history_entry(id),
            DeleteError,
            "delete",
            "history entry"
        )
    }
}

impl<R: TemplateRepository> Service<R> {
    async fn get_template(&self, id: TemplateID) -> Result<Template, ReadError> {
        self.get_templates()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(ReadError::NotFound)
    }
}

impl<R: TemplateRepository> TemplateService for Service<R> {
    async fn get_templates(&self) -> Result<Vec<Template>, ReadError> {
        log_on_error!(
            self.repository.read_templates(),
            ReadError,
            "get",
            "templates"
        )
    }

    async fn save_as_template(
        &self,
        workout: &FinishedWorkout,
        title: Name,
        include_sets: bool,
    ) -> Result<Template, CreateError> {
        log_on_error!(
            self.repository
                .create_template(workout.to_template(title, include_sets)),
            CreateError,
            "create",
            "template"
        )
    }

    async fn toggle_template_favorite(&self, id: TemplateID) -> Result<Template, UpdateError> {
        let mut template = self.get_template(id).await?;
        template.favorite = !template.favorite;
        log_on_error!(
            self.repository.replace_template(template),
            UpdateError,
            "replace",
            "template"
        )
    }

    async fn start_workout(
        &self,
        id: TemplateID,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession, UpdateError> {
        let mut template = self.get_template(id).await?;
        template.last_used = Some(now);
        let template = log_on_error!(
            self.repository.replace_template(template),
            UpdateError,
            "replace",
            "template"
        )?;
        debug!("starting workout from template \"{}\"", template.title);
        Ok(template.instantiate())
    }

    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError> {
        log_on_error!(
            self.repository.delete_template(id),
            DeleteError,
            "delete",
            "template"
        )
    }
}
