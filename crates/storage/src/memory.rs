use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use snaptrack_app::{Settings, SettingsRepository, log};
use snaptrack_domain as domain;

/// Volatile storage shared between all clones.
#[derive(Clone, Default)]
pub struct InMemory {
    data: Arc<Mutex<Data>>,
}

#[derive(Default)]
struct Data {
    disconnected: bool,
    history: Vec<domain::HistoryEntry>,
    templates: Vec<domain::Template>,
    settings: Option<Settings>,
    log: VecDeque<log::Entry>,
}

impl InMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data(
        history: Vec<domain::HistoryEntry>,
        templates: Vec<domain::Template>,
    ) -> Self {
        let storage = Self::default();
        {
            let mut data = storage.lock();
            data.history = history;
            data.templates = templates;
        }
        storage
    }

    /// Makes every subsequent history and template access fail with
    /// [`domain::StorageError::NoConnection`] until reconnected.
    pub fn set_connected(&self, connected: bool) {
        self.lock().disconnected = !connected;
    }

    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Data>, domain::StorageError> {
        let data = self.lock();
        if data.disconnected {
            return Err(domain::StorageError::NoConnection);
        }
        Ok(data)
    }
}

impl domain::HistoryRepository for InMemory {
    async fn read_history(&self) -> Result<Vec<domain::HistoryEntry>, domain::ReadError> {
        Ok(self.connection()?.history.clone())
    }

    async fn create_history_entry(
        &self,
        entry: domain::HistoryEntry,
    ) -> Result<domain::HistoryEntry, domain::CreateError> {
        let mut data = self.connection()?;
        if data.history.iter().any(|e| e.id == entry.id) {
            return Err(domain::CreateError::Conflict);
        }
        data.history.push(entry.clone());
        Ok(entry)
    }

    async fn replace_history_entry(
        &self,
        entry: domain::HistoryEntry,
    ) -> Result<domain::HistoryEntry, domain::UpdateError> {
        let mut data = self.connection()?;
        let stored = data
            .history
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or(domain::UpdateError::NotFound)?;
        *stored = entry.clone();
        Ok(entry)
    }

    async fn delete_history_entry(
        &self,
        id: domain::HistoryEntryID,
    ) -> Result<domain::HistoryEntryID, domain::DeleteError> {
        self.connection()?.history.retain(|e| e.id != id);
        Ok(id)
    }
}

impl domain::TemplateRepository for InMemory {
    async fn read_templates(&self) -> Result<Vec<domain::Template>, domain::ReadError> {
        Ok(self.connection()?.templates.clone())
    }

    async fn create_template(
        &self,
        template: domain::Template,
    ) -> Result<domain::Template, domain::CreateError> {
        let mut data = self.connection()?;
        if data.templates.iter().any(|t| t.id == template.id) {
            return Err(domain::CreateError::Conflict);
        }
        data.templates.push(template.clone());
        Ok(template)
    }

    async fn replace_template(
        &self,
        template: domain::Template,
    ) -> Result<domain::Template, domain::UpdateError> {
        let mut data = self.connection()?;
        let stored = data
            .templates
            .iter_mut()
            .find(|t| t.id == template.id)
            .ok_or(domain::UpdateError::NotFound)?;
        *stored = template.clone();
        Ok(template)
    }

    async fn delete_template(
        &self,
        id: domain::TemplateID,
    ) -> Result<domain::TemplateID, domain::DeleteError> {
        self.connection()?.templates.retain(|t| t.id != id);
        Ok(id)
    }
}

impl SettingsRepository for InMemory {
    async fn read_settings(&self) -> Result<Settings, String> {
        Ok(self.lock().settings.unwrap_or_default())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.lock().settings = Some(settings);
        Ok(())
    }
}

impl log::Repository for InMemory {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        Ok(self.lock().log.clone())
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        log::prepend(&mut self.lock().log, entry);
        Ok(())
    }
}
