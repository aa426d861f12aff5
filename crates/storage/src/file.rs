use std::{
    collections::VecDeque,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use ::log::debug;
use serde::{Serialize, de::DeserializeOwned};
use snaptrack_app::{Settings, SettingsRepository, log};
use snaptrack_domain as domain;
use strum::AsRefStr;
use uuid::Uuid;

/// Storage keeping one JSON document per store in a directory.
///
/// Missing documents are treated as empty stores. Documents are replaced atomically on write.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, store: &Store) -> PathBuf {
        self.dir.join(format!("{}.json", store.as_ref()))
    }

    fn read<T: DeserializeOwned + Default>(&self, store: &Store) -> anyhow::Result<T> {
        let value = self.load(store)?;
        if value.is_none() {
            debug!("{} does not exist", self.path(store).display());
        }
        Ok(value.unwrap_or_default())
    }

    /// Reads a document without emitting log records.
    fn load<T: DeserializeOwned>(&self, store: &Store) -> anyhow::Result<Option<T>> {
        let path = self.path(store);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write<T: Serialize>(&self, store: &Store, value: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path(store);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {}", store.as_ref()))?;
        fs::write(&tmp_path, content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to replace {}", path.display()))
    }

    fn read_records<V: DeserializeOwned>(
        &self,
        store: &Store,
    ) -> Result<Vec<V>, domain::StorageError> {
        self.read(store).map_err(storage_error)
    }

    fn write_records<V: Serialize>(
        &self,
        store: &Store,
        records: &[V],
    ) -> Result<(), domain::StorageError> {
        self.write(store, &records).map_err(storage_error)
    }

    fn create<V, R>(&self, store: &Store, record: V, result: R) -> Result<R, domain::CreateError>
    where
        V: Record,
    {
        let mut records = self.read_records::<V>(store)?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(domain::CreateError::Conflict);
        }
        records.push(record);
        self.write_records(store, &records)?;
        Ok(result)
    }

    fn replace<V, R>(&self, store: &Store, record: V, result: R) -> Result<R, domain::UpdateError>
    where
        V: Record,
    {
        let mut records = self.read_records::<V>(store)?;
        let stored = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(domain::UpdateError::NotFound)?;
        *stored = record;
        self.write_records(store, &records)?;
        Ok(result)
    }

    fn delete<V, R>(&self, store: &Store, id: Uuid, result: R) -> Result<R, domain::DeleteError>
    where
        V: Record,
    {
        let mut records = self.read_records::<V>(store)?;
        records.retain(|r| r.id() != id);
        self.write_records(store, &records)?;
        Ok(result)
    }
}

fn storage_error(err: anyhow::Error) -> domain::StorageError {
    domain::StorageError::Other(err.into())
}

impl domain::HistoryRepository for FileStorage {
    async fn read_history(&self) -> Result<Vec<domain::HistoryEntry>, domain::ReadError> {
        let mut history = vec![];
        for entry in self.read_records::<HistoryEntry>(&Store::History)? {
            history.push(domain::HistoryEntry::try_from(entry).map_err(Box::from)?);
        }
        Ok(history)
    }

    async fn create_history_entry(
        &self,
        entry: domain::HistoryEntry,
    ) -> Result<domain::HistoryEntry, domain::CreateError> {
        self.create(&Store::History, HistoryEntry::from(&entry), entry)
    }

    async fn replace_history_entry(
        &self,
        entry: domain::HistoryEntry,
    ) -> Result<domain::HistoryEntry, domain::UpdateError> {
        self.replace(&Store::History, HistoryEntry::from(&entry), entry)
    }

    async fn delete_history_entry(
        &self,
        id: domain::HistoryEntryID,
    ) -> Result<domain::HistoryEntryID, domain::DeleteError> {
        self.delete::<HistoryEntry, _>(&Store::History, *id, id)
    }
}

impl domain::TemplateRepository for FileStorage {
    async fn read_templates(&self) -> Result<Vec<domain::Template>, domain::ReadError> {
        let mut templates = vec![];
        for template in self.read_records::<Template>(&Store::Templates)? {
            templates.push(domain::Template::try_from(template).map_err(Box::from)?);
        }
        Ok(templates)
    }

    async fn create_template(
        &self,
        template: domain::Template,
    ) -> Result<domain::Template, domain::CreateError> {
        self.create(&Store::Templates, Template::from(&template), template)
    }

    async fn replace_template(
        &self,
        template: domain::Template,
    ) -> Result<domain::Template, domain::UpdateError> {
        self.replace(&Store::Templates, Template::from(&template), template)
    }

    async fn delete_template(
        &self,
        id: domain::TemplateID,
    ) -> Result<domain::TemplateID, domain::DeleteError> {
        self.delete::<Template, _>(&Store::Templates, *id, id)
    }
}

impl SettingsRepository for FileStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        self.read(&Store::Settings).map_err(|err| format!("{err:#}"))
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.write(&Store::Settings, &settings)
            .map_err(|err| format!("{err:#}"))
    }
}

impl log::Repository for FileStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.load(&Store::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(format!("{err:#}")))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend(&mut entries, entry);
        self.write(&Store::Log, &entries)
            .map_err(|err| log::Error::Unknown(format!("{err:#}")))
    }
}

#[derive(AsRefStr)]
pub enum Store {
    #[strum(serialize = "history")]
    History,
    #[strum(serialize = "templates")]
    Templates,
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "log")]
    Log,
}

/// Stored record identified by a UUID.
trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> Uuid;
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidRecord {
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error(transparent)]
    Effort(#[from] domain::EffortError),
    #[error(transparent)]
    UnknownValue(#[from] domain::UnknownValue),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub duration: u32,
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub notes: String,
    pub volume: f32,
    #[serde(default)]
    pub favorite: bool,
}

impl Record for HistoryEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl From<&domain::HistoryEntry> for HistoryEntry {
    fn from(value: &domain::HistoryEntry) -> Self {
        Self {
            id: *value.id,
            title: value.title.clone(),
            date: value.date,
            duration: value.duration,
            exercises: value.exercises.iter().map(Exercise::from).collect(),
            notes: value.notes.clone(),
            volume: value.volume,
            favorite: value.favorite,
        }
    }
}

impl TryFrom<HistoryEntry> for domain::HistoryEntry {
    type Error = InvalidRecord;

    fn try_from(value: HistoryEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: value.title,
            date: value.date,
            duration: value.duration,
            exercises: value
                .exercises
                .into_iter()
                .map(domain::Exercise::try_from)
                .collect::<Result<_, _>>()?,
            notes: value.notes,
            volume: value.volume,
            favorite: value.favorite,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Template {
    pub id: Uuid,
    pub title: String,
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

impl Record for Template {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl From<&domain::Template> for Template {
    fn from(value: &domain::Template) -> Self {
        Self {
            id: *value.id,
            title: value.title.to_string(),
            exercises: value.exercises.iter().map(Exercise::from).collect(),
            favorite: value.favorite,
            last_used: value.last_used,
        }
    }
}

impl TryFrom<Template> for domain::Template {
    type Error = InvalidRecord;

    fn try_from(value: Template) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: domain::Name::new(&value.title)?,
            exercises: value
                .exercises
                .into_iter()
                .map(domain::Exercise::try_from)
                .collect::<Result<_, _>>()?,
            favorite: value.favorite,
            last_used: value.last_used,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub sets: Vec<Set>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            sets: value.sets.iter().map(Set::from).collect(),
            notes: value.notes.clone(),
            weight_unit: value.weight_unit.map(|u| u.name().to_string()),
            equipment: value.equipment.map(|e| e.name().to_string()),
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = InvalidRecord;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            sets: value
                .sets
                .into_iter()
                .map(domain::Set::try_from)
                .collect::<Result<_, _>>()?,
            notes: value.notes,
            weight_unit: value
                .weight_unit
                .as_deref()
                .map(domain::WeightUnit::try_from)
                .transpose()?,
            equipment: value
                .equipment
                .as_deref()
                .map(domain::Equipment::try_from)
                .transpose()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Set {
    pub id: Uuid,
    pub weight: Option<f32>,
    pub reps: Option<u32>,
    pub effort: Option<f32>,
    pub completed: bool,
}

impl From<&domain::Set> for Set {
    fn from(value: &domain::Set) -> Self {
        Self {
            id: *value.id,
            weight: value.weight.map(f32::from),
            reps: value.reps.map(u32::from),
            effort: value.effort.map(f32::from),
            completed: value.completed,
        }
    }
}

impl TryFrom<Set> for domain::Set {
    type Error = InvalidRecord;

    fn try_from(value: Set) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            weight: value.weight.map(domain::Weight::new).transpose()?,
            reps: value.reps.map(domain::Reps::new).transpose()?,
            effort: value.effort.map(domain::Effort::new).transpose()?,
            completed: value.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex, mpsc},
        thread,
        time::Duration,
    };

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use snaptrack_app::log::Repository as _;
    use snaptrack_domain::{HistoryRepository, TemplateRepository};

    use crate::tests::data::{
        EXERCISES, HISTORY, HISTORY_ENTRY, HISTORY_ENTRY_2, TEMPLATE, TEMPLATES,
    };

    use super::*;

    fn storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        (dir, storage)
    }

    #[test]
    fn test_history_entry_try_from() {
        assert_eq!(
            domain::HistoryEntry::try_from(HistoryEntry::from(&*HISTORY_ENTRY)).unwrap(),
            HISTORY_ENTRY.clone()
        );
    }

    #[test]
    fn test_template_try_from() {
        assert_eq!(
            domain::Template::try_from(Template::from(&*TEMPLATE)).unwrap(),
            TEMPLATE.clone()
        );
    }

    #[test]
    fn test_exercise_serde() {
        let obj = Exercise::from(&EXERCISES[0]);
        let serialized = json!(obj);
        let deserialized: Exercise = serde_json::from_value(serialized).unwrap();
        assert_eq!(deserialized, obj);
        assert_eq!(
            domain::Exercise::try_from(deserialized).unwrap(),
            EXERCISES[0].clone()
        );
    }

    #[rstest]
    #[case(json!({ "weight": -5.0 }), "Weight must be in the range 0 to 9999.9")]
    #[case(json!({ "reps": 1000 }), "Reps must be in the range 0 to 999")]
    #[case(json!({ "effort": 11.0 }), "Effort must be in the range 0 to 10")]
    fn test_set_try_from_invalid(#[case] value: serde_json::Value, #[case] message: &str) {
        let mut set = json!({
            "id": Uuid::nil(),
            "weight": null,
            "reps": null,
            "effort": null,
            "completed": false,
        });
        for (key, value) in value.as_object().unwrap() {
            set[key] = value.clone();
        }
        let set: Set = serde_json::from_value(set).unwrap();
        assert_eq!(
            domain::Set::try_from(set).unwrap_err().to_string(),
            message
        );
    }

    #[test]
    fn test_exercise_try_from_unknown_unit() {
        let exercise = Exercise {
            weight_unit: Some("stone".to_string()),
            ..Exercise::from(&EXERCISES[0])
        };
        assert!(matches!(
            domain::Exercise::try_from(exercise),
            Err(InvalidRecord::UnknownValue(_))
        ));
    }

    #[tokio::test]
    async fn test_read_missing_store() {
        let (_dir, storage) = storage();
        assert_eq!(storage.read_history().await.unwrap(), vec![]);
        assert_eq!(storage.read_templates().await.unwrap(), vec![]);
        assert_eq!(storage.read_settings().await.unwrap(), Settings::default());
        assert_eq!(storage.read_entries().unwrap(), VecDeque::new());
    }

    #[tokio::test]
    async fn test_history() {
        let (_dir, storage) = storage();

        for entry in HISTORY.iter() {
            storage.create_history_entry(entry.clone()).await.unwrap();
        }
        assert_eq!(storage.read_history().await.unwrap(), HISTORY.clone());

        assert!(matches!(
            storage.create_history_entry(HISTORY_ENTRY.clone()).await,
            Err(domain::CreateError::Conflict)
        ));

        let entry = domain::HistoryEntry {
            favorite: true,
            notes: "Updated".to_string(),
            ..HISTORY_ENTRY.clone()
        };
        storage.replace_history_entry(entry.clone()).await.unwrap();
        assert_eq!(
            storage.read_history().await.unwrap(),
            vec![entry.clone(), HISTORY_ENTRY_2.clone()]
        );

        storage
            .delete_history_entry(HISTORY_ENTRY_2.id)
            .await
            .unwrap();
        assert_eq!(
            FileStorage::new(storage.dir())
                .read_history()
                .await
                .unwrap(),
            vec![entry]
        );
    }

    #[tokio::test]
    async fn test_replace_history_entry_non_existing() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.replace_history_entry(HISTORY_ENTRY.clone()).await,
            Err(domain::UpdateError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_templates() {
        let (_dir, storage) = storage();

        for template in TEMPLATES.iter() {
            storage.create_template(template.clone()).await.unwrap();
        }
        assert_eq!(storage.read_templates().await.unwrap(), TEMPLATES.clone());

        let template = domain::Template {
            last_used: Some(DateTime::from_timestamp(1_700_000_000, 0).unwrap()),
            ..TEMPLATE.clone()
        };
        storage.replace_template(template.clone()).await.unwrap();
        storage.delete_template(TEMPLATES[1].id).await.unwrap();

        assert_eq!(storage.read_templates().await.unwrap(), vec![template]);
    }

    #[tokio::test]
    async fn test_read_corrupted_store() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.dir()).unwrap();
        fs::write(storage.dir().join("history.json"), "{").unwrap();

        assert!(matches!(
            storage.read_history().await,
            Err(domain::ReadError::Storage(domain::StorageError::Other(_)))
        ));
    }

    #[tokio::test]
    async fn test_read_invalid_record() {
        let (_dir, storage) = storage();
        let mut template = Template::from(&*TEMPLATE);
        template.title = " ".to_string();
        storage.write_records(&Store::Templates, &[template]).unwrap();

        assert!(matches!(
            storage.read_templates().await,
            Err(domain::ReadError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_settings() {
        let (_dir, storage) = storage();
        let settings = Settings {
            weight_unit: domain::WeightUnit::Kg,
            show_effort: false,
            history_window: domain::DateWindow::Week,
        };

        storage.write_settings(settings).await.unwrap();

        assert_eq!(storage.read_settings().await.unwrap(), settings);
    }

    #[test]
    fn test_log() {
        let (_dir, storage) = storage();
        for message in ["first", "second"] {
            storage
                .write_entry(log::Entry {
                    time: "Jan 01 00:00:00".to_string(),
                    level: ::log::Level::Warn,
                    message: message.to_string(),
                })
                .unwrap();
        }

        assert_eq!(
            storage
                .read_entries()
                .unwrap()
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>(),
            vec!["second", "first"]
        );
    }

    #[test]
    fn test_log_as_installed_logger() {
        let (_dir, storage) = storage();
        let storage = Arc::new(Mutex::new(storage));
        log::init(storage.clone()).unwrap();

        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            ::log::info!("logged through file storage");
            sender.send(()).unwrap();
        });
        receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        *log::LOG.lock().unwrap() = None;

        assert!(
            storage
                .lock()
                .unwrap()
                .read_entries()
                .unwrap()
                .iter()
                .any(|e| e.message == "logged through file storage")
        );
    }
}
