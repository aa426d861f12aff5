use std::{
    cell::Cell,
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

/// Maximum number of entries a repository keeps.
pub const MAX_ENTRIES: usize = 100;

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

pub trait Service {
    fn get_log_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn add_log_entry(&self, entry: Entry) -> Result<(), Error>;
}

pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Adds an entry in front of the existing entries and drops the oldest ones.
pub fn prepend(entries: &mut VecDeque<Entry>, entry: Entry) {
    entries.push_front(entry);
    entries.truncate(MAX_ENTRIES);
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if a logger has already been initialized.
pub fn init(repository: Arc<Mutex<dyn Repository>>) -> Result<(), SetLoggerError> {
    *LOG.lock().unwrap_or_else(PoisonError::into_inner) = Some(repository);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug))
}

struct Logger;

thread_local! {
    /// Set while the current thread writes an entry. Records emitted by the repository itself
    /// are dropped instead of locking it a second time.
    static WRITING: Cell<bool> = const { Cell::new(false) };
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || WRITING.get() {
            return;
        }
        let entry = Entry {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level: record.level(),
            message: record.args().to_string(),
        };
        eprintln!("{} {:<5} {}", entry.time, entry.level, entry.message);
        let repository = LOG.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(repository) = repository {
            WRITING.set(true);
            let _ = repository
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_entry(entry);
            WRITING.set(false);
        }
    }

    fn flush(&self) {}
}
