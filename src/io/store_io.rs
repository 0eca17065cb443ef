use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::task::Task;

/// File name of the task document inside the data directory
pub const STORE_FILE: &str = "tasks.json";

/// Error type for task store I/O
#[derive(Debug, thiserror::Error)]
pub enum StoreIoError {
    #[error("task store at {path} is corrupt: {source}")]
    CorruptStore {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreIoError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreIoError::CorruptStore { .. })
    }
}

/// Durable storage for the canonical task collection.
pub trait TaskGateway {
    /// Load every stored task. An absent store is an empty collection.
    fn load(&self) -> Result<Vec<Task>, StoreIoError>;
    /// Replace the stored collection with `tasks` in full.
    fn save(&self, tasks: &[Task]) -> Result<(), StoreIoError>;
    /// Called after a task has been deleted and the deletion persisted.
    fn record_deletion(&self, _task: &Task) {}
}

/// Per-user data directory: `$XDG_CONFIG_HOME/taskterm` or `~/.config/taskterm`
pub fn data_dir() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("taskterm")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Default location of the task document
pub fn default_store_path() -> PathBuf {
    data_dir().join(STORE_FILE)
}

/// Encode tasks as the persisted JSON array document
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(tasks)?;
    out.push('\n');
    Ok(out)
}

/// Decode the persisted JSON array document
pub fn decode_tasks(text: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str(text)
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// A single JSON array document on disk
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileGateway { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the document (and the recovery log)
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    fn ensure_dir(&self) -> Result<(), StoreIoError> {
        fs::create_dir_all(self.dir()).map_err(|e| StoreIoError::Write {
            path: self.dir().to_path_buf(),
            source: e,
        })
    }
}

impl TaskGateway for JsonFileGateway {
    fn load(&self) -> Result<Vec<Task>, StoreIoError> {
        if !self.path.exists() {
            self.ensure_dir()?;
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| StoreIoError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        decode_tasks(&text).map_err(|e| StoreIoError::CorruptStore {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreIoError> {
        self.ensure_dir()?;
        let content = encode_tasks(tasks)?;
        if let Err(e) = recovery::atomic_write(&self.path, content.as_bytes()) {
            recovery::log_recovery(
                self.dir(),
                RecoveryEntry {
                    timestamp: chrono::Utc::now(),
                    category: RecoveryCategory::Write,
                    description: "task store write failed".to_string(),
                    fields: vec![
                        ("Target".to_string(), self.path.display().to_string()),
                        ("Error".to_string(), e.to_string()),
                    ],
                    body: content,
                },
            );
            return Err(StoreIoError::Write {
                path: self.path.clone(),
                source: e,
            });
        }
        Ok(())
    }

    fn record_deletion(&self, task: &Task) {
        let body = serde_json::to_string_pretty(task).unwrap_or_default();
        recovery::log_recovery(
            self.dir(),
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Delete,
                description: format!("task {} deleted", task.id),
                fields: vec![("Description".to_string(), task.description.clone())],
                body,
            },
        );
    }
}

/// Move a corrupt store aside and start over with an empty document.
///
/// The corrupt content is copied into the recovery log and kept next to the
/// store as `tasks.json.corrupt-<timestamp>`. Returns the backup path, or
/// None when there was nothing to move.
pub fn reset_store(gateway: &JsonFileGateway) -> Result<Option<PathBuf>, StoreIoError> {
    let path = gateway.path();
    if !path.exists() {
        gateway.save(&[])?;
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| StoreIoError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let now = chrono::Utc::now();
    let backup = path.with_extension(format!("json.corrupt-{}", now.format("%Y%m%dT%H%M%S")));
    fs::rename(path, &backup).map_err(|e| StoreIoError::Write {
        path: backup.clone(),
        source: e,
    })?;

    recovery::log_recovery(
        gateway.dir(),
        RecoveryEntry {
            timestamp: now,
            category: RecoveryCategory::Reset,
            description: "task store reset".to_string(),
            fields: vec![
                ("Source".to_string(), path.display().to_string()),
                ("Backup".to_string(), backup.display().to_string()),
            ],
            body: content,
        },
    );

    gateway.save(&[])?;
    Ok(Some(backup))
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Keeps the encoded document in memory. Used by tests in place of a file.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    document: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-persisted collection
    pub fn with_tasks(tasks: &[Task]) -> Result<Self, StoreIoError> {
        let gateway = Self::new();
        *gateway.document.borrow_mut() = Some(encode_tasks(tasks)?);
        Ok(gateway)
    }

    /// Start from raw document text (possibly invalid)
    pub fn with_document(text: &str) -> Self {
        let gateway = Self::new();
        *gateway.document.borrow_mut() = Some(text.to_string());
        gateway
    }

    /// The document as last persisted
    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make every following save fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TaskGateway for MemoryGateway {
    fn load(&self) -> Result<Vec<Task>, StoreIoError> {
        match self.document.borrow().as_deref() {
            None => Ok(Vec::new()),
            Some(text) => decode_tasks(text).map_err(|e| StoreIoError::CorruptStore {
                path: PathBuf::from("<memory>"),
                source: e,
            }),
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreIoError> {
        if self.fail_writes.get() {
            return Err(StoreIoError::Write {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::other("writes disabled"),
            });
        }
        *self.document.borrow_mut() = Some(encode_tasks(tasks)?);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl<G: TaskGateway + ?Sized> TaskGateway for &G {
    fn load(&self) -> Result<Vec<Task>, StoreIoError> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreIoError> {
        (**self).save(tasks)
    }

    fn record_deletion(&self, task: &Task) {
        (**self).record_deletion(task)
    }
}

impl<G: TaskGateway + ?Sized> TaskGateway for Box<G> {
    fn load(&self) -> Result<Vec<Task>, StoreIoError> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreIoError> {
        (**self).save(tasks)
    }

    fn record_deletion(&self, task: &Task) {
        (**self).record_deletion(task)
    }
}
