//! JSON file backed store

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fs2::FileExt;

use super::{Entries, KeyValueStore, StorageError};

/// Store persisted as a single JSON object (`state.json` in the data dir).
///
/// Writes take an exclusive lock on a sibling `.lock` file, write a temp file
/// and rename it over the original, so a crash never leaves a torn file and a
/// second CLI process cannot interleave its update.
///
/// Writes run on async request paths, so a lock held by another process is
/// polled for at most `lock_timeout` instead of blocking the thread on it.
pub struct FileStore {
    path: PathBuf,
    write_guard: Mutex<()>,
    lock_timeout: Duration,
}

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Store at `<dir>/state.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn acquire(&self, lock_file: &std::fs::File, lock_path: &Path) -> Result<(), StorageError> {
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if Instant::now() >= deadline {
                        return Err(StorageError::Locked {
                            path: lock_path.display().to_string(),
                        });
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(self.io_error(lock_path, e)),
            }
        }
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Encode {
                key: "*".to_string(),
                source,
            }
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| self.io_error(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .and_then(|_| temp_file.sync_all())
            .map_err(|e| self.io_error(&temp_path, e))?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(&self.path, e))
    }
}

impl KeyValueStore for FileStore {
    fn snapshot(&self) -> Result<Entries, StorageError> {
        self.read_entries()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Entries)) -> Result<(), StorageError> {
        let _guard = self.write_guard.lock().map_err(|_| StorageError::Poisoned)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let lock_path = self.path.with_extension("json.lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| self.io_error(&lock_path, e))?;
        self.acquire(&lock_file, &lock_path)?;

        // Re-read under the lock so updates from other processes are kept.
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
        // Lock is released when lock_file is dropped
    }
}
