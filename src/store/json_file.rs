//! JSON file appointment store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ensure_free, AppointmentStore};
use crate::error::StoreError;
use crate::types::Appointment;

/// How long a writer waits for another process to release the file
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(25);
/// A lock file older than this is left over from a crashed writer
const LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

/// Keeps the whole appointment list as one JSON array on disk
pub struct JsonFileAppointmentStore {
    path: PathBuf,
    // Serializes load-modify-save sequences within this process
    lock: Mutex<()>,
}

impl JsonFileAppointmentStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Vec<Appointment>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(vec![]),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(appointments)?;

        // Write then rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Saved {} appointments to {}", appointments.len(), self.path.display());
        Ok(())
    }

    /// Exclusive write access across this and other processes
    async fn lock_file(&self) -> Result<FileLock, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        FileLock::acquire(self.path.with_extension("json.lock")).await
    }
}

/// Sibling `.lock` file created with `create_new`; removed on drop
struct FileLock {
    path: PathBuf,
}

impl FileLock {
    async fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            let created = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match created {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path).await {
                        warn!("Removing stale lock {}", path.display());
                        tokio::fs::remove_file(&path).await.ok();
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(StoreError::Io(std::io::Error::new(
                            ErrorKind::WouldBlock,
                            format!("{} is held by another writer", path.display()),
                        )));
                    }
                    tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

async fn is_stale(path: &Path) -> bool {
    match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified
            .elapsed()
            .map(|age| age > LOCK_STALE_AFTER)
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[async_trait]
impl AppointmentStore for JsonFileAppointmentStore {
    async fn load(&self) -> Result<Vec<Appointment>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let _file_lock = self.lock_file().await?;
        self.write(appointments).await
    }

    async fn add(&self, appointment: Appointment) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let _file_lock = self.lock_file().await?;
        let mut appointments = self.read().await?;
        ensure_free(&appointments, &appointment)?;
        appointments.push(appointment);
        self.write(&appointments).await
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
