// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory lock file guarding the staging area across processes.
//!
//! The lock file records the holder's PID and acquisition time. A lock whose
//! holder is gone, or which is older than [`MAX_LOCK_AGE`], is stale and is
//! recovered by the next trainer instead of blocking training forever.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchyard_core::SwitchyardError;
use tracing::{info, warn};

pub const LOCK_FILE: &str = ".train.lock";

/// Age after which a lock is recovered even if its holder still appears alive.
pub const MAX_LOCK_AGE: Duration = Duration::from_secs(6 * 60 * 60);

/// Contents of the lock file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl LockHolder {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    fn age(&self) -> Duration {
        (Utc::now() - self.acquired_at).to_std().unwrap_or_default()
    }

    /// `false` only when the process is known to be gone. Without `/proc`
    /// liveness cannot be checked and the holder is assumed alive.
    fn is_alive(&self) -> bool {
        let proc = Path::new("/proc");
        !proc.is_dir() || proc.join(self.pid.to_string()).exists()
    }

    fn is_stale(&self) -> bool {
        self.age() > MAX_LOCK_AGE || !self.is_alive()
    }
}

/// Held for the duration of one training run; the file is removed on drop.
#[derive(Debug)]
pub struct StagingLock {
    path: PathBuf,
}

impl StagingLock {
    /// [`acquire`](Self::acquire) on the blocking pool.
    pub async fn acquire_in(staging: PathBuf) -> Result<Self, SwitchyardError> {
        tokio::task::spawn_blocking(move || Self::acquire(&staging))
            .await
            .map_err(|e| SwitchyardError::Internal(format!("lock task failed: {e}")))?
    }

    /// Create `<staging>/.train.lock` exclusively, recovering a stale lock
    /// left by a crashed trainer.
    pub fn acquire(staging: &Path) -> Result<Self, SwitchyardError> {
        let path = staging.join(LOCK_FILE);
        match create(&path) {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            other => return other.map(|()| Self { path }).map_err(Into::into),
        }

        match read_holder(&path)? {
            // Released between our create attempt and the read.
            None => {}
            Some(Ok(holder)) if holder.is_stale() => {
                info!(
                    lock = %path.display(),
                    pid = holder.pid,
                    age_secs = holder.age().as_secs(),
                    "recovering stale training lock"
                );
                remove_if_present(&path)?;
            }
            Some(Ok(holder)) => {
                warn!(
                    lock = %path.display(),
                    pid = holder.pid,
                    age_secs = holder.age().as_secs(),
                    "staging area is locked by another trainer"
                );
                return Err(SwitchyardError::TrainingBusy);
            }
            // A holder that has created the file but not yet written it also
            // reads as unparseable, so only an old unreadable file is recovered.
            Some(Err(modified_age)) if modified_age > MAX_LOCK_AGE => {
                info!(lock = %path.display(), "recovering unreadable training lock");
                remove_if_present(&path)?;
            }
            Some(Err(_)) => {
                warn!(lock = %path.display(), "staging area is locked by another trainer");
                return Err(SwitchyardError::TrainingBusy);
            }
        }

        match create(&path) {
            Ok(()) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(SwitchyardError::TrainingBusy),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for StagingLock {
    /// Removal is a single synchronous unlink.
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to remove training lock");
        }
    }
}

fn create(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let holder = serde_json::to_vec(&LockHolder::current())?;
    file.write_all(&holder)?;
    file.sync_all()
}

/// `None` when the file is gone. `Some(Err(age))` carries the file's
/// modification age when its contents do not parse.
fn read_holder(path: &Path) -> Result<Option<Result<LockHolder, Duration>>, SwitchyardError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice::<LockHolder>(&bytes) {
        Ok(holder) => Ok(Some(Ok(holder))),
        Err(_) => {
            let age = fs::metadata(path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .unwrap_or_default();
            Ok(Some(Err(age)))
        }
    }
}

fn remove_if_present(path: &Path) -> Result<(), SwitchyardError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant(dir: &Path, holder: &LockHolder) {
        fs::write(dir.join(LOCK_FILE), serde_json::to_vec(holder).unwrap()).unwrap();
    }

    #[test]
    fn second_acquire_is_busy_until_drop() {
        let dir = tempfile::tempdir().unwrap();
        let lock = StagingLock::acquire(dir.path()).unwrap();
        assert!(dir.path().join(LOCK_FILE).exists());
        assert!(matches!(
            StagingLock::acquire(dir.path()),
            Err(SwitchyardError::TrainingBusy)
        ));
        drop(lock);
        assert!(!dir.path().join(LOCK_FILE).exists());
        assert!(StagingLock::acquire(dir.path()).is_ok());
    }

    #[test]
    fn lock_file_records_holder() {
        let dir = tempfile::tempdir().unwrap();
        let _lock = StagingLock::acquire(dir.path()).unwrap();
        let bytes = fs::read(dir.path().join(LOCK_FILE)).unwrap();
        let holder: LockHolder = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(holder.pid, std::process::id());
        assert!(holder.age() < Duration::from_secs(60));
    }

    #[test]
    fn lock_of_live_holder_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        plant(dir.path(), &LockHolder::current());
        assert!(matches!(
            StagingLock::acquire(dir.path()),
            Err(SwitchyardError::TrainingBusy)
        ));
        assert!(dir.path().join(LOCK_FILE).exists());
    }

    #[test]
    fn expired_lock_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let mut holder = LockHolder::current();
        holder.acquired_at = Utc::now() - chrono::Duration::hours(7);
        plant(dir.path(), &holder);

        let lock = StagingLock::acquire(dir.path()).unwrap();
        let bytes = fs::read(dir.path().join(LOCK_FILE)).unwrap();
        let fresh: LockHolder = serde_json::from_slice(&bytes).unwrap();
        assert!(fresh.acquired_at > holder.acquired_at);
        drop(lock);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn lock_of_dead_process_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        // Above the kernel's pid_max ceiling, so never a running process.
        let holder = LockHolder {
            pid: 4_194_305,
            acquired_at: Utc::now(),
        };
        assert!(!holder.is_alive());
        plant(dir.path(), &holder);
        assert!(StagingLock::acquire(dir.path()).is_ok());
    }

    #[test]
    fn fresh_unreadable_lock_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCK_FILE), b"").unwrap();
        assert!(matches!(
            StagingLock::acquire(dir.path()),
            Err(SwitchyardError::TrainingBusy)
        ));
    }

    #[tokio::test]
    async fn acquire_in_runs_off_the_executor() {
        let dir = tempfile::tempdir().unwrap();
        let lock = StagingLock::acquire_in(dir.path().to_path_buf()).await.unwrap();
        assert!(dir.path().join(LOCK_FILE).exists());
        drop(lock);
    }
}
