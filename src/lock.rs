//! Advisory locking and atomic replacement for data directory files.
//!
//! The TUI, the watch daemon and one-shot commands may all rewrite
//! `assignments.json`. A writer holds a [`DataLock`] on the sibling
//! `<file>.lock` for the whole reload/change/save cycle, and the save itself
//! goes through [`replace_file`] so readers never see a half-written file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::debug;

use crate::error::{Error, Result};

/// How long a writer waits for another process before giving up.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const RETRY_EVERY: Duration = Duration::from_millis(25);

/// Exclusive hold on a data file; released on drop.
#[derive(Debug)]
pub struct DataLock {
    file: File,
}

impl DataLock {
    /// Lock `target` (through its `.lock` sibling), waiting up to `timeout`.
    pub fn for_file(target: &Path, timeout: Duration) -> Result<Self> {
        let path = lock_path_for(target);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let deadline = Instant::now() + timeout;
        let mut waited = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(err) if !is_contended(&err) => return Err(err.into()),
                Err(_) if Instant::now() >= deadline => return Err(Error::LockFailed(path)),
                Err(_) => {
                    if !waited {
                        debug!(path = %path.display(), "data file busy; waiting");
                        waited = true;
                    }
                    thread::sleep(RETRY_EVERY);
                }
            }
        }
    }
}

impl Drop for DataLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// `assignments.json` -> `assignments.json.lock`
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Write `data` to a hidden temp file next to `path`, then rename it over `path`.
pub fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{name}.{}.tmp", std::process::id()));

    let mut file = File::create(&temp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    Ok(())
}
