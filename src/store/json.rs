use crate::error::StorageError;
use crate::ports::{SnapshotStore, SubscriptionRegistry};
use crate::types::notice::Snapshot;
use crate::types::push::Subscription;

use serde::Serialize;
use serde::de::DeserializeOwned;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write as _;
use std::path::{Path, PathBuf};

const NOTICES_FILE: &str = "notices.json";
const SUBSCRIPTIONS_FILE: &str = "subscriptions.json";

/// Keeps each value as one pretty-printed JSON document inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn notices_path(&self) -> PathBuf {
        self.dir.join(NOTICES_FILE)
    }

    pub fn subscriptions_path(&self) -> PathBuf {
        self.dir.join(SUBSCRIPTIONS_FILE)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot, StorageError> {
        read_document(&self.notices_path())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        write_document(&self.notices_path(), snapshot)
    }
}

impl SubscriptionRegistry for JsonFileStore {
    fn list(&self) -> Result<Vec<Subscription>, StorageError> {
        read_document(&self.subscriptions_path())
    }

    fn replace_all(&self, subscriptions: &[Subscription]) -> Result<(), StorageError> {
        write_document(&self.subscriptions_path(), subscriptions)
    }
}

fn read_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => return Err(err.into()),
    };
    let text = decode_text(&bytes);
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&text)?)
}

fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let contents = serde_json::to_string_pretty(value)?;
    atomic_write(path, &contents)?;
    Ok(())
}

/// UTF-8 with an optional BOM, or UTF-16LE when the bytes contain NULs.
fn decode_text(bytes: &[u8]) -> String {
    if bytes.contains(&0) {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let text = String::from_utf16_lossy(&units);
        return text.trim_start_matches('\u{feff}').to_string();
    }
    let text = String::from_utf8_lossy(bytes);
    text.trim_start_matches('\u{feff}').to_string()
}

fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store.json");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_path = parent.join(format!(".{file_name}.tmp-{pid}-{nanos}-{attempt}"));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                let written = file
                    .write_all(contents.as_bytes())
                    .and_then(|()| file.sync_all())
                    .and_then(|()| std::fs::rename(&temp_path, path));
                if written.is_err() {
                    let _ = std::fs::remove_file(&temp_path);
                }
                return written;
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "could not allocate a temporary file",
    ))
}
