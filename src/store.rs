use crate::state::TallyRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Fixed key both processes agree on.
pub const STORE_KEY: &str = "voteState";

/// Persistence seam between the counter and the display.
///
/// The counter is the sole writer; the display only loads. Implementations
/// fully overwrite the stored record on save.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, record: &TallyRecord) -> Result<()>;

    /// `None` means nothing has been written yet (counter not started).
    /// Malformed content is an error the caller treats as "no update".
    async fn load(&self) -> Result<Option<TallyRecord>>;
}

/// File-backed store keeping the record as JSON under the fixed key,
/// e.g. `~/.local/share/rekap/voteState.json`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn save(&self, record: &TallyRecord) -> Result<()> {
        let contents =
            serde_json::to_string(record).context("Failed to serialize tally record")?;

        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write tally record: {:?}", self.path))?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<TallyRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read tally record: {:?}", self.path));
            }
        };

        let record = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed tally record: {:?}", self.path))?;

        Ok(Some(record))
    }
}

/// In-memory store for tests. Clones share the same cell, and the record
/// round-trips through JSON the same way the file store does.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    value: std::sync::Arc<std::sync::Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryStore {
    /// Replace the stored value with garbage to simulate a torn read.
    pub fn poison(&self) {
        *self.value.lock().unwrap() = Some("not json".to_string());
    }
}

#[cfg(test)]
#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, record: &TallyRecord) -> Result<()> {
        let contents = serde_json::to_string(record)?;
        *self.value.lock().unwrap() = Some(contents);
        Ok(())
    }

    async fn load(&self) -> Result<Option<TallyRecord>> {
        let value = self.value.lock().unwrap().clone();
        value
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Malformed tally record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TallyRecord {
        TallyRecord {
            votes: vec![5, 3],
            invalid_votes: 1,
            is_finalized: false,
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join(format!("{STORE_KEY}.json"))).unwrap();

        store.save(&sample_record()).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, Some(sample_record()));
    }

    #[tokio::test]
    async fn load_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join(format!("{STORE_KEY}.json"))).unwrap();

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_content_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("{STORE_KEY}.json"));
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(path).unwrap();
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn save_overwrites_prior_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join(format!("{STORE_KEY}.json"))).unwrap();

        store.save(&sample_record()).await.unwrap();
        let mut finalized = sample_record();
        finalized.is_finalized = true;
        store.save(&finalized).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(finalized));
    }
}
