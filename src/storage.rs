use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::entities::{ContentId, ContentItem, DeviceId, DisplayDevice, Playlist, PlaylistId};
use crate::error::VitrineError;

/// One durable mutation. The backing store is an append-only log of these;
/// the in-memory maps are rebuilt by replaying it at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DbOperation {
    CreateContent { content: ContentItem },
    UpdateContent { content: ContentItem },
    DeleteContent { content_id: ContentId },
    CreatePlaylist { playlist: Playlist },
    UpdatePlaylist { playlist: Playlist },
    DeletePlaylist { playlist_id: PlaylistId },
    CreateDevice { device: DisplayDevice },
    UpdateDevice { device: DisplayDevice },
    DeleteDevice { device_id: DeviceId },
    Heartbeat { device_id: DeviceId, at: DateTime<Utc> },
}

pub trait Storage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, VitrineError>;
    async fn write(&mut self, operation: DbOperation) -> Result<(), VitrineError>;
    /// Persist a group of operations as a single append, so a cascade lands
    /// entirely or not at all.
    async fn write_batch(&mut self, operations: &[DbOperation]) -> Result<(), VitrineError>;
}

pub struct FileStorage {
    db_path: PathBuf,
}

impl FileStorage {
    pub fn new(db_path: PathBuf) -> anyhow::Result<Self> {
        Ok(Self { db_path })
    }
}

impl Storage for FileStorage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, VitrineError> {
        let file_str = tokio::fs::read_to_string(&self.db_path).await
            .map_err(VitrineError::StorageUnavailable)?;
        let operations = file_str.split('\n')
            .filter(|x| !x.is_empty())
            .map(|x| serde_json::from_str(x).map_err(VitrineError::Serialization))
            .collect::<Result<Vec<DbOperation>, VitrineError>>()?;
        Ok(operations)
    }

    async fn write(&mut self, operation: DbOperation) -> Result<(), VitrineError> {
        self.write_batch(std::slice::from_ref(&operation)).await
    }

    async fn write_batch(&mut self, operations: &[DbOperation]) -> Result<(), VitrineError> {
        let mut buffer = String::new();
        for operation in operations {
            let serialized_operation = serde_json::to_string(operation)
                .map_err(VitrineError::Serialization)?;
            buffer.push_str(&serialized_operation);
            buffer.push('\n');
        }
        let mut file = tokio::fs::OpenOptions::new().append(true).create(true).open(&self.db_path).await
            .map_err(VitrineError::StorageUnavailable)?;
        tokio::io::AsyncWriteExt::write_all(&mut file, buffer.as_bytes()).await
            .map_err(VitrineError::StorageUnavailable)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    operations: Vec<DbOperation>,
}

impl Storage for InMemoryStorage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, VitrineError> {
        Ok(self.operations.clone())
    }

    async fn write(&mut self, operation: DbOperation) -> Result<(), VitrineError> {
        self.operations.push(operation);
        Ok(())
    }

    async fn write_batch(&mut self, operations: &[DbOperation]) -> Result<(), VitrineError> {
        self.operations.extend_from_slice(operations);
        Ok(())
    }
}

/// Fails every write. Lets tests exercise the degraded paths (swallowed
/// heartbeat persistence in particular).
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingStorage;

#[cfg(test)]
impl Storage for FailingStorage {
    async fn read_all(&self) -> Result<Vec<DbOperation>, VitrineError> {
        Ok(vec![])
    }

    async fn write(&mut self, _operation: DbOperation) -> Result<(), VitrineError> {
        Err(VitrineError::StorageUnavailable(std::io::Error::new(std::io::ErrorKind::Other, "backend down")))
    }

    async fn write_batch(&mut self, _operations: &[DbOperation]) -> Result<(), VitrineError> {
        Err(VitrineError::StorageUnavailable(std::io::Error::new(std::io::ErrorKind::Other, "backend down")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ContentDraft, ContentKind};

    fn sample_content() -> ContentItem {
        ContentItem::new(ContentDraft {
            kind: ContentKind::Web,
            url: "https://example.com/board".to_string(),
            duration: 20,
            title: None,
            data_ai_hint: None,
            page_image_urls: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn file_storage_round_trips_operations() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("vitrine.db.json");
        let mut storage = FileStorage::new(db_path.clone()).unwrap();

        let content = sample_content();
        storage.write(DbOperation::CreateContent { content: content.clone() }).await.unwrap();
        storage.write(DbOperation::DeleteContent { content_id: content.id.clone() }).await.unwrap();

        let operations = FileStorage::new(db_path).unwrap().read_all().await.unwrap();
        assert_eq!(operations.len(), 2);
        assert!(matches!(&operations[0], DbOperation::CreateContent { content: c } if c == &content));
        assert!(matches!(&operations[1], DbOperation::DeleteContent { content_id } if content_id == &content.id));
    }

    #[tokio::test]
    async fn batch_lands_as_contiguous_operations() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("vitrine.db.json");
        let mut storage = FileStorage::new(db_path.clone()).unwrap();

        let a = sample_content();
        let b = sample_content();
        let batch = vec![
            DbOperation::CreateContent { content: a.clone() },
            DbOperation::CreateContent { content: b.clone() },
        ];
        storage.write_batch(&batch).await.unwrap();

        let operations = storage.read_all().await.unwrap();
        assert_eq!(operations.len(), 2);
        assert!(matches!(&operations[0], DbOperation::CreateContent { content } if content == &a));
        assert!(matches!(&operations[1], DbOperation::CreateContent { content } if content == &b));
    }

    #[tokio::test]
    async fn missing_db_file_reports_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.db.json")).unwrap();
        assert!(matches!(storage.read_all().await, Err(VitrineError::StorageUnavailable(_))));
    }
}
