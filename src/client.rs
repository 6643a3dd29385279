use chrono::Utc;
use dashmap::DashMap;
use itertools::Itertools;
use tracing::{info, warn};
use crate::entities::*;
use crate::error::{Result, VitrineError};
use crate::integrity;
use crate::storage::{DbOperation, Storage};

/// The signage stores: content items, playlists and display devices, held in
/// memory and made durable through an append-only operation log. Writes go
/// through the log first and are applied to the maps only once persisted;
/// reads never touch the backing storage, so list/get keep answering (from
/// the last replayed state) even while the backend is unreachable.
pub struct VitrineClient<S: Storage> {
    storage: S,
    content_map: DashMap<ContentId, ContentItem>,
    playlist_map: DashMap<PlaylistId, Playlist>,
    device_map: DashMap<DeviceId, DisplayDevice>,
}

impl<S: Storage> VitrineClient<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            content_map: DashMap::new(),
            playlist_map: DashMap::new(),
            device_map: DashMap::new(),
        }
    }

    pub async fn init(&mut self) -> Result<()> {
        info!("replaying operation log...");
        let operations = self.storage.read_all().await?;
        for operation in operations {
            self.apply_no_wal(operation);
        }
        info!(
            "operation log replayed: {} content items, {} playlists, {} devices",
            self.content_map.len(),
            self.playlist_map.len(),
            self.device_map.len()
        );
        Ok(())
    }

    fn apply_no_wal(&mut self, operation: DbOperation) {
        match operation {
            DbOperation::CreateContent { content } | DbOperation::UpdateContent { content } => {
                self.content_map.insert(content.id.clone(), content);
            }
            DbOperation::DeleteContent { content_id } => {
                self.content_map.remove(&content_id);
            }
            DbOperation::CreatePlaylist { playlist } | DbOperation::UpdatePlaylist { playlist } => {
                self.playlist_map.insert(playlist.id.clone(), playlist);
            }
            DbOperation::DeletePlaylist { playlist_id } => {
                self.playlist_map.remove(&playlist_id);
            }
            DbOperation::CreateDevice { device } | DbOperation::UpdateDevice { device } => {
                self.device_map.insert(device.id.clone(), device);
            }
            DbOperation::DeleteDevice { device_id } => {
                self.device_map.remove(&device_id);
            }
            DbOperation::Heartbeat { device_id, at } => {
                if let Some(mut kvp) = self.device_map.get_mut(&device_id) {
                    let device = kvp.value_mut();
                    device.last_seen = at;
                    device.status = DeviceStatus::Online;
                }
            }
        }
    }

    async fn commit(&mut self, operation: DbOperation) -> Result<()> {
        self.storage.write(operation.clone()).await?;
        self.apply_no_wal(operation);
        Ok(())
    }

    async fn commit_batch(&mut self, operations: Vec<DbOperation>) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        self.storage.write_batch(&operations).await?;
        for operation in operations {
            self.apply_no_wal(operation);
        }
        Ok(())
    }

    // ---- content items ----

    pub fn list_content(&self) -> Vec<ContentItem> {
        self.content_map.iter()
            .map(|x| x.value().clone())
            .sorted_by_key(|x| (x.title.clone(), x.id.clone()))
            .collect()
    }

    pub fn get_content(&self, content_id: &str) -> Option<ContentItem> {
        self.content_map.get(content_id).map(|x| x.value().clone())
    }

    pub async fn create_content(&mut self, draft: ContentDraft) -> Result<ContentItem> {
        let content = ContentItem::new(draft)?;
        self.commit(DbOperation::CreateContent { content: content.clone() }).await?;
        Ok(content)
    }

    pub async fn update_content(&mut self, content_id: &str, patch: ContentPatch) -> Result<ContentItem> {
        let existing = self.get_content(content_id).ok_or(VitrineError::NotFound("content item"))?;
        let merged = existing.merged(patch);
        merged.validate()?;
        self.commit(DbOperation::UpdateContent { content: merged.clone() }).await?;
        Ok(merged)
    }

    /// Deletes a content item and strips its ID from every playlist that
    /// references it. The cascade is one atomic batch across the affected
    /// playlists; it is a separate write from the primary delete, so a
    /// storage failure between the two surfaces as a delete error with the
    /// primary record already gone.
    pub async fn delete_content(&mut self, content_id: &str) -> Result<ContentItem> {
        let content = self.get_content(content_id).ok_or(VitrineError::NotFound("content item"))?;
        self.commit(DbOperation::DeleteContent { content_id: content_id.to_string() }).await?;
        let cascade = integrity::content_removal_ops(
            content_id,
            self.playlist_map.iter().map(|x| x.value().clone()),
            Utc::now(),
        );
        self.commit_batch(cascade).await?;
        Ok(content)
    }

    // ---- playlists ----

    pub fn list_playlists(&self) -> Vec<PlaylistWithItems> {
        self.playlist_map.iter()
            .map(|x| x.value().clone())
            .sorted_by_key(|x| (x.created_at, x.id.clone()))
            .map(|playlist| self.project(playlist))
            .collect()
    }

    pub fn get_playlist(&self, playlist_id: &str) -> Option<Playlist> {
        self.playlist_map.get(playlist_id).map(|x| x.value().clone())
    }

    pub fn get_playlist_with_items(&self, playlist_id: &str) -> Option<PlaylistWithItems> {
        self.get_playlist(playlist_id).map(|playlist| self.project(playlist))
    }

    fn project(&self, playlist: Playlist) -> PlaylistWithItems {
        let items = playlist.item_ids.iter()
            .filter_map(|content_id| self.get_content(content_id))
            .collect();
        PlaylistWithItems { playlist, items }
    }

    pub async fn create_playlist(&mut self, draft: PlaylistDraft) -> Result<Playlist> {
        let playlist = Playlist::new(draft)?;
        self.commit(DbOperation::CreatePlaylist { playlist: playlist.clone() }).await?;
        Ok(playlist)
    }

    pub async fn update_playlist(&mut self, playlist_id: &str, draft: PlaylistDraft) -> Result<Playlist> {
        let existing = self.get_playlist(playlist_id).ok_or(VitrineError::NotFound("playlist"))?;
        let updated = existing.updated(draft)?;
        self.commit(DbOperation::UpdatePlaylist { playlist: updated.clone() }).await?;
        Ok(updated)
    }

    /// Deletes a playlist and clears it from every device (fallback
    /// assignment and schedule entries), as one atomic batch across the
    /// affected devices.
    pub async fn delete_playlist(&mut self, playlist_id: &str) -> Result<Playlist> {
        let playlist = self.get_playlist(playlist_id).ok_or(VitrineError::NotFound("playlist"))?;
        self.commit(DbOperation::DeletePlaylist { playlist_id: playlist_id.to_string() }).await?;
        let cascade = integrity::playlist_removal_ops(
            playlist_id,
            self.device_map.iter().map(|x| x.value().clone()),
        );
        self.commit_batch(cascade).await?;
        Ok(playlist)
    }

    // ---- devices ----

    pub fn list_devices(&self) -> Vec<DisplayDevice> {
        self.device_map.iter()
            .map(|x| x.value().clone())
            .sorted_by_key(|x| x.id.clone())
            .collect()
    }

    pub fn get_device(&self, device_id: &str) -> Option<DisplayDevice> {
        self.device_map.get(device_id).map(|x| x.value().clone())
    }

    pub async fn register_device(&mut self, registration: DeviceRegistration) -> Result<DisplayDevice> {
        if self.device_map.contains_key(&registration.id) {
            return Err(VitrineError::Conflict(format!("device with id '{}' already exists", registration.id)));
        }
        let device = DisplayDevice::register(registration)?;
        self.commit(DbOperation::CreateDevice { device: device.clone() }).await?;
        Ok(device)
    }

    pub async fn update_device(&mut self, device_id: &str, update: DeviceUpdate) -> Result<DisplayDevice> {
        let existing = self.get_device(device_id).ok_or(VitrineError::NotFound("device"))?;
        let updated = existing.updated(update)?;
        self.commit(DbOperation::UpdateDevice { device: updated.clone() }).await?;
        Ok(updated)
    }

    /// Marks the device as seen right now. Best-effort by design: a failure
    /// to persist is logged and swallowed so a device's polling loop never
    /// breaks on a transient storage outage; the in-memory state still
    /// advances.
    pub async fn heartbeat(&mut self, device_id: &str) -> Result<DisplayDevice> {
        if !self.device_map.contains_key(device_id) {
            return Err(VitrineError::NotFound("device"));
        }
        let operation = DbOperation::Heartbeat { device_id: device_id.to_string(), at: Utc::now() };
        if let Err(err) = self.storage.write(operation.clone()).await {
            warn!("failed to persist heartbeat for device {}: {}", device_id, err);
        }
        self.apply_no_wal(operation);
        self.get_device(device_id).ok_or(VitrineError::NotFound("device"))
    }

    pub async fn delete_device(&mut self, device_id: &str) -> Result<DisplayDevice> {
        let device = self.get_device(device_id).ok_or(VitrineError::NotFound("device"))?;
        self.commit(DbOperation::DeleteDevice { device_id: device_id.to_string() }).await?;
        Ok(device)
    }
}
