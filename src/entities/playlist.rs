use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::entities::{ContentId, ContentItem};
use crate::error::{Result, VitrineError};

pub type PlaylistId = String;

pub const MIN_NAME_LEN: usize = 3;

/// `item_ids` is the only persisted ordering source of truth; playback order
/// follows it. Referenced content items may be deleted out from under a
/// playlist, so resolution happens at read time (see `PlaylistWithItems`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub item_ids: Vec<ContentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub item_ids: Vec<ContentId>,
}

impl PlaylistDraft {
    pub fn validate(&self) -> Result<()> {
        if self.name.chars().count() < MIN_NAME_LEN {
            return Err(VitrineError::validation("name", format!("name must be at least {MIN_NAME_LEN} characters")));
        }
        if self.item_ids.is_empty() {
            return Err(VitrineError::validation("itemIds", "a playlist needs at least one item"));
        }
        Ok(())
    }
}

impl Playlist {
    pub fn new(draft: PlaylistDraft) -> Result<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            item_ids: draft.item_ids,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn updated(&self, draft: PlaylistDraft) -> Result<Self> {
        draft.validate()?;
        Ok(Self {
            id: self.id.clone(),
            name: draft.name,
            description: draft.description,
            item_ids: draft.item_ids,
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }
}

/// Read-time projection of a playlist: `items` is `item_ids` resolved against
/// the content store with dangling IDs dropped. Never persisted.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistWithItems {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub items: Vec<ContentItem>,
}
