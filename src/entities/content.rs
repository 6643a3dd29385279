use serde::{Deserialize, Serialize};
use crate::error::{Result, VitrineError};

pub type ContentId = String;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
    Web,
    Pdf,
}

/// A single playable asset. For `pdf` content, `url` points at the original
/// file and `page_image_urls` holds the rasterized pages in page order;
/// `duration` then applies per page.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentId,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub url: String,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_ai_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_image_urls: Option<Vec<String>>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub url: String,
    pub duration: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data_ai_hint: Option<String>,
    #[serde(default)]
    pub page_image_urls: Option<Vec<String>>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    #[serde(rename = "type")]
    pub kind: Option<ContentKind>,
    pub url: Option<String>,
    pub duration: Option<u32>,
    pub title: Option<String>,
    pub data_ai_hint: Option<String>,
    pub page_image_urls: Option<Vec<String>>,
}

impl ContentItem {
    pub fn new(draft: ContentDraft) -> Result<Self> {
        let content = Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: draft.kind,
            url: draft.url,
            duration: draft.duration,
            title: draft.title,
            data_ai_hint: draft.data_ai_hint,
            page_image_urls: normalize_page_urls(draft.page_image_urls),
        };
        content.validate()?;
        Ok(content)
    }

    pub fn merged(&self, patch: ContentPatch) -> Self {
        Self {
            id: self.id.clone(),
            kind: patch.kind.unwrap_or(self.kind),
            url: patch.url.unwrap_or_else(|| self.url.clone()),
            duration: patch.duration.unwrap_or(self.duration),
            title: patch.title.or_else(|| self.title.clone()),
            data_ai_hint: patch.data_ai_hint.or_else(|| self.data_ai_hint.clone()),
            page_image_urls: normalize_page_urls(patch.page_image_urls.or_else(|| self.page_image_urls.clone())),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(VitrineError::validation("url", "url is required"));
        }
        if self.duration == 0 {
            return Err(VitrineError::validation("duration", "duration must be a positive number of seconds"));
        }
        if let Some(hint) = &self.data_ai_hint {
            if hint.split_whitespace().count() > 2 {
                return Err(VitrineError::validation("dataAiHint", "hint must be at most two words"));
            }
        }
        match self.kind {
            ContentKind::Pdf => {
                if self.page_image_urls.as_ref().map_or(true, |urls| urls.is_empty()) {
                    return Err(VitrineError::validation("pageImageUrls", "pdf content requires at least one page image"));
                }
            }
            _ => {
                if self.page_image_urls.is_some() {
                    return Err(VitrineError::validation("pageImageUrls", "only pdf content may carry page images"));
                }
            }
        }
        Ok(())
    }
}

// An empty list means "no pages", same as absent. Collapsing the two keeps
// the populated-iff-pdf invariant checkable in one place.
fn normalize_page_urls(urls: Option<Vec<String>>) -> Option<Vec<String>> {
    urls.filter(|x| !x.is_empty())
}
