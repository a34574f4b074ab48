//! Media kinds and the provider task status surface.
//!
//! A completed task's payload is shaped differently per media kind (an image
//! array vs a single video object). [`TaskResult`] is the single place that
//! knows both shapes; every consumer goes through [`TaskResult::primary_url`].

use serde::{Deserialize, Serialize};

use crate::action::GenAction;

/// Kind of artifact a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Video => "mp4",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Image => "image/png",
            Self::Video => "video/mp4",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl From<GenAction> for MediaKind {
    fn from(action: GenAction) -> Self {
        match action {
            GenAction::VideoGen | GenAction::ImageToVideo => Self::Video,
            _ => Self::Image,
        }
    }
}

/// Provider-side task state as reported by poll or webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// One generated image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// One generated video asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Result payload of a completed task, tagged by media kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskResult {
    #[serde(rename = "images")]
    Images(Vec<ImageAsset>),
    #[serde(rename = "video")]
    Video(VideoAsset),
}

impl TaskResult {
    /// The one URL every consumer should treat as "the result".
    ///
    /// Image tasks may return several candidates; the first is canonical.
    pub fn primary_url(&self) -> Option<&str> {
        match self {
            Self::Images(images) => images.first().map(|a| a.url.as_str()),
            Self::Video(video) => Some(video.url.as_str()),
        }
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        match self {
            Self::Images(images) => images.first().and_then(|a| a.thumbnail_url.as_deref()),
            Self::Video(video) => video.thumbnail_url.as_deref(),
        }
    }
}

/// Snapshot of a provider task: state plus progress and, when terminal, a
/// result or error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
