//! Metered actions, their credit costs, and pool routing.
//!
//! The action→cost and action→pool rules live here and nowhere else, so a new
//! action is added in exactly one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every creditable action a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenAction {
    ImageGen,
    VideoGen,
    ImageToVideo,
    RemoveBg,
    Upscale,
    GenFill,
    Expand,
    Edit,
    Chat,
}

/// Which balance an action draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreditPool {
    Image,
    Video,
    /// Single balance for actions not bound to a media pool (chat, top-ups).
    Legacy,
}

/// When a job's credits are deducted.
///
/// The choice is per action family, not global: generations charge up front
/// (refund on terminal failure), the edit family charges only once the result
/// is durably stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargePolicy {
    AtSubmission,
    OnCompletion,
}

impl GenAction {
    /// Static action→cost table, in credits.
    pub fn cost(self) -> i32 {
        match self {
            Self::ImageGen => 5,
            Self::VideoGen => 50,
            Self::ImageToVideo => 50,
            Self::RemoveBg => 2,
            Self::Upscale => 2,
            Self::GenFill => 4,
            Self::Expand => 4,
            Self::Edit => 4,
            Self::Chat => 0,
        }
    }

    /// Pool routing: video actions draw from the video pool, chat from the
    /// legacy pool, everything else from the image pool.
    pub fn pool(self) -> CreditPool {
        match self {
            Self::VideoGen | Self::ImageToVideo => CreditPool::Video,
            Self::Chat => CreditPool::Legacy,
            _ => CreditPool::Image,
        }
    }

    pub fn charge_policy(self) -> ChargePolicy {
        match self {
            Self::ImageGen | Self::VideoGen | Self::ImageToVideo => ChargePolicy::AtSubmission,
            _ => ChargePolicy::OnCompletion,
        }
    }

    /// Whether this action produces a generation job at all.
    pub fn is_job(self) -> bool {
        !matches!(self, Self::Chat)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageGen => "image-gen",
            Self::VideoGen => "video-gen",
            Self::ImageToVideo => "image-to-video",
            Self::RemoveBg => "remove-bg",
            Self::Upscale => "upscale",
            Self::GenFill => "gen-fill",
            Self::Expand => "expand",
            Self::Edit => "edit",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for GenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(String);

impl FromStr for GenAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image-gen" => Ok(Self::ImageGen),
            "video-gen" => Ok(Self::VideoGen),
            "image-to-video" => Ok(Self::ImageToVideo),
            "remove-bg" => Ok(Self::RemoveBg),
            "upscale" => Ok(Self::Upscale),
            "gen-fill" => Ok(Self::GenFill),
            "expand" => Ok(Self::Expand),
            "edit" => Ok(Self::Edit),
            "chat" => Ok(Self::Chat),
            other => Err(UnknownAction(other.to_owned())),
        }
    }
}
