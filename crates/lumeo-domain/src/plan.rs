//! Subscription plan tiers and their submission rate limits.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Plan tier resolved by the gateway and injected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Plus,
    Pro,
}

/// Fixed `(requests, window)` ceiling for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub window: Duration,
}

impl Plan {
    /// Submission rate limit for this tier.
    pub fn rate_limit(self) -> RateLimit {
        match self {
            Self::Free => RateLimit {
                requests: 10,
                window: Duration::from_secs(60),
            },
            Self::Plus => RateLimit {
                requests: 30,
                window: Duration::from_secs(60),
            },
            Self::Pro => RateLimit {
                requests: 100,
                window: Duration::from_secs(60),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Plus => "plus",
            Self::Pro => "pro",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown plan: {0}")]
pub struct UnknownPlan(String);

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "plus" => Ok(Self::Plus),
            "pro" => Ok(Self::Pro),
            other => Err(UnknownPlan(other.to_owned())),
        }
    }
}
