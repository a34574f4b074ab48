//! Gateway-injected identity headers extractor.
//!
//! Authentication itself happens upstream; this service only consumes the
//! resolved user id and plan tier.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use lumeo_domain::plan::Plan;

/// Identity injected by the gateway via `x-lumeo-user-id`, `x-lumeo-user-plan`
/// and `x-lumeo-user-role` headers.
///
/// Returns 401 if the user id is absent or not a UUID. A missing plan header
/// defaults to the free tier; a missing role header defaults to 0. Role
/// enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub plan: Plan,
    pub role: u8,
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .headers
            .get("x-lumeo-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        let plan = parts
            .headers
            .get("x-lumeo-user-plan")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Plan>().ok())
            .unwrap_or(Plan::Free);

        let role = parts
            .headers
            .get("x-lumeo-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u8>().ok())
            .unwrap_or(0);

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                user_id,
                plan,
                role,
            })
        }
    }
}
