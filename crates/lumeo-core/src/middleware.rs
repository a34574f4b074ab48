use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

/// Header that carries the per-request id through logs and responses.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-lumeo-request-id");

/// Tags every request with a fresh v7 UUID, so ids also sort by arrival time.
#[derive(Clone, Default)]
pub struct MakeLumeoRequestId;

impl MakeRequestId for MakeLumeoRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::try_from(Uuid::now_v7().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Build the request-id layer. Apply with `.layer(request_id_layer())` in router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeLumeoRequestId> {
    SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeLumeoRequestId)
}
