pub mod request_id;

pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Scopes whether 500 bodies may carry the underlying error text.
/// The flag comes from configuration (`environment != production`).
pub async fn error_details_middleware(
    State(expose): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    crate::tracing::scope_error_details(expose, next.run(request)).await
}
