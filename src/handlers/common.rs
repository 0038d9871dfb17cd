use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    config::AppConfig,
    errors::ServiceError,
    services::{Page, PageRequest},
};

/// JSON body extractor that validates its payload and reports malformed input
/// through the standard error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServiceError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string extractor with envelope-shaped rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServiceError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path extractor; a malformed id is a bad request rather than a plain-text 400.
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServiceError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Resolves `page`/`limit` query values against the configured defaults.
///
/// A page whose row offset cannot be expressed is a validation error.
pub fn page_request(
    page: Option<u64>,
    limit: Option<u64>,
    config: &AppConfig,
) -> Result<PageRequest, ServiceError> {
    let size = limit
        .unwrap_or(config.api_default_page_size)
        .clamp(1, config.api_max_page_size.max(1));
    let request = PageRequest::new(page.unwrap_or(1), size);
    if request.checked_offset().is_none() {
        return Err(ServiceError::ValidationError(format!(
            "page {} is out of range",
            request.page
        )));
    }
    Ok(request)
}

/// Standard pagination response metadata
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current: u64,
    pub page_size: u64,
    pub total: u64,
    pub pages: u64,
}

impl PaginationMeta {
    pub fn new(current: u64, page_size: u64, total: u64) -> Self {
        let pages = if total == 0 || page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            current,
            page_size,
            total,
            pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<M>(page: Page<M>) -> Self
    where
        T: From<M>,
    {
        Self {
            success: true,
            pagination: PaginationMeta::new(page.request.page, page.request.page_size, page.total),
            data: page.items.into_iter().map(T::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_rounds_pages_up() {
        let meta = PaginationMeta::new(2, 20, 41);
        assert_eq!(meta.pages, 3);
        assert_eq!(PaginationMeta::new(1, 20, 0).pages, 0);
    }

    #[test]
    fn page_request_clamps_to_configured_maximum() {
        let config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            0,
            "test".into(),
        );
        let req = page_request(Some(0), Some(10_000), &config).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, config.api_max_page_size);

        let req = page_request(None, None, &config).unwrap();
        assert_eq!(req.page_size, config.api_default_page_size);
    }

    #[test]
    fn page_request_rejects_unaddressable_pages() {
        let config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            0,
            "test".into(),
        );
        assert!(matches!(
            page_request(Some(u64::MAX), Some(20), &config),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(page_request(Some(1_000_000), Some(20), &config).is_ok());
    }
}
