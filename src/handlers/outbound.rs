use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    dto::movements::{
        CreateOutboundRequest, OutboundListQuery, OutboundResponse, UpdateOutboundRequest,
    },
    errors::ServiceError,
    handlers::common::{page_request, AppPath, AppQuery, PaginatedResponse, ValidatedJson},
    ApiResponse, AppState,
};

pub fn outbound_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_outbound).post(create_outbound))
        .route(
            "/:id",
            get(get_outbound)
                .put(update_outbound)
                .delete(delete_outbound),
        )
        .route("/:id/void", post(void_outbound))
}

/// List outbound records, latest first, with product populated
#[utoipa::path(
    get,
    path = "/api/v1/outbound",
    params(OutboundListQuery),
    responses(
        (status = 200, description = "Outbound records listed", body = PaginatedResponse<OutboundResponse>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "Outbound"
)]
pub async fn list_outbound(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OutboundListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(query.page, query.limit, &state.config)?;
    let records = state
        .services
        .movements
        .list_outbound(query.filter(), page)
        .await?;
    Ok(Json(PaginatedResponse::<OutboundResponse>::from_page(
        records,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/outbound/{id}",
    params(("id" = Uuid, Path, description = "Outbound record id")),
    responses(
        (status = 200, description = "Outbound record found", body = crate::ApiResponse<OutboundResponse>),
        (status = 404, description = "Outbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Outbound"
)]
pub async fn get_outbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.movements.get_outbound(id).await?;
    Ok(Json(ApiResponse::success(OutboundResponse::from(record))))
}

/// Record goods leaving the store; rejected when stock is insufficient
#[utoipa::path(
    post,
    path = "/api/v1/outbound",
    request_body = CreateOutboundRequest,
    responses(
        (status = 201, description = "Outbound recorded", body = crate::ApiResponse<OutboundResponse>),
        (status = 400, description = "Invalid payload, unknown product or insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "Outbound"
)]
pub async fn create_outbound(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOutboundRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .services
        .movements
        .create_outbound(payload.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            OutboundResponse::from(record),
            "Outbound recorded",
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/outbound/{id}",
    params(("id" = Uuid, Path, description = "Outbound record id")),
    request_body = UpdateOutboundRequest,
    responses(
        (status = 200, description = "Outbound record updated", body = crate::ApiResponse<OutboundResponse>),
        (status = 400, description = "Invalid payload or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Outbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Outbound"
)]
pub async fn update_outbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOutboundRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .services
        .movements
        .update_outbound(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::with_message(
        OutboundResponse::from(record),
        "Outbound record updated",
    )))
}

/// Delete an outbound record and return its quantity to stock
#[utoipa::path(
    delete,
    path = "/api/v1/outbound/{id}",
    params(("id" = Uuid, Path, description = "Outbound record id")),
    responses(
        (status = 200, description = "Outbound record deleted"),
        (status = 404, description = "Outbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Outbound"
)]
pub async fn delete_outbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.movements.delete_outbound(id).await?;
    Ok(Json(ApiResponse::with_message(
        (),
        "Outbound record deleted",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/outbound/{id}/void",
    params(("id" = Uuid, Path, description = "Outbound record id")),
    responses(
        (status = 200, description = "Outbound record voided", body = crate::ApiResponse<OutboundResponse>),
        (status = 400, description = "Already voided", body = crate::errors::ErrorResponse),
        (status = 404, description = "Outbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Outbound"
)]
pub async fn void_outbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.movements.void_outbound(id).await?;
    Ok(Json(ApiResponse::with_message(
        OutboundResponse::from(record),
        "Outbound record voided",
    )))
}
