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
        CreateInboundRequest, InboundListQuery, InboundResponse, UpdateInboundRequest,
    },
    errors::ServiceError,
    handlers::common::{page_request, AppPath, AppQuery, PaginatedResponse, ValidatedJson},
    ApiResponse, AppState,
};

pub fn inbound_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inbound).post(create_inbound))
        .route(
            "/:id",
            get(get_inbound).put(update_inbound).delete(delete_inbound),
        )
        .route("/:id/void", post(void_inbound))
}

/// List inbound records, latest first, with product and supplier populated
#[utoipa::path(
    get,
    path = "/api/v1/inbound",
    params(InboundListQuery),
    responses(
        (status = 200, description = "Inbound records listed", body = PaginatedResponse<InboundResponse>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "Inbound"
)]
pub async fn list_inbound(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<InboundListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(query.page, query.limit, &state.config)?;
    let records = state
        .services
        .movements
        .list_inbound(query.filter(), page)
        .await?;
    Ok(Json(PaginatedResponse::<InboundResponse>::from_page(records)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inbound/{id}",
    params(("id" = Uuid, Path, description = "Inbound record id")),
    responses(
        (status = 200, description = "Inbound record found", body = crate::ApiResponse<InboundResponse>),
        (status = 404, description = "Inbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Inbound"
)]
pub async fn get_inbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.movements.get_inbound(id).await?;
    Ok(Json(ApiResponse::success(InboundResponse::from(record))))
}

/// Record received goods; stock increases by the quantity
#[utoipa::path(
    post,
    path = "/api/v1/inbound",
    request_body = CreateInboundRequest,
    responses(
        (status = 201, description = "Inbound recorded", body = crate::ApiResponse<InboundResponse>),
        (status = 400, description = "Invalid payload or unknown product or supplier", body = crate::errors::ErrorResponse)
    ),
    tag = "Inbound"
)]
pub async fn create_inbound(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateInboundRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .services
        .movements
        .create_inbound(payload.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            InboundResponse::from(record),
            "Inbound recorded",
        )),
    ))
}

/// Edit an inbound record; stock follows the quantity difference
#[utoipa::path(
    put,
    path = "/api/v1/inbound/{id}",
    params(("id" = Uuid, Path, description = "Inbound record id")),
    request_body = UpdateInboundRequest,
    responses(
        (status = 200, description = "Inbound record updated", body = crate::ApiResponse<InboundResponse>),
        (status = 400, description = "Invalid payload or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Inbound"
)]
pub async fn update_inbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateInboundRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .services
        .movements
        .update_inbound(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::with_message(
        InboundResponse::from(record),
        "Inbound record updated",
    )))
}

/// Delete an inbound record and take its quantity back out of stock
#[utoipa::path(
    delete,
    path = "/api/v1/inbound/{id}",
    params(("id" = Uuid, Path, description = "Inbound record id")),
    responses(
        (status = 200, description = "Inbound record deleted"),
        (status = 404, description = "Inbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Inbound"
)]
pub async fn delete_inbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.movements.delete_inbound(id).await?;
    Ok(Json(ApiResponse::with_message((), "Inbound record deleted")))
}

/// Void an inbound record, keeping it for audit
#[utoipa::path(
    post,
    path = "/api/v1/inbound/{id}/void",
    params(("id" = Uuid, Path, description = "Inbound record id")),
    responses(
        (status = 200, description = "Inbound record voided", body = crate::ApiResponse<InboundResponse>),
        (status = 400, description = "Already voided", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inbound record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Inbound"
)]
pub async fn void_inbound(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.movements.void_inbound(id).await?;
    Ok(Json(ApiResponse::with_message(
        InboundResponse::from(record),
        "Inbound record voided",
    )))
}
