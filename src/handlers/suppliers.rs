use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    dto::suppliers::{
        CreateSupplierRequest, SupplierListQuery, SupplierResponse, UpdateSupplierRequest,
    },
    errors::ServiceError,
    handlers::common::{page_request, AppPath, AppQuery, PaginatedResponse, ValidatedJson},
    ApiResponse, AppState,
};

pub fn suppliers_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
}

/// List suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    params(SupplierListQuery),
    responses(
        (status = 200, description = "Suppliers listed", body = PaginatedResponse<SupplierResponse>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SupplierListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(query.page, query.limit, &state.config)?;
    let suppliers = state
        .services
        .suppliers
        .list_suppliers(query.filter(), page)
        .await?;
    Ok(Json(PaginatedResponse::<SupplierResponse>::from_page(
        suppliers,
    )))
}

/// Get a supplier by id
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier found", body = crate::ApiResponse<SupplierResponse>),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.suppliers.get_supplier(id).await?;
    Ok(Json(ApiResponse::success(SupplierResponse::from(supplier))))
}

/// Register a supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = crate::ApiResponse<SupplierResponse>),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state
        .services
        .suppliers
        .create_supplier(payload.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            SupplierResponse::from(supplier),
            "Supplier created",
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = crate::ApiResponse<SupplierResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state
        .services
        .suppliers
        .update_supplier(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::with_message(
        SupplierResponse::from(supplier),
        "Supplier updated",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Supplier has inbound records", body = crate::errors::ErrorResponse)
    ),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete_supplier(id).await?;
    Ok(Json(ApiResponse::with_message((), "Supplier deleted")))
}
