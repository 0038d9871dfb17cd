use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductListQuery, ProductResponse, UpdateProductRequest},
    errors::ServiceError,
    handlers::common::{page_request, AppPath, AppQuery, PaginatedResponse, ValidatedJson},
    ApiResponse, AppState,
};

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/categories", get(list_categories))
        .route("/brands", get(list_brands))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List products with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products listed", body = PaginatedResponse<ProductResponse>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = page_request(query.page, query.limit, &state.config)?;
    let products = state
        .services
        .products
        .list_products(query.filter(), page)
        .await?;
    Ok(Json(PaginatedResponse::<ProductResponse>::from_page(products)))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = crate::ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get_product(id).await?;
    Ok(Json(ApiResponse::success(ProductResponse::from(product))))
}

/// Create a new product; stock starts at zero
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload or duplicate name and brand", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .create_product(payload.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            ProductResponse::from(product),
            "Product created",
        )),
    ))
}

/// Update product master data
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .update_product(id, payload.into())
        .await?;
    Ok(Json(ApiResponse::with_message(
        ProductResponse::from(product),
        "Product updated",
    )))
}

/// Delete a product with no stock movements
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product has stock movements", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete_product(id).await?;
    Ok(Json(ApiResponse::with_message((), "Product deleted")))
}

/// Distinct product categories
#[utoipa::path(
    get,
    path = "/api/v1/products/categories",
    responses((status = 200, description = "Categories", body = crate::ApiResponse<Vec<String>>)),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.products.categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Distinct product brands
#[utoipa::path(
    get,
    path = "/api/v1/products/brands",
    responses((status = 200, description = "Brands", body = crate::ApiResponse<Vec<String>>)),
    tag = "Products"
)]
pub async fn list_brands(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let brands = state.services.products.brands().await?;
    Ok(Json(ApiResponse::success(brands)))
}
