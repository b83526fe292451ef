/// Product catalog endpoints
///
/// The storefront listing joins category display fields onto each row
/// and attaches classification names; the admin listing is the raw
/// table. Create and update arrive as multipart forms with an optional
/// `image` file; stored product images are persisted as fully-qualified
/// URLs.
///
/// # Endpoints
///
/// - `GET /api/products/all` - admin listing
/// - `GET /api/products?category=&classification=` - filtered storefront listing
/// - `GET /api/products/:id`
/// - `POST /api/products/add`
/// - `PUT /api/products/update/:id`
/// - `DELETE /api/products/:id`

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use pawshop_shared::models::{
    category::Category,
    product::{ListFilter, Product, ProductFields},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads::{self, FormPayload},
};

/// Optional storefront listing filters
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub classification: Option<String>,
}

/// Admin listing: every product row
pub async fn list_all_products(
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let products = Product::list_all(&state.db).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "products": products,
    })))
}

/// Filtered storefront listing, newest first
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let filter = ListFilter {
        category: params.category,
        classification: params.classification,
    };

    let products = Product::list_filtered(&state.db, &filter).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "total": products.len(),
        "products": products,
    })))
}

/// Fetch one product
///
/// # Errors
///
/// - `400 Bad Request`: id is not a positive integer
/// - `404 Not Found`: no such product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_product_id(&id)?;

    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "product": product,
    })))
}

/// Create a product, with an optional `image` file
///
/// # Errors
///
/// - `400 Bad Request`: a required field is missing or malformed, or
///   `category_id` references no existing category
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = uploads::collect_form(multipart, "image", &state.config.api.upload_dir).await?;
    let fields = parse_fields(&form)?;

    if !Category::exists(&state.db, fields.category_id).await? {
        return Err(ApiError::BadRequest("Invalid category_id".to_string()));
    }

    let image_url = form.file.as_ref().map(|f| public_image_url(&state, &f.filename));

    let product_id = Product::create(&state.db, fields, image_url).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Product added",
            "product_id": product_id,
        })),
    )
        .into_response())
}

/// Full overwrite of a product; the image is only replaced when a new
/// file is supplied, so an image can never be cleared, only swapped
///
/// # Errors
///
/// - `400 Bad Request`: invalid id, missing field, or unknown category
/// - `404 Not Found`: no row was updated
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_product_id(&id)?;

    let form = uploads::collect_form(multipart, "image", &state.config.api.upload_dir).await?;
    let fields = parse_fields(&form)?;

    if !Category::exists(&state.db, fields.category_id).await? {
        return Err(ApiError::BadRequest("Invalid category_id".to_string()));
    }

    let image_url = form.file.as_ref().map(|f| public_image_url(&state, &f.filename));

    let updated = Product::update(&state.db, id, fields, image_url).await?;
    if !updated {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Product updated",
    })))
}

/// Delete a product unconditionally
///
/// # Errors
///
/// - `400 Bad Request`: id is not a positive integer
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id = parse_product_id(&id)?;

    Product::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Product deleted",
    })))
}

/// Parses a path id, requiring a positive integer
fn parse_product_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid product ID".to_string()))
}

/// Builds the fully-qualified URL stored for a product image
fn public_image_url(state: &AppState, filename: &str) -> String {
    format!(
        "{}/uploads/{}",
        state.config.api.public_base_url.trim_end_matches('/'),
        filename
    )
}

/// Validates and parses the shared create/update field set
///
/// `name`, `price`, `stock_quantity` and `category_id` must be present
/// and non-empty; everything else defaults to an empty string.
fn parse_fields(form: &FormPayload) -> Result<ProductFields, ApiError> {
    let (name, price, stock_quantity, category_id) = match (
        form.field("name"),
        form.field("price"),
        form.field("stock_quantity"),
        form.field("category_id"),
    ) {
        (Some(name), Some(price), Some(stock), Some(category)) => {
            (name, price, stock, category)
        }
        _ => return Err(ApiError::BadRequest("Missing required fields".to_string())),
    };

    let price: Decimal = price
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid price".to_string()))?;
    let stock_quantity: i32 = stock_quantity
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid stock_quantity".to_string()))?;
    let category_id: i64 = category_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid category_id".to_string()))?;

    let optional = |key: &str| form.field(key).unwrap_or_default().to_string();

    Ok(ProductFields {
        name: name.to_string(),
        description: optional("description"),
        content: optional("content"),
        price,
        stock_quantity,
        purpose: optional("purpose"),
        category_id,
        jan_code: optional("jan_code"),
        raw_materials: optional("raw_materials"),
        country_of_origin: optional("country_of_origin"),
        package_size: optional("package_size"),
        package_weight: optional("package_weight"),
        product_size: optional("product_size"),
        product_weight: optional("product_weight"),
    })
}
