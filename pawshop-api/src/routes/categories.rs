/// Category endpoints
///
/// Create and update arrive as multipart forms so an image can ride
/// along. Categories store the bare generated filename; the update only
/// touches the image column when a new file was actually uploaded.
///
/// # Endpoints
///
/// - `GET /api/category/categories`
/// - `GET /api/category/categories/:id`
/// - `POST /api/category/add`
/// - `PUT /api/category/categories/:id`
/// - `DELETE /api/category/categories/:id`

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use pawshop_shared::models::category::{Category, CreateCategory};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads,
};

/// List all categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let categories = Category::list(&state.db).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "categories": categories,
    })))
}

/// Fetch one category
///
/// # Errors
///
/// - `404 Not Found`: no such category
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "category": category,
    })))
}

/// Create a category, with an optional `category_image` file
///
/// # Errors
///
/// - `400 Bad Request`: missing name or description
pub async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form =
        uploads::collect_form(multipart, "category_image", &state.config.api.upload_dir).await?;

    let (name, description) = required_fields(&form)?;

    let category_id = Category::create(
        &state.db,
        CreateCategory {
            category_name: name.to_string(),
            category_description: description.to_string(),
            category_image_url: form.file.as_ref().map(|f| f.filename.clone()),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "category_id": category_id })),
    )
        .into_response())
}

/// Update a category; the image is only replaced when a new file is
/// supplied
///
/// # Errors
///
/// - `400 Bad Request`: missing name or description
/// - `404 Not Found`: no row was updated
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    let form =
        uploads::collect_form(multipart, "category_image", &state.config.api.upload_dir).await?;

    let (name, description) = required_fields(&form)?;

    let updated = Category::update(
        &state.db,
        id,
        name,
        description,
        form.file.as_ref().map(|f| f.filename.as_str()),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Delete a category unconditionally
///
/// `success` reports whether a row was actually removed.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Category::delete(&state.db, id).await?;

    Ok(Json(serde_json::json!({ "success": deleted })))
}

fn required_fields(form: &uploads::FormPayload) -> Result<(&str, &str), ApiError> {
    match (form.field("category_name"), form.field("category_description")) {
        (Some(name), Some(description)) => Ok((name, description)),
        _ => Err(ApiError::BadRequest(
            "category_name and category_description are required".to_string(),
        )),
    }
}
