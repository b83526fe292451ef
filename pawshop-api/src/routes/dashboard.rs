/// Dashboard endpoint
///
/// Three independent aggregate counts. Each count is its own
/// point-in-time read; there is no consistency guarantee between them.
///
/// # Endpoint
///
/// ```text
/// GET /api/dashboard/counts
/// ```
///
/// # Response
///
/// A bare object, no `success` wrapper:
///
/// ```json
/// { "products": 120, "categories": 8, "customers": 340 }
/// ```

use axum::{extract::State, Json};
use serde::Serialize;

use pawshop_shared::models::{
    category::Category,
    product::Product,
    user::{User, UserRole},
};

use crate::{app::AppState, error::ApiResult};

/// Dashboard counts response
#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub products: i64,
    pub categories: i64,

    /// Users with the `user` role; admins are not customers
    pub customers: i64,
}

/// Aggregate counts for the admin dashboard
pub async fn get_counts(State(state): State<AppState>) -> ApiResult<Json<CountsResponse>> {
    let products = Product::count(&state.db).await?;
    let categories = Category::count(&state.db).await?;
    let customers = User::count_by_role(&state.db, UserRole::User).await?;

    Ok(Json(CountsResponse {
        products,
        categories,
        customers,
    }))
}
