/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use pawshop_api::{app::{build_router, AppState}, config::Config};
/// use pawshop_api::{email::EmailService, gateway::PaymentGateway};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = EmailService::new(&config.email, &config.api)?;
/// let gateway = PaymentGateway::new(&config.gateway);
/// let state = AppState::new(pool, config, mailer, gateway);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, email::EmailService, gateway::PaymentGateway, middleware, routes};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound mail transport
    pub mailer: EmailService,

    /// Payment gateway client
    pub gateway: PaymentGateway,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: EmailService, gateway: PaymentGateway) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
            gateway,
        }
    }

    /// Gets the session-signing secret
    pub fn session_secret(&self) -> &str {
        &self.config.auth.session_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /uploads/*                     # Stored images (static)
/// └── /api/
///     ├── /auth/                     # signup, login, logout, me
///     ├── /admin/auth/signup         # admin signup (secret-gated)
///     ├── /request-reset             # password reset flow
///     ├── /reset-password
///     ├── /category/                 # category CRUD
///     ├── /products/                 # product catalog
///     ├── /cart/                     # cart (session required)
///     ├── /order/place-order         # checkout
///     ├── /payment/                  # gateway order + verification
///     ├── /customer/                 # customer administration
///     └── /dashboard/counts          # aggregate counts
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer, credentials enabled for the cookie)
/// 3. Session gating on the cart router only
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // User and admin signup live on distinct paths so neither handler
    // can shadow the other.
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me));

    let admin_auth_routes = Router::new().route("/signup", post(routes::auth::admin_signup));

    let reset_routes = Router::new()
        .route("/request-reset", post(routes::password_reset::request_reset))
        .route("/reset-password", post(routes::password_reset::reset_password));

    let category_routes = Router::new()
        .route("/categories", get(routes::categories::list_categories))
        .route("/categories/:id", get(routes::categories::get_category))
        .route("/add", post(routes::categories::create_category))
        .route("/categories/:id", put(routes::categories::update_category))
        .route("/categories/:id", delete(routes::categories::delete_category));

    let product_routes = Router::new()
        .route("/all", get(routes::products::list_all_products))
        .route("/", get(routes::products::list_products))
        .route("/:id", get(routes::products::get_product))
        .route("/add", post(routes::products::create_product))
        .route("/update/:id", put(routes::products::update_product))
        .route("/:id", delete(routes::products::delete_product));

    // Cart requires an authenticated session; the gate answers 403.
    let cart_routes = Router::new()
        .route("/", post(routes::cart::add_item))
        .route("/", put(routes::cart::set_item))
        .route("/", delete(routes::cart::remove_item))
        .route("/all", delete(routes::cart::clear_cart))
        .route("/", get(routes::cart::list_cart))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::require_session,
        ));

    let order_routes = Router::new().route("/place-order", post(routes::orders::place_order));

    let payment_routes = Router::new()
        .route("/create-order", post(routes::payments::create_order))
        .route("/verify", post(routes::payments::verify_payment));

    let customer_routes = Router::new()
        .route("/all", get(routes::customers::list_customers))
        .route("/:id", get(routes::customers::get_customer))
        .route("/add", post(routes::customers::add_customer))
        .route("/update/:id", put(routes::customers::update_customer))
        .route("/delete/:id", delete(routes::customers::delete_customer));

    let dashboard_routes = Router::new().route("/counts", get(routes::dashboard::get_counts));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin/auth", admin_auth_routes)
        .merge(reset_routes)
        .nest("/category", category_routes)
        .nest("/products", product_routes)
        .nest("/cart", cart_routes)
        .nest("/order", order_routes)
        .nest("/payment", payment_routes)
        .nest("/customer", customer_routes)
        .nest("/dashboard", dashboard_routes);

    // Permissive CORS in development; explicit origins with credentials
    // in production so the session cookie is accepted cross-origin.
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.api.upload_dir))
        // Multipart image uploads may exceed axum's 2 MB default; the
        // 5 MiB per-image cap is enforced in the upload handler.
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
