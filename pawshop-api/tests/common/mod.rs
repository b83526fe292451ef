/// Common test utilities for integration tests
///
/// These tests need a running PostgreSQL instance reachable via
/// `DATABASE_URL`; every test that touches the database is marked
/// `#[ignore]` so the default `cargo test` run stays green without one.
///
/// Provides:
/// - Test database setup (migrations run on first connect)
/// - Test user creation with a session cookie
/// - An app router wired to the test database

use axum::Router;
use sqlx::PgPool;

use pawshop_api::app::{build_router, AppState};
use pawshop_api::config::{
    ApiConfig, AuthConfig, Config, DatabaseConfig, EmailConfig, GatewayConfig,
};
use pawshop_api::email::EmailService;
use pawshop_api::gateway::PaymentGateway;
use pawshop_shared::auth::password::hash_password;
use pawshop_shared::auth::session::{create_session_token, SessionClaims, SESSION_COOKIE};
use pawshop_shared::models::user::{CreateUser, User, UserRole};

pub const SESSION_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const GATEWAY_SECRET: &str = "gateway_test_secret";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub user: User,
    pub session_cookie: String,
}

/// Builds a config pointing at the test database
///
/// The SMTP transport is lazy and the gateway URL unreachable; tests
/// never send real mail or gateway requests.
pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            public_base_url: "http://localhost:9292".to_string(),
            client_url: "http://localhost:3000".to_string(),
            upload_dir: std::env::temp_dir()
                .join("pawshop-test-uploads")
                .to_string_lossy()
                .into_owned(),
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        auth: AuthConfig {
            session_secret: SESSION_SECRET.to_string(),
            admin_signup_secret: "test-admin-secret".to_string(),
        },
        gateway: GatewayConfig {
            url: "http://127.0.0.1:1".to_string(),
            key_id: "test_key".to_string(),
            key_secret: GATEWAY_SECRET.to_string(),
        },
        email: EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            from_address: "shop@example.com".to_string(),
        },
    }
}

impl TestContext {
    /// Creates a new test context with a fresh user and session
    pub async fn new() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set for integration tests"))?;

        let db = PgPool::connect(&database_url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../pawshop-shared/migrations").run(&db).await?;

        let config = test_config(&database_url);

        let user = User::create(
            &db,
            CreateUser {
                username: "test-user".to_string(),
                email: unique_email(),
                password_hash: hash_password(TEST_PASSWORD)?,
                role: UserRole::User,
            },
        )
        .await?;

        let claims = SessionClaims::for_user(&user);
        let token = create_session_token(&claims, SESSION_SECRET)?;
        let session_cookie = format!("{}={}", SESSION_COOKIE, token);

        let mailer = EmailService::new(&config.email, &config.api)?;
        let gateway = PaymentGateway::new(&config.gateway);
        let state = AppState::new(db.clone(), config, mailer, gateway);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            user,
            session_cookie,
        })
    }

    /// Cleans up rows created for this context's user
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(self.user.user_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM payments WHERE user_id = $1")
            .bind(self.user.user_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(self.user.user_id)
            .execute(&self.db)
            .await?;
        User::delete(&self.db, self.user.user_id).await?;
        Ok(())
    }
}

/// A collision-free email for test accounts
pub fn unique_email() -> String {
    format!("test-{:016x}@example.com", rand::random::<u64>())
}

/// Seeds a category and a product, returning (category_id, product_id)
pub async fn seed_product(db: &PgPool, price: &str) -> anyhow::Result<(i64, i64)> {
    use pawshop_shared::models::category::{Category, CreateCategory};
    use pawshop_shared::models::product::{Product, ProductFields};

    let category_id = Category::create(
        db,
        CreateCategory {
            category_name: format!("Test Category {:08x}", rand::random::<u32>()),
            category_description: "Created by integration tests".to_string(),
            category_image_url: None,
        },
    )
    .await?;

    let product_id = Product::create(
        db,
        ProductFields {
            name: "Test Product".to_string(),
            price: price.parse()?,
            stock_quantity: 100,
            category_id,
            ..Default::default()
        },
        None,
    )
    .await?;

    Ok((category_id, product_id))
}
