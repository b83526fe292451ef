/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: signup, login, logout, session introspection
/// - `password_reset`: reset request and reset endpoints
/// - `categories`: category CRUD
/// - `products`: product catalog
/// - `cart`: per-user cart lines
/// - `orders`: checkout
/// - `payments`: gateway order creation and verification
/// - `customers`: customer administration
/// - `dashboard`: aggregate counts

pub mod auth;
pub mod cart;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod password_reset;
pub mod payments;
pub mod products;
