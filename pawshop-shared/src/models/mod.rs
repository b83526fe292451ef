/// Database models for pawshop
///
/// This module contains all database models and their query methods. The
/// services hold no in-memory authoritative state; every read re-fetches
/// from storage through these types.
///
/// # Models
///
/// - `user`: customer and admin accounts
/// - `category`: product categories
/// - `product`: the catalog, including classification facets
/// - `cart_item`: per-user cart lines
/// - `payment`: payments and their order lines
/// - `reset_token`: stored password-reset token digests

pub mod cart_item;
pub mod category;
pub mod payment;
pub mod product;
pub mod reset_token;
pub mod user;
