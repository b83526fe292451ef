/// Product category model
///
/// Categories store a bare image filename (the frontend prefixes its own
/// static host), unlike products which store a fully-qualified URL.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE product_categories (
///     category_id BIGSERIAL PRIMARY KEY,
///     category_name VARCHAR(100) NOT NULL,
///     category_description TEXT NOT NULL,
///     category_image_url VARCHAR(512),
///     background_color VARCHAR(32),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One category row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    pub category_description: String,

    /// Bare stored filename, when an image has been uploaded
    pub category_image_url: Option<String>,

    /// Optional display color used by the storefront
    pub background_color: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub category_name: String,
    pub category_description: String,
    pub category_image_url: Option<String>,
}

impl Category {
    /// Inserts a category, returning its new id
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO product_categories (category_name, category_description, category_image_url)
            VALUES ($1, $2, $3)
            RETURNING category_id
            "#,
        )
        .bind(data.category_name)
        .bind(data.category_description)
        .bind(data.category_image_url)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Finds a category by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT category_id, category_name, category_description, category_image_url, background_color, created_at
             FROM product_categories WHERE category_id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Checks that a category id references an existing row
    ///
    /// Products are validated against this at write time; there is no
    /// foreign key on purpose.
    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1::BIGINT FROM product_categories WHERE category_id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(row.is_some())
    }

    /// Lists all categories
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT category_id, category_name, category_description, category_image_url, background_color, created_at
             FROM product_categories ORDER BY category_id",
        )
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Updates name and description, and the image only when one is
    /// supplied
    ///
    /// Returns false when no row was affected.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        name: &str,
        description: &str,
        image: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = match image {
            Some(filename) => {
                sqlx::query(
                    "UPDATE product_categories
                     SET category_name = $1, category_description = $2, category_image_url = $3
                     WHERE category_id = $4",
                )
                .bind(name)
                .bind(description)
                .bind(filename)
                .bind(id)
                .execute(pool)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE product_categories
                     SET category_name = $1, category_description = $2
                     WHERE category_id = $3",
                )
                .bind(name)
                .bind(description)
                .bind(id)
                .execute(pool)
                .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a category unconditionally
    ///
    /// Products pointing at the deleted id are left dangling; listings
    /// that inner-join the category simply stop showing them.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_categories WHERE category_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all categories
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product_categories")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_struct() {
        let create = CreateCategory {
            category_name: "Dog Food".to_string(),
            category_description: "Dry and wet food".to_string(),
            category_image_url: None,
        };

        assert_eq!(create.category_name, "Dog Food");
        assert!(create.category_image_url.is_none());
    }
}
