/// Product model and catalog queries
///
/// Products belong to exactly one category (checked at write time, not by
/// a foreign key) and carry zero or more classification facets through
/// the `product_classification` join table.
///
/// The filtered listing is deliberately two queries: the join query would
/// duplicate a product once per matching classification, so it selects
/// DISTINCT product rows first, then a second batch query attaches the
/// full classification-name list per product id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     product_id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     content TEXT NOT NULL DEFAULT '',
///     price NUMERIC(10, 2) NOT NULL,
///     stock_quantity INTEGER NOT NULL,
///     purpose VARCHAR(255) NOT NULL DEFAULT '',
///     category_id BIGINT NOT NULL,
///     image_url VARCHAR(512),
///     jan_code VARCHAR(64) NOT NULL DEFAULT '',
///     raw_materials TEXT NOT NULL DEFAULT '',
///     country_of_origin VARCHAR(100) NOT NULL DEFAULT '',
///     package_size VARCHAR(100) NOT NULL DEFAULT '',
///     package_weight VARCHAR(100) NOT NULL DEFAULT '',
///     product_size VARCHAR(100) NOT NULL DEFAULT '',
///     product_weight VARCHAR(100) NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One product row, as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub description: String,
    pub content: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub purpose: String,
    pub category_id: i64,

    /// Fully-qualified image URL; once set it can only be replaced,
    /// never cleared
    pub image_url: Option<String>,

    pub jan_code: String,
    pub raw_materials: String,
    pub country_of_origin: String,
    pub package_size: String,
    pub package_weight: String,
    pub product_size: String,
    pub product_weight: String,
    pub created_at: DateTime<Utc>,
}

/// Field set shared by create and update
///
/// Update is a full overwrite of these columns; only the image is
/// conditional.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub content: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub purpose: String,
    pub category_id: i64,
    pub jan_code: String,
    pub raw_materials: String,
    pub country_of_origin: String,
    pub package_size: String,
    pub package_weight: String,
    pub product_size: String,
    pub product_weight: String,
}

/// Optional name filters for the storefront listing
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Equality filter on the category name
    pub category: Option<String>,

    /// Equality filter on a classification name
    pub classification: Option<String>,
}

/// One row of the filtered storefront listing
///
/// Carries the category display fields the storefront renders alongside
/// each product, plus the attached classification names (empty when the
/// product has none).
#[derive(Debug, Clone, Serialize)]
pub struct ProductListItem {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub content: String,
    pub image_url: Option<String>,
    pub background_color: Option<String>,
    pub category_description: String,
    pub category_image_url: Option<String>,
    pub classifications: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ListRow {
    product_id: i64,
    name: String,
    price: Decimal,
    stock_quantity: i32,
    created_at: DateTime<Utc>,
    description: String,
    content: String,
    image_url: Option<String>,
    background_color: Option<String>,
    category_description: String,
    category_image_url: Option<String>,
}

const PRODUCT_COLUMNS: &str = "product_id, name, description, content, price, stock_quantity, \
     purpose, category_id, image_url, jan_code, raw_materials, country_of_origin, \
     package_size, package_weight, product_size, product_weight, created_at";

impl Product {
    /// Inserts a product, returning its new id
    ///
    /// The caller is responsible for validating `category_id` against
    /// `Category::exists` first.
    pub async fn create(
        pool: &PgPool,
        fields: ProductFields,
        image_url: Option<String>,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO products
                (name, description, content, price, stock_quantity,
                 purpose, category_id, image_url, jan_code,
                 raw_materials, country_of_origin,
                 package_size, package_weight,
                 product_size, product_weight)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING product_id
            "#,
        )
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.content)
        .bind(fields.price)
        .bind(fields.stock_quantity)
        .bind(fields.purpose)
        .bind(fields.category_id)
        .bind(image_url)
        .bind(fields.jan_code)
        .bind(fields.raw_materials)
        .bind(fields.country_of_origin)
        .bind(fields.package_size)
        .bind(fields.package_weight)
        .bind(fields.product_size)
        .bind(fields.product_weight)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Finds a product by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(product)
    }

    /// Lists every product row (admin panel view)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id"
        ))
        .fetch_all(pool)
        .await?;

        Ok(products)
    }

    /// Filtered storefront listing, newest first
    ///
    /// Inner-joins the category (a product with a dangling category id is
    /// not listed), left-joins classifications for the optional filter,
    /// then batch-attaches the classification names per product.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &ListFilter,
    ) -> Result<Vec<ProductListItem>, sqlx::Error> {
        let mut query = String::from(
            r#"
            SELECT DISTINCT
                p.product_id, p.name, p.price, p.stock_quantity, p.created_at,
                p.description, p.content, p.image_url,
                cat.background_color,
                cat.category_description,
                cat.category_image_url
            FROM products p
            INNER JOIN product_categories cat ON p.category_id = cat.category_id
            LEFT JOIN product_classification pc ON p.product_id = pc.product_id
            LEFT JOIN classification c ON pc.classification_id = c.classification_id
            WHERE 1=1
            "#,
        );

        let mut bind_count = 0;

        if filter.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND cat.category_name = ${}", bind_count));
        }
        if filter.classification.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND c.classification_name = ${}", bind_count));
        }

        query.push_str(" ORDER BY p.created_at DESC");

        let mut q = sqlx::query_as::<_, ListRow>(&query);

        if let Some(ref category) = filter.category {
            q = q.bind(category);
        }
        if let Some(ref classification) = filter.classification {
            q = q.bind(classification);
        }

        let rows = q.fetch_all(pool).await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.product_id).collect();
        let mut names = Self::classification_names(pool, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductListItem {
                classifications: names.remove(&r.product_id).unwrap_or_default(),
                product_id: r.product_id,
                name: r.name,
                price: r.price,
                stock_quantity: r.stock_quantity,
                created_at: r.created_at,
                description: r.description,
                content: r.content,
                image_url: r.image_url,
                background_color: r.background_color,
                category_description: r.category_description,
                category_image_url: r.category_image_url,
            })
            .collect())
    }

    /// Classification names per product id, for a batch of products
    async fn classification_names(
        pool: &PgPool,
        product_ids: &[i64],
    ) -> Result<std::collections::HashMap<i64, Vec<String>>, sqlx::Error> {
        let mut map: std::collections::HashMap<i64, Vec<String>> = std::collections::HashMap::new();

        if product_ids.is_empty() {
            return Ok(map);
        }

        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT pc.product_id, c.classification_name
            FROM product_classification pc
            JOIN classification c ON pc.classification_id = c.classification_id
            WHERE pc.product_id = ANY($1)
            "#,
        )
        .bind(product_ids)
        .fetch_all(pool)
        .await?;

        for (product_id, name) in rows {
            map.entry(product_id).or_default().push(name);
        }

        Ok(map)
    }

    /// Full overwrite of all columns except the image, which is only
    /// replaced when a new one is supplied
    ///
    /// Returns false when no row was affected.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        fields: ProductFields,
        image_url: Option<String>,
    ) -> Result<bool, sqlx::Error> {
        let mut query = String::from(
            "UPDATE products SET
                name = $1, description = $2, content = $3, price = $4, stock_quantity = $5,
                purpose = $6, category_id = $7, jan_code = $8, raw_materials = $9,
                country_of_origin = $10, package_size = $11, package_weight = $12,
                product_size = $13, product_weight = $14",
        );

        if image_url.is_some() {
            query.push_str(", image_url = $16");
        }
        query.push_str(" WHERE product_id = $15");

        let mut q = sqlx::query(&query)
            .bind(fields.name)
            .bind(fields.description)
            .bind(fields.content)
            .bind(fields.price)
            .bind(fields.stock_quantity)
            .bind(fields.purpose)
            .bind(fields.category_id)
            .bind(fields.jan_code)
            .bind(fields.raw_materials)
            .bind(fields.country_of_origin)
            .bind(fields.package_size)
            .bind(fields.package_weight)
            .bind(fields.product_size)
            .bind(fields.product_weight)
            .bind(id);

        if let Some(url) = image_url {
            q = q.bind(url);
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a product unconditionally
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Current catalog price for a product
    ///
    /// Order placement snapshots this server-side price rather than
    /// trusting amounts from the request payload.
    pub async fn price_of(pool: &PgPool, id: i64) -> Result<Option<Decimal>, sqlx::Error> {
        let row: Option<(Decimal,)> =
            sqlx::query_as("SELECT price FROM products WHERE product_id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(price,)| price))
    }

    /// Counts all products
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filter_default_is_unfiltered() {
        let filter = ListFilter::default();
        assert!(filter.category.is_none());
        assert!(filter.classification.is_none());
    }

    #[test]
    fn test_product_fields_default() {
        let fields = ProductFields::default();
        assert!(fields.name.is_empty());
        assert_eq!(fields.price, Decimal::ZERO);
        assert_eq!(fields.category_id, 0);
    }

    #[test]
    fn test_list_item_serializes_empty_classifications() {
        let item = ProductListItem {
            product_id: 1,
            name: "Chew Toy".to_string(),
            price: Decimal::new(999, 2),
            stock_quantity: 3,
            created_at: Utc::now(),
            description: String::new(),
            content: String::new(),
            image_url: None,
            background_color: None,
            category_description: "Toys".to_string(),
            category_image_url: None,
            classifications: Vec::new(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["classifications"], serde_json::json!([]));
        assert_eq!(json["price"], serde_json::json!("9.99"));
    }
}
