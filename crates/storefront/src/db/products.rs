//! Product repository.

use sqlx::PgPool;

use jewelbox_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductInput};

/// Listing filters. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub keyword: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    pub featured_only: bool,
    pub limit: Option<i64>,
}

impl ProductFilter {
    /// Build a filter from raw query-string values, treating blanks as absent.
    #[must_use]
    pub fn from_query(keyword: Option<&str>, category: Option<&str>) -> Self {
        Self {
            keyword: non_blank(keyword),
            category: non_blank(category),
            ..Self::default()
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Escape `%`, `_` and `\` so a keyword matches literally inside `ILIKE`.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let pattern = filter
            .keyword
            .as_deref()
            .map(|k| format!("%{}%", escape_like(k)));

        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, discount_price, stock, images,
                   category, featured, packaging_eligible, created_at, updated_at
            FROM shop.product
            WHERE ($1::text IS NULL OR name ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
              AND (NOT $3 OR featured)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            ",
        )
        .bind(pattern)
        .bind(filter.category.as_deref())
        .bind(filter.featured_only)
        .bind(filter.limit)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, discount_price, stock, images,
                   category, featured, packaging_eligible, created_at, updated_at
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO shop.product
                (name, description, price, discount_price, stock, images,
                 category, featured, packaging_eligible)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, description, price, discount_price, stock, images,
                      category, featured, packaging_eligible, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.discount_price)
        .bind(input.stock.unwrap_or(0))
        .bind(&input.images)
        .bind(&input.category)
        .bind(input.featured)
        .bind(input.packaging_eligible)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Overwrite the editable fields of a product. Stock is only written
    /// when `input.stock` is set, so concurrent checkout decrements survive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, discount_price = $5,
                stock = COALESCE($6, stock), images = $7, category = $8, featured = $9,
                packaging_eligible = $10
            WHERE id = $1
            RETURNING id, name, description, price, discount_price, stock, images,
                      category, featured, packaging_eligible, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.discount_price)
        .bind(input.stock)
        .bind(&input.images)
        .bind(&input.category)
        .bind(input.featured)
        .bind(input.packaging_eligible)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product, returning the removed row so its images can be
    /// cleaned up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            DELETE FROM shop.product
            WHERE id = $1
            RETURNING id, name, description, price, discount_price, stock, images,
                      category, featured, packaging_eligible, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ring"), "ring");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_filter_from_query_drops_blanks() {
        let filter = ProductFilter::from_query(Some("  "), Some(" Rings "));
        assert_eq!(filter.keyword, None);
        assert_eq!(filter.category.as_deref(), Some("Rings"));
        assert!(!filter.featured_only);
    }
}
