//! Category repository.

use sqlx::PgPool;

use jewelbox_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryInput};

/// Conflict message for duplicate category names.
pub const DUPLICATE_CATEGORY: &str = "Category already exists";

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, description, image, created_at, updated_at
            FROM shop.category
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, description, image, created_at, updated_at
            FROM shop.category
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, description, image)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, image, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.image.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::on_unique(DUPLICATE_CATEGORY))
    }

    /// Overwrite a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist and
    /// `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE shop.category
            SET name = $2, description = $3, image = $4
            WHERE id = $1
            RETURNING id, name, description, image, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.image.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::on_unique(DUPLICATE_CATEGORY))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            DELETE FROM shop.category
            WHERE id = $1
            RETURNING id, name, description, image, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
