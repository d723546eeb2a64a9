//! Packaging option repository.

use sqlx::{PgPool, Postgres, Transaction};

use jewelbox_core::{PackagingKind, PackagingOptionId};

use super::RepositoryError;
use crate::models::{PackagingOption, PackagingOptionInput};

const DUPLICATE_OPTION: &str = "Packaging option already exists";

pub struct PackagingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PackagingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List options grouped by kind, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PackagingOption>, RepositoryError> {
        let options = sqlx::query_as::<_, PackagingOption>(
            r"
            SELECT id, kind, name, price, color_code, image_url, created_at, updated_at
            FROM shop.packaging_option
            ORDER BY kind, name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(options)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the kind and name pair exists.
    pub async fn create(
        &self,
        input: &PackagingOptionInput,
    ) -> Result<PackagingOption, RepositoryError> {
        sqlx::query_as::<_, PackagingOption>(
            r"
            INSERT INTO shop.packaging_option (kind, name, price, color_code, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, name, price, color_code, image_url, created_at, updated_at
            ",
        )
        .bind(input.kind)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.color_code.as_deref())
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::on_unique(DUPLICATE_OPTION))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the option does not exist.
    pub async fn update(
        &self,
        id: PackagingOptionId,
        input: &PackagingOptionInput,
    ) -> Result<PackagingOption, RepositoryError> {
        sqlx::query_as::<_, PackagingOption>(
            r"
            UPDATE shop.packaging_option
            SET kind = $2, name = $3, price = $4, color_code = $5, image_url = $6
            WHERE id = $1
            RETURNING id, kind, name, price, color_code, image_url, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(input.kind)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.color_code.as_deref())
        .bind(input.image_url.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::on_unique(DUPLICATE_OPTION))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Insert or update by kind and name. Used by the seed command.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(
        &self,
        input: &PackagingOptionInput,
    ) -> Result<PackagingOption, RepositoryError> {
        let option = sqlx::query_as::<_, PackagingOption>(
            r"
            INSERT INTO shop.packaging_option (kind, name, price, color_code, image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (kind, name) DO UPDATE
            SET price = EXCLUDED.price,
                color_code = EXCLUDED.color_code,
                image_url = EXCLUDED.image_url
            RETURNING id, kind, name, price, color_code, image_url, created_at, updated_at
            ",
        )
        .bind(input.kind)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.color_code.as_deref())
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(option)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the option does not exist.
    pub async fn delete(&self, id: PackagingOptionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.packaging_option WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Look up an option by kind and name inside a checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    kind: PackagingKind,
    name: &str,
) -> Result<Option<PackagingOption>, RepositoryError> {
    let option = sqlx::query_as::<_, PackagingOption>(
        r"
        SELECT id, kind, name, price, color_code, image_url, created_at, updated_at
        FROM shop.packaging_option
        WHERE kind = $1 AND name = $2
        ",
    )
    .bind(kind)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(option)
}
