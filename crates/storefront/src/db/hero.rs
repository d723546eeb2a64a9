//! Hero slide repository.

use sqlx::PgPool;

use jewelbox_core::HeroSlideId;

use super::RepositoryError;
use crate::models::{HeroSlide, HeroSlideInput};

pub struct HeroRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HeroRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List slides, oldest first. With `active_only`, inactive slides are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<HeroSlide>, RepositoryError> {
        let slides = sqlx::query_as::<_, HeroSlide>(
            r"
            SELECT id, image, heading, sub_heading, description, product_code,
                   is_active, variant, product_id, created_at, updated_at
            FROM shop.hero_slide
            WHERE (NOT $1 OR is_active)
            ORDER BY created_at, id
            ",
        )
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(slides)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: HeroSlideId) -> Result<Option<HeroSlide>, RepositoryError> {
        let slide = sqlx::query_as::<_, HeroSlide>(
            r"
            SELECT id, image, heading, sub_heading, description, product_code,
                   is_active, variant, product_id, created_at, updated_at
            FROM shop.hero_slide
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(slide)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// product reference that does not exist).
    pub async fn create(&self, input: &HeroSlideInput) -> Result<HeroSlide, RepositoryError> {
        let slide = sqlx::query_as::<_, HeroSlide>(
            r"
            INSERT INTO shop.hero_slide
                (image, heading, sub_heading, description, product_code,
                 is_active, variant, product_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, image, heading, sub_heading, description, product_code,
                      is_active, variant, product_id, created_at, updated_at
            ",
        )
        .bind(&input.image)
        .bind(&input.heading)
        .bind(&input.sub_heading)
        .bind(&input.description)
        .bind(&input.product_code)
        .bind(input.is_active)
        .bind(input.variant)
        .bind(input.product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(slide)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn update(
        &self,
        id: HeroSlideId,
        input: &HeroSlideInput,
    ) -> Result<HeroSlide, RepositoryError> {
        sqlx::query_as::<_, HeroSlide>(
            r"
            UPDATE shop.hero_slide
            SET image = $2, heading = $3, sub_heading = $4, description = $5,
                product_code = $6, is_active = $7, variant = $8, product_id = $9
            WHERE id = $1
            RETURNING id, image, heading, sub_heading, description, product_code,
                      is_active, variant, product_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&input.image)
        .bind(&input.heading)
        .bind(&input.sub_heading)
        .bind(&input.description)
        .bind(&input.product_code)
        .bind(input.is_active)
        .bind(input.variant)
        .bind(input.product_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn delete(&self, id: HeroSlideId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.hero_slide WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
