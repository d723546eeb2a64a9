//! Marquee settings repository (single-row table).

use sqlx::PgPool;

use jewelbox_core::marquee::MarqueeSettings;

use super::RepositoryError;
use crate::models::Marquee;

pub struct MarqueeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MarqueeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Return the banner, inserting the defaults on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self) -> Result<Marquee, RepositoryError> {
        let defaults = MarqueeSettings::default();

        // The SELECT branch does not see the row inserted by the CTE, so
        // exactly one branch yields a row.
        let marquee = sqlx::query_as::<_, Marquee>(
            r"
            WITH inserted AS (
                INSERT INTO shop.marquee (id, text, is_active, bg_color, text_color)
                VALUES (1, $1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                RETURNING text, is_active, bg_color, text_color, updated_at
            )
            SELECT text, is_active, bg_color, text_color, updated_at FROM inserted
            UNION ALL
            SELECT text, is_active, bg_color, text_color, updated_at
            FROM shop.marquee WHERE id = 1
            LIMIT 1
            ",
        )
        .bind(&defaults.text)
        .bind(defaults.is_active)
        .bind(&defaults.bg_color)
        .bind(&defaults.text_color)
        .fetch_optional(self.pool)
        .await?;

        if let Some(marquee) = marquee {
            return Ok(marquee);
        }

        // A concurrent first access inserted the row after our snapshot
        let marquee = sqlx::query_as::<_, Marquee>(
            "SELECT text, is_active, bg_color, text_color, updated_at FROM shop.marquee WHERE id = 1",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(marquee)
    }

    /// Store `settings`, creating the row if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save(&self, settings: &MarqueeSettings) -> Result<Marquee, RepositoryError> {
        let marquee = sqlx::query_as::<_, Marquee>(
            r"
            INSERT INTO shop.marquee (id, text, is_active, bg_color, text_color)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET text = EXCLUDED.text,
                is_active = EXCLUDED.is_active,
                bg_color = EXCLUDED.bg_color,
                text_color = EXCLUDED.text_color
            RETURNING text, is_active, bg_color, text_color, updated_at
            ",
        )
        .bind(&settings.text)
        .bind(settings.is_active)
        .bind(&settings.bg_color)
        .bind(&settings.text_color)
        .fetch_one(self.pool)
        .await?;
        Ok(marquee)
    }
}
