//! Read-through cache over the catalog tables.
//!
//! Public pages and API reads go through [`CatalogService`]; admin mutations
//! write through the repositories and then call [`CatalogService::invalidate_all`].
//! Keyword searches bypass the cache.
//!
//! Entries are keyed by a generation number that `invalidate_all` bumps. A
//! read that started before a write stores its result under the old
//! generation, where no later read looks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use jewelbox_core::ProductId;

use crate::db::{
    CategoryRepository, HeroRepository, MarqueeRepository, PackagingRepository, ProductFilter,
    ProductRepository, RepositoryError,
};
use crate::models::{Category, HeroSlide, Marquee, PackagingOption, Product};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Products(ProductFilter),
    Categories,
    HeroSlides { active_only: bool },
    Marquee,
    Packaging,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct VersionedKey {
    generation: u64,
    key: CacheKey,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Product(Option<Box<Product>>),
    Products(Arc<[Product]>),
    Categories(Arc<[Category]>),
    HeroSlides(Arc<[HeroSlide]>),
    Marquee(Box<Marquee>),
    Packaging(Arc<[PackagingOption]>),
}

/// Cached catalog reads.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<VersionedKey, CacheValue>,
    generation: AtomicU64,
}

impl CatalogService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                pool,
                cache,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Key `key` under the current generation. Take it before querying.
    fn versioned(&self, key: CacheKey) -> VersionedKey {
        VersionedKey {
            generation: self.inner.generation.load(Ordering::Acquire),
            key,
        }
    }

    async fn cached(&self, key: &VersionedKey) -> Option<CacheValue> {
        let value = self.inner.cache.get(key).await;
        if value.is_some() {
            debug!(?key, "Catalog cache hit");
        }
        value
    }

    async fn store(&self, key: VersionedKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let cacheable = filter.keyword.is_none();
        let key = self.versioned(CacheKey::Products(filter.clone()));

        if cacheable && let Some(CacheValue::Products(products)) = self.cached(&key).await {
            return Ok(products.to_vec());
        }

        let products = ProductRepository::new(&self.inner.pool).list(filter).await?;

        if cacheable {
            self.store(key, CacheValue::Products(products.clone().into()))
                .await;
        }
        Ok(products)
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let key = self.versioned(CacheKey::Product(id));
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(product.map(|p| *p));
        }

        let product = ProductRepository::new(&self.inner.pool).get(id).await?;
        self.store(key, CacheValue::Product(product.clone().map(Box::new)))
            .await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let key = self.versioned(CacheKey::Categories);
        if let Some(CacheValue::Categories(categories)) = self.cached(&key).await {
            return Ok(categories.to_vec());
        }

        let categories = CategoryRepository::new(&self.inner.pool).list().await?;
        self.store(key, CacheValue::Categories(categories.clone().into()))
            .await;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn hero_slides(&self, active_only: bool) -> Result<Vec<HeroSlide>, RepositoryError> {
        let key = self.versioned(CacheKey::HeroSlides { active_only });
        if let Some(CacheValue::HeroSlides(slides)) = self.cached(&key).await {
            return Ok(slides.to_vec());
        }

        let slides = HeroRepository::new(&self.inner.pool).list(active_only).await?;
        self.store(key, CacheValue::HeroSlides(slides.clone().into()))
            .await;
        Ok(slides)
    }

    /// The marquee banner, created with defaults on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn marquee(&self) -> Result<Marquee, RepositoryError> {
        let key = self.versioned(CacheKey::Marquee);
        if let Some(CacheValue::Marquee(marquee)) = self.cached(&key).await {
            return Ok(*marquee);
        }

        let marquee = MarqueeRepository::new(&self.inner.pool)
            .get_or_create()
            .await?;
        self.store(key, CacheValue::Marquee(Box::new(marquee.clone())))
            .await;
        Ok(marquee)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn packaging_options(&self) -> Result<Vec<PackagingOption>, RepositoryError> {
        let key = self.versioned(CacheKey::Packaging);
        if let Some(CacheValue::Packaging(options)) = self.cached(&key).await {
            return Ok(options.to_vec());
        }

        let options = PackagingRepository::new(&self.inner.pool).list().await?;
        self.store(key, CacheValue::Packaging(options.clone().into()))
            .await;
        Ok(options)
    }

    /// Drop every cached entry. Called after any catalog write.
    pub async fn invalidate_all(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn service() -> CatalogService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://jewelbox@127.0.0.1:1/jewelbox")
            .unwrap();
        CatalogService::new(pool)
    }

    fn categories() -> CacheValue {
        CacheValue::Categories(Vec::new().into())
    }

    #[tokio::test]
    async fn test_entries_hit_until_invalidated() {
        let catalog = service();
        let key = catalog.versioned(CacheKey::Categories);
        catalog.store(key.clone(), categories()).await;
        assert!(catalog.cached(&key).await.is_some());

        catalog.invalidate_all().await;
        let fresh = catalog.versioned(CacheKey::Categories);
        assert!(catalog.cached(&fresh).await.is_none());
    }

    #[tokio::test]
    async fn test_read_racing_a_write_cannot_restore_stale_data() {
        let catalog = service();
        // A read takes its key, then a write lands before the read stores.
        let racing = catalog.versioned(CacheKey::Categories);
        catalog.invalidate_all().await;
        catalog.store(racing, categories()).await;

        let next = catalog.versioned(CacheKey::Categories);
        assert!(catalog.cached(&next).await.is_none());
    }
}
