use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::Link;
use crate::error::StoreError;

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Fails with `Conflict` when `link.source` already exists.
    async fn insert(&self, link: &Link) -> Result<(), StoreError>;
    async fn find(&self, source: &str) -> Result<Option<Link>, StoreError>;
}

#[derive(Clone)]
pub struct PgLinkStore {
    db: PgPool,
}

impl PgLinkStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn insert(&self, link: &Link) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO links (source, destination) VALUES ($1, $2)")
            .bind(&link.source)
            .bind(&link.destination)
            .execute(&self.db)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn find(&self, source: &str) -> Result<Option<Link>, StoreError> {
        sqlx::query_as::<_, Link>("SELECT source, destination FROM links WHERE source = $1")
            .bind(source)
            .fetch_optional(&self.db)
            .await
            .map_err(StoreError::from_sqlx)
    }
}
