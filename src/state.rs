use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::{jwt::JwtKeys, password::CredentialManager};
use crate::config::AppConfig;
use crate::links::repo::{LinkStore, PgLinkStore};
use crate::users::repo::{AccountStore, PgAccountStore};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub links: Arc<dyn LinkStore>,
    pub passwords: CredentialManager,
    pub jwt: JwtKeys,
}

impl AppState {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")
    }

    pub fn from_pool(config: &AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let accounts = Arc::new(PgAccountStore::new(db.clone())) as Arc<dyn AccountStore>;
        let links = Arc::new(PgLinkStore::new(db)) as Arc<dyn LinkStore>;
        Self::from_parts(config, accounts, links)
    }

    pub fn from_parts(
        config: &AppConfig,
        accounts: Arc<dyn AccountStore>,
        links: Arc<dyn LinkStore>,
    ) -> anyhow::Result<Self> {
        let passwords = CredentialManager::new(&config.hashing)?;
        let jwt = JwtKeys::new(&config.jwt);
        Ok(Self {
            accounts,
            links,
            passwords,
            jwt,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::testing::{fake_config, MemoryAccountStore, MemoryLinkStore};

        Self::from_parts(
            &fake_config(),
            Arc::new(MemoryAccountStore::default()),
            Arc::new(MemoryLinkStore::default()),
        )
        .expect("fake state")
    }
}
