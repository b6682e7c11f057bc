//! A small service catalog: users register and log in, then manage the
//! services they own and the versions published for each.
//!
//! Authenticated routes sit behind [`middleware::require_identity`], which
//! turns a bearer token into a [`middleware::CurrentUser`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rest;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use crate::{
    auth::TokenService,
    config::TokenConfig,
    store::{CatalogStore, CredentialStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: CredentialStore,
    pub catalog: CatalogStore,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, token_config: &TokenConfig) -> Self {
        AppState {
            users: CredentialStore::new(pool.clone()),
            catalog: CatalogStore::new(pool),
            tokens: Arc::new(TokenService::new(token_config)),
        }
    }
}
