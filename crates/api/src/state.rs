//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::{
    CartItemRepository, CartRepository, InMemoryStore, PgCartItemRepository, PgCartRepository,
    PgProductRepository, PgUserRepository, ProductRepository, UserRepository,
};
use crate::services::auth::{AuthService, TokenService};
use crate::services::{CartService, ProductService};

/// The set of repositories handlers work against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub cart_items: Arc<dyn CartItemRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    /// `PostgreSQL`-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            carts: Arc::new(PgCartRepository::new(pool.clone())),
            cart_items: Arc::new(PgCartItemRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
        }
    }

    /// Every repository backed by the same in-memory store.
    #[must_use]
    pub fn in_memory(store: &Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            carts: store.clone(),
            cart_items: store.clone(),
            products: store.clone(),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds only immutable
/// configuration and the repositories; nothing per-request is cached here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    tokens: TokenService,
    repositories: Repositories,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let repositories = Repositories::postgres(&pool);
        Self::build(config, repositories, Some(pool))
    }

    /// Create state over arbitrary repositories, with no database pool.
    #[must_use]
    pub fn with_repositories(config: ApiConfig, repositories: Repositories) -> Self {
        Self::build(config, repositories, None)
    }

    fn build(config: ApiConfig, repositories: Repositories, pool: Option<PgPool>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                tokens,
                repositories,
                pool,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get the database pool, if the state is database-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the token issuer/verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get the user repository.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.repositories.users.as_ref()
    }

    /// Registration and login.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.tokens(), self.inner.config.db_timeout)
    }

    /// Cart item operations.
    #[must_use]
    pub fn carts(&self) -> CartService<'_> {
        let repos = &self.inner.repositories;
        CartService::new(
            repos.carts.as_ref(),
            repos.cart_items.as_ref(),
            repos.products.as_ref(),
            self.inner.config.db_timeout,
        )
    }

    /// Catalog operations.
    #[must_use]
    pub fn products(&self) -> ProductService<'_> {
        let repos = &self.inner.repositories;
        ProductService::new(
            repos.products.as_ref(),
            repos.users.as_ref(),
            self.inner.config.db_timeout,
        )
    }
}
