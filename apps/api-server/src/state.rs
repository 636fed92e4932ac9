//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{
    BookmarkRepository, Cache, PasswordService, PostRepository, TokenService, UserRepository,
};
use agora_core::services::{BookmarkService, PostService, UserService, VerificationService};
use agora_infra::{
    Argon2PasswordService, InMemoryBookmarkRepository, InMemoryCache, InMemoryPostRepository,
    InMemoryUserRepository, JwtTokenService,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub bookmarks: BookmarkService,
    pub users: UserService,
    pub verification: VerificationService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

/// The three repositories every service is built from.
struct Repositories {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            bookmarks: Arc::new(InMemoryBookmarkRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Self {
        use agora_infra::{
            PostgresBookmarkRepository, PostgresPostRepository, PostgresUserRepository,
        };

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match agora_infra::connect(db_config).await {
            Ok(conn) => Self {
                users: Arc::new(PostgresUserRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                bookmarks: Arc::new(PostgresBookmarkRepository::new(conn)),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Repositories::connect(config).await;
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

        let tokens = Arc::new(JwtTokenService::new(config.auth.clone()));
        let state = Self::from_parts(repos, cache, tokens, config);
        tracing::info!("Application state initialized");
        state
    }

    /// Fully in-memory state, used by the handler tests.
    #[cfg(test)]
    pub fn in_memory(tokens: Arc<dyn TokenService>) -> Self {
        Self::from_parts(
            Repositories::in_memory(),
            Arc::new(InMemoryCache::new()),
            tokens,
            &AppConfig::from_env(),
        )
    }

    fn from_parts(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        tokens: Arc<dyn TokenService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            posts: PostService::new(repos.posts.clone(), repos.bookmarks.clone()),
            users: UserService::new(repos.users.clone(), repos.posts.clone(), repos.bookmarks.clone()),
            bookmarks: BookmarkService::new(repos.bookmarks, repos.posts),
            verification: VerificationService::new(repos.users, cache, config.verification.clone()),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }
}
