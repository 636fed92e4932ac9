//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`:
//! repositories, the verification-code cache and authentication.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

pub use cache::InMemoryCache;
pub use database::{
    DatabaseConfig, InMemoryBookmarkRepository, InMemoryPostRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use database::{PostgresBookmarkRepository, PostgresPostRepository, PostgresUserRepository, connect};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
