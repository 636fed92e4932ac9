//! # Agora Core
//!
//! The domain layer of Agora: the privilege model, the post lifecycle
//! engine and the services that apply them through repository ports.
//! This crate has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, DomainResult, RepoError};
