//! # Agora Shared
//!
//! Wire types shared between the API server and its clients.
//! Kept free of domain dependencies so it can be compiled for WASM.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
