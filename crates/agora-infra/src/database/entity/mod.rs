//! SeaORM entities mirroring the domain tables.

pub mod bookmark;
pub mod post;
pub mod user;
