// Service exports
pub mod auth;
pub mod cache;
pub mod database;

pub use auth::{AdminAuth, AdminSession, AuthError};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use database::{Backend, Database, DatabaseError, PastGame};
