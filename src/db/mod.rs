//! Database module
//!
//! SQLite integration using sqlx with:
//! - Connection pool management
//! - Row types with FromRow
//! - Repository pattern for data access
//! - Batched multi-row writes inside one import transaction

pub mod models;
pub mod pool;
pub mod repository;

// Re-export commonly used items
pub use pool::{connect, create_pool, health_check, run_migrations};
