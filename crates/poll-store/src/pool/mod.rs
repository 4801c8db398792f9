//! Database connection pool management

mod migrations;
mod sqlite;

pub use migrations::run_migrations;
pub use sqlite::{create_pool, create_pool_from_env, DatabaseConfig};
pub use sqlx::sqlite::SqlitePool;
