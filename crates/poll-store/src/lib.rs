//! # poll-store
//!
//! Data layer implementing the `PollRepository` port from `poll-core`.
//!
//! Two stores are provided: [`InMemoryPollRepository`] for tests and
//! throwaway runs, and [`SqlitePollRepository`], which persists polls
//! through SQLx.
//!
//! The store is the single authority for identifiers and creation
//! timestamps: both are assigned here, never by callers, and both increase
//! strictly with every created poll.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poll_core::{NewPoll, PollRepository};
//! use poll_store::InMemoryPollRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = InMemoryPollRepository::new();
//!     let input = NewPoll::new("Lunch?", None, &["Pizza".into(), "Sushi".into()])?;
//!     let id = repo.create(&input).await?;
//!     let poll = repo.find_by_id(id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ```rust,ignore
//! use poll_store::{create_pool, run_migrations, DatabaseConfig, SqlitePollRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let repo = SqlitePollRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, SqlitePool};
pub use repositories::{InMemoryPollRepository, SqlitePollRepository};
