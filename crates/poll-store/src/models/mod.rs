//! Database models - SQLx-compatible structs for the SQLite tables

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the poll table
#[derive(Debug, Clone, FromRow)]
pub struct PollModel {
    pub id: i64,
    pub question: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
}

/// Database model for the poll_option table
#[derive(Debug, Clone, FromRow)]
pub struct PollOptionModel {
    pub id: i64,
    pub text: String,
    pub votes: i64,
    pub poll_id: i64,
}
