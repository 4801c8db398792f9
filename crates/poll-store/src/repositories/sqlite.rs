//! SQLite implementation of PollRepository

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use poll_core::{sort_polls, DomainError, NewPoll, OptionId, Poll, PollId, PollRepository, RepoResult};

use crate::mappers::assemble;
use crate::models::{PollModel, PollOptionModel};

use super::error::map_db_error;

/// SQLite implementation of PollRepository
///
/// Identifiers come from `AUTOINCREMENT` columns, so they are never reused.
/// Creates are serialized in-process to keep creation timestamps strictly
/// increasing.
pub struct SqlitePollRepository {
    pool: SqlitePool,
    last_created_at: Mutex<Option<DateTime<Utc>>>,
}

impl SqlitePollRepository {
    /// Create a new SqlitePollRepository over a migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            last_created_at: Mutex::new(None),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn poll_exists(&self, id: PollId) -> RepoResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM poll WHERE id = ?")
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl PollRepository for SqlitePollRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Poll>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let polls = sqlx::query_as::<_, PollModel>(
            r#"
            SELECT id, question, description, created_at, likes
            FROM poll
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let options = sqlx::query_as::<_, PollOptionModel>(
            r#"
            SELECT id, text, votes, poll_id
            FROM poll_option
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let mut polls = assemble(polls, options);
        sort_polls(&mut polls);
        Ok(polls)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: PollId) -> RepoResult<Option<Poll>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let poll = sqlx::query_as::<_, PollModel>(
            r#"
            SELECT id, question, description, created_at, likes
            FROM poll
            WHERE id = ?
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(poll) = poll else {
            return Ok(None);
        };

        let options = sqlx::query_as::<_, PollOptionModel>(
            r#"
            SELECT id, text, votes, poll_id
            FROM poll_option
            WHERE poll_id = ?
            ORDER BY id
            "#,
        )
        .bind(id.into_inner())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Some(poll.into_poll(options)))
    }

    #[instrument(skip(self, poll), fields(question = %poll.question()))]
    async fn create(&self, poll: &NewPoll) -> RepoResult<PollId> {
        let mut last_created_at = self.last_created_at.lock().await;

        let previous = match *last_created_at {
            Some(at) => Some(at),
            None => sqlx::query_scalar::<_, DateTime<Utc>>(
                "SELECT created_at FROM poll ORDER BY id DESC LIMIT 1",
            )
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?,
        };
        let now = Utc::now();
        let created_at = match previous {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let id = sqlx::query(
            r#"
            INSERT INTO poll (question, description, created_at, likes)
            VALUES (?, ?, ?, 0)
            "#,
        )
        .bind(poll.question())
        .bind(poll.description())
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .last_insert_rowid();

        for text in poll.options() {
            sqlx::query("INSERT INTO poll_option (text, votes, poll_id) VALUES (?, 0, ?)")
                .bind(text)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        *last_created_at = Some(created_at);

        let id = PollId::new(id);
        debug!(poll_id = %id, "Poll stored");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn increment_vote(&self, poll_id: PollId, option_id: OptionId) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE poll_option SET votes = votes + 1
            WHERE id = ? AND poll_id = ?
            "#,
        )
        .bind(option_id.into_inner())
        .bind(poll_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(if self.poll_exists(poll_id).await? {
                DomainError::OptionNotFound { poll_id, option_id }
            } else {
                DomainError::PollNotFound(poll_id)
            });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_like(&self, poll_id: PollId) -> RepoResult<()> {
        let result = sqlx::query("UPDATE poll SET likes = likes + 1 WHERE id = ?")
            .bind(poll_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PollNotFound(poll_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, run_migrations, DatabaseConfig};

    async fn migrated_pool() -> SqlitePool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn repo() -> SqlitePollRepository {
        SqlitePollRepository::new(migrated_pool().await)
    }

    fn new_poll(question: &str, options: &[&str]) -> NewPoll {
        let options: Vec<String> = options.iter().map(ToString::to_string).collect();
        NewPoll::new(question, Some("  Pick one ".to_string()), &options).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repo().await;
        let id = repo.create(&new_poll("Lunch?", &["Pizza", "Sushi", "Tacos"])).await.unwrap();

        let poll = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(poll.id, id);
        assert_eq!(poll.question, "Lunch?");
        assert_eq!(poll.description.as_deref(), Some("Pick one"));
        assert_eq!(poll.likes, 0);
        let texts: Vec<&str> = poll.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Pizza", "Sushi", "Tacos"]);
        assert!(poll.options.iter().all(|o| o.votes == 0));
        assert!(poll.check_well_formed().is_ok());

        assert!(repo.find_by_id(PollId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_and_timestamps_strictly_increase_and_list_is_newest_first() {
        let repo = repo().await;
        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(repo.create(&new_poll(&format!("Q{i}"), &["a", "b"])).await.unwrap());
        }

        let polls = repo.list().await.unwrap();
        assert_eq!(polls.len(), 10);
        for pair in polls.windows(2) {
            assert!(pair[0].id > pair[1].id);
            assert!(pair[0].created_at > pair[1].created_at);
        }
        ids.reverse();
        assert_eq!(polls.iter().map(|p| p.id).collect::<Vec<_>>(), ids);
    }

    #[tokio::test]
    async fn test_vote_and_like() {
        let repo = repo().await;
        let id = repo.create(&new_poll("Q", &["a", "b"])).await.unwrap();
        let option_id = repo.find_by_id(id).await.unwrap().unwrap().options[1].id;

        repo.increment_vote(id, option_id).await.unwrap();
        repo.increment_vote(id, option_id).await.unwrap();
        repo.increment_like(id).await.unwrap();

        let poll = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(poll.options[0].votes, 0);
        assert_eq!(poll.options[1].votes, 2);
        assert_eq!(poll.likes, 1);
    }

    #[tokio::test]
    async fn test_missing_targets_are_not_found() {
        let repo = repo().await;
        let a = repo.create(&new_poll("A", &["x", "y"])).await.unwrap();
        let b = repo.create(&new_poll("B", &["x", "y"])).await.unwrap();
        let foreign_option = repo.find_by_id(b).await.unwrap().unwrap().options[0].id;

        let err = repo.increment_like(PollId::new(99)).await.unwrap_err();
        assert!(matches!(err, DomainError::PollNotFound(_)));

        let err = repo.increment_vote(PollId::new(99), foreign_option).await.unwrap_err();
        assert!(matches!(err, DomainError::PollNotFound(_)));

        let err = repo.increment_vote(a, foreign_option).await.unwrap_err();
        assert!(matches!(err, DomainError::OptionNotFound { .. }));

        // Nothing was counted against the other poll
        let b_poll = repo.find_by_id(b).await.unwrap().unwrap();
        assert_eq!(b_poll.total_votes(), 0);
    }

    #[tokio::test]
    async fn test_new_repository_continues_after_existing_rows() {
        let pool = migrated_pool().await;

        let first = SqlitePollRepository::new(pool.clone());
        let older = first.create(&new_poll("older", &["a", "b"])).await.unwrap();
        let older = first.find_by_id(older).await.unwrap().unwrap();
        drop(first);

        let second = SqlitePollRepository::new(pool);
        let newer = second.create(&new_poll("newer", &["a", "b"])).await.unwrap();
        let newer = second.find_by_id(newer).await.unwrap().unwrap();

        assert!(newer.id > older.id);
        assert!(newer.created_at > older.created_at);
        assert_eq!(second.list().await.unwrap()[0].id, newer.id);
    }
}
