use crate::{MessageSession, MessageStore, PendingChange, Result, StoreError};
use async_trait::async_trait;
use message_api_types::{Message, MessageId};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

/// Path value that selects a private in-process database
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Message store backed by SQLite
#[derive(Debug, Clone)]
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    /// Open (or create) the database at `database_path` and ensure the schema exists
    pub async fn new(database_path: &str, max_connections: u32) -> Result<Self> {
        let pool = if database_path == IN_MEMORY_PATH {
            // Every connection to `:memory:` is its own database, so keep exactly one alive
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?
        } else {
            let database_url = format!("sqlite:{}?mode=rwc", database_path);
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect(&database_url)
                .await?
        };

        let store = Self::from_pool(pool).await?;
        info!("Message store initialized with database: {}", database_path);
        Ok(store)
    }

    /// Wrap an existing pool and ensure the schema exists
    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create the messages table if it is missing
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL CHECK (content <> '')
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn begin(&self) -> Result<Box<dyn MessageSession>> {
        Ok(Box::new(SqliteSession {
            pool: self.pool.clone(),
            changes: Vec::new(),
        }))
    }
}

struct SqliteSession {
    pool: SqlitePool,
    changes: Vec<PendingChange>,
}

fn message_from_row(row: &SqliteRow) -> Result<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
    })
}

#[async_trait]
impl MessageSession for SqliteSession {
    async fn find_by_id(&mut self, id: MessageId) -> Result<Option<Message>> {
        let row = sqlx::query("SELECT id, content FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(message_from_row).transpose()
    }

    async fn list_all(&mut self) -> Result<Vec<Message>> {
        let rows = sqlx::query("SELECT id, content FROM messages ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(message_from_row).collect()
    }

    fn insert(&mut self, message: Message) {
        self.changes.push(PendingChange::Insert(message));
    }

    fn update(&mut self, message: Message) {
        self.changes.push(PendingChange::Update(message));
    }

    fn remove(&mut self, message: Message) {
        self.changes.push(PendingChange::Remove(message.id));
    }

    async fn commit(&mut self) -> Result<()> {
        if self.changes.is_empty() {
            return Ok(());
        }

        let changes = std::mem::take(&mut self.changes);
        changes.iter().try_for_each(PendingChange::check_content)?;
        let count = changes.len();
        let mut tx = self.pool.begin().await?;

        for change in changes {
            match change {
                PendingChange::Insert(message) => {
                    let result = sqlx::query("INSERT INTO messages (id, content) VALUES (?, ?)")
                        .bind(message.id)
                        .bind(&message.content)
                        .execute(&mut *tx)
                        .await;

                    match result {
                        Ok(_) => {}
                        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                            return Err(StoreError::AlreadyExists(message.id));
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                PendingChange::Update(message) => {
                    let result = sqlx::query("UPDATE messages SET content = ? WHERE id = ?")
                        .bind(&message.content)
                        .bind(message.id)
                        .execute(&mut *tx)
                        .await?;

                    if result.rows_affected() == 0 {
                        return Err(StoreError::NotFound(message.id));
                    }
                }
                PendingChange::Remove(id) => {
                    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;

                    if result.rows_affected() == 0 {
                        return Err(StoreError::NotFound(id));
                    }
                }
            }
        }

        tx.commit().await?;
        debug!("Committed {} staged change(s)", count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> SqliteMessageStore {
        let store = SqliteMessageStore::new(IN_MEMORY_PATH, 1).await.unwrap();
        let mut session = store.begin().await.unwrap();
        session.insert(Message::new(2, "Fun Message 2"));
        session.insert(Message::new(1, "Cool Message 1"));
        session.commit().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_and_list() {
        let store = seeded_store().await;
        let mut session = store.begin().await.unwrap();

        assert_eq!(
            session.find_by_id(1).await.unwrap(),
            Some(Message::new(1, "Cool Message 1"))
        );
        assert_eq!(session.find_by_id(999).await.unwrap(), None);
        assert_eq!(
            session.list_all().await.unwrap(),
            vec![
                Message::new(1, "Cool Message 1"),
                Message::new(2, "Fun Message 2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_persists_content() {
        let store = seeded_store().await;
        let mut session = store.begin().await.unwrap();
        session.update(Message::new(2, "Message changed"));
        session.commit().await.unwrap();

        let mut session = store.begin().await.unwrap();
        assert_eq!(
            session.find_by_id(2).await.unwrap(),
            Some(Message::new(2, "Message changed"))
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let store = seeded_store().await;
        let mut session = store.begin().await.unwrap();
        session.remove(Message::new(1, "Cool Message 1"));
        session.commit().await.unwrap();

        assert_eq!(session.find_by_id(1).await.unwrap(), None);
        assert_eq!(session.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rolls_back() {
        let store = seeded_store().await;
        let mut session = store.begin().await.unwrap();
        session.insert(Message::new(3, "Awesome message 3"));
        session.insert(Message::new(1, "Conflicting"));

        assert!(matches!(
            session.commit().await,
            Err(StoreError::AlreadyExists(1))
        ));
        assert_eq!(session.find_by_id(3).await.unwrap(), None);
        assert_eq!(
            session.find_by_id(1).await.unwrap(),
            Some(Message::new(1, "Cool Message 1"))
        );
    }

    #[tokio::test]
    async fn test_missing_targets_fail_commit() {
        let store = seeded_store().await;
        let mut session = store.begin().await.unwrap();
        session.update(Message::new(999, "nothing"));
        assert!(matches!(
            session.commit().await,
            Err(StoreError::NotFound(999))
        ));

        session.remove(Message::new(998, "nothing"));
        assert!(matches!(
            session.commit().await,
            Err(StoreError::NotFound(998))
        ));
    }

    #[tokio::test]
    async fn test_empty_content_rejected_before_database() {
        let store = seeded_store().await;
        let mut session = store.begin().await.unwrap();
        session.insert(Message::new(7, ""));
        assert!(matches!(
            session.commit().await,
            Err(StoreError::EmptyContent(7))
        ));

        session.update(Message::new(1, ""));
        assert!(matches!(
            session.commit().await,
            Err(StoreError::EmptyContent(1))
        ));

        assert_eq!(session.find_by_id(7).await.unwrap(), None);
        assert_eq!(
            session.find_by_id(1).await.unwrap(),
            Some(Message::new(1, "Cool Message 1"))
        );
    }

    #[tokio::test]
    async fn test_uncommitted_changes_discarded() {
        let store = seeded_store().await;
        {
            let mut session = store.begin().await.unwrap();
            session.insert(Message::new(4, "Another message"));
        }

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.find_by_id(4).await.unwrap(), None);
    }
}
