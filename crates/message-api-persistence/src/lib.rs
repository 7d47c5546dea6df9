//! Message store contract and its implementations.
//!
//! Callers open a [`MessageSession`] per request through [`MessageStore::begin`],
//! read through it, stage writes with `insert`/`update`/`remove` and flush them
//! with [`MessageSession::commit`]. Staged writes are not visible to reads until
//! they are committed, and a session dropped without committing discards them.

pub mod error;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use message_api_types::{Message, MessageId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub use error::{Result, StoreError};
pub use memory::InMemoryMessageStore;
pub use sqlite::SqliteMessageStore;

/// Persistence backend for messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Open a unit of work against the store
    async fn begin(&self) -> Result<Box<dyn MessageSession>>;
}

/// A unit of work: committed reads plus a list of staged writes
#[async_trait]
pub trait MessageSession: Send {
    async fn find_by_id(&mut self, id: MessageId) -> Result<Option<Message>>;

    /// All committed messages, ordered by id
    async fn list_all(&mut self) -> Result<Vec<Message>>;

    fn insert(&mut self, message: Message);

    /// Stage the new state of an existing message
    fn update(&mut self, message: Message);

    fn remove(&mut self, message: Message);

    /// Apply every staged write atomically.
    ///
    /// Fails with [`StoreError::AlreadyExists`] or [`StoreError::NotFound`] when
    /// a staged write no longer matches the stored state, and with
    /// [`StoreError::EmptyContent`] when it would store empty content. Nothing
    /// is applied then.
    async fn commit(&mut self) -> Result<()>;
}

/// A write staged in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingChange {
    Insert(Message),
    Update(Message),
    Remove(MessageId),
}

impl PendingChange {
    /// Stored content is never empty
    pub(crate) fn check_content(&self) -> Result<()> {
        match self {
            PendingChange::Insert(message) | PendingChange::Update(message)
                if message.content.is_empty() =>
            {
                Err(StoreError::EmptyContent(message.id))
            }
            _ => Ok(()),
        }
    }
}

/// Insert every message whose id is not stored yet. Returns how many were added.
///
/// Entries with empty content and repeated ids within `messages` are skipped;
/// the first entry for an id wins.
pub async fn seed_messages(store: &dyn MessageStore, messages: &[Message]) -> Result<usize> {
    let mut session = store.begin().await?;
    let mut seen = HashSet::new();
    let mut added = 0;

    for message in messages {
        if message.content.is_empty() {
            warn!("Seed message {} has empty content, skipping", message.id);
            continue;
        }
        if !seen.insert(message.id) {
            warn!("Seed message {} listed more than once, skipping", message.id);
            continue;
        }
        if session.find_by_id(message.id).await?.is_some() {
            debug!("Seed message {} already stored, skipping", message.id);
            continue;
        }
        session.insert(message.clone());
        added += 1;
    }

    session.commit().await?;
    info!("Seeded {} of {} messages", added, messages.len());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_skips_existing_ids() {
        let store = InMemoryMessageStore::with_messages([Message::new(1, "Cool Message 1")]);
        let seed = [
            Message::new(1, "Replaced?"),
            Message::new(2, "Fun Message 2"),
        ];

        let added = seed_messages(&store, &seed).await.unwrap();
        assert_eq!(added, 1);

        let mut session = store.begin().await.unwrap();
        assert_eq!(
            session.list_all().await.unwrap(),
            vec![
                Message::new(1, "Cool Message 1"),
                Message::new(2, "Fun Message 2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_seed_keeps_first_of_repeated_ids() {
        let store = InMemoryMessageStore::new();
        let seed = [Message::new(5, "a"), Message::new(5, "b")];

        let added = seed_messages(&store, &seed).await.unwrap();
        assert_eq!(added, 1);

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.list_all().await.unwrap(), vec![Message::new(5, "a")]);
    }

    #[tokio::test]
    async fn test_seed_skips_empty_content_in_memory() {
        let store = InMemoryMessageStore::new();
        let seed = [Message::new(7, ""), Message::new(8, "Fine")];

        let added = seed_messages(&store, &seed).await.unwrap();
        assert_eq!(added, 1);

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.list_all().await.unwrap(), vec![Message::new(8, "Fine")]);
    }

    #[tokio::test]
    async fn test_seed_skips_empty_content_in_sqlite() {
        let store = SqliteMessageStore::new(sqlite::IN_MEMORY_PATH, 1)
            .await
            .unwrap();
        let seed = [Message::new(7, ""), Message::new(8, "Fine")];

        let added = seed_messages(&store, &seed).await.unwrap();
        assert_eq!(added, 1);

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.find_by_id(7).await.unwrap(), None);
        assert_eq!(
            session.list_all().await.unwrap(),
            vec![Message::new(8, "Fine")]
        );
    }
}
