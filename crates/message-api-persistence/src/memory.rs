use crate::{MessageSession, MessageStore, PendingChange, Result, StoreError};
use async_trait::async_trait;
use message_api_types::{Message, MessageId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process message store, used by tests and local development
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<BTreeMap<MessageId, Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `messages`; later duplicates win
    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let map = messages.into_iter().map(|m| (m.id, m)).collect();
        Self {
            messages: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn begin(&self) -> Result<Box<dyn MessageSession>> {
        Ok(Box::new(InMemorySession {
            messages: Arc::clone(&self.messages),
            changes: Vec::new(),
        }))
    }
}

struct InMemorySession {
    messages: Arc<RwLock<BTreeMap<MessageId, Message>>>,
    changes: Vec<PendingChange>,
}

#[async_trait]
impl MessageSession for InMemorySession {
    async fn find_by_id(&mut self, id: MessageId) -> Result<Option<Message>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn list_all(&mut self) -> Result<Vec<Message>> {
        Ok(self.messages.read().await.values().cloned().collect())
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
        let changes = std::mem::take(&mut self.changes);
        changes.iter().try_for_each(PendingChange::check_content)?;
        let mut messages = self.messages.write().await;

        // Apply to a copy so a failing change leaves the store untouched
        let mut next = messages.clone();
        for change in changes {
            match change {
                PendingChange::Insert(message) => {
                    if next.contains_key(&message.id) {
                        return Err(StoreError::AlreadyExists(message.id));
                    }
                    next.insert(message.id, message);
                }
                PendingChange::Update(message) => match next.get_mut(&message.id) {
                    Some(stored) => *stored = message,
                    None => return Err(StoreError::NotFound(message.id)),
                },
                PendingChange::Remove(id) => {
                    if next.remove(&id).is_none() {
                        return Err(StoreError::NotFound(id));
                    }
                }
            }
        }

        *messages = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_staged_writes_invisible_until_commit() {
        let store = InMemoryMessageStore::new();
        let mut session = store.begin().await.unwrap();
        session.insert(Message::new(1, "Cool Message 1"));
        assert_eq!(session.find_by_id(1).await.unwrap(), None);

        session.commit().await.unwrap();
        assert_eq!(
            session.find_by_id(1).await.unwrap(),
            Some(Message::new(1, "Cool Message 1"))
        );
    }

    #[tokio::test]
    async fn test_dropped_session_discards_changes() {
        let store = InMemoryMessageStore::with_messages([Message::new(1, "keep")]);
        {
            let mut session = store.begin().await.unwrap();
            session.remove(Message::new(1, "keep"));
        }

        let mut session = store.begin().await.unwrap();
        assert_eq!(session.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = InMemoryMessageStore::with_messages([
            Message::new(2, "Fun Message 2"),
            Message::new(1, "Cool Message 1"),
        ]);

        let mut session = store.begin().await.unwrap();
        session.update(Message::new(2, "Message changed"));
        session.remove(Message::new(1, "Cool Message 1"));
        session.commit().await.unwrap();

        assert_eq!(
            session.list_all().await.unwrap(),
            vec![Message::new(2, "Message changed")]
        );
    }

    #[tokio::test]
    async fn test_failed_commit_is_atomic() {
        let store = InMemoryMessageStore::with_messages([Message::new(1, "Cool Message 1")]);

        let mut session = store.begin().await.unwrap();
        session.insert(Message::new(2, "new"));
        session.update(Message::new(9, "missing"));
        let result = session.commit().await;
        assert!(matches!(result, Err(StoreError::NotFound(9))));

        assert_eq!(
            session.list_all().await.unwrap(),
            vec![Message::new(1, "Cool Message 1")]
        );
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let store = InMemoryMessageStore::with_messages([Message::new(1, "Cool Message 1")]);

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

        assert_eq!(
            session.list_all().await.unwrap(),
            vec![Message::new(1, "Cool Message 1")]
        );
    }

    #[tokio::test]
    async fn test_insert_existing_id_fails() {
        let store = InMemoryMessageStore::with_messages([Message::new(1, "Cool Message 1")]);
        let mut session = store.begin().await.unwrap();
        session.insert(Message::new(1, "Conflicting"));

        assert!(matches!(
            session.commit().await,
            Err(StoreError::AlreadyExists(1))
        ));
    }
}
