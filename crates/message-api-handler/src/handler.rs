use crate::{HandlerError, MessageRequest, MessageResponse, Result, Status};
use message_api_persistence::{MessageStore, StoreError};
use message_api_types::{MessageDraft, MessageId};
use std::sync::Arc;
use tracing::{debug, info};

/// Handles requests against the message resource.
///
/// Holds nothing but the injected store; every call opens its own session.
#[derive(Clone)]
pub struct MessageHandler {
    store: Arc<dyn MessageStore>,
}

impl MessageHandler {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Dispatch a request descriptor to the matching operation
    pub async fn handle(&self, request: MessageRequest) -> Result<MessageResponse> {
        match request {
            MessageRequest::ListAll => self.list_all().await,
            MessageRequest::GetById(id) => self.get_by_id(id).await,
            MessageRequest::Create(draft) => self.create(draft).await,
            MessageRequest::Update(id, draft) => self.update(id, draft).await,
            MessageRequest::Delete(id) => self.delete(id).await,
        }
    }

    pub async fn list_all(&self) -> Result<MessageResponse> {
        let mut session = self.store.begin().await?;
        let messages = session.list_all().await?;
        debug!("Listing {} messages", messages.len());
        Ok(MessageResponse::list(messages))
    }

    pub async fn get_by_id(&self, id: MessageId) -> Result<MessageResponse> {
        let mut session = self.store.begin().await?;
        match session.find_by_id(id).await? {
            Some(message) => Ok(MessageResponse::ok(message)),
            None => {
                debug!("Message {} not found", id);
                Ok(MessageResponse::empty(Status::NotFound))
            }
        }
    }

    /// Create a message under the caller-supplied id
    pub async fn create(&self, draft: MessageDraft) -> Result<MessageResponse> {
        let Some(message) = draft.into_message() else {
            debug!("Rejecting create: missing content");
            return Ok(MessageResponse::empty(Status::BadRequest));
        };

        let mut session = self.store.begin().await?;
        if session.find_by_id(message.id).await?.is_some() {
            debug!("Rejecting create: message {} already exists", message.id);
            return Ok(MessageResponse::empty(Status::Conflict));
        }

        session.insert(message.clone());
        match session.commit().await {
            Ok(()) => {}
            // Lost a race against a concurrent create for the same id
            Err(StoreError::AlreadyExists(id)) => {
                debug!("Rejecting create: message {} inserted concurrently", id);
                return Ok(MessageResponse::empty(Status::Conflict));
            }
            Err(e) => return Err(HandlerError::from(e)),
        }

        info!("Created message {}", message.id);
        Ok(MessageResponse::created(message))
    }

    /// Replace the content of an existing message
    pub async fn update(&self, id: MessageId, draft: MessageDraft) -> Result<MessageResponse> {
        if draft.id != id {
            debug!("Rejecting update: path id {} != body id {}", id, draft.id);
            return Ok(MessageResponse::empty(Status::BadRequest));
        }
        let Some(content) = draft.valid_content() else {
            debug!("Rejecting update of {}: missing content", id);
            return Ok(MessageResponse::empty(Status::BadRequest));
        };

        let mut session = self.store.begin().await?;
        let Some(mut existing) = session.find_by_id(id).await? else {
            debug!("Message {} not found", id);
            return Ok(MessageResponse::empty(Status::NotFound));
        };

        existing.content = content.to_string();
        session.update(existing);
        match session.commit().await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Ok(MessageResponse::empty(Status::NotFound)),
            Err(e) => return Err(HandlerError::from(e)),
        }

        info!("Updated message {}", id);
        Ok(MessageResponse::empty(Status::NoContent))
    }

    /// Delete a message, answering with the entity as it was before removal
    pub async fn delete(&self, id: MessageId) -> Result<MessageResponse> {
        let mut session = self.store.begin().await?;
        let Some(message) = session.find_by_id(id).await? else {
            debug!("Message {} not found", id);
            return Ok(MessageResponse::empty(Status::NotFound));
        };

        session.remove(message.clone());
        match session.commit().await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Ok(MessageResponse::empty(Status::NotFound)),
            Err(e) => return Err(HandlerError::from(e)),
        }

        info!("Deleted message {}", id);
        Ok(MessageResponse::ok(message))
    }
}
