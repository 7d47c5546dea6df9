use crate::MESSAGE_ROUTE;
use message_api_types::{Message, MessageDraft, MessageId};

/// A decoded request against the message resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRequest {
    ListAll,
    GetById(MessageId),
    Create(MessageDraft),
    Update(MessageId, MessageDraft),
    Delete(MessageId),
}

/// Outcome status of a handled request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    Conflict,
}

impl Status {
    /// HTTP status code for this outcome
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::Conflict => 409,
        }
    }
}

/// Response payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Message(Message),
    Messages(Vec<Message>),
}

/// Response descriptor produced by the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub status: Status,
    pub body: Option<ResponseBody>,
    pub location: Option<String>,
}

impl MessageResponse {
    /// A response with no body
    pub fn empty(status: Status) -> Self {
        Self {
            status,
            body: None,
            location: None,
        }
    }

    pub fn ok(message: Message) -> Self {
        Self {
            status: Status::Ok,
            body: Some(ResponseBody::Message(message)),
            location: None,
        }
    }

    pub fn list(messages: Vec<Message>) -> Self {
        Self {
            status: Status::Ok,
            body: Some(ResponseBody::Messages(messages)),
            location: None,
        }
    }

    pub fn created(message: Message) -> Self {
        Self {
            status: Status::Created,
            location: Some(message_location(message.id)),
            body: Some(ResponseBody::Message(message)),
        }
    }
}

/// Path of the single message resource for `id`
pub fn message_location(id: MessageId) -> String {
    format!("{}/{}", MESSAGE_ROUTE, id)
}
