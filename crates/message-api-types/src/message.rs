use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message ID type, supplied by the caller
pub type MessageId = i64;

/// A stored message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
}

impl Message {
    pub fn new(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

/// A candidate message as decoded from a request body.
///
/// `content` stays optional so a missing or `null` value reaches the handler
/// and can be answered with a validation failure instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageDraft {
    pub id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl MessageDraft {
    pub fn new(id: MessageId, content: Option<String>) -> Self {
        Self { id, content }
    }

    /// Content if present and non-empty
    pub fn valid_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// Convert into a message, if the content is valid
    pub fn into_message(self) -> Option<Message> {
        match self.content {
            Some(content) if !content.is_empty() => Some(Message::new(self.id, content)),
            _ => None,
        }
    }
}

// ============================================================================
// Case-insensitive deserialization
// ============================================================================

enum Field {
    Id,
    Content,
    Other,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        if key.eq_ignore_ascii_case("id") {
            Ok(Field::Id)
        } else if key.eq_ignore_ascii_case("content") {
            Ok(Field::Content)
        } else {
            Ok(Field::Other)
        }
    }
}

struct DraftVisitor;

impl<'de> Visitor<'de> for DraftVisitor {
    type Value = MessageDraft;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a message object with `id` and `content`")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut draft = MessageDraft::default();
        while let Some(field) = map.next_key::<Field>()? {
            match field {
                Field::Id => draft.id = map.next_value()?,
                Field::Content => draft.content = map.next_value()?,
                Field::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(draft)
    }
}

impl<'de> Deserialize<'de> for MessageDraft {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DraftVisitor)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let draft = MessageDraft::deserialize(deserializer)?;
        match draft.content {
            Some(content) => Ok(Message::new(draft.id, content)),
            None => Err(de::Error::missing_field("content")),
        }
    }
}
