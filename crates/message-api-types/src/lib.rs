//! Message API Types - Core types for the message service
//!
//! This module defines the data types shared by the store, the handler and
//! the HTTP gateway.

mod message;

pub use message::{Message, MessageDraft, MessageId};
