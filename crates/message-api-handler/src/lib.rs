//! Message resource handler.
//!
//! Turns request descriptors into store operations and answers with a
//! transport-independent response descriptor. The HTTP gateway maps those
//! descriptors onto real requests and responses.

pub mod error;
pub mod handler;
pub mod response;

pub use error::{HandlerError, Result};
pub use handler::MessageHandler;
pub use response::{message_location, MessageRequest, MessageResponse, ResponseBody, Status};

/// Base path of the message resource
pub const MESSAGE_ROUTE: &str = "/message";
