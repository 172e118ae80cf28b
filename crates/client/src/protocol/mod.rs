//! Core HTTP protocol abstractions of the client.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): Core message types and payload processing
//!   - [`Message`]: Represents either a head or a payload chunk
//!   - [`PayloadItem`]: Handles individual payload chunks and EOF
//!   - [`PayloadSize`]: Tracks payload size information
//!
//! - **Request Processing** ([`request`]): [`RequestHead`] of an outgoing request
//!
//! - **Response Processing** ([`response`]): [`ResponseHead`] of a received response,
//!   including the reason phrase sent by the server
//!
//! - **Error Handling** ([`error`]):
//!   - [`ClientError`]: Top-level error type
//!   - [`ParseError`]: Response parsing errors
//!   - [`SendError`]: Request sending errors

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHead;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::ClientError;
pub use error::ParseError;
pub use error::SendError;
