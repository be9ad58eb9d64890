//! Provider endpoints: the declarative table, the generic executor and the
//! operations that need more than one request or touch local files.

pub mod client;
pub mod endpoint;
pub mod files;
pub mod messages;

pub use client::EasemobClient;
pub use endpoint::{Call, Endpoint, EndpointSpec};
pub use files::UploadedFile;
pub use messages::{Envelope, ImageSize, Message, MessageBody, TargetType};
