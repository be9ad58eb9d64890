//! Single-request HTTP adapter.

pub mod adapter;
pub mod request;
pub mod response;

pub use adapter::HttpTransport;
pub use request::{ApiRequest, FilePart, Payload, Verb};
pub use response::{ApiResult, ErrorBody};
