use serde::Serialize;
use std::fmt;

use crate::error::{EasemobError, Result};

/// HTTP verb as understood by the adapter.
///
/// Unknown verb strings map to [`Verb::Upload`]: a plain POST whose payload is
/// usually a multipart form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Upload,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Upload => "UPLOAD",
        }
    }

    /// GET is the only verb that never carries a payload.
    pub fn carries_body(&self) -> bool {
        !matches!(self, Verb::Get)
    }
}

impl From<&str> for Verb {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Verb::Get,
            "POST" => Verb::Post,
            "PUT" => Verb::Put,
            "DELETE" => Verb::Delete,
            _ => Verb::Upload,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One file sent as a multipart form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Multipart(FilePart),
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Bytes(serde_json::to_vec(value)?))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Bytes(bytes) => bytes.is_empty(),
            Payload::Multipart(_) => false,
        }
    }
}

/// Request as handed to the adapter. Headers are `Name:Value` lines; order and
/// duplicates are kept as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub verb: Verb,
    pub headers: Vec<String>,
    pub payload: Payload,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>, verb: Verb) -> Self {
        Self {
            url: url.into(),
            verb,
            headers: Vec::new(),
            payload: Payload::Empty,
        }
    }

    pub fn header(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    pub fn headers<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Puts `line` ahead of every header already present.
    pub fn first_header(mut self, line: impl Into<String>) -> Self {
        self.headers.insert(0, line.into());
        self
    }
}

/// Splits `Name:Value` on the first colon, trimming both halves.
pub fn split_header_line(line: &str) -> Result<(&str, &str)> {
    match line.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(EasemobError::InvalidHeader(line.to_owned())),
    }
}
