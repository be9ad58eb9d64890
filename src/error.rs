use thiserror::Error;

pub type Result<T, E = EasemobError> = std::result::Result<T, E>;

/// Errors surfaced by the client. Every variant maps to a stable [`ErrorKind`].
#[derive(Debug, Error)]
pub enum EasemobError {
    /// Missing or invalid credentials / settings at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider rejected the client-credentials grant.
    #[error("authentication failed: {error}: {error_description}")]
    Authentication {
        error: String,
        error_description: String,
    },

    /// Connection failure, timeout, TLS failure or a broken response body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered a resource call with an `error` body.
    #[error("provider error: {error}: {error_description}")]
    Provider {
        error: String,
        error_description: String,
    },

    /// The call succeeded but the payload does not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("missing path parameter '{0}'")]
    MissingParam(String),

    #[error("invalid header line '{0}', expected 'Name:Value'")]
    InvalidHeader(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Transport,
    Provider,
    UnexpectedResponse,
    InvalidRequest,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Transport => "transport",
            ErrorKind::Provider => "provider",
            ErrorKind::UnexpectedResponse => "unexpected_response",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Io => "io",
        }
    }
}

impl EasemobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EasemobError::Configuration(_) => ErrorKind::Configuration,
            EasemobError::Authentication { .. } => ErrorKind::Authentication,
            EasemobError::Transport(_) => ErrorKind::Transport,
            EasemobError::Provider { .. } => ErrorKind::Provider,
            EasemobError::UnexpectedResponse(_) | EasemobError::Json(_) => {
                ErrorKind::UnexpectedResponse
            }
            EasemobError::MissingParam(_) | EasemobError::InvalidHeader(_) => {
                ErrorKind::InvalidRequest
            }
            EasemobError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn authentication(error: impl Into<String>, description: impl Into<String>) -> Self {
        EasemobError::Authentication {
            error: error.into(),
            error_description: description.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let err = EasemobError::authentication("invalid_client", "bad secret");
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.kind().as_str(), "authentication");
        assert_eq!(err.to_string(), "authentication failed: invalid_client: bad secret");

        let err = EasemobError::MissingParam("username".into());
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
