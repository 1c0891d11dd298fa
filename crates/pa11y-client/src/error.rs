//! Error types for the webservice client.
//!
//! Transport failures keep a [`TransportCode`] so the dashboard can tell an
//! unreachable service apart from a connection that dropped mid-request.

use std::error::Error as StdError;
use std::io::ErrorKind;

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportCode {
    /// Nothing is listening at the webservice address.
    ConnectionRefused,
    /// The peer closed or reset the socket before the response completed.
    ConnectionReset,
    /// The request did not complete in time.
    TimedOut,
    /// Any other transport failure.
    Other,
}

impl TransportCode {
    /// Conventional errno-style name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::ConnectionReset => "ECONNRESET",
            Self::TimedOut => "ETIMEDOUT",
            Self::Other => "EUNKNOWN",
        }
    }

    /// Classify a `reqwest` failure by walking its source chain.
    pub fn classify(error: &reqwest::Error) -> Self {
        let mut source: Option<&(dyn StdError + 'static)> = Some(error);
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<std::io::Error>() {
                match io.kind() {
                    ErrorKind::ConnectionRefused => return Self::ConnectionRefused,
                    ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof => return Self::ConnectionReset,
                    ErrorKind::TimedOut => return Self::TimedOut,
                    _ => {}
                }
            }
            // hyper reports a peer that hangs up without answering as an
            // incomplete message rather than an io error.
            if let Some(hyper_err) = err.downcast_ref::<hyper::Error>()
                && (hyper_err.is_incomplete_message() || hyper_err.is_closed())
            {
                return Self::ConnectionReset;
            }
            source = err.source();
        }

        if error.is_timeout() {
            Self::TimedOut
        } else {
            Self::Other
        }
    }
}

impl core::fmt::Display for TransportCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`WebserviceClient`](crate::WebserviceClient) calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL cannot address the service.
    #[error("invalid webservice URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request never produced a response.
    #[error("{code}: {message}")]
    Transport {
        /// Failure classification.
        code: TransportCode,
        /// Underlying error text.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the service's error body.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("could not decode webservice response: {0}")]
    Decode(String),
}

impl ClientError {
    /// The transport classification, if this is a transport failure.
    pub const fn transport_code(&self) -> Option<TransportCode> {
        match self {
            Self::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The HTTP status, if the service answered.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service reported that the resource does not exist.
    ///
    /// The service answers malformed ids with 400, which is treated the same.
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(400 | 404))
    }

    /// Convert a `reqwest` failure, classifying transport errors.
    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::Decode(error.to_string());
        }
        Self::Transport {
            code: TransportCode::classify(error),
            message: error.to_string(),
        }
    }
}
