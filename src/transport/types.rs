//! Request, response and error types shared by transports and the failover engine.

use reqwest::header::HeaderMap;
use reqwest::Method;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Header carrying the open failover attempt on a replayed request.
pub const ATTEMPT_ID_HEADER: &str = "x-failover-attempt-id";

/// Classified cause of a failed exchange.
///
/// The string forms match the codes reported by common HTTP client stacks
/// (`ECONNREFUSED`, `ENOTFOUND`, ...), so codes coming from foreign
/// collaborators can be parsed with [`FromStr`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generic network failure (`ERR_NETWORK`).
    Network,
    /// Connection aborted or reset mid-exchange (`ECONNABORTED`).
    ConnectionAborted,
    /// Host name could not be resolved (`ENOTFOUND`).
    DnsFailure,
    /// Connection actively refused (`ECONNREFUSED`).
    ConnectionRefused,
    /// Deadline elapsed before a response arrived (`ETIMEDOUT`).
    Timeout,
    /// The far end answered with an error status (`HTTP_<status>`).
    Status(u16),
    /// Anything else, kept verbatim.
    Other(String),
}

impl ErrorCode {
    /// True for transport-level unreachability, the only failures failover can remedy.
    pub fn is_observable(&self) -> bool {
        matches!(
            self,
            ErrorCode::Network
                | ErrorCode::ConnectionAborted
                | ErrorCode::DnsFailure
                | ErrorCode::ConnectionRefused
                | ErrorCode::Timeout
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Network => f.write_str("ERR_NETWORK"),
            ErrorCode::ConnectionAborted => f.write_str("ECONNABORTED"),
            ErrorCode::DnsFailure => f.write_str("ENOTFOUND"),
            ErrorCode::ConnectionRefused => f.write_str("ECONNREFUSED"),
            ErrorCode::Timeout => f.write_str("ETIMEDOUT"),
            ErrorCode::Status(status) => write!(f, "HTTP_{}", status),
            ErrorCode::Other(code) => f.write_str(code),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = match s {
            "ERR_NETWORK" => ErrorCode::Network,
            "ECONNABORTED" | "ECONNRESET" => ErrorCode::ConnectionAborted,
            "ENOTFOUND" | "EAI_AGAIN" => ErrorCode::DnsFailure,
            "ECONNREFUSED" => ErrorCode::ConnectionRefused,
            "ETIMEDOUT" => ErrorCode::Timeout,
            other => match other.strip_prefix("HTTP_").and_then(|s| s.parse().ok()) {
                Some(status) => ErrorCode::Status(status),
                None => ErrorCode::Other(other.to_string()),
            },
        };
        Ok(code)
    }
}

/// A failed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct TransportError {
    pub code: ErrorCode,
    pub message: String,
}

impl TransportError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Everything needed to (re)issue a request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Set only on replays issued by the failover engine.
    pub attempt_id: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            attempt_id: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_attempt_id(mut self, attempt_id: impl Into<String>) -> Self {
        self.attempt_id = Some(attempt_id.into());
        self
    }
}

/// A response as seen by the caller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL the response came from.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// True for 4xx/5xx answers. These never confirm a failover attempt.
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observable_codes() {
        for code in ["ERR_NETWORK", "ECONNABORTED", "ENOTFOUND", "ECONNREFUSED", "ETIMEDOUT"] {
            let parsed: ErrorCode = code.parse().unwrap();
            assert!(parsed.is_observable(), "{} should be observable", code);
            assert_eq!(parsed.to_string(), code);
        }
    }

    #[test]
    fn test_status_codes_are_not_observable() {
        let code: ErrorCode = "HTTP_400".parse().unwrap();
        assert_eq!(code, ErrorCode::Status(400));
        assert!(!code.is_observable());

        let code: ErrorCode = "ERR_BAD_REQUEST".parse().unwrap();
        assert_eq!(code, ErrorCode::Other("ERR_BAD_REQUEST".into()));
        assert!(!code.is_observable());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::new(ErrorCode::ConnectionRefused, "connection refused");
        assert_eq!(err.to_string(), "ECONNREFUSED: connection refused");
    }

    #[test]
    fn test_descriptor_builders() {
        let req = RequestDescriptor::new(Method::POST, "https://a.example/x")
            .with_body(b"{}".to_vec())
            .with_attempt_id("abc");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
        assert_eq!(req.attempt_id.as_deref(), Some("abc"));
    }
}
