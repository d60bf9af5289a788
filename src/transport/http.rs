//! reqwest-backed transport.
//!
//! # Responsibilities
//! - Issue requests with the configured connect/request timeouts
//! - Buffer the response body
//! - Map reqwest failures onto [`ErrorCode`]s
//!
//! # Design Decisions
//! - 4xx/5xx answers come back as `ErrorCode::Status`, which never triggers failover
//! - Classification walks the error source chain for the underlying `io::Error`

use async_trait::async_trait;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::transport::types::{
    ErrorCode, HttpResponse, RequestDescriptor, TransportError, ATTEMPT_ID_HEADER,
};
use crate::transport::Transport;

/// Transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honoring the configured timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()
            .map_err(|e| TransportError::new(ErrorCode::Other("ERR_CLIENT_BUILD".into()), e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        if let Some(attempt_id) = &request.attempt_id {
            builder = builder.header(ATTEMPT_ID_HEADER, attempt_id.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify_reqwest_error)?;
        let status_error = response.error_for_status_ref().err();
        if let Some(e) = status_error {
            let mut error = classify_reqwest_error(e);
            let body = response.text().await.unwrap_or_default();
            if !body.is_empty() {
                error.message = format!("{}: {}", error.message, body.trim());
            }
            tracing::trace!(code = %error.code, "Exchange answered with an error status");
            return Err(error);
        }

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(classify_reqwest_error)?
            .to_vec();

        tracing::trace!(url = %url, status, "Exchange completed");

        Ok(HttpResponse {
            status,
            url,
            headers,
            body,
        })
    }
}

/// Map a reqwest error onto a transport error code.
pub fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    let code = if error.is_timeout() {
        ErrorCode::Timeout
    } else if error.is_connect() {
        if is_dns_failure(&error) {
            ErrorCode::DnsFailure
        } else {
            io_error_code(&error).unwrap_or(ErrorCode::ConnectionRefused)
        }
    } else if error.is_status() {
        ErrorCode::Status(error.status().map(|s| s.as_u16()).unwrap_or_default())
    } else if error.is_request() || error.is_body() {
        io_error_code(&error).unwrap_or(ErrorCode::Network)
    } else if error.is_builder() {
        ErrorCode::Other("ERR_INVALID_URL".into())
    } else {
        ErrorCode::Other("ERR_UNKNOWN".into())
    };

    TransportError::new(code, error.to_string())
}

fn io_error_code(error: &(dyn StdError + 'static)) -> Option<ErrorCode> {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return match io_err.kind() {
                io::ErrorKind::ConnectionRefused => Some(ErrorCode::ConnectionRefused),
                io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof => Some(ErrorCode::ConnectionAborted),
                io::ErrorKind::TimedOut => Some(ErrorCode::Timeout),
                _ => Some(ErrorCode::Network),
            };
        }
        source = err.source();
    }
    None
}

fn is_dns_failure(error: &(dyn StdError + 'static)) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = source {
        let message = err.to_string().to_ascii_lowercase();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = err.source();
    }
    false
}
