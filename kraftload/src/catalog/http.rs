//! HTTP client abstraction for testability.

use std::io::{Read, Write};
use std::time::Duration;

use thiserror::Error;

/// Default timeout for remote store requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Buffer size for streaming response bodies (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Errors returned by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The request exceeded the client timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The response body could not be written to its destination.
    #[error("failed to write body of {url}: {reason}")]
    WriteFailed { url: String, reason: String },

    /// The HTTP client itself could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl HttpError {
    /// Whether this is a "not found" answer from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Trait for HTTP client operations.
///
/// Every remote read in this crate goes through this trait so that the
/// catalog, downloader and documentation fetch can be exercised against
/// in-memory fakes.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the full body.
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError>;

    /// Performs an HTTP GET request and streams the body into `sink`.
    ///
    /// Returns the number of bytes written. The default implementation
    /// buffers the whole body via [`get`](Self::get).
    fn download_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64, HttpError> {
        let body = self.get(url)?;
        sink.write_all(&body).map_err(|e| HttpError::WriteFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(body.len() as u64)
    }
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new client with a custom timeout.
    ///
    /// The timeout bounds the whole request including the body, so a stalled
    /// transfer cannot hold the lifecycle lock indefinitely.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kraftload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn send(&self, url: &str) -> Result<reqwest::blocking::Response, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    fn map_reqwest_error(&self, url: &str, e: reqwest::Error) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            HttpError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    fn map_read_error(&self, url: &str, e: std::io::Error) -> HttpError {
        if e.kind() == std::io::ErrorKind::TimedOut {
            HttpError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            HttpError::Transport {
                url: url.to_string(),
                reason: format!("read error: {}", e),
            }
        }
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let mut response = self.send(url)?;
        let mut body = Vec::new();
        response
            .read_to_end(&mut body)
            .map_err(|e| self.map_read_error(url, e))?;
        Ok(body)
    }

    fn download_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64, HttpError> {
        let mut response = self.send(url)?;
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut written = 0u64;

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| self.map_read_error(url, e))?;

            if bytes_read == 0 {
                break;
            }

            sink.write_all(&buffer[..bytes_read])
                .map_err(|e| HttpError::WriteFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            written += bytes_read as u64;
        }

        Ok(written)
    }
}
