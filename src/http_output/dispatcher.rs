//! Single-record send orchestration.
//!
//! Each call to [`Dispatcher::send`] moves through
//! `RateCheck -> Building -> Sending` and ends in exactly one
//! [`SendOutcome`] or error:
//!
//! * a rate-limited record is skipped without touching the network;
//! * any HTTP status that is not 2xx is logged and never raised;
//! * a transport failure is always logged and raised only when
//!   `raise_on_error` is set.
//!
//! There are no retries. A record that fails or is skipped is dropped.

use super::config::Settings;
use super::connection::{ConnectionManager, Connector, HttpResponse};
use super::rate_limit::{RateLimiter, TimeProvider};
use super::request::{OutgoingRequest, RequestBuilder};
use crate::error::{OutputError, TransportError};
use crate::output_log::SharedLogger;
use crate::record::Record;

/// Longest response body excerpt included in failure logs, in bytes.
pub const MAX_BODY_SNIPPET: usize = 1024;

/// Terminal state of a single send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Suppressed by the rate limiter; no request was made.
    Skipped,
    /// The endpoint answered with a 2xx status.
    Delivered { status: u16 },
    /// The endpoint answered with any other status.
    Rejected { status: u16 },
    /// The exchange failed and the error was swallowed.
    TransportFailed,
}

/// Sends records one at a time according to [`Settings`].
pub struct Dispatcher {
    settings: Settings,
    builder: RequestBuilder,
    limiter: RateLimiter,
    connections: ConnectionManager,
    logger: SharedLogger,
}

impl Dispatcher {
    pub fn new(
        settings: Settings,
        connector: Box<dyn Connector>,
        time_provider: TimeProvider,
        logger: SharedLogger,
    ) -> Self {
        let builder = RequestBuilder::from_settings(&settings);
        let limiter = RateLimiter::new(settings.rate_limit_msec, time_provider);
        let connections = ConnectionManager::new(
            settings.endpoint.clone(),
            settings.reuse_limit,
            connector,
            logger.clone(),
        );
        Self {
            settings,
            builder,
            limiter,
            connections,
            logger,
        }
    }

    /// Replace the request builder, e.g. to install a custom strategy.
    pub fn with_builder(mut self, builder: RequestBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Send one record.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Serialize`] if the record cannot be encoded, and
    /// [`OutputError::Transport`] for transport failures when
    /// `raise_on_error` is enabled.
    pub fn send(&mut self, record: &Record) -> Result<SendOutcome, OutputError> {
        if !self.limiter.should_send(self.limiter.now()) {
            self.logger.info(&format!(
                "dropped record tagged '{}' due to rate limiting",
                record.tag
            ));
            return Ok(SendOutcome::Skipped);
        }

        let mut request = self.builder.build(record)?;
        if let Some(credentials) = self.settings.basic_credentials() {
            request.basic_auth(&credentials.username, credentials.password.expose());
        }

        // Recorded before the exchange so failed attempts also count.
        self.limiter.record_attempt(self.limiter.now());

        match self.exchange(&request) {
            Ok(response) => Ok(self.classify(&request, &response)),
            Err(err) => self.transport_failure(&request, err),
        }
    }

    fn exchange(&mut self, request: &OutgoingRequest) -> Result<HttpResponse, TransportError> {
        self.connections.acquire()?.send(request)
    }

    fn classify(&self, request: &OutgoingRequest, response: &HttpResponse) -> SendOutcome {
        if response.is_success() {
            return SendOutcome::Delivered {
                status: response.status,
            };
        }
        self.logger.warn(&format!(
            "failed to {} {} ({} {} {})",
            request.method,
            self.settings.endpoint.target(&request.path),
            response.status,
            response.reason,
            body_snippet(&response.body)
        ));
        SendOutcome::Rejected {
            status: response.status,
        }
    }

    fn transport_failure(
        &self,
        request: &OutgoingRequest,
        err: TransportError,
    ) -> Result<SendOutcome, OutputError> {
        self.logger.warn(&format!(
            "{} request raised {}: '{}'",
            request.method,
            err.kind(),
            err
        ));
        if self.settings.raise_on_error {
            return Err(err.into());
        }
        Ok(SendOutcome::TransportFailed)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Finish the live connection, if any.
    pub fn close(&mut self) {
        self.connections.close();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("settings", &self.settings)
            .field("builder", &self.builder)
            .field("limiter", &self.limiter)
            .field("connections", &self.connections)
            .finish()
    }
}

/// Trimmed prefix of `body`, cut on a character boundary.
fn body_snippet(body: &str) -> &str {
    let body = body.trim();
    if body.len() <= MAX_BODY_SNIPPET {
        return body;
    }
    let mut end = MAX_BODY_SNIPPET;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
