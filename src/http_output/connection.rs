//! Connection lifecycle for the endpoint.
//!
//! [`ConnectionManager`] owns at most one [`Connection`] at a time. A
//! connection is opened lazily, reused while its request count is below the
//! reuse limit, and finished before its replacement is opened. The actual
//! session is produced by a [`Connector`]; [`UreqConnector`] is the production
//! implementation and keeps a single pooled socket per session.

use std::sync::Arc;

use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder};

use super::config::Endpoint;
use super::request::OutgoingRequest;
use crate::error::TransportError;
use crate::output_log::SharedLogger;

/// Content type sent when a request carries a body but names no type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An HTTP response as observed by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase from the status line.
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx class.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A live network session bound to the endpoint.
pub trait Session: Send {
    /// Perform one request/response exchange.
    ///
    /// Any HTTP status is a successful exchange; only failures to complete the
    /// exchange are errors.
    fn exchange(&mut self, request: &OutgoingRequest) -> Result<HttpResponse, TransportError>;

    /// Release the session's resources.
    fn finish(&mut self) {}
}

/// Opens sessions to an endpoint.
pub trait Connector: Send + Sync {
    /// Open a new session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the session cannot be established.
    fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Session>, TransportError>;
}

/// A session plus the number of requests sent over it.
pub struct Connection {
    id: u64,
    session: Box<dyn Session>,
    requests: u64,
}

impl Connection {
    fn new(id: u64, session: Box<dyn Session>) -> Self {
        Self {
            id,
            session,
            requests: 0,
        }
    }

    /// Sequence number assigned by the manager, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Requests completed over this connection.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Send a request, counting it once the exchange completes.
    pub fn send(&mut self, request: &OutgoingRequest) -> Result<HttpResponse, TransportError> {
        let response = self.session.exchange(request)?;
        self.requests += 1;
        Ok(response)
    }

    fn finish(&mut self) {
        self.session.finish();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("requests", &self.requests)
            .finish()
    }
}

/// Owns the single connection to the endpoint and decides when to renew it.
pub struct ConnectionManager {
    endpoint: Endpoint,
    reuse_limit: u64,
    connector: Box<dyn Connector>,
    current: Option<Connection>,
    opened: u64,
    logger: SharedLogger,
}

impl ConnectionManager {
    pub fn new(
        endpoint: Endpoint,
        reuse_limit: u64,
        connector: Box<dyn Connector>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            endpoint,
            reuse_limit,
            connector,
            current: None,
            opened: 0,
            logger,
        }
    }

    /// Return a connection that may carry another request.
    ///
    /// Opens one if none exists, and finishes and replaces the current one
    /// once its request count has reached the reuse limit.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if a new session cannot be opened.
    pub fn acquire(&mut self) -> Result<&mut Connection, TransportError> {
        let exhausted = self
            .current
            .as_ref()
            .is_some_and(|conn| conn.request_count() >= self.reuse_limit);
        if exhausted && let Some(mut old) = self.current.take() {
            self.logger.debug(&format!(
                "renewing connection #{} to {}:{} after {} requests",
                old.id(),
                self.endpoint.host(),
                self.endpoint.port(),
                old.request_count()
            ));
            old.finish();
        }
        if self.current.is_none() {
            let conn = self.open()?;
            self.current = Some(conn);
        }
        self.current
            .as_mut()
            .ok_or_else(|| TransportError::connect("connection unavailable"))
    }

    fn open(&mut self) -> Result<Connection, TransportError> {
        let session = self.connector.connect(&self.endpoint)?;
        self.opened += 1;
        self.logger.debug(&format!(
            "opened connection #{} to {}:{} (tls={})",
            self.opened,
            self.endpoint.host(),
            self.endpoint.port(),
            self.endpoint.is_secure()
        ));
        Ok(Connection::new(self.opened, session))
    }

    /// Finish the current connection, if any.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.current.take() {
            conn.finish();
            self.logger.debug(&format!("closed connection #{}", conn.id()));
        }
    }

    /// The connection currently held, if any.
    pub fn current(&self) -> Option<&Connection> {
        self.current.as_ref()
    }

    /// Number of connections opened so far.
    pub fn opened(&self) -> u64 {
        self.opened
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.endpoint.origin())
            .field("reuse_limit", &self.reuse_limit)
            .field("current", &self.current)
            .field("opened", &self.opened)
            .finish()
    }
}

/// Opens sessions backed by a `ureq` agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct UreqConnector {
    /// Skip certificate and hostname validation for HTTPS endpoints.
    pub ssl_no_verify: bool,
}

impl UreqConnector {
    pub fn new(ssl_no_verify: bool) -> Self {
        Self { ssl_no_verify }
    }

    fn tls_connector(&self) -> Result<TlsConnector, TransportError> {
        let mut builder = TlsConnector::builder();
        if self.ssl_no_verify {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        builder
            .build()
            .map_err(|err| TransportError::connect(format!("TLS setup failed: {err}")))
    }
}

impl Connector for UreqConnector {
    fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Session>, TransportError> {
        // A 3xx is classified like any other non-2xx status, never followed.
        let mut builder = AgentBuilder::new()
            .redirects(0)
            .max_idle_connections(1)
            .max_idle_connections_per_host(1);
        if endpoint.is_secure() {
            builder = builder.tls_connector(Arc::new(self.tls_connector()?));
        }
        Ok(Box::new(UreqSession {
            agent: Some(builder.build()),
            origin: endpoint.origin(),
        }))
    }
}

struct UreqSession {
    agent: Option<Agent>,
    origin: String,
}

impl UreqSession {
    fn prepare(&self, agent: &Agent, request: &OutgoingRequest) -> ureq::Request {
        let url = format!("{}{}", self.origin, request.path);
        let mut req = agent.request(request.method.as_str(), &url);
        let content_type = request
            .content_type
            .as_deref()
            .or((!request.body.is_empty()).then_some(DEFAULT_CONTENT_TYPE));
        if let Some(content_type) = content_type {
            req = req.set("Content-Type", content_type);
        }
        if let Some(auth) = &request.authorization {
            req = req.set("Authorization", auth);
        }
        for (key, value) in &request.headers {
            req = req.set(key, value);
        }
        req
    }
}

impl Session for UreqSession {
    fn exchange(&mut self, request: &OutgoingRequest) -> Result<HttpResponse, TransportError> {
        let Some(agent) = self.agent.as_ref() else {
            return Err(TransportError::connect("session already finished"));
        };
        let response = match self.prepare(agent, request).send_bytes(&request.body) {
            Ok(response) => response,
            // Non-2xx statuses are reported by ureq as errors but still carry a response.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::request(
                    format!("{:?}", err.kind()),
                    err.to_string(),
                ));
            }
        };
        let status = response.status();
        let reason = response.status_text().to_owned();
        let body = response.into_string()?;
        Ok(HttpResponse {
            status,
            reason,
            body,
        })
    }

    fn finish(&mut self) {
        self.agent = None;
    }
}
