//! Connector that replays scripted outcomes instead of touching the network.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::http_output::{Connector, Endpoint, HttpResponse, OutgoingRequest, Session};

/// Result of a single scripted exchange.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Complete the exchange with this status, reason and body.
    Respond {
        status: u16,
        reason: String,
        body: String,
    },
    /// Fail the exchange with a transport error.
    Fail { kind: String, message: String },
}

impl Outcome {
    pub fn status(status: u16) -> Self {
        Self::Respond {
            status,
            reason: reason_phrase(status).to_owned(),
            body: String::new(),
        }
    }

    pub fn status_with_body(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            reason: reason_phrase(status).to_owned(),
            body: body.to_owned(),
        }
    }

    pub fn fail(kind: &str, message: &str) -> Self {
        Self::Fail {
            kind: kind.to_owned(),
            message: message.to_owned(),
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A request observed by the connector, tagged with the connection it used.
#[derive(Clone, Debug)]
pub struct SentRequest {
    pub connection: u64,
    pub request: OutgoingRequest,
}

struct ScriptState {
    connects: u64,
    finished: u64,
    refuse: Option<String>,
    script: VecDeque<Outcome>,
    fallback: Outcome,
    sent: Vec<SentRequest>,
}

/// Connector replaying queued outcomes, then a fallback outcome.
#[derive(Clone)]
pub struct ScriptedConnector {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedConnector {
    fn with_fallback(fallback: Outcome) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                connects: 0,
                finished: 0,
                refuse: None,
                script: VecDeque::new(),
                fallback,
                sent: Vec::new(),
            })),
        }
    }

    /// Every exchange answers 200 OK.
    pub fn ok() -> Self {
        Self::with_fallback(Outcome::status(200))
    }

    /// Every exchange answers with `status`.
    pub fn responding(status: u16) -> Self {
        Self::with_fallback(Outcome::status(status))
    }

    /// Every exchange fails with a transport error.
    pub fn failing_exchange(kind: &str, message: &str) -> Self {
        Self::with_fallback(Outcome::fail(kind, message))
    }

    /// Sessions cannot be opened at all.
    pub fn refusing(message: &str) -> Self {
        let connector = Self::ok();
        connector.state.lock().refuse = Some(message.to_owned());
        connector
    }

    /// Queue an outcome ahead of the fallback.
    pub fn push(&self, outcome: Outcome) -> &Self {
        self.state.lock().script.push_back(outcome);
        self
    }

    /// Number of sessions opened.
    pub fn connects(&self) -> u64 {
        self.state.lock().connects
    }

    /// Number of sessions finished.
    pub fn finished(&self) -> u64 {
        self.state.lock().finished
    }

    /// Requests that reached a session, successful or not.
    pub fn sent(&self) -> Vec<SentRequest> {
        self.state.lock().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.state.lock().sent.len()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, _endpoint: &Endpoint) -> Result<Box<dyn Session>, TransportError> {
        let mut state = self.state.lock();
        if let Some(message) = &state.refuse {
            return Err(TransportError::connect(message.clone()));
        }
        state.connects += 1;
        Ok(Box::new(ScriptedSession {
            state: Arc::clone(&self.state),
            connection: state.connects,
        }))
    }
}

struct ScriptedSession {
    state: Arc<Mutex<ScriptState>>,
    connection: u64,
}

impl Session for ScriptedSession {
    fn exchange(&mut self, request: &OutgoingRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock();
        state.sent.push(SentRequest {
            connection: self.connection,
            request: request.clone(),
        });
        let next = state.script.pop_front();
        let outcome = match next {
            Some(outcome) => outcome,
            None => state.fallback.clone(),
        };
        match outcome {
            Outcome::Respond {
                status,
                reason,
                body,
            } => Ok(HttpResponse {
                status,
                reason,
                body,
            }),
            Outcome::Fail { kind, message } => Err(TransportError::request(kind, message)),
        }
    }

    fn finish(&mut self) {
        self.state.lock().finished += 1;
    }
}
