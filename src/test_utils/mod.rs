//! Helpers shared by unit tests and, via the `test-util` feature, by the
//! integration tests under `tests/`.
//!
//! Nothing here touches the network: [`ScriptedConnector`] stands in for the
//! endpoint and [`ManualClock`] replaces the system clock.

pub mod collecting_logger;
pub mod manual_clock;
pub mod scripted_connector;

pub use collecting_logger::CollectingLogger;
pub use manual_clock::ManualClock;
pub use scripted_connector::{Outcome, ScriptedConnector, SentRequest};
