//! Logging interface injected into the dispatcher and connection manager.
//!
//! Components never reach for a global logger directly. They receive an
//! [`OutputLogger`] and the default [`FacadeLogger`] forwards to the `log`
//! facade, leaving subscriber setup to the host process. Messages passed in
//! here are already redacted: credentials only ever travel inside
//! [`Secret`](crate::http_output::Secret), whose formatting hides the value.

use std::sync::Arc;

use log::{debug, info, warn};

/// Target used for all facade log lines emitted by this crate.
pub const LOG_TARGET: &str = "out_http";

/// Sink for diagnostic messages produced while sending records.
pub trait OutputLogger: Send + Sync {
    /// Record a low-volume lifecycle detail.
    fn debug(&self, message: &str);
    /// Record an informational event such as a rate-limited drop.
    fn info(&self, message: &str);
    /// Record a failed exchange.
    fn warn(&self, message: &str);
}

/// Shared handle passed between components.
pub type SharedLogger = Arc<dyn OutputLogger>;

/// Forwards messages to the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FacadeLogger;

impl FacadeLogger {
    /// Create a shareable facade logger.
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl OutputLogger for FacadeLogger {
    fn debug(&self, message: &str) {
        debug!(target: LOG_TARGET, "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: LOG_TARGET, "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: LOG_TARGET, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtest::Logger;
    use serial_test::serial;

    #[test]
    #[serial]
    fn facade_logger_forwards_levels() {
        let mut logger = Logger::start();
        let facade = FacadeLogger;
        facade.info("dropped request");
        facade.warn("request failed");

        let captured: Vec<_> = std::iter::from_fn(|| logger.pop()).collect();
        let info = captured
            .iter()
            .find(|r| r.args().contains("dropped request"))
            .expect("info log");
        assert_eq!(info.level(), log::Level::Info);
        assert_eq!(info.target(), LOG_TARGET);

        let warn = captured
            .iter()
            .find(|r| r.args().contains("request failed"))
            .expect("warn log");
        assert_eq!(warn.level(), log::Level::Warn);
    }
}
