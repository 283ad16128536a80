//! Drives the dispatcher over a batch of records.

use super::dispatcher::{Dispatcher, SendOutcome};
use crate::error::OutputError;
use crate::record::Record;

/// Downstream continuation signalled once a batch has been processed.
pub trait Chain {
    fn next(&mut self);
}

/// A chain with nothing downstream.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChain;

impl Chain for NullChain {
    fn next(&mut self) {}
}

impl<F: FnMut()> Chain for F {
    fn next(&mut self) {
        self()
    }
}

/// Counts of send outcomes for one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmissionSummary {
    pub delivered: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub transport_failed: usize,
}

impl EmissionSummary {
    fn tally(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Delivered { .. } => self.delivered += 1,
            SendOutcome::Rejected { .. } => self.rejected += 1,
            SendOutcome::Skipped => self.skipped += 1,
            SendOutcome::TransportFailed => self.transport_failed += 1,
        }
    }

    /// Total records processed.
    pub fn total(&self) -> usize {
        self.delivered + self.rejected + self.skipped + self.transport_failed
    }
}

/// Sequentially hands each record of a batch to the [`Dispatcher`].
#[derive(Debug)]
pub struct EmissionLoop {
    dispatcher: Dispatcher,
}

impl EmissionLoop {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Send every record in order, then call `chain.next()`.
    ///
    /// Records are not buffered; each is sent before the next is pulled from
    /// the iterator.
    ///
    /// # Errors
    ///
    /// Stops at the first error returned by the dispatcher and propagates it
    /// without signalling the chain.
    pub fn run<I, C>(&mut self, records: I, chain: &mut C) -> Result<EmissionSummary, OutputError>
    where
        I: IntoIterator<Item = Record>,
        C: Chain + ?Sized,
    {
        let mut summary = EmissionSummary::default();
        for record in records {
            summary.tally(self.dispatcher.send(&record)?);
        }
        chain.next();
        Ok(summary)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_output::config::Settings;
    use crate::test_utils::{CollectingLogger, ManualClock, Outcome, ScriptedConnector};

    fn emission(raise: bool, connector: &ScriptedConnector) -> EmissionLoop {
        let settings = Settings::builder("http://127.0.0.1:9880/in")
            .with_raise_on_error(raise)
            .build()
            .expect("settings");
        EmissionLoop::new(Dispatcher::new(
            settings,
            Box::new(connector.clone()),
            ManualClock::at(0.0).provider(),
            CollectingLogger::shared(),
        ))
    }

    fn batch(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::from_pairs("batch", [("seq", i.to_string())]))
            .collect()
    }

    #[test]
    fn sends_in_order_then_signals_chain() {
        let connector = ScriptedConnector::ok();
        let mut emission = emission(true, &connector);
        let mut calls = 0;
        let summary = emission
            .run(batch(3), &mut || calls += 1)
            .expect("run");
        assert_eq!(calls, 1);
        assert_eq!(summary.delivered, 3);
        let bodies: Vec<String> = connector.sent().iter().map(|s| s.request.body_text()).collect();
        assert_eq!(bodies, vec!["seq=0", "seq=1", "seq=2"]);
    }

    #[test]
    fn raised_error_stops_before_chain() {
        let connector = ScriptedConnector::ok();
        connector.push(Outcome::status(200));
        connector.push(Outcome::fail("ConnectionFailed", "reset"));
        let mut emission = emission(true, &connector);
        let mut calls = 0;
        let result = emission.run(batch(3), &mut || calls += 1);
        assert!(result.is_err());
        assert_eq!(calls, 0);
        assert_eq!(connector.sent_count(), 2);
    }

    #[test]
    fn swallowed_error_continues_batch() {
        let connector = ScriptedConnector::ok();
        connector.push(Outcome::fail("ConnectionFailed", "reset"));
        connector.push(Outcome::status(404));
        let mut emission = emission(false, &connector);
        let mut calls = 0;
        let summary = emission.run(batch(3), &mut || calls += 1).expect("run");
        assert_eq!(calls, 1);
        assert_eq!(
            summary,
            EmissionSummary {
                delivered: 1,
                rejected: 1,
                skipped: 0,
                transport_failed: 1,
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn empty_batch_still_signals_chain() {
        let connector = ScriptedConnector::ok();
        let mut emission = emission(true, &connector);
        let summary = emission.run(Vec::new(), &mut NullChain).expect("run");
        assert_eq!(summary.total(), 0);
        assert_eq!(connector.connects(), 0);
    }
}
