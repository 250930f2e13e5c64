// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::format::{LineFormatter, LineType, SampleType};
use crate::label::Label;
use crate::sinks::{MetricSink, SinkStats};
use crate::types::MetricError;

/// Callback receiving errors that emission swallows.
pub type ErrorHandler = Arc<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>;

/// The operations a `Client` needs from whatever actually transmits metrics.
///
/// None of these operations report failure: emission is best effort and
/// must never fail application code. Implementations decide what to do
/// with transport errors.
///
/// Implementations must tolerate being called from many threads at once.
pub trait MetricBackend {
    /// Add `delta` to the counter `name`.
    fn incr_counter(&self, name: &str, delta: f32, labels: &[Label<'_>]);

    /// Set the gauge `name` to `value`.
    fn set_gauge(&self, name: &str, value: f32, labels: &[Label<'_>]);

    /// Record `value` as a sample of the distribution `name`.
    fn add_sample(&self, name: &str, value: f32, labels: &[Label<'_>]);

    /// Flush anything buffered. Called when the owning client is closed.
    fn shutdown(&self);
}

/// `MetricBackend` that encodes every call as a Statsd line and writes it
/// to a `MetricSink`.
///
/// Labels are encoded as a Datadog style tag block, `|#k:v,k2`. Errors
/// from the sink are passed to the error handler, which by default logs
/// them at `warn` level at most once every 64 seconds.
///
/// # Example
///
/// ```
/// use typed_statsd::{Label, MetricBackend, SpyMetricSink, StatsdBackend};
///
/// let (rx, sink) = SpyMetricSink::new();
/// let backend = StatsdBackend::from_sink(sink);
///
/// backend.incr_counter("jobs.failed", 1.0, &[Label::new("env", "prod")]);
/// assert_eq!("jobs.failed:1|c|#env:prod", rx.recv().unwrap());
/// ```
pub struct StatsdBackend {
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    sample_type: SampleType,
    errors: ErrorHandler,
}

impl StatsdBackend {
    pub fn from_sink<T>(sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdBackend {
            sink: Box::new(sink),
            sample_type: SampleType::default(),
            errors: log_error_handler(),
        }
    }

    /// Statsd type used for samples. Defaults to `SampleType::Timer`.
    pub fn with_sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    pub fn with_error_handler(mut self, errors: ErrorHandler) -> Self {
        self.errors = errors;
        self
    }

    /// I/O telemetry of the underlying sink.
    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }

    fn send(&self, name: &str, value: f32, type_: LineType, labels: &[Label<'_>]) {
        let line = LineFormatter::new(name, value, type_, labels).format();
        if let Err(e) = self.sink.emit(&line) {
            (self.errors)(MetricError::from(e));
        }
    }
}

impl MetricBackend for StatsdBackend {
    fn incr_counter(&self, name: &str, delta: f32, labels: &[Label<'_>]) {
        self.send(name, delta, LineType::Counter, labels);
    }

    fn set_gauge(&self, name: &str, value: f32, labels: &[Label<'_>]) {
        self.send(name, value, LineType::Gauge, labels);
    }

    fn add_sample(&self, name: &str, value: f32, labels: &[Label<'_>]) {
        self.send(name, value, LineType::Sample(self.sample_type), labels);
    }

    fn shutdown(&self) {
        if let Err(e) = self.sink.flush() {
            (self.errors)(MetricError::from(e));
        }
    }
}

impl fmt::Debug for StatsdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdBackend {{ sink: ..., sample_type: {:?}, errors: ... }}",
            self.sample_type
        )
    }
}

/// Error handler that logs at `warn` level, at most once per 64 second
/// window, so a sink that is down does not flood the log.
pub fn log_error_handler() -> ErrorHandler {
    let window = ReportWindow::new();
    Arc::new(move |err: MetricError| {
        if window.should_report() {
            warn!("sending metrics error: {}", err);
        }
    })
}

#[derive(Debug)]
struct ReportWindow {
    created: Instant,
    last: AtomicU64,
}

impl ReportWindow {
    const SHIFT: u32 = 6; // 64s

    fn new() -> Self {
        ReportWindow {
            created: Instant::now(),
            last: AtomicU64::new(0),
        }
    }

    fn should_report(&self) -> bool {
        let slot = (self.created.elapsed().as_secs() >> Self::SHIFT) + 1;
        self.last.swap(slot, Ordering::AcqRel) != slot
    }
}

/// `MetricBackend` that discards everything.
#[derive(Debug, Clone, Default)]
pub struct NopBackend;

impl MetricBackend for NopBackend {
    fn incr_counter(&self, _name: &str, _delta: f32, _labels: &[Label<'_>]) {}

    fn set_gauge(&self, _name: &str, _value: f32, _labels: &[Label<'_>]) {}

    fn add_sample(&self, _name: &str, _value: f32, _labels: &[Label<'_>]) {}

    fn shutdown(&self) {}
}

/// A single call recorded by a `SpyBackend`. Labels are kept as owned
/// `(name, value)` pairs in the order they were passed.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    IncrCounter {
        name: String,
        delta: f32,
        labels: Vec<(String, String)>,
    },
    SetGauge {
        name: String,
        value: f32,
        labels: Vec<(String, String)>,
    },
    AddSample {
        name: String,
        value: f32,
        labels: Vec<(String, String)>,
    },
    Shutdown,
}

/// `MetricBackend` that records every call to the `Sender` half of a
/// channel while the caller keeps the `Receiver` half.
///
/// Meant for asserting the exact calls a client makes during tests.
#[derive(Debug, Clone)]
pub struct SpyBackend {
    sender: Sender<BackendCall>,
}

impl SpyBackend {
    pub fn new() -> (Receiver<BackendCall>, Self) {
        let (tx, rx) = unbounded();
        (rx, SpyBackend { sender: tx })
    }

    fn record(&self, call: BackendCall) {
        // Nobody listening any more is not an error for a spy.
        let _ = self.sender.send(call);
    }
}

fn owned_labels(labels: &[Label<'_>]) -> Vec<(String, String)> {
    labels
        .iter()
        .map(|l| (l.name.to_string(), l.value.to_string()))
        .collect()
}

impl MetricBackend for SpyBackend {
    fn incr_counter(&self, name: &str, delta: f32, labels: &[Label<'_>]) {
        self.record(BackendCall::IncrCounter {
            name: name.to_string(),
            delta,
            labels: owned_labels(labels),
        });
    }

    fn set_gauge(&self, name: &str, value: f32, labels: &[Label<'_>]) {
        self.record(BackendCall::SetGauge {
            name: name.to_string(),
            value,
            labels: owned_labels(labels),
        });
    }

    fn add_sample(&self, name: &str, value: f32, labels: &[Label<'_>]) {
        self.record(BackendCall::AddSample {
            name: name.to_string(),
            value,
            labels: owned_labels(labels),
        });
    }

    fn shutdown(&self) {
        self.record(BackendCall::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendCall, MetricBackend, NopBackend, ReportWindow, SpyBackend, StatsdBackend};
    use crate::format::SampleType;
    use crate::label::Label;
    use crate::sinks::{BufferedSpyMetricSink, MetricSink, SpyMetricSink};
    use crate::types::{ErrorKind, MetricError};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ErrorSink;

    impl MetricSink for ErrorSink {
        fn emit(&self, _metric: &str) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::WouldBlock))
        }

        fn flush(&self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_statsd_backend_counter() {
        let (rx, sink) = SpyMetricSink::new();
        let backend = StatsdBackend::from_sink(sink);

        backend.incr_counter("jobs.failed", 1.0, &[Label::new("env", "prod"), Label::new("job", "x")]);

        assert_eq!("jobs.failed:1|c|#env:prod,job:x", rx.recv().unwrap());
    }

    #[test]
    fn test_statsd_backend_gauge_no_labels() {
        let (rx, sink) = SpyMetricSink::new();
        let backend = StatsdBackend::from_sink(sink);

        backend.set_gauge("queue.depth", 12.5, &[]);

        assert_eq!("queue.depth:12.5|g", rx.recv().unwrap());
    }

    #[test]
    fn test_statsd_backend_sample_types() {
        let (rx, sink) = SpyMetricSink::new();
        let timer = StatsdBackend::from_sink(sink);
        timer.add_sample("db.query", 42.0, &[]);
        assert_eq!("db.query:42|ms", rx.recv().unwrap());

        let (rx, sink) = SpyMetricSink::new();
        let dist = StatsdBackend::from_sink(sink).with_sample_type(SampleType::Distribution);
        dist.add_sample("payload.bytes", 300.0, &[]);
        assert_eq!("payload.bytes:300|d", rx.recv().unwrap());
    }

    #[test]
    fn test_statsd_backend_shutdown_flushes() {
        let (rx, sink) = BufferedSpyMetricSink::with_capacity(None, 512);
        let backend = StatsdBackend::from_sink(sink);

        backend.incr_counter("a", 1.0, &[]);
        backend.incr_counter("b", 2.0, &[]);
        assert!(rx.try_recv().is_err());

        backend.shutdown();
        assert_eq!("a:1|c\nb:2|c\n", rx.try_recv().unwrap());
    }

    #[test]
    fn test_statsd_backend_errors_go_to_handler() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_ref = count.clone();
        let backend = StatsdBackend::from_sink(ErrorSink).with_error_handler(Arc::new(move |err: MetricError| {
            assert_eq!(ErrorKind::IoError, err.kind());
            count_ref.fetch_add(1, Ordering::Release);
        }));

        backend.incr_counter("a", 1.0, &[]);
        backend.set_gauge("b", 1.0, &[]);
        backend.shutdown();

        assert_eq!(3, count.load(Ordering::Acquire));
    }

    #[test]
    fn test_statsd_backend_default_handler_swallows_errors() {
        let backend = StatsdBackend::from_sink(ErrorSink);
        backend.add_sample("a", 1.0, &[]);
        backend.shutdown();
    }

    #[test]
    fn test_report_window_once_per_window() {
        let window = ReportWindow::new();

        assert!(window.should_report());
        assert!(!window.should_report());
        assert!(!window.should_report());
    }

    #[test]
    fn test_spy_backend_records_calls() {
        let (rx, spy) = SpyBackend::new();

        spy.incr_counter("a", 2.0, &[Label::new("k", "")]);
        spy.set_gauge("b", 0.5, &[]);
        spy.add_sample("c", 7.0, &[Label::new("x", "y")]);
        spy.shutdown();

        let calls: Vec<BackendCall> = rx.try_iter().collect();
        assert_eq!(
            vec![
                BackendCall::IncrCounter {
                    name: "a".to_string(),
                    delta: 2.0,
                    labels: vec![("k".to_string(), String::new())],
                },
                BackendCall::SetGauge {
                    name: "b".to_string(),
                    value: 0.5,
                    labels: vec![],
                },
                BackendCall::AddSample {
                    name: "c".to_string(),
                    value: 7.0,
                    labels: vec![("x".to_string(), "y".to_string())],
                },
                BackendCall::Shutdown,
            ],
            calls
        );
    }

    #[test]
    fn test_nop_backend() {
        let nop = NopBackend;
        nop.incr_counter("a", 1.0, &[]);
        nop.shutdown();
    }
}
