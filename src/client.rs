// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use log::debug;
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{log_error_handler, ErrorHandler, MetricBackend, StatsdBackend};
use crate::format::SampleType;
use crate::label::merge_tags;
use crate::sinks::{
    bind_local, get_addr, BufferedUdpMetricSink, QueuingMetricSink, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_QUEUE_CAPACITY,
};
use crate::types::{ErrorKind, MetricError, MetricResult};

/// Port Statsd servers listen on by convention.
pub const DEFAULT_PORT: u16 = 8125;

/// Address metrics are sent to unless configured otherwise.
pub const DEFAULT_SINK_ADDRESS: &str = "127.0.0.1:8125";

/// Builder for creating and customizing `Client` instances.
///
/// Every option has a default, so `Client::builder().build()` is the same
/// as `Client::new()`: send to `127.0.0.1:8125` with no persistent tags.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use typed_statsd::Client;
///
/// let client = Client::builder()
///     .with_sink_address("statsd.internal:8125")
///     .with_persistent_tags(vec!["env:prod", "region:us-east"])
///     .with_flush_interval(Duration::from_millis(250))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ClientBuilder {
    sink_address: String,
    persistent_tags: Vec<String>,
    buffer_size: usize,
    queue_capacity: usize,
    flush_interval: Duration,
    sample_type: SampleType,
    errors: ErrorHandler,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        ClientBuilder {
            sink_address: DEFAULT_SINK_ADDRESS.to_string(),
            persistent_tags: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            sample_type: SampleType::default(),
            errors: log_error_handler(),
        }
    }
}

impl ClientBuilder {
    /// Set the `host:port` of the Statsd server metrics are sent to.
    ///
    /// The address is only parsed and resolved by `build()`.
    pub fn with_sink_address<A>(mut self, addr: A) -> Self
    where
        A: Into<String>,
    {
        self.sink_address = addr.into();
        self
    }

    /// Replace the tags attached to every metric emitted by the built
    /// client. Tags use the same `name` or `name:value` form as per-call tags.
    pub fn with_persistent_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.persistent_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Add a single tag attached to every metric emitted by the built client.
    pub fn with_persistent_tag<T>(mut self, tag: T) -> Self
    where
        T: Into<String>,
    {
        self.persistent_tags.push(tag.into());
        self
    }

    /// Largest datagram, in bytes, that metrics are packed into.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Number of metrics that may wait for the background thread before
    /// new ones are dropped.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// How often partially filled datagrams are sent.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Statsd type used for distribution and timing values. Defaults to
    /// `SampleType::Timer` (`|ms`); use `SampleType::Distribution` (`|d`)
    /// for servers that support Datadog distributions.
    pub fn with_sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    /// Set the handler for errors that emission would otherwise swallow.
    ///
    /// The handler is called from whichever thread hit the error and
    /// should consume it without panicking. The default logs the error at
    /// `warn` level, at most once a minute.
    pub fn with_error_handler<F>(mut self, errors: F) -> Self
    where
        F: Fn(MetricError) + Sync + Send + RefUnwindSafe + 'static,
    {
        self.errors = Arc::new(errors);
        self
    }

    /// Resolve the sink address and start sending metrics in the background.
    ///
    /// # Failures
    ///
    /// Fails with a `BackendInit` error if the sink address cannot be parsed
    /// or resolved, or if a local UDP socket cannot be bound.
    pub fn build(self) -> MetricResult<Client> {
        let addr = get_addr(self.sink_address.as_str()).map_err(|e| e.with_kind(ErrorKind::BackendInit))?;
        let socket = bind_local(&addr).map_err(|e| MetricError::from(e).with_kind(ErrorKind::BackendInit))?;
        let udp = BufferedUdpMetricSink::with_capacity(addr, socket, self.buffer_size)
            .map_err(|e| e.with_kind(ErrorKind::BackendInit))?;

        let queuing = QueuingMetricSink::builder()
            .with_capacity(self.queue_capacity)
            .with_flush_interval(self.flush_interval)
            .build(udp);

        let backend = StatsdBackend::from_sink(queuing)
            .with_sample_type(self.sample_type)
            .with_error_handler(Arc::clone(&self.errors));

        debug!(
            "sending metrics to {} ({}) with {} persistent tags",
            self.sink_address,
            addr,
            self.persistent_tags.len()
        );

        Ok(self.build_with_backend(backend))
    }

    /// Build a client that emits through `backend` instead of Statsd.
    ///
    /// Transport options (buffer size, queue, flush interval, sample type,
    /// error handler) are ignored. The sink address is kept for reporting
    /// only and is never resolved.
    pub fn build_with_backend<B>(self, backend: B) -> Client
    where
        B: MetricBackend + Sync + Send + RefUnwindSafe + 'static,
    {
        Client {
            sink_address: self.sink_address,
            persistent_tags: self.persistent_tags,
            backend: Box::new(backend),
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("sink_address", &self.sink_address)
            .field("persistent_tags", &self.persistent_tags)
            .field("buffer_size", &self.buffer_size)
            .field("queue_capacity", &self.queue_capacity)
            .field("flush_interval", &self.flush_interval)
            .field("sample_type", &self.sample_type)
            .finish()
    }
}

/// Handle for emitting metrics to a single sink.
///
/// A client owns its backend and the tags it attaches to every metric.
/// Neither changes after construction, so a client may be shared between
/// threads (behind an `Arc`, or as the process-wide default) and used
/// concurrently.
///
/// The methods here are untyped primitives. Most code should emit through
/// an [`Identifier`](crate::Identifier) with [`emit`](crate::emit()), which
/// picks the right primitive for the metric's kind.
///
/// Emission is best effort: none of the emitting methods report transport
/// failures to the caller. Those go to the error handler configured on the
/// builder.
///
/// # Example
///
/// ```
/// use typed_statsd::{BackendCall, Client, SpyBackend};
///
/// let (rx, spy) = SpyBackend::new();
/// let client = Client::builder()
///     .with_persistent_tag("env:prod")
///     .build_with_backend(spy);
///
/// client.count("jobs.failed", 1, &["job:x"]).unwrap();
///
/// assert_eq!(
///     BackendCall::IncrCounter {
///         name: "jobs.failed".to_string(),
///         delta: 1.0,
///         labels: vec![
///             ("env".to_string(), "prod".to_string()),
///             ("job".to_string(), "x".to_string()),
///         ],
///     },
///     rx.recv().unwrap()
/// );
/// ```
pub struct Client {
    sink_address: String,
    persistent_tags: Vec<String>,
    backend: Box<dyn MetricBackend + Sync + Send + RefUnwindSafe>,
}

impl Client {
    /// Start building a client. See `ClientBuilder` for the options.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Build a client with every option at its default.
    ///
    /// # Failures
    ///
    /// Fails with a `BackendInit` error if a local UDP socket cannot be bound.
    pub fn new() -> MetricResult<Client> {
        Self::builder().build()
    }

    pub fn sink_address(&self) -> &str {
        &self.sink_address
    }

    pub fn persistent_tags(&self) -> &[String] {
        &self.persistent_tags
    }

    /// Increment the counter `name` by `delta`.
    pub fn count(&self, name: &str, delta: i64, tags: &[&str]) -> MetricResult<()> {
        let labels = merge_tags(&self.persistent_tags, tags);
        self.backend.incr_counter(name, delta as f32, &labels);
        Ok(())
    }

    /// Set the gauge `name` to `value`.
    pub fn gauge(&self, name: &str, value: f32, tags: &[&str]) -> MetricResult<()> {
        let labels = merge_tags(&self.persistent_tags, tags);
        self.backend.set_gauge(name, value, &labels);
        Ok(())
    }

    /// Record `value` in the distribution `name`.
    pub fn distribution(&self, name: &str, value: f32, tags: &[&str]) -> MetricResult<()> {
        let labels = merge_tags(&self.persistent_tags, tags);
        self.backend.add_sample(name, value, &labels);
        Ok(())
    }

    /// Record `value` in the distribution `name`.
    ///
    /// The value sent is the number of nanoseconds in `value`, as an `f32`.
    /// It is not converted to milliseconds, so dashboards reading timings
    /// from this client must scale by 1e-6 themselves.
    pub fn timing(&self, name: &str, value: Duration, tags: &[&str]) -> MetricResult<()> {
        self.distribution(name, value.as_nanos() as f32, tags)
    }

    /// Flush anything the backend has buffered.
    ///
    /// Always returns `Ok`, but is not instant: with the default backend it
    /// blocks until the background thread has sent everything queued, for
    /// up to `DEFAULT_FLUSH_TIMEOUT` (one second). A timeout goes to the
    /// error handler. The client can keep emitting afterwards, though
    /// whether those metrics are sent depends on the backend.
    pub fn close(&self) -> MetricResult<()> {
        debug!("closing metrics client for {}", self.sink_address);
        self.backend.shutdown();
        Ok(())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("sink_address", &self.sink_address)
            .field("persistent_tags", &self.persistent_tags)
            .finish()
    }
}
