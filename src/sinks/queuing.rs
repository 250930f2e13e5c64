// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crossbeam_channel::{self, select, Receiver, Sender, TrySendError};
use std::fmt;
use std::io;
use std::panic::RefUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::sinks::core::{MetricSink, SinkStats};

/// Default number of metrics that may wait in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Default interval at which the wrapped sink is flushed.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Default time `flush()` waits for the worker thread to acknowledge.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// `MetricSink` that wraps another sink and runs it in a background thread.
///
/// Metrics are queued on a channel and drained by the thread, so the
/// caller never waits on network I/O. Results from the wrapped sink are
/// discarded; its `stats()` are still visible through this sink.
///
/// When created with a flush interval the wrapped sink is flushed on every
/// tick. This keeps buffered sinks such as `BufferedUdpMetricSink` from
/// holding metrics indefinitely in low volume applications.
///
/// With a bounded queue, metrics submitted while the queue is full are
/// rejected with an error. The thread is restarted if the wrapped sink
/// panics. When this sink is dropped the thread drains whatever is already
/// queued, flushes the wrapped sink, and stops.
///
/// # Example
///
/// ```no_run
/// use std::net::UdpSocket;
/// use std::time::Duration;
/// use typed_statsd::{BufferedUdpMetricSink, MetricSink, QueuingMetricSink};
///
/// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
/// let udp = BufferedUdpMetricSink::from("127.0.0.1:8125", socket).unwrap();
/// let queuing = QueuingMetricSink::builder()
///     .with_capacity(1024)
///     .with_flush_interval(Duration::from_millis(250))
///     .build(udp);
///
/// queuing.emit("jobs.failed:1|c").unwrap();
/// ```
#[derive(Debug)]
pub struct QueuingMetricSink {
    worker: Arc<Worker>,
    flush_timeout: Duration,
}

impl QueuingMetricSink {
    /// Wrap `sink` using an unbounded queue and no periodic flushing.
    pub fn from<T>(sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder().build(sink)
    }

    /// Wrap `sink` using a queue bounded to `capacity` entries and no
    /// periodic flushing.
    pub fn with_capacity<T>(sink: T, capacity: usize) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder().with_capacity(capacity).build(sink)
    }

    pub fn builder() -> QueuingMetricSinkBuilder {
        QueuingMetricSinkBuilder::default()
    }

    /// Number of times the worker thread panicked and was restarted.
    pub fn panics(&self) -> u64 {
        self.worker.stats.panics()
    }

    /// Approximate number of metrics waiting in the queue.
    pub fn queued(&self) -> u64 {
        self.worker.stats.queued()
    }

    /// Number of metrics accepted into the queue.
    pub fn submitted(&self) -> u64 {
        self.worker.stats.submitted()
    }

    /// Number of metrics taken off the queue and handed to the wrapped sink.
    pub fn drained(&self) -> u64 {
        self.worker.stats.drained()
    }
}

impl MetricSink for QueuingMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        match self.worker.submit(metric.to_string()) {
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(io::ErrorKind::Other, "channel disconnected")),
            Err(TrySendError::Full(_)) => Err(io::Error::new(io::ErrorKind::Other, "channel full")),
            Ok(_) => Ok(metric.len()),
        }
    }

    /// Ask the worker thread to flush the wrapped sink after everything
    /// queued so far and wait for it to finish, up to the flush timeout.
    fn flush(&self) -> io::Result<()> {
        let deadline = Instant::now() + self.flush_timeout;
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);

        self.worker
            .sender
            .send_deadline(Message::Flush(ack_tx), deadline)
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "timed out queuing flush"))?;

        match ack_rx.recv_deadline(deadline) {
            Ok(res) => res,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out waiting for flush")),
        }
    }

    fn stats(&self) -> SinkStats {
        self.worker.sink.stats()
    }
}

impl Drop for QueuingMetricSink {
    /// Signal the worker to stop once the queue is drained. This does not
    /// wait for the worker thread to exit.
    fn drop(&mut self) {
        self.worker.stop();
    }
}

/// Builder for `QueuingMetricSink` instances.
#[derive(Debug, Clone)]
pub struct QueuingMetricSinkBuilder {
    capacity: Option<usize>,
    flush_interval: Option<Duration>,
    flush_timeout: Duration,
}

impl Default for QueuingMetricSinkBuilder {
    fn default() -> Self {
        QueuingMetricSinkBuilder {
            capacity: None,
            flush_interval: None,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl QueuingMetricSinkBuilder {
    /// Bound the queue to `capacity` entries.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Flush the wrapped sink every `interval`.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Maximum time `flush()` waits for the worker thread.
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Start the worker thread and return the sink feeding it.
    pub fn build<T>(self, sink: T) -> QueuingMetricSink
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        let worker = Arc::new(Worker::new(self.capacity, self.flush_interval, Box::new(sink)));
        spawn_worker_in_thread(Arc::clone(&worker));

        QueuingMetricSink {
            worker,
            flush_timeout: self.flush_timeout,
        }
    }
}

enum Message {
    Metric(String),
    Flush(Sender<io::Result<()>>),
}

/// Counters describing the worker. Mostly useful to tests verifying that
/// the sentinel restarts a panicked thread.
#[derive(Debug, Default)]
struct WorkerStats {
    panics: AtomicU64,
    submitted: AtomicU64,
    drained: AtomicU64,
}

impl WorkerStats {
    fn incr_panic(&self) {
        self.panics.fetch_add(1, Ordering::Release);
    }

    fn panics(&self) -> u64 {
        self.panics.load(Ordering::Acquire)
    }

    fn incr_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Release);
    }

    fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    fn incr_drained(&self) {
        self.drained.fetch_add(1, Ordering::Release);
    }

    fn drained(&self) -> u64 {
        self.drained.load(Ordering::Acquire)
    }

    fn queued(&self) -> u64 {
        self.submitted().saturating_sub(self.drained())
    }
}

/// Run the worker in a new thread, with a `Sentinel` that starts a
/// replacement thread if it panics.
fn spawn_worker_in_thread(worker: Arc<Worker>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut sentinel = Sentinel::new(&worker);
        worker.run();
        sentinel.cancel();
    })
}

/// Restarts the worker in a new thread when dropped, unless `cancel()`
/// was called first. `cancel()` is only skipped when `run()` panics.
#[derive(Debug)]
struct Sentinel<'a> {
    worker: &'a Arc<Worker>,
    active: bool,
}

impl<'a> Sentinel<'a> {
    fn new(worker: &'a Arc<Worker>) -> Sentinel<'a> {
        Sentinel { worker, active: true }
    }

    fn cancel(&mut self) {
        self.active = false;
    }
}

impl<'a> Drop for Sentinel<'a> {
    fn drop(&mut self) {
        if self.active {
            self.worker.stats.incr_panic();
            spawn_worker_in_thread(Arc::clone(self.worker));
        }
    }
}

/// Owner of the wrapped sink and both halves of the queue feeding it.
///
/// `run()` executes in the background thread; `submit()` and `stop()` are
/// called from any other thread. Stopping goes over its own channel so a
/// full queue can't swallow it. Entries queued before the stop are still
/// sent.
struct Worker {
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    flush_interval: Option<Duration>,
    stopping: AtomicBool,
    stopped: AtomicBool,
    stats: WorkerStats,
}

impl Worker {
    fn new(
        capacity: Option<usize>,
        flush_interval: Option<Duration>,
        sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    ) -> Worker {
        let (sender, receiver) = match capacity {
            Some(v) => crossbeam_channel::bounded(v),
            None => crossbeam_channel::unbounded(),
        };

        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);

        Worker {
            sink,
            sender,
            receiver,
            stop_tx,
            stop_rx,
            flush_interval,
            stopping: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            stats: WorkerStats::default(),
        }
    }

    fn submit(&self, metric: String) -> Result<(), TrySendError<Message>> {
        let res = self.sender.try_send(Message::Metric(metric));
        if res.is_ok() {
            self.stats.incr_submitted();
        }

        res
    }

    fn run(&self) {
        let ticker = match self.flush_interval {
            Some(interval) => crossbeam_channel::tick(interval),
            None => crossbeam_channel::never(),
        };

        // A thread restarted after a panic may find the stop already requested.
        while !self.stopping.load(Ordering::Acquire) {
            select! {
                recv(self.receiver) -> msg => match msg {
                    Ok(msg) => self.handle(msg),
                    Err(_) => break,
                },
                recv(self.stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    let _r = self.sink.flush();
                }
            }
        }

        // Nothing new arrives once stopping, the producer is gone.
        for msg in self.receiver.try_iter() {
            self.handle(msg);
        }

        let _r = self.sink.flush();

        // Only read by tests waiting for the worker to finish.
        self.stopped.store(true, Ordering::Release);
    }

    fn handle(&self, msg: Message) {
        match msg {
            Message::Metric(m) => {
                self.stats.incr_drained();
                let _r = self.sink.emit(&m);
            }
            Message::Flush(ack) => {
                let _r = ack.send(self.sink.flush());
            }
        }
    }

    fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
        // Full means a stop is already pending.
        let _ = self.stop_tx.try_send(());
    }

    #[cfg(test)]
    fn stop_and_wait(&self) {
        self.stop();

        while !self.stopped.load(Ordering::Acquire) {
            thread::yield_now();
        }
    }

    #[cfg(test)]
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("sink", &"...")
            .field("flush_interval", &self.flush_interval)
            .field("stopping", &self.stopping)
            .field("stopped", &self.stopped)
            .field("stats", &self.stats)
            .finish()
    }
}
