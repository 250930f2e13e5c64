// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

/// I/O telemetry for a sink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub bytes_dropped: u64,
    pub packets_dropped: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SocketStats {
    bytes_sent: AtomicU64,
    packets_sent: AtomicU64,
    bytes_dropped: AtomicU64,
    packets_dropped: AtomicU64,
}

impl SocketStats {
    /// Record the outcome of writing `len` bytes and pass the result through.
    pub(crate) fn update(&self, res: io::Result<usize>, len: usize) -> io::Result<usize> {
        match res {
            Ok(written) => {
                self.bytes_sent.fetch_add(written as u64, Ordering::Relaxed);
                self.packets_sent.fetch_add(1, Ordering::Relaxed);
                Ok(written)
            }
            Err(e) => {
                self.bytes_dropped.fetch_add(len as u64, Ordering::Relaxed);
                self.packets_dropped.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }
}

impl From<&SocketStats> for SinkStats {
    fn from(stats: &SocketStats) -> Self {
        SinkStats {
            bytes_sent: stats.bytes_sent.load(Ordering::Relaxed),
            packets_sent: stats.packets_sent.load(Ordering::Relaxed),
            bytes_dropped: stats.bytes_dropped.load(Ordering::Relaxed),
            packets_dropped: stats.packets_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Transport that sends fully encoded Statsd lines somewhere.
///
/// Lines are passed without a trailing newline, for example:
///
/// ``` text
/// jobs.failed:1|c|#env:prod,job:x
/// queue.depth:12.5|g
/// request.latency:1500000|d
/// ```
pub trait MetricSink {
    /// Send the line and return the number of bytes written.
    ///
    /// Buffering implementations may return `0` when nothing was written
    /// yet. Callers should not treat this as an error.
    fn emit(&self, metric: &str) -> io::Result<usize>;

    /// Flush any buffered lines to the underlying transport.
    ///
    /// The default implementation does nothing.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Bytes and packets sent or dropped. Defaults to zeros.
    fn stats(&self) -> SinkStats {
        SinkStats::default()
    }
}

/// `MetricSink` that discards all metrics.
#[derive(Debug, Clone, Default)]
pub struct NopMetricSink;

impl MetricSink for NopMetricSink {
    fn emit(&self, _metric: &str) -> io::Result<usize> {
        Ok(0)
    }
}
