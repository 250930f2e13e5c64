// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::io::MultiLineWriter;
use crate::sinks::core::MetricSink;
use crate::sinks::udp::DEFAULT_BUFFER_SIZE;

/// `MetricSink` that sends every line to the `Sender` half of a channel
/// while the caller keeps the `Receiver` half.
///
/// Meant for verifying the exact lines written during tests. The channel
/// is unbounded unless created with `with_capacity`.
#[derive(Debug)]
pub struct SpyMetricSink {
    sender: Sender<String>,
}

impl SpyMetricSink {
    pub fn new() -> (Receiver<String>, Self) {
        Self::with_queue_capacity(None)
    }

    pub fn with_capacity(queue: usize) -> (Receiver<String>, Self) {
        Self::with_queue_capacity(Some(queue))
    }

    fn with_queue_capacity(queue: Option<usize>) -> (Receiver<String>, Self) {
        let (tx, rx) = new_channel(queue);
        (rx, SpyMetricSink { sender: tx })
    }
}

impl MetricSink for SpyMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        send_packet(&self.sender, metric.as_bytes())
    }
}

/// `MetricSink` that packs lines the way `BufferedUdpMetricSink` does and
/// sends each packet to a channel instead of a socket.
#[derive(Debug)]
pub struct BufferedSpyMetricSink {
    writer: Mutex<MultiLineWriter<ChannelWriter>>,
}

impl BufferedSpyMetricSink {
    pub fn new() -> (Receiver<String>, Self) {
        Self::with_capacity(None, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(queue: Option<usize>, buffer: usize) -> (Receiver<String>, Self) {
        let (tx, rx) = new_channel(queue);
        let writer = MultiLineWriter::new(ChannelWriter { sender: tx }, buffer);
        let sink = BufferedSpyMetricSink {
            writer: Mutex::new(writer),
        };
        (rx, sink)
    }
}

impl MetricSink for BufferedSpyMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write(metric.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()
    }
}

#[derive(Debug)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        send_packet(&self.sender, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn new_channel(cap: Option<usize>) -> (Sender<String>, Receiver<String>) {
    match cap {
        Some(sz) => bounded(sz),
        None => unbounded(),
    }
}

fn send_packet(sender: &Sender<String>, packet: &[u8]) -> io::Result<usize> {
    match sender.try_send(String::from_utf8_lossy(packet).into_owned()) {
        Err(TrySendError::Disconnected(_)) => Err(io::Error::new(io::ErrorKind::Other, "channel disconnected")),
        Err(TrySendError::Full(_)) => Err(io::Error::new(io::ErrorKind::Other, "channel full")),
        Ok(_) => Ok(packet.len()),
    }
}
