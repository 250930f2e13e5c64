// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Mutex, PoisonError};

use crate::io::MultiLineWriter;
use crate::sinks::core::{MetricSink, SinkStats, SocketStats};
use crate::types::{ErrorKind, MetricError, MetricResult};

/// Largest payload packed into a single datagram by default.
pub const DEFAULT_BUFFER_SIZE: usize = 1400;

/// Resolve anything implementing `ToSocketAddrs` to its first address,
/// returning an `InvalidInput` error if nothing was yielded.
pub(crate) fn get_addr<A: ToSocketAddrs>(addr: A) -> MetricResult<SocketAddr> {
    match addr.to_socket_addrs()?.next() {
        Some(addr) => Ok(addr),
        None => Err(MetricError::from((
            ErrorKind::InvalidInput,
            "No socket addresses yielded",
        ))),
    }
}

/// Bind a non-blocking UDP socket on the unspecified address of the same
/// family as `addr`.
pub(crate) fn bind_local(addr: &SocketAddr) -> io::Result<UdpSocket> {
    let local = if addr.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };

    let socket = UdpSocket::bind(local)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// `MetricSink` that sends each metric in its own UDP datagram, in the
/// thread of the caller.
#[derive(Debug)]
pub struct UdpMetricSink {
    addr: SocketAddr,
    socket: UdpSocket,
    stats: SocketStats,
}

impl UdpMetricSink {
    /// Construct a new `UdpMetricSink` sending to `to_addr` over `socket`.
    ///
    /// The socket should already be bound with any options (non-blocking,
    /// timeouts) applied.
    ///
    /// # Failures
    ///
    /// This method may fail if the address cannot be parsed or resolved.
    pub fn from<A>(to_addr: A, socket: UdpSocket) -> MetricResult<UdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(to_addr)?;
        let stats = SocketStats::default();
        Ok(UdpMetricSink { addr, socket, stats })
    }
}

impl MetricSink for UdpMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        self.stats
            .update(self.socket.send_to(metric.as_bytes(), self.addr), metric.len())
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }
}

/// Adapter for writing to a `UdpSocket` via the `Write` trait
#[derive(Debug)]
struct UdpWriteAdapter {
    addr: SocketAddr,
    socket: UdpSocket,
    stats: SocketStats,
}

impl Write for UdpWriteAdapter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stats.update(self.socket.send_to(buf, self.addr), buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `MetricSink` that packs newline separated metrics into datagrams of up
/// to a fixed size before sending them.
///
/// The buffer is sent when the next metric would not fit, when `flush` is
/// called, and when the sink is dropped. A metric larger than the buffer
/// is sent by itself, bypassing the buffer.
///
/// Since nothing is sent until the buffer fills, low volume applications
/// should flush periodically. `QueuingMetricSink` does this on an interval.
#[derive(Debug)]
pub struct BufferedUdpMetricSink {
    buffer: Mutex<MultiLineWriter<UdpWriteAdapter>>,
}

impl BufferedUdpMetricSink {
    /// Construct a new `BufferedUdpMetricSink` with a buffer of
    /// `DEFAULT_BUFFER_SIZE` bytes.
    ///
    /// # Failures
    ///
    /// This method may fail if the address cannot be parsed or resolved.
    pub fn from<A>(sink_addr: A, socket: UdpSocket) -> MetricResult<BufferedUdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        Self::with_capacity(sink_addr, socket, DEFAULT_BUFFER_SIZE)
    }

    /// Construct a new `BufferedUdpMetricSink` with a buffer of `cap` bytes.
    ///
    /// # Failures
    ///
    /// This method may fail if the address cannot be parsed or resolved.
    pub fn with_capacity<A>(sink_addr: A, socket: UdpSocket, cap: usize) -> MetricResult<BufferedUdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(sink_addr)?;
        let adapter = UdpWriteAdapter {
            addr,
            socket,
            stats: SocketStats::default(),
        };

        Ok(BufferedUdpMetricSink {
            buffer: Mutex::new(MultiLineWriter::new(adapter, cap)),
        })
    }
}

impl MetricSink for BufferedUdpMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        let mut writer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write(metric.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()
    }

    fn stats(&self) -> SinkStats {
        let writer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        (&writer.get_ref().stats).into()
    }
}
