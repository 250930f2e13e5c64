// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, BufWriter, Write};

/// Buffered writer that packs newline separated lines into as few calls
/// to the underlying writer as possible.
///
/// Each input is written whole, followed by a `'\n'`. When an input and
/// its line ending no longer fit in the remaining capacity the buffer is
/// flushed first, so every call to the underlying writer (one datagram,
/// for a UDP socket) contains only complete lines.
#[derive(Debug)]
pub(crate) struct MultiLineWriter<T>
where
    T: Write,
{
    written: usize,
    capacity: usize,
    inner: BufWriter<T>,
}

impl<T> MultiLineWriter<T>
where
    T: Write,
{
    const LINE_ENDING: &'static [u8] = b"\n";

    pub(crate) fn new(inner: T, cap: usize) -> MultiLineWriter<T> {
        MultiLineWriter {
            written: 0,
            capacity: cap,
            inner: BufWriter::with_capacity(cap, inner),
        }
    }

    pub(crate) fn get_ref(&self) -> &T {
        self.inner.get_ref()
    }
}

impl<T> Write for MultiLineWriter<T>
where
    T: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let required = buf.len() + Self::LINE_ENDING.len();

        if required > self.capacity {
            // Keep ordering: whatever is buffered goes out before the
            // oversized line, which is sent on its own without a line
            // ending since nothing else shares the write.
            if self.written > 0 {
                self.flush()?;
            }
            return self.inner.get_mut().write(buf);
        }

        if self.capacity - self.written < required {
            self.flush()?;
        }

        let n = self.inner.write(buf)?;
        self.written += n;
        self.written += self.inner.write(Self::LINE_ENDING)?;

        // Only bytes from `buf` count towards the return value.
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()?;
        self.written = 0;
        Ok(())
    }
}
