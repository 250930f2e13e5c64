// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt::{self, Write};

use crate::label::Label;

/// Statsd type used on the wire for samples added via `add_sample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// Plain Statsd timer, `|ms`. Understood by every Statsd server.
    Timer,
    /// Datadog style distribution, `|d`
    Distribution,
}

impl Default for SampleType {
    fn default() -> Self {
        SampleType::Timer
    }
}

/// Type of metric line that knows how to display itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineType {
    Counter,
    Gauge,
    Sample(SampleType),
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LineType::Counter => "c".fmt(f),
            LineType::Gauge => "g".fmt(f),
            LineType::Sample(SampleType::Distribution) => "d".fmt(f),
            LineType::Sample(SampleType::Timer) => "ms".fmt(f),
        }
    }
}

/// Encoder for a single Statsd line with an optional Datadog tag block,
/// `name:value|type|#k:v,k2`.
#[derive(Debug, Clone)]
pub(crate) struct LineFormatter<'a> {
    name: &'a str,
    value: f32,
    type_: LineType,
    labels: &'a [Label<'a>],
}

impl<'a> LineFormatter<'a> {
    const TAG_PREFIX: &'static str = "|#";

    pub(crate) fn new(name: &'a str, value: f32, type_: LineType, labels: &'a [Label<'a>]) -> Self {
        LineFormatter {
            name,
            value,
            type_,
            labels,
        }
    }

    #[rustfmt::skip]
    fn size_hint(&self) -> usize {
        let base = self.name.len() + 1 /* : */ + 12 /* value */ + 1 /* | */ + 2 /* type */;
        if self.labels.is_empty() {
            return base;
        }

        let kv: usize = self.labels.iter().map(|l| l.name.len() + 1 + l.value.len()).sum();
        base + Self::TAG_PREFIX.len() + kv + self.labels.len() - 1 /* commas */
    }

    fn write_tags(&self, out: &mut String) {
        if self.labels.is_empty() {
            return;
        }

        out.push_str(Self::TAG_PREFIX);
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_sanitized(out, label.name);
            if !label.value.is_empty() {
                out.push(':');
                push_sanitized(out, label.value);
            }
        }
    }

    pub(crate) fn format(&self) -> String {
        let mut out = String::with_capacity(self.size_hint());
        push_sanitized(&mut out, self.name);
        let _ = write!(out, ":{}|{}", self.value, self.type_);
        self.write_tags(&mut out);
        out
    }
}

/// Append `s` with every character that delimits part of a Statsd line
/// replaced by `_`.
fn push_sanitized(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            ':' | '|' | ',' | '#' | '@' | ' ' | '\n' | '\r' => out.push('_'),
            c => out.push(c),
        }
    }
}
