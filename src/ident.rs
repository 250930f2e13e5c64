// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use crate::client::Client;
use crate::emit;
use crate::global;
use crate::types::MetricResult;

/// Kind of metric an `Identifier` is bound to. Determines which backend
/// operation an emitted value is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Count,
    Gauge,
    Distribution,
    Timing,
}

/// Holder for the value types an `Identifier` may carry.
///
/// Typical use of this library shouldn't require interacting with this
/// type, it's what the dispatcher matches on together with `MetricKind`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Integer(i32),
    Float(f32),
    Duration(Duration),
}

mod private {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for std::time::Duration {}
}

/// Conversion trait for the value types identifiers may be declared with.
///
/// This trait is sealed: it is implemented for `i32`, `f32`, and
/// `Duration` only.
pub trait ToMetricValue: private::Sealed + Copy {
    fn to_metric_value(self) -> MetricValue;
}

impl ToMetricValue for i32 {
    fn to_metric_value(self) -> MetricValue {
        MetricValue::Integer(self)
    }
}

impl ToMetricValue for f32 {
    fn to_metric_value(self) -> MetricValue {
        MetricValue::Float(self)
    }
}

impl ToMetricValue for Duration {
    fn to_metric_value(self) -> MetricValue {
        MetricValue::Duration(self)
    }
}

/// Name and kind of a single metric, bound to the type of value it accepts.
///
/// Identifiers are declared once, typically as `static` items, and then used
/// to emit values from anywhere in an application. The kind and value type
/// always come as a fixed pairing:
///
/// * Count: `i32`
/// * Gauge: `f32`
/// * Distribution: `f32`
/// * Timing: `Duration`
///
/// Identifiers are immutable and may be shared between threads freely.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use typed_statsd::{Identifier, MetricKind};
///
/// static JOBS_FAILED: Identifier<i32> = Identifier::count("background.jobs.failed");
/// static JOB_RUNTIME: Identifier<Duration> = Identifier::timing("background.jobs.runtime");
///
/// assert_eq!(MetricKind::Count, JOBS_FAILED.kind());
/// assert_eq!("background.jobs.runtime", JOB_RUNTIME.name());
/// ```
pub struct Identifier<V> {
    kind: MetricKind,
    name: Cow<'static, str>,
    _value: PhantomData<fn(V)>,
}

impl<V> Identifier<V> {
    const fn from_static(kind: MetricKind, name: &'static str) -> Self {
        Identifier {
            kind,
            name: Cow::Borrowed(name),
            _value: PhantomData,
        }
    }

    fn from_name<N>(kind: MetricKind, name: N) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Identifier {
            kind,
            name: name.into(),
            _value: PhantomData,
        }
    }

    /// Build an identifier with an arbitrary kind, bypassing the fixed
    /// kind / value pairing.
    #[cfg(test)]
    pub(crate) fn unchecked(kind: MetricKind, name: &'static str) -> Self {
        Self::from_static(kind, name)
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Identifier<i32> {
    /// Create an identifier for a count metric.
    pub const fn count(name: &'static str) -> Self {
        Self::from_static(MetricKind::Count, name)
    }
}

impl Identifier<f32> {
    /// Create an identifier for a gauge metric.
    pub const fn gauge(name: &'static str) -> Self {
        Self::from_static(MetricKind::Gauge, name)
    }

    /// Create an identifier for a distribution metric.
    pub const fn distribution(name: &'static str) -> Self {
        Self::from_static(MetricKind::Distribution, name)
    }
}

impl Identifier<Duration> {
    /// Create an identifier for a distribution metric that captures durations.
    pub const fn timing(name: &'static str) -> Self {
        Self::from_static(MetricKind::Timing, name)
    }
}

impl<V> Identifier<V>
where
    V: ToMetricValue,
{
    /// Emit a value for this metric using the provided client.
    ///
    /// See [`emit`](crate::emit()) for details.
    pub fn emit(&self, client: &Client, value: V, tags: &[&str]) -> MetricResult<()> {
        emit::emit(client, self, value, tags)
    }

    /// Emit a value for this metric using the process-wide default client.
    ///
    /// See [`global_emit`](crate::global_emit) for details.
    pub fn emit_global(&self, value: V, tags: &[&str]) -> MetricResult<()> {
        global::global_emit(self, value, tags)
    }
}

impl<V> Clone for Identifier<V> {
    fn clone(&self) -> Self {
        Identifier {
            kind: self.kind,
            name: self.name.clone(),
            _value: PhantomData,
        }
    }
}

impl<V> PartialEq for Identifier<V> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl<V> Eq for Identifier<V> {}

impl<V> fmt::Debug for Identifier<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

/// Create an identifier for a count metric.
pub fn count_metric<N>(name: N) -> Identifier<i32>
where
    N: Into<Cow<'static, str>>,
{
    Identifier::from_name(MetricKind::Count, name)
}

/// Create an identifier for a gauge metric.
pub fn gauge_metric<N>(name: N) -> Identifier<f32>
where
    N: Into<Cow<'static, str>>,
{
    Identifier::from_name(MetricKind::Gauge, name)
}

/// Create an identifier for a distribution metric.
pub fn distribution_metric<N>(name: N) -> Identifier<f32>
where
    N: Into<Cow<'static, str>>,
{
    Identifier::from_name(MetricKind::Distribution, name)
}

/// Create an identifier for a distribution metric that captures durations.
pub fn timing_metric<N>(name: N) -> Identifier<Duration>
where
    N: Into<Cow<'static, str>>,
{
    Identifier::from_name(MetricKind::Timing, name)
}
