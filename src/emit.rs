// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::client::Client;
use crate::ident::{Identifier, MetricKind, MetricValue, ToMetricValue};
use crate::types::{ErrorKind, MetricError, MetricResult};

/// Emit `value` for the metric `id` through `client`.
///
/// The identifier's kind picks the client primitive:
///
/// * Count: `Client::count`, with the value widened to `i64`
/// * Gauge: `Client::gauge`
/// * Distribution: `Client::distribution`
/// * Timing: `Client::timing`
///
/// `tags` are `name` or `name:value` strings appended after the client's
/// persistent tags.
///
/// # Failures
///
/// Fails with an `InvalidIdentifier` error if the identifier's kind does
/// not match the value it carries. Identifiers built with the public
/// constructors always match, so this is not expected in practice.
/// Transport errors are never returned.
///
/// # Example
///
/// ```
/// use typed_statsd::{emit, BackendCall, Client, Identifier, SpyBackend};
///
/// static JOBS_FAILED: Identifier<i32> = Identifier::count("jobs.failed");
///
/// let (rx, spy) = SpyBackend::new();
/// let client = Client::builder().build_with_backend(spy);
///
/// emit(&client, &JOBS_FAILED, 5, &[]).unwrap();
///
/// match rx.recv().unwrap() {
///     BackendCall::IncrCounter { delta, .. } => assert_eq!(5.0, delta),
///     other => panic!("unexpected call {:?}", other),
/// }
/// ```
pub fn emit<V>(client: &Client, id: &Identifier<V>, value: V, tags: &[&str]) -> MetricResult<()>
where
    V: ToMetricValue,
{
    match (id.kind(), value.to_metric_value()) {
        (MetricKind::Count, MetricValue::Integer(v)) => client.count(id.name(), i64::from(v), tags),
        (MetricKind::Gauge, MetricValue::Float(v)) => client.gauge(id.name(), v, tags),
        (MetricKind::Distribution, MetricValue::Float(v)) => client.distribution(id.name(), v, tags),
        (MetricKind::Timing, MetricValue::Duration(v)) => client.timing(id.name(), v, tags),
        _ => Err(MetricError::from((
            ErrorKind::InvalidIdentifier,
            "Metric kind does not match value type",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::emit;
    use crate::backend::{BackendCall, SpyBackend};
    use crate::client::Client;
    use crate::ident::{count_metric, distribution_metric, gauge_metric, timing_metric, Identifier, MetricKind};
    use crate::types::ErrorKind;
    use crossbeam_channel::Receiver;
    use std::time::Duration;

    fn spy_client(tags: &[&str]) -> (Receiver<BackendCall>, Client) {
        let (rx, spy) = SpyBackend::new();
        let client = Client::builder()
            .with_persistent_tags(tags.iter().copied())
            .build_with_backend(spy);
        (rx, client)
    }

    fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_emit_count() {
        let (rx, client) = spy_client(&["env:prod"]);

        emit(&client, &count_metric("x"), 5, &[]).unwrap();

        assert_eq!(
            BackendCall::IncrCounter {
                name: "x".to_string(),
                delta: 5.0,
                labels: labels(&[("env", "prod")]),
            },
            rx.recv().unwrap()
        );
    }

    #[test]
    fn test_emit_negative_count() {
        let (rx, client) = spy_client(&[]);

        emit(&client, &count_metric("x"), -2, &[]).unwrap();

        match rx.recv().unwrap() {
            BackendCall::IncrCounter { delta, .. } => assert_eq!(-2.0, delta),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_emit_gauge() {
        let (rx, client) = spy_client(&[]);

        emit(&client, &gauge_metric("pool.size"), 8.25, &["pool:main"]).unwrap();

        assert_eq!(
            BackendCall::SetGauge {
                name: "pool.size".to_string(),
                value: 8.25,
                labels: labels(&[("pool", "main")]),
            },
            rx.recv().unwrap()
        );
    }

    #[test]
    fn test_emit_distribution() {
        let (rx, client) = spy_client(&[]);

        emit(&client, &distribution_metric("payload.bytes"), 1024.0, &[]).unwrap();

        assert_eq!(
            BackendCall::AddSample {
                name: "payload.bytes".to_string(),
                value: 1024.0,
                labels: vec![],
            },
            rx.recv().unwrap()
        );
    }

    #[test]
    fn test_emit_timing_raw_nanoseconds() {
        let (rx, client) = spy_client(&[]);

        emit(&client, &timing_metric("db.query"), Duration::from_millis(3), &[]).unwrap();

        // Durations are not scaled to milliseconds: 3ms is sent as 3e6.
        assert_eq!(
            BackendCall::AddSample {
                name: "db.query".to_string(),
                value: 3_000_000.0,
                labels: vec![],
            },
            rx.recv().unwrap()
        );
    }

    #[test]
    fn test_emit_merges_persistent_then_call_tags() {
        let (rx, client) = spy_client(&["env:prod"]);
        let id = count_metric("jobs.failed");

        emit(&client, &id, 1, &["job:x"]).unwrap();

        assert_eq!(
            BackendCall::IncrCounter {
                name: "jobs.failed".to_string(),
                delta: 1.0,
                labels: labels(&[("env", "prod"), ("job", "x")]),
            },
            rx.recv().unwrap()
        );
    }

    #[test]
    fn test_emit_identifier_methods() {
        static REQUESTS: Identifier<i32> = Identifier::count("http.requests");
        let (rx, client) = spy_client(&[]);

        REQUESTS.emit(&client, 1, &["code:200"]).unwrap();

        assert_eq!(
            BackendCall::IncrCounter {
                name: "http.requests".to_string(),
                delta: 1.0,
                labels: labels(&[("code", "200")]),
            },
            rx.recv().unwrap()
        );
    }

    #[test]
    fn test_emit_mismatched_kind() {
        let (rx, client) = spy_client(&[]);
        let id: Identifier<i32> = Identifier::unchecked(MetricKind::Gauge, "broken");

        let err = emit(&client, &id, 1, &[]).unwrap_err();

        assert_eq!(ErrorKind::InvalidIdentifier, err.kind());
        assert!(rx.try_recv().is_err());
    }
}
