// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Typed metric identifiers for Statsd.
//!
//! Metrics are declared once as [`Identifier`] values that bind a name to
//! a kind (count, gauge, distribution, or timing) and to the type of value
//! that kind accepts. Emitting a value through an identifier can't send a
//! gauge value to a counter or a float to a timing, since the compiler
//! rejects it.
//!
//! ## Features
//!
//! * Counts (`i32`), gauges (`f32`), distributions (`f32`) and timings
//!   (`Duration`) sent to Statsd over UDP.
//! * Tags in `name` or `name:value` form, attached per client and per call,
//!   sent as [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
//!   style tags.
//! * Metrics are buffered into datagrams and sent from a background thread,
//!   so emitting never blocks on the network and never fails.
//! * A process-wide default client for code that doesn't want to pass a
//!   client around.
//! * Alternate backends via the `MetricBackend` trait, including an
//!   in-memory `SpyBackend` for tests.
//!
//! ## Usage
//!
//! ### With an explicit client
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use typed_statsd::{emit, Client, Identifier};
//!
//! static JOBS_FAILED: Identifier<i32> = Identifier::count("background.jobs.failed");
//! static JOB_RUNTIME: Identifier<Duration> = Identifier::timing("background.jobs.runtime");
//!
//! // Note that you'll want to handle errors building the client in a
//! // real application, a bad sink address is reported here.
//! let client = Client::builder()
//!     .with_sink_address("metrics.example.com:8125")
//!     .with_persistent_tag("env:prod")
//!     .build()
//!     .unwrap();
//!
//! emit(&client, &JOBS_FAILED, 1, &["job:reindex"]).unwrap();
//! JOB_RUNTIME.emit(&client, Duration::from_millis(250), &["job:reindex"]).unwrap();
//!
//! // Send anything still buffered.
//! client.close().unwrap();
//! ```
//!
//! ### With the process-wide default client
//!
//! Without any setup the default client sends to `127.0.0.1:8125` with no
//! persistent tags. Use `global_configure` to change that.
//!
//! ```rust,no_run
//! use typed_statsd::{global_close, global_configure, global_emit, gauge_metric, Client};
//!
//! global_configure(Client::builder().with_persistent_tag("service:api")).unwrap();
//!
//! let pool_size = gauge_metric("db.pool.size");
//! global_emit(&pool_size, 12.0, &[]).unwrap();
//!
//! global_close().unwrap();
//! ```
//!
//! ### Timings
//!
//! Timing values are sent as the number of nanoseconds in the `Duration`,
//! as a float, with the timer Statsd type (`|ms`) unless the client was
//! built with `SampleType::Distribution`. They are not scaled to
//! milliseconds.
//!
//! ### Names and tags
//!
//! Characters that delimit parts of a Statsd line (`:`, `|`, `,`, `#`, `@`,
//! spaces and line breaks) are replaced with `_` when a metric is written,
//! so a tag value like `alice,admin` can't turn into two tags.
//!
//! ### Testing
//!
//! Build a client over a `SpyBackend` to assert the exact calls made:
//!
//! ```rust
//! use typed_statsd::{emit, BackendCall, Client, Identifier, SpyBackend};
//!
//! static REQUESTS: Identifier<i32> = Identifier::count("http.requests");
//!
//! let (rx, spy) = SpyBackend::new();
//! let client = Client::builder().build_with_backend(spy);
//!
//! emit(&client, &REQUESTS, 1, &["code:200"]).unwrap();
//!
//! assert_eq!(
//!     BackendCall::IncrCounter {
//!         name: "http.requests".to_string(),
//!         delta: 1.0,
//!         labels: vec![("code".to_string(), "200".to_string())],
//!     },
//!     rx.recv().unwrap()
//! );
//! ```

#![forbid(unsafe_code)]

pub use self::backend::{log_error_handler, BackendCall, ErrorHandler, MetricBackend, NopBackend, SpyBackend, StatsdBackend};

pub use self::client::{Client, ClientBuilder, DEFAULT_PORT, DEFAULT_SINK_ADDRESS};

pub use self::emit::emit;

pub use self::format::SampleType;

pub use self::global::{global_client, global_close, global_configure, global_emit, set_global_client};

pub use self::ident::{
    count_metric, distribution_metric, gauge_metric, timing_metric, Identifier, MetricKind, MetricValue, ToMetricValue,
};

pub use self::label::{merge_tags, parse_tag, Label};

pub use self::sinks::{
    BufferedSpyMetricSink, BufferedUdpMetricSink, MetricSink, NopMetricSink, QueuingMetricSink,
    QueuingMetricSinkBuilder, SinkStats, SpyMetricSink, UdpMetricSink, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
};

pub use self::types::{ErrorKind, MetricError, MetricResult};

mod backend;
mod client;
mod emit;
mod format;
mod global;
mod ident;
mod io;
mod label;
mod sinks;
mod types;
