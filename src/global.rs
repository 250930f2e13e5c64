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
use std::sync::{Arc, PoisonError, RwLock};

use crate::client::{Client, ClientBuilder};
use crate::emit::emit;
use crate::ident::{Identifier, ToMetricValue};
use crate::types::MetricResult;

/// Process-wide default client used by the `global_*` functions.
static HOLDER: ClientHolder<Client> = ClientHolder::new();

/// Slot for a shared value that readers clone out and writers replace
/// wholesale.
///
/// Readers never observe a partially replaced value: the swap happens
/// under a write lock and readers hold their own `Arc`, so a value that
/// is replaced while in use stays alive until its last reader is done.
#[derive(Debug)]
struct ClientHolder<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> ClientHolder<T> {
    const fn new() -> Self {
        ClientHolder {
            value: RwLock::new(None),
        }
    }

    fn get(&self) -> Option<Arc<T>> {
        let slot = self.value.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(Arc::clone)
    }

    /// Get the current value, creating it with `init` if there is none.
    ///
    /// If `init` fails the slot is left empty and the next call tries again.
    fn get_or_try_init<F, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(val) = self.get() {
            return Ok(val);
        }

        let mut slot = self.value.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have initialized it between the two locks.
        if let Some(val) = slot.as_ref() {
            return Ok(Arc::clone(val));
        }

        let val = Arc::new(init()?);
        *slot = Some(Arc::clone(&val));
        Ok(val)
    }

    /// Install `val`, returning the value it replaced, if any.
    fn replace(&self, val: T) -> Option<Arc<T>> {
        let mut slot = self.value.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(Arc::new(val))
    }
}

/// Get the process-wide default client.
///
/// The first call builds a client with every option at its default
/// (`127.0.0.1:8125`, no persistent tags) unless one was installed with
/// `global_configure` or `set_global_client`.
///
/// # Failures
///
/// Fails with a `BackendInit` error if the default client cannot be built.
/// Nothing is stored in that case and the next call tries again.
pub fn global_client() -> MetricResult<Arc<Client>> {
    HOLDER.get_or_try_init(Client::new)
}

/// Build a client from `builder` and make it the process-wide default.
///
/// The client it replaces is not closed explicitly: it flushes when the
/// last emission still using it finishes and it is dropped.
///
/// # Failures
///
/// Returns the construction error, a `BackendInit` error, without touching
/// the current default client.
///
/// # Example
///
/// ```no_run
/// use typed_statsd::{global_configure, Client, Identifier};
///
/// static JOBS_FAILED: Identifier<i32> = Identifier::count("jobs.failed");
///
/// global_configure(
///     Client::builder()
///         .with_sink_address("statsd.internal:8125")
///         .with_persistent_tag("env:prod"),
/// )
/// .unwrap();
///
/// JOBS_FAILED.emit_global(1, &["job:reindex"]).unwrap();
/// ```
pub fn global_configure(builder: ClientBuilder) -> MetricResult<()> {
    let client = builder.build()?;
    set_global_client(client);
    Ok(())
}

/// Make an already built client the process-wide default.
///
/// Useful for installing a client with a custom backend.
pub fn set_global_client(client: Client) {
    debug!("replacing default metrics client with one for {}", client.sink_address());
    HOLDER.replace(client);
}

/// Emit `value` for `id` through the process-wide default client.
///
/// Same as [`emit`](crate::emit()) called with the result of
/// `global_client()`.
pub fn global_emit<V>(id: &Identifier<V>, value: V, tags: &[&str]) -> MetricResult<()>
where
    V: ToMetricValue,
{
    let client = global_client()?;
    emit(&client, id, value, tags)
}

/// Close the process-wide default client, flushing buffered metrics.
///
/// Does nothing if the default client was never built. The client stays
/// installed afterwards.
pub fn global_close() -> MetricResult<()> {
    match HOLDER.get() {
        Some(client) => client.close(),
        None => Ok(()),
    }
}
