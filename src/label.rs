// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// A single structured tag attached to a metric.
///
/// Labels are parsed from raw tag strings of the form `key` or `key:value`
/// and borrow from them. A tag without a `:value` part produces a label
/// with an empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> Label<'a> {
    pub fn new(name: &'a str, value: &'a str) -> Self {
        Label { name, value }
    }
}

/// Parse a raw tag string into a `Label`.
///
/// Only the text before the first `:` becomes the name and only the text
/// between the first and second `:` becomes the value. Anything after a
/// second `:` is discarded, so `"a:b:c"` parses to `a` / `b`. No validation
/// of the characters or length of the tag is performed.
///
/// # Example
///
/// ```
/// use typed_statsd::{parse_tag, Label};
///
/// assert_eq!(Label::new("env", "prod"), parse_tag("env:prod"));
/// assert_eq!(Label::new("canary", ""), parse_tag("canary"));
/// ```
pub fn parse_tag(raw: &str) -> Label<'_> {
    let mut parts = raw.split(':');
    let name = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default();
    Label { name, value }
}

/// Parse persistent tags followed by per-call tags into labels.
///
/// Order is preserved and duplicates are kept: what the sink does with
/// repeated tag names is up to the sink.
pub fn merge_tags<'a, P, C>(persistent: &'a [P], per_call: &'a [C]) -> Vec<Label<'a>>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let mut labels = Vec::with_capacity(persistent.len() + per_call.len());
    labels.extend(persistent.iter().map(|t| parse_tag(t.as_ref())));
    labels.extend(per_call.iter().map(|t| parse_tag(t.as_ref())));
    labels
}
