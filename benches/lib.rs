use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;
use typed_statsd::{
    emit, set_global_client, Client, Identifier, NopBackend, NopMetricSink, QueuingMetricSink, StatsdBackend,
};

static SOME_COUNTER: Identifier<i32> = Identifier::count("some.counter");
static SOME_TIMING: Identifier<Duration> = Identifier::timing("some.timing");

fn new_nop_client() -> Client {
    Client::builder().build_with_backend(NopBackend)
}

fn new_statsd_nop_client() -> Client {
    Client::builder()
        .with_persistent_tags(vec!["env:bench"])
        .build_with_backend(StatsdBackend::from_sink(NopMetricSink))
}

fn new_statsd_queuing_client() -> Client {
    let sink = QueuingMetricSink::with_capacity(NopMetricSink, 64 * 1024);
    Client::builder()
        .with_persistent_tags(vec!["env:bench"])
        .build_with_backend(StatsdBackend::from_sink(sink))
}

fn benchmark_dispatch(c: &mut Criterion) {
    let client = new_nop_client();

    c.bench_function("emit_nop_backend_counter", |b| {
        b.iter(|| emit(&client, &SOME_COUNTER, 123, &[]))
    });

    c.bench_function("emit_nop_backend_counter_tags", |b| {
        b.iter(|| emit(&client, &SOME_COUNTER, 123, &["tag:val", "another:thing"]))
    });
}

fn benchmark_statsd_backend(c: &mut Criterion) {
    let client = new_statsd_nop_client();

    // Counters are representative of the other kinds, timings are here
    // for the Duration conversion.
    c.bench_function("emit_statsd_nop_counter_tags", |b| {
        b.iter(|| emit(&client, &SOME_COUNTER, 123, &["tag:val"]))
    });

    c.bench_function("emit_statsd_nop_timing", |b| {
        b.iter(|| emit(&client, &SOME_TIMING, Duration::from_millis(12), &[]))
    });

    let queuing = new_statsd_queuing_client();

    c.bench_function("emit_statsd_queuing_counter_tags", |b| {
        b.iter(|| emit(&queuing, &SOME_COUNTER, 123, &["tag:val"]))
    });
}

fn benchmark_global(c: &mut Criterion) {
    set_global_client(new_statsd_nop_client());

    c.bench_function("emit_global_statsd_nop_counter", |b| {
        b.iter(|| SOME_COUNTER.emit_global(123, &[]))
    });
}

criterion_group!(benches, benchmark_dispatch, benchmark_statsd_backend, benchmark_global);

criterion_main!(benches);
