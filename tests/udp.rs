use std::time::Duration;
use typed_statsd::{count_metric, emit, Client, Identifier, SampleType};

mod utils;
use utils::{new_server, recv_lines, run_arc_threaded_test, NUM_ITERATIONS, NUM_THREADS};

static JOBS_FAILED: Identifier<i32> = Identifier::count("jobs.failed");

fn new_client(server_addr: &str, tags: &[&str]) -> Client {
    Client::builder()
        .with_sink_address(server_addr)
        .with_persistent_tags(tags.iter().copied())
        .build()
        .unwrap()
}

#[test]
fn test_emit_round_trip_with_tags() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();
    let client = new_client(&addr, &["env:prod"]);

    emit(&client, &JOBS_FAILED, 1, &["job:x"]).unwrap();
    client.close().unwrap();

    assert_eq!(vec!["jobs.failed:1|c|#env:prod,job:x"], recv_lines(&server, 1));
}

#[test]
fn test_emit_every_kind_in_order() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();
    let client = new_client(&addr, &[]);

    count_metric("a").emit(&client, 2, &[]).unwrap();
    Identifier::gauge("b").emit(&client, 0.5, &["canary"]).unwrap();
    Identifier::distribution("c").emit(&client, 12.0, &[]).unwrap();
    Identifier::timing("d").emit(&client, Duration::from_micros(7), &[]).unwrap();
    client.close().unwrap();

    assert_eq!(
        vec!["a:2|c", "b:0.5|g|#canary", "c:12|ms", "d:7000|ms"],
        recv_lines(&server, 4)
    );
}

#[test]
fn test_distribution_sample_type() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();
    let client = Client::builder()
        .with_sink_address(addr)
        .with_sample_type(SampleType::Distribution)
        .build()
        .unwrap();

    Identifier::distribution("latency").emit(&client, 3.0, &[]).unwrap();
    client.close().unwrap();

    assert_eq!(vec!["latency:3|d"], recv_lines(&server, 1));
}

#[test]
fn test_flush_interval_sends_without_close() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();
    let client = Client::builder()
        .with_sink_address(addr)
        .with_flush_interval(Duration::from_millis(10))
        .build()
        .unwrap();

    JOBS_FAILED.emit(&client, 3, &[]).unwrap();

    assert_eq!(vec!["jobs.failed:3|c"], recv_lines(&server, 1));
}

#[test]
fn test_dropped_client_flushes() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();

    {
        let client = Client::builder()
            .with_sink_address(addr)
            .with_flush_interval(Duration::from_secs(3600))
            .build()
            .unwrap();
        JOBS_FAILED.emit(&client, 1, &[]).unwrap();
    }

    assert_eq!(vec!["jobs.failed:1|c"], recv_lines(&server, 1));
}

#[test]
fn test_client_udp_single_threaded() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();
    run_arc_threaded_test(new_client(&addr, &["env:test"]), 1, 1);

    assert_eq!(4, recv_lines(&server, 4).len());
}

#[ignore]
#[test]
fn test_client_udp_many_threaded() {
    let server = new_server();
    let addr = server.local_addr().unwrap().to_string();
    run_arc_threaded_test(new_client(&addr, &["env:test"]), NUM_THREADS, NUM_ITERATIONS);
}
