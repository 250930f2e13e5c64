use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use typed_statsd::{Client, Identifier};

pub const NUM_THREADS: u64 = 10;
pub const NUM_ITERATIONS: u64 = 1_000;

pub static SOME_COUNTER: Identifier<i32> = Identifier::count("some.counter");
pub static SOME_GAUGE: Identifier<f32> = Identifier::gauge("some.gauge");
pub static SOME_DISTRIBUTION: Identifier<f32> = Identifier::distribution("some.distribution");
pub static SOME_TIMING: Identifier<Duration> = Identifier::timing("some.timing");

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: Client, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                for i in 0..iterations {
                    SOME_COUNTER.emit(&local_client, 1, &["thread:worker"]).unwrap();
                    SOME_GAUGE.emit(&local_client, i as f32, &[]).unwrap();
                    SOME_DISTRIBUTION.emit(&local_client, i as f32, &[]).unwrap();
                    SOME_TIMING
                        .emit(&local_client, Duration::from_micros(i), &[])
                        .unwrap();
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    shared_client.close().unwrap();
}

/// Bind a loopback socket to act as the Statsd server.
#[allow(dead_code)]
pub fn new_server() -> UdpSocket {
    let server = UdpSocket::bind("127.0.0.1:0").unwrap();
    server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    server
}

/// Read datagrams until `count` lines have arrived, returning the lines
/// in the order they were received.
#[allow(dead_code)]
pub fn recv_lines(server: &UdpSocket, count: usize) -> Vec<String> {
    let mut buf = [0u8; 2048];
    let mut lines = Vec::new();

    while lines.len() < count {
        let n = server.recv(&mut buf).unwrap();
        let packet = String::from_utf8(buf[..n].to_vec()).unwrap();
        lines.extend(packet.lines().map(String::from));
    }

    lines
}
