use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use tracing_index_log::init::{init_index_logging_with_config, IndexLogConfig};
use tracing_index_log::noop_client::NoopClient;

fn main() {
    let client = Arc::new(NoopClient);
    let mut config = IndexLogConfig::new("logs");
    config.copy_console = false;
    init_index_logging_with_config(client, config).expect("init index logging");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        info!(iteration = i, "load test entry");
    }

    let elapsed = start.elapsed();
    println!(
        "synchronous upload path: {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
