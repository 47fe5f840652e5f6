//! Run with `sudo RUST_LOG=debug cargo run --example fold`.

use std::hint::black_box;

use macos_perf::bench::measure;
use macos_perf::{compare_perf_counters, init};

fn main() -> macos_perf::Result<()> {
    env_logger::init();

    init()?;

    let small = measure(100, || {
        let n = black_box(1000);
        black_box((0..n).fold(0, |a, b| a ^ b));
    })?;
    let large = measure(100, || {
        let n = black_box(2000);
        black_box((0..n).fold(0, |a, b| a ^ b));
    })?;

    println!("min: {:?}", small.min);
    println!("avg: {:?}", small.avg);
    println!("{}", compare_perf_counters(&small.min, &large.min));
    Ok(())
}
