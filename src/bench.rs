//! Repeated measurement of a code region.

use crate::count::{get_counters, PerformanceCounters};
use crate::{Error, Result};

/// Counter deltas aggregated over repeated runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Per-field minimum of the per-run deltas.
    pub min: PerformanceCounters,
    /// Mean of the per-run deltas.
    pub avg: PerformanceCounters,
    pub loops: usize,
}

/// Runs `f` `loops` times, reading the counters around each run.
///
/// [`init`](crate::init) must have succeeded first.
///
/// # Examples
///
/// ```rust,no_run
/// use std::hint::black_box;
///
/// macos_perf::init().unwrap();
///
/// let m = macos_perf::bench::measure(100, || {
///     black_box((0..black_box(1000)).fold(0, |a, b| a ^ b));
/// })
/// .unwrap();
///
/// println!("min {:?}", m.min);
/// println!("avg {:?}", m.avg);
/// ```
pub fn measure<F>(loops: usize, f: F) -> Result<Measurement>
where
    F: FnMut(),
{
    measure_with(loops, f, get_counters)
}

fn measure_with<F, R>(loops: usize, mut f: F, mut read: R) -> Result<Measurement>
where
    F: FnMut(),
    R: FnMut() -> Result<PerformanceCounters>,
{
    if loops == 0 {
        return Err(Error::ZeroLoops);
    }

    let mut min = PerformanceCounters::splat(f64::INFINITY);
    let mut sum = PerformanceCounters::splat(0.0);
    for _ in 0..loops {
        let start = read()?;
        f();
        let delta = read()? - start;

        min.min(delta);
        sum += delta;
    }

    Ok(Measurement {
        min,
        avg: sum / loops,
        loops,
    })
}

/// Measures a block over a number of loops, returning the average
/// [`PerformanceCounters`] of one run.
///
/// ```rust,no_run
/// use std::hint::black_box;
///
/// use macos_perf::{init, timeit_loops};
///
/// init().unwrap();
///
/// let pc = timeit_loops! {10, {
///     let n = black_box(1000);
///     let _x = (0..n).fold(0, |a, b| a ^ b);
/// }}
/// .unwrap();
/// println!("{:?}", pc);
/// ```
#[macro_export]
macro_rules! timeit_loops {
    ($loops:expr, $body:block) => {
        $crate::bench::measure($loops, || $body).map(|m| m.avg)
    };
}
