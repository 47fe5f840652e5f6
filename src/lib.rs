//! Cycle, branch and instruction counters on Apple Silicon macOS.
//!
//! Counters are programmed and read through the private `kperf` and
//! `kperfdata` frameworks, which are loaded at runtime. Setting them up
//! requires root privileges.
//!
//! ## Example
//!
//! Measure a fold, taking the smallest delta over several runs.
//!
//! ```rust,no_run
//! use std::hint::black_box;
//!
//! use macos_perf::{get_counters, init, PerformanceCounters};
//!
//! init().unwrap(); // Once per process, as root.
//!
//! let mut best = PerformanceCounters::splat(f64::INFINITY);
//! for _ in 0..10 {
//!     let start = get_counters().unwrap();
//!     black_box((0..black_box(1000)).fold(0, |a, b| a ^ b));
//!     let end = get_counters().unwrap();
//!
//!     best.min(end - start);
//! }
//!
//! println!("{:?}", best);
//! println!("IPC: {}", best.instructions / best.cycles);
//! ```
//!
//! ## Platform support
//!
//! On any target other than macOS, [`init`] fails with [`Error::Unsupported`]
//! and reads fail with [`Error::Uninitialized`]. The arithmetic on
//! [`PerformanceCounters`] is available everywhere.

pub mod bench;
pub mod config;
pub mod count;
mod error;
mod ffi;

pub use count::{
    compare_perf_counters, get_counters, get_counters_checked, init, init_with, is_initialized,
    PerformanceCounters,
};
pub use error::{Error, Result};
