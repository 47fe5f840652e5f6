use std::ffi::c_int;

use super::{compare_perf_counters, PerformanceCounters, Session};
use crate::ffi::bindings::KPC_MAX_COUNTERS;
use crate::Error;

const EPS: f64 = 1e-9;

fn pc(cycles: f64, branches: f64, missed_branches: f64, instructions: f64) -> PerformanceCounters {
    PerformanceCounters::new(cycles, branches, missed_branches, instructions)
}

fn assert_close(a: PerformanceCounters, b: PerformanceCounters) {
    assert!((a.cycles - b.cycles).abs() < EPS, "{:?} != {:?}", a, b);
    assert!((a.branches - b.branches).abs() < EPS, "{:?} != {:?}", a, b);
    assert!((a.missed_branches - b.missed_branches).abs() < EPS, "{:?} != {:?}", a, b);
    assert!((a.instructions - b.instructions).abs() < EPS, "{:?} != {:?}", a, b);
}

#[test]
fn test_from_raw() {
    let raw = PerformanceCounters::from_raw(1000, 200, 10, 1500);
    assert_eq!(raw, pc(1000.0, 200.0, 10.0, 1500.0));

    let zero = PerformanceCounters::from_raw(0, 0, 0, 0);
    assert_eq!(zero, PerformanceCounters::default());
}

#[test]
fn test_splat() {
    let s = PerformanceCounters::splat(3.5);
    assert_eq!(s, pc(3.5, 3.5, 3.5, 3.5));
}

#[test]
fn test_sub() {
    let end = PerformanceCounters::from_raw(1000, 200, 10, 1500);
    let start = PerformanceCounters::from_raw(100, 20, 1, 150);
    assert_eq!(end - start, pc(900.0, 180.0, 9.0, 1350.0));

    let mut delta = end;
    delta -= start;
    assert_eq!(delta, pc(900.0, 180.0, 9.0, 1350.0));
}

#[test]
fn test_sub_may_go_negative() {
    let a = PerformanceCounters::from_raw(1, 1, 1, 1);
    let b = PerformanceCounters::from_raw(5, 2, 1, 0);
    assert_eq!(a - b, pc(-4.0, -1.0, 0.0, 1.0));
}

#[test]
fn test_sub_then_add() {
    let a = pc(12.25, 7.5, 0.125, 99.0);
    let b = pc(3.0, 9.75, 1.5, 1e6);
    assert_close((a - b) + b, a);

    let mut c = a;
    c -= b;
    c += b;
    assert_close(c, a);
}

#[test]
fn test_sub_antisymmetric() {
    let a = pc(1000.0, 200.0, 10.0, 1500.0);
    let b = pc(100.0, 250.0, 1.0, 2000.0);
    assert_eq!(a - b, -(b - a));
}

#[test]
fn test_min_per_field() {
    let a = pc(10.0, 5.0, 3.0, 40.0);
    let b = pc(12.0, 4.0, 3.0, 20.0);

    let mut m = a;
    m.min(b);
    assert_eq!(m.cycles, 10.0);
    assert_eq!(m.branches, 4.0);
    assert_eq!(m.missed_branches, 3.0);
    assert_eq!(m.instructions, 20.0);

    // Order of operands does not matter.
    let mut n = b;
    n.min(a);
    assert_eq!(m, n);
}

#[test]
fn test_min_chains() {
    let mut m = PerformanceCounters::splat(f64::INFINITY);
    m.min(pc(3.0, 9.0, 9.0, 9.0))
        .min(pc(9.0, 2.0, 9.0, 9.0))
        .min(pc(9.0, 9.0, 1.0, 0.0));
    assert_eq!(m, pc(3.0, 2.0, 1.0, 0.0));
}

#[test]
fn test_min_from_infinity() {
    let s = pc(10.0, 5.0, 1.0, 20.0);
    let mut m = PerformanceCounters::splat(f64::INFINITY);
    m.min(s);
    assert_eq!(m, s);
}

#[test]
fn test_sum_then_average() {
    let s = PerformanceCounters::from_raw(10, 5, 1, 20);

    let mut sum = PerformanceCounters::splat(0.0);
    for _ in 0..3 {
        sum += s;
    }
    assert_eq!(sum, pc(30.0, 15.0, 3.0, 60.0));

    sum /= 3.0;
    assert_close(sum, s);

    let total: PerformanceCounters = std::iter::repeat(s).take(3).sum();
    assert_close(total / 3_usize, s);
}

#[test]
fn test_div() {
    let delta = pc(900.0, 180.0, 9.0, 1350.0);
    assert_eq!(delta / 9.0, pc(100.0, 20.0, 1.0, 150.0));
    assert_eq!(delta / 9_usize, pc(100.0, 20.0, 1.0, 150.0));

    let mut d = delta;
    d /= 9.0;
    assert_eq!(d, pc(100.0, 20.0, 1.0, 150.0));
}

#[test]
fn test_sum_empty() {
    let total: PerformanceCounters = std::iter::empty::<PerformanceCounters>().sum();
    assert_eq!(total, PerformanceCounters::splat(0.0));
}

#[test]
fn test_field_order() {
    let s = format!("{:?}", pc(1.0, 2.0, 3.0, 4.0));
    assert_eq!(
        s,
        "PerformanceCounters { cycles: 1.0, branches: 2.0, missed_branches: 3.0, instructions: 4.0 }"
    );
}

#[test]
fn test_compare() {
    let a = pc(200.0, 100.0, 10.0, 400.0);
    let b = pc(100.0, 100.0, 15.0, 300.0);
    assert_eq!(
        compare_perf_counters(&a, &b),
        "cycles: 50.00% branches: 0.00% missed_branches: -50.00% instructions: 25.00%"
    );
}

// Counter buffer where slot `i` holds `i * 10`.
unsafe extern "C" fn fake_counters(tid: u32, buf_count: u32, buf: *mut u64) -> c_int {
    assert_eq!(tid, 0);
    assert_eq!(buf_count as usize, KPC_MAX_COUNTERS);
    for i in 0..buf_count as usize {
        *buf.add(i) = i as u64 * 10;
    }
    0
}

unsafe extern "C" fn failing_counters(_: u32, _: u32, _: *mut u64) -> c_int {
    22
}

#[test]
fn test_session_read_mapping() {
    // cycles, instructions, branches, missed branches
    let session = Session::new(fake_counters, [2, 3, 5, 7]).unwrap();

    let mut out = PerformanceCounters::default();
    session.read(&mut out).unwrap();
    assert_eq!(out, pc(20.0, 50.0, 70.0, 30.0));
}

#[test]
fn test_session_read_error_keeps_raw_code() {
    let session = Session::new(failing_counters, [0, 1, 2, 3]).unwrap();

    let mut out = PerformanceCounters::splat(1.0);
    let err = session.read(&mut out).unwrap_err();
    assert!(matches!(
        err,
        Error::Kpc {
            call: "kpc_get_thread_counters",
            code: 22
        }
    ));
    assert_eq!(err.code(), Some(22));
    assert_eq!(out, PerformanceCounters::splat(1.0));
}

#[test]
fn test_session_rejects_out_of_range_map() {
    let err = Session::new(fake_counters, [0, 1, KPC_MAX_COUNTERS, 3]).err().unwrap();
    assert!(matches!(err, Error::CounterMap(idx) if idx == KPC_MAX_COUNTERS));
}
