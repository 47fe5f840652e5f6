// Only a subset is referenced outside macOS.
#![allow(dead_code, non_camel_case_types)]

use std::ffi::{c_char, c_int, c_void};

// https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/kern/kpc.h
pub const KPC_CLASS_CONFIGURABLE: u32 = 1;
pub const KPC_CLASS_CONFIGURABLE_MASK: u32 = 1 << KPC_CLASS_CONFIGURABLE;

pub const KPC_MAX_COUNTERS: usize = 32;

pub const KPERF_PATH: &str = "/System/Library/PrivateFrameworks/kperf.framework/kperf";
pub const KPERFDATA_PATH: &str =
    "/System/Library/PrivateFrameworks/kperfdata.framework/kperfdata";

pub type kpc_config_t = u64;

// Opaque kpep handles, only ever used behind pointers.
#[repr(C)]
pub struct kpep_db {
    _private: [u8; 0],
}

#[repr(C)]
pub struct kpep_config {
    _private: [u8; 0],
}

#[repr(C)]
pub struct kpep_event {
    _private: [u8; 0],
}

// kperf.framework
pub type kpc_force_all_ctrs_get = unsafe extern "C" fn(val_out: *mut c_int) -> c_int;
pub type kpc_force_all_ctrs_set = unsafe extern "C" fn(val: c_int) -> c_int;
pub type kpc_set_config = unsafe extern "C" fn(classes: u32, config: *mut kpc_config_t) -> c_int;
pub type kpc_set_counting = unsafe extern "C" fn(classes: u32) -> c_int;
pub type kpc_set_thread_counting = unsafe extern "C" fn(classes: u32) -> c_int;
pub type kpc_get_thread_counters =
    unsafe extern "C" fn(tid: u32, buf_count: u32, buf: *mut u64) -> c_int;

// kperfdata.framework
pub type kpep_db_create = unsafe extern "C" fn(name: *const c_char, db_ptr: *mut *mut kpep_db) -> c_int;
pub type kpep_db_free = unsafe extern "C" fn(db: *mut kpep_db);
pub type kpep_db_event = unsafe extern "C" fn(
    db: *mut kpep_db,
    name: *const c_char,
    ev_ptr: *mut *mut kpep_event,
) -> c_int;
pub type kpep_config_create =
    unsafe extern "C" fn(db: *mut kpep_db, cfg_ptr: *mut *mut kpep_config) -> c_int;
pub type kpep_config_free = unsafe extern "C" fn(cfg: *mut kpep_config);
pub type kpep_config_force_counters = unsafe extern "C" fn(cfg: *mut kpep_config) -> c_int;
pub type kpep_config_add_event = unsafe extern "C" fn(
    cfg: *mut kpep_config,
    ev_ptr: *mut *mut kpep_event,
    flag: u32,
    err: *mut u32,
) -> c_int;
pub type kpep_config_kpc_classes =
    unsafe extern "C" fn(cfg: *mut kpep_config, classes_ptr: *mut u32) -> c_int;
pub type kpep_config_kpc_count =
    unsafe extern "C" fn(cfg: *mut kpep_config, count_ptr: *mut usize) -> c_int;
pub type kpep_config_kpc_map =
    unsafe extern "C" fn(cfg: *mut kpep_config, buf: *mut usize, buf_size: usize) -> c_int;
pub type kpep_config_kpc =
    unsafe extern "C" fn(cfg: *mut kpep_config, buf: *mut kpc_config_t, buf_size: usize) -> c_int;

pub type handle = *mut c_void;
