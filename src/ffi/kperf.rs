use std::ffi::{c_int, CStr, CString};
use std::mem::transmute;
use std::ptr::null_mut;

use super::bindings::{self as b, handle};
use super::check;
use crate::config::Opts;
use crate::count::Session;
use crate::{Error, Result};

// Resolves a symbol from a loaded framework as the given fn pointer type.
macro_rules! sym {
    ($lib:expr, $name:ident) => {{
        let ptr = libc::dlsym($lib, concat!(stringify!($name), "\0").as_ptr() as _);
        if ptr.is_null() {
            return Err(Error::Symbol(stringify!($name)));
        }
        transmute::<*mut libc::c_void, b::$name>(ptr)
    }};
}

fn dlopen(path: &'static str) -> Result<handle> {
    let c_path = CString::new(path).map_err(|e| Error::Load {
        path,
        reason: e.to_string(),
    })?;
    let lib = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_LAZY) };
    if !lib.is_null() {
        return Ok(lib);
    }

    let reason = unsafe {
        let msg = libc::dlerror();
        match msg.is_null() {
            true => "unknown dlopen error".to_string(),
            false => CStr::from_ptr(msg).to_string_lossy().into_owned(),
        }
    };
    Err(Error::Load { path, reason })
}

fn check_kpep(call: &'static str, code: c_int) -> Result<()> {
    match code {
        0 => Ok(()),
        code => Err(Error::Kpep { call, code }),
    }
}

struct Kperf {
    force_all_ctrs_get: b::kpc_force_all_ctrs_get,
    force_all_ctrs_set: b::kpc_force_all_ctrs_set,
    set_config: b::kpc_set_config,
    set_counting: b::kpc_set_counting,
    set_thread_counting: b::kpc_set_thread_counting,
    get_thread_counters: b::kpc_get_thread_counters,
}

impl Kperf {
    fn load() -> Result<Self> {
        let lib = dlopen(b::KPERF_PATH)?;
        // The framework stays loaded for the lifetime of the process.
        unsafe {
            Ok(Self {
                force_all_ctrs_get: sym!(lib, kpc_force_all_ctrs_get),
                force_all_ctrs_set: sym!(lib, kpc_force_all_ctrs_set),
                set_config: sym!(lib, kpc_set_config),
                set_counting: sym!(lib, kpc_set_counting),
                set_thread_counting: sym!(lib, kpc_set_thread_counting),
                get_thread_counters: sym!(lib, kpc_get_thread_counters),
            })
        }
    }
}

struct Kperfdata {
    db_create: b::kpep_db_create,
    db_free: b::kpep_db_free,
    db_event: b::kpep_db_event,
    config_create: b::kpep_config_create,
    config_free: b::kpep_config_free,
    config_force_counters: b::kpep_config_force_counters,
    config_add_event: b::kpep_config_add_event,
    config_kpc_classes: b::kpep_config_kpc_classes,
    config_kpc_count: b::kpep_config_kpc_count,
    config_kpc_map: b::kpep_config_kpc_map,
    config_kpc: b::kpep_config_kpc,
}

impl Kperfdata {
    fn load() -> Result<Self> {
        let lib = dlopen(b::KPERFDATA_PATH)?;
        unsafe {
            Ok(Self {
                db_create: sym!(lib, kpep_db_create),
                db_free: sym!(lib, kpep_db_free),
                db_event: sym!(lib, kpep_db_event),
                config_create: sym!(lib, kpep_config_create),
                config_free: sym!(lib, kpep_config_free),
                config_force_counters: sym!(lib, kpep_config_force_counters),
                config_add_event: sym!(lib, kpep_config_add_event),
                config_kpc_classes: sym!(lib, kpep_config_kpc_classes),
                config_kpc_count: sym!(lib, kpep_config_kpc_count),
                config_kpc_map: sym!(lib, kpep_config_kpc_map),
                config_kpc: sym!(lib, kpep_config_kpc),
            })
        }
    }
}

// Owns the kpep database and config, freeing both on drop.
struct Program<'a> {
    data: &'a Kperfdata,
    db: *mut b::kpep_db,
    cfg: *mut b::kpep_config,
}

impl<'a> Program<'a> {
    fn new(data: &'a Kperfdata, db_name: Option<&CStr>) -> Result<Self> {
        let name = db_name.map_or(std::ptr::null(), CStr::as_ptr);

        let mut db = null_mut();
        check_kpep("kpep_db_create", unsafe { (data.db_create)(name, &mut db) })?;

        let mut program = Self {
            data,
            db,
            cfg: null_mut(),
        };

        let mut cfg = null_mut();
        check_kpep("kpep_config_create", unsafe {
            (data.config_create)(program.db, &mut cfg)
        })?;
        program.cfg = cfg;

        check_kpep("kpep_config_force_counters", unsafe {
            (data.config_force_counters)(program.cfg)
        })?;

        Ok(program)
    }

    fn event(&self, counter: &'static str, names: &[&CStr]) -> Result<*mut b::kpep_event> {
        for name in names {
            let mut ev = null_mut();
            let code = unsafe { (self.data.db_event)(self.db, name.as_ptr(), &mut ev) };
            if code == 0 && !ev.is_null() {
                log::debug!("{} counts kpep event {:?}", counter, name);
                return Ok(ev);
            }
            log::warn!("kpep event {:?} for {} not found (code {})", name, counter, code);
        }
        Err(Error::EventNotFound(counter))
    }

    fn add(&self, mut ev: *mut b::kpep_event) -> Result<()> {
        let code = unsafe { (self.data.config_add_event)(self.cfg, &mut ev, 0, null_mut()) };
        check_kpep("kpep_config_add_event", code)
    }
}

impl Drop for Program<'_> {
    fn drop(&mut self) {
        unsafe {
            if !self.cfg.is_null() {
                (self.data.config_free)(self.cfg);
            }
            (self.data.db_free)(self.db);
        }
    }
}

/// Loads the frameworks and programs the kernel to count the four events.
///
/// Events are added in the order cycles, instructions, branches, missed branches;
/// [`Session`] keeps the resulting counter map in that order.
pub fn setup(opts: &Opts) -> Result<Session> {
    let kperf = Kperf::load()?;
    let data = Kperfdata::load()?;

    let mut force = 0;
    let code = unsafe { (kperf.force_all_ctrs_get)(&mut force) };
    if code != 0 {
        return Err(Error::Permission(code));
    }

    let program = Program::new(&data, opts.db)?;

    let events = [
        program.event("cycles", opts.cycles)?,
        program.event("instructions", opts.instructions)?,
        program.event("branches", opts.branches)?,
        program.event("missed_branches", opts.missed_branches)?,
    ];
    for ev in events {
        program.add(ev)?;
    }

    let mut classes = 0;
    check_kpep("kpep_config_kpc_classes", unsafe {
        (data.config_kpc_classes)(program.cfg, &mut classes)
    })?;

    let mut reg_count = 0;
    check_kpep("kpep_config_kpc_count", unsafe {
        (data.config_kpc_count)(program.cfg, &mut reg_count)
    })?;

    let mut map = [0_usize; b::KPC_MAX_COUNTERS];
    check_kpep("kpep_config_kpc_map", unsafe {
        (data.config_kpc_map)(program.cfg, map.as_mut_ptr(), size_of_val(&map))
    })?;

    let mut regs: [b::kpc_config_t; b::KPC_MAX_COUNTERS] = [0; b::KPC_MAX_COUNTERS];
    check_kpep("kpep_config_kpc", unsafe {
        (data.config_kpc)(program.cfg, regs.as_mut_ptr(), size_of_val(&regs))
    })?;

    log::debug!("kpc classes {:#x}, {} configurable registers", classes, reg_count);

    check("kpc_force_all_ctrs_set", unsafe {
        (kperf.force_all_ctrs_set)(1)
    })?;
    if classes & b::KPC_CLASS_CONFIGURABLE_MASK != 0 && reg_count > 0 {
        check("kpc_set_config", unsafe {
            (kperf.set_config)(classes, regs.as_mut_ptr())
        })?;
    }
    check("kpc_set_counting", unsafe { (kperf.set_counting)(classes) })?;
    check("kpc_set_thread_counting", unsafe {
        (kperf.set_thread_counting)(classes)
    })?;

    Session::new(kperf.get_thread_counters, [map[0], map[1], map[2], map[3]])
}
