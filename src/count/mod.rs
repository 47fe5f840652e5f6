use std::sync::{Mutex, OnceLock, PoisonError};

use crate::config::Opts;
use crate::ffi::bindings as b;
use crate::ffi::{check, kpc};
use crate::{Error, Result};

mod counters;
#[cfg(test)]
mod test;

pub use counters::*;

static SESSION: OnceLock<Session> = OnceLock::new();
static SETUP: Mutex<()> = Mutex::new(());

/// Programmed counter state, shared by every reader in the process.
pub(crate) struct Session {
    read: b::kpc_get_thread_counters,
    // Indices into the thread counter buffer for
    // cycles, instructions, branches and missed branches.
    map: [usize; 4],
}

impl Session {
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pub(crate) fn new(read: b::kpc_get_thread_counters, map: [usize; 4]) -> Result<Self> {
        if let Some(&idx) = map.iter().find(|&&idx| idx >= b::KPC_MAX_COUNTERS) {
            return Err(Error::CounterMap(idx));
        }
        Ok(Self { read, map })
    }

    fn read(&self, out: &mut PerformanceCounters) -> Result<()> {
        let mut buf = [0_u64; b::KPC_MAX_COUNTERS];
        // tid 0 is the calling thread.
        let code = unsafe { (self.read)(0, b::KPC_MAX_COUNTERS as _, buf.as_mut_ptr()) };
        check("kpc_get_thread_counters", code)?;

        let [cycles, instructions, branches, missed_branches] = self.map.map(|idx| buf[idx]);
        *out = PerformanceCounters::from_raw(cycles, branches, missed_branches, instructions);
        Ok(())
    }
}

/// Sets up the counters with default [`Opts`].
///
/// Must be called before any read, and requires root privileges.
pub fn init() -> Result<()> {
    init_with(&Opts::default())
}

/// Sets up the counters.
///
/// Only the first successful call programs the kernel, later calls
/// return `Ok(())` and ignore `opts`. A failed call leaves nothing behind,
/// so it can be retried.
pub fn init_with(opts: &Opts) -> Result<()> {
    if SESSION.get().is_some() {
        log::debug!("performance counters already initialized");
        return Ok(());
    }

    let _guard = SETUP.lock().unwrap_or_else(PoisonError::into_inner);
    if SESSION.get().is_some() {
        return Ok(());
    }

    let session = kpc!(setup, opts)?;
    // Cannot be taken, we hold the setup lock.
    let _ = SESSION.set(session);
    Ok(())
}

/// Whether [`init`] has succeeded in this process.
pub fn is_initialized() -> bool {
    SESSION.get().is_some()
}

/// Fills `out` with the current counts of the calling thread.
///
/// On failure `out` is left untouched.
pub fn get_counters_checked(out: &mut PerformanceCounters) -> Result<()> {
    SESSION.get().ok_or(Error::Uninitialized)?.read(out)
}

/// Returns the current counts of the calling thread.
pub fn get_counters() -> Result<PerformanceCounters> {
    let mut counters = PerformanceCounters::default();
    get_counters_checked(&mut counters)?;
    Ok(counters)
}
