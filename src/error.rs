use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures at the boundary with the kperf frameworks.
///
/// Codes returned by `kpc_*` and `kpep_*` calls are undocumented,
/// they are carried as is and never translated.
#[derive(Debug, Error)]
pub enum Error {
    #[error("kperf is only available on macOS")]
    Unsupported,
    #[error("failed to load {path}: {reason}")]
    Load { path: &'static str, reason: String },
    #[error("missing symbol `{0}`")]
    Symbol(&'static str),
    #[error("permission denied (code {0}), kpc requires root privileges")]
    Permission(i32),
    #[error("no kpep event found for {0}")]
    EventNotFound(&'static str),
    #[error("`{call}` failed with code {code}")]
    Kpep { call: &'static str, code: i32 },
    #[error("`{call}` failed with code {code}")]
    Kpc { call: &'static str, code: i32 },
    #[error("counter index {0} is out of the read buffer")]
    CounterMap(usize),
    #[error("performance counters are not initialized")]
    Uninitialized,
    #[error("cannot measure zero loops")]
    ZeroLoops,
}

impl Error {
    /// Returns the raw code reported by the framework, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Permission(code) | Self::Kpep { code, .. } | Self::Kpc { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}
