use std::ffi::CStr;

/// Counter setup options.
///
/// Each counter is resolved against the kpep event database of the running CPU
/// by trying its candidate names in order, the first one found wins.
///
/// # Examples
///
/// ```rust
/// use macos_perf::config::Opts;
///
/// let mut opts = Opts::default();
/// opts.missed_branches = &[c"BRANCH_MISPRED_NONSPEC"];
///
/// // Fails with `Error::Unsupported` outside macOS.
/// let _ = macos_perf::init_with(&opts);
/// ```
#[derive(Clone, Debug)]
pub struct Opts {
    pub cycles: &'static [&'static CStr],
    pub instructions: &'static [&'static CStr],
    pub branches: &'static [&'static CStr],
    pub missed_branches: &'static [&'static CStr],

    /// Name of the kpep database to load, e.g. `c"a14"`.
    ///
    /// `None` picks the database matching the running CPU.
    pub db: Option<&'static CStr>,
}

// Apple Silicon names first, then Intel Macs.
pub const CYCLES: &[&CStr] = &[
    c"FIXED_CYCLES",
    c"CPU_CLK_UNHALTED.THREAD",
    c"CPU_CLK_UNHALTED.CORE",
];

pub const INSTRUCTIONS: &[&CStr] = &[c"FIXED_INSTRUCTIONS", c"INST_RETIRED.ANY"];

pub const BRANCHES: &[&CStr] = &[
    c"INST_BRANCH",
    c"BR_INST_RETIRED.ALL_BRANCHES",
    c"INST_RETIRED.ANY",
];

pub const MISSED_BRANCHES: &[&CStr] = &[
    c"BRANCH_MISPRED_NONSPEC",
    c"BRANCH_MISPREDICT",
    c"BR_MISP_RETIRED.ALL_BRANCHES",
    c"BR_INST_RETIRED.MISPRED",
];

impl Default for Opts {
    fn default() -> Self {
        Self {
            cycles: CYCLES,
            instructions: INSTRUCTIONS,
            branches: BRANCHES,
            missed_branches: MISSED_BRANCHES,
            db: None,
        }
    }
}
