use std::fmt::Debug;

use libc::{c_int, c_long};

use crate::pal::linux::Bindings;

/// Calls straight into libc.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

// The failure results (-1) are only observable on exotic kernels.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Bindings for BuildTargetBindings {
    fn sched_getcpu(&self) -> c_int {
        // SAFETY: No safety requirements.
        unsafe { libc::sched_getcpu() }
    }

    fn sysconf(&self, name: c_int) -> c_long {
        // SAFETY: No safety requirements. Unknown names are reported via a -1 return value.
        unsafe { libc::sysconf(name) }
    }
}
