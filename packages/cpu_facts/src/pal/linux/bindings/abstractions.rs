use std::fmt::Debug;

use libc::{c_int, c_long};

/// The libc functions the Linux platform calls. Nothing else in the crate calls libc on Linux.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    fn sched_getcpu(&self) -> c_int;

    fn sysconf(&self, name: c_int) -> c_long;
}
