use std::num::NonZero;
use std::thread;

use crate::pal::Platform;
use crate::{CacheLevelInfo, CacheLevels, CoreId, NumaNodeId};

/// Fallback platform implementation for operating systems without native support.
///
/// This implementation provides graceful degradation on unsupported platforms by:
/// - Using `std::thread::available_parallelism()` to determine the maximum core count
/// - Not offering a CPU descriptor table, so no instruction set extensions are reported
/// - Not offering a NUMA topology, so all cores are in a single NUMA node
/// - Not being able to tell which core the current thread is executing on
///
/// On macOS, the cache hierarchy is still reported via `sysctl`.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    fn cpu_descriptor_table(&self) -> Option<String> {
        None
    }

    fn max_core_count(&self) -> usize {
        thread::available_parallelism()
            .map(NonZero::get)
            .unwrap_or(1)
    }

    fn current_core_id(&self) -> Option<CoreId> {
        None
    }

    fn numa_node_directory_entries(&self) -> Option<Vec<String>> {
        None
    }

    fn is_core_in_numa_node(&self, _core: CoreId, _node: NumaNodeId) -> bool {
        false
    }

    #[cfg(target_os = "macos")]
    fn cache_levels(&self) -> CacheLevels {
        let line_size = sysctl_u64(c"hw.cachelinesize");

        [
            CacheLevelInfo::new(sysctl_u64(c"hw.l1dcachesize"), line_size),
            CacheLevelInfo::new(sysctl_u64(c"hw.l2cachesize"), line_size),
            CacheLevelInfo::new(sysctl_u64(c"hw.l3cachesize"), line_size),
        ]
    }

    #[cfg(not(target_os = "macos"))]
    fn cache_levels(&self) -> CacheLevels {
        [CacheLevelInfo::default(); 3]
    }

    fn scaling_governor(&self, _core: CoreId) -> Option<String> {
        None
    }

    fn turbo_disabled_setting(&self) -> Option<String> {
        None
    }
}

/// Reads a 64-bit integer system control value, returning zero if it does not exist.
#[cfg(target_os = "macos")]
#[cfg_attr(coverage_nightly, coverage(off))]
fn sysctl_u64(name: &std::ffi::CStr) -> u64 {
    let mut value: u64 = 0;
    let mut len = size_of::<u64>();

    // SAFETY: The name is a valid C string and the output buffer is valid for `len` bytes.
    let result = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            (&raw mut value).cast(),
            &raw mut len,
            std::ptr::null_mut(),
            0,
        )
    };

    if result == 0 && len == size_of::<u64>() {
        value
    } else {
        0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn reports_degraded_but_valid_facts() {
        let platform = &BUILD_TARGET_PLATFORM;

        assert!(platform.max_core_count() >= 1);
        assert_eq!(platform.cpu_descriptor_table(), None);
        assert_eq!(platform.current_core_id(), None);
        assert_eq!(platform.numa_node_directory_entries(), None);
        assert!(!platform.is_core_in_numa_node(0, 0));
        assert_eq!(platform.scaling_governor(0), None);
        assert_eq!(platform.turbo_disabled_setting(), None);
    }
}
