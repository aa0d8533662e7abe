#[cfg(target_env = "gnu")]
use libc::c_int;

use crate::pal::Platform;
use crate::pal::linux::{Bindings, BindingsFacade, Filesystem, FilesystemFacade};
use crate::{CacheLevelInfo, CacheLevels, CoreId, NumaNodeId};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(FilesystemFacade::target(), BindingsFacade::target());

// The per-level cache parameters are a glibc extension to sysconf().
#[cfg(target_env = "gnu")]
const CACHE_PARAMETERS: [(c_int, c_int); 3] = [
    (libc::_SC_LEVEL1_DCACHE_SIZE, libc::_SC_LEVEL1_DCACHE_LINESIZE),
    (libc::_SC_LEVEL2_CACHE_SIZE, libc::_SC_LEVEL2_CACHE_LINESIZE),
    (libc::_SC_LEVEL3_CACHE_SIZE, libc::_SC_LEVEL3_CACHE_LINESIZE),
];

/// The platform for Linux, reading the procfs/sysfs virtual filesystems and calling into libc.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    fs: FilesystemFacade,
    bindings: BindingsFacade,
}

impl BuildTargetPlatform {
    pub(crate) const fn new(fs: FilesystemFacade, bindings: BindingsFacade) -> Self {
        Self { fs, bindings }
    }
}

impl Platform for BuildTargetPlatform {
    fn cpu_descriptor_table(&self) -> Option<String> {
        self.fs.get_cpuinfo_contents()
    }

    fn max_core_count(&self) -> usize {
        // This includes offline processors, which is what we want, as array sizing
        // must cover every core that could ever come online.
        usize::try_from(self.bindings.sysconf(libc::_SC_NPROCESSORS_CONF)).unwrap_or_default()
    }

    fn current_core_id(&self) -> Option<CoreId> {
        // The function may exist but the syscall behind it may not be supported by the kernel,
        // in which case it returns -1.
        CoreId::try_from(self.bindings.sched_getcpu()).ok()
    }

    fn numa_node_directory_entries(&self) -> Option<Vec<String>> {
        self.fs.get_numa_node_directory_entries()
    }

    fn is_core_in_numa_node(&self, core: CoreId, node: NumaNodeId) -> bool {
        self.fs.cpu_numa_node_link_exists(core, node)
    }

    #[cfg(target_env = "gnu")]
    fn cache_levels(&self) -> CacheLevels {
        // Some systems (e.g. certain virtual machines) report 0 here instead of real values.
        CACHE_PARAMETERS.map(|(size, line_size)| {
            CacheLevelInfo::from_os_values(
                self.bindings.sysconf(size),
                self.bindings.sysconf(line_size),
            )
        })
    }

    #[cfg(not(target_env = "gnu"))]
    fn cache_levels(&self) -> CacheLevels {
        [CacheLevelInfo::default(); 3]
    }

    fn scaling_governor(&self, core: CoreId) -> Option<String> {
        self.fs.get_cpu_scaling_governor_contents(core)
    }

    fn turbo_disabled_setting(&self) -> Option<String> {
        self.fs.get_intel_pstate_no_turbo_contents()
    }
}
