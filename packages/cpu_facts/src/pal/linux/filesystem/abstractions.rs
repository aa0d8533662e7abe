use std::fmt::Debug;

/// The files under `/proc` and `/sys` that describe the processor hardware.
///
/// Reads are synchronous. These files are generated by the kernel on demand and never touch
/// a storage device. Any file may be missing, so every read is optional.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Filesystem: Debug + Send + Sync + 'static {
    /// Get the contents of the `/proc/cpuinfo` file or `None` if it cannot be read.
    ///
    /// This is a plaintext file with `key : value` pairs, blocks separated by empty lines.
    fn get_cpuinfo_contents(&self) -> Option<String>;

    /// Get the names of the entries in the `/sys/devices/system/node` directory or `None` if the
    /// directory does not exist, which happens when the kernel was built without NUMA support.
    ///
    /// Besides the `node{}` subdirectories, this directory also contains files like `possible`
    /// and `online`.
    fn get_numa_node_directory_entries(&self) -> Option<Vec<String>>;

    /// Whether the `/sys/devices/system/cpu/cpu{}/node{}` link exists, which marks the processor
    /// as belonging to that NUMA node.
    fn cpu_numa_node_link_exists(&self, cpu_index: u32, node_index: u32) -> bool;

    /// Gets the contents of the `/sys/devices/system/cpu/cpu{}/cpufreq/scaling_governor` file.
    fn get_cpu_scaling_governor_contents(&self, cpu_index: u32) -> Option<String>;

    /// Gets the contents of the `/sys/devices/system/cpu/intel_pstate/no_turbo` file.
    ///
    /// This file only exists when the Intel P-state frequency scaling driver is in use.
    fn get_intel_pstate_no_turbo_contents(&self) -> Option<String>;
}
