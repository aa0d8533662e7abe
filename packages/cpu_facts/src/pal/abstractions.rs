use std::fmt::Debug;

use crate::{CacheLevels, CoreId, NumaNodeId};

/// The operating system facilities we consult to discover hardware facts.
///
/// Every method is a best-effort query: absent or unreadable information is reported via `None`,
/// `false` or zero values and it is up to the caller to decide on a fallback.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Contents of the CPU descriptor table, or `None` if there is no such table.
    fn cpu_descriptor_table(&self) -> Option<String>;

    /// The maximum number of logical cores that could possibly be present, or zero if unknown.
    fn max_core_count(&self) -> usize;

    /// The logical core the current thread is executing on, or `None` if the platform cannot tell.
    ///
    /// The value is passed through as-is from the operating system, which means it may be out of
    /// range on some virtualized systems.
    fn current_core_id(&self) -> Option<CoreId>;

    /// Names of the entries in the NUMA node topology directory, or `None` if there is no such
    /// directory (i.e. the platform has no NUMA support).
    fn numa_node_directory_entries(&self) -> Option<Vec<String>>;

    /// Whether the operating system links the given core to the given NUMA node.
    fn is_core_in_numa_node(&self, core: CoreId, node: NumaNodeId) -> bool;

    /// Data cache sizes, queried live. Unknown values are zero.
    fn cache_levels(&self) -> CacheLevels;

    /// Contents of the frequency scaling governor setting of a core, if available.
    fn scaling_governor(&self, core: CoreId) -> Option<String>;

    /// Contents of the "turbo disabled" processor setting, if available.
    fn turbo_disabled_setting(&self) -> Option<String>;
}
