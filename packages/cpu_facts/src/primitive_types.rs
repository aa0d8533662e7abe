/// Identifies a specific logical core.
///
/// This will match the numeric identifier used by standard tooling of the operating system
/// and is always in the range `0..max_core_count`.
pub type CoreId = u32;

/// Identifies a specific NUMA node.
///
/// NUMA node IDs are always in the range `0..max_numa_node_count`. A system without NUMA
/// support is reported as having exactly one node, with ID 0.
pub type NumaNodeId = u32;
