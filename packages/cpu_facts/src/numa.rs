//! NUMA topology discovery and the derived lookup structures.
//!
//! The authoritative data is the core-to-node assignment. The node-to-cores lists and each core's
//! index within its node are always derived from it in one pass, so they cannot drift apart.

use std::fmt;

use itertools::Itertools;
use tracing::warn;

use crate::pal::Platform;
use crate::{CoreId, NumaNodeId};

/// Prefix of the NUMA node entries in the NUMA node topology directory.
const NODE_ENTRY_PREFIX: &str = "node";

/// Assignment of logical cores to NUMA nodes.
///
/// Every core in `0..max_core_count` is assigned to exactly one NUMA node in
/// `0..max_node_count`. Systems without NUMA support are reported as having a single NUMA node
/// that contains all cores.
///
/// # Example
///
/// ```
/// use cpu_facts::CpuInfo;
///
/// let cpu_info = CpuInfo::init();
/// let numa = cpu_info.numa();
///
/// let core = cpu_info.current_core();
/// let node = numa.node_of_core(core);
///
/// println!(
///     "Core {core} is slot {} of NUMA node {node}, which contains cores {:?}",
///     numa.core_index_in_node(core),
///     numa.cores_of_node(node)
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NumaTopology {
    max_node_count: usize,

    /// Indexed by core ID.
    core_to_node: Box<[NumaNodeId]>,

    /// Indexed by node ID. Each list is sorted by core ID.
    node_to_cores: Box<[Box<[CoreId]>]>,

    /// Indexed by core ID. Position of the core in its node's entry in `node_to_cores`.
    core_index_in_node: Box<[usize]>,
}

impl NumaTopology {
    /// Discovers the NUMA topology of the platform for cores in `0..max_core_count`.
    pub(crate) fn discover(platform: &impl Platform, max_core_count: usize) -> Self {
        let Some(entries) = platform.numa_node_directory_entries() else {
            // The kernel was built without NUMA support. This is indistinguishable from
            // a real single-node system.
            return Self::single_node(max_core_count);
        };

        let mut max_node_count = entries
            .iter()
            .filter(|entry| entry.starts_with(NODE_ENTRY_PREFIX))
            .count();

        if max_node_count == 0 {
            warn!("NUMA node topology directory contains no nodes; assuming a single NUMA node");
            max_node_count = 1;
        }

        let max_node_id = NumaNodeId::try_from(max_node_count)
            .expect("unrealistic to have more than u32::MAX NUMA nodes");
        let max_core_id =
            CoreId::try_from(max_core_count).expect("unrealistic to have more than u32::MAX cores");

        let core_to_node = (0..max_core_id)
            .map(|core| {
                (0..max_node_id)
                    .find(|node| platform.is_core_in_numa_node(core, *node))
                    .unwrap_or_else(|| {
                        warn!(core, "could not determine NUMA node of core; assuming node 0");
                        0
                    })
            })
            .collect();

        Self::from_assignment(max_node_count, core_to_node)
    }

    /// A topology with a single NUMA node containing all the cores.
    pub(crate) fn single_node(max_core_count: usize) -> Self {
        Self::from_assignment(1, vec![0; max_core_count].into_boxed_slice())
    }

    /// Creates the topology from an assignment of cores to nodes, deriving the reverse lookups.
    ///
    /// # Panics
    ///
    /// Panics if `max_node_count` is zero or if any core is assigned to a node outside
    /// `0..max_node_count`.
    pub(crate) fn from_assignment(max_node_count: usize, core_to_node: Box<[NumaNodeId]>) -> Self {
        assert!(
            max_node_count > 0,
            "there must be at least one NUMA node in the topology"
        );

        let mut node_to_cores = vec![Vec::new(); max_node_count];

        // Iterating in core ID order keeps each node's list sorted and the indexes deterministic.
        let core_index_in_node = core_to_node
            .iter()
            .enumerate()
            .map(|(core, &node)| {
                let cores_of_node = node_to_cores.get_mut(node as usize).unwrap_or_else(|| {
                    panic!(
                        "core {core} is assigned to NUMA node {node} but there are only {max_node_count} NUMA nodes"
                    )
                });

                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "unrealistic to have more than u32::MAX cores"
                )]
                let core = core as CoreId;

                cores_of_node.push(core);

                cores_of_node.len().wrapping_sub(1)
            })
            .collect();

        Self {
            max_node_count,
            core_to_node,
            node_to_cores: node_to_cores
                .into_iter()
                .map(Vec::into_boxed_slice)
                .collect(),
            core_index_in_node,
        }
    }

    /// The number of NUMA nodes. This is always at least 1.
    #[must_use]
    pub fn max_node_count(&self) -> usize {
        self.max_node_count
    }

    /// The NUMA node of every core, indexed by core ID.
    #[must_use]
    pub fn core_to_node(&self) -> &[NumaNodeId] {
        &self.core_to_node
    }

    /// The NUMA node that a core belongs to.
    ///
    /// # Panics
    ///
    /// Panics if the core ID is not in `0..max_core_count`.
    #[must_use]
    pub fn node_of_core(&self, core: CoreId) -> NumaNodeId {
        *self
            .core_to_node
            .get(core as usize)
            .expect("core ID must be less than the maximum core count")
    }

    /// The cores that belong to a NUMA node, sorted by core ID.
    ///
    /// A node may contain no cores (e.g. a memory-only node).
    ///
    /// # Panics
    ///
    /// Panics if the node ID is not in `0..max_node_count`.
    #[must_use]
    pub fn cores_of_node(&self, node: NumaNodeId) -> &[CoreId] {
        self.node_to_cores
            .get(node as usize)
            .expect("NUMA node ID must be less than the maximum NUMA node count")
    }

    /// The position of a core in the list of cores of its NUMA node.
    ///
    /// That is, `cores_of_node(node_of_core(core))[core_index_in_node(core)] == core`.
    ///
    /// # Panics
    ///
    /// Panics if the core ID is not in `0..max_core_count`.
    #[must_use]
    pub fn core_index_in_node(&self, core: CoreId) -> usize {
        *self
            .core_index_in_node
            .get(core as usize)
            .expect("core ID must be less than the maximum core count")
    }

    /// Writes the section of the human-readable hardware summary that describes the NUMA layout.
    pub(crate) fn write_summary(&self, f: &mut impl fmt::Write) -> fmt::Result {
        writeln!(f, "  Numa Nodes: {}", self.max_node_count)?;
        writeln!(
            f,
            "  Numa Nodes of Cores: {}",
            self.core_to_node
                .iter()
                .enumerate()
                .map(|(core, node)| format!("{core}->{node}"))
                .join(" | ")
        )?;

        for (node, cores) in self.node_to_cores.iter().enumerate() {
            writeln!(
                f,
                "  Cores of Numa Node {node}: {}",
                cpulist::emit(cores.iter().copied())
            )?;
        }

        Ok(())
    }
}
