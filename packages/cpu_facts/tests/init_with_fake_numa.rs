//! A fake NUMA topology configured on the builder reaches the process-wide snapshot.
//!
//! One test per file to enforce process isolation (the snapshot is process-level state).

use cpu_facts::{CpuInfo, CpuInfoBuilder, NumaNodeId};

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn fake_numa_topology_is_visible_through_current() {
    // An owned instance tells us how many cores the fake topology has to cover.
    let max_core_count = CpuInfoBuilder::new().build().max_core_count();

    let core_to_node = (0..max_core_count)
        .map(|core| NumaNodeId::from(core % 2 == 1))
        .collect::<Vec<_>>();

    CpuInfo::init_with(CpuInfoBuilder::new().fake_numa_topology(2, &core_to_node));

    let numa = CpuInfo::current().numa();

    assert_eq!(numa.max_node_count(), 2);
    assert_eq!(numa.core_to_node(), core_to_node.as_slice());
    assert_eq!(CpuInfo::current().max_numa_node_count(), 2);

    for core in numa.cores_of_node(1) {
        assert_eq!(core % 2, 1);
    }

    assert!(CpuInfo::current().current_numa_node() < 2);
}
