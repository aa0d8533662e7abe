//! The configuration of the first initialization of the process-wide snapshot wins.
//!
//! One test per file to enforce process isolation (the snapshot is process-level state).

use cpu_facts::{CpuFeatures, CpuInfo, CpuInfoBuilder};

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn first_configuration_wins() {
    let cpu_info = CpuInfo::init_with(CpuInfoBuilder::new().core_count_override(3));

    assert_eq!(cpu_info.active_core_count(), 3);
    assert!(std::ptr::eq(cpu_info, CpuInfo::current()));

    // Later initialization attempts are ignored.
    let again = CpuInfo::init_with(CpuInfoBuilder::new().core_count_override(5));
    assert!(std::ptr::eq(cpu_info, again));
    assert_eq!(CpuInfo::init().active_core_count(), 3);

    // Features can be toggled through the shared snapshot.
    let hardware = cpu_info.hardware_features();

    for feature in hardware.iter() {
        cpu_info.enable_feature(feature, false);
        assert!(!cpu_info.is_supported(feature));
    }

    assert_eq!(cpu_info.enabled_features(), CpuFeatures::empty());

    for feature in hardware.iter() {
        cpu_info.enable_feature(feature, true);
    }

    assert_eq!(cpu_info.enabled_features(), hardware);
}
