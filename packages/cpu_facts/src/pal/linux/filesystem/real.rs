use std::fmt::Debug;
use std::fs;
use std::path::Path;

use crate::pal::linux::Filesystem;

const NUMA_NODE_DIRECTORY: &str = "/sys/devices/system/node";

/// Reads the real procfs/sysfs files.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetFilesystem;

// NUMA and cpufreq paths only exist on some machines.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Filesystem for BuildTargetFilesystem {
    fn get_cpuinfo_contents(&self) -> Option<String> {
        fs::read_to_string("/proc/cpuinfo").ok()
    }

    fn get_numa_node_directory_entries(&self) -> Option<Vec<String>> {
        let entries = fs::read_dir(NUMA_NODE_DIRECTORY).ok()?;

        Some(
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
        )
    }

    fn cpu_numa_node_link_exists(&self, cpu_index: u32, node_index: u32) -> bool {
        Path::new(&format!(
            "/sys/devices/system/cpu/cpu{cpu_index}/node{node_index}"
        ))
        .exists()
    }

    fn get_cpu_scaling_governor_contents(&self, cpu_index: u32) -> Option<String> {
        fs::read_to_string(format!(
            "/sys/devices/system/cpu/cpu{cpu_index}/cpufreq/scaling_governor"
        ))
        .ok()
    }

    fn get_intel_pstate_no_turbo_contents(&self) -> Option<String> {
        fs::read_to_string("/sys/devices/system/cpu/intel_pstate/no_turbo").ok()
    }
}
