use crate::CpuInfo;
#[cfg(any(test, feature = "test-util"))]
use crate::NumaNodeId;
use crate::pal::PlatformFacade;

/// Configures how a [`CpuInfo`] is discovered.
///
/// Use [`CpuInfo::init_with()`] to install the configured instance as the process-wide
/// snapshot, or [`build()`][CpuInfoBuilder::build] to obtain an owned instance that you pass
/// around yourself.
///
/// # Example
///
/// ```
/// use cpu_facts::{CpuInfo, CpuInfoBuilder};
///
/// // Pretend that only two cores are available to the app.
/// let cpu_info = CpuInfoBuilder::new().core_count_override(2).build();
///
/// assert_eq!(cpu_info.active_core_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct CpuInfoBuilder {
    core_count_override: usize,

    #[cfg(any(test, feature = "test-util"))]
    fake_numa_topology: Option<(usize, Box<[NumaNodeId]>)>,

    platform: PlatformFacade,
}

impl CpuInfoBuilder {
    /// Creates a builder that discovers everything from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::target())
    }

    #[must_use]
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            core_count_override: 0,
            #[cfg(any(test, feature = "test-util"))]
            fake_numa_topology: None,
            platform,
        }
    }

    /// Overrides the number of active cores instead of counting the cores listed by the
    /// operating system. Zero means the detected count is used.
    ///
    /// The maximum core count and the NUMA topology are not affected, as they describe the
    /// hardware and not how much of it the app wants to use.
    #[must_use]
    pub fn core_count_override(mut self, count: usize) -> Self {
        self.core_count_override = count;
        self
    }

    /// Replaces the discovered NUMA topology with a fake one in the built instance.
    ///
    /// This is how a fake topology reaches the process-wide snapshot, which cannot be modified
    /// once installed. See [`CpuInfo::set_fake_numa_topology()`] for the meaning of the
    /// arguments.
    ///
    /// # Panics
    ///
    /// [`build()`][Self::build] panics if `core_to_node` does not have exactly one entry per
    /// core or assigns a core to a node that is not less than `max_node_count`.
    #[cfg(any(test, feature = "test-util"))]
    #[must_use]
    pub fn fake_numa_topology(
        mut self,
        max_node_count: usize,
        core_to_node: &[NumaNodeId],
    ) -> Self {
        self.fake_numa_topology = Some((max_node_count, core_to_node.into()));
        self
    }

    /// Discovers the CPU facts and returns them as an owned instance, without touching the
    /// process-wide snapshot.
    #[must_use]
    pub fn build(self) -> CpuInfo {
        #[cfg(any(test, feature = "test-util"))]
        if let Some((max_node_count, core_to_node)) = self.fake_numa_topology {
            let mut cpu_info = CpuInfo::from_platform(self.platform, self.core_count_override);
            cpu_info.set_fake_numa_topology(max_node_count, &core_to_node);
            return cpu_info;
        }

        CpuInfo::from_platform(self.platform, self.core_count_override)
    }
}

impl Default for CpuInfoBuilder {
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::MockPlatform;

    assert_impl_all!(CpuInfoBuilder: Send, Sync, Clone);

    fn platform(descriptor_table: &str, max_core_count: usize) -> PlatformFacade {
        let mut platform = MockPlatform::new();
        platform
            .expect_cpu_descriptor_table()
            .return_const(Some(descriptor_table.to_string()));
        platform
            .expect_max_core_count()
            .return_const(max_core_count);
        platform.expect_current_core_id().return_const(Some(0));
        platform.expect_numa_node_directory_entries().return_const(None);

        PlatformFacade::from_mock(platform)
    }

    #[test]
    fn default_counts_processor_records() {
        let cpu_info = CpuInfoBuilder::with_platform(platform(
            "processor : 0\nprocessor : 1\nprocessor : 2\n",
            8,
        ))
        .build();

        assert_eq!(cpu_info.active_core_count(), 3);
        assert_eq!(cpu_info.max_core_count(), 8);
    }

    #[test]
    fn override_replaces_detected_count() {
        let cpu_info = CpuInfoBuilder::with_platform(platform(
            "processor : 0\nprocessor : 1\nprocessor : 2\n",
            8,
        ))
        .core_count_override(6)
        .build();

        assert_eq!(cpu_info.active_core_count(), 6);
        assert_eq!(cpu_info.max_core_count(), 8);
        assert_eq!(cpu_info.numa().core_to_node().len(), 8);
    }

    #[test]
    fn zero_override_means_detect() {
        let cpu_info = CpuInfoBuilder::with_platform(platform("processor : 0\n", 4))
            .core_count_override(0)
            .build();

        assert_eq!(cpu_info.active_core_count(), 1);
    }

    #[test]
    fn debug_output_includes_configuration() {
        let builder = CpuInfoBuilder::with_platform(platform("processor : 0\n", 4))
            .core_count_override(7);

        let debug = format!("{builder:?}");

        assert!(debug.contains("core_count_override: 7"));
        assert!(debug.contains("platform"));
    }

    #[test]
    fn fake_numa_topology_replaces_discovered() {
        let cpu_info = CpuInfoBuilder::with_platform(platform("processor : 0\n", 4))
            .fake_numa_topology(2, &[1, 0, 1, 0])
            .build();

        assert_eq!(cpu_info.max_numa_node_count(), 2);
        assert_eq!(cpu_info.numa().core_to_node(), &[1, 0, 1, 0]);
        assert_eq!(cpu_info.numa_node_cores(0), &[1, 3]);
        assert_eq!(cpu_info.numa_node_cores(1), &[0, 2]);
        assert_eq!(cpu_info.numa_node_core_index(2), 1);
    }

    #[test]
    fn fake_numa_topology_survives_clone() {
        let builder = CpuInfoBuilder::with_platform(platform("processor : 0\n", 2))
            .fake_numa_topology(3, &[2, 2]);

        let first = builder.clone().build();
        let second = builder.build();

        for cpu_info in [first, second] {
            assert_eq!(cpu_info.max_numa_node_count(), 3);
            assert_eq!(cpu_info.numa_node_cores(2), &[0, 1]);
        }
    }

    #[test]
    #[should_panic]
    fn fake_numa_topology_wrong_length_panics_on_build() {
        let builder = CpuInfoBuilder::with_platform(platform("processor : 0\n", 4))
            .fake_numa_topology(2, &[0, 1]);

        drop(builder.build());
    }
}
