use std::fmt::{self, Debug};
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::linux::MockFilesystem;
use crate::pal::linux::{BuildTargetFilesystem, Filesystem};

/// The procfs/sysfs view used by the Linux platform: the real one or, in tests, a mock.
#[derive(Clone)]
pub(crate) enum FilesystemFacade {
    Target(&'static BuildTargetFilesystem),

    #[cfg(test)]
    Mock(Arc<MockFilesystem>),
}

impl FilesystemFacade {
    pub(crate) const fn target() -> Self {
        Self::Target(&BuildTargetFilesystem)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockFilesystem) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Filesystem for FilesystemFacade {
    fn get_cpuinfo_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_cpuinfo_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_cpuinfo_contents(),
        }
    }

    fn get_numa_node_directory_entries(&self) -> Option<Vec<String>> {
        match self {
            Self::Target(filesystem) => filesystem.get_numa_node_directory_entries(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_numa_node_directory_entries(),
        }
    }

    fn cpu_numa_node_link_exists(&self, cpu_index: u32, node_index: u32) -> bool {
        match self {
            Self::Target(filesystem) => filesystem.cpu_numa_node_link_exists(cpu_index, node_index),
            #[cfg(test)]
            Self::Mock(mock) => mock.cpu_numa_node_link_exists(cpu_index, node_index),
        }
    }

    fn get_cpu_scaling_governor_contents(&self, cpu_index: u32) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_cpu_scaling_governor_contents(cpu_index),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_cpu_scaling_governor_contents(cpu_index),
        }
    }

    fn get_intel_pstate_no_turbo_contents(&self) -> Option<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_intel_pstate_no_turbo_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_intel_pstate_no_turbo_contents(),
        }
    }
}

impl Debug for FilesystemFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
