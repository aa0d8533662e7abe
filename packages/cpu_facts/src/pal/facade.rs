use std::fmt::{self, Debug};
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockPlatform;
#[cfg(test)]
use crate::pal::fallback::BuildTargetPlatform as FallbackPlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform};
use crate::{CacheLevels, CoreId, NumaNodeId};

/// The platform that hardware facts are discovered from.
///
/// Tests can also select the fallback platform or a mock, independent of the build target.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Target(&'static BuildTargetPlatform),

    #[cfg(test)]
    Fallback(&'static FallbackPlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn target() -> Self {
        Self::Target(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn fallback() -> Self {
        Self::Fallback(&crate::pal::fallback::BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn cpu_descriptor_table(&self) -> Option<String> {
        match self {
            Self::Target(p) => p.cpu_descriptor_table(),
            #[cfg(test)]
            Self::Fallback(p) => p.cpu_descriptor_table(),
            #[cfg(test)]
            Self::Mock(p) => p.cpu_descriptor_table(),
        }
    }

    fn max_core_count(&self) -> usize {
        match self {
            Self::Target(p) => p.max_core_count(),
            #[cfg(test)]
            Self::Fallback(p) => p.max_core_count(),
            #[cfg(test)]
            Self::Mock(p) => p.max_core_count(),
        }
    }

    fn current_core_id(&self) -> Option<CoreId> {
        match self {
            Self::Target(p) => p.current_core_id(),
            #[cfg(test)]
            Self::Fallback(p) => p.current_core_id(),
            #[cfg(test)]
            Self::Mock(p) => p.current_core_id(),
        }
    }

    fn numa_node_directory_entries(&self) -> Option<Vec<String>> {
        match self {
            Self::Target(p) => p.numa_node_directory_entries(),
            #[cfg(test)]
            Self::Fallback(p) => p.numa_node_directory_entries(),
            #[cfg(test)]
            Self::Mock(p) => p.numa_node_directory_entries(),
        }
    }

    fn is_core_in_numa_node(&self, core: CoreId, node: NumaNodeId) -> bool {
        match self {
            Self::Target(p) => p.is_core_in_numa_node(core, node),
            #[cfg(test)]
            Self::Fallback(p) => p.is_core_in_numa_node(core, node),
            #[cfg(test)]
            Self::Mock(p) => p.is_core_in_numa_node(core, node),
        }
    }

    fn cache_levels(&self) -> CacheLevels {
        match self {
            Self::Target(p) => p.cache_levels(),
            #[cfg(test)]
            Self::Fallback(p) => p.cache_levels(),
            #[cfg(test)]
            Self::Mock(p) => p.cache_levels(),
        }
    }

    fn scaling_governor(&self, core: CoreId) -> Option<String> {
        match self {
            Self::Target(p) => p.scaling_governor(core),
            #[cfg(test)]
            Self::Fallback(p) => p.scaling_governor(core),
            #[cfg(test)]
            Self::Mock(p) => p.scaling_governor(core),
        }
    }

    fn turbo_disabled_setting(&self) -> Option<String> {
        match self {
            Self::Target(p) => p.turbo_disabled_setting(),
            #[cfg(test)]
            Self::Fallback(p) => p.turbo_disabled_setting(),
            #[cfg(test)]
            Self::Mock(p) => p.turbo_disabled_setting(),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Fallback(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
