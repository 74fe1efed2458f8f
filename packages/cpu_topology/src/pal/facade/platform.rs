use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, CgroupFilesystem, Platform};
use crate::{CacheInfo, CoreId, NumaNodeId};

/// Enum to hide the real/mock choice behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Target(&'static BuildTargetPlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn target() -> Self {
        Self::Target(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Platform for PlatformFacade {
    fn cpuinfo_contents(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.cpuinfo_contents(),
            #[cfg(test)]
            Self::Mock(p) => p.cpuinfo_contents(),
        }
    }

    fn offline_cores_contents(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.offline_cores_contents(),
            #[cfg(test)]
            Self::Mock(p) => p.offline_cores_contents(),
        }
    }

    fn is_containerized(&self) -> bool {
        match self {
            Self::Target(p) => p.is_containerized(),
            #[cfg(test)]
            Self::Mock(p) => p.is_containerized(),
        }
    }

    fn cgroup_filesystem(&self) -> io::Result<CgroupFilesystem> {
        match self {
            Self::Target(p) => p.cgroup_filesystem(),
            #[cfg(test)]
            Self::Mock(p) => p.cgroup_filesystem(),
        }
    }

    fn cgroup_v1_cpu_quota(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.cgroup_v1_cpu_quota(),
            #[cfg(test)]
            Self::Mock(p) => p.cgroup_v1_cpu_quota(),
        }
    }

    fn cgroup_v1_cpu_period(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.cgroup_v1_cpu_period(),
            #[cfg(test)]
            Self::Mock(p) => p.cgroup_v1_cpu_period(),
        }
    }

    fn cgroup_v1_cpuset(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.cgroup_v1_cpuset(),
            #[cfg(test)]
            Self::Mock(p) => p.cgroup_v1_cpuset(),
        }
    }

    fn cgroup_v2_cpu_max(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.cgroup_v2_cpu_max(),
            #[cfg(test)]
            Self::Mock(p) => p.cgroup_v2_cpu_max(),
        }
    }

    fn cgroup_v2_cpuset(&self) -> io::Result<String> {
        match self {
            Self::Target(p) => p.cgroup_v2_cpuset(),
            #[cfg(test)]
            Self::Mock(p) => p.cgroup_v2_cpuset(),
        }
    }

    fn has_numa_topology(&self) -> bool {
        match self {
            Self::Target(p) => p.has_numa_topology(),
            #[cfg(test)]
            Self::Mock(p) => p.has_numa_topology(),
        }
    }

    fn numa_topology_entries(&self) -> io::Result<Vec<String>> {
        match self {
            Self::Target(p) => p.numa_topology_entries(),
            #[cfg(test)]
            Self::Mock(p) => p.numa_topology_entries(),
        }
    }

    fn is_core_in_numa_node(&self, core: CoreId, node: NumaNodeId) -> bool {
        match self {
            Self::Target(p) => p.is_core_in_numa_node(core, node),
            #[cfg(test)]
            Self::Mock(p) => p.is_core_in_numa_node(core, node),
        }
    }

    fn max_core_count(&self) -> usize {
        match self {
            Self::Target(p) => p.max_core_count(),
            #[cfg(test)]
            Self::Mock(p) => p.max_core_count(),
        }
    }

    fn cache_info(&self) -> CacheInfo {
        match self {
            Self::Target(p) => p.cache_info(),
            #[cfg(test)]
            Self::Mock(p) => p.cache_info(),
        }
    }

    fn current_core(&self) -> Option<CoreId> {
        match self {
            Self::Target(p) => p.current_core(),
            #[cfg(test)]
            Self::Mock(p) => p.current_core(),
        }
    }
}

impl From<&'static BuildTargetPlatform> for PlatformFacade {
    fn from(p: &'static BuildTargetPlatform) -> Self {
        Self::Target(p)
    }
}

#[cfg(test)]
impl From<MockPlatform> for PlatformFacade {
    fn from(p: MockPlatform) -> Self {
        Self::Mock(Arc::new(p))
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
