use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::linux::MockFilesystem;
use crate::pal::linux::{BuildTargetFilesystem, Filesystem};

/// Enum to hide the different filesystem implementations behind a single wrapper type.
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

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Filesystem for FilesystemFacade {
    fn get_cpuinfo_contents(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_cpuinfo_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_cpuinfo_contents(),
        }
    }

    fn get_cpu_offline_contents(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_cpu_offline_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_cpu_offline_contents(),
        }
    }

    fn container_marker_exists(&self) -> bool {
        match self {
            Self::Target(filesystem) => filesystem.container_marker_exists(),
            #[cfg(test)]
            Self::Mock(mock) => mock.container_marker_exists(),
        }
    }

    fn get_v1_cgroup_cpu_quota(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v1_cgroup_cpu_quota(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v1_cgroup_cpu_quota(),
        }
    }

    fn get_v1_cgroup_cpu_period(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v1_cgroup_cpu_period(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v1_cgroup_cpu_period(),
        }
    }

    fn get_v1_cgroup_cpuset(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v1_cgroup_cpuset(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v1_cgroup_cpuset(),
        }
    }

    fn get_v2_cgroup_cpu_max(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v2_cgroup_cpu_max(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v2_cgroup_cpu_max(),
        }
    }

    fn get_v2_cgroup_cpuset(&self) -> io::Result<String> {
        match self {
            Self::Target(filesystem) => filesystem.get_v2_cgroup_cpuset(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_v2_cgroup_cpuset(),
        }
    }

    fn numa_node_dir_exists(&self) -> bool {
        match self {
            Self::Target(filesystem) => filesystem.numa_node_dir_exists(),
            #[cfg(test)]
            Self::Mock(mock) => mock.numa_node_dir_exists(),
        }
    }

    fn get_numa_node_dir_entries(&self) -> io::Result<Vec<String>> {
        match self {
            Self::Target(filesystem) => filesystem.get_numa_node_dir_entries(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_numa_node_dir_entries(),
        }
    }

    fn cpu_node_link_exists(&self, cpu_index: u32, node_index: u32) -> bool {
        match self {
            Self::Target(filesystem) => filesystem.cpu_node_link_exists(cpu_index, node_index),
            #[cfg(test)]
            Self::Mock(mock) => mock.cpu_node_link_exists(cpu_index, node_index),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for FilesystemFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
