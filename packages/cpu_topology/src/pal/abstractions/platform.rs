use std::fmt::Debug;
use std::io;

use crate::{CacheInfo, CoreId, NumaNodeId};

/// The filesystem type mounted at the cgroup root, which tells us the cgroup schema version.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CgroupFilesystem {
    /// A tmpfs mount with per-controller subdirectories (cgroup v1).
    Tmpfs,

    /// The unified cgroup2 hierarchy (cgroup v2).
    Cgroup2,

    /// Anything else, identified by its filesystem magic number.
    Other(u64),
}

/// Everything the detection pipeline needs to know about the host, in raw form.
///
/// Implementations only fetch data. They do not interpret it beyond what is needed to produce
/// the return types here; all parsing and fallback decisions happen in the pipeline, so that
/// the pipeline can be exercised against a mock platform.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// The per-processor info table (`/proc/cpuinfo` on Linux).
    fn cpuinfo_contents(&self) -> io::Result<String>;

    /// The cpulist of processors the kernel has taken offline.
    fn offline_cores_contents(&self) -> io::Result<String>;

    /// Whether the process runs inside a container, based on a marker file.
    fn is_containerized(&self) -> bool;

    /// Identifies the filesystem mounted at the cgroup root.
    fn cgroup_filesystem(&self) -> io::Result<CgroupFilesystem>;

    /// cgroup v1 CFS quota in microseconds (`-1` means unlimited).
    fn cgroup_v1_cpu_quota(&self) -> io::Result<String>;

    /// cgroup v1 CFS period in microseconds.
    fn cgroup_v1_cpu_period(&self) -> io::Result<String>;

    /// cgroup v1 cpuset cpulist.
    fn cgroup_v1_cpuset(&self) -> io::Result<String>;

    /// cgroup v2 combined `"<quota> <period>"` value, where quota may be `max`.
    fn cgroup_v2_cpu_max(&self) -> io::Result<String>;

    /// cgroup v2 cpuset cpulist.
    fn cgroup_v2_cpuset(&self) -> io::Result<String>;

    /// Whether the kernel exposes a NUMA topology directory at all.
    fn has_numa_topology(&self) -> bool;

    /// Names of the entries in the NUMA topology directory.
    fn numa_topology_entries(&self) -> io::Result<Vec<String>>;

    /// Whether the kernel links the given core to the given NUMA node.
    fn is_core_in_numa_node(&self, core: CoreId, node: NumaNodeId) -> bool;

    /// Number of processors configured in the system, including offline ones.
    ///
    /// Zero if the platform cannot tell.
    fn max_core_count(&self) -> usize;

    /// Data cache sizes as reported by the platform, zero where unknown.
    fn cache_info(&self) -> CacheInfo;

    /// The processor the current thread is executing on, or `None` if the platform cannot tell.
    ///
    /// The value is passed through as reported and may exceed the configured processor count.
    fn current_core(&self) -> Option<CoreId>;
}
