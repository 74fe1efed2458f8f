use std::io;

use libc::c_int;

use crate::pal::linux::{Bindings, BindingsFacade, Filesystem, FilesystemFacade};
use crate::pal::{CgroupFilesystem, Platform};
use crate::{CacheInfo, CacheLevel, CoreId, NumaNodeId};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::target(), FilesystemFacade::target());

/// Magic numbers from `linux/magic.h`.
const TMPFS_MAGIC: u64 = 0x0102_1994;
const CGROUP2_SUPER_MAGIC: u64 = 0x6367_7270;

// glibc sysconf() names for cache geometry. Other C libraries reject them with -1.
const SC_NPROCESSORS_CONF: c_int = libc::_SC_NPROCESSORS_CONF;
const SC_LEVEL1_DCACHE_SIZE: c_int = 188;
const SC_LEVEL1_DCACHE_LINESIZE: c_int = 190;
const SC_LEVEL2_CACHE_SIZE: c_int = 191;
const SC_LEVEL2_CACHE_LINESIZE: c_int = 193;
const SC_LEVEL3_CACHE_SIZE: c_int = 194;
const SC_LEVEL3_CACHE_LINESIZE: c_int = 196;

/// The platform that the build is targeting.
///
/// The real implementation of the platform, using Linux procfs, sysfs and libc. In unit tests,
/// the bindings and filesystem are replaced with mocks.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
    fs: FilesystemFacade,
}

impl BuildTargetPlatform {
    pub(crate) const fn new(bindings: BindingsFacade, fs: FilesystemFacade) -> Self {
        Self { bindings, fs }
    }

    fn sysconf_non_negative(&self, name: c_int) -> u64 {
        // -1 means unsupported and 0 means the C library does not know; both map to "unknown".
        u64::try_from(self.bindings.sysconf(name)).unwrap_or(0)
    }
}

impl Platform for BuildTargetPlatform {
    fn cpuinfo_contents(&self) -> io::Result<String> {
        self.fs.get_cpuinfo_contents()
    }

    fn offline_cores_contents(&self) -> io::Result<String> {
        self.fs.get_cpu_offline_contents()
    }

    fn is_containerized(&self) -> bool {
        self.fs.container_marker_exists()
    }

    fn cgroup_filesystem(&self) -> io::Result<CgroupFilesystem> {
        let magic = self.bindings.statfs_type(c"/sys/fs/cgroup")?;

        Ok(match magic {
            TMPFS_MAGIC => CgroupFilesystem::Tmpfs,
            CGROUP2_SUPER_MAGIC => CgroupFilesystem::Cgroup2,
            other => CgroupFilesystem::Other(other),
        })
    }

    fn cgroup_v1_cpu_quota(&self) -> io::Result<String> {
        self.fs.get_v1_cgroup_cpu_quota()
    }

    fn cgroup_v1_cpu_period(&self) -> io::Result<String> {
        self.fs.get_v1_cgroup_cpu_period()
    }

    fn cgroup_v1_cpuset(&self) -> io::Result<String> {
        self.fs.get_v1_cgroup_cpuset()
    }

    fn cgroup_v2_cpu_max(&self) -> io::Result<String> {
        self.fs.get_v2_cgroup_cpu_max()
    }

    fn cgroup_v2_cpuset(&self) -> io::Result<String> {
        self.fs.get_v2_cgroup_cpuset()
    }

    fn has_numa_topology(&self) -> bool {
        self.fs.numa_node_dir_exists()
    }

    fn numa_topology_entries(&self) -> io::Result<Vec<String>> {
        self.fs.get_numa_node_dir_entries()
    }

    fn is_core_in_numa_node(&self, core: CoreId, node: NumaNodeId) -> bool {
        self.fs.cpu_node_link_exists(core, node)
    }

    fn max_core_count(&self) -> usize {
        usize::try_from(self.sysconf_non_negative(SC_NPROCESSORS_CONF)).unwrap_or(0)
    }

    fn cache_info(&self) -> CacheInfo {
        CacheInfo::default()
            .with_level(
                CacheLevel::L1,
                self.sysconf_non_negative(SC_LEVEL1_DCACHE_SIZE),
                self.sysconf_non_negative(SC_LEVEL1_DCACHE_LINESIZE),
            )
            .with_level(
                CacheLevel::L2,
                self.sysconf_non_negative(SC_LEVEL2_CACHE_SIZE),
                self.sysconf_non_negative(SC_LEVEL2_CACHE_LINESIZE),
            )
            .with_level(
                CacheLevel::L3,
                self.sysconf_non_negative(SC_LEVEL3_CACHE_SIZE),
                self.sysconf_non_negative(SC_LEVEL3_CACHE_LINESIZE),
            )
    }

    fn current_core(&self) -> Option<CoreId> {
        // Negative means the kernel does not support the call.
        CoreId::try_from(self.bindings.sched_getcpu()).ok()
    }
}
