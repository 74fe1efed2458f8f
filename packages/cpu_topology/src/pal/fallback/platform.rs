use std::io;
use std::num::NonZero;

use crate::pal::{CgroupFilesystem, Platform};
use crate::{CacheInfo, CoreId, NumaNodeId};

/// Fallback platform implementation for operating systems without procfs and sysfs.
///
/// None of the Linux-specific inputs exist here, so every source reports itself as absent:
///
/// * the processor table, offline list, cgroup and NUMA files cannot be read
/// * the process is never considered containerized
/// * the processor count comes from `std::thread::available_parallelism()`
/// * the current processor cannot be queried
///
/// Cache sizes are still reported on Apple targets, which expose them via `sysctl`.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{what} is not available on this platform"),
    )
}

impl Platform for BuildTargetPlatform {
    fn cpuinfo_contents(&self) -> io::Result<String> {
        Err(unsupported("processor info table"))
    }

    fn offline_cores_contents(&self) -> io::Result<String> {
        Err(unsupported("offline processor list"))
    }

    fn is_containerized(&self) -> bool {
        false
    }

    fn cgroup_filesystem(&self) -> io::Result<CgroupFilesystem> {
        Err(unsupported("cgroup filesystem"))
    }

    fn cgroup_v1_cpu_quota(&self) -> io::Result<String> {
        Err(unsupported("cgroup v1 CPU quota"))
    }

    fn cgroup_v1_cpu_period(&self) -> io::Result<String> {
        Err(unsupported("cgroup v1 CPU period"))
    }

    fn cgroup_v1_cpuset(&self) -> io::Result<String> {
        Err(unsupported("cgroup v1 cpuset"))
    }

    fn cgroup_v2_cpu_max(&self) -> io::Result<String> {
        Err(unsupported("cgroup v2 cpu.max"))
    }

    fn cgroup_v2_cpuset(&self) -> io::Result<String> {
        Err(unsupported("cgroup v2 cpuset"))
    }

    fn has_numa_topology(&self) -> bool {
        false
    }

    fn numa_topology_entries(&self) -> io::Result<Vec<String>> {
        Err(unsupported("NUMA topology"))
    }

    fn is_core_in_numa_node(&self, _core: CoreId, _node: NumaNodeId) -> bool {
        false
    }

    fn max_core_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(NonZero::get)
            .unwrap_or(1)
    }

    fn cache_info(&self) -> CacheInfo {
        query_cache_info()
    }

    fn current_core(&self) -> Option<CoreId> {
        None
    }
}

#[cfg(all(target_vendor = "apple", not(miri)))]
#[cfg_attr(coverage_nightly, coverage(off))]
fn query_cache_info() -> CacheInfo {
    use std::ffi::CStr;

    use crate::CacheLevel;

    fn sysctl_u64s(name: &CStr) -> Vec<u64> {
        let mut len: usize = 0;

        // SAFETY: A null buffer asks the kernel for the required length only.
        let result = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                std::ptr::null_mut(),
                &raw mut len,
                std::ptr::null_mut(),
                0,
            )
        };

        if result != 0 || len == 0 {
            return Vec::new();
        }

        let mut values = vec![0_u64; len.div_ceil(size_of::<u64>())];
        let mut len = values.len().saturating_mul(size_of::<u64>());

        // SAFETY: The buffer is valid for `len` bytes and the kernel writes at most `len` bytes,
        // updating `len` to the number actually written.
        let result = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                values.as_mut_ptr().cast(),
                &raw mut len,
                std::ptr::null_mut(),
                0,
            )
        };

        if result == 0 {
            values.truncate(len / size_of::<u64>());
            values
        } else {
            Vec::new()
        }
    }

    // hw.cachesize is [memory, L1d, L2, L3, ...]; a single line size applies to every level.
    let sizes = sysctl_u64s(c"hw.cachesize");
    let size_at = |index: usize| sizes.get(index).copied().unwrap_or(0);
    let line_size = sysctl_u64s(c"hw.cachelinesize")
        .first()
        .copied()
        .unwrap_or(0);

    CacheInfo::default()
        .with_level(CacheLevel::L1, size_at(1), line_size)
        .with_level(CacheLevel::L2, size_at(2), line_size)
        .with_level(CacheLevel::L3, size_at(3), line_size)
}

#[cfg(not(all(target_vendor = "apple", not(miri))))]
fn query_cache_info() -> CacheInfo {
    CacheInfo::default()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn reports_at_least_one_core() {
        assert!(BUILD_TARGET_PLATFORM.max_core_count() >= 1);
    }

    #[test]
    fn linux_sources_are_absent() {
        let platform = BuildTargetPlatform;

        assert!(platform.cpuinfo_contents().is_err());
        assert!(platform.offline_cores_contents().is_err());
        assert!(platform.cgroup_filesystem().is_err());
        assert!(!platform.is_containerized());
        assert!(!platform.has_numa_topology());
        assert!(!platform.is_core_in_numa_node(0, 0));
    }

    #[test]
    fn current_core_is_unsupported() {
        assert_eq!(BuildTargetPlatform.current_core(), None);
    }
}
