use std::fmt::Debug;
use std::path::Path;
use std::{fs, io};

use crate::pal::linux::Filesystem;

/// The virtual filesystem for the real operating system that the build is targeting.
///
/// You would only use different filesystems in PAL unit tests that need to use a mock filesystem.
/// Even then, whenever possible, unit tests should use the real filesystem for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetFilesystem;

const NUMA_NODE_DIR: &str = "/sys/devices/system/node";

// Real filesystem bindings are excluded from coverage measurement because:
// 1. They are tested via the real platform tests running on actual Linux.
// 2. Some paths (like cgroups v1 or NUMA sysfs) are not available on all test systems.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Filesystem for BuildTargetFilesystem {
    fn get_cpuinfo_contents(&self) -> io::Result<String> {
        fs::read_to_string("/proc/cpuinfo")
    }

    fn get_cpu_offline_contents(&self) -> io::Result<String> {
        fs::read_to_string("/sys/devices/system/cpu/offline")
    }

    fn container_marker_exists(&self) -> bool {
        Path::new("/.dockerenv").exists()
    }

    fn get_v1_cgroup_cpu_quota(&self) -> io::Result<String> {
        fs::read_to_string("/sys/fs/cgroup/cpu/cpu.cfs_quota_us")
    }

    fn get_v1_cgroup_cpu_period(&self) -> io::Result<String> {
        fs::read_to_string("/sys/fs/cgroup/cpu/cpu.cfs_period_us")
    }

    fn get_v1_cgroup_cpuset(&self) -> io::Result<String> {
        fs::read_to_string("/sys/fs/cgroup/cpuset/cpuset.cpus")
    }

    fn get_v2_cgroup_cpu_max(&self) -> io::Result<String> {
        fs::read_to_string("/sys/fs/cgroup/cpu.max")
    }

    fn get_v2_cgroup_cpuset(&self) -> io::Result<String> {
        fs::read_to_string("/sys/fs/cgroup/cpuset.cpus")
    }

    fn numa_node_dir_exists(&self) -> bool {
        Path::new(NUMA_NODE_DIR).is_dir()
    }

    fn get_numa_node_dir_entries(&self) -> io::Result<Vec<String>> {
        fs::read_dir(NUMA_NODE_DIR)?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect()
    }

    fn cpu_node_link_exists(&self, cpu_index: u32, node_index: u32) -> bool {
        Path::new(&format!(
            "/sys/devices/system/cpu/cpu{cpu_index}/node{node_index}"
        ))
        .exists()
    }
}
