#![cfg_attr(
    test,
    expect(
        clippy::struct_field_names,
        reason = "false positive from automock generated code"
    )
)]

use std::fmt::Debug;
use std::io;

/// Linux has this funny notion of exposing various OS APIs as a virtual filesystem. This trait
/// abstracts this virtual filesystem to allow it to be mocked.
///
/// The scope of this trait is limited to only the virtual filesystem exposed by the OS. We do not
/// expect to do "real" file I/O in this layer. All I/O is synchronous and blocking because we
/// expect it to hit a fast path in the OS, given the data is never on a real storage device.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Filesystem: Debug + Send + Sync + 'static {
    /// Get the contents of the /proc/cpuinfo file.
    ///
    /// This is a plaintext file with "key    : value" pairs, blocks separated by empty lines.
    fn get_cpuinfo_contents(&self) -> io::Result<String>;

    /// Get the contents of the /sys/devices/system/cpu/offline file.
    ///
    /// This is a cpulist format file ("0,1,2-4" style list), empty if every processor is online.
    fn get_cpu_offline_contents(&self) -> io::Result<String>;

    /// Whether the /.dockerenv marker file exists.
    fn container_marker_exists(&self) -> bool;

    /// Contents of `/sys/fs/cgroup/cpu/cpu.cfs_quota_us`.
    fn get_v1_cgroup_cpu_quota(&self) -> io::Result<String>;

    /// Contents of `/sys/fs/cgroup/cpu/cpu.cfs_period_us`.
    fn get_v1_cgroup_cpu_period(&self) -> io::Result<String>;

    /// Contents of `/sys/fs/cgroup/cpuset/cpuset.cpus`.
    fn get_v1_cgroup_cpuset(&self) -> io::Result<String>;

    /// Contents of `/sys/fs/cgroup/cpu.max`.
    fn get_v2_cgroup_cpu_max(&self) -> io::Result<String>;

    /// Contents of `/sys/fs/cgroup/cpuset.cpus`.
    fn get_v2_cgroup_cpuset(&self) -> io::Result<String>;

    /// Whether /sys/devices/system/node exists and is a directory.
    ///
    /// It is only present if the kernel was compiled with NUMA support.
    fn numa_node_dir_exists(&self) -> bool;

    /// File names of the entries in /sys/devices/system/node.
    fn get_numa_node_dir_entries(&self) -> io::Result<Vec<String>>;

    /// Whether the /sys/devices/system/cpu/cpu{cpu_index}/node{node_index} symlink exists.
    fn cpu_node_link_exists(&self, cpu_index: u32, node_index: u32) -> bool;
}
