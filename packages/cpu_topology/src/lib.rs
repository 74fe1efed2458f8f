#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Discovers the compute topology of the host (or container) the process runs on.
//!
//! Schedulers, thread pool sizers and NUMA-aware allocators all need to know how much compute
//! capacity they can actually use. The number of processors in the machine is often the wrong
//! answer: a container may be limited by a cgroup CPU quota or pinned to a cpuset, and the kernel
//! may have taken some processors offline.
//!
//! This package detects, once per process:
//!
//! * the processor model, clock speed and supported instruction set extensions,
//! * the number of processors the process should plan to use, after cgroup v1/v2 quota and
//!   cpuset limits and offline processors are taken into account,
//! * the mapping between processors and NUMA nodes,
//! * data cache sizes.
//!
//! # Quick start
//!
//! ```
//! use cpu_topology::CpuTopology;
//!
//! let topology = CpuTopology::current();
//!
//! let worker_count = topology.usable_core_count().get();
//! println!("Starting {worker_count} workers");
//!
//! for core in topology.usable_core_ids() {
//!     let node = topology.numa_node_of_core(core);
//!     println!("Worker for core {core} allocates from NUMA node {node}");
//! }
//! ```
//!
//! # Degraded environments
//!
//! Detection never fails. If a source of information is missing or malformed (for example,
//! there is no `/proc` or the kernel was built without NUMA support), the snapshot falls back to
//! conservative defaults such as a single NUMA node and at least one usable processor. Each such
//! fallback is reported via the `tracing` crate, so install a subscriber to see why a value looks
//! the way it does.
//!
//! # Overriding the core count
//!
//! Set the `CPU_TOPOLOGY_NUM_CORES` environment variable to a positive integer to override the
//! usable core count of the process-wide snapshot. Use [`DetectionOptions`] to do the same in
//! code.
//!
//! # Platform support
//!
//! Full detection is available on Linux. On other platforms, the snapshot describes a single
//! NUMA node with the processor count reported by the standard library.

mod cache;
mod cgroup;
mod cpuinfo;
mod detection_options;
mod hardware_flags;
mod numa;
mod offline;
mod pal;
mod primitive_types;
mod process_wide;
mod report;
mod topology;

pub use cache::*;
pub use detection_options::*;
pub use hardware_flags::*;
pub use primitive_types::*;
pub use topology::CpuTopology;
