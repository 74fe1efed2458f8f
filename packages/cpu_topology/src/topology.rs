use std::collections::BTreeSet;
use std::num::NonZero;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::cgroup::CgroupLimits;
use crate::cpuinfo::CpuInfoScan;
use crate::numa::NumaTopology;
use crate::offline::detect_offline_cores;
use crate::pal::{Platform, PlatformFacade};
use crate::{CacheInfo, CoreId, DetectionOptions, HardwareFlag, HardwareFlags, NumaNodeId};

/// How many times we complain about the OS reporting a core ID beyond the known range.
const MAX_OUT_OF_RANGE_REPORTS: u32 = 5;

const UNKNOWN_MODEL_NAME: &str = "unknown";

/// A snapshot of the compute topology of the host (or container) the process runs on.
///
/// The snapshot captures processor features, the NUMA layout, cache sizes and, most importantly,
/// how many processors the process should plan to use after container limits and offline
/// processors are taken into account. It is built once and never changes afterwards.
///
/// Most processes want the process-wide snapshot from [`CpuTopology::current()`]. Components
/// that should be testable against a specific configuration can instead accept a `CpuTopology`
/// built by [`CpuTopology::detect()`].
///
/// # Example
///
/// ```
/// use cpu_topology::CpuTopology;
///
/// let topology = CpuTopology::current();
///
/// println!(
///     "Planning for {} of {} processors",
///     topology.usable_core_count(),
///     topology.max_core_count()
/// );
///
/// for core in topology.usable_core_ids() {
///     println!(
///         "Core {core} is in NUMA node {}",
///         topology.numa_node_of_core(core)
///     );
/// }
/// ```
#[derive(Debug)]
pub struct CpuTopology {
    pub(crate) facts: TopologyFacts,

    platform: PlatformFacade,

    current_core_unsupported_reported: AtomicBool,
    current_core_out_of_range_reports: AtomicU32,
}

/// Everything the detection pipeline derives. Identical inputs produce identical facts.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TopologyFacts {
    pub(crate) model_name: String,
    pub(crate) hardware_flags: HardwareFlags,
    pub(crate) cycles_per_ms: u64,
    pub(crate) raw_core_count: NonZero<usize>,
    pub(crate) usable_core_count: NonZero<usize>,
    pub(crate) max_core_count: NonZero<usize>,
    pub(crate) cgroup: CgroupLimits,
    pub(crate) offline_cores: BTreeSet<CoreId>,
    pub(crate) numa: NumaTopology,
    pub(crate) caches: CacheInfo,
}

impl CpuTopology {
    /// Detects the topology of the current host, without touching the process-wide snapshot.
    ///
    /// Detection never fails. Sources that are missing or malformed degrade to conservative
    /// defaults, with diagnostics emitted via `tracing`.
    #[must_use]
    pub fn detect(options: &DetectionOptions) -> Self {
        Self::detect_on(PlatformFacade::target(), options)
    }

    pub(crate) fn detect_on(platform: PlatformFacade, options: &DetectionOptions) -> Self {
        Self {
            facts: TopologyFacts::detect(&platform, options),
            platform,
            current_core_unsupported_reported: AtomicBool::new(false),
            current_core_out_of_range_reports: AtomicU32::new(0),
        }
    }

    /// The processor model name, or `"unknown"` if the platform did not report one.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.facts.model_name
    }

    /// The instruction set extensions supported by at least one processor.
    #[must_use]
    pub fn hardware_flags(&self) -> HardwareFlags {
        self.facts.hardware_flags
    }

    /// Whether the processor supports `flag`.
    #[must_use]
    pub fn is_supported(&self, flag: HardwareFlag) -> bool {
        self.facts.hardware_flags.contains(flag)
    }

    /// Processor cycles per millisecond at the highest clock speed reported by any processor.
    ///
    /// If no clock speed was reported, this is 1 000 000 (a 1 GHz processor).
    #[must_use]
    pub fn cycles_per_ms(&self) -> u64 {
        self.facts.cycles_per_ms
    }

    /// Number of processors listed in the processor info table, before any adjustment.
    #[must_use]
    pub fn raw_core_count(&self) -> NonZero<usize> {
        self.facts.raw_core_count
    }

    /// Number of processors the process should plan to use.
    ///
    /// This accounts for cgroup CPU quota and cpuset limits and for the configured override.
    #[must_use]
    pub fn usable_core_count(&self) -> NonZero<usize> {
        self.facts.usable_core_count
    }

    /// Number of processors the system could possibly have, including offline ones.
    ///
    /// Core IDs range from zero up to (but not including) this value.
    #[must_use]
    pub fn max_core_count(&self) -> NonZero<usize> {
        self.facts.max_core_count
    }

    /// Number of NUMA nodes. NUMA node IDs range from zero up to (but not including) this value.
    #[must_use]
    pub fn max_numa_node_count(&self) -> NonZero<usize> {
        NonZero::new(self.facts.numa.node_count())
            .expect("NUMA detection always produces at least one node")
    }

    /// The NUMA node that `core` belongs to.
    ///
    /// Cores outside the known range are reported as belonging to node 0.
    #[must_use]
    pub fn numa_node_of_core(&self, core: CoreId) -> NumaNodeId {
        self.facts.numa.node_of_core(core).unwrap_or(0)
    }

    /// The cores that belong to `node`, in ascending order. Empty for an unknown node.
    #[must_use]
    pub fn cores_of_numa_node(&self, node: NumaNodeId) -> &[CoreId] {
        self.facts.numa.cores_of_node(node)
    }

    /// The position of `core` in the core list of its NUMA node.
    ///
    /// This is useful for striping work across the cores of a node. `None` for a core outside
    /// the known range.
    #[must_use]
    pub fn core_index_in_numa_node(&self, core: CoreId) -> Option<usize> {
        self.facts.numa.core_index_in_node(core)
    }

    /// The cgroup cpuset of the process, minus offline cores. Empty if there is no cpuset.
    #[must_use]
    pub fn cpuset_cores(&self) -> &[CoreId] {
        &self.facts.cgroup.cpuset_cores
    }

    /// The cores the kernel reports as offline.
    #[must_use]
    pub fn offline_cores(&self) -> &BTreeSet<CoreId> {
        &self.facts.offline_cores
    }

    /// Whether a cgroup CFS quota was found and taken into account.
    #[must_use]
    pub fn is_cgroup_cpu_quota_active(&self) -> bool {
        self.facts.cgroup.cpu_quota_active
    }

    /// Whether a cgroup cpuset was found and taken into account.
    #[must_use]
    pub fn is_cgroup_cpuset_active(&self) -> bool {
        self.facts.cgroup.cpuset_active
    }

    /// Data cache sizes as captured when the snapshot was taken.
    #[must_use]
    pub fn cache_info(&self) -> CacheInfo {
        self.facts.caches
    }

    /// Queries the data cache sizes from the platform again.
    ///
    /// This has no side effects and does not change the snapshot.
    #[must_use]
    pub fn query_cache_info(&self) -> CacheInfo {
        self.platform.cache_info()
    }

    /// The cores the process should use, in order.
    ///
    /// This is the cpuset if one is active, otherwise every core grouped by NUMA node. Offline
    /// cores are never included.
    #[must_use]
    pub fn usable_core_ids(&self) -> Vec<CoreId> {
        let candidates: Vec<CoreId> = if self.facts.cgroup.cpuset_cores.is_empty() {
            self.facts.numa.node_to_cores().concat()
        } else {
            self.facts.cgroup.cpuset_cores.clone()
        };

        candidates
            .into_iter()
            .filter(|core| !self.facts.offline_cores.contains(core))
            .collect()
    }

    /// The core the current thread is executing on.
    ///
    /// Returns 0 if the platform cannot tell. An ID beyond
    /// [`max_core_count()`][Self::max_core_count] is wrapped into range.
    #[must_use]
    pub fn current_core(&self) -> CoreId {
        let max_core_count =
            CoreId::try_from(self.facts.max_core_count.get()).unwrap_or(CoreId::MAX);

        match self.platform.current_core() {
            None => {
                if !self
                    .current_core_unsupported_reported
                    .swap(true, Ordering::Relaxed)
                {
                    tracing::warn!(
                        "the platform cannot report the current processor, assuming processor 0"
                    );
                }

                0
            }
            Some(core) if core < max_core_count => core,
            Some(core) => {
                let should_report = self
                    .current_core_out_of_range_reports
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |reported| {
                        (reported < MAX_OUT_OF_RANGE_REPORTS).then_some(reported.saturating_add(1))
                    })
                    .is_ok();

                if should_report {
                    tracing::warn!(
                        core,
                        max_core_count,
                        "the platform reported a processor beyond the configured processor count"
                    );
                }

                core.checked_rem(max_core_count).unwrap_or(0)
            }
        }
    }

    /// Instruction set extensions that this binary was compiled to use but that the processor
    /// does not support.
    ///
    /// A non-empty result means the binary may crash with illegal instruction errors on this
    /// host. This compares build-time target features with the detected flags; it does not
    /// probe the processor.
    #[must_use]
    pub fn unsupported_flags_for_build(&self) -> Vec<HardwareFlag> {
        HardwareFlags::for_build()
            .difference(self.facts.hardware_flags)
            .iter()
            .collect()
    }

    /// A human-readable multi-line description of the snapshot.
    ///
    /// This is the same as the [`Display`][std::fmt::Display] output.
    #[must_use]
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl TopologyFacts {
    fn detect(platform: &impl Platform, options: &DetectionOptions) -> Self {
        let max_core_count =
            NonZero::new(platform.max_core_count()).unwrap_or(NonZero::<usize>::MIN);

        // Without a processor table, the configured processor count is the best we have.
        let scan = match platform.cpuinfo_contents() {
            Ok(contents) => CpuInfoScan::parse(&contents),
            Err(error) => {
                tracing::warn!(%error, "failed to read the processor info table");
                CpuInfoScan {
                    processor_count: max_core_count.get(),
                    ..CpuInfoScan::default()
                }
            }
        };

        let raw_core_count = NonZero::new(scan.processor_count).unwrap_or(NonZero::<usize>::MIN);

        let offline_cores = detect_offline_cores(platform, max_core_count.get());
        let cgroup = CgroupLimits::detect(
            platform,
            raw_core_count.get(),
            max_core_count.get(),
            &offline_cores,
        );

        let usable_core_count = options.core_count_override().unwrap_or_else(|| {
            NonZero::new(cgroup.core_count).unwrap_or(NonZero::<usize>::MIN)
        });

        let numa = NumaTopology::detect(platform, max_core_count.get());
        let caches = platform.cache_info();
        let cycles_per_ms = scan.cycles_per_ms();

        Self {
            model_name: scan
                .model_name
                .unwrap_or_else(|| UNKNOWN_MODEL_NAME.to_string()),
            hardware_flags: scan.hardware_flags,
            cycles_per_ms,
            raw_core_count,
            usable_core_count,
            max_core_count,
            cgroup,
            offline_cores,
            numa,
            caches,
        }
    }
}
