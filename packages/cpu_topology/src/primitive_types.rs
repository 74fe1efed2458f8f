/// Identifies a specific logical processor (core).
///
/// This will match the numeric identifier used by standard tooling of the operating system.
/// Core IDs are dense: every ID in `0..max_core_count` refers to a processor that is either
/// present or could be brought online.
pub type CoreId = u32;

/// Identifies a specific NUMA node.
///
/// This will match the numeric identifier used by standard tooling of the operating system.
pub type NumaNodeId = u32;
