use std::collections::BTreeSet;

use crate::CoreId;
use crate::pal::Platform;

/// The exclusive upper bound of valid core IDs.
pub(crate) fn core_id_limit(max_core_count: usize) -> CoreId {
    CoreId::try_from(max_core_count).unwrap_or(CoreId::MAX)
}

/// Reads the set of processors the kernel has taken offline.
///
/// An unreadable list (no such file, no permission, not Linux) means no core is offline. IDs at
/// or above `max_core_count` do not exist and are ignored.
pub(crate) fn detect_offline_cores(
    platform: &impl Platform,
    max_core_count: usize,
) -> BTreeSet<CoreId> {
    match platform.offline_cores_contents() {
        Ok(contents) => cpulist::parse_below(&contents, core_id_limit(max_core_count))
            .into_iter()
            .collect(),
        Err(error) => {
            tracing::debug!(%error, "offline processor list is not available, assuming all processors are online");
            BTreeSet::new()
        }
    }
}
