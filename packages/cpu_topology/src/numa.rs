use crate::pal::Platform;
use crate::{CoreId, NumaNodeId};

/// Mapping between cores and NUMA nodes, in both directions.
///
/// All three tables are dense arrays indexed by ID. Every core in `0..max_core_count` belongs
/// to exactly one node, and the per-node core lists are the exact inverse of the core-to-node
/// table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct NumaTopology {
    core_to_node: Box<[NumaNodeId]>,
    node_to_cores: Box<[Vec<CoreId>]>,
    core_index_in_node: Box<[usize]>,
}

impl NumaTopology {
    /// Every core in a single node 0.
    pub(crate) fn single_node(max_core_count: usize) -> Self {
        Self::from_core_to_node(vec![0; max_core_count], 1)
    }

    /// Maps every core in `0..max_core_count` to a node using the kernel's sysfs topology.
    pub(crate) fn detect(platform: &impl Platform, max_core_count: usize) -> Self {
        // The NUMA sysfs entries are only present if the kernel was compiled with NUMA support.
        if !platform.has_numa_topology() {
            tracing::warn!("NUMA topology is not exposed by the kernel, assuming a single node");
            return Self::single_node(max_core_count);
        }

        let node_count = match platform.numa_topology_entries() {
            Ok(entries) => entries.iter().filter(|name| is_node_entry(name)).count(),
            Err(error) => {
                tracing::warn!(%error, "failed to list NUMA nodes");
                0
            }
        };

        let node_count = if node_count == 0 {
            tracing::warn!("found no NUMA nodes, assuming a single node");
            1
        } else {
            node_count
        };

        #[expect(
            clippy::cast_possible_truncation,
            reason = "unrealistic to have more than u32::MAX nodes"
        )]
        let max_node_id = node_count as NumaNodeId;

        let core_to_node = (0..max_core_count)
            .map(|index| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "unrealistic to have more than u32::MAX processors"
                )]
                let core = index as CoreId;

                (0..max_node_id)
                    .find(|node| platform.is_core_in_numa_node(core, *node))
                    .unwrap_or_else(|| {
                        tracing::warn!(core, "could not determine NUMA node of core, assuming node 0");
                        0
                    })
            })
            .collect();

        Self::from_core_to_node(core_to_node, node_count)
    }

    /// Builds the inverse tables. Every entry of `core_to_node` must be below `node_count`.
    fn from_core_to_node(core_to_node: Vec<NumaNodeId>, node_count: usize) -> Self {
        let mut node_to_cores = vec![Vec::new(); node_count];
        let mut core_index_in_node = Vec::with_capacity(core_to_node.len());

        for (index, node) in core_to_node.iter().enumerate() {
            let cores_of_node = node_to_cores
                .get_mut(*node as usize)
                .expect("node IDs are validated against the node count before this point");

            #[expect(
                clippy::cast_possible_truncation,
                reason = "unrealistic to have more than u32::MAX processors"
            )]
            let core = index as CoreId;

            core_index_in_node.push(cores_of_node.len());
            cores_of_node.push(core);
        }

        Self {
            core_to_node: core_to_node.into_boxed_slice(),
            node_to_cores: node_to_cores.into_boxed_slice(),
            core_index_in_node: core_index_in_node.into_boxed_slice(),
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.node_to_cores.len()
    }

    pub(crate) fn node_of_core(&self, core: CoreId) -> Option<NumaNodeId> {
        self.core_to_node.get(core as usize).copied()
    }

    /// The cores of `node` in ascending order, empty for an unknown node.
    pub(crate) fn cores_of_node(&self, node: NumaNodeId) -> &[CoreId] {
        self.node_to_cores
            .get(node as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position of `core` within the core list of its node.
    pub(crate) fn core_index_in_node(&self, core: CoreId) -> Option<usize> {
        self.core_index_in_node.get(core as usize).copied()
    }

    /// Node to core mapping as a slice indexed by node ID.
    pub(crate) fn node_to_cores(&self) -> &[Vec<CoreId>] {
        &self.node_to_cores
    }

    /// Core to node mapping as a slice indexed by core ID.
    pub(crate) fn core_to_node(&self) -> &[NumaNodeId] {
        &self.core_to_node
    }
}

fn is_node_entry(name: &str) -> bool {
    name.strip_prefix("node")
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use mockall::predicate::{always, eq};

    use super::*;
    use crate::pal::MockPlatform;

    fn assert_is_partition(topology: &NumaTopology, max_core_count: usize) {
        let mut seen = vec![false; max_core_count];

        for (node, cores) in topology.node_to_cores().iter().enumerate() {
            for (position, core) in cores.iter().enumerate() {
                assert!(!seen[*core as usize], "core {core} is in two nodes");
                seen[*core as usize] = true;

                assert_eq!(topology.node_of_core(*core), Some(node as NumaNodeId));
                assert_eq!(topology.core_index_in_node(*core), Some(position));
            }
        }

        assert!(seen.iter().all(|seen| *seen), "some core is in no node");
    }

    #[test]
    fn missing_sysfs_is_single_node() {
        let mut platform = MockPlatform::new();
        platform.expect_has_numa_topology().return_const(false);
        platform.expect_numa_topology_entries().never();

        let topology = NumaTopology::detect(&platform, 4);

        assert_eq!(topology.node_count(), 1);
        assert_eq!(topology.cores_of_node(0), &[0, 1, 2, 3]);
        assert_eq!(topology.core_to_node(), &[0, 0, 0, 0]);
        assert_is_partition(&topology, 4);
    }

    #[test]
    fn maps_cores_by_node_links() {
        let mut platform = MockPlatform::new();
        platform.expect_has_numa_topology().return_const(true);
        platform.expect_numa_topology_entries().returning(|| {
            Ok(vec![
                "node0".to_string(),
                "node1".to_string(),
                "possible".to_string(),
                "online".to_string(),
                "has_cpu".to_string(),
            ])
        });
        // Cores 1 and 3 are in node 1, the rest in node 0.
        platform
            .expect_is_core_in_numa_node()
            .returning(|core, node| (core % 2 == 1) == (node == 1));

        let topology = NumaTopology::detect(&platform, 5);

        assert_eq!(topology.node_count(), 2);
        assert_eq!(topology.cores_of_node(0), &[0, 2, 4]);
        assert_eq!(topology.cores_of_node(1), &[1, 3]);
        assert_eq!(topology.core_index_in_node(4), Some(2));
        assert_eq!(topology.core_index_in_node(3), Some(1));
        assert_is_partition(&topology, 5);
    }

    #[test]
    fn first_claiming_node_wins() {
        let mut platform = MockPlatform::new();
        platform.expect_has_numa_topology().return_const(true);
        platform
            .expect_numa_topology_entries()
            .returning(|| Ok(vec!["node0".to_string(), "node1".to_string()]));
        platform.expect_is_core_in_numa_node().return_const(true);

        let topology = NumaTopology::detect(&platform, 2);

        assert_eq!(topology.core_to_node(), &[0, 0]);
        assert!(topology.cores_of_node(1).is_empty());
        assert_is_partition(&topology, 2);
    }

    #[test]
    fn unclaimed_core_goes_to_node_zero() {
        let mut platform = MockPlatform::new();
        platform.expect_has_numa_topology().return_const(true);
        platform
            .expect_numa_topology_entries()
            .returning(|| Ok(vec!["node0".to_string(), "node1".to_string()]));
        platform
            .expect_is_core_in_numa_node()
            .with(eq(2), always())
            .return_const(false);
        platform
            .expect_is_core_in_numa_node()
            .returning(|_, node| node == 1);

        let topology = NumaTopology::detect(&platform, 3);

        assert_eq!(topology.core_to_node(), &[1, 1, 0]);
        assert_eq!(topology.cores_of_node(0), &[2]);
        assert_is_partition(&topology, 3);
    }

    #[test]
    fn no_node_entries_is_single_node() {
        let mut platform = MockPlatform::new();
        platform.expect_has_numa_topology().return_const(true);
        platform
            .expect_numa_topology_entries()
            .returning(|| Ok(vec!["possible".to_string(), "nodeX".to_string()]));
        platform.expect_is_core_in_numa_node().return_const(false);

        let topology = NumaTopology::detect(&platform, 3);

        assert_eq!(topology.node_count(), 1);
        assert_eq!(topology.cores_of_node(0), &[0, 1, 2]);
    }

    #[test]
    fn unreadable_node_dir_is_single_node() {
        let mut platform = MockPlatform::new();
        platform.expect_has_numa_topology().return_const(true);
        platform
            .expect_numa_topology_entries()
            .returning(|| Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        platform
            .expect_is_core_in_numa_node()
            .with(always(), eq(0))
            .return_const(true);

        let topology = NumaTopology::detect(&platform, 2);

        assert_eq!(topology.node_count(), 1);
        assert_is_partition(&topology, 2);
    }

    #[test]
    fn unknown_ids_are_empty() {
        let topology = NumaTopology::single_node(2);

        assert!(topology.cores_of_node(7).is_empty());
        assert_eq!(topology.node_of_core(2), None);
        assert_eq!(topology.core_index_in_node(2), None);
    }

    #[test]
    fn node_entry_names() {
        assert!(is_node_entry("node0"));
        assert!(is_node_entry("node12"));
        assert!(!is_node_entry("node"));
        assert!(!is_node_entry("nodes"));
        assert!(!is_node_entry("possible"));
    }
}
