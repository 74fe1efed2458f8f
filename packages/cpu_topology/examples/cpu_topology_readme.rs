//! Prints the process-wide CPU topology snapshot, as shown in the package readme.

use cpu_topology::CpuTopology;

fn main() {
    let topology = CpuTopology::current();

    println!("{topology}");

    println!(
        "Planning for {} of {} processors",
        topology.usable_core_count(),
        topology.max_core_count()
    );

    for node in 0..topology.max_numa_node_count().get() {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "unrealistic to have more than u32::MAX nodes"
        )]
        let node = node as u32;

        println!(
            "NUMA node {node}: {}",
            cpulist::emit(topology.cores_of_numa_node(node).iter().copied())
        );
    }
}
