//! Observes which core the current thread is executing on, and which NUMA node that core is in.

use std::thread;
use std::time::Duration;

use cpu_topology::CpuTopology;

fn main() {
    let topology = CpuTopology::current();

    for _ in 0..10 {
        let core = topology.current_core();
        let node = topology.numa_node_of_core(core);

        println!("Running on core {core} in NUMA node {node}");

        thread::sleep(Duration::from_millis(100));
    }
}
