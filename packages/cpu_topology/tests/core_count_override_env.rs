//! The process-wide snapshot reads its core count override from the environment.
//!
//! One test per file to enforce process isolation (the environment and the process-wide
//! snapshot are process-level state).

use cpu_topology::{CORE_COUNT_OVERRIDE_ENV, CpuTopology};

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot call platform APIs.
fn env_override_applies_to_process_wide_snapshot() {
    // SAFETY: This is the only test in this process, so nothing else reads the environment
    // concurrently.
    unsafe {
        std::env::set_var(CORE_COUNT_OVERRIDE_ENV, "3");
    }

    assert!(!CpuTopology::is_initialized());

    let topology = CpuTopology::current();

    assert!(CpuTopology::is_initialized());
    assert_eq!(topology.usable_core_count().get(), 3);

    // The override does not affect what the processor info table reports.
    assert!(topology.raw_core_count().get() >= 1);
}
