use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::{CpuTopology, DetectionOptions};

/// Set once a snapshot is installed in `CURRENT`. Once set, callers go straight to the installed
/// snapshot without detecting or reading the environment.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

static CURRENT: Mutex<Option<Arc<CpuTopology>>> = Mutex::new(None);

impl CpuTopology {
    /// Detects the topology and installs it as the process-wide snapshot.
    ///
    /// Detection runs at most once, even with concurrent callers. If the process-wide snapshot
    /// already exists, it is returned as-is and `options` is ignored.
    pub fn init(options: &DetectionOptions) -> Arc<Self> {
        Self::install_with(|| Self::detect(options))
    }

    /// The process-wide snapshot.
    ///
    /// If no snapshot exists yet, one is detected using [`DetectionOptions::from_env()`]. The
    /// environment is only consulted by the call that performs detection.
    #[must_use]
    pub fn current() -> Arc<Self> {
        Self::install_with(|| Self::detect(&DetectionOptions::from_env()))
    }

    /// Whether the process-wide snapshot has been detected.
    #[must_use]
    pub fn is_initialized() -> bool {
        INITIALIZED.load(Ordering::Acquire)
    }

    /// Drops the process-wide snapshot, so the next [`init()`][Self::init] detects again.
    ///
    /// Snapshots already handed out remain valid.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset() {
        let mut current = CURRENT
            .lock()
            .expect("process-wide topology lock should never be poisoned");

        *current = None;
        INITIALIZED.store(false, Ordering::Release);
    }

    /// Returns the installed snapshot, installing the one from `detect` if there is none.
    /// `detect` is only called when no snapshot is installed.
    fn install_with(detect: impl FnOnce() -> Self) -> Arc<Self> {
        if INITIALIZED.load(Ordering::Acquire) {
            if let Some(topology) = installed() {
                return topology;
            }
        }

        let mut current = CURRENT
            .lock()
            .expect("process-wide topology lock should never be poisoned");

        // Another caller may have finished detection while we waited for the lock.
        if let Some(topology) = current.as_ref() {
            return Arc::clone(topology);
        }

        let topology = Arc::new(detect());

        tracing::debug!(
            usable_core_count = topology.usable_core_count().get(),
            max_core_count = topology.max_core_count().get(),
            numa_node_count = topology.max_numa_node_count().get(),
            "detected CPU topology"
        );

        *current = Some(Arc::clone(&topology));
        INITIALIZED.store(true, Ordering::Release);

        topology
    }
}

fn installed() -> Option<Arc<CpuTopology>> {
    CURRENT
        .lock()
        .expect("process-wide topology lock should never be poisoned")
        .clone()
}
