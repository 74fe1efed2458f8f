use std::env;
use std::num::NonZero;

/// Name of the environment variable that [`DetectionOptions::from_env()`] reads the core count
/// override from.
pub const CORE_COUNT_OVERRIDE_ENV: &str = "CPU_TOPOLOGY_NUM_CORES";

/// Settings that adjust how [`CpuTopology`][crate::CpuTopology] is detected.
///
/// # Example
///
/// ```
/// use std::num::NonZero;
///
/// use cpu_topology::{CpuTopology, DetectionOptions};
///
/// let options = DetectionOptions::new().override_core_count(NonZero::new(2).unwrap());
/// let topology = CpuTopology::detect(&options);
///
/// assert_eq!(topology.usable_core_count().get(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct DetectionOptions {
    core_count_override: Option<NonZero<usize>>,
}

impl DetectionOptions {
    /// Options that leave every detected value as the platform reports it.
    pub const fn new() -> Self {
        Self {
            core_count_override: None,
        }
    }

    /// Reads options from the environment.
    ///
    /// The core count override comes from the variable named by [`CORE_COUNT_OVERRIDE_ENV`].
    /// An absent variable, zero, or a value that is not a number means "no override".
    pub fn from_env() -> Self {
        Self::from_env_value(env::var(CORE_COUNT_OVERRIDE_ENV).ok().as_deref())
    }

    pub(crate) fn from_env_value(value: Option<&str>) -> Self {
        let core_count_override = value.and_then(|value| match value.trim().parse::<usize>() {
            Ok(count) => NonZero::new(count),
            Err(error) => {
                tracing::warn!(
                    %error,
                    value,
                    variable = CORE_COUNT_OVERRIDE_ENV,
                    "ignoring core count override that is not a number"
                );
                None
            }
        });

        Self {
            core_count_override,
        }
    }

    /// Forces the usable core count to `count`, regardless of what the platform reports.
    ///
    /// The override is applied after every other adjustment, including cgroup limits.
    pub const fn override_core_count(mut self, count: NonZero<usize>) -> Self {
        self.core_count_override = Some(count);
        self
    }

    /// The configured core count override, if any.
    #[must_use]
    pub const fn core_count_override(&self) -> Option<NonZero<usize>> {
        self.core_count_override
    }
}
