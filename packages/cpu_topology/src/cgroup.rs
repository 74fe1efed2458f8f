//! Resolution of the usable core count from cgroup CPU limits.
//!
//! Two independent cgroup controllers can constrain us: the CFS bandwidth controller (a quota
//! of processor time per period) and the cpuset controller (an explicit list of processors).
//! Each is read and interpreted on its own; a source that cannot be read or parsed simply has
//! no influence on the result. Limits can only ever lower the core count, never raise it.

use std::collections::BTreeSet;
use std::io;

use crate::CoreId;
use crate::offline::core_id_limit;
use crate::pal::{CgroupFilesystem, Platform};

/// The two on-disk cgroup schemas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CgroupVersion {
    V1,
    V2,
}

impl CgroupVersion {
    fn from_filesystem(filesystem: CgroupFilesystem) -> Option<Self> {
        match filesystem {
            CgroupFilesystem::Tmpfs => Some(Self::V1),
            CgroupFilesystem::Cgroup2 => Some(Self::V2),
            CgroupFilesystem::Other(_) => None,
        }
    }
}

/// One CFS bandwidth value (quota or period) as read from a cgroup file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CgroupValue {
    /// A positive number of microseconds.
    Limited(i64),

    /// `max`, `-1` or zero: no limit.
    Unlimited,

    /// Not a number we understand.
    Malformed,
}

impl CgroupValue {
    pub(crate) fn parse(text: &str) -> Self {
        let text = text.trim();

        if text == "max" {
            return Self::Unlimited;
        }

        match text.parse::<i64>() {
            Ok(value) if value > 0 => Self::Limited(value),
            Ok(_) => Self::Unlimited,
            Err(_) => Self::Malformed,
        }
    }
}

/// The outcome of applying cgroup limits to the known core count.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CgroupLimits {
    /// The core count after applying the limits. May be zero; the caller applies the floor.
    pub(crate) core_count: usize,

    /// Whether a CFS quota was found and taken into account.
    pub(crate) cpu_quota_active: bool,

    /// Whether a cpuset was found and taken into account.
    pub(crate) cpuset_active: bool,

    /// The processors in the cpuset, minus offline ones. Empty if there is no cpuset.
    pub(crate) cpuset_cores: Vec<CoreId>,
}

impl CgroupLimits {
    /// No cgroup influence: the known core count stands.
    pub(crate) const fn unconfined(core_count: usize) -> Self {
        Self {
            core_count,
            cpu_quota_active: false,
            cpuset_active: false,
            cpuset_cores: Vec::new(),
        }
    }

    /// Reads the cgroup limits of the current process and applies them to `known_core_count`.
    pub(crate) fn detect(
        platform: &impl Platform,
        known_core_count: usize,
        max_core_count: usize,
        offline_cores: &BTreeSet<CoreId>,
    ) -> Self {
        if !platform.is_containerized() {
            tracing::debug!("not running in a container, cgroup limits do not apply");
            return Self::unconfined(known_core_count);
        }

        let version = match platform.cgroup_filesystem() {
            Ok(filesystem) => match CgroupVersion::from_filesystem(filesystem) {
                Some(version) => version,
                None => {
                    tracing::debug!(
                        ?filesystem,
                        "cgroup root has an unrecognized filesystem type, ignoring cgroup limits"
                    );
                    return Self::unconfined(known_core_count);
                }
            },
            Err(error) => {
                tracing::warn!(%error, "failed to identify the cgroup filesystem, ignoring cgroup limits");
                return Self::unconfined(known_core_count);
            }
        };

        let (quota, period) = read_quota_and_period(platform, version);
        let cpuset = read_source(
            match version {
                CgroupVersion::V1 => platform.cgroup_v1_cpuset(),
                CgroupVersion::V2 => platform.cgroup_v2_cpuset(),
            },
            "cpuset",
        );

        Self::from_sources(
            known_core_count,
            max_core_count,
            quota,
            period,
            cpuset.as_deref(),
            offline_cores,
        )
    }

    /// Combines the raw cgroup values into a core count. `None` means the source was unreadable.
    ///
    /// Cpuset IDs at or above `max_core_count` do not exist and are ignored.
    pub(crate) fn from_sources(
        known_core_count: usize,
        max_core_count: usize,
        quota: CgroupValue,
        period: CgroupValue,
        cpuset: Option<&str>,
        offline_cores: &BTreeSet<CoreId>,
    ) -> Self {
        let quota_core_count = quota_core_count(quota, period);
        let cpu_quota_active = quota_core_count.is_some();
        let cfs_core_count = quota_core_count.unwrap_or(known_core_count);

        let cpuset_cores = cpuset
            .filter(|cpuset| !cpuset.trim().is_empty())
            .map(|cpuset| {
                cpulist::parse_below(cpuset, core_id_limit(max_core_count))
                    .into_iter()
                    .filter(|core| !offline_cores.contains(core))
                    .collect::<Vec<_>>()
            });
        let cpuset_active = cpuset_cores.is_some();
        let cpuset_cores = cpuset_cores.unwrap_or_default();
        let cpuset_core_count = if cpuset_active {
            cpuset_cores.len()
        } else {
            known_core_count
        };

        let derived = cfs_core_count.min(cpuset_core_count);

        let core_count = if derived < known_core_count {
            let core_count = derived.max(1);

            tracing::info!(
                cfs_core_count,
                cpuset_core_count,
                core_count,
                "usable core count limited by cgroup configuration"
            );

            core_count
        } else {
            known_core_count
        };

        Self {
            core_count,
            cpu_quota_active,
            cpuset_active,
            cpuset_cores,
        }
    }
}

/// Whole cores' worth of processor time, if both values are present.
fn quota_core_count(quota: CgroupValue, period: CgroupValue) -> Option<usize> {
    match (quota, period) {
        (CgroupValue::Limited(quota), CgroupValue::Limited(period)) => {
            #[expect(clippy::integer_division, reason = "partial cores do not count")]
            let cores = quota / period;

            Some(usize::try_from(cores).unwrap_or(usize::MAX))
        }
        _ => None,
    }
}

fn read_quota_and_period(
    platform: &impl Platform,
    version: CgroupVersion,
) -> (CgroupValue, CgroupValue) {
    let (quota, period) = match version {
        CgroupVersion::V1 => {
            let quota = read_source(platform.cgroup_v1_cpu_quota(), "cpu.cfs_quota_us");
            let period = read_source(platform.cgroup_v1_cpu_period(), "cpu.cfs_period_us");

            (
                quota.as_deref().map_or(CgroupValue::Unlimited, CgroupValue::parse),
                period.as_deref().map_or(CgroupValue::Unlimited, CgroupValue::parse),
            )
        }
        CgroupVersion::V2 => read_source(platform.cgroup_v2_cpu_max(), "cpu.max")
            .as_deref()
            .map_or((CgroupValue::Unlimited, CgroupValue::Unlimited), parse_cpu_max),
    };

    if quota == CgroupValue::Malformed || period == CgroupValue::Malformed {
        tracing::warn!(
            ?quota,
            ?period,
            "cgroup CPU quota could not be parsed, ignoring it"
        );
    }

    (quota, period)
}

/// Parses the cgroup v2 `cpu.max` format: `"<quota> <period>"` where quota may be `max`.
pub(crate) fn parse_cpu_max(text: &str) -> (CgroupValue, CgroupValue) {
    let mut fields = text.split_whitespace();

    let quota = fields.next().map_or(CgroupValue::Malformed, CgroupValue::parse);
    let period = fields.next().map_or(CgroupValue::Malformed, CgroupValue::parse);

    (quota, period)
}

fn read_source(contents: io::Result<String>, source: &'static str) -> Option<String> {
    contents
        .inspect_err(|error| {
            tracing::warn!(%error, source, "failed to read cgroup file, ignoring it");
        })
        .ok()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::pal::MockPlatform;

    const MAX_CORE_COUNT: usize = 64;

    fn not_found() -> io::Error {
        io::Error::from(io::ErrorKind::NotFound)
    }

    fn containerized(filesystem: CgroupFilesystem) -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform.expect_is_containerized().return_const(true);
        platform
            .expect_cgroup_filesystem()
            .returning(move || Ok(filesystem));
        platform
    }

    #[test]
    fn parse_values() {
        assert_eq!(CgroupValue::parse("250000\n"), CgroupValue::Limited(250_000));
        assert_eq!(CgroupValue::parse("-1\n"), CgroupValue::Unlimited);
        assert_eq!(CgroupValue::parse("0"), CgroupValue::Unlimited);
        assert_eq!(CgroupValue::parse("max"), CgroupValue::Unlimited);
        assert_eq!(CgroupValue::parse("lots"), CgroupValue::Malformed);
        assert_eq!(CgroupValue::parse(""), CgroupValue::Malformed);
    }

    #[test]
    fn parse_cpu_max_values() {
        assert_eq!(
            parse_cpu_max("250000 100000\n"),
            (CgroupValue::Limited(250_000), CgroupValue::Limited(100_000))
        );
        assert_eq!(
            parse_cpu_max("max 100000\n"),
            (CgroupValue::Unlimited, CgroupValue::Limited(100_000))
        );
        assert_eq!(
            parse_cpu_max("250000"),
            (CgroupValue::Limited(250_000), CgroupValue::Malformed)
        );
    }

    #[test]
    fn quota_derives_whole_cores() {
        let limits = CgroupLimits::from_sources(
            8,
            MAX_CORE_COUNT,
            CgroupValue::Limited(250_000),
            CgroupValue::Limited(100_000),
            None,
            &BTreeSet::new(),
        );

        assert_eq!(limits.core_count, 2);
        assert!(limits.cpu_quota_active);
        assert!(!limits.cpuset_active);
    }

    #[test]
    fn cpuset_excludes_offline_cores() {
        let limits = CgroupLimits::from_sources(
            8,
            MAX_CORE_COUNT,
            CgroupValue::Unlimited,
            CgroupValue::Limited(100_000),
            Some("0-1,4\n"),
            &BTreeSet::from([1]),
        );

        assert_eq!(limits.cpuset_cores, vec![0, 4]);
        assert_eq!(limits.core_count, 2);
        assert!(limits.cpuset_active);
        assert!(!limits.cpu_quota_active);
    }

    #[test]
    fn smaller_of_two_sources_wins() {
        let limits = CgroupLimits::from_sources(
            16,
            MAX_CORE_COUNT,
            CgroupValue::Limited(400_000),
            CgroupValue::Limited(100_000),
            Some("0-2"),
            &BTreeSet::new(),
        );

        assert_eq!(limits.core_count, 3);
    }

    #[test]
    fn fractional_quota_is_floored_at_one_core() {
        let limits = CgroupLimits::from_sources(
            4,
            MAX_CORE_COUNT,
            CgroupValue::Limited(50_000),
            CgroupValue::Limited(100_000),
            None,
            &BTreeSet::new(),
        );

        assert_eq!(limits.core_count, 1);
    }

    #[test]
    fn cpuset_of_only_offline_cores_is_floored_at_one_core() {
        let limits = CgroupLimits::from_sources(
            4,
            MAX_CORE_COUNT,
            CgroupValue::Unlimited,
            CgroupValue::Unlimited,
            Some("2-3"),
            &BTreeSet::from([2, 3]),
        );

        assert!(limits.cpuset_cores.is_empty());
        assert_eq!(limits.core_count, 1);
    }

    #[test]
    fn limits_never_raise_core_count() {
        let limits = CgroupLimits::from_sources(
            2,
            MAX_CORE_COUNT,
            CgroupValue::Limited(800_000),
            CgroupValue::Limited(100_000),
            Some("0-7"),
            &BTreeSet::new(),
        );

        assert_eq!(limits.core_count, 2);
        assert!(limits.cpu_quota_active);
        assert!(limits.cpuset_active);
    }

    #[test]
    fn whitespace_cpuset_is_no_cpuset() {
        let limits = CgroupLimits::from_sources(
            4,
            MAX_CORE_COUNT,
            CgroupValue::Unlimited,
            CgroupValue::Unlimited,
            Some(" \n"),
            &BTreeSet::new(),
        );

        assert!(!limits.cpuset_active);
        assert_eq!(limits.core_count, 4);
    }

    #[test]
    fn malformed_quota_has_no_influence() {
        let limits = CgroupLimits::from_sources(
            4,
            MAX_CORE_COUNT,
            CgroupValue::Malformed,
            CgroupValue::Limited(100_000),
            None,
            &BTreeSet::new(),
        );

        assert!(!limits.cpu_quota_active);
        assert_eq!(limits.core_count, 4);
    }

    #[test]
    fn not_containerized_is_no_op() {
        let mut platform = MockPlatform::new();
        platform.expect_is_containerized().return_const(false);
        platform.expect_cgroup_filesystem().never();

        let limits = CgroupLimits::detect(&platform, 12, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits, CgroupLimits::unconfined(12));
    }

    #[test]
    fn unknown_filesystem_is_no_op() {
        let mut platform = containerized(CgroupFilesystem::Other(0xEF53));
        platform.expect_cgroup_v1_cpu_quota().never();
        platform.expect_cgroup_v2_cpu_max().never();

        let limits = CgroupLimits::detect(&platform, 12, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits, CgroupLimits::unconfined(12));
    }

    #[test]
    fn statfs_failure_is_no_op() {
        let mut platform = MockPlatform::new();
        platform.expect_is_containerized().return_const(true);
        platform
            .expect_cgroup_filesystem()
            .returning(|| Err(not_found()));

        let limits = CgroupLimits::detect(&platform, 12, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits, CgroupLimits::unconfined(12));
    }

    #[test]
    fn v1_reads_separate_files() {
        let mut platform = containerized(CgroupFilesystem::Tmpfs);
        platform
            .expect_cgroup_v1_cpu_quota()
            .returning(|| Ok("250000\n".to_string()));
        platform
            .expect_cgroup_v1_cpu_period()
            .returning(|| Ok("100000\n".to_string()));
        platform
            .expect_cgroup_v1_cpuset()
            .returning(|| Ok("0-7\n".to_string()));

        let limits = CgroupLimits::detect(&platform, 8, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits.core_count, 2);
        assert!(limits.cpu_quota_active);
        assert!(limits.cpuset_active);
        assert_eq!(limits.cpuset_cores, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn v1_unlimited_quota_keeps_cpuset() {
        let mut platform = containerized(CgroupFilesystem::Tmpfs);
        platform
            .expect_cgroup_v1_cpu_quota()
            .returning(|| Ok("-1\n".to_string()));
        platform
            .expect_cgroup_v1_cpu_period()
            .returning(|| Ok("100000\n".to_string()));
        platform
            .expect_cgroup_v1_cpuset()
            .returning(|| Ok("2-4\n".to_string()));

        let limits = CgroupLimits::detect(&platform, 8, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits.core_count, 3);
        assert!(!limits.cpu_quota_active);
    }

    #[test]
    fn v2_reads_combined_file() {
        let mut platform = containerized(CgroupFilesystem::Cgroup2);
        platform
            .expect_cgroup_v2_cpu_max()
            .returning(|| Ok("300000 100000\n".to_string()));
        platform
            .expect_cgroup_v2_cpuset()
            .returning(|| Ok(String::new()));

        let limits = CgroupLimits::detect(&platform, 8, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits.core_count, 3);
        assert!(limits.cpu_quota_active);
        assert!(!limits.cpuset_active);
    }

    #[test]
    fn unreadable_source_only_disables_itself() {
        let mut platform = containerized(CgroupFilesystem::Cgroup2);
        platform
            .expect_cgroup_v2_cpu_max()
            .returning(|| Err(not_found()));
        platform
            .expect_cgroup_v2_cpuset()
            .returning(|| Ok("0,2\n".to_string()));

        let limits = CgroupLimits::detect(&platform, 8, MAX_CORE_COUNT, &BTreeSet::new());

        assert_eq!(limits.core_count, 2);
        assert!(!limits.cpu_quota_active);
        assert_eq!(limits.cpuset_cores, vec![0, 2]);
    }

    #[test]
    fn cpuset_is_clamped_to_existing_cores() {
        let limits = CgroupLimits::from_sources(
            16,
            8,
            CgroupValue::Unlimited,
            CgroupValue::Unlimited,
            Some("0-4294967295\n"),
            &BTreeSet::new(),
        );

        assert_eq!(limits.cpuset_cores, (0..8).collect::<Vec<_>>());
        assert_eq!(limits.core_count, 8);
    }
}
