use std::fmt::{self, Display, Formatter};

use crate::{CacheLevel, CoreId, CpuTopology, HardwareFlag};

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

impl Display for CpuTopology {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let facts = &self.facts;

        writeln!(f, "Cpu Info:")?;
        writeln!(f, "  Model: {}", facts.model_name)?;
        writeln!(f, "  Cores: {}", facts.usable_core_count)?;
        writeln!(f, "  Max Possible Cores: {}", facts.max_core_count)?;

        for level in CacheLevel::ALL {
            writeln!(
                f,
                "  {level} Cache: {} (Line: {})",
                Bytes(facts.caches.size(level)),
                Bytes(facts.caches.line_size(level))
            )?;
        }

        writeln!(f, "  Hardware Supports:")?;
        for flag in HardwareFlag::ALL {
            if facts.hardware_flags.contains(flag) {
                writeln!(f, "    {flag}")?;
            }
        }

        writeln!(f, "  Numa Nodes: {}", facts.numa.node_count())?;

        write!(f, "  Numa Nodes of Cores:")?;
        for (core, node) in facts.numa.core_to_node().iter().enumerate() {
            write!(f, " {core}->{node} |")?;
        }
        writeln!(f)?;

        write_cores(f, "Cores from CGroup CPUSET", &facts.cgroup.cpuset_cores)?;
        write_cores(f, "Offline Cores", facts.offline_cores.iter())
    }
}

/// Writes a core list in the compact `0-3,7` form, or `None` if empty.
fn write_cores<'a>(
    f: &mut Formatter<'_>,
    title: &str,
    cores: impl IntoIterator<Item = &'a CoreId>,
) -> fmt::Result {
    let list = cpulist::emit(cores.into_iter().copied());

    if list.is_empty() {
        writeln!(f, "  {title}: None")
    } else {
        writeln!(f, "  {title}: {list}")
    }
}

/// A byte quantity, printed with a binary unit and two decimals.
struct Bytes(u64);

impl Display for Bytes {
    #[expect(
        clippy::cast_precision_loss,
        reason = "two decimals of precision is all we print"
    )]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let value = self.0;

        if value >= GIB {
            write!(f, "{:.2} GB", value as f64 / GIB as f64)
        } else if value >= MIB {
            write!(f, "{:.2} MB", value as f64 / MIB as f64)
        } else if value >= KIB {
            write!(f, "{:.2} KB", value as f64 / KIB as f64)
        } else {
            write!(f, "{value} B")
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use super::*;
    use crate::pal::{MockPlatform, PlatformFacade};
    use crate::{CacheInfo, DetectionOptions};

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(Bytes(0).to_string(), "0 B");
        assert_eq!(Bytes(64).to_string(), "64 B");
        assert_eq!(Bytes(32 * KIB).to_string(), "32.00 KB");
        assert_eq!(Bytes(1536 * KIB).to_string(), "1.50 MB");
        assert_eq!(Bytes(3 * GIB).to_string(), "3.00 GB");
    }

    fn two_core_topology(offline: &'static str) -> CpuTopology {
        let mut platform = MockPlatform::new();

        platform.expect_cpuinfo_contents().returning(|| {
            Ok("processor\t: 0\nmodel name\t: Test CPU\nflags\t\t: popcnt sse4_2\n\n\
                processor\t: 1\nmodel name\t: Test CPU\nflags\t\t: popcnt sse4_2\n"
                .to_string())
        });
        platform
            .expect_offline_cores_contents()
            .returning(move || Ok(offline.to_string()));
        platform.expect_is_containerized().return_const(false);
        platform.expect_has_numa_topology().return_const(false);
        platform.expect_max_core_count().return_const(2_usize);
        platform.expect_cache_info().return_const(
            CacheInfo::default()
                .with_level(CacheLevel::L1, 32 * KIB, 64)
                .with_level(CacheLevel::L2, 512 * KIB, 64)
                .with_level(CacheLevel::L3, 16 * MIB, 64),
        );
        platform
            .expect_cgroup_filesystem()
            .returning(|| Err(io::Error::from(io::ErrorKind::Unsupported)));

        CpuTopology::detect_on(PlatformFacade::from_mock(platform), &DetectionOptions::new())
    }

    #[test]
    fn summary_lists_everything() {
        let summary = two_core_topology("\n").summary();

        assert_eq!(
            summary,
            "Cpu Info:\n\
             \x20 Model: Test CPU\n\
             \x20 Cores: 2\n\
             \x20 Max Possible Cores: 2\n\
             \x20 L1 Cache: 32.00 KB (Line: 64 B)\n\
             \x20 L2 Cache: 512.00 KB (Line: 64 B)\n\
             \x20 L3 Cache: 16.00 MB (Line: 64 B)\n\
             \x20 Hardware Supports:\n\
             \x20   sse4_2\n\
             \x20   popcnt\n\
             \x20 Numa Nodes: 1\n\
             \x20 Numa Nodes of Cores: 0->0 | 1->0 |\n\
             \x20 Cores from CGroup CPUSET: None\n\
             \x20 Offline Cores: None\n"
        );
    }

    #[test]
    fn summary_lists_offline_cores() {
        let summary = two_core_topology("0-1\n").summary();

        assert!(summary.ends_with("  Offline Cores: 0-1\n"), "{summary}");
    }
}
