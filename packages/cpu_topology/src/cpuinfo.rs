//! Scanning of the per-processor info table (`/proc/cpuinfo`).

use crate::HardwareFlags;

/// Clock speed assumed when the processor table does not report one.
const DEFAULT_CYCLES_PER_MS: u64 = 1_000_000;

/// What we learned from one pass over the processor table.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CpuInfoScan {
    /// Union of the flags reported by every processor.
    pub(crate) hardware_flags: HardwareFlags,

    /// Highest clock speed reported by any processor.
    pub(crate) max_mhz: Option<f64>,

    /// Number of `processor` records.
    pub(crate) processor_count: usize,

    /// The last `model name` value seen.
    pub(crate) model_name: Option<String>,
}

impl CpuInfoScan {
    /// Parses the processor table. Lines that are not `key : value` pairs and values that do not
    /// parse are ignored.
    pub(crate) fn parse(contents: &str) -> Self {
        let mut scan = Self::default();

        for (key, value) in contents.lines().filter_map(|line| line.split_once(':')) {
            let value = value.trim();

            match key.trim() {
                "flags" => scan.hardware_flags |= HardwareFlags::from_cpuinfo_flags(value),
                "cpu MHz" => {
                    // Every core reports its current speed. We take the max, assuming the cores
                    // are not in a lower power state while we are doing real work.
                    match value.parse::<f64>() {
                        Ok(mhz) if mhz > scan.max_mhz.unwrap_or(0.0) => scan.max_mhz = Some(mhz),
                        _ => {}
                    }
                }
                "processor" => scan.processor_count = scan.processor_count.saturating_add(1),
                "model name" => scan.model_name = Some(value.to_string()),
                _ => {}
            }
        }

        scan
    }

    /// Processor cycles per millisecond at the highest reported clock speed.
    pub(crate) fn cycles_per_ms(&self) -> u64 {
        match self.max_mhz {
            Some(mhz) if mhz > 0.0 => {
                #[expect(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "positive clock speeds in MHz are far below u64::MAX / 1000"
                )]
                let cycles = (mhz * 1000.0) as u64;
                cycles
            }
            _ => DEFAULT_CYCLES_PER_MS,
        }
    }
}
