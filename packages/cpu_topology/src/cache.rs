use derive_more::Display;

/// A level in the data cache hierarchy.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the platform interfaces we read from only describe these three levels"
)]
pub enum CacheLevel {
    /// Level 1 data cache.
    L1,

    /// Level 2 cache.
    L2,

    /// Level 3 cache.
    L3,
}

impl CacheLevel {
    /// Every level, from closest to the core outward.
    pub const ALL: [Self; 3] = [Self::L1, Self::L2, Self::L3];
}

/// Size and line size of one cache level, in bytes. Zero means the platform did not say.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
struct CacheGeometry {
    size: u64,
    line_size: u64,
}

/// Data cache sizes of the processor, in bytes.
///
/// A value of zero means the platform did not report it. Zero is never replaced with a guess.
///
/// # Example
///
/// ```
/// use cpu_topology::{CacheLevel, CpuTopology};
///
/// let caches = CpuTopology::current().cache_info();
///
/// for level in CacheLevel::ALL {
///     match caches.size(level) {
///         0 => println!("{level} cache size is unknown"),
///         size => println!("{level} cache is {size} bytes"),
///     }
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CacheInfo {
    l1: CacheGeometry,
    l2: CacheGeometry,
    l3: CacheGeometry,
}

impl CacheInfo {
    /// Returns a copy with the size and line size of `level` replaced.
    #[must_use]
    pub const fn with_level(mut self, level: CacheLevel, size: u64, line_size: u64) -> Self {
        *self.geometry_mut(level) = CacheGeometry { size, line_size };
        self
    }

    /// Size of the cache at `level` in bytes, zero if unknown.
    #[must_use]
    pub const fn size(&self, level: CacheLevel) -> u64 {
        self.geometry(level).size
    }

    /// Line size of the cache at `level` in bytes, zero if unknown.
    #[must_use]
    pub const fn line_size(&self, level: CacheLevel) -> u64 {
        self.geometry(level).line_size
    }

    const fn geometry(&self, level: CacheLevel) -> &CacheGeometry {
        match level {
            CacheLevel::L1 => &self.l1,
            CacheLevel::L2 => &self.l2,
            CacheLevel::L3 => &self.l3,
        }
    }

    const fn geometry_mut(&mut self, level: CacheLevel) -> &mut CacheGeometry {
        match level {
            CacheLevel::L1 => &mut self.l1,
            CacheLevel::L2 => &mut self.l2,
            CacheLevel::L3 => &mut self.l3,
        }
    }
}
