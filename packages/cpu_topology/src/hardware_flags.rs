use std::fmt::{self, Display};
use std::ops::{BitOr, BitOrAssign};

use derive_more::Display;

/// An instruction set extension that the detection pipeline recognizes.
///
/// The display form is the token the Linux kernel uses in the `flags` field of
/// `/proc/cpuinfo`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum HardwareFlag {
    /// Supplemental SSE3.
    #[display("ssse3")]
    Ssse3,

    /// SSE 4.1.
    #[display("sse4_1")]
    Sse4_1,

    /// SSE 4.2.
    #[display("sse4_2")]
    Sse4_2,

    /// Population count instruction.
    #[display("popcnt")]
    Popcnt,

    /// Advanced Vector Extensions.
    #[display("avx")]
    Avx,

    /// Advanced Vector Extensions 2.
    #[display("avx2")]
    Avx2,

    /// AVX-512 foundation.
    #[display("avx512f")]
    Avx512f,

    /// AVX-512 byte and word instructions.
    #[display("avx512bw")]
    Avx512bw,
}

impl HardwareFlag {
    /// Every recognized flag, in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Ssse3,
        Self::Sse4_1,
        Self::Sse4_2,
        Self::Popcnt,
        Self::Avx,
        Self::Avx2,
        Self::Avx512f,
        Self::Avx512bw,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Whether the current binary was compiled to use this extension unconditionally.
    #[must_use]
    pub const fn is_enabled_for_build(self) -> bool {
        match self {
            Self::Ssse3 => cfg!(all(target_arch = "x86_64", target_feature = "ssse3")),
            Self::Sse4_1 => cfg!(all(target_arch = "x86_64", target_feature = "sse4.1")),
            Self::Sse4_2 => cfg!(all(target_arch = "x86_64", target_feature = "sse4.2")),
            Self::Popcnt => cfg!(all(target_arch = "x86_64", target_feature = "popcnt")),
            Self::Avx => cfg!(all(target_arch = "x86_64", target_feature = "avx")),
            Self::Avx2 => cfg!(all(target_arch = "x86_64", target_feature = "avx2")),
            Self::Avx512f => cfg!(all(target_arch = "x86_64", target_feature = "avx512f")),
            Self::Avx512bw => cfg!(all(target_arch = "x86_64", target_feature = "avx512bw")),
        }
    }
}

/// A set of [`HardwareFlag`]s.
///
/// # Example
///
/// ```
/// use cpu_topology::{HardwareFlag, HardwareFlags};
///
/// let flags = HardwareFlags::from_cpuinfo_flags("fpu sse4_2 popcnt");
///
/// assert!(flags.contains(HardwareFlag::Popcnt));
/// assert!(!flags.contains(HardwareFlag::Avx2));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HardwareFlags {
    bits: u32,
}

impl HardwareFlags {
    /// An empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Parses the value of a `flags` line from `/proc/cpuinfo`.
    ///
    /// A flag is present if its kernel token occurs anywhere in the value. This is a substring
    /// match so that vendor-specific decorations of a token still count.
    #[must_use]
    pub fn from_cpuinfo_flags(value: &str) -> Self {
        HardwareFlag::ALL
            .into_iter()
            .filter(|flag| value.contains(&flag.to_string()))
            .fold(Self::empty(), |flags, flag| flags | flag)
    }

    /// The flags the current binary was compiled to use unconditionally.
    #[must_use]
    pub fn for_build() -> Self {
        HardwareFlag::ALL
            .into_iter()
            .filter(|flag| flag.is_enabled_for_build())
            .fold(Self::empty(), |flags, flag| flags | flag)
    }

    /// Whether the set contains `flag`.
    #[must_use]
    pub const fn contains(self, flag: HardwareFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    /// Adds `flag` to the set.
    pub const fn insert(&mut self, flag: HardwareFlag) {
        self.bits |= flag.bit();
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// The flags in `self` that are absent from `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Iterates over the flags in the set, in reporting order.
    pub fn iter(self) -> impl Iterator<Item = HardwareFlag> {
        HardwareFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl BitOr for HardwareFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

impl BitOr<HardwareFlag> for HardwareFlags {
    type Output = Self;

    fn bitor(mut self, rhs: HardwareFlag) -> Self {
        self.insert(rhs);
        self
    }
}

impl BitOrAssign for HardwareFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl FromIterator<HardwareFlag> for HardwareFlags {
    fn from_iter<I: IntoIterator<Item = HardwareFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |flags, flag| flags | flag)
    }
}

impl Display for HardwareFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, flag) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }

            write!(f, "{flag}")?;
        }

        Ok(())
    }
}
