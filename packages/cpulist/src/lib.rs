#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Utilities for parsing and emitting strings in the `cpulist` format used by Linux to list
//! processor IDs in files such as `/sys/devices/system/cpu/offline` and `cpuset.cpus`.
//!
//! Example cpulist string: `0-9,32-35,40`
//!
//! # Format
//!
//! The value is a comma-separated list of zero or more items, where each item is either:
//!
//! * a single non-negative integer (e.g. `1`)
//! * an inclusive range of integers (e.g. `2-4`)
//!
//! Whitespace around items is ignored, so file contents with a trailing newline can be passed
//! in directly. The identifiers in the list are of size `u32`.
//!
//! # Best-effort parsing
//!
//! The kernel files this format comes from are occasionally truncated or decorated in ways that
//! do not match the format exactly. [`parse()`] therefore never fails: items that cannot be
//! understood are skipped and the remaining items are still returned. Use [`parse_part()`] if
//! you need to know why a specific item was rejected. Use [`parse_below()`] when the identifiers
//! have a known upper bound, to keep ranges from untrusted files from expanding without limit.
//!
//! ```
//! let cores = cpulist::parse("0-3,7,foo,9-11");
//! assert_eq!(cores, vec![0, 1, 2, 3, 7, 9, 10, 11]);
//!
//! println!("As cpulist: {}", cpulist::emit(cores));
//! ```

mod emit;
mod error;
mod parse;

pub use emit::*;
pub use error::*;
pub use parse::*;

pub(crate) type Item = u32;
