use std::ffi::CStr;
use std::fmt::Debug;
use std::io;

use libc::{c_int, c_long};

/// Bindings for FFI calls into external libraries (either provided by operating system or not).
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    // statfs() on the given path, returning only the filesystem type magic number.
    fn statfs_type(&self, path: &CStr) -> Result<u64, io::Error>;

    // sysconf(), returning -1 for names the C library does not know.
    fn sysconf(&self, name: c_int) -> c_long;

    fn sched_getcpu(&self) -> i32;
}
