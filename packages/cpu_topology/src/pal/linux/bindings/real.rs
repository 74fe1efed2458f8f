use std::ffi::CStr;
use std::fmt::Debug;
use std::{io, mem};

use libc::{c_int, c_long};

use crate::pal::linux::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

// Real OS bindings are excluded from coverage measurement because:
// 1. They are tested via the real platform tests running on actual Linux.
// 2. Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Bindings for BuildTargetBindings {
    fn statfs_type(&self, path: &CStr) -> Result<u64, io::Error> {
        // SAFETY: All zeroes is a valid statfs.
        let mut stat: libc::statfs = unsafe { mem::zeroed() };

        // SAFETY: The path is a valid NUL-terminated string and the buffer is a valid statfs.
        let result = unsafe { libc::statfs(path.as_ptr(), &raw mut stat) };

        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        #[allow(
            clippy::cast_sign_loss,
            clippy::cast_possible_truncation,
            clippy::cast_lossless,
            clippy::unnecessary_cast,
            reason = "f_type width and signedness differ between targets; magic numbers fit in 32 bits"
        )]
        let fs_type = stat.f_type as u64;

        Ok(fs_type)
    }

    fn sysconf(&self, name: c_int) -> c_long {
        // SAFETY: No safety requirements. Unknown names return -1.
        unsafe { libc::sysconf(name) }
    }

    fn sched_getcpu(&self) -> i32 {
        // SAFETY: No safety requirements.
        unsafe { libc::sched_getcpu() }
    }
}
