#![cfg_attr(coverage_nightly, coverage(off))]

use std::ffi::CStr;
use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

use libc::{c_int, c_long};

#[cfg(test)]
use crate::pal::linux::MockBindings;
use crate::pal::linux::{Bindings, BuildTargetBindings};

/// Enum to hide the real/mock choice behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum BindingsFacade {
    Target(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    pub(crate) const fn target() -> Self {
        Self::Target(&BuildTargetBindings)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockBindings) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

#[cfg_attr(test, mutants::skip)]
impl Bindings for BindingsFacade {
    fn statfs_type(&self, path: &CStr) -> Result<u64, io::Error> {
        match self {
            Self::Target(bindings) => bindings.statfs_type(path),
            #[cfg(test)]
            Self::Mock(mock) => mock.statfs_type(path),
        }
    }

    fn sysconf(&self, name: c_int) -> c_long {
        match self {
            Self::Target(bindings) => bindings.sysconf(name),
            #[cfg(test)]
            Self::Mock(mock) => mock.sysconf(name),
        }
    }

    fn sched_getcpu(&self) -> i32 {
        match self {
            Self::Target(bindings) => bindings.sched_getcpu(),
            #[cfg(test)]
            Self::Mock(mock) => mock.sched_getcpu(),
        }
    }
}

impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
