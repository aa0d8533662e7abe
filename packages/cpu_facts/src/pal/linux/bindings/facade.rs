#![cfg_attr(coverage_nightly, coverage(off))]

use std::fmt::{self, Debug};
#[cfg(test)]
use std::sync::Arc;

use libc::{c_int, c_long};

#[cfg(test)]
use crate::pal::linux::MockBindings;
use crate::pal::linux::{Bindings, BuildTargetBindings};

/// The libc bindings used by the Linux platform: the real ones or, in tests, a mock.
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

impl Bindings for BindingsFacade {
    fn sched_getcpu(&self) -> c_int {
        match self {
            Self::Target(bindings) => bindings.sched_getcpu(),
            #[cfg(test)]
            Self::Mock(mock) => mock.sched_getcpu(),
        }
    }

    fn sysconf(&self, name: c_int) -> c_long {
        match self {
            Self::Target(bindings) => bindings.sysconf(name),
            #[cfg(test)]
            Self::Mock(mock) => mock.sysconf(name),
        }
    }
}

impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
