use std::num::NonZero;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

use crate::CoreId;
use crate::pal::{Platform, PlatformFacade};

/// We stop warning about out-of-range core IDs after this many occurrences in the process.
const MAX_OUT_OF_RANGE_WARNINGS: u32 = 20;

static OUT_OF_RANGE_WARNINGS: AtomicU32 = AtomicU32::new(0);

/// Knows how many logical cores there are and which one the current thread is executing on.
#[derive(Debug)]
pub(crate) struct CoreEnumerator {
    platform: PlatformFacade,

    active_core_count: NonZero<usize>,
    max_core_count: NonZero<usize>,
}

impl CoreEnumerator {
    /// Creates a new instance.
    ///
    /// `detected_core_count` is the number of cores listed in the CPU descriptor table.
    /// An `active_core_count_override` of zero means the detected count is used.
    pub(crate) fn new(
        platform: PlatformFacade,
        detected_core_count: usize,
        active_core_count_override: usize,
    ) -> Self {
        let active_core_count = match active_core_count_override {
            0 => detected_core_count,
            count => count,
        };

        let max_core_count = platform.max_core_count();

        Self {
            active_core_count: NonZero::new(active_core_count).unwrap_or(NonZero::<usize>::MIN),
            max_core_count: NonZero::new(max_core_count).unwrap_or(NonZero::<usize>::MIN),
            platform,
        }
    }

    pub(crate) fn active_core_count(&self) -> NonZero<usize> {
        self.active_core_count
    }

    pub(crate) fn max_core_count(&self) -> NonZero<usize> {
        self.max_core_count
    }

    /// Whether the platform is able to tell us which core the current thread is executing on.
    pub(crate) fn is_current_core_supported(&self) -> bool {
        self.platform.current_core_id().is_some()
    }

    /// The core the current thread is executing on.
    ///
    /// If the platform cannot tell, we pretend to always be on core 0. This only degrades
    /// performance of logic that uses the value for locality decisions.
    pub(crate) fn current_core(&self) -> CoreId {
        let Some(core) = self.platform.current_core_id() else {
            return 0;
        };

        let max_core_count = self.max_core_count.get();

        if (core as usize) < max_core_count {
            return core;
        }

        // Some virtualization software reports core IDs beyond the maximum that the
        // operating system told us about. We cannot index with such values, so fold them.
        self.warn_out_of_range(core);

        #[expect(
            clippy::cast_possible_truncation,
            reason = "result of modulo is less than the core ID, which is a CoreId"
        )]
        #[expect(
            clippy::arithmetic_side_effects,
            reason = "modulo cannot overflow and divisor is non-zero"
        )]
        let folded = (core as usize % max_core_count) as CoreId;

        folded
    }

    fn warn_out_of_range(&self, core: CoreId) {
        let should_warn = OUT_OF_RANGE_WARNINGS
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |count| {
                (count < MAX_OUT_OF_RANGE_WARNINGS).then_some(count)?.checked_add(1)
            })
            .is_ok();

        if should_warn {
            warn!(
                core,
                max_core_count = self.max_core_count.get(),
                "the operating system reported an out-of-range core ID for the current thread; \
                this may happen if virtualization software incorrectly virtualizes certain \
                instructions and can negatively affect performance; these warnings will stop \
                after {MAX_OUT_OF_RANGE_WARNINGS} occurrences"
            );
        }
    }

}

#[cfg(test)]
fn out_of_range_warning_count() -> u32 {
    OUT_OF_RANGE_WARNINGS.load(Ordering::Relaxed)
}
