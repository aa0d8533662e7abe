//! Checks for system settings that make performance measurements unreliable.
//!
//! These checks only log warnings. They are meant to be called by benchmark harnesses before
//! taking measurements, so that noisy results can be traced back to their cause.

use tracing::warn;

use crate::pal::Platform;
use crate::{CoreId, CpuInfo};

/// The frequency scaling governor that keeps cores at their maximum clock rate.
const PERFORMANCE_GOVERNOR: &str = "performance";

/// Value of the turbo boost control that means turbo boost is disabled.
const TURBO_DISABLED: &str = "1";

/// Warns about every active core whose frequency scaling governor is not `performance`.
///
/// Cores whose governor cannot be read (e.g. because the operating system does not expose
/// frequency scaling) are not warned about.
///
/// Returns the number of cores that were warned about.
///
/// # Example
///
/// ```
/// use cpu_facts::CpuInfo;
/// use cpu_facts::diagnostics::verify_performance_governor;
///
/// let cpu_info = CpuInfo::init();
///
/// if verify_performance_governor(cpu_info) > 0 {
///     println!("Benchmark results may be noisy due to frequency scaling");
/// }
/// ```
pub fn verify_performance_governor(cpu_info: &CpuInfo) -> usize {
    let platform = cpu_info.platform();

    (0..cpu_info.active_core_count())
        .filter_map(|core| {
            let core = CoreId::try_from(core).ok()?;
            let contents = platform.scaling_governor(core)?;
            let governor = first_line(&contents);

            (governor != PERFORMANCE_GOVERNOR).then(|| {
                warn!(
                    core,
                    governor,
                    "core is not using the '{PERFORMANCE_GOVERNOR}' frequency scaling governor; \
                    performance measurements may be unreliable"
                );
            })
        })
        .count()
}

/// Warns if turbo boost is not disabled.
///
/// Turbo boost makes the clock rate depend on thermal conditions and on how many cores are busy,
/// which makes performance measurements unreliable. Nothing is warned about if the setting
/// cannot be read.
///
/// Returns whether a warning was logged.
pub fn verify_turbo_disabled(cpu_info: &CpuInfo) -> bool {
    let Some(contents) = cpu_info.platform().turbo_disabled_setting() else {
        return false;
    };

    let setting = first_line(&contents);

    if setting == TURBO_DISABLED {
        return false;
    }

    warn!(
        setting,
        "turbo boost is enabled; performance measurements may be unreliable"
    );

    true
}

fn first_line(contents: &str) -> &str {
    contents.lines().next().unwrap_or_default()
}
