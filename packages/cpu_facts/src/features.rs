use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use itertools::Itertools;

bitflags! {
    /// Instruction set extensions that performance-sensitive code may want to branch on.
    ///
    /// The names of the flags match (case-insensitively) the names used in the `flags` field of
    /// the operating system's CPU descriptor table.
    ///
    /// # Example
    ///
    /// ```
    /// use cpu_facts::CpuFeatures;
    ///
    /// let features = CpuFeatures::from_flags_list("fpu ssse3 sse4_1 avx2 sha_ni");
    ///
    /// assert_eq!(
    ///     features,
    ///     CpuFeatures::SSSE3 | CpuFeatures::SSE4_1 | CpuFeatures::AVX2
    /// );
    /// assert_eq!(features.to_string(), "ssse3 sse4_1 avx2");
    /// ```
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct CpuFeatures: u64 {
        /// Supplemental Streaming SIMD Extensions 3.
        const SSSE3 = 1 << 1;
        /// Streaming SIMD Extensions 4.1.
        const SSE4_1 = 1 << 2;
        /// Streaming SIMD Extensions 4.2.
        const SSE4_2 = 1 << 3;
        /// Population count instruction.
        const POPCNT = 1 << 4;
        /// Advanced Vector Extensions.
        const AVX = 1 << 5;
        /// Advanced Vector Extensions 2.
        const AVX2 = 1 << 6;
        /// Carry-less multiplication instruction.
        const PCLMULQDQ = 1 << 7;
    }
}

impl CpuFeatures {
    /// Parses a whitespace-separated list of feature names, as found in the `flags` field of the
    /// CPU descriptor table.
    ///
    /// Names are matched exactly (ignoring case), so `avx2` does not imply `avx`. Names that do
    /// not correspond to a known feature are ignored.
    #[must_use]
    pub fn from_flags_list(list: &str) -> Self {
        list.split_whitespace()
            .filter_map(Self::from_descriptor_name)
            .fold(Self::empty(), |features, feature| features | feature)
    }

    fn from_descriptor_name(name: &str) -> Option<Self> {
        Self::all()
            .iter_names()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, feature)| feature)
    }

    /// Returns the names of the features in this set, in declaration order and in the lowercase
    /// form used by the CPU descriptor table.
    pub fn names(self) -> impl Iterator<Item = String> {
        self.iter_names().map(|(name, _)| name.to_ascii_lowercase())
    }
}

impl Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(" "))
    }
}

/// Tracks which instruction set extensions the hardware supports and which of them are
/// currently enabled for use.
///
/// The enabled set is always a subset of the hardware set. Features can be disabled (e.g. to
/// exercise fallback code paths) and re-enabled, but a feature the hardware lacks can never be
/// enabled.
#[derive(Debug)]
pub(crate) struct FeatureRegistry {
    hardware: CpuFeatures,

    // Atomic so toggling is possible through a shared reference to the global snapshot.
    // Toggling is still only meant to happen during single-threaded setup.
    enabled: AtomicU64,
}

impl FeatureRegistry {
    pub(crate) fn new(hardware: CpuFeatures) -> Self {
        Self {
            hardware,
            enabled: AtomicU64::new(hardware.bits()),
        }
    }

    pub(crate) fn hardware(&self) -> CpuFeatures {
        self.hardware
    }

    pub(crate) fn enabled(&self) -> CpuFeatures {
        CpuFeatures::from_bits_truncate(self.enabled.load(Ordering::Relaxed))
    }

    pub(crate) fn is_supported(&self, feature: CpuFeatures) -> bool {
        self.enabled().contains(feature)
    }

    pub(crate) fn is_hardware_supported(&self, feature: CpuFeatures) -> bool {
        self.hardware.contains(feature)
    }

    /// # Panics
    ///
    /// Panics if asked to enable a feature that the hardware does not support.
    pub(crate) fn set_enabled(&self, feature: CpuFeatures, enable: bool) {
        if enable {
            assert!(
                self.hardware.contains(feature),
                "cannot enable '{feature}' because the hardware does not support it (hardware supports: '{}')",
                self.hardware
            );

            self.enabled.fetch_or(feature.bits(), Ordering::Relaxed);
        } else {
            self.enabled.fetch_and(!feature.bits(), Ordering::Relaxed);
        }
    }
}
