use derive_more::Display;

/// One of the levels of the processor data cache hierarchy.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "we only ever report the three levels that operating systems expose"
)]
pub enum CacheLevel {
    /// The level 1 data cache, closest to the core.
    #[display("L1")]
    L1,

    /// The level 2 cache.
    #[display("L2")]
    L2,

    /// The level 3 cache, typically shared between many cores.
    #[display("L3")]
    L3,
}

impl CacheLevel {
    /// All cache levels, ordered from the closest to the core to the furthest.
    pub const ALL: [Self; 3] = [Self::L1, Self::L2, Self::L3];

    /// The position of this level in [`CacheLevel::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::L1 => 0,
            Self::L2 => 1,
            Self::L3 => 2,
        }
    }
}

/// Size information about one level of the processor cache hierarchy.
///
/// Zero means the operating system was not able to tell us the value. This happens on some
/// virtualized systems and is not treated as an error.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct CacheLevelInfo {
    /// Total size of the cache at this level, in bytes.
    pub size_bytes: u64,

    /// Size of one cache line at this level, in bytes.
    pub line_size_bytes: u64,
}

impl CacheLevelInfo {
    /// Creates a new instance from raw values. Use zero for any value that is not known.
    #[must_use]
    pub const fn new(size_bytes: u64, line_size_bytes: u64) -> Self {
        Self {
            size_bytes,
            line_size_bytes,
        }
    }

    /// Creates an instance from values reported by an OS API that uses negative values to signal
    /// failure. Any negative value is treated as zero (unknown).
    pub(crate) fn from_os_values(
        size_bytes: impl TryInto<u64>,
        line_size_bytes: impl TryInto<u64>,
    ) -> Self {
        Self::new(
            size_bytes.try_into().unwrap_or_default(),
            line_size_bytes.try_into().unwrap_or_default(),
        )
    }
}

/// Cache information for all the levels in [`CacheLevel::ALL`], indexed by [`CacheLevel::index()`].
pub type CacheLevels = [CacheLevelInfo; 3];
