use std::fmt::{self, Display};
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::cores::CoreEnumerator;
use crate::descriptor::CpuDescriptor;
use crate::features::FeatureRegistry;
use crate::pal::{Platform, PlatformFacade};
use crate::pretty::ByteSize;
use crate::{
    CacheLevel, CacheLevels, CoreId, CpuFeatures, CpuInfoBuilder, Error, NumaNodeId, NumaTopology,
};

/// The process-wide snapshot, installed by [`CpuInfo::init()`] or [`CpuInfo::init_with()`].
static CURRENT: OnceLock<CpuInfo> = OnceLock::new();

/// Facts about the processor hardware of the system, discovered once at startup.
///
/// The facts include the instruction set extensions the CPU supports, the number of cores,
/// the NUMA topology, the processor model and a clock rate estimate. Cache sizes are not
/// retained and are queried from the operating system on every call.
///
/// Discovery is best-effort. Missing information sources fall back to conservative defaults
/// (e.g. a single NUMA node, no instruction set extensions) instead of failing.
///
/// # Example
///
/// ```
/// use cpu_facts::{CpuFeatures, CpuInfo};
///
/// let cpu_info = CpuInfo::init();
///
/// println!(
///     "Running on '{}' with {} active cores",
///     cpu_info.model_name(),
///     cpu_info.active_core_count()
/// );
///
/// if cpu_info.is_supported(CpuFeatures::AVX2) {
///     println!("Using the AVX2 code path");
/// }
/// ```
#[derive(Debug)]
pub struct CpuInfo {
    platform: PlatformFacade,

    features: FeatureRegistry,
    cores: CoreEnumerator,
    numa: NumaTopology,

    model_name: String,
    cycles_per_ms: u64,
}

impl CpuInfo {
    /// Discovers the CPU facts with the default configuration and installs them as the
    /// process-wide snapshot, returning a reference to it.
    ///
    /// If a snapshot has already been installed, it is returned as-is.
    #[must_use]
    pub fn init() -> &'static Self {
        Self::init_with(CpuInfoBuilder::new())
    }

    /// Discovers the CPU facts with the configuration in `builder` and installs them as the
    /// process-wide snapshot, returning a reference to it.
    ///
    /// If a snapshot has already been installed, it is returned as-is and `builder` is ignored.
    #[must_use]
    pub fn init_with(builder: CpuInfoBuilder) -> &'static Self {
        let mut initialized = false;

        let cpu_info = CURRENT.get_or_init(|| {
            initialized = true;
            builder.build()
        });

        if !initialized {
            debug!("CPU facts were already initialized; ignoring the new configuration");
        }

        cpu_info
    }

    /// Returns the process-wide snapshot.
    ///
    /// # Panics
    ///
    /// Panics if neither [`CpuInfo::init()`] nor [`CpuInfo::init_with()`] has been called yet.
    #[must_use]
    pub fn current() -> &'static Self {
        CURRENT
            .get()
            .expect("CpuInfo::init() must be called before the CPU facts are accessed")
    }

    pub(crate) fn from_platform(platform: PlatformFacade, core_count_override: usize) -> Self {
        let descriptor = platform
            .cpu_descriptor_table()
            .map(|contents| CpuDescriptor::parse(&contents))
            .unwrap_or_default();

        let cores = CoreEnumerator::new(
            platform.clone(),
            descriptor.core_count(),
            core_count_override,
        );

        if !cores.is_current_core_supported() {
            warn!(
                "the operating system cannot tell which core the current thread is executing on; \
                every thread will be treated as executing on core 0, which can negatively affect \
                performance"
            );
        }

        let numa = NumaTopology::discover(&platform, cores.max_core_count().get());

        let cpu_info = Self {
            features: FeatureRegistry::new(descriptor.features),
            model_name: descriptor.model_name().to_string(),
            cycles_per_ms: descriptor.cycles_per_ms(),
            platform,
            cores,
            numa,
        };

        debug!(
            model_name = cpu_info.model_name(),
            active_core_count = cpu_info.active_core_count(),
            max_core_count = cpu_info.max_core_count(),
            numa_node_count = cpu_info.max_numa_node_count(),
            cycles_per_ms = cpu_info.cycles_per_ms,
            features = %cpu_info.hardware_features(),
            "discovered CPU facts"
        );

        cpu_info
    }

    /// Whether `feature` is supported by the hardware and has not been disabled via
    /// [`enable_feature()`][Self::enable_feature].
    ///
    /// If `feature` contains multiple flags, all of them must be supported.
    #[inline]
    #[must_use]
    pub fn is_supported(&self, feature: CpuFeatures) -> bool {
        self.features.is_supported(feature)
    }

    /// Whether `feature` is supported by the hardware, regardless of whether it has been
    /// disabled via [`enable_feature()`][Self::enable_feature].
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    #[inline]
    #[must_use]
    pub fn is_hardware_supported(&self, feature: CpuFeatures) -> bool {
        self.features.is_hardware_supported(feature)
    }

    /// Enables or disables the use of `feature`, typically to exercise fallback code paths.
    ///
    /// This is meant to be called during single-threaded setup. Other threads are not
    /// guaranteed to observe a consistent view of the features while they are being changed.
    ///
    /// # Panics
    ///
    /// Panics if asked to enable a feature that the hardware does not support.
    pub fn enable_feature(&self, feature: CpuFeatures, enable: bool) {
        self.features.set_enabled(feature, enable);
    }

    /// The features that are currently enabled.
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    #[must_use]
    pub fn enabled_features(&self) -> CpuFeatures {
        self.features.enabled()
    }

    /// The features that the hardware supports.
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    #[must_use]
    pub fn hardware_features(&self) -> CpuFeatures {
        self.features.hardware()
    }

    /// The processor model name, or `unknown` if the operating system does not say.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// An estimate of the number of CPU cycles per millisecond, based on the highest clock rate
    /// reported for any core.
    #[must_use]
    pub fn cycles_per_ms(&self) -> u64 {
        self.cycles_per_ms
    }

    /// The number of cores the app is expected to use.
    ///
    /// This is the number of cores listed by the operating system unless overridden via
    /// [`CpuInfoBuilder::core_count_override()`]. Always at least 1.
    #[inline]
    #[must_use]
    pub fn active_core_count(&self) -> usize {
        self.cores.active_core_count().get()
    }

    /// The maximum number of cores that could ever be present on the system, including cores
    /// that are offline. Core IDs are always less than this. Always at least 1.
    #[inline]
    #[must_use]
    pub fn max_core_count(&self) -> usize {
        self.cores.max_core_count().get()
    }

    /// The core the current thread is executing on.
    ///
    /// The result is always less than [`max_core_count()`][Self::max_core_count]. If the
    /// operating system cannot tell, this is always 0.
    #[inline]
    #[must_use]
    pub fn current_core(&self) -> CoreId {
        self.cores.current_core()
    }

    /// The NUMA node the current thread is executing on.
    #[inline]
    #[must_use]
    pub fn current_numa_node(&self) -> NumaNodeId {
        self.numa.node_of_core(self.current_core())
    }

    /// The assignment of cores to NUMA nodes.
    #[must_use]
    pub fn numa(&self) -> &NumaTopology {
        &self.numa
    }

    /// The number of NUMA nodes. Always at least 1.
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    #[must_use]
    pub fn max_numa_node_count(&self) -> usize {
        self.numa.max_node_count()
    }

    /// The cores that belong to NUMA node `node`, in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not less than [`max_numa_node_count()`][Self::max_numa_node_count].
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    #[must_use]
    pub fn numa_node_cores(&self, node: NumaNodeId) -> &[CoreId] {
        self.numa.cores_of_node(node)
    }

    /// The position of `core` among the cores of its own NUMA node.
    ///
    /// # Panics
    ///
    /// Panics if `core` is not less than [`max_core_count()`][Self::max_core_count].
    #[cfg_attr(test, mutants::skip)] // Trivial layer, we only test the underlying logic.
    #[must_use]
    pub fn numa_node_core_index(&self, core: CoreId) -> usize {
        self.numa.core_index_in_node(core)
    }

    /// Queries the operating system for the size of each level of the data cache hierarchy.
    ///
    /// The result is indexed by [`CacheLevel::index()`]. Values the operating system does not
    /// report are zero.
    #[must_use]
    pub fn cache_levels(&self) -> CacheLevels {
        self.platform.cache_levels()
    }

    /// Checks that the hardware is capable of running the app correctly.
    ///
    /// On `x86_64`, this requires AVX2. Disabling a feature via
    /// [`enable_feature()`][Self::enable_feature] does not affect the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCapability`] if the hardware lacks a required feature.
    pub fn enforce_minimum_requirements(&self) -> crate::Result<()> {
        if cfg!(target_arch = "x86_64") && !self.is_hardware_supported(CpuFeatures::AVX2) {
            return Err(Error::MissingCapability {
                feature: CpuFeatures::AVX2,
                description: "Advanced Vector Extensions 2",
            });
        }

        Ok(())
    }

    /// Replaces the discovered NUMA topology with a fake one, so logic that depends on the
    /// topology can be tested on any machine.
    ///
    /// `core_to_node` lists the NUMA node of every core and must have exactly
    /// [`max_core_count()`][Self::max_core_count] entries.
    ///
    /// # Panics
    ///
    /// Panics if `core_to_node` has the wrong length, if `max_node_count` is zero or if any
    /// node in `core_to_node` is not less than `max_node_count`.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_fake_numa_topology(&mut self, max_node_count: usize, core_to_node: &[NumaNodeId]) {
        assert_eq!(
            core_to_node.len(),
            self.max_core_count(),
            "fake NUMA topology must assign a node to every one of the {} cores",
            self.max_core_count()
        );

        self.numa = NumaTopology::from_assignment(max_node_count, core_to_node.into());
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }
}

impl Display for CpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cpu Info:")?;
        writeln!(f, "  Model: {}", self.model_name)?;
        writeln!(f, "  Cores: {}", self.active_core_count())?;
        writeln!(f, "  Max Possible Cores: {}", self.max_core_count())?;

        for (level, info) in CacheLevel::ALL.into_iter().zip(self.cache_levels()) {
            writeln!(
                f,
                "  {level} Cache: {} (Line: {})",
                ByteSize(info.size_bytes),
                ByteSize(info.line_size_bytes)
            )?;
        }

        writeln!(f, "  Hardware Supports:")?;

        for name in self.enabled_features().names() {
            writeln!(f, "    {name}")?;
        }

        self.numa.write_summary(f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::CacheLevelInfo;
    use crate::pal::MockPlatform;

    assert_impl_all!(CpuInfo: Send, Sync);

    const SYNTHETIC_TABLE: &str = "\
processor\t: 0
model name\t: Synthetic CPU @ 3.00GHz
cpu MHz\t\t: 2999.999
flags\t\t: fpu ssse3 sse4_1 avx2

processor\t: 1
model name\t: Synthetic CPU @ 3.00GHz
cpu MHz\t\t: 3000.000
flags\t\t: fpu ssse3 sse4_1 avx2
";

    fn mock_platform(
        descriptor_table: Option<&str>,
        max_core_count: usize,
        current_core: Option<CoreId>,
    ) -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform
            .expect_cpu_descriptor_table()
            .return_const(descriptor_table.map(str::to_string));
        platform
            .expect_max_core_count()
            .return_const(max_core_count);
        platform
            .expect_current_core_id()
            .return_const(current_core);
        platform.expect_numa_node_directory_entries().return_const(None);
        platform.expect_cache_levels().return_const([
            CacheLevelInfo::new(48 * 1024, 64),
            CacheLevelInfo::new(2 * 1024 * 1024, 64),
            CacheLevelInfo::new(0, 0),
        ]);
        platform
    }

    fn cpu_info(platform: MockPlatform) -> CpuInfo {
        CpuInfoBuilder::with_platform(PlatformFacade::from_mock(platform)).build()
    }

    fn synthetic() -> CpuInfo {
        cpu_info(mock_platform(Some(SYNTHETIC_TABLE), 4, Some(1)))
    }

    #[test]
    fn synthetic_table_facts() {
        let cpu_info = synthetic();

        assert_eq!(cpu_info.active_core_count(), 2);
        assert_eq!(cpu_info.max_core_count(), 4);
        assert_eq!(cpu_info.model_name(), "Synthetic CPU @ 3.00GHz");
        assert_eq!(cpu_info.cycles_per_ms(), 3_000_000);

        let expected = CpuFeatures::SSSE3 | CpuFeatures::SSE4_1 | CpuFeatures::AVX2;

        for feature in CpuFeatures::all().iter() {
            assert_eq!(
                cpu_info.is_supported(feature),
                expected.contains(feature),
                "{feature}"
            );
        }

        assert_eq!(cpu_info.hardware_features(), expected);
        assert_eq!(cpu_info.enabled_features(), expected);
    }

    #[test]
    fn missing_table_uses_defaults() {
        let cpu_info = cpu_info(mock_platform(None, 2, Some(0)));

        assert_eq!(cpu_info.active_core_count(), 1);
        assert_eq!(cpu_info.model_name(), "unknown");
        assert_eq!(cpu_info.cycles_per_ms(), 1_000_000);
        assert_eq!(cpu_info.enabled_features(), CpuFeatures::empty());
    }

    #[test]
    fn garbage_table_uses_defaults() {
        let cpu_info = cpu_info(mock_platform(
            Some("\u{0}\u{1}garbage\n:::\nno separator here\n"),
            2,
            Some(0),
        ));

        assert_eq!(cpu_info.active_core_count(), 1);
        assert_eq!(cpu_info.model_name(), "unknown");
        assert_eq!(cpu_info.cycles_per_ms(), 1_000_000);
        assert_eq!(cpu_info.enabled_features(), CpuFeatures::empty());
    }

    #[test]
    fn disable_and_reenable_feature() {
        let cpu_info = synthetic();

        cpu_info.enable_feature(CpuFeatures::AVX2, false);
        assert!(!cpu_info.is_supported(CpuFeatures::AVX2));
        assert!(cpu_info.is_hardware_supported(CpuFeatures::AVX2));
        assert!(cpu_info.is_supported(CpuFeatures::SSSE3));

        cpu_info.enable_feature(CpuFeatures::AVX2, true);
        assert!(cpu_info.is_supported(CpuFeatures::AVX2));
    }

    #[test]
    #[should_panic]
    fn enabling_unsupported_feature_panics() {
        let cpu_info = synthetic();

        cpu_info.enable_feature(CpuFeatures::PCLMULQDQ, true);
    }

    #[test]
    fn current_core_and_node() {
        let cpu_info = synthetic();

        assert_eq!(cpu_info.current_core(), 1);
        assert_eq!(cpu_info.current_numa_node(), 0);
        assert_eq!(cpu_info.max_numa_node_count(), 1);
        assert_eq!(cpu_info.numa_node_cores(0), &[0, 1, 2, 3]);
        assert_eq!(cpu_info.numa_node_core_index(3), 3);
    }

    #[test]
    fn out_of_range_current_core_is_folded() {
        let cpu_info = cpu_info(mock_platform(Some(SYNTHETIC_TABLE), 4, Some(6)));

        assert_eq!(cpu_info.current_core(), 2);
        assert_eq!(cpu_info.current_numa_node(), 0);
    }

    #[test]
    fn unsupported_current_core_is_zero() {
        let cpu_info = cpu_info(mock_platform(Some(SYNTHETIC_TABLE), 4, None));

        assert_eq!(cpu_info.current_core(), 0);
    }

    #[test]
    fn cache_levels_are_queried_live() {
        let mut platform = MockPlatform::new();
        platform.expect_cpu_descriptor_table().return_const(None);
        platform.expect_max_core_count().return_const(1_usize);
        platform.expect_current_core_id().return_const(Some(0));
        platform.expect_numa_node_directory_entries().return_const(None);
        platform
            .expect_cache_levels()
            .times(2)
            .return_const([CacheLevelInfo::new(32 * 1024, 64); 3]);

        let cpu_info = cpu_info(platform);

        assert_eq!(
            cpu_info.cache_levels()[CacheLevel::L1.index()],
            CacheLevelInfo::new(32 * 1024, 64)
        );
        assert_eq!(
            cpu_info.cache_levels()[CacheLevel::L3.index()],
            CacheLevelInfo::new(32 * 1024, 64)
        );
    }

    #[test]
    fn fake_numa_topology_rebuilds_derived_maps() {
        let mut cpu_info = synthetic();

        cpu_info.set_fake_numa_topology(2, &[1, 0, 1, 0]);

        let numa = cpu_info.numa();
        assert_eq!(numa.max_node_count(), 2);
        assert_eq!(numa.core_to_node(), &[1, 0, 1, 0]);
        assert_eq!(numa.cores_of_node(0), &[1, 3]);
        assert_eq!(numa.cores_of_node(1), &[0, 2]);
        assert_eq!(numa.core_index_in_node(0), 0);
        assert_eq!(numa.core_index_in_node(1), 0);
        assert_eq!(numa.core_index_in_node(2), 1);
        assert_eq!(numa.core_index_in_node(3), 1);

        // Current core is 1.
        assert_eq!(cpu_info.current_numa_node(), 0);
    }

    #[test]
    #[should_panic]
    fn fake_numa_topology_wrong_length_panics() {
        let mut cpu_info = synthetic();

        cpu_info.set_fake_numa_topology(2, &[0, 1]);
    }

    #[test]
    #[should_panic]
    fn fake_numa_topology_node_out_of_range_panics() {
        let mut cpu_info = synthetic();

        cpu_info.set_fake_numa_topology(2, &[0, 1, 2, 0]);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn minimum_requirements_on_x86_64() {
        let capable = synthetic();
        assert!(capable.enforce_minimum_requirements().is_ok());

        // Disabling does not make the hardware incapable.
        capable.enable_feature(CpuFeatures::AVX2, false);
        assert!(capable.enforce_minimum_requirements().is_ok());

        let incapable = cpu_info(mock_platform(
            Some("processor : 0\nflags : ssse3 avx\n"),
            1,
            Some(0),
        ));
        let Error::MissingCapability { feature, .. } =
            incapable.enforce_minimum_requirements().unwrap_err();
        assert_eq!(feature, CpuFeatures::AVX2);
    }

    #[cfg(not(target_arch = "x86_64"))]
    #[test]
    fn minimum_requirements_elsewhere() {
        let cpu_info = cpu_info(mock_platform(None, 1, Some(0)));

        assert!(cpu_info.enforce_minimum_requirements().is_ok());
    }

    #[test]
    fn summary_lists_facts() {
        let mut cpu_info = synthetic();
        cpu_info.enable_feature(CpuFeatures::SSE4_1, false);
        cpu_info.set_fake_numa_topology(2, &[0, 0, 1, 1]);

        let summary = cpu_info.to_string();

        assert!(summary.starts_with("Cpu Info:\n"));
        assert!(summary.contains("  Model: Synthetic CPU @ 3.00GHz\n"));
        assert!(summary.contains("  Cores: 2\n"));
        assert!(summary.contains("  Max Possible Cores: 4\n"));
        assert!(summary.contains("  L1 Cache: 48.00 KB (Line: 64 B)\n"));
        assert!(summary.contains("  L2 Cache: 2.00 MB (Line: 64 B)\n"));
        assert!(summary.contains("  L3 Cache: 0 B (Line: 0 B)\n"));
        assert!(summary.contains("  Hardware Supports:\n    ssse3\n    avx2\n"));
        assert!(!summary.contains("sse4_1"));
        assert!(summary.contains("  Numa Nodes: 2\n"));
        assert!(summary.contains("0->0 | 1->0 | 2->1 | 3->1"));
    }

    #[test]
    fn fallback_platform_yields_valid_facts() {
        let cpu_info = CpuInfoBuilder::with_platform(PlatformFacade::fallback()).build();

        assert_eq!(cpu_info.active_core_count(), 1);
        assert!(cpu_info.max_core_count() >= 1);
        assert_eq!(cpu_info.current_core(), 0);
        assert_eq!(cpu_info.max_numa_node_count(), 1);
        assert_eq!(cpu_info.enabled_features(), CpuFeatures::empty());
        assert_eq!(cpu_info.model_name(), "unknown");
    }

    #[cfg(not(miri))] // Real platform is not supported under Miri.
    #[test]
    fn global_snapshot_real() {
        let cpu_info = CpuInfo::init();

        assert!(std::ptr::eq(cpu_info, CpuInfo::current()));
        assert!(std::ptr::eq(cpu_info, CpuInfo::init()));

        assert!(cpu_info.active_core_count() >= 1);
        assert!((cpu_info.current_core() as usize) < cpu_info.max_core_count());
        assert!((cpu_info.current_numa_node() as usize) < cpu_info.max_numa_node_count());
        assert_eq!(cpu_info.numa().core_to_node().len(), cpu_info.max_core_count());

        // Must not panic, whatever the hardware.
        _ = cpu_info.to_string();
    }
}
