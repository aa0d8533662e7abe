//! Parsing of the CPU descriptor table (`/proc/cpuinfo` on Linux).
//!
//! The table is a plaintext file with one `key : value` record per line and per-processor blocks
//! separated by empty lines. We only look at a handful of keys and ignore everything else,
//! including lines that do not match the expected format.

use crate::CpuFeatures;

/// Cycles per millisecond reported when no clock frequency could be determined.
pub(crate) const FALLBACK_CYCLES_PER_MS: u64 = 1_000_000;

/// Model name reported when the descriptor table does not name the CPU model.
pub(crate) const UNKNOWN_MODEL_NAME: &str = "unknown";

/// The facts extracted from one scan of the CPU descriptor table.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CpuDescriptor {
    /// Union of all known features listed in any `flags` record.
    pub(crate) features: CpuFeatures,

    /// Value of the last `model name` record, if any.
    pub(crate) model_name: Option<String>,

    /// Number of `processor` records.
    pub(crate) processor_count: usize,

    /// Highest `cpu MHz` value seen.
    pub(crate) max_mhz: Option<f64>,
}

impl CpuDescriptor {
    pub(crate) fn parse(contents: &str) -> Self {
        let mut descriptor = Self::default();

        for line in contents.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };

            let value = value.trim();

            match key.trim() {
                "flags" => descriptor.features |= CpuFeatures::from_flags_list(value),
                "cpu MHz" => {
                    // Every core reports its own current frequency and some may be parked in a
                    // low power state, so the maximum is the most representative value.
                    if let Ok(mhz) = value.parse::<f64>()
                        && mhz.is_finite()
                        && mhz > 0.0
                    {
                        descriptor.max_mhz =
                            Some(descriptor.max_mhz.map_or(mhz, |max| max.max(mhz)));
                    }
                }
                "processor" => {
                    descriptor.processor_count = descriptor.processor_count.saturating_add(1);
                }
                "model name" => descriptor.model_name = Some(value.to_string()),
                _ => {}
            }
        }

        descriptor
    }

    /// The number of processors listed in the table, or 1 if none are listed.
    pub(crate) fn core_count(&self) -> usize {
        self.processor_count.max(1)
    }

    pub(crate) fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(UNKNOWN_MODEL_NAME)
    }

    /// A coarse estimate of how many cycles a core executes per millisecond.
    pub(crate) fn cycles_per_ms(&self) -> u64 {
        let Some(mhz) = self.max_mhz else {
            return FALLBACK_CYCLES_PER_MS;
        };

        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "value is positive and finite, saturating conversion is fine for a coarse estimate"
        )]
        let cycles = (mhz * 1000.0) as u64;

        cycles
    }
}
