use thiserror::Error;

use crate::CpuFeatures;

/// Errors that can occur when checking whether the hardware is suitable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The hardware lacks an instruction set extension that is required for correct operation.
    #[error(
        "this machine does not meet the minimum requirements: the CPU does not support '{feature}' ({description})"
    )]
    MissingCapability {
        /// The instruction set extension that is missing.
        feature: CpuFeatures,

        /// A human-readable name of the missing instruction set extension.
        description: &'static str,
    },
}

/// A specialized `Result` type for hardware checks, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn missing_capability_message_names_feature() {
        let error = Error::MissingCapability {
            feature: CpuFeatures::AVX2,
            description: "Advanced Vector Extensions 2",
        };

        let message = error.to_string();

        assert!(message.contains("'avx2'"));
        assert!(message.contains("Advanced Vector Extensions 2"));
    }
}
