use std::fmt::{self, Display};

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = 1024 * KILOBYTE;
const GIGABYTE: u64 = 1024 * MEGABYTE;

/// Formats a byte count for humans, e.g. `32.00 KB` or `64 B`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ByteSize(pub(crate) u64);

impl Display for ByteSize {
    #[expect(
        clippy::cast_precision_loss,
        reason = "only two decimal places are displayed"
    )]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;

        let (unit_size, unit) = match bytes {
            b if b >= GIGABYTE => (GIGABYTE, "GB"),
            b if b >= MEGABYTE => (MEGABYTE, "MB"),
            b if b >= KILOBYTE => (KILOBYTE, "KB"),
            _ => return write!(f, "{bytes} B"),
        };

        write!(f, "{:.2} {unit}", bytes as f64 / unit_size as f64)
    }
}
