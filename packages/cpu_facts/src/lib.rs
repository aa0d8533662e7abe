#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Discovers facts about the processor hardware that performance-sensitive code adapts to.
//!
//! The facts are discovered once, at startup, and are then available as a read-only snapshot:
//!
//! * Which instruction set extensions (e.g. AVX2) the CPU supports, with the ability to disable
//!   individual extensions to exercise fallback code paths.
//! * How many cores there are and which core the current thread is executing on.
//! * Which NUMA node each core belongs to and the position of each core within its node.
//! * The processor model name and a clock rate estimate.
//!
//! The sizes of the data cache levels are also available but are queried from the operating
//! system on every call.
//!
//! Discovery never fails. If the operating system does not offer some piece of information,
//! a conservative default is used instead (e.g. a single NUMA node containing every core).
//!
//! # Example
//!
//! ```
//! use cpu_facts::{CpuFeatures, CpuInfo};
//!
//! let cpu_info = CpuInfo::init();
//!
//! // Fail early with a clear message if the hardware is not capable enough.
//! if let Err(e) = cpu_info.enforce_minimum_requirements() {
//!     println!("{e}");
//!     return;
//! }
//!
//! let core = cpu_info.current_core();
//! let node = cpu_info.current_numa_node();
//! println!("Executing on core {core} in NUMA node {node}");
//!
//! if cpu_info.is_supported(CpuFeatures::AVX2) {
//!     println!("Using the AVX2 code path");
//! }
//!
//! println!("{cpu_info}");
//! ```
//!
//! # Testing
//!
//! Enable the `test-util` Cargo feature to be able to replace the NUMA topology with a fake one
//! via `CpuInfo::set_fake_numa_topology()` on an owned instance, or via
//! `CpuInfoBuilder::fake_numa_topology()` before installing the process-wide snapshot, so
//! topology-aware logic can be tested on any machine.
//!
//! # Platform support
//!
//! Linux is fully supported. On other platforms, the crate reports a single NUMA node and no
//! instruction set extensions, and cannot tell which core the current thread is executing on.

mod cache;
mod cores;
mod cpu_info;
mod cpu_info_builder;
mod descriptor;
pub mod diagnostics;
mod error;
mod features;
mod numa;
mod pal;
mod pretty;
mod primitive_types;

pub use cache::*;
pub use cpu_info::*;
pub use cpu_info_builder::*;
pub use error::Error;
pub(crate) use error::Result;
pub use features::CpuFeatures;
pub use numa::*;
pub use primitive_types::*;
