//! The process-wide snapshot must be initialized before it is accessed.
//!
//! One test per file to enforce process isolation (the snapshot is process-level state).

use cpu_facts::CpuInfo;

#[test]
#[should_panic]
fn current_before_init_panics() {
    _ = CpuInfo::current();
}
