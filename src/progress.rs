/// Trait for reporting run progress.
///
/// CLI implements with indicatif, tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_gate_start(&self, _total_files: usize) {}
    fn on_gate_progress(&self, _files_checked: usize) {}
    fn on_gate_complete(&self, _passed: usize, _duration_secs: f64) {}
    fn on_dedup_complete(&self, _kept: usize, _duplicates: usize) {}
    fn on_write_start(&self, _books: usize) {}
    fn on_write_complete(&self, _books: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
