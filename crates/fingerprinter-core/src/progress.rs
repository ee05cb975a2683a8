/// Trait for reporting ingestion and match progress.
///
/// The CLI implements it with indicatif; library callers and tests use
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_ingest_start(&self, _version: &str, _total_files: usize) {}
    fn on_file_fingerprinted(&self, _files_done: usize, _path: &str) {}
    fn on_ingest_complete(&self, _version: &str, _fingerprints: usize, _duration_secs: f64) {}

    fn on_version_start(&self, _version: &str, _total: usize) {}
    fn on_candidate_checked(&self, _version: &str, _matches: usize, _total: usize, _percent: f64) {}
    /// Only called when verbose matching is enabled.
    fn on_candidate_match(&self, _url: &str, _version: &str) {}
    fn on_version_complete(&self, _version: &str, _matches: usize, _total: usize, _percent: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Asked whether to keep scanning after a unique-fingerprint hit.
pub trait Confirm {
    fn confirm_continue(&self, version: &str) -> bool;
}

/// Answers every confirmation with a fixed value.
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm_continue(&self, _version: &str) -> bool {
        self.0
    }
}
