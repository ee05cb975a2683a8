pub mod config;
pub mod error;
pub mod hasher;
pub mod ingest;
pub mod matcher;
pub mod progress;
pub mod scanner;
pub mod storage;
pub mod unique;
pub mod updater;
pub mod version_order;

pub use config::AppConfig;
pub use error::Error;
pub use ingest::{ingest, IngestOutcome};
pub use matcher::{MatchEngine, MatchOptions, MatchSummary, UniqueHitPolicy};
pub use progress::{Confirm, FixedAnswer, ProgressReporter, SilentReporter};
pub use scanner::IgnoreRules;
pub use storage::Database;
pub use updater::{auto_update, manual_update, DirectorySource, ReleaseSource, UpdateSummary};
pub use version_order::compare_versions;
