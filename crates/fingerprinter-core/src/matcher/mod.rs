pub mod engine;
pub mod fetch;

pub use engine::{MatchEngine, MatchOptions, MatchSummary, UniqueHitPolicy, VersionScore};
pub use fetch::{candidate_url, normalize_base_url, Fetcher, HttpFetcher};
