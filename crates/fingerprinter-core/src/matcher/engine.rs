use super::fetch::{candidate_url, normalize_base_url, Fetcher};
use crate::error::Error;
use crate::progress::{Confirm, ProgressReporter};
use crate::storage::models::FingerprintEntry;
use crate::storage::Database;
use tracing::{debug, info};

/// What to do once a version scores at least one unique-fingerprint match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueHitPolicy {
    /// Ask through [`Confirm`]; anything but an explicit yes stops the scan.
    Prompt,
    Stop,
    Continue,
}

impl UniqueHitPolicy {
    /// `stop_on_unique_match` from config: unset means ask the operator.
    pub fn from_config(stop_on_unique_match: Option<bool>) -> Self {
        match stop_on_unique_match {
            Some(true) => UniqueHitPolicy::Stop,
            Some(false) => UniqueHitPolicy::Continue,
            None => UniqueHitPolicy::Prompt,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub unique: bool,
    pub verbose: bool,
    pub on_unique_hit: UniqueHitPolicy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            unique: false,
            verbose: false,
            on_unique_hit: UniqueHitPolicy::Prompt,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionScore {
    pub version: String,
    pub matches: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Debug, Default)]
pub struct MatchSummary {
    /// Versions with a non-empty candidate set, in the order they were scanned.
    pub scores: Vec<VersionScore>,
    /// Set when the scan ended early on a unique-fingerprint hit.
    pub stopped_at: Option<String>,
}

/// `matches / total` as a percentage rounded to two decimals.
pub fn match_percent(matches: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (matches as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Walks the corpus in natural version order and scores each version by how
/// many of its fingerprints the target serves with identical content.
pub struct MatchEngine<'a, F: Fetcher> {
    db: &'a Database,
    fetcher: F,
    options: MatchOptions,
}

impl<'a, F: Fetcher> MatchEngine<'a, F> {
    pub fn new(db: &'a Database, fetcher: F, options: MatchOptions) -> Self {
        Self {
            db,
            fetcher,
            options,
        }
    }

    fn candidates(&self, version_id: i64) -> Result<Vec<FingerprintEntry>, Error> {
        let entries = if self.options.unique {
            self.db.unique_fingerprints(version_id)?
        } else {
            self.db.fingerprints_of(version_id)?
        };
        Ok(entries)
    }

    /// Fetch one candidate and compare its digest. Any fetch failure is a miss.
    fn check(&self, base: &url::Url, entry: &FingerprintEntry) -> Result<Option<url::Url>, Error> {
        let url = candidate_url(base, &entry.path)?;
        match self.fetcher.fetch_digest(&url) {
            Ok(digest) if digest == entry.hash => Ok(Some(url)),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("{}", e);
                Ok(None)
            }
        }
    }

    pub fn run(
        &self,
        target: &str,
        reporter: &dyn ProgressReporter,
        confirm: &dyn Confirm,
    ) -> Result<MatchSummary, Error> {
        let base = normalize_base_url(target)?;
        let mut summary = MatchSummary::default();
        info!("Fingerprinting {}", base);

        for version in self.db.list_versions()? {
            let candidates = self.candidates(version.id)?;
            let total = candidates.len();
            if total == 0 {
                debug!("No candidate fingerprints for {}, skipping", version.number);
                continue;
            }

            reporter.on_version_start(&version.number, total);
            let mut matches = 0;
            let mut percent = 0.0;

            for entry in &candidates {
                if let Some(url) = self.check(&base, entry)? {
                    matches += 1;
                    if self.options.verbose {
                        reporter.on_candidate_match(url.as_str(), &version.number);
                    }
                }
                percent = match_percent(matches, total);
                reporter.on_candidate_checked(&version.number, matches, total, percent);
            }

            reporter.on_version_complete(&version.number, matches, total, percent);
            summary.scores.push(VersionScore {
                version: version.number.clone(),
                matches,
                total,
                percent,
            });

            if self.options.unique && matches > 0 {
                let keep_going = match self.options.on_unique_hit {
                    UniqueHitPolicy::Prompt => confirm.confirm_continue(&version.number),
                    UniqueHitPolicy::Stop => false,
                    UniqueHitPolicy::Continue => true,
                };
                if !keep_going {
                    info!("Stopping after unique match on {}", version.number);
                    summary.stopped_at = Some(version.number);
                    break;
                }
            }
        }

        Ok(summary)
    }
}
