use crate::error::Error;
use crate::storage::models::{FingerprintEntry, Version};
use crate::storage::Database;

/// A version together with the fingerprints that by themselves prove it.
#[derive(Debug)]
pub struct UniqueSet {
    pub version: Version,
    pub fingerprints: Vec<FingerprintEntry>,
}

/// Unique fingerprints for `version_number`, or `None` if the version is unknown.
///
/// Always a live query against the whole corpus, so versions ingested since
/// the last call are taken into account.
pub fn unique_fingerprints(db: &Database, version_number: &str) -> Result<Option<UniqueSet>, Error> {
    let Some(version) = db.find_version(version_number)? else {
        return Ok(None);
    };
    let fingerprints = db.unique_fingerprints(version.id)?;
    Ok(Some(UniqueSet {
        version,
        fingerprints,
    }))
}
