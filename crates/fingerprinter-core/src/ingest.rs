use crate::error::Error;
use crate::hasher;
use crate::progress::ProgressReporter;
use crate::scanner::{self, IgnoreRules};
use crate::storage::models::Version;
use crate::storage::Database;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct IngestOutcome {
    pub version: Version,
    pub fingerprints: usize,
}

/// Turn an extracted release tree into fingerprints for a new version.
///
/// All rows for the version are written in one transaction, so a hashing or
/// store failure leaves no partial version behind. The tree is deleted only
/// after the transaction commits.
pub fn ingest(
    db: &Database,
    version_number: &str,
    tree_root: &Path,
    ignore: &IgnoreRules,
    reporter: &dyn ProgressReporter,
) -> Result<IngestOutcome, Error> {
    if db.find_version(version_number)?.is_some() {
        return Err(Error::DuplicateVersion(version_number.to_string()));
    }
    if !tree_root.is_dir() {
        return Err(Error::Other(format!(
            "Release tree {} is not a directory",
            tree_root.display()
        )));
    }

    let start = Instant::now();
    let files = scanner::release_files(tree_root, ignore)?;
    info!(
        "Processing fingerprints for {} ({} files)",
        version_number,
        files.len()
    );
    reporter.on_ingest_start(version_number, files.len());

    let tx = db.connection().unchecked_transaction()?;
    let version = db.create_version(version_number)?;

    for (done, file) in files.iter().enumerate() {
        let hash = hasher::hash_file(&file.absolute)?;
        let path = db.find_or_create_path(&file.value)?;
        db.create_fingerprint(path.id, version.id, &hash)?;
        reporter.on_file_fingerprinted(done + 1, &file.value);
    }

    tx.commit()?;
    let duration = start.elapsed();
    debug!(
        "Committed {} fingerprints for {} in {:.2}s",
        files.len(),
        version_number,
        duration.as_secs_f64()
    );

    match fs::remove_dir_all(tree_root) {
        Ok(()) => debug!("Removed release tree {}", tree_root.display()),
        Err(e) => warn!("Could not remove release tree {}: {}", tree_root.display(), e),
    }

    reporter.on_ingest_complete(version_number, files.len(), duration.as_secs_f64());

    Ok(IngestOutcome {
        version,
        fingerprints: files.len(),
    })
}
