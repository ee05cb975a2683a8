use crate::error::Error;
use crate::ingest::{self, IngestOutcome};
use crate::progress::ProgressReporter;
use crate::scanner::{self, IgnoreRules};
use crate::storage::Database;
use crate::version_order::sort_versions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// A published release as advertised by a [`ReleaseSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRelease {
    pub number: String,
    pub location: String,
}

/// Discovers published releases and materialises one as an extracted tree.
pub trait ReleaseSource {
    fn releases(&self) -> Result<Vec<RemoteRelease>, Error>;

    /// Returns the root of an extracted tree that ingestion may delete afterwards.
    fn stage(&self, release: &RemoteRelease) -> Result<PathBuf, Error>;
}

/// Release source backed by a local directory holding one extracted tree per
/// version, named by version number. Trees are copied into a staging
/// directory so the originals survive ingestion.
pub struct DirectorySource {
    root: PathBuf,
    staging_dir: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staging_dir: staging_dir.into(),
        }
    }
}

impl ReleaseSource for DirectorySource {
    fn releases(&self) -> Result<Vec<RemoteRelease>, Error> {
        let mut releases = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            releases.push(RemoteRelease {
                number: entry.file_name().to_string_lossy().into_owned(),
                location: entry.path().to_string_lossy().into_owned(),
            });
        }
        Ok(releases)
    }

    fn stage(&self, release: &RemoteRelease) -> Result<PathBuf, Error> {
        let target = self.staging_dir.join(&release.number);
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        copy_tree(Path::new(&release.location), &target)?;
        debug!("Staged {} into {}", release.number, target.display());
        Ok(target)
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), Error> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Other(e.to_string()))?;
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else if scanner::is_file_like(&entry) {
            // Symlinked files are staged as plain copies of their target.
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct UpdateSummary {
    pub discovered: usize,
    pub ingested: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Ingest a tree and log-and-skip any failure. Batch callers use this so one
/// bad release never stops the run.
fn process_version(
    db: &Database,
    version_number: &str,
    tree_root: &Path,
    ignore: &IgnoreRules,
    reporter: &dyn ProgressReporter,
) -> Result<IngestOutcome, Error> {
    let result = ingest::ingest(db, version_number, tree_root, ignore, reporter);
    if let Err(e) = &result {
        error!("An error occurred: {}, skipping the version", e);
    }
    result
}

/// Ingest every release the source knows about that the corpus does not,
/// oldest first.
pub fn auto_update(
    db: &Database,
    source: &dyn ReleaseSource,
    ignore: &IgnoreRules,
    reporter: &dyn ProgressReporter,
) -> Result<UpdateSummary, Error> {
    info!("Retrieving remote version numbers ...");
    let mut releases = source.releases()?;
    sort_versions(&mut releases, |r| r.number.as_str());
    info!("{} remote version numbers retrieved", releases.len());

    let mut summary = UpdateSummary {
        discovered: releases.len(),
        ..Default::default()
    };

    for release in &releases {
        match db.find_version(&release.number) {
            Ok(Some(_)) => {
                info!("Version {} already in DB, skipping", release.number);
                summary.skipped.push(release.number.clone());
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Could not look up version {}: {}", release.number, e);
                summary.failed.push((release.number.clone(), e.to_string()));
                continue;
            }
        }

        let tree = match source.stage(release) {
            Ok(tree) => tree,
            Err(e) => {
                error!("Could not stage {}: {}, skipping the version", release.number, e);
                summary.failed.push((release.number.clone(), e.to_string()));
                continue;
            }
        };

        match process_version(db, &release.number, &tree, ignore, reporter) {
            Ok(_) => summary.ingested.push(release.number.clone()),
            Err(Error::DuplicateVersion(number)) => summary.skipped.push(number),
            Err(e) => summary.failed.push((release.number.clone(), e.to_string())),
        }
    }

    Ok(summary)
}

/// Ingest a pre-extracted tree under an operator-supplied version number.
///
/// Returns `Ok(None)` when the version is already known; the tree is then left
/// untouched.
pub fn manual_update(
    db: &Database,
    version_number: Option<&str>,
    tree_root: &Path,
    ignore: &IgnoreRules,
    reporter: &dyn ProgressReporter,
) -> Result<Option<IngestOutcome>, Error> {
    let version_number =
        version_number.ok_or_else(|| Error::MissingOption("--version".to_string()))?;

    if db.find_version(version_number)?.is_some() {
        warn!("Version {} already in DB, skipping", version_number);
        return Ok(None);
    }

    process_version(db, version_number, tree_root, ignore, reporter).map(Some)
}
