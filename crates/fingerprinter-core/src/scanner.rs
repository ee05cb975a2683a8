use crate::error::Error;
use glob::Pattern;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// Exclusion predicate for release trees, built from glob patterns.
///
/// Patterns are matched against the release-relative path without its leading
/// `/` (e.g. `docs/readme.txt`), so `*.txt` excludes text files at any depth.
#[derive(Debug, Default, Clone)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self, Error> {
        let patterns = globs
            .iter()
            .map(|glob| Pattern::new(glob.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, path_value: &str) -> bool {
        let relative = path_value.trim_start_matches('/');
        self.patterns.iter().any(|pattern| pattern.matches(relative))
    }
}

/// Release-relative path value for `file` under `root`, e.g. `/assets/app.js`.
///
/// The root is removed with an anchored, component-wise prefix strip, so a
/// nested directory that happens to share the root's name is left intact.
pub fn path_value(root: &Path, file: &Path) -> Result<String, Error> {
    let relative = file.strip_prefix(root).map_err(|_| {
        Error::Other(format!(
            "{} is not under release root {}",
            file.display(),
            root.display()
        ))
    })?;

    let mut out = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            out.push('/');
            out.push_str(&part.to_string_lossy());
        }
    }
    Ok(out)
}

/// A file selected for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
    pub absolute: PathBuf,
    pub value: String,
}

/// Whether a walk entry names file content: a regular file, or a symlink whose
/// target is one. Directory symlinks are not descended into.
pub(crate) fn is_file_like(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    match fs::metadata(entry.path()) {
        Ok(target) if target.is_file() => true,
        Ok(_) => {
            warn!("Skipping symlink to a directory: {}", entry.path().display());
            false
        }
        Err(e) => {
            warn!("Skipping broken symlink {}: {}", entry.path().display(), e);
            false
        }
    }
}

/// Every non-ignored file under `root`, sorted by path value.
///
/// Symlinked files are hashed through their target and keep the link's own
/// path value. Directories are never returned.
pub fn release_files(root: &Path, ignore: &IgnoreRules) -> Result<Vec<ReleaseFile>, Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !is_file_like(&entry) {
            continue;
        }
        let value = path_value(root, entry.path())?;
        if ignore.is_ignored(&value) {
            trace!("Ignoring {}", value);
            continue;
        }
        files.push(ReleaseFile {
            absolute: entry.into_path(),
            value,
        });
    }

    files.sort_by(|a, b| a.value.cmp(&b.value));
    Ok(files)
}
