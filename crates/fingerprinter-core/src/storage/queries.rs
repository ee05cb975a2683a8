use super::models::*;
use super::sqlite::Database;
use crate::error::Error;
use crate::version_order::sort_versions;
use rusqlite::{params, OptionalExtension, Result, Row};
use tracing::debug;

fn version_from_row(row: &Row<'_>) -> Result<Version> {
    Ok(Version {
        id: row.get(0)?,
        number: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> Result<FingerprintEntry> {
    Ok(FingerprintEntry {
        hash: row.get(0)?,
        path_id: row.get(1)?,
        version_id: row.get(2)?,
        path: row.get(3)?,
    })
}

/// `LIKE` operand for a file search, used with `ESCAPE '\'`.
///
/// A pattern containing `%` is taken as a raw `LIKE` pattern. Anything else is
/// a plain substring: `_` and `\` are escaped and the text is wrapped in `%`,
/// so `my_module.js` only matches a literal underscore.
fn like_pattern(pattern: &str) -> String {
    if pattern.contains('%') {
        return pattern.to_string();
    }
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if c == '_' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Database {
    // ── Versions ─────────────────────────────────────────────────

    pub fn create_version(&self, number: &str) -> Result<Version, Error> {
        if self.find_version(number)?.is_some() {
            return Err(Error::DuplicateVersion(number.to_string()));
        }
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO versions (number, created_at) VALUES (?1, ?2)",
            params![number, now],
        )?;
        let id = self.connection().last_insert_rowid();
        debug!("Created version {} (id {})", number, id);
        Ok(Version {
            id,
            number: number.to_string(),
            created_at: now,
        })
    }

    pub fn find_version(&self, number: &str) -> Result<Option<Version>> {
        self.connection()
            .query_row(
                "SELECT id, number, created_at FROM versions WHERE number = ?1",
                params![number],
                version_from_row,
            )
            .optional()
    }

    /// Every known version, in natural version order.
    pub fn list_versions(&self) -> Result<Vec<Version>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, number, created_at FROM versions")?;
        let mut versions = stmt
            .query_map([], version_from_row)?
            .collect::<Result<Vec<_>>>()?;
        sort_versions(&mut versions, |v| v.number.as_str());
        Ok(versions)
    }

    // ── Paths ────────────────────────────────────────────────────

    /// Idempotent: the same value always maps to the same row.
    pub fn find_or_create_path(&self, value: &str) -> Result<ReleasePath> {
        self.connection().execute(
            "INSERT INTO paths (value) VALUES (?1) ON CONFLICT(value) DO NOTHING",
            params![value],
        )?;
        self.connection().query_row(
            "SELECT id, value FROM paths WHERE value = ?1",
            params![value],
            |row| {
                Ok(ReleasePath {
                    id: row.get(0)?,
                    value: row.get(1)?,
                })
            },
        )
    }

    /// Paths matching a SQL `LIKE` pattern, or containing `pattern` when it has no `%`.
    pub fn paths_matching(&self, pattern: &str) -> Result<Vec<ReleasePath>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, value FROM paths WHERE value LIKE ?1 ESCAPE '\\' ORDER BY value ASC",
        )?;
        let paths = stmt
            .query_map(params![like_pattern(pattern)], |row| {
                Ok(ReleasePath {
                    id: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(paths)
    }

    pub fn path_count(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM paths", [], |row| row.get(0))
    }

    // ── Fingerprints ─────────────────────────────────────────────

    pub fn create_fingerprint(
        &self,
        path_id: i64,
        version_id: i64,
        hash: &str,
    ) -> Result<Fingerprint> {
        let mut stmt = self.connection().prepare_cached(
            "INSERT INTO fingerprints (path_id, version_id, hash) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(params![path_id, version_id, hash])?;
        Ok(Fingerprint {
            id: self.connection().last_insert_rowid(),
            path_id,
            version_id,
            hash: hash.to_string(),
        })
    }

    pub fn fingerprints_of(&self, version_id: i64) -> Result<Vec<FingerprintEntry>> {
        let mut stmt = self.connection().prepare(
            "SELECT f.hash, f.path_id, f.version_id, p.value \
             FROM fingerprints f \
             JOIN paths p ON p.id = f.path_id \
             WHERE f.version_id = ?1 \
             ORDER BY p.value ASC",
        )?;
        let entries = stmt
            .query_map(params![version_id], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Every (version, path) that produced `hash`, in natural version order.
    pub fn fingerprints_by_hash(&self, hash: &str) -> Result<Vec<HashHit>> {
        let mut stmt = self.connection().prepare(
            "SELECT v.number, p.value \
             FROM fingerprints f \
             JOIN versions v ON v.id = f.version_id \
             JOIN paths p ON p.id = f.path_id \
             WHERE f.hash = ?1 \
             ORDER BY p.value ASC",
        )?;
        let mut hits = stmt
            .query_map(params![hash], |row| {
                Ok(HashHit {
                    version: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        sort_versions(&mut hits, |h| h.version.as_str());
        Ok(hits)
    }

    /// What `path_id` held in each version, in natural version order.
    pub fn fingerprints_for_path(&self, path_id: i64) -> Result<Vec<PathHit>> {
        let mut stmt = self.connection().prepare(
            "SELECT f.hash, v.number \
             FROM fingerprints f \
             JOIN versions v ON v.id = f.version_id \
             WHERE f.path_id = ?1",
        )?;
        let mut hits = stmt
            .query_map(params![path_id], |row| {
                Ok(PathHit {
                    hash: row.get(0)?,
                    version: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        sort_versions(&mut hits, |h| h.version.as_str());
        Ok(hits)
    }

    /// Fingerprints of `version_id` whose hash no other version ever produced,
    /// ordered by path. A hash repeated inside the same version stays unique.
    pub fn unique_fingerprints(&self, version_id: i64) -> Result<Vec<FingerprintEntry>> {
        let mut stmt = self.connection().prepare(
            "SELECT f.hash, f.path_id, f.version_id, p.value \
             FROM fingerprints f \
             JOIN paths p ON p.id = f.path_id \
             WHERE f.version_id = ?1 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM fingerprints other \
                   WHERE other.hash = f.hash AND other.version_id != ?1 \
               ) \
             ORDER BY p.value ASC",
        )?;
        let entries = stmt
            .query_map(params![version_id], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn fingerprint_count(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM fingerprints", [], |row| row.get(0))
    }

    /// Per-version fingerprint and unique-fingerprint counts, in natural version order.
    pub fn corpus_stats(&self) -> Result<Vec<VersionStats>> {
        let mut stmt = self.connection().prepare(
            "SELECT v.number, \
                    COUNT(f.id), \
                    COALESCE(SUM(CASE WHEN f.id IS NOT NULL AND NOT EXISTS ( \
                        SELECT 1 FROM fingerprints other \
                        WHERE other.hash = f.hash AND other.version_id != v.id \
                    ) THEN 1 ELSE 0 END), 0) \
             FROM versions v \
             LEFT JOIN fingerprints f ON f.version_id = v.id \
             GROUP BY v.id",
        )?;
        let mut stats = stmt
            .query_map([], |row| {
                Ok(VersionStats {
                    version: row.get(0)?,
                    fingerprints: row.get(1)?,
                    unique_fingerprints: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        sort_versions(&mut stats, |s| s.version.as_str());
        Ok(stats)
    }
}
