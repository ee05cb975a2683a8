/// One released version of the fingerprinted package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub id: i64,
    pub number: String,
    pub created_at: String,
}

/// A release-relative file path, shared by every version that ships a file there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePath {
    pub id: i64,
    pub value: String,
}

/// "At version V, path P had content hash H."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub id: i64,
    pub path_id: i64,
    pub version_id: i64,
    pub hash: String,
}

/// A fingerprint joined with its path value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintEntry {
    pub hash: String,
    pub path_id: i64,
    pub version_id: i64,
    pub path: String,
}

/// Where a given hash was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashHit {
    pub version: String,
    pub path: String,
}

/// What a given path held in each version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHit {
    pub hash: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStats {
    pub version: String,
    pub fingerprints: i64,
    pub unique_fingerprints: i64,
}
