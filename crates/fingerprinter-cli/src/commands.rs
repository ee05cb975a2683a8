use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fingerprinter")]
#[command(about = "Identify the release version deployed at a URL", long_about = None)]
pub struct Cli {
    /// Fingerprint database to use instead of `database_path` from config
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest every release from the release root that is not in the database yet
    AutoUpdate,
    /// Ingest an already extracted release tree
    ManualUpdate {
        /// Root of the extracted release; removed after ingestion
        #[arg(long)]
        archive: PathBuf,
        /// Version number to record the tree under
        #[arg(long = "version")]
        version_number: Option<String>,
    },
    /// List every known version
    ListVersions,
    /// Show the fingerprints that only exist in the given version
    ShowUniqueFingerprints { version: String },
    /// Find every version and path that produced a hash
    SearchHash { hash: String },
    /// Find recorded hashes for paths matching a pattern (SQL LIKE, or substring)
    SearchFile { pattern: String },
    /// Fingerprint the release deployed at a URL
    Fingerprint {
        url: String,
        /// Only check fingerprints unique to each version
        #[arg(long)]
        unique: bool,
        /// Print every matching URL
        #[arg(long)]
        verbose: bool,
    },
    /// Per-version fingerprint counts
    Stats,
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}
