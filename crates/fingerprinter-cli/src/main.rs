mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use fingerprinter_core::matcher::HttpFetcher;
use fingerprinter_core::storage::Database;
use fingerprinter_core::{
    unique, AppConfig, Confirm, DirectorySource, Error, IgnoreRules, MatchEngine, MatchOptions,
    UniqueHitPolicy,
};
use progress::CliReporter;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match fingerprinter_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    if let Some(db) = args.db {
        config.database_path = db;
    }

    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return Ok(());
    };

    if let Commands::PrintConfig = command {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let db = Database::open(&config.database_path)
        .with_context(|| format!("Error opening database {}", config.database_path))?;

    let result = run_command(&db, &config, command);
    db.close().context("Error closing database")?;

    match result {
        Err(err @ Error::MissingOption(_)) => {
            error!("{}", err);
            process::exit(1);
        }
        other => other.map_err(anyhow::Error::from),
    }
}

fn run_command(db: &Database, config: &AppConfig, command: Commands) -> Result<(), Error> {
    match command {
        Commands::AutoUpdate => run_auto_update(db, config),
        Commands::ManualUpdate {
            archive,
            version_number,
        } => run_manual_update(db, config, version_number.as_deref(), &archive),
        Commands::ListVersions => {
            for version in db.list_versions()? {
                println!("{}", version.number);
            }
            Ok(())
        }
        Commands::ShowUniqueFingerprints { version } => show_unique_fingerprints(db, &version),
        Commands::SearchHash { hash } => search_hash(db, &hash),
        Commands::SearchFile { pattern } => search_file(db, &pattern),
        Commands::Fingerprint {
            url,
            unique,
            verbose,
        } => run_fingerprint(db, config, &url, unique, verbose),
        Commands::Stats => print_stats(db),
        Commands::TruncateDb => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the fingerprint corpus?",
                Some(false),
            ) {
                Ok(true) => {
                    db.truncate_all()?;
                    println!("All tables truncated");
                }
                _ => println!("Nothing deleted"),
            }
            Ok(())
        }
        Commands::PrintConfig => Ok(()),
    }
}

fn run_auto_update(db: &Database, config: &AppConfig) -> Result<(), Error> {
    let ignore = IgnoreRules::new(&config.ignore_patterns)?;
    let source = DirectorySource::new(&config.release_root, &config.staging_dir);
    let reporter = CliReporter::new();

    let summary = fingerprinter_core::auto_update(db, &source, &ignore, &reporter)?;

    info!(
        "{} versions discovered: {} ingested, {} skipped, {} failed",
        format!("{}", summary.discovered).cyan(),
        format!("{}", summary.ingested.len()).green(),
        format!("{}", summary.skipped.len()).yellow(),
        format!("{}", summary.failed.len()).red(),
    );
    for (version, reason) in &summary.failed {
        error!("{}: {}", version, reason);
    }
    Ok(())
}

fn run_manual_update(
    db: &Database,
    config: &AppConfig,
    version_number: Option<&str>,
    archive: &Path,
) -> Result<(), Error> {
    let ignore = IgnoreRules::new(&config.ignore_patterns)?;
    let reporter = CliReporter::new();

    // A failed ingest of the one requested version fails the command.
    if let Some(outcome) =
        fingerprinter_core::manual_update(db, version_number, archive, &ignore, &reporter)?
    {
        info!(
            "Version {} ingested with {} fingerprints",
            outcome.version.number.green(),
            format!("{}", outcome.fingerprints).cyan(),
        );
    }
    Ok(())
}

fn show_unique_fingerprints(db: &Database, version_number: &str) -> Result<(), Error> {
    match unique::unique_fingerprints(db, version_number)? {
        Some(set) => {
            println!("Results for {}:", set.version.number);
            for fingerprint in &set.fingerprints {
                println!("{} {}", fingerprint.hash, fingerprint.path);
            }
        }
        None => println!("{}", Error::VersionNotFound(version_number.to_string())),
    }
    Ok(())
}

fn search_hash(db: &Database, hash: &str) -> Result<(), Error> {
    println!("Results for {}:", hash);
    for hit in db.fingerprints_by_hash(hash)? {
        println!("  {} {}", hit.version, hit.path);
    }
    Ok(())
}

fn search_file(db: &Database, pattern: &str) -> Result<(), Error> {
    let paths = db.paths_matching(pattern)?;

    for path in &paths {
        println!("Results for {}:", path.value);
        for hit in db.fingerprints_for_path(path.id)? {
            println!("  {} {}", hit.hash, hit.version);
        }
    }

    if paths.is_empty() {
        println!("No Results");
    }
    Ok(())
}

fn print_stats(db: &Database) -> Result<(), Error> {
    let stats = db.corpus_stats()?;
    for row in &stats {
        println!(
            "{} {} fingerprints, {} unique",
            row.version,
            row.fingerprints,
            format!("{}", row.unique_fingerprints).cyan(),
        );
    }
    info!(
        "{} versions, {} paths, {} fingerprints",
        stats.len(),
        db.path_count()?,
        db.fingerprint_count()?,
    );
    Ok(())
}

/// Asks the operator on the console after a unique-fingerprint hit.
struct ConsoleConfirm;

impl Confirm for ConsoleConfirm {
    fn confirm_continue(&self, version: &str) -> bool {
        print!(
            "The version is very likely to be {}. Do you still want to continue anyway? [y/N] ",
            version.green().bold()
        );
        if io::stdout().flush().is_err() {
            return false;
        }

        // Anything but an explicit yes stops the scan, including EOF.
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => input.trim_start().to_lowercase().starts_with('y'),
            Err(_) => false,
        }
    }
}

fn run_fingerprint(
    db: &Database,
    config: &AppConfig,
    url: &str,
    unique: bool,
    verbose: bool,
) -> Result<(), Error> {
    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.fetch_timeout_secs),
        &config.user_agent,
    );
    let options = MatchOptions {
        unique,
        verbose,
        on_unique_hit: UniqueHitPolicy::from_config(config.stop_on_unique_match),
    };
    let reporter = CliReporter::new();

    let summary = MatchEngine::new(db, fetcher, options).run(url, &reporter, &ConsoleConfirm)?;

    if let Some(version) = summary.stopped_at {
        info!("Stopped after a unique match on {}", version.green());
    } else if summary.scores.is_empty() {
        info!("No fingerprints to check; run auto-update or manual-update first");
    }
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_manual_update_reports_failed_ingest() {
        let tmp = tempdir().unwrap();
        let not_a_tree = tmp.path().join("release.zip");
        fs::write(&not_a_tree, "zip bytes").unwrap();
        let db = Database::open_in_memory().unwrap();

        let result = run_manual_update(&db, &AppConfig::default(), Some("1.0"), &not_a_tree);
        assert!(result.is_err());
        assert!(db.find_version("1.0").unwrap().is_none());
    }

    #[test]
    fn test_manual_update_of_known_version_succeeds() {
        let tmp = tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        db.create_version("1.0").unwrap();

        let result = run_manual_update(&db, &AppConfig::default(), Some("1.0"), tmp.path());
        assert!(result.is_ok());
    }
}
