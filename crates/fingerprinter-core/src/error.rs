use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Version {0} already in DB")]
    DuplicateVersion(String),

    #[error("The version supplied: '{0}' is not in the database")]
    VersionNotFound(String),

    #[error("The {0} option has to be supplied")]
    MissingOption(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{0}")]
    Other(String),
}
