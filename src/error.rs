use thiserror::Error;

/// Failure to turn a stored string back into a typed field, or a field into
/// a string.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading or saving the settings record.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error at '{location}': {source}")]
    Storage {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to encode '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("schema version {found} is newer than supported {max}")]
    FutureSchema { found: u32, max: u32 },
}

/// Rejected contact edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("please enter both name and phone number")]
    MissingInformation,
}

/// Errors from the application configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no home directory available for qualifier '{0}'")]
    NoProjectDirs(String),
}
