use derive_more::Display;
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Type, Serialize, Deserialize, Debug, Display, Clone, PartialEq)]
pub enum SError {
    #[display("Addon '{_0}' not found in addons directory")]
    AddonNotFound(String),
    #[display("Preset '{_0}' not found")]
    PresetNotFound(String),
    #[display("No thumbnail found for addon '{_0}'")]
    ThumbnailNotFound(String),
    #[display("Conflict: {_0}")]
    Conflict(String),
    #[display("Invalid value: {_0}")]
    Validation(String),
    #[display("I/O error: {_0}")]
    IOError(String),
    #[display("Invalid package manifest: {_0}")]
    ManifestError(String),
    #[display("Parse error: {_0}")]
    ParseError(String),
    #[display("Link failure: {_0}")]
    Link(String),
    #[display("{} operation(s) failed: {}", _0.len(), _0.join("; "))]
    PartialFailure(Vec<String>),
    #[display("Async runtime error: {_0}")]
    AsyncRuntimeError(String),
    #[display("Unexpected error{}", _0.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unexpected(Option<String>),
}

impl SError {
    pub fn conflict_exists(id: &str) -> Self {
        SError::Conflict(format!("addon id '{id}' exists"))
    }
}

impl std::error::Error for SError {}

impl From<std::io::Error> for SError {
    fn from(e: std::io::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<zip::result::ZipError> for SError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => SError::IOError(io.to_string()),
            other => SError::ManifestError(format!("corrupt archive: {other}")),
        }
    }
}

impl From<serde_json::Error> for SError {
    fn from(e: serde_json::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<toml::de::Error> for SError {
    fn from(e: toml::de::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<toml::ser::Error> for SError {
    fn from(e: toml::ser::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<walkdir::Error> for SError {
    fn from(e: walkdir::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<std::path::StripPrefixError> for SError {
    fn from(e: std::path::StripPrefixError) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<confy::ConfyError> for SError {
    fn from(e: confy::ConfyError) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<tokio::task::JoinError> for SError {
    fn from(e: tokio::task::JoinError) -> Self {
        SError::AsyncRuntimeError(e.to_string())
    }
}
