use derive_more::Display;
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Serialize, Deserialize, Type, Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum VerificationStatus {
    Ok,
    SizeMismatch,
    NotFound,
}

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq)]
pub struct VerificationNode {
    pub status: VerificationStatus,
    pub path: String,
    /// Expected size in bytes, as recorded at install time.
    pub size: u64,
}

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq)]
pub struct VerificationResult {
    pub verified: bool,
    pub files: Vec<VerificationNode>,
}
