use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AddonInstallResult {
    Success { id: String },
    Failure { file: String, error: String },
}

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq, Default)]
pub struct InstallResult {
    pub results: Vec<AddonInstallResult>,
}
