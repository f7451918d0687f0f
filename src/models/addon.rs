use crate::models::manifest::Manifest;
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub version: String,
    pub content_type: String,
    pub enabled: bool,
    pub size: u64,
}

/// One expected file of an installed add-on, relative to its root.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub path: String,
    pub size: u64,
}

// Internal registry representation: includes the file ledger but NOT sent to frontend
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AddonRecord {
    pub id: String,
    pub manifest: Manifest,
    pub size: u64,
    #[serde(default)]
    pub files: Vec<LedgerEntry>,
}

impl AddonRecord {
    pub fn to_addon(&self, enabled: bool) -> Addon {
        Addon {
            id: self.id.clone(),
            name: self.manifest.title.clone(),
            creator: self.manifest.creator.clone(),
            version: self.manifest.package_version.clone(),
            content_type: self.manifest.content_type.clone(),
            enabled,
            size: self.size,
        }
    }
}
