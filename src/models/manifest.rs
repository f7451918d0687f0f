use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq, Default)]
pub struct Manifest {
    pub title: String,
    pub content_type: String,
    pub creator: String,
    #[serde(default)]
    pub manufacturer: String,
    pub package_version: String,
    #[serde(default)]
    pub minimum_game_version: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

#[derive(Serialize, Deserialize, Type, Clone, Debug, PartialEq)]
pub struct Dependency {
    pub name: String,
    pub package_version: String,
}

/// Package-declared file list (`layout.json`).
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Layout {
    pub content: Vec<LayoutContent>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LayoutContent {
    pub path: String,
    pub size: u64,
    #[serde(default)]
    pub date: u64,
}
