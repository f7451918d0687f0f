use camino::{Utf8Path, Utf8PathBuf};

macro_rules! define_paths {
    ($name:ident { $($field:ident : $default:expr),* $(,)? }) => {
        #[derive(Clone, Debug)]
        pub struct $name {
            $(pub $field: Utf8PathBuf,)*
        }

        impl $name {
            pub fn to_absolute(mut self, base: &Utf8Path) -> Self {
                $(self.$field = base.join(self.$field);)*
                self
            }

            pub fn new(base: &Utf8Path) -> Self {
                Self::default().to_absolute(base)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default.into(),)*
                }
            }
        }
    };
}

// Files a package carries at its root.
define_paths!(PackagePaths {
    manifest: "manifest.json",
    layout: "layout.json",
    content_info: "ContentInfo",
});

// Engine bookkeeping inside the addons directory.
define_paths!(LibPathRules {
    meta: ".keeper",
    registry: ".keeper/registry.toml",
    staging: ".keeper/staging",
});

// Simulator data, relative to the folder two levels above the community directory.
define_paths!(SimPathRules {
    scenery_indexes: "SceneryIndexes",
    rolling_cache: "ROLLINGCACHE.CCC",
});

impl LibPathRules {
    /// Root of the library, i.e. the addons directory itself.
    pub fn root(&self) -> &Utf8Path {
        self.meta.parent().unwrap_or(Utf8Path::new(""))
    }

    pub fn addon(&self, id: &str) -> Utf8PathBuf {
        self.root().join(id)
    }
}
