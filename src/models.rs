pub mod addon;
pub mod error;
pub mod install;
pub mod manifest;
pub mod paths;
pub mod preset;
pub mod verification;
