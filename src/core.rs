pub mod decompression;
pub mod enablement;
pub mod installer;
pub mod library;
pub mod linker;
pub mod locks;
pub mod manifest;
pub mod preset;
pub mod registry;
pub mod sim;
pub mod stager;
pub mod verifier;
