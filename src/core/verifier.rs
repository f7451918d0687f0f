use crate::core::library::Library;
use crate::models::error::SError;
use crate::models::verification::{VerificationNode, VerificationResult, VerificationStatus};
use camino::Utf8Path;
use std::fs;

pub struct Verifier;

impl Verifier {
    /// Compares the files recorded at install time with what is on disk now.
    /// Read-only: nothing is repaired and no state is updated.
    pub fn verify(library: &Library, id: &str) -> Result<VerificationResult, SError> {
        let lock = library.lock_for(id);
        let _guard = lock.lock();
        let record = library.record(id)?;
        let root = library.addon_path(id);

        let files: Vec<VerificationNode> = record
            .files
            .iter()
            .map(|entry| VerificationNode {
                status: Self::classify(&root.join(&entry.path), entry.size),
                path: entry.path.clone(),
                size: entry.size,
            })
            .collect();

        Ok(VerificationResult {
            verified: files.iter().all(|n| n.status == VerificationStatus::Ok),
            files,
        })
    }

    fn classify(path: &Utf8Path, expected: u64) -> VerificationStatus {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() && meta.len() == expected => VerificationStatus::Ok,
            Ok(_) => VerificationStatus::SizeMismatch,
            Err(_) => VerificationStatus::NotFound,
        }
    }
}
