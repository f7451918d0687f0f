mod common;

use addon_keeper_lib::core::installer::Installer;
use addon_keeper_lib::core::verifier::Verifier;
use addon_keeper_lib::models::error::SError;
use addon_keeper_lib::models::verification::VerificationStatus;
use common::{create_test_package, setup_test_env};
use std::fs;

#[test]
fn test_detects_size_mismatch_and_missing_files() {
    let env = setup_test_env();
    let lib = env.library();
    let src = env.sources.join("airport");
    create_test_package(
        &src,
        "Airport",
        &[("a.bgl", "0123456789"), ("b.bgl", "01234567890123456789")],
        true,
    );
    Installer::install(&lib, &env.target(false), &[src]);

    let clean = Verifier::verify(&lib, "airport").unwrap();
    assert!(clean.verified);
    assert!(clean.files.iter().all(|f| f.status == VerificationStatus::Ok));

    let root = env.addons.join("airport");
    fs::write(root.join("a.bgl"), "01234").unwrap();
    fs::remove_file(root.join("b.bgl")).unwrap();

    let result = Verifier::verify(&lib, "airport").unwrap();
    assert!(!result.verified);
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.files[0].path, "a.bgl");
    assert_eq!(result.files[0].size, 10);
    assert_eq!(result.files[0].status, VerificationStatus::SizeMismatch);
    assert_eq!(result.files[1].path, "b.bgl");
    assert_eq!(result.files[1].status, VerificationStatus::NotFound);

    // Read-only and deterministic
    assert_eq!(Verifier::verify(&lib, "airport").unwrap(), result);
    assert!(!root.join("b.bgl").exists());
}

#[test]
fn test_extra_files_are_ignored() {
    let env = setup_test_env();
    let lib = env.library();
    let src = env.sources.join("livery");
    create_test_package(&src, "Livery", &[("texture/t.dds", "abc")], true);
    Installer::install(&lib, &env.target(false), &[src]);

    fs::write(env.addons.join("livery/user-notes.txt"), "mine").unwrap();
    assert!(Verifier::verify(&lib, "livery").unwrap().verified);
}

#[test]
fn test_ledger_without_layout_covers_every_file() {
    let env = setup_test_env();
    let lib = env.library();
    let id = env.install_package(&lib, "no-layout", false);

    let result = Verifier::verify(&lib, &id).unwrap();
    let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["data/file.bin", "manifest.json"]);
    assert!(result.verified);
}

#[test]
fn test_unknown_addon() {
    let env = setup_test_env();
    let lib = env.library();
    assert!(matches!(
        Verifier::verify(&lib, "ghost"),
        Err(SError::AddonNotFound(_))
    ));
}
