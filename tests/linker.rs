use addon_keeper_lib::core::linker::{link, points_to, read_link_target, unlink};
use camino::Utf8Path;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_directory_link() {
    let tmp = tempdir().unwrap();
    let root = Utf8Path::from_path(tmp.path()).unwrap();

    let src_dir = root.join("source_dir");
    let dst_dir = root.join("Community").join("source_dir");
    let inner_file = src_dir.join("data.txt");

    fs::create_dir_all(&src_dir).unwrap();
    fs::write(&inner_file, "nested data").unwrap();

    // 1. Create Directory Link (Junction on Windows, Symlink on Unix), parents included
    link(&src_dir, &dst_dir).expect("Failed to link directory");

    // 2. Verify visibility
    let linked_file = dst_dir.join("data.txt");
    assert!(linked_file.exists());
    assert_eq!(fs::read_to_string(linked_file).unwrap(), "nested data");

    // 3. Verify read_link_target
    let target = read_link_target(&dst_dir).expect("Failed to read link");
    assert!(target.ends_with("source_dir"));
    assert!(points_to(&dst_dir, &src_dir));
}

#[test]
fn test_unlink_keeps_source() {
    let tmp = tempdir().unwrap();
    let root = Utf8Path::from_path(tmp.path()).unwrap();

    let src = root.join("original");
    let dst = root.join("link");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("keep.txt"), "keep me").unwrap();

    link(&src, &dst).unwrap();
    assert!(dst.exists());

    unlink(&dst).expect("Failed to unlink");

    assert!(!dst.exists());
    assert!(!dst.is_symlink());
    assert_eq!(fs::read_to_string(src.join("keep.txt")).unwrap(), "keep me");
}

#[test]
fn test_link_already_exists_correctly() {
    let tmp = tempdir().unwrap();
    let root = Utf8Path::from_path(tmp.path()).unwrap();

    let src = root.join("src");
    let dst = root.join("dst");
    fs::create_dir_all(&src).unwrap();

    link(&src, &dst).unwrap();

    // Link second time (should be idempotent / return Ok)
    let result = link(&src, &dst);
    assert!(
        result.is_ok(),
        "Subsequent link to same source should succeed"
    );
}

#[test]
fn test_collision_detection() {
    let tmp = tempdir().unwrap();
    let root = Utf8Path::from_path(tmp.path()).unwrap();

    let src_a = root.join("a");
    let src_b = root.join("b");
    let dst = root.join("collision");
    fs::create_dir_all(&src_a).unwrap();
    fs::create_dir_all(&src_b).unwrap();

    link(&src_a, &dst).unwrap();

    // Attempt to Link B to Target (Collision!)
    let err = link(&src_b, &dst).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
    assert!(points_to(&dst, &src_a));
    assert!(!points_to(&dst, &src_b));
}

#[test]
fn test_unlink_refuses_real_directories() {
    let tmp = tempdir().unwrap();
    let root = Utf8Path::from_path(tmp.path()).unwrap();
    let real = root.join("real");
    fs::create_dir_all(&real).unwrap();

    let err = unlink(&real).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    assert!(real.is_dir());
    assert!(!points_to(&real, &real));
}

#[test]
fn test_unlink_non_existent_path() {
    let tmp = tempdir().unwrap();
    let root = Utf8Path::from_path(tmp.path()).unwrap();
    let path = root.join("ghost");

    // Should not error if path doesn't exist
    assert!(unlink(&path).is_ok());
}
