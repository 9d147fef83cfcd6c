// Integration tests for the binary's exit status and error output
// Spawns the built binary against a copy of the captured generator tree

mod common;

use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

use common::{copy_dir, fixtures};

fn run_patch(target: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_toolchain-cli-gen"))
        .arg("patch")
        .arg(target)
        .arg("--catalog")
        .arg(fixtures().join("catalog.json"))
        .env("TOOLGEN__EXCLUDED_SERVICES", r#"["legacy_tool"]"#)
        .env_remove("IBM_CLOUD_API_KEY")
        .env_remove("TOOLGEN_CONFIG_DIR")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to spawn toolchain-cli-gen")
}

#[test]
fn patch_succeeds_once_then_fails() {
    let tree = TempDir::new().unwrap();
    copy_dir(&fixtures().join("generated"), tree.path());

    let first = run_patch(tree.path());
    let stderr = String::from_utf8_lossy(&first.stderr);
    assert!(first.status.success(), "first run should succeed. Got: {stderr}");
    assert!(stderr.contains("✓ Patched generated CLI"), "Got: {stderr}");

    let second = run_patch(tree.path());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(!second.status.success(), "second run must exit non-zero");
    assert!(stderr.contains("already been patched"), "Got: {stderr}");
}

#[test]
fn missing_catalog_source_exits_non_zero() {
    let tree = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_toolchain-cli-gen"))
        .arg("patch")
        .arg(tree.path())
        .env_remove("IBM_CLOUD_API_KEY")
        .env_remove("TOOLGEN_CONFIG_DIR")
        .output()
        .expect("Failed to spawn toolchain-cli-gen");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No services catalog"), "Got: {stderr}");
}
