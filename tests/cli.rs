// CLI integration tests: drive the bkpack binary against throwaway project trees.
use assert_cmd::Command;
use std::fs;
use std::path::Path;

fn bkpack(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bkpack").expect("bkpack binary");
    cmd.current_dir(dir);
    cmd.env_remove("BKPACK_CLIENT_REPO");
    cmd
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write");
}

const PLUGIN_CFG: &str = "[plugin]\n\nname=\"BlenderKit\"\ndescription=\"Asset library\"\nauthor=\"BlenderKit\"\nversion=\"1.0.0\"\nscript=\"plugin.gd\"\n";

fn plugin_project(root: &Path) {
    write(&root.join("addons/blenderkit/plugin.cfg"), PLUGIN_CFG);
    write(&root.join("addons/blenderkit/plugin.gd"), "@tool\nextends EditorPlugin\n");
    write(&root.join("addons/blenderkit/plugin.gd.uid"), "uid://b1x2\n");
    write(&root.join("addons/blenderkit/ui/panel.tscn"), "[gd_scene]\n");
}

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

#[cfg(unix)]
#[test]
fn full_build_stages_binaries_and_writes_versioned_archive() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    plugin_project(root);
    write(&root.join("out/blenderkit/client/v1.0.0/blenderkit-client-linux"), "elf");
    write(&root.join("out/blenderkit/client/v1.0.0/readme.txt"), "docs");
    write(&root.join("bkpack.toml"), "client_build_cmd = [\"sh\", \"-c\", \"true\"]\n");

    bkpack(root)
        .args(["build", "--client-dir", ".", "--result-dir", "out"])
        .assert()
        .success();

    assert!(root
        .join("out/addons/blenderkit/client/v1.0.0/blenderkit-client-linux")
        .is_file());
    assert!(!root.join("out/addons/blenderkit/client/v1.0.0/readme.txt").exists());

    let zip_path = root.join("out/blenderkit-godot_v1.0.0.zip");
    assert!(zip_path.is_file());
    let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).expect("open zip")).expect("zip");
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect();
    assert!(names.iter().all(|n| n.starts_with("addons/")));
    assert!(names.contains(&"addons/blenderkit/plugin.gd".to_string()));
    assert!(names.contains(&"addons/blenderkit/ui/panel.tscn".to_string()));
    assert!(names.contains(&"addons/blenderkit/client/v1.0.0/blenderkit-client-linux".to_string()));
    assert!(!names.iter().any(|n| n.ends_with(".uid")));
}

#[test]
fn build_plugin_without_client_binaries_fails_with_guidance() {
    let temp = tempfile::tempdir().expect("tempdir");
    plugin_project(temp.path());
    fs::create_dir_all(temp.path().join("client")).expect("mkdir");

    let assert = bkpack(temp.path())
        .args(["build-plugin", "--client-dir", "client"])
        .assert()
        .failure();
    let stderr = stderr_of(&assert);
    assert_eq!(stderr.matches("build-client").count(), 1, "{}", stderr);
    assert_eq!(stderr.matches("ERROR").count(), 1, "{}", stderr);
}

#[test]
fn failed_archive_keeps_clean_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    plugin_project(root);
    write(&root.join("bins/v1.0.0/blenderkit-client-linux"), "elf");
    write(&root.join("cache/keep.bin"), "cached");
    write(&root.join("bkpack.toml"), "exclude = [\"[\"]\n");

    let assert = bkpack(root)
        .args(["build", "--client-build", "bins/v1.0.0", "--clean-dir", "cache"])
        .assert()
        .failure();

    assert!(stderr_of(&assert).contains("exclude"));
    assert!(root.join("cache/keep.bin").is_file());
}

#[test]
fn build_archive_without_staged_plugin_fails_with_guidance() {
    let temp = tempfile::tempdir().expect("tempdir");
    plugin_project(temp.path());

    let assert = bkpack(temp.path()).arg("build-archive").assert().failure();
    assert!(stderr_of(&assert).contains("build-plugin"));
}

#[test]
fn build_plugin_then_build_archive() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    plugin_project(root);
    write(&root.join("bins/v2.3.4/blenderkit-client-macos-arm64"), "macho");

    bkpack(root)
        .args(["build-plugin", "--client-build", "bins/v2.3.4", "--result-dir", "dist"])
        .assert()
        .success();
    assert!(root
        .join("dist/addons/blenderkit/client/v2.3.4/blenderkit-client-macos-arm64")
        .is_file());
    assert!(root.join("dist/.gdignore").is_file());

    bkpack(root)
        .args(["build-archive", "--result-dir", "dist"])
        .assert()
        .success();
    assert!(root.join("dist/blenderkit-godot_v1.0.0.zip").is_file());
}

#[test]
fn clean_twice_succeeds() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    plugin_project(root);
    write(&root.join("out/addons/blenderkit/plugin.gd"), "x");
    write(&root.join(".client/out/blenderkit/client/v1.0.0/blenderkit-client-linux"), "elf");

    bkpack(root).arg("clean").assert().success();
    assert!(!root.join("out").exists());
    assert!(!root.join(".client/out/blenderkit/client").exists());

    bkpack(root).arg("clean").assert().success();
    assert!(root.join("addons/blenderkit/plugin.cfg").is_file());
}

#[test]
fn set_version_strips_prefix_and_keeps_other_lines() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    plugin_project(root);

    bkpack(root).args(["set-version", "v1.4.0"]).assert().success();

    let cfg = fs::read_to_string(root.join("addons/blenderkit/plugin.cfg")).expect("read cfg");
    assert_eq!(cfg, PLUGIN_CFG.replace("version=\"1.0.0\"", "version=\"1.4.0\""));

    let assert = bkpack(root).arg("version").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout.trim(), "1.4.0");
}

#[cfg(unix)]
#[test]
fn client_build_failure_exit_code_is_propagated() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    plugin_project(root);
    write(&root.join("bkpack.toml"), "client_build_cmd = [\"sh\", \"-c\", \"exit 5\"]\n");

    bkpack(root)
        .args(["build-client", "--client-dir", "."])
        .assert()
        .code(5);
}

#[test]
fn unknown_command_prints_help_and_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let assert = bkpack(temp.path()).arg("deploy").assert().failure();
    assert!(stderr_of(&assert).contains("Usage"));
}

#[test]
fn missing_plugin_config_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    bkpack(temp.path())
        .args(["set-version", "1.0.0"])
        .assert()
        .failure();
}
