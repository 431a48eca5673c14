use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn write_scene() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let scene = r#"<scene>
  <ambient>64 64 64</ambient>
  <object>
    <name>Floor</name>
    <type>quad</type>
    <scale>10 10 10</scale>
  </object>
  <object>
    <name>Pyramid</name>
    <mesh>models/pyramid.obj</mesh>
    <position>0 1 0</position>
  </object>
  <object>
    <name>Sun</name>
    <type>light</type>
    <light>directional</light>
    <direction>1 -1 0</direction>
  </object>
</scene>
"#;
    let pyramid = "\
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
f 1/1 5/3 2/2
f 2/2 5/3 3/3
f 3/3 5/3 4/4
f 4/4 5/3 1/1
";
    fs::create_dir(dir.path().join("models")).expect("models dir");
    fs::write(dir.path().join("models/pyramid.obj"), pyramid).expect("write mesh");
    fs::write(dir.path().join("scene.xml"), scene).expect("write scene");
    dir
}

#[test]
fn summary_lists_objects_and_draws() {
    let dir = write_scene();
    let mut cmd = Command::cargo_bin("shader-gallery").expect("binary exists");
    cmd.arg(dir.path().join("scene.xml"))
        .arg("--summary-only")
        .env("RUST_LOG", "error");
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 3 objects (1 lights)"))
        .stdout(contains(" - Pyramid (mesh)"))
        .stdout(contains(" - Sun (light)"))
        .stdout(contains("Assembled 2 draw(s) with the phong shader at 1280x720"))
        .stdout(contains(" - Floor: 23 uniforms, 0 textures"));
}

#[test]
fn summary_binds_textures_for_normal_mapping() {
    let dir = write_scene();
    let mut cmd = Command::cargo_bin("shader-gallery").expect("binary exists");
    cmd.arg(dir.path().join("scene.xml"))
        .args(["--summary-only", "--variant", "normal-mapped", "--width", "640"])
        .env("RUST_LOG", "error");
    cmd.assert()
        .success()
        .stdout(contains("with the normal-mapped shader at 640x720"))
        .stdout(contains(" - Pyramid: 25 uniforms, 2 textures"));
}

#[test]
fn default_scene_is_used_without_a_path() {
    let mut cmd = Command::cargo_bin("shader-gallery").expect("binary exists");
    cmd.arg("--summary-only").env("RUST_LOG", "error");
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 2 objects (1 lights)"))
        .stdout(contains(" - Quad: 23 uniforms, 0 textures"));
}

#[test]
fn missing_mesh_fails_before_rendering() {
    let dir = tempfile::tempdir().expect("temp dir");
    let scene = "<scene><object><name>Bunny</name><mesh>bunny.obj</mesh></object></scene>";
    fs::write(dir.path().join("scene.xml"), scene).expect("write scene");
    let mut cmd = Command::cargo_bin("shader-gallery").expect("binary exists");
    cmd.arg(dir.path().join("scene.xml")).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("Bunny mesh error"));
}

#[test]
fn unknown_variant_is_rejected() {
    let mut cmd = Command::cargo_bin("shader-gallery").expect("binary exists");
    cmd.args(["--summary-only", "--variant", "toon"]);
    cmd.assert()
        .failure()
        .stderr(contains("unknown shader variant `toon`"));
}

#[test]
fn unknown_object_type_fails_to_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let scene = "<scene><object><name>Crate</name><type>cube</type></object></scene>";
    fs::write(dir.path().join("scene.xml"), scene).expect("write scene");
    let mut cmd = Command::cargo_bin("shader-gallery").expect("binary exists");
    cmd.arg(dir.path().join("scene.xml")).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("object Crate has unknown type `cube`"));
}
