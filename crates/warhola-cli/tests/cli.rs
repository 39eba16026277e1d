use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn warhola(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_warhola"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run warhola")
}

fn arg(p: &Path) -> &str {
    p.to_str().expect("utf-8 temp path")
}

#[test]
fn new_canvas_then_edit() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("canvas.png");
    let bmp = dir.path().join("flipped.bmp");

    let out = warhola(&[arg(&png), "--size", "8x4", "info"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(png.exists());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Resolution: 8x4"), "{stdout}");

    let out = warhola(&[arg(&png), "flip", "h", "-o", arg(&bmp)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(&fs::read(&bmp).unwrap()[..2], b"BM");

    let out = warhola(&[arg(&png), "resize", "-w", "4", "-H", "2", "-f", "linear"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let out = warhola(&[arg(&png), "info"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("Resolution: 4x2"));
}

#[test]
fn failures_exit_non_zero() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.png");

    // a new canvas needs a size
    let out = warhola(&[arg(&missing), "info"]);
    assert!(!out.status.success());
    assert!(!missing.exists());

    let png = dir.path().join("ok.png");
    assert!(warhola(&[arg(&png), "--size", "4x4", "info"]).status.success());
    assert!(!warhola(&[arg(&png), "adjust", "brightness", "5"]).status.success());
    assert!(!warhola(&[arg(&png), "flip", "diagonal"]).status.success());
    assert!(!warhola(&[arg(&png), "crop", "10,10,20,20"]).status.success());
}
