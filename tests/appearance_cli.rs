//! Runs the `appearance` binary against photos and detector output on disk.

use std::path::Path;
use std::process::Command;

use image::{ImageFormat, Rgb, RgbImage};

fn write_photo(path: &Path, hair: [u8; 3], top: [u8; 3]) {
    RgbImage::from_fn(8, 16, |_, y| if y < 4 { Rgb(hair) } else { Rgb(top) })
        .save_with_format(path, ImageFormat::Png)
        .expect("save photo");
}

const DETECTIONS: &str = r#"{
    "front": {
        "hair": [{"box": {"x0": 0, "y0": 0, "x1": 8, "y1": 4}, "confidence": 0.9, "class_id": 1}],
        "garment": [
            {"box": {"x0": 0, "y0": 4, "x1": 8, "y1": 16}, "confidence": 0.8, "class_id": 3},
            {"box": {"x0": 0, "y0": 4, "x1": 8, "y1": 16}, "confidence": 0.7, "class_id": 16}
        ]
    },
    "back": {
        "hair": [{"box": {"x0": 0, "y0": 0, "x1": 8, "y1": 4}, "confidence": 0.6, "class_id": 2}],
        "garment": [{"box": {"x0": 0, "y0": 4, "x1": 8, "y1": 16}, "confidence": 0.9, "class_id": 7}]
    }
}"#;

#[test]
fn analyzes_pair_by_id_and_writes_records() {
    let pictures = tempfile::tempdir().expect("tempdir");
    let id = "a1b2";
    let dir = pictures.path().join(id);
    std::fs::create_dir_all(&dir).expect("mkdir");
    // PNG payloads under .jpg names; the decoder sniffs the format.
    write_photo(&dir.join("a1b2_f.jpg"), [0x20, 0x30, 0x40], [0x60, 0x10, 0x10]);
    write_photo(&dir.join("a1b2_b.jpg"), [0x50, 0x50, 0x50], [0x10, 0x60, 0x10]);
    let detections = pictures.path().join("detections.json");
    std::fs::write(&detections, DETECTIONS).expect("write detections");
    let json_out = pictures.path().join("response.json");

    let output = Command::new(env!("CARGO_BIN_EXE_appearance"))
        .env_remove("APPEARANCE_CONFIG")
        .env("RUST_LOG", "warn")
        .arg("--pictures-dir")
        .arg(pictures.path())
        .arg("--analysis-id")
        .arg(id)
        .arg("--detections")
        .arg(&detections)
        .arg("--json")
        .arg(&json_out)
        .output()
        .expect("run appearance");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Back photo colors come from the front photo by default.
    let expected = "Label: no_bang_long, Color: #203040\n\
                    Label: jacket, Color: #601010\n\
                    Label: hoodie, Color: #601010\n";
    assert_eq!(String::from_utf8_lossy(&output.stdout), expected);

    let record = std::fs::read_to_string(dir.join("results").join("result.txt")).expect("record");
    assert_eq!(record, expected);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_out).expect("json")).expect("parse");
    assert_eq!(json["results"][0]["label"], "no_bang_long");
    assert_eq!(json["results"].as_array().map(|a| a.len()), Some(3));
}

#[test]
fn missing_back_photo_fails() {
    let pictures = tempfile::tempdir().expect("tempdir");
    let front = pictures.path().join("f.png");
    write_photo(&front, [0x20, 0x30, 0x40], [0x60, 0x10, 0x10]);
    let detections = pictures.path().join("detections.json");
    std::fs::write(&detections, DETECTIONS).expect("write detections");

    let output = Command::new(env!("CARGO_BIN_EXE_appearance"))
        .env_remove("APPEARANCE_CONFIG")
        .arg("--front")
        .arg(&front)
        .arg("--back")
        .arg(pictures.path().join("missing.png"))
        .arg("--detections")
        .arg(&detections)
        .output()
        .expect("run appearance");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("back image missing"));
    assert!(!pictures.path().join("results").exists());
}
