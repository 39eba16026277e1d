use std::path::Path;

use tempfile::tempdir;
use warhola_core::{Color, Layout, PixelBuffer, Rect};
use warhola_io::{Action, CanvasBuilder, Codec, Format, IoError, StandardCodec};
use warhola_ops::{Direction, OpsError};

fn pattern(w: i32, h: i32) -> PixelBuffer {
    let mut buf = PixelBuffer::scratch(Layout::Rgba32, w, h).unwrap();
    for y in 0..h {
        for x in 0..w {
            buf.set(x, y, Color::Rgba([(x * 20) as u8, (y * 20) as u8, 77, 255]));
        }
    }
    buf
}

fn write(path: &Path, buf: &PixelBuffer, format: Format) {
    StandardCodec::default().write(path, buf, format).unwrap();
}

#[test]
fn new_canvas_is_written_immediately() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.png");

    let (canvas, notes) = CanvasBuilder::new().path(&path).size(12, 8).build().unwrap();
    assert_eq!(canvas.action(), Action::New);
    assert_eq!(canvas.format(), Format::Png);
    assert!(path.exists());
    assert!(notes.actual().iter().any(|n| n == "action is new"));

    let (reopened, _) = CanvasBuilder::new().path(&path).layout(Layout::Rgba32).build().unwrap();
    assert_eq!(reopened.action(), Action::Open);
    assert_eq!(reopened.buffer().rect(), Rect::from_size(12, 8));
    assert_eq!(reopened.buffer().layout(), Layout::Rgba32);
}

#[test]
fn new_canvas_needs_size_and_format() {
    let dir = tempdir().unwrap();

    let empty = dir.path().join("empty.png");
    let err = CanvasBuilder::new().path(&empty).build().unwrap_err();
    assert!(matches!(err, IoError::InvalidCanvas(_)));
    assert!(!empty.exists());

    let unknown = dir.path().join("picture.xyz");
    let err = CanvasBuilder::new().path(&unknown).size(4, 4).build().unwrap_err();
    assert!(matches!(err, IoError::InvalidCanvas(_)));

    let (canvas, _) = CanvasBuilder::new()
        .path(&unknown)
        .format(Format::Bmp)
        .size(4, 4)
        .build()
        .unwrap();
    assert_eq!(canvas.format(), Format::Bmp);
    assert_eq!(Format::detect(&unknown).unwrap(), Format::Bmp);
}

#[test]
fn open_converts_to_requested_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.png");
    write(&path, &pattern(6, 6), Format::Png);

    let (canvas, _) = CanvasBuilder::new().path(&path).layout(Layout::Gray8).build().unwrap();
    assert_eq!(canvas.buffer().layout(), Layout::Gray8);

    let (canvas, _) = CanvasBuilder::new().path(&path).build().unwrap();
    assert_eq!(canvas.buffer().layout(), Layout::Rgba32);
    assert_eq!(canvas.buffer().at(5, 5), Color::Rgba([100, 100, 77, 255]));
}

#[test]
fn open_keeps_detected_format() {
    let dir = tempdir().unwrap();
    // TIFF bytes behind a misleading extension
    let path = dir.path().join("mislabelled.png");
    write(&path, &pattern(3, 3), Format::Tiff);

    let (canvas, _) = CanvasBuilder::new().path(&path).format(Format::Jpeg).build().unwrap();
    assert_eq!(canvas.format(), Format::Tiff);
}

#[test]
fn operators_then_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edit.png");
    write(&path, &pattern(5, 4), Format::Png);

    let (mut canvas, _) = CanvasBuilder::new().path(&path).build().unwrap();
    canvas.flip(Direction::Horizontal).unwrap();
    canvas.translate(0, 0).unwrap();
    canvas.save().unwrap();

    let (back, _) = StandardCodec::default().read(&path).unwrap();
    assert_eq!(back.at(0, 0), Color::Rgba([80, 0, 77, 255]));
    assert_eq!(back.at(4, 3), Color::Rgba([0, 60, 77, 255]));
}

#[test]
fn failed_crop_leaves_canvas_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crop.png");
    write(&path, &pattern(4, 4), Format::Png);

    let (mut canvas, _) = CanvasBuilder::new().path(&path).build().unwrap();
    let before = canvas.buffer().packed();
    let err = canvas.crop(Rect::new(10, 10, 20, 20)).unwrap_err();
    assert!(matches!(err, IoError::Ops(OpsError::EmptyIntersect(_))));
    assert_eq!(canvas.buffer().packed(), before);

    canvas.crop(Rect::new(1, 1, 3, 3)).unwrap();
    assert_eq!(canvas.buffer().rect(), Rect::from_size(2, 2));
    assert_eq!(canvas.buffer().at(0, 0), Color::Rgba([20, 20, 77, 255]));
}

#[test]
fn debug_canvas_saves_beside_original() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dbg.bmp");
    write(&path, &pattern(4, 4), Format::Bmp);

    let (mut canvas, notes) = CanvasBuilder::new().path(&path).debug(true).build().unwrap();
    assert!(notes.expected().iter().any(|n| n == "debug is true"));
    let debug_path = dir.path().join("dbg.bmp-debug");
    assert_eq!(canvas.path(), Some(debug_path.as_path()));

    canvas.flip(Direction::Vertical).unwrap();
    canvas.save().unwrap();
    assert!(debug_path.exists());

    let (original, _) = StandardCodec::default().read(&path).unwrap();
    assert_eq!(original.at(0, 0), Color::Rgba([0, 0, 77, 255]));
    let (edited, format) = StandardCodec::default().read(&debug_path).unwrap();
    assert_eq!(format, Format::Bmp);
    assert_eq!(edited.at(0, 0), Color::Rgba([0, 60, 77, 255]));
}

#[test]
fn lossless_formats_keep_pixels() {
    let dir = tempdir().unwrap();
    let src = pattern(9, 7);
    for format in [Format::Png, Format::Bmp, Format::Tiff] {
        let path = dir.path().join(format!("out.{}", format.extension()));
        write(&path, &src, format);
        let (back, detected) = StandardCodec::default().read(&path).unwrap();
        assert_eq!(detected, format);
        assert_eq!(back.clone_to(Layout::Rgba32).packed(), src.packed(), "{format}");
    }
}
