//! Pipeline Tests
//!
//! Compile a directory of WAV files with the built-in transcoder, write the
//! image, and unpack it again.

use std::fs;
use std::path::Path;

use audimage::pipeline::{compile_directory, decompile_image, write_image_atomic, CompileOptions};
use audimage::source::file_md5;
use audimage::transcode::{RawFormat, Transcoder, WavTranscoder};
use audimage::{read_image, DescriptiveToc};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tempfile::tempdir;

/// Write a mono 16-bit sine at 22050 Hz
fn create_test_wav(path: &Path, frequency: f32, frames: usize) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let step = 2.0 * std::f32::consts::PI * frequency / 22050.0;
    for i in 0..frames {
        writer
            .write_sample(((i as f32 * step).sin() * 12000.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_compile_and_decompile_directory() {
    let dir = tempdir().unwrap();
    let sources = dir.path().join("sounds");
    fs::create_dir(&sources).unwrap();
    create_test_wav(&sources.join("horn.wav"), 440.0, 22050);
    create_test_wav(&sources.join("beep.wav"), 880.0, 4410);
    fs::write(sources.join("README.txt"), b"ignored").unwrap();

    let transcoder = WavTranscoder::default();
    let options = CompileOptions {
        comment: "test image".to_string(),
        ..CompileOptions::default()
    };
    let image = compile_directory(&sources, &transcoder, &options).unwrap();

    // Sorted by file name, 22050 Hz -> 11025 Hz halves the sample count
    assert_eq!(image.entries.len(), 2);
    assert_eq!(image.entries[0].name.as_str(), "beep");
    assert_eq!(image.entries[0].size, 2205);
    assert_eq!(image.entries[1].name.as_str(), "horn");
    assert_eq!(image.entries[1].size, 11025);
    assert_eq!(image.entries[1].offset, 8192 + 4096);

    let image_path = dir.path().join("sounds.img");
    write_image_atomic(&image_path, &image.bytes).unwrap();

    let out = dir.path().join("unpacked");
    let report =
        decompile_image(&image_path, &out, Some(&transcoder as &dyn Transcoder)).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.extracted.len(), 2);

    // Raw payloads come back exactly
    let bytes = fs::read(&image_path).unwrap();
    let decoded = read_image(&bytes).unwrap();
    for entry in &decoded.entries {
        let raw = fs::read(out.join(format!("{}.raw", entry.name))).unwrap();
        assert_eq!(raw, entry.payload);

        let wav = WavReader::open(out.join(format!("{}.wav", entry.name))).unwrap();
        assert_eq!(wav.spec().sample_rate, 11025);
        assert_eq!(wav.len() as usize, raw.len());
    }

    // toc.json carries the source fingerprints
    let toc_text = fs::read_to_string(out.join("toc.json")).unwrap();
    let toc: DescriptiveToc = serde_json::from_str(&toc_text).unwrap();
    assert_eq!(toc.comment, "test image");
    assert_eq!(toc.entries[0].name, "beep");
    assert_eq!(
        toc.entries[0].filesize,
        fs::metadata(sources.join("beep.wav")).unwrap().len()
    );
    assert_eq!(
        toc.entries[1].src_md5,
        file_md5(&sources.join("horn.wav")).unwrap()
    );
}

#[test]
fn test_compile_is_reproducible() {
    let dir = tempdir().unwrap();
    create_test_wav(&dir.path().join("a.wav"), 300.0, 1000);
    create_test_wav(&dir.path().join("b.wav"), 600.0, 3000);

    let transcoder = WavTranscoder::new(RawFormat::new(11025, 16, 1));
    let first = compile_directory(dir.path(), &transcoder, &CompileOptions::default()).unwrap();
    let second = compile_directory(dir.path(), &transcoder, &CompileOptions::default()).unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_compile_fails_on_bad_source() {
    let dir = tempdir().unwrap();
    create_test_wav(&dir.path().join("good.wav"), 440.0, 100);
    fs::write(dir.path().join("bad.wav"), b"RIFF....nope").unwrap();

    let err = compile_directory(dir.path(), &WavTranscoder::default(), &CompileOptions::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_AUDIO");
}

#[test]
fn test_compile_fails_on_long_name() {
    let dir = tempdir().unwrap();
    let long = format!("{}.wav", "n".repeat(57));
    create_test_wav(&dir.path().join(long), 440.0, 100);

    let err = compile_directory(dir.path(), &WavTranscoder::default(), &CompileOptions::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "NAME_TOO_LONG");
}

#[test]
fn test_decompile_raw_only() {
    let dir = tempdir().unwrap();
    create_test_wav(&dir.path().join("tick.wav"), 1000.0, 500);

    let transcoder = WavTranscoder::default();
    let image = compile_directory(dir.path(), &transcoder, &CompileOptions::default()).unwrap();
    let image_path = dir.path().join("tick.img");
    write_image_atomic(&image_path, &image.bytes).unwrap();

    let out = dir.path().join("out");
    let report = decompile_image(&image_path, &out, None).unwrap();
    assert!(report.is_complete());
    assert!(out.join("tick.raw").exists());
    assert!(!out.join("tick.wav").exists());
    assert!(out.join("toc.json").exists());

    // untranscode of the raw payload is still available on demand
    let raw = fs::read(out.join("tick.raw")).unwrap();
    let wav = transcoder.untranscode(&raw).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
}

#[test]
fn test_decompile_rejects_short_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.img");
    fs::write(&path, vec![0xFFu8; 100]).unwrap();

    let err = decompile_image(&path, &dir.path().join("out"), None).unwrap_err();
    assert_eq!(err.error_code(), "IMAGE_TOO_SHORT");
}
