//! Built-in WAV transcoder
//!
//! Handles PCM/float WAV sources without external tools. Audio is converted
//! to 32-bit float, mixed to the target channel count, resampled and then
//! quantized to the raw target format.
//! Sample rate conversion uses linear interpolation, which aliases on
//! downsampling; use [`super::SoxTranscoder`] when quality matters.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};

use crate::error::{AudimageError, Result};
use crate::transcode::{RawFormat, Transcoder};

/// Pure-Rust transcoder for WAV sources
#[derive(Debug, Clone, Default)]
pub struct WavTranscoder {
    format: RawFormat,
}

impl WavTranscoder {
    pub fn new(format: RawFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> RawFormat {
        self.format
    }
}

impl Transcoder for WavTranscoder {
    fn name(&self) -> &str {
        "builtin"
    }

    fn transcode(&self, input: &Path) -> Result<Vec<u8>> {
        self.format.validate()?;

        let reader = WavReader::open(input).map_err(|e| AudimageError::InvalidAudio {
            path: input.to_path_buf(),
            reason: format!("Failed to open WAV file: {}", e),
            source: Some(e),
        })?;

        let spec = reader.spec();
        let channels = usize::from(spec.channels);
        if channels == 0 {
            return Err(AudimageError::InvalidAudio {
                path: input.to_path_buf(),
                reason: "WAV header declares zero channels".to_string(),
                source: None,
            });
        }
        debug!(
            "{}: {} Hz, {} bit, {} channels",
            input.display(),
            spec.sample_rate,
            spec.bits_per_sample,
            spec.channels
        );

        let samples = decode_samples(reader).map_err(|e| AudimageError::InvalidAudio {
            path: input.to_path_buf(),
            reason: format!("Failed to read samples: {}", e),
            source: Some(e),
        })?;

        let target_channels = usize::from(self.format.channels);
        let mixed = mix_frames(&samples, channels, target_channels)?;
        let resampled = if spec.sample_rate != self.format.sample_rate {
            resample_frames(
                &mixed,
                target_channels,
                spec.sample_rate,
                self.format.sample_rate,
            )
        } else {
            mixed
        };

        Ok(quantize(&resampled, self.format.bits_per_sample))
    }

    fn untranscode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        self.format.validate()?;

        let frame_size = self.format.frame_size();
        let usable = raw.len() / frame_size * frame_size;
        if usable != raw.len() {
            warn!(
                "Dropping {} trailing bytes that do not form a whole frame",
                raw.len() - usable
            );
        }

        let spec = WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: self.format.bits_per_sample,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(usable + 44));
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_write_error)?;
            match self.format.bits_per_sample {
                8 => {
                    for &byte in &raw[..usable] {
                        // hound stores 8-bit samples as unsigned on disk
                        let sample = (i16::from(byte) - 128) as i8;
                        writer.write_sample(sample).map_err(wav_write_error)?;
                    }
                }
                _ => {
                    for pair in raw[..usable].chunks_exact(2) {
                        let sample = i16::from_le_bytes([pair[0], pair[1]]);
                        writer.write_sample(sample).map_err(wav_write_error)?;
                    }
                }
            }
            writer.finalize().map_err(wav_write_error)?;
        }

        Ok(cursor.into_inner())
    }
}

fn wav_write_error(e: hound::Error) -> AudimageError {
    AudimageError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

/// All samples of a WAV file, interleaved, scaled to [-1.0, 1.0]
fn decode_samples<R: std::io::Read>(
    mut reader: WavReader<R>,
) -> std::result::Result<Vec<f32>, hound::Error> {
    let spec = reader.spec();
    if spec.sample_format == SampleFormat::Float {
        return reader.samples::<f32>().collect();
    }
    // hound widens every integer depth (8-bit included) to signed i32
    let full_scale = 2f32.powi(i32::from(spec.bits_per_sample) - 1);
    reader
        .samples::<i32>()
        .map(|s| s.map(|v| v as f32 / full_scale))
        .collect()
}

/// Convert interleaved frames from `from` channels to `to` channels
///
/// Many-to-mono averages, mono-to-many duplicates. A trailing partial frame
/// is dropped.
fn mix_frames(samples: &[f32], from: usize, to: usize) -> Result<Vec<f32>> {
    if from == to {
        return Ok(samples.to_vec());
    }
    if to != 1 && from != 1 {
        return Err(AudimageError::UnsupportedFormat {
            format: format!("mixing {} channels into {}", from, to),
        });
    }

    let frames = samples.chunks_exact(from);
    let mut out = Vec::with_capacity(frames.len() * to);
    for frame in frames {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend(std::iter::repeat(frame[0]).take(to));
        }
    }
    Ok(out)
}

/// Change the rate of interleaved frames by linear interpolation
///
/// Output length is `ceil(frames * to / from)`; past the last input frame the
/// last frame is held.
fn resample_frames(samples: &[f32], channels: usize, from: u32, to: u32) -> Vec<f32> {
    let frame_count = samples.len() / channels;
    if frame_count == 0 {
        return Vec::new();
    }

    let step = f64::from(from) / f64::from(to);
    let out_frames = (frame_count as f64 * f64::from(to) / f64::from(from)).ceil() as usize;
    let last = frame_count - 1;
    let mut out = Vec::with_capacity(out_frames * channels);

    for n in 0..out_frames {
        let pos = n as f64 * step;
        let lower = (pos.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let t = (pos - lower as f64).clamp(0.0, 1.0) as f32;

        let a = &samples[lower * channels..(lower + 1) * channels];
        let b = &samples[upper * channels..(upper + 1) * channels];
        out.extend(a.iter().zip(b).map(|(x, y)| x + (y - x) * t));
    }
    out
}

/// Convert float samples to 8-bit unsigned or 16-bit signed little-endian
fn quantize(samples: &[f32], bits_per_sample: u16) -> Vec<u8> {
    match bits_per_sample {
        8 => samples
            .iter()
            .map(|s| ((s.clamp(-1.0, 1.0) * 127.0).round() + 128.0) as u8)
            .collect(),
        _ => samples
            .iter()
            .flat_map(|s| (((s * 32767.0).round()).clamp(-32768.0, 32767.0) as i16).to_le_bytes())
            .collect(),
    }
}
