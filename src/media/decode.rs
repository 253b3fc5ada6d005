//! Decode the extracted audio into raw interleaved f32 samples

use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use crate::types::AudioTrack;

/// Decode an audio file to interleaved f32 PCM, preserving channel count.
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<AudioTrack> {
    let path = path.as_ref();

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;
    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate not specified in audio file")?;
    let channels = track
        .codec_params
        .channels
        .context("Channel layout not specified in audio file")?
        .count() as u16;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err).context("Failed to read packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .context("Failed to decode audio packet")?;
        extend_interleaved_f32(&decoded, &mut samples);
    }

    Ok(AudioTrack {
        samples,
        channels,
        sample_rate,
    })
}

/// Append a decoded buffer as interleaved f32 in [-1.0, 1.0].
fn extend_interleaved_f32(buffer: &AudioBufferRef, out: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::U8(buf) => push_converted(buf.as_ref(), out, |s| s as f32 / 128.0 - 1.0),
        AudioBufferRef::U16(buf) => {
            push_converted(buf.as_ref(), out, |s| s as f32 / 32768.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            push_converted(buf.as_ref(), out, |s| s.inner() as f32 / 8_388_608.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            push_converted(buf.as_ref(), out, |s| s as f32 / 2_147_483_648.0 - 1.0)
        }
        AudioBufferRef::S8(buf) => push_converted(buf.as_ref(), out, |s| s as f32 / 128.0),
        AudioBufferRef::S16(buf) => push_converted(buf.as_ref(), out, |s| s as f32 / 32768.0),
        AudioBufferRef::S24(buf) => {
            push_converted(buf.as_ref(), out, |s| s.inner() as f32 / 8_388_608.0)
        }
        AudioBufferRef::S32(buf) => {
            push_converted(buf.as_ref(), out, |s| s as f32 / 2_147_483_648.0)
        }
        AudioBufferRef::F32(buf) => push_converted(buf.as_ref(), out, |s| s),
        AudioBufferRef::F64(buf) => push_converted(buf.as_ref(), out, |s| s as f32),
    }
}

fn push_converted<S, F>(buf: &AudioBuffer<S>, out: &mut Vec<f32>, convert: F)
where
    S: Sample + Copy,
    F: Fn(S) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    out.reserve(frames * channels);
    for frame in 0..frames {
        for ch in 0..channels {
            out.push(convert(buf.chan(ch)[frame]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Write a small stereo WAV with hound and read it back through the
    /// symphonia path.
    #[test]
    fn decodes_wav_to_interleaved_f32() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        // 100 stereo frames: left ramps up, right stays at half scale
        for i in 0..100i32 {
            writer.write_sample((i * 100) as i16).unwrap();
            writer.write_sample(16384i16).unwrap();
        }
        writer.finalize().unwrap();

        let track = decode_audio(&path).unwrap();
        assert_eq!(track.channels, 2);
        assert_eq!(track.sample_rate, 44100);
        assert_eq!(track.frame_len(), 100);
        // Interleave order preserved: [left, right] per frame
        assert_relative_eq!(track.samples[1], 0.5, epsilon = 1e-3);
        assert_relative_eq!(track.samples[198], 9900.0 / 32768.0, epsilon = 1e-3);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_audio("/nonexistent/audio.wav").is_err());
    }
}
