//! Decoding of base64 WAV payloads into in-memory samples.
//!
//! Request items may carry their audio as a base64-encoded WAV blob (the format the
//! surrounding annotation pipeline ships audio in). We decode it once up front so model
//! collaborators receive plain mono `f32` samples and never touch the wire encoding.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::types::AudioPayload;

/// Decoded audio: interleaved-flattened-to-mono `f32` samples in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode a base64 WAV payload into mono samples.
///
/// Multi-channel input is downmixed by averaging channels. Both integer and float WAV
/// sample formats are accepted.
pub fn decode_payload(payload: &AudioPayload) -> crate::Result<AudioData> {
    let bytes = BASE64.decode(payload.base64.as_bytes())?;
    decode_wav(&bytes)
}

fn decode_wav(bytes: &[u8]) -> crate::Result<AudioData> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(crate::Error::from)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(crate::Error::from)?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(AudioData {
        samples,
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(channels: u16, sample_rate: u32, frames: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
            for s in frames {
                writer.write_sample(*s).expect("write sample");
            }
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    fn payload_from(bytes: &[u8]) -> AudioPayload {
        AudioPayload {
            id: 1,
            base64: BASE64.encode(bytes),
            channels: 1,
            frequency: 16_000,
            bits_per_sample: 16,
        }
    }

    #[test]
    fn decodes_mono_pcm16() -> anyhow::Result<()> {
        let bytes = wav_bytes(1, 16_000, &[0, 16_384, -16_384]);
        let audio = decode_payload(&payload_from(&bytes))?;
        assert_eq!(audio.sample_rate, 16_000);
        assert_eq!(audio.samples.len(), 3);
        assert!((audio.samples[1] - 0.5).abs() < 1e-3);
        assert!((audio.samples[2] + 0.5).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn downmixes_stereo_by_averaging() -> anyhow::Result<()> {
        // Two frames: (L=16384, R=0) and (L=0, R=-16384).
        let bytes = wav_bytes(2, 8_000, &[16_384, 0, 0, -16_384]);
        let audio = decode_payload(&payload_from(&bytes))?;
        assert_eq!(audio.samples.len(), 2);
        assert!((audio.samples[0] - 0.25).abs() < 1e-3);
        assert!((audio.samples[1] + 0.25).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn duration_reflects_rate_and_length() -> anyhow::Result<()> {
        let bytes = wav_bytes(1, 8_000, &[0; 8_000]);
        let audio = decode_payload(&payload_from(&bytes))?;
        assert!((audio.duration_secs() - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn invalid_base64_is_an_audio_decode_error() {
        let payload = AudioPayload {
            id: 1,
            base64: "not base64!!".into(),
            channels: 1,
            frequency: 16_000,
            bits_per_sample: 16,
        };
        let err = decode_payload(&payload).unwrap_err();
        assert!(matches!(err, crate::Error::AudioDecode(_)));
    }

    #[test]
    fn garbage_bytes_are_an_audio_decode_error() {
        let payload = payload_from(b"definitely not a wav");
        let err = decode_payload(&payload).unwrap_err();
        assert!(matches!(err, crate::Error::AudioDecode(_)));
    }
}
