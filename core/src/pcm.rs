use crate::config::{EncoderConfig, Quantization};
use std::io::{self, Write};

/// Frames of silence assembled per write when blanking
const SILENCE_CHUNK_FRAMES: usize = 4096;

/// Quantize an amplitude in [-1, 1] to an unsigned 8-bit sample.
///
/// The waveform is inverted: +1.0 maps to 1, -1.0 maps to 255.
pub fn quantize_u8(amplitude: f64) -> u8 {
    (128.0 - 127.0 * amplitude).round() as u8
}

/// Quantize an amplitude in [-1, 1] to a signed 16-bit sample (inverted).
pub fn quantize_i16(amplitude: f64) -> i16 {
    (-32767.0 * amplitude).round() as i16
}

/// Converts synthesized amplitudes into interleaved PCM frames
///
/// Every channel of a frame carries the same sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleWriter {
    quantization: Quantization,
    channels: u16,
}

impl SampleWriter {
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            quantization: config.quantization,
            channels: config.channels,
        }
    }

    /// Bytes produced per frame
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * self.quantization.bytes()
    }

    /// Append one frame to `buffer`.
    pub fn push_frame(&self, amplitude: f64, buffer: &mut Vec<u8>) {
        match self.quantization {
            Quantization::Bits8 => {
                let sample = quantize_u8(amplitude);
                for _ in 0..self.channels {
                    buffer.push(sample);
                }
            }
            Quantization::Bits16 => {
                let sample = quantize_i16(amplitude).to_le_bytes();
                for _ in 0..self.channels {
                    buffer.extend_from_slice(&sample);
                }
            }
        }
    }

    /// Write one frame straight to the sink, returning the bytes written.
    pub fn write_sample<W: Write>(&self, amplitude: f64, sink: &mut W) -> io::Result<usize> {
        let mut frame = Vec::with_capacity(self.frame_bytes());
        self.push_frame(amplitude, &mut frame);
        sink.write_all(&frame)?;
        Ok(frame.len())
    }

    /// Write `frames` frames of the DC mid level (no tone).
    pub fn write_silence<W: Write>(&self, frames: usize, sink: &mut W) -> io::Result<usize> {
        let mut chunk = Vec::with_capacity(SILENCE_CHUNK_FRAMES.min(frames) * self.frame_bytes());
        for _ in 0..SILENCE_CHUNK_FRAMES.min(frames) {
            self.push_frame(0.0, &mut chunk);
        }

        let mut remaining = frames;
        while remaining > 0 {
            let count = remaining.min(SILENCE_CHUNK_FRAMES);
            sink.write_all(&chunk[..count * self.frame_bytes()])?;
            remaining -= count;
        }

        Ok(frames * self.frame_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(quantization: Quantization, channels: u16) -> SampleWriter {
        let config = EncoderConfig {
            quantization,
            channels,
            ..EncoderConfig::default()
        };
        SampleWriter::new(&config)
    }

    #[test]
    fn test_quantize_u8_extremes() {
        assert_eq!(quantize_u8(0.0), 128);
        assert_eq!(quantize_u8(1.0), 1);
        assert_eq!(quantize_u8(-1.0), 255);
        assert_eq!(quantize_u8(0.5), 65); // 128 - 63.5 rounds away from zero
    }

    #[test]
    fn test_quantize_i16_extremes() {
        assert_eq!(quantize_i16(0.0), 0);
        assert_eq!(quantize_i16(1.0), -32767);
        assert_eq!(quantize_i16(-1.0), 32767);
    }

    #[test]
    fn test_8bit_stereo_duplicates_channels() {
        let w = writer(Quantization::Bits8, 2);
        let mut sink = Vec::new();
        let written = w.write_sample(1.0, &mut sink).unwrap();
        assert_eq!(written, 2);
        assert_eq!(sink, vec![1, 1]);
    }

    #[test]
    fn test_16bit_little_endian() {
        let w = writer(Quantization::Bits16, 2);
        let mut sink = Vec::new();
        w.write_sample(-1.0, &mut sink).unwrap();
        assert_eq!(sink, vec![0xFF, 0x7F, 0xFF, 0x7F]);

        sink.clear();
        w.write_sample(1.0, &mut sink).unwrap();
        assert_eq!(sink, vec![0x01, 0x80, 0x01, 0x80]);
    }

    #[test]
    fn test_silence_levels() {
        let mut sink = Vec::new();
        let written = writer(Quantization::Bits8, 1)
            .write_silence(10_000, &mut sink)
            .unwrap();
        assert_eq!(written, 10_000);
        assert!(sink.iter().all(|&b| b == 128));

        let mut sink = Vec::new();
        let written = writer(Quantization::Bits16, 2)
            .write_silence(5, &mut sink)
            .unwrap();
        assert_eq!(written, 20);
        assert!(sink.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_silence_zero_frames() {
        let mut sink = Vec::new();
        let written = writer(Quantization::Bits8, 1).write_silence(0, &mut sink).unwrap();
        assert_eq!(written, 0);
        assert!(sink.is_empty());
    }
}
