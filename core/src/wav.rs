use crate::config::EncoderConfig;
use crate::error::{Result, TapeError};
use std::io::{Seek, SeekFrom, Write};

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes counted by the RIFF size field beyond the sample data
const RIFF_OVERHEAD: u32 = 36;

/// Largest sample data size the 32-bit RIFF size field can describe
pub const MAX_DATA_LEN: u64 = (u32::MAX - RIFF_OVERHEAD) as u64;

/// Canonical 44-byte PCM WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    pub fn new(config: &EncoderConfig, data_len: u32) -> Self {
        Self {
            channels: config.channels,
            sample_rate: config.sample_rate,
            bits_per_sample: config.quantization.bits(),
            data_len,
        }
    }

    /// Bytes per sample frame
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Bytes per second
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut header = [0u8; WAV_HEADER_LEN];
        let fields: [&[u8]; 13] = [
            b"RIFF",
            &self.data_len.saturating_add(RIFF_OVERHEAD).to_le_bytes(),
            b"WAVE",
            b"fmt ",
            &16u32.to_le_bytes(), // fmt chunk size
            &1u16.to_le_bytes(),  // PCM
            &self.channels.to_le_bytes(),
            &self.sample_rate.to_le_bytes(),
            &self.byte_rate().to_le_bytes(),
            &self.block_align().to_le_bytes(),
            &self.bits_per_sample.to_le_bytes(),
            b"data",
            &self.data_len.to_le_bytes(),
        ];

        let mut pos = 0;
        for field in fields {
            header[pos..pos + field.len()].copy_from_slice(field);
            pos += field.len();
        }
        header
    }
}

/// Reserve header space ahead of the sample data.
pub fn write_placeholder_header<W: Write>(sink: &mut W) -> Result<()> {
    sink.write_all(&[0u8; WAV_HEADER_LEN])?;
    Ok(())
}

/// Rewrite the header at offset 0 once the data size is known
///
/// The sink is left positioned at its end. Fails with
/// `TapeError::Unseekable` when the sink cannot seek, in which case the
/// placeholder header stays zeroed.
pub fn finalize<W: Write + Seek>(sink: &mut W, data_len: u64, config: &EncoderConfig) -> Result<()> {
    if data_len > MAX_DATA_LEN {
        return Err(TapeError::DataTooLarge(data_len));
    }
    let data_len = data_len as u32;

    let header = WavHeader::new(config, data_len);
    sink.seek(SeekFrom::Start(0)).map_err(TapeError::Unseekable)?;
    sink.write_all(&header.to_bytes())?;
    sink.seek(SeekFrom::End(0)).map_err(TapeError::Unseekable)?;
    sink.flush()?;
    Ok(())
}
