use crate::error::{Result, TapeError};
use crate::format::FormatPreset;

/// Sample width of the generated PCM data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantization {
    /// Unsigned 8-bit samples centred on 128
    Bits8,
    /// Signed 16-bit little-endian samples centred on 0
    Bits16,
}

impl Quantization {
    pub fn bits(self) -> u16 {
        match self {
            Quantization::Bits8 => 8,
            Quantization::Bits16 => 16,
        }
    }

    /// Bytes used by one sample of one channel
    pub fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }
}

impl TryFrom<u16> for Quantization {
    type Error = TapeError;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(Quantization::Bits8),
            16 => Ok(Quantization::Bits16),
            other => Err(TapeError::InvalidQuantization(other)),
        }
    }
}

/// Parameters of one tape encoding run
///
/// Built once from the command line and never mutated while encoding.
/// Defaults match the PC-6001 cassette interface:
/// - 11025 Hz, 8-bit, mono output
/// - 600 baud with a 1200 Hz space tone and 2400 Hz mark tone
/// - 3 stop bits
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    /// Output sampling rate in Hz
    pub sample_rate: u32,
    /// Output sample width
    pub quantization: Quantization,
    /// Output channel count (1 or 2, channels carry identical content)
    pub channels: u16,
    /// Serial bit rate
    pub baud_rate: u32,
    /// Space tone frequency in Hz; the mark tone is twice this
    pub low_carrier: u32,
    /// Mark-tone bits appended after each data byte
    pub stop_bits: u32,
    /// Segment mini-language describing the tape layout
    pub format: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
            quantization: Quantization::Bits8,
            channels: 1,
            baud_rate: crate::DEFAULT_BAUD_RATE,
            low_carrier: crate::DEFAULT_LOW_CARRIER,
            stop_bits: crate::DEFAULT_STOP_BITS,
            format: FormatPreset::Default.format_string().to_string(),
        }
    }
}

impl EncoderConfig {
    /// Check every parameter, in the order the command line reports them.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(TapeError::InvalidBaudRate(self.baud_rate));
        }
        if self.channels != 1 && self.channels != 2 {
            return Err(TapeError::InvalidChannelCount(self.channels));
        }
        if self.sample_rate == 0 {
            return Err(TapeError::InvalidSampleRate(self.sample_rate));
        }
        if self.low_carrier == 0 {
            return Err(TapeError::InvalidCarrier(self.low_carrier));
        }
        if self.low_carrier % self.baud_rate != 0 {
            return Err(TapeError::CarrierNotMultipleOfBaud {
                carrier: self.low_carrier,
                baud: self.baud_rate,
            });
        }

        let minimum = u64::from(self.low_carrier) * 8;
        if u64::from(self.sample_rate) < minimum {
            return Err(TapeError::SampleRateTooLow {
                sample_rate: self.sample_rate,
                minimum: u32::try_from(minimum).unwrap_or(u32::MAX),
            });
        }

        Ok(())
    }

    /// Mark (logic 1) tone frequency in Hz
    pub fn high_carrier(&self) -> u32 {
        self.low_carrier * 2
    }

    /// Bytes per sample frame across all channels
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.quantization.bytes()
    }

    /// Duration of one serial bit in seconds
    pub fn bit_period(&self) -> f64 {
        1.0 / self.baud_rate as f64
    }

    /// Duration of one sample step in seconds
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EncoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.high_carrier(), 2400);
        assert_eq!(config.block_align(), 1);
    }

    #[test]
    fn test_quantization_from_bits() {
        assert_eq!(Quantization::try_from(8).unwrap(), Quantization::Bits8);
        assert_eq!(Quantization::try_from(16).unwrap(), Quantization::Bits16);
        assert!(matches!(
            Quantization::try_from(24),
            Err(TapeError::InvalidQuantization(24))
        ));
    }

    #[test]
    fn test_rejects_zero_baud() {
        let config = EncoderConfig {
            baud_rate: 0,
            ..EncoderConfig::default()
        };
        assert!(matches!(config.validate(), Err(TapeError::InvalidBaudRate(0))));
    }

    #[test]
    fn test_rejects_channel_count() {
        for channels in [0, 3, 6] {
            let config = EncoderConfig {
                channels,
                ..EncoderConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(TapeError::InvalidChannelCount(c)) if c == channels
            ));
        }
    }

    #[test]
    fn test_rejects_carrier_not_multiple_of_baud() {
        let config = EncoderConfig {
            low_carrier: 1000,
            ..EncoderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TapeError::CarrierNotMultipleOfBaud { carrier: 1000, baud: 600 })
        ));
    }

    #[test]
    fn test_rejects_low_sample_rate() {
        let config = EncoderConfig {
            sample_rate: 9599,
            ..EncoderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TapeError::SampleRateTooLow { sample_rate: 9599, minimum: 9600 })
        ));

        let boundary = EncoderConfig {
            sample_rate: 9600,
            ..EncoderConfig::default()
        };
        assert!(boundary.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_carrier_and_rate() {
        let no_carrier = EncoderConfig {
            low_carrier: 0,
            ..EncoderConfig::default()
        };
        assert!(matches!(no_carrier.validate(), Err(TapeError::InvalidCarrier(0))));

        let no_rate = EncoderConfig {
            sample_rate: 0,
            ..EncoderConfig::default()
        };
        assert!(matches!(no_rate.validate(), Err(TapeError::InvalidSampleRate(0))));
    }

    #[test]
    fn test_block_align_16bit_stereo() {
        let config = EncoderConfig {
            quantization: Quantization::Bits16,
            channels: 2,
            ..EncoderConfig::default()
        };
        assert_eq!(config.block_align(), 4);
    }
}
