use crate::carrier::CarrierSynth;
use crate::clock::PlaybackClock;
use crate::error::Result;
use std::io::Write;

/// Serial line state carried by one bit burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Logic 0 and the start bit: the low carrier
    Space,
    /// Logic 1 and stop bits: twice the low carrier
    Mark,
}

impl Tone {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Tone::Mark
        } else {
            Tone::Space
        }
    }

    /// Tone frequency in Hz for a given low carrier
    pub fn frequency(self, low_carrier: u32) -> f64 {
        match self {
            Tone::Space => low_carrier as f64,
            Tone::Mark => low_carrier as f64 * 2.0,
        }
    }
}

/// Tone sequence of one asynchronous serial byte
///
/// One start bit, eight data bits LSB first, then `stop_bits` stop bits.
/// No parity.
pub fn frame_tones(byte: u8, stop_bits: u32) -> impl Iterator<Item = Tone> {
    let data = (0..8).map(move |i| Tone::from_bit(byte & (1 << i) != 0));
    std::iter::once(Tone::Space)
        .chain(data)
        .chain((0..stop_bits).map(|_| Tone::Mark))
}

/// Byte framer - drives the carrier synthesizer one bit burst per tone
pub struct ByteFramer {
    low_carrier: u32,
    stop_bits: u32,
}

impl ByteFramer {
    pub fn new(low_carrier: u32, stop_bits: u32) -> Self {
        Self {
            low_carrier,
            stop_bits,
        }
    }

    /// Encode one byte, returning the number of sample bytes written.
    pub fn encode_byte<W: Write>(
        &self,
        synth: &mut CarrierSynth,
        byte: u8,
        clock: &mut PlaybackClock,
        sink: &mut W,
    ) -> Result<usize> {
        let mut written = 0;
        for tone in frame_tones(byte, self.stop_bits) {
            written += synth.bit(tone.frequency(self.low_carrier), clock, sink)?;
        }
        Ok(written)
    }
}
