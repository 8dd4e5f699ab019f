use crate::carrier::CarrierSynth;
use crate::clock::PlaybackClock;
use crate::config::EncoderConfig;
use crate::error::{Result, TapeError};
use crate::format::{parse_format, DataLength, SegmentDirective};
use crate::framing::{ByteFramer, Tone};
use crate::source::ByteSource;
use crate::wav;
use std::io::{Seek, Write};

/// Tape encoder - plays a segment layout into PCM samples
///
/// The format string is tokenized once at construction. Each call to
/// `encode` starts a fresh playback clock at zero and walks the directives
/// in order:
/// - blank: mid-level samples, no tone
/// - header: mark tone for at least the given duration
/// - data: bytes pulled from the source, framed as asynchronous serial
pub struct TapeEncoder {
    config: EncoderConfig,
    segments: Vec<SegmentDirective>,
    synth: CarrierSynth,
    framer: ByteFramer,
}

impl TapeEncoder {
    /// Validate `config` and tokenize its format string.
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let segments = parse_format(&config.format);
        Ok(Self::with_segments(config, segments))
    }

    /// Build an encoder for an already tokenized layout.
    ///
    /// The config is not validated here; use `new` for untrusted input.
    pub fn with_segments(config: EncoderConfig, segments: Vec<SegmentDirective>) -> Self {
        let synth = CarrierSynth::new(&config);
        let framer = ByteFramer::new(config.low_carrier, config.stop_bits);
        Self {
            config,
            segments,
            synth,
            framer,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn segments(&self) -> &[SegmentDirective] {
        &self.segments
    }

    /// Encode every segment into `sink` as raw sample data
    ///
    /// Returns the number of sample bytes written. A data segment that runs
    /// out of input ends early; later segments still play. Fails with
    /// `TapeError::DataTooLarge` as soon as the output would outgrow what a
    /// WAV container can describe.
    pub fn encode<S: ByteSource, W: Write>(&mut self, mut source: S, sink: &mut W) -> Result<u64> {
        let mut clock = PlaybackClock::new();
        let mut total = 0u64;

        for index in 0..self.segments.len() {
            let segment = self.segments[index];
            let written = match segment {
                SegmentDirective::Blank(secs) => {
                    self.check_room(total, secs)?;
                    self.blank(secs, &mut clock, sink)?
                }
                SegmentDirective::Header(secs) => {
                    self.check_room(total, secs)?;
                    let mark = Tone::Mark.frequency(self.config.low_carrier);
                    self.synth.sustain(mark, secs, &mut clock, sink)? as u64
                }
                SegmentDirective::Data(length) => {
                    self.data(length, total, &mut source, &mut clock, sink)?
                }
            };
            log::debug!(
                "Segment {} ({}): {} bytes, clock at {:.6}s",
                index,
                segment,
                written,
                clock.seconds()
            );
            total += written;
        }

        log::info!(
            "Encoded {} segments, {} bytes of sample data ({:.3}s)",
            self.segments.len(),
            total,
            clock.seconds()
        );
        Ok(total)
    }

    /// Encode into a complete WAV container
    ///
    /// Writes a placeholder header, the sample data, then seeks back to
    /// patch the header. Returns the sample data size.
    pub fn encode_wav<S: ByteSource, W: Write + Seek>(&mut self, source: S, sink: &mut W) -> Result<u64> {
        wav::write_placeholder_header(sink)?;
        let total = self.encode(source, sink)?;
        wav::finalize(sink, total, &self.config)?;
        Ok(total)
    }

    /// Fail before writing a timed segment that cannot fit the container.
    fn check_room(&self, total: u64, secs: f64) -> Result<()> {
        let frames = (secs * self.config.sample_rate as f64).ceil().max(0.0);
        let projected = total as f64 + frames * self.config.block_align() as f64;
        if projected > wav::MAX_DATA_LEN as f64 {
            return Err(TapeError::DataTooLarge(projected as u64));
        }
        Ok(())
    }

    fn blank<W: Write>(&mut self, secs: f64, clock: &mut PlaybackClock, sink: &mut W) -> Result<u64> {
        let frames = (secs * self.config.sample_rate as f64).ceil().max(0.0) as usize;
        let written = self.synth.sample_writer().write_silence(frames, sink)?;
        clock.advance_blank(secs, self.config.sample_rate);
        Ok(written as u64)
    }

    fn data<S: ByteSource, W: Write>(
        &mut self,
        length: DataLength,
        total: u64,
        source: &mut S,
        clock: &mut PlaybackClock,
        sink: &mut W,
    ) -> Result<u64> {
        let limit = match length {
            DataLength::Bytes(n) => n,
            DataLength::Unbounded => usize::MAX,
        };

        let mut written = 0u64;
        let mut count = 0usize;
        while count < limit {
            let Some(byte) = source.next_byte()? else {
                log::debug!("Input exhausted after {} bytes", count);
                break;
            };
            written += self.framer.encode_byte(&mut self.synth, byte, clock, sink)? as u64;
            count += 1;
            if total + written > wav::MAX_DATA_LEN {
                return Err(TapeError::DataTooLarge(total + written));
            }
        }
        Ok(written)
    }
}
