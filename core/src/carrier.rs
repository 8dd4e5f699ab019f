use crate::clock::PlaybackClock;
use crate::config::EncoderConfig;
use crate::error::Result;
use crate::pcm::SampleWriter;
use std::f64::consts::PI;
use std::io::Write;

/// Carrier synthesizer - generates phase-locked tone bursts
///
/// Every burst starts its sine at the most recent low-carrier cycle boundary,
/// not at the current clock. Both the space tone and the mark tone (twice the
/// low frequency) share this grid, so a tone switch never breaks the
/// waveform's phase and the bit clock never drifts from the carrier.
///
/// Samples are generated at `t, t + 1/fs, ...` where `t` is the clock on
/// entry, and the burst ends at the first sample time at or past
/// `origin + duration`. The clock is left just past the last sample written.
pub struct CarrierSynth {
    writer: SampleWriter,
    low_carrier: u32,
    sample_period: f64,
    bit_period: f64,
    buffer: Vec<u8>,
}

impl CarrierSynth {
    pub fn new(config: &EncoderConfig) -> Self {
        let writer = SampleWriter::new(config);
        // One bit plus slack for the grid snap
        let frames = (config.sample_rate / config.baud_rate.max(1)) as usize + 2;
        Self {
            writer,
            low_carrier: config.low_carrier,
            sample_period: config.sample_period(),
            bit_period: config.bit_period(),
            buffer: Vec::with_capacity(frames * writer.frame_bytes()),
        }
    }

    pub fn sample_writer(&self) -> &SampleWriter {
        &self.writer
    }

    /// Duration of one serial bit in seconds
    pub fn bit_period(&self) -> f64 {
        self.bit_period
    }

    /// Emit one cycle-aligned burst of `frequency`
    ///
    /// Runs until at least `min_duration` seconds have passed since the
    /// low-carrier boundary at or before the current clock. Returns the
    /// number of bytes written to `sink`.
    pub fn burst<W: Write>(
        &mut self,
        frequency: f64,
        min_duration: f64,
        clock: &mut PlaybackClock,
        sink: &mut W,
    ) -> Result<usize> {
        let origin = clock.carrier_origin(self.low_carrier);
        let end = origin + min_duration;

        self.buffer.clear();
        while clock.seconds() < end {
            let amplitude = (2.0 * PI * frequency * (clock.seconds() - origin)).sin();
            self.writer.push_frame(amplitude, &mut self.buffer);
            clock.tick(self.sample_period);
        }

        sink.write_all(&self.buffer)?;
        Ok(self.buffer.len())
    }

    /// Emit a one-bit burst of `frequency`.
    pub fn bit<W: Write>(
        &mut self,
        frequency: f64,
        clock: &mut PlaybackClock,
        sink: &mut W,
    ) -> Result<usize> {
        self.burst(frequency, self.bit_period, clock, sink)
    }

    /// Hold a tone for at least `min_duration` seconds
    ///
    /// The tone is built from whole bit bursts, each one re-snapped to the
    /// carrier grid, until the clock passes the boundary the sustain started
    /// from plus `min_duration`.
    pub fn sustain<W: Write>(
        &mut self,
        frequency: f64,
        min_duration: f64,
        clock: &mut PlaybackClock,
        sink: &mut W,
    ) -> Result<usize> {
        let end = clock.carrier_origin(self.low_carrier) + min_duration;
        let mut written = 0;
        while clock.seconds() < end {
            written += self.bit(frequency, clock, sink)?;
        }
        Ok(written)
    }
}
