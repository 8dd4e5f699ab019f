//! Cassette tape audio encoder for vintage microcomputers
//!
//! Turns a byte stream into a two-tone FSK waveform framed as asynchronous
//! serial data (1 start bit, 8 data bits LSB first, N stop bits) and wraps
//! it in a PCM WAV container for playback into a tape input.

pub mod error;
pub mod config;
pub mod clock;
pub mod pcm;
pub mod carrier;
pub mod framing;
pub mod format;
pub mod ihex;
pub mod image;
pub mod source;
pub mod wav;
pub mod encoder;

pub use config::{EncoderConfig, Quantization};
pub use encoder::TapeEncoder;
pub use error::{IntelHexError, Result, TapeError};
pub use format::{parse_format, DataLength, FormatPreset, SegmentDirective};
pub use image::MemoryImage;
pub use source::{ByteSource, ImageMode, ImageSource, RawSource};

// PC-6001 cassette interface defaults
pub const DEFAULT_SAMPLE_RATE: u32 = 11025;
pub const DEFAULT_BAUD_RATE: u32 = 600;
pub const DEFAULT_LOW_CARRIER: u32 = 1200; // Hz, space tone; mark is 2400 Hz
pub const DEFAULT_STOP_BITS: u32 = 3;
