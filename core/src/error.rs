use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapeError {
    #[error("Illegal baud rate: {0}")]
    InvalidBaudRate(u32),

    #[error("The number of channels must be 1 or 2, got {0}")]
    InvalidChannelCount(u16),

    #[error("Sampling bit must be 8 or 16, got {0}")]
    InvalidQuantization(u16),

    #[error("Illegal sampling rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Illegal carrier frequency: {0} Hz")]
    InvalidCarrier(u32),

    #[error("Carrier frequency {carrier} Hz is not a multiple of the baud rate {baud}")]
    CarrierNotMultipleOfBaud { carrier: u32, baud: u32 },

    #[error("Sampling rate {sample_rate} Hz is too low, need at least {minimum} Hz")]
    SampleRateTooLow { sample_rate: u32, minimum: u32 },

    #[error("Sample data of {0} bytes does not fit in a WAV container")]
    DataTooLarge(u64),

    #[error("Cannot seek output to finalize WAV header: {0}")]
    Unseekable(#[source] io::Error),

    #[error("Intel HEX input rejected: {0}")]
    IntelHex(#[from] IntelHexError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure reasons of the Intel HEX reader.
///
/// Each validating state of the record state machine raises exactly one of
/// these, so the variant alone identifies where a record went wrong.
#[derive(Debug, Error)]
pub enum IntelHexError {
    #[error("Expected ':' or line break before record")]
    Parsing,

    #[error("Non-hexadecimal character in record")]
    NonHexCharacter,

    #[error("Unknown record type 0x{0:02X}")]
    UnknownRecordType(u8),

    #[error("Record checksum mismatch")]
    InvalidChecksum,

    #[error("Extended segment address record has nonzero address")]
    EsaAddressNotZero,

    #[error("Extended segment address record byte count is not 2")]
    EsaByteCountNotTwo,

    #[error("Extended segment address record data is not a paragraph address")]
    EsaDataFormatInvalid,

    #[error("Start segment address record has nonzero address")]
    SsaAddressNotZero,

    #[error("Start segment address record byte count is not 4")]
    SsaByteCountNotFour,

    #[error("Extended linear address record has nonzero address")]
    ElaAddressNotZero,

    #[error("Extended linear address record byte count is not 2")]
    ElaByteCountNotTwo,

    #[error("Start linear address record has nonzero address")]
    SlaAddressNotZero,

    #[error("Start linear address record byte count is not 4")]
    SlaByteCountNotFour,

    #[error("Data record at 0x{address:04X} lies below image origin 0x{origin:04X}")]
    AddressBelowOrigin { address: u16, origin: u16 },

    #[error("Data record at 0x{address:04X} with {len} bytes runs past the 64 KiB address space")]
    AddressOverflow { address: u16, len: u8 },

    #[error("I/O error while reading records: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TapeError>;
