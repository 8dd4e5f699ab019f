//! Intel HEX record reader
//!
//! Records are parsed by an explicit state machine. Every state that can
//! fail raises exactly one `IntelHexError` kind, which makes the error
//! variant a precise description of where a record was rejected.

use crate::error::IntelHexError;
use std::io::{BufReader, Bytes, Read};

pub type HexResult<T> = std::result::Result<T, IntelHexError>;

/// Record types defined by the Intel HEX format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
}

impl RecordType {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(RecordType::Data),
            0x01 => Some(RecordType::EndOfFile),
            0x02 => Some(RecordType::ExtendedSegmentAddress),
            0x03 => Some(RecordType::StartSegmentAddress),
            0x04 => Some(RecordType::ExtendedLinearAddress),
            0x05 => Some(RecordType::StartLinearAddress),
            _ => None,
        }
    }
}

/// One validated record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub byte_count: u8,
    pub address: u16,
    pub record_type: RecordType,
    pub data: Vec<u8>,
    pub checksum: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlurpState {
    ReadColonOrLineBreak,
    ReadByteCount,
    ReadAddress,
    ReadRecordType,
    DispatchRecordType,
    VerifyEsaAddressZero,
    VerifyEsaByteCountTwo,
    ReadEsaData,
    VerifyEsaDataFormat,
    VerifySsaAddressZero,
    VerifySsaByteCountFour,
    VerifyElaAddressZero,
    VerifyElaByteCountTwo,
    VerifySlaAddressZero,
    VerifySlaByteCountFour,
    ReadData,
    ReadChecksum,
    VerifyChecksum,
}

/// Fields gathered while a record is being slurped
#[derive(Default)]
struct PartialRecord {
    byte_count: u8,
    address: u16,
    record_type: u8,
    data: Vec<u8>,
    checksum: u8,
    sum: u8,
}

/// Reads Intel HEX records one at a time from an ASCII stream
pub struct RecordReader<R: Read> {
    bytes: Bytes<BufReader<R>>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
        }
    }

    fn next_char(&mut self) -> HexResult<Option<u8>> {
        Ok(self.bytes.next().transpose()?)
    }

    /// Two hex digits, added into the running checksum
    fn read_hex_byte(&mut self, sum: &mut u8) -> HexResult<u8> {
        let mut value = 0u8;
        for _ in 0..2 {
            let digit = self
                .next_char()?
                .and_then(|c| (c as char).to_digit(16))
                .ok_or(IntelHexError::NonHexCharacter)?;
            value = (value << 4) | digit as u8;
        }
        *sum = sum.wrapping_add(value);
        Ok(value)
    }

    fn read_hex_bytes(&mut self, count: u8, rec: &mut PartialRecord) -> HexResult<()> {
        rec.data.clear();
        for _ in 0..count {
            let byte = self.read_hex_byte(&mut rec.sum)?;
            rec.data.push(byte);
        }
        Ok(())
    }

    /// Read and validate the next record.
    ///
    /// Line breaks before the record's ':' are skipped. Hitting the end of
    /// the stream before a record starts is a `Parsing` error; the caller
    /// stops reading once it has seen the end-of-file record.
    pub fn next_record(&mut self) -> HexResult<Record> {
        let mut rec = PartialRecord::default();
        let mut state = SlurpState::ReadColonOrLineBreak;

        loop {
            state = match state {
                // Parsing
                SlurpState::ReadColonOrLineBreak => match self.next_char()? {
                    Some(b':') => SlurpState::ReadByteCount,
                    Some(b'\r') | Some(b'\n') => SlurpState::ReadColonOrLineBreak,
                    _ => return Err(IntelHexError::Parsing),
                },

                // NonHexCharacter
                SlurpState::ReadByteCount => {
                    rec.byte_count = self.read_hex_byte(&mut rec.sum)?;
                    SlurpState::ReadAddress
                }

                // NonHexCharacter
                SlurpState::ReadAddress => {
                    let high = self.read_hex_byte(&mut rec.sum)?;
                    let low = self.read_hex_byte(&mut rec.sum)?;
                    rec.address = u16::from_be_bytes([high, low]);
                    SlurpState::ReadRecordType
                }

                // NonHexCharacter
                SlurpState::ReadRecordType => {
                    rec.record_type = self.read_hex_byte(&mut rec.sum)?;
                    SlurpState::DispatchRecordType
                }

                // UnknownRecordType
                SlurpState::DispatchRecordType => match RecordType::from_byte(rec.record_type) {
                    Some(RecordType::Data) | Some(RecordType::EndOfFile) => SlurpState::ReadData,
                    Some(RecordType::ExtendedSegmentAddress) => SlurpState::VerifyEsaAddressZero,
                    Some(RecordType::StartSegmentAddress) => SlurpState::VerifySsaAddressZero,
                    Some(RecordType::ExtendedLinearAddress) => SlurpState::VerifyElaAddressZero,
                    Some(RecordType::StartLinearAddress) => SlurpState::VerifySlaAddressZero,
                    None => return Err(IntelHexError::UnknownRecordType(rec.record_type)),
                },

                // EsaAddressNotZero
                SlurpState::VerifyEsaAddressZero => {
                    if rec.address != 0 {
                        return Err(IntelHexError::EsaAddressNotZero);
                    }
                    SlurpState::VerifyEsaByteCountTwo
                }

                // EsaByteCountNotTwo
                SlurpState::VerifyEsaByteCountTwo => {
                    if rec.byte_count != 2 {
                        return Err(IntelHexError::EsaByteCountNotTwo);
                    }
                    SlurpState::ReadEsaData
                }

                // NonHexCharacter
                SlurpState::ReadEsaData => {
                    self.read_hex_bytes(2, &mut rec)?;
                    SlurpState::VerifyEsaDataFormat
                }

                // EsaDataFormatInvalid: segment base must be a paragraph address
                SlurpState::VerifyEsaDataFormat => {
                    if rec.data[1] & 0x0F != 0 {
                        return Err(IntelHexError::EsaDataFormatInvalid);
                    }
                    SlurpState::ReadChecksum
                }

                // SsaAddressNotZero
                SlurpState::VerifySsaAddressZero => {
                    if rec.address != 0 {
                        return Err(IntelHexError::SsaAddressNotZero);
                    }
                    SlurpState::VerifySsaByteCountFour
                }

                // SsaByteCountNotFour
                SlurpState::VerifySsaByteCountFour => {
                    if rec.byte_count != 4 {
                        return Err(IntelHexError::SsaByteCountNotFour);
                    }
                    SlurpState::ReadData
                }

                // ElaAddressNotZero
                SlurpState::VerifyElaAddressZero => {
                    if rec.address != 0 {
                        return Err(IntelHexError::ElaAddressNotZero);
                    }
                    SlurpState::VerifyElaByteCountTwo
                }

                // ElaByteCountNotTwo
                SlurpState::VerifyElaByteCountTwo => {
                    if rec.byte_count != 2 {
                        return Err(IntelHexError::ElaByteCountNotTwo);
                    }
                    SlurpState::ReadData
                }

                // SlaAddressNotZero
                SlurpState::VerifySlaAddressZero => {
                    if rec.address != 0 {
                        return Err(IntelHexError::SlaAddressNotZero);
                    }
                    SlurpState::VerifySlaByteCountFour
                }

                // SlaByteCountNotFour
                SlurpState::VerifySlaByteCountFour => {
                    if rec.byte_count != 4 {
                        return Err(IntelHexError::SlaByteCountNotFour);
                    }
                    SlurpState::ReadData
                }

                // NonHexCharacter
                SlurpState::ReadData => {
                    self.read_hex_bytes(rec.byte_count, &mut rec)?;
                    SlurpState::ReadChecksum
                }

                // NonHexCharacter
                SlurpState::ReadChecksum => {
                    rec.checksum = self.read_hex_byte(&mut rec.sum)?;
                    SlurpState::VerifyChecksum
                }

                // InvalidChecksum: all bytes including the checksum sum to zero
                SlurpState::VerifyChecksum => {
                    if rec.sum != 0 {
                        return Err(IntelHexError::InvalidChecksum);
                    }
                    break;
                }
            };
        }

        let record_type = RecordType::from_byte(rec.record_type)
            .ok_or(IntelHexError::UnknownRecordType(rec.record_type))?;

        Ok(Record {
            byte_count: rec.byte_count,
            address: rec.address,
            record_type,
            data: rec.data,
            checksum: rec.checksum,
        })
    }
}
