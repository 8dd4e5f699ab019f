use crate::error::IntelHexError;
use crate::ihex::{HexResult, RecordReader, RecordType};
use std::io::Read;

/// Start-of-block marker of the tape block stream
pub const BLOCK_MARKER: u8 = 0x3A;

/// Payload bytes carried by one tape block
pub const MAX_BLOCK_LEN: usize = 255;

/// Contiguous memory image decoded from Intel HEX records
///
/// The first data record fixes the origin; later records are placed
/// relative to it and gaps between records read back as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryImage {
    origin: u16,
    data: Vec<u8>,
}

impl MemoryImage {
    pub fn new(origin: u16, data: Vec<u8>) -> Self {
        Self { origin, data }
    }

    /// Decode an Intel HEX stream up to and including its end-of-file record.
    ///
    /// Address records are validated but do not relocate data, the image
    /// lives in a 16-bit address space.
    pub fn read_intel_hex<R: Read>(reader: R) -> HexResult<Self> {
        let mut records = RecordReader::new(reader);
        let mut image = MemoryImage::default();

        loop {
            let record = records.next_record()?;
            match record.record_type {
                RecordType::Data => image.place(record.address, &record.data)?,
                RecordType::EndOfFile => break,
                other => log::debug!("Ignoring {:?} record", other),
            }
        }

        log::debug!("Decoded image at {:04x}, {} bytes", image.origin, image.len());
        Ok(image)
    }

    /// Copy a data record into the image, growing it as needed.
    fn place(&mut self, address: u16, bytes: &[u8]) -> HexResult<()> {
        if self.data.is_empty() {
            self.origin = address;
        }

        let offset = address
            .checked_sub(self.origin)
            .ok_or(IntelHexError::AddressBelowOrigin {
                address,
                origin: self.origin,
            })? as usize;

        let end = offset + bytes.len();
        if self.origin as usize + end > 0x1_0000 {
            return Err(IntelHexError::AddressOverflow {
                address,
                len: bytes.len() as u8,
            });
        }

        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Load address of the first byte
    pub fn origin(&self) -> u16 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Serialize the image as tape blocks
    ///
    /// Layout:
    /// - address block: `3A, origin_hi, origin_lo, checksum`
    /// - data blocks of up to 255 bytes: `3A, len, bytes.., checksum`
    ///   (an empty image still produces one empty block)
    /// - terminator: `3A, 00, 00`
    ///
    /// Each checksum makes the block's bytes after the marker sum to zero.
    pub fn tape_blocks(&self) -> Vec<u8> {
        let [hi, lo] = self.origin.to_be_bytes();
        let blocks = self.data.len().div_ceil(MAX_BLOCK_LEN).max(1);
        let mut out = Vec::with_capacity(4 + self.data.len() + blocks * 3 + 3);

        out.extend_from_slice(&[BLOCK_MARKER, hi, lo, checksum(&[hi, lo])]);

        if self.data.is_empty() {
            out.extend_from_slice(&[BLOCK_MARKER, 0x00, 0x00]);
        }
        for chunk in self.data.chunks(MAX_BLOCK_LEN) {
            let len = chunk.len() as u8;
            out.push(BLOCK_MARKER);
            out.push(len);
            out.extend_from_slice(chunk);
            out.push(checksum(chunk).wrapping_sub(len));
        }

        out.extend_from_slice(&[BLOCK_MARKER, 0x00, 0x00]);
        out
    }
}

/// Two's complement of the byte sum
fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_HEX: &str = ":0500100048656C6C6FF7\r\n:00000001FF\r\n";

    #[test]
    fn test_read_single_record() {
        let image = MemoryImage::read_intel_hex(HELLO_HEX.as_bytes()).unwrap();
        assert_eq!(image.origin(), 0x0010);
        assert_eq!(image.bytes(), b"Hello");
    }

    #[test]
    fn test_gaps_are_zero_filled() {
        let hex = ":020000000102FB\n:01000400AA51\n:00000001FF\n";
        let image = MemoryImage::read_intel_hex(hex.as_bytes()).unwrap();
        assert_eq!(image.origin(), 0);
        assert_eq!(image.bytes(), &[0x01, 0x02, 0x00, 0x00, 0xAA]);
    }

    #[test]
    fn test_overlapping_record_overwrites() {
        let hex = ":03000000010203F7\n:01000100AA54\n:00000001FF\n";
        let image = MemoryImage::read_intel_hex(hex.as_bytes()).unwrap();
        assert_eq!(image.bytes(), &[0x01, 0xAA, 0x03]);
    }

    #[test]
    fn test_address_below_origin() {
        let hex = ":01001000AA45\n:01000F00BB35\n:00000001FF\n";
        let err = MemoryImage::read_intel_hex(hex.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IntelHexError::AddressBelowOrigin { address: 0x000F, origin: 0x0010 }
        ));
    }

    #[test]
    fn test_address_overflow() {
        let hex = ":02FFFF00AABB9B\n:00000001FF\n";
        let err = MemoryImage::read_intel_hex(hex.as_bytes()).unwrap_err();
        assert!(matches!(err, IntelHexError::AddressOverflow { address: 0xFFFF, len: 2 }));
    }

    #[test]
    fn test_missing_eof_record() {
        let hex = ":0500100048656C6C6FF7\r\n";
        assert!(matches!(
            MemoryImage::read_intel_hex(hex.as_bytes()),
            Err(IntelHexError::Parsing)
        ));
    }

    #[test]
    fn test_checksum_error_aborts() {
        let hex = ":0500100048656C6C6FF8\r\n:00000001FF\r\n";
        assert!(matches!(
            MemoryImage::read_intel_hex(hex.as_bytes()),
            Err(IntelHexError::InvalidChecksum)
        ));
    }

    #[test]
    fn test_address_records_ignored() {
        let hex = ":020000040000FA\n:01002000558A\n:04000005000000CD2A\n:00000001FF\n";
        let image = MemoryImage::read_intel_hex(hex.as_bytes()).unwrap();
        assert_eq!(image.origin(), 0x0020);
        assert_eq!(image.bytes(), &[0x55]);
    }

    #[test]
    fn test_tape_blocks_small_image() {
        let image = MemoryImage::new(0xC000, b"Hi".to_vec());
        let blocks = image.tape_blocks();
        assert_eq!(
            blocks,
            vec![
                0x3A, 0xC0, 0x00, 0x40, // address block
                0x3A, 0x02, b'H', b'i', 0x100u16.wrapping_sub(2 + 0x48 + 0x69) as u8,
                0x3A, 0x00, 0x00, // terminator
            ]
        );
    }

    #[test]
    fn test_tape_blocks_empty_image() {
        let image = MemoryImage::new(0x1234, Vec::new());
        assert_eq!(
            image.tape_blocks(),
            vec![0x3A, 0x12, 0x34, 0xBA, 0x3A, 0x00, 0x00, 0x3A, 0x00, 0x00]
        );
    }

    #[test]
    fn test_tape_blocks_split_at_255() {
        let image = MemoryImage::new(0, vec![1u8; 300]);
        let blocks = image.tape_blocks();

        assert_eq!(blocks.len(), 4 + (3 + 255) + (3 + 45) + 3);
        assert_eq!(blocks[4], BLOCK_MARKER);
        assert_eq!(blocks[5], 255);
        // len + 255 ones + checksum == 0 mod 256
        let first_sum = blocks[5..4 + 3 + 255]
            .iter()
            .fold(0u8, |a, &b| a.wrapping_add(b));
        assert_eq!(first_sum, 0);

        let second = 4 + 3 + 255;
        assert_eq!(blocks[second], BLOCK_MARKER);
        assert_eq!(blocks[second + 1], 45);
        assert_eq!(&blocks[blocks.len() - 3..], &[0x3A, 0x00, 0x00]);
    }
}
