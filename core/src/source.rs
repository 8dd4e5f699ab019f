use crate::error::Result;
use crate::image::MemoryImage;
use std::io::{BufReader, Bytes, Read};

/// Supplier of payload bytes for data directives
///
/// `Ok(None)` signals the end of the data; it ends the current data block
/// early and is not an error.
pub trait ByteSource {
    fn next_byte(&mut self) -> Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        (**self).next_byte()
    }
}

/// Reads a raw binary stream sequentially
pub struct RawSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
}

impl<R: Read> RawSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
        }
    }
}

impl<R: Read> ByteSource for RawSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.bytes.next().transpose()?)
    }
}

/// How a decoded memory image is presented to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMode {
    /// The image bytes as decoded
    Raw,
    /// Address block, 255-byte data blocks and terminator
    TapeBlocks,
}

/// Iterates a decoded memory image
pub struct ImageSource {
    bytes: std::vec::IntoIter<u8>,
}

impl ImageSource {
    pub fn new(image: &MemoryImage, mode: ImageMode) -> Self {
        let bytes = match mode {
            ImageMode::Raw => image.bytes().to_vec(),
            ImageMode::TapeBlocks => image.tape_blocks(),
        };
        Self {
            bytes: bytes.into_iter(),
        }
    }

    /// Bytes left to deliver
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for ImageSource {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.bytes.next())
    }
}
