// lzw.rs
//
// Copyright (c) 2020-2025  Douglas Lau
//
//! Lempel-Ziv-Welch decompression of GIF image data
use crate::error::{Error, Result};
use crate::reader::BlockReader;
use std::cmp::Ordering;
use std::io::Read;
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Dictionary node
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Next (prefix) node code
    next: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Code dictionary
#[derive(Debug)]
struct Dictionary {
    /// Table of codes
    table: Vec<Node>,
    /// Minimum code bits
    min_code_bits: u8,
}

impl Dictionary {
    /// Create a new code dictionary
    fn new(min_code_bits: u8) -> Self {
        let mut dict = Dictionary {
            table: Vec::with_capacity(Bits::MAX.entries().into()),
            min_code_bits,
        };
        dict.reset();
        dict
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Check whether every code is assigned
    fn is_full(&self) -> bool {
        self.next_code() >= Bits::MAX.entries()
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.push_node(None, byte as u8);
        }
        self.push_node(None, 0); // clear code
        self.push_node(None, 0); // end code
    }

    /// Push a node into the dictionary
    fn push_node(&mut self, next: Option<Code>, byte: u8) {
        if !self.is_full() {
            self.table.push(Node { next, byte });
        }
    }

    /// Lookup the first byte of a code
    fn lookup(&self, code: Code) -> u8 {
        let mut node = self.table[code as usize];
        while let Some(code) = node.next {
            node = self.table[code as usize];
        }
        node.byte
    }

    /// Decompress a code into a buffer (reversed)
    fn decompress_reversed(&self, code: Code, buffer: &mut Vec<u8>) {
        let mut node = self.table[code as usize];
        while let Some(code) = node.next {
            buffer.push(node.byte);
            node = self.table[code as usize];
        }
        buffer.push(node.byte);
    }
}

/// LZW Data Decompressor
#[derive(Debug)]
pub struct Decompressor {
    /// Code dictionary
    dict: Dictionary,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Last code
    last: Option<Code>,
    /// Current code
    code: u32,
    /// Number of bits in current code
    n_bits: u8,
    /// End code was reached
    done: bool,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Self {
        Decompressor {
            min_code_bits,
            dict: Dictionary::new(min_code_bits),
            code_bits: Bits::from(min_code_bits + 1),
            last: None,
            code: 0,
            n_bits: 0,
            done: false,
        }
    }

    /// Check whether the end code was reached
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Get the most recent code
    fn code(&mut self) -> Option<Code> {
        let b = u8::from(self.code_bits);
        if self.n_bits >= b {
            let code = (self.code & self.code_bits.mask()) as Code;
            self.code >>= b;
            self.n_bits -= b;
            Some(code)
        } else {
            None
        }
    }

    /// Unpack one code from a buffer
    fn unpack(&mut self, buffer: &[u8]) -> (usize, Option<Code>) {
        let mut n_consumed = 0;
        for byte in buffer {
            if self.n_bits >= self.code_bits.into() {
                break;
            }
            self.code |= (*byte as u32) << self.n_bits;
            self.n_bits += 8;
            n_consumed += 1;
        }
        (n_consumed, self.code())
    }

    /// Decompress a byte buffer
    pub fn decompress(
        &mut self,
        bytes: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        let mut bytes = bytes;
        while !bytes.is_empty() && !self.done {
            let (consumed, code) = self.unpack(bytes);
            if let Some(code) = code {
                self.decompress_code(code, buffer)?;
            }
            bytes = &bytes[consumed..];
        }
        Ok(())
    }

    /// Finish decompressing any codes left in the bit buffer
    pub fn decompress_finish(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        while !self.done {
            match self.code() {
                Some(code) => self.decompress_code(code, buffer)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Decompress one code
    fn decompress_code(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        if code == self.dict.clear_code() {
            self.dict.reset();
            self.code_bits = Bits::from(self.min_code_bits + 1);
            self.last = None;
        } else if code == self.dict.end_code() {
            self.done = true;
        } else {
            let start = buffer.len();
            self.decompress_reversed(code, buffer)?;
            buffer[start..].reverse();
            self.last = Some(code);
        }
        Ok(())
    }

    /// Decompress one code (reversed)
    fn decompress_reversed(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        let next_code = self.dict.next_code();
        match (self.last, code.cmp(&next_code)) {
            (_, Ordering::Greater) => return Err(Error::InvalidLzwData),
            (Some(last), Ordering::Less) => {
                self.dict.decompress_reversed(code, buffer);
                let byte = self.dict.lookup(code);
                self.dict.push_node(Some(last), byte);
            }
            (Some(last), Ordering::Equal) => {
                self.dict.push_node(Some(last), self.dict.lookup(last));
                self.dict.decompress_reversed(code, buffer);
            }
            (None, Ordering::Less) => self.dict.decompress_reversed(code, buffer),
            (None, Ordering::Equal) => return Err(Error::InvalidLzwData),
        }
        if next_code + 1 == self.code_bits.entries() {
            self.code_bits += 1;
        }
        Ok(())
    }
}

/// Decoder of per-pixel color table indices
pub trait IndexDecoder {
    /// Decode one frame of indices from an image data sub-block chain.
    ///
    /// `indices` is resized to `width * height`.
    fn decode<R: Read>(
        &mut self,
        reader: &mut BlockReader<R>,
        min_code_size: u8,
        width: usize,
        height: usize,
        indices: &mut Vec<u8>,
    ) -> Result<()>;

    /// Skip one frame of indices without storing them
    fn skip<R: Read>(
        &mut self,
        reader: &mut BlockReader<R>,
        min_code_size: u8,
        n_pixels: usize,
    ) -> Result<()>;
}

/// LZW index decoder
#[derive(Debug, Default)]
pub struct LzwIndices {
    /// Scratch buffer for skipped indices
    scratch: Vec<u8>,
}

impl IndexDecoder for LzwIndices {
    fn decode<R: Read>(
        &mut self,
        reader: &mut BlockReader<R>,
        min_code_size: u8,
        width: usize,
        height: usize,
        indices: &mut Vec<u8>,
    ) -> Result<()> {
        let n_pixels = width * height;
        indices.clear();
        indices.reserve(n_pixels);
        let mut dec = Decompressor::new(min_code_size);
        while let Some(data) = reader.next_sub_block()? {
            if indices.len() < n_pixels {
                dec.decompress(data, indices)?;
            }
        }
        if indices.len() < n_pixels {
            dec.decompress_finish(indices)?;
        }
        match indices.len().cmp(&n_pixels) {
            Ordering::Less => {
                warn!("Missing image data: {}", n_pixels - indices.len())
            }
            Ordering::Greater => {
                warn!("Extra image data: {}", indices.len() - n_pixels)
            }
            Ordering::Equal => {}
        }
        indices.resize(n_pixels, 0);
        Ok(())
    }

    fn skip<R: Read>(
        &mut self,
        reader: &mut BlockReader<R>,
        min_code_size: u8,
        n_pixels: usize,
    ) -> Result<()> {
        let mut dec = Decompressor::new(min_code_size);
        let mut skipped = 0;
        while let Some(data) = reader.next_sub_block()? {
            if skipped < n_pixels && !dec.is_done() {
                self.scratch.clear();
                dec.decompress(data, &mut self.scratch)?;
                skipped += self.scratch.len();
            }
        }
        debug!("skipped {skipped} of {n_pixels} pixels");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_codes() -> Result<()> {
        // clear, 0, 1, end (3-bit codes)
        let mut dec = Decompressor::new(2);
        let mut buf = vec![];
        dec.decompress(&[0x44, 0x0A], &mut buf)?;
        dec.decompress_finish(&mut buf)?;
        assert_eq!(buf, [0, 1]);
        assert!(dec.is_done());
        Ok(())
    }

    #[test]
    fn repeated_code() -> Result<()> {
        // clear, 1, 0, 0, 1, end (width grows to 4 bits)
        let mut dec = Decompressor::new(2);
        let mut buf = vec![];
        dec.decompress(&[0x0C, 0x10, 0x05], &mut buf)?;
        assert_eq!(buf, [1, 0, 0, 1]);
        Ok(())
    }

    #[test]
    fn invalid_code() {
        // clear, 7 (undefined)
        let mut dec = Decompressor::new(2);
        let mut buf = vec![];
        let res = dec.decompress(&[0x3C], &mut buf);
        assert!(matches!(res, Err(Error::InvalidLzwData)));
    }

    #[test]
    fn decode_pads_missing() -> Result<()> {
        let data = [2, 0x44, 0x0A, 0, 0x3B];
        let mut reader = BlockReader::new(&data[..]);
        let mut indices = vec![];
        LzwIndices::default().decode(&mut reader, 2, 2, 2, &mut indices)?;
        assert_eq!(indices, [0, 1, 0, 0]);
        assert_eq!(reader.read_byte()?, Some(0x3B));
        Ok(())
    }

    #[test]
    fn skip_drains_chain() -> Result<()> {
        let data = [2, 0x44, 0x0A, 1, 0xFF, 0, 0x3B];
        let mut reader = BlockReader::new(&data[..]);
        LzwIndices::default().skip(&mut reader, 2, 2)?;
        assert_eq!(reader.read_byte()?, Some(0x3B));
        Ok(())
    }
}
