// testgif.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! GIF stream builder for tests.
//!
//! Image data is written with literal LZW codes only, so every test owns
//! its exact expected indices.
use crate::block::DisposalMethod;

/// Maximum sub-block length
const SUB_BLOCK_MAX: usize = 255;

/// Frame to write
pub struct Frame {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    indices: Vec<u8>,
    interlaced: bool,
    local_table: Option<Vec<u8>>,
    delay: Option<u16>,
    disposal: Option<DisposalMethod>,
    transparent: Option<u8>,
}

/// Stream builder
pub struct TestGif {
    width: u16,
    height: u16,
    global_table: Option<Vec<u8>>,
    blocks: Vec<u8>,
}

/// Get the size exponent bits for a color table
fn table_bits(table: &[u8]) -> u8 {
    let entries = (table.len() / 3).max(2);
    assert!(entries.is_power_of_two() && entries <= 256);
    entries.trailing_zeros() as u8 - 1
}

/// Write a chain of sub-blocks, including the terminator
fn write_sub_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(SUB_BLOCK_MAX) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
}

/// Bit packer for LZW codes (LSB first)
#[derive(Default)]
struct BitPacker {
    bytes: Vec<u8>,
    acc: u32,
    n_bits: u8,
}

impl BitPacker {
    fn push(&mut self, code: u16, bits: u8) {
        self.acc |= u32::from(code) << self.n_bits;
        self.n_bits += bits;
        while self.n_bits >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.n_bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.n_bits > 0 {
            self.bytes.push(self.acc as u8);
        }
        self.bytes
    }
}

/// Compress indices with literal codes, clearing the dictionary before
/// the code width would grow
fn lzw_literal(min_code_size: u8, indices: &[u8]) -> Vec<u8> {
    let clear = 1 << min_code_size;
    let bits = min_code_size + 1;
    let run = (1 << min_code_size) - 2;
    let mut packer = BitPacker::default();
    for chunk in indices.chunks(run) {
        packer.push(clear, bits);
        for idx in chunk {
            packer.push(u16::from(*idx), bits);
        }
    }
    if indices.is_empty() {
        packer.push(clear, bits);
    }
    packer.push(clear + 1, bits);
    packer.finish()
}

impl Frame {
    pub fn new(width: u16, height: u16, indices: &[u8]) -> Self {
        Frame {
            left: 0,
            top: 0,
            width,
            height,
            indices: indices.to_vec(),
            interlaced: false,
            local_table: None,
            delay: None,
            disposal: None,
            transparent: None,
        }
    }

    pub fn position(mut self, left: u16, top: u16) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Mark as interlaced (indices are in stream order)
    pub fn interlaced(mut self) -> Self {
        self.interlaced = true;
        self
    }

    pub fn local_table(mut self, table: &[u8]) -> Self {
        self.local_table = Some(table.to_vec());
        self
    }

    pub fn delay(mut self, delay: u16) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn disposal(mut self, disposal: DisposalMethod) -> Self {
        self.disposal = Some(disposal);
        self
    }

    pub fn transparent(mut self, idx: u8) -> Self {
        self.transparent = Some(idx);
        self
    }

    fn has_control(&self) -> bool {
        self.delay.is_some()
            || self.disposal.is_some()
            || self.transparent.is_some()
    }

    fn write(&self, out: &mut Vec<u8>) {
        if self.has_control() {
            let disposal = u8::from(self.disposal.unwrap_or_default());
            let flags = (disposal << 2) | u8::from(self.transparent.is_some());
            let [d0, d1] = self.delay.unwrap_or_default().to_le_bytes();
            let trans = self.transparent.unwrap_or_default();
            out.extend_from_slice(&[0x21, 0xF9, 4, flags, d0, d1, trans, 0]);
        }
        out.push(0x2C);
        out.extend_from_slice(&self.left.to_le_bytes());
        out.extend_from_slice(&self.top.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        let mut flags = 0;
        if self.interlaced {
            flags |= 0x40;
        }
        if let Some(table) = &self.local_table {
            flags |= 0x80 | table_bits(table);
        }
        out.push(flags);
        if let Some(table) = &self.local_table {
            out.extend_from_slice(table);
        }
        let max = self.indices.iter().copied().max().unwrap_or_default();
        let min_code_size = (8 - max.leading_zeros() as u8).max(2);
        out.push(min_code_size);
        write_sub_blocks(out, &lzw_literal(min_code_size, &self.indices));
    }
}

impl TestGif {
    pub fn new(width: u16, height: u16) -> Self {
        TestGif {
            width,
            height,
            global_table: None,
            blocks: Vec::new(),
        }
    }

    pub fn global_table(mut self, table: &[u8]) -> Self {
        self.global_table = Some(table.to_vec());
        self
    }

    pub fn frame(mut self, frame: Frame) -> Self {
        frame.write(&mut self.blocks);
        self
    }

    /// Add an extension with raw sub-blocks
    pub fn extension(mut self, label: u8, sub_blocks: &[&[u8]]) -> Self {
        self.blocks.extend_from_slice(&[0x21, label]);
        for data in sub_blocks {
            self.blocks.push(data.len() as u8);
            self.blocks.extend_from_slice(data);
        }
        self.blocks.push(0);
        self
    }

    /// Add an application extension
    pub fn application(self, app_id: &[u8; 11], sub_blocks: &[&[u8]]) -> Self {
        let mut blocks = vec![&app_id[..]];
        blocks.extend_from_slice(sub_blocks);
        self.extension(0xFF, &blocks)
    }

    /// Build header, logical screen descriptor and global color table
    pub fn build_preamble(&self) -> Vec<u8> {
        let mut out = b"GIF89a".to_vec();
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        match &self.global_table {
            Some(table) => {
                out.extend_from_slice(&[0x80 | table_bits(table), 0, 0]);
                out.extend_from_slice(table);
            }
            None => out.extend_from_slice(&[0, 0, 0]),
        }
        out
    }

    /// Append blocks and trailer
    pub fn append_blocks(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.blocks);
        out.push(0x3B);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.build_preamble();
        self.append_blocks(&mut out);
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_codes() {
        // clear, 0, 1, end with 3-bit codes
        assert_eq!(lzw_literal(2, &[0, 1]), [0x44, 0x0A]);
    }
}
