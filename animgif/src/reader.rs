// reader.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
use crate::error::Result;
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

/// Scratch buffer size (large enough for a color table with 256 entries)
const BUF_SZ: usize = 768;

/// Byte reader for GIF blocks and sub-blocks
pub struct BlockReader<R: Read> {
    /// Wrapped reader
    reader: R,
    /// Scratch buffer for records and sub-blocks
    buffer: Vec<u8>,
    /// Bytes pushed back with `unread`, consumed before `reader`
    pending: VecDeque<u8>,
}

impl<R: Read> Read for BlockReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            return self.reader.read(buf);
        }
        let n = buf.len().min(self.pending.len());
        for (dst, src) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl<R: Read> BlockReader<R> {
    /// Create a new block reader
    pub fn new(reader: R) -> Self {
        BlockReader {
            reader,
            buffer: Vec::with_capacity(BUF_SZ),
            pending: VecDeque::new(),
        }
    }

    /// Read into a buffer until it is full or the stream ends
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break, // EOF
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Fill the scratch buffer with up to `len` bytes
    fn fill_buffer(&mut self, len: usize) -> Result<()> {
        let mut buf = std::mem::take(&mut self.buffer);
        buf.clear();
        buf.resize(len, 0);
        let res = self.read_full(&mut buf);
        buf.truncate(res.as_ref().map_or(0, |n| *n));
        self.buffer = buf;
        res.map(|_| ())
    }

    /// Read one byte, or `None` at end of stream
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut b = [0];
        loop {
            match self.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(b[0])),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a fixed-size record, or `None` if the stream ends first
    pub fn read_record(&mut self, len: usize) -> Result<Option<&[u8]>> {
        self.fill_buffer(len)?;
        if self.buffer.len() == len {
            Ok(Some(&self.buffer[..]))
        } else {
            Ok(None)
        }
    }

    /// Read up to `len` bytes (fewer at end of stream)
    pub fn read_up_to(&mut self, len: usize) -> Result<&[u8]> {
        self.fill_buffer(len)?;
        Ok(&self.buffer[..])
    }

    /// Skip over `len` bytes, returning the number skipped
    pub fn skip(&mut self, len: usize) -> Result<u64> {
        let len = len as u64;
        Ok(io::copy(&mut self.by_ref().take(len), &mut io::sink())?)
    }

    /// Read the next sub-block of a chain.
    ///
    /// Returns `None` at the terminator (or end of stream).
    pub fn next_sub_block(&mut self) -> Result<Option<&[u8]>> {
        match self.read_byte()? {
            Some(len) if len > 0 => Ok(Some(self.read_up_to(len.into())?)),
            _ => Ok(None),
        }
    }

    /// Skip remaining sub-blocks of a chain, including the terminator
    pub fn skip_sub_blocks(&mut self) -> Result<()> {
        while let Some(len) = self.read_byte()? {
            if len == 0 {
                break;
            }
            if self.skip(len.into())? < u64::from(len) {
                break;
            }
        }
        Ok(())
    }

    /// Push bytes back so they are read again
    pub fn unread(&mut self, bytes: &[u8]) {
        for b in bytes.iter().rev() {
            self.pending.push_front(*b);
        }
    }
}
