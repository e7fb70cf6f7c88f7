// extension.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Extension blocks
use crate::block::{ExtensionCode, GraphicControl};
use crate::decode::Session;
use crate::error::{Error, Record, Result};
use std::io::Read;

/// Length of an application identifier + authentication code
const APP_ID_LEN: usize = 11;

/// Application identifier of XMP packets
const XMP_ID: &[u8; APP_ID_LEN] = b"XMP DataXMP";

/// Length of the "magic trailer" following an XMP packet
const XMP_TRAILER_LEN: usize = 256;

/// Length of a looping sub-block (sub-id + repeat count)
const LOOP_LEN: u8 = 3;

impl<R: Read> Session<R> {
    /// Read an extension block, after the introducer
    pub(crate) fn read_extension(&mut self) -> Result<()> {
        let Some(label) = self.reader.read_byte()? else {
            return Ok(());
        };
        match ExtensionCode::from(label) {
            ExtensionCode::GraphicControl_ => self.read_graphic_control(),
            ExtensionCode::Comment_ => self.read_comment(),
            ExtensionCode::Application_ => self.read_application(),
            ExtensionCode::PlainText_ => {
                debug!("skipping plain text extension");
                self.reader.skip_sub_blocks()
            }
            ExtensionCode::Unknown_(n) => {
                warn!("skipping unknown extension: {n:#04X}");
                self.reader.skip_sub_blocks()
            }
        }
    }

    /// Read a graphic control extension
    fn read_graphic_control(&mut self) -> Result<()> {
        match self.reader.read_record(GraphicControl::SIZE)? {
            Some(buf) => {
                let control = GraphicControl::from_buf(buf);
                debug!("graphic control: {control:?}");
                self.graphic_control = Some(control);
                Ok(())
            }
            None => Err(Error::ShortRead(Record::GraphicControl)),
        }
    }

    /// Read a comment extension
    fn read_comment(&mut self) -> Result<()> {
        let skip = self.options.skip_metadata;
        let mut comment = String::new();
        while let Some(len) = self.reader.read_byte()? {
            // one-byte length limits sub-blocks to 255 bytes
            let len = usize::from(len);
            if len == 0 {
                break;
            }
            if skip {
                self.reader.skip(len)?;
                continue;
            }
            let buf = self.reader.read_up_to(len)?;
            comment.push_str(&String::from_utf8_lossy(buf));
            if buf.len() < len {
                break;
            }
        }
        if !comment.is_empty() {
            self.metadata.comments.push(comment);
        }
        Ok(())
    }

    /// Read an application extension
    fn read_application(&mut self) -> Result<()> {
        let Some(len) = self.reader.read_byte()? else {
            return Ok(());
        };
        if usize::from(len) != APP_ID_LEN {
            debug!("skipping application extension: length {len}");
            self.reader.skip(len.into())?;
            return self.reader.skip_sub_blocks();
        }
        let mut app_id = [0; APP_ID_LEN];
        match self.reader.read_record(APP_ID_LEN)? {
            Some(buf) => app_id.copy_from_slice(buf),
            None => return Err(Error::ShortRead(Record::Application)),
        }
        debug!("application: {}", String::from_utf8_lossy(&app_id));
        if &app_id == XMP_ID && !self.options.skip_metadata {
            if !self.read_xmp()? {
                self.reader.skip_sub_blocks()?;
            }
            return Ok(());
        }
        match self.reader.read_byte()? {
            Some(LOOP_LEN) => {
                let buf = match self.reader.read_record(LOOP_LEN.into())? {
                    Some(buf) => buf,
                    None => return Err(Error::ShortRead(Record::Application)),
                };
                self.metadata.repeat_count = u16::from_le_bytes([buf[1], buf[2]]);
                // block terminator
                self.reader.skip(1)?;
                Ok(())
            }
            Some(0) | None => Ok(()),
            Some(len) => {
                self.reader.skip(len.into())?;
                self.reader.skip_sub_blocks()
            }
        }
    }

    /// Read an XMP packet.
    ///
    /// The packet is stored raw, with its "sub-block" length bytes being
    /// part of the text, up to a 256-byte trailer and block terminator.
    /// Returns `false` if the packet is empty, after pushing back all bytes
    /// read so they can be skipped as sub-blocks.
    fn read_xmp(&mut self) -> Result<bool> {
        let mut packet = Vec::new();
        let mut terminated = false;
        while let Some(b) = self.reader.read_byte()? {
            if b == 0 {
                terminated = true;
                break;
            }
            packet.push(b);
        }
        let len = packet.len().saturating_sub(XMP_TRAILER_LEN);
        if len > 0 {
            packet.truncate(len);
            // block terminator
            self.reader.skip(1)?;
            debug!("XMP packet: {len} bytes");
            self.metadata.xmp = Some(packet);
            Ok(true)
        } else {
            warn!("empty XMP packet");
            if terminated {
                packet.push(0);
            }
            self.reader.unread(&packet);
            Ok(false)
        }
    }
}
