// block.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Fixed-size records of a GIF stream
use crate::canvas::Rect;

/// Number of channels in a color table entry
pub(crate) const CHANNELS: usize = 3;

/// Color table existence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    /// No color table follows the descriptor
    Absent,
    /// A color table follows the descriptor
    Present,
}

/// Color table configuration, from a descriptor's packed flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    existence: ColorTableExistence,
    table_len: usize, // must be between 2...256
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        ColorTableConfig {
            existence: ColorTableExistence::Absent,
            table_len: 2,
        }
    }
}

impl ColorTableConfig {
    /// Decode from existence flag and size exponent bits
    fn from_bits(present: bool, bits: u8) -> Self {
        let existence = if present {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        };
        let table_len = 2 << (bits & 0b0111);
        ColorTableConfig {
            existence,
            table_len,
        }
    }

    /// Get the table existence
    pub fn existence(&self) -> ColorTableExistence {
        self.existence
    }

    /// Get the number of entries (0 when absent)
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => self.table_len,
        }
    }

    /// Check whether the table is absent
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the size of the table in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Disposal method, applied before the following frame is drawn
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    #[default]
    NoAction,
    /// Leave the frame in place
    Keep,
    /// Restore frame area to background
    Background,
    /// Restore to the frame displayed before this one
    Previous,
    /// Reserved values (4-7)
    Reserved(u8),
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Block label following the logical screen descriptor
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    ImageDesc_,
    Extension_,
    Trailer_,
}

impl BlockCode {
    /// Get the block code for a label byte
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }

    /// Get the size of the fixed record following the label
    pub fn size(self) -> usize {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => 9,
            Extension_ => 1,
            Trailer_ => 0,
        }
    }
}

/// Extension label following an extension introducer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

/// Logical screen descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    /// Size of the record in bytes
    pub(crate) const SIZE: usize = 7;

    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Decode a logical screen descriptor from a buffer
    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        debug_assert_eq!(buf.len(), Self::SIZE);
        LogicalScreenDesc {
            screen_width: u16::from_le_bytes([buf[0], buf[1]]),
            screen_height: u16::from_le_bytes([buf[2], buf[3]]),
            flags: buf[4],
            background_color_idx: buf[5],
            pixel_aspect_ratio: buf[6],
        }
    }

    /// Get the canvas width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Get the canvas height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the color resolution (bits per primary color)
    pub fn color_resolution(&self) -> u8 {
        ((self.flags & Self::COLOR_RESOLUTION) >> 4) + 1
    }

    /// Get the bits per pixel of the global color table
    pub fn bits_per_pixel(&self) -> u8 {
        (self.flags & Self::COLOR_TABLE_SIZE) + 1
    }

    /// Get the global color table configuration
    pub fn color_table_config(&self) -> ColorTableConfig {
        ColorTableConfig::from_bits(
            self.flags & Self::COLOR_TABLE_PRESENT != 0,
            self.flags & Self::COLOR_TABLE_SIZE,
        )
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Get the raw pixel aspect ratio byte
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Graphic control extension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    /// Size of the record in bytes (including block size and terminator)
    pub(crate) const SIZE: usize = 6;

    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Decode a graphic control extension from a buffer
    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        debug_assert_eq!(buf.len(), Self::SIZE);
        // buf[0] is the block size and buf[5] the terminator
        GraphicControl {
            flags: buf[1],
            delay_time_cs: u16::from_le_bytes([buf[2], buf[3]]),
            transparent_color_idx: buf[4],
        }
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    /// Check the user input flag
    pub fn user_input(&self) -> bool {
        self.flags & Self::USER_INPUT != 0
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Get the transparent color index, if the transparency flag is set
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }
}

/// Image descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Decode an image descriptor from a buffer
    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        debug_assert_eq!(buf.len(), BlockCode::ImageDesc_.size());
        ImageDesc {
            left: u16::from_le_bytes([buf[0], buf[1]]),
            top: u16::from_le_bytes([buf[2], buf[3]]),
            width: u16::from_le_bytes([buf[4], buf[5]]),
            height: u16::from_le_bytes([buf[6], buf[7]]),
            flags: buf[8],
        }
    }

    /// Get the left edge on the canvas
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Get the top edge on the canvas
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Get the frame width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the frame height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Check whether rows are stored in interlaced order
    pub fn interlaced(&self) -> bool {
        self.flags & Self::INTERLACED != 0
    }

    /// Get the local color table configuration
    pub fn color_table_config(&self) -> ColorTableConfig {
        ColorTableConfig::from_bits(
            self.flags & Self::COLOR_TABLE_PRESENT != 0,
            self.flags & Self::COLOR_TABLE_SIZE,
        )
    }

    /// Get the frame rectangle in canvas coordinates
    pub fn region(&self) -> Rect {
        Rect::new(
            self.left.into(),
            self.top.into(),
            self.width.into(),
            self.height.into(),
        )
    }

    /// Get the number of pixels in the frame
    pub fn image_sz(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}
