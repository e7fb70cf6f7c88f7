// error.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
use std::fmt;
use std::io;

/// Fixed-size record which was cut short by the end of the stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Record {
    /// Logical screen descriptor (7 bytes)
    LogicalScreenDesc,
    /// Image descriptor (9 bytes)
    ImageDesc,
    /// Graphic control extension (6 bytes)
    GraphicControl,
    /// Application extension identifier or sub-block
    Application,
}

/// Errors encountered while decoding
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// Stream does not start with a `GIF87a` or `GIF89a` identifier.
    UnrecognizedContainer,
    /// Stream ended inside a fixed-size record.
    ShortRead(Record),
    /// Image descriptor has zero width or height.
    InvalidDimensions,
    /// Comment sub-block longer than 255 bytes.
    ///
    /// Sub-block lengths are single bytes, so GIF streams never produce
    /// this error.
    OversizedSubBlock(usize),
    /// Stream ended before any frame was decoded.
    NoData,
    /// Logical screen descriptor never established a canvas size.
    NoHeader,
    /// LZW minimum code size out of range.
    InvalidCodeSize(u8),
    /// Compressed LZW data invalid or corrupt.
    InvalidLzwData,
    /// Canvas or frame larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage,
}

/// Animgif result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Record {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Record::LogicalScreenDesc => "logical screen descriptor",
            Record::ImageDesc => "image descriptor",
            Record::GraphicControl => "graphic control extension",
            Record::Application => "application extension",
        };
        fmt.write_str(name)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::ShortRead(rec) => write!(fmt, "not enough data for {rec}"),
            Error::OversizedSubBlock(len) => {
                write!(fmt, "sub-block length {len} exceeds maximum")
            }
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
