// lib.rs      animgif crate.
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! A library for decoding animated GIF images.
//!
//! Frames are composited onto a canvas the way they appear when played,
//! respecting disposal methods, transparency and interlacing.
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod canvas;
pub mod compose;
mod decode;
mod error;
mod extension;
pub mod lzw;
mod meta;
mod palette;
mod private;
pub mod reader;
#[cfg(test)]
mod testgif;

pub use crate::canvas::{Canvas, CanvasPixel, Rect};
pub use crate::decode::Steps;
pub use crate::error::{Error, Record, Result};
pub use crate::meta::{FrameMetadata, GifMetadata, ImageInfo};
pub use crate::palette::{ColorTable, ColorTableMode};
pub use crate::private::{Animation, Decoder, Step};
