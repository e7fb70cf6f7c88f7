// meta.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! Stream and frame metadata
use crate::block::{
    DisposalMethod, GraphicControl, ImageDesc, LogicalScreenDesc,
};
use crate::canvas::Rect;
use crate::palette::ColorTableMode;

/// Stream-level metadata
#[derive(Clone, Debug, PartialEq)]
pub struct GifMetadata {
    /// Number of times to repeat the animation (0 means forever)
    pub repeat_count: u16,
    /// Comment extension text, in stream order
    pub comments: Vec<String>,
    /// XMP packet, if present
    pub xmp: Option<Vec<u8>>,
    /// Color table mode declared by the logical screen descriptor
    pub color_table_mode: ColorTableMode,
    /// Number of entries in the global color table
    pub global_color_table_len: usize,
    /// Background color index
    pub background_color_idx: u8,
    /// Pixel aspect ratio (width / height), if specified
    pub pixel_aspect_ratio: Option<f32>,
}

impl Default for GifMetadata {
    fn default() -> Self {
        GifMetadata {
            repeat_count: 1,
            comments: Vec::new(),
            xmp: None,
            color_table_mode: ColorTableMode::Global,
            global_color_table_len: 0,
            background_color_idx: 0,
            pixel_aspect_ratio: None,
        }
    }
}

impl GifMetadata {
    /// Record values from the logical screen descriptor
    pub(crate) fn set_screen(&mut self, screen: &LogicalScreenDesc) {
        let table = screen.color_table_config();
        self.color_table_mode = if table.is_empty() {
            ColorTableMode::Local
        } else {
            ColorTableMode::Global
        };
        self.global_color_table_len = table.len();
        self.background_color_idx = screen.background_color_idx();
        self.pixel_aspect_ratio = match screen.pixel_aspect_ratio() {
            0 => None,
            n => Some((f32::from(n) + 15.0) / 64.0),
        };
    }
}

/// Per-frame metadata
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameMetadata {
    /// Color table backing the frame
    pub color_table_mode: ColorTableMode,
    /// Number of entries in that color table
    pub color_table_len: usize,
    /// Delay before the next frame, in centiseconds
    pub delay_time_cs: u16,
    /// Disposal method
    pub disposal_method: DisposalMethod,
    /// Transparent color index
    pub transparent_color: Option<u8>,
    /// Frame rectangle on the canvas
    pub region: Rect,
    /// Rows stored in interlaced order
    pub interlaced: bool,
}

impl FrameMetadata {
    /// Build frame metadata from the descriptors in effect for a frame
    pub(crate) fn new(
        screen: &LogicalScreenDesc,
        image_desc: &ImageDesc,
        control: Option<&GraphicControl>,
    ) -> Self {
        let local = image_desc.color_table_config();
        let (color_table_mode, color_table_len) = if local.is_empty() {
            (ColorTableMode::Global, screen.color_table_config().len())
        } else {
            (ColorTableMode::Local, local.len())
        };
        FrameMetadata {
            color_table_mode,
            color_table_len,
            delay_time_cs: control.map_or(0, |c| c.delay_time_cs()),
            disposal_method: control
                .map_or(DisposalMethod::NoAction, |c| c.disposal_method()),
            transparent_color: control.and_then(|c| c.transparent_color()),
            region: image_desc.region(),
            interlaced: image_desc.interlaced(),
        }
    }
}

/// Result of a metadata-only decode
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    /// Canvas width
    pub width: u16,
    /// Canvas height
    pub height: u16,
    /// Bits per pixel of the global color table
    pub bits_per_pixel: u8,
    /// Stream metadata
    pub metadata: GifMetadata,
    /// Metadata for each frame
    pub frames: Vec<FrameMetadata>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aspect_ratio() {
        let screen =
            LogicalScreenDesc::from_buf(&[1, 0, 1, 0, 0b1000_0001, 2, 49]);
        let mut meta = GifMetadata::default();
        meta.set_screen(&screen);
        assert_eq!(meta.pixel_aspect_ratio, Some(1.0));
        assert_eq!(meta.global_color_table_len, 4);
        assert_eq!(meta.background_color_idx, 2);
        assert_eq!(meta.color_table_mode, ColorTableMode::Global);
        assert_eq!(meta.repeat_count, 1);
    }

    #[test]
    fn frame_table_mode() {
        let screen = LogicalScreenDesc::from_buf(&[4, 0, 4, 0, 0x80, 0, 0]);
        let global = ImageDesc::from_buf(&[0, 0, 0, 0, 2, 0, 2, 0, 0]);
        let meta = FrameMetadata::new(&screen, &global, None);
        assert_eq!(meta.color_table_mode, ColorTableMode::Global);
        assert_eq!(meta.color_table_len, 2);
        assert_eq!(meta.disposal_method, DisposalMethod::NoAction);
        let local = ImageDesc::from_buf(&[0, 0, 0, 0, 2, 0, 2, 0, 0x82]);
        let control = GraphicControl::from_buf(&[4, 0b1000, 5, 0, 0, 0]);
        let meta = FrameMetadata::new(&screen, &local, Some(&control));
        assert_eq!(meta.color_table_mode, ColorTableMode::Local);
        assert_eq!(meta.color_table_len, 8);
        assert_eq!(meta.delay_time_cs, 5);
        assert_eq!(meta.disposal_method, DisposalMethod::Background);
    }
}
