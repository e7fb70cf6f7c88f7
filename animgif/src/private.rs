// private.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Private module for top-level items
use crate::{
    Result,
    block::DisposalMethod,
    canvas::CanvasPixel,
    decode::{Options, Session, Steps},
    meta::{FrameMetadata, GifMetadata, ImageInfo},
};
use imgref::ImgVec;
use std::io::Read;

/// One step of an animation: the canvas as it appears after compositing
/// a frame.
#[derive(Clone, Debug)]
pub struct Step<P: CanvasPixel> {
    /// Composited canvas
    raster: ImgVec<P>,
    /// Frame metadata
    metadata: FrameMetadata,
}

impl<P: CanvasPixel> Step<P> {
    /// Create an animation step
    pub(crate) fn new(raster: ImgVec<P>, metadata: FrameMetadata) -> Self {
        Step { raster, metadata }
    }

    /// Get the raster
    pub fn raster(&self) -> &ImgVec<P> {
        &self.raster
    }

    /// Convert into the raster
    pub fn into_raster(self) -> ImgVec<P> {
        self.raster
    }

    /// Get the frame metadata
    pub fn metadata(&self) -> &FrameMetadata {
        &self.metadata
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.metadata.delay_time_cs
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        self.metadata.disposal_method
    }
}

/// Fully decoded animation
#[derive(Clone, Debug)]
pub struct Animation<P: CanvasPixel> {
    /// Canvas width
    pub width: u16,
    /// Canvas height
    pub height: u16,
    /// Stream metadata
    pub metadata: GifMetadata,
    /// Composited steps
    pub steps: Vec<Step<P>>,
}

/// GIF file decoder
///
/// Can be converted into:
/// * [into_steps] for an `Iterator` of composited [Step]s
/// * [decode] for a complete [Animation]
/// * [identify] for metadata only, without decoding image data
///
/// ## Example: Get a raster from a GIF
/// ```
/// use animgif::Decoder;
/// use rgb::RGBA8;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` as "gif"
/// if let Some(step) = Decoder::new(gif).into_steps::<RGBA8>().next() {
///     // was there a decoding error?
///     let step = step?;
///     let raster = step.raster();
///     assert_eq!(raster.width(), 2);
///     // ... work with raster
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Animation]: struct.Animation.html
/// [decode]: struct.Decoder.html#method.decode
/// [identify]: struct.Decoder.html#method.identify
/// [into_steps]: struct.Decoder.html#method.into_steps
/// [Step]: struct.Step.html
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Decode options
    options: Options,
}

impl<R: Read> Decoder<R> {
    /// Create a new GIF decoder.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            options: Options {
                max_frames: None,
                skip_metadata: false,
                max_image_sz: Some(1 << 25),
            },
        }
    }

    /// Set the maximum number of frames to decode.
    ///
    /// At least one frame is always decoded, if present.
    pub fn max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.options.max_frames = max_frames;
        self
    }

    /// Skip comment and XMP metadata.
    pub fn skip_metadata(mut self, skip_metadata: bool) -> Self {
        self.options.skip_metadata = skip_metadata;
        self
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.options.max_image_sz = max_image_sz;
        self
    }

    /// Convert into a step `Iterator`.
    pub fn into_steps<P: CanvasPixel>(self) -> Steps<R, P> {
        Steps::new(self.reader, self.options)
    }

    /// Decode all steps of the animation.
    pub fn decode<P: CanvasPixel>(self) -> Result<Animation<P>> {
        let mut iter = self.into_steps::<P>();
        let mut steps = vec![];
        for step in iter.by_ref() {
            steps.push(step?);
        }
        Ok(Animation {
            width: iter.width(),
            height: iter.height(),
            steps,
            metadata: iter.into_metadata(),
        })
    }

    /// Decode metadata only, skipping image data.
    pub fn identify(self) -> Result<ImageInfo> {
        Session::new(self.reader, self.options).identify()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::testgif::{Frame, TestGif};
    use rgb::{RGB8, RGBA16, RGBA8, alt::BGRA8};

    fn gif() -> Vec<u8> {
        TestGif::new(2, 1)
            .global_table(&[0, 0, 0, 0xFF, 0xFF, 0xFF])
            .application(b"NETSCAPE2.0", &[&[1, 3, 0]])
            .frame(Frame::new(2, 1, &[0, 1]).delay(5))
            .frame(Frame::new(1, 1, &[1]).delay(6))
            .extension(0xFE, &[b"done"])
            .build()
    }

    #[test]
    fn decode() -> Result<()> {
        let anim = Decoder::new(&gif()[..]).decode::<RGBA8>()?;
        assert_eq!((anim.width, anim.height), (2, 1));
        assert_eq!(anim.steps.len(), 2);
        assert_eq!(anim.metadata.repeat_count, 3);
        assert_eq!(anim.metadata.comments, ["done"]);
        let delays: Vec<_> = anim.steps.iter().map(|s| s.delay_time_cs()).collect();
        assert_eq!(delays, [5, 6]);
        let white = RGBA8::new(0xFF, 0xFF, 0xFF, 0xFF);
        assert_eq!(anim.steps[1].raster().buf()[..], [white, white]);
        Ok(())
    }

    #[test]
    fn pixel_types() -> Result<()> {
        let gif = gif();
        let step = Decoder::new(&gif[..]).into_steps::<RGB8>().next();
        let raster = step.transpose()?.map(|s| s.into_raster());
        assert_eq!(
            raster.map(|r| r.buf()[1]),
            Some(RGB8::new(0xFF, 0xFF, 0xFF))
        );
        let anim = Decoder::new(&gif[..]).decode::<RGBA16>()?;
        assert_eq!(anim.steps[0].raster().buf()[1].a, 0xFFFF);
        let anim = Decoder::new(&gif[..]).decode::<BGRA8>()?;
        assert_eq!(anim.steps[0].raster().buf()[0].a, 0xFF);
        Ok(())
    }

    #[test]
    fn options() -> Result<()> {
        let gif = gif();
        let anim = Decoder::new(&gif[..])
            .max_frames(Some(1))
            .decode::<RGBA8>()?;
        assert_eq!(anim.steps.len(), 1);
        let info = Decoder::new(&gif[..]).skip_metadata(true).identify()?;
        assert!(info.metadata.comments.is_empty());
        assert_eq!(info.frames.len(), 2);
        let res = Decoder::new(&gif[..])
            .max_image_sz(Some(1))
            .decode::<RGBA8>();
        assert!(matches!(res, Err(Error::TooLargeImage)));
        let res = Decoder::new(&gif[..]).max_image_sz(None).identify();
        assert!(res.is_ok());
        Ok(())
    }
}
