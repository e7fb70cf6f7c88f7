// decode.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF decoding session and block dispatch
use crate::block::{BlockCode, GraphicControl, ImageDesc, LogicalScreenDesc};
use crate::canvas::CanvasPixel;
use crate::compose::{AnimationState, paint};
use crate::error::{Error, Record, Result};
use crate::lzw::{IndexDecoder, LzwIndices};
use crate::meta::{FrameMetadata, GifMetadata, ImageInfo};
use crate::palette::{ColorTable, ColorTables};
use crate::private::Step;
use crate::reader::BlockReader;
use imgref::ImgVec;
use std::io::Read;

/// Size of the container identifier
const HEADER_SZ: usize = 6;

/// Minimum code size range allowed for image data
const MIN_CODE_SIZES: std::ops::RangeInclusive<u8> = 1..=11;

/// Decode options
#[derive(Clone, Copy, Debug)]
pub(crate) struct Options {
    /// Maximum number of frames to decode
    pub max_frames: Option<usize>,
    /// Skip comment and XMP payloads
    pub skip_metadata: bool,
    /// Maximum canvas or frame size, in pixels
    pub max_image_sz: Option<usize>,
}

/// Decoding context for one stream
pub(crate) struct Session<R: Read> {
    /// Block reader
    pub(crate) reader: BlockReader<R>,
    /// Decode options
    pub(crate) options: Options,
    /// Logical screen descriptor (after preamble)
    screen: Option<LogicalScreenDesc>,
    /// Global and local color tables
    tables: ColorTables,
    /// Graphic control for the next image
    pub(crate) graphic_control: Option<GraphicControl>,
    /// Stream metadata
    pub(crate) metadata: GifMetadata,
    /// Index decompressor
    indices: LzwIndices,
    /// Number of frames read
    n_frames: usize,
}

impl<R: Read> Session<R> {
    /// Create a new decoding session
    pub fn new(reader: R, options: Options) -> Self {
        Session {
            reader: BlockReader::new(reader),
            options,
            screen: None,
            tables: ColorTables::default(),
            graphic_control: None,
            metadata: GifMetadata::default(),
            indices: LzwIndices::default(),
            n_frames: 0,
        }
    }

    /// Get the logical screen descriptor
    pub fn screen(&self) -> LogicalScreenDesc {
        self.screen.unwrap_or_default()
    }

    /// Get the number of frames read
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Get stream metadata
    pub fn metadata(&self) -> &GifMetadata {
        &self.metadata
    }

    /// Check that an area is within the size limit
    fn check_size(&self, sz: usize) -> Result<()> {
        match self.options.max_image_sz {
            Some(max) if sz > max => Err(Error::TooLargeImage),
            _ => Ok(()),
        }
    }

    /// Read a color table, zero-filling any entries cut off by end of stream
    fn read_color_table(&mut self, size_bytes: usize) -> Result<ColorTable> {
        let buf = self.reader.read_up_to(size_bytes)?;
        if buf.len() < size_bytes {
            warn!("short color table: {} of {size_bytes}", buf.len());
            let mut buf = buf.to_vec();
            buf.resize(size_bytes, 0);
            return Ok(ColorTable::from_buf(&buf));
        }
        Ok(ColorTable::from_buf(buf))
    }

    /// Read the header, logical screen descriptor and global color table
    pub fn preamble(&mut self) -> Result<()> {
        match self.reader.read_record(HEADER_SZ)? {
            Some(b"GIF87a") | Some(b"GIF89a") => (),
            _ => return Err(Error::UnrecognizedContainer),
        }
        let screen = match self.reader.read_record(LogicalScreenDesc::SIZE)? {
            Some(buf) => LogicalScreenDesc::from_buf(buf),
            None => return Err(Error::ShortRead(Record::LogicalScreenDesc)),
        };
        debug!("screen: {screen:?}");
        self.check_size(
            usize::from(screen.screen_width())
                * usize::from(screen.screen_height()),
        )?;
        let size_bytes = screen.color_table_config().size_bytes();
        if size_bytes > 0 {
            let table = self.read_color_table(size_bytes)?;
            self.tables.set_global(table);
        }
        self.metadata.set_screen(&screen);
        self.screen = Some(screen);
        Ok(())
    }

    /// Check whether the frame limit stops decoding before another frame
    fn frame_limit_reached(&self) -> bool {
        self.n_frames > 0
            && matches!(self.options.max_frames, Some(max) if self.n_frames >= max)
    }

    /// Dispatch blocks until the next image.
    ///
    /// Returns the image descriptor and LZW minimum code size, or `None`
    /// when the stream ends.
    pub fn next_image(&mut self) -> Result<Option<(ImageDesc, u8)>> {
        loop {
            let Some(label) = self.reader.read_byte()? else {
                debug!("end of stream after {} frames", self.n_frames);
                return Ok(None);
            };
            match BlockCode::from_u8(label) {
                Some(BlockCode::ImageDesc_) => {
                    if self.frame_limit_reached() {
                        debug!("frame limit reached: {}", self.n_frames);
                        return Ok(None);
                    }
                    return self.read_image();
                }
                Some(BlockCode::Extension_) => self.read_extension()?,
                Some(BlockCode::Trailer_) => return Ok(None),
                None => {
                    warn!("unrecognized block label: {label:#04X}");
                    return Ok(None);
                }
            }
        }
    }

    /// Read an image descriptor, local color table and code size
    fn read_image(&mut self) -> Result<Option<(ImageDesc, u8)>> {
        let sz = BlockCode::ImageDesc_.size();
        let image_desc = match self.reader.read_record(sz)? {
            Some(buf) => ImageDesc::from_buf(buf),
            None => return Err(Error::ShortRead(Record::ImageDesc)),
        };
        debug!("image: {image_desc:?}");
        if image_desc.width() == 0 || image_desc.height() == 0 {
            return Err(Error::InvalidDimensions);
        }
        self.check_size(image_desc.image_sz())?;
        let size_bytes = image_desc.color_table_config().size_bytes();
        if size_bytes > 0 {
            let table = self.read_color_table(size_bytes)?;
            self.tables.set_local(table);
        }
        let Some(min_code_size) = self.reader.read_byte()? else {
            debug!("end of stream before image data");
            return Ok(None);
        };
        if !MIN_CODE_SIZES.contains(&min_code_size) {
            return Err(Error::InvalidCodeSize(min_code_size));
        }
        Ok(Some((image_desc, min_code_size)))
    }

    /// Get metadata for the current frame
    pub fn frame_metadata(&self, image_desc: &ImageDesc) -> FrameMetadata {
        FrameMetadata::new(
            &self.screen(),
            image_desc,
            self.graphic_control.as_ref(),
        )
    }

    /// Get the color table backing the current frame
    pub fn active_table(&self) -> Option<&ColorTable> {
        self.tables.active()
    }

    /// Decode image data of the current frame
    pub fn decode_indices(
        &mut self,
        image_desc: &ImageDesc,
        min_code_size: u8,
        indices: &mut Vec<u8>,
    ) -> Result<()> {
        self.indices.decode(
            &mut self.reader,
            min_code_size,
            image_desc.width().into(),
            image_desc.height().into(),
            indices,
        )
    }

    /// Skip image data of the current frame
    pub fn skip_indices(
        &mut self,
        image_desc: &ImageDesc,
        min_code_size: u8,
    ) -> Result<()> {
        self.indices.skip(
            &mut self.reader,
            min_code_size,
            image_desc.image_sz(),
        )
    }

    /// Finish the current frame, resetting per-frame state
    pub fn end_frame(&mut self) {
        self.graphic_control = None;
        self.tables.clear_local();
        self.n_frames += 1;
    }

    /// Decode metadata only, skipping all image data
    pub fn identify(mut self) -> Result<ImageInfo> {
        self.preamble()?;
        let mut frames = vec![];
        while let Some((image_desc, min_code_size)) = self.next_image()? {
            frames.push(self.frame_metadata(&image_desc));
            self.skip_indices(&image_desc, min_code_size)?;
            self.end_frame();
        }
        let screen = self.screen();
        if screen.screen_width() == 0 && screen.screen_height() == 0 {
            return Err(Error::NoHeader);
        }
        Ok(ImageInfo {
            width: screen.screen_width(),
            height: screen.screen_height(),
            bits_per_pixel: screen.bits_per_pixel(),
            metadata: self.metadata,
            frames,
        })
    }
}

/// An `Iterator` for composited animation [Step]s
///
/// Stopping iteration between steps cancels decoding.
///
/// [Step]: struct.Step.html
pub struct Steps<R: Read, P: CanvasPixel> {
    /// Decoding session
    session: Session<R>,
    /// Compositing state
    state: AnimationState<ImgVec<P>>,
    /// Index buffer, reused for every frame
    indices: Vec<u8>,
    /// Preamble has been read
    started: bool,
    /// Decoding is finished
    done: bool,
}

impl<R: Read, P: CanvasPixel> Iterator for Steps<R, P> {
    type Item = Result<Step<P>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_step() {
            Ok(Some(step)) => Some(Ok(step)),
            Ok(None) => {
                self.done = true;
                if self.session.n_frames() == 0 {
                    Some(Err(Error::NoData))
                } else {
                    None
                }
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read, P: CanvasPixel> Steps<R, P> {
    /// Create a new step iterator
    pub(crate) fn new(reader: R, options: Options) -> Self {
        Steps {
            session: Session::new(reader, options),
            state: AnimationState::default(),
            indices: Vec::new(),
            started: false,
            done: false,
        }
    }

    /// Get the canvas width (zero before the first step)
    pub fn width(&self) -> u16 {
        self.session.screen().screen_width()
    }

    /// Get the canvas height (zero before the first step)
    pub fn height(&self) -> u16 {
        self.session.screen().screen_height()
    }

    /// Get stream metadata read so far.
    ///
    /// Comments and other extensions after the last frame are only
    /// included once iteration has finished.
    pub fn metadata(&self) -> &GifMetadata {
        self.session.metadata()
    }

    /// Convert into stream metadata
    pub(crate) fn into_metadata(self) -> GifMetadata {
        self.session.metadata
    }

    /// Decode and composite the next step
    fn next_step(&mut self) -> Result<Option<Step<P>>> {
        if !self.started {
            self.started = true;
            self.session.preamble()?;
        }
        if self.width() == 0 || self.height() == 0 {
            warn!("empty canvas: {}x{}", self.width(), self.height());
            return Ok(None);
        }
        let Some((image_desc, min_code_size)) = self.session.next_image()?
        else {
            return Ok(None);
        };
        let metadata = self.session.frame_metadata(&image_desc);
        self.session.decode_indices(
            &image_desc,
            min_code_size,
            &mut self.indices,
        )?;
        let width = self.width().into();
        let height = self.height().into();
        let transparent = metadata.transparent_color;
        let mut raster = self.state.acquire(width, height, transparent.is_some());
        if let Some(table) = self.session.active_table() {
            paint(&mut raster, &image_desc, &self.indices, table, transparent);
        }
        self.state
            .advance(&raster, &image_desc, metadata.disposal_method);
        self.session.end_frame();
        Ok(Some(Step::new(raster, metadata)))
    }
}
