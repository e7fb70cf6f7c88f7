// canvas.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! Pixel buffer capabilities used by the compositor
use imgref::ImgVec;
use rgb::alt::BGRA8;
use rgb::{RGB8, RGBA16, RGBA8};

/// Rectangle in canvas coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: usize,
    /// Top edge
    pub y: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Clip to a `width` x `height` area with origin at 0, 0
    pub fn clip(self, width: usize, height: usize) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Check whether the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel format which can be painted from a color table entry
pub trait CanvasPixel: Copy {
    /// Convert a color table entry
    fn from_rgb(rgb: RGB8) -> Self;

    /// Fully transparent pixel (or black without alpha)
    fn transparent() -> Self;

    /// Opaque black pixel
    fn opaque_black() -> Self {
        Self::from_rgb(RGB8::new(0, 0, 0))
    }
}

impl CanvasPixel for RGBA8 {
    fn from_rgb(rgb: RGB8) -> Self {
        RGBA8::new(rgb.r, rgb.g, rgb.b, 0xFF)
    }

    fn transparent() -> Self {
        RGBA8::new(0, 0, 0, 0)
    }
}

impl CanvasPixel for RGBA16 {
    fn from_rgb(rgb: RGB8) -> Self {
        // scale 8-bit channels so 0xFF maps to 0xFFFF
        let ch = |v: u8| u16::from(v) * 0x101;
        RGBA16::new(ch(rgb.r), ch(rgb.g), ch(rgb.b), 0xFFFF)
    }

    fn transparent() -> Self {
        RGBA16::new(0, 0, 0, 0)
    }
}

impl CanvasPixel for BGRA8 {
    fn from_rgb(rgb: RGB8) -> Self {
        BGRA8 {
            b: rgb.b,
            g: rgb.g,
            r: rgb.r,
            a: 0xFF,
        }
    }

    fn transparent() -> Self {
        BGRA8 {
            b: 0,
            g: 0,
            r: 0,
            a: 0,
        }
    }
}

impl CanvasPixel for RGB8 {
    fn from_rgb(rgb: RGB8) -> Self {
        rgb
    }

    fn transparent() -> Self {
        RGB8::new(0, 0, 0)
    }
}

/// Two-dimensional pixel buffer
pub trait Canvas: Clone {
    /// Pixel type
    type Pixel: CanvasPixel;

    /// Create a canvas filled with one pixel value.
    ///
    /// Width and height must be nonzero; `ImgVec` panics otherwise.
    fn with_fill(width: usize, height: usize, fill: Self::Pixel) -> Self;

    /// Get the width in pixels
    fn width(&self) -> usize;

    /// Get the height in pixels
    fn height(&self) -> usize;

    /// Get one row of pixels (mutable)
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];

    /// Clear a rectangle to transparent, clipped to canvas bounds
    fn clear(&mut self, rect: Rect) {
        let rect = rect.clip(self.width(), self.height());
        if rect.is_empty() {
            return;
        }
        for y in rect.y..rect.y + rect.height {
            let row = self.row_mut(y);
            row[rect.x..rect.x + rect.width].fill(Self::Pixel::transparent());
        }
    }
}

impl<P: CanvasPixel> Canvas for ImgVec<P> {
    type Pixel = P;

    fn with_fill(width: usize, height: usize, fill: P) -> Self {
        ImgVec::new(vec![fill; width * height], width, height)
    }

    fn width(&self) -> usize {
        imgref::Img::width(self)
    }

    fn height(&self) -> usize {
        imgref::Img::height(self)
    }

    fn row_mut(&mut self, y: usize) -> &mut [P] {
        let width = imgref::Img::width(self);
        let start = y * self.stride();
        &mut self.buf_mut()[start..start + width]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clip() {
        let r = Rect::new(2, 3, 10, 10).clip(8, 6);
        assert_eq!(r, Rect::new(2, 3, 6, 3));
        let r = Rect::new(9, 1, 4, 4).clip(8, 6);
        assert!(r.is_empty());
        let r = Rect::new(0, 0, 4, 4).clip(8, 6);
        assert_eq!(r, Rect::new(0, 0, 4, 4));
    }

    #[test]
    fn clear_clipped() {
        let red = RGBA8::from_rgb(RGB8::new(0xFF, 0, 0));
        let mut c = ImgVec::with_fill(4, 3, red);
        c.clear(Rect::new(2, 1, 8, 8));
        let buf = c.buf();
        assert_eq!(buf[0..4], [red; 4]);
        assert_eq!(buf[4..6], [red; 2]);
        assert_eq!(buf[6..8], [RGBA8::transparent(); 2]);
        assert_eq!(buf[10..12], [RGBA8::transparent(); 2]);
    }

    #[test]
    fn pixel_formats() {
        let rgb = RGB8::new(0x12, 0x34, 0xFF);
        assert_eq!(RGBA8::from_rgb(rgb), RGBA8::new(0x12, 0x34, 0xFF, 0xFF));
        assert_eq!(
            RGBA16::from_rgb(rgb),
            RGBA16::new(0x1212, 0x3434, 0xFFFF, 0xFFFF)
        );
        let bgra = BGRA8::from_rgb(rgb);
        assert_eq!((bgra.b, bgra.g, bgra.r, bgra.a), (0xFF, 0x34, 0x12, 0xFF));
        assert_eq!(RGBA8::opaque_black(), RGBA8::new(0, 0, 0, 0xFF));
        assert_eq!(RGB8::transparent(), RGB8::new(0, 0, 0));
    }
}
