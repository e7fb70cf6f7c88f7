// compose.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! Frame compositing onto an animation canvas
use crate::block::{DisposalMethod, ImageDesc};
use crate::canvas::{Canvas, CanvasPixel, Rect};
use crate::palette::ColorTable;

/// Interlace passes: (first row, row step)
const INTERLACE_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Destination row order for the rows of a frame, in decompressed order.
///
/// Each item is a row offset from the top of the frame.
#[derive(Debug)]
pub struct RowOrder {
    height: usize,
    interlaced: bool,
    pass: usize,
    row: usize,
}

impl RowOrder {
    /// Create a row order for a frame
    pub fn new(height: usize, interlaced: bool) -> Self {
        RowOrder {
            height,
            interlaced,
            pass: 0,
            row: 0,
        }
    }
}

impl Iterator for RowOrder {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if !self.interlaced {
            let row = self.row;
            if row < self.height {
                self.row += 1;
                return Some(row);
            }
            return None;
        }
        while let Some((_, step)) = INTERLACE_PASSES.get(self.pass) {
            if self.row < self.height {
                let row = self.row;
                self.row += step;
                return Some(row);
            }
            self.pass += 1;
            if let Some((first, _)) = INTERLACE_PASSES.get(self.pass) {
                self.row = *first;
            }
        }
        None
    }
}

/// Paint frame indices onto a canvas.
///
/// Pixels outside the canvas are dropped.  With a transparent color, both
/// that index and indices beyond the color table leave the canvas
/// unchanged; otherwise indices are clamped into the table.
pub fn paint<C: Canvas>(
    canvas: &mut C,
    image_desc: &ImageDesc,
    indices: &[u8],
    table: &ColorTable,
    transparent: Option<u8>,
) {
    let width = usize::from(image_desc.width());
    let height = usize::from(image_desc.height());
    let left = usize::from(image_desc.left());
    let top = usize::from(image_desc.top());
    let right = (left + width).min(canvas.width());
    if width == 0 || left >= right {
        return;
    }
    let rows = RowOrder::new(height, image_desc.interlaced());
    for (src, row) in indices.chunks_exact(width).zip(rows) {
        let y = top + row;
        if y >= canvas.height() {
            continue;
        }
        let dst = &mut canvas.row_mut(y)[left..right];
        for (pix, idx) in dst.iter_mut().zip(src) {
            if let Some(trans) = transparent {
                if *idx == trans || !table.contains(*idx) {
                    continue;
                }
            }
            *pix = C::Pixel::from_rgb(table.color(*idx));
        }
    }
}

/// Cross-frame compositing state
#[derive(Debug)]
pub struct AnimationState<C: Canvas> {
    /// Appearance of the last frame not disposed to previous, or the
    /// initial fill before any such frame
    baseline: Option<C>,
    /// Area to clear before drawing the next frame
    restore: Option<Rect>,
}

impl<C: Canvas> Default for AnimationState<C> {
    fn default() -> Self {
        AnimationState {
            baseline: None,
            restore: None,
        }
    }
}

impl<C: Canvas> AnimationState<C> {
    /// Get the current baseline canvas
    pub fn baseline(&self) -> Option<&C> {
        self.baseline.as_ref()
    }

    /// Get the pending restore rectangle
    pub fn pending_restore(&self) -> Option<Rect> {
        self.restore
    }

    /// Acquire the canvas for the next frame.
    ///
    /// The first frame starts from a fresh canvas: transparent if the frame
    /// has a transparent color, opaque black otherwise.  That fill becomes
    /// the baseline.  Later frames start from the baseline, after any
    /// pending restore is applied.
    ///
    /// Width and height must be nonzero.
    pub fn acquire(
        &mut self,
        width: usize,
        height: usize,
        transparent: bool,
    ) -> C {
        let restore = self.restore.take();
        let baseline = self.baseline.get_or_insert_with(|| {
            let fill = if transparent {
                C::Pixel::transparent()
            } else {
                C::Pixel::opaque_black()
            };
            C::with_fill(width, height, fill)
        });
        if let Some(rect) = restore {
            debug!("restoring to background: {rect:?}");
            baseline.clear(rect);
        }
        baseline.clone()
    }

    /// Advance state after a frame is composited
    pub fn advance(
        &mut self,
        canvas: &C,
        image_desc: &ImageDesc,
        disposal: DisposalMethod,
    ) {
        if disposal == DisposalMethod::Previous {
            return;
        }
        self.baseline = Some(canvas.clone());
        if disposal == DisposalMethod::Background {
            self.restore = Some(image_desc.region());
        }
    }
}
