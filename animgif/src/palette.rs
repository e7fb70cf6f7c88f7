// palette.rs
//
// Copyright (c) 2025  Douglas Lau
//
use crate::block::CHANNELS;
use rgb::RGB8;

/// Color table which backs a frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorTableMode {
    /// Stream-wide global color table
    #[default]
    Global,
    /// Frame-specific local color table
    Local,
}

/// Color table (palette of RGB entries)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorTable {
    colors: Vec<RGB8>,
}

impl ColorTable {
    /// Create a color table from RGB triples
    pub fn from_buf(buf: &[u8]) -> Self {
        let colors = buf
            .chunks_exact(CHANNELS)
            .map(|c| RGB8::new(c[0], c[1], c[2]))
            .collect();
        ColorTable { colors }
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get the maximum valid index
    pub fn max_index(&self) -> usize {
        self.colors.len().saturating_sub(1)
    }

    /// Check whether a raw index is within the table
    pub fn contains(&self, idx: u8) -> bool {
        usize::from(idx) < self.colors.len()
    }

    /// Look up a color, clamping the index into the table
    pub fn color(&self, idx: u8) -> RGB8 {
        let i = usize::from(idx).min(self.max_index());
        self.colors.get(i).copied().unwrap_or_default()
    }
}

/// Global and current local color tables
#[derive(Debug, Default)]
pub(crate) struct ColorTables {
    global: Option<ColorTable>,
    local: Option<ColorTable>,
}

impl ColorTables {
    /// Set the global color table
    pub fn set_global(&mut self, table: ColorTable) {
        self.global = Some(table);
    }

    /// Set the local color table for the current frame
    pub fn set_local(&mut self, table: ColorTable) {
        self.local = Some(table);
    }

    /// Release the local color table
    pub fn clear_local(&mut self) {
        self.local = None;
    }

    /// Get the table backing the current frame, if it has any entries
    pub fn active(&self) -> Option<&ColorTable> {
        self.local
            .as_ref()
            .or(self.global.as_ref())
            .filter(|t| !t.is_empty())
    }
}
