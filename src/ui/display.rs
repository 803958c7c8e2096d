use crate::audio::MAX_BANDS;

/// Surface pixels covered by one terminal cell.
pub const CELL_PX_W: u32 = 4;
pub const CELL_PX_H: u32 = 8;

pub const MIN_BANDS: usize = 12;
/// Surface width allotted to one band when sizing the band count.
pub const BAND_WIDTH_PX: u32 = 8;

/// Layout of the drawing surface. Bands follow the width; nothing else is
/// owned here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DisplayAdapter {
    width: u32,
    height: u32,
    bands: usize,
    redraw: bool,
}

impl DisplayAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.bands = band_count(width);
        self.request_redraw();
    }

    /// Resize from a terminal size in cells.
    pub fn on_resize_cells(&mut self, cols: u16, rows: u16) {
        self.on_resize(u32::from(cols) * CELL_PX_W, u32::from(rows) * CELL_PX_H);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Active band count; 0 until the first resize.
    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Returns whether a redraw was pending and clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }
}

pub fn band_count(width: u32) -> usize {
    ((width / BAND_WIDTH_PX) as usize).clamp(MIN_BANDS, MAX_BANDS)
}
