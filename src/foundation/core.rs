use crate::foundation::error::{SplitError, SplitResult};

/// Bytes per RGBA8 pixel.
pub const RGBA_BYTES: usize = 4;

/// Largest grid size accepted on either axis unless configured otherwise.
pub const DEFAULT_MAX_GRID: u32 = 20;

/// Logical screen size of a GIF, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas of `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Length of a tightly packed RGBA8 buffer covering the whole canvas.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(RGBA_BYTES)
    }

    /// The whole canvas as a rect at the origin.
    pub fn bounds(self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Axis-aligned pixel rectangle. `x`/`y` are the top-left corner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Rect with top-left corner at (`x`, `y`).
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Length of a tightly packed RGBA8 buffer covering the rect.
    pub fn rgba_len(self) -> usize {
        (self.area() as usize).saturating_mul(RGBA_BYTES)
    }

    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Clip `self` to `canvas`, possibly producing an empty rect.
    pub fn clip_to(self, canvas: Canvas) -> Self {
        let x = self.x.min(canvas.width);
        let y = self.y.min(canvas.height);
        Self {
            x,
            y,
            width: self.right().min(canvas.width) - x,
            height: self.bottom().min(canvas.height) - y,
        }
    }
}

/// Grid dimensions: `cols` cells across (N), `rows` cells down (M).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridSize {
    /// Cells across.
    pub cols: u32,
    /// Cells down.
    pub rows: u32,
}

impl GridSize {
    /// Validate a requested grid against `max` on both axes.
    pub fn new(cols: u32, rows: u32, max: u32) -> SplitResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(SplitError::config(format!(
                "grid must have at least one column and one row (got {cols}x{rows})"
            )));
        }
        if cols > max || rows > max {
            return Err(SplitError::config(format!(
                "grid size too large: {cols}x{rows} exceeds the maximum of {max} per axis"
            )));
        }
        Ok(Self { cols, rows })
    }

    /// `cols * rows`, including cells that may turn out empty.
    pub fn cell_count(self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
