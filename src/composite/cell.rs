use crate::{
    codec::decode::{DisposalMethod, SourceFrame},
    foundation::core::{Canvas, RGBA_BYTES, Rect},
};

/// One resolved frame of a cell: cell-sized straight-alpha RGBA8 and its delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellFrame {
    /// `rect.width * rect.height * 4` bytes, row-major.
    pub pixels: Vec<u8>,
    /// Display time in hundredths of a second, copied from the source frame.
    pub delay_cs: u16,
}

/// Accumulating RGBA buffer for one cell.
///
/// Starts fully transparent and persists across the frames of a single cell. Each cell owns
/// its own canvas.
#[derive(Clone, Debug)]
pub struct CellCanvas {
    rect: Rect,
    pixels: Vec<u8>,
    prev_disposal: Option<DisposalMethod>,
}

impl CellCanvas {
    /// Fully transparent canvas covering `rect`.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            pixels: vec![0; rect.rgba_len()],
            prev_disposal: None,
        }
    }

    /// Source-canvas area this cell covers.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Current accumulated RGBA pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fold one source frame into the canvas and snapshot the result.
    ///
    /// A `RestoreToBackground` disposal on the previously folded frame clears the whole canvas
    /// before drawing. Other disposals are already reflected in the decoded full-canvas pixels.
    pub fn step(&mut self, canvas: Canvas, frame: &SourceFrame) -> CellFrame {
        let region = extract_region(&frame.pixels, canvas, self.rect);
        if self.prev_disposal == Some(DisposalMethod::RestoreToBackground) {
            self.pixels.fill(0);
        }
        composite_over(&mut self.pixels, &region, frame.has_transparency);
        self.prev_disposal = Some(frame.disposal);

        CellFrame {
            pixels: self.pixels.clone(),
            delay_cs: frame.delay_cs,
        }
    }
}

/// Copy `rect` out of a full-canvas RGBA buffer. Pixels outside the canvas stay zero.
pub fn extract_region(src: &[u8], canvas: Canvas, rect: Rect) -> Vec<u8> {
    debug_assert_eq!(src.len(), canvas.rgba_len(), "source frame does not match canvas");
    let mut out = vec![0u8; rect.rgba_len()];
    let visible = rect.clip_to(canvas);
    if visible.is_empty() || src.len() < canvas.rgba_len() {
        return out;
    }

    let src_stride = canvas.width as usize * RGBA_BYTES;
    let dst_stride = rect.width as usize * RGBA_BYTES;
    let row_bytes = visible.width as usize * RGBA_BYTES;
    let dst_x = (visible.x - rect.x) as usize * RGBA_BYTES;

    for row in 0..visible.height as usize {
        let sy = visible.y as usize + row;
        let dy = (visible.y - rect.y) as usize + row;
        let s = sy * src_stride + visible.x as usize * RGBA_BYTES;
        let d = dy * dst_stride + dst_x;
        out[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }
    out
}

/// Draw `src` over `dst` (same size). With `has_transparency`, pixels whose alpha is exactly
/// zero leave `dst` untouched; every other pixel replaces `dst` outright.
pub fn composite_over(dst: &mut [u8], src: &[u8], has_transparency: bool) {
    if !has_transparency {
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
        return;
    }
    for (d, s) in dst
        .chunks_exact_mut(RGBA_BYTES)
        .zip(src.chunks_exact(RGBA_BYTES))
    {
        if s[3] != 0 {
            d.copy_from_slice(s);
        }
    }
}

/// Resolve every source frame for one cell, in order.
pub fn composite_cell(canvas: Canvas, rect: Rect, frames: &[SourceFrame]) -> Vec<CellFrame> {
    let mut cell = CellCanvas::new(rect);
    frames.iter().map(|f| cell.step(canvas, f)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/composite/cell.rs"]
mod tests;
