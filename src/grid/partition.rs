use crate::foundation::core::{Canvas, GridSize, Rect};

/// A grid cell: its position in the grid and its pixel rectangle on the source canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CellRect {
    /// Grid row, 0-based from the top.
    pub row: u32,
    /// Grid column, 0-based from the left.
    pub col: u32,
    /// Pixel area on the source canvas; never empty.
    pub rect: Rect,
}

/// Split `canvas` into `grid.cols` x `grid.rows` cells, in row-major order.
///
/// Cells are `ceil(W/cols)` x `ceil(H/rows)`; the last column and row are clamped to the
/// canvas. Cells left with zero width or height (more cells than pixels on an axis) are
/// omitted.
pub fn partition(canvas: Canvas, grid: GridSize) -> Vec<CellRect> {
    if grid.cols == 0 || grid.rows == 0 {
        return Vec::new();
    }
    let cell_w = canvas.width.div_ceil(grid.cols);
    let cell_h = canvas.height.div_ceil(grid.rows);

    // Past `width` columns (or `height` rows) every cell starts beyond the canvas edge.
    let live_cols = grid.cols.min(canvas.width);
    let live_rows = grid.rows.min(canvas.height);

    let mut out = Vec::with_capacity(live_cols as usize * live_rows as usize);
    for row in 0..live_rows {
        for col in 0..live_cols {
            let x = col.saturating_mul(cell_w);
            let y = row.saturating_mul(cell_h);
            let rect = Rect::new(
                x,
                y,
                cell_w.min(canvas.width.saturating_sub(x)),
                cell_h.min(canvas.height.saturating_sub(y)),
            );
            if rect.is_empty() {
                continue;
            }
            out.push(CellRect { row, col, rect });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/grid/partition.rs"]
mod tests;
