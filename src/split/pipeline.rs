use std::path::Path;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    codec::decode::{DEFAULT_MAX_DECODE_BYTES, DecodedGif, GifFrameDecoder},
    codec::encode::{DEFAULT_ENCODE_SPEED, GifCellEncoder},
    codec::{CellEncoder, FrameDecoder},
    composite::cell::composite_cell,
    foundation::core::{DEFAULT_MAX_GRID, GridSize, Rect},
    foundation::error::{SplitError, SplitResult},
    grid::partition::{CellRect, partition},
};

/// Options for a split request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SplitOpts {
    /// Process cells on a rayon pool when `true`, one after another otherwise.
    pub parallel: bool,
    /// Optional explicit worker thread count (parallel mode only).
    pub threads: Option<usize>,
    /// GIF quantizer speed, `1..=30`.
    pub encode_speed: i32,
    /// Largest grid accepted on either axis.
    pub max_grid: u32,
    /// Budget for decoded pixels (working canvas plus every retained frame), in bytes.
    pub max_decode_bytes: u64,
}

impl Default for SplitOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            encode_speed: DEFAULT_ENCODE_SPEED,
            max_grid: DEFAULT_MAX_GRID,
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
        }
    }
}

impl SplitOpts {
    /// Check every option against its allowed range.
    pub fn validate(&self) -> SplitResult<()> {
        if self.threads == Some(0) {
            return Err(SplitError::config("'threads' must be >= 1 when set"));
        }
        if !(1..=30).contains(&self.encode_speed) {
            return Err(SplitError::config(format!(
                "'encode_speed' must be within 1..=30 (got {})",
                self.encode_speed
            )));
        }
        if self.max_grid == 0 {
            return Err(SplitError::config("'max_grid' must be >= 1"));
        }
        if self.max_decode_bytes == 0 {
            return Err(SplitError::config("'max_decode_bytes' must be >= 1"));
        }
        Ok(())
    }

    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_json_path(path: &Path) -> SplitResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read split options '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text)
            .map_err(|e| SplitError::config(format!("'{}': {e}", path.display())))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Validate `cols` x `rows` against `max_grid`.
    pub fn grid(&self, cols: u32, rows: u32) -> SplitResult<GridSize> {
        GridSize::new(cols, rows, self.max_grid)
    }
}

/// One finished cell: where it sits in the grid and its GIF bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCell {
    /// Grid row, 0-based from the top.
    pub row: u32,
    /// Grid column, 0-based from the left.
    pub col: u32,
    /// Area of the source canvas this cell covers.
    pub rect: Rect,
    /// Standalone looping GIF bitstream.
    pub gif: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Aggregated split counters.
pub struct SplitStats {
    /// `cols * rows` as requested.
    pub cells_requested: u64,
    /// Cells actually encoded.
    pub cells_encoded: u64,
    /// Zero-area cells that were dropped.
    pub cells_skipped: u64,
    /// Frames written into every cell.
    pub frames_per_cell: u64,
    /// Sum of all encoded cell sizes.
    pub bytes_out: u64,
}

/// Decode `gif_bytes` and split it into `grid` cells with the default codecs.
pub fn split_gif(
    gif_bytes: &[u8],
    grid: GridSize,
    opts: &SplitOpts,
) -> SplitResult<Vec<EncodedCell>> {
    split_gif_with_stats(gif_bytes, grid, opts).map(|(cells, _)| cells)
}

/// Like [`split_gif`], also returning counters.
pub fn split_gif_with_stats(
    gif_bytes: &[u8],
    grid: GridSize,
    opts: &SplitOpts,
) -> SplitResult<(Vec<EncodedCell>, SplitStats)> {
    opts.validate()?;
    let encoder = GifCellEncoder::new(opts.encode_speed)?;
    let decoder = GifFrameDecoder::with_limit(opts.max_decode_bytes);
    split_with(&decoder, &encoder, gif_bytes, grid, opts)
}

/// Split with caller-provided codecs.
#[tracing::instrument(skip(decoder, encoder, gif_bytes, opts), fields(bytes = gif_bytes.len()))]
pub fn split_with(
    decoder: &dyn FrameDecoder,
    encoder: &dyn CellEncoder,
    gif_bytes: &[u8],
    grid: GridSize,
    opts: &SplitOpts,
) -> SplitResult<(Vec<EncodedCell>, SplitStats)> {
    let decoded = decoder.decode(gif_bytes)?;
    split_decoded(&decoded, encoder, grid, opts)
}

/// Split already-decoded frames. Every cell succeeds or the whole call fails.
#[tracing::instrument(skip(decoded, encoder, opts), fields(frames = decoded.frames.len()))]
pub fn split_decoded(
    decoded: &DecodedGif,
    encoder: &dyn CellEncoder,
    grid: GridSize,
    opts: &SplitOpts,
) -> SplitResult<(Vec<EncodedCell>, SplitStats)> {
    if decoded.frames.is_empty() {
        return Err(SplitError::decode("gif contains no frames"));
    }
    let expected = decoded.canvas.rgba_len();
    if let Some((i, f)) = decoded
        .frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.pixels.len() != expected)
    {
        return Err(SplitError::decode(format!(
            "frame {i}: pixel buffer holds {} bytes, expected {expected} for a {}x{} canvas",
            f.pixels.len(),
            decoded.canvas.width,
            decoded.canvas.height
        )));
    }

    let cells = partition(decoded.canvas, grid);
    tracing::debug!(
        cols = grid.cols,
        rows = grid.rows,
        cells = cells.len(),
        "partitioned canvas"
    );

    let encoded = if opts.parallel && cells.len() > 1 {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| {
            cells
                .par_iter()
                .map(|cell| encode_one(decoded, encoder, cell))
                .collect::<SplitResult<Vec<_>>>()
        })?
    } else {
        cells
            .iter()
            .map(|cell| encode_one(decoded, encoder, cell))
            .collect::<SplitResult<Vec<_>>>()?
    };

    let cells_requested = grid.cell_count();
    let cells_encoded = encoded.len() as u64;
    let stats = SplitStats {
        cells_requested,
        cells_encoded,
        cells_skipped: cells_requested.saturating_sub(cells_encoded),
        frames_per_cell: decoded.frames.len() as u64,
        bytes_out: encoded.iter().map(|c| c.gif.len() as u64).sum(),
    };
    Ok((encoded, stats))
}

fn encode_one(
    decoded: &DecodedGif,
    encoder: &dyn CellEncoder,
    cell: &CellRect,
) -> SplitResult<EncodedCell> {
    let frames = composite_cell(decoded.canvas, cell.rect, &decoded.frames);
    let gif = encoder
        .encode(&frames, cell.rect.width, cell.rect.height)
        .map_err(|e| match e {
            SplitError::Encode(msg) => {
                SplitError::encode(format!("cell ({}, {}): {msg}", cell.row, cell.col))
            }
            other => other,
        })?;
    tracing::debug!(row = cell.row, col = cell.col, bytes = gif.len(), "encoded cell");
    Ok(EncodedCell {
        row: cell.row,
        col: cell.col,
        rect: cell.rect,
        gif,
    })
}

fn build_thread_pool(threads: Option<usize>) -> SplitResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SplitError::config("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SplitError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/split/pipeline.rs"]
mod tests;
