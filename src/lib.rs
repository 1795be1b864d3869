//! gifsplit cuts an animated GIF into an N x M grid of independently animated GIFs.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: GIF bytes -> [`DecodedGif`] (every frame composited onto the full canvas)
//! 2. **Partition**: canvas + [`GridSize`] -> row-major [`CellRect`]s
//! 3. **Composite**: per cell, fold the frames into a [`CellCanvas`] -> [`CellFrame`]s
//! 4. **Encode**: per cell, [`CellFrame`]s -> looping GIF bytes ([`EncodedCell`])
//!
//! Cells share only the read-only decoded frames, so steps 3 and 4 run in parallel on a rayon
//! pool when [`SplitOpts::parallel`] is set. Output is identical either way, and a failure in
//! any cell fails the whole call.
//!
//! Decoding and encoding sit behind the [`FrameDecoder`] and [`CellEncoder`] traits.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod composite;
mod foundation;
mod grid;
mod split;

pub use codec::decode::{
    DEFAULT_MAX_DECODE_BYTES, DecodedGif, DisposalMethod, GifFrameDecoder, SourceFrame,
    decode_gif, decode_gif_with_limit,
};
pub use codec::encode::{DEFAULT_ENCODE_SPEED, GifCellEncoder, encode_cell_gif};
pub use codec::{CellEncoder, FrameDecoder};
pub use composite::cell::{CellCanvas, CellFrame, composite_cell, composite_over, extract_region};
pub use foundation::core::{Canvas, DEFAULT_MAX_GRID, GridSize, RGBA_BYTES, Rect};
pub use foundation::error::{SplitError, SplitResult};
pub use grid::partition::{CellRect, partition};
pub use split::pipeline::{
    EncodedCell, SplitOpts, SplitStats, split_decoded, split_gif, split_gif_with_stats,
    split_with,
};
pub use split::transport::{CellsManifest, cell_file_name, from_data_url, to_data_url};
