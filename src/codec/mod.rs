//! Codec capabilities.
//!
//! The splitting core only talks to GIF bitstreams through [`FrameDecoder`] and
//! [`CellEncoder`], so compositing and partitioning can be exercised with synthetic frames.

use crate::{
    codec::decode::DecodedGif, composite::cell::CellFrame, foundation::error::SplitResult,
};

/// GIF decoding via the `gif` crate.
pub mod decode;
/// GIF encoding via `image`.
pub mod encode;

/// Turns a complete GIF buffer into full-canvas frames.
pub trait FrameDecoder: Sync {
    /// Decode `bytes`. Fails with [`crate::SplitError::Decode`] on malformed or frame-less input.
    fn decode(&self, bytes: &[u8]) -> SplitResult<DecodedGif>;
}

/// Serializes one cell's resolved frames into a standalone looping GIF.
pub trait CellEncoder: Sync {
    /// Encode `frames` at `width` x `height`. Fails with [`crate::SplitError::Encode`] on zero
    /// dimensions or an empty sequence.
    fn encode(&self, frames: &[CellFrame], width: u32, height: u32) -> SplitResult<Vec<u8>>;
}
