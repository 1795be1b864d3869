use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::{
    codec::CellEncoder,
    composite::cell::CellFrame,
    foundation::error::{SplitError, SplitResult},
};

/// Quantizer speed used when none is configured (1 = best quality, 30 = fastest).
pub const DEFAULT_ENCODE_SPEED: i32 = 10;

/// [`CellEncoder`] backed by `image`'s GIF encoder (NeuQuant palette per frame).
#[derive(Clone, Copy, Debug)]
pub struct GifCellEncoder {
    speed: i32,
}

impl GifCellEncoder {
    /// `speed` must be in `1..=30`.
    pub fn new(speed: i32) -> SplitResult<Self> {
        if !(1..=30).contains(&speed) {
            return Err(SplitError::config(format!(
                "encode speed must be within 1..=30 (got {speed})"
            )));
        }
        Ok(Self { speed })
    }

    /// Configured quantizer speed.
    pub fn speed(&self) -> i32 {
        self.speed
    }
}

impl Default for GifCellEncoder {
    fn default() -> Self {
        Self {
            speed: DEFAULT_ENCODE_SPEED,
        }
    }
}

impl CellEncoder for GifCellEncoder {
    fn encode(&self, frames: &[CellFrame], width: u32, height: u32) -> SplitResult<Vec<u8>> {
        encode_cell_gif(frames, width, height, self.speed)
    }
}

/// Serialize `frames` into a looping GIF of `width` x `height`.
pub fn encode_cell_gif(
    frames: &[CellFrame],
    width: u32,
    height: u32,
    speed: i32,
) -> SplitResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(SplitError::encode(format!(
            "cell dimensions must be positive (got {width}x{height})"
        )));
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(SplitError::encode(format!(
            "cell dimensions {width}x{height} exceed the gif limit of {}",
            u16::MAX
        )));
    }
    if frames.is_empty() {
        return Err(SplitError::encode("cannot encode a cell with no frames"));
    }

    let mut images = Vec::with_capacity(frames.len());
    for (i, f) in frames.iter().enumerate() {
        let buf = RgbaImage::from_raw(width, height, f.pixels.clone()).ok_or_else(|| {
            SplitError::encode(format!(
                "frame {i}: pixel buffer holds {} bytes, expected {}",
                f.pixels.len(),
                width as usize * height as usize * 4
            ))
        })?;
        // Codec delays are milliseconds; GIF stores hundredths of a second.
        let delay = Delay::from_numer_denom_ms(u32::from(f.delay_cs) * 10, 1);
        images.push(Frame::from_parts(buf, 0, 0, delay));
    }

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, speed);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| SplitError::encode(format!("set loop: {e}")))?;
        encoder
            .encode_frames(images)
            .map_err(|e| SplitError::encode(e.to_string()))?;
        // Dropping the encoder writes the trailer.
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/encode.rs"]
mod tests;
