use std::io::Cursor;

use crate::{
    codec::FrameDecoder,
    foundation::core::{Canvas, RGBA_BYTES, Rect},
    foundation::error::{SplitError, SplitResult},
};

/// How the canvas is treated after a frame has been shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DisposalMethod {
    /// No disposal specified.
    #[default]
    None,
    /// Leave the frame in place.
    DoNotDispose,
    /// Clear the frame's area to the background (transparent).
    RestoreToBackground,
    /// Restore the area to what was shown before the frame.
    RestoreToPrevious,
}

impl From<gif::DisposalMethod> for DisposalMethod {
    fn from(value: gif::DisposalMethod) -> Self {
        match value {
            gif::DisposalMethod::Any => Self::None,
            gif::DisposalMethod::Keep => Self::DoNotDispose,
            gif::DisposalMethod::Background => Self::RestoreToBackground,
            gif::DisposalMethod::Previous => Self::RestoreToPrevious,
        }
    }
}

/// One decoded frame, already composited onto the full logical screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFrame {
    /// Straight-alpha RGBA8, `canvas.width * canvas.height * 4` bytes, row-major.
    pub pixels: Vec<u8>,
    /// Display time in hundredths of a second.
    pub delay_cs: u16,
    /// Disposal declared for this frame, applied before the next one is drawn.
    pub disposal: DisposalMethod,
    /// The frame declares a transparent colour index.
    pub has_transparency: bool,
    /// Where the frame's image data was placed on the logical screen.
    pub placement: Rect,
}

/// Result of decoding a whole GIF.
#[derive(Clone, Debug)]
pub struct DecodedGif {
    /// Logical screen size.
    pub canvas: Canvas,
    /// Frames in display order.
    pub frames: Vec<SourceFrame>,
}

impl DecodedGif {
    /// Sum of all frame delays, in centiseconds.
    pub fn total_delay_cs(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.delay_cs)).sum()
    }
}

/// Default cap on decoded pixel memory: the working canvas plus every retained frame.
pub const DEFAULT_MAX_DECODE_BYTES: u64 = 512 * 1024 * 1024;

/// [`FrameDecoder`] backed by the `gif` crate.
///
/// Frames are blitted onto a persistent canvas, so every [`SourceFrame`] holds the image a
/// viewer would show at that point of the animation.
#[derive(Clone, Copy, Debug)]
pub struct GifFrameDecoder {
    max_bytes: u64,
}

impl GifFrameDecoder {
    /// Decoder that fails once decoded pixels would exceed `max_bytes`.
    pub fn with_limit(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// The configured pixel memory budget, in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

impl Default for GifFrameDecoder {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_DECODE_BYTES)
    }
}

impl FrameDecoder for GifFrameDecoder {
    fn decode(&self, bytes: &[u8]) -> SplitResult<DecodedGif> {
        decode_gif_with_limit(bytes, self.max_bytes)
    }
}

/// Decode GIF bytes into full-canvas RGBA frames, within [`DEFAULT_MAX_DECODE_BYTES`].
pub fn decode_gif(bytes: &[u8]) -> SplitResult<DecodedGif> {
    decode_gif_with_limit(bytes, DEFAULT_MAX_DECODE_BYTES)
}

/// Decode GIF bytes into full-canvas RGBA frames.
///
/// The working canvas and each retained frame cost `width * height * 4` bytes. Decoding
/// fails with [`SplitError::Decode`] before any allocation that would push the total past
/// `max_bytes`.
pub fn decode_gif_with_limit(bytes: &[u8], max_bytes: u64) -> SplitResult<DecodedGif> {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    let mut reader = opts
        .read_info(Cursor::new(bytes))
        .map_err(|e| SplitError::decode(format!("invalid gif header: {e}")))?;

    let canvas = Canvas::new(u32::from(reader.width()), u32::from(reader.height()));
    if canvas.is_empty() {
        return Err(SplitError::decode(format!(
            "gif logical screen is empty ({}x{})",
            canvas.width, canvas.height
        )));
    }

    reserve_canvases(canvas, 1, max_bytes)?;
    // What the next frame is drawn over, after disposal of the previous one.
    let mut base = vec![0u8; canvas.rgba_len()];
    let mut frames = Vec::new();

    while let Some(frame) = reader
        .read_next_frame()
        .map_err(|e| SplitError::decode(format!("frame {}: {e}", frames.len())))?
    {
        // base + every frame kept so far + this one
        reserve_canvases(canvas, frames.len() as u64 + 2, max_bytes)?;

        let placement = Rect::new(
            u32::from(frame.left),
            u32::from(frame.top),
            u32::from(frame.width),
            u32::from(frame.height),
        );
        if frame.buffer.len() < placement.rgba_len() {
            return Err(SplitError::decode(format!(
                "frame {}: pixel buffer holds {} bytes, expected {}",
                frames.len(),
                frame.buffer.len(),
                placement.rgba_len()
            )));
        }

        let disposal = DisposalMethod::from(frame.dispose);
        let pixels = blit_frame(&mut base, canvas, placement, &frame.buffer, disposal);

        frames.push(SourceFrame {
            pixels,
            delay_cs: frame.delay,
            disposal,
            has_transparency: frame.transparent.is_some(),
            placement,
        });
    }

    if frames.is_empty() {
        return Err(SplitError::decode("gif contains no frames"));
    }

    tracing::debug!(
        width = canvas.width,
        height = canvas.height,
        frames = frames.len(),
        "decoded gif"
    );
    Ok(DecodedGif { canvas, frames })
}

fn reserve_canvases(canvas: Canvas, count: u64, max_bytes: u64) -> SplitResult<()> {
    let need = (canvas.rgba_len() as u64).saturating_mul(count);
    if need > max_bytes {
        return Err(SplitError::decode(format!(
            "decoding {count} canvas(es) of {}x{} needs {need} bytes, over the limit of {max_bytes}",
            canvas.width, canvas.height
        )));
    }
    Ok(())
}

/// Draw `data` (RGBA for `placement`) over `base`, returning the visible canvas, then apply
/// `disposal` to `base` within the placement so it is ready for the next frame.
fn blit_frame(
    base: &mut [u8],
    canvas: Canvas,
    placement: Rect,
    data: &[u8],
    disposal: DisposalMethod,
) -> Vec<u8> {
    let mut out = base.to_vec();
    let visible = placement.clip_to(canvas);
    if visible.is_empty() {
        return out;
    }

    let src_stride = placement.width as usize * RGBA_BYTES;
    let dst_stride = canvas.width as usize * RGBA_BYTES;
    let src_x0 = (visible.x - placement.x) as usize;

    for row in 0..visible.height as usize {
        let src_y = (visible.y - placement.y) as usize + row;
        let dst_y = visible.y as usize + row;
        for col in 0..visible.width as usize {
            let s = src_y * src_stride + (src_x0 + col) * RGBA_BYTES;
            let d = dst_y * dst_stride + (visible.x as usize + col) * RGBA_BYTES;
            let px = &data[s..s + RGBA_BYTES];
            if px[3] != 0 {
                out[d..d + RGBA_BYTES].copy_from_slice(px);
            }
            match disposal {
                DisposalMethod::None | DisposalMethod::DoNotDispose => {
                    base[d..d + RGBA_BYTES].copy_from_slice(&out[d..d + RGBA_BYTES]);
                }
                DisposalMethod::RestoreToBackground => {
                    // The declared background colour is ignored, as browsers do.
                    base[d..d + RGBA_BYTES].fill(0);
                }
                DisposalMethod::RestoreToPrevious => {}
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/codec/decode.rs"]
mod tests;
