use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::codec::decode::{DisposalMethod, SourceFrame};
use crate::composite::cell::CellFrame;
use crate::foundation::core::Canvas;

/// Records what it was asked to encode instead of producing a GIF.
struct Recording;

impl CellEncoder for Recording {
    fn encode(&self, frames: &[CellFrame], width: u32, height: u32) -> SplitResult<Vec<u8>> {
        let mut out = vec![width as u8, height as u8, frames.len() as u8];
        for f in frames {
            out.push(f.delay_cs as u8);
            out.extend_from_slice(&f.pixels);
        }
        Ok(out)
    }
}

struct FailOn {
    width: u32,
    calls: AtomicUsize,
}

impl CellEncoder for FailOn {
    fn encode(&self, _frames: &[CellFrame], width: u32, _height: u32) -> SplitResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if width == self.width {
            return Err(SplitError::encode("boom"));
        }
        Ok(vec![1])
    }
}

struct Synthetic(DecodedGif);

impl FrameDecoder for Synthetic {
    fn decode(&self, _bytes: &[u8]) -> SplitResult<DecodedGif> {
        Ok(self.0.clone())
    }
}

fn synthetic(width: u32, height: u32, delays: &[u16]) -> DecodedGif {
    let canvas = Canvas::new(width, height);
    let frames = delays
        .iter()
        .enumerate()
        .map(|(i, &delay_cs)| {
            let mut pixels = Vec::with_capacity(canvas.rgba_len());
            for y in 0..height {
                for x in 0..width {
                    pixels.extend_from_slice(&[x as u8, y as u8, i as u8, 255]);
                }
            }
            SourceFrame {
                pixels,
                delay_cs,
                disposal: DisposalMethod::None,
                has_transparency: false,
                placement: canvas.bounds(),
            }
        })
        .collect();
    DecodedGif { canvas, frames }
}

fn opts(parallel: bool) -> SplitOpts {
    SplitOpts {
        parallel,
        threads: Some(3),
        ..SplitOpts::default()
    }
}

#[test]
fn cells_come_back_in_row_major_order() {
    let decoded = synthetic(9, 6, &[4, 8]);
    let grid = GridSize::new(3, 2, 20).unwrap();
    let (cells, stats) = split_decoded(&decoded, &Recording, grid, &opts(true)).unwrap();

    let pos: Vec<(u32, u32)> = cells.iter().map(|c| (c.row, c.col)).collect();
    assert_eq!(pos, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    assert!(cells.iter().all(|c| c.gif[..3] == [3, 3, 2]));
    assert_eq!(cells[4].rect, Rect::new(3, 3, 3, 3));

    assert_eq!(stats.cells_requested, 6);
    assert_eq!(stats.cells_encoded, 6);
    assert_eq!(stats.cells_skipped, 0);
    assert_eq!(stats.frames_per_cell, 2);
}

#[test]
fn parallel_and_sequential_outputs_are_identical() {
    let decoded = synthetic(11, 7, &[1, 2, 3]);
    let grid = GridSize::new(4, 3, 20).unwrap();
    let (par, par_stats) = split_decoded(&decoded, &Recording, grid, &opts(true)).unwrap();
    let (seq, seq_stats) = split_decoded(&decoded, &Recording, grid, &opts(false)).unwrap();
    assert_eq!(par, seq);
    assert_eq!(par_stats, seq_stats);
}

#[test]
fn cell_pixels_are_cropped_from_source() {
    let decoded = synthetic(4, 4, &[5]);
    let grid = GridSize::new(2, 2, 20).unwrap();
    let (cells, _) = split_decoded(&decoded, &Recording, grid, &opts(false)).unwrap();
    // header (w, h, n, delay) then RGBA of the bottom-right cell
    let last = &cells[3].gif;
    assert_eq!(&last[..4], &[2, 2, 1, 5]);
    assert_eq!(&last[4..8], &[2, 2, 0, 255]);
    assert_eq!(&last[16..20], &[3, 3, 0, 255]);
}

#[test]
fn degenerate_cells_are_counted_as_skipped() {
    let decoded = synthetic(5, 5, &[1]);
    let grid = GridSize::new(10, 10, 20).unwrap();
    let (cells, stats) = split_decoded(&decoded, &Recording, grid, &opts(true)).unwrap();
    assert_eq!(cells.len(), 25);
    assert_eq!(stats.cells_requested, 100);
    assert_eq!(stats.cells_skipped, 75);
    assert!(cells.iter().all(|c| !c.rect.is_empty()));
}

#[test]
fn one_failing_cell_fails_the_whole_split() {
    // 10 wide in 3 columns: widths 4, 4, 2
    let decoded = synthetic(10, 2, &[1]);
    let grid = GridSize::new(3, 1, 20).unwrap();
    for parallel in [true, false] {
        let enc = FailOn {
            width: 2,
            calls: AtomicUsize::new(0),
        };
        let err = split_decoded(&decoded, &enc, grid, &opts(parallel)).unwrap_err();
        assert!(matches!(err, SplitError::Encode(_)));
        assert!(err.to_string().contains("cell (0, 2)"));
        assert!(enc.calls.load(Ordering::SeqCst) >= 1);
    }
}

#[test]
fn injected_decoder_drives_split_with() {
    let dec = Synthetic(synthetic(6, 6, &[2, 2]));
    let grid = GridSize::new(1, 1, 20).unwrap();
    let (cells, stats) = split_with(&dec, &Recording, b"ignored", grid, &opts(true)).unwrap();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].rect, Rect::new(0, 0, 6, 6));
    assert_eq!(stats.bytes_out, cells[0].gif.len() as u64);
}

#[test]
fn empty_frame_list_is_a_decode_error() {
    let decoded = DecodedGif {
        canvas: Canvas::new(2, 2),
        frames: vec![],
    };
    let grid = GridSize::new(1, 1, 20).unwrap();
    let err = split_decoded(&decoded, &Recording, grid, &opts(false)).unwrap_err();
    assert!(matches!(err, SplitError::Decode(_)));
}

#[test]
fn opts_validation_and_json_defaults() {
    assert!(SplitOpts::default().validate().is_ok());
    let bad_threads = SplitOpts {
        threads: Some(0),
        ..SplitOpts::default()
    };
    assert!(matches!(bad_threads.validate(), Err(SplitError::Config(_))));
    let bad_speed = SplitOpts {
        encode_speed: 0,
        ..SplitOpts::default()
    };
    assert!(bad_speed.validate().is_err());

    let parsed: SplitOpts = serde_json::from_str(r#"{ "parallel": false }"#).unwrap();
    assert!(!parsed.parallel);
    assert_eq!(parsed.encode_speed, DEFAULT_ENCODE_SPEED);
    assert_eq!(parsed.max_grid, DEFAULT_MAX_GRID);

    assert!(SplitOpts::default().grid(21, 1).is_err());
    assert_eq!(
        SplitOpts::default().grid(2, 3).unwrap(),
        GridSize { cols: 2, rows: 3 }
    );
}

#[test]
fn opts_load_from_json_file() {
    let dir = std::env::temp_dir().join(format!("gifsplit_opts_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("opts.json");

    std::fs::write(&path, r#"{ "threads": 2, "max_grid": 8 }"#).unwrap();
    let opts = SplitOpts::from_json_path(&path).unwrap();
    assert_eq!(opts.threads, Some(2));
    assert_eq!(opts.max_grid, 8);
    assert!(opts.parallel);

    std::fs::write(&path, r#"{ "encode_speed": 99 }"#).unwrap();
    assert!(SplitOpts::from_json_path(&path).is_err());

    assert!(SplitOpts::from_json_path(&dir.join("missing.json")).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn frame_buffer_of_wrong_length_is_a_decode_error() {
    let mut decoded = synthetic(4, 4, &[1, 1]);
    decoded.frames[1].pixels.truncate(10);
    let grid = GridSize::new(2, 2, 20).unwrap();
    for parallel in [true, false] {
        let err = split_decoded(&decoded, &Recording, grid, &opts(parallel)).unwrap_err();
        assert!(matches!(err, SplitError::Decode(_)));
        assert!(err.to_string().contains("frame 1"));
    }

    let dec = Synthetic(decoded);
    assert!(split_with(&dec, &Recording, b"", grid, &opts(false)).is_err());
}

#[test]
fn decode_budget_comes_from_opts() {
    assert_eq!(SplitOpts::default().max_decode_bytes, DEFAULT_MAX_DECODE_BYTES);
    let zero = SplitOpts {
        max_decode_bytes: 0,
        ..SplitOpts::default()
    };
    assert!(matches!(zero.validate(), Err(SplitError::Config(_))));

    let mut gif = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut gif, 8, 8, &[0, 0, 0, 255, 255, 255]).unwrap();
        let frame = gif::Frame {
            width: 8,
            height: 8,
            buffer: std::borrow::Cow::Owned(vec![1; 64]),
            ..gif::Frame::default()
        };
        enc.write_frame(&frame).unwrap();
    }
    let grid = GridSize::new(1, 1, 20).unwrap();
    // 8x8 RGBA = 256 bytes: canvas + one frame needs 512.
    let tight = SplitOpts {
        max_decode_bytes: 511,
        ..SplitOpts::default()
    };
    let err = split_gif(&gif, grid, &tight).unwrap_err();
    assert!(matches!(err, SplitError::Decode(_)));

    let roomy = SplitOpts {
        max_decode_bytes: 512,
        ..SplitOpts::default()
    };
    assert_eq!(split_gif(&gif, grid, &roomy).unwrap().len(), 1);
}
