use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gifsplit", version)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a GIF into a grid of animated GIF cells.
    Split(SplitArgs),
    /// Print canvas size and per-frame metadata as JSON.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of columns (N).
    #[arg(long, default_value_t = 1)]
    cols: u32,

    /// Number of rows (M).
    #[arg(long, default_value_t = 1)]
    rows: u32,

    /// Directory to write `cell_r{row}_c{col}.gif` files into.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write a `{"cells": [data URLs]}` JSON manifest here (`-` for stdout).
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// JSON file with split options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Process cells one after another instead of on a thread pool.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// GIF quantizer speed (1 = best, 30 = fastest).
    #[arg(long)]
    speed: Option<i32>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(serde::Serialize)]
struct FrameInfo {
    index: usize,
    delay_cs: u16,
    disposal: gifsplit::DisposalMethod,
    has_transparency: bool,
    placement: gifsplit::Rect,
}

#[derive(serde::Serialize)]
struct GifInfo {
    canvas: gifsplit::Canvas,
    frame_count: usize,
    total_delay_cs: u64,
    frames: Vec<FrameInfo>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Split(args) => cmd_split(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn cmd_split(args: SplitArgs) -> anyhow::Result<()> {
    if args.out_dir.is_none() && args.manifest.is_none() {
        anyhow::bail!("nothing to write: pass --out-dir and/or --manifest");
    }

    let mut opts = match &args.config {
        Some(path) => gifsplit::SplitOpts::from_json_path(path)?,
        None => gifsplit::SplitOpts::default(),
    };
    if args.sequential {
        opts.parallel = false;
    }
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    if let Some(speed) = args.speed {
        opts.encode_speed = speed;
    }
    let grid = opts.grid(args.cols, args.rows)?;

    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read gif '{}'", args.in_path.display()))?;
    let (cells, stats) = gifsplit::split_gif_with_stats(&bytes, grid, &opts)?;

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        for cell in &cells {
            let path = dir.join(gifsplit::cell_file_name(cell.row, cell.col));
            std::fs::write(&path, &cell.gif)
                .with_context(|| format!("write cell '{}'", path.display()))?;
        }
    }

    if let Some(path) = &args.manifest {
        let manifest = gifsplit::CellsManifest::from_cells(&cells);
        if path.as_os_str() == "-" {
            serde_json::to_writer(std::io::stdout().lock(), &manifest)
                .context("write manifest to stdout")?;
            println!();
        } else {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = std::fs::File::create(path)
                .with_context(|| format!("create manifest '{}'", path.display()))?;
            serde_json::to_writer(f, &manifest)
                .with_context(|| format!("write manifest '{}'", path.display()))?;
        }
    }

    eprintln!(
        "split {} into {} cells ({} skipped, {} frames each, {} bytes)",
        args.in_path.display(),
        stats.cells_encoded,
        stats.cells_skipped,
        stats.frames_per_cell,
        stats.bytes_out
    );
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read gif '{}'", args.in_path.display()))?;
    let decoded = gifsplit::decode_gif(&bytes)?;

    let info = GifInfo {
        canvas: decoded.canvas,
        frame_count: decoded.frames.len(),
        total_delay_cs: decoded.total_delay_cs(),
        frames: decoded
            .frames
            .iter()
            .enumerate()
            .map(|(index, f)| FrameInfo {
                index,
                delay_cs: f.delay_cs,
                disposal: f.disposal,
                has_transparency: f.has_transparency,
                placement: f.placement,
            })
            .collect(),
    };
    serde_json::to_writer_pretty(std::io::stdout().lock(), &info).context("write info")?;
    println!();
    Ok(())
}
