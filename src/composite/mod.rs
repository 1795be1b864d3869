/// Per-cell canvas accumulation and region extraction.
pub mod cell;
