use base64::Engine as _;

use crate::split::pipeline::EncodedCell;

const GIF_DATA_URL_PREFIX: &str = "data:image/gif;base64,";

/// Embed GIF bytes in a `data:` URL.
pub fn to_data_url(gif: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(gif);
    let mut out = String::with_capacity(GIF_DATA_URL_PREFIX.len() + b64.len());
    out.push_str(GIF_DATA_URL_PREFIX);
    out.push_str(&b64);
    out
}

/// Inverse of [`to_data_url`]. Returns `None` for anything that is not a base64 GIF data URL.
pub fn from_data_url(url: &str) -> Option<Vec<u8>> {
    let b64 = url.strip_prefix(GIF_DATA_URL_PREFIX)?;
    base64::engine::general_purpose::STANDARD.decode(b64).ok()
}

/// File name used when writing a cell to disk.
pub fn cell_file_name(row: u32, col: u32) -> String {
    format!("cell_r{row}_c{col}.gif")
}

/// JSON response body: cells as data URLs in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CellsManifest {
    /// `data:image/gif;base64,...` URLs, one per encoded cell.
    pub cells: Vec<String>,
}

impl CellsManifest {
    /// Build the manifest in the order `cells` are given.
    pub fn from_cells(cells: &[EncodedCell]) -> Self {
        Self {
            cells: cells.iter().map(|c| to_data_url(&c.gif)).collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/split/transport.rs"]
mod tests;
