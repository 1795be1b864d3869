/// Decode, partition, composite and encode in one call.
pub mod pipeline;
/// Text-safe packaging of encoded cells.
pub mod transport;
