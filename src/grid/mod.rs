/// Grid partitioning of the source canvas.
pub mod partition;
