pub mod graph;
pub mod serde;
