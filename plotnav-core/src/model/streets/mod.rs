//! Road network model

pub mod components;
pub mod network;

pub use components::{QuantizedKey, StreetEdge, StreetNode};
pub use network::StreetGraph;
