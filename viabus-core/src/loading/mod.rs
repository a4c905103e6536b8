//! Network construction
//!
//! The planning core does not ingest OSM XML itself; an external extraction
//! pipeline produces a network snapshot (stops, ways, routes) that is loaded
//! here, or callers assemble a network programmatically through
//! [`NetworkBuilder`].

pub mod builder;
pub mod snapshot;

pub use builder::NetworkBuilder;
pub use snapshot::{load_network, network_from_reader};
