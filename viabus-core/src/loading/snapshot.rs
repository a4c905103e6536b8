//! Network snapshot loading
//!
//! A snapshot is the JSON hand-off from the external ingestion pipeline:
//! pre-extracted stops, ways (with pgRouting-style directional costs) and
//! routes. Raw deserialization types stay here; everything downstream works
//! with the validated [`TransitNetwork`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::model::TransitNetwork;
use crate::{RouteId, StopId, StreetNodeId, WayId};

use super::builder::NetworkBuilder;

#[derive(Debug, Deserialize)]
struct RawNetwork {
    stops: Vec<RawStop>,
    ways: Vec<RawWay>,
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawStop {
    id: StopId,
    #[serde(default)]
    name: Option<String>,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct RawWay {
    id: WayId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    highway: Option<String>,
    source: StreetNodeId,
    target: StreetNodeId,
    cost: f64,
    reverse_cost: f64,
    /// `[lng, lat]` vertices in source→target order.
    geometry: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    id: RouteId,
    name: String,
    route_type: String,
    #[serde(default)]
    oneway: bool,
    /// Way ids in traversal order (the RouteWay sequence).
    ways: Vec<WayId>,
    /// Stop ids in travel order.
    stops: Vec<StopId>,
}

/// Load a network snapshot from a JSON file.
pub fn load_network(path: &Path) -> Result<TransitNetwork, Error> {
    let file = File::open(path)?;
    network_from_reader(BufReader::new(file))
}

/// Load a network snapshot from any reader.
pub fn network_from_reader(reader: impl Read) -> Result<TransitNetwork, Error> {
    let raw: RawNetwork = serde_json::from_reader(reader)
        .map_err(|e| Error::InvalidData(format!("malformed network snapshot: {e}")))?;

    let mut builder = NetworkBuilder::new();
    for stop in raw.stops {
        builder.add_stop(stop.id, stop.name, stop.lat, stop.lng);
    }
    for way in raw.ways {
        builder.add_way(
            way.id,
            way.name,
            way.highway,
            way.source,
            way.target,
            way.cost,
            way.reverse_cost,
            way.geometry.iter().map(|c| (c[0], c[1])).collect(),
        );
    }
    for route in raw.routes {
        builder.add_route(
            route.id,
            route.name,
            route.route_type,
            route.oneway,
            route.ways,
            route.stops,
        );
    }
    builder.build()
}
