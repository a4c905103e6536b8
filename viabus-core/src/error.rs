use thiserror::Error;

use crate::{RouteId, StopId};

/// Which end of a journey a locator failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneySide {
    Start,
    End,
}

impl std::fmt::Display for JourneySide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JourneySide::Start => write!(f, "start"),
            JourneySide::End => write!(f, "end"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("stop {0} not found")]
    StopNotFound(StopId),
    #[error("route {0} not found")]
    RouteNotFound(RouteId),
    #[error("stop {stop} is not served by route {route}")]
    StopNotOnRoute { stop: StopId, route: RouteId },
    #[error("no route serves both stop {start} and stop {end}")]
    NoConnectingRoute { start: StopId, end: StopId },
    #[error("no walking path between the requested points")]
    NoWalkingPath,
    #[error("no stops within {radius_meters} m of the {side} point")]
    NoStopsNearby {
        side: JourneySide,
        radius_meters: f64,
    },
    #[error("deadline exceeded during {0}")]
    DeadlineExceeded(&'static str),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Sub-call errors the journey composer absorbs instead of propagating.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Error::NoConnectingRoute { .. } | Error::NoWalkingPath | Error::DeadlineExceeded(_)
        )
    }
}
