//! Server configuration, loaded from a TOML file with CLI overrides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use viabus_core::Error;
use viabus_core::planning::journey::PlanningConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,
    /// Path to the network snapshot JSON.
    pub snapshot: Option<PathBuf>,
    /// Default stop-search radius / walking bound, meters.
    pub max_walk_distance: f64,
    /// Candidate stops considered per journey side.
    pub candidate_stops: usize,
    /// Budget for each planning sub-call, seconds.
    pub sub_call_timeout_secs: u64,
    /// Cap on concurrently processed requests.
    pub max_concurrent_requests: usize,
    /// When set, the routing endpoints require `Authorization: Bearer <token>`.
    /// Unset means the API is open.
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            snapshot: None,
            max_walk_distance: viabus_core::DEFAULT_MAX_WALK_DISTANCE,
            candidate_stops: viabus_core::DEFAULT_CANDIDATE_STOPS,
            sub_call_timeout_secs: viabus_core::SUB_CALL_TIMEOUT.as_secs(),
            max_concurrent_requests: 64,
            auth_token: None,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. A missing file yields the defaults so the
    /// server can run from CLI flags alone.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::InvalidData(format!("config {}: {e}", path.display())))
    }

    pub fn planning(&self) -> PlanningConfig {
        PlanningConfig {
            max_walk_distance: self.max_walk_distance,
            candidate_stops: self.candidate_stops,
            sub_call_timeout: Duration::from_secs(self.sub_call_timeout_secs),
        }
    }
}
