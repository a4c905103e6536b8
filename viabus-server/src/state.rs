//! Shared application state for the web layer.

use std::sync::Arc;

use viabus_core::TransitNetwork;
use viabus_core::planning::journey::PlanningConfig;

#[derive(Clone)]
pub struct AppState {
    pub network: Arc<TransitNetwork>,
    pub planning: Arc<PlanningConfig>,
    /// Bearer token required on routing endpoints; `None` leaves them open.
    pub auth_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        network: TransitNetwork,
        planning: PlanningConfig,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            network: Arc::new(network),
            planning: Arc::new(planning),
            auth_token: auth_token.map(Arc::from),
        }
    }
}
