//! Shared gate state, assembled once in `main` and handed to every task
//! as an `Arc`.

use std::sync::Arc;

use crate::config::GateConfig;
use crate::registry::GroupRegistry;
use crate::routes::RouteTable;
use crate::runtime::Runtime;

pub struct GateState {
    pub config: GateConfig,
    pub routes: RouteTable,
    pub registry: GroupRegistry,
    pub runtime: Arc<dyn Runtime>,
}

pub type SharedState = Arc<GateState>;

impl GateState {
    pub fn new(config: GateConfig, routes: RouteTable, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            config,
            routes,
            registry: GroupRegistry::new(),
            runtime,
        }
    }
}
