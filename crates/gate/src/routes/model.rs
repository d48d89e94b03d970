//! Route model — wire types (`RouteSpec`, as read from the config file)
//! and domain types (`Route`), kept separate the way the teacher keeps
//! `proto::*` wire types apart from its own domain types.

use serde::Deserialize;

/// Default target port for a backend, per spec.md §6.1.
pub const DEFAULT_PORT: u16 = 9090;
/// Default idle window in seconds, per spec.md §6.1.
pub const DEFAULT_IDLE_SECONDS: u64 = 180;
/// Default health path, per spec.md §6.1 and §4.7 step 4.
pub const DEFAULT_HEALTH_PATH: &str = "/__health";

/// On-disk shape of one route entry (spec.md §6.1).
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    #[serde(rename = "match")]
    pub match_spec: MatchSpec,
    pub target: TargetSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchSpec {
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetSpec {
    pub group: Option<String>,
    #[serde(default)]
    pub image: String,
    pub port: Option<u16>,
    pub health: Option<String>,
    pub idle: Option<u64>,
    #[serde(default)]
    pub volumes: Vec<String>,
}

/// In-memory, defaulted route (spec.md §3). Immutable once built.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: String,
    pub path: String,
    pub target: Target,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub group: String,
    pub image: String,
    pub port: u16,
    pub health: String,
    pub idle_seconds: u64,
    pub volumes: Vec<String>,
}

impl RouteSpec {
    /// Apply spec.md §4.7 step 4 defaulting exactly once, at load time.
    pub fn into_route(self) -> Route {
        let method = self.match_spec.method.to_uppercase();
        let path = self.match_spec.path;

        let group = self.target.group.clone().unwrap_or_else(|| {
            format!(
                "{}_{}",
                method,
                path.trim_matches('/').replace('/', "_")
            )
        });

        Route {
            target: Target {
                group,
                image: self.target.image,
                port: self.target.port.unwrap_or(DEFAULT_PORT),
                health: self
                    .target
                    .health
                    .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string()),
                idle_seconds: self.target.idle.unwrap_or(DEFAULT_IDLE_SECONDS),
                volumes: self.target.volumes,
            },
            method,
            path,
        }
    }
}
