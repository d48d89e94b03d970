//! Route config loading — JSON (preferred), then YAML, then the built-in
//! defaults, transcribed verbatim from `original_source/gate.py::load_config`.

use std::path::Path;

use super::model::{Route, RouteSpec, TargetSpec};

const CONFIG_JSON: &str = "routes.json";
const CONFIG_YAML: &str = "routes.yaml";

/// Tag identifying where the currently loaded routes came from, returned
/// by `/admin/reload-routes` (spec.md §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    Json,
    Yaml,
    BuiltIn,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Json => "json",
            SourceTag::Yaml => "yaml",
            SourceTag::BuiltIn => "built-in",
        }
    }
}

/// Load the route table from disk, falling back to the built-in default
/// list (spec.md §4.3).
pub fn load() -> (Vec<Route>, SourceTag) {
    if Path::new(CONFIG_JSON).exists() {
        match std::fs::read_to_string(CONFIG_JSON)
            .map_err(|e| e.to_string())
            .and_then(|body| serde_json::from_str::<Vec<RouteSpec>>(&body).map_err(|e| e.to_string()))
        {
            Ok(specs) => {
                tracing::info!(path = CONFIG_JSON, "loaded route config");
                return (into_routes(specs), SourceTag::Json);
            }
            Err(err) => {
                tracing::warn!(path = CONFIG_JSON, error = %err, "failed to parse route config, falling back");
            }
        }
    }

    if Path::new(CONFIG_YAML).exists() {
        match std::fs::read_to_string(CONFIG_YAML)
            .map_err(|e| e.to_string())
            .and_then(|body| serde_yaml::from_str::<Vec<RouteSpec>>(&body).map_err(|e| e.to_string()))
        {
            Ok(specs) => {
                tracing::info!(path = CONFIG_YAML, "loaded route config");
                return (into_routes(specs), SourceTag::Yaml);
            }
            Err(err) => {
                tracing::warn!(path = CONFIG_YAML, error = %err, "failed to parse route config, falling back");
            }
        }
    }

    tracing::info!("no route config file found, using built-in defaults");
    (built_in_routes(), SourceTag::BuiltIn)
}

fn into_routes(specs: Vec<RouteSpec>) -> Vec<Route> {
    specs.into_iter().map(RouteSpec::into_route).collect()
}

fn built_in_routes() -> Vec<Route> {
    into_routes(vec![
        RouteSpec {
            match_spec: super::model::MatchSpec {
                method: "POST".to_string(),
                path: "/asr".to_string(),
            },
            target: TargetSpec {
                group: Some("media-asr".to_string()),
                image: "plugins-whisperer:latest".to_string(),
                port: Some(9090),
                health: Some("/__health".to_string()),
                idle: Some(300),
                volumes: vec!["whisper_cache:/root/.cache/whisper".to_string()],
            },
        },
        RouteSpec {
            match_spec: super::model::MatchSpec {
                method: "POST".to_string(),
                path: "/subs/tidy".to_string(),
            },
            target: TargetSpec {
                group: Some("media-subtidy".to_string()),
                image: "plugins-subtidy:latest".to_string(),
                port: Some(9090),
                health: Some("/__health".to_string()),
                idle: Some(180),
                volumes: vec![],
            },
        },
        RouteSpec {
            match_spec: super::model::MatchSpec {
                method: "POST".to_string(),
                path: "/subs/burn".to_string(),
            },
            target: TargetSpec {
                group: Some("media-burn".to_string()),
                image: "plugins-sub-burner:latest".to_string(),
                port: Some(9090),
                health: Some("/__health".to_string()),
                idle: Some(180),
                volumes: vec![],
            },
        },
    ])
}
