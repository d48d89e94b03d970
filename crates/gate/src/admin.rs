//! Admin Surface — in-process liveness, status, and reload endpoints
//! (spec.md §4.9). Matching uses prefix semantics, unlike routed
//! requests, so `/__health/anything` is accepted as health (spec.md §8).

use std::time::UNIX_EPOCH;

use serde_json::json;

use crate::state::SharedState;

pub struct AdminResponse {
    pub body: String,
}

/// Returns `Some` if `path` is an admin path, dispatching and producing
/// the response body. Returns `None` for anything else, so the caller
/// can fall through to route lookup.
pub async fn dispatch(state: &SharedState, path: &str) -> Option<AdminResponse> {
    if path.starts_with("/__health") {
        return Some(health());
    }
    if path.starts_with("/admin/status") {
        return Some(status(state).await);
    }
    if path.starts_with("/admin/reload-routes") {
        return Some(reload_routes(state).await);
    }
    None
}

fn health() -> AdminResponse {
    AdminResponse {
        body: json!({"ok": true}).to_string(),
    }
}

async fn status(state: &SharedState) -> AdminResponse {
    let routes = state.routes.snapshot().await;
    let route_views: Vec<_> = routes
        .iter()
        .map(|r| {
            json!({
                "match": {"method": r.method, "path": r.path},
                "target": {
                    "group": r.target.group,
                    "image": r.target.image,
                    "port": r.target.port,
                    "health": r.target.health,
                    "idle": r.target.idle_seconds,
                    "volumes": r.target.volumes,
                }
            })
        })
        .collect();

    let snapshot = state.registry.snapshot();
    let mut states = serde_json::Map::new();
    for entry in snapshot {
        let container_name = crate::registry::container_name_for(&entry.group);
        let running = state.runtime.is_running(&container_name).await;
        let last_touch = entry
            .touched_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        states.insert(
            entry.group.clone(),
            json!({
                "port": entry.port,
                "idle": entry.idle_seconds,
                "last_touch": last_touch,
                "image": entry.image,
                "running": running,
            }),
        );
    }

    AdminResponse {
        body: json!({"routes": route_views, "states": states}).to_string(),
    }
}

async fn reload_routes(state: &SharedState) -> AdminResponse {
    let tag = state.routes.reload().await;
    AdminResponse {
        body: json!({"reloaded": tag.as_str()}).to_string(),
    }
}
