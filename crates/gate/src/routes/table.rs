//! Route Table — ordered route list behind an `RwLock`, swapped atomically
//! on reload (spec.md §3, §4.3). Modeled on the teacher's
//! `RwLock<SwarmRole>` for shared read-mostly state.

use tokio::sync::RwLock;

use super::load::{load, SourceTag};
use super::model::Route;

pub struct RouteTable {
    routes: RwLock<Vec<Route>>,
}

impl RouteTable {
    /// Load the initial route table.
    pub fn load() -> (Self, SourceTag) {
        let (routes, tag) = load();
        (
            Self {
                routes: RwLock::new(routes),
            },
            tag,
        )
    }

    /// Build a table directly from an explicit route list, bypassing the
    /// file/built-in loading in `load()`. Used by integration tests that
    /// need a fixed route set without writing a `routes.json` to disk.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self {
            routes: RwLock::new(routes),
        }
    }

    /// First-match linear scan by exact (method, path), spec.md §3.
    pub async fn lookup(&self, method: &str, path: &str) -> Option<Route> {
        let routes = self.routes.read().await;
        routes
            .iter()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    /// Re-invoke `load()` and atomically swap the table. A lookup already
    /// in flight resolves against whichever vector it holds a clone of —
    /// `lookup` clones the matched `Route` before returning, so it never
    /// observes a partially-swapped table.
    pub async fn reload(&self) -> SourceTag {
        let (new_routes, tag) = load();
        let mut guard = self.routes.write().await;
        *guard = new_routes;
        tag
    }

    /// Snapshot of all routes, for admin introspection (spec.md §4.9).
    pub async fn snapshot(&self) -> Vec<Route> {
        self.routes.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::model::{MatchSpec, RouteSpec, TargetSpec};

    fn route(method: &str, path: &str) -> Route {
        RouteSpec {
            match_spec: MatchSpec {
                method: method.to_string(),
                path: path.to_string(),
            },
            target: TargetSpec {
                group: Some(format!("{method}-{path}")),
                ..Default::default()
            },
        }
        .into_route()
    }

    fn table_with(routes: Vec<Route>) -> RouteTable {
        RouteTable {
            routes: RwLock::new(routes),
        }
    }

    #[tokio::test]
    async fn exact_match_lookup() {
        let table = table_with(vec![route("POST", "/asr")]);
        assert!(table.lookup("POST", "/asr").await.is_some());
        assert!(table.lookup("GET", "/asr").await.is_none());
    }

    #[tokio::test]
    async fn query_string_does_not_match() {
        // Boundary case from spec.md §8: /asr?x=1 must not match /asr.
        let table = table_with(vec![route("POST", "/asr")]);
        assert!(table.lookup("POST", "/asr?x=1").await.is_none());
    }

    #[tokio::test]
    async fn first_match_wins_on_duplicates() {
        let mut first = route("POST", "/asr");
        first.target.group = "first".to_string();
        let mut second = route("POST", "/asr");
        second.target.group = "second".to_string();
        let table = table_with(vec![first, second]);
        let found = table.lookup("POST", "/asr").await.unwrap();
        assert_eq!(found.target.group, "first");
    }

    #[tokio::test]
    async fn lookup_is_deterministic_across_repeats() {
        let table = table_with(vec![route("POST", "/asr")]);
        let a = table.lookup("POST", "/asr").await;
        let b = table.lookup("POST", "/asr").await;
        assert_eq!(a.unwrap().target.group, b.unwrap().target.group);
    }
}
