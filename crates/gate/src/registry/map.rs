//! Group Registry — thread-safe group -> GroupState map (spec.md §4.4),
//! backed by `DashMap` the way the teacher's `AgentState::inventory` is.

use std::time::{Instant, SystemTime};

use dashmap::DashMap;

use crate::routes::Target;

use super::state::GroupState;

#[derive(Default)]
pub struct GroupRegistry {
    groups: DashMap<String, GroupState>,
}

/// Snapshot row for admin introspection (spec.md §4.9).
pub struct GroupSnapshot {
    pub group: String,
    pub port: u16,
    pub idle_seconds: u64,
    pub image: String,
    pub touched_at: SystemTime,
}

/// Row handed to the Reaper without holding the registry lock across the
/// runtime calls it triggers (spec.md §4.4, §5).
pub struct ReapCandidate {
    pub group: String,
    pub container_name: String,
    pub idle_seconds: u64,
    pub last_touch: Instant,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            groups: DashMap::new(),
        }
    }

    /// Insert-or-update the record for `group`; always set `last_touch =
    /// now`. `last_touch` is monotonically non-decreasing per group
    /// because every call passes the current instant.
    pub fn touch(&self, group: &str, target: &Target, now: Instant) -> GroupState {
        let mut entry = self
            .groups
            .entry(group.to_string())
            .or_insert_with(|| GroupState::new(group, target, now));
        entry.apply_target(target, now);
        entry.clone()
    }

    pub fn snapshot(&self) -> Vec<GroupSnapshot> {
        self.groups
            .iter()
            .map(|e| GroupSnapshot {
                group: e.key().clone(),
                port: e.value().port,
                idle_seconds: e.value().idle_seconds,
                image: e.value().image.clone(),
                touched_at: e.value().touched_at,
            })
            .collect()
    }

    pub fn iter_for_reap(&self) -> Vec<ReapCandidate> {
        self.groups
            .iter()
            .map(|e| ReapCandidate {
                group: e.key().clone(),
                container_name: e.value().container_name.clone(),
                idle_seconds: e.value().idle_seconds,
                last_touch: e.value().last_touch,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn target() -> Target {
        Target {
            group: "media-asr".to_string(),
            image: "img:latest".to_string(),
            port: 9090,
            health: "/__health".to_string(),
            idle_seconds: 180,
            volumes: vec![],
        }
    }

    #[test]
    fn touch_creates_then_updates() {
        let registry = GroupRegistry::new();
        let t0 = Instant::now();
        registry.touch("media-asr", &target(), t0);
        assert_eq!(registry.snapshot().len(), 1);

        let t1 = t0 + Duration::from_secs(1);
        let state = registry.touch("media-asr", &target(), t1);
        assert_eq!(state.last_touch, t1);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn last_touch_is_monotone_non_decreasing() {
        let registry = GroupRegistry::new();
        let t0 = Instant::now();
        registry.touch("media-asr", &target(), t0);
        let t1 = t0 + Duration::from_millis(10);
        let state = registry.touch("media-asr", &target(), t1);
        assert!(state.last_touch >= t0);
        assert_eq!(state.last_touch, t1);
    }

    #[test]
    fn reap_candidates_carry_container_name() {
        let registry = GroupRegistry::new();
        registry.touch("media-asr", &target(), Instant::now());
        let candidates = registry.iter_for_reap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].container_name, "wake_media-asr");
    }

    #[test]
    fn most_recent_target_wins() {
        let registry = GroupRegistry::new();
        registry.touch("media-asr", &target(), Instant::now());
        let mut updated = target();
        updated.port = 7000;
        updated.idle_seconds = 42;
        let state = registry.touch("media-asr", &updated, Instant::now());
        assert_eq!(state.port, 7000);
        assert_eq!(state.idle_seconds, 42);
    }
}
