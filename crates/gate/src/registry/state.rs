//! Group State — per-group runtime bookkeeping (spec.md §3).

use std::time::{Instant, SystemTime};

use crate::routes::Target;

#[derive(Debug, Clone)]
pub struct GroupState {
    pub container_name: String,
    pub port: u16,
    pub idle_seconds: u64,
    pub image: String,
    pub health_path: String,
    /// Monotonic clock value, used for idle-window comparisons in the
    /// Reaper (spec.md §4.5).
    pub last_touch: Instant,
    /// Wall-clock value of the same touch, used only for admin display
    /// (spec.md §4.9's `last_touch` field).
    pub touched_at: SystemTime,
}

/// Derive the container name for a group: `wake_<group>` — no case
/// folding, no sanitization (spec.md §8 "Name derivation" invariant).
pub fn container_name_for(group: &str) -> String {
    format!("wake_{group}")
}

impl GroupState {
    pub fn new(group: &str, target: &Target, now: Instant) -> Self {
        Self {
            container_name: container_name_for(group),
            port: target.port,
            idle_seconds: target.idle_seconds,
            image: target.image.clone(),
            health_path: target.health.clone(),
            last_touch: now,
            touched_at: SystemTime::now(),
        }
    }

    /// Apply the most recently observed target for this group (spec.md
    /// §3 invariant: a group's port/image/health/idle are whatever the
    /// *most recent* request saw).
    pub fn apply_target(&mut self, target: &Target, now: Instant) {
        self.port = target.port;
        self.idle_seconds = target.idle_seconds;
        self.image = target.image.clone();
        self.health_path = target.health.clone();
        self.last_touch = now;
        self.touched_at = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_name_is_exactly_wake_prefixed() {
        assert_eq!(container_name_for("media-asr"), "wake_media-asr");
        assert_eq!(container_name_for("Media-ASR"), "wake_Media-ASR");
    }
}
